//! SQLite tag repository.

use sqlx::SqlitePool;
use uuid::Uuid;

use super::todo::row_to_tag;
use crate::db::utils::current_timestamp;
use crate::db::{DbError, DbResult, NewTag, Tag, TagChanges};

/// Default color applied when a tag is created without one.
pub const DEFAULT_TAG_COLOR: &str = "#3B82F6";

/// SQLx-backed tag repository.
pub struct SqliteTagRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl SqliteTagRepository<'_> {
    /// Create a tag for the given user. The name is trimmed and the color
    /// defaults to [`DEFAULT_TAG_COLOR`].
    pub async fn create(&self, user_id: Uuid, tag: &NewTag) -> DbResult<Tag> {
        let id = Uuid::new_v4();
        let created_at = current_timestamp();
        let name = tag.name.trim().to_string();
        let color = tag
            .color
            .clone()
            .unwrap_or_else(|| DEFAULT_TAG_COLOR.to_string());

        sqlx::query(
            "INSERT INTO tags (id, user_id, name, color, created_at) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(user_id.to_string())
        .bind(&name)
        .bind(&color)
        .bind(&created_at)
        .execute(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        Ok(Tag {
            id,
            user_id,
            name,
            color,
            created_at,
        })
    }

    /// List the user's tags sorted by name ascending.
    pub async fn list(&self, user_id: Uuid) -> DbResult<Vec<Tag>> {
        let rows = sqlx::query(
            "SELECT id, user_id, name, color, created_at FROM tags
             WHERE user_id = ? ORDER BY name ASC",
        )
        .bind(user_id.to_string())
        .fetch_all(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        rows.iter().map(row_to_tag).collect()
    }

    /// Scoped lookup: returns the tag only when both id and owner match.
    pub async fn get(&self, user_id: Uuid, tag_id: Uuid) -> DbResult<Option<Tag>> {
        let row = sqlx::query(
            "SELECT id, user_id, name, color, created_at FROM tags
             WHERE id = ? AND user_id = ?",
        )
        .bind(tag_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        row.as_ref().map(row_to_tag).transpose()
    }

    /// Apply a partial update; only supplied fields are overwritten. The
    /// read and write share one transaction so a concurrent delete cannot
    /// slip between them.
    pub async fn update(
        &self,
        user_id: Uuid,
        tag_id: Uuid,
        changes: &TagChanges,
    ) -> DbResult<Option<Tag>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from_sqlx)?;

        let row = sqlx::query(
            "SELECT id, user_id, name, color, created_at FROM tags
             WHERE id = ? AND user_id = ?",
        )
        .bind(tag_id.to_string())
        .bind(user_id.to_string())
        .fetch_optional(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        let Some(row) = row else {
            return Ok(None);
        };
        let mut tag = row_to_tag(&row)?;

        if let Some(name) = &changes.name {
            tag.name = name.trim().to_string();
        }
        if let Some(color) = &changes.color {
            tag.color = color.clone();
        }

        sqlx::query("UPDATE tags SET name = ?, color = ? WHERE id = ? AND user_id = ?")
            .bind(&tag.name)
            .bind(&tag.color)
            .bind(tag_id.to_string())
            .bind(user_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(DbError::from_sqlx)?;

        tx.commit().await.map_err(DbError::from_sqlx)?;

        Ok(Some(tag))
    }

    /// Scoped hard delete. Join rows cascade; owning todos are untouched.
    pub async fn delete(&self, user_id: Uuid, tag_id: Uuid) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM tags WHERE id = ? AND user_id = ?")
            .bind(tag_id.to_string())
            .bind(user_id.to_string())
            .execute(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}
