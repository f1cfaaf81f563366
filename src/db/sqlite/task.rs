//! SQLite repository for assistant-facing tasks.
//!
//! Tasks use sequential integer ids and a plain string owner id (the JWT
//! subject), since tool calls carry the caller identity explicitly.

use sqlx::{Row, SqlitePool};

use crate::db::utils::current_timestamp;
use crate::db::{DbError, DbResult, Task, TaskChanges, TaskStatusFilter};

/// SQLx-backed task repository.
pub struct SqliteTaskRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl SqliteTaskRepository<'_> {
    /// Insert a task for the given user.
    pub async fn create(
        &self,
        user_id: &str,
        title: &str,
        description: Option<&str>,
    ) -> DbResult<Task> {
        let now = current_timestamp();

        let result = sqlx::query(
            r#"
            INSERT INTO tasks (user_id, title, description, completed, created_at, updated_at)
            VALUES (?, ?, ?, 0, ?, ?)
            "#,
        )
        .bind(user_id)
        .bind(title.trim())
        .bind(description.map(str::trim))
        .bind(&now)
        .bind(&now)
        .execute(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        let id = result.last_insert_rowid();

        Ok(Task {
            id,
            user_id: user_id.to_string(),
            title: title.trim().to_string(),
            description: description.map(|d| d.trim().to_string()),
            completed: false,
            created_at: now.clone(),
            updated_at: now,
        })
    }

    /// List the user's tasks, newest first, optionally filtered by
    /// completion status.
    pub async fn list(&self, user_id: &str, status: TaskStatusFilter) -> DbResult<Vec<Task>> {
        let mut sql = String::from(
            "SELECT id, user_id, title, description, completed, created_at, updated_at
             FROM tasks WHERE user_id = ?",
        );
        match status {
            TaskStatusFilter::Pending => sql.push_str(" AND completed = 0"),
            TaskStatusFilter::Completed => sql.push_str(" AND completed = 1"),
            TaskStatusFilter::All => {}
        }
        sql.push_str(" ORDER BY created_at DESC, id DESC");

        let rows = sqlx::query(&sql)
            .bind(user_id)
            .fetch_all(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(rows.iter().map(row_to_task).collect())
    }

    /// Scoped lookup: returns the task only when both id and owner match.
    pub async fn get(&self, user_id: &str, task_id: i64) -> DbResult<Option<Task>> {
        let row = sqlx::query(
            "SELECT id, user_id, title, description, completed, created_at, updated_at
             FROM tasks WHERE id = ? AND user_id = ?",
        )
        .bind(task_id)
        .bind(user_id)
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        Ok(row.as_ref().map(row_to_task))
    }

    /// Apply a partial update; only supplied fields are overwritten, and
    /// `updated_at` is bumped. The read and write share one transaction so
    /// a concurrent delete cannot slip between them.
    pub async fn update(
        &self,
        user_id: &str,
        task_id: i64,
        changes: &TaskChanges,
    ) -> DbResult<Option<Task>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from_sqlx)?;

        let Some(mut task) = fetch_task(&mut tx, user_id, task_id).await? else {
            return Ok(None);
        };

        if let Some(title) = &changes.title {
            task.title = title.trim().to_string();
        }
        if let Some(description) = &changes.description {
            let trimmed = description.trim();
            task.description = if trimmed.is_empty() {
                None
            } else {
                Some(trimmed.to_string())
            };
        }
        task.updated_at = current_timestamp();

        sqlx::query(
            "UPDATE tasks SET title = ?, description = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(&task.title)
        .bind(&task.description)
        .bind(&task.updated_at)
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        tx.commit().await.map_err(DbError::from_sqlx)?;

        Ok(Some(task))
    }

    /// Mark a task completed.
    pub async fn complete(&self, user_id: &str, task_id: i64) -> DbResult<Option<Task>> {
        let mut tx = self.pool.begin().await.map_err(DbError::from_sqlx)?;

        let Some(mut task) = fetch_task(&mut tx, user_id, task_id).await? else {
            return Ok(None);
        };

        task.completed = true;
        task.updated_at = current_timestamp();

        sqlx::query(
            "UPDATE tasks SET completed = 1, updated_at = ? WHERE id = ? AND user_id = ?",
        )
        .bind(&task.updated_at)
        .bind(task_id)
        .bind(user_id)
        .execute(&mut *tx)
        .await
        .map_err(DbError::from_sqlx)?;

        tx.commit().await.map_err(DbError::from_sqlx)?;

        Ok(Some(task))
    }

    /// Scoped hard delete.
    pub async fn delete(&self, user_id: &str, task_id: i64) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
            .bind(task_id)
            .bind(user_id)
            .execute(self.pool)
            .await
            .map_err(DbError::from_sqlx)?;

        Ok(result.rows_affected() > 0)
    }
}

/// Scoped lookup inside an open transaction.
async fn fetch_task(
    tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
    user_id: &str,
    task_id: i64,
) -> DbResult<Option<Task>> {
    let row = sqlx::query(
        "SELECT id, user_id, title, description, completed, created_at, updated_at
         FROM tasks WHERE id = ? AND user_id = ?",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .map_err(DbError::from_sqlx)?;

    Ok(row.as_ref().map(row_to_task))
}

fn row_to_task(row: &sqlx::sqlite::SqliteRow) -> Task {
    Task {
        id: row.get("id"),
        user_id: row.get("user_id"),
        title: row.get("title"),
        description: row.get("description"),
        completed: row.get("completed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}
