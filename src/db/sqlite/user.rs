//! SQLite user repository.

use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use crate::db::utils::current_timestamp;
use crate::db::{DbError, DbResult, User};

/// SQLx-backed user repository.
pub struct SqliteUserRepository<'a> {
    pub(crate) pool: &'a SqlitePool,
}

impl SqliteUserRepository<'_> {
    /// Insert a new user with a freshly generated id.
    ///
    /// A duplicate email surfaces as `DbError::Constraint`.
    pub async fn create(&self, email: &str, password_hash: &str) -> DbResult<User> {
        let id = Uuid::new_v4();
        let created_at = current_timestamp();

        sqlx::query(
            "INSERT INTO users (id, email, password_hash, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(id.to_string())
        .bind(email)
        .bind(password_hash)
        .bind(&created_at)
        .execute(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        Ok(User {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        })
    }

    /// Get a user by id.
    pub async fn get(&self, id: Uuid) -> DbResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE id = ?",
        )
        .bind(id.to_string())
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }

    /// Get a user by email (used for login and duplicate checks).
    pub async fn get_by_email(&self, email: &str) -> DbResult<Option<User>> {
        let row = sqlx::query(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = ?",
        )
        .bind(email)
        .fetch_optional(self.pool)
        .await
        .map_err(DbError::from_sqlx)?;

        row.as_ref().map(row_to_user).transpose()
    }
}

fn row_to_user(row: &sqlx::sqlite::SqliteRow) -> DbResult<User> {
    let id: String = row.get("id");
    let id = Uuid::parse_str(&id).map_err(|e| DbError::InvalidData {
        message: format!("Invalid user id in database: {}", e),
    })?;

    Ok(User {
        id,
        email: row.get("email"),
        password_hash: row.get("password_hash"),
        created_at: row.get("created_at"),
    })
}
