//! SQLite database connection and migration management.

use std::path::Path;
use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use super::{SqliteTagRepository, SqliteTaskRepository, SqliteTodoRepository,
    SqliteUserRepository};
use crate::db::{DbError, DbResult};

/// SQLite database over a connection pool.
///
/// Repositories borrow the pool, so each request acquires a connection
/// only for the duration of its queries.
pub struct SqliteDatabase {
    pool: SqlitePool,
}

impl SqliteDatabase {
    /// Open a database at the given path, creating the file if missing.
    pub async fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Create an in-memory database (useful for testing).
    ///
    /// Capped to a single connection because each SQLite in-memory
    /// connection sees its own database.
    pub async fn in_memory() -> DbResult<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|e| DbError::Connection {
                message: e.to_string(),
            })?;

        Ok(Self { pool })
    }

    /// Run pending migrations embedded from `migrations/`.
    pub async fn migrate(&self) -> DbResult<()> {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .map_err(|e| DbError::Migration {
                message: e.to_string(),
            })?;

        Ok(())
    }

    /// Access the underlying pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn users(&self) -> SqliteUserRepository<'_> {
        SqliteUserRepository { pool: &self.pool }
    }

    pub fn todos(&self) -> SqliteTodoRepository<'_> {
        SqliteTodoRepository { pool: &self.pool }
    }

    pub fn tags(&self) -> SqliteTagRepository<'_> {
        SqliteTagRepository { pool: &self.pool }
    }

    pub fn tasks(&self) -> SqliteTaskRepository<'_> {
        SqliteTaskRepository { pool: &self.pool }
    }
}
