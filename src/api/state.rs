//! Application state for the API server.

use std::sync::Arc;

use crate::auth::AuthService;
use crate::db::SqliteDatabase;

/// Shared application state.
///
/// Dependencies are injected via the constructor; the state carries no
/// mutable process-wide data beyond the connection pool.
#[derive(Clone)]
pub struct AppState {
    db: Arc<SqliteDatabase>,
    auth: AuthService,
}

impl AppState {
    pub fn new(db: SqliteDatabase, auth: AuthService) -> Self {
        Self {
            db: Arc::new(db),
            auth,
        }
    }

    /// Get a reference to the database.
    pub fn db(&self) -> &SqliteDatabase {
        &self.db
    }

    /// Get a cloned Arc to the database, for services that outlive a
    /// single request (the MCP session factory).
    pub fn db_arc(&self) -> Arc<SqliteDatabase> {
        Arc::clone(&self.db)
    }

    /// Get a reference to the credential service.
    pub fn auth(&self) -> &AuthService {
        &self.auth
    }
}
