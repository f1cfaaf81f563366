//! V1 API handlers.

mod auth;
mod tags;
mod todos;

#[cfg(test)]
mod tags_test;
#[cfg(test)]
mod todos_test;

pub use auth::*;
pub use tags::*;
pub use todos::*;

use axum::Json;
use axum::http::StatusCode;
use tracing::error;

use super::handlers::ErrorResponse;
use crate::db::DbError;

/// Map a store failure to an opaque 500. The detail goes to the log, not
/// to the client.
pub(crate) fn internal_error(e: DbError) -> (StatusCode, Json<ErrorResponse>) {
    error!(error = %e, "Database operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Internal server error".to_string(),
        }),
    )
}

pub(crate) fn bad_request(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

pub(crate) fn not_found(message: impl Into<String>) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}
