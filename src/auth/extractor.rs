//! Access gate: axum extractor resolving the bearer token to a user.

use axum::Json;
use axum::extract::FromRequestParts;
use axum::http::StatusCode;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use tracing::error;
use uuid::Uuid;

use crate::api::{AppState, ErrorResponse};

/// The authenticated caller, resolved from the `Authorization: Bearer`
/// header. Handlers take this as their first extractor; every store
/// operation is scoped by `id`.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
}

fn unauthorized(message: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: message.to_string(),
        }),
    )
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = (StatusCode, Json<ErrorResponse>);

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "))
            .ok_or_else(|| unauthorized("Missing authentication token"))?;

        let claims = state
            .auth()
            .verify_token(token)
            .ok_or_else(|| unauthorized("Invalid authentication token"))?;

        let user_id = Uuid::parse_str(&claims.sub)
            .map_err(|_| unauthorized("Invalid user ID in token"))?;

        let user = state
            .db()
            .users()
            .get(user_id)
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to load user for token");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(ErrorResponse {
                        error: "Internal server error".to_string(),
                    }),
                )
            })?
            .ok_or_else(|| unauthorized("User not found"))?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
        })
    }
}
