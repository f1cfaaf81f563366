//! Registration and login handlers.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use tracing::{error, instrument};
use utoipa::ToSchema;

use crate::api::AppState;
use crate::auth::validate_password_strength;
use crate::db::{DbError, User};

use super::super::handlers::ErrorResponse;
use super::{bad_request, internal_error};

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct RegisterRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Sup3rSecret")]
    pub password: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "alice@example.com")]
    pub email: String,
    #[schema(example = "Sup3rSecret")]
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct UserResponse {
    pub id: String,
    #[schema(example = "alice@example.com")]
    pub email: String,
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_string(),
            email: u.email,
            created_at: u.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub access_token: String,
    #[schema(example = "bearer")]
    pub token_type: String,
    pub user: UserResponse,
}

// =============================================================================
// Handlers
// =============================================================================

/// Register a new account
///
/// Hashes the password, stores the user, and returns a fresh access token.
#[utoipa::path(
    post,
    path = "/api/v1/auth/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created", body = AuthResponse),
        (status = 400, description = "Invalid email or weak password", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), (StatusCode, Json<ErrorResponse>)> {
    let email = req.email.trim().to_lowercase();
    if email.is_empty() || !email.contains('@') || email.len() > 255 {
        return Err(bad_request("Invalid email address"));
    }

    validate_password_strength(&req.password).map_err(bad_request)?;

    // Pre-check for a friendlier error than the unique-index violation;
    // the constraint still backstops concurrent registrations.
    if state
        .db()
        .users()
        .get_by_email(&email)
        .await
        .map_err(internal_error)?
        .is_some()
    {
        return Err((
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "Email already registered".to_string(),
            }),
        ));
    }

    let password_hash = state.auth().hash_password(&req.password).map_err(|e| {
        error!(error = %e, "Password hashing failed");
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "Internal server error".to_string(),
            }),
        )
    })?;

    let user = state
        .db()
        .users()
        .create(&email, &password_hash)
        .await
        .map_err(|e| match e {
            DbError::Constraint { .. } => (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: "Email already registered".to_string(),
                }),
            ),
            other => internal_error(other),
        })?;

    let access_token = state
        .auth()
        .create_access_token(user.id, &user.email)
        .map_err(|e| {
            error!(error = %e, "Token issuance failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
        })?;

    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            access_token,
            token_type: "bearer".to_string(),
            user: user.into(),
        }),
    ))
}

/// Log in with email and password
///
/// Unknown email and wrong password produce the same 401 so callers
/// cannot probe which addresses are registered.
#[utoipa::path(
    post,
    path = "/api/v1/auth/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
#[instrument(skip(state, req))]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, (StatusCode, Json<ErrorResponse>)> {
    let invalid_credentials = || {
        (
            StatusCode::UNAUTHORIZED,
            Json(ErrorResponse {
                error: "Invalid email or password".to_string(),
            }),
        )
    };

    let email = req.email.trim().to_lowercase();
    let user = state
        .db()
        .users()
        .get_by_email(&email)
        .await
        .map_err(internal_error)?
        .ok_or_else(invalid_credentials)?;

    if !state.auth().verify_password(&req.password, &user.password_hash) {
        return Err(invalid_credentials());
    }

    let access_token = state
        .auth()
        .create_access_token(user.id, &user.email)
        .map_err(|e| {
            error!(error = %e, "Token issuance failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Internal server error".to_string(),
                }),
            )
        })?;

    Ok(Json(AuthResponse {
        access_token,
        token_type: "bearer".to_string(),
        user: user.into(),
    }))
}
