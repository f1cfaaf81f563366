//! Tag CRUD handlers.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use serde::Deserialize;
use tracing::instrument;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::CurrentUser;
use crate::db::{NewTag, TagChanges};

use super::super::handlers::ErrorResponse;
use super::{TagResponse, bad_request, internal_error, not_found};

const MAX_TAG_NAME_LEN: usize = 50;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTagRequest {
    #[schema(example = "errands")]
    pub name: String,
    /// Hex color in `#RRGGBB` form; defaults when omitted.
    #[schema(example = "#EF4444")]
    pub color: Option<String>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTagRequest {
    #[schema(example = "chores")]
    pub name: Option<String>,
    #[schema(example = "#10B981")]
    pub color: Option<String>,
}

// =============================================================================
// Handlers
// =============================================================================

fn validate_name(name: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(bad_request("Tag name must not be empty"));
    }
    if trimmed.chars().count() > MAX_TAG_NAME_LEN {
        return Err(bad_request("Tag name must be 50 characters or less"));
    }
    Ok(())
}

fn validate_color(color: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(bad_request("Color must be in #RRGGBB format"));
    }
    Ok(())
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/api/v1/tags",
    tag = "tags",
    request_body = CreateTagRequest,
    responses(
        (status = 201, description = "Tag created", body = TagResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, req))]
pub async fn create_tag(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTagRequest>,
) -> Result<(StatusCode, Json<TagResponse>), (StatusCode, Json<ErrorResponse>)> {
    validate_name(&req.name)?;
    if let Some(color) = &req.color {
        validate_color(color)?;
    }

    let tag = state
        .db()
        .tags()
        .create(
            user.id,
            &NewTag {
                name: req.name,
                color: req.color,
            },
        )
        .await
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(TagResponse::from(tag))))
}

/// List tags
///
/// Returns the caller's tags sorted by name.
#[utoipa::path(
    get,
    path = "/api/v1/tags",
    tag = "tags",
    responses(
        (status = 200, description = "List of tags", body = [TagResponse]),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_tags(
    user: CurrentUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<TagResponse>>, (StatusCode, Json<ErrorResponse>)> {
    let tags = state
        .db()
        .tags()
        .list(user.id)
        .await
        .map_err(internal_error)?;

    Ok(Json(tags.into_iter().map(TagResponse::from).collect()))
}

/// Get a tag by id
#[utoipa::path(
    get,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Tag found", body = TagResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_tag(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TagResponse>, (StatusCode, Json<ErrorResponse>)> {
    let tag = state
        .db()
        .tags()
        .get(user.id, id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Tag not found"))?;

    Ok(Json(TagResponse::from(tag)))
}

/// Update a tag
#[utoipa::path(
    put,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Tag updated", body = TagResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, req))]
pub async fn update_tag(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTagRequest>,
) -> Result<Json<TagResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(name) = &req.name {
        validate_name(name)?;
    }
    if let Some(color) = &req.color {
        validate_color(color)?;
    }

    let tag = state
        .db()
        .tags()
        .update(
            user.id,
            id,
            &TagChanges {
                name: req.name,
                color: req.color,
            },
        )
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Tag not found"))?;

    Ok(Json(TagResponse::from(tag)))
}

/// Delete a tag
///
/// Association rows are removed with the tag; todos are untouched.
#[utoipa::path(
    delete,
    path = "/api/v1/tags/{id}",
    tag = "tags",
    params(("id" = Uuid, Path, description = "Tag ID")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Tag not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_tag(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let deleted = state
        .db()
        .tags()
        .delete(user.id, id)
        .await
        .map_err(internal_error)?;

    if !deleted {
        return Err(not_found("Tag not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
