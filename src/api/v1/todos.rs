//! Todo CRUD handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::api::AppState;
use crate::auth::CurrentUser;
use crate::db::{NewTodo, Priority, SortOrder, Tag, Todo, TodoChanges, TodoQuery};

use super::super::handlers::ErrorResponse;
use super::{bad_request, internal_error, not_found};

const MAX_TITLE_LEN: usize = 500;
const MAX_DESCRIPTION_LEN: usize = 5000;
const MAX_SEARCH_LEN: usize = 500;
const MAX_PAGE_SIZE: u32 = 100;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Serialize, ToSchema)]
pub struct TagResponse {
    pub id: String,
    #[schema(example = "errands")]
    pub name: String,
    #[schema(example = "#3B82F6")]
    pub color: String,
    pub created_at: String,
}

impl From<Tag> for TagResponse {
    fn from(t: Tag) -> Self {
        Self {
            id: t.id.to_string(),
            name: t.name,
            color: t.color,
            created_at: t.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
pub struct TodoResponse {
    pub id: String,
    #[schema(example = "Buy groceries")]
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    #[schema(example = "medium")]
    pub priority: String,
    #[schema(example = "2026-09-01")]
    pub due_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
    pub tags: Vec<TagResponse>,
}

impl From<Todo> for TodoResponse {
    fn from(t: Todo) -> Self {
        Self {
            id: t.id.to_string(),
            title: t.title,
            description: t.description,
            completed: t.completed,
            priority: t.priority.to_string(),
            due_date: t.due_date,
            created_at: t.created_at,
            updated_at: t.updated_at,
            tags: t.tags.into_iter().map(TagResponse::from).collect(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateTodoRequest {
    #[schema(example = "Buy groceries")]
    pub title: String,
    pub description: Option<String>,
    #[schema(value_type = Option<String>, example = "high")]
    pub priority: Option<Priority>,
    /// Due date in `YYYY-MM-DD` form.
    #[schema(example = "2026-09-01")]
    pub due_date: Option<String>,
    /// Tags to associate; ids not owned by the caller are dropped.
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateTodoRequest {
    #[schema(example = "Buy groceries and coffee")]
    pub title: Option<String>,
    pub description: Option<String>,
    pub completed: Option<bool>,
    #[schema(value_type = Option<String>, example = "low")]
    pub priority: Option<Priority>,
    #[schema(example = "2026-09-02")]
    pub due_date: Option<String>,
    /// Replaces the full tag set when provided.
    pub tag_ids: Option<Vec<Uuid>>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTodoStatusRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize, IntoParams)]
pub struct ListTodosQuery {
    /// Filter by completion status
    pub completed: Option<bool>,
    /// Case-insensitive substring match over title and description
    #[param(example = "groceries")]
    pub search: Option<String>,
    /// Sort by creation time: "asc" or "desc" (default)
    #[param(example = "desc")]
    pub sort_order: Option<String>,
    /// 1-indexed page number (default 1)
    #[param(example = 1)]
    pub page: Option<u32>,
    /// Items per page, 1-100 (default 50)
    #[param(example = 50)]
    pub page_size: Option<u32>,
}

#[derive(Serialize, ToSchema)]
pub struct TodoListResponse {
    pub todos: Vec<TodoResponse>,
    pub total: i64,
    pub page: u32,
    pub page_size: u32,
    pub total_pages: u32,
}

// =============================================================================
// Handlers
// =============================================================================

fn validate_title(title: &str) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(bad_request("Title must not be empty"));
    }
    if trimmed.chars().count() > MAX_TITLE_LEN {
        return Err(bad_request("Title must be 500 characters or less"));
    }
    Ok(())
}

fn validate_description(
    description: Option<&str>,
) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if let Some(d) = description
        && d.chars().count() > MAX_DESCRIPTION_LEN
    {
        return Err(bad_request("Description must be 5000 characters or less"));
    }
    Ok(())
}

fn validate_due_date(due_date: Option<&str>) -> Result<(), (StatusCode, Json<ErrorResponse>)> {
    if let Some(d) = due_date
        && NaiveDate::parse_from_str(d, "%Y-%m-%d").is_err()
    {
        return Err(bad_request("Due date must be in YYYY-MM-DD format"));
    }
    Ok(())
}

/// Create a todo
#[utoipa::path(
    post,
    path = "/api/v1/todos",
    tag = "todos",
    request_body = CreateTodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, req))]
pub async fn create_todo(
    user: CurrentUser,
    State(state): State<AppState>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<TodoResponse>), (StatusCode, Json<ErrorResponse>)> {
    validate_title(&req.title)?;
    validate_description(req.description.as_deref())?;
    validate_due_date(req.due_date.as_deref())?;

    let todo = state
        .db()
        .todos()
        .create(
            user.id,
            &NewTodo {
                title: req.title,
                description: req.description,
                priority: req.priority,
                due_date: req.due_date,
                tag_ids: req.tag_ids,
            },
        )
        .await
        .map_err(internal_error)?;

    Ok((StatusCode::CREATED, Json(TodoResponse::from(todo))))
}

/// List todos
///
/// Filter, search, sort, and paginate over the caller's own todos.
#[utoipa::path(
    get,
    path = "/api/v1/todos",
    tag = "todos",
    params(ListTodosQuery),
    responses(
        (status = 200, description = "Paginated list of todos", body = TodoListResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn list_todos(
    user: CurrentUser,
    State(state): State<AppState>,
    Query(query): Query<ListTodosQuery>,
) -> Result<Json<TodoListResponse>, (StatusCode, Json<ErrorResponse>)> {
    let page = query.page.unwrap_or(1);
    if page < 1 {
        return Err(bad_request("Page must be 1 or greater"));
    }
    let page_size = query.page_size.unwrap_or(50);
    if !(1..=MAX_PAGE_SIZE).contains(&page_size) {
        return Err(bad_request("Page size must be between 1 and 100"));
    }
    if let Some(search) = query.search.as_deref()
        && search.chars().count() > MAX_SEARCH_LEN
    {
        return Err(bad_request("Search term must be 500 characters or less"));
    }

    // Anything other than an explicit "asc" sorts descending.
    let sort_order = match query.sort_order.as_deref() {
        Some("asc") => SortOrder::Asc,
        _ => SortOrder::Desc,
    };

    let result = state
        .db()
        .todos()
        .list(
            user.id,
            &TodoQuery {
                completed: query.completed,
                search: query.search,
                sort_order,
                page,
                page_size,
            },
        )
        .await
        .map_err(internal_error)?;

    let total_pages = ((result.total as u64).div_ceil(page_size as u64) as u32).max(1);

    Ok(Json(TodoListResponse {
        todos: result.items.into_iter().map(TodoResponse::from).collect(),
        total: result.total,
        page,
        page_size,
        total_pages,
    }))
}

/// Get a todo by id
#[utoipa::path(
    get,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo ID")),
    responses(
        (status = 200, description = "Todo found", body = TodoResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn get_todo(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<TodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    let todo = state
        .db()
        .todos()
        .get(user.id, id)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Todo not found"))?;

    Ok(Json(TodoResponse::from(todo)))
}

/// Update a todo
///
/// Partial update: only supplied fields change. Supplying `tag_ids`
/// replaces the full tag set.
#[utoipa::path(
    put,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo ID")),
    request_body = UpdateTodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Validation failure", body = ErrorResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state, req))]
pub async fn update_todo(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoRequest>,
) -> Result<Json<TodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    if let Some(title) = &req.title {
        validate_title(title)?;
    }
    validate_description(req.description.as_deref())?;
    validate_due_date(req.due_date.as_deref())?;

    let todo = state
        .db()
        .todos()
        .update(
            user.id,
            id,
            &TodoChanges {
                title: req.title,
                description: req.description,
                completed: req.completed,
                priority: req.priority,
                due_date: req.due_date,
                tag_ids: req.tag_ids,
            },
        )
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Todo not found"))?;

    Ok(Json(TodoResponse::from(todo)))
}

/// Set a todo's completion status
#[utoipa::path(
    patch,
    path = "/api/v1/todos/{id}/status",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo ID")),
    request_body = UpdateTodoStatusRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn update_todo_status(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTodoStatusRequest>,
) -> Result<Json<TodoResponse>, (StatusCode, Json<ErrorResponse>)> {
    let todo = state
        .db()
        .todos()
        .update(
            user.id,
            id,
            &TodoChanges {
                completed: Some(req.completed),
                ..Default::default()
            },
        )
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("Todo not found"))?;

    Ok(Json(TodoResponse::from(todo)))
}

/// Delete a todo
#[utoipa::path(
    delete,
    path = "/api/v1/todos/{id}",
    tag = "todos",
    params(("id" = Uuid, Path, description = "Todo ID")),
    responses(
        (status = 204, description = "Todo deleted"),
        (status = 401, description = "Not authenticated", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
#[instrument(skip(state))]
pub async fn delete_todo(
    user: CurrentUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, Json<ErrorResponse>)> {
    let deleted = state
        .db()
        .todos()
        .delete(user.id, id)
        .await
        .map_err(internal_error)?;

    if !deleted {
        return Err(not_found("Todo not found"));
    }

    Ok(StatusCode::NO_CONTENT)
}
