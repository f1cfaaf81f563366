//! API route configuration.

use axum::Router;
use axum::routing::{delete, get, patch, post, put};
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_scalar::{Scalar, Servable};

use super::handlers::{self, ErrorResponse, HealthResponse, RootResponse};
use super::state::AppState;
use super::v1;

/// Registers the bearer token scheme referenced by the handler docs.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Taskdeck API",
        version = "0.3.0",
        description = "Multi-tenant todo API with JWT authentication",
        license(name = "GPL-2.0")
    ),
    paths(
        handlers::root,
        handlers::health,
        v1::register,
        v1::login,
        v1::create_todo,
        v1::list_todos,
        v1::get_todo,
        v1::update_todo,
        v1::update_todo_status,
        v1::delete_todo,
        v1::create_tag,
        v1::list_tags,
        v1::get_tag,
        v1::update_tag,
        v1::delete_tag,
    ),
    components(
        schemas(
            RootResponse,
            HealthResponse,
            ErrorResponse,
            v1::RegisterRequest,
            v1::LoginRequest,
            v1::UserResponse,
            v1::AuthResponse,
            v1::TodoResponse,
            v1::CreateTodoRequest,
            v1::UpdateTodoRequest,
            v1::UpdateTodoStatusRequest,
            v1::TodoListResponse,
            v1::TagResponse,
            v1::CreateTagRequest,
            v1::UpdateTagRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "system", description = "System health and status endpoints"),
        (name = "auth", description = "Registration and login"),
        (name = "todos", description = "Todo management endpoints"),
        (name = "tags", description = "Tag management endpoints")
    )
)]
pub struct ApiDoc;

/// Create the API router with OpenAPI documentation
pub fn create_router(state: AppState) -> Router {
    let api = ApiDoc::openapi();

    let system_routes = Router::new()
        .route("/", get(handlers::root))
        .route("/api/health", get(handlers::health));

    let auth_routes = Router::new()
        .route("/api/v1/auth/register", post(v1::register))
        .route("/api/v1/auth/login", post(v1::login));

    let todo_routes = Router::new()
        .route("/api/v1/todos", post(v1::create_todo))
        .route("/api/v1/todos", get(v1::list_todos))
        .route("/api/v1/todos/{id}", get(v1::get_todo))
        .route("/api/v1/todos/{id}", put(v1::update_todo))
        .route("/api/v1/todos/{id}/status", patch(v1::update_todo_status))
        .route("/api/v1/todos/{id}", delete(v1::delete_todo));

    let tag_routes = Router::new()
        .route("/api/v1/tags", post(v1::create_tag))
        .route("/api/v1/tags", get(v1::list_tags))
        .route("/api/v1/tags/{id}", get(v1::get_tag))
        .route("/api/v1/tags/{id}", put(v1::update_tag))
        .route("/api/v1/tags/{id}", delete(v1::delete_tag));

    system_routes
        .merge(auth_routes)
        .merge(todo_routes)
        .merge(tag_routes)
        .merge(Scalar::with_url("/docs", api))
        .with_state(state)
}
