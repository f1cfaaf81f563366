//! HTTP API layer.

mod handlers;
pub(crate) mod routes;
mod state;
mod v1;

use std::net::IpAddr;

use axum::http::{HeaderValue, Method, header};
use miette::Diagnostic;
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::auth::AuthService;
use crate::db::SqliteDatabase;
use crate::mcp::create_mcp_service;

pub use handlers::ErrorResponse;
pub use state::AppState;

#[derive(Error, Diagnostic, Debug)]
pub enum ApiError {
    #[error("Failed to bind {addr}: {source}")]
    #[diagnostic(code(taskdeck::api::bind))]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Server error: {0}")]
    #[diagnostic(code(taskdeck::api::serve))]
    Serve(#[from] std::io::Error),

    #[error("Invalid CORS origin: {origin}")]
    #[diagnostic(code(taskdeck::api::cors))]
    InvalidCorsOrigin { origin: String },
}

/// API server configuration
pub struct Config {
    /// Host address to bind to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Allowed CORS origins; `*` allows any origin
    pub cors_origins: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".parse().unwrap(),
            port: 3000,
            cors_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

/// Initialize tracing subscriber with env filter
fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "taskdeck=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer, ApiError> {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    if origins.iter().any(|o| o == "*") {
        return Ok(layer.allow_origin(Any));
    }

    let values = origins
        .iter()
        .map(|o| {
            o.parse::<HeaderValue>().map_err(|_| ApiError::InvalidCorsOrigin {
                origin: o.clone(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(layer.allow_origin(AllowOrigin::list(values)))
}

/// Run the API server with the given configuration.
///
/// Serves the REST surface, the Scalar docs, and the MCP tool service
/// (nested at `/mcp`) from one router.
pub async fn run(config: Config, db: SqliteDatabase, auth: AuthService) -> Result<(), ApiError> {
    init_tracing();

    let state = AppState::new(db, auth);

    let cancellation_token = CancellationToken::new();
    let mcp_service = create_mcp_service(state.db_arc(), cancellation_token.clone());

    let app = routes::create_router(state)
        .nest_service("/mcp", mcp_service)
        .layer(cors_layer(&config.cors_origins)?)
        .layer(TraceLayer::new_for_http());

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|source| ApiError::Bind {
            addr: addr.clone(),
            source,
        })?;
    info!("API server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    cancellation_token.cancel();
    Ok(())
}
