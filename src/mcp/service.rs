//! MCP Streamable HTTP service creation.

use std::sync::Arc;

use rmcp::transport::streamable_http_server::{
    StreamableHttpServerConfig, StreamableHttpService, session::local::LocalSessionManager,
};
use tokio_util::sync::CancellationToken;

use crate::db::SqliteDatabase;

use super::server::McpServer;

/// Create the MCP Streamable HTTP service for nesting into the axum
/// router. A fresh [`McpServer`] is created per session; all sessions
/// share the connection pool.
pub fn create_mcp_service(
    db: Arc<SqliteDatabase>,
    cancellation_token: CancellationToken,
) -> StreamableHttpService<McpServer, LocalSessionManager> {
    let service_factory = move || -> Result<McpServer, std::io::Error> {
        Ok(McpServer::new(Arc::clone(&db)))
    };

    let mut config = StreamableHttpServerConfig::default();
    config.sse_keep_alive = None;
    config.sse_retry = None;
    config.stateful_mode = true;
    config.cancellation_token = cancellation_token;

    StreamableHttpService::new(
        service_factory,
        LocalSessionManager::default().into(),
        config,
    )
}
