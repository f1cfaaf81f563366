//! MCP tool surface for assistant-driven task management.

mod server;
mod service;


pub use server::McpServer;
pub use service::create_mcp_service;
