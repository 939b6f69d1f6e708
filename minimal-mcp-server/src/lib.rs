//! Minimal MCP server
//!
//! Three tools served over stdio with newline-delimited JSON-RPC 2.0:
//! `calculate_sum`, `reverse_string` and `get_current_time`.

pub mod rpc;
pub mod server;
pub mod tools;

pub use server::{McpServer, ServerError, serve};
pub use tools::{Tool, ToolCallError};

pub const SERVER_NAME: &str = "minimal-mcp-server";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
pub const PROTOCOL_VERSION: &str = "2025-06-18";
