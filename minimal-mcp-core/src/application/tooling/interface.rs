use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerToolInfo {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Option<Value>,
}

#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    /// Tools advertised by `server`, starting it if needed.
    async fn list_tools(&self, server: &str) -> Result<Vec<ServerToolInfo>, ToolInvokeError>;

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError>;

    async fn server_instructions(&self, server: &str) -> Option<String>;

    /// Stop every running server. Safe to call repeatedly.
    async fn shutdown(&self);
}
