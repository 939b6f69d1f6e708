mod catalogue;
mod execution;
mod instructions;

use std::sync::Arc;

use crate::application::tooling::ToolServerInterface;

pub use execution::{ToolExecution, extract_tool_message};

/// Bridges the agent loop to the MCP servers of one transport client.
pub struct ToolRuntime {
    servers: Vec<String>,
    bridge: Arc<dyn ToolServerInterface>,
}

impl ToolRuntime {
    pub fn new(servers: Vec<String>, bridge: Arc<dyn ToolServerInterface>) -> Self {
        Self { servers, bridge }
    }
}
