use crate::application::tooling::ToolInvokeError;
use crate::model::ModelError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("agent stopped after reaching the maximum of {max_steps} reasoning steps")]
    StepLimitExceeded { max_steps: usize },
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("failed to discover tools on MCP server '{server}': {source}")]
    Discovery {
        server: String,
        #[source]
        source: ToolInvokeError,
    },
    #[error("failed to execute tool '{tool}': {source}")]
    Execution {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
}
