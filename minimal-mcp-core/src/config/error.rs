use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur when loading or validating the transport descriptor
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("configuration file not found at {path:?}")]
    NotFound { path: PathBuf },

    #[error("failed to read config from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse transport descriptor: {source}")]
    Parse {
        #[source]
        source: serde_json::Error,
    },

    #[error("no MCP servers configured - 'mcpServers' needs at least one entry")]
    NoServersConfigured,

    #[error("MCP server '{server}' is missing required field 'command'")]
    MissingCommand { server: String },

    #[error("MCP server '{server}' uses an HTTP transport, only stdio servers are supported")]
    UnsupportedTransport { server: String },
}
