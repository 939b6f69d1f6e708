use super::tooling::{ServerManager, ToolServerInterface};
use crate::config::{ConfigError, TransportConfig};
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Transport client: owns the configured MCP servers and their processes.
///
/// Construction never spawns anything; servers start on first use.
pub struct McpClient {
    config: TransportConfig,
    server_bridge: Arc<dyn ToolServerInterface>,
}

impl McpClient {
    pub fn from_config(config: TransportConfig) -> Self {
        let manager = Arc::new(ServerManager::new(config.servers().cloned().collect()));
        debug!(
            servers = ?config.server_names(),
            "Transport client configured"
        );
        Self {
            config,
            server_bridge: manager,
        }
    }

    /// Build from a `{"mcpServers": {...}}` JSON value.
    pub fn from_dict(value: Value) -> Result<Self, ConfigError> {
        TransportConfig::from_value(value).map(Self::from_config)
    }

    pub fn from_config_file(path: &Path) -> Result<Self, ConfigError> {
        TransportConfig::from_file(path).map(Self::from_config)
    }

    /// Use an alternative server bridge for the configured servers.
    pub fn with_bridge(config: TransportConfig, bridge: Arc<dyn ToolServerInterface>) -> Self {
        Self {
            config,
            server_bridge: bridge,
        }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn server_names(&self) -> Vec<String> {
        self.config.server_names()
    }

    pub fn server_bridge(&self) -> Arc<dyn ToolServerInterface> {
        self.server_bridge.clone()
    }

    /// Stop every server process started by this client.
    pub async fn close(&self) {
        info!("Closing MCP server sessions");
        self.server_bridge.shutdown().await;
    }
}
