//! # Transport descriptor
//!
//! Maps server names to the command that launches them:
//!
//! ```json
//! {
//!   "mcpServers": {
//!     "minimal-server": { "command": "./minimal-mcp-server", "args": [] }
//!   }
//! }
//! ```

use super::error::ConfigError;
use super::server::{RawServer, ServerConfig};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportConfig {
    servers: BTreeMap<String, ServerConfig>,
}

#[derive(Debug, Deserialize)]
struct RawTransport {
    #[serde(rename = "mcpServers", default)]
    mcp_servers: BTreeMap<String, RawServer>,
}

impl TransportConfig {
    /// Build from an in-memory JSON value.
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawTransport =
            serde_json::from_value(value).map_err(|source| ConfigError::Parse { source })?;
        Self::from_raw(raw)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawTransport =
            serde_json::from_str(content).map_err(|source| ConfigError::Parse { source })?;
        Self::from_raw(raw)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        super::loader::load_transport_file(path)
    }

    /// Build directly from already-resolved server entries.
    pub fn from_servers(servers: Vec<ServerConfig>) -> Result<Self, ConfigError> {
        if servers.is_empty() {
            return Err(ConfigError::NoServersConfigured);
        }
        Ok(Self {
            servers: servers
                .into_iter()
                .map(|server| (server.name.clone(), server))
                .collect(),
        })
    }

    fn from_raw(raw: RawTransport) -> Result<Self, ConfigError> {
        if raw.mcp_servers.is_empty() {
            return Err(ConfigError::NoServersConfigured);
        }
        let servers = raw
            .mcp_servers
            .into_iter()
            .map(|(name, entry)| {
                ServerConfig::from_raw(name.clone(), entry).map(|server| (name, server))
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        Ok(Self { servers })
    }

    /// Server names in discovery order.
    pub fn server_names(&self) -> Vec<String> {
        self.servers.keys().cloned().collect()
    }

    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    pub fn servers(&self) -> impl Iterator<Item = &ServerConfig> {
        self.servers.values()
    }
}
