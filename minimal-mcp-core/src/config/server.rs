use super::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::PathBuf;

/// Launch description of one stdio MCP server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub name: String,
    pub command: PathBuf,
    pub args: Vec<String>,
    pub env: HashMap<String, String>,
    pub workdir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>, command: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            env: HashMap::new(),
            workdir: None,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub(super) fn from_raw(name: String, raw: RawServer) -> Result<Self, ConfigError> {
        let command = match raw.command.as_deref().map(str::trim) {
            Some(command) if !command.is_empty() => command.to_string(),
            _ if raw.url.is_some() => {
                return Err(ConfigError::UnsupportedTransport { server: name });
            }
            _ => return Err(ConfigError::MissingCommand { server: name }),
        };

        Ok(Self {
            name,
            command: PathBuf::from(expand(&command)),
            args: raw.args.iter().map(|arg| expand(arg)).collect(),
            env: raw.env,
            workdir: raw.cwd.map(|dir| PathBuf::from(expand(&dir))),
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawServer {
    #[serde(default)]
    command: Option<String>,
    #[serde(default)]
    args: Vec<String>,
    #[serde(default)]
    env: HashMap<String, String>,
    #[serde(default, alias = "workdir")]
    cwd: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|cow| cow.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
