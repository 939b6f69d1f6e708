//! The launcher scenario: one fixed instruction against the companion server.

use crate::application::agent::{Agent, AgentError};
use crate::application::client::McpClient;
use crate::config::{ConfigError, ensure_env_loaded};
use crate::constants::{COMPANION_BINARY, COMPANION_SERVER_NAME, LAUNCHER_MAX_STEPS, LAUNCHER_MODEL};
use crate::model::{ModelError, ModelProvider, OpenAIClient};
use serde_json::{Map, Value, json};
use std::env;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// The instruction sent on every run.
pub const INSTRUCTION: &str = "Please calculate the sum of 42 and 58, reverse the string 'Hello MCP', and get the current time";

#[derive(Debug, Error)]
pub enum LaunchError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Path of the companion server: the executable next to the current one.
pub fn companion_server_path() -> io::Result<PathBuf> {
    let exe = env::current_exe()?;
    let dir = exe
        .parent()
        .ok_or_else(|| io::Error::other("launcher executable has no parent directory"))?;
    Ok(dir.join(format!("{COMPANION_BINARY}{}", env::consts::EXE_SUFFIX)))
}

/// Transport descriptor with the single companion entry.
pub fn transport_descriptor(server_path: &str) -> Value {
    let mut servers = Map::new();
    servers.insert(
        COMPANION_SERVER_NAME.to_string(),
        json!({
            "command": server_path,
            "args": []
        }),
    );
    json!({ "mcpServers": servers })
}

/// Load the environment, wire client, model and agent, run, print the result.
pub async fn run() -> Result<(), LaunchError> {
    ensure_env_loaded();

    let server_path = companion_server_path()?;
    info!(path = %server_path.display(), "Using companion MCP server");
    let config = transport_descriptor(&server_path.to_string_lossy());

    let client = Arc::new(McpClient::from_dict(config)?);
    let llm = OpenAIClient::from_env(LAUNCHER_MODEL)?;

    let mut stdout = io::stdout();
    run_scenario(llm, client, &mut stdout).await?;
    Ok(())
}

/// Run [`INSTRUCTION`] through an agent and write `Result: <text>` to `out`.
///
/// Child processes are stopped before returning, whatever the outcome.
pub async fn run_scenario<P, W>(
    provider: P,
    client: Arc<McpClient>,
    out: &mut W,
) -> Result<String, LaunchError>
where
    P: ModelProvider,
    W: Write,
{
    let agent = Agent::new(provider, client.clone(), LAUNCHER_MAX_STEPS);
    let outcome = agent.run(INSTRUCTION).await;
    client.close().await;

    let result = outcome?;
    writeln!(out, "\nResult: {result}")?;
    out.flush()?;
    Ok(result)
}
