// Launcher smoke tests - failure paths that need neither a model nor a server

use async_trait::async_trait;
use minimal_mcp_core::agent::{AgentError, ToolError};
use minimal_mcp_core::client::McpClient;
use minimal_mcp_core::launcher::{
    INSTRUCTION, LaunchError, companion_server_path, run_scenario, transport_descriptor,
};
use minimal_mcp_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse, OpenAIClient};
use minimal_mcp_core::tooling::ToolInvokeError;
use minimal_mcp_core::types::ChatMessage;
use serde_json::json;
use serial_test::serial;
use std::env;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::tempdir;

struct CountingProvider {
    calls: Arc<AtomicUsize>,
}

#[async_trait]
impl ModelProvider for CountingProvider {
    fn name(&self) -> &str {
        "counting"
    }

    async fn chat(&self, _request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(ModelResponse::new(ChatMessage::assistant("unreachable", vec![])))
    }
}

#[test]
fn instruction_is_fixed() {
    assert_eq!(
        INSTRUCTION,
        "Please calculate the sum of 42 and 58, reverse the string 'Hello MCP', and get the current time"
    );
}

#[test]
fn descriptor_has_single_companion_entry() {
    let descriptor = transport_descriptor("/opt/bin/minimal-mcp-server");
    assert_eq!(
        descriptor,
        json!({
            "mcpServers": {
                "minimal-server": { "command": "/opt/bin/minimal-mcp-server", "args": [] }
            }
        })
    );
}

#[test]
fn companion_sits_next_to_the_running_executable() {
    let path = companion_server_path().expect("current exe resolves");
    let exe = env::current_exe().expect("current exe");
    assert_eq!(path.parent(), exe.parent());
    let file_name = path.file_name().and_then(|name| name.to_str()).expect("file name");
    assert!(file_name.starts_with("minimal-mcp-server"));
}

#[tokio::test]
async fn missing_server_fails_before_printing() {
    let dir = tempdir().expect("tempdir");
    let missing = dir.path().join("minimal-mcp-server");
    let client = Arc::new(
        McpClient::from_dict(transport_descriptor(&missing.to_string_lossy())).expect("config"),
    );
    let calls = Arc::new(AtomicUsize::new(0));
    let provider = CountingProvider {
        calls: calls.clone(),
    };

    let mut out = Vec::new();
    let err = run_scenario(provider, client, &mut out)
        .await
        .expect_err("spawn fails");

    match err {
        LaunchError::Agent(AgentError::Tool(ToolError::Discovery { server, source })) => {
            assert_eq!(server, "minimal-server");
            assert!(matches!(source, ToolInvokeError::Spawn { .. }), "{source}");
        }
        other => panic!("expected discovery failure, got {other:?}"),
    }
    assert!(out.is_empty());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[test]
#[serial]
fn missing_credentials_fail_before_any_request() {
    let saved = env::var("OPENAI_API_KEY").ok();
    // SAFETY: tests touching the environment are serialized.
    unsafe { env::remove_var("OPENAI_API_KEY") };

    let result = OpenAIClient::from_env("gpt-4o-mini");
    assert!(matches!(result, Err(ModelError::MissingApiKey { .. })));

    if let Some(value) = saved {
        unsafe { env::set_var("OPENAI_API_KEY", value) };
    }
}
