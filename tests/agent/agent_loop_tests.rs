// Agent loop tests - scripted model against an in-memory tool bridge
//
// No processes or network: the bridge answers tool calls from a table
// and the provider replays canned assistant messages.

use async_trait::async_trait;
use minimal_mcp_core::ServerConfig;
use minimal_mcp_core::TransportConfig;
use minimal_mcp_core::agent::{Agent, AgentError, AgentOptions, ToolError};
use minimal_mcp_core::client::McpClient;
use minimal_mcp_core::model::{ModelError, ModelProvider, ModelRequest, ModelResponse};
use minimal_mcp_core::tooling::{ServerToolInfo, ToolInvokeError, ToolServerInterface};
use minimal_mcp_core::types::{ChatMessage, MessageRole, ToolCall};
use serde_json::{Value, json};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

// ============================================================================
// Stubs
// ============================================================================

#[derive(Default)]
struct StubBridge {
    tools: HashMap<String, Vec<ServerToolInfo>>,
    instructions: HashMap<String, String>,
    failing_servers: Vec<String>,
    calls: Mutex<Vec<(String, String, Value)>>,
    shutdowns: Mutex<usize>,
}

impl StubBridge {
    fn with_tools(mut self, server: &str, names: &[&str]) -> Self {
        let tools = names
            .iter()
            .map(|name| ServerToolInfo {
                name: (*name).to_string(),
                description: Some(format!("{name} tool")),
                input_schema: Some(json!({"type": "object"})),
            })
            .collect();
        self.tools.insert(server.to_string(), tools);
        self
    }

    fn calls(&self) -> Vec<(String, String, Value)> {
        self.calls.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ToolServerInterface for StubBridge {
    async fn list_tools(&self, server: &str) -> Result<Vec<ServerToolInfo>, ToolInvokeError> {
        if self.failing_servers.iter().any(|name| name == server) {
            return Err(ToolInvokeError::Terminated {
                server: server.to_string(),
            });
        }
        Ok(self.tools.get(server).cloned().unwrap_or_default())
    }

    async fn invoke_tool(
        &self,
        server: &str,
        tool: &str,
        arguments: Value,
    ) -> Result<Value, ToolInvokeError> {
        self.calls
            .lock()
            .expect("lock")
            .push((server.to_string(), tool.to_string(), arguments.clone()));
        match tool {
            "calculate_sum" => {
                let a = arguments["a"].as_f64().unwrap_or_default();
                let b = arguments["b"].as_f64().unwrap_or_default();
                Ok(json!({
                    "content": [{"type": "text", "text": format!("The sum of {a} and {b} is {}", a + b)}],
                    "isError": false
                }))
            }
            "explode" => Ok(json!({
                "content": [{"type": "text", "text": "kaboom"}],
                "isError": true
            })),
            "disconnect" => Err(ToolInvokeError::Terminated {
                server: server.to_string(),
            }),
            _ => Ok(json!({"content": [{"type": "text", "text": "ok"}]})),
        }
    }

    async fn server_instructions(&self, server: &str) -> Option<String> {
        self.instructions.get(server).cloned()
    }

    async fn shutdown(&self) {
        *self.shutdowns.lock().expect("lock") += 1;
    }
}

struct ScriptedProvider {
    replies: Mutex<VecDeque<ChatMessage>>,
    requests: Arc<Mutex<Vec<ModelRequest>>>,
}

impl ScriptedProvider {
    fn new(replies: Vec<ChatMessage>) -> (Self, Arc<Mutex<Vec<ModelRequest>>>) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let provider = Self {
            replies: Mutex::new(replies.into()),
            requests: requests.clone(),
        };
        (provider, requests)
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        self.requests.lock().expect("lock").push(request);
        let next = self.replies.lock().expect("lock").pop_front();
        next.map(ModelResponse::new)
            .ok_or_else(|| ModelError::invalid_response("scripted", "script exhausted"))
    }
}

fn call(id: &str, name: &str, arguments: Value) -> ToolCall {
    ToolCall {
        id: id.to_string(),
        name: name.to_string(),
        arguments,
    }
}

fn client_for(bridge: Arc<StubBridge>, servers: &[&str]) -> Arc<McpClient> {
    let config = TransportConfig::from_servers(
        servers
            .iter()
            .map(|name| ServerConfig::new(*name, format!("/bin/{name}")))
            .collect(),
    )
    .expect("servers");
    Arc::new(McpClient::with_bridge(config, bridge))
}

// ============================================================================
// Tests
// ============================================================================

#[tokio::test]
async fn returns_text_when_model_needs_no_tools() {
    let bridge = Arc::new(StubBridge::default().with_tools("math", &["calculate_sum"]));
    let (provider, requests) = ScriptedProvider::new(vec![ChatMessage::assistant("hello", vec![])]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["math"]), 3);

    let answer = agent.run("say hello").await.expect("final answer");
    assert_eq!(answer, "hello");
    assert!(bridge.calls().is_empty());

    let requests = requests.lock().expect("lock");
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].messages[0].role, MessageRole::System);
    assert_eq!(requests[0].messages[1].content, "say hello");
    assert_eq!(requests[0].tools.len(), 1);
    assert_eq!(requests[0].tools[0].name, "calculate_sum");
}

#[tokio::test]
async fn feeds_tool_results_back_to_the_model() {
    let bridge = Arc::new(StubBridge::default().with_tools("math", &["calculate_sum"]));
    let (provider, requests) = ScriptedProvider::new(vec![
        ChatMessage::assistant("", vec![call("c1", "calculate_sum", json!({"a": 42, "b": 58}))]),
        ChatMessage::assistant("The answer is 100", vec![]),
    ]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["math"]), 5);

    let outcome = agent.execute("add").await.expect("outcome");
    assert_eq!(outcome.response, "The answer is 100");
    assert_eq!(outcome.steps.len(), 1);
    assert!(outcome.steps[0].success);
    assert!(!outcome.session_id.is_empty());

    let calls = bridge.calls();
    assert_eq!(calls, vec![(
        "math".to_string(),
        "calculate_sum".to_string(),
        json!({"a": 42, "b": 58})
    )]);

    let requests = requests.lock().expect("lock");
    let second = &requests[1].messages;
    let tool_reply = second.last().expect("tool reply");
    assert_eq!(tool_reply.role, MessageRole::Tool);
    assert_eq!(tool_reply.tool_call_id.as_deref(), Some("c1"));
    assert_eq!(tool_reply.content, "The sum of 42 and 58 is 100");
    assert!(second[second.len() - 2].has_tool_calls());
}

#[tokio::test]
async fn executes_every_call_in_one_turn_in_order() {
    let bridge = Arc::new(
        StubBridge::default()
            .with_tools("a-server", &["calculate_sum"])
            .with_tools("b-server", &["reverse_string", "get_current_time"]),
    );
    let (provider, _) = ScriptedProvider::new(vec![
        ChatMessage::assistant(
            "",
            vec![
                call("c1", "calculate_sum", json!({"a": 1, "b": 2})),
                call("c2", "reverse_string", json!({"text": "abc"})),
                call("c3", "get_current_time", Value::Null),
            ],
        ),
        ChatMessage::assistant("done", vec![]),
    ]);
    let agent = Agent::new(
        provider,
        client_for(bridge.clone(), &["a-server", "b-server"]),
        2,
    );

    let outcome = agent.execute("all three").await.expect("outcome");
    assert_eq!(outcome.response, "done");

    let routed: Vec<(String, String)> = bridge
        .calls()
        .into_iter()
        .map(|(server, tool, _)| (server, tool))
        .collect();
    assert_eq!(
        routed,
        vec![
            ("a-server".to_string(), "calculate_sum".to_string()),
            ("b-server".to_string(), "reverse_string".to_string()),
            ("b-server".to_string(), "get_current_time".to_string()),
        ]
    );
    assert_eq!(bridge.calls()[2].2, json!({}));
}

#[tokio::test]
async fn unknown_tool_is_reported_to_the_model() {
    let bridge = Arc::new(StubBridge::default().with_tools("math", &["calculate_sum"]));
    let (provider, requests) = ScriptedProvider::new(vec![
        ChatMessage::assistant("", vec![call("c1", "divide", json!({}))]),
        ChatMessage::assistant("sorry", vec![]),
    ]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["math"]), 3);

    let outcome = agent.execute("divide").await.expect("outcome");
    assert_eq!(outcome.response, "sorry");
    assert!(!outcome.steps[0].success);
    assert!(bridge.calls().is_empty());

    let requests = requests.lock().expect("lock");
    let observation = &requests[1].messages.last().expect("reply").content;
    assert!(observation.starts_with("Error: divide is not a valid tool"), "{observation}");
    assert!(observation.contains("calculate_sum"));
}

#[tokio::test]
async fn tool_error_results_become_error_observations() {
    let bridge = Arc::new(StubBridge::default().with_tools("s", &["explode"]));
    let (provider, requests) = ScriptedProvider::new(vec![
        ChatMessage::assistant("", vec![call("c1", "explode", json!({}))]),
        ChatMessage::assistant("it failed", vec![]),
    ]);
    let agent = Agent::new(provider, client_for(bridge, &["s"]), 3);

    agent.run("explode").await.expect("final answer");
    let requests = requests.lock().expect("lock");
    assert_eq!(requests[1].messages.last().expect("reply").content, "Error: kaboom");
}

#[tokio::test]
async fn non_object_arguments_are_rejected_without_invoking() {
    let bridge = Arc::new(StubBridge::default().with_tools("s", &["reverse_string"]));
    let (provider, _) = ScriptedProvider::new(vec![
        ChatMessage::assistant("", vec![call("c1", "reverse_string", json!("not json"))]),
        ChatMessage::assistant("retry later", vec![]),
    ]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["s"]), 3);

    let outcome = agent.execute("reverse").await.expect("outcome");
    assert!(!outcome.steps[0].success);
    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn fails_when_step_budget_is_exhausted() {
    let bridge = Arc::new(StubBridge::default().with_tools("s", &["ping"]));
    let looping: Vec<_> = (0..5)
        .map(|i| ChatMessage::assistant("", vec![call(&format!("c{i}"), "ping", json!({}))]))
        .collect();
    let (provider, requests) = ScriptedProvider::new(looping);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["s"]), 2);

    let err = agent.run("loop forever").await.expect_err("budget exceeded");
    assert!(matches!(err, AgentError::StepLimitExceeded { max_steps: 2 }));
    assert_eq!(requests.lock().expect("lock").len(), 2);
    assert_eq!(bridge.calls().len(), 2);
}

#[tokio::test]
async fn zero_step_budget_fails_without_calling_the_model() {
    let bridge = Arc::new(StubBridge::default().with_tools("s", &["ping"]));
    let (provider, requests) = ScriptedProvider::new(vec![ChatMessage::assistant("never", vec![])]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["s"]), 0);

    let err = agent.run("anything").await.expect_err("no budget");
    assert!(matches!(err, AgentError::StepLimitExceeded { max_steps: 0 }));
    assert!(requests.lock().expect("lock").is_empty());
    assert!(bridge.calls().is_empty());
}

#[tokio::test]
async fn discovery_failure_aborts_before_the_model_is_called() {
    let bridge = Arc::new(StubBridge {
        failing_servers: vec!["broken".to_string()],
        ..StubBridge::default()
    });
    let (provider, requests) = ScriptedProvider::new(vec![ChatMessage::assistant("x", vec![])]);
    let agent = Agent::new(provider, client_for(bridge, &["broken"]), 3);

    let err = agent.run("anything").await.expect_err("discovery fails");
    match err {
        AgentError::Tool(ToolError::Discovery { server, .. }) => assert_eq!(server, "broken"),
        other => panic!("expected discovery error, got {other:?}"),
    }
    assert!(requests.lock().expect("lock").is_empty());
}

#[tokio::test]
async fn transport_failure_during_a_call_is_an_error() {
    let bridge = Arc::new(StubBridge::default().with_tools("s", &["disconnect"]));
    let (provider, _) = ScriptedProvider::new(vec![ChatMessage::assistant(
        "",
        vec![call("c1", "disconnect", json!({}))],
    )]);
    let agent = Agent::new(provider, client_for(bridge, &["s"]), 3);

    let err = agent.run("go").await.expect_err("transport failure");
    assert!(matches!(
        err,
        AgentError::Tool(ToolError::Execution { ref tool, .. }) if tool == "disconnect"
    ));
}

#[tokio::test]
async fn model_failure_propagates() {
    let bridge = Arc::new(StubBridge::default());
    let (provider, _) = ScriptedProvider::new(Vec::new());
    let agent = Agent::new(provider, client_for(bridge, &["empty"]), 3);

    let err = agent.run("anything").await.expect_err("model error");
    assert!(matches!(err, AgentError::Model(ModelError::InvalidResponse { .. })));
}

#[tokio::test]
async fn duplicate_tool_names_route_to_first_server() {
    let bridge = Arc::new(
        StubBridge::default()
            .with_tools("alpha", &["ping"])
            .with_tools("beta", &["ping"]),
    );
    let (provider, requests) = ScriptedProvider::new(vec![
        ChatMessage::assistant("", vec![call("c1", "ping", json!({}))]),
        ChatMessage::assistant("pong", vec![]),
    ]);
    let agent = Agent::new(provider, client_for(bridge.clone(), &["beta", "alpha"]), 3);

    agent.run("ping").await.expect("final answer");
    assert_eq!(bridge.calls()[0].0, "alpha");
    assert_eq!(requests.lock().expect("lock")[0].tools.len(), 1);
}

#[tokio::test]
async fn server_guidance_and_extra_prompt_reach_the_system_message() {
    let mut bridge = StubBridge::default().with_tools("math", &["calculate_sum"]);
    bridge
        .instructions
        .insert("math".to_string(), "Prefer integers.".to_string());
    let bridge = Arc::new(bridge);
    let (provider, requests) = ScriptedProvider::new(vec![ChatMessage::assistant("ok", vec![])]);
    let options = AgentOptions {
        system_prompt: Some("Be brief.".to_string()),
        max_steps: 1,
    };
    let agent = Agent::with_options(provider, client_for(bridge, &["math"]), options);

    agent.run("hi").await.expect("final answer");
    let requests = requests.lock().expect("lock");
    let system = &requests[0].messages[0].content;
    assert!(system.starts_with("Be brief."));
    assert!(system.contains("Server 'math' guidance: Prefer integers."));
    assert!(system.contains("- calculate_sum (server: math)"));
}

#[tokio::test]
async fn close_shuts_the_bridge_down() {
    let bridge = Arc::new(StubBridge::default());
    let client = client_for(bridge.clone(), &["s"]);
    client.close().await;
    client.close().await;
    assert_eq!(*bridge.shutdowns.lock().expect("lock"), 2);
}
