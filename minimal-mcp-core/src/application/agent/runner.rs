use super::errors::AgentError;
use super::models::{AgentOptions, AgentOutcome, AgentStep};
use super::runtime::ToolRuntime;
use crate::application::client::McpClient;
use crate::model::{ModelProvider, ModelRequest};
use crate::types::ChatMessage;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Tool-calling agent bound to one model and one transport client.
pub struct Agent<P: ModelProvider> {
    provider: P,
    client: Arc<McpClient>,
    runtime: ToolRuntime,
    options: AgentOptions,
}

impl<P: ModelProvider> Agent<P> {
    pub fn new(provider: P, client: Arc<McpClient>, max_steps: usize) -> Self {
        Self::with_options(provider, client, AgentOptions::with_max_steps(max_steps))
    }

    pub fn with_options(provider: P, client: Arc<McpClient>, options: AgentOptions) -> Self {
        let runtime = ToolRuntime::new(client.server_names(), client.server_bridge());
        Self {
            provider,
            client,
            runtime,
            options,
        }
    }

    pub fn max_steps(&self) -> usize {
        self.options.max_steps
    }

    pub fn client(&self) -> &Arc<McpClient> {
        &self.client
    }

    /// Run one instruction and return the model's final text.
    pub async fn run(&self, instruction: &str) -> Result<String, AgentError> {
        self.execute(instruction).await.map(|outcome| outcome.response)
    }

    /// Run one instruction and return the final text with every tool step.
    pub async fn execute(&self, instruction: &str) -> Result<AgentOutcome, AgentError> {
        let session_id = Uuid::new_v4().to_string();
        let max_steps = self.options.max_steps;
        info!(
            session_id = session_id.as_str(),
            provider = self.provider.name(),
            max_steps,
            "Agent run started"
        );

        let catalogue = self.runtime.discover().await?;
        let tools = catalogue.specs();
        let mut logs = vec![format!(
            "Discovered {} tool(s) on {} server(s)",
            tools.len(),
            self.client.server_names().len()
        )];

        let instructions = self.runtime.compose_system_instructions(&catalogue);
        let system_prompt = match self.options.system_prompt.as_deref() {
            Some(existing) if !existing.trim().is_empty() => {
                format!("{}\n\n{instructions}", existing.trim())
            }
            _ => instructions,
        };

        logs.push(format!("Initial agent request: {}", summarise(instruction)));
        let mut messages = vec![
            ChatMessage::system(system_prompt),
            ChatMessage::user(instruction),
        ];
        let mut steps = Vec::new();

        for step in 1..=max_steps {
            debug!(
                session_id = session_id.as_str(),
                step,
                max_steps,
                "Submitting agent turn to model provider"
            );
            let response = self
                .provider
                .chat(ModelRequest {
                    messages: messages.clone(),
                    tools: tools.clone(),
                })
                .await?;
            let reply = response.message;

            if !reply.has_tool_calls() {
                info!(
                    session_id = session_id.as_str(),
                    step,
                    "Agent returned final response"
                );
                logs.push(format!("Agent final answer: {}", summarise(&reply.content)));
                return Ok(AgentOutcome {
                    session_id,
                    response: reply.content,
                    steps,
                    logs,
                });
            }

            let calls = reply.tool_calls.clone();
            messages.push(reply);
            for call in &calls {
                info!(tool = %call.name, step, "Agent requested tool execution");
                let execution = self.runtime.execute(&catalogue, call).await?;
                let observation = execution.observation();
                logs.push(format!(
                    "Tool '{}' executed (success: {}): {}",
                    execution.tool,
                    execution.success,
                    summarise(&observation)
                ));
                messages.push(ChatMessage::tool(call.id.clone(), observation));
                steps.push(AgentStep {
                    tool: execution.tool,
                    input: execution.input,
                    success: execution.success,
                    output: execution.output,
                    message: execution.message,
                });
            }
        }

        warn!(
            session_id = session_id.as_str(),
            max_steps, "Agent exceeded the reasoning-step budget"
        );
        Err(AgentError::StepLimitExceeded { max_steps })
    }
}

/// Single-line preview of `text` for logs.
fn summarise(text: &str) -> String {
    const SNIPPET_LIMIT: usize = 160;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return "(empty)".to_string();
    }
    let single_line = trimmed.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut chars = single_line.chars();
    let mut result: String = chars.by_ref().take(SNIPPET_LIMIT).collect();
    if chars.next().is_some() {
        result.push('…');
    }
    result
}
