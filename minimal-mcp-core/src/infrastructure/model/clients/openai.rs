//! OpenAI-compatible client implementation

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::base::{HttpClientBase, resolve_api_key};
use crate::config::ModelProviderConfig;
use crate::constants::DEFAULT_OPENAI_API_PATH;
use crate::infrastructure::model::adapter::MessageAdapter;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};
use crate::types::ChatMessage;

/// OpenAI-compatible chat completions client with function calling
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
    api_path: String,
    model: String,
}

impl OpenAIClient {
    /// Build the client, failing fast when the API key cannot be resolved.
    pub fn from_config(config: &ModelProviderConfig) -> Result<Self, ModelError> {
        let api_key = resolve_api_key(&config.id, config.api_key.as_deref());
        let base = HttpClientBase::new(config.id.clone(), config.endpoint.clone(), api_key);
        base.require_api_key()?;
        Ok(Self {
            base,
            api_path: config
                .api_path
                .clone()
                .unwrap_or_else(|| DEFAULT_OPENAI_API_PATH.to_string()),
            model: config.model.clone(),
        })
    }

    /// OpenAI client configured from `OPENAI_API_KEY` / `OPENAI_BASE_URL`.
    pub fn from_env(model: impl Into<String>) -> Result<Self, ModelError> {
        Self::from_config(&ModelProviderConfig::openai(model))
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    fn name(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        let url = self.base.build_url(&self.api_path);

        let payload = OpenAIRequest {
            model: self.model.clone(),
            messages: MessageAdapter::to_openai_format(&request.messages),
            tools: MessageAdapter::tools_to_openai(&request.tools),
            stream: false,
        };

        info!(
            provider = self.base.id.as_str(),
            model = self.model.as_str(),
            messages = request.messages.len(),
            tools = request.tools.len(),
            "Sending request to OpenAI-compatible provider"
        );

        let response: OpenAIResponse = self.base.post_with_bearer(&url, &payload).await?;

        let message = response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message)
            .ok_or_else(|| ModelError::invalid_response(&self.base.id, "missing message"))?;

        let tool_calls: Vec<_> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| {
                MessageAdapter::tool_call_from_openai(
                    call.id,
                    call.function.name,
                    &call.function.arguments,
                )
            })
            .collect();
        let content = message.content.unwrap_or_default();
        if content.trim().is_empty() && tool_calls.is_empty() {
            return Err(ModelError::invalid_response(
                &self.base.id,
                "response has neither content nor tool calls",
            ));
        }
        debug!(
            tool_calls = tool_calls.len(),
            "Received response from OpenAI-compatible provider"
        );

        Ok(ModelResponse::new(ChatMessage::assistant(content, tool_calls)))
    }
}

#[derive(Serialize)]
struct OpenAIRequest {
    model: String,
    messages: Vec<Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    stream: bool,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: Option<OpenAIMessage>,
}

#[derive(Deserialize)]
struct OpenAIMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<OpenAIToolCall>>,
}

#[derive(Deserialize)]
struct OpenAIToolCall {
    id: String,
    function: OpenAIFunctionCall,
}

#[derive(Deserialize)]
struct OpenAIFunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}
