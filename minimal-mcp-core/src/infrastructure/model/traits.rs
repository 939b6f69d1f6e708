//! Model traits

use super::types::{ModelError, ModelRequest, ModelResponse};
use async_trait::async_trait;

/// A chat model that can answer with text or request tool calls
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Identifier used in logs
    fn name(&self) -> &str;

    /// Send a chat request to the model provider
    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError>;
}
