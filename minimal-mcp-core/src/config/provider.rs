//! # Provider Configuration
//!
//! Connection settings for the OpenAI-compatible chat completions API.
//! The API key is never stored here, only the name of the environment
//! variable that holds it.

use crate::constants::{DEFAULT_OPENAI_ENDPOINT, OPENAI_API_KEY_ENV, OPENAI_BASE_URL_ENV};
use std::env;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProviderConfig {
    /// Identifier used in logs and errors (e.g. "openai")
    pub id: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key: Option<String>,
    /// Custom API path override
    pub api_path: Option<String>,
    /// Model identifier used in API calls (e.g. "gpt-4o-mini")
    pub model: String,
}

impl ModelProviderConfig {
    /// OpenAI settings taken from the environment.
    ///
    /// `OPENAI_BASE_URL` overrides the endpoint when set and non-blank.
    pub fn openai(model: impl Into<String>) -> Self {
        let endpoint = env::var(OPENAI_BASE_URL_ENV)
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_OPENAI_ENDPOINT.to_string());
        Self {
            id: "openai".to_string(),
            endpoint,
            api_key: Some(OPENAI_API_KEY_ENV.to_string()),
            api_path: None,
            model: model.into(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_api_key_env(mut self, var: impl Into<String>) -> Self {
        self.api_key = Some(var.into());
        self
    }
}
