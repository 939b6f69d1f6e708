use serde::Serialize;
use serde_json::Value;

pub const DEFAULT_MAX_STEPS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct AgentStep {
    pub tool: String,
    pub input: Value,
    pub success: bool,
    pub output: Value,
    pub message: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub session_id: String,
    pub response: String,
    pub steps: Vec<AgentStep>,
    pub logs: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct AgentOptions {
    pub system_prompt: Option<String>,
    pub max_steps: usize,
}

impl AgentOptions {
    pub fn with_max_steps(max_steps: usize) -> Self {
        Self {
            max_steps,
            ..Self::default()
        }
    }
}

impl Default for AgentOptions {
    fn default() -> Self {
        Self {
            system_prompt: None,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}
