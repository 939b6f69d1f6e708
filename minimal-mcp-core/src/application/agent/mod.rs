//! # Agent Module
//!
//! A tool-calling agent driven by a chat model and bounded by a maximum
//! number of reasoning steps.
//!
//! ## Key Types
//!
//! - [`Agent`] - The agent executor
//! - [`AgentOptions`] - Step budget and extra system prompt
//! - [`AgentOutcome`] - Final answer plus the executed tool steps
//! - [`ToolCatalogue`] - Tools and server guidance discovered at run start
//! - [`AgentError`] - Errors that can occur during agent execution
//!
//! ## Agent Loop
//!
//! 1. Discover tools on every configured server
//! 2. Send the conversation and tool specs to the model
//! 3. If the model requests tools, execute them, append observations, continue
//! 4. If the model answers in text, return it
//! 5. Fail once the step budget is spent

mod context;
mod errors;
mod models;
mod runner;
mod runtime;

pub use context::{ServerGuidance, ToolCatalogue, ToolDescriptor};
pub use errors::{AgentError, ToolError};
pub use models::{AgentOptions, AgentOutcome, AgentStep, DEFAULT_MAX_STEPS};
pub use runner::Agent;
pub use runtime::{ToolExecution, ToolRuntime, extract_tool_message};
