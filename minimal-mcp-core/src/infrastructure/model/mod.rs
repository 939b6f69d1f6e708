//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, Response, Error types
//! - `traits` - ModelProvider trait
//! - `adapter` - OpenAI wire format conversion
//! - `clients` - HTTP client implementations

pub mod adapter;
pub mod clients;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use clients::OpenAIClient;
pub use traits::ModelProvider;
pub use types::{ModelError, ModelRequest, ModelResponse};
