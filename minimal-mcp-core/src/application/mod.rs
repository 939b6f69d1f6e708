//! # Application Module
//!
//! ## Submodules
//!
//! - [`tooling`] - stdio MCP server processes and the JSON-RPC transport
//! - [`client`] - Transport client built from a transport descriptor
//! - [`agent`] - Tool-calling agent bounded by a reasoning-step budget
//! - [`launcher`] - The fixed launcher scenario

pub mod agent;
pub mod client;
pub mod launcher;
pub mod tooling;
