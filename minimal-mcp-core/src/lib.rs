pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, client, launcher, tooling};
pub use config::{ConfigError, ModelProviderConfig, ServerConfig, TransportConfig};
pub use domain::types;
pub use infrastructure::model;
