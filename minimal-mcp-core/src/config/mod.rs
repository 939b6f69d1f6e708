pub mod error;
pub mod loader;
pub mod provider;
pub mod server;
pub mod transport;

pub use error::ConfigError;
pub use loader::ensure_env_loaded;
pub use provider::ModelProviderConfig;
pub use server::ServerConfig;
pub use transport::TransportConfig;
