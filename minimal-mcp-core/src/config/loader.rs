use super::error::ConfigError;
use super::transport::TransportConfig;
use crate::constants::ENV_PATH;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::debug;

static ENV_LOADER: Once = Once::new();

/// Ensures environment variables are loaded from `.env` when it exists.
///
/// Variables already present in the process environment are kept.
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| match dotenvy::from_filename(ENV_PATH) {
        Ok(path) => debug!(path = %path.display(), "Loaded environment file"),
        Err(err) if err.not_found() => debug!("No environment file found"),
        Err(err) => debug!(%err, "Failed to load environment file"),
    });
}

/// Read a JSON transport descriptor from disk
pub fn load_transport_file(path: &Path) -> Result<TransportConfig, ConfigError> {
    debug!(path = %path.display(), "Reading transport descriptor");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    TransportConfig::from_json_str(&content)
}
