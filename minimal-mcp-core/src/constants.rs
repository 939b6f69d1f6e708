//! Application constants
//!
//! Single source of truth for names, paths and defaults.

/// Environment file loaded before anything reads the environment
pub const ENV_PATH: &str = ".env";

/// Name of the companion server entry in the transport descriptor
pub const COMPANION_SERVER_NAME: &str = "minimal-server";

/// Companion executable, expected next to the launcher executable
pub const COMPANION_BINARY: &str = "minimal-mcp-server";

/// Model used by the launcher scenario
pub const LAUNCHER_MODEL: &str = "gpt-4o-mini";

/// Reasoning-step budget used by the launcher scenario
pub const LAUNCHER_MAX_STEPS: usize = 10;

/// Default OpenAI-compatible endpoint (overridable with `OPENAI_BASE_URL`)
pub const DEFAULT_OPENAI_ENDPOINT: &str = "https://api.openai.com/v1";

/// Default chat completions path relative to the endpoint
pub const DEFAULT_OPENAI_API_PATH: &str = "chat/completions";

/// Environment variable holding the OpenAI API key
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable overriding the OpenAI endpoint
pub const OPENAI_BASE_URL_ENV: &str = "OPENAI_BASE_URL";

/// MCP protocol revision announced during `initialize`
pub const PROTOCOL_VERSION: &str = "2025-06-18";
