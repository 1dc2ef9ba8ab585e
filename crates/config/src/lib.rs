//! Configuration model for the BoxAI service.

mod error;
mod llm;
mod loader;
mod server;

use std::path::Path;

use serde::Deserialize;

pub use error::Error;
pub use llm::{
    ANTHROPIC_API_KEY_ENV, ApiProviderConfig, LlmConfig, LlmProviderConfig, OPENAI_API_KEY_ENV, ProviderType,
};
pub use server::{AllowedOrigins, CorsConfig, HealthConfig, ServerConfig, TlsServerConfig};

pub type Result<T> = std::result::Result<T, Error>;

/// Main configuration structure for the BoxAI application.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// HTTP server configuration settings.
    pub server: ServerConfig,
    /// Provider registry and dispatch settings.
    pub llm: LlmConfig,
}

impl Config {
    /// Load configuration from a TOML file, expanding `{{ env.NAME }}` placeholders.
    pub fn load<P: AsRef<Path>>(path: P) -> crate::Result<Config> {
        loader::load(path)
    }
}
