//! Provider registry configuration.

use std::num::NonZeroUsize;

use indexmap::IndexMap;
use secrecy::SecretString;
use serde::Deserialize;

/// Environment variable holding the credential for OpenAI providers.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Environment variable holding the credential for Anthropic providers.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// Provider registry and dispatch settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LlmConfig {
    /// Upper bound on outbound provider calls in flight across all requests.
    /// Unbounded when not set.
    pub max_concurrent_calls: Option<NonZeroUsize>,

    /// Providers keyed by the short identifier clients request them with.
    pub providers: IndexMap<String, LlmProviderConfig>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        let providers = [
            ("openai", LlmProviderConfig::Openai(ApiProviderConfig::new("gpt-3.5-turbo", "GPT-3.5"))),
            ("gpt4", LlmProviderConfig::Openai(ApiProviderConfig::new("gpt-4", "GPT-4"))),
            (
                "claude",
                LlmProviderConfig::Anthropic(ApiProviderConfig::new("claude-sonnet-4-20250514", "Claude")),
            ),
        ]
        .into_iter()
        .map(|(id, config)| (id.to_string(), config))
        .collect();

        Self {
            max_concurrent_calls: None,
            providers,
        }
    }
}

impl LlmConfig {
    /// Whether there are any providers configured.
    pub fn has_providers(&self) -> bool {
        !self.providers.is_empty()
    }
}

/// Provider family, deciding which upstream API a provider speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderType {
    Openai,
    Anthropic,
}

impl ProviderType {
    /// The environment variable read when a provider of this family has no explicit key.
    pub fn api_key_env(self) -> &'static str {
        match self {
            Self::Openai => OPENAI_API_KEY_ENV,
            Self::Anthropic => ANTHROPIC_API_KEY_ENV,
        }
    }
}

/// Configuration for a single registered provider.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LlmProviderConfig {
    /// OpenAI chat completions API.
    Openai(ApiProviderConfig),
    /// Anthropic messages API.
    Anthropic(ApiProviderConfig),
}

impl LlmProviderConfig {
    pub fn provider_type(&self) -> ProviderType {
        match self {
            Self::Openai(_) => ProviderType::Openai,
            Self::Anthropic(_) => ProviderType::Anthropic,
        }
    }

    pub fn config(&self) -> &ApiProviderConfig {
        match self {
            Self::Openai(config) | Self::Anthropic(config) => config,
        }
    }

    /// Human readable name for listings, falling back to the registry identifier.
    pub fn display_name<'a>(&'a self, id: &'a str) -> &'a str {
        self.config().display_name.as_deref().unwrap_or(id)
    }
}

/// Settings shared by the HTTP API based providers.
///
/// Everything here is fixed at startup; callers of the dispatch endpoint
/// cannot change the model, token limit or temperature.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiProviderConfig {
    /// Upstream model name sent with every request.
    pub model: String,

    /// Name shown by the models listing.
    #[serde(default)]
    pub display_name: Option<String>,

    /// API key for authentication. When absent, the family's environment
    /// variable is consulted at startup.
    #[serde(default)]
    pub api_key: Option<SecretString>,

    /// Custom base URL for the provider API.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Maximum tokens to generate. Provider family default when absent.
    #[serde(default)]
    pub max_tokens: Option<u32>,

    /// Sampling temperature. Provider family default when absent.
    #[serde(default)]
    pub temperature: Option<f64>,
}

impl ApiProviderConfig {
    fn new(model: &str, display_name: &str) -> Self {
        Self {
            model: model.to_string(),
            display_name: Some(display_name.to_string()),
            api_key: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
        }
    }
}
