//! Fixed set of providers available to the process, keyed by identifier.

use std::sync::Arc;

use config::{LlmConfig, LlmProviderConfig};
use indexmap::IndexMap;

use crate::provider::{Provider, anthropic::AnthropicProvider, openai::OpenAIProvider};

struct RegisteredProvider {
    display_name: String,
    provider: Arc<dyn Provider>,
}

/// Immutable identifier to provider table.
///
/// Built once at startup and shared by every request without locking.
pub struct ProviderRegistry {
    providers: IndexMap<String, RegisteredProvider>,
}

impl ProviderRegistry {
    /// Build every configured provider, keeping configuration order.
    ///
    /// Missing credentials do not fail here; they fail the calls to the
    /// affected provider.
    pub fn from_config(config: &LlmConfig) -> crate::Result<Self> {
        log::debug!("Initializing provider registry with {} providers", config.providers.len());

        let mut providers = IndexMap::with_capacity(config.providers.len());

        for (name, provider_config) in &config.providers {
            log::debug!("Initializing provider: {name}");

            let provider: Arc<dyn Provider> = match provider_config.clone() {
                LlmProviderConfig::Openai(api_config) => Arc::new(OpenAIProvider::new(name.clone(), api_config)?),
                LlmProviderConfig::Anthropic(api_config) => {
                    Arc::new(AnthropicProvider::new(name.clone(), api_config)?)
                }
            };

            let registered = RegisteredProvider {
                display_name: provider_config.display_name(name).to_string(),
                provider,
            };

            providers.insert(name.clone(), registered);
        }

        log::debug!("Provider registry initialized with {} provider(s)", providers.len());

        Ok(Self { providers })
    }

    /// Build a registry out of already constructed providers, registered under their own name.
    pub fn from_providers(providers: impl IntoIterator<Item = Arc<dyn Provider>>) -> Self {
        let providers = providers
            .into_iter()
            .map(|provider| {
                let name = provider.name().to_string();

                let registered = RegisteredProvider {
                    display_name: name.clone(),
                    provider,
                };

                (name, registered)
            })
            .collect();

        Self { providers }
    }

    /// Find the provider registered under `identifier`.
    pub fn lookup(&self, identifier: &str) -> Option<Arc<dyn Provider>> {
        self.providers
            .get(identifier)
            .map(|registered| Arc::clone(&registered.provider))
    }

    /// `(identifier, display name)` pairs in registration order.
    pub fn entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.providers
            .iter()
            .map(|(id, registered)| (id.as_str(), registered.display_name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}
