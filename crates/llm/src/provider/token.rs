use config::{ApiProviderConfig, ProviderType};
use secrecy::SecretString;

use crate::error::LlmError;

/// Credential of one provider, resolved once at startup.
///
/// A missing key is not an error here. It only fails the calls made to that
/// provider, so a single misconfigured provider leaves the others usable.
pub(super) struct ApiKey {
    key: Option<SecretString>,
    env: &'static str,
}

impl ApiKey {
    pub fn resolve(config: &ApiProviderConfig, provider_type: ProviderType) -> Self {
        let env = provider_type.api_key_env();

        let key = config.api_key.clone().or_else(|| {
            std::env::var(env)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .map(SecretString::from)
        });

        Self { key, env }
    }

    pub fn get(&self, provider: &str) -> crate::Result<&SecretString> {
        self.key.as_ref().ok_or_else(|| {
            LlmError::AuthenticationFailed(format!(
                "no API key configured for provider '{provider}', set {} or api_key in the configuration",
                self.env
            ))
        })
    }
}
