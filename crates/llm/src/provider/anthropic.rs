mod input;
mod output;

use async_trait::async_trait;
use axum::http::HeaderMap;
use config::{ApiProviderConfig, ProviderType};
use reqwest::Client;
use secrecy::ExposeSecret;

use self::{input::AnthropicRequest, output::AnthropicResponse};

use crate::{
    error::LlmError,
    provider::{EMPTY_RESPONSE_TEXT, Provider, http_client, token::ApiKey},
};

const DEFAULT_ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1";
const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 1024;
const DEFAULT_TEMPERATURE: f64 = 0.7;

pub(crate) struct AnthropicProvider {
    client: Client,
    base_url: String,
    name: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    api_key: ApiKey,
}

impl AnthropicProvider {
    pub fn new(name: String, config: ApiProviderConfig) -> crate::Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            "anthropic-version",
            ANTHROPIC_VERSION.parse().map_err(|e| {
                log::error!("Failed to parse Anthropic version header: {e}");
                LlmError::InternalError(None)
            })?,
        );

        let client = http_client::build_client(headers, "Anthropic")?;
        let api_key = ApiKey::resolve(&config, ProviderType::Anthropic);

        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_ANTHROPIC_API_URL)
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            client,
            base_url,
            name,
            model: config.model,
            max_tokens: config.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: config.temperature.unwrap_or(DEFAULT_TEMPERATURE),
            api_key,
        })
    }
}

#[async_trait]
impl Provider for AnthropicProvider {
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        let url = format!("{}/messages", self.base_url);
        let api_key = self.api_key.get(&self.name)?;

        let request = AnthropicRequest::new(&self.model, prompt, self.max_tokens, self.temperature);

        let body = sonic_rs::to_vec(&request).map_err(|e| {
            log::error!("Failed to serialize Anthropic request: {e}");
            LlmError::InternalError(None)
        })?;

        let request_builder = self.client.post(url).header("x-api-key", api_key.expose_secret());
        let response_text = http_client::send_json(request_builder, body, "Anthropic").await?;

        let response: AnthropicResponse = sonic_rs::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse Anthropic messages response: {e}");
            log::error!("Raw response that failed to parse: {response_text}");
            LlmError::InternalError(Some(format!("Failed to parse Anthropic response: {e}")))
        })?;

        Ok(response
            .into_text()
            .unwrap_or_else(|| EMPTY_RESPONSE_TEXT.to_string()))
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }
}
