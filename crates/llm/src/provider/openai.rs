mod input;
mod output;

use async_trait::async_trait;
use config::{ApiProviderConfig, ProviderType};
use reqwest::Client;
use secrecy::ExposeSecret;

use self::{input::OpenAIRequest, output::OpenAIResponse};

use crate::{
    error::LlmError,
    provider::{EMPTY_RESPONSE_TEXT, Provider, http_client, token::ApiKey},
};

const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MAX_TOKENS: u32 = 1000;
const DEFAULT_TEMPERATURE: f64 = 0.7;

pub(crate) struct OpenAIProvider {
    client: Client,
    base_url: String,
    name: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    api_key: ApiKey,
}

impl OpenAIProvider {
    pub fn new(name: String, config: ApiProviderConfig) -> crate::Result<Self> {
        let client = http_client::build_client(Default::default(), "OpenAI")?;
        let api_key = ApiKey::resolve(&config, ProviderType::Openai);

        // Use custom base URL if provided, otherwise use default
        let base_url = config
            .base_url
            .as_deref()
            .unwrap_or(DEFAULT_OPENAI_API_URL)
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
impl Provider for OpenAIProvider {
    async fn generate(&self, prompt: &str) -> crate::Result<String> {
        let url = format!("{}/chat/completions", self.base_url);
        let key = self.api_key.get(&self.name)?;

        let request = OpenAIRequest::new(&self.model, prompt, self.max_tokens, self.temperature);

        let body = sonic_rs::to_vec(&request)
            .map_err(|e| LlmError::InvalidRequest(format!("Failed to serialize request: {e}")))?;

        let request_builder = self.client.post(url).bearer_auth(key.expose_secret());
        let response_text = http_client::send_json(request_builder, body, "OpenAI").await?;

        let response: OpenAIResponse = sonic_rs::from_str(&response_text).map_err(|e| {
            log::error!("Failed to parse OpenAI chat completion response: {e}");
            log::debug!("Response parsing failed, length: {} bytes", response_text.len());

            LlmError::InternalError(Some(format!("Failed to parse OpenAI response: {e}")))
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
