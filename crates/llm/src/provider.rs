pub(crate) mod anthropic;
mod http_client;
pub(crate) mod openai;
mod token;

use async_trait::async_trait;

/// Text returned when a provider answers successfully but without any text content.
pub(crate) const EMPTY_RESPONSE_TEXT: &str = "No response from model";

/// A configured upstream model that turns a prompt into text.
///
/// Implementations hold every request parameter (model name, token limit,
/// temperature, credentials) from construction on. They are shared between
/// concurrent requests and must not keep per-call mutable state.
#[async_trait]
pub trait Provider: Send + Sync {
    /// Send `prompt` as a single user message and return the generated text.
    async fn generate(&self, prompt: &str) -> crate::Result<String>;

    /// Registry identifier of this provider.
    fn name(&self) -> &str;

    /// Upstream model name.
    fn model(&self) -> &str;
}
