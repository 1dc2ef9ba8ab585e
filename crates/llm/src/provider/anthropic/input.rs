//! Request body of the Anthropic messages API.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    temperature: f64,
    messages: Vec<AnthropicMessage<'a>>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> AnthropicRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            model,
            max_tokens,
            temperature,
            messages: vec![AnthropicMessage {
                role: "user",
                content: prompt,
            }],
        }
    }
}
