//! Request body of the OpenAI chat completions API.

use serde::Serialize;

#[derive(Debug, Serialize)]
pub(super) struct OpenAIRequest<'a> {
    model: &'a str,
    messages: Vec<OpenAIMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Debug, Serialize)]
struct OpenAIMessage<'a> {
    role: &'static str,
    content: &'a str,
}

impl<'a> OpenAIRequest<'a> {
    pub fn new(model: &'a str, prompt: &'a str, max_tokens: u32, temperature: f64) -> Self {
        Self {
            model,
            messages: vec![OpenAIMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature,
        }
    }
}
