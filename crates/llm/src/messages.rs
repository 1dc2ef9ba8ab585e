//! Wire types of the dispatch endpoints.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Prefix of the text substituted for a failed provider invocation.
pub const ERROR_PREFIX: &str = "Error generating response: ";

/// Body of `POST /ask`.
#[derive(Debug, Clone, Deserialize)]
pub struct QueryRequest {
    /// Prompt sent verbatim to every selected provider.
    pub query: String,
    /// Requested provider identifiers. Unknown and duplicate entries are allowed.
    pub models: Vec<String>,
}

/// One provider's answer, with timing and size metrics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LlmResponse {
    /// Registry identifier of the provider that produced the text.
    pub model: String,
    /// Provider output, or an error description when the call failed.
    pub text: String,
    pub latency_ms: u64,
    pub word_count: u64,
}

impl LlmResponse {
    pub(crate) fn new(model: String, text: String, latency: Duration) -> Self {
        let word_count = word_count(&text);

        Self {
            model,
            text,
            latency_ms: latency_ms(latency),
            word_count,
        }
    }

    pub(crate) fn failed(model: String, message: &str, latency: Duration) -> Self {
        Self::new(model, format!("{ERROR_PREFIX}{message}"), latency)
    }
}

/// Body of `GET /models`.
#[derive(Debug, Clone, Serialize)]
pub struct ModelsResponse {
    pub models: Vec<ModelEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ModelEntry {
    pub id: String,
    pub name: String,
}

/// Number of whitespace separated tokens.
pub(crate) fn word_count(text: &str) -> u64 {
    text.split_whitespace().count() as u64
}

/// Elapsed time rounded to the nearest millisecond.
pub(crate) fn latency_ms(elapsed: Duration) -> u64 {
    (elapsed.as_secs_f64() * 1000.0).round() as u64
}
