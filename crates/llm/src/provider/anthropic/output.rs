use serde::Deserialize;

/// Describes the type of content in an Anthropic message.
#[derive(Debug, Deserialize, PartialEq)]
pub enum ContentType {
    /// Plain text content.
    #[serde(rename = "text")]
    Text,
    /// Any other content type (tool use, thinking, ...).
    /// Captures the actual string value for forward compatibility.
    #[serde(untagged)]
    Other(String),
}

/// A single block of the response content.
#[derive(Debug, Deserialize)]
pub(super) struct ContentBlock {
    #[serde(rename = "type")]
    kind: ContentType,
    #[serde(default)]
    text: Option<String>,
}

/// Response of the messages endpoint, reduced to what the dispatcher reads.
#[derive(Debug, Deserialize)]
pub(super) struct AnthropicResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

impl AnthropicResponse {
    /// Text of the first text block, if it has any.
    pub fn into_text(self) -> Option<String> {
        self.content
            .into_iter()
            .find(|block| block.kind == ContentType::Text)
            .and_then(|block| block.text)
            .filter(|text| !text.is_empty())
    }
}
