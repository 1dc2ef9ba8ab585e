//! Response body of the OpenAI chat completions API, reduced to what the dispatcher reads.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(super) struct OpenAIResponse {
    #[serde(default)]
    choices: Vec<OpenAIChoice>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoice {
    message: OpenAIChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct OpenAIChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenAIResponse {
    /// Content of the first choice, if it has any.
    pub fn into_text(self) -> Option<String> {
        self.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::OpenAIResponse;

    #[test]
    fn first_choice_content() {
        let body = r#"{
            "id": "chatcmpl-123",
            "object": "chat.completion",
            "choices": [
                {"index": 0, "message": {"role": "assistant", "content": "Hello there"}, "finish_reason": "stop"},
                {"index": 1, "message": {"role": "assistant", "content": "Ignored"}, "finish_reason": "stop"}
            ],
            "usage": {"prompt_tokens": 1, "completion_tokens": 2, "total_tokens": 3}
        }"#;

        let response: OpenAIResponse = sonic_rs::from_str(body).unwrap();
        assert_eq!(response.into_text().as_deref(), Some("Hello there"));
    }

    #[test]
    fn null_content() {
        let body = r#"{"choices": [{"message": {"role": "assistant", "content": null}}]}"#;

        let response: OpenAIResponse = sonic_rs::from_str(body).unwrap();
        assert_eq!(response.into_text(), None);
    }

    #[test]
    fn no_choices() {
        let response: OpenAIResponse = sonic_rs::from_str(r#"{"choices": []}"#).unwrap();
        assert_eq!(response.into_text(), None);
    }
}
