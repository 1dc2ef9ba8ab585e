//! Mock upstream LLM APIs.
//!
//! Each mock serves one provider family on a random local port, records every
//! request it receives and answers with a canned reply or error.

use std::{
    net::SocketAddr,
    sync::{Arc, Mutex},
    time::Duration,
};

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;

/// Which upstream API the mock speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    OpenAI,
    Anthropic,
}

impl Flavor {
    fn provider_type(self) -> &'static str {
        match self {
            Flavor::OpenAI => "openai",
            Flavor::Anthropic => "anthropic",
        }
    }

    fn path(self) -> &'static str {
        match self {
            Flavor::OpenAI => "/v1/chat/completions",
            Flavor::Anthropic => "/v1/messages",
        }
    }
}

/// A request as seen by the mock.
#[derive(Debug, Clone)]
pub struct ReceivedRequest {
    pub headers: HeaderMap,
    pub body: serde_json::Value,
}

/// A mock provider, configured before being spawned.
pub struct LlmMock {
    id: String,
    flavor: Flavor,
    model: String,
    display_name: Option<String>,
    reply: String,
    error: Option<(StatusCode, String)>,
    delay: Option<Duration>,
}

impl LlmMock {
    /// OpenAI chat completions mock, registered under `id`.
    pub fn openai(id: impl Into<String>) -> Self {
        Self::new(id, Flavor::OpenAI, "gpt-3.5-turbo")
    }

    /// Anthropic messages mock, registered under `id`.
    pub fn anthropic(id: impl Into<String>) -> Self {
        Self::new(id, Flavor::Anthropic, "claude-sonnet-4-20250514")
    }

    fn new(id: impl Into<String>, flavor: Flavor, model: &str) -> Self {
        Self {
            id: id.into(),
            flavor,
            model: model.to_string(),
            display_name: None,
            reply: "Hello from the mock".to_string(),
            error: None,
            delay: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    /// Text returned as the model's answer. An empty string yields an empty completion.
    pub fn with_reply(mut self, reply: impl Into<String>) -> Self {
        self.reply = reply.into();
        self
    }

    /// Answer every request with this status and plain text body.
    pub fn with_error(mut self, status: u16, body: impl Into<String>) -> Self {
        let status = StatusCode::from_u16(status).unwrap();
        self.error = Some((status, body.into()));
        self
    }

    /// Wait this long before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Starts serving and returns a handle for inspecting received requests.
    pub(crate) async fn spawn(self) -> LlmMockHandle {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();

        let state = Arc::new(MockState {
            flavor: self.flavor,
            model: self.model.clone(),
            reply: self.reply,
            error: self.error,
            delay: self.delay,
            received: Mutex::new(Vec::new()),
        });

        let app = Router::new()
            .route(self.flavor.path(), post(respond))
            .with_state(state.clone());

        let shutdown = CancellationToken::new();

        tokio::spawn({
            let shutdown = shutdown.clone();

            async move {
                axum::serve(listener, app)
                    .with_graceful_shutdown(shutdown.cancelled_owned())
                    .await
                    .unwrap();
            }
        });

        LlmMockHandle {
            id: self.id,
            flavor: self.flavor,
            model: self.model,
            display_name: self.display_name,
            address,
            state,
            shutdown,
        }
    }
}

struct MockState {
    flavor: Flavor,
    model: String,
    reply: String,
    error: Option<(StatusCode, String)>,
    delay: Option<Duration>,
    received: Mutex<Vec<ReceivedRequest>>,
}

/// A running mock provider.
pub struct LlmMockHandle {
    id: String,
    flavor: Flavor,
    model: String,
    display_name: Option<String>,
    address: SocketAddr,
    state: Arc<MockState>,
    pub(crate) shutdown: CancellationToken,
}

impl LlmMockHandle {
    pub fn base_url(&self) -> String {
        format!("http://{}/v1", self.address)
    }

    /// Every request received so far, oldest first.
    pub fn requests(&self) -> Vec<ReceivedRequest> {
        self.state.received.lock().unwrap().clone()
    }

    /// Provider section pointing the server at this mock.
    pub(crate) fn config_snippet(&self) -> String {
        let display_name = self
            .display_name
            .as_ref()
            .map(|name| format!("display_name = \"{name}\"\n"))
            .unwrap_or_default();

        indoc::formatdoc! {r#"

            [llm.providers.{id}]
            type = "{provider_type}"
            model = "{model}"
            api_key = "test-key"
            base_url = "{base_url}"
            {display_name}"#,
            id = self.id,
            provider_type = self.flavor.provider_type(),
            model = self.model,
            base_url = self.base_url(),
        }
    }
}

async fn respond(
    State(state): State<Arc<MockState>>,
    headers: HeaderMap,
    Json(body): Json<serde_json::Value>,
) -> Response {
    state.received.lock().unwrap().push(ReceivedRequest { headers, body });

    if let Some(delay) = state.delay {
        tokio::time::sleep(delay).await;
    }

    if let Some((status, message)) = &state.error {
        return (*status, message.clone()).into_response();
    }

    let body = match state.flavor {
        Flavor::OpenAI => json!({
            "id": "chatcmpl-test",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": state.model,
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": state.reply },
                "finish_reason": "stop"
            }],
            "usage": { "prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15 }
        }),
        Flavor::Anthropic => json!({
            "id": "msg_test",
            "type": "message",
            "role": "assistant",
            "model": state.model,
            "content": [{ "type": "text", "text": state.reply }],
            "stop_reason": "end_turn",
            "usage": { "input_tokens": 10, "output_tokens": 5 }
        }),
    };

    Json(body).into_response()
}
