use indoc::indoc;
use integration_tests::{LlmMock, TestServer};

#[tokio::test]
async fn no_valid_models() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::openai("openai")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["nope"]).await;

    assert_eq!(status, 400);

    insta::assert_json_snapshot!(body, @r#"
    {
      "error": {
        "message": "No valid models specified",
        "type": "invalid_request_error",
        "code": 400
      }
    }
    "#);
}

#[tokio::test]
async fn empty_model_list() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::openai("openai")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &[]).await;

    assert_eq!(status, 400);
    assert_eq!(body["error"]["message"], "No valid models specified");
}

#[tokio::test]
async fn malformed_request_is_rejected() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::openai("openai")).await;

    let server = builder.build("").await;

    let response = server
        .client
        .post("/ask", &serde_json::json!({ "models": ["openai"] }))
        .await;

    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn upstream_authentication_failure() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("openai").with_error(401, "Incorrect API key provided"))
        .await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["openai"]).await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, {
        "[].latency_ms" => "[latency]"
    }, @r#"
    [
      {
        "model": "openai",
        "text": "Error generating response: Authentication failed: Incorrect API key provided",
        "latency_ms": "[latency]",
        "word_count": 9
      }
    ]
    "#);
}

#[tokio::test]
async fn one_failure_does_not_affect_others() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::anthropic("claude").with_error(429, "Too many requests"))
        .await;

    builder.spawn_llm(LlmMock::openai("openai").with_reply("All good")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["claude", "openai"]).await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, {
        "[].latency_ms" => "[latency]"
    }, @r#"
    [
      {
        "model": "claude",
        "text": "Error generating response: Rate limit exceeded: Too many requests",
        "latency_ms": "[latency]",
        "word_count": 9
      },
      {
        "model": "openai",
        "text": "All good",
        "latency_ms": "[latency]",
        "word_count": 2
      }
    ]
    "#);
}

#[tokio::test]
async fn upstream_server_error() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("openai").with_error(503, "Service unavailable"))
        .await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["openai"]).await;

    assert_eq!(status, 200);

    let text = body[0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error generating response: "), "{text}");
    assert!(text.contains("Service unavailable"), "{text}");
}

#[tokio::test]
async fn unreachable_provider() {
    let config = indoc! {r#"
        [llm.providers.offline]
        type = "openai"
        model = "gpt-4"
        api_key = "test-key"
        base_url = "http://127.0.0.1:1/v1"
    "#};

    let server = TestServer::start(config).await;
    let (status, body) = server.ask("Hi", &["offline"]).await;

    assert_eq!(status, 200);

    let text = body[0]["text"].as_str().unwrap();
    assert!(text.starts_with("Error generating response: "), "{text}");
    assert_eq!(body[0]["model"], "offline");
}

#[tokio::test]
async fn unresolved_credential_fails_only_its_provider() {
    let config = indoc! {r#"
        [llm.providers.claude]
        type = "anthropic"
        model = "claude-sonnet-4-20250514"
        api_key = "{{ env.BOXAI_TEST_NEVER_SET_ANTHROPIC_KEY }}"
        base_url = "http://127.0.0.1:1/v1"
    "#};

    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::openai("openai").with_reply("Still here")).await;

    let server = builder.build(config).await;
    let (status, body) = server.ask("Hi", &["claude", "openai"]).await;

    assert_eq!(status, 200);

    let claude = body[0]["text"].as_str().unwrap();
    assert!(claude.starts_with("Error generating response: "), "{claude}");

    if std::env::var("ANTHROPIC_API_KEY").is_err() {
        assert!(claude.contains("Authentication failed: no API key configured"), "{claude}");
    }

    assert_eq!(body[1]["model"], "openai");
    assert_eq!(body[1]["text"], "Still here");
}
