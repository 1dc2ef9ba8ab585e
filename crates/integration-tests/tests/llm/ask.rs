use std::time::{Duration, Instant};

use indoc::indoc;
use integration_tests::{LlmMock, TestServer};

#[tokio::test]
async fn fan_out_to_both_families() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("openai").with_reply("Paris is the capital of France."))
        .await;

    builder
        .spawn_llm(LlmMock::anthropic("claude").with_reply("The capital of France is Paris."))
        .await;

    let server = builder.build("").await;
    let (status, body) = server.ask("What is the capital of France?", &["openai", "claude"]).await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, {
        "[].latency_ms" => "[latency]"
    }, @r#"
    [
      {
        "model": "openai",
        "text": "Paris is the capital of France.",
        "latency_ms": "[latency]",
        "word_count": 6
      },
      {
        "model": "claude",
        "text": "The capital of France is Paris.",
        "latency_ms": "[latency]",
        "word_count": 6
      }
    ]
    "#);
}

#[tokio::test]
async fn responses_follow_request_order() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("slow").with_reply("slow").with_delay(Duration::from_millis(300)))
        .await;

    builder.spawn_llm(LlmMock::openai("fast").with_reply("fast")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["slow", "fast"]).await;

    assert_eq!(status, 200);

    let models: Vec<_> = body.as_array().unwrap().iter().map(|r| r["model"].clone()).collect();
    assert_eq!(models, ["slow", "fast"]);
}

#[tokio::test]
async fn unknown_models_are_skipped() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::openai("openai").with_reply("Hello")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["mystery", "openai", "also-unknown"]).await;

    assert_eq!(status, 200);

    insta::assert_json_snapshot!(body, {
        "[].latency_ms" => "[latency]"
    }, @r#"
    [
      {
        "model": "openai",
        "text": "Hello",
        "latency_ms": "[latency]",
        "word_count": 1
      }
    ]
    "#);
}

#[tokio::test]
async fn duplicate_models_are_called_once() {
    let mut builder = TestServer::builder();
    let mock = builder.spawn_llm(LlmMock::openai("openai")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["openai", "openai"]).await;

    assert_eq!(status, 200);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(mock.requests().len(), 1);
}

#[tokio::test]
async fn calls_run_in_parallel() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("first").with_delay(Duration::from_millis(500)))
        .await;

    builder
        .spawn_llm(LlmMock::anthropic("second").with_delay(Duration::from_millis(500)))
        .await;

    let server = builder.build("").await;

    let started = Instant::now();
    let (status, body) = server.ask("Hi", &["first", "second"]).await;
    let elapsed = started.elapsed();

    assert_eq!(status, 200);
    assert!(elapsed < Duration::from_millis(900), "took {elapsed:?}");

    for response in body.as_array().unwrap() {
        assert!(response["latency_ms"].as_u64().unwrap() >= 500);
    }
}

#[tokio::test]
async fn concurrency_limit_serializes_calls() {
    let config = indoc! {r#"
        [llm]
        max_concurrent_calls = 1
    "#};

    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::openai("first").with_delay(Duration::from_millis(300)))
        .await;

    builder
        .spawn_llm(LlmMock::openai("second").with_delay(Duration::from_millis(300)))
        .await;

    let server = builder.build(config).await;

    let started = Instant::now();
    let (status, _) = server.ask("Hi", &["first", "second"]).await;

    assert_eq!(status, 200);
    assert!(started.elapsed() >= Duration::from_millis(600));
}

#[tokio::test]
async fn empty_completion_has_placeholder_text() {
    let mut builder = TestServer::builder();
    builder.spawn_llm(LlmMock::anthropic("claude").with_reply("")).await;

    let server = builder.build("").await;
    let (status, body) = server.ask("Hi", &["claude"]).await;

    assert_eq!(status, 200);
    assert_eq!(body[0]["text"], "No response from model");
}

#[tokio::test]
async fn openai_upstream_request() {
    let mut builder = TestServer::builder();

    let mock = builder
        .spawn_llm(LlmMock::openai("gpt4").with_model("gpt-4"))
        .await;

    let server = builder.build("").await;
    server.ask("Explain ownership", &["gpt4"]).await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.headers["authorization"], "Bearer test-key");

    insta::assert_json_snapshot!(request.body, @r#"
    {
      "model": "gpt-4",
      "messages": [
        {
          "role": "user",
          "content": "Explain ownership"
        }
      ],
      "max_tokens": 1000,
      "temperature": 0.7
    }
    "#);
}

#[tokio::test]
async fn anthropic_upstream_request() {
    let mut builder = TestServer::builder();
    let mock = builder.spawn_llm(LlmMock::anthropic("claude")).await;

    let server = builder.build("").await;
    server.ask("Explain borrowing", &["claude"]).await;

    let requests = mock.requests();
    assert_eq!(requests.len(), 1);

    let request = &requests[0];
    assert_eq!(request.headers["x-api-key"], "test-key");
    assert_eq!(request.headers["anthropic-version"], "2023-06-01");

    insta::assert_json_snapshot!(request.body, @r#"
    {
      "model": "claude-sonnet-4-20250514",
      "max_tokens": 1024,
      "temperature": 0.7,
      "messages": [
        {
          "role": "user",
          "content": "Explain borrowing"
        }
      ]
    }
    "#);
}
