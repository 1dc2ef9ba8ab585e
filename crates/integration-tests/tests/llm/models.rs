use indoc::indoc;
use integration_tests::{LlmMock, TestServer};

#[tokio::test]
async fn built_in_providers() {
    let server = TestServer::start("").await;

    insta::assert_json_snapshot!(server.models().await, @r#"
    {
      "models": [
        {
          "id": "openai",
          "name": "GPT-3.5"
        },
        {
          "id": "gpt4",
          "name": "GPT-4"
        },
        {
          "id": "claude",
          "name": "Claude"
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn configured_providers_in_file_order() {
    let mut builder = TestServer::builder();

    builder
        .spawn_llm(LlmMock::anthropic("claude").with_display_name("Claude Sonnet"))
        .await;

    builder.spawn_llm(LlmMock::openai("local")).await;

    let server = builder.build("").await;

    insta::assert_json_snapshot!(server.models().await, @r#"
    {
      "models": [
        {
          "id": "claude",
          "name": "Claude Sonnet"
        },
        {
          "id": "local",
          "name": "local"
        }
      ]
    }
    "#);
}

#[tokio::test]
async fn listing_does_not_call_providers() {
    let config = indoc! {r#"
        [llm]
        max_concurrent_calls = 2
    "#};

    let mut builder = TestServer::builder();
    let mock = builder.spawn_llm(LlmMock::openai("openai")).await;

    let server = builder.build(config).await;
    server.models().await;

    assert!(mock.requests().is_empty());
}
