use std::time::Duration;

use axum::http::{self, header::CONTENT_TYPE};
use reqwest::{Client, RequestBuilder};

use crate::error::LlmError;

pub(super) fn default_http_client_builder(mut headers: http::HeaderMap) -> reqwest::ClientBuilder {
    headers.insert(http::header::CONNECTION, http::HeaderValue::from_static("keep-alive"));

    Client::builder()
        .timeout(Duration::from_secs(60))
        // Hyper only exposes max idle connections per host and the idle timeout. There is
        // no TTL on pooled connections, so a short idle timeout is what lets us pick up
        // DNS changes of the upstream APIs.
        .pool_idle_timeout(Some(Duration::from_secs(5)))
        .tcp_nodelay(true)
        .tcp_keepalive(Some(Duration::from_secs(60)))
        .default_headers(headers)
}

pub(super) fn build_client(headers: http::HeaderMap, provider: &str) -> crate::Result<Client> {
    default_http_client_builder(headers).build().map_err(|e| {
        log::error!("Failed to create HTTP client for {provider} provider: {e}");
        LlmError::InternalError(None)
    })
}

/// Send a JSON body and return the raw response text of a successful call.
///
/// Non-success statuses are mapped to the matching [`LlmError`] with the
/// upstream body as message.
pub(super) async fn send_json(request: RequestBuilder, body: Vec<u8>, provider: &str) -> crate::Result<String> {
    let response = request
        .header(CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await
        .map_err(|e| LlmError::ConnectionError(format!("Failed to send request to {provider}: {e}")))?;

    let status = response.status();

    if !status.is_success() {
        let error_text = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
        log::error!("{provider} API error ({status}): {error_text}");

        return Err(LlmError::from_upstream(status.as_u16(), error_text));
    }

    response.text().await.map_err(|e| {
        log::error!("Failed to read {provider} response body: {e}");
        LlmError::ConnectionError(format!("Failed to read response from {provider}: {e}"))
    })
}
