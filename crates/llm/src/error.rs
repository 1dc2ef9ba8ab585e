use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

pub type LlmResult<T> = std::result::Result<T, LlmError>;

/// Errors of the dispatch service and of single provider invocations.
///
/// Only [`LlmError::NoValidProviders`] and [`LlmError::InternalError`] ever
/// reach a caller of the dispatch endpoint. Every other variant describes a
/// single provider invocation and is folded into that provider's entry of the
/// response collection.
#[derive(Debug, Error)]
pub enum LlmError {
    /// None of the requested identifiers is registered.
    #[error("No valid models specified")]
    NoValidProviders,

    /// Model not found at the provider.
    #[error("Model not found: {0}")]
    ModelNotFound(String),

    /// Authentication failed (missing or invalid API key).
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Invalid request parameters.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Rate limit exceeded.
    #[error("Rate limit exceeded: {message}")]
    RateLimitExceeded { message: String },

    /// Insufficient quota or credits.
    #[error("Insufficient quota: {0}")]
    InsufficientQuota(String),

    /// Provider API returned an error.
    #[error("Provider API error ({status}): {message}")]
    ProviderApiError { status: u16, message: String },

    /// Network or connection error.
    #[error("Connection error: {0}")]
    ConnectionError(String),

    /// Internal server error.
    /// If Some(message), it came from a provider and can be shown.
    /// If None, it's an internal error and should not leak details.
    #[error("Internal server error")]
    InternalError(Option<String>),
}

impl LlmError {
    /// Map a non-success upstream status to the matching error.
    pub(crate) fn from_upstream(status: u16, message: String) -> Self {
        match status {
            401 => Self::AuthenticationFailed(message),
            403 => Self::InsufficientQuota(message),
            404 => Self::ModelNotFound(message),
            429 => Self::RateLimitExceeded { message },
            400 => Self::InvalidRequest(message),
            500 => Self::InternalError(Some(message)),
            _ => Self::ProviderApiError { status, message },
        }
    }

    /// HTTP status used when the error answers a dispatch request.
    ///
    /// Invocation failures never get here on their own, they are embedded in
    /// the response collection. Anything but an empty selection is a server fault.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::NoValidProviders => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error type string for the response body.
    pub fn error_type(&self) -> &str {
        match self {
            Self::NoValidProviders => "invalid_request_error",
            _ => "internal_error",
        }
    }

    /// Message that is safe to expose to API consumers.
    pub fn client_message(&self) -> String {
        match self {
            Self::InternalError(Some(provider_msg)) => provider_msg.clone(),
            Self::InternalError(None) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorDetails,
}

#[derive(Debug, Serialize)]
struct ErrorDetails {
    message: String,
    r#type: String,
    code: u16,
}

impl IntoResponse for LlmError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        let error_response = ErrorResponse {
            error: ErrorDetails {
                message: self.client_message(),
                r#type: self.error_type().to_string(),
                code: status.as_u16(),
            },
        };

        (status, Json(error_response)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;

    use super::LlmError;

    #[test]
    fn upstream_statuses() {
        let error = |status| LlmError::from_upstream(status, "boom".to_string());

        assert!(matches!(error(401), LlmError::AuthenticationFailed(_)));
        assert!(matches!(error(403), LlmError::InsufficientQuota(_)));
        assert!(matches!(error(404), LlmError::ModelNotFound(_)));
        assert!(matches!(error(429), LlmError::RateLimitExceeded { .. }));
        assert!(matches!(error(400), LlmError::InvalidRequest(_)));
        assert!(matches!(error(500), LlmError::InternalError(Some(_))));
        assert!(matches!(error(503), LlmError::ProviderApiError { status: 503, .. }));
    }

    #[test]
    fn only_empty_selection_is_a_client_error() {
        assert_eq!(LlmError::NoValidProviders.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(LlmError::NoValidProviders.error_type(), "invalid_request_error");

        let internal = LlmError::InternalError(None);
        assert_eq!(internal.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(internal.error_type(), "internal_error");
    }

    #[test]
    fn internal_errors_do_not_leak_details() {
        assert_eq!(LlmError::InternalError(None).client_message(), "Internal server error");
        assert_eq!(
            LlmError::InternalError(Some("upstream exploded".to_string())).client_message(),
            "upstream exploded"
        );
    }

    #[test]
    fn upstream_message_is_kept_in_display() {
        let error = LlmError::from_upstream(502, "bad gateway".to_string());
        insta::assert_snapshot!(error, @"Provider API error (502): bad gateway");
    }
}
