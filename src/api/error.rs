//! API error type and its HTTP mapping

use crate::core::provider::ProviderError;
use axum::{
    Json,
    extract::rejection::QueryRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for handlers
pub type ApiResult<T> = Result<T, ApiError>;

/// Handler error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// Upstream answered with an error status that is passed through
    #[error("Upstream returned status {0}")]
    UpstreamStatus(u16),

    #[error("Upstream error: {0}")]
    Upstream(#[from] ProviderError),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message.clone()),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
            ApiError::UpstreamStatus(code) => {
                let status = StatusCode::from_u16(*code).unwrap_or(StatusCode::BAD_GATEWAY);
                let reason = status.canonical_reason().unwrap_or("Upstream error");
                (status, reason.to_string())
            }
            ApiError::Upstream(e) => match e {
                ProviderError::NotFound(message) => (StatusCode::NOT_FOUND, message.clone()),
                ProviderError::RateLimit(_) => {
                    tracing::warn!("Upstream rate limit: {}", e);
                    (
                        StatusCode::SERVICE_UNAVAILABLE,
                        "Upstream database is rate limiting requests, try again later".to_string(),
                    )
                }
                _ => {
                    tracing::error!("Upstream failure: {}", e);
                    (StatusCode::BAD_GATEWAY, self.to_string())
                }
            },
            ApiError::Internal(message) => {
                tracing::error!("Internal error: {}", message);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        }
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();
        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        let cases = [
            (ApiError::bad_request("bad"), StatusCode::BAD_REQUEST),
            (ApiError::not_found("gone"), StatusCode::NOT_FOUND),
            (ApiError::UpstreamStatus(403), StatusCode::FORBIDDEN),
            (
                ApiError::from(ProviderError::NotFound("x".to_string())),
                StatusCode::NOT_FOUND,
            ),
            (
                ApiError::from(ProviderError::RateLimit("x".to_string())),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ApiError::from(ProviderError::Network("timeout".to_string())),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ApiError::Internal("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.into_response().status(), expected);
        }
    }

    #[test]
    fn test_upstream_message() {
        let error = ApiError::from(ProviderError::Network("connection refused".to_string()));
        assert_eq!(
            error.status_and_message().1,
            "Upstream error: Network error: connection refused"
        );
    }
}
