//! Shared HTTP client for upstream structure databases
//!
//! Wraps a pooled `reqwest::Client` with a fixed timeout and turns non-success
//! upstream responses into [`ProviderError`] values in one place.

use crate::core::provider::ProviderError;
use reqwest::{Client, Response, StatusCode, redirect};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::debug;

/// User-Agent sent to upstream APIs
const USER_AGENT: &str = concat!("protein-viewer/", env!("CARGO_PKG_VERSION"));

/// Longest upstream error body echoed into an error message
const MAX_ERROR_DETAIL: usize = 200;

/// Redirect hops followed by the download client
const MAX_REDIRECTS: usize = 10;

/// Upstream HTTP client with error classification
#[derive(Clone)]
pub struct UpstreamClient {
    client: Client,
}

impl UpstreamClient {
    /// Create a new client
    ///
    /// # Arguments
    ///
    /// * `timeout` - Request timeout in seconds
    pub fn new(timeout: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// Create a client for streaming file downloads
    ///
    /// `timeout` bounds connecting and each idle gap between reads, not the
    /// whole transfer. Redirects are only followed to hosts in `allowed_hosts`.
    pub fn for_downloads(timeout: u64, allowed_hosts: Vec<String>) -> Result<Self, ProviderError> {
        let timeout = Duration::from_secs(timeout);
        let policy = redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error("too many redirects");
            }
            let allowed = attempt
                .url()
                .host_str()
                .is_some_and(|host| allowed_hosts.iter().any(|h| h.eq_ignore_ascii_case(host)));
            if allowed {
                attempt.follow()
            } else {
                let message = format!("redirect to disallowed host: {}", attempt.url());
                attempt.error(message)
            }
        });

        let client = Client::builder()
            .connect_timeout(timeout)
            .read_timeout(timeout)
            .redirect(policy)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| ProviderError::Network(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { client })
    }

    /// GET `url` and decode the JSON body
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<T, ProviderError> {
        let response = self.get_checked(url, query).await?;
        response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse response: {e}")))
    }

    /// GET `url` and return the body as text
    pub async fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, ProviderError> {
        let response = self.get_checked(url, query).await?;
        response
            .text()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    /// HEAD `url` and return the upstream status without classifying it
    pub async fn head_status(&self, url: &str) -> Result<StatusCode, ProviderError> {
        let response = self
            .client
            .head(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(response.status())
    }

    /// GET `url` without inspecting the status, for streaming passthrough
    pub async fn get_raw(&self, url: &str) -> Result<Response, ProviderError> {
        self.client
            .get(url)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))
    }

    async fn get_checked(&self, url: &str, query: &[(&str, &str)]) -> Result<Response, ProviderError> {
        debug!("GET {} {:?}", url, query);

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_status(status, &error_text));
        }

        Ok(response)
    }

    /// Map an unsuccessful upstream status onto a [`ProviderError`]
    fn classify_status(status: StatusCode, body: &str) -> ProviderError {
        let detail: String = body.trim().chars().take(MAX_ERROR_DETAIL).collect();
        let detail = if detail.is_empty() {
            status
                .canonical_reason()
                .unwrap_or("Unknown error")
                .to_string()
        } else {
            detail
        };

        match status.as_u16() {
            404 | 410 => ProviderError::NotFound(detail),
            429 => ProviderError::RateLimit(detail),
            400 => ProviderError::BadRequest(detail),
            code => ProviderError::Api {
                status: code,
                message: detail,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[derive(Debug, Deserialize)]
    struct Payload {
        ok: bool,
    }

    #[test]
    fn test_classify_not_found() {
        let error = UpstreamClient::classify_status(StatusCode::NOT_FOUND, "");
        assert!(matches!(error, ProviderError::NotFound(ref m) if m == "Not Found"));
    }

    #[test]
    fn test_classify_server_error_truncates_body() {
        let body = "x".repeat(1000);
        let error = UpstreamClient::classify_status(StatusCode::BAD_GATEWAY, &body);
        match error {
            ProviderError::Api { status, message } => {
                assert_eq!(status, 502);
                assert_eq!(message.len(), MAX_ERROR_DETAIL);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_classify_rate_limit() {
        let error = UpstreamClient::classify_status(StatusCode::TOO_MANY_REQUESTS, "slow down");
        assert!(matches!(error, ProviderError::RateLimit(_)));
    }

    #[tokio::test]
    async fn test_get_json_passes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payload"))
            .and(query_param("q", "insulin"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(5).unwrap();
        let payload: Payload = client
            .get_json(&format!("{}/payload", server.uri()), &[("q", "insulin")])
            .await
            .unwrap();
        assert!(payload.ok);
    }

    #[tokio::test]
    async fn test_get_json_invalid_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payload"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>"))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(5).unwrap();
        let result: Result<Payload, _> = client.get_json(&format!("{}/payload", server.uri()), &[]).await;
        assert!(matches!(result, Err(ProviderError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_head_status_reports_upstream_status() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/files/missing.pdb"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = UpstreamClient::new(5).unwrap();
        let status = client
            .head_status(&format!("{}/files/missing.pdb", server.uri()))
            .await
            .unwrap();
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
