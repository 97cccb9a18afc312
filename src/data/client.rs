//! Upstream HTTP client
//!
//! The processor only needs one capability from the upstream API: fetch a JSON
//! document by URL and report an HTTP-like status on failure. That capability is
//! the `Upstream` trait; `PokeApiClient` implements it with reqwest.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;

/// Base URL for the PokeAPI
pub const POKEAPI_BASE_URL: &str = "https://pokeapi.co/api/v2/";

/// Errors that can occur when fetching an upstream document
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// The upstream answered with a non-success status
    #[error("Upstream responded with status {0}")]
    Status(u16),

    /// The request never produced a response (connect, timeout, TLS...)
    #[error("HTTP request failed: {0}")]
    Transport(String),

    /// The response body was not the expected JSON
    #[error("Failed to parse response body: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// The HTTP status carried by this error, if the upstream answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            UpstreamError::Status(status) => Some(*status),
            _ => None,
        }
    }

    /// Whether the upstream reported that the resource does not exist
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::Status(404))
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) => UpstreamError::Status(status.as_u16()),
            None if err.is_decode() => UpstreamError::Decode(err.to_string()),
            None => UpstreamError::Transport(err.to_string()),
        }
    }
}

/// Source of upstream JSON documents
#[async_trait]
pub trait Upstream: Send + Sync {
    /// Fetches the JSON document at `url`
    async fn fetch_json(&self, url: &str) -> Result<Value, UpstreamError>;
}

#[async_trait]
impl<T: Upstream + ?Sized> Upstream for Arc<T> {
    async fn fetch_json(&self, url: &str) -> Result<Value, UpstreamError> {
        (**self).fetch_json(url).await
    }
}

/// Client for fetching documents from the PokeAPI
#[derive(Debug, Clone)]
pub struct PokeApiClient {
    client: Client,
}

impl PokeApiClient {
    /// Create a new PokeApiClient whose requests give up after `timeout`
    ///
    /// # Errors
    /// Returns `UpstreamError::Transport` when the HTTP client cannot be built
    /// (for example when no TLS backend is available).
    pub fn with_timeout(timeout: Duration) -> Result<Self, UpstreamError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("dexcache/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Upstream for PokeApiClient {
    async fn fetch_json(&self, url: &str) -> Result<Value, UpstreamError> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.json::<Value>().await?;
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_accessors() {
        assert_eq!(UpstreamError::Status(503).status(), Some(503));
        assert_eq!(UpstreamError::Transport("timeout".into()).status(), None);
        assert!(UpstreamError::Status(404).is_not_found());
        assert!(!UpstreamError::Status(500).is_not_found());
        assert!(!UpstreamError::Decode("eof".into()).is_not_found());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            UpstreamError::Status(502).to_string(),
            "Upstream responded with status 502"
        );
        assert!(UpstreamError::Transport("refused".into())
            .to_string()
            .contains("refused"));
    }

    #[test]
    fn test_client_builds_with_timeout() {
        assert!(PokeApiClient::with_timeout(Duration::from_secs(15)).is_ok());
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let client = PokeApiClient::with_timeout(Duration::from_millis(500))
            .expect("Client should build");

        // Port 9 (discard) on localhost is closed in test environments.
        let result = client.fetch_json("http://127.0.0.1:9/pokemon/pikachu").await;

        assert!(matches!(result, Err(UpstreamError::Transport(_))));
    }
}
