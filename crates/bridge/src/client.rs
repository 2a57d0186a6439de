//! HTTP client for the bridge, used by the admin side to publish statuses.
//!
//! Publishing is best effort: callers log a failed push and carry on, since
//! the bridge only exists during local development.

use std::time::Duration;

use food_market_core::status::{StatusMap, StatusUpdate};
use serde::Serialize;
use thiserror::Error;
use url::Url;

/// Default bridge address.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3100";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Errors that can occur when talking to the bridge.
#[derive(Debug, Error)]
pub enum ClientError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Bridge returned an error response.
    #[error("Bridge error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Base URL could not be parsed or joined.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

#[derive(Serialize)]
struct BulkBody<'a> {
    products: &'a [StatusUpdate],
}

/// Bridge API client.
#[derive(Debug, Clone)]
pub struct BridgeClient {
    client: reqwest::Client,
    status_url: Url,
    bulk_url: Url,
}

impl BridgeClient {
    /// Create a client for the bridge at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the HTTP client fails to build.
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let base = Url::parse(base_url)?;
        let status_url = base.join("/api/product-status")?;
        let bulk_url = base.join("/api/product-status/bulk")?;
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            status_url,
            bulk_url,
        })
    }

    /// Publish statuses in a single bulk request.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the bridge rejects it.
    pub async fn push_statuses(&self, updates: &[StatusUpdate]) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.bulk_url.clone())
            .json(&BulkBody { products: updates })
            .send()
            .await?;
        check_status(response).await?;
        tracing::debug!(count = updates.len(), "Pushed product statuses to bridge");
        Ok(())
    }

    /// Fetch the full status map.
    ///
    /// # Errors
    ///
    /// Returns `ClientError` if the request fails or the body is not a map.
    pub async fn fetch_statuses(&self) -> Result<StatusMap, ClientError> {
        let response = self.client.get(self.status_url.clone()).send().await?;
        let response = check_status(response).await?;
        Ok(response.json().await?)
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response
        .json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("error").and_then(|e| e.as_str()).map(String::from))
        .unwrap_or_else(|| status.canonical_reason().unwrap_or("unknown").to_string());

    Err(ClientError::Api {
        status: status.as_u16(),
        message,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls() {
        let client = BridgeClient::new("http://localhost:3100/ignored/path").unwrap();
        assert_eq!(client.status_url.as_str(), "http://localhost:3100/api/product-status");
        assert_eq!(
            client.bulk_url.as_str(),
            "http://localhost:3100/api/product-status/bulk"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        let err = BridgeClient::new("not a url").unwrap_err();
        assert!(matches!(err, ClientError::Url(_)));
    }
}
