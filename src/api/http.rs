//! Shared JSON-over-HTTP plumbing for the catalog, metadata and proxy clients
//!
//! One request per call: no retries, no caching. Callers own the loading and
//! error states.

use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;

/// Per-request timeout for every external API
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Errors from external HTTP APIs
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Resource not found (404)")]
    NotFound,

    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    #[error("Request failed: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid response: {0}")]
    Parse(String),
}

impl ApiError {
    /// Whether the error came from the transport rather than the payload
    pub fn is_network(&self) -> bool {
        matches!(self, ApiError::Network(_) | ApiError::Status(_))
    }
}

/// Thin GET-and-decode wrapper around a base URL
#[derive(Debug, Clone)]
pub struct JsonClient {
    base_url: String,
    client: reqwest::Client,
}

impl JsonClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: build_client(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a resource path
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// Bounded by [`REQUEST_TIMEOUT`] whichever client was built
    fn request(&self, url: &str, query: &[(&str, String)]) -> reqwest::RequestBuilder {
        self.client
            .get(url)
            .query(query)
            .timeout(REQUEST_TIMEOUT)
            .header("Accept", "application/json")
    }

    /// GET `path` with `query` and decode the JSON body
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path);
        tracing::debug!(%url, "GET");

        let response = self.request(&url, query).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(ApiError::NotFound),
            status if status.is_success() => {
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| ApiError::Parse(format!("JSON parse error: {}", e)))
            }
            status => {
                tracing::warn!(%url, status = status.as_u16(), "request rejected");
                Err(ApiError::Status(status.as_u16()))
            }
        }
    }
}

fn build_client() -> reqwest::Client {
    match reqwest::Client::builder().timeout(REQUEST_TIMEOUT).build() {
        Ok(client) => client,
        Err(e) => {
            tracing::warn!(error = %e, "HTTP client setup failed, using defaults");
            reqwest::Client::new()
        }
    }
}
