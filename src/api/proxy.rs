//! Local stream proxy client
//!
//! The proxy at `{base}/api/movies/streams?url=<source>` either extracts a
//! direct media URL (`{type, url}`) or serves an embeddable player page.

use crate::api::http::{ApiError, JsonClient};
use crate::models::ResolvedStream;

const STREAMS_PATH: &str = "api/movies/streams";

/// Stream proxy client
#[derive(Debug, Clone)]
pub struct ProxyClient {
    http: JsonClient,
}

impl ProxyClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: JsonClient::new(base_url),
        }
    }

    /// URL of the embeddable player page for a source
    pub fn embed_url(&self, source_url: &str) -> String {
        format!(
            "{}?url={}",
            self.http.url(STREAMS_PATH),
            urlencoding::encode(source_url)
        )
    }

    /// Ask the proxy to extract a direct media URL from `source_url`
    ///
    /// A payload without a usable `type`/`url` pair is reported as `None`.
    pub async fn extract(&self, source_url: &str) -> Result<Option<ResolvedStream>, ApiError> {
        let value: serde_json::Value = self
            .http
            .get(STREAMS_PATH, &[("url", source_url.to_string())])
            .await?;

        let stream: Option<ResolvedStream> = serde_json::from_value(value).ok();
        Ok(stream.filter(|s| !s.kind.is_empty() && !s.url.is_empty()))
    }
}
