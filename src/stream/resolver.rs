//! Stream resolution
//!
//! Turns the catalog's raw server list into [`StreamServer`]s carrying the
//! extraction capability flag, and resolves extraction-requiring servers
//! through the stream proxy.

use regex::Regex;
use std::collections::HashSet;
use thiserror::Error;

use crate::api::{ApiError, CatalogClient, ProxyClient, RawServer};
use crate::models::{ResolvedStream, StreamServer};

/// Invalid provider policy configuration
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("Invalid host pattern '{pattern}': {source}")]
    BadPattern {
        pattern: String,
        source: regex::Error,
    },
}

/// Which servers are skipped and which need server-side extraction
#[derive(Debug, Clone)]
pub struct ProviderPolicy {
    low_quality_hosts: Vec<Regex>,
    extraction_providers: HashSet<String>,
}

impl Default for ProviderPolicy {
    fn default() -> Self {
        Self {
            low_quality_hosts: vec![Regex::new(r"cloud\.hownetwork").expect("static pattern")],
            extraction_providers: ["TURBOV".to_string()].into_iter().collect(),
        }
    }
}

impl ProviderPolicy {
    /// Build a policy from host patterns (regular expressions) and provider names
    pub fn new<P, N>(low_quality_hosts: P, extraction_providers: N) -> Result<Self, PolicyError>
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        N: IntoIterator,
        N::Item: Into<String>,
    {
        let low_quality_hosts = low_quality_hosts
            .into_iter()
            .map(|p| {
                Regex::new(p.as_ref()).map_err(|source| PolicyError::BadPattern {
                    pattern: p.as_ref().to_string(),
                    source,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            low_quality_hosts,
            extraction_providers: extraction_providers
                .into_iter()
                .map(|n| n.into().to_ascii_uppercase())
                .collect(),
        })
    }

    /// Whether a URL points at a known low-quality host
    pub fn is_low_quality(&self, url: &str) -> bool {
        self.low_quality_hosts.iter().any(|re| re.is_match(url))
    }

    /// Whether a provider's sources must go through the proxy
    pub fn requires_extraction(&self, provider: &str) -> bool {
        self.extraction_providers
            .contains(&provider.trim().to_ascii_uppercase())
    }

    /// Tag raw servers and drop a low-quality leading entry
    pub fn apply(&self, raw: Vec<RawServer>) -> Vec<StreamServer> {
        let mut raw = raw;
        if raw.first().is_some_and(|s| self.is_low_quality(&s.url)) {
            let dropped = raw.remove(0);
            tracing::debug!(url = %dropped.url, "dropping low-quality leading server");
        }

        raw.into_iter()
            .map(|s| StreamServer {
                requires_extraction: self.requires_extraction(&s.provider),
                url: s.url,
                provider: s.provider,
            })
            .collect()
    }
}

/// Lists playback servers and resolves direct media URLs
#[derive(Debug, Clone)]
pub struct StreamResolver {
    catalog: CatalogClient,
    proxy: ProxyClient,
    policy: ProviderPolicy,
}

impl StreamResolver {
    pub fn new(catalog: CatalogClient, proxy: ProxyClient, policy: ProviderPolicy) -> Self {
        Self {
            catalog,
            proxy,
            policy,
        }
    }

    /// Servers for a movie, or the fetch error
    pub async fn try_list_servers(&self, movie_id: &str) -> Result<Vec<StreamServer>, ApiError> {
        let raw = self.catalog.streams(movie_id).await?;
        Ok(self.policy.apply(raw))
    }

    /// Servers for a movie; any failure yields an empty list
    pub async fn list_servers(&self, movie_id: &str) -> Vec<StreamServer> {
        match self.try_list_servers(movie_id).await {
            Ok(servers) => servers,
            Err(e) => {
                tracing::warn!(movie_id, error = %e, "failed to list stream servers");
                Vec::new()
            }
        }
    }

    /// Direct media URL for a server
    ///
    /// Servers that do not require extraction are never sent to the proxy and
    /// resolve to `None`; play them through [`StreamResolver::embed_url`].
    pub async fn resolve(&self, server: &StreamServer) -> Result<Option<ResolvedStream>, ApiError> {
        if !server.requires_extraction {
            return Ok(None);
        }
        let resolved = self.proxy.extract(&server.url).await?;
        if resolved.is_none() {
            tracing::warn!(url = %server.url, "proxy returned no direct stream");
        }
        Ok(resolved)
    }

    /// Embeddable player page for a server
    pub fn embed_url(&self, server: &StreamServer) -> String {
        self.proxy.embed_url(&server.url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(url: &str, provider: &str) -> RawServer {
        RawServer {
            url: url.to_string(),
            provider: provider.to_string(),
        }
    }

    #[test]
    fn test_drops_low_quality_first_entry() {
        let policy = ProviderPolicy::default();
        let servers = policy.apply(vec![
            raw("https://cloud.hownetwork/x", "X"),
            raw("https://y/z", "TURBOV"),
        ]);

        assert_eq!(servers.len(), 1);
        assert_eq!(servers[0].provider, "TURBOV");
        assert!(servers[0].requires_extraction);
    }

    #[test]
    fn test_only_first_entry_is_dropped() {
        let policy = ProviderPolicy::default();
        let servers = policy.apply(vec![
            raw("https://a/1", "P1"),
            raw("https://cloud.hownetwork/x", "X"),
        ]);
        assert_eq!(servers.len(), 2);
        assert!(!servers[0].requires_extraction);
    }

    #[test]
    fn test_custom_policy() {
        let policy = ProviderPolicy::new([r"slow\.example"], ["fastx"]).unwrap();
        assert!(policy.is_low_quality("https://slow.example/v"));
        assert!(policy.requires_extraction("FASTX"));
        assert!(!policy.requires_extraction("TURBOV"));
    }

    #[test]
    fn test_bad_pattern_rejected() {
        let err = ProviderPolicy::new(["("], Vec::<String>::new()).unwrap_err();
        assert!(err.to_string().contains("Invalid host pattern"));
    }

    #[test]
    fn test_empty_list() {
        assert!(ProviderPolicy::default().apply(vec![]).is_empty());
    }
}
