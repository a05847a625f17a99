//! Configuration management for reeltui
//!
//! Handles config file loading and endpoint/API key resolution.
//! Config is stored at ~/.config/reeltui/config.toml

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::stream::resolver::{PolicyError, ProviderPolicy};

/// Catalog API used when nothing else is configured
pub const DEFAULT_CATALOG_URL: &str = "http://localhost:8000/api";

/// Stream proxy used when nothing else is configured
pub const DEFAULT_PROXY_URL: &str = "http://localhost:3000";

// Values baked in at build time, if any
const BUILD_CATALOG_URL: Option<&str> = option_env!("REELTUI_CATALOG_URL");
const BUILD_PROXY_URL: Option<&str> = option_env!("REELTUI_PROXY_URL");
const BUILD_TMDB_API_KEY: Option<&str> = option_env!("TMDB_API_KEY");

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct Config {
    /// Catalog API base URL
    pub catalog_url: Option<String>,
    /// Stream proxy base URL
    pub proxy_url: Option<String>,
    /// TMDB API key
    pub tmdb_api_key: Option<String>,
    /// mpv binary to launch
    pub mpv_path: Option<String>,
    /// Regex patterns for hosts whose leading server entry is skipped
    pub low_quality_hosts: Option<Vec<String>>,
    /// Providers whose sources must be extracted through the proxy
    pub extraction_providers: Option<Vec<String>>,
}

impl Config {
    /// Get config file path (~/.config/reeltui/config.toml)
    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("reeltui").join("config.toml"))
    }

    /// Load config from the default file, or return default if not found
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "ignoring unreadable config");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Load config from a specific file; a missing file is an empty config
    pub fn load_from(path: &Path) -> Result<Self> {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()))
            }
        };
        toml::from_str(&text).with_context(|| format!("Invalid config in {}", path.display()))
    }

    /// Catalog base URL: `REELTUI_CATALOG_URL`, config file, build-time value, default
    pub fn catalog_url(&self) -> String {
        env_or("REELTUI_CATALOG_URL", self.catalog_url.as_deref())
            .unwrap_or_else(|| BUILD_CATALOG_URL.unwrap_or(DEFAULT_CATALOG_URL).to_string())
    }

    /// Proxy base URL: `REELTUI_PROXY_URL`, config file, build-time value, default
    pub fn proxy_url(&self) -> String {
        env_or("REELTUI_PROXY_URL", self.proxy_url.as_deref())
            .unwrap_or_else(|| BUILD_PROXY_URL.unwrap_or(DEFAULT_PROXY_URL).to_string())
    }

    /// TMDB API key with fallback chain:
    /// 1. Environment variable TMDB_API_KEY
    /// 2. Key from config file
    /// 3. Key compiled in from TMDB_API_KEY at build time
    pub fn tmdb_api_key(&self) -> Option<String> {
        env_or("TMDB_API_KEY", self.tmdb_api_key.as_deref())
            .or_else(|| BUILD_TMDB_API_KEY.map(str::to_string))
    }

    /// mpv program to launch
    pub fn mpv_program(&self) -> String {
        match &self.mpv_path {
            Some(path) if !path.is_empty() => path.clone(),
            _ => default_mpv(),
        }
    }

    /// Provider policy from config, falling back to the defaults per field
    pub fn provider_policy(&self) -> Result<ProviderPolicy, PolicyError> {
        if self.low_quality_hosts.is_none() && self.extraction_providers.is_none() {
            return Ok(ProviderPolicy::default());
        }
        let hosts = self
            .low_quality_hosts
            .clone()
            .unwrap_or_else(|| vec![r"cloud\.hownetwork".to_string()]);
        let providers = self
            .extraction_providers
            .clone()
            .unwrap_or_else(|| vec!["TURBOV".to_string()]);
        ProviderPolicy::new(hosts, providers)
    }
}

fn env_or(var: &str, configured: Option<&str>) -> Option<String> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| configured.filter(|v| !v.trim().is_empty()).map(str::to_string))
}

#[cfg(unix)]
fn default_mpv() -> String {
    crate::player::mpv::default_program()
}

#[cfg(not(unix))]
fn default_mpv() -> String {
    "mpv".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert!(config.tmdb_api_key.is_none());
        assert!(config.catalog_url.is_none());
        assert!(!config.mpv_program().is_empty());
    }

    #[test]
    fn test_parse_toml() {
        let config: Config = toml::from_str(
            r#"
            catalog_url = "https://catalog.test/api"
            proxy_url = "https://proxy.test"
            extraction_providers = ["TURBOV", "FASTX"]
            "#,
        )
        .unwrap();
        assert_eq!(config.catalog_url.as_deref(), Some("https://catalog.test/api"));
        let policy = config.provider_policy().unwrap();
        assert!(policy.requires_extraction("fastx"));
        assert!(policy.is_low_quality("https://cloud.hownetwork/v"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let path = std::env::temp_dir().join(format!("reeltui-missing-{}.toml", uuid::Uuid::new_v4()));
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = std::env::temp_dir().join(format!("reeltui-cfg-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, "proxy_url = \"http://127.0.0.1:9000\"\nmpv_path = \"/opt/mpv\"\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.proxy_url.as_deref(), Some("http://127.0.0.1:9000"));
        assert_eq!(config.mpv_program(), "/opt/mpv");

        std::fs::write(&path, "proxy_url = [").unwrap();
        assert!(Config::load_from(&path).is_err());
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_bad_policy_is_error() {
        let config = Config {
            low_quality_hosts: Some(vec!["[".into()]),
            ..Default::default()
        };
        assert!(config.provider_policy().is_err());
    }
}
