//! Application configuration.
//!
//! `AppConfig` mirrors the server's public `config.json` document: the forum
//! title and the ordered list of OAuth provider ids to offer for sign-in.
//! Loaded once at startup, best effort; a missing or broken document leaves
//! the defaults in place and never blocks the auth check.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Path of the public config document, relative to the server base URL.
pub const CONFIG_PATH: &str = "config.json";

/// Public client configuration served by the forum backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Forum title.
    pub title: String,
    /// Ordered OAuth provider ids (e.g. "google", "github").
    pub oauth: Vec<String>,
}

impl AppConfig {
    /// Fetches the public client configuration from the server.
    ///
    /// # Errors
    /// Returns an error if the request fails, the server answers a
    /// non-success status, or the body is not valid JSON.
    pub async fn fetch(http: &reqwest::Client, base_url: &str) -> Result<Self> {
        let url = format!("{}/{CONFIG_PATH}", base_url.trim_end_matches('/'));
        let response = http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("failed to request {url}"))?;

        if !response.status().is_success() {
            anyhow::bail!("config request failed (HTTP {})", response.status());
        }

        response
            .json()
            .await
            .with_context(|| format!("failed to parse {CONFIG_PATH}"))
    }
}

pub mod paths {
    //! Path resolution for durable client storage.
    //!
    //! Gossip home resolution order:
    //! 1. GOSSIP_HOME environment variable (if set)
    //! 2. ~/.gossip (default)

    use std::path::PathBuf;

    /// Returns the gossip home directory.
    pub fn gossip_home() -> PathBuf {
        if let Ok(home) = std::env::var("GOSSIP_HOME") {
            return PathBuf::from(home);
        }

        std::env::var("HOME")
            .map(|h| PathBuf::from(h).join(".gossip"))
            .unwrap_or_else(|_| PathBuf::from(".gossip"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Test: a partial config document fills the rest with defaults.
    #[test]
    fn test_partial_config_uses_defaults() {
        let config: AppConfig = serde_json::from_str(r#"{"title":"gossip"}"#).unwrap();
        assert_eq!(config.title, "gossip");
        assert!(config.oauth.is_empty());
    }

    /// Test: provider order is preserved.
    #[test]
    fn test_provider_order_preserved() {
        let config: AppConfig =
            serde_json::from_str(r#"{"title":"t","oauth":["google","facebook","github"]}"#)
                .unwrap();
        assert_eq!(config.oauth, ["google", "facebook", "github"]);
    }
}
