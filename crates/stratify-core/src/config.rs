//! Partition engine client configuration

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

const DEFAULT_API_URL: &str = "https://api.unstructured.io/general/v0/general";

/// Configuration for the Unstructured-compatible partition endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Partition endpoint URL
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// API key sent in the `unstructured-api-key` header
    #[serde(default)]
    pub api_key: Option<String>,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_secs() -> u64 {
    120
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from an optional TOML file, then apply
    /// `UNSTRUCTURED_API_URL` / `UNSTRUCTURED_API_KEY` environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => {
                let raw = std::fs::read_to_string(p)?;
                toml::from_str(&raw).map_err(|e| Error::Config(e.to_string()))?
            }
            None => Self::default(),
        };

        if let Ok(api_url) = std::env::var("UNSTRUCTURED_API_URL") {
            config.api_url = api_url;
        }
        if let Ok(api_key) = std::env::var("UNSTRUCTURED_API_KEY") {
            config.api_key = Some(api_key);
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout_secs, 120);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: EngineConfig = toml::from_str(
            r#"
            api_url = "http://localhost:8000/general/v0/general"
            api_key = "secret"
            "#,
        )
        .unwrap();

        assert_eq!(config.api_url, "http://localhost:8000/general/v0/general");
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.timeout_secs, 120);
    }
}
