//! Partition engine boundary and the Unstructured-compatible HTTP client
//!
//! The engine is an external capability: it turns one document into an
//! ordered sequence of raw elements. Everything about layout analysis,
//! OCR, and office-format reading lives behind this seam.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::config::EngineConfig;
use crate::error::{Error, Result};

/// Speed/accuracy tradeoff passed to the partition engine
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Embedded text layers only
    Fast,
    /// Layout/model-based segmentation; required for reliable form-field
    /// extraction
    #[default]
    HiRes,
    /// Force full optical character recognition
    OcrOnly,
    /// Let the engine choose
    Auto,
}

impl Strategy {
    /// Wire name understood by the partition endpoint
    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Fast => "fast",
            Strategy::HiRes => "hi_res",
            Strategy::OcrOnly => "ocr_only",
            Strategy::Auto => "auto",
        }
    }
}

impl std::fmt::Display for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw element returned by the partition engine
///
/// Owned transiently while a document is being normalized; never persisted.
#[derive(Debug, Clone, Deserialize)]
pub struct RawElement {
    /// Element kind tag as reported by the engine
    #[serde(rename = "type")]
    pub tag: String,
    /// Text payload
    #[serde(default)]
    pub text: String,
    /// Attribute bag
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// External capability that turns one document into an ordered sequence
/// of raw elements
#[async_trait]
pub trait PartitionEngine: Send + Sync {
    /// Partition a single document under the given strategy
    async fn partition(&self, path: &Path, strategy: Strategy) -> Result<Vec<RawElement>>;
}

/// HTTP client for an Unstructured-compatible partition endpoint
pub struct UnstructuredClient {
    client: Client,
    config: EngineConfig,
}

impl UnstructuredClient {
    /// Create a client from configuration
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { client, config })
    }
}

#[async_trait]
impl PartitionEngine for UnstructuredClient {
    async fn partition(&self, path: &Path, strategy: Strategy) -> Result<Vec<RawElement>> {
        let data = tokio::fs::read(path)
            .await
            .map_err(|e| Error::partition(path, format!("failed to read file: {e}")))?;

        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("document")
            .to_string();

        tracing::debug!(
            "partitioning '{}' ({} bytes, strategy={})",
            path.display(),
            data.len(),
            strategy
        );

        let form = reqwest::multipart::Form::new()
            .part(
                "files",
                reqwest::multipart::Part::bytes(data).file_name(filename),
            )
            .text("strategy", strategy.as_str());

        let mut request = self.client.post(&self.config.api_url).multipart(form);
        if let Some(ref api_key) = self.config.api_key {
            request = request.header("unstructured-api-key", api_key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::partition(path, format!("request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::partition(
                path,
                format!("engine returned {status}: {body}"),
            ));
        }

        let elements: Vec<RawElement> = response
            .json()
            .await
            .map_err(|e| Error::partition(path, format!("invalid engine response: {e}")))?;

        tracing::debug!(
            "engine returned {} elements for '{}'",
            elements.len(),
            path.display()
        );

        Ok(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_wire_names() {
        assert_eq!(Strategy::Fast.as_str(), "fast");
        assert_eq!(Strategy::HiRes.as_str(), "hi_res");
        assert_eq!(Strategy::OcrOnly.as_str(), "ocr_only");
        assert_eq!(Strategy::Auto.as_str(), "auto");
    }

    #[test]
    fn test_default_strategy_is_hi_res() {
        assert_eq!(Strategy::default(), Strategy::HiRes);
    }

    #[test]
    fn test_raw_element_deserialization() {
        let raw = r#"
        [
            {
                "type": "NarrativeText",
                "text": "Thank you.",
                "metadata": {"page_number": 1, "filename": "a.pdf"}
            },
            {
                "type": "Title",
                "text": "Invoice"
            }
        ]
        "#;

        let elements: Vec<RawElement> = serde_json::from_str(raw).unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].tag, "NarrativeText");
        assert_eq!(elements[0].text, "Thank you.");
        assert_eq!(elements[0].metadata.len(), 2);
        assert!(elements[1].metadata.is_empty());
    }
}
