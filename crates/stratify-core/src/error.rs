//! Error types for the extraction pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;

/// Extraction pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Remote source unreachable or returned a failure response
    #[error("Failed to fetch '{url}': {message}")]
    Fetch { url: String, message: String },

    /// Local path does not exist
    #[error("Path not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The partition engine failed on a specific input
    #[error("Failed to partition '{}': {message}", path.display())]
    Partition { path: PathBuf, message: String },

    /// The output destination could not be written
    #[error("Failed to write output: {0}")]
    Serialization(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a fetch error
    pub fn fetch(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Fetch {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Create a partition error for a specific input
    pub fn partition(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Partition {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization(message.into())
    }
}
