//! stratify-core: document extraction and normalization pipeline
//!
//! Resolves a source string (local file, remote URL, or directory tree)
//! into processable inputs, partitions each document through an external
//! partition engine under a selectable speed/accuracy strategy, normalizes
//! the returned elements into typed records, and renders the ordered
//! result as line-joined text or a single JSON document.

pub mod config;
pub mod engine;
pub mod error;
pub mod normalize;
pub mod output;
pub mod pipeline;
pub mod source;

pub use config::EngineConfig;
pub use engine::{PartitionEngine, RawElement, Strategy, UnstructuredClient};
pub use error::{Error, Result};
pub use normalize::{normalize, ElementKind, Record};
pub use output::OutputFormat;
pub use pipeline::{BatchResult, ExtractionPipeline, FailureNotice, NoopReporter, ProgressReporter};
pub use source::{resolve, ResolvedSource, SourceKind};
