//! The extraction pipeline: resolve, partition, normalize, aggregate
//!
//! Paths are processed strictly sequentially, in resolution order, so
//! record order is deterministic. Directory runs isolate per-file
//! partition failures; single-file and URL runs propagate them.

use std::path::{Path, PathBuf};

use crate::engine::{PartitionEngine, Strategy};
use crate::error::Result;
use crate::normalize::{normalize, Record};
use crate::source::{self, SourceKind};

/// Per-file failure captured during a batch run
#[derive(Debug, Clone)]
pub struct FailureNotice {
    /// Input that failed to partition
    pub path: PathBuf,
    /// Engine error message
    pub message: String,
}

/// Ordered records plus per-file failure notices
///
/// Every enumerated, extension-matching file either contributed records
/// or has exactly one failure notice; nothing is silently dropped.
#[derive(Debug, Default)]
pub struct BatchResult {
    /// Normalized records in element order
    pub records: Vec<Record>,
    /// Inputs the engine could not process
    pub failures: Vec<FailureNotice>,
}

impl BatchResult {
    /// Whether any input failed
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }
}

/// Progress reporting seam for callers that want to surface run status
///
/// The pipeline reports through this trait instead of printing; display
/// belongs to the caller. All hooks default to no-ops.
pub trait ProgressReporter: Send + Sync {
    /// A source was resolved into `total` input paths
    fn source_resolved(&self, _kind: SourceKind, _total: usize) {}
    /// An input is about to be partitioned
    fn file_started(&self, _path: &Path) {}
    /// An input was partitioned and normalized
    fn file_completed(&self, _path: &Path, _records: usize) {}
    /// An input failed and was recorded as a failure notice
    fn file_failed(&self, _path: &Path, _message: &str) {}
}

/// Reporter that discards all progress events
#[derive(Debug, Default)]
pub struct NoopReporter;

impl ProgressReporter for NoopReporter {}

/// Document extraction pipeline around a partition engine
pub struct ExtractionPipeline<E> {
    engine: E,
    strategy: Strategy,
    reporter: Box<dyn ProgressReporter>,
}

impl<E: PartitionEngine> ExtractionPipeline<E> {
    /// Create a pipeline with the given engine and strategy
    pub fn new(engine: E, strategy: Strategy) -> Self {
        Self {
            engine,
            strategy,
            reporter: Box::new(NoopReporter),
        }
    }

    /// Replace the progress reporter
    #[must_use]
    pub fn with_reporter(mut self, reporter: Box<dyn ProgressReporter>) -> Self {
        self.reporter = reporter;
        self
    }

    /// Resolve a source string and extract records from every input it
    /// yields
    ///
    /// Directory sources capture partition failures per file and
    /// continue; single-file and URL sources propagate the first error.
    pub async fn run(&self, source: &str) -> Result<BatchResult> {
        let resolved = source::resolve(source).await?;
        self.reporter
            .source_resolved(resolved.kind, resolved.paths.len());

        let result = match resolved.kind {
            SourceKind::Directory => self.process_batch(&resolved.paths).await,
            SourceKind::File | SourceKind::Url => {
                let mut result = BatchResult::default();
                for path in &resolved.paths {
                    result.records.extend(self.process_file(path).await?);
                }
                result
            }
        };

        // `resolved` drops here; a URL download's temp file goes with it.
        Ok(result)
    }

    /// Partition and normalize a single input
    pub async fn process_file(&self, path: &Path) -> Result<Vec<Record>> {
        tracing::info!("processing '{}' (strategy={})", path.display(), self.strategy);
        self.reporter.file_started(path);

        let elements = self.engine.partition(path, self.strategy).await?;
        let records: Vec<Record> = elements.iter().map(normalize).collect();

        self.reporter.file_completed(path, records.len());
        Ok(records)
    }

    /// Process paths in order, isolating per-file partition failures
    ///
    /// One unreadable or corrupt document never aborts the run.
    pub async fn process_batch(&self, paths: &[PathBuf]) -> BatchResult {
        let mut result = BatchResult::default();

        for path in paths {
            match self.process_file(path).await {
                Ok(records) => result.records.extend(records),
                Err(err) => {
                    let message = err.to_string();
                    tracing::warn!("skipping '{}': {message}", path.display());
                    self.reporter.file_failed(path, &message);
                    result.failures.push(FailureNotice {
                        path: path.clone(),
                        message,
                    });
                }
            }
        }

        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RawElement;
    use crate::error::Error;
    use crate::normalize::ElementKind;
    use crate::output::{self, OutputFormat};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Engine fake scripted by file name
    #[derive(Default)]
    struct ScriptedEngine {
        responses: HashMap<String, Vec<RawElement>>,
        failures: HashMap<String, String>,
        calls: Mutex<Vec<PathBuf>>,
    }

    impl ScriptedEngine {
        fn respond(mut self, name: &str, elements: Vec<RawElement>) -> Self {
            self.responses.insert(name.to_string(), elements);
            self
        }

        fn fail(mut self, name: &str, message: &str) -> Self {
            self.failures.insert(name.to_string(), message.to_string());
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|p| p.file_name().unwrap().to_str().unwrap().to_string())
                .collect()
        }
    }

    #[async_trait]
    impl PartitionEngine for &ScriptedEngine {
        async fn partition(&self, path: &Path, _strategy: Strategy) -> Result<Vec<RawElement>> {
            self.calls.lock().unwrap().push(path.to_path_buf());
            let name = path.file_name().unwrap().to_str().unwrap();

            if let Some(message) = self.failures.get(name) {
                return Err(Error::partition(path, message.clone()));
            }
            Ok(self.responses.get(name).cloned().unwrap_or_default())
        }
    }

    fn text_element(tag: &str, text: &str) -> RawElement {
        RawElement {
            tag: tag.to_string(),
            text: text.to_string(),
            metadata: serde_json::Map::new(),
        }
    }

    #[tokio::test]
    async fn test_directory_batch_isolates_failures() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("b.xyz"), b"unsupported").unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"corrupt").unwrap();

        let engine = ScriptedEngine::default()
            .respond(
                "a.pdf",
                vec![
                    text_element("Title", "Invoice Number: 12345"),
                    text_element("NarrativeText", "Thank you."),
                ],
            )
            .fail("c.pdf", "corrupt document");

        let pipeline = ExtractionPipeline::new(&engine, Strategy::HiRes);
        let result = pipeline.run(dir.path().to_str().unwrap()).await.unwrap();

        assert_eq!(result.records.len(), 2);
        assert_eq!(
            result.records[0],
            Record::FormField {
                kind: ElementKind::FormField,
                key: "Invoice Number".to_string(),
                value: "12345".to_string(),
                metadata: Default::default(),
            }
        );
        assert_eq!(
            result.records[1],
            Record::Element {
                kind: ElementKind::NarrativeText,
                text: "Thank you.".to_string(),
                metadata: Default::default(),
            }
        );

        assert_eq!(result.failures.len(), 1);
        assert!(result.failures[0].path.ends_with("c.pdf"));
        assert!(result.failures[0].message.contains("corrupt document"));
        assert!(result.is_partial());

        // Unsupported extensions are never submitted to the engine.
        assert_eq!(engine.calls(), vec!["a.pdf", "c.pdf"]);
    }

    #[tokio::test]
    async fn test_batch_json_output_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.pdf"), b"pdf").unwrap();
        std::fs::write(dir.path().join("c.pdf"), b"corrupt").unwrap();

        let engine = ScriptedEngine::default()
            .respond(
                "a.pdf",
                vec![
                    text_element("Title", "Invoice Number: 12345"),
                    text_element("NarrativeText", "Thank you."),
                ],
            )
            .fail("c.pdf", "corrupt document");

        let pipeline = ExtractionPipeline::new(&engine, Strategy::Fast);
        let result = pipeline.run(dir.path().to_str().unwrap()).await.unwrap();

        let rendered = output::render(&result.records, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&rendered).unwrap();
        assert_eq!(value["elements"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_single_file_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.pdf");
        std::fs::write(&path, b"corrupt").unwrap();

        let engine = ScriptedEngine::default().fail("bad.pdf", "corrupt document");
        let pipeline = ExtractionPipeline::new(&engine, Strategy::HiRes);

        let err = pipeline.run(path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, Error::Partition { .. }));
    }

    #[tokio::test]
    async fn test_empty_directory_yields_empty_result() {
        let dir = tempfile::tempdir().unwrap();

        let engine = ScriptedEngine::default();
        let pipeline = ExtractionPipeline::new(&engine, Strategy::Auto);
        let result = pipeline.run(dir.path().to_str().unwrap()).await.unwrap();

        assert!(result.records.is_empty());
        assert!(result.failures.is_empty());
        assert!(!result.is_partial());
    }
}
