//! Source classification and resolution
//!
//! A source string is classified exactly once as a URL, a file, or a
//! directory, and resolved into the list of input paths to partition.
//! URL bodies are materialized into a scoped temporary file that is
//! removed when the resolved source goes out of scope.

use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use url::Url;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Classification of an input source, determined purely from the source
/// string and filesystem state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Remote document fetched over HTTP
    Url,
    /// Single local file
    File,
    /// Directory tree walked recursively
    Directory,
}

/// Extensions the partition engine understands
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    "bmp", "csv", "doc", "docx", "eml", "epub", "heic", "html", "jpeg", "png", "md", "msg", "odt",
    "org", "p7s", "pdf", "ppt", "pptx", "rst", "rtf", "tiff", "txt", "tsv", "xls", "xlsx", "xml",
];

/// A source resolved into processable input paths
///
/// For URL sources the downloaded body lives in a temporary file owned by
/// this value; dropping the `ResolvedSource` deletes it, on every exit
/// path.
#[derive(Debug)]
pub struct ResolvedSource {
    /// How the source string was classified
    pub kind: SourceKind,
    /// Input paths in traversal order
    pub paths: Vec<PathBuf>,
    _download: Option<NamedTempFile>,
}

/// Check whether a path's extension (case-insensitive) is in the
/// supported set
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
}

/// Classify and resolve a source string into input paths
pub async fn resolve(source: &str) -> Result<ResolvedSource> {
    if let Some(url) = parse_url(source) {
        return download(&url).await;
    }

    let path = PathBuf::from(source);
    if path.is_dir() {
        let paths = walk_directory(&path);
        tracing::info!(
            "resolved directory '{}' into {} supported files",
            path.display(),
            paths.len()
        );
        return Ok(ResolvedSource {
            kind: SourceKind::Directory,
            paths,
            _download: None,
        });
    }

    if !path.exists() {
        return Err(Error::NotFound(path));
    }

    Ok(ResolvedSource {
        kind: SourceKind::File,
        paths: vec![path],
        _download: None,
    })
}

/// Accept only absolute URLs with both a scheme and a host
fn parse_url(source: &str) -> Option<Url> {
    let url = Url::parse(source).ok()?;
    if url.has_host() {
        Some(url)
    } else {
        None
    }
}

async fn download(url: &Url) -> Result<ResolvedSource> {
    tracing::info!("downloading {url}");

    let response = reqwest::get(url.clone())
        .await
        .map_err(|e| Error::fetch(url.as_str(), e.to_string()))?;

    if !response.status().is_success() {
        return Err(Error::fetch(
            url.as_str(),
            format!("server returned {}", response.status()),
        ));
    }

    let body = response
        .bytes()
        .await
        .map_err(|e| Error::fetch(url.as_str(), e.to_string()))?;

    // Keep the URL's extension so the engine sees a sensible filename.
    let file = tempfile::Builder::new()
        .prefix("stratify-")
        .suffix(&url_suffix(url))
        .tempfile()?;
    std::fs::write(file.path(), &body)?;

    Ok(ResolvedSource {
        kind: SourceKind::Url,
        paths: vec![file.path().to_path_buf()],
        _download: Some(file),
    })
}

fn url_suffix(url: &Url) -> String {
    url.path_segments()
        .and_then(|segments| segments.last())
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(|ext| format!(".{ext}"))
        .unwrap_or_else(|| ".pdf".to_string())
}

fn walk_directory(dir: &Path) -> Vec<PathBuf> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| is_supported(path))
        .collect()
}
