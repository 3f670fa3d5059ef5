//! Record serialization to text or JSON

use serde::Serialize;
use std::io::Write;
use std::path::Path;

use crate::error::{Error, Result};
use crate::normalize::Record;

/// Output rendering mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per record, newline-joined
    #[default]
    Text,
    /// Single JSON document with a top-level `elements` key
    Json,
}

#[derive(Serialize)]
struct ElementsDocument<'a> {
    elements: &'a [Record],
}

/// Render the record sequence in the given format
pub fn render(records: &[Record], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(records
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("\n")),
        OutputFormat::Json => {
            serde_json::to_string_pretty(&ElementsDocument { elements: records })
                .map_err(|e| Error::serialization(e.to_string()))
        }
    }
}

/// Write the rendered records to a file, or to stdout when no path is
/// given
///
/// The whole sequence is materialized before anything is written.
pub fn write(records: &[Record], format: OutputFormat, dest: Option<&Path>) -> Result<()> {
    let rendered = render(records, format)?;

    match dest {
        Some(path) => {
            std::fs::write(path, rendered.as_bytes())
                .map_err(|e| Error::serialization(format!("{}: {e}", path.display())))?;
            tracing::info!("wrote {} records to '{}'", records.len(), path.display());
        }
        None => {
            let stdout = std::io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .and_then(|()| handle.write_all(b"\n"))
                .map_err(|e| Error::serialization(e.to_string()))?;
        }
    }

    Ok(())
}
