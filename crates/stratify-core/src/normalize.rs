//! Element normalization and the form-field heuristic
//!
//! Every raw element from the partition engine becomes exactly one
//! record, in element order. Text containing a colon is reclassified as
//! a key/value form field by splitting at the first occurrence.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::engine::RawElement;

/// Closed set of element kinds the engine is known to report
///
/// Unrecognized tags map to `Unknown` rather than carrying an open-ended
/// runtime string through the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ElementKind {
    Title,
    NarrativeText,
    ListItem,
    Table,
    Image,
    Header,
    Footer,
    FigureCaption,
    Address,
    EmailAddress,
    PageBreak,
    UncategorizedText,
    CompositeElement,
    /// Label/value pair produced by the form-field heuristic; never
    /// reported by the engine itself
    #[serde(rename = "form_field")]
    FormField,
    /// Fallback for tags this version does not recognize
    Unknown,
}

impl ElementKind {
    /// Map an engine-reported tag through the fixed lookup
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "Title" => Self::Title,
            "NarrativeText" => Self::NarrativeText,
            "ListItem" => Self::ListItem,
            "Table" => Self::Table,
            "Image" => Self::Image,
            "Header" => Self::Header,
            "Footer" => Self::Footer,
            "FigureCaption" => Self::FigureCaption,
            "Address" => Self::Address,
            "EmailAddress" => Self::EmailAddress,
            "PageBreak" => Self::PageBreak,
            "UncategorizedText" => Self::UncategorizedText,
            "CompositeElement" => Self::CompositeElement,
            _ => Self::Unknown,
        }
    }
}

/// Normalized output record
///
/// Serializes to `{"type": <kind>, "text": ..., "metadata": {...}}` for
/// generic elements and `{"type": "form_field", "key": ..., "value": ...,
/// "metadata": {...}}` for form fields.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Record {
    /// Key/value pair extracted by the form-field heuristic
    FormField {
        #[serde(rename = "type")]
        kind: ElementKind,
        key: String,
        value: String,
        metadata: BTreeMap<String, String>,
    },
    /// Generic element record
    Element {
        #[serde(rename = "type")]
        kind: ElementKind,
        text: String,
        metadata: BTreeMap<String, String>,
    },
}

impl std::fmt::Display for Record {
    /// Stable text projection used by the line-joined output mode
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Record::FormField { key, value, .. } => write!(f, "{key}: {value}"),
            Record::Element { text, .. } => f.write_str(text),
        }
    }
}

/// Convert a raw engine element into a normalized record
pub fn normalize(element: &RawElement) -> Record {
    let metadata = flatten_metadata(&element.metadata);

    // First colon wins: a colon inside the value (a time, a ratio) is
    // still treated as the separator. The original tool behaves the same
    // way.
    if let Some(idx) = element.text.find(':') {
        let key = element.text[..idx].trim().to_string();
        let value = element.text[idx + 1..].trim().to_string();
        Record::FormField {
            kind: ElementKind::FormField,
            key,
            value,
            metadata,
        }
    } else {
        Record::Element {
            kind: ElementKind::from_tag(&element.tag),
            text: element.text.clone(),
            metadata,
        }
    }
}

/// Flatten the engine's attribute bag into an ordered string map
///
/// Underscore-prefixed keys are internal and dropped; JSON strings are
/// kept verbatim, other values are rendered as compact JSON.
fn flatten_metadata(bag: &serde_json::Map<String, serde_json::Value>) -> BTreeMap<String, String> {
    bag.iter()
        .filter(|(key, _)| !key.starts_with('_'))
        .map(|(key, value)| {
            let rendered = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), rendered)
        })
        .collect()
}
