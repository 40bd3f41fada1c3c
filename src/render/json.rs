//! JSON rendering for summaries.

use serde::Serialize;

use crate::error::Result;
use crate::model::DocumentSummary;
use crate::text::TextFileResult;

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

fn serialize<T: Serialize>(value: &T, format: JsonFormat) -> Result<String> {
    let json = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(value)?,
        JsonFormat::Compact => serde_json::to_string(value)?,
    };
    Ok(json)
}

/// Convert a document summary to JSON.
pub fn to_json(summary: &DocumentSummary, format: JsonFormat) -> Result<String> {
    serialize(summary, format)
}

/// Convert a text file result to JSON.
pub fn text_result_to_json(result: &TextFileResult, format: JsonFormat) -> Result<String> {
    serialize(result, format)
}
