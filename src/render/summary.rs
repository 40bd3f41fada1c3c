//! Per-page count lines.

use crate::model::DocumentSummary;

/// One `Page N: a text blocks, b images, c tables, d unstructured elements`
/// line per page.
pub fn summary_lines(summary: &DocumentSummary) -> Vec<String> {
    summary.count_lines()
}
