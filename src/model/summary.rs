//! Per-document and per-page summaries.

use super::{Diagnostic, ImageRecord, TableRecord, TextBlock, UnstructuredElement};
use serde::{Deserialize, Serialize};

/// Everything extracted from one page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageSummary {
    /// 1-based page number
    pub page_number: u32,

    /// Native text blocks, or a single fallback OCR block
    pub text_blocks: Vec<TextBlock>,

    /// Embedded images with their OCR text
    pub images: Vec<ImageRecord>,

    /// Tables routed to this page
    pub tables: Vec<TableRecord>,

    /// Partitioned elements routed to this page
    pub unstructured_elements: Vec<UnstructuredElement>,
}

impl PageSummary {
    /// Create an empty page summary.
    pub fn new(page_number: u32) -> Self {
        Self {
            page_number,
            ..Default::default()
        }
    }

    /// The per-page count line.
    pub fn count_line(&self) -> String {
        format!(
            "Page {}: {} text blocks, {} images, {} tables, {} unstructured elements",
            self.page_number,
            self.text_blocks.len(),
            self.images.len(),
            self.tables.len(),
            self.unstructured_elements.len()
        )
    }
}

/// Result of processing one document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DocumentSummary {
    /// Source file name
    pub filename: String,

    /// Pages in order, numbered `1..=N`
    pub pages: Vec<PageSummary>,

    /// Soft failures met while building the summary
    #[serde(default)]
    pub diagnostics: Vec<Diagnostic>,
}

impl DocumentSummary {
    /// Create a summary with `page_count` empty pages.
    pub fn new(filename: impl Into<String>, page_count: u32) -> Self {
        Self {
            filename: filename.into(),
            pages: (1..=page_count).map(PageSummary::new).collect(),
            diagnostics: Vec::new(),
        }
    }

    /// Number of pages.
    pub fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    /// Get a page by 1-based number.
    pub fn page(&self, number: u32) -> Option<&PageSummary> {
        let idx = number.checked_sub(1)? as usize;
        self.pages.get(idx)
    }

    /// Get a mutable page by 1-based number.
    pub fn page_mut(&mut self, number: u32) -> Option<&mut PageSummary> {
        let idx = number.checked_sub(1)? as usize;
        self.pages.get_mut(idx)
    }

    /// One count line per page.
    pub fn count_lines(&self) -> Vec<String> {
        self.pages.iter().map(PageSummary::count_line).collect()
    }

    /// Total number of tables across pages.
    pub fn table_count(&self) -> usize {
        self.pages.iter().map(|p| p.tables.len()).sum()
    }

    /// Whether any soft failure was recorded.
    pub fn has_diagnostics(&self) -> bool {
        !self.diagnostics.is_empty()
    }
}
