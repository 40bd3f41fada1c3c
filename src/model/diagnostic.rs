//! Structured records of soft failures.

use serde::{Deserialize, Serialize};

/// The extraction source that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticSource {
    /// Resolving or persisting an embedded image
    ImageExtract,
    /// Decoding or recognizing an embedded image
    ImageOcr,
    /// Full-page render + OCR fallback
    FallbackOcr,
    /// Combined lattice/stream table pass
    TablesPrimary,
    /// Lattice and stream flavor table pass
    TablesFlavored,
    /// Page-by-page table pass
    TablesPaged,
    /// Document partitioning
    Partition,
}

/// One soft failure, kept alongside the partial results it degraded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Which source failed
    pub source: DiagnosticSource,

    /// 1-based page, for per-page sources
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,

    /// Error message
    pub message: String,
}

impl Diagnostic {
    /// A document-wide failure.
    pub fn new(source: DiagnosticSource, message: impl std::fmt::Display) -> Self {
        Self {
            source,
            page: None,
            message: message.to_string(),
        }
    }

    /// A failure tied to one page.
    pub fn on_page(source: DiagnosticSource, page: u32, message: impl std::fmt::Display) -> Self {
        Self {
            source,
            page: Some(page),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let source = serde_json::to_value(self.source)
            .ok()
            .and_then(|v| v.as_str().map(String::from))
            .unwrap_or_default();
        match self.page {
            Some(page) => write!(f, "{} (page {}): {}", source, page, self.message),
            None => write!(f, "{}: {}", source, self.message),
        }
    }
}
