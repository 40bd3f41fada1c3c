//! Summary types produced by document ingestion.
//!
//! Everything here is plain data: the pipeline builds a fresh
//! [`DocumentSummary`] per processed file and nothing is shared between runs
//! except the image files written to the working directory.

mod block;
mod diagnostic;
mod element;
mod summary;
mod table;

pub use block::{BBox, ImageRecord, TextBlock};
pub use diagnostic::{Diagnostic, DiagnosticSource};
pub use element::{Element, ElementKind, ElementMetadata, UnstructuredElement};
pub use summary::{DocumentSummary, PageSummary};
pub use table::{ExtractionMethod, TableData, TableMetadata, TableRecord};
