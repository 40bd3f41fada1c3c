//! # docingest
//!
//! Document ingestion for PDF and plain-text files.
//!
//! Every page of a PDF is reduced to a structured summary: native text
//! blocks with their boxes, embedded images with OCR text, tables from
//! several detection passes and typed layout elements. Pages without a text
//! layer are rendered and OCR'd as a whole.
//!
//! ## Quick Start
//!
//! ```no_run
//! use docingest::{process_pdf, render, JsonFormat};
//!
//! fn main() -> docingest::Result<()> {
//!     let summary = process_pdf("report.pdf")?;
//!     for line in render::summary_lines(&summary) {
//!         println!("{}", line);
//!     }
//!     println!("{}", render::to_json(&summary, JsonFormat::Pretty)?);
//!     Ok(())
//! }
//! ```
//!
//! ## External tools
//!
//! OCR, page rasterization and two of the table passes run external
//! programs. Their locations come from the environment:
//!
//! - `TESSERACT_CMD`, `DOCINGEST_OCR_LANG`
//! - `PDFTOPPM_CMD`
//! - `JAVA_CMD`, `TABULA_JAR`
//! - `CAMELOT_CMD`
//! - `DOCINGEST_PARTITION_CMD` (optional external partitioner)

pub mod detect;
pub mod error;
pub mod extract;
pub mod flatten;
pub mod model;
pub mod ocr;
pub mod options;
pub mod parser;
pub mod pipeline;
pub mod render;
pub mod text;

mod tools;

// Re-export commonly used types
pub use detect::{is_pdf_bytes, pdf_version, SourceKind};
pub use error::{Error, Result};
pub use extract::{
    CamelotCli, CommandPartitioner, ImageExtractor, LayoutPartitioner, PagedTables, Partitioner,
    TableBackend, TableExtractor, TableOutcome, TabulaCli,
};
pub use flatten::{HarvestScope, TextHarvest};
pub use model::{
    BBox, Diagnostic, DiagnosticSource, DocumentSummary, Element, ElementKind, ExtractionMethod,
    ImageRecord, PageSummary, TableData, TableRecord, TextBlock, UnstructuredElement,
};
pub use ocr::{OcrConfig, OcrEngine, PageRenderer, PdftoppmRenderer, RenderConfig, TesseractCli};
pub use options::{ExtractOptions, TableRouting};
pub use parser::{LopdfBackend, PdfBackend};
pub use pipeline::{Pipeline, ProcessedFile};
pub use render::JsonFormat;
pub use text::{extract_txt_file, ReadStatus, TextFileResult};

use std::path::Path;

/// Pipeline configured from the environment.
fn env_pipeline() -> Pipeline {
    Pipeline::new(ExtractOptions::from_env())
}

/// Process a PDF file with options read from the environment.
///
/// # Example
///
/// ```no_run
/// use docingest::process_pdf;
///
/// let summary = process_pdf("report.pdf").unwrap();
/// println!("Pages: {}", summary.page_count());
/// ```
pub fn process_pdf<P: AsRef<Path>>(path: P) -> Result<DocumentSummary> {
    env_pipeline().process_pdf(path)
}

/// Process a PDF file with custom options.
pub fn process_pdf_with_options<P: AsRef<Path>>(
    path: P,
    options: ExtractOptions,
) -> Result<DocumentSummary> {
    Pipeline::new(options).process_pdf(path)
}

/// Process every PDF in a directory.
///
/// # Example
///
/// ```no_run
/// use docingest::process_directory;
///
/// for file in process_directory("./inbox").unwrap() {
///     match file.result {
///         Ok(summary) => println!("{}: {} pages", summary.filename, summary.page_count()),
///         Err(e) => eprintln!("{}: {}", file.path.display(), e),
///     }
/// }
/// ```
pub fn process_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<ProcessedFile>> {
    env_pipeline().process_directory(dir)
}

/// All image OCR text of a PDF, one image per line.
pub fn all_ocr_text<P: AsRef<Path>>(path: P) -> Result<String> {
    env_pipeline().all_ocr_text(path)
}

/// All text of a PDF on a single line.
///
/// # Example
///
/// ```no_run
/// use docingest::all_text_one_line;
///
/// let text = all_text_one_line("report.pdf").unwrap();
/// println!("{}", text);
/// ```
pub fn all_text_one_line<P: AsRef<Path>>(path: P) -> Result<String> {
    env_pipeline().all_text_one_line(path)
}

/// Process a PDF and render its summary as JSON.
pub fn to_json<P: AsRef<Path>>(path: P, format: JsonFormat) -> Result<String> {
    let summary = process_pdf(path)?;
    render::to_json(&summary, format)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_missing_file_fails() {
        let result = process_pdf("/nonexistent/docingest/missing.pdf");
        assert!(result.is_err());
    }

    #[test]
    fn test_process_non_pdf_is_unknown_format() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"<!DOCTYPE html><html></html>").unwrap();
        assert!(matches!(process_pdf(&path), Err(Error::UnknownFormat)));
    }

    #[test]
    fn test_process_directory_of_missing_dir_fails() {
        assert!(process_directory("/nonexistent/docingest").is_err());
    }

    #[test]
    fn test_detect_reexports() {
        assert!(is_pdf_bytes(b"%PDF-1.4\ntest"));
        assert_eq!(pdf_version(b"%PDF-1.7\n%x").unwrap(), "1.7");
        assert!(matches!(pdf_version(b"<html>"), Err(Error::UnknownFormat)));
    }
}
