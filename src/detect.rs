//! Source format sniffing.
//!
//! The pipeline only opens PDFs, but the partitioner and the CLI also see
//! plain-text files, so detection answers two questions: "is this a PDF, and
//! which version" and "what kind of source is this path".

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
const VERSION_LEN: usize = 3; // e.g., "1.7"
const HEADER_PROBE: usize = 16;

/// Kind of input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A PDF document
    Pdf,
    /// A UTF-8 plain-text file
    PlainText,
    /// Anything else
    Unknown,
}

impl SourceKind {
    /// Classify a path, preferring the file header over the extension.
    pub fn of<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        if pdf_version_of_path(path).is_ok() {
            return SourceKind::Pdf;
        }
        if has_extension(path, "pdf") {
            // Named like a PDF but the header is wrong; let the opener report it.
            return SourceKind::Pdf;
        }
        if has_extension(path, "txt") || has_extension(path, "text") {
            return SourceKind::PlainText;
        }
        SourceKind::Unknown
    }
}

/// Case-insensitive extension check.
pub fn has_extension<P: AsRef<Path>>(path: P, ext: &str) -> bool {
    path.as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(ext))
        .unwrap_or(false)
}

/// Read the PDF version from the header of a file.
pub fn pdf_version_of_path<P: AsRef<Path>>(path: P) -> Result<String> {
    let file = File::open(path)?;
    let mut header = Vec::with_capacity(HEADER_PROBE);
    file.take(HEADER_PROBE as u64).read_to_end(&mut header)?;
    pdf_version(&header)
}

/// Read the PDF version (e.g. "1.7") from the leading bytes of a document.
pub fn pdf_version(data: &[u8]) -> Result<String> {
    if data.len() < PDF_MAGIC.len() + VERSION_LEN || !data.starts_with(PDF_MAGIC) {
        return Err(Error::UnknownFormat);
    }

    let version_bytes = &data[PDF_MAGIC.len()..PDF_MAGIC.len() + VERSION_LEN];
    let version = String::from_utf8_lossy(version_bytes).to_string();
    if !is_valid_version(&version) {
        return Err(Error::UnsupportedVersion(version));
    }
    Ok(version)
}

fn is_valid_version(version: &str) -> bool {
    let bytes = version.as_bytes();
    bytes.len() == 3 && bytes[0].is_ascii_digit() && bytes[1] == b'.' && bytes[2].is_ascii_digit()
}

/// Check if bytes start with a valid PDF header.
pub fn is_pdf_bytes(data: &[u8]) -> bool {
    pdf_version(data).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_pdf_version() {
        assert_eq!(pdf_version(b"%PDF-1.7\n%\xe2\xe3").unwrap(), "1.7");
        assert_eq!(pdf_version(b"%PDF-2.0\n").unwrap(), "2.0");
    }

    #[test]
    fn test_invalid_headers() {
        assert!(matches!(pdf_version(b"<!DOCTYPE html>"), Err(Error::UnknownFormat)));
        assert!(matches!(pdf_version(b"%PDF"), Err(Error::UnknownFormat)));
        assert!(matches!(
            pdf_version(b"%PDF-x.y"),
            Err(Error::UnsupportedVersion(_))
        ));
        assert!(!is_pdf_bytes(b""));
    }

    #[test]
    fn test_source_kind() {
        let dir = tempfile::tempdir().unwrap();

        let pdf = dir.path().join("scan.bin");
        File::create(&pdf).unwrap().write_all(b"%PDF-1.4\n").unwrap();
        assert_eq!(SourceKind::of(&pdf), SourceKind::Pdf);

        let txt = dir.path().join("notes.TXT");
        File::create(&txt).unwrap().write_all(b"hello").unwrap();
        assert_eq!(SourceKind::of(&txt), SourceKind::PlainText);

        let other = dir.path().join("data.csv");
        File::create(&other).unwrap().write_all(b"a,b").unwrap();
        assert_eq!(SourceKind::of(&other), SourceKind::Unknown);
    }

    #[test]
    fn test_has_extension_case_insensitive() {
        assert!(has_extension("Report.PDF", "pdf"));
        assert!(!has_extension("report.pdfx", "pdf"));
        assert!(!has_extension("README", "pdf"));
    }
}
