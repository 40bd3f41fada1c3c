//! Error types for docingest.

use std::io;
use thiserror::Error;

/// Result type alias for docingest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error types that can occur while ingesting a document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted.
    #[error("Document is encrypted")]
    Encrypted,

    /// Error resolving an embedded image to bytes.
    #[error("Image extraction error: {0}")]
    ImageExtract(String),

    /// Image bytes could not be decoded.
    #[error("Image decode error: {0}")]
    ImageDecode(String),

    /// The OCR engine failed.
    #[error("OCR engine error: {0}")]
    Ocr(String),

    /// A page could not be rasterized.
    #[error("Page render error: {0}")]
    Render(String),

    /// A table backend failed.
    #[error("Table extraction error: {0}")]
    Table(String),

    /// The partitioning backend failed.
    #[error("Partition error: {0}")]
    Partition(String),

    /// An external tool could not be started or exited unsuccessfully.
    #[error("{tool} failed: {message}")]
    Tool {
        /// Program that was invoked
        tool: String,
        /// Spawn error or captured stderr
        message: String,
    },

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}

impl From<image::ImageError> for Error {
    fn from(err: image::ImageError) -> Self {
        match err {
            image::ImageError::IoError(e) => Error::Io(e),
            _ => Error::ImageDecode(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::Encrypted;
        assert_eq!(err.to_string(), "Document is encrypted");

        let err = Error::PageOutOfRange(10, 5);
        assert_eq!(
            err.to_string(),
            "Page 10 is out of range (document has 5 pages)"
        );

        let err = Error::Tool {
            tool: "tesseract".to_string(),
            message: "not found".to_string(),
        };
        assert_eq!(err.to_string(), "tesseract failed: not found");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
