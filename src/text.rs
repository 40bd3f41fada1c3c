//! Plain-text file reader.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Outcome of reading a text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReadStatus {
    /// The file was read and decoded
    Success,
    /// Reading or decoding failed
    Error,
}

/// Result of [`extract_txt_file`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFileResult {
    /// Path as given
    pub file: String,

    /// File content on success
    pub content: Option<String>,

    /// Read status
    pub status: ReadStatus,

    /// Error message on failure
    pub error: Option<String>,
}

impl TextFileResult {
    /// Whether the file was read.
    pub fn is_success(&self) -> bool {
        self.status == ReadStatus::Success
    }
}

/// Read a UTF-8 text file. Failures are reported in the result, never
/// returned as errors.
pub fn extract_txt_file<P: AsRef<Path>>(path: P) -> TextFileResult {
    let path = path.as_ref();
    let file = path.display().to_string();
    match std::fs::read_to_string(path) {
        Ok(content) => TextFileResult {
            file,
            content: Some(content),
            status: ReadStatus::Success,
            error: None,
        },
        Err(e) => {
            log::debug!("Cannot read {}: {}", file, e);
            TextFileResult {
                file,
                content: None,
                status: ReadStatus::Error,
                error: Some(e.to_string()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_reads_utf8_exactly() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("note.txt");
        fs::write(&path, "héllo\r\nworld\n").unwrap();

        let result = extract_txt_file(&path);
        assert!(result.is_success());
        assert_eq!(result.content.as_deref(), Some("héllo\r\nworld\n"));
        assert_eq!(result.error, None);
        assert_eq!(result.file, path.display().to_string());
    }

    #[test]
    fn test_missing_file_is_error_result() {
        let result = extract_txt_file("/nonexistent/docingest/note.txt");
        assert_eq!(result.status, ReadStatus::Error);
        assert!(result.content.is_none());
        assert!(result.error.is_some());
    }

    #[test]
    fn test_invalid_utf8_is_error_result() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.txt");
        fs::write(&path, [0x63, 0x61, 0x66, 0xE9]).unwrap();

        let result = extract_txt_file(&path);
        assert_eq!(result.status, ReadStatus::Error);
        assert!(result.content.is_none());
    }

    #[test]
    fn test_status_serialization() {
        let json = serde_json::to_value(ReadStatus::Success).unwrap();
        assert_eq!(json, "success");
        let json = serde_json::to_value(ReadStatus::Error).unwrap();
        assert_eq!(json, "error");
    }
}
