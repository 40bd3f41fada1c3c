//! Tesseract command-line engine.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat};

use super::OcrEngine;
use crate::error::{Error, Result};
use crate::tools;

/// Environment variable naming the tesseract executable.
pub const TESSERACT_CMD_ENV: &str = "TESSERACT_CMD";

/// Environment variable holding the recognition language (e.g. `eng+deu`).
pub const OCR_LANG_ENV: &str = "DOCINGEST_OCR_LANG";

/// OCR engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OcrConfig {
    /// Executable name or path
    pub program: String,

    /// Language passed with `-l`; engine default when `None`
    pub language: Option<String>,

    /// Page segmentation mode passed with `--psm`
    pub page_segmentation: Option<u32>,
}

impl Default for OcrConfig {
    fn default() -> Self {
        Self {
            program: "tesseract".to_string(),
            language: None,
            page_segmentation: None,
        }
    }
}

impl OcrConfig {
    /// Defaults overridden by `TESSERACT_CMD` and `DOCINGEST_OCR_LANG`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(program) = non_empty_env(TESSERACT_CMD_ENV) {
            config.program = program;
        }
        config.language = non_empty_env(OCR_LANG_ENV);
        config
    }

    /// Set the executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the recognition language.
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Set the page segmentation mode.
    pub fn with_page_segmentation(mut self, psm: u32) -> Self {
        self.page_segmentation = Some(psm);
        self
    }

    fn args(&self) -> Vec<String> {
        let mut args = vec!["stdin".to_string(), "stdout".to_string()];
        if let Some(lang) = &self.language {
            args.push("-l".to_string());
            args.push(lang.clone());
        }
        if let Some(psm) = self.page_segmentation {
            args.push("--psm".to_string());
            args.push(psm.to_string());
        }
        args
    }
}

pub(crate) fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Runs the `tesseract` executable, piping a PNG through stdin.
#[derive(Debug, Clone, Default)]
pub struct TesseractCli {
    config: OcrConfig,
}

impl TesseractCli {
    /// Create an engine with the given settings.
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    /// Current settings.
    pub fn config(&self) -> &OcrConfig {
        &self.config
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        let mut png = Cursor::new(Vec::new());
        image.write_to(&mut png, ImageFormat::Png)?;

        let stdout = tools::run(&self.config.program, self.config.args(), Some(png.get_ref()))
            .map_err(|e| Error::Ocr(e.to_string()))?;
        Ok(String::from_utf8_lossy(&stdout).into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args() {
        assert_eq!(OcrConfig::default().args(), vec!["stdin", "stdout"]);

        let config = OcrConfig::default()
            .with_language("eng+deu")
            .with_page_segmentation(6);
        assert_eq!(
            config.args(),
            vec!["stdin", "stdout", "-l", "eng+deu", "--psm", "6"]
        );
    }

    #[test]
    fn test_missing_program_is_ocr_error() {
        let engine = TesseractCli::new(OcrConfig::default().with_program("docingest-missing-ocr"));
        let image = DynamicImage::new_luma8(4, 4);
        let err = engine.recognize(&image).unwrap_err();
        assert!(matches!(err, Error::Ocr(_)));
        assert!(err.to_string().contains("docingest-missing-ocr"));
    }
}
