//! Full-page rasterization.

use std::ffi::OsStr;
use std::path::Path;

use super::tesseract::non_empty_env;
use crate::error::{Error, Result};
use crate::tools;

/// Environment variable naming the pdftoppm executable.
pub const PDFTOPPM_CMD_ENV: &str = "PDFTOPPM_CMD";

/// Renders one page of a document to PNG bytes.
pub trait PageRenderer {
    /// Render 1-based `page` of the PDF at `source`.
    fn render_page(&self, source: &Path, page: u32) -> Result<Vec<u8>>;
}

impl<T: PageRenderer + ?Sized> PageRenderer for Box<T> {
    fn render_page(&self, source: &Path, page: u32) -> Result<Vec<u8>> {
        (**self).render_page(source, page)
    }
}

/// Rasterizer settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderConfig {
    /// Executable name or path
    pub program: String,

    /// Output resolution; 72 renders one pixel per point
    pub dpi: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            program: "pdftoppm".to_string(),
            dpi: 72,
        }
    }
}

impl RenderConfig {
    /// Defaults overridden by `PDFTOPPM_CMD`.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(program) = non_empty_env(PDFTOPPM_CMD_ENV) {
            config.program = program;
        }
        config
    }

    /// Set the executable.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Set the resolution.
    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }
}

/// Renders pages with poppler's `pdftoppm`.
#[derive(Debug, Clone, Default)]
pub struct PdftoppmRenderer {
    config: RenderConfig,
}

impl PdftoppmRenderer {
    /// Create a renderer with the given settings.
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

impl PageRenderer for PdftoppmRenderer {
    fn render_page(&self, source: &Path, page: u32) -> Result<Vec<u8>> {
        let temp_dir = tempfile::tempdir()?;
        let prefix = temp_dir.path().join("page");
        let page_arg = page.to_string();
        let dpi = self.config.dpi.to_string();

        let args: Vec<&OsStr> = vec![
            OsStr::new("-png"),
            OsStr::new("-r"),
            OsStr::new(&dpi),
            OsStr::new("-f"),
            OsStr::new(&page_arg),
            OsStr::new("-l"),
            OsStr::new(&page_arg),
            OsStr::new("-singlefile"),
            source.as_os_str(),
            prefix.as_os_str(),
        ];
        tools::run(&self.config.program, args, None)
            .map_err(|e| Error::Render(format!("page {}: {}", page, e)))?;

        let output = prefix.with_extension("png");
        std::fs::read(&output).map_err(|e| {
            Error::Render(format!("page {}: no image at {}: {}", page, output.display(), e))
        })
    }
}
