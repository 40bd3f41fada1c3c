//! Extraction options and configuration.

use std::path::PathBuf;

use crate::ocr::{OcrConfig, RenderConfig};

/// Directory that receives persisted images unless configured otherwise.
pub const DEFAULT_IMAGE_DIR: &str = "temp_images";

/// Where document-wide tables are attached in the page summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableRouting {
    /// Every table goes to page 1
    #[default]
    FirstPage,
    /// Tables that know their page go there; the rest go to page 1
    ByPage,
}

/// Options for processing documents.
#[derive(Debug, Clone)]
pub struct ExtractOptions {
    /// Directory for persisted images
    pub image_dir: PathBuf,

    /// Whether extracted images are written to `image_dir`
    pub persist_images: bool,

    /// Table-to-page routing policy
    pub table_routing: TableRouting,

    /// OCR engine settings
    pub ocr: OcrConfig,

    /// Page rasterizer settings
    pub render: RenderConfig,
}

impl ExtractOptions {
    /// Create new options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults with the OCR and renderer programs taken from the environment.
    pub fn from_env() -> Self {
        Self {
            ocr: OcrConfig::from_env(),
            render: RenderConfig::from_env(),
            ..Self::default()
        }
    }

    /// Set the image directory.
    pub fn with_image_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.image_dir = dir.into();
        self
    }

    /// Enable or disable writing images to disk.
    pub fn with_persist_images(mut self, persist: bool) -> Self {
        self.persist_images = persist;
        self
    }

    /// Keep images in memory only.
    pub fn in_memory(mut self) -> Self {
        self.persist_images = false;
        self
    }

    /// Set the table routing policy.
    pub fn with_table_routing(mut self, routing: TableRouting) -> Self {
        self.table_routing = routing;
        self
    }

    /// Set the OCR configuration.
    pub fn with_ocr(mut self, ocr: OcrConfig) -> Self {
        self.ocr = ocr;
        self
    }

    /// Set the renderer configuration.
    pub fn with_render(mut self, render: RenderConfig) -> Self {
        self.render = render;
        self
    }
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            image_dir: PathBuf::from(DEFAULT_IMAGE_DIR),
            persist_images: true,
            table_routing: TableRouting::FirstPage,
            ocr: OcrConfig::default(),
            render: RenderConfig::default(),
        }
    }
}
