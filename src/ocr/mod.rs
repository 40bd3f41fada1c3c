//! OCR engine and page rasterizer seams.
//!
//! Recognition and rendering are delegated to external programs; the traits
//! here let the pipeline run against any engine, including test doubles.

mod render;
mod tesseract;

pub use render::{PageRenderer, PdftoppmRenderer, RenderConfig, PDFTOPPM_CMD_ENV};
pub use tesseract::{OcrConfig, TesseractCli, OCR_LANG_ENV, TESSERACT_CMD_ENV};

pub(crate) use tesseract::non_empty_env;

use image::DynamicImage;

use crate::error::{Error, Result};

/// Text recognition over a decoded raster image.
pub trait OcrEngine {
    /// Recognize the text in `image`.
    fn recognize(&self, image: &DynamicImage) -> Result<String>;
}

impl<T: OcrEngine + ?Sized> OcrEngine for Box<T> {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        (**self).recognize(image)
    }
}

/// Decode encoded image bytes (PNG, JPEG, ...) into a raster image.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    image::load_from_memory(bytes).map_err(|e| Error::ImageDecode(e.to_string()))
}

/// Decode `bytes` and recognize them with `engine`.
pub fn recognize_bytes(engine: &dyn OcrEngine, bytes: &[u8]) -> Result<String> {
    let image = decode_image(bytes)?;
    engine.recognize(&image)
}
