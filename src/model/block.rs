//! Text blocks, image records and their bounding boxes.

use serde::{Deserialize, Serialize};

/// A bounding box `(x0, y0, x1, y1)` in page points, origin at the top-left
/// corner of the page.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BBox(pub f32, pub f32, pub f32, pub f32);

impl BBox {
    /// Create a box from two corners, normalizing the order.
    pub fn from_corners(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        BBox(x0.min(x1), y0.min(y1), x0.max(x1), y0.max(y1))
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.2 - self.0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.3 - self.1
    }

    /// The box as an `[x0, y0, x1, y1]` array.
    pub fn to_array(&self) -> [f32; 4] {
        [self.0, self.1, self.2, self.3]
    }
}

/// A block of text found on a page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Trimmed, non-empty text
    pub text: String,

    /// Block geometry; `None` for full-page OCR fallback blocks
    pub bbox: Option<BBox>,

    /// Set to `true` when the block came from full-page OCR
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback_ocr: Option<bool>,
}

impl TextBlock {
    /// A block read from the page's native text layer.
    pub fn native(text: impl Into<String>, bbox: BBox) -> Self {
        Self {
            text: text.into(),
            bbox: Some(bbox),
            fallback_ocr: None,
        }
    }

    /// A synthetic block holding the OCR text of the whole rendered page.
    pub fn fallback(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            bbox: None,
            fallback_ocr: Some(true),
        }
    }

    /// Whether this block came from the full-page OCR fallback.
    pub fn is_fallback(&self) -> bool {
        self.fallback_ocr == Some(true)
    }
}

/// An embedded image that was persisted and run through OCR.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Generated name, `image_p{page}_{index}.{ext}`
    pub filename: String,

    /// Recognized text, or `"OCR error: ..."` when recognition failed
    pub ocr_text: String,

    /// Placement of the image on the page
    pub bbox: BBox,
}

impl ImageRecord {
    /// Prefix used in `ocr_text` when decoding or recognition failed.
    pub const OCR_ERROR_PREFIX: &'static str = "OCR error: ";

    /// Build the file name for the `index`-th image (1-based) of a page.
    pub fn file_name(page_number: u32, index: usize, ext: &str) -> String {
        format!("image_p{}_{}.{}", page_number, index, ext)
    }

    /// The `ocr_text` value recorded for a failed image.
    pub fn ocr_error(message: impl std::fmt::Display) -> String {
        format!("{}{}", Self::OCR_ERROR_PREFIX, message)
    }

    /// Whether OCR failed for this image.
    pub fn has_ocr_error(&self) -> bool {
        self.ocr_text.starts_with(Self::OCR_ERROR_PREFIX)
    }
}
