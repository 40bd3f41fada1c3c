//! Embedded images: persistence and OCR.

use std::fs;
use std::path::{Path, PathBuf};

use crate::model::{Diagnostic, DiagnosticSource, ImageRecord};
use crate::ocr::{recognize_bytes, OcrEngine};
use crate::options::ExtractOptions;
use crate::parser::PdfBackend;

/// Writes a page's images to the image directory and OCRs each one.
#[derive(Debug, Clone)]
pub struct ImageExtractor {
    image_dir: PathBuf,
    persist: bool,
}

impl ImageExtractor {
    /// Create an extractor writing to `image_dir` when `persist` is set.
    pub fn new(image_dir: impl Into<PathBuf>, persist: bool) -> Self {
        Self {
            image_dir: image_dir.into(),
            persist,
        }
    }

    /// Build from the image settings of `options`.
    pub fn from_options(options: &ExtractOptions) -> Self {
        Self::new(options.image_dir.clone(), options.persist_images)
    }

    /// Directory receiving persisted images.
    pub fn image_dir(&self) -> &Path {
        &self.image_dir
    }

    /// Extract and OCR every image of `page`.
    ///
    /// Images are numbered from 1 in resource order. An image whose bytes
    /// cannot be resolved is skipped but keeps its number, so the names of
    /// later images stay positional. Decode or recognition failures end up
    /// in `ocr_text` as `"OCR error: ..."`.
    pub fn extract(
        &self,
        backend: &dyn PdfBackend,
        engine: &dyn OcrEngine,
        page: u32,
    ) -> (Vec<ImageRecord>, Vec<Diagnostic>) {
        let mut records = Vec::new();
        let mut diagnostics = Vec::new();

        let images = match backend.page_images(page) {
            Ok(images) => images,
            Err(e) => {
                log::warn!("Image listing error on page {}: {}", page, e);
                diagnostics.push(Diagnostic::on_page(DiagnosticSource::ImageExtract, page, e));
                return (records, diagnostics);
            }
        };

        if self.persist {
            if let Err(e) = fs::create_dir_all(&self.image_dir) {
                log::warn!(
                    "Cannot create image directory {}: {}",
                    self.image_dir.display(),
                    e
                );
                diagnostics.push(Diagnostic::on_page(
                    DiagnosticSource::ImageExtract,
                    page,
                    format!("cannot create {}: {}", self.image_dir.display(), e),
                ));
            }
        }

        for (i, image) in images.iter().enumerate() {
            let index = i + 1;
            let extracted = match backend.extract_image(image) {
                Ok(extracted) => extracted,
                Err(e) => {
                    log::warn!("Skipping image {} on page {}: {}", image.name, page, e);
                    diagnostics.push(Diagnostic::on_page(
                        DiagnosticSource::ImageExtract,
                        page,
                        format!("{}: {}", image.name, e),
                    ));
                    continue;
                }
            };

            let filename = ImageRecord::file_name(page, index, &extracted.ext);
            if self.persist {
                let path = self.image_dir.join(&filename);
                if let Err(e) = fs::write(&path, &extracted.data) {
                    log::warn!("Cannot write {}: {}", path.display(), e);
                    diagnostics.push(Diagnostic::on_page(
                        DiagnosticSource::ImageExtract,
                        page,
                        format!("cannot write {}: {}", filename, e),
                    ));
                }
            }

            let ocr_text = match recognize_bytes(engine, &extracted.data) {
                Ok(text) => text,
                Err(e) => {
                    log::debug!("OCR failed for {}: {}", filename, e);
                    ImageRecord::ocr_error(e)
                }
            };

            records.push(ImageRecord {
                filename,
                ocr_text,
                bbox: image.bbox,
            });
        }

        (records, diagnostics)
    }
}
