//! Whole-document text views.
//!
//! A single pass over the pages collects block text and image OCR text into
//! a [`TextHarvest`]; the flat string views are computed from it.

use std::path::Path;

use crate::error::Result;
use crate::extract::extract_text_blocks;
use crate::parser::{LopdfBackend, PdfBackend};
use crate::pipeline::Pipeline;

/// What a harvest collects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HarvestScope {
    /// Block text, full-page OCR fallback and image OCR
    #[default]
    Full,
    /// Image OCR only
    ImagesOnly,
}

/// Text collected from every page of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHarvest {
    /// Native block texts and fallback OCR texts, page by page
    pub block_texts: Vec<String>,

    /// Image OCR texts (including `OCR error:` strings), page by page
    pub ocr_texts: Vec<String>,
}

impl TextHarvest {
    /// Non-empty image OCR texts joined by newlines.
    pub fn ocr_text(&self) -> String {
        self.ocr_texts
            .iter()
            .filter(|t| !t.is_empty())
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Block texts followed by image OCR texts on a single line.
    ///
    /// Line breaks inside a piece become spaces; blank pieces are dropped.
    pub fn one_line(&self) -> String {
        self.block_texts
            .iter()
            .chain(self.ocr_texts.iter())
            .map(|t| t.replace(['\n', '\r'], " "))
            .filter_map(|t| {
                let t = t.trim();
                (!t.is_empty()).then(|| t.to_string())
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl Pipeline {
    /// Collect the text of the PDF at `path`.
    pub fn harvest<P: AsRef<Path>>(&self, path: P, scope: HarvestScope) -> Result<TextHarvest> {
        let path = path.as_ref();
        let backend = LopdfBackend::load_file(path)?;
        self.harvest_backend(&backend, path, scope)
    }

    /// Collect the text of an opened document.
    ///
    /// Fallback OCR failures are ignored here.
    pub fn harvest_backend(
        &self,
        backend: &dyn PdfBackend,
        source: &Path,
        scope: HarvestScope,
    ) -> Result<TextHarvest> {
        let images = self.image_extractor();
        let mut harvest = TextHarvest::default();

        for page in 1..=backend.page_count() {
            if scope == HarvestScope::Full {
                let blocks = extract_text_blocks(backend, page)?;
                if blocks.is_empty() {
                    match self.fallback_text(source, page) {
                        Ok(Some(text)) => harvest.block_texts.push(text),
                        Ok(None) => {}
                        Err(e) => log::debug!("Fallback OCR skipped on page {}: {}", page, e),
                    }
                }
                harvest
                    .block_texts
                    .extend(blocks.into_iter().map(|b| b.text));
            }

            let (records, _) = images.extract(backend, self.ocr_engine(), page);
            harvest
                .ocr_texts
                .extend(records.into_iter().map(|r| r.ocr_text));
        }
        Ok(harvest)
    }

    /// All image OCR text of the document, one image per line.
    pub fn all_ocr_text<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        Ok(self.harvest(path, HarvestScope::ImagesOnly)?.ocr_text())
    }

    /// All text of the document (blocks, fallback OCR, image OCR) on one line.
    pub fn all_text_one_line<P: AsRef<Path>>(&self, path: P) -> Result<String> {
        Ok(self.harvest(path, HarvestScope::Full)?.one_line())
    }
}
