//! Shared helpers for integration tests: in-memory PDFs and mock collaborators.

#![allow(dead_code)]

use std::cell::Cell;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use image::{DynamicImage, GrayImage, ImageFormat};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, Stream};

use docingest::model::{Diagnostic, DiagnosticSource, Element, TableRecord};
use docingest::{Error, OcrEngine, PageRenderer, Partitioner, Result, TableBackend};

/// A text run placed at an absolute baseline position.
#[derive(Clone)]
pub struct Text {
    pub x: f32,
    pub y: f32,
    pub size: f32,
    pub text: &'static str,
}

pub fn text(x: f32, y: f32, size: f32, text: &'static str) -> Text {
    Text { x, y, size, text }
}

/// One page of a generated PDF.
#[derive(Clone, Default)]
pub struct PageSpec {
    pub texts: Vec<Text>,
    /// Draw a 2x2 gray image at `(x, y, width, height)`
    pub image: Option<(f32, f32, f32, f32)>,
}

impl PageSpec {
    pub fn blank() -> Self {
        Self::default()
    }

    pub fn with_text(texts: Vec<Text>) -> Self {
        Self { texts, image: None }
    }

    pub fn with_image(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            texts: Vec::new(),
            image: Some((x, y, width, height)),
        }
    }
}

/// Build a US Letter PDF with one Helvetica font and the given pages.
pub fn build_pdf(pages: &[PageSpec]) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });

    let mut kids = Vec::new();
    for spec in pages {
        let mut ops = Vec::new();
        for t in &spec.texts {
            ops.push(Operation::new("BT", vec![]));
            ops.push(Operation::new("Tf", vec!["F1".into(), t.size.into()]));
            ops.push(Operation::new("Td", vec![t.x.into(), t.y.into()]));
            ops.push(Operation::new("Tj", vec![Object::string_literal(t.text)]));
            ops.push(Operation::new("ET", vec![]));
        }

        let mut resources = dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        };
        if let Some((x, y, w, h)) = spec.image {
            let image_id = doc.add_object(Stream::new(
                dictionary! {
                    "Type" => "XObject",
                    "Subtype" => "Image",
                    "Width" => 2,
                    "Height" => 2,
                    "BitsPerComponent" => 8,
                    "ColorSpace" => "DeviceGray",
                },
                vec![0, 85, 170, 255],
            ));
            resources.set("XObject", dictionary! { "Im0" => image_id });
            ops.push(Operation::new("q", vec![]));
            ops.push(Operation::new(
                "cm",
                vec![w.into(), 0.into(), 0.into(), h.into(), x.into(), y.into()],
            ));
            ops.push(Operation::new("Do", vec!["Im0".into()]));
            ops.push(Operation::new("Q", vec![]));
        }

        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(
            Dictionary::new(),
            content.encode().expect("encode content"),
        ));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources,
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut out = Vec::new();
    doc.save_to(&mut out).expect("save pdf");
    out
}

/// Write a generated PDF to `dir/name`.
pub fn write_pdf(dir: &Path, name: &str, pages: &[PageSpec]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, build_pdf(pages)).expect("write pdf");
    path
}

/// PNG bytes of a blank `width x height` gray image.
pub fn png(width: u32, height: u32) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageLuma8(GrayImage::new(width, height))
        .write_to(&mut out, ImageFormat::Png)
        .expect("encode png");
    out.into_inner()
}

/// OCR engine that names what it saw: rendered pages are 8x8 in these
/// tests, embedded images 2x2.
#[derive(Default, Clone)]
pub struct SizeOcr {
    pub calls: Rc<Cell<u32>>,
}

impl OcrEngine for SizeOcr {
    fn recognize(&self, image: &DynamicImage) -> Result<String> {
        self.calls.set(self.calls.get() + 1);
        Ok(match image.width() {
            8 => "  page ocr\n".to_string(),
            2 => "image ocr".to_string(),
            w => format!("{} wide", w),
        })
    }
}

/// OCR engine returning a fixed string.
pub struct FixedOcr(pub &'static str);

impl OcrEngine for FixedOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        Ok(self.0.to_string())
    }
}

/// OCR engine that always fails.
pub struct FailingOcr;

impl OcrEngine for FailingOcr {
    fn recognize(&self, _image: &DynamicImage) -> Result<String> {
        Err(Error::Ocr("engine unavailable".to_string()))
    }
}

/// Renderer producing an 8x8 PNG and counting calls.
#[derive(Default, Clone)]
pub struct PngRenderer {
    pub calls: Rc<Cell<u32>>,
}

impl PageRenderer for PngRenderer {
    fn render_page(&self, _source: &Path, _page: u32) -> Result<Vec<u8>> {
        self.calls.set(self.calls.get() + 1);
        Ok(png(8, 8))
    }
}

/// Renderer that always fails.
pub struct FailingRenderer;

impl PageRenderer for FailingRenderer {
    fn render_page(&self, _source: &Path, page: u32) -> Result<Vec<u8>> {
        Err(Error::Render(format!("page {}: no rasterizer", page)))
    }
}

/// Table pass returning fixed records, optionally failing afterwards.
pub struct StaticTables {
    pub source: DiagnosticSource,
    pub tables: Vec<TableRecord>,
    pub fail: bool,
}

impl StaticTables {
    pub fn primary(tables: Vec<TableRecord>) -> Self {
        Self {
            source: DiagnosticSource::TablesPrimary,
            tables,
            fail: false,
        }
    }
}

impl TableBackend for StaticTables {
    fn name(&self) -> &str {
        "static"
    }

    fn source(&self) -> DiagnosticSource {
        self.source
    }

    fn extract(&self, _source: &Path, sink: &mut Vec<TableRecord>) -> Result<()> {
        sink.extend(self.tables.iter().cloned());
        if self.fail {
            return Err(Error::Table("static pass failed".to_string()));
        }
        Ok(())
    }
}

/// Partitioner returning fixed elements.
pub struct StaticElements(pub Vec<Element>);

impl Partitioner for StaticElements {
    fn partition(&self, _source: &Path) -> Result<Vec<Element>> {
        Ok(self.0.clone())
    }
}

/// Partitioner that always fails.
pub struct FailingPartitioner;

impl Partitioner for FailingPartitioner {
    fn partition(&self, _source: &Path) -> Result<Vec<Element>> {
        Err(Error::Partition("no partitioner".to_string()))
    }
}

/// Diagnostics of one source.
pub fn diagnostics_from(diagnostics: &[Diagnostic], source: DiagnosticSource) -> Vec<&Diagnostic> {
    diagnostics.iter().filter(|d| d.source == source).collect()
}
