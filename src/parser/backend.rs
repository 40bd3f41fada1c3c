//! PDF backend abstraction layer.
//!
//! Provides a trait-based interface for the page-level operations the
//! extractors need, isolating the concrete PDF library (lopdf) from the
//! extraction and orchestration logic.

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use lopdf::{Dictionary, Document as LopdfDocument, Object, ObjectId};

use super::image::resolve_image;
use super::layout::{walk_content, BlockType, FontResolver, LayoutAnalyzer, PageContent, TextSpan};
use crate::detect;
use crate::error::{Error, Result};
use crate::model::BBox;

/// Object identifier: (object number, generation number).
pub type ObjectRef = (u32, u16);

/// US Letter height, used when a page has no usable MediaBox.
const DEFAULT_PAGE_HEIGHT: f32 = 792.0;

/// A value from a PDF content stream operand.
#[derive(Debug, Clone)]
pub enum PdfValue {
    Integer(i64),
    Real(f32),
    Name(Vec<u8>),
    Str(Vec<u8>),
    Array(Vec<PdfValue>),
    Other,
}

/// A single operation from a PDF content stream.
#[derive(Debug, Clone)]
pub struct ContentOp {
    pub operator: String,
    pub operands: Vec<PdfValue>,
}

/// A block of text as laid out on the page.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTextBlock {
    /// Untrimmed block text
    pub text: String,
    /// Block bounds, top-left origin
    pub bbox: BBox,
    /// Heading or paragraph
    pub block_type: BlockType,
}

/// An image XObject referenced by a page.
#[derive(Debug, Clone, PartialEq)]
pub struct PageImage {
    /// Resource name (e.g. `Im0`)
    pub name: String,
    /// Indirect reference of the image stream
    pub reference: ObjectRef,
    /// Bounds of the first placement, top-left origin; all zero if never drawn
    pub bbox: BBox,
}

/// Image bytes ready to be written to disk.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedImage {
    /// Encoded image (or raw samples when no encoding applies)
    pub data: Vec<u8>,
    /// File extension describing `data`
    pub ext: String,
}

/// Abstract interface for page-level PDF access.
///
/// Page numbers are 1-based.
pub trait PdfBackend {
    /// Number of pages.
    fn page_count(&self) -> u32;

    /// Positioned text spans of a page, PDF user space.
    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>>;

    /// Text blocks of a page in reading order.
    fn raw_text_blocks(&self, page: u32) -> Result<Vec<RawTextBlock>>;

    /// Image XObjects of a page in resource order.
    fn page_images(&self, page: u32) -> Result<Vec<PageImage>>;

    /// Resolve an image to bytes and an extension.
    fn extract_image(&self, image: &PageImage) -> Result<ExtractedImage>;
}

/// Simple text decoding fallback when no encoding is available.
pub fn decode_text_simple(bytes: &[u8]) -> String {
    // UTF-16BE with BOM
    if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
        let utf16: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|c| u16::from_be_bytes([c[0], c[1]]))
            .collect();
        return String::from_utf16(&utf16).unwrap_or_default();
    }

    if let Ok(s) = std::str::from_utf8(bytes) {
        return s.to_string();
    }

    // Latin-1
    bytes.iter().map(|&b| b as char).collect()
}

/// Concrete [`PdfBackend`] backed by `lopdf::Document`.
pub struct LopdfBackend {
    doc: LopdfDocument,
    pages: BTreeMap<u32, ObjectId>,
}

impl LopdfBackend {
    /// Load from a file path, checking the `%PDF-` header first.
    pub fn load_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        detect::pdf_version_of_path(path)?;
        let doc = LopdfDocument::load(path)?;
        Self::from_document(doc)
    }

    /// Load from an in-memory byte slice.
    pub fn load_bytes(data: &[u8]) -> Result<Self> {
        detect::pdf_version(data)?;
        let doc = LopdfDocument::load_mem(data)?;
        Self::from_document(doc)
    }

    /// Wrap an already loaded document.
    pub fn from_document(doc: LopdfDocument) -> Result<Self> {
        if doc.is_encrypted() {
            return Err(Error::Encrypted);
        }
        let pages = doc.get_pages();
        Ok(Self { doc, pages })
    }

    /// Direct access to the underlying `lopdf::Document`.
    pub fn raw_doc(&self) -> &LopdfDocument {
        &self.doc
    }

    /// Get PDF version string.
    pub fn version(&self) -> String {
        self.doc.version.to_string()
    }

    fn page_id(&self, page: u32) -> Result<ObjectId> {
        self.pages
            .get(&page)
            .copied()
            .ok_or(Error::PageOutOfRange(page, self.pages.len() as u32))
    }

    fn resolve<'a>(&'a self, obj: &'a Object) -> Option<&'a Object> {
        match obj {
            Object::Reference(r) => self.doc.get_object(*r).ok(),
            other => Some(other),
        }
    }

    fn resolve_dict<'a>(&'a self, obj: &'a Object) -> Option<&'a Dictionary> {
        match self.resolve(obj)? {
            Object::Dictionary(d) => Some(d),
            Object::Stream(s) => Some(&s.dict),
            _ => None,
        }
    }

    /// Look up a page attribute, following the `Parent` chain for inherited
    /// entries such as `MediaBox` and `Resources`.
    fn inherited(&self, page_id: ObjectId, key: &[u8]) -> Option<&Object> {
        let mut dict = self.doc.get_dictionary(page_id).ok()?;
        // Bounded walk; malformed trees can loop
        for _ in 0..32 {
            if let Ok(value) = dict.get(key) {
                return self.resolve(value);
            }
            dict = self.resolve_dict(dict.get(b"Parent").ok()?)?;
        }
        None
    }

    fn page_height(&self, page_id: ObjectId) -> f32 {
        let Some(Object::Array(media_box)) = self.inherited(page_id, b"MediaBox") else {
            return DEFAULT_PAGE_HEIGHT;
        };
        let values: Vec<f32> = media_box
            .iter()
            .filter_map(|o| self.resolve(o))
            .filter_map(object_number)
            .collect();
        match values.as_slice() {
            [_, y0, _, y1] => (y1 - y0).abs(),
            _ => DEFAULT_PAGE_HEIGHT,
        }
    }

    fn page_content(&self, page_id: ObjectId) -> Result<Vec<u8>> {
        let page_dict = self.doc.get_dictionary(page_id)?;

        // A page without content is blank, not broken
        let Ok(contents) = page_dict.get(b"Contents") else {
            return Ok(Vec::new());
        };

        match contents {
            Object::Reference(r) => match self.doc.get_object(*r) {
                Ok(Object::Stream(s)) => s
                    .decompressed_content()
                    .or_else(|_| Ok(s.content.clone())),
                Ok(Object::Array(arr)) => Ok(self.concat_streams(arr)),
                _ => Err(Error::PdfParse("Invalid content stream".to_string())),
            },
            Object::Array(arr) => Ok(self.concat_streams(arr)),
            _ => Err(Error::PdfParse("Invalid content stream".to_string())),
        }
    }

    fn concat_streams(&self, refs: &[Object]) -> Vec<u8> {
        let mut content = Vec::new();
        for obj in refs {
            if let Some(Object::Stream(s)) = self.resolve(obj) {
                let data = s.decompressed_content().unwrap_or_else(|_| s.content.clone());
                content.extend_from_slice(&data);
                content.push(b' ');
            }
        }
        content
    }

    fn decode_content(&self, data: &[u8]) -> Result<Vec<ContentOp>> {
        let content = lopdf::content::Content::decode(data)?;

        Ok(content
            .operations
            .into_iter()
            .map(|op| ContentOp {
                operator: op.operator,
                operands: op.operands.iter().map(convert_object).collect(),
            })
            .collect())
    }

    fn page_fonts(&self, page_id: ObjectId) -> PageFonts<'_> {
        let lopdf_fonts = self.doc.get_page_fonts(page_id).unwrap_or_default();

        let mut names = HashMap::new();
        for (name, font_dict) in &lopdf_fonts {
            let base_font = font_dict
                .get(b"BaseFont")
                .ok()
                .and_then(|o| o.as_name().ok())
                .map(|n| String::from_utf8_lossy(n).to_string())
                .unwrap_or_else(|| "Unknown".to_string());
            names.insert(name.clone(), base_font);
        }

        let encodings: HashMap<Vec<u8>, _> = lopdf_fonts
            .iter()
            .filter_map(|(name, font_dict)| {
                font_dict
                    .get_font_encoding(&self.doc)
                    .ok()
                    .map(|enc| (name.clone(), enc))
            })
            .collect();

        PageFonts {
            names,
            decoder: Box::new(move |font: &[u8], bytes: &[u8]| {
                encodings
                    .get(font)
                    .and_then(|enc| LopdfDocument::decode_text(enc, bytes).ok())
            }),
        }
    }

    /// Walk the page's content stream once.
    pub fn page_layout(&self, page: u32) -> Result<PageContent> {
        let page_id = self.page_id(page)?;
        let data = self.page_content(page_id)?;
        let ops = self.decode_content(&data)?;
        let fonts = self.page_fonts(page_id);
        Ok(walk_content(&ops, &fonts))
    }

    /// Image XObjects named in the page resources, in dictionary order.
    fn image_xobjects(&self, page_id: ObjectId) -> Vec<(String, ObjectId)> {
        let Some(resources) = self
            .inherited(page_id, b"Resources")
            .and_then(|o| self.resolve_dict(o))
        else {
            return Vec::new();
        };
        let Some(xobjects) = resources
            .get(b"XObject")
            .ok()
            .and_then(|o| self.resolve_dict(o))
        else {
            return Vec::new();
        };

        xobjects
            .iter()
            .filter_map(|(name, obj)| {
                let obj_ref = obj.as_reference().ok()?;
                let Ok(Object::Stream(stream)) = self.doc.get_object(obj_ref) else {
                    return None;
                };
                let is_image = stream
                    .dict
                    .get(b"Subtype")
                    .ok()
                    .and_then(|s| s.as_name_str().ok())
                    == Some("Image");
                is_image.then(|| (String::from_utf8_lossy(name).to_string(), obj_ref))
            })
            .collect()
    }
}

/// Font lookups for one page.
struct PageFonts<'a> {
    names: HashMap<Vec<u8>, String>,
    decoder: Box<dyn Fn(&[u8], &[u8]) -> Option<String> + 'a>,
}

impl FontResolver for PageFonts<'_> {
    fn base_font(&self, resource: &[u8]) -> String {
        self.names
            .get(resource)
            .cloned()
            .unwrap_or_else(|| String::from_utf8_lossy(resource).to_string())
    }

    fn decode(&self, resource: &[u8], bytes: &[u8]) -> String {
        (self.decoder)(resource, bytes).unwrap_or_else(|| decode_text_simple(bytes))
    }
}

impl PdfBackend for LopdfBackend {
    fn page_count(&self) -> u32 {
        self.pages.len() as u32
    }

    fn page_spans(&self, page: u32) -> Result<Vec<TextSpan>> {
        Ok(self.page_layout(page)?.spans)
    }

    fn raw_text_blocks(&self, page: u32) -> Result<Vec<RawTextBlock>> {
        let height = self.page_height(self.page_id(page)?);
        let spans = self.page_spans(page)?;

        let mut analyzer = LayoutAnalyzer::new();
        let blocks = analyzer
            .analyze(spans)
            .into_iter()
            .filter_map(|block| {
                let (left, bottom, right, top) = block.bounds()?;
                Some(RawTextBlock {
                    text: block.text(),
                    bbox: BBox::from_corners(left, height - top, right, height - bottom),
                    block_type: block.block_type,
                })
            })
            .collect();
        Ok(blocks)
    }

    fn page_images(&self, page: u32) -> Result<Vec<PageImage>> {
        let page_id = self.page_id(page)?;
        let height = self.page_height(page_id);
        let xobjects = self.image_xobjects(page_id);
        if xobjects.is_empty() {
            return Ok(Vec::new());
        }

        let layout = self.page_layout(page)?;
        Ok(xobjects
            .into_iter()
            .map(|(name, reference)| {
                let bbox = layout
                    .placement_of(name.as_bytes())
                    .map(|p| {
                        let (left, bottom, right, top) = p.bounds;
                        BBox::from_corners(left, height - top, right, height - bottom)
                    })
                    .unwrap_or_default();
                PageImage {
                    name,
                    reference,
                    bbox,
                }
            })
            .collect())
    }

    fn extract_image(&self, image: &PageImage) -> Result<ExtractedImage> {
        match self.doc.get_object(image.reference) {
            Ok(Object::Stream(stream)) => resolve_image(&self.doc, stream),
            Ok(_) => Err(Error::ImageExtract(format!(
                "{} is not an image stream",
                image.name
            ))),
            Err(e) => Err(Error::ImageExtract(e.to_string())),
        }
    }
}

/// Convert a `lopdf::Object` to [`PdfValue`].
fn convert_object(obj: &Object) -> PdfValue {
    match obj {
        Object::Integer(i) => PdfValue::Integer(*i),
        Object::Real(r) => PdfValue::Real(*r),
        Object::Name(n) => PdfValue::Name(n.clone()),
        Object::String(b, _) => PdfValue::Str(b.clone()),
        Object::Array(arr) => PdfValue::Array(arr.iter().map(convert_object).collect()),
        _ => PdfValue::Other,
    }
}

pub(crate) fn object_number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

/// Helper: extract a number from a [`PdfValue`].
pub fn get_number_from_value(val: &PdfValue) -> Option<f32> {
    match val {
        PdfValue::Integer(i) => Some(*i as f32),
        PdfValue::Real(r) => Some(*r),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::content::{Content, Operation};
    use lopdf::{dictionary, Stream};

    fn one_page_doc(media_box: Vec<Object>, ops: Vec<Operation>) -> LopdfDocument {
        let mut doc = LopdfDocument::with_version("1.5");
        let pages_id = doc.new_object_id();
        let font_id = doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
        });
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        });
        let content = Content { operations: ops };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode().unwrap()));
        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        doc.objects.insert(
            pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => vec![page_id.into()],
                "Count" => 1,
                "Resources" => resources_id,
                "MediaBox" => media_box,
            }),
        );
        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);
        doc
    }

    #[test]
    fn test_decode_text_simple() {
        assert_eq!(decode_text_simple(b"Hello"), "Hello");
        assert_eq!(decode_text_simple(&[0x48, 0x65, 0x6C, 0x6C, 0xE9]), "Hellé");
        assert_eq!(decode_text_simple(&[0xFE, 0xFF, 0x00, 0x48, 0x00, 0x69]), "Hi");
    }

    #[test]
    fn test_get_number_from_value() {
        assert_eq!(get_number_from_value(&PdfValue::Integer(42)), Some(42.0));
        assert_eq!(get_number_from_value(&PdfValue::Real(1.5)), Some(1.5));
        assert_eq!(get_number_from_value(&PdfValue::Other), None);
    }

    #[test]
    fn test_blocks_use_inherited_media_box_and_top_left_origin() {
        let doc = one_page_doc(
            vec![0.into(), 0.into(), 400.into(), 500.into()],
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 10.into()]),
                Operation::new("Td", vec![50.into(), 400.into()]),
                Operation::new("Tj", vec![Object::string_literal("Hello there")]),
                Operation::new("ET", vec![]),
            ],
        );
        let backend = LopdfBackend::from_document(doc).unwrap();
        assert_eq!(backend.page_count(), 1);

        let blocks = backend.raw_text_blocks(1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello there");

        let bbox = blocks[0].bbox;
        assert_eq!(bbox.0, 50.0);
        // Baseline at 400 with 8pt ascender: top at 500 - 408
        assert!((bbox.1 - 92.0).abs() < 0.01);
        assert!((bbox.3 - 102.0).abs() < 0.01);
    }

    #[test]
    fn test_huge_ctm_scale_keeps_page_readable() {
        let show = |x: i64, y: i64, text: &str| {
            vec![
                Operation::new("BT", vec![]),
                Operation::new("Tf", vec!["F1".into(), 12.into()]),
                Operation::new("Td", vec![x.into(), y.into()]),
                Operation::new("Tj", vec![Object::string_literal(text)]),
                Operation::new("ET", vec![]),
            ]
        };
        let mut ops = show(10, 700, "Hello");
        ops.push(Operation::new("q", vec![]));
        ops.push(Operation::new(
            "cm",
            vec![1_000_000_000_000i64.into(), 0.into(), 0.into(), 1.into(), 0.into(), 0.into()],
        ));
        ops.extend(show(10, 650, "far"));
        ops.push(Operation::new("Q", vec![]));

        let doc = one_page_doc(vec![0.into(), 0.into(), 612.into(), 792.into()], ops);
        let backend = LopdfBackend::from_document(doc).unwrap();
        let blocks = backend.raw_text_blocks(1).unwrap();
        assert!(blocks.iter().any(|b| b.text.contains("Hello")));
        assert!(blocks.iter().any(|b| b.text.contains("far")));
    }

    #[test]
    fn test_page_out_of_range() {
        let doc = one_page_doc(vec![0.into(), 0.into(), 612.into(), 792.into()], vec![]);
        let backend = LopdfBackend::from_document(doc).unwrap();
        assert!(matches!(
            backend.raw_text_blocks(2),
            Err(Error::PageOutOfRange(2, 1))
        ));
        assert!(backend.page_images(1).unwrap().is_empty());
    }

    #[test]
    fn test_load_bytes_rejects_non_pdf() {
        assert!(matches!(
            LopdfBackend::load_bytes(b"GIF89a..."),
            Err(Error::UnknownFormat)
        ));
    }
}
