//! Document partitioning into typed elements.

use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;

use crate::detect::SourceKind;
use crate::error::{Error, Result};
use crate::model::{
    Diagnostic, DiagnosticSource, Element, ElementKind, ElementMetadata, TableData,
    UnstructuredElement,
};
use crate::ocr::non_empty_env;
use crate::parser::{
    is_list_marker, BlockType, LayoutAnalyzer, LopdfBackend, PdfBackend, TableDetector,
};
use crate::tools;

/// Environment variable naming an external partition command.
pub const PARTITION_CMD_ENV: &str = "DOCINGEST_PARTITION_CMD";

/// Minimum word count for prose.
const NARRATIVE_MIN_WORDS: usize = 5;

/// Splits a document into typed layout elements.
pub trait Partitioner {
    /// Partition the file at `source`.
    fn partition(&self, source: &Path) -> Result<Vec<Element>>;
}

impl<T: Partitioner + ?Sized> Partitioner for Box<T> {
    fn partition(&self, source: &Path) -> Result<Vec<Element>> {
        (**self).partition(source)
    }
}

/// Partition `source` and reshape the elements for a page summary.
///
/// A failure yields no elements and a diagnostic.
pub fn extract_unstructured_elements(
    partitioner: &dyn Partitioner,
    source: &Path,
) -> (Vec<UnstructuredElement>, Option<Diagnostic>) {
    match partitioner.partition(source) {
        Ok(elements) => (
            elements.iter().map(UnstructuredElement::from_element).collect(),
            None,
        ),
        Err(e) => {
            log::warn!("Unstructured extraction error: {}", e);
            (Vec::new(), Some(Diagnostic::new(DiagnosticSource::Partition, e)))
        }
    }
}

/// Classify a piece of body text.
pub fn classify_text(text: &str) -> ElementKind {
    let text = text.trim();
    if starts_with_list_marker(text) {
        ElementKind::ListItem
    } else if text.split_whitespace().count() >= NARRATIVE_MIN_WORDS {
        ElementKind::NarrativeText
    } else {
        ElementKind::UncategorizedText
    }
}

fn starts_with_list_marker(text: &str) -> bool {
    let mut words = text.split_whitespace();
    let Some(first) = words.next() else {
        return false;
    };
    if words.next().is_none() {
        return false;
    }
    // Bare numbers open plenty of sentences; require the punctuation
    is_list_marker(first)
        && (first.ends_with('.') || first.ends_with(')') || !first.chars().any(|c| c.is_ascii_digit()))
}

/// Partitioner built on the crate's own layout analysis.
///
/// PDF pages yield titles and body text from the layout blocks, tables from
/// the alignment detector and one image element per embedded picture.
/// Plain-text files are split into blank-line separated paragraphs.
#[derive(Debug, Clone, Default)]
pub struct LayoutPartitioner {
    detector: TableDetector,
}

impl LayoutPartitioner {
    /// Create a partitioner with default detector settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Partition every page of an opened document.
    pub fn partition_document(&self, backend: &dyn PdfBackend) -> Result<Vec<Element>> {
        let mut elements = Vec::new();
        for page in 1..=backend.page_count() {
            let spans = backend.page_spans(page)?;
            let (tables, rest) = self.detector.detect(spans);

            let mut analyzer = LayoutAnalyzer::new();
            for block in analyzer.analyze(rest) {
                let text = block.text();
                let text = text.trim();
                if text.is_empty() {
                    continue;
                }
                let kind = match block.block_type {
                    BlockType::Heading => ElementKind::Title,
                    BlockType::Paragraph => classify_text(text),
                };
                elements.push(Element::text(kind, text).on_page(page));
            }

            for table in tables {
                let data = TableData::from_grid(table.to_grid());
                if !data.is_empty() {
                    elements.push(Element::text(ElementKind::Table, data.plain_text()).on_page(page));
                }
            }

            for image in backend.page_images(page)? {
                elements.push(Element::image(image.name).on_page(page));
            }
        }
        Ok(elements)
    }

    /// Partition plain text into paragraphs.
    pub fn partition_text(&self, content: &str) -> Result<Vec<Element>> {
        let separator =
            Regex::new(r"\n[ \t\r]*\n").map_err(|e| Error::Partition(e.to_string()))?;
        Ok(separator
            .split(content)
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(|p| Element::text(classify_text(p), p))
            .collect())
    }
}

impl Partitioner for LayoutPartitioner {
    fn partition(&self, source: &Path) -> Result<Vec<Element>> {
        match SourceKind::of(source) {
            SourceKind::Pdf => self.partition_document(&LopdfBackend::load_file(source)?),
            SourceKind::PlainText => {
                let content = fs::read_to_string(source)?;
                self.partition_text(&content)
            }
            SourceKind::Unknown => Err(Error::Partition(format!(
                "unsupported file type: {}",
                source.display()
            ))),
        }
    }
}

/// Runs an external command that prints the document's elements as JSON.
///
/// The command is invoked as `<program> <file>` and must print an array of
/// `{"type", "text", "metadata": {"page_number"}}` objects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandPartitioner {
    program: String,
}

impl CommandPartitioner {
    /// Use `program` as the partition command.
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Read `DOCINGEST_PARTITION_CMD`; `None` when unset.
    pub fn from_env() -> Option<Self> {
        non_empty_env(PARTITION_CMD_ENV).map(Self::new)
    }
}

impl Partitioner for CommandPartitioner {
    fn partition(&self, source: &Path) -> Result<Vec<Element>> {
        let output = tools::run(&self.program, [OsStr::new(source)], None)?;
        parse_element_json(&output)
    }
}

#[derive(Deserialize)]
struct ElementJson {
    #[serde(rename = "type")]
    element_type: Option<String>,
    #[serde(default)]
    text: Option<String>,
    #[serde(default)]
    metadata: ElementJsonMetadata,
}

#[derive(Deserialize, Default)]
struct ElementJsonMetadata {
    #[serde(default)]
    page_number: Option<u32>,
    #[serde(default)]
    image_base64: Option<String>,
    #[serde(default)]
    image_path: Option<String>,
}

fn kind_from_type(name: &str) -> ElementKind {
    match name {
        "Title" => ElementKind::Title,
        "NarrativeText" => ElementKind::NarrativeText,
        "ListItem" => ElementKind::ListItem,
        "Table" => ElementKind::Table,
        "Image" => ElementKind::Image,
        _ => ElementKind::UncategorizedText,
    }
}

/// Parse the element JSON printed by a partition command.
pub(crate) fn parse_element_json(bytes: &[u8]) -> Result<Vec<Element>> {
    let raw: Vec<ElementJson> = serde_json::from_slice(bytes)
        .map_err(|e| Error::Partition(format!("unreadable element JSON: {}", e)))?;

    Ok(raw
        .into_iter()
        .map(|el| {
            let kind = el
                .element_type
                .as_deref()
                .map(kind_from_type)
                .unwrap_or(ElementKind::UncategorizedText);
            Element {
                kind,
                category: el.element_type,
                text: el.text,
                image: el.metadata.image_path.or(el.metadata.image_base64),
                metadata: ElementMetadata {
                    page_number: el.metadata.page_number,
                },
            }
        })
        .collect())
}
