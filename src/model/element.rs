//! Layout elements from the partitioning backend.

use serde::{Deserialize, Serialize};

/// Element variants a partitioner can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ElementKind {
    /// A heading or title line
    Title,
    /// Running prose
    NarrativeText,
    /// A bulleted or numbered list entry
    ListItem,
    /// A table region
    Table,
    /// An embedded picture
    Image,
    /// Short text that fits no other category
    UncategorizedText,
}

impl ElementKind {
    /// Variant name, used as the element type when no category is given.
    pub fn name(&self) -> &'static str {
        match self {
            ElementKind::Title => "Title",
            ElementKind::NarrativeText => "NarrativeText",
            ElementKind::ListItem => "ListItem",
            ElementKind::Table => "Table",
            ElementKind::Image => "Image",
            ElementKind::UncategorizedText => "UncategorizedText",
        }
    }
}

/// Metadata attached to a partitioned element.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    /// 1-based page number, when the backend knows it
    pub page_number: Option<u32>,
}

/// A raw element as reported by a partitioner.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Element variant
    pub kind: ElementKind,
    /// Explicit category, overriding the variant name
    pub category: Option<String>,
    /// Text content
    pub text: Option<String>,
    /// Image payload (reference or encoded data) for picture elements
    pub image: Option<String>,
    /// Element metadata
    pub metadata: ElementMetadata,
}

impl Element {
    /// Create a text element of the given kind.
    pub fn text(kind: ElementKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            category: None,
            text: Some(text.into()),
            image: None,
            metadata: ElementMetadata::default(),
        }
    }

    /// Create an image element carrying an image payload.
    pub fn image(payload: impl Into<String>) -> Self {
        Self {
            kind: ElementKind::Image,
            category: None,
            text: None,
            image: Some(payload.into()),
            metadata: ElementMetadata::default(),
        }
    }

    /// Set the page number and return self.
    pub fn on_page(mut self, page_number: u32) -> Self {
        self.metadata.page_number = Some(page_number);
        self
    }

    /// Set an explicit category and return self.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }
}

/// A partitioned element as it appears in a page summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnstructuredElement {
    /// Category tag
    #[serde(rename = "type")]
    pub element_type: String,

    /// Text content, or the image payload for pictures
    pub text: Option<String>,

    /// 1-based page number, when known
    pub page_number: Option<u32>,
}

impl UnstructuredElement {
    /// Reshape a raw element: category falls back to the variant name and
    /// text falls back to the image payload.
    pub fn from_element(element: &Element) -> Self {
        let element_type = element
            .category
            .clone()
            .unwrap_or_else(|| element.kind.name().to_string());
        let text = element
            .text
            .clone()
            .filter(|t| !t.is_empty())
            .or_else(|| element.image.clone());
        Self {
            element_type,
            text,
            page_number: element.metadata.page_number,
        }
    }
}

impl From<&Element> for UnstructuredElement {
    fn from(element: &Element) -> Self {
        Self::from_element(element)
    }
}
