//! PDF access: container backend, content-stream layout and table detection.

mod backend;
mod image;
mod layout;
mod table_detector;

pub use backend::{
    decode_text_simple, ContentOp, ExtractedImage, LopdfBackend, ObjectRef, PageImage, PdfBackend,
    PdfValue, RawTextBlock,
};
pub use layout::{
    walk_content, BlockType, FontProfile, FontResolver, LayoutAnalyzer, LayoutBlock,
    Matrix, PageContent, TextLine, TextSpan, XObjectPlacement,
};
pub use table_detector::{DetectedTable, TableDetector, TableDetectorConfig};

pub(crate) use table_detector::is_list_marker;
