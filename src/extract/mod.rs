//! Per-source extractors.
//!
//! Each extractor reads one kind of content (text blocks, embedded images,
//! tables, partitioned elements) and shapes it into the summary model.

mod camelot;
mod elements;
mod images;
mod tables;
mod tabula;
mod text_blocks;

pub use camelot::{CamelotCli, CAMELOT_CMD_ENV};
pub use elements::{
    classify_text, extract_unstructured_elements, CommandPartitioner, LayoutPartitioner,
    Partitioner, PARTITION_CMD_ENV,
};
pub use images::ImageExtractor;
pub use tables::{PagedTables, TableBackend, TableExtractor, TableOutcome};
pub use tabula::{TabulaCli, JAVA_CMD_ENV, TABULA_JAR_ENV};
pub use text_blocks::extract_text_blocks;
