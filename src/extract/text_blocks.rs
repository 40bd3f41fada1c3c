//! Native text blocks of a page.

use crate::error::Result;
use crate::model::TextBlock;
use crate::parser::PdfBackend;

/// Text blocks of 1-based `page` in backend order.
///
/// Block text is trimmed and blocks that are empty afterwards are dropped.
/// Backend errors are returned to the caller.
pub fn extract_text_blocks(backend: &dyn PdfBackend, page: u32) -> Result<Vec<TextBlock>> {
    let blocks = backend
        .raw_text_blocks(page)?
        .into_iter()
        .filter_map(|raw| {
            let text = raw.text.trim();
            (!text.is_empty()).then(|| TextBlock::native(text, raw.bbox))
        })
        .collect();
    Ok(blocks)
}
