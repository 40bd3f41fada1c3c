//! Output rendering for document summaries.

mod json;
mod summary;

pub use json::{text_result_to_json, to_json, JsonFormat};
pub use summary::summary_lines;
