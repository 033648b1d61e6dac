// Resume text pipeline: PDF text, normalization, and keyword-based signals.
// Everything here is deterministic dictionary/regex work; no model calls.

pub mod category;
pub mod handlers;
pub mod pdf;
pub mod preprocess;
pub mod skills;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error("Could not read PDF: {0}")]
    Pdf(String),

    #[error("No text could be extracted from {0}")]
    EmptyDocument(String),
}
