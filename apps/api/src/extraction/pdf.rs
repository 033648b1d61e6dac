use bytes::Bytes;
use tracing::{debug, warn};

use crate::extraction::ExtractionError;

/// Extracts the text layer of an uploaded PDF.
///
/// Parsing is CPU-bound, so it runs on the blocking pool.
pub async fn extract_pdf_text(filename: &str, data: Bytes) -> Result<String, ExtractionError> {
    let name = filename.to_string();
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&data))
        .await
        .map_err(|e| ExtractionError::Pdf(format!("extraction task failed: {e}")))?
        .map_err(|e| {
            warn!("PDF extraction failed for {name}: {e}");
            ExtractionError::Pdf(e.to_string())
        })?;

    let text = text.trim();
    if text.is_empty() {
        return Err(ExtractionError::EmptyDocument(filename.to_string()));
    }

    debug!("Extracted {} chars from {}", text.len(), filename);
    Ok(text.to_string())
}

/// `true` when the upload name has a `.pdf` extension (any case).
pub fn is_pdf_filename(filename: &str) -> bool {
    filename.to_ascii_lowercase().ends_with(".pdf")
}
