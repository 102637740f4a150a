use chrono::Utc;
use tracing::{info, warn};

use crate::ingest::document::{ExtractionMethod, ExtractionResult, UploadedDocument};
use crate::ingest::error::IngestError;

/// Share of undecodable or control characters above which the content is
/// treated as binary rather than text.
const MAX_BINARY_RATIO: f64 = 0.10;

/// Format-unaware decode of the raw bytes. Only used when a caller opts in
/// after structured extraction failed.
pub fn extract_fallback(doc: &UploadedDocument) -> Result<ExtractionResult, IngestError> {
    let text = decode_text(&doc.content)?;
    info!(file = %doc.filename, chars = text.len(), "Fallback text decode succeeded");
    Ok(ExtractionResult::new(doc, text, Utc::now()).with_method(ExtractionMethod::Fallback))
}

fn decode_text(bytes: &[u8]) -> Result<String, IngestError> {
    let text = String::from_utf8_lossy(bytes).into_owned();

    let total = text.chars().count();
    if total == 0 {
        return Ok(text);
    }
    let suspicious = text
        .chars()
        .filter(|c| *c == char::REPLACEMENT_CHARACTER || (c.is_control() && !c.is_whitespace()))
        .count();
    let ratio = suspicious as f64 / total as f64;
    if ratio > MAX_BINARY_RATIO {
        warn!(ratio, "Fallback decode rejected binary content");
        return Err(IngestError::UnreadableFile);
    }
    Ok(text)
}
