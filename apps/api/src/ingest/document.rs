use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOCX: &str = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
pub const MIME_DOC: &str = "application/msword";

/// Uploads larger than this are rejected before any parsing (10 MiB, inclusive).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// A file handed to the pipeline. Lives only for one ingestion call.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    pub content: Bytes,
    pub mime_type: String,
    pub size: u64,
    pub filename: String,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, mime_type: impl Into<String>, content: Bytes) -> Self {
        Self {
            size: content.len() as u64,
            content,
            mime_type: mime_type.into(),
            filename: filename.into(),
        }
    }
}

/// Which structured extractor handles a MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Pdf,
    /// Both `.docx` and legacy `.doc` go through the Word reader.
    Word,
}

impl DocumentKind {
    pub fn from_mime(mime_type: &str) -> Option<Self> {
        match mime_type {
            MIME_PDF => Some(DocumentKind::Pdf),
            MIME_DOCX | MIME_DOC => Some(DocumentKind::Word),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionMethod {
    Fallback,
}

/// Plain text recovered from a document, plus the metadata stored alongside it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub extracted_text: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_type: String,
    /// ISO-8601, millisecond precision, UTC.
    pub parsed_at: String,
    pub word_count: usize,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub method: Option<ExtractionMethod>,
}

impl ExtractionResult {
    /// Builds a result for `doc`. The word count is always derived from `text`.
    pub fn new(doc: &UploadedDocument, text: String, parsed_at: DateTime<Utc>) -> Self {
        Self {
            word_count: word_count(&text),
            extracted_text: text,
            file_name: doc.filename.clone(),
            file_size: doc.size,
            file_type: doc.mime_type.clone(),
            parsed_at: parsed_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            method: None,
        }
    }

    pub fn with_method(mut self, method: ExtractionMethod) -> Self {
        self.method = Some(method);
        self
    }
}

/// Number of whitespace-delimited tokens in the trimmed text.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}
