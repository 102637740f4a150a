// Resume ingestion: validate -> extract text (PDF / Word, optional raw fallback) -> extract fields.
// PDF and Word parsing are CPU-bound and run inside tokio::task::spawn_blocking.

pub mod document;
pub mod error;
pub mod fallback;
pub mod fields;
pub mod handlers;
pub mod pdf;
pub mod pipeline;
pub mod progress;
pub mod validator;
pub mod word;

// Re-export the API consumed by handlers and other modules.
pub use document::{ExtractionResult, UploadedDocument};
pub use error::{ErrorClass, IngestError};
pub use fields::{extract_fields, ExtractedFields};
pub use pipeline::{ingest, parse_document, FallbackPolicy, ParsedResume};
