use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::ingest::document::{DocumentKind, ExtractionResult, UploadedDocument};
use crate::ingest::error::{ErrorClass, IngestError};
use crate::ingest::fallback::extract_fallback;
use crate::ingest::fields::{extract_fields, ExtractedFields};
use crate::ingest::pdf::extract_pdf;
use crate::ingest::progress::{ProgressReporter, ProgressSink, BYTES_READ, COMPLETE, VALIDATED};
use crate::ingest::validator::validate;
use crate::ingest::word::extract_word;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PipelineState {
    Idle,
    Validating,
    Extracting { kind: DocumentKind },
    FieldExtracting,
    Done,
    Failed { code: &'static str },
}

/// Whether a failed Word extraction may be retried with the raw decoder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FallbackPolicy {
    #[default]
    Never,
    /// Retry `CorruptDocument` Word failures. PDFs are never retried.
    WordOnCorrupt,
}

/// Extraction result plus the fields recovered from its text.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsedResume {
    #[serde(flatten)]
    pub extraction: ExtractionResult,
    pub extracted_sections: ExtractedFields,
}

/// Validate, extract, and field-extract one upload.
///
/// A pipeline is built per upload and owns that call's progress reporting;
/// nothing is shared between pipelines.
pub struct IngestionPipeline<'a> {
    state: PipelineState,
    progress: ProgressReporter<'a>,
    fallback: FallbackPolicy,
}

impl<'a> IngestionPipeline<'a> {
    pub fn new(progress: Option<&'a mut dyn ProgressSink>) -> Self {
        Self {
            state: PipelineState::Idle,
            progress: ProgressReporter::new(progress),
            fallback: FallbackPolicy::Never,
        }
    }

    pub fn with_fallback(mut self, policy: FallbackPolicy) -> Self {
        self.fallback = policy;
        self
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    /// Turns the upload into text. Errors come back exactly as the failing
    /// stage raised them.
    pub async fn parse_document(
        &mut self,
        file: Option<&UploadedDocument>,
    ) -> Result<ExtractionResult, IngestError> {
        let result = self.extract(file).await;
        match &result {
            Ok(_) => {
                self.transition(PipelineState::Done);
                self.progress.report(COMPLETE);
            }
            Err(e) => self.fail(e),
        }
        result
    }

    /// `parse_document` followed by field extraction.
    pub async fn ingest(
        &mut self,
        file: Option<&UploadedDocument>,
    ) -> Result<ParsedResume, IngestError> {
        let extraction = match self.extract(file).await {
            Ok(extraction) => extraction,
            Err(e) => {
                self.fail(&e);
                return Err(e);
            }
        };

        self.transition(PipelineState::FieldExtracting);
        let extracted_sections = extract_fields(&extraction.extracted_text);

        self.transition(PipelineState::Done);
        self.progress.report(COMPLETE);
        info!(
            file = %extraction.file_name,
            words = extraction.word_count,
            fallback = extraction.method.is_some(),
            fields_found = !extracted_sections.is_empty(),
            "Resume ingested"
        );

        Ok(ParsedResume {
            extraction,
            extracted_sections,
        })
    }

    async fn extract(
        &mut self,
        file: Option<&UploadedDocument>,
    ) -> Result<ExtractionResult, IngestError> {
        self.transition(PipelineState::Validating);
        let kind = validate(file)?;
        let doc = file.ok_or(IngestError::NoFileProvided)?;
        self.progress.report(VALIDATED);

        self.transition(PipelineState::Extracting { kind });
        let content = doc.content.clone();
        self.progress.report(BYTES_READ);

        let structured = match kind {
            DocumentKind::Pdf => extract_pdf(content, &mut self.progress).await,
            DocumentKind::Word => extract_word(content, &mut self.progress).await,
        };

        match structured {
            Ok(text) => {
                let text = text.trim();
                if text.is_empty() {
                    return Err(IngestError::NoExtractableText);
                }
                Ok(ExtractionResult::new(doc, text.to_string(), Utc::now()))
            }
            Err(IngestError::CorruptDocument(reason))
                if kind == DocumentKind::Word && self.fallback == FallbackPolicy::WordOnCorrupt =>
            {
                warn!(file = %doc.filename, %reason, "Word extraction failed; using fallback decode");
                extract_fallback(doc)
            }
            Err(e) => Err(e),
        }
    }

    fn transition(&mut self, next: PipelineState) {
        debug!(from = ?self.state, to = ?next, "Ingestion state change");
        self.state = next;
    }

    fn fail(&mut self, err: &IngestError) {
        self.transition(PipelineState::Failed { code: err.code() });
        match err.class() {
            ErrorClass::Environment => error!(code = err.code(), error = %err, "Extraction engine unavailable"),
            ErrorClass::Content => warn!(code = err.code(), error = %err, "Document yielded no usable text"),
            ErrorClass::Input => info!(code = err.code(), error = %err, "Upload rejected"),
        }
    }
}

/// Extracts plain text and metadata from an upload.
pub async fn parse_document(
    file: Option<&UploadedDocument>,
    progress: Option<&mut dyn ProgressSink>,
) -> Result<ExtractionResult, IngestError> {
    IngestionPipeline::new(progress).parse_document(file).await
}

/// Full ingestion: text, metadata, and extracted sections.
pub async fn ingest(
    file: Option<&UploadedDocument>,
    progress: Option<&mut dyn ProgressSink>,
    fallback: FallbackPolicy,
) -> Result<ParsedResume, IngestError> {
    IngestionPipeline::new(progress)
        .with_fallback(fallback)
        .ingest(file)
        .await
}
