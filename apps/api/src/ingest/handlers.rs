use axum::{
    extract::{Multipart, Query},
    Json,
};
use serde::Deserialize;
use tracing::debug;

use crate::errors::AppError;
use crate::ingest::document::MAX_UPLOAD_BYTES;
use crate::ingest::{
    extract_fields, ingest, parse_document, ExtractedFields, ExtractionResult, FallbackPolicy,
    ParsedResume, UploadedDocument,
};

/// Request body cap for upload routes: the document limit plus room for
/// multipart framing, so oversize files still reach the validator.
pub const UPLOAD_BODY_LIMIT: usize = MAX_UPLOAD_BYTES as usize + 2 * 1024 * 1024;

#[derive(Debug, Default, Deserialize)]
pub struct ParseQuery {
    #[serde(default)]
    pub fallback: bool,
}

#[derive(Debug, Deserialize)]
pub struct FieldsRequest {
    pub text: String,
}

/// Pulls the `file` part out of a multipart form. Other parts are ignored.
async fn read_upload(mut multipart: Multipart) -> Result<Option<UploadedDocument>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart parse error: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let mime_type = field.content_type().unwrap_or_default().to_string();
        let content = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read file bytes: {e}")))?;
        return Ok(Some(UploadedDocument::new(filename, mime_type, content)));
    }
    Ok(None)
}

fn log_progress(percent: f32) {
    debug!(percent, "Ingestion progress");
}

/// POST /api/v1/resumes/parse
pub async fn handle_parse_resume(
    Query(query): Query<ParseQuery>,
    multipart: Multipart,
) -> Result<Json<ParsedResume>, AppError> {
    let upload = read_upload(multipart).await?;
    let policy = if query.fallback {
        FallbackPolicy::WordOnCorrupt
    } else {
        FallbackPolicy::Never
    };

    let mut sink = log_progress;
    let parsed = ingest(upload.as_ref(), Some(&mut sink), policy).await?;
    Ok(Json(parsed))
}

/// POST /api/v1/resumes/text
pub async fn handle_extract_text(multipart: Multipart) -> Result<Json<ExtractionResult>, AppError> {
    let upload = read_upload(multipart).await?;
    let mut sink = log_progress;
    let result = parse_document(upload.as_ref(), Some(&mut sink)).await?;
    Ok(Json(result))
}

/// POST /api/v1/resumes/fields
pub async fn handle_extract_fields(Json(req): Json<FieldsRequest>) -> Json<ExtractedFields> {
    Json(extract_fields(&req.text))
}
