use crate::ingest::document::{DocumentKind, UploadedDocument, MAX_UPLOAD_BYTES};
use crate::ingest::error::IngestError;

/// Checks an upload before any extraction work is attempted.
///
/// Order matters: presence, then declared type, then size. Only metadata is
/// inspected; the content bytes are never touched here.
pub fn validate(file: Option<&UploadedDocument>) -> Result<DocumentKind, IngestError> {
    let file = file.ok_or(IngestError::NoFileProvided)?;

    let kind = DocumentKind::from_mime(&file.mime_type).ok_or_else(|| {
        IngestError::InvalidFileType {
            mime_type: file.mime_type.clone(),
        }
    })?;

    if file.size > MAX_UPLOAD_BYTES {
        return Err(IngestError::FileTooLarge {
            size: file.size,
            max: MAX_UPLOAD_BYTES,
        });
    }

    Ok(kind)
}
