use serde::Serialize;
use thiserror::Error;

/// Who has to act when an ingestion call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorClass {
    /// The user picked a bad file; re-prompt them.
    Input,
    /// The bytes themselves cannot yield text; retrying will not help.
    Content,
    /// The extraction engine could not run; an operator has to look.
    Environment,
}

/// Every way turning an upload into text can fail.
///
/// Messages are written for the end user: they say what went wrong and what to
/// try next.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IngestError {
    #[error("No file provided")]
    NoFileProvided,

    #[error("Please upload a PDF or Word document (.pdf, .docx, .doc); got '{mime_type}'")]
    InvalidFileType { mime_type: String },

    #[error("File size must be less than 10MB ({size} bytes exceeds the {max} byte limit)")]
    FileTooLarge { size: u64, max: u64 },

    #[error("The document appears to be empty. Please upload a file that contains your resume.")]
    EmptyDocument,

    #[error("Password-protected PDFs are not supported. Please upload an unprotected version.")]
    EncryptedDocument,

    #[error("The document could not be read ({0}). Please ensure the file is not corrupted, or try uploading a DOCX file instead.")]
    CorruptDocument(String),

    #[error("Document processing is currently unavailable ({0}). Please try again later, or upload a DOCX file instead.")]
    WorkerUnavailable(String),

    #[error("No text could be extracted from this file. It may be image-based or scanned; please try a different format.")]
    NoExtractableText,

    #[error("Could not extract text from file. Please ensure the file is not corrupted.")]
    UnreadableFile,
}

impl IngestError {
    pub fn class(&self) -> ErrorClass {
        match self {
            IngestError::NoFileProvided
            | IngestError::InvalidFileType { .. }
            | IngestError::FileTooLarge { .. } => ErrorClass::Input,
            IngestError::EmptyDocument
            | IngestError::EncryptedDocument
            | IngestError::CorruptDocument(_)
            | IngestError::NoExtractableText
            | IngestError::UnreadableFile => ErrorClass::Content,
            IngestError::WorkerUnavailable(_) => ErrorClass::Environment,
        }
    }

    /// Stable machine-readable code, used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::NoFileProvided => "NO_FILE_PROVIDED",
            IngestError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            IngestError::FileTooLarge { .. } => "FILE_TOO_LARGE",
            IngestError::EmptyDocument => "EMPTY_DOCUMENT",
            IngestError::EncryptedDocument => "ENCRYPTED_DOCUMENT",
            IngestError::CorruptDocument(_) => "CORRUPT_DOCUMENT",
            IngestError::WorkerUnavailable(_) => "WORKER_UNAVAILABLE",
            IngestError::NoExtractableText => "NO_EXTRACTABLE_TEXT",
            IngestError::UnreadableFile => "UNREADABLE_FILE",
        }
    }
}
