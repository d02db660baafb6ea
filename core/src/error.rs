use crate::document::DocumentId;
use thiserror::Error;

/// Failures of the summarizer and keyword extractor.
///
/// These never reach callers of [`crate::Analyzer`]; they are mapped to the
/// configured sentinel messages at that boundary.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("content is empty")]
    EmptyContent,
    #[error("no sentences could be extracted")]
    NoSentences,
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("unsupported file type: {0}")]
    UnsupportedFormat(String),
    #[error("pdf extraction failed: {0}")]
    Pdf(String),
    #[error("docx extraction failed: {0}")]
    Docx(String),
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage error: {0}")]
    Sled(#[from] sled::Error),
    #[error("encoding error: {0}")]
    Codec(#[from] bincode::Error),
}

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("username already taken: {0}")]
    UsernameTaken(String),
    #[error("email already registered: {0}")]
    EmailTaken(String),
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("document not found: {0}")]
    NotFound(DocumentId),
    #[error("user {user} may not modify document {id}")]
    Forbidden { id: DocumentId, user: String },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Extract(#[from] ExtractError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
