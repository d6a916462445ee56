use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("identifier must not be empty")]
    EmptyIdentifier,

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("malformed document: {0}")]
    MalformedDocument(String),
}
