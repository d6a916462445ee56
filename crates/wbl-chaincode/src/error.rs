use std::fmt;

use thiserror::Error;
use wbl_index::IndexError;
use wbl_store::StoreError;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("invalid arguments for {operation}: {reason}")]
    InvalidArguments { operation: String, reason: String },

    #[error("unauthorized: {0}")]
    Unauthorized(String),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("index error: {0}")]
    Index(#[from] IndexError),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type DispatchResult<T> = Result<T, DispatchError>;

/// Coarse failure class a caller can branch on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Missing or malformed caller input. Never retried.
    InvalidArguments,
    /// The requested identifier is absent. A normal negative answer.
    NotFound,
    /// The ledger failed to read.
    ReadFailed,
    /// The ledger failed to write.
    WriteFailed,
    /// The index update kept losing the compare-and-swap race.
    IndexConflictExceeded,
    /// No operation with that name.
    UnknownOperation,
    /// The caller lacks the capability for the operation.
    Unauthorized,
    /// Configuration could not be loaded.
    Config,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::InvalidArguments => "InvalidArguments",
            Self::NotFound => "NotFound",
            Self::ReadFailed => "ReadFailed",
            Self::WriteFailed => "WriteFailed",
            Self::IndexConflictExceeded => "IndexConflictExceeded",
            Self::UnknownOperation => "UnknownOperation",
            Self::Unauthorized => "Unauthorized",
            Self::Config => "Config",
        };
        f.write_str(s)
    }
}

impl DispatchError {
    pub(crate) fn invalid(operation: &str, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            operation: operation.to_string(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::UnknownOperation(_) => ErrorKind::UnknownOperation,
            Self::InvalidArguments { .. } => ErrorKind::InvalidArguments,
            Self::Unauthorized(_) => ErrorKind::Unauthorized,
            Self::Config(_) => ErrorKind::Config,
            Self::Store(e) => match e {
                StoreError::NotFound { .. } => ErrorKind::NotFound,
                StoreError::ReadFailed { .. } => ErrorKind::ReadFailed,
                StoreError::WriteFailed { .. } | StoreError::VersionConflict { .. } => {
                    ErrorKind::WriteFailed
                }
            },
            Self::Index(e) => match e {
                IndexError::IndexReadFailed { .. } | IndexError::IndexCorrupt { .. } => {
                    ErrorKind::ReadFailed
                }
                IndexError::IndexPersistFailed { .. } => ErrorKind::WriteFailed,
                IndexError::IndexConflictExceeded { .. } => ErrorKind::IndexConflictExceeded,
                IndexError::ReservedIdentifier(_) => ErrorKind::InvalidArguments,
            },
        }
    }
}
