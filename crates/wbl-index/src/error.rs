//! Error types for the index crate.

use wbl_types::Category;

/// Errors that can occur during index operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum IndexError {
    /// The index record could not be read for a reason other than absence.
    /// Nothing was written.
    #[error("failed to read {category} index: {reason}")]
    IndexReadFailed { category: Category, reason: String },

    /// Writing the updated index back failed.
    #[error("failed to persist {category} index: {reason}")]
    IndexPersistFailed { category: Category, reason: String },

    /// Every attempt lost the compare-and-swap race.
    #[error("{category} index update lost {attempts} consecutive races")]
    IndexConflictExceeded { category: Category, attempts: u32 },

    /// The stored index bytes do not decode. They are left untouched.
    #[error("{category} index is corrupt: {reason}")]
    IndexCorrupt { category: Category, reason: String },

    /// A reserved index key cannot itself be registered.
    #[error("reserved key cannot be indexed: {0}")]
    ReservedIdentifier(String),
}

/// Convenience alias for index results.
pub type IndexResult<T> = Result<T, IndexError>;
