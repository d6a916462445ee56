use wbl_types::Version;

/// Errors from record store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// No record exists under the identifier.
    #[error("record not found: {id}")]
    NotFound { id: String },

    /// The ledger read failed for a reason other than absence.
    #[error("failed to read {id}: {reason}")]
    ReadFailed { id: String, reason: String },

    /// The ledger write failed.
    #[error("failed to write {id}: {reason}")]
    WriteFailed { id: String, reason: String },

    /// A conditional write lost against a concurrent writer.
    #[error("version conflict on {id}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        id: String,
        expected: Option<Version>,
        actual: Option<Version>,
    },
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
