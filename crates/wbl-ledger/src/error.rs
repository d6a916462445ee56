use wbl_types::Version;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    /// No entry exists under the key. This is an answer, not a fault.
    #[error("key not found: {key}")]
    NotFound { key: String },

    /// A conditional write found a different version than expected.
    #[error("version conflict on {key}: expected {expected:?}, found {actual:?}")]
    VersionConflict {
        key: String,
        expected: Option<Version>,
        actual: Option<Version>,
    },

    /// The backend failed for a reason other than absence or conflict.
    #[error("ledger I/O error: {0}")]
    Io(String),

    #[error("snapshot error: {0}")]
    Snapshot(String),

    /// Another holder has the snapshot's lock file.
    #[error("ledger state is locked by {}: {path}", holder_name(.holder))]
    Locked { path: String, holder: Option<u32> },
}

fn holder_name(holder: &Option<u32>) -> String {
    match holder {
        Some(pid) => format!("pid {pid}"),
        None => "another process".to_string(),
    }
}

impl LedgerError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::VersionConflict { .. })
    }

    pub fn is_locked(&self) -> bool {
        matches!(self, Self::Locked { .. })
    }
}

/// Convenience type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;
