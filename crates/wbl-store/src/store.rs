use std::sync::Arc;

use tracing::debug;
use wbl_ledger::{Ledger, LedgerError, Versioned};
use wbl_types::{Identifier, Version};

use crate::error::{StoreError, StoreResult};

/// Get/put of single record blobs on top of a [`Ledger`].
///
/// Cloning a `RecordStore` is cheap; clones share the same ledger.
#[derive(Clone)]
pub struct RecordStore {
    ledger: Arc<dyn Ledger>,
}

impl RecordStore {
    pub fn new(ledger: Arc<dyn Ledger>) -> Self {
        Self { ledger }
    }

    /// The underlying ledger.
    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Write `blob` verbatim under `id`, replacing any previous value.
    pub fn put(&self, id: &Identifier, blob: &[u8]) -> StoreResult<()> {
        let version = self
            .ledger
            .put(id.as_str(), blob)
            .map_err(|e| write_error(id, e))?;
        debug!(id = %id, %version, bytes = blob.len(), "record written");
        Ok(())
    }

    /// Read the exact bytes last written under `id`.
    pub fn get(&self, id: &Identifier) -> StoreResult<Vec<u8>> {
        self.get_versioned(id).map(|v| v.value)
    }

    /// Read the bytes under `id` together with their ledger version.
    pub fn get_versioned(&self, id: &Identifier) -> StoreResult<Versioned> {
        let read = self.ledger.get(id.as_str()).map_err(|e| read_error(id, e))?;
        debug!(id = %id, version = %read.version, "record read");
        Ok(read)
    }

    /// Write `blob` under `id` only if the stored version is `expected`.
    ///
    /// `expected == None` requires that no record exists yet. A mismatch
    /// returns [`StoreError::VersionConflict`] and writes nothing.
    pub fn put_if_version(
        &self,
        id: &Identifier,
        expected: Option<Version>,
        blob: &[u8],
    ) -> StoreResult<Version> {
        let version = self
            .ledger
            .put_conditional(id.as_str(), expected, blob)
            .map_err(|e| write_error(id, e))?;
        debug!(id = %id, ?expected, %version, "record conditionally written");
        Ok(version)
    }
}

impl std::fmt::Debug for RecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecordStore").finish_non_exhaustive()
    }
}

fn read_error(id: &Identifier, err: LedgerError) -> StoreError {
    match err {
        LedgerError::NotFound { .. } => StoreError::NotFound { id: id.to_string() },
        other => StoreError::ReadFailed {
            id: id.to_string(),
            reason: other.to_string(),
        },
    }
}

fn write_error(id: &Identifier, err: LedgerError) -> StoreError {
    match err {
        LedgerError::VersionConflict {
            expected, actual, ..
        } => StoreError::VersionConflict {
            id: id.to_string(),
            expected,
            actual,
        },
        other => StoreError::WriteFailed {
            id: id.to_string(),
            reason: other.to_string(),
        },
    }
}
