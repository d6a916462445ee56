//! The [`Ledger`] trait defining the storage collaborator interface.

use wbl_types::Version;

use crate::error::Result;

/// A value read from the ledger together with the version it was written at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Versioned {
    pub value: Vec<u8>,
    pub version: Version,
}

/// Durable key-to-bytes store consumed by WBL.
///
/// Implementations must be thread-safe (`Send + Sync`) and must serialize
/// writes to any single key. No cross-key atomicity is assumed.
pub trait Ledger: Send + Sync {
    /// Read the value stored under `key`.
    ///
    /// Returns `Err(LedgerError::NotFound)` if the key has never been
    /// written, and `Err(LedgerError::Io)` for every other failure.
    fn get(&self, key: &str) -> Result<Versioned>;

    /// Unconditionally write `value` under `key`, returning the new version.
    fn put(&self, key: &str, value: &[u8]) -> Result<Version>;

    /// Write `value` under `key` only if the stored version equals
    /// `expected`.
    ///
    /// `expected == None` means the key must not exist yet. On mismatch the
    /// ledger is left untouched and `Err(LedgerError::VersionConflict)` is
    /// returned.
    fn put_conditional(&self, key: &str, expected: Option<Version>, value: &[u8])
        -> Result<Version>;

    /// Check whether a key exists.
    fn contains(&self, key: &str) -> Result<bool> {
        match self.get(key) {
            Ok(_) => Ok(true),
            Err(e) if e.is_not_found() => Ok(false),
            Err(e) => Err(e),
        }
    }
}

impl<L: Ledger + ?Sized> Ledger for std::sync::Arc<L> {
    fn get(&self, key: &str) -> Result<Versioned> {
        (**self).get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<Version> {
        (**self).put(key, value)
    }

    fn put_conditional(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &[u8],
    ) -> Result<Version> {
        (**self).put_conditional(key, expected, value)
    }
}
