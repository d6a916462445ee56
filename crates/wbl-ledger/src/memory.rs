//! In-memory ledger for tests, embedding, and the CLI host.
//!
//! [`InMemoryLedger`] stores every entry in a `HashMap` protected by a
//! `RwLock`. Conditional writes check and write under a single write-lock
//! acquisition, which makes them atomic with respect to every other call.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;
use wbl_types::Version;

use crate::error::{LedgerError, Result};
use crate::snapshot::{LedgerSnapshot, SnapshotEntry};
use crate::traits::{Ledger, Versioned};

#[derive(Clone, Debug)]
struct Entry {
    value: Vec<u8>,
    version: Version,
}

/// An in-memory implementation of [`Ledger`].
///
/// Data is lost when the ledger is dropped unless it is exported with
/// [`InMemoryLedger::snapshot`] first.
pub struct InMemoryLedger {
    entries: RwLock<HashMap<String, Entry>>,
}

impl InMemoryLedger {
    /// Create a new empty ledger.
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Rebuild a ledger from a previously exported snapshot.
    pub fn from_snapshot(snapshot: &LedgerSnapshot) -> Result<Self> {
        let mut entries = HashMap::with_capacity(snapshot.entries.len());
        for (key, entry) in &snapshot.entries {
            let value = hex::decode(&entry.value).map_err(|e| {
                LedgerError::Snapshot(format!("invalid hex value for {key}: {e}"))
            })?;
            entries.insert(
                key.clone(),
                Entry {
                    value,
                    version: entry.version,
                },
            );
        }
        debug!(entries = entries.len(), "ledger restored from snapshot");
        Ok(Self {
            entries: RwLock::new(entries),
        })
    }

    /// Export the full ledger state.
    pub fn snapshot(&self) -> Result<LedgerSnapshot> {
        let entries = self.read_lock()?;
        let entries: BTreeMap<String, SnapshotEntry> = entries
            .iter()
            .map(|(k, e)| {
                (
                    k.clone(),
                    SnapshotEntry {
                        version: e.version,
                        value: hex::encode(&e.value),
                    },
                )
            })
            .collect();
        Ok(LedgerSnapshot::new(entries))
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> Result<usize> {
        Ok(self.read_lock()?.len())
    }

    /// Returns `true` if the ledger holds no keys.
    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.read_lock()?.is_empty())
    }

    /// Sorted list of every key in the ledger.
    pub fn keys(&self) -> Result<Vec<String>> {
        let entries = self.read_lock()?;
        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }

    fn read_lock(&self) -> Result<RwLockReadGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .read()
            .map_err(|e| LedgerError::Io(format!("lock poisoned: {e}")))
    }

    fn write_lock(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, Entry>>> {
        self.entries
            .write()
            .map_err(|e| LedgerError::Io(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl Ledger for InMemoryLedger {
    fn get(&self, key: &str) -> Result<Versioned> {
        let entries = self.read_lock()?;
        entries
            .get(key)
            .map(|e| Versioned {
                value: e.value.clone(),
                version: e.version,
            })
            .ok_or_else(|| LedgerError::NotFound {
                key: key.to_string(),
            })
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<Version> {
        let mut entries = self.write_lock()?;
        let version = entries
            .get(key)
            .map(|e| e.version.next())
            .unwrap_or(Version::INITIAL);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                version,
            },
        );
        Ok(version)
    }

    fn put_conditional(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &[u8],
    ) -> Result<Version> {
        let mut entries = self.write_lock()?;
        let actual = entries.get(key).map(|e| e.version);
        if actual != expected {
            return Err(LedgerError::VersionConflict {
                key: key.to_string(),
                expected,
                actual,
            });
        }
        let version = actual.map(|v| v.next()).unwrap_or(Version::INITIAL);
        entries.insert(
            key.to_string(),
            Entry {
                value: value.to_vec(),
                version,
            },
        );
        Ok(version)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryLedger")
            .field("entry_count", &self.len().ok())
            .finish()
    }
}
