//! JSON export of ledger state.
//!
//! A [`LedgerSnapshot`] lets a short-lived host process carry ledger state
//! between runs. Values are hex-encoded because records are opaque bytes.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;
use wbl_types::Version;

use crate::error::{LedgerError, Result};

/// Current on-disk snapshot format.
pub const SNAPSHOT_FORMAT: u32 = 1;

/// One exported ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    pub version: Version,
    /// Hex-encoded value bytes.
    pub value: String,
}

/// Point-in-time export of every ledger entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub format: u32,
    pub entries: BTreeMap<String, SnapshotEntry>,
}

impl LedgerSnapshot {
    pub fn new(entries: BTreeMap<String, SnapshotEntry>) -> Self {
        Self {
            format: SNAPSHOT_FORMAT,
            entries,
        }
    }

    /// An empty snapshot.
    pub fn empty() -> Self {
        Self::new(BTreeMap::new())
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).map_err(|e| LedgerError::Snapshot(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let snapshot: Self =
            serde_json::from_str(json).map_err(|e| LedgerError::Snapshot(e.to_string()))?;
        if snapshot.format != SNAPSHOT_FORMAT {
            return Err(LedgerError::Snapshot(format!(
                "unsupported snapshot format {} (expected {SNAPSHOT_FORMAT})",
                snapshot.format
            )));
        }
        Ok(snapshot)
    }

    /// Load a snapshot from `path`.
    ///
    /// A missing file yields an empty snapshot.
    pub fn load(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no snapshot file, starting empty");
                Ok(Self::empty())
            }
            Err(e) => Err(LedgerError::Snapshot(format!(
                "cannot read {}: {e}",
                path.display()
            ))),
        }
    }

    /// Write the snapshot to `path`, replacing any existing file atomically.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let io_err = |e: std::io::Error| {
            LedgerError::Snapshot(format!("cannot write {}: {e}", path.display()))
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(io_err)?;
        tmp.write_all(json.as_bytes()).map_err(io_err)?;
        tmp.persist(path).map_err(|e| io_err(e.error))?;
        debug!(path = %path.display(), entries = self.entries.len(), "snapshot saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::InMemoryLedger;
    use crate::traits::Ledger;

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = LedgerSnapshot::load(&dir.path().join("absent.json")).unwrap();
        assert!(snapshot.entries.is_empty());
    }

    #[test]
    fn save_and_load_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = InMemoryLedger::new();
        ledger.put("wb1", br#"{"status":"NEW"}"#).unwrap();
        ledger.snapshot().unwrap().save(&path).unwrap();

        let loaded = LedgerSnapshot::load(&path).unwrap();
        let restored = InMemoryLedger::from_snapshot(&loaded).unwrap();
        assert_eq!(restored.get("wb1").unwrap().value, br#"{"status":"NEW"}"#);
    }

    #[test]
    fn unknown_format_rejected() {
        let err = LedgerSnapshot::from_json(r#"{"format":99,"entries":{}}"#).unwrap_err();
        assert!(matches!(err, LedgerError::Snapshot(_)));
    }

    #[test]
    fn invalid_hex_rejected_on_restore() {
        let json = r#"{"format":1,"entries":{"k":{"version":1,"value":"zz"}}}"#;
        let snapshot = LedgerSnapshot::from_json(json).unwrap();
        let err = InMemoryLedger::from_snapshot(&snapshot).unwrap_err();
        assert!(matches!(err, LedgerError::Snapshot(_)));
    }
}
