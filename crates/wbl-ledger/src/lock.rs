//! Exclusive lock over a snapshot file.
//!
//! A host that loads a [`LedgerSnapshot`], mutates the ledger and saves it
//! again must hold a [`StateLock`] for the whole cycle, or two overlapping
//! runs each save their own view and the later one silently drops the
//! earlier one's writes. The lock is a `<state>.lock` sidecar created with
//! `create_new`, so exactly one holder can exist; it records the holder's
//! pid and is removed on release or drop.
//!
//! [`LedgerSnapshot`]: crate::LedgerSnapshot

use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{LedgerError, Result};

#[derive(Debug)]
pub struct StateLock {
    path: PathBuf,
    released: bool,
}

impl StateLock {
    /// The sidecar lock path for the snapshot at `state`.
    pub fn path_for(state: &Path) -> PathBuf {
        let mut name = state
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| OsString::from("wbl-state"));
        name.push(".lock");
        state.with_file_name(name)
    }

    /// Take the lock for `state`, failing with [`LedgerError::Locked`] if
    /// another holder has it.
    pub fn acquire(state: &Path) -> Result<Self> {
        let path = Self::path_for(state);
        let mut file = match fs::OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                return Err(LedgerError::Locked {
                    path: path.display().to_string(),
                    holder: read_holder(&path),
                });
            }
            Err(e) => {
                return Err(LedgerError::Io(format!(
                    "cannot create lock {}: {e}",
                    path.display()
                )));
            }
        };

        // Own the file before writing so a failed write still cleans it up.
        let lock = Self {
            path,
            released: false,
        };
        writeln!(file, "{}", std::process::id())
            .and_then(|_| file.sync_all())
            .map_err(|e| {
                LedgerError::Io(format!("cannot write lock {}: {e}", lock.path.display()))
            })?;
        debug!(path = %lock.path.display(), "state lock acquired");
        Ok(lock)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::remove_file(&self.path).map_err(|e| {
            LedgerError::Io(format!("cannot remove lock {}: {e}", self.path.display()))
        })?;
        debug!(path = %self.path.display(), "state lock released");
        Ok(())
    }
}

impl Drop for StateLock {
    fn drop(&mut self) {
        if !self.released {
            if let Err(e) = fs::remove_file(&self.path) {
                warn!(path = %self.path.display(), error = %e, "failed to remove state lock");
            }
        }
    }
}

fn read_holder(path: &Path) -> Option<u32> {
    fs::read_to_string(path).ok()?.trim().parse().ok()
}
