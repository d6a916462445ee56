//! Fault-injecting ledger wrapper.
//!
//! [`FaultyLedger`] delegates to an [`InMemoryLedger`] but can be told to
//! fail reads or writes on specific keys, or to reject the next N
//! conditional writes with a version conflict. It also counts calls so tests
//! can assert that nothing was written.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use wbl_types::Version;

use crate::error::{LedgerError, Result};
use crate::memory::InMemoryLedger;
use crate::traits::{Ledger, Versioned};

#[derive(Debug, Default)]
pub struct FaultyLedger {
    inner: InMemoryLedger,
    failing_reads: RwLock<HashSet<String>>,
    failing_writes: RwLock<HashSet<String>>,
    forced_conflicts: AtomicUsize,
    writes: AtomicUsize,
    conditional_attempts: AtomicUsize,
}

impl FaultyLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// The wrapped ledger, for seeding state without touching the counters.
    pub fn inner(&self) -> &InMemoryLedger {
        &self.inner
    }

    /// Make every read of `key` fail with an I/O error.
    pub fn fail_reads_on(&self, key: &str) {
        if let Ok(mut keys) = self.failing_reads.write() {
            keys.insert(key.to_string());
        }
    }

    /// Make every write of `key` fail with an I/O error.
    pub fn fail_writes_on(&self, key: &str) {
        if let Ok(mut keys) = self.failing_writes.write() {
            keys.insert(key.to_string());
        }
    }

    /// Reject the next `n` conditional writes with a version conflict.
    pub fn force_conflicts(&self, n: usize) {
        self.forced_conflicts.store(n, Ordering::SeqCst);
    }

    /// Number of writes (conditional or not) that reached the inner ledger.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// Number of conditional writes attempted, successful or not.
    pub fn conditional_attempts(&self) -> usize {
        self.conditional_attempts.load(Ordering::SeqCst)
    }

    fn check(set: &RwLock<HashSet<String>>, key: &str, what: &str) -> Result<()> {
        let keys = set
            .read()
            .map_err(|e| LedgerError::Io(format!("lock poisoned: {e}")))?;
        if keys.contains(key) {
            return Err(LedgerError::Io(format!("injected {what} failure on {key}")));
        }
        Ok(())
    }

    fn take_forced_conflict(&self) -> bool {
        self.forced_conflicts
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl Ledger for FaultyLedger {
    fn get(&self, key: &str) -> Result<Versioned> {
        Self::check(&self.failing_reads, key, "read")?;
        self.inner.get(key)
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<Version> {
        Self::check(&self.failing_writes, key, "write")?;
        let version = self.inner.put(key, value)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }

    fn put_conditional(
        &self,
        key: &str,
        expected: Option<Version>,
        value: &[u8],
    ) -> Result<Version> {
        self.conditional_attempts.fetch_add(1, Ordering::SeqCst);
        Self::check(&self.failing_writes, key, "write")?;
        if self.take_forced_conflict() {
            return Err(LedgerError::VersionConflict {
                key: key.to_string(),
                expected,
                actual: None,
            });
        }
        let version = self.inner.put_conditional(key, expected, value)?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(version)
    }
}
