//! Ledger boundary for the WayBill Ledger (WBL).
//!
//! The ledger is the durable key-to-bytes store that WBL sits on. WBL never
//! assumes more from it than this crate's [`Ledger`] trait promises:
//! - single-key reads that tell "absent" apart from "failed"
//! - single-key writes, serialized per key
//! - a conditional write that only succeeds when the stored [`Version`]
//!   matches the expected one (compare-and-swap)
//!
//! # Modules
//!
//! - [`error`] — [`LedgerError`]
//! - [`traits`] — The [`Ledger`] trait and [`Versioned`] read result
//! - [`memory`] — [`InMemoryLedger`] for tests, embedding and the CLI host
//! - [`snapshot`] — [`LedgerSnapshot`], a JSON export of ledger state
//! - [`lock`] — [`StateLock`], the exclusive lock over a snapshot file
//! - [`faulty`] — [`FaultyLedger`], a fault-injecting wrapper for tests
//!
//! [`Version`]: wbl_types::Version

pub mod error;
pub mod faulty;
pub mod lock;
pub mod memory;
pub mod snapshot;
pub mod traits;

pub use error::{LedgerError, Result};
pub use faulty::FaultyLedger;
pub use lock::StateLock;
pub use memory::InMemoryLedger;
pub use snapshot::{LedgerSnapshot, SnapshotEntry};
pub use traits::{Ledger, Versioned};
