//! Identifier index for the WayBill Ledger.
//!
//! Each [`Category`] owns one index record, stored through the record store
//! under the category's reserved key. The record lists every identifier ever
//! registered for the category, in first-registration order, without
//! duplicates, so a full listing never needs a scan of the ledger keyspace.
//!
//! Several writers may register identifiers for the same category at once.
//! The [`IndexMaintainer`] therefore never does a blind read-then-write: it
//! reads the index with its version, appends, and writes back only if the
//! version is unchanged, retrying with bounded backoff on conflict.
//!
//! # Key Types
//!
//! - [`IndexMaintainer`] -- The compare-and-swap registration loop
//! - [`IdentifierIndex`] -- The decoded index value (ordered, duplicate-free)
//! - [`IndexConfig`] -- Retry budget and backoff bounds
//!
//! [`Category`]: wbl_types::Category

pub mod config;
pub mod error;
pub mod list;
pub mod maintainer;

pub use config::IndexConfig;
pub use error::{IndexError, IndexResult};
pub use list::IdentifierIndex;
pub use maintainer::IndexMaintainer;
