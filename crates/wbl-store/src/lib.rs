//! Record storage for the WayBill Ledger.
//!
//! The [`RecordStore`] reads and writes one opaque blob per [`Identifier`].
//! It never interprets the bytes it stores: validation of record contents is
//! the caller's concern.
//!
//! # Design Rules
//!
//! 1. Writes are last-write-wins; there is no optimistic check on records.
//! 2. A read distinguishes "absent" ([`StoreError::NotFound`]) from "failed"
//!    ([`StoreError::ReadFailed`]).
//! 3. Versioned access ([`RecordStore::get_versioned`],
//!    [`RecordStore::put_if_version`]) exists for callers that need
//!    compare-and-swap, such as the index maintainer.
//! 4. All ledger errors are propagated, never silently ignored.
//!
//! [`Identifier`]: wbl_types::Identifier

pub mod error;
pub mod store;

pub use error::{StoreError, StoreResult};
pub use store::RecordStore;
pub use wbl_ledger::Versioned;
