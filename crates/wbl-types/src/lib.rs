//! Foundation types for the WayBill Ledger (WBL).
//!
//! This crate provides the identity and structural types shared by every
//! other WBL crate.
//!
//! # Key Types
//!
//! - [`Identifier`] — Non-empty, caller-supplied record identifier
//! - [`Category`] — Record grouping (waybill, master waybill) with its reserved index key
//! - [`Version`] — Per-key write counter used for conditional writes
//! - [`WayBillDocument`] — The JSON document shape shared by both categories

pub mod category;
pub mod document;
pub mod error;
pub mod identifier;
pub mod version;

pub use category::Category;
pub use document::WayBillDocument;
pub use error::TypeError;
pub use identifier::Identifier;
pub use version::Version;
