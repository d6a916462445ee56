//! Invocation entrypoint for the WayBill Ledger.
//!
//! A hosting runtime hands the [`Chaincode`] an operation name and a list of
//! string arguments. The name is resolved against a fixed table of
//! [`Operation`]s with declared arity before anything touches the ledger,
//! the caller's capability is checked, and the typed operation is routed to
//! the record store and index maintainer.
//!
//! Every failure comes back as a [`DispatchError`]; [`DispatchError::kind`]
//! tells the caller which class of failure it was.

pub mod capability;
pub mod chaincode;
pub mod config;
pub mod error;
pub mod operation;

pub use capability::{
    Action, AllowAll, AttributeCapability, AttributeError, AttributeSource, CapabilityCheck,
    StaticAttributes,
};
pub use chaincode::Chaincode;
pub use config::{AccessConfig, ChaincodeConfig};
pub use error::{DispatchError, DispatchResult, ErrorKind};
pub use operation::{Arity, Operation, OperationKind, OperationSpec, OPERATIONS};
