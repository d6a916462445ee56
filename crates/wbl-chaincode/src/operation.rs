//! Operation table and argument parsing.
//!
//! Names map to an [`OperationSpec`] with a declared [`Arity`]. Parsing
//! checks the arity and builds a typed [`Operation`] without touching the
//! ledger, so a malformed request never causes a write.

use std::fmt;

use wbl_types::{Category, Identifier};

use crate::capability::Action;
use crate::error::{DispatchError, DispatchResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationKind {
    /// Host lifecycle hook. Does nothing.
    Init,
    Create,
    Get,
    ListIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    Any,
}

impl Arity {
    pub fn accepts(&self, n: usize) -> bool {
        match self {
            Self::Exactly(expected) => *expected == n,
            Self::Any => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exactly(1) => write!(f, "exactly 1 argument"),
            Self::Exactly(n) => write!(f, "exactly {n} arguments"),
            Self::Any => write!(f, "any number of arguments"),
        }
    }
}

/// One row of the operation table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OperationSpec {
    pub name: &'static str,
    pub kind: OperationKind,
    pub category: Option<Category>,
    pub arity: Arity,
    /// Argument names, for usage messages.
    pub params: &'static [&'static str],
}

/// Every operation the chaincode recognizes.
pub const OPERATIONS: &[OperationSpec] = &[
    OperationSpec {
        name: "Init",
        kind: OperationKind::Init,
        category: None,
        arity: Arity::Any,
        params: &[],
    },
    OperationSpec {
        name: "CreateWayBill",
        kind: OperationKind::Create,
        category: Some(Category::WayBill),
        arity: Arity::Exactly(2),
        params: &["identifier", "jsonBlob"],
    },
    OperationSpec {
        name: "GetWayBill",
        kind: OperationKind::Get,
        category: Some(Category::WayBill),
        arity: Arity::Exactly(1),
        params: &["identifier"],
    },
    OperationSpec {
        name: "GetWayBillIndex",
        kind: OperationKind::ListIndex,
        category: Some(Category::WayBill),
        arity: Arity::Exactly(0),
        params: &[],
    },
    OperationSpec {
        name: "CreateMasterWayBill",
        kind: OperationKind::Create,
        category: Some(Category::MasterWayBill),
        arity: Arity::Exactly(2),
        params: &["identifier", "jsonBlob"],
    },
    OperationSpec {
        name: "GetMasterWayBill",
        kind: OperationKind::Get,
        category: Some(Category::MasterWayBill),
        arity: Arity::Exactly(1),
        params: &["identifier"],
    },
    OperationSpec {
        name: "GetMasterWayBillIndex",
        kind: OperationKind::ListIndex,
        category: Some(Category::MasterWayBill),
        arity: Arity::Exactly(0),
        params: &[],
    },
];

impl OperationSpec {
    pub fn lookup(name: &str) -> Option<&'static OperationSpec> {
        OPERATIONS.iter().find(|spec| spec.name == name)
    }

    /// Usage line, e.g. `CreateWayBill <identifier> <jsonBlob>`.
    pub fn usage(&self) -> String {
        let mut usage = self.name.to_string();
        for p in self.params {
            usage.push_str(&format!(" <{p}>"));
        }
        if self.arity == Arity::Any {
            usage.push_str(" [args...]");
        }
        usage
    }
}

/// A fully parsed request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Operation {
    Init,
    Create {
        category: Category,
        id: Identifier,
        blob: Vec<u8>,
    },
    Get {
        category: Category,
        id: Identifier,
    },
    ListIndex {
        category: Category,
    },
}

impl Operation {
    /// Resolve `name` and check `args` against its declared arity.
    pub fn parse<S: AsRef<str>>(name: &str, args: &[S]) -> DispatchResult<Self> {
        let spec = OperationSpec::lookup(name)
            .ok_or_else(|| DispatchError::UnknownOperation(name.to_string()))?;

        if !spec.arity.accepts(args.len()) {
            return Err(DispatchError::invalid(
                name,
                format!("expected {}, got {} (usage: {})", spec.arity, args.len(), spec.usage()),
            ));
        }

        let category = match (spec.kind, spec.category) {
            (OperationKind::Init, _) => return Ok(Self::Init),
            (_, Some(category)) => category,
            (_, None) => {
                return Err(DispatchError::invalid(name, "operation has no category"));
            }
        };

        let op = match spec.kind {
            OperationKind::Create => Self::Create {
                category,
                id: record_id(name, args[0].as_ref())?,
                blob: args[1].as_ref().as_bytes().to_vec(),
            },
            OperationKind::Get => Self::Get {
                category,
                id: record_id(name, args[0].as_ref())?,
            },
            OperationKind::ListIndex => Self::ListIndex { category },
            OperationKind::Init => Self::Init,
        };
        Ok(op)
    }

    /// The table name this operation was parsed from.
    pub fn name(&self) -> &'static str {
        use Category::{MasterWayBill, WayBill};
        match self {
            Self::Init => "Init",
            Self::Create { category: WayBill, .. } => "CreateWayBill",
            Self::Create { category: MasterWayBill, .. } => "CreateMasterWayBill",
            Self::Get { category: WayBill, .. } => "GetWayBill",
            Self::Get { category: MasterWayBill, .. } => "GetMasterWayBill",
            Self::ListIndex { category: WayBill } => "GetWayBillIndex",
            Self::ListIndex { category: MasterWayBill } => "GetMasterWayBillIndex",
        }
    }

    /// The capability this operation needs.
    pub fn action(&self) -> Action {
        match self {
            Self::Init => Action::Init,
            Self::Create { category, .. } => Action::Write {
                category: *category,
            },
            Self::Get { category, .. } | Self::ListIndex { category } => Action::Read {
                category: *category,
            },
        }
    }

    /// Returns `true` if the operation never writes to the ledger.
    pub fn is_read_only(&self) -> bool {
        !matches!(self, Self::Create { .. })
    }
}

fn record_id(operation: &str, raw: &str) -> DispatchResult<Identifier> {
    if Category::is_reserved_key(raw) {
        return Err(DispatchError::invalid(
            operation,
            format!("{raw} is a reserved index key"),
        ));
    }
    Identifier::new(raw).map_err(|e| DispatchError::invalid(operation, e.to_string()))
}
