//! The single capability check that stands in for certificate-based access
//! control.
//!
//! The hosting runtime knows who the caller is; the chaincode only asks a
//! [`CapabilityCheck`] whether the caller may perform an [`Action`].
//! [`AttributeCapability`] decides by looking up one certificate attribute
//! through an [`AttributeSource`] and matching it against allow-lists.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;
use tracing::warn;
use wbl_types::Category;

use crate::error::{DispatchError, DispatchResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Read { category: Category },
    Write { category: Category },
    Init,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { category } => write!(f, "read:{category}"),
            Self::Write { category } => write!(f, "write:{category}"),
            Self::Init => write!(f, "init"),
        }
    }
}

pub trait CapabilityCheck: Send + Sync {
    /// `Ok(true)` grants, `Ok(false)` denies. An error also denies and
    /// carries the reason.
    fn authorize(&self, action: &Action) -> DispatchResult<bool>;
}

/// Grants everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct AllowAll;

impl CapabilityCheck for AllowAll {
    fn authorize(&self, _action: &Action) -> DispatchResult<bool> {
        Ok(true)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("cannot read attribute {name}: {reason}")]
pub struct AttributeError {
    pub name: String,
    pub reason: String,
}

/// Read access to the invoking caller's certificate attributes.
pub trait AttributeSource: Send + Sync {
    /// `Ok(None)` when the caller's certificate does not carry `name`.
    fn read_attribute(&self, name: &str) -> Result<Option<String>, AttributeError>;
}

/// Attributes supplied up front, e.g. from the command line.
#[derive(Clone, Debug, Default)]
pub struct StaticAttributes {
    attributes: HashMap<String, String>,
}

impl StaticAttributes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Parse `name=value` pairs.
    pub fn parse_pairs<S: AsRef<str>>(pairs: &[S]) -> Result<Self, AttributeError> {
        let mut attrs = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (name, value) = pair.split_once('=').ok_or_else(|| AttributeError {
                name: pair.to_string(),
                reason: "expected name=value".into(),
            })?;
            attrs.attributes.insert(name.trim().to_string(), value.trim().to_string());
        }
        Ok(attrs)
    }
}

impl AttributeSource for StaticAttributes {
    fn read_attribute(&self, name: &str) -> Result<Option<String>, AttributeError> {
        Ok(self.attributes.get(name).cloned())
    }
}

/// Grants an action when the caller's `attribute` value is in the action's
/// allow-list. An empty allow-list leaves that action unrestricted.
pub struct AttributeCapability {
    attribute: String,
    read: Vec<String>,
    write: Vec<String>,
    source: Arc<dyn AttributeSource>,
}

impl AttributeCapability {
    pub fn new(
        attribute: impl Into<String>,
        read: Vec<String>,
        write: Vec<String>,
        source: Arc<dyn AttributeSource>,
    ) -> Self {
        Self {
            attribute: attribute.into(),
            read,
            write,
            source,
        }
    }
}

impl CapabilityCheck for AttributeCapability {
    fn authorize(&self, action: &Action) -> DispatchResult<bool> {
        let allowed = match action {
            Action::Init => return Ok(true),
            Action::Read { .. } => &self.read,
            Action::Write { .. } => &self.write,
        };
        if allowed.is_empty() {
            return Ok(true);
        }

        let value = self
            .source
            .read_attribute(&self.attribute)
            .map_err(|e| DispatchError::Unauthorized(e.to_string()))?;

        let granted = value.as_ref().is_some_and(|v| allowed.contains(v));
        if !granted {
            warn!(%action, attribute = %self.attribute, value = ?value, "capability denied");
        }
        Ok(granted)
    }
}

impl fmt::Debug for AttributeCapability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AttributeCapability")
            .field("attribute", &self.attribute)
            .field("read", &self.read)
            .field("write", &self.write)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    struct BrokenSource;

    impl AttributeSource for BrokenSource {
        fn read_attribute(&self, name: &str) -> Result<Option<String>, AttributeError> {
            Err(AttributeError {
                name: name.to_string(),
                reason: "certificate unavailable".into(),
            })
        }
    }

    fn role_gate(source: Arc<dyn AttributeSource>) -> AttributeCapability {
        AttributeCapability::new(
            "role",
            vec!["reader".into(), "writer".into()],
            vec!["writer".into()],
            source,
        )
    }

    const WRITE: Action = Action::Write {
        category: Category::WayBill,
    };
    const READ: Action = Action::Read {
        category: Category::WayBill,
    };

    #[test]
    fn allow_all_allows() {
        assert!(AllowAll.authorize(&WRITE).unwrap());
        assert!(AllowAll.authorize(&Action::Init).unwrap());
    }

    #[test]
    fn action_display() {
        assert_eq!(WRITE.to_string(), "write:waybill");
        assert_eq!(
            Action::Read {
                category: Category::MasterWayBill
            }
            .to_string(),
            "read:masterWayBill"
        );
    }

    #[test]
    fn reader_can_read_but_not_write() {
        let gate = role_gate(Arc::new(StaticAttributes::new().with("role", "reader")));
        assert!(gate.authorize(&READ).unwrap());
        assert!(!gate.authorize(&WRITE).unwrap());
    }

    #[test]
    fn missing_attribute_denies() {
        let gate = role_gate(Arc::new(StaticAttributes::new()));
        assert!(!gate.authorize(&READ).unwrap());
    }

    #[test]
    fn empty_allow_list_is_unrestricted() {
        let gate = AttributeCapability::new(
            "role",
            vec![],
            vec!["writer".into()],
            Arc::new(StaticAttributes::new()),
        );
        assert!(gate.authorize(&READ).unwrap());
        assert!(!gate.authorize(&WRITE).unwrap());
    }

    #[test]
    fn attribute_read_error_is_unauthorized() {
        let gate = role_gate(Arc::new(BrokenSource));
        let err = gate.authorize(&WRITE).unwrap_err();
        assert!(matches!(err, DispatchError::Unauthorized(_)));
        assert_eq!(err.kind(), ErrorKind::Unauthorized);
    }

    #[test]
    fn parse_pairs() {
        let attrs = StaticAttributes::parse_pairs(&["role=writer", " org = acme "]).unwrap();
        assert_eq!(attrs.read_attribute("role").unwrap().as_deref(), Some("writer"));
        assert_eq!(attrs.read_attribute("org").unwrap().as_deref(), Some("acme"));
        assert!(StaticAttributes::parse_pairs(&["novalue"]).is_err());
    }
}
