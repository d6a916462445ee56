use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// Caller-supplied key of a record in the ledger.
///
/// An `Identifier` is never empty. It is stored verbatim as the ledger key,
/// so two identifiers are equal exactly when their strings are equal.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Identifier(String);

impl Identifier {
    /// Validate and wrap a raw identifier string.
    pub fn new(raw: impl Into<String>) -> Result<Self, TypeError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(TypeError::EmptyIdentifier);
        }
        Ok(Self(raw))
    }

    /// Wrap a string known to be non-empty at compile time.
    pub(crate) fn from_static(raw: &'static str) -> Self {
        debug_assert!(!raw.is_empty());
        Self(raw.to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume the identifier, returning the owned string.
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl TryFrom<String> for Identifier {
    type Error = TypeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Identifier {
    type Error = TypeError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Identifier> for String {
    fn from(id: Identifier) -> Self {
        id.0
    }
}

impl AsRef<str> for Identifier {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Identifier({})", self.0)
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_identifier_rejected() {
        assert_eq!(Identifier::new(""), Err(TypeError::EmptyIdentifier));
    }

    #[test]
    fn identifier_display_is_verbatim() {
        let id = Identifier::new("wb-001").unwrap();
        assert_eq!(id.to_string(), "wb-001");
        assert_eq!(id.as_str(), "wb-001");
        assert_eq!(format!("{id:?}"), "Identifier(wb-001)");
    }

    #[test]
    fn serde_rejects_empty_string() {
        let ok: Identifier = serde_json::from_str("\"wb1\"").unwrap();
        assert_eq!(ok.as_str(), "wb1");
        assert!(serde_json::from_str::<Identifier>("\"\"").is_err());
    }

    #[test]
    fn serializes_as_plain_string() {
        let id = Identifier::new("wb1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"wb1\"");
    }

    proptest! {
        #[test]
        fn any_non_empty_string_is_accepted(s in ".+") {
            let id = Identifier::new(s.clone()).unwrap();
            prop_assert_eq!(id.into_inner(), s);
        }
    }
}
