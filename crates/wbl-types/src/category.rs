use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identifier::Identifier;

/// Logical grouping of records sharing one reserved index key.
///
/// Waybills and master waybills are stored through the same code path; the
/// category only decides which index record an identifier is registered in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "waybill")]
    WayBill,
    #[serde(rename = "masterWayBill")]
    MasterWayBill,
}

impl Category {
    /// Every known category.
    pub const ALL: [Category; 2] = [Category::WayBill, Category::MasterWayBill];

    /// The category's display name.
    pub fn name(&self) -> &'static str {
        match self {
            Self::WayBill => "waybill",
            Self::MasterWayBill => "masterWayBill",
        }
    }

    /// The reserved ledger key holding this category's index record.
    pub fn index_key(&self) -> &'static str {
        match self {
            Self::WayBill => "WAYBILL_INDEX",
            Self::MasterWayBill => "MASTERWAYBILL_INDEX",
        }
    }

    /// The reserved index key as an [`Identifier`].
    pub fn index_id(&self) -> Identifier {
        Identifier::from_static(self.index_key())
    }

    /// Returns `true` if `key` is the reserved index key of any category.
    pub fn is_reserved_key(key: &str) -> bool {
        Self::ALL.iter().any(|c| c.index_key() == key)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Category {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| TypeError::UnknownCategory(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_keys_are_distinct() {
        assert_ne!(
            Category::WayBill.index_key(),
            Category::MasterWayBill.index_key()
        );
    }

    #[test]
    fn index_id_matches_key() {
        assert_eq!(Category::WayBill.index_id().as_str(), "WAYBILL_INDEX");
    }

    #[test]
    fn reserved_keys_detected() {
        assert!(Category::is_reserved_key("WAYBILL_INDEX"));
        assert!(Category::is_reserved_key("MASTERWAYBILL_INDEX"));
        assert!(!Category::is_reserved_key("wb1"));
    }

    #[test]
    fn parse_is_case_insensitive() {
        assert_eq!("waybill".parse::<Category>().unwrap(), Category::WayBill);
        assert_eq!(
            "masterwaybill".parse::<Category>().unwrap(),
            Category::MasterWayBill
        );
        assert_eq!(
            "nope".parse::<Category>(),
            Err(TypeError::UnknownCategory("nope".into()))
        );
    }

    #[test]
    fn serde_uses_display_names() {
        let json = serde_json::to_string(&Category::MasterWayBill).unwrap();
        assert_eq!(json, "\"masterWayBill\"");
        let back: Category = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Category::MasterWayBill);
    }
}
