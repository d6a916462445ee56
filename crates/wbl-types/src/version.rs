use std::fmt;

use serde::{Deserialize, Serialize};

/// Per-key write counter maintained by the ledger.
///
/// The first write of a key produces `Version(1)`; each later write of the
/// same key increments it by one. Conditional writes compare against it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Version(u64);

impl Version {
    /// The version assigned to the first write of a key.
    pub const INITIAL: Version = Version(1);

    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    pub fn get(&self) -> u64 {
        self.0
    }

    /// The version the next write of the same key will carry.
    pub fn next(&self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn next_increments() {
        assert_eq!(Version::INITIAL.next(), Version::new(2));
        assert_eq!(Version::new(u64::MAX).next(), Version::new(u64::MAX));
    }

    #[test]
    fn display_format() {
        assert_eq!(Version::new(7).to_string(), "v7");
    }
}
