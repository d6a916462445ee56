//! The decoded value of an index record.

use std::collections::HashSet;

use wbl_types::Identifier;

/// Ordered, duplicate-free list of identifiers.
///
/// Order is insertion order. On the ledger the list is a plain JSON array of
/// strings, e.g. `["wb1","wb2"]`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IdentifierIndex {
    ids: Vec<Identifier>,
    seen: HashSet<Identifier>,
}

impl IdentifierIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of identifiers in the index.
    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        self.seen.contains(id)
    }

    /// Append `id` unless already present. Returns `true` if it was added.
    pub fn insert(&mut self, id: Identifier) -> bool {
        if !self.seen.insert(id.clone()) {
            return false;
        }
        self.ids.push(id);
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.ids.iter()
    }

    pub fn into_vec(self) -> Vec<Identifier> {
        self.ids
    }

    /// Decode a stored index.
    ///
    /// Duplicate entries keep their first position. Empty strings or a
    /// non-array payload are rejected.
    pub fn decode(bytes: &[u8]) -> Result<Self, String> {
        let raw: Vec<Identifier> = serde_json::from_slice(bytes).map_err(|e| e.to_string())?;
        let mut index = Self::new();
        for id in raw {
            index.insert(id);
        }
        Ok(index)
    }

    /// Encode as a JSON array of strings.
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(&self.ids)
    }
}

impl FromIterator<Identifier> for IdentifierIndex {
    fn from_iter<T: IntoIterator<Item = Identifier>>(iter: T) -> Self {
        let mut index = Self::new();
        for id in iter {
            index.insert(id);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> Identifier {
        Identifier::new(s).unwrap()
    }

    #[test]
    fn insert_preserves_order_and_skips_duplicates() {
        let mut index = IdentifierIndex::new();
        assert!(index.insert(id("wb2")));
        assert!(index.insert(id("wb1")));
        assert!(!index.insert(id("wb2")));

        let ids: Vec<&str> = index.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["wb2", "wb1"]);
    }

    #[test]
    fn encodes_as_json_array() {
        let index: IdentifierIndex = [id("wb1"), id("wb2")].into_iter().collect();
        assert_eq!(index.encode().unwrap(), br#"["wb1","wb2"]"#);
    }

    #[test]
    fn decode_dedupes_keeping_first_position() {
        let index = IdentifierIndex::decode(br#"["a","b","a","c"]"#).unwrap();
        let ids: Vec<&str> = index.iter().map(Identifier::as_str).collect();
        assert_eq!(ids, vec!["a", "b", "c"]);
    }

    #[test]
    fn decode_rejects_non_arrays_and_empty_entries() {
        assert!(IdentifierIndex::decode(b"{}").is_err());
        assert!(IdentifierIndex::decode(br#"["ok",""]"#).is_err());
        assert!(IdentifierIndex::decode(b"garbage").is_err());
    }

    #[test]
    fn empty_array_decodes_empty() {
        let index = IdentifierIndex::decode(b"[]").unwrap();
        assert!(index.is_empty());
    }
}
