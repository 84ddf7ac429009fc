//! Stable object identifiers

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// A stable object identifier that persists across capture/apply cycles.
///
/// Fixed objects get their id once, at authoring time. Spawned objects take
/// theirs from the snapshot record that created them, so the same id names
/// the same logical object on every machine that applies the snapshot.
#[derive(Clone, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(String);

impl ObjectId {
    /// Wrap an existing id string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Mint a fresh globally-unique id (random 128-bit value, hex encoded)
    pub fn mint() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }

    /// Get the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id is empty or whitespace only
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl Borrow<str> for ObjectId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ObjectId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for ObjectId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.0)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_mint_is_hex_128_bit() {
        let id = ObjectId::mint();
        assert_eq!(id.as_str().len(), 32);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_mint_unique() {
        let ids: HashSet<_> = (0..1000).map(|_| ObjectId::mint()).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn test_ordering_is_ordinal() {
        let mut ids = vec![ObjectId::from("b"), ObjectId::from("B"), ObjectId::from("a")];
        ids.sort();
        let sorted: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(sorted, vec!["B", "a", "b"]);
    }

    #[test]
    fn test_blank() {
        assert!(ObjectId::from("  ").is_blank());
        assert!(!ObjectId::from("wall_01").is_blank());
    }

    #[test]
    fn test_serde_transparent() {
        let id = ObjectId::from("wall_01");
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"wall_01\"");
    }
}
