//! Run-scoped translation table from original to assigned identifiers.

use crate::error::MappingConflict;
use std::collections::HashMap;

/// Original identifier → identifier assigned by the store.
///
/// Entries are write-once: a key, once present, is never overwritten. The
/// parent stage only hands a mapping out after its transaction committed, so
/// every key corresponds to a committed row. Keys are trimmed on insert and
/// on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdMapping {
    entries: HashMap<String, i64>,
}

impl IdMapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a mapping. Fails if `original` is already mapped.
    pub fn insert(&mut self, original: impl Into<String>, assigned: i64) -> Result<(), MappingConflict> {
        let original = original.into().trim().to_string();
        if let Some(&existing) = self.entries.get(&original) {
            return Err(MappingConflict { original, existing });
        }
        self.entries.insert(original, assigned);
        Ok(())
    }

    /// Assigned identifier for an original one.
    pub fn get(&self, original: &str) -> Option<i64> {
        self.entries.get(original.trim()).copied()
    }

    pub fn contains(&self, original: &str) -> bool {
        self.entries.contains_key(original.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, i64)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), *v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_lookup() {
        let mut mapping = IdMapping::new();
        mapping.insert("101", 501).unwrap();
        mapping.insert("102", 502).unwrap();

        assert_eq!(mapping.get("101"), Some(501));
        assert_eq!(mapping.get(" 102 "), Some(502));
        assert_eq!(mapping.get("999"), None);
        assert_eq!(mapping.len(), 2);
    }

    #[test]
    fn test_entries_are_write_once() {
        let mut mapping = IdMapping::new();
        mapping.insert("101", 501).unwrap();

        let err = mapping.insert("101", 777).unwrap_err();
        assert_eq!(err.existing, 501);
        assert_eq!(mapping.get("101"), Some(501));
    }

    #[test]
    fn test_empty() {
        let mapping = IdMapping::default();
        assert!(mapping.is_empty());
        assert_eq!(mapping.iter().count(), 0);
    }

    #[test]
    fn test_keys_are_trimmed_on_insert() {
        let mut mapping = IdMapping::new();
        mapping.insert(" 101", 5).unwrap();

        assert_eq!(mapping.get(" 101"), Some(5));
        assert_eq!(mapping.get("101"), Some(5));
        assert!(mapping.contains("101 "));
        assert!(mapping.insert("101", 6).is_err());
        assert_eq!(mapping.len(), 1);
        assert_eq!(mapping.iter().next(), Some(("101", 5)));
    }
}
