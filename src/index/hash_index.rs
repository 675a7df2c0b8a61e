//! Hash Index - equality index from column value to row identifiers
//!
//! One index exists per PRIMARY KEY / UNIQUE column. Lookups are O(1)
//! on average and only answer `col = value`; there is no range support.

use crate::types::{RowId, Value};
use ahash::AHashMap;
use std::collections::BTreeSet;

/// Normalized index key.
///
/// Keyed by value kind as well as content so that integer `1` and text
/// `'1'` never share an entry.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum IndexKey {
    Integer(i64),
    Text(String),
    Bool(bool),
    Null,
}

impl IndexKey {
    fn from_value(value: &Value) -> Self {
        match value {
            Value::Integer(i) => IndexKey::Integer(*i),
            Value::Text(s) => IndexKey::Text(s.clone()),
            Value::Bool(b) => IndexKey::Bool(*b),
            Value::Null => IndexKey::Null,
        }
    }
}

/// Equality index over one column
#[derive(Debug, Clone, Default)]
pub struct HashIndex {
    column: String,
    entries: AHashMap<IndexKey, BTreeSet<RowId>>,
}

impl HashIndex {
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            entries: AHashMap::new(),
        }
    }

    /// Indexed column name
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn add(&mut self, value: &Value, row_id: RowId) {
        self.entries
            .entry(IndexKey::from_value(value))
            .or_default()
            .insert(row_id);
    }

    /// Remove `row_id` from the entry for `value`; the key disappears with
    /// its last row
    pub fn remove(&mut self, value: &Value, row_id: RowId) {
        let key = IndexKey::from_value(value);
        if let Some(ids) = self.entries.get_mut(&key) {
            ids.remove(&row_id);
            if ids.is_empty() {
                self.entries.remove(&key);
            }
        }
    }

    /// Row identifiers holding `value`, ascending; empty when unknown
    pub fn lookup(&self, value: &Value) -> BTreeSet<RowId> {
        self.entries
            .get(&IndexKey::from_value(value))
            .cloned()
            .unwrap_or_default()
    }

    pub fn has(&self, value: &Value) -> bool {
        self.entries.contains_key(&IndexKey::from_value(value))
    }

    /// True when `value` is held by any row other than `row_id`
    pub fn held_by_other(&self, value: &Value, row_id: Option<RowId>) -> bool {
        self.entries
            .get(&IndexKey::from_value(value))
            .is_some_and(|ids| ids.iter().any(|id| Some(*id) != row_id))
    }

    /// Number of distinct non-empty keys
    pub fn size(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_lookup() {
        let mut index = HashIndex::new("id");
        index.add(&Value::Integer(1), 10);
        index.add(&Value::Integer(1), 11);
        index.add(&Value::Integer(2), 12);

        assert_eq!(index.lookup(&Value::Integer(1)).into_iter().collect::<Vec<_>>(), vec![10, 11]);
        assert_eq!(index.size(), 2);
        assert!(index.has(&Value::Integer(2)));
        assert_eq!(index.column(), "id");
    }

    #[test]
    fn test_lookup_unknown_is_empty() {
        let index = HashIndex::new("id");
        assert!(index.lookup(&Value::Integer(42)).is_empty());
        assert!(!index.has(&Value::Integer(42)));
    }

    #[test]
    fn test_remove_last_row_drops_key() {
        let mut index = HashIndex::new("name");
        index.add(&Value::Text("a".into()), 1);
        index.add(&Value::Text("a".into()), 2);

        index.remove(&Value::Text("a".into()), 1);
        assert_eq!(index.size(), 1);
        index.remove(&Value::Text("a".into()), 2);
        assert_eq!(index.size(), 0);
        assert!(!index.has(&Value::Text("a".into())));

        // Removing from a missing key is a no-op
        index.remove(&Value::Text("zzz".into()), 9);
        assert!(index.is_empty());
    }

    #[test]
    fn test_integer_and_text_keys_do_not_collide() {
        let mut index = HashIndex::new("k");
        index.add(&Value::Integer(1), 1);
        index.add(&Value::Text("1".into()), 2);
        index.add(&Value::Bool(true), 3);
        index.add(&Value::Text("true".into()), 4);

        assert_eq!(index.size(), 4);
        assert_eq!(index.lookup(&Value::Integer(1)).len(), 1);
        assert!(index.lookup(&Value::Text("1".into())).contains(&2));
        assert!(index.lookup(&Value::Bool(true)).contains(&3));
    }

    #[test]
    fn test_null_collapses_to_one_key() {
        let mut index = HashIndex::new("k");
        index.add(&Value::Null, 1);
        index.add(&Value::Null, 2);
        assert_eq!(index.size(), 1);
        assert_eq!(index.lookup(&Value::Null).len(), 2);
    }

    #[test]
    fn test_held_by_other_excludes_own_row() {
        let mut index = HashIndex::new("id");
        index.add(&Value::Integer(5), 1);

        assert!(!index.held_by_other(&Value::Integer(5), Some(1)));
        assert!(index.held_by_other(&Value::Integer(5), Some(2)));
        assert!(index.held_by_other(&Value::Integer(5), None));
        assert!(!index.held_by_other(&Value::Integer(6), None));
    }
}
