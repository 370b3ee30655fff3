//! Ordered Index
//!
//! A sorted map keyed by string, used both for the per-list ordering of items
//! and for the expiry queue of the scalar engine. Mutations are O(log n) and a
//! full ascend is O(n).

use std::collections::BTreeMap;
use std::ops::ControlFlow;

/// A set of entries kept in increasing key order, one slot per key.
#[derive(Debug, Clone)]
pub struct OrderedIndex<V> {
    entries: BTreeMap<String, V>,
}

impl<V> Default for OrderedIndex<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> OrderedIndex<V> {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Inserts `value` under `key`, replacing any existing entry in place.
    ///
    /// # Returns
    /// The replaced value, if there was one.
    pub fn upsert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        self.entries.insert(key.into(), value)
    }

    /// Removes the entry for `key`. Absent keys are a no-op.
    pub fn delete(&mut self, key: &str) -> Option<V> {
        self.entries.remove(key)
    }

    /// Visits entries in increasing key order until `visit` breaks.
    pub fn ascend<F>(&self, mut visit: F)
    where
        F: FnMut(&str, &V) -> ControlFlow<()>,
    {
        for (key, value) in &self.entries {
            if visit(key, value).is_break() {
                break;
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.entries.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<V: Clone> OrderedIndex<V> {
    /// Returns a copy of all values in key order.
    pub fn values(&self) -> Vec<V> {
        self.entries.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascend_in_key_order() {
        let mut index = OrderedIndex::new();
        index.upsert("c", 3);
        index.upsert("a", 1);
        index.upsert("b", 2);

        let mut seen = Vec::new();
        index.ascend(|key, value| {
            seen.push((key.to_string(), *value));
            ControlFlow::Continue(())
        });
        assert_eq!(
            seen,
            vec![
                ("a".to_string(), 1),
                ("b".to_string(), 2),
                ("c".to_string(), 3)
            ]
        );
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut index = OrderedIndex::new();
        assert_eq!(index.upsert("a", 1), None);
        assert_eq!(index.upsert("b", 2), None);
        assert_eq!(index.upsert("a", 10), Some(1));

        assert_eq!(index.len(), 2);
        assert_eq!(index.values(), vec![10, 2]);
    }

    #[test]
    fn test_delete_absent_is_noop() {
        let mut index: OrderedIndex<i32> = OrderedIndex::new();
        assert_eq!(index.delete("missing"), None);

        index.upsert("x", 1);
        assert_eq!(index.delete("x"), Some(1));
        assert!(index.is_empty());
        assert!(!index.contains_key("x"));
    }

    #[test]
    fn test_ascend_early_stop() {
        let mut index = OrderedIndex::new();
        for key in ["a", "b", "c", "d"] {
            index.upsert(key, ());
        }

        let mut visited = 0;
        index.ascend(|key, _| {
            visited += 1;
            if key == "b" {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(visited, 2);
        assert_eq!(index.len(), 4);
        assert!(index.get("d").is_some());
    }
}
