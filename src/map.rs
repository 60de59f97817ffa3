//! The indexed ordered map used as the storage primitive everywhere in the
//! solver: the tableau's basic-row map, the variable/constraint/edit maps,
//! and every [`Row`](crate::row::Row)'s cell map.
//!
//! This is deliberately not a plain hash map. Iteration must follow
//! insertion order (with deleted slots compacted) because the Phase-2
//! entering-symbol rule scans cells in that order to avoid cycling; an
//! unordered map would make pivoting nondeterministic. `indexmap::IndexMap`
//! already gives us insertion-ordered iteration and an O(1) amortized
//! `swap_remove`, so `Table` is a thin, crate-private wrapper rather than a
//! hand-rolled structure.

use indexmap::IndexMap;
use std::hash::Hash;

#[derive(Debug, Clone)]
pub(crate) struct Table<K, V> {
    inner: IndexMap<K, V>,
}

impl<K: Hash + Eq, V> Table<K, V> {
    pub(crate) fn new() -> Self {
        Self { inner: IndexMap::new() }
    }

    pub(crate) fn insert(&mut self, key: K, value: V) -> Option<V> {
        self.inner.insert(key, value)
    }

    pub(crate) fn get(&self, key: &K) -> Option<&V> {
        self.inner.get(key)
    }

    pub(crate) fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        self.inner.get_mut(key)
    }

    pub(crate) fn contains_key(&self, key: &K) -> bool {
        self.inner.contains_key(key)
    }

    /// Erase in O(1) by swapping with the last entry, per the indexed map's
    /// contract (spec §9 Design Notes: "swap-and-pop compaction on erase").
    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        self.inner.swap_remove(key)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&K, &V)> {
        self.inner.iter()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = (&K, &mut V)> {
        self.inner.iter_mut()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        self.inner.values_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.inner.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl<K: Hash + Eq, V> Default for Table<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insertion_order_preserved() {
        let mut table = Table::new();
        table.insert(3, "c");
        table.insert(1, "a");
        table.insert(2, "b");
        let order: Vec<_> = table.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![3, 1, 2]);
    }

    #[test]
    fn remove_swaps_with_last() {
        let mut table = Table::new();
        table.insert(1, "a");
        table.insert(2, "b");
        table.insert(3, "c");
        assert_eq!(table.remove(&1), Some("a"));
        // 3 was swapped into slot 0.
        let order: Vec<_> = table.iter().map(|(k, _)| *k).collect();
        assert_eq!(order, vec![3, 2]);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn remove_unknown_key_is_noop() {
        let mut table: Table<i32, &str> = Table::new();
        table.insert(1, "a");
        assert_eq!(table.remove(&99), None);
        assert_eq!(table.len(), 1);
    }
}
