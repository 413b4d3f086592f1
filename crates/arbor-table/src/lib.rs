//! Ordered binding table with tombstone deletion.
//!
//! A `BindingTable` maps string keys to values and remembers the order in which
//! keys were inserted. Deleting a key leaves a tombstone in its slot: the entry
//! disappears from lookups and snapshots, but the slot keeps its ordinal position
//! so the remaining live entries never shift. A key added again after deletion
//! is appended at the end instead of reclaiming its old position.

use rustc_hash::FxHashMap;
use std::fmt;

/// Tombstone count above which a table is considered for compaction.
pub const DEFAULT_COMPACT_THRESHOLD: usize = 32;

/// A single slot in insertion order. `value` is `None` once tombstoned.
#[derive(Clone)]
struct Slot<V> {
    key: String,
    value: Option<V>,
}

/// An insertion-ordered map from names to values with tombstone deletion.
#[derive(Clone)]
pub struct BindingTable<V> {
    /// Slots in insertion order, live and tombstoned.
    slots: Vec<Slot<V>>,
    /// Live keys to their position in `slots`.
    index: FxHashMap<String, usize>,
    /// Number of tombstoned slots still held in `slots`.
    tombstones: usize,
    /// Tombstone count that must be exceeded before compaction kicks in.
    compact_threshold: usize,
}

impl<V> BindingTable<V> {
    /// Creates an empty table with the default compaction threshold.
    pub fn new() -> Self {
        Self::with_compact_threshold(DEFAULT_COMPACT_THRESHOLD)
    }

    /// Creates an empty table that compacts once more than `compact_threshold`
    /// tombstones have accumulated and they outnumber the live entries.
    pub fn with_compact_threshold(compact_threshold: usize) -> Self {
        BindingTable {
            slots: Vec::new(),
            index: FxHashMap::default(),
            tombstones: 0,
            compact_threshold,
        }
    }

    /// Inserts `value` under `key`.
    ///
    /// Returns `false` and leaves the table untouched if `key` is already live.
    pub fn add(&mut self, key: impl Into<String>, value: V) -> bool {
        let key = key.into();
        if self.index.contains_key(&key) {
            return false;
        }
        self.push_slot(key, value);
        true
    }

    /// Overwrites the live entry for `key` in place, or appends a new one.
    ///
    /// Returns the previous value if `key` was live.
    pub fn upsert(&mut self, key: impl Into<String>, value: V) -> Option<V> {
        let key = key.into();
        match self.index.get(&key) {
            Some(&position) => self.slots[position].value.replace(value),
            None => {
                self.push_slot(key, value);
                None
            }
        }
    }

    fn push_slot(&mut self, key: String, value: V) {
        let position = self.slots.len();
        self.index.insert(key.clone(), position);
        self.slots.push(Slot { key, value: Some(value) });
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.index
            .get(key)
            .and_then(|&position| self.slots[position].value.as_ref())
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut V> {
        match self.index.get(key) {
            Some(&position) => self.slots[position].value.as_mut(),
            None => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    /// Tombstones the entry for `key` and returns its value.
    ///
    /// The slot keeps its position; later inserts never reuse it.
    pub fn del(&mut self, key: &str) -> Option<V> {
        let position = self.index.remove(key)?;
        let removed = self.slots[position].value.take();
        self.tombstones += 1;
        self.maybe_compact();
        removed
    }

    fn maybe_compact(&mut self) {
        if self.tombstones > self.compact_threshold && self.tombstones > self.index.len() {
            self.compact();
        }
    }

    /// Drops every tombstoned slot. Live entries keep their relative order.
    pub fn compact(&mut self) {
        if self.tombstones == 0 {
            return;
        }
        log::trace!(
            "compacting binding table: {} live, {} tombstones",
            self.index.len(),
            self.tombstones
        );
        self.slots.retain(|slot| slot.value.is_some());
        self.index.clear();
        for (position, slot) in self.slots.iter().enumerate() {
            self.index.insert(slot.key.clone(), position);
        }
        self.tombstones = 0;
    }

    /// Number of live entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Number of tombstoned slots not yet compacted away.
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Iterates over live `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> Iter<'_, V> {
        Iter { slots: self.slots.iter() }
    }

    /// Iterates over live keys in insertion order.
    pub fn keys(&self) -> Keys<'_, V> {
        Keys { inner: self.iter() }
    }

    /// Iterates over live values in insertion order.
    pub fn values(&self) -> Values<'_, V> {
        Values { inner: self.iter() }
    }

    /// Snapshot of the live `(key, value)` pairs in insertion order.
    pub fn get_live_entries(&self) -> Vec<(&str, &V)> {
        self.iter().collect()
    }

    /// Snapshot of the live values in insertion order.
    pub fn get_live_entries_values(&self) -> Vec<&V> {
        self.values().collect()
    }
}

impl<V> Default for BindingTable<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: fmt::Debug> fmt::Debug for BindingTable<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, V> IntoIterator for &'a BindingTable<V> {
    type Item = (&'a str, &'a V);
    type IntoIter = Iter<'a, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over the live entries of a [`BindingTable`].
pub struct Iter<'a, V> {
    slots: std::slice::Iter<'a, Slot<V>>,
}

impl<'a, V> Iterator for Iter<'a, V> {
    type Item = (&'a str, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        self.slots
            .by_ref()
            .find_map(|slot| slot.value.as_ref().map(|value| (slot.key.as_str(), value)))
    }
}

/// Iterator over the live keys of a [`BindingTable`].
pub struct Keys<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Keys<'a, V> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(key, _)| key)
    }
}

/// Iterator over the live values of a [`BindingTable`].
pub struct Values<'a, V> {
    inner: Iter<'a, V>,
}

impl<'a, V> Iterator for Values<'a, V> {
    type Item = &'a V;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|(_, value)| value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compaction_waits_for_threshold() {
        let mut table = BindingTable::with_compact_threshold(2);
        for key in ["a", "b", "c", "d"] {
            table.add(key, key.len());
        }
        table.del("a");
        table.del("b");
        assert_eq!(table.tombstones(), 2);
        assert_eq!(table.slots.len(), 4);

        // Third tombstone exceeds the threshold and outnumbers the single live entry.
        table.del("c");
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.slots.len(), 1);
        assert_eq!(table.index.get("d"), Some(&0));
    }

    #[test]
    fn test_compaction_skipped_while_live_entries_dominate() {
        let mut table = BindingTable::with_compact_threshold(0);
        for key in ["a", "b", "c"] {
            table.add(key, ());
        }
        table.del("b");
        assert_eq!(table.tombstones(), 1);
        assert_eq!(table.slots.len(), 3);
    }

    #[test]
    fn test_manual_compact_rebuilds_index() {
        let mut table = BindingTable::new();
        table.add("x", 1);
        table.add("y", 2);
        table.add("z", 3);
        table.del("x");
        table.compact();
        assert_eq!(table.index.get("y"), Some(&0));
        assert_eq!(table.index.get("z"), Some(&1));
        assert_eq!(table.get("z"), Some(&3));
    }
}
