//! Utility functions and traits for `ProbingTable`

use crate::ProbingTable;
use std::hash::{BuildHasher, Hash};

/// Extension trait with snapshot and value-based operations.
///
/// The table only indexes keys. Everything here that searches by value is a
/// linear scan over the backing store and never touches the probe sequence.
pub trait TableExtensions<K, V> {
    /// Returns the keys of the table as a Vec
    fn keys(&self) -> Vec<K>;

    /// Returns the values of the table as a Vec
    fn values(&self) -> Vec<V>;

    /// Returns true if any entry holds `value`
    fn contains_value(&self, value: &V) -> bool;

    /// Returns the key of the first entry, in storage order, holding `value`
    fn key_of(&self, value: &V) -> Option<&K>;

    /// Removes the first entry, in storage order, holding `value` and returns
    /// its key
    fn remove_value(&mut self, value: &V) -> Option<K>;
}

impl<K, V, S> TableExtensions<K, V> for ProbingTable<K, V, S>
where
    K: Eq + Hash + Clone,
    V: PartialEq + Clone,
    S: BuildHasher,
{
    fn keys(&self) -> Vec<K> {
        self.iter().map(|(k, _)| k.clone()).collect()
    }

    fn values(&self) -> Vec<V> {
        self.iter().map(|(_, v)| v.clone()).collect()
    }

    fn contains_value(&self, value: &V) -> bool {
        self.key_of(value).is_some()
    }

    fn key_of(&self, value: &V) -> Option<&K> {
        self.iter().find(|(_, v)| *v == value).map(|(k, _)| k)
    }

    fn remove_value(&mut self, value: &V) -> Option<K> {
        let key = self.key_of(value)?.clone();
        self.remove_entry(&key).map(|(k, _)| k)
    }
}

/// Creates a `ProbingTable` sized for the pairs of `iter`
pub fn from_iter<K, V, I>(iter: I) -> ProbingTable<K, V>
where
    K: Eq + Hash,
    I: IntoIterator<Item = (K, V)>,
{
    let iter = iter.into_iter();
    // keep the lower bound at or below half of the slots
    let mut table = ProbingTable::new(iter.size_hint().0.saturating_mul(2));

    for (key, value) in iter {
        table.insert(key, value);
    }

    table
}
