use std::{
    borrow::Borrow,
    collections::hash_map::DefaultHasher,
    fmt,
    hash::{BuildHasher, BuildHasherDefault, Hash},
    iter::FusedIterator,
    mem, slice, vec,
};

use crate::{error::TableError, primes::checked_next_prime};

/// Capacity requested by [`ProbingTable::default`]
pub const DEFAULT_CAPACITY: usize = 50;

/// Deterministic hasher used when no other `BuildHasher` is given.
///
/// `DefaultHasher::default()` is SipHash keyed with zeros, so a key always
/// lands on the same starting slot for a given capacity.
pub type DefaultHashBuilder = BuildHasherDefault<DefaultHasher>;

/// One cell of the backing store
#[derive(Debug, Clone)]
enum Slot<K, V> {
    /// Never used since the store was allocated or cleared
    Empty,
    /// Holds a live entry
    Occupied(K, V),
    /// Tombstone left by a removal; keeps probe chains through it intact
    Deleted,
}

impl<K, V> Slot<K, V> {
    /// Borrows the entry of an occupied slot
    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Deleted => None,
        }
    }

    /// Moves the entry out of an occupied slot
    fn into_entry(self) -> Option<(K, V)> {
        match self {
            Self::Occupied(key, value) => Some((key, value)),
            Self::Empty | Self::Deleted => None,
        }
    }

    /// Public view of the slot state
    fn state(&self) -> SlotState {
        match self {
            Self::Empty => SlotState::Empty,
            Self::Occupied(..) => SlotState::Occupied,
            Self::Deleted => SlotState::Deleted,
        }
    }
}

/// State of a single slot, as reported by [`ProbingTable::slot_states`].
///
/// Displays as a one-letter code: `E`, `O` or `D`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlotState {
    /// Never used, or reset by [`ProbingTable::clear`]
    Empty,
    /// Holds a live entry
    Occupied,
    /// Tombstone left by a removal
    Deleted,
}

impl fmt::Display for SlotState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let code = match self {
            Self::Empty => "E",
            Self::Occupied => "O",
            Self::Deleted => "D",
        };
        f.write_str(code)
    }
}

/// What [`ProbingTable::insert`] did with the entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertOutcome {
    /// The key was absent and now occupies a slot
    Inserted,
    /// The key was present and its value was overwritten in place
    Updated,
}

/// Where a probe for a key stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Probe {
    /// An occupied slot holding the key
    Found(usize),
    /// The key is absent; the index is where it would be placed
    Vacant(usize),
    /// The key is absent and the probe saw no slot it could be placed in
    Full,
}

/// An open-addressing hash table with quadratic probing and lazy deletion.
///
/// The number of slots is always prime and the table keeps at most half of
/// them occupied, growing to `next_prime(2 * capacity)` before an insertion
/// would cross that line. Removal leaves a tombstone behind; tombstones are
/// only discarded when the table rehashes.
///
/// Note: This implementation is not thread-safe. Callers that share a table
/// between threads must serialize access themselves.
#[derive(Debug, Clone)]
pub struct ProbingTable<K, V, S = DefaultHashBuilder> {
    /// The backing store; its length is the capacity
    slots: Vec<Slot<K, V>>,
    /// Number of occupied slots
    size: usize,
    /// Number of deleted slots
    tombstones: usize,
    /// Builds the hasher for every key
    hash_builder: S,
}

/// Reports a growth failure from an infallible constructor or insert
#[cold]
#[allow(clippy::panic)]
fn growth_failed(err: &TableError) -> ! {
    panic!("{err}")
}

impl<K, V> ProbingTable<K, V, DefaultHashBuilder> {
    /// Creates a table with at least `capacity` slots, rounded up to a prime.
    ///
    /// ```rust
    /// use probing::ProbingTable;
    ///
    /// let table: ProbingTable<String, u32> = ProbingTable::new(50);
    /// assert_eq!(table.capacity(), 53);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity does not fit in a `usize` or cannot be
    /// allocated.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self::with_hasher(capacity, DefaultHashBuilder::default())
    }

    /// Fallible version of [`ProbingTable::new`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the rounded capacity overflows or the
    /// allocation is refused.
    pub fn try_with_capacity(capacity: usize) -> Result<Self, TableError> {
        Self::try_with_hasher(capacity, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ProbingTable<K, V, S> {
    /// Creates a table with at least `capacity` slots that hashes keys with
    /// `hash_builder`.
    ///
    /// # Panics
    ///
    /// Panics if the rounded capacity does not fit in a `usize` or cannot be
    /// allocated.
    #[must_use]
    pub fn with_hasher(capacity: usize, hash_builder: S) -> Self {
        match Self::try_with_hasher(capacity, hash_builder) {
            Ok(table) => table,
            Err(err) => growth_failed(&err),
        }
    }

    /// Fallible version of [`ProbingTable::with_hasher`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the rounded capacity overflows or the
    /// allocation is refused.
    pub fn try_with_hasher(capacity: usize, hash_builder: S) -> Result<Self, TableError> {
        let capacity =
            checked_next_prime(capacity).ok_or(TableError::CapacityOverflow { requested: capacity })?;

        Ok(Self { slots: Self::allocate_slots(capacity)?, size: 0, tombstones: 0, hash_builder })
    }

    /// Allocates a store of `capacity` empty slots without aborting on failure
    fn allocate_slots(capacity: usize) -> Result<Vec<Slot<K, V>>, TableError> {
        let mut slots = Vec::new();
        slots
            .try_reserve_exact(capacity)
            .map_err(|source| TableError::AllocationFailed { requested: capacity, source })?;
        slots.resize_with(capacity, || Slot::Empty);
        Ok(slots)
    }

    /// Returns the number of entries in the table
    #[must_use]
    pub fn len(&self) -> usize {
        self.size
    }

    /// Returns true if the table holds no entries
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns the number of slots in the backing store; always prime
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of tombstones waiting for the next rehash
    #[must_use]
    pub fn tombstones(&self) -> usize {
        self.tombstones
    }

    /// Returns the ratio of occupied slots to capacity; never above one half
    #[must_use]
    #[allow(clippy::arithmetic_side_effects, clippy::cast_precision_loss)]
    pub fn load_factor(&self) -> f64 {
        self.size as f64 / self.slots.len() as f64
    }

    /// Returns a reference to the table's `BuildHasher`
    #[must_use]
    pub fn hasher(&self) -> &S {
        &self.hash_builder
    }

    /// Returns an iterator over the entries in backing-store order.
    ///
    /// The order is stable until the next mutation.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter { slots: self.slots.iter(), remaining: self.size }
    }

    /// Returns the state of every slot in backing-store order
    pub fn slot_states(&self) -> impl DoubleEndedIterator<Item = SlotState> + ExactSizeIterator {
        self.slots.iter().map(Slot::state)
    }

    /// Empties every slot, tombstones included. The capacity is kept.
    pub fn clear(&mut self) {
        log::trace!("clearing {} entries and {} tombstones", self.size, self.tombstones);

        self.slots.fill_with(|| Slot::Empty);
        self.size = 0;
        self.tombstones = 0;
    }
}

impl<K, V, S> ProbingTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// Hashes a key and reduces it to a starting slot
    #[allow(clippy::arithmetic_side_effects, clippy::cast_possible_truncation)]
    fn hash<Q>(&self, key: &Q) -> usize
    where
        Q: Hash + ?Sized,
    {
        let hash = self.hash_builder.hash_one(key);
        // the remainder is below the slot count, which is a usize
        (hash % self.slots.len() as u64) as usize
    }

    /// Walks the probe sequence `hash, hash + 1, hash + 4, hash + 9, ...` and
    /// reports where it stopped together with the number of slots inspected.
    ///
    /// Tombstones never stop the walk, but the first one seen becomes the
    /// placement for an absent key. At most `capacity` positions are visited,
    /// which covers every slot the sequence can reach in a prime-sized store.
    #[allow(clippy::arithmetic_side_effects)]
    fn probe<Q>(&self, key: &Q) -> (Probe, usize)
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let capacity = self.slots.len();
        let mut index = self.hash(key);
        let mut offset = 1 % capacity;
        let mut first_tombstone = None;

        for inspected in 1..=capacity {
            match self.slots.get(index) {
                None => break,
                Some(Slot::Empty) => {
                    return (Probe::Vacant(first_tombstone.unwrap_or(index)), inspected);
                }
                Some(Slot::Occupied(stored, _)) if stored.borrow() == key => {
                    return (Probe::Found(index), inspected);
                }
                Some(Slot::Deleted) if first_tombstone.is_none() => {
                    first_tombstone = Some(index);
                }
                Some(Slot::Occupied(..) | Slot::Deleted) => {}
            }

            // both terms are below `capacity`, so the sum cannot overflow
            index = (index + offset) % capacity;
            offset = (offset + 2) % capacity;
        }

        (first_tombstone.map_or(Probe::Full, Probe::Vacant), capacity)
    }

    /// Locates the slot for a key
    fn find_slot<Q>(&self, key: &Q) -> Probe
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).0
    }

    /// Returns the number of slots inspected to find `key`, or to prove it
    /// absent.
    ///
    /// A key sitting on its home slot reports `1`.
    #[must_use]
    pub fn probe_length<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.probe(key).1
    }

    /// Returns true if the table holds `key`
    #[must_use]
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        matches!(self.find_slot(key), Probe::Found(_))
    }

    /// Retrieves the stored key and value for `key`
    #[must_use]
    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        match self.find_slot(key) {
            Probe::Found(index) => self.slots.get(index).and_then(Slot::entry),
            Probe::Vacant(_) | Probe::Full => None,
        }
    }

    /// Retrieves the value for `key`, or `None` if it is absent.
    ///
    /// The reference is valid until the table is next mutated.
    #[must_use]
    pub fn lookup<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get_key_value(key).map(|(_, value)| value)
    }

    /// Alias of [`ProbingTable::lookup`]
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.lookup(key)
    }

    /// Inserts a key-value pair, overwriting the value if the key is present.
    ///
    /// ```rust
    /// use probing::{InsertOutcome, ProbingTable};
    ///
    /// let mut table = ProbingTable::new(7);
    /// assert_eq!(table.insert("apple", 1), InsertOutcome::Inserted);
    /// assert_eq!(table.insert("apple", 2), InsertOutcome::Updated);
    /// assert_eq!(table.lookup("apple"), Some(&2));
    /// assert_eq!(table.len(), 1);
    /// ```
    ///
    /// # Panics
    ///
    /// Panics if the table has to grow and the larger store cannot be sized
    /// or allocated. Use [`ProbingTable::try_insert`] to handle that case.
    pub fn insert(&mut self, key: K, value: V) -> InsertOutcome {
        match self.try_insert(key, value) {
            Ok(outcome) => outcome,
            Err(err) => growth_failed(&err),
        }
    }

    /// Fallible version of [`ProbingTable::insert`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the table had to grow and could not. The
    /// table is left exactly as it was and the entry is dropped.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<InsertOutcome, TableError> {
        loop {
            match self.find_slot(&key) {
                Probe::Found(index) => {
                    if let Some(Slot::Occupied(_, stored)) = self.slots.get_mut(index) {
                        *stored = value;
                    }
                    return Ok(InsertOutcome::Updated);
                }
                // one more entry must still leave at most half the slots occupied
                Probe::Vacant(index) if self.size < self.capacity() / 2 => {
                    self.occupy(index, key, value);
                    return Ok(InsertOutcome::Inserted);
                }
                Probe::Vacant(_) | Probe::Full => self.try_rehash()?,
            }
        }
    }

    /// Writes an entry into an empty or deleted slot
    fn occupy(&mut self, index: usize, key: K, value: V) {
        if let Some(slot) = self.slots.get_mut(index) {
            if matches!(slot, Slot::Deleted) {
                self.tombstones = self.tombstones.saturating_sub(1);
            }
            *slot = Slot::Occupied(key, value);
            self.size = self.size.saturating_add(1);
        }
    }

    /// Removes `key` and returns the stored key and value.
    ///
    /// The slot becomes a tombstone until the next rehash.
    pub fn remove_entry<Q>(&mut self, key: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        let Probe::Found(index) = self.find_slot(key) else {
            return None;
        };

        let slot = self.slots.get_mut(index)?;
        let entry = mem::replace(slot, Slot::Deleted).into_entry();
        self.size = self.size.saturating_sub(1);
        self.tombstones = self.tombstones.saturating_add(1);
        entry
    }

    /// Removes `key`, returning true if it was present.
    ///
    /// Removing an absent key is a no-op.
    pub fn remove<Q>(&mut self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.remove_entry(key).is_some()
    }

    /// Moves every live entry into a fresh store of `next_prime(2 * capacity)`
    /// slots, discarding tombstones.
    ///
    /// # Panics
    ///
    /// Panics if the larger store cannot be sized or allocated.
    pub fn rehash(&mut self) {
        if let Err(err) = self.try_rehash() {
            growth_failed(&err);
        }
    }

    /// Fallible version of [`ProbingTable::rehash`].
    ///
    /// # Errors
    ///
    /// Returns [`TableError`] if the larger store cannot be sized or
    /// allocated. The table is left unchanged.
    pub fn try_rehash(&mut self) -> Result<(), TableError> {
        let requested = self.capacity().saturating_mul(2);
        let capacity = self
            .capacity()
            .checked_mul(2)
            .and_then(checked_next_prime)
            .ok_or(TableError::CapacityOverflow { requested })?;

        let slots = Self::allocate_slots(capacity)?;
        let old_slots = mem::replace(&mut self.slots, slots);

        log::debug!(
            "rehashing {} entries from {} to {} slots, dropping {} tombstones",
            self.size,
            old_slots.len(),
            capacity,
            self.tombstones
        );

        self.size = 0;
        self.tombstones = 0;

        // Every key is distinct and the new store is less than a quarter full,
        // so each entry lands on a fresh slot without growing again
        for (key, value) in old_slots.into_iter().filter_map(Slot::into_entry) {
            self.try_insert(key, value)?;
        }

        Ok(())
    }
}

impl<K, V, S> Default for ProbingTable<K, V, S>
where
    S: Default,
{
    fn default() -> Self {
        Self::with_hasher(DEFAULT_CAPACITY, S::default())
    }
}

impl<K, V, S> Extend<(K, V)> for ProbingTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    fn extend<T: IntoIterator<Item = (K, V)>>(&mut self, iter: T) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V, S> FromIterator<(K, V)> for ProbingTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher + Default,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = Self::default();
        table.extend(iter);
        table
    }
}

impl<K, V, S> fmt::Display for ProbingTable<K, V, S>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in self {
            writeln!(f, "{key} | {value}")?;
        }
        Ok(())
    }
}

impl<'a, K, V, S> IntoIterator for &'a ProbingTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> IntoIterator for ProbingTable<K, V, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter { slots: self.slots.into_iter(), remaining: self.size }
    }
}

/// Iterator over the entries of a [`ProbingTable`] in backing-store order
#[derive(Debug, Clone)]
pub struct Iter<'a, K, V> {
    /// Slots not yet visited
    slots: slice::Iter<'a, Slot<K, V>>,
    /// Occupied slots not yet yielded
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find_map(Slot::entry)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.slots.by_ref().rev().find_map(Slot::entry)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owning iterator over the entries of a [`ProbingTable`]
#[derive(Debug)]
pub struct IntoIter<K, V> {
    /// Slots not yet visited
    slots: vec::IntoIter<Slot<K, V>>,
    /// Occupied slots not yet yielded
    remaining: usize,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let entry = self.slots.find_map(Slot::into_entry)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for IntoIter<K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        let entry = self.slots.by_ref().rev().find_map(Slot::into_entry)?;
        self.remaining = self.remaining.saturating_sub(1);
        Some(entry)
    }
}

impl<K, V> ExactSizeIterator for IntoIter<K, V> {}

impl<K, V> FusedIterator for IntoIter<K, V> {}

#[cfg(test)]
mod tests {
    use super::*;
    use test_log::test;

    /// Asserts the load-factor invariant on a table
    fn assert_half_full<K, V, S>(table: &ProbingTable<K, V, S>) {
        assert!(
            table.len() <= table.capacity() / 2,
            "{} entries in {} slots",
            table.len(),
            table.capacity()
        );
    }

    #[test]
    fn test_new_rounds_capacity_to_prime() {
        assert_eq!(ProbingTable::<u32, u32>::new(7).capacity(), 7);
        assert_eq!(ProbingTable::<u32, u32>::new(50).capacity(), 53);
        assert_eq!(ProbingTable::<u32, u32>::new(0).capacity(), 2);
        assert_eq!(ProbingTable::<u32, u32>::default().capacity(), 53);
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut table = ProbingTable::new(11);
        assert_eq!(table.insert("key1".to_string(), 1), InsertOutcome::Inserted);
        assert_eq!(table.insert("key2".to_string(), 2), InsertOutcome::Inserted);
        assert_eq!(table.insert("key3".to_string(), 3), InsertOutcome::Inserted);

        assert_eq!(table.lookup("key1"), Some(&1));
        assert_eq!(table.lookup("key2"), Some(&2));
        assert_eq!(table.get("key3"), Some(&3));
        assert_eq!(table.lookup("key4"), None);
        assert!(table.contains("key1"));
        assert!(!table.contains("key4"));
    }

    #[test]
    fn test_update_keeps_len() {
        let mut table = ProbingTable::new(11);
        assert_eq!(table.insert("key1".to_string(), 1), InsertOutcome::Inserted);
        let capacity = table.capacity();

        assert_eq!(table.insert("key1".to_string(), 10), InsertOutcome::Updated);
        assert_eq!(table.lookup("key1"), Some(&10));
        assert_eq!(table.len(), 1);
        assert_eq!(table.capacity(), capacity);
    }

    #[test]
    fn test_remove() {
        let mut table = ProbingTable::new(11);
        table.insert("key1".to_string(), 1);
        table.insert("key2".to_string(), 2);

        assert!(table.remove("key1"));
        assert_eq!(table.len(), 1);
        assert_eq!(table.tombstones(), 1);
        assert_eq!(table.lookup("key1"), None);
        assert_eq!(table.lookup("key2"), Some(&2));
        assert!(!table.remove("key1"));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_remove_absent_key_on_empty_table() {
        let mut table: ProbingTable<String, u32> = ProbingTable::new(5);
        assert!(!table.remove("missing"));
        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
    }

    #[test]
    fn test_remove_entry_returns_pair() {
        let mut table = ProbingTable::new(11);
        table.insert("key1".to_string(), 1);

        assert_eq!(table.remove_entry("key1"), Some(("key1".to_string(), 1)));
        assert_eq!(table.remove_entry("key1"), None);
    }

    #[test]
    fn test_reinsert_after_remove_reuses_tombstone() {
        let mut table = ProbingTable::new(11);
        table.insert(5_u32, "five");
        table.remove(&5);
        assert_eq!(table.slot_states().filter(|&s| s == SlotState::Deleted).count(), 1);

        assert_eq!(table.insert(5, "FIVE"), InsertOutcome::Inserted);
        assert_eq!(table.len(), 1);
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.lookup(&5), Some(&"FIVE"));
    }

    #[test]
    fn test_growth_scenario() {
        let mut table = ProbingTable::new(7);
        assert_eq!(table.capacity(), 7);

        for key in 0..3_u32 {
            table.insert(key, key * 10);
        }
        assert_eq!(table.capacity(), 7);

        // a fourth entry would put 4 > 7 / 2 entries in the table
        table.insert(3, 30);
        assert_eq!(table.len(), 4);
        assert_eq!(table.capacity(), 17);
        for key in 0..4_u32 {
            assert_eq!(table.lookup(&key), Some(&(key * 10)));
        }
    }

    #[test]
    fn test_rehash_purges_tombstones() {
        let mut table = ProbingTable::new(7);
        table.insert(1_u32, ());
        table.insert(2, ());
        table.remove(&1);
        table.remove(&2);
        assert_eq!(table.tombstones(), 2);

        table.rehash();
        assert_eq!(table.capacity(), 17);
        assert_eq!(table.tombstones(), 0);
        assert!(table.slot_states().all(|state| state == SlotState::Empty));
    }

    #[test]
    fn test_many_inserts_keep_load_factor() {
        let mut table = ProbingTable::new(3);
        for key in 0..1_000_u64 {
            table.insert(key, key.to_string());
            assert_half_full(&table);
            assert!(crate::is_prime(table.capacity()));
        }

        assert_eq!(table.len(), 1_000);
        assert!(table.load_factor() <= 0.5);
        for key in 0..1_000_u64 {
            assert_eq!(table.lookup(&key), Some(&key.to_string()));
        }
    }

    #[test]
    fn test_probe_terminates_when_tombstones_fill_table() {
        let mut table = ProbingTable::new(11);

        // churn through keys so that every free slot ends up deleted
        for round in 0..50_u32 {
            for key in 0..5 {
                table.insert(round * 5 + key, key);
            }
            for key in 0..5 {
                assert!(table.remove(&(round * 5 + key)));
            }
            assert_eq!(table.capacity(), 11);
        }
        assert_eq!(table.len(), 0);
        assert!(table.slot_states().all(|state| state != SlotState::Occupied));

        assert!(!table.contains(&u32::MAX));
        assert_eq!(table.insert(u32::MAX, 1), InsertOutcome::Inserted);
        assert_eq!(table.lookup(&u32::MAX), Some(&1));
    }

    #[test]
    fn test_probe_length() {
        let mut table = ProbingTable::new(101);
        table.insert(42_u32, ());

        assert_eq!(table.probe_length(&42), 1);
        assert!(table.probe_length(&7) >= 1);
        assert!(table.probe_length(&7) <= table.capacity());
    }

    #[test]
    fn test_iter_round_trip() {
        let mut table = ProbingTable::new(5);
        for key in 0..100_u32 {
            table.insert(key, key * 2);
        }
        table.remove(&50);

        let mut entries: Vec<(u32, u32)> = table.iter().map(|(&k, &v)| (k, v)).collect();
        entries.sort_unstable();

        let expected: Vec<(u32, u32)> = (0..100).filter(|&k| k != 50).map(|k| (k, k * 2)).collect();
        assert_eq!(entries, expected);
        assert_eq!(table.iter().len(), 99);
    }

    #[test]
    fn test_iter_is_restartable_and_reversible() {
        let table: ProbingTable<u32, u32> = (0..20).map(|k| (k, k)).collect();

        let forwards: Vec<_> = table.iter().collect();
        let again: Vec<_> = table.iter().collect();
        let mut backwards: Vec<_> = table.iter().rev().collect();
        backwards.reverse();

        assert_eq!(forwards, again);
        assert_eq!(forwards, backwards);
    }

    #[test]
    fn test_into_iter() {
        let mut table = ProbingTable::new(7);
        table.insert("a".to_string(), 1);
        table.insert("b".to_string(), 2);

        let mut entries: Vec<(String, i32)> = table.into_iter().collect();
        entries.sort();
        assert_eq!(entries, vec![("a".to_string(), 1), ("b".to_string(), 2)]);
    }

    #[test]
    fn test_clear() {
        let mut table = ProbingTable::new(7);
        table.insert("key1".to_string(), 1);
        table.insert("key2".to_string(), 2);
        table.remove("key2");
        let capacity = table.capacity();

        table.clear();

        assert!(table.is_empty());
        assert_eq!(table.tombstones(), 0);
        assert_eq!(table.capacity(), capacity);
        assert_eq!(table.lookup("key1"), None);
        assert_eq!(table.iter().count(), 0);
    }

    #[test]
    fn test_display_and_slot_states() {
        let mut table = ProbingTable::new(2);
        table.insert(1_u8, "one");

        assert_eq!(table.to_string(), "1 | one\n");

        let states: String = table.slot_states().map(|state| state.to_string()).collect();
        assert_eq!(states.len(), 2);
        assert_eq!(states.matches('O').count(), 1);
        assert_eq!(states.matches('E').count(), 1);
    }

    #[test]
    fn test_try_with_capacity_overflow() {
        let result = ProbingTable::<u8, u8>::try_with_capacity(usize::MAX);
        assert!(matches!(result, Err(TableError::CapacityOverflow { requested: usize::MAX })));
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_try_with_capacity_allocation_failure() {
        let result = ProbingTable::<u64, u64>::try_with_capacity(1 << 50);
        assert!(matches!(result, Err(TableError::AllocationFailed { .. })));
    }

    #[test]
    #[should_panic(expected = "no prime capacity")]
    fn test_new_panics_on_overflow() {
        let _table = ProbingTable::<u8, u8>::new(usize::MAX);
    }

    #[test]
    fn test_extend() {
        let mut table = ProbingTable::new(3);
        table.extend([("a", 1), ("b", 2), ("a", 3)]);

        assert_eq!(table.len(), 2);
        assert_eq!(table.lookup("a"), Some(&3));
        assert_half_full(&table);
    }
}
