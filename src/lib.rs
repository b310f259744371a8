//! # Probing Table
//!
//! An open-addressing hash table that resolves collisions with quadratic
//! probing.
//!
//! - Capacities are always prime, so the probe sequence `hash + i²` reaches
//!   half of the slots before it can repeat.
//! - The table never holds more entries than half its slots. An insertion
//!   that would cross that line first rehashes into `next_prime(2 *
//!   capacity)` slots.
//! - Removal leaves a tombstone so other keys stay reachable. Tombstones are
//!   reused by later insertions and dropped on the next rehash.
//! - Looking up a missing key is an ordinary `None`, never a panic.
//!
//! ## Basic Usage
//!
//! ```rust
//! use probing::{InsertOutcome, ProbingTable};
//!
//! // Create a table with at least 7 slots
//! let mut table = ProbingTable::new(7);
//!
//! // Insert values
//! assert_eq!(table.insert("apple".to_string(), 1), InsertOutcome::Inserted);
//! table.insert("banana".to_string(), 2);
//!
//! // Retrieve values
//! assert_eq!(table.lookup("apple"), Some(&1));
//!
//! // Update values
//! assert_eq!(table.insert("apple".to_string(), 10), InsertOutcome::Updated);
//! assert_eq!(table.lookup("apple"), Some(&10));
//!
//! // Remove values
//! assert!(table.remove("apple"));
//! assert_eq!(table.lookup("apple"), None);
//! assert!(!table.remove("apple"));
//! ```
//!
//! ## Growth
//!
//! ```rust
//! use probing::ProbingTable;
//!
//! let mut table = ProbingTable::new(7);
//! for key in 0..4 {
//!     table.insert(key, key * key);
//! }
//!
//! // 4 entries do not fit in half of 7 slots
//! assert_eq!(table.capacity(), 17);
//! assert!((0..4).all(|key| table.contains(&key)));
//! ```

/// Errors raised while growing a table
mod error;
/// Prime capacity policy
mod primes;
/// Module implementing the quadratic-probing hash table
mod probing_table;
/// Utility functions and traits for the table
mod utils;

pub use error::TableError;
pub use primes::{checked_next_prime, is_prime, next_prime};
pub use probing_table::{
    DEFAULT_CAPACITY, DefaultHashBuilder, InsertOutcome, IntoIter, Iter, ProbingTable, SlotState,
};
pub use utils::{TableExtensions, from_iter};
