//! Errors raised while growing a [`ProbingTable`](crate::ProbingTable)

use std::collections::TryReserveError;
use thiserror::Error;

/// Failure to allocate or size a new backing store.
///
/// Missing keys are never errors; this type only covers growth.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TableError {
    /// No prime capacity at least as large as the request fits in a `usize`
    #[error("no prime capacity of at least {requested} slots fits in usize")]
    CapacityOverflow {
        /// Minimum number of slots that was asked for
        requested: usize,
    },

    /// The allocator refused the new backing store
    #[error("failed to allocate {requested} slots: {source}")]
    AllocationFailed {
        /// Number of slots requested
        requested: usize,
        /// Error reported by `Vec::try_reserve_exact`
        #[source]
        source: TryReserveError,
    },
}
