//! Error taxonomy shared by every layer.

use std::collections::TryReserveError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MapError {
    /// Lookup or delete of a name that is not bound. Expected and recoverable.
    #[error("name not found")]
    NotFound,

    /// The name cannot be stored: empty, longer than 32 bytes, or containing NUL.
    #[error("invalid name ({len} bytes): {reason}")]
    InvalidKey { len: usize, reason: &'static str },

    /// `from_names` saw the same name twice; `position` is the second occurrence.
    #[error("duplicate name at position {position}")]
    DuplicateName { position: usize },

    /// Allocating a replacement table failed; the map is left unchanged.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// The requested table size does not fit in the address space.
    #[error("table size overflow for {requested} entries")]
    CapacityOverflow { requested: usize },

    /// A structural invariant does not hold (reported by `check_invariants`).
    #[error("index corrupted: {0}")]
    Corrupted(String),
}
