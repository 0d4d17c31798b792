//! name-index-map: a compact, single-threaded index from fixed-length names
//! to positions in a caller-owned vector, kept in sync across removals from
//! the middle of that vector.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: O(1) average name → position lookup over an ordered vector of
//!   records, without rebuilding the index when a record is removed.
//! - Layers:
//!   - `IndexArray`: open-addressing slot array. Each slot is EMPTY, DUMMY
//!     (tombstone) or an index into the entry vector. Slot width (1, 2, 4
//!     or 8 bytes) is picked per table from its usable entry count.
//!   - `Keys`: one table generation. Dense, insertion-ordered entry vector
//!     of `(hash, name, position)` plus its `IndexArray`, searched along a
//!     perturbation sequence.
//!   - `NameMap<S>`: public API. Owns one `Keys` at a time and replaces it
//!     wholesale on growth, tombstone purge, or clear.
//!
//! Constraints
//! - Names are 1..=32 bytes with no NUL; they are stored inline in a
//!   nul-terminated 33-byte buffer.
//! - Table sizes are powers of two ≥ 8; at most 2/3 of the slots are ever
//!   non-EMPTY, so every slot sequence reaches an EMPTY slot.
//! - Single-threaded, no interior mutability: mutation takes `&mut self`.
//! - The map holds no reference to the external vector.
//!
//! Position shifting
//! - `delete_shift(name)` mirrors `Vec::remove` on the caller's vector: it
//!   removes the binding, compacts the entry vector (rebinding the slot of
//!   each later entry by walking its slot sequence) and decrements every
//!   stored position greater than the removed one. Both passes are O(n) in
//!   live entries, not in table size.
//! - Callers perform the matching removal in their vector themselves.
//!
//! Growth and tombstones
//! - A new name is added only while fewer than `usable` slots are
//!   non-EMPTY. Otherwise the table is rebuilt first: at a larger size when
//!   live entries reach `usable` (×4 demand for small tables, ×2 past
//!   50 000 entries). When tombstones are the cause the new size is still
//!   sized from that demand, but never below the current size, so a
//!   nearly-full table grows instead of being purged over and over.
//! - Rebuilds allocate the complete replacement before swapping it in; an
//!   allocation failure returns `MapError::Allocation` and leaves the map
//!   as it was.
//!
//! Hashing
//! - Each entry stores its `u64` hash; rebuilds reuse it. The default
//!   hasher is 64-bit FNV-1a over the name bytes. A hash that reads as one
//!   of the signed sentinel codes -1, -2 or -3 is remapped to a fixed
//!   non-sentinel value.
//!
//! Notes and non-goals
//! - No persistence; the index is a purely in-memory side structure.
//! - No shrinking; only `clear` returns to the minimum size.
//! - No internal synchronization; share across threads behind a lock.

mod error;
mod indices;
mod keys;
mod name;
pub mod name_map;
mod name_map_proptest;

// Public surface
pub use error::MapError;
pub use keys::MIN_SIZE;
pub use name::{FnvHasher, Name, NameBuildHasher, NAME_LEN};
pub use name_map::NameMap;
