//! NameMap: the public map object. Owns exactly one `Keys` generation and
//! replaces it wholesale on growth, purge, or clear.

use crate::error::MapError;
use crate::keys::{usable_fraction, Entry, Keys, MAX_SIZE, MIN_SIZE};
use crate::name::{hash_name, Name, NameBuildHasher};
use core::fmt;
use core::hash::BuildHasher;

/// Tables holding more live entries than this grow ×2 instead of ×4.
const LARGE_TABLE_USED: usize = 50_000;

/// Maps names to positions in a caller-owned vector.
///
/// The map never holds a reference to that vector. Callers keep the two in
/// step: push a record and `set` its name to the new index; remove the
/// record at `p` and call `delete_shift` with its name, after which every
/// stored position above `p` has moved down by one.
#[derive(Clone)]
pub struct NameMap<S = NameBuildHasher> {
    hasher: S,
    used: usize,
    keys: Keys,
}

impl NameMap {
    /// Empty map with the minimum table size (8 slots).
    pub fn new() -> Self {
        Self::with_hasher(NameBuildHasher)
    }

    /// Map sized so that `min_used` insertions of new names do not grow it.
    pub fn with_capacity(min_used: usize) -> Result<Self, MapError> {
        Self::with_capacity_and_hasher(min_used, NameBuildHasher)
    }

    /// Index an existing vector: bind each name to its position in `names`.
    pub fn from_names<I, N>(names: I) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        Self::from_names_with_hasher(names, NameBuildHasher)
    }
}

impl Default for NameMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over `(name, position)` pairs in insertion order.
pub struct Iter<'a> {
    it: core::slice::Iter<'a, Entry>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = (&'a Name, usize);

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|e| (&e.name, e.position))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a> ExactSizeIterator for Iter<'a> {}

/// Smallest table size whose usable count is at least `min_used`.
fn presized_table_size(min_used: usize) -> Result<usize, MapError> {
    let overflow = || MapError::CapacityOverflow {
        requested: min_used,
    };
    let estimate = min_used
        .checked_mul(3)
        .and_then(|n| n.checked_add(1))
        .ok_or_else(overflow)?
        / 2;
    let size = estimate
        .max(MIN_SIZE)
        .checked_next_power_of_two()
        .ok_or_else(overflow)?;
    if size > MAX_SIZE {
        return Err(overflow());
    }
    debug_assert!(usable_fraction(size) >= min_used);
    Ok(size)
}

/// Table size for the next generation when `used` live entries share a
/// table of `current` slots with tombstones. Demand is `used` ×4 for small
/// tables and ×2 past `LARGE_TABLE_USED`. The result never shrinks, and is
/// strictly larger than `current` when the live entries alone fill it.
fn rebuilt_table_size(used: usize, current: usize, full: bool) -> Result<usize, MapError> {
    let factor = if used > LARGE_TABLE_USED { 2 } else { 4 };
    let overflow = || MapError::CapacityOverflow { requested: used + 1 };
    let target = used.checked_mul(factor).ok_or_else(overflow)?;
    let floor = if full {
        current.checked_mul(2).ok_or_else(overflow)?
    } else {
        current
    };
    let size = target
        .max(floor)
        .checked_next_power_of_two()
        .ok_or_else(overflow)?;
    if size > MAX_SIZE {
        return Err(overflow());
    }
    Ok(size)
}

impl<S> NameMap<S>
where
    S: BuildHasher,
{
    pub fn with_hasher(hasher: S) -> Self {
        Self {
            hasher,
            used: 0,
            keys: Keys::minimum(),
        }
    }

    pub fn with_capacity_and_hasher(min_used: usize, hasher: S) -> Result<Self, MapError> {
        let keys = Keys::try_with_size(presized_table_size(min_used)?)?;
        Ok(Self {
            hasher,
            used: 0,
            keys,
        })
    }

    pub fn from_names_with_hasher<I, N>(names: I, hasher: S) -> Result<Self, MapError>
    where
        I: IntoIterator<Item = N>,
        N: AsRef<[u8]>,
    {
        let names = names.into_iter();
        let mut map = Self::with_capacity_and_hasher(names.size_hint().0, hasher)?;
        for (position, name) in names.enumerate() {
            if map.contains(&name) {
                return Err(MapError::DuplicateName { position });
            }
            map.set(&name, position)?;
        }
        Ok(map)
    }

    #[inline]
    fn hash(&self, name: &[u8]) -> u64 {
        hash_name(&self.hasher, name)
    }

    /// Number of live names.
    pub fn len(&self) -> usize {
        self.used
    }

    pub fn is_empty(&self) -> bool {
        self.used == 0
    }

    /// Number of slots in the index table; always a power of two >= 8.
    pub fn capacity(&self) -> usize {
        self.keys.table_size()
    }

    /// Number of names the current table accepts before it must grow.
    pub fn usable(&self) -> usize {
        self.keys.usable()
    }

    /// Byte width of one index slot for the current table size.
    pub fn index_width(&self) -> usize {
        self.keys.index_width()
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Position bound to `name`, or `None` if it is absent.
    pub fn get<Q>(&self, name: &Q) -> Option<usize>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let name = name.as_ref();
        let found = self.keys.lookup(self.hash(name), name)?;
        Some(self.keys.entries()[found.entry].position)
    }

    pub fn contains<Q>(&self, name: &Q) -> bool
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let name = name.as_ref();
        self.keys.lookup(self.hash(name), name).is_some()
    }

    /// Bind `name` to `position`, overwriting the position of an existing
    /// binding in place. Adding a new name may grow the table first.
    pub fn set<Q>(&mut self, name: &Q, position: usize) -> Result<(), MapError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let name = Name::from_bytes(name.as_ref())?;
        let hash = self.hash(name.as_bytes());
        if let Some(found) = self.keys.lookup(hash, name.as_bytes()) {
            self.keys.set_position(found.entry, position);
            return Ok(());
        }
        if !self.keys.has_room() {
            self.make_room()?;
        }
        self.keys.insert_new(Entry {
            hash,
            name,
            position,
        });
        self.used += 1;
        debug_assert_eq!(self.used, self.keys.len());
        Ok(())
    }

    /// Remove `name` and shift every stored position above the removed one
    /// down by one, mirroring `Vec::remove` on the caller's vector. Returns
    /// the removed position.
    pub fn delete_shift<Q>(&mut self, name: &Q) -> Result<usize, MapError>
    where
        Q: AsRef<[u8]> + ?Sized,
    {
        let name = name.as_ref();
        let found = self
            .keys
            .lookup(self.hash(name), name)
            .ok_or(MapError::NotFound)?;
        let (removed, shifted) = self.keys.remove_shift(found);
        self.used -= 1;
        debug_assert_eq!(self.used, self.keys.len());
        tracing::trace!(
            name = %removed.name,
            position = removed.position,
            shifted,
            "deleted name and shifted positions"
        );
        Ok(removed.position)
    }

    /// Drop every binding and return to a fresh minimum-size table.
    pub fn clear(&mut self) -> Result<(), MapError> {
        let fresh = Keys::try_with_size(MIN_SIZE)?;
        tracing::debug!(
            old_size = self.keys.table_size(),
            dropped = self.used,
            "cleared name map"
        );
        self.keys = fresh;
        self.used = 0;
        Ok(())
    }

    pub fn iter(&self) -> Iter<'_> {
        Iter {
            it: self.keys.entries().iter(),
        }
    }

    /// Replace the current generation so that one more name fits. The new
    /// size follows the live count for both triggers, so a rebuild caused
    /// by tombstones leaves room for O(used) further insertions.
    fn make_room(&mut self) -> Result<(), MapError> {
        let old_size = self.keys.table_size();
        let full = self.keys.len() >= self.keys.usable();
        let new_size = rebuilt_table_size(self.used, old_size, full)?;
        let next = self.keys.rebuild(new_size)?;
        tracing::debug!(
            old_size,
            new_size,
            used = self.used,
            tombstones = self.keys.fill() - self.keys.len(),
            "rebuilt name index"
        );
        self.keys = next;
        Ok(())
    }

    /// Verify the structural invariants: capacity bounds, every bound slot
    /// reachable by a lookup of its own entry's name, stored hashes equal to
    /// this map's hash of the name, and the live count.
    pub fn check_invariants(&self) -> Result<(), MapError> {
        self.keys.check().map_err(MapError::Corrupted)?;
        if self.used != self.keys.len() {
            return Err(MapError::Corrupted(format!(
                "used {} != nentries {}",
                self.used,
                self.keys.len()
            )));
        }
        for e in self.keys.entries() {
            if e.hash != self.hash(e.name.as_bytes()) {
                return Err(MapError::Corrupted(format!("stale hash for {}", e.name)));
            }
        }
        Ok(())
    }
}

impl<'a, S> IntoIterator for &'a NameMap<S>
where
    S: BuildHasher,
{
    type Item = (&'a Name, usize);
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<S> fmt::Debug for NameMap<S>
where
    S: BuildHasher,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}
