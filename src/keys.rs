//! Keys: one table generation, i.e. the dense entry vector plus its index array.
//!
//! A `Keys` value is never resized in place. Growth builds a complete
//! replacement with `rebuild` and the owning map swaps it in, so a failed
//! allocation leaves the previous generation untouched.

use crate::error::MapError;
use crate::indices::{IndexArray, Slot};
use crate::name::Name;

/// Smallest table size; every table size is a power of two at least this.
pub const MIN_SIZE: usize = 8;

/// Right shift applied to the perturbation value at each step of a slot sequence.
const PERTURB_SHIFT: u32 = 5;

/// Largest table size the growth policy will request.
pub(crate) const MAX_SIZE: usize = 1 << (usize::BITS - 2);

/// Number of entries a table of `table_size` slots accepts (load factor 2/3).
#[inline]
pub(crate) const fn usable_fraction(table_size: usize) -> usize {
    (table_size << 1) / 3
}

#[derive(Copy, Clone, Debug)]
pub(crate) struct Entry {
    pub(crate) hash: u64,
    pub(crate) name: Name,
    /// Index of the named record in the caller's vector.
    pub(crate) position: usize,
}

/// Result of a successful lookup.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) struct Found {
    pub(crate) slot: usize,
    pub(crate) entry: usize,
}

#[derive(Clone, Debug)]
pub(crate) struct Keys {
    table_size: usize,
    usable: usize,
    /// Slots that are not EMPTY (bound plus tombstones).
    fill: usize,
    indices: IndexArray,
    entries: Vec<Entry>,
}

/// Slot sequence over a power-of-two table: start at `hash & mask`, then
/// `i = 5*i + perturb + 1` with `perturb` decaying by `PERTURB_SHIFT`.
struct SlotSeq {
    mask: usize,
    i: usize,
    perturb: u64,
}

impl SlotSeq {
    fn new(hash: u64, table_size: usize) -> Self {
        let mask = table_size - 1;
        Self {
            mask,
            i: (hash as usize) & mask,
            perturb: hash,
        }
    }

    #[inline]
    fn current(&self) -> usize {
        self.i
    }

    #[inline]
    fn advance(&mut self) {
        self.perturb >>= PERTURB_SHIFT;
        self.i = self
            .i
            .wrapping_mul(5)
            .wrapping_add(self.perturb as usize)
            .wrapping_add(1)
            & self.mask;
    }
}

impl Keys {
    /// Empty minimum-size generation.
    pub(crate) fn minimum() -> Self {
        let usable = usable_fraction(MIN_SIZE);
        Self {
            table_size: MIN_SIZE,
            usable,
            fill: 0,
            indices: IndexArray::new_small(MIN_SIZE),
            entries: Vec::with_capacity(usable),
        }
    }

    /// Allocate an empty generation with `table_size` slots.
    pub(crate) fn try_with_size(table_size: usize) -> Result<Self, MapError> {
        debug_assert!(table_size.is_power_of_two() && table_size >= MIN_SIZE);
        let usable = usable_fraction(table_size);
        let indices = IndexArray::try_new(table_size, usable)?;
        let mut entries = Vec::new();
        entries.try_reserve_exact(usable)?;
        Ok(Self {
            table_size,
            usable,
            fill: 0,
            indices,
            entries,
        })
    }

    pub(crate) fn table_size(&self) -> usize {
        self.table_size
    }

    pub(crate) fn usable(&self) -> usize {
        self.usable
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn fill(&self) -> usize {
        self.fill
    }

    pub(crate) fn index_width(&self) -> usize {
        self.indices.width()
    }

    pub(crate) fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// True when one more binding can be added without exhausting EMPTY slots.
    pub(crate) fn has_room(&self) -> bool {
        self.fill < self.usable
    }

    pub(crate) fn lookup(&self, hash: u64, name: &[u8]) -> Option<Found> {
        let mut seq = SlotSeq::new(hash, self.table_size);
        loop {
            let i = seq.current();
            match self.indices.get(i) {
                Slot::Empty => return None,
                Slot::Dummy => {}
                Slot::Bound(ix) => {
                    let e = &self.entries[ix];
                    if e.hash == hash && e.name.as_bytes() == name {
                        return Some(Found { slot: i, entry: ix });
                    }
                }
            }
            seq.advance();
        }
    }

    /// First EMPTY or DUMMY slot on `hash`'s slot sequence.
    fn find_free_slot(&self, hash: u64) -> usize {
        let mut seq = SlotSeq::new(hash, self.table_size);
        loop {
            let i = seq.current();
            match self.indices.get(i) {
                Slot::Empty | Slot::Dummy => return i,
                Slot::Bound(_) => seq.advance(),
            }
        }
    }

    pub(crate) fn set_position(&mut self, entry: usize, position: usize) {
        self.entries[entry].position = position;
    }

    /// Append an entry for a name known to be absent and bind a slot to it.
    /// Requires `has_room()`.
    pub(crate) fn insert_new(&mut self, entry: Entry) {
        debug_assert!(self.has_room());
        let slot = self.find_free_slot(entry.hash);
        if self.indices.get(slot) == Slot::Empty {
            self.fill += 1;
        }
        let ix = self.entries.len();
        self.entries.push(entry);
        self.indices.set(slot, Slot::Bound(ix));
    }

    /// Build a fresh generation of `table_size` slots holding the live
    /// entries in their current order. No tombstones carry over.
    pub(crate) fn rebuild(&self, table_size: usize) -> Result<Self, MapError> {
        debug_assert!(usable_fraction(table_size) >= self.entries.len());
        let mut next = Self::try_with_size(table_size)?;
        for e in &self.entries {
            next.insert_new(*e);
        }
        Ok(next)
    }

    /// Point the slot bound to entry `from` at entry `to` instead. The slot
    /// is found by walking `hash`'s slot sequence, so only slots on that
    /// path are visited.
    fn rebind(&mut self, hash: u64, from: usize, to: usize) {
        let mut seq = SlotSeq::new(hash, self.table_size);
        loop {
            let i = seq.current();
            if self.indices.get(i) == Slot::Bound(from) {
                self.indices.set(i, Slot::Bound(to));
                return;
            }
            debug_assert!(self.indices.get(i) != Slot::Empty, "entry {} unreachable", from);
            seq.advance();
        }
    }

    /// Remove the entry found at `found`, compact the entry vector and
    /// decrement every stored position above the removed one. Returns the
    /// removed entry and the number of positions shifted. Cost is O(live
    /// entries), independent of the table size.
    pub(crate) fn remove_shift(&mut self, found: Found) -> (Entry, usize) {
        self.indices.set(found.slot, Slot::Dummy);
        let removed = self.entries.remove(found.entry);
        for ix in found.entry..self.entries.len() {
            self.rebind(self.entries[ix].hash, ix + 1, ix);
        }
        let mut shifted = 0;
        for e in self.entries.iter_mut() {
            if e.position > removed.position {
                e.position -= 1;
                shifted += 1;
            }
        }
        (removed, shifted)
    }

    /// Check the structural invariants of this generation. Hash values are
    /// trusted here; the map verifies them against its hasher.
    pub(crate) fn check(&self) -> Result<(), String> {
        if !self.table_size.is_power_of_two() || self.table_size < MIN_SIZE {
            return Err(format!(
                "table size {} is not a power of two >= {}",
                self.table_size, MIN_SIZE
            ));
        }
        if self.indices.len() != self.table_size {
            return Err(format!(
                "index array has {} slots, table size is {}",
                self.indices.len(),
                self.table_size
            ));
        }
        if !(self.entries.len() <= self.usable && self.usable < self.table_size) {
            return Err(format!(
                "capacity violated: nentries={} usable={} size={}",
                self.entries.len(),
                self.usable,
                self.table_size
            ));
        }
        let mut bound = 0;
        let mut fill = 0;
        for slot in self.indices.slots() {
            match slot {
                Slot::Empty => {}
                Slot::Dummy => fill += 1,
                Slot::Bound(ix) => {
                    if ix >= self.entries.len() {
                        return Err(format!(
                            "slot bound to entry {} out of {}",
                            ix,
                            self.entries.len()
                        ));
                    }
                    bound += 1;
                    fill += 1;
                }
            }
        }
        if bound != self.entries.len() {
            return Err(format!("{} bound slots for {} entries", bound, self.entries.len()));
        }
        if fill != self.fill || fill > self.usable {
            return Err(format!("fill is {}, recorded {}, usable {}", fill, self.fill, self.usable));
        }
        for (ix, e) in self.entries.iter().enumerate() {
            match self.lookup(e.hash, e.name.as_bytes()) {
                Some(found) if found.entry == ix => {}
                Some(found) => {
                    return Err(format!(
                        "entry {} ({}) shadowed by entry {}",
                        ix, e.name, found.entry
                    ))
                }
                None => return Err(format!("entry {} ({}) unreachable from its hash", ix, e.name)),
            }
        }
        Ok(())
    }
}
