//! IndexArray: the open-addressing slot array with a per-table element width.
//!
//! Each slot holds EMPTY, DUMMY, or the position of an entry in the dense
//! entry vector. The element type is the narrowest of u8/u16/u32/u64 able to
//! hold every entry index of the table plus the two sentinels, which are
//! encoded as the two largest values of the chosen width.

use std::collections::TryReserveError;

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub(crate) enum Slot {
    /// Never used; terminates a search.
    Empty,
    /// Tombstone left by a deletion; searches continue past it.
    Dummy,
    /// Index into the entry vector.
    Bound(usize),
}

pub(crate) trait IndexWord: Copy + Eq {
    const EMPTY: Self;
    const DUMMY: Self;
    fn decode(self) -> Slot;
    fn encode(slot: Slot) -> Self;
}

macro_rules! index_word {
    ($($t:ty),*) => {$(
        impl IndexWord for $t {
            const EMPTY: Self = <$t>::MAX;
            const DUMMY: Self = <$t>::MAX - 1;

            #[inline]
            fn decode(self) -> Slot {
                match self {
                    Self::EMPTY => Slot::Empty,
                    Self::DUMMY => Slot::Dummy,
                    ix => Slot::Bound(ix as usize),
                }
            }

            #[inline]
            fn encode(slot: Slot) -> Self {
                match slot {
                    Slot::Empty => Self::EMPTY,
                    Slot::Dummy => Self::DUMMY,
                    Slot::Bound(ix) => {
                        debug_assert!((ix as u64) < Self::DUMMY as u64);
                        ix as $t
                    }
                }
            }
        }
    )*};
}

index_word!(u8, u16, u32, u64);

/// Largest entry count addressable by a word type, leaving room for both sentinels.
const fn max_entries(word_max: u64) -> u64 {
    word_max - 1
}

#[derive(Clone, Debug)]
pub(crate) enum IndexArray {
    U8(Box<[u8]>),
    U16(Box<[u16]>),
    U32(Box<[u32]>),
    U64(Box<[u64]>),
}

fn try_filled<W: IndexWord>(len: usize) -> Result<Box<[W]>, TryReserveError> {
    let mut v = Vec::new();
    v.try_reserve_exact(len)?;
    v.resize(len, W::EMPTY);
    Ok(v.into_boxed_slice())
}

impl IndexArray {
    /// Allocate `table_size` EMPTY slots wide enough for `usable` entries.
    pub(crate) fn try_new(table_size: usize, usable: usize) -> Result<Self, TryReserveError> {
        let usable = usable as u64;
        Ok(if usable <= max_entries(u8::MAX as u64) {
            IndexArray::U8(try_filled(table_size)?)
        } else if usable <= max_entries(u16::MAX as u64) {
            IndexArray::U16(try_filled(table_size)?)
        } else if usable <= max_entries(u32::MAX as u64) {
            IndexArray::U32(try_filled(table_size)?)
        } else {
            IndexArray::U64(try_filled(table_size)?)
        })
    }

    /// Infallible constructor for tables whose slots fit in one byte.
    pub(crate) fn new_small(table_size: usize) -> Self {
        debug_assert!(table_size <= 256);
        IndexArray::U8(vec![<u8 as IndexWord>::EMPTY; table_size].into_boxed_slice())
    }

    pub(crate) fn len(&self) -> usize {
        match self {
            IndexArray::U8(a) => a.len(),
            IndexArray::U16(a) => a.len(),
            IndexArray::U32(a) => a.len(),
            IndexArray::U64(a) => a.len(),
        }
    }

    /// Element width in bytes.
    pub(crate) fn width(&self) -> usize {
        match self {
            IndexArray::U8(_) => 1,
            IndexArray::U16(_) => 2,
            IndexArray::U32(_) => 4,
            IndexArray::U64(_) => 8,
        }
    }

    #[inline]
    pub(crate) fn get(&self, i: usize) -> Slot {
        match self {
            IndexArray::U8(a) => a[i].decode(),
            IndexArray::U16(a) => a[i].decode(),
            IndexArray::U32(a) => a[i].decode(),
            IndexArray::U64(a) => a[i].decode(),
        }
    }

    #[inline]
    pub(crate) fn set(&mut self, i: usize, slot: Slot) {
        match self {
            IndexArray::U8(a) => a[i] = IndexWord::encode(slot),
            IndexArray::U16(a) => a[i] = IndexWord::encode(slot),
            IndexArray::U32(a) => a[i] = IndexWord::encode(slot),
            IndexArray::U64(a) => a[i] = IndexWord::encode(slot),
        }
    }

    pub(crate) fn slots(&self) -> impl Iterator<Item = Slot> + '_ {
        (0..self.len()).map(move |i| self.get(i))
    }
}
