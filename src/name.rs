//! Name: fixed-length (32 byte + terminator) key type and the default name hash.

use crate::error::MapError;
use core::fmt;
use core::hash::{BuildHasher, Hasher};

/// Maximum number of bytes in a name, excluding the terminator.
pub const NAME_LEN: usize = 32;

/// Signed sentinel codes that a stored hash must never take.
const HASH_SENTINELS: [i64; 3] = [-1, -2, -3];

/// Replacement for hash values that collide with a sentinel code.
pub(crate) const HASH_SENTINEL_REMAP: u64 = 0x5f5f_5f5f_5f5f_5f5f;

/// A validated name stored inline in a nul-terminated 33-byte buffer.
///
/// Names are 1..=32 bytes and contain no NUL byte, so the first NUL in the
/// buffer always marks the end of the name.
#[derive(Copy, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    buf: [u8; NAME_LEN + 1],
    len: u8,
}

impl Name {
    pub fn new(s: &str) -> Result<Self, MapError> {
        Self::from_bytes(s.as_bytes())
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, MapError> {
        let len = bytes.len();
        if len == 0 {
            return Err(MapError::InvalidKey { len, reason: "empty" });
        }
        if len > NAME_LEN {
            return Err(MapError::InvalidKey {
                len,
                reason: "longer than 32 bytes",
            });
        }
        if bytes.contains(&0) {
            return Err(MapError::InvalidKey {
                len,
                reason: "contains a NUL byte",
            });
        }
        let mut buf = [0u8; NAME_LEN + 1];
        buf[..len].copy_from_slice(bytes);
        Ok(Self {
            buf,
            len: len as u8,
        })
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buf[..self.len as usize]
    }

    /// The name as UTF-8, if it is valid UTF-8.
    pub fn as_str(&self) -> Option<&str> {
        core::str::from_utf8(self.as_bytes()).ok()
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    /// Always false for a validated name.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The full nul-terminated buffer.
    pub fn as_nul_terminated(&self) -> &[u8; NAME_LEN + 1] {
        &self.buf
    }
}

impl AsRef<[u8]> for Name {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl TryFrom<&str> for Name {
    type Error = MapError;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&[u8]> for Name {
    type Error = MapError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.as_bytes()))
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({:?})", String::from_utf8_lossy(self.as_bytes()))
    }
}

/// 64-bit Fowler–Noll–Vo (FNV-1a) hasher, the default for name lookups.
#[derive(Debug, Copy, Clone)]
pub struct FnvHasher {
    hash: u64,
}

impl FnvHasher {
    const FNV_PRIME: u64 = 0x100000001B3;
    const FNV_OFFSET_BASIS: u64 = 0xCBF29CE484222325;

    pub fn new() -> Self {
        Self {
            hash: Self::FNV_OFFSET_BASIS,
        }
    }
}

impl Default for FnvHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher for FnvHasher {
    fn finish(&self) -> u64 {
        self.hash
    }

    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.hash ^= *byte as u64;
            self.hash = self.hash.wrapping_mul(Self::FNV_PRIME);
        }
    }
}

/// Builder for [`FnvHasher`]. Deterministic: equal names hash equally
/// across maps and runs.
#[derive(Debug, Copy, Clone, Default)]
pub struct NameBuildHasher;

impl BuildHasher for NameBuildHasher {
    type Hasher = FnvHasher;

    fn build_hasher(&self) -> Self::Hasher {
        FnvHasher::new()
    }
}

/// Hash raw name bytes (no terminator) with `hasher`, remapping values that
/// read as a sentinel code when interpreted as a signed word.
pub(crate) fn hash_name<S: BuildHasher>(hasher: &S, bytes: &[u8]) -> u64 {
    let mut h = hasher.build_hasher();
    h.write(bytes);
    remap_sentinel(h.finish())
}

#[inline]
pub(crate) fn remap_sentinel(hash: u64) -> u64 {
    if HASH_SENTINELS.contains(&(hash as i64)) {
        HASH_SENTINEL_REMAP
    } else {
        hash
    }
}
