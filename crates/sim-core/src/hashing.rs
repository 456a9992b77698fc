use std::hash::Hasher;

/// A deterministic FNV-1a 64-bit hasher.
///
/// `DefaultHasher` is randomized per process, so anything that must reproduce
/// across runs (regional sales splits, filler names) hashes through this.
#[derive(Debug)]
pub struct FnvHasher {
    state: u64,
}

impl FnvHasher {
    const OFFSET_BASIS: u64 = 0xcbf29ce484222325;
    const PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self {
            state: Self::OFFSET_BASIS,
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
        self.state
    }

    fn write(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.state ^= byte as u64;
            self.state = self.state.wrapping_mul(Self::PRIME);
        }
    }
}

/// Hash an ordered pair of string ids. A 0xff separator keeps ("ab","c")
/// and ("a","bc") apart.
pub fn hash_pair(a: &str, b: &str) -> u64 {
    let mut h = FnvHasher::new();
    h.write(a.as_bytes());
    h.write(&[0xff]);
    h.write(b.as_bytes());
    h.finish()
}

/// Map a hash to a unit float in [0, 1).
pub fn unit_from_hash(hash: u64) -> f64 {
    (hash >> 11) as f64 / (1u64 << 53) as f64
}
