//! Bit strings and the 2-fattest-number arithmetic the trie branches on.

use std::cmp::Ordering;
use std::fmt;
use std::hash::Hasher;

use rustc_hash::FxHasher;

const WORD_BITS: usize = u64::BITS as usize;

// =============================================================================
// Bit utilities
// =============================================================================

#[inline]
fn word_index(bit: usize) -> usize {
    bit / WORD_BITS
}

/// Bit index within its word, where `0` is the MSB and `63` is the LSB.
#[inline]
fn bit_in_word_msb0(bit: usize) -> u32 {
    (bit % WORD_BITS) as u32
}

/// Mask keeping the `n` most significant bits of a word (`0 < n <= 64`).
#[inline]
fn high_mask(n: usize) -> u64 {
    debug_assert!(n > 0 && n <= WORD_BITS);
    !0u64 << (WORD_BITS - n)
}

/// The 2-fattest number in the interval `(a, b]`: the one with the most
/// trailing zeros.
///
/// # Panics
///
/// Panics unless `a < b`; the interval would be empty.
#[inline]
pub(crate) fn two_fattest(a: usize, b: usize) -> usize {
    assert!(a < b, "empty interval ({a}, {b}]");
    let msb = usize::BITS - 1 - (a ^ b).leading_zeros();
    b & (!0usize << msb)
}

// =============================================================================
// BitVector
// =============================================================================

/// An immutable-by-convention sequence of bits, stored MSB-first in `u64`
/// words. Bits past `len` are always zero so whole words can be compared.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct BitVector {
    words: Vec<u64>,
    len: usize,
}

impl BitVector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(bits: usize) -> Self {
        Self {
            words: Vec::with_capacity(bits.div_ceil(WORD_BITS)),
            len: 0,
        }
    }

    /// Eight bits per byte, most significant bit first.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let mut v = Self::with_capacity(bytes.len() * 8);
        v.extend_from_bytes(bytes);
        v
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        let shift = bit_in_word_msb0(self.len);
        if shift == 0 {
            self.words.push(0);
        }
        if bit {
            let last = self.words.len() - 1;
            self.words[last] |= 1u64 << (WORD_BITS as u32 - 1 - shift);
        }
        self.len += 1;
    }

    pub fn push_byte(&mut self, byte: u8) {
        let shift = bit_in_word_msb0(self.len);
        if shift == 0 {
            self.words.push(0);
        }
        let last = self.words.len() - 1;
        let spill = shift as i32 + 8 - WORD_BITS as i32;
        if spill <= 0 {
            self.words[last] |= (byte as u64) << (WORD_BITS as u32 - 8 - shift);
        } else {
            // Byte straddles a word boundary.
            self.words[last] |= (byte as u64) >> spill;
            self.words.push((byte as u64) << (WORD_BITS as i32 - spill));
        }
        self.len += 8;
    }

    pub fn extend_from_bytes(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.push_byte(b);
        }
    }

    /// The bit at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index >= self.len()`.
    #[inline]
    pub fn get(&self, index: usize) -> bool {
        assert!(
            index < self.len,
            "bit index {index} out of range for length {}",
            self.len
        );
        let word = self.words[word_index(index)];
        (word >> (WORD_BITS as u32 - 1 - bit_in_word_msb0(index))) & 1 == 1
    }

    /// Copy of the `len` bits starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if the range runs past the end of the vector.
    pub fn sub_vector(&self, start: usize, len: usize) -> BitVector {
        assert!(
            start + len <= self.len,
            "sub-vector {start}..{} out of range for length {}",
            start + len,
            self.len
        );
        let n_words = len.div_ceil(WORD_BITS);
        let mut words = Vec::with_capacity(n_words);
        let shift = bit_in_word_msb0(start);
        let first = word_index(start);
        for j in 0..n_words {
            let hi = self.words[first + j] << shift;
            let lo = if shift == 0 {
                0
            } else {
                self.words
                    .get(first + j + 1)
                    .map_or(0, |w| w >> (WORD_BITS as u32 - shift))
            };
            words.push(hi | lo);
        }
        let rem = len % WORD_BITS;
        if rem != 0 {
            if let Some(last) = words.last_mut() {
                *last &= high_mask(rem);
            }
        }
        BitVector { words, len }
    }

    /// Length of the longest common prefix of `self` and `other`.
    pub fn longest_common_prefix(&self, other: &BitVector) -> usize {
        let limit = self.len.min(other.len);
        for (i, (a, b)) in self.words.iter().zip(&other.words).enumerate() {
            let diff = a ^ b;
            if diff != 0 {
                return (i * WORD_BITS + diff.leading_zeros() as usize).min(limit);
            }
        }
        limit
    }

    /// Whether `self` is a (not necessarily proper) prefix of `other`.
    pub fn is_prefix_of(&self, other: &BitVector) -> bool {
        self.len <= other.len && self.prefix_eq(other, self.len)
    }

    /// Whether the first `n` bits of both vectors exist and are equal.
    pub(crate) fn prefix_eq(&self, other: &BitVector, n: usize) -> bool {
        if n > self.len || n > other.len {
            return false;
        }
        let full = word_index(n);
        if self.words[..full] != other.words[..full] {
            return false;
        }
        let rem = n % WORD_BITS;
        rem == 0 || (self.words[full] ^ other.words[full]) & high_mask(rem) == 0
    }

    /// Hash of the first `n` bits together with `n` itself, so prefixes of
    /// different lengths never share a key by construction.
    pub(crate) fn prefix_hash(&self, n: usize) -> u64 {
        debug_assert!(n <= self.len);
        let mut hasher = FxHasher::default();
        hasher.write_usize(n);
        let full = word_index(n);
        for &w in &self.words[..full] {
            hasher.write_u64(w);
        }
        let rem = n % WORD_BITS;
        if rem != 0 {
            hasher.write_u64(self.words[full] & high_mask(rem));
        }
        hasher.finish()
    }

    pub(crate) fn heap_size(&self) -> usize {
        self.words.capacity() * std::mem::size_of::<u64>()
    }
}

impl Ord for BitVector {
    fn cmp(&self, other: &Self) -> Ordering {
        let lcp = self.longest_common_prefix(other);
        match (lcp == self.len, lcp == other.len) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.get(lcp).cmp(&other.get(lcp)),
        }
    }
}

impl PartialOrd for BitVector {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len {
            f.write_str(if self.get(i) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

impl fmt::Debug for BitVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BitVector({}: {self})", self.len)
    }
}

impl FromIterator<bool> for BitVector {
    fn from_iter<I: IntoIterator<Item = bool>>(iter: I) -> Self {
        let mut v = BitVector::new();
        for bit in iter {
            v.push(bit);
        }
        v
    }
}
