//! Turning application keys into prefix-free bit strings.
//!
//! The trie branches on bits, so every key type needs a mapping into
//! [`BitVector`]. Two properties are required of the mapping:
//!
//! - **Prefix-free**: no key's bits are a proper prefix of another key's bits.
//! - **Order-preserving**: bit-lexicographic order matches the key order the
//!   caller expects from successor/predecessor queries.
//!
//! The trie does not check either property.

use crate::bits::BitVector;

/// Escape byte emitted after an embedded `0x00`.
const ESCAPE: u8 = 0xFF;
/// Terminator `0x00 0x01`; sorts below both an escaped zero and any other byte.
const TERMINATOR: [u8; 2] = [0x00, 0x01];

/// Keys with a canonical prefix-free binarization.
pub trait Binarize {
    fn binarize(&self) -> BitVector;
}

/// Strategy that maps keys of type `Q` to bits.
///
/// Implemented by [`KeyBinarizer`] and by any `Fn(&Q) -> BitVector`.
pub trait Binarizer<Q: ?Sized> {
    fn binarize(&self, key: &Q) -> BitVector;
}

/// The default binarizer: defers to the key's [`Binarize`] impl.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeyBinarizer;

impl<Q: Binarize + ?Sized> Binarizer<Q> for KeyBinarizer {
    #[inline]
    fn binarize(&self, key: &Q) -> BitVector {
        key.binarize()
    }
}

impl<Q: ?Sized, F> Binarizer<Q> for F
where
    F: Fn(&Q) -> BitVector,
{
    #[inline]
    fn binarize(&self, key: &Q) -> BitVector {
        self(key)
    }
}

/// Prefix-free, order-preserving encoding of a byte string.
///
/// Each `0x00` becomes `0x00 0xFF` and the string ends with `0x00 0x01`.
pub fn prefix_free_bytes(bytes: &[u8]) -> BitVector {
    let mut v = BitVector::with_capacity((bytes.len() + TERMINATOR.len()) * 8);
    for &b in bytes {
        v.push_byte(b);
        if b == 0 {
            v.push_byte(ESCAPE);
        }
    }
    v.extend_from_bytes(&TERMINATOR);
    v
}

impl Binarize for [u8] {
    fn binarize(&self) -> BitVector {
        prefix_free_bytes(self)
    }
}

impl Binarize for Vec<u8> {
    fn binarize(&self) -> BitVector {
        prefix_free_bytes(self)
    }
}

impl Binarize for str {
    fn binarize(&self) -> BitVector {
        prefix_free_bytes(self.as_bytes())
    }
}

impl Binarize for String {
    fn binarize(&self) -> BitVector {
        prefix_free_bytes(self.as_bytes())
    }
}

impl<T: Binarize + ?Sized> Binarize for &T {
    fn binarize(&self) -> BitVector {
        (**self).binarize()
    }
}

macro_rules! binarize_unsigned {
    ($($t:ty),*) => {$(
        impl Binarize for $t {
            fn binarize(&self) -> BitVector {
                BitVector::from_bytes(&self.to_be_bytes())
            }
        }
    )*};
}

macro_rules! binarize_signed {
    ($($t:ty => $u:ty),*) => {$(
        impl Binarize for $t {
            fn binarize(&self) -> BitVector {
                // Flipping the sign bit maps two's complement onto unsigned order.
                let flipped = (*self as $u) ^ (1 << (<$u>::BITS - 1));
                BitVector::from_bytes(&flipped.to_be_bytes())
            }
        }
    )*};
}

binarize_unsigned!(u8, u16, u32, u64, u128, usize);
binarize_signed!(i8 => u8, i16 => u16, i32 => u32, i64 => u64, i128 => u128, isize => usize);
