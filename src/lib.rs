//! # zfast-trie
//!
//! An ordered map over bit-string keys, indexed by a dynamic z-fast trie.
//!
//! Based on "Dynamic Z-Fast Tries" (SPIRE 2010, Belazzougui, Boldi, Vigna).
//! Keys are binarized into prefix-free bit strings; a hash table of node
//! handles lets membership, predecessor and successor queries locate the
//! key's exit node with a fat binary search over its length instead of a
//! bit-by-bit descent.
//!
//! ## Example
//!
//! ```rust
//! use zfast_trie::ZFastTrie;
//!
//! let mut trie: ZFastTrie<String, u64> = ZFastTrie::new();
//! trie.add("hello".to_string(), 1);
//! trie.add("world".to_string(), 2);
//!
//! assert_eq!(trie.try_get("hello"), Some(&1));
//! assert_eq!(trie.successor_or_default("hm").map(String::as_str), Some("world"));
//! assert_eq!(trie.predecessor_or_default("hm").map(String::as_str), Some("hello"));
//! trie.verify().unwrap();
//! ```

#![deny(unsafe_op_in_unsafe_fn)]

mod binarize;
mod bits;
mod dump;
mod error;
mod list;
mod node;
mod table;
mod trie;
mod verify;
mod view;

pub use binarize::{prefix_free_bytes, Binarize, Binarizer, KeyBinarizer};
pub use bits::BitVector;
pub use dump::Dump;
pub use error::{Error, Result, Violation};
pub use list::Iter;
pub use node::NodeId;
pub use trie::{Config, ZFastTrie};
pub use view::{LeafRef, NodeRef};

#[cfg(test)]
mod proptests;
