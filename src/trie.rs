//! The z-fast trie engine: insertion, exit-node search and the ordered
//! queries built on top of it.

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;

use crate::binarize::{Binarizer, KeyBinarizer};
use crate::bits::{two_fattest, BitVector};
use crate::error::{Error, Result};
use crate::list::Iter;
use crate::node::{Arena, Internal, NodeId, HEAD, TAIL};
use crate::table::HandleTable;
use crate::view::{LeafRef, NodeRef};

/// Construction-time settings.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Number of keys to reserve room for up front.
    pub initial_capacity: usize,
}

/// An ordered map from keys to values, indexed by a dynamic z-fast trie over
/// the keys' binarized bits.
///
/// Keys are stored once each and never removed. Lookups, membership and
/// predecessor/successor queries localize the key with a fat binary search
/// over the handle index (`O(log |x|)` expected probes for an `|x|`-bit key),
/// then read the exact answer off the ordered leaf list.
///
/// The trie is not internally synchronized; callers that share it across
/// threads serialize access themselves.
pub struct ZFastTrie<K, V, B = KeyBinarizer> {
    pub(crate) arena: Arena<K, V>,
    pub(crate) table: HandleTable,
    pub(crate) root: NodeId,
    pub(crate) count: usize,
    binarizer: B,
}

/// Where a query leaves the trie.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Exit {
    node: NodeId,
    /// Bits shared by the query and the exit node's extent.
    lcp: usize,
    /// The query compared with every leaf below `node`.
    order: Ordering,
}

impl<K, V> ZFastTrie<K, V> {
    /// Empty trie using the keys' own [`Binarize`](crate::Binarize) impl.
    pub fn new() -> Self {
        Self::with_binarizer(KeyBinarizer)
    }
}

impl<K, V, B> ZFastTrie<K, V, B> {
    pub fn with_binarizer(binarizer: B) -> Self {
        Self::with_config(binarizer, Config::default())
    }

    pub fn with_config(binarizer: B, config: Config) -> Self {
        Self {
            arena: Arena::with_capacity(config.initial_capacity),
            table: HandleTable::with_capacity(config.initial_capacity.saturating_sub(1)),
            root: NodeId::NULL,
            count: 0,
            binarizer,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn binarizer(&self) -> &B {
        &self.binarizer
    }

    pub fn memory_usage(&self) -> usize {
        self.arena.memory_usage() + self.table.memory_usage()
    }

    pub fn shrink_to_fit(&mut self) {
        self.arena.shrink_to_fit();
        self.table.shrink_to_fit();
    }

    /// The sentinel before the smallest key.
    pub fn head(&self) -> LeafRef<'_, K, V> {
        LeafRef::new(&self.arena, HEAD)
    }

    /// The sentinel after the largest key.
    pub fn tail(&self) -> LeafRef<'_, K, V> {
        LeafRef::new(&self.arena, TAIL)
    }

    /// `None` when empty, the only leaf for a single key, otherwise an
    /// internal node with name length 0.
    pub fn root(&self) -> Option<NodeRef<'_, K, V>> {
        (!self.root.is_null()).then(|| NodeRef::new(&self.arena, self.root))
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.arena)
    }

    pub fn keys(&self) -> impl DoubleEndedIterator<Item = &K> + ExactSizeIterator + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl DoubleEndedIterator<Item = &V> + ExactSizeIterator + '_ {
        self.iter().map(|(_, v)| v)
    }

    /// Smallest key.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the trie holds no keys.
    pub fn first_key(&self) -> Result<&K> {
        self.first_key_or_default().ok_or(Error::Empty)
    }

    /// Largest key.
    ///
    /// # Errors
    ///
    /// [`Error::Empty`] when the trie holds no keys.
    pub fn last_key(&self) -> Result<&K> {
        self.last_key_or_default().ok_or(Error::Empty)
    }

    pub fn first_key_or_default(&self) -> Option<&K> {
        self.arena.leaf(self.arena.first()).key()
    }

    pub fn last_key_or_default(&self) -> Option<&K> {
        self.arena.leaf(self.arena.last()).key()
    }

    // =========================================================================
    // Search
    // =========================================================================

    #[inline]
    pub(crate) fn handle_hash(&self, id: NodeId) -> u64 {
        let node = self.arena.internal(id);
        self.arena
            .extent_bits(id)
            .prefix_hash(node.handle_length())
    }

    /// Internal node whose handle is exactly `x[0..handle_length)`.
    fn lookup(&self, x: &BitVector, handle_length: usize) -> Option<NodeId> {
        self.table
            .bucket(x.prefix_hash(handle_length))
            .iter()
            .copied()
            .find(|&id| {
                let node = self.arena.internal(id);
                node.handle_length() == handle_length
                    && self.arena.leaf(node.reference).bits.prefix_eq(x, handle_length)
            })
    }

    /// The deepest node whose name is a prefix of `x`.
    ///
    /// Fat binary search for the extent length of the exit node's parent over
    /// `[a, b]`: a probe at the 2-fattest length in `(a, b]` either hits an
    /// ancestor (raise `a` to its extent), hits the exit node itself, or
    /// misses (the parent's extent is shorter than the probe).
    fn exit_node(&self, x: &BitVector) -> NodeId {
        debug_assert!(!self.root.is_null());
        if self.root.is_leaf() {
            return self.root;
        }

        let root = self.arena.internal(self.root);
        if root.extent_length >= x.len()
            || !self
                .arena
                .extent_bits(self.root)
                .prefix_eq(x, root.extent_length)
        {
            return self.root;
        }

        let mut top = self.root;
        let mut a = root.extent_length;
        let mut b = x.len() - 1;
        while a < b {
            let f = two_fattest(a, b);
            match self.lookup(x, f) {
                Some(id) => {
                    let node = self.arena.internal(id);
                    if node.extent_length < x.len()
                        && self.arena.extent_bits(id).prefix_eq(x, node.extent_length)
                    {
                        a = node.extent_length;
                        top = id;
                    } else {
                        return id;
                    }
                }
                None => b = f - 1,
            }
        }

        self.arena.internal(top).child(x.get(a))
    }

    fn locate(&self, x: &BitVector) -> Option<Exit> {
        if self.root.is_null() {
            return None;
        }

        let node = self.exit_node(x);
        let extent_length = self.arena.extent_length(node);
        let lcp = x
            .longest_common_prefix(self.arena.extent_bits(node))
            .min(extent_length);

        let order = if lcp < x.len() && lcp < extent_length {
            if x.get(lcp) {
                Ordering::Greater
            } else {
                Ordering::Less
            }
        } else if lcp == x.len() && lcp == extent_length && node.is_leaf() {
            Ordering::Equal
        } else if lcp == x.len() {
            // `x` is a prefix of every key below `node`.
            Ordering::Less
        } else {
            Ordering::Greater
        };

        Some(Exit { node, lcp, order })
    }

    /// Leaf holding the smallest key `>= x`, or TAIL.
    fn successor_id(&self, x: &BitVector) -> NodeId {
        match self.locate(x) {
            None => TAIL,
            Some(exit) => match exit.order {
                Ordering::Equal => exit.node,
                Ordering::Less => self.arena.leftmost(exit.node),
                Ordering::Greater => self.arena.leaf(self.arena.rightmost(exit.node)).next,
            },
        }
    }

    /// Leaf holding the largest key `< x`, or HEAD.
    fn predecessor_id(&self, x: &BitVector) -> NodeId {
        match self.locate(x) {
            None => HEAD,
            Some(exit) => match exit.order {
                Ordering::Equal => self.arena.leaf(exit.node).previous,
                Ordering::Less => self.arena.leaf(self.arena.leftmost(exit.node)).previous,
                Ordering::Greater => self.arena.rightmost(exit.node),
            },
        }
    }

    // =========================================================================
    // Insertion
    // =========================================================================

    /// Recompute both jump pointers of `id` from its children's.
    fn rethread(&mut self, id: NodeId) {
        let node = *self.arena.internal(id);
        let jump_length = node.jump_length();
        let jump_left = self.arena.jump_target(node.left, false, jump_length);
        let jump_right = self.arena.jump_target(node.right, true, jump_length);
        let node = self.arena.internal_mut(id);
        node.jump_left = jump_left;
        node.jump_right = jump_right;
    }

    /// Fix the jump pointers of the ancestors whose spine now runs through the
    /// freshly split `id`. Only the same-direction run of edges directly above
    /// `id` can see it.
    fn rethread_ancestors(&mut self, id: NodeId, new_leaf: NodeId) {
        let split = *self.arena.internal(id);
        let leaf_side = split.right == new_leaf;
        let mut child = id;
        let mut ancestor = split.parent;
        let mut run_side = None;

        while ancestor.is_internal() {
            let node = *self.arena.internal(ancestor);
            let right = node.right == child;
            if *run_side.get_or_insert(right) != right {
                break;
            }

            // Targets above the split are untouched; targets at or below the
            // old subtree move up to the split or down to the new leaf.
            let target = node.jump(right);
            if self.arena.extent_length(target) > split.extent_length {
                if split.extent_length >= node.jump_length() {
                    self.arena.internal_mut(ancestor).set_jump(right, id);
                } else if leaf_side == right {
                    self.arena.internal_mut(ancestor).set_jump(right, new_leaf);
                }
            }

            child = ancestor;
            ancestor = node.parent;
        }
    }

    /// Insert `key` → `value`. Returns `false`, leaving the trie untouched, if
    /// the key is already present.
    ///
    /// # Panics
    ///
    /// Panics if the binarizer is not prefix-free, i.e. the new key's bits and
    /// a stored key's bits are prefixes of one another without being equal.
    pub fn add(&mut self, key: K, value: V) -> bool
    where
        B: Binarizer<K>,
    {
        let bits = self.binarizer.binarize(&key);

        let Some(exit) = self.locate(&bits) else {
            let leaf = self.arena.push_leaf(key, value, bits);
            self.arena.link_after(HEAD, leaf);
            self.root = leaf;
            self.count = 1;
            tracing::trace!(%leaf, "planted root leaf");
            return true;
        };

        if exit.order == Ordering::Equal {
            return false;
        }

        let exit_extent = self.arena.extent_length(exit.node);
        assert!(
            exit.lcp < bits.len() && exit.lcp < exit_extent,
            "binarizer is not prefix-free: a {}-bit key and the {exit_extent}-bit extent of {} agree on their first {} bits",
            bits.len(),
            exit.node,
            exit.lcp,
        );

        let goes_right = exit.order == Ordering::Greater;
        let neighbour = if goes_right {
            self.arena.rightmost(exit.node)
        } else {
            self.arena.leftmost(exit.node)
        };

        let parent = self.arena.parent(exit.node);
        let name_length = if parent.is_null() {
            0
        } else {
            self.arena.internal(parent).extent_length + 1
        };

        // The exit node's name grows, so its handle moves.
        if exit.node.is_internal() {
            let hash = self.handle_hash(exit.node);
            let filed = self.table.remove(hash, exit.node);
            debug_assert!(filed, "{} missing from handle table", exit.node);
        }

        let leaf = self.arena.push_leaf(key, value, bits);
        let (left, right) = if goes_right {
            (exit.node, leaf)
        } else {
            (leaf, exit.node)
        };
        let split = self.arena.push_internal(Internal {
            left,
            right,
            parent,
            jump_left: NodeId::NULL,
            jump_right: NodeId::NULL,
            reference: leaf,
            extent_length: exit.lcp,
            name_length,
        });

        let new_leaf = self.arena.leaf_mut(leaf);
        new_leaf.parent = split;
        new_leaf.reference = split;
        self.arena.set_parent(exit.node, split);

        if parent.is_null() {
            self.root = split;
        } else {
            let p = self.arena.internal_mut(parent);
            let on_right = p.right == exit.node;
            p.set_child(on_right, split);
        }

        if exit.node.is_internal() {
            self.arena.internal_mut(exit.node).name_length = exit.lcp + 1;
            let hash = self.handle_hash(exit.node);
            self.table.insert(hash, exit.node);
            self.rethread(exit.node);
        }

        let hash = self.handle_hash(split);
        self.table.insert(hash, split);
        self.rethread(split);
        self.rethread_ancestors(split, leaf);

        if goes_right {
            self.arena.link_after(neighbour, leaf);
        } else {
            self.arena.link_before(neighbour, leaf);
        }

        self.count += 1;
        tracing::trace!(
            %split,
            %leaf,
            extent_length = exit.lcp,
            name_length,
            count = self.count,
            "split exit node {}",
            exit.node
        );
        true
    }

    // =========================================================================
    // Queries
    // =========================================================================

    fn exact<Q>(&self, key: &Q) -> Option<&(K, V)>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        B: Binarizer<Q>,
    {
        let bits = self.binarizer.binarize(key);
        let exit = self.locate(&bits)?;
        if exit.order != Ordering::Equal {
            return None;
        }
        self.arena
            .leaf(exit.node)
            .entry
            .as_ref()
            .filter(|(k, _)| <K as Borrow<Q>>::borrow(k) == key)
    }

    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        B: Binarizer<Q>,
    {
        self.exact(key).is_some()
    }

    /// Value stored under `key`.
    pub fn try_get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Eq + ?Sized,
        B: Binarizer<Q>,
    {
        self.exact(key).map(|(_, v)| v)
    }

    /// Smallest stored key `>= key`.
    pub fn successor_or_default<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        B: Binarizer<Q>,
    {
        self.successor_internal(key).key()
    }

    /// Largest stored key strictly `< key`.
    pub fn predecessor_or_default<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        B: Binarizer<Q>,
    {
        self.predecessor_internal(key).key()
    }

    /// Leaf holding the successor of `key`; the TAIL sentinel if there is none.
    pub fn successor_internal<Q>(&self, key: &Q) -> LeafRef<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        B: Binarizer<Q>,
    {
        let bits = self.binarizer.binarize(key);
        LeafRef::new(&self.arena, self.successor_id(&bits))
    }

    /// Leaf holding the predecessor of `key`; the HEAD sentinel if there is none.
    pub fn predecessor_internal<Q>(&self, key: &Q) -> LeafRef<'_, K, V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        B: Binarizer<Q>,
    {
        let bits = self.binarizer.binarize(key);
        LeafRef::new(&self.arena, self.predecessor_id(&bits))
    }
}

impl<K, V> Default for ZFastTrie<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Clone, V: Clone, B: Clone> Clone for ZFastTrie<K, V, B> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena.clone(),
            table: self.table.clone(),
            root: self.root,
            count: self.count,
            binarizer: self.binarizer.clone(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, B> fmt::Debug for ZFastTrie<K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<'a, K, V, B> IntoIterator for &'a ZFastTrie<K, V, B> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, B: Binarizer<K>> Extend<(K, V)> for ZFastTrie<K, V, B> {
    /// Keys already present keep their first value.
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.add(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for ZFastTrie<K, V>
where
    KeyBinarizer: Binarizer<K>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut trie = Self::new();
        trie.extend(iter);
        trie
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binarize::{prefix_free_bytes, Binarize};

    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::BTreeMap;

    const CHARS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

    fn random_string(rng: &mut StdRng, size: usize) -> String {
        (0..size)
            .map(|_| CHARS[rng.gen_range(0..CHARS.len())] as char)
            .collect()
    }

    #[test]
    fn test_construction() {
        let t: ZFastTrie<String, String> = ZFastTrie::new();
        assert_eq!(t.len(), 0);
        assert!(t.is_empty());
        assert_eq!(t.first_key_or_default(), None);
        assert_eq!(t.last_key_or_default(), None);
        assert_eq!(t.first_key(), Err(Error::Empty));
        assert_eq!(t.last_key(), Err(Error::Empty));
        assert!(t.root().is_none());
        assert_eq!(t.successor_or_default("a"), None);
        assert_eq!(t.predecessor_or_default("a"), None);
        assert!(t.successor_internal("a").is_tail());
        assert!(t.predecessor_internal("a").is_head());
        assert!(!t.contains("a"));
        t.verify().unwrap();
    }

    #[test]
    fn test_operations_single_element() {
        let key = "oren";
        let mut t: ZFastTrie<String, String> = ZFastTrie::new();
        assert!(t.add(key.to_string(), "eini".to_string()));
        assert_eq!(t.first_key().map(String::as_str), Ok(key));
        assert_eq!(t.last_key().map(String::as_str), Ok(key));
        assert!(t.contains(key));
        assert_eq!(t.try_get(key).map(String::as_str), Some("eini"));

        // Successor is the smallest key >= x.
        assert_eq!(t.successor_or_default(key).map(String::as_str), Some(key));
        assert_eq!(t.successor_or_default("qu"), None);

        // Predecessor is the largest key strictly < x.
        assert_eq!(t.predecessor_or_default(key), None);
        assert_eq!(t.predecessor_or_default("aq"), None);
        assert_eq!(t.predecessor_or_default("pq").map(String::as_str), Some(key));

        t.verify().unwrap();
    }

    #[test]
    fn test_structure_single_element() {
        let key = "oren";
        let mut t: ZFastTrie<String, String> = ZFastTrie::new();
        assert!(t.add(key.to_string(), "eini".to_string()));

        let successor = t.successor_internal(key);
        assert!(successor.is_leaf());
        assert!(successor.next().unwrap().key().is_none());
        assert!(successor.previous().unwrap().key().is_none());
        assert_eq!(successor.previous(), Some(t.head()));
        assert_eq!(successor.next(), Some(t.tail()));
        assert_eq!(successor.key().map(String::as_str), Some(key));

        let predecessor = t.predecessor_internal("yy");
        assert!(predecessor.is_leaf());
        assert_eq!(predecessor.previous(), Some(t.head()));
        assert_eq!(predecessor.next(), Some(t.tail()));
        assert_eq!(predecessor.key().map(String::as_str), Some(key));

        assert_eq!(predecessor, successor);
        let root = t.root().unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.as_leaf(), Some(predecessor));

        t.verify().unwrap();
    }

    #[test]
    fn test_operations_single_branch_insertion() {
        let smallest = "Ar";
        let lesser = "Oren";
        let greater = "oren";
        let greatest = "zz";

        let mut t: ZFastTrie<String, String> = ZFastTrie::new();
        assert!(t.add(lesser.to_string(), "eini".to_string()));
        assert!(t.add(greater.to_string(), "Eini".to_string()));

        assert_eq!(t.first_key().map(String::as_str), Ok(lesser));
        assert_eq!(t.last_key().map(String::as_str), Ok(greater));
        assert!(t.contains(greater));
        assert!(t.contains(lesser));

        assert_eq!(t.try_get(lesser).map(String::as_str), Some("eini"));
        assert_eq!(t.try_get(greater).map(String::as_str), Some("Eini"));
        assert_eq!(t.try_get("oren1"), None);
        assert_eq!(t.try_get("1"), None);

        assert_eq!(t.successor_or_default(lesser).map(String::as_str), Some(lesser));
        assert_eq!(t.successor_or_default(greater).map(String::as_str), Some(greater));
        assert_eq!(t.successor_or_default("Oren1").map(String::as_str), Some(greater));
        assert_eq!(t.successor_or_default(greatest), None);

        assert_eq!(t.predecessor_or_default(greater).map(String::as_str), Some(lesser));
        assert_eq!(t.predecessor_or_default(lesser), None);
        assert_eq!(t.predecessor_or_default(smallest), None);

        t.verify().unwrap();
    }

    #[test]
    fn test_structure_single_branch_insertion() {
        let mut t: ZFastTrie<String, String> = ZFastTrie::new();
        assert!(t.add("Oren".to_string(), "eini".to_string()));
        assert!(t.add("oren".to_string(), "Eini".to_string()));

        let root = t.root().unwrap();
        assert!(root.is_internal());
        assert_eq!(root.name_length(), 0);

        let successor = t.successor_internal("aa");
        assert!(successor.is_leaf());
        assert_eq!(successor.next(), Some(t.tail()));
        assert!(successor.previous().unwrap().key().is_some());

        let predecessor = t.predecessor_internal("aa");
        assert_eq!(predecessor.previous(), Some(t.head()));
        assert!(predecessor.next().unwrap().key().is_some());

        assert_eq!(predecessor.next(), Some(successor));
        assert_eq!(successor.previous(), Some(predecessor));

        t.verify().unwrap();
    }

    #[test]
    fn test_structure_multiple_branch_insertion() {
        let mut t: ZFastTrie<String, String> = ZFastTrie::new();
        for key in ["8Jp3", "GX37", "f04o", "KmGx"] {
            assert!(t.add(key.to_string(), key.to_string()));
            t.verify().unwrap();
        }

        let mut by_bits: Vec<&str> = vec!["8Jp3", "GX37", "f04o", "KmGx"];
        by_bits.sort_by_key(|k| k.binarize());
        let stored: Vec<&str> = t.keys().map(String::as_str).collect();
        assert_eq!(stored, by_bits);
    }

    #[test]
    fn test_duplicate_insert_is_rejected() {
        let mut t: ZFastTrie<String, u32> = ZFastTrie::new();
        assert!(t.add("b".to_string(), 1));
        assert!(t.add("a".to_string(), 2));
        let before: Vec<_> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();

        assert!(!t.add("b".to_string(), 3));
        assert!(!t.add("a".to_string(), 4));

        assert_eq!(t.len(), 2);
        let after: Vec<_> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
        assert_eq!(before, after);
        assert_eq!(t.try_get("b"), Some(&1));
        t.verify().unwrap();
    }

    #[test]
    fn test_capped_size_insertion() {
        for (seed, size, count) in [(102, 4, 4), (100, 4, 8), (101, 4, 16), (100, 8, 32), (100, 16, 256)] {
            let mut rng = StdRng::seed_from_u64(seed);
            let mut t: ZFastTrie<String, String> = ZFastTrie::new();
            let mut m: BTreeMap<String, String> = BTreeMap::new();

            for _ in 0..count {
                let key = random_string(&mut rng, size);
                let fresh = !m.contains_key(&key);
                assert_eq!(t.add(key.clone(), key.clone()), fresh);
                m.insert(key.clone(), key);
                t.verify().unwrap();
            }

            assert_eq!(t.len(), m.len());
            assert!(t.keys().eq(m.keys()));
        }
    }

    #[test]
    fn test_random_queries_match_btreemap() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut t: ZFastTrie<Vec<u8>, u64> = ZFastTrie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for i in 0..2000u64 {
            let len = rng.gen_range(0..12);
            let key: Vec<u8> = (0..len).map(|_| rng.gen_range(0..4u8)).collect();
            let fresh = !m.contains_key(&key);
            assert_eq!(t.add(key.clone(), i), fresh);
            m.entry(key).or_insert(i);
        }
        t.verify().unwrap();

        for _ in 0..2000 {
            let len = rng.gen_range(0..12);
            let q: Vec<u8> = (0..len).map(|_| rng.gen_range(0..4u8)).collect();

            assert_eq!(t.contains(&q), m.contains_key(&q));
            assert_eq!(t.try_get(&q), m.get(&q));
            assert_eq!(t.successor_or_default(&q), m.range(q.clone()..).next().map(|(k, _)| k));
            assert_eq!(t.predecessor_or_default(&q), m.range(..q.clone()).next_back().map(|(k, _)| k));
        }
    }

    #[test]
    fn test_integer_keys() {
        let mut t: ZFastTrie<u64, ()> = ZFastTrie::new();
        for k in [50u64, 10, 40, 20, 30, u64::MAX, 0] {
            assert!(t.add(k, ()));
            t.verify().unwrap();
        }
        assert_eq!(t.first_key(), Ok(&0));
        assert_eq!(t.last_key(), Ok(&u64::MAX));
        assert_eq!(t.successor_or_default(&11u64), Some(&20));
        assert_eq!(t.successor_or_default(&20u64), Some(&20));
        assert_eq!(t.predecessor_or_default(&20u64), Some(&10));
        assert_eq!(t.predecessor_or_default(&0u64), None);
        assert_eq!(t.successor_or_default(&51u64), Some(&u64::MAX));

        let mut signed: ZFastTrie<i32, i32> = [(-5, 1), (3, 2), (-100, 3)].into_iter().collect();
        assert!(signed.add(0, 4));
        assert_eq!(signed.keys().copied().collect::<Vec<_>>(), [-100, -5, 0, 3]);
    }

    #[test]
    fn test_sorted_and_reversed_insertion() {
        let mut ascending: ZFastTrie<u32, u32> = ZFastTrie::new();
        let mut descending: ZFastTrie<u32, u32> = ZFastTrie::new();
        for i in 0..512u32 {
            assert!(ascending.add(i * 3, i));
            assert!(descending.add((511 - i) * 3, i));
        }
        ascending.verify().unwrap();
        descending.verify().unwrap();
        assert!(ascending.keys().eq(descending.keys()));
        assert_eq!(ascending.successor_or_default(&1000u32), Some(&1002));
        assert_eq!(descending.predecessor_or_default(&1000u32), Some(&999));
    }

    #[test]
    fn test_custom_binarizer() {
        // Orders keys by length first, then bytes.
        let by_length = |k: &String| {
            let mut bits = BitVector::from_bytes(&(k.len() as u32).to_be_bytes());
            let tail = prefix_free_bytes(k.as_bytes());
            for i in 0..tail.len() {
                bits.push(tail.get(i));
            }
            bits
        };

        let mut t = ZFastTrie::with_binarizer(by_length);
        for key in ["ccc", "a", "bb", "aaaa", "b"] {
            assert!(t.add(key.to_string(), key.len()));
        }
        t.verify().unwrap();
        let keys: Vec<&str> = t.keys().map(String::as_str).collect();
        assert_eq!(keys, ["a", "b", "bb", "ccc", "aaaa"]);
        assert_eq!(
            t.successor_or_default(&"zz".to_string()).map(String::as_str),
            Some("ccc")
        );
        assert!(t.contains(&"bb".to_string()));
    }

    #[test]
    fn test_with_config_and_clone() {
        let mut t: ZFastTrie<String, u32> =
            ZFastTrie::with_config(KeyBinarizer, Config { initial_capacity: 64 });
        for i in 0..64u32 {
            assert!(t.add(format!("key{i:03}"), i));
        }
        let c = t.clone();
        assert!(t.add("zzz".to_string(), 99));
        assert_eq!(c.len(), 64);
        assert_eq!(t.len(), 65);
        assert_eq!(c.try_get("key007"), Some(&7));
        assert!(!c.contains("zzz"));
        c.verify().unwrap();
        t.verify().unwrap();
        assert!(t.memory_usage() > 0);
        t.shrink_to_fit();
        t.verify().unwrap();
    }

    #[test]
    fn test_iteration_and_debug() {
        let t: ZFastTrie<String, u32> = [("b".to_string(), 2), ("a".to_string(), 1)]
            .into_iter()
            .collect();
        let pairs: Vec<_> = (&t).into_iter().map(|(k, v)| (k.as_str(), *v)).collect();
        assert_eq!(pairs, [("a", 1), ("b", 2)]);
        assert_eq!(t.values().rev().copied().collect::<Vec<_>>(), [2, 1]);
        assert_eq!(format!("{t:?}"), r#"{"a": 1, "b": 2}"#);
    }

    #[test]
    #[should_panic(expected = "not prefix-free")]
    fn test_prefix_binarizer_panics() {
        let raw = |k: &Vec<u8>| BitVector::from_bytes(k);
        let mut t = ZFastTrie::with_binarizer(raw);
        t.add(b"ab".to_vec(), ());
        t.add(b"abc".to_vec(), ());
        t.add(b"a".to_vec(), ());
    }
}
