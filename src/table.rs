//! Handle index: hashed handles → internal nodes.
//!
//! Buckets are keyed by [`BitVector::prefix_hash`](crate::bits::BitVector)
//! of a node's handle. Distinct internal nodes always have distinct handles,
//! so a bucket holds more than one node only on a hash collision; callers
//! confirm the handle bits before trusting a hit.

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::node::NodeId;

type Bucket = SmallVec<[NodeId; 2]>;

#[derive(Clone, Default)]
pub(crate) struct HandleTable {
    buckets: FxHashMap<u64, Bucket>,
    len: usize,
}

impl HandleTable {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            buckets: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            len: 0,
        }
    }

    /// Number of nodes filed, across all buckets.
    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub(crate) fn insert(&mut self, hash: u64, node: NodeId) {
        debug_assert!(node.is_internal());
        let bucket = self.buckets.entry(hash).or_default();
        debug_assert!(!bucket.contains(&node), "{node} filed twice");
        bucket.push(node);
        self.len += 1;
    }

    /// Returns whether `node` was filed under `hash`.
    pub(crate) fn remove(&mut self, hash: u64, node: NodeId) -> bool {
        let Some(bucket) = self.buckets.get_mut(&hash) else {
            return false;
        };
        let Some(pos) = bucket.iter().position(|&n| n == node) else {
            return false;
        };
        bucket.swap_remove(pos);
        if bucket.is_empty() {
            self.buckets.remove(&hash);
        }
        self.len -= 1;
        true
    }

    #[inline]
    pub(crate) fn bucket(&self, hash: u64) -> &[NodeId] {
        self.buckets.get(&hash).map_or(&[], |b| b.as_slice())
    }

    /// Every `(hash, node)` pair, in no particular order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = (u64, NodeId)> + '_ {
        self.buckets
            .iter()
            .flat_map(|(&hash, bucket)| bucket.iter().map(move |&node| (hash, node)))
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.buckets.capacity() * std::mem::size_of::<(u64, Bucket)>()
            + self
                .buckets
                .values()
                .filter(|b| b.spilled())
                .map(|b| b.capacity() * std::mem::size_of::<NodeId>())
                .sum::<usize>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.buckets.shrink_to_fit();
    }
}
