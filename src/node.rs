//! Node arena: leaves, internal branch points and the ids that link them.
//!
//! Tree edges, list links, jump pointers and exit-leaf references are all
//! plain [`NodeId`]s into two `Vec` arenas, so the "owns" graph and the
//! "points at" graph never fight the borrow checker.

use std::fmt;

use crate::bits::{two_fattest, BitVector};

// =============================================================================
// NodeId
// =============================================================================

/// Tagged 32-bit node id.
///
/// Layout:
/// - Bit 31 = 1: leaf (index into the leaf arena)
/// - Bit 31 = 0: internal node (index into the internal arena)
/// - Special: `0xFFFF_FFFF` = NULL
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(u32);

impl NodeId {
    const LEAF_BIT: u32 = 1u32 << 31;
    const INDEX_MASK: u32 = Self::LEAF_BIT - 1;
    pub(crate) const NULL: NodeId = NodeId(u32::MAX);

    #[inline]
    pub(crate) fn leaf(idx: usize) -> Self {
        debug_assert!(idx < Self::INDEX_MASK as usize);
        Self(idx as u32 | Self::LEAF_BIT)
    }

    #[inline]
    pub(crate) fn internal(idx: usize) -> Self {
        debug_assert!(idx < Self::INDEX_MASK as usize);
        Self(idx as u32)
    }

    #[inline]
    pub(crate) fn is_null(self) -> bool {
        self.0 == Self::NULL.0
    }

    #[inline]
    pub fn is_leaf(self) -> bool {
        !self.is_null() && (self.0 & Self::LEAF_BIT) != 0
    }

    #[inline]
    pub fn is_internal(self) -> bool {
        !self.is_null() && (self.0 & Self::LEAF_BIT) == 0
    }

    #[inline]
    pub(crate) fn index(self) -> usize {
        debug_assert!(!self.is_null());
        (self.0 & Self::INDEX_MASK) as usize
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_null() {
            f.write_str("null")
        } else if self.is_leaf() {
            write!(f, "leaf#{}", self.index())
        } else {
            write!(f, "node#{}", self.index())
        }
    }
}

/// Sentinel that precedes every stored leaf.
pub(crate) const HEAD: NodeId = NodeId(NodeId::LEAF_BIT);
/// Sentinel that follows every stored leaf.
pub(crate) const TAIL: NodeId = NodeId(NodeId::LEAF_BIT | 1);

// =============================================================================
// Node kinds
// =============================================================================

#[derive(Clone)]
pub(crate) struct Leaf<K, V> {
    /// `None` only for the HEAD/TAIL sentinels.
    pub(crate) entry: Option<(K, V)>,
    /// The binarized key; this leaf's extent.
    pub(crate) bits: BitVector,
    pub(crate) previous: NodeId,
    pub(crate) next: NodeId,
    pub(crate) parent: NodeId,
    /// Internal node this leaf is the exit leaf of, or NULL.
    pub(crate) reference: NodeId,
}

impl<K, V> Leaf<K, V> {
    fn sentinel() -> Self {
        Self {
            entry: None,
            bits: BitVector::new(),
            previous: NodeId::NULL,
            next: NodeId::NULL,
            parent: NodeId::NULL,
            reference: NodeId::NULL,
        }
    }

    #[inline]
    pub(crate) fn key(&self) -> Option<&K> {
        self.entry.as_ref().map(|(k, _)| k)
    }

    #[inline]
    pub(crate) fn value(&self) -> Option<&V> {
        self.entry.as_ref().map(|(_, v)| v)
    }
}

#[derive(Clone, Copy, Debug)]
pub(crate) struct Internal {
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
    pub(crate) jump_left: NodeId,
    pub(crate) jump_right: NodeId,
    /// Exit leaf; its bits carry this node's extent.
    pub(crate) reference: NodeId,
    /// Length of the longest common prefix of every leaf below.
    pub(crate) extent_length: usize,
    /// Parent extent length + 1; 0 for the root.
    pub(crate) name_length: usize,
}

impl Internal {
    /// Length of the handle: the 2-fattest number in
    /// `[name_length, extent_length]`, with the root's handle being empty.
    #[inline]
    pub(crate) fn handle_length(&self) -> usize {
        if self.name_length == 0 {
            0
        } else {
            two_fattest(self.name_length - 1, self.extent_length)
        }
    }

    /// Extent length a jump pointer must reach. Unbounded for the root, so its
    /// jumps land on the extremal leaves.
    #[inline]
    pub(crate) fn jump_length(&self) -> usize {
        let handle = self.handle_length();
        if handle == 0 {
            usize::MAX
        } else {
            handle.saturating_add(1 << handle.trailing_zeros())
        }
    }

    #[inline]
    pub(crate) fn child(&self, right: bool) -> NodeId {
        if right {
            self.right
        } else {
            self.left
        }
    }

    #[inline]
    pub(crate) fn jump(&self, right: bool) -> NodeId {
        if right {
            self.jump_right
        } else {
            self.jump_left
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, right: bool, id: NodeId) {
        if right {
            self.right = id;
        } else {
            self.left = id;
        }
    }

    #[inline]
    pub(crate) fn set_jump(&mut self, right: bool, id: NodeId) {
        if right {
            self.jump_right = id;
        } else {
            self.jump_left = id;
        }
    }
}

// =============================================================================
// Arena
// =============================================================================

#[derive(Clone)]
pub(crate) struct Arena<K, V> {
    pub(crate) leaves: Vec<Leaf<K, V>>,
    pub(crate) internals: Vec<Internal>,
}

impl<K, V> Arena<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut leaves = Vec::with_capacity(capacity + 2);
        leaves.push(Leaf::sentinel());
        leaves.push(Leaf::sentinel());
        leaves[HEAD.index()].next = TAIL;
        leaves[TAIL.index()].previous = HEAD;
        Self {
            leaves,
            internals: Vec::with_capacity(capacity.saturating_sub(1)),
        }
    }

    #[inline]
    pub(crate) fn leaf(&self, id: NodeId) -> &Leaf<K, V> {
        debug_assert!(id.is_leaf());
        &self.leaves[id.index()]
    }

    #[inline]
    pub(crate) fn leaf_mut(&mut self, id: NodeId) -> &mut Leaf<K, V> {
        debug_assert!(id.is_leaf());
        &mut self.leaves[id.index()]
    }

    #[inline]
    pub(crate) fn internal(&self, id: NodeId) -> &Internal {
        debug_assert!(id.is_internal());
        &self.internals[id.index()]
    }

    #[inline]
    pub(crate) fn internal_mut(&mut self, id: NodeId) -> &mut Internal {
        debug_assert!(id.is_internal());
        &mut self.internals[id.index()]
    }

    pub(crate) fn push_leaf(&mut self, key: K, value: V, bits: BitVector) -> NodeId {
        let id = NodeId::leaf(self.leaves.len());
        self.leaves.push(Leaf {
            entry: Some((key, value)),
            bits,
            previous: NodeId::NULL,
            next: NodeId::NULL,
            parent: NodeId::NULL,
            reference: NodeId::NULL,
        });
        id
    }

    pub(crate) fn push_internal(&mut self, node: Internal) -> NodeId {
        let id = NodeId::internal(self.internals.len());
        self.internals.push(node);
        id
    }

    /// Whether `id` names an allocated slot.
    #[inline]
    pub(crate) fn contains(&self, id: NodeId) -> bool {
        if id.is_leaf() {
            id.index() < self.leaves.len()
        } else if id.is_internal() {
            id.index() < self.internals.len()
        } else {
            false
        }
    }

    /// Stored (non-sentinel) leaves.
    #[inline]
    pub(crate) fn leaf_count(&self) -> usize {
        self.leaves.len() - 2
    }

    #[inline]
    pub(crate) fn extent_length(&self, id: NodeId) -> usize {
        if id.is_leaf() {
            self.leaf(id).bits.len()
        } else {
            self.internal(id).extent_length
        }
    }

    /// Bits whose first [`Arena::extent_length`] bits are the node's extent.
    #[inline]
    pub(crate) fn extent_bits(&self, id: NodeId) -> &BitVector {
        if id.is_leaf() {
            &self.leaf(id).bits
        } else {
            &self.leaf(self.internal(id).reference).bits
        }
    }

    /// The node's extent, materialized.
    pub(crate) fn extent(&self, id: NodeId) -> BitVector {
        self.extent_bits(id).sub_vector(0, self.extent_length(id))
    }

    #[inline]
    pub(crate) fn parent(&self, id: NodeId) -> NodeId {
        if id.is_leaf() {
            self.leaf(id).parent
        } else {
            self.internal(id).parent
        }
    }

    #[inline]
    pub(crate) fn set_parent(&mut self, id: NodeId, parent: NodeId) {
        if id.is_leaf() {
            self.leaf_mut(id).parent = parent;
        } else {
            self.internal_mut(id).parent = parent;
        }
    }

    /// Smallest leaf below `id`, reached through left jump pointers.
    pub(crate) fn leftmost(&self, mut id: NodeId) -> NodeId {
        while id.is_internal() {
            id = self.internal(id).jump_left;
        }
        id
    }

    /// Largest leaf below `id`, reached through right jump pointers.
    pub(crate) fn rightmost(&self, mut id: NodeId) -> NodeId {
        while id.is_internal() {
            id = self.internal(id).jump_right;
        }
        id
    }

    /// First node on the `right`/left spine starting at `start` that is a leaf
    /// or has an extent of at least `jump_length`.
    ///
    /// Hops along the spine nodes' own jump pointers: a spine node still
    /// short of `jump_length` never jumps further than `jump_length` asks.
    pub(crate) fn jump_target(&self, start: NodeId, right: bool, jump_length: usize) -> NodeId {
        let mut id = start;
        while id.is_internal() {
            let node = self.internal(id);
            if node.extent_length >= jump_length {
                break;
            }
            id = node.jump(right);
        }
        id
    }

    pub(crate) fn memory_usage(&self) -> usize {
        self.leaves.capacity() * std::mem::size_of::<Leaf<K, V>>()
            + self.leaves.iter().map(|l| l.bits.heap_size()).sum::<usize>()
            + self.internals.capacity() * std::mem::size_of::<Internal>()
    }

    pub(crate) fn shrink_to_fit(&mut self) {
        self.leaves.shrink_to_fit();
        self.internals.shrink_to_fit();
    }
}
