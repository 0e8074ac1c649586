//! Read-only views of individual nodes, for introspection and tests.

use std::fmt;

use crate::bits::BitVector;
use crate::node::{Arena, NodeId, HEAD, TAIL};

/// A leaf of the ordered list, possibly the HEAD or TAIL sentinel.
pub struct LeafRef<'a, K, V> {
    arena: &'a Arena<K, V>,
    id: NodeId,
}

impl<'a, K, V> LeafRef<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, id: NodeId) -> Self {
        debug_assert!(id.is_leaf());
        Self { arena, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Always true; mirrors [`NodeRef::is_leaf`].
    pub fn is_leaf(&self) -> bool {
        true
    }

    pub fn is_head(&self) -> bool {
        self.id == HEAD
    }

    pub fn is_tail(&self) -> bool {
        self.id == TAIL
    }

    /// `None` for the sentinels.
    pub fn key(&self) -> Option<&'a K> {
        self.arena.leaf(self.id).key()
    }

    /// `None` for the sentinels.
    pub fn value(&self) -> Option<&'a V> {
        self.arena.leaf(self.id).value()
    }

    /// The binarized key (empty for the sentinels).
    pub fn bits(&self) -> &'a BitVector {
        &self.arena.leaf(self.id).bits
    }

    /// `None` only for HEAD.
    pub fn previous(&self) -> Option<LeafRef<'a, K, V>> {
        let previous = self.arena.leaf(self.id).previous;
        (!previous.is_null()).then(|| LeafRef::new(self.arena, previous))
    }

    /// `None` only for TAIL.
    pub fn next(&self) -> Option<LeafRef<'a, K, V>> {
        let next = self.arena.leaf(self.id).next;
        (!next.is_null()).then(|| LeafRef::new(self.arena, next))
    }

    /// The internal node this leaf is the exit leaf of.
    pub fn reference(&self) -> Option<NodeRef<'a, K, V>> {
        let reference = self.arena.leaf(self.id).reference;
        (!reference.is_null()).then(|| NodeRef::new(self.arena, reference))
    }
}

impl<K, V> Clone for LeafRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for LeafRef<'_, K, V> {}

impl<K, V> PartialEq for LeafRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.id == other.id
    }
}

impl<K, V> Eq for LeafRef<'_, K, V> {}

impl<K: fmt::Debug, V> fmt::Debug for LeafRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.id, self.key()) {
            (HEAD, _) => f.write_str("LeafRef(HEAD)"),
            (TAIL, _) => f.write_str("LeafRef(TAIL)"),
            (id, key) => write!(f, "LeafRef({id}, {key:?})"),
        }
    }
}

/// Any node reachable from the root.
pub struct NodeRef<'a, K, V> {
    arena: &'a Arena<K, V>,
    id: NodeId,
}

impl<'a, K, V> NodeRef<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>, id: NodeId) -> Self {
        debug_assert!(!id.is_null());
        Self { arena, id }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn is_leaf(&self) -> bool {
        self.id.is_leaf()
    }

    pub fn is_internal(&self) -> bool {
        self.id.is_internal()
    }

    pub fn as_leaf(&self) -> Option<LeafRef<'a, K, V>> {
        self.id
            .is_leaf()
            .then(|| LeafRef::new(self.arena, self.id))
    }

    pub fn extent_length(&self) -> usize {
        self.arena.extent_length(self.id)
    }

    /// Bits shared by every leaf below this node.
    pub fn extent(&self) -> BitVector {
        self.arena.extent(self.id)
    }

    /// Parent extent length + 1, or 0 for the root.
    pub fn name_length(&self) -> usize {
        let parent = self.arena.parent(self.id);
        if parent.is_null() {
            0
        } else {
            self.arena.internal(parent).extent_length + 1
        }
    }

    /// `None` for leaves.
    pub fn handle_length(&self) -> Option<usize> {
        self.id
            .is_internal()
            .then(|| self.arena.internal(self.id).handle_length())
    }

    pub fn parent(&self) -> Option<NodeRef<'a, K, V>> {
        self.link(self.arena.parent(self.id))
    }

    pub fn left(&self) -> Option<NodeRef<'a, K, V>> {
        self.internal_link(|n| n.left)
    }

    pub fn right(&self) -> Option<NodeRef<'a, K, V>> {
        self.internal_link(|n| n.right)
    }

    pub fn jump_left(&self) -> Option<NodeRef<'a, K, V>> {
        self.internal_link(|n| n.jump_left)
    }

    pub fn jump_right(&self) -> Option<NodeRef<'a, K, V>> {
        self.internal_link(|n| n.jump_right)
    }

    /// For an internal node, its exit leaf; for a leaf, the internal node it
    /// is the exit leaf of.
    pub fn reference(&self) -> Option<NodeRef<'a, K, V>> {
        let reference = if self.id.is_leaf() {
            self.arena.leaf(self.id).reference
        } else {
            self.arena.internal(self.id).reference
        };
        self.link(reference)
    }

    fn link(&self, id: NodeId) -> Option<NodeRef<'a, K, V>> {
        (!id.is_null()).then(|| NodeRef::new(self.arena, id))
    }

    fn internal_link(&self, f: impl FnOnce(&crate::node::Internal) -> NodeId) -> Option<NodeRef<'a, K, V>> {
        if self.id.is_internal() {
            self.link(f(self.arena.internal(self.id)))
        } else {
            None
        }
    }
}

impl<K, V> Clone for NodeRef<'_, K, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<K, V> Copy for NodeRef<'_, K, V> {}

impl<K, V> PartialEq for NodeRef<'_, K, V> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.arena, other.arena) && self.id == other.id
    }
}

impl<K, V> Eq for NodeRef<'_, K, V> {}

impl<K, V> fmt::Debug for NodeRef<'_, K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeRef({}, extent {})", self.id, self.extent_length())
    }
}
