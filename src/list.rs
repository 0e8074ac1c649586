//! The ordered doubly-linked leaf list, HEAD → leaves ascending → TAIL.

use std::iter::FusedIterator;

use crate::node::{Arena, NodeId, HEAD, TAIL};

impl<K, V> Arena<K, V> {
    /// Splice `leaf` in directly after `predecessor`.
    pub(crate) fn link_after(&mut self, predecessor: NodeId, leaf: NodeId) {
        debug_assert!(predecessor != TAIL);
        let successor = self.leaf(predecessor).next;
        self.link_between(predecessor, leaf, successor);
    }

    /// Splice `leaf` in directly before `successor`.
    pub(crate) fn link_before(&mut self, successor: NodeId, leaf: NodeId) {
        debug_assert!(successor != HEAD);
        let predecessor = self.leaf(successor).previous;
        self.link_between(predecessor, leaf, successor);
    }

    fn link_between(&mut self, predecessor: NodeId, leaf: NodeId, successor: NodeId) {
        debug_assert_eq!(self.leaf(predecessor).next, successor);
        let new = self.leaf_mut(leaf);
        new.previous = predecessor;
        new.next = successor;
        self.leaf_mut(predecessor).next = leaf;
        self.leaf_mut(successor).previous = leaf;
    }

    #[inline]
    pub(crate) fn first(&self) -> NodeId {
        self.leaf(HEAD).next
    }

    #[inline]
    pub(crate) fn last(&self) -> NodeId {
        self.leaf(TAIL).previous
    }
}

/// Iterator over `(key, value)` pairs in ascending key order.
pub struct Iter<'a, K, V> {
    arena: &'a Arena<K, V>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(arena: &'a Arena<K, V>) -> Self {
        Self {
            arena,
            front: arena.first(),
            back: arena.last(),
            remaining: arena.leaf_count(),
        }
    }
}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            arena: self.arena,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaf = self.arena.leaf(self.front);
        self.front = leaf.next;
        self.remaining -= 1;
        leaf.entry.as_ref().map(|(k, v)| (k, v))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> DoubleEndedIterator for Iter<'_, K, V> {
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let leaf = self.arena.leaf(self.back);
        self.back = leaf.previous;
        self.remaining -= 1;
        leaf.entry.as_ref().map(|(k, v)| (k, v))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}
