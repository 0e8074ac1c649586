//! Error types for zfast-trie

use thiserror::Error;

use crate::node::NodeId;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Crate error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A non-defaulting accessor was called on an empty trie
    #[error("trie is empty")]
    Empty,

    /// Structural verification found a broken invariant
    #[error("structural invariant violated: {0}")]
    Invariant(#[from] Violation),
}

/// The first broken invariant found by [`ZFastTrie::verify`](crate::ZFastTrie::verify).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    #[error("head sentinel has a previous link ({0})")]
    HeadHasPrevious(NodeId),

    #[error("tail sentinel has a next link ({0})")]
    TailHasNext(NodeId),

    #[error("empty trie does not link head directly to tail")]
    EmptyListNotClosed,

    #[error("root is {root} but the trie holds {count} keys")]
    RootMismatch { root: NodeId, count: usize },

    #[error("root {0} has name length {1}, expected 0")]
    RootNameLength(NodeId, usize),

    #[error("{0} does not name an allocated node")]
    DanglingId(NodeId),

    #[error("handle table holds {actual} nodes, expected {expected}")]
    TableSize { actual: usize, expected: usize },

    #[error("handle table entry {0} is not an internal node")]
    TableEntryNotInternal(NodeId),

    #[error("{0} is filed more than once in the handle table")]
    DuplicateTableEntry(NodeId),

    #[error("{0} is filed under a hash that does not match its handle")]
    StaleHandle(NodeId),

    #[error("{node} has handle length {handle}, not above the root's {root}")]
    HandleNotBelowRoot {
        node: NodeId,
        handle: usize,
        root: usize,
    },

    #[error("{0} and its exit leaf do not reference each other")]
    UnpairedReference(NodeId),

    #[error("leaf list is out of order between {0} and {1}")]
    ListOrder(NodeId, NodeId),

    #[error("leaf list links disagree at {0}")]
    ListLinks(NodeId),

    #[error("leaf list holds {actual} leaves, expected {expected}")]
    ListLength { actual: usize, expected: usize },

    #[error("tree holds {actual} nodes, expected {expected}")]
    NodeCount { actual: usize, expected: usize },

    #[error("tree reaches {actual} leaves, expected {expected}")]
    LeafCount { actual: usize, expected: usize },

    #[error("{0} is reachable but missing from the handle table")]
    MissingFromTable(NodeId),

    #[error("{0} is reachable more than once")]
    Revisited(NodeId),

    #[error("{node} has parent link {actual}, expected {expected}")]
    ParentLink {
        node: NodeId,
        actual: NodeId,
        expected: NodeId,
    },

    #[error("{node} has name length {actual}, expected {expected}")]
    NameLength {
        node: NodeId,
        actual: usize,
        expected: usize,
    },

    #[error("extent of {0} does not extend its parent's extent")]
    ExtentPrefix(NodeId),

    #[error("{0} hangs on the wrong side of its parent")]
    BranchBit(NodeId),

    #[error("{node} has {side} jump pointer {actual}, expected {expected}")]
    StaleJump {
        node: NodeId,
        side: &'static str,
        actual: NodeId,
        expected: NodeId,
    },

    #[error("{actual} leaves are referenced as exit leaves, expected {expected}")]
    ReferenceCount { actual: usize, expected: usize },
}
