//! Human-readable rendering of the trie's shape.

use std::fmt;

use crate::node::NodeId;
use crate::trie::ZFastTrie;

/// Indented tree listing returned by [`ZFastTrie::dump`].
///
/// One line per node, children indented one tab below their parent:
///
/// ```text
/// node#0 extent 01 (name length 0, handle 0) jump left: leaf#2 jump right: leaf#3
/// 	leaf#2 "Oren" (name length 3)
/// 	leaf#3 "oren" (name length 3)
/// ```
pub struct Dump<'a, K, V, B> {
    trie: &'a ZFastTrie<K, V, B>,
}

impl<K, V, B> ZFastTrie<K, V, B> {
    pub fn dump(&self) -> Dump<'_, K, V, B> {
        Dump { trie: self }
    }
}

impl<K: fmt::Debug, V, B> fmt::Display for Dump<'_, K, V, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let arena = &self.trie.arena;
        if self.trie.root.is_null() {
            return writeln!(f, "(empty)");
        }

        let mut stack: Vec<(NodeId, usize, usize)> = vec![(self.trie.root, 0, 0)];
        while let Some((id, name_length, depth)) = stack.pop() {
            for _ in 0..depth {
                f.write_str("\t")?;
            }

            if id.is_leaf() {
                match arena.leaf(id).key() {
                    Some(key) => writeln!(f, "{id} {key:?} (name length {name_length})")?,
                    None => writeln!(f, "{id} sentinel")?,
                }
                continue;
            }

            let node = arena.internal(id);
            writeln!(
                f,
                "{id} extent {} (name length {name_length}, handle {}) jump left: {} jump right: {}",
                arena.extent(id),
                node.handle_length(),
                node.jump_left,
                node.jump_right,
            )?;
            stack.push((node.right, node.extent_length + 1, depth + 1));
            stack.push((node.left, node.extent_length + 1, depth + 1));
        }
        Ok(())
    }
}
