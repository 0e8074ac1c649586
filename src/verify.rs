//! Structural self-check.

use rustc_hash::FxHashSet;

use crate::error::{Error, Result, Violation};
use crate::node::{NodeId, HEAD, TAIL};
use crate::trie::ZFastTrie;

type Check = std::result::Result<(), Violation>;

impl<K, V, B> ZFastTrie<K, V, B> {
    /// Walk the whole structure and confirm every invariant the search relies
    /// on: list order and links, tree shape, name and extent lengths, jump
    /// pointers, handle index contents and exit-leaf pairing.
    ///
    /// Runs in `O(n · depth)`; meant for tests and debugging.
    ///
    /// # Errors
    ///
    /// [`Error::Invariant`] carrying the first violation found.
    pub fn verify(&self) -> Result<()> {
        self.check_sentinels()
            .and_then(|()| self.check_root())
            .and_then(|()| self.check_table())
            .and_then(|()| self.check_list())
            .and_then(|()| self.check_tree())
            .map_err(|violation| {
                tracing::debug!(%violation, count = self.count, "verification failed");
                Error::Invariant(violation)
            })
    }

    fn check_sentinels(&self) -> Check {
        let head = self.arena.leaf(HEAD);
        if !head.previous.is_null() {
            return Err(Violation::HeadHasPrevious(head.previous));
        }
        let tail = self.arena.leaf(TAIL);
        if !tail.next.is_null() {
            return Err(Violation::TailHasNext(tail.next));
        }
        Ok(())
    }

    fn check_root(&self) -> Check {
        let mismatch = Violation::RootMismatch {
            root: self.root,
            count: self.count,
        };
        if !self.root.is_null() && !self.arena.contains(self.root) {
            return Err(Violation::DanglingId(self.root));
        }
        match self.count {
            0 if self.root.is_null() => {
                if self.arena.first() != TAIL || self.arena.last() != HEAD {
                    return Err(Violation::EmptyListNotClosed);
                }
            }
            1 if self.root.is_leaf() && self.root != HEAD && self.root != TAIL => {}
            n if n > 1 && self.root.is_internal() => {
                let name_length = self.arena.internal(self.root).name_length;
                if name_length != 0 {
                    return Err(Violation::RootNameLength(self.root, name_length));
                }
            }
            _ => return Err(mismatch),
        }
        if !self.root.is_null() && !self.arena.parent(self.root).is_null() {
            return Err(Violation::ParentLink {
                node: self.root,
                actual: self.arena.parent(self.root),
                expected: NodeId::NULL,
            });
        }
        Ok(())
    }

    fn check_table(&self) -> Check {
        let expected = self.count.saturating_sub(1);
        if self.table.len() != expected {
            return Err(Violation::TableSize {
                actual: self.table.len(),
                expected,
            });
        }

        let root_handle = if self.root.is_internal() {
            self.arena.internal(self.root).handle_length()
        } else {
            0
        };

        let mut seen = FxHashSet::default();
        for (hash, id) in self.table.iter() {
            if !id.is_internal() || id.index() >= self.arena.internals.len() {
                return Err(Violation::TableEntryNotInternal(id));
            }
            if !seen.insert(id) {
                return Err(Violation::DuplicateTableEntry(id));
            }

            let node = self.arena.internal(id);
            let reference = node.reference;
            if !reference.is_leaf()
                || !self.arena.contains(reference)
                || reference == HEAD
                || reference == TAIL
                || self.arena.leaf(reference).reference != id
                || !self.is_below(reference, id)
            {
                return Err(Violation::UnpairedReference(id));
            }
            if self.arena.extent_bits(id).len() < node.extent_length {
                return Err(Violation::ExtentPrefix(id));
            }
            // A name longer than the extent leaves no room for a handle.
            if node.name_length > node.extent_length {
                let parent = node.parent;
                let expected = if parent.is_internal() && self.arena.contains(parent) {
                    self.arena.internal(parent).extent_length + 1
                } else {
                    0
                };
                return Err(Violation::NameLength {
                    node: id,
                    actual: node.name_length,
                    expected,
                });
            }
            if hash != self.handle_hash(id) {
                return Err(Violation::StaleHandle(id));
            }
            if id != self.root && node.handle_length() <= root_handle {
                return Err(Violation::HandleNotBelowRoot {
                    node: id,
                    handle: node.handle_length(),
                    root: root_handle,
                });
            }
        }
        Ok(())
    }

    /// Whether `ancestor` lies on the parent chain of `id`.
    fn is_below(&self, id: NodeId, ancestor: NodeId) -> bool {
        let mut current = self.arena.parent(id);
        // A chain longer than the arena means a cycle.
        for _ in 0..=self.arena.internals.len() {
            if current.is_null() {
                return false;
            }
            if current == ancestor {
                return true;
            }
            if !self.arena.contains(current) {
                return false;
            }
            current = self.arena.parent(current);
        }
        false
    }

    fn check_list(&self) -> Check {
        let mut previous = HEAD;
        let mut current = self.arena.first();
        let mut length = 0;

        while current != TAIL {
            if !self.arena.contains(current) {
                return Err(Violation::DanglingId(current));
            }
            if !current.is_leaf() || current == HEAD || self.arena.leaf(current).previous != previous {
                return Err(Violation::ListLinks(current));
            }
            if previous != HEAD && self.arena.leaf(previous).bits >= self.arena.leaf(current).bits {
                return Err(Violation::ListOrder(previous, current));
            }
            length += 1;
            if length > self.count {
                return Err(Violation::ListLength {
                    actual: length,
                    expected: self.count,
                });
            }
            previous = current;
            current = self.arena.leaf(current).next;
        }

        if self.arena.leaf(TAIL).previous != previous {
            return Err(Violation::ListLinks(TAIL));
        }
        if length != self.count {
            return Err(Violation::ListLength {
                actual: length,
                expected: self.count,
            });
        }
        Ok(())
    }

    fn check_tree(&self) -> Check {
        if self.root.is_null() {
            return Ok(());
        }

        let mut visited = FxHashSet::default();
        let mut leaves = 0;
        let mut referenced = 0;
        let mut stack = vec![(self.root, NodeId::NULL)];

        while let Some((id, parent)) = stack.pop() {
            if !self.arena.contains(id) {
                return Err(Violation::DanglingId(id));
            }
            if !visited.insert(id) {
                return Err(Violation::Revisited(id));
            }
            if visited.len() > 2 * self.count {
                return Err(Violation::NodeCount {
                    actual: visited.len(),
                    expected: 2 * self.count - 1,
                });
            }

            let actual = self.arena.parent(id);
            if actual != parent {
                return Err(Violation::ParentLink {
                    node: id,
                    actual,
                    expected: parent,
                });
            }
            if id.is_internal() {
                let reference = self.arena.internal(id).reference;
                if !reference.is_leaf() || !self.arena.contains(reference) {
                    return Err(Violation::UnpairedReference(id));
                }
            }

            let extent_length = self.arena.extent_length(id);
            if !parent.is_null() {
                let above = self.arena.internal(parent);
                let bits = self.arena.extent_bits(id);
                if extent_length <= above.extent_length
                    || bits.len() < extent_length
                    || !bits.prefix_eq(self.arena.extent_bits(parent), above.extent_length)
                {
                    return Err(Violation::ExtentPrefix(id));
                }
                if bits.get(above.extent_length) != (above.right == id) {
                    return Err(Violation::BranchBit(id));
                }
            }

            if id.is_leaf() {
                leaves += 1;
                if !self.arena.leaf(id).reference.is_null() {
                    referenced += 1;
                }
                continue;
            }

            let node = self.arena.internal(id);
            let expected = if parent.is_null() {
                0
            } else {
                self.arena.internal(parent).extent_length + 1
            };
            if node.name_length != expected {
                return Err(Violation::NameLength {
                    node: id,
                    actual: node.name_length,
                    expected,
                });
            }
            if !self.table.bucket(self.handle_hash(id)).contains(&id) {
                return Err(Violation::MissingFromTable(id));
            }
            for child in [node.left, node.right] {
                if !self.arena.contains(child) {
                    return Err(Violation::DanglingId(child));
                }
            }

            let jump_length = node.jump_length();
            for (right, side) in [(false, "left"), (true, "right")] {
                let expected = self.walk_spine(node.child(right), right, jump_length);
                let actual = node.jump(right);
                if actual != expected {
                    return Err(Violation::StaleJump {
                        node: id,
                        side,
                        actual,
                        expected,
                    });
                }
            }

            stack.push((node.right, id));
            stack.push((node.left, id));
        }

        if leaves != self.count {
            return Err(Violation::LeafCount {
                actual: leaves,
                expected: self.count,
            });
        }
        if visited.len() != 2 * self.count - 1 {
            return Err(Violation::NodeCount {
                actual: visited.len(),
                expected: 2 * self.count - 1,
            });
        }
        if referenced != self.count - 1 {
            return Err(Violation::ReferenceCount {
                actual: referenced,
                expected: self.count - 1,
            });
        }
        Ok(())
    }

    /// Jump target found the slow way, one child edge at a time. Stops at an
    /// unallocated id, which the descent reports when it gets there.
    fn walk_spine(&self, mut id: NodeId, right: bool, jump_length: usize) -> NodeId {
        while id.is_internal()
            && self.arena.contains(id)
            && self.arena.internal(id).extent_length < jump_length
        {
            id = self.arena.internal(id).child(right);
        }
        id
    }
}
