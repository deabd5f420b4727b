// =============================================================================
// Insertion
// =============================================================================

use std::cmp::Ordering;

use log::trace;

use crate::error::{Error, Result};
use crate::node::{Color, NodeId, Side};
use crate::RbTree;

impl<K: Ord, V> RbTree<K, V> {
    /// Inserts a new entry.
    ///
    /// Keys are never overwritten: if `key` is already present this returns
    /// [`Error::DuplicateKey`] and the tree is unchanged. Use
    /// [`update`](Self::update) to replace a value.
    pub fn insert(&mut self, key: K, value: V) -> Result<()> {
        let mut parent = NodeId::SENTINEL;
        let mut side = Side::Left;
        let mut curr = self.root;
        while !curr.is_sentinel() {
            parent = curr;
            side = match self.nodes.key(curr).cmp(&key) {
                Ordering::Less => Side::Right,
                Ordering::Greater => Side::Left,
                Ordering::Equal => return Err(Error::DuplicateKey),
            };
            curr = self.nodes.child(curr, side);
        }

        let z = self.nodes.alloc(key, value, parent);
        if parent.is_sentinel() {
            self.root = z;
        } else {
            self.nodes.set_child(parent, side, z);
        }
        self.count += 1;

        self.insert_fixup(z);
        Ok(())
    }

    /// Repairs a RED node `z` hanging under a RED parent.
    fn insert_fixup(&mut self, mut z: NodeId) {
        while self.nodes.is_red(self.nodes[z].parent) {
            // A RED parent is never the root, so the grandparent is real.
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            let side = self.nodes.side_of(parent);
            let uncle = self.nodes.child(grandparent, side.opposite());

            if self.nodes.is_red(uncle) {
                trace!("insert fixup: red uncle {uncle:?}, recolor at {grandparent:?}");
                self.nodes[parent].color = Color::Black;
                self.nodes[uncle].color = Color::Black;
                self.nodes[grandparent].color = Color::Red;
                z = grandparent;
                continue;
            }

            if z == self.nodes.child(parent, side.opposite()) {
                trace!("insert fixup: inner grandchild {z:?}, rotate at {parent:?}");
                z = parent;
                self.rotate(z, side);
            }

            trace!("insert fixup: outer grandchild {z:?}, rotate at {grandparent:?}");
            let parent = self.nodes[z].parent;
            let grandparent = self.nodes[parent].parent;
            self.nodes[parent].color = Color::Black;
            self.nodes[grandparent].color = Color::Red;
            self.rotate(grandparent, side.opposite());
        }

        let root = self.root;
        self.nodes[root].color = Color::Black;
    }
}
