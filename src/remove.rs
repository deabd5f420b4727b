// =============================================================================
// Removal
// =============================================================================

use std::borrow::Borrow;

use log::trace;

use crate::node::{Color, NodeId};
use crate::{Entry, RbTree};

impl<K: Ord, V> RbTree<K, V> {
    /// Removes the entry for `key` and returns it as an owned [`Entry`].
    ///
    /// Returns `None`, leaving the tree unchanged, if the key is absent.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<Entry<K, V>>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let target = self.find(key);
        if target.is_sentinel() {
            return None;
        }
        let color = self.nodes.color(target);

        // `spliced` is the node physically unlinked: the target itself when it
        // has at most one real child, otherwise its successor.
        let spliced = if self.nodes[target].left.is_sentinel()
            || self.nodes[target].right.is_sentinel()
        {
            target
        } else {
            self.successor(target)
        };
        let x = if self.nodes[spliced].left.is_sentinel() {
            self.nodes[spliced].right
        } else {
            self.nodes[spliced].left
        };

        // `x` may be the sentinel; its parent link is still written so the
        // fixup can find the sibling.
        let parent = self.nodes[spliced].parent;
        self.nodes[x].parent = parent;
        if parent.is_sentinel() {
            self.root = x;
        } else if self.nodes[parent].left == spliced {
            self.nodes[parent].left = x;
        } else {
            self.nodes[parent].right = x;
        }

        if self.nodes.color(spliced) == Color::Black {
            self.remove_fixup(x);
        }
        self.nodes[NodeId::SENTINEL].parent = NodeId::SENTINEL;

        let moved = self.nodes.release(spliced);
        let (key, value) = if spliced == target {
            moved
        } else {
            std::mem::replace(self.nodes.entry_mut(target), moved)
        };
        self.count -= 1;

        Some(Entry { key, value, color })
    }

    /// Restores equal black-height after a BLACK node was spliced out above
    /// `x`, which carries the missing unit of blackness.
    fn remove_fixup(&mut self, mut x: NodeId) {
        while x != self.root && !self.nodes.is_red(x) {
            let parent = self.nodes[x].parent;
            let side = self.nodes.side_of(x);
            let far = side.opposite();
            let mut sibling = self.nodes.child(parent, far);

            if self.nodes.is_red(sibling) {
                trace!("remove fixup: red sibling {sibling:?}, rotate at {parent:?}");
                self.nodes[sibling].color = Color::Black;
                self.nodes[parent].color = Color::Red;
                self.rotate(parent, side);
                sibling = self.nodes.child(parent, far);
            }

            let near_child = self.nodes.child(sibling, side);
            let far_child = self.nodes.child(sibling, far);
            if !self.nodes.is_red(near_child) && !self.nodes.is_red(far_child) {
                trace!("remove fixup: black nephews, recolor {sibling:?} and move up");
                self.nodes[sibling].color = Color::Red;
                x = parent;
                continue;
            }

            if !self.nodes.is_red(far_child) {
                trace!("remove fixup: red near nephew {near_child:?}, rotate at {sibling:?}");
                self.nodes[near_child].color = Color::Black;
                self.nodes[sibling].color = Color::Red;
                self.rotate(sibling, far);
                sibling = self.nodes.child(parent, far);
            }

            trace!("remove fixup: red far nephew, rotate at {parent:?}");
            let parent_color = self.nodes.color(parent);
            self.nodes[sibling].color = parent_color;
            self.nodes[parent].color = Color::Black;
            let far_child = self.nodes.child(sibling, far);
            self.nodes[far_child].color = Color::Black;
            self.rotate(parent, side);
            x = self.root;
        }

        self.nodes[x].color = Color::Black;
    }
}
