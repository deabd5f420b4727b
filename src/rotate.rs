// =============================================================================
// Rotations
// =============================================================================
//
// Left rotation at X (dir = Left), right rotation is the mirror:
//
//        |                    |
//        X                    Y
//       / \                  / \
//      A   Y      --->      X   C
//         / \              / \
//        B   C            A   B
//
// Only links change. Colors belong to the callers.

use crate::node::{NodeId, Side};
use crate::RbTree;

impl<K, V> RbTree<K, V> {
    /// Rotates at `x` so that `x` moves down on side `dir`.
    ///
    /// The pivot is `x`'s child opposite `dir`; without one this is a no-op.
    pub(crate) fn rotate(&mut self, x: NodeId, dir: Side) {
        let y = self.nodes.child(x, dir.opposite());
        if y.is_sentinel() {
            return;
        }

        let inner = self.nodes.child(y, dir);
        self.nodes.set_child(x, dir.opposite(), inner);
        if !inner.is_sentinel() {
            self.nodes[inner].parent = x;
        }

        let parent = self.nodes[x].parent;
        self.nodes[y].parent = parent;
        if parent.is_sentinel() {
            log::trace!("rotation at root {x:?}, new root {y:?}");
            self.root = y;
        } else if self.nodes[parent].left == x {
            self.nodes[parent].left = y;
        } else {
            self.nodes[parent].right = y;
        }

        self.nodes.set_child(y, dir, x);
        self.nodes[x].parent = y;
    }
}
