// =============================================================================
// Node arena
// =============================================================================
//
// Every node lives in one `Vec`. Slot 0 is the sentinel: BLACK, entry-less,
// standing in for every missing child and for the root's parent. Links are
// `NodeId` indices into the same vector, so parent back-references never own
// anything and rotations are plain index rewrites.
//
// Slots released by removal go on a free list and are reused by later inserts.

use std::ops::{Index, IndexMut};

/// Node color.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Color {
    Red,
    Black,
}

/// Which child link of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Side {
    Left,
    Right,
}

impl Side {
    #[inline]
    pub(crate) fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// Index of a slot in the node arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NodeId(u32);

impl NodeId {
    pub(crate) const SENTINEL: NodeId = NodeId(0);

    #[inline]
    pub(crate) fn is_sentinel(self) -> bool {
        self == Self::SENTINEL
    }

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Node<K, V> {
    /// `None` for the sentinel and for vacant slots.
    pub(crate) entry: Option<(K, V)>,
    pub(crate) color: Color,
    pub(crate) left: NodeId,
    pub(crate) right: NodeId,
    pub(crate) parent: NodeId,
}

impl<K, V> Node<K, V> {
    fn vacant() -> Self {
        Self {
            entry: None,
            color: Color::Black,
            left: NodeId::SENTINEL,
            right: NodeId::SENTINEL,
            parent: NodeId::SENTINEL,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NodeArena<K, V> {
    slots: Vec<Node<K, V>>,
    free: Vec<NodeId>,
}

impl<K, V> NodeArena<K, V> {
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        let mut slots = Vec::with_capacity(capacity.saturating_add(1));
        slots.push(Node::vacant());
        Self {
            slots,
            free: Vec::new(),
        }
    }

    /// Creates a RED node with sentinel children under `parent`.
    pub(crate) fn alloc(&mut self, key: K, value: V, parent: NodeId) -> NodeId {
        let node = Node {
            entry: Some((key, value)),
            color: Color::Red,
            left: NodeId::SENTINEL,
            right: NodeId::SENTINEL,
            parent,
        };
        if let Some(id) = self.free.pop() {
            log::trace!("reusing vacant slot {id:?}");
            self.slots[id.index()] = node;
            return id;
        }
        let id = NodeId(u32::try_from(self.slots.len()).expect("node arena exceeds u32 slots"));
        self.slots.push(node);
        id
    }

    /// Vacates a detached slot and hands back its entry.
    pub(crate) fn release(&mut self, id: NodeId) -> (K, V) {
        debug_assert!(!id.is_sentinel());
        let node = std::mem::replace(&mut self.slots[id.index()], Node::vacant());
        self.free.push(id);
        node.entry.expect("released slot must hold an entry")
    }

    pub(crate) fn clear(&mut self) {
        self.slots.truncate(1);
        self.slots[0] = Node::vacant();
        self.free.clear();
    }

    /// Bytes reserved by the slot vector and the free list.
    pub(crate) fn capacity(&self) -> usize {
        self.slots.capacity() * std::mem::size_of::<Node<K, V>>()
            + self.free.capacity() * std::mem::size_of::<NodeId>()
    }

    /// Drops trailing vacant slots and releases spare capacity.
    pub(crate) fn shrink_to_fit(&mut self) {
        while self.slots.len() > 1 && self.slots.last().is_some_and(|n| n.entry.is_none()) {
            self.slots.pop();
        }
        let len = self.slots.len();
        self.free.retain(|id| id.index() < len);
        self.slots.shrink_to_fit();
        self.free.shrink_to_fit();
    }

    /// Slots in use, including the sentinel and vacant ones.
    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn vacant_count(&self) -> usize {
        self.free.len()
    }

    #[inline]
    pub(crate) fn key(&self, id: NodeId) -> &K {
        &self.entry(id).0
    }

    #[inline]
    pub(crate) fn entry(&self, id: NodeId) -> &(K, V) {
        self.slots[id.index()]
            .entry
            .as_ref()
            .expect("live node must hold an entry")
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, id: NodeId) -> &mut (K, V) {
        self.slots[id.index()]
            .entry
            .as_mut()
            .expect("live node must hold an entry")
    }

    #[inline]
    pub(crate) fn color(&self, id: NodeId) -> Color {
        self.slots[id.index()].color
    }

    #[inline]
    pub(crate) fn is_red(&self, id: NodeId) -> bool {
        self.color(id) == Color::Red
    }

    #[inline]
    pub(crate) fn child(&self, id: NodeId, side: Side) -> NodeId {
        let node = &self.slots[id.index()];
        match side {
            Side::Left => node.left,
            Side::Right => node.right,
        }
    }

    #[inline]
    pub(crate) fn set_child(&mut self, id: NodeId, side: Side, child: NodeId) {
        let node = &mut self.slots[id.index()];
        match side {
            Side::Left => node.left = child,
            Side::Right => node.right = child,
        }
    }

    /// Side of its parent on which `id` hangs.
    ///
    /// For the sentinel this relies on `parent` having been pointed at the
    /// spliced node's parent, and answers `Left` when that parent's left link
    /// is the sentinel.
    #[inline]
    pub(crate) fn side_of(&self, id: NodeId) -> Side {
        let parent = self.slots[id.index()].parent;
        if self.slots[parent.index()].left == id {
            Side::Left
        } else {
            Side::Right
        }
    }
}

impl<K, V> Index<NodeId> for NodeArena<K, V> {
    type Output = Node<K, V>;

    #[inline]
    fn index(&self, id: NodeId) -> &Node<K, V> {
        &self.slots[id.index()]
    }
}

impl<K, V> IndexMut<NodeId> for NodeArena<K, V> {
    #[inline]
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        &mut self.slots[id.index()]
    }
}
