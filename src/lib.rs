//! # rbt-rs
//!
//! An ordered map backed by a red-black tree.
//!
//! Search, insert, update and remove are O(log n) in the worst case, and
//! iteration visits entries in ascending key order. Nodes live in a single
//! arena and link to each other by index, with slot 0 reserved as the shared
//! BLACK sentinel that terminates every path.
//!
//! ## Example
//!
//! ```rust
//! use rbt_rs::RbTree;
//!
//! let mut tree: RbTree<i32, &str> = RbTree::new();
//! tree.insert(1, "one").unwrap();
//! tree.insert(-1, "minus one").unwrap();
//! assert!(tree.insert(1, "uno").is_err());
//!
//! assert_eq!(tree.get(&1), Some(&"one"));
//! assert_eq!(tree.min(), Some((&-1, &"minus one")));
//!
//! let removed = tree.remove(&1).unwrap();
//! assert_eq!(removed.key(), &1);
//! assert_eq!(tree.len(), 1);
//! ```

#![forbid(unsafe_code)]

use std::borrow::Borrow;
use std::cmp::Ordering;
use std::fmt;
use std::iter::FusedIterator;

mod error;
mod insert;
mod node;
mod remove;
mod rotate;

pub use error::{Error, Result};
pub use node::Color;

use node::{NodeArena, NodeId};

// =============================================================================
// Removal receipt
// =============================================================================

/// An entry detached from the tree by [`RbTree::remove`].
///
/// Owns its key and value; nothing in it refers back into the tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Entry<K, V> {
    key: K,
    value: V,
    color: Color,
}

impl<K, V> Entry<K, V> {
    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    /// Color the entry's node had before removal.
    pub fn color(&self) -> Color {
        self.color
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

// =============================================================================
// RbTree
// =============================================================================

/// An ordered map with worst-case logarithmic operations.
///
/// Keys are unique. [`insert`](Self::insert) never overwrites; replacing a
/// value goes through [`update`](Self::update) or [`get_mut`](Self::get_mut).
///
/// Not internally synchronized. Share across threads behind the caller's own
/// lock.
#[derive(Clone)]
pub struct RbTree<K, V> {
    nodes: NodeArena<K, V>,
    root: NodeId,
    count: usize,
}

impl<K, V> RbTree<K, V> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty tree with room for `capacity` entries before the node
    /// arena reallocates.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            nodes: NodeArena::with_capacity(capacity),
            root: NodeId::SENTINEL,
            count: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn clear(&mut self) {
        log::debug!("clearing {} entries", self.count);
        self.nodes.clear();
        self.root = NodeId::SENTINEL;
        self.count = 0;
    }

    /// Bytes reserved by the node arena.
    pub fn memory_usage(&self) -> usize {
        self.nodes.capacity()
    }

    pub fn shrink_to_fit(&mut self) {
        let before = self.nodes.capacity();
        self.nodes.shrink_to_fit();
        log::debug!(
            "shrink_to_fit: {} -> {} bytes",
            before,
            self.nodes.capacity()
        );
    }

    /// Entry with the smallest key.
    pub fn min(&self) -> Option<(&K, &V)> {
        self.entry_at(self.min_from(self.root))
    }

    /// Entry with the largest key.
    pub fn max(&self) -> Option<(&K, &V)> {
        self.entry_at(self.max_from(self.root))
    }

    /// Calls `visit` on every entry in ascending key order.
    pub fn range<F>(&self, mut visit: F)
    where
        F: FnMut(&K, &V),
    {
        for (k, v) in self.iter() {
            visit(k, v);
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            tree: self,
            front: self.min_from(self.root),
            back: self.max_from(self.root),
            remaining: self.count,
        }
    }

    fn entry_at(&self, id: NodeId) -> Option<(&K, &V)> {
        if id.is_sentinel() {
            return None;
        }
        let (k, v) = self.nodes.entry(id);
        Some((k, v))
    }

    /// Leftmost node under `id`, or the sentinel if `id` is the sentinel.
    fn min_from(&self, mut id: NodeId) -> NodeId {
        if id.is_sentinel() {
            return id;
        }
        while !self.nodes[id].left.is_sentinel() {
            id = self.nodes[id].left;
        }
        id
    }

    fn max_from(&self, mut id: NodeId) -> NodeId {
        if id.is_sentinel() {
            return id;
        }
        while !self.nodes[id].right.is_sentinel() {
            id = self.nodes[id].right;
        }
        id
    }

    /// Next node in key order, or the sentinel after the maximum.
    pub(crate) fn successor(&self, mut x: NodeId) -> NodeId {
        if x.is_sentinel() {
            return x;
        }
        if !self.nodes[x].right.is_sentinel() {
            return self.min_from(self.nodes[x].right);
        }
        let mut y = self.nodes[x].parent;
        while !y.is_sentinel() && x == self.nodes[y].right {
            x = y;
            y = self.nodes[y].parent;
        }
        y
    }

    /// Previous node in key order, or the sentinel before the minimum.
    pub(crate) fn predecessor(&self, mut x: NodeId) -> NodeId {
        if x.is_sentinel() {
            return x;
        }
        if !self.nodes[x].left.is_sentinel() {
            return self.max_from(self.nodes[x].left);
        }
        let mut y = self.nodes[x].parent;
        while !y.is_sentinel() && x == self.nodes[y].left {
            x = y;
            y = self.nodes[y].parent;
        }
        y
    }

    #[cfg(test)]
    pub(crate) fn iter_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        let first = self.min_from(self.root);
        std::iter::successors((!first.is_sentinel()).then_some(first), move |&id| {
            let next = self.successor(id);
            (!next.is_sentinel()).then_some(next)
        })
    }
}

impl<K: Ord, V> RbTree<K, V> {
    /// Descends from the root; the sentinel when `key` is absent.
    fn find<Q>(&self, key: &Q) -> NodeId
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut curr = self.root;
        while !curr.is_sentinel() {
            curr = match self.nodes.key(curr).borrow().cmp(key) {
                Ordering::Less => self.nodes[curr].right,
                Ordering::Greater => self.nodes[curr].left,
                Ordering::Equal => return curr,
            };
        }
        NodeId::SENTINEL
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entry_at(self.find(key)).map(|(_, v)| v)
    }

    pub fn get_key_value<Q>(&self, key: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.entry_at(self.find(key))
    }

    /// Mutable access to a value. Keys, links and colors stay as they are.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let id = self.find(key);
        if id.is_sentinel() {
            return None;
        }
        Some(&mut self.nodes.entry_mut(id).1)
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        !self.find(key).is_sentinel()
    }

    /// Replaces the value stored under `key` and returns the previous one.
    ///
    /// Fails with [`Error::KeyNotFound`] if the key is absent. Never changes
    /// the tree's shape or colors.
    pub fn update<Q>(&mut self, key: &Q, value: V) -> Result<V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key)
            .map(|slot| std::mem::replace(slot, value))
            .ok_or(Error::KeyNotFound)
    }
}

impl<K, V> Default for RbTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for RbTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

impl<K: PartialEq, V: PartialEq> PartialEq for RbTree<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl<K: Eq, V: Eq> Eq for RbTree<K, V> {}

/// Later duplicates of a key are dropped, as with [`RbTree::insert`].
impl<K: Ord, V> Extend<(K, V)> for RbTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            if self.insert(k, v).is_err() {
                log::trace!("extend: skipped duplicate key");
            }
        }
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for RbTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<'a, K, V> IntoIterator for &'a RbTree<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

// =============================================================================
// Iteration
// =============================================================================

/// In-order iterator over a tree's entries.
///
/// Walks successor/predecessor links, so it holds no stack of its own.
pub struct Iter<'a, K, V> {
    tree: &'a RbTree<K, V>,
    front: NodeId,
    back: NodeId,
    remaining: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        let id = self.front;
        self.front = self.tree.successor(id);
        self.remaining -= 1;
        self.tree.entry_at(id)
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
        let id = self.back;
        self.back = self.tree.predecessor(id);
        self.remaining -= 1;
        self.tree.entry_at(id)
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

impl<K, V> Clone for Iter<'_, K, V> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            front: self.front,
            back: self.back,
            remaining: self.remaining,
        }
    }
}

#[cfg(test)]
pub(crate) fn init_test_logging() {
    let _ = simplelog::TestLogger::init(
        simplelog::LevelFilter::Debug,
        simplelog::Config::default(),
    );
}


#[cfg(test)]
mod proptests;
