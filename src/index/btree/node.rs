//! B-tree node and the structural primitives the tree algorithms are built on.
//!
//! A [`Node`] owns its keys and, if internal, one more child than it has keys.
//! Every primitive here touches at most one parent and two adjacent children,
//! so the tree-level algorithms can keep each node legal before recursing
//! into it.
//!
//! # Layout
//! ```text
//!              keys:      [ k0    k1    k2 ]
//!              children: [c0]  [c1]  [c2]  [c3]
//!
//!   every key in c0 <= k0 <= every key in c1 <= k1 <= ...
//! ```

use std::mem;

use tracing::trace;

/// A node in the tree.
///
/// A node is a leaf iff it has no children. Occupancy bounds come from the
/// tree-wide minimum degree `t` stored in every node:
/// - non-root nodes hold `t - 1 ..= 2t - 1` keys
/// - the root holds `0 ..= 2t - 1` keys
pub(crate) struct Node<K> {
    /// Keys in non-decreasing order.
    pub(super) keys: Vec<K>,

    /// Owned children; empty for a leaf, `keys.len() + 1` otherwise.
    pub(super) children: Vec<Node<K>>,

    /// The tree-wide minimum degree `t`.
    pub(super) min_degree: usize,
}

impl<K> Node<K> {
    /// Create a leaf holding `keys` (already sorted).
    pub(super) fn new_leaf(min_degree: usize, keys: Vec<K>) -> Self {
        Self {
            keys,
            children: Vec::new(),
            min_degree,
        }
    }

    /// Create an internal node from sorted keys and their `keys.len() + 1`
    /// children.
    pub(super) fn new_internal(min_degree: usize, keys: Vec<K>, children: Vec<Node<K>>) -> Self {
        debug_assert_eq!(children.len(), keys.len() + 1);
        Self {
            keys,
            children,
            min_degree,
        }
    }

    // ========================================================================
    // Occupancy
    // ========================================================================

    #[inline]
    pub(super) fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub(super) fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Capacity of this node: `2t - 1` keys.
    #[inline]
    pub(super) fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// True if the node holds `2t - 1` keys and must be split before an
    /// insertion may descend into it.
    #[inline]
    pub(super) fn is_full(&self) -> bool {
        self.keys.len() >= self.max_keys()
    }

    /// True if the node holds at least `t` keys and can therefore lose one
    /// without dropping below the floor.
    #[inline]
    pub(super) fn has_spare(&self) -> bool {
        self.keys.len() >= self.min_degree
    }

    // ========================================================================
    // Single-node mutators
    // ========================================================================

    /// Overwrite `keys[index]`, returning the previous key.
    ///
    /// The caller guarantees the new key keeps the node and its subtrees in
    /// order (a predecessor, successor, or rotated sibling key).
    pub(super) fn replace_key(&mut self, index: usize, key: K) -> K {
        mem::replace(&mut self.keys[index], key)
    }

    /// Append a key and, for an internal node, its right-hand child.
    pub(super) fn push_back(&mut self, key: K, child: Option<Node<K>>) {
        debug_assert_eq!(child.is_some(), !self.is_leaf());
        self.keys.push(key);
        if let Some(child) = child {
            self.children.push(child);
        }
    }

    /// Prepend a key and, for an internal node, its left-hand child.
    pub(super) fn push_front(&mut self, key: K, child: Option<Node<K>>) {
        debug_assert_eq!(child.is_some(), !self.is_leaf());
        self.keys.insert(0, key);
        if let Some(child) = child {
            self.children.insert(0, child);
        }
    }

    /// Remove the first key and, for an internal node, the first child.
    ///
    /// # Panics
    /// Panics if the node has no keys.
    pub(super) fn pop_front(&mut self) -> (K, Option<Node<K>>) {
        let key = self.keys.remove(0);
        let child = (!self.is_leaf()).then(|| self.children.remove(0));
        (key, child)
    }

    /// Remove the last key and, for an internal node, the last child.
    ///
    /// # Panics
    /// Panics if the node has no keys.
    pub(super) fn pop_back(&mut self) -> (K, Option<Node<K>>) {
        let last = self.keys.len() - 1;
        let key = self.keys.remove(last);
        let child = self.children.pop();
        (key, child)
    }

    // ========================================================================
    // Split / merge
    // ========================================================================

    /// Split a full node around its median.
    ///
    /// `self` keeps the lower half; the median and the new upper-half node
    /// are returned.
    fn split(&mut self) -> (K, Node<K>) {
        debug_assert!(self.is_full());
        let mid = self.keys.len() / 2;

        let right_keys = self.keys.split_off(mid + 1);
        let median = self.keys.remove(mid);
        let right_children = if self.is_leaf() {
            Vec::new()
        } else {
            self.children.split_off(mid + 1)
        };

        let right = Node {
            keys: right_keys,
            children: right_children,
            min_degree: self.min_degree,
        };
        (median, right)
    }

    /// Split the full child at `index`, pulling its median up into `self`.
    ///
    /// ```text
    ///      [10      30]                [10   20    30]
    ///    [..] [15 20 25] [..]   =>   [..] [15] [25] [..]
    /// ```
    ///
    /// `self` must not be full. Afterwards neither half is full and `self`
    /// has gained one key and one child.
    pub(super) fn split_child(&mut self, index: usize) {
        debug_assert!(!self.is_full());
        debug_assert!(self.children[index].is_full());

        let (median, right) = self.children[index].split();
        self.keys.insert(index, median);
        self.children.insert(index + 1, right);

        trace!(index, keys = self.keys.len(), "split child");
    }

    /// Split a full root, returning the new root.
    ///
    /// The new root holds only the median and has the two halves as its
    /// children, so the tree grows by one level.
    pub(super) fn split_root(mut self) -> Node<K> {
        let min_degree = self.min_degree;
        let (median, right) = self.split();
        Node::new_internal(min_degree, vec![median], vec![self, right])
    }

    /// Merge `children[index]`, `keys[index]` and `children[index + 1]` into
    /// a single child at `index` (push-down).
    ///
    /// ```text
    ///       [3     6     9]                [3          9]
    ///   [1 2] [4 5] [7 8] [10 11]  =>  [1 2] [4 5 6 7 8] [10 11]
    /// ```
    ///
    /// Both children are expected to sit at the `t - 1` floor, so the merged
    /// node ends up exactly full. `self` loses one key and one child.
    pub(super) fn merge_children(&mut self, index: usize) {
        debug_assert!(index + 1 < self.children.len());

        let right = self.children.remove(index + 1);
        let separator = self.keys.remove(index);

        let left = &mut self.children[index];
        left.keys.push(separator);
        left.keys.extend(right.keys);
        left.children.extend(right.children);

        debug_assert!(left.keys.len() <= left.max_keys());
        trace!(index, merged = left.keys.len(), "merged children");
    }

    /// Consume a key-less root and return its only child, if any.
    pub(super) fn into_sole_child(self) -> Option<Node<K>> {
        debug_assert!(self.keys.is_empty());
        debug_assert!(self.children.len() <= 1);
        self.children.into_iter().next()
    }

    // ========================================================================
    // Subtree extremes
    // ========================================================================

    /// Smallest key in this subtree (follows leftmost children).
    pub(super) fn min_key(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.first() {
            node = child;
        }
        node.keys.first()
    }

    /// Largest key in this subtree (follows rightmost children).
    pub(super) fn max_key(&self) -> Option<&K> {
        let mut node = self;
        while let Some(child) = node.children.last() {
            node = child;
        }
        node.keys.last()
    }

    /// Number of levels from this node down to its leaves.
    pub(super) fn height(&self) -> usize {
        let mut node = self;
        let mut height = 1;
        while let Some(child) = node.children.first() {
            node = child;
            height += 1;
        }
        height
    }

    /// Move every key of this subtree into `out` in order.
    pub(super) fn drain_into(self, out: &mut Vec<K>) {
        if self.children.is_empty() {
            out.extend(self.keys);
            return;
        }

        let mut keys = self.keys.into_iter();
        for child in self.children {
            child.drain_into(out);
            if let Some(key) = keys.next() {
                out.push(key);
            }
        }
    }
}

impl<K: Ord> Node<K> {
    /// Index of the first key equal to `key`, if any.
    pub(super) fn position_of(&self, key: &K) -> Option<usize> {
        let index = self.child_index_for(key);
        (index < self.keys.len() && self.keys[index] == *key).then_some(index)
    }

    /// Index of the child whose subtree may hold `key` when `key` is not
    /// one of this node's keys.
    #[inline]
    pub(super) fn child_index_for(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k < key)
    }

    /// Position at which a new `key` goes: after every key `<= key`, so
    /// equal keys keep insertion order.
    #[inline]
    pub(super) fn insert_index_for(&self, key: &K) -> usize {
        self.keys.partition_point(|k| k <= key)
    }

    /// Insert `key` into a non-full leaf, keeping keys ordered.
    pub(super) fn insert_into_leaf(&mut self, key: K) {
        debug_assert!(self.is_leaf());
        debug_assert!(!self.is_full());

        let index = self.insert_index_for(&key);
        self.keys.insert(index, key);
    }

    /// Remove the first key equal to `key` from a leaf.
    pub(super) fn delete_from_leaf(&mut self, key: &K) -> Option<K> {
        debug_assert!(self.is_leaf());
        self.position_of(key).map(|index| self.keys.remove(index))
    }
}
