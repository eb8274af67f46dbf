//! The B-tree and its top-down insertion and deletion algorithms.

use std::fmt;

use tracing::{debug, trace};

use crate::common::{BTreeConfig, Error, Result};

use super::iter::{IntoIter, Iter};
use super::node::Node;
use super::stats::BTreeStats;
use super::validate::validate_tree;

/// An in-memory B-tree of ordered keys.
///
/// # Rebalancing
/// Every mutation walks from the root to a leaf and fixes each node
/// *before* recursing into it, so nothing is ever propagated back up:
/// - insertion splits any full node on the path (the root first)
/// - deletion makes sure each node it enters holds at least `t` keys,
///   borrowing from a sibling or merging with one when it does not
///
/// ```text
///                 insert: never enter a full node
///   [root] ───────────────────────────────────────▶ [leaf]
///                 remove: never enter a node with t-1 keys
/// ```
///
/// # Duplicates
/// The tree is a multiset. Equal keys are kept in insertion order; `remove`
/// takes out one of them.
///
/// # Thread Safety
/// Not synchronized. Wrap it in [`SharedBTree`](crate::SharedBTree) (or any
/// lock) for shared access.
///
/// # Example
/// ```
/// use interchange_btree::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for key in [5, 1, 4, 2, 3] {
///     tree.insert(key);
/// }
///
/// assert_eq!(tree.len(), 5);
/// assert!(tree.contains(&4));
/// assert!(tree.remove(&4));
/// assert!(!tree.remove(&4));
/// assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![1, 2, 3, 5]);
/// ```
pub struct BTree<K> {
    /// `None` iff the tree is empty.
    root: Option<Node<K>>,

    /// Number of stored keys.
    len: usize,

    config: BTreeConfig,

    stats: BTreeStats,
}

impl<K> BTree<K> {
    /// Create an empty tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree` is outside
    ///   `2..=MAX_MIN_DEGREE`
    pub fn new(min_degree: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new(min_degree))
    }

    /// Create an empty tree from a config.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if the config's degree is out of range
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            root: None,
            len: 0,
            config,
            stats: BTreeStats::new(),
        })
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    /// Number of keys in the tree. O(1).
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The minimum degree `t` the tree was built with.
    #[inline]
    pub fn min_degree(&self) -> usize {
        self.config.min_degree
    }

    #[inline]
    pub fn config(&self) -> &BTreeConfig {
        &self.config
    }

    /// Rebalancing counters since construction or the last reset.
    #[inline]
    pub fn stats(&self) -> BTreeStats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats.reset();
    }

    /// Number of levels; 0 for an empty tree, 1 for a single leaf.
    pub fn height(&self) -> usize {
        self.root.as_ref().map_or(0, Node::height)
    }

    /// Smallest key, if any.
    pub fn first(&self) -> Option<&K> {
        self.root.as_ref().and_then(Node::min_key)
    }

    /// Largest key, if any.
    pub fn last(&self) -> Option<&K> {
        self.root.as_ref().and_then(Node::max_key)
    }

    /// Iterate over all keys in ascending order.
    pub fn iter(&self) -> Iter<'_, K> {
        Iter::new(self.root.as_ref(), self.len)
    }

    /// Drop every key. The degree and statistics are kept.
    pub fn clear(&mut self) {
        if self.root.take().is_some() {
            debug!(dropped = self.len, "cleared tree");
        }
        self.len = 0;
    }

    /// Copy every key, in ascending order, into `dest` starting at `start`.
    ///
    /// Capacity is checked up front, so on error nothing is written. An
    /// empty tree writes nothing and succeeds for any `start`.
    ///
    /// # Errors
    /// - `Error::InsufficientCapacity` if `dest[start..]` cannot hold
    ///   `len()` keys
    pub fn copy_to(&self, dest: &mut [K], start: usize) -> Result<()>
    where
        K: Clone,
    {
        if self.len == 0 {
            return Ok(());
        }

        let available = dest.len().saturating_sub(start);
        if available < self.len {
            return Err(Error::InsufficientCapacity {
                needed: self.len,
                available,
            });
        }

        for (slot, key) in dest[start..].iter_mut().zip(self.iter()) {
            *slot = key.clone();
        }
        Ok(())
    }

    /// Render the node structure, one node per line, indented by depth.
    ///
    /// ```text
    /// [2]
    ///   [1]
    ///   [3, 4]
    /// ```
    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
    {
        let mut out = String::new();
        if let Some(root) = &self.root {
            dump_node(root, 0, &mut out);
        }
        out
    }
}

impl<K: Ord> BTree<K> {
    /// Insert `key`. Always succeeds; duplicates are kept.
    pub fn insert(&mut self, key: K) {
        let root = match self.root.take() {
            None => Node::new_leaf(self.config.min_degree, vec![key]),
            Some(root) => {
                let mut root = if root.is_full() {
                    self.stats.root_splits += 1;
                    debug!(len = self.len, "split full root");
                    root.split_root()
                } else {
                    root
                };
                insert_non_full(&mut root, key, &mut self.stats);
                root
            }
        };

        self.root = Some(root);
        self.len += 1;
        self.check_invariants();
    }

    /// Remove one key equal to `key`. Returns whether one was found.
    pub fn remove(&mut self, key: &K) -> bool {
        self.take(key).is_some()
    }

    /// Remove one key equal to `key` and return it.
    pub fn take(&mut self, key: &K) -> Option<K> {
        let removed = match self.root.as_mut() {
            Some(root) => remove_from(root, key, &mut self.stats),
            None => return None,
        };

        if removed.is_some() {
            self.len -= 1;
        }
        self.shrink_root();
        self.check_invariants();

        removed
    }

    /// True iff a key equal to `key` is stored.
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Return a stored key equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        let mut node = self.root.as_ref()?;
        loop {
            let index = node.child_index_for(key);
            if index < node.keys.len() && node.keys[index] == *key {
                return Some(&node.keys[index]);
            }
            node = node.children.get(index)?;
        }
    }

    /// Check every structural invariant.
    ///
    /// # Errors
    /// - `Error::InvariantViolation` describing the first broken invariant
    pub fn validate(&self) -> Result<()> {
        validate_tree(self.root.as_ref(), self.len, self.config.min_degree)
    }

    /// Clear the root if the tree is empty, or replace a key-less root with
    /// its only child.
    fn shrink_root(&mut self) {
        if self.len == 0 {
            self.root = None;
            return;
        }

        match self.root.take() {
            Some(root) if root.keys.is_empty() => {
                self.root = root.into_sole_child();
                self.stats.root_collapses += 1;
                debug!(len = self.len, "collapsed empty root");
            }
            other => self.root = other,
        }
    }

    #[cfg(all(debug_assertions, feature = "invariant-checks"))]
    fn check_invariants(&self) {
        if let Err(err) = self.validate() {
            panic!("{}", err);
        }
    }

    #[cfg(not(all(debug_assertions, feature = "invariant-checks")))]
    #[inline]
    fn check_invariants(&self) {}
}

// ============================================================================
// Insertion
// ============================================================================

/// Insert into the subtree at `node`, which must not be full.
fn insert_non_full<K: Ord>(node: &mut Node<K>, key: K, stats: &mut BTreeStats) {
    if node.is_leaf() {
        node.insert_into_leaf(key);
        return;
    }

    let mut index = node.insert_index_for(&key);
    if node.children[index].is_full() {
        node.split_child(index);
        stats.child_splits += 1;

        // The promoted median now separates the two halves.
        if node.keys[index] <= key {
            index += 1;
        }
    }
    insert_non_full(&mut node.children[index], key, stats);
}

// ============================================================================
// Deletion
// ============================================================================

/// Remove one key equal to `key` from the subtree at `node`.
///
/// `node` holds at least `t` keys unless it is the root.
fn remove_from<K: Ord>(node: &mut Node<K>, key: &K, stats: &mut BTreeStats) -> Option<K> {
    if node.is_leaf() {
        return node.delete_from_leaf(key);
    }

    if let Some(index) = node.position_of(key) {
        if node.children[index].has_spare() {
            let predecessor = pop_max(&mut node.children[index], stats);
            return Some(node.replace_key(index, predecessor));
        }
        if node.children[index + 1].has_spare() {
            let successor = pop_min(&mut node.children[index + 1], stats);
            return Some(node.replace_key(index, successor));
        }

        node.merge_children(index);
        stats.merges += 1;
        return remove_from(&mut node.children[index], key, stats);
    }

    let index = node.child_index_for(key);
    let index = fill_child(node, index, stats);
    remove_from(&mut node.children[index], key, stats)
}

/// Remove and return the largest key of a subtree holding at least `t` keys.
fn pop_max<K>(node: &mut Node<K>, stats: &mut BTreeStats) -> K {
    if node.is_leaf() {
        return node.pop_back().0;
    }
    let last = node.children.len() - 1;
    let index = fill_child(node, last, stats);
    pop_max(&mut node.children[index], stats)
}

/// Remove and return the smallest key of a subtree holding at least `t` keys.
fn pop_min<K>(node: &mut Node<K>, stats: &mut BTreeStats) -> K {
    if node.is_leaf() {
        return node.pop_front().0;
    }
    let index = fill_child(node, 0, stats);
    pop_min(&mut node.children[index], stats)
}

/// Make sure `children[index]` holds at least `t` keys before descending.
///
/// Borrows through the parent from the fuller adjacent sibling when it has a
/// key to spare, otherwise merges with it. Returns the index of the child to
/// descend into, which moves left by one after merging with a left sibling.
fn fill_child<K>(node: &mut Node<K>, index: usize, stats: &mut BTreeStats) -> usize {
    if node.children[index].has_spare() {
        return index;
    }

    let left = index.checked_sub(1);
    let right = (index + 1 < node.children.len()).then_some(index + 1);
    let sibling = match (left, right) {
        (Some(l), Some(r)) => {
            if node.children[l].len() > node.children[r].len() {
                l
            } else {
                r
            }
        }
        (Some(l), None) => l,
        (None, Some(r)) => r,
        // Only a key-less root has a single child, and those are collapsed.
        (None, None) => unreachable!("internal node with a single child"),
    };

    if node.children[sibling].has_spare() {
        if sibling > index {
            rotate_from_right(node, index);
        } else {
            rotate_from_left(node, index);
        }
        stats.rotations += 1;
        index
    } else {
        let merged = index.min(sibling);
        node.merge_children(merged);
        stats.merges += 1;
        merged
    }
}

/// Move the right sibling's first key up into the parent and the old
/// separator down to the end of `children[index]`.
///
/// ```text
///     [6     10]             [7    10]
///   [1] [7 8 9] [11]  =>  [1 6] [8 9] [11]
/// ```
fn rotate_from_right<K>(node: &mut Node<K>, index: usize) {
    let (key, child) = node.children[index + 1].pop_front();
    let separator = node.replace_key(index, key);
    node.children[index].push_back(separator, child);
    trace!(index, "rotated key from right sibling");
}

/// Move the left sibling's last key up into the parent and the old
/// separator down to the front of `children[index]`.
///
/// ```text
///     [6      10]             [6    9]
///   [1] [7 8 9] [11]  =>  [1] [7 8] [10 11]
/// ```
fn rotate_from_left<K>(node: &mut Node<K>, index: usize) {
    let (key, child) = node.children[index - 1].pop_back();
    let separator = node.replace_key(index - 1, key);
    node.children[index].push_front(separator, child);
    trace!(index, "rotated key from left sibling");
}

fn dump_node<K: fmt::Debug>(node: &Node<K>, depth: usize, out: &mut String) {
    out.push_str(&format!("{}{:?}\n", "  ".repeat(depth), node.keys));
    for child in &node.children {
        dump_node(child, depth + 1, out);
    }
}

// ============================================================================
// Trait impls
// ============================================================================

impl<K> Default for BTree<K> {
    fn default() -> Self {
        Self {
            root: None,
            len: 0,
            config: BTreeConfig::default(),
            stats: BTreeStats::new(),
        }
    }
}

impl<K: fmt::Debug> fmt::Debug for BTree<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Ord> FromIterator<K> for BTree<K> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut tree = Self::default();
        tree.extend(iter);
        tree
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Iter<'a, K> {
        self.iter()
    }
}

impl<K> IntoIterator for BTree<K> {
    type Item = K;
    type IntoIter = IntoIter<K>;

    fn into_iter(self) -> IntoIter<K> {
        IntoIter::new(self.root, self.len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_of(min_degree: usize, keys: impl IntoIterator<Item = i32>) -> BTree<i32> {
        let mut tree = BTree::new(min_degree).unwrap();
        tree.extend(keys);
        tree
    }

    fn root_keys(tree: &BTree<i32>) -> Vec<i32> {
        tree.root.as_ref().map(|r| r.keys.clone()).unwrap_or_default()
    }

    fn child_keys(tree: &BTree<i32>) -> Vec<Vec<i32>> {
        tree.root
            .as_ref()
            .map(|r| r.children.iter().map(|c| c.keys.clone()).collect())
            .unwrap_or_default()
    }

    fn keys(tree: &BTree<i32>) -> Vec<i32> {
        tree.iter().copied().collect()
    }

    #[test]
    fn test_rejects_invalid_degree() {
        assert_eq!(BTree::<i32>::new(1).unwrap_err(), Error::InvalidMinDegree(1));
        assert!(BTree::<i32>::new(0).is_err());
        assert!(BTree::<i32>::new(2).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let mut tree = BTree::<i32>::new(2).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.height(), 0);
        assert!(!tree.contains(&1));
        assert!(!tree.remove(&1));
        assert_eq!(tree.first(), None);
        assert_eq!(tree.iter().next(), None);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let tree = tree_of(2, [7]);
        assert_eq!(root_keys(&tree), vec![7]);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_root_split_on_fourth_insert() {
        let tree = tree_of(2, [1, 2, 3]);
        assert_eq!(root_keys(&tree), vec![1, 2, 3]);
        assert_eq!(tree.stats().root_splits, 0);

        let tree = tree_of(2, [1, 2, 3, 4]);
        assert_eq!(root_keys(&tree), vec![2]);
        assert_eq!(child_keys(&tree), vec![vec![1], vec![3, 4]]);
        assert_eq!(tree.stats().root_splits, 1);
        assert_eq!(tree.height(), 2);
    }

    #[test]
    fn test_child_split_redirects_to_right_half() {
        // [2] / [1] [3 4 5]: inserting 6 splits [3 4 5] around 4.
        let tree = tree_of(2, [1, 2, 3, 4, 5, 6]);
        assert_eq!(root_keys(&tree), vec![2, 4]);
        assert_eq!(child_keys(&tree), vec![vec![1], vec![3], vec![5, 6]]);
        assert_eq!(tree.stats().child_splits, 1);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_remove_rotates_from_right() {
        let mut tree = tree_of(2, [1, 2, 3, 4, 5]);
        assert!(tree.remove(&1));

        assert_eq!(root_keys(&tree), vec![3]);
        assert_eq!(child_keys(&tree), vec![vec![2], vec![4, 5]]);
        assert_eq!(tree.stats().rotations, 1);
        assert_eq!(tree.len(), 4);
    }

    #[test]
    fn test_remove_rotates_from_left() {
        // [4] / [1 2 3] [5]
        let mut tree = tree_of(2, [4, 5, 1, 2, 3]);
        assert_eq!(root_keys(&tree), vec![4]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2, 3], vec![5]]);

        assert!(tree.remove(&5));
        assert_eq!(root_keys(&tree), vec![3]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4]]);
        assert_eq!(tree.stats().rotations, 1);
    }

    #[test]
    fn test_remove_internal_key_uses_predecessor() {
        // [3] / [1 2] [4]
        let mut tree = tree_of(2, [1, 3, 4, 2]);
        assert_eq!(root_keys(&tree), vec![3]);
        assert_eq!(child_keys(&tree), vec![vec![1, 2], vec![4]]);

        assert_eq!(tree.take(&3), Some(3));
        assert_eq!(root_keys(&tree), vec![2]);
        assert_eq!(child_keys(&tree), vec![vec![1], vec![4]]);
    }

    #[test]
    fn test_remove_internal_key_uses_successor() {
        // [2] / [1] [3 4]
        let mut tree = tree_of(2, [1, 2, 3, 4]);
        assert!(tree.remove(&2));
        assert_eq!(root_keys(&tree), vec![3]);
        assert_eq!(child_keys(&tree), vec![vec![1], vec![4]]);
    }

    #[test]
    fn test_remove_internal_key_merges_and_collapses_root() {
        // [2] / [1] [3]
        let mut tree = tree_of(2, [1, 2, 3, 4]);
        tree.remove(&4);
        assert_eq!(child_keys(&tree), vec![vec![1], vec![3]]);

        assert!(tree.remove(&2));
        assert_eq!(root_keys(&tree), vec![1, 3]);
        assert_eq!(tree.height(), 1);
        assert_eq!(tree.stats().merges, 1);
        assert_eq!(tree.stats().root_collapses, 1);
    }

    #[test]
    fn test_remove_absent_key_still_collapses_merged_root() {
        // [2] / [1] [3]: looking for 5 merges the root's children.
        let mut tree = tree_of(2, [1, 2, 3, 4]);
        tree.remove(&4);

        assert!(!tree.remove(&5));
        assert_eq!(tree.len(), 3);
        assert_eq!(root_keys(&tree), vec![1, 2, 3]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_remove_last_key_clears_root() {
        let mut tree = tree_of(2, [1]);
        assert!(tree.remove(&1));
        assert!(tree.root.is_none());
        assert_eq!(tree.height(), 0);
        assert!(!tree.remove(&1));
    }

    #[test]
    fn test_duplicates_are_kept() {
        let mut tree = tree_of(2, [5, 5, 5, 1, 5]);
        assert_eq!(tree.len(), 5);
        assert_eq!(keys(&tree), vec![1, 5, 5, 5, 5]);
        assert!(tree.validate().is_ok());

        assert!(tree.remove(&5));
        assert!(tree.remove(&5));
        assert_eq!(keys(&tree), vec![1, 5, 5]);
        assert!(tree.validate().is_ok());
    }

    #[test]
    fn test_copy_to() {
        let tree = tree_of(3, [4, 2, 3, 1]);
        let mut dest = [0; 6];
        tree.copy_to(&mut dest, 1).unwrap();
        assert_eq!(dest, [0, 1, 2, 3, 4, 0]);
    }

    #[test]
    fn test_copy_to_too_small_writes_nothing() {
        let tree = tree_of(2, [1, 2, 3]);
        let mut dest = [0; 4];
        let err = tree.copy_to(&mut dest, 2).unwrap_err();
        assert_eq!(
            err,
            Error::InsufficientCapacity {
                needed: 3,
                available: 2
            }
        );
        assert_eq!(dest, [0; 4]);

        assert!(tree.copy_to(&mut dest, 9).is_err());
    }

    #[test]
    fn test_copy_to_empty_tree() {
        let tree = BTree::<i32>::new(2).unwrap();
        let mut dest: [i32; 0] = [];
        assert!(tree.copy_to(&mut dest, 0).is_ok());

        // A start past the end is fine when there is nothing to write.
        let mut dest = [0; 2];
        assert!(tree.copy_to(&mut dest, 5).is_ok());
        assert_eq!(dest, [0; 2]);
    }

    #[test]
    fn test_copy_to_start_past_end() {
        let tree = tree_of(2, [1]);
        let mut dest = [0; 2];
        assert_eq!(
            tree.copy_to(&mut dest, 5).unwrap_err(),
            Error::InsufficientCapacity {
                needed: 1,
                available: 0
            }
        );
    }

    #[test]
    fn test_clear() {
        let mut tree = tree_of(2, 0..50);
        tree.clear();
        assert!(tree.is_empty());
        assert_eq!(tree.iter().count(), 0);
        tree.insert(3);
        assert_eq!(keys(&tree), vec![3]);
    }

    #[test]
    fn test_first_last_get() {
        let tree = tree_of(3, (1..=40).rev());
        assert_eq!(tree.first(), Some(&1));
        assert_eq!(tree.last(), Some(&40));
        assert_eq!(tree.get(&17), Some(&17));
        assert_eq!(tree.get(&41), None);
    }

    #[test]
    fn test_dump_format() {
        let tree = tree_of(2, [1, 2, 3, 4]);
        assert_eq!(tree.dump(), "[2]\n  [1]\n  [3, 4]\n");
    }

    #[test]
    fn test_debug_format() {
        let tree = tree_of(2, [3, 1, 2]);
        assert_eq!(format!("{:?}", tree), "{1, 2, 3}");
    }

    #[test]
    fn test_into_iter_sorted() {
        let tree = tree_of(2, [9, 3, 7, 1, 5]);
        let keys: Vec<i32> = tree.into_iter().collect();
        assert_eq!(keys, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_ascending_then_descending_removal() {
        for t in 2..=5 {
            let mut tree = tree_of(t, 0..200);
            assert!(tree.validate().is_ok());

            for key in (0..200).rev() {
                assert!(tree.remove(&key), "t={} key={}", t, key);
                assert!(tree.validate().is_ok(), "t={} key={}", t, key);
            }
            assert!(tree.is_empty());
            assert_eq!(tree.height(), 0);
        }
    }

    /// Runs only with `--features invariant-checks`: every insert and remove
    /// re-validates the whole tree and panics on a violation.
    #[cfg(all(debug_assertions, feature = "invariant-checks"))]
    #[test]
    fn test_per_mutation_invariant_checks() {
        for t in 2..=4 {
            let mut tree = BTree::new(t).unwrap();
            for key in (0..300).map(|i| (i * 37) % 101) {
                tree.insert(key);
            }
            for key in (0..300).map(|i| (i * 53) % 101) {
                tree.remove(&key);
            }
            assert!(tree.validate().is_ok());
        }
    }

    #[cfg(all(debug_assertions, feature = "invariant-checks"))]
    #[test]
    #[should_panic(expected = "invariant violated")]
    fn test_per_mutation_check_catches_corruption() {
        let mut tree = tree_of(2, [1, 2, 3, 4]);
        if let Some(root) = tree.root.as_mut() {
            root.children[0].keys = vec![9];
        }
        tree.insert(5);
    }
}
