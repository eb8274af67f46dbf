//! Structural statistics tracking.

use std::fmt;

/// Counts of the rebalancing steps a tree has performed.
///
/// Every counter is bumped by the tree algorithms at the moment the
/// corresponding primitive runs, so tests and benchmarks can observe which
/// path an operation took without inspecting nodes.
///
/// # Example
/// ```
/// use interchange_btree::BTree;
///
/// let mut tree = BTree::new(2).unwrap();
/// for key in 1..=4 {
///     tree.insert(key);
/// }
///
/// // The fourth insert found a full root and split it.
/// assert_eq!(tree.stats().root_splits, 1);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BTreeStats {
    /// Full roots split during insertion (height grew).
    pub root_splits: u64,

    /// Full non-root children split on the way down an insertion.
    pub child_splits: u64,

    /// Sibling pairs merged with their separator during deletion.
    pub merges: u64,

    /// Keys borrowed from a sibling through the parent during deletion.
    pub rotations: u64,

    /// Key-less roots replaced by their only child (height shrank).
    pub root_collapses: u64,
}

impl BTreeStats {
    /// Create a tracker with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of structural changes of any kind.
    pub fn structural_ops(&self) -> u64 {
        self.root_splits + self.child_splits + self.merges + self.rotations + self.root_collapses
    }

    /// Reset all counters to zero.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for BTreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Stats {{ root_splits: {}, child_splits: {}, merges: {}, rotations: {}, root_collapses: {} }}",
            self.root_splits, self.child_splits, self.merges, self.rotations, self.root_collapses
        )
    }
}
