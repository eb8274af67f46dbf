//! Configuration for B-tree construction.

use crate::common::{Error, Result};

/// Smallest legal minimum degree.
///
/// With `t = 2` every node holds 1 to 3 keys (a 2-3-4 tree). Anything smaller
/// cannot split a full node into two legal halves.
pub const MIN_DEGREE_FLOOR: usize = 2;

/// Largest legal minimum degree; keeps `2t - 1` within `usize`.
pub const MAX_MIN_DEGREE: usize = usize::MAX / 2;

/// Minimum degree used by [`BTreeConfig::default`] and `FromIterator`.
pub const DEFAULT_MIN_DEGREE: usize = 2;

/// Construction parameters for a [`BTree`](crate::BTree).
///
/// # Node Occupancy
/// For minimum degree `t`:
/// - every non-root node holds `t - 1 ..= 2t - 1` keys
/// - the root holds `0 ..= 2t - 1` keys
/// - an internal node with `k` keys has exactly `k + 1` children
///
/// # Example
/// ```
/// use interchange_btree::BTreeConfig;
///
/// let config = BTreeConfig::default().with_min_degree(3);
/// assert_eq!(config.max_keys(), 5);
/// assert_eq!(config.min_keys(), 2);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BTreeConfig {
    /// The minimum degree `t`, fixed for the lifetime of the tree.
    pub min_degree: usize,
}

impl BTreeConfig {
    /// Create a config with the given minimum degree.
    ///
    /// The value is not checked until [`validate`](Self::validate) or tree
    /// construction.
    #[inline]
    pub fn new(min_degree: usize) -> Self {
        Self { min_degree }
    }

    /// Replace the minimum degree.
    #[inline]
    pub fn with_min_degree(mut self, min_degree: usize) -> Self {
        self.min_degree = min_degree;
        self
    }

    /// Check that the config describes a legal tree.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree < 2` or
    ///   `min_degree > MAX_MIN_DEGREE`
    pub fn validate(&self) -> Result<()> {
        if !(MIN_DEGREE_FLOOR..=MAX_MIN_DEGREE).contains(&self.min_degree) {
            return Err(Error::InvalidMinDegree(self.min_degree));
        }
        Ok(())
    }

    /// Capacity of a full node: `2t - 1`.
    #[inline]
    pub fn max_keys(&self) -> usize {
        2 * self.min_degree - 1
    }

    /// Occupancy floor for non-root nodes: `t - 1`.
    #[inline]
    pub fn min_keys(&self) -> usize {
        self.min_degree - 1
    }
}

impl Default for BTreeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_DEGREE)
    }
}
