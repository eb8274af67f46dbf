//! B-tree index implementation.
//!
//! # Components
//! - [`BTree`] - The tree and its insert/remove/search algorithms
//! - [`Iter`] / [`IntoIter`] - In-order iteration
//! - [`BTreeStats`] - Rebalancing counters
//!
//! Nodes and the structural invariant checks are internal.

mod iter;
mod node;
mod stats;
mod tree;
mod validate;

pub use iter::{IntoIter, Iter};
pub use stats::BTreeStats;
pub use tree::BTree;
