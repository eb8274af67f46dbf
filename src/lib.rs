//! interchange-btree - An in-memory B-tree with top-down proactive rebalancing.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                       interchange-btree                         │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │           Shared Access (concurrency/)                   │   │
//! │  │        SharedBTree = Arc<RwLock<BTree>>                  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Tree Layer (index/btree/)                   │   │
//! │  │   insert: split full nodes on the way down               │   │
//! │  │   remove: rotate / merge deficient nodes on the way down │   │
//! │  │   search, in-order Iter, copy_to, validate, stats        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              Node Layer (index/btree/node)               │   │
//! │  │   insert/delete in leaf, split child/root, merge,        │   │
//! │  │   push/pop front/back, replace key                       │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (config, Error)
//! - [`index`] - The B-tree
//! - [`concurrency`] - Lock-wrapped shared handle
//!
//! # Invariant Checks
//! [`BTree::validate`] is always available. Building with the
//! `invariant-checks` feature also runs it after every insert and remove in
//! debug builds:
//! ```text
//! cargo test --features invariant-checks
//! ```
//!
//! # Quick Start
//! ```
//! use interchange_btree::BTree;
//!
//! let mut tree = BTree::new(2).unwrap();
//! for key in 1..=5 {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.remove(&1));
//! assert_eq!(tree.iter().copied().collect::<Vec<_>>(), vec![2, 3, 4, 5]);
//! ```

pub mod common;
pub mod concurrency;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_MIN_DEGREE, MAX_MIN_DEGREE, MIN_DEGREE_FLOOR};
pub use common::{BTreeConfig, Error, Result};

pub use concurrency::SharedBTree;
pub use index::btree::{BTree, BTreeStats, IntoIter, Iter};
