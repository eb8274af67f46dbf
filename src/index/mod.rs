//! Index structures.
//!
//! Currently implements:
//! - [`btree`] - In-memory B-tree with top-down rebalancing

pub mod btree;
