//! Structural invariant checks.
//!
//! A correct tree never fails these. The pass is `O(n)`, so the tree only
//! runs it automatically when built with the `invariant-checks` feature in a
//! debug build; tests call [`BTree::validate`](super::BTree::validate)
//! directly.

use crate::common::{Error, Result};

use super::node::Node;

/// Check every invariant of a tree with the given root, count and degree.
pub(super) fn validate_tree<K: Ord>(root: Option<&Node<K>>, len: usize, min_degree: usize) -> Result<()> {
    let root = match root {
        Some(root) => root,
        None if len == 0 => return Ok(()),
        None => return Err(violation(format!("empty root but count is {}", len))),
    };

    if root.keys.is_empty() {
        return Err(violation("non-empty tree has a key-less root"));
    }

    let mut checker = Checker {
        min_degree,
        leaf_depth: None,
    };
    let counted = checker.check(root, true, 0, None, None)?;

    if counted != len {
        return Err(violation(format!("count is {} but tree holds {} keys", len, counted)));
    }
    Ok(())
}

fn violation(msg: impl Into<String>) -> Error {
    Error::InvariantViolation(msg.into())
}

struct Checker {
    min_degree: usize,
    leaf_depth: Option<usize>,
}

impl Checker {
    /// Check `node` and its subtree, returning the number of keys in it.
    ///
    /// `lower`/`upper` are the separators bounding this subtree in its parent.
    fn check<K: Ord>(
        &mut self,
        node: &Node<K>,
        is_root: bool,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
    ) -> Result<usize> {
        if node.min_degree != self.min_degree {
            return Err(violation(format!(
                "node at depth {} has degree {}, tree has {}",
                depth, node.min_degree, self.min_degree
            )));
        }

        let max = 2 * self.min_degree - 1;
        let min = if is_root { 0 } else { self.min_degree - 1 };
        if node.keys.len() < min || node.keys.len() > max {
            return Err(violation(format!(
                "node at depth {} holds {} keys, allowed {}..={}",
                depth,
                node.keys.len(),
                min,
                max
            )));
        }

        if node.keys.windows(2).any(|pair| pair[0] > pair[1]) {
            return Err(violation(format!("keys out of order at depth {}", depth)));
        }

        if let (Some(lower), Some(first)) = (lower, node.keys.first()) {
            if first < lower {
                return Err(violation(format!("key below separator at depth {}", depth)));
            }
        }
        if let (Some(upper), Some(last)) = (upper, node.keys.last()) {
            if last > upper {
                return Err(violation(format!("key above separator at depth {}", depth)));
            }
        }

        if node.is_leaf() {
            match self.leaf_depth {
                None => self.leaf_depth = Some(depth),
                Some(expected) if expected != depth => {
                    return Err(violation(format!(
                        "leaf at depth {}, expected {}",
                        depth, expected
                    )));
                }
                Some(_) => {}
            }
            return Ok(node.keys.len());
        }

        if node.children.len() != node.keys.len() + 1 {
            return Err(violation(format!(
                "node at depth {} has {} keys but {} children",
                depth,
                node.keys.len(),
                node.children.len()
            )));
        }

        let mut total = node.keys.len();
        for (i, child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { node.keys.get(i - 1) };
            let child_upper = if i == node.keys.len() { upper } else { node.keys.get(i) };
            total += self.check(child, false, depth + 1, child_lower, child_upper)?;
        }
        Ok(total)
    }
}
