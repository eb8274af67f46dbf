//! Shared access to a tree.
//!
//! [`BTree`] mutates several nodes per operation and is not synchronized.
//! [`SharedBTree`] puts it behind a single-writer/multiple-reader lock.

use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::{BTreeConfig, Result};
use crate::index::btree::BTree;

/// A cloneable, thread-safe handle to one [`BTree`].
///
/// # Thread Safety
/// - lookups take the read lock, so many readers run at once
/// - mutations take the write lock for the whole top-down pass
///
/// # Example
/// ```
/// use interchange_btree::SharedBTree;
/// use std::thread;
///
/// let tree = SharedBTree::new(3).unwrap();
/// let handles: Vec<_> = (0..4)
///     .map(|i| {
///         let tree = tree.clone();
///         thread::spawn(move || tree.insert(i))
///     })
///     .collect();
/// for h in handles {
///     h.join().unwrap();
/// }
///
/// assert_eq!(tree.len(), 4);
/// ```
pub struct SharedBTree<K> {
    inner: Arc<RwLock<BTree<K>>>,
}

impl<K> SharedBTree<K> {
    /// Create an empty shared tree with minimum degree `min_degree`.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if `min_degree` is outside
    ///   `2..=MAX_MIN_DEGREE`
    pub fn new(min_degree: usize) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(min_degree)?))
    }

    /// Create an empty shared tree from a config.
    ///
    /// # Errors
    /// - `Error::InvalidMinDegree` if the config's degree is out of range
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        Ok(Self::from_tree(BTree::with_config(config)?))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// Acquire the read lock.
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, BTree<K>> {
        self.inner.read()
    }

    /// Acquire the write lock.
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, BTree<K>> {
        self.inner.write()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }

    /// Copy all keys out in ascending order under one read lock.
    pub fn to_vec(&self) -> Vec<K>
    where
        K: Clone,
    {
        self.inner.read().iter().cloned().collect()
    }
}

impl<K: Ord> SharedBTree<K> {
    pub fn insert(&self, key: K) {
        self.inner.write().insert(key);
    }

    pub fn remove(&self, key: &K) -> bool {
        self.inner.write().remove(key)
    }

    pub fn take(&self, key: &K) -> Option<K> {
        self.inner.write().take(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }
}

impl<K> Clone for SharedBTree<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> Default for SharedBTree<K> {
    fn default() -> Self {
        Self::from_tree(BTree::default())
    }
}

impl<K> From<BTree<K>> for SharedBTree<K> {
    fn from(tree: BTree<K>) -> Self {
        Self::from_tree(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_handles_share_one_tree() {
        let a = SharedBTree::new(2).unwrap();
        let b = a.clone();

        a.insert(1);
        b.insert(2);

        assert_eq!(a.len(), 2);
        assert!(b.contains(&1));
        assert!(a.remove(&2));
        assert_eq!(b.to_vec(), vec![1]);
    }

    #[test]
    fn test_rejects_invalid_degree() {
        assert!(SharedBTree::<u32>::new(1).is_err());
    }

    #[test]
    fn test_concurrent_writers() {
        let tree = SharedBTree::new(3).unwrap();

        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                let tree = tree.clone();
                thread::spawn(move || {
                    for i in 0..250 {
                        tree.insert(t * 1000 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        assert_eq!(tree.len(), 1000);
        let guard = tree.read();
        assert!(guard.validate().is_ok());
        assert!(guard.iter().zip(guard.iter().skip(1)).all(|(a, b)| a < b));
    }

    #[test]
    fn test_readers_during_writes() {
        let tree = SharedBTree::from_tree((0..100u32).collect::<BTree<_>>());

        let writer = {
            let tree = tree.clone();
            thread::spawn(move || {
                for i in 0..50 {
                    tree.remove(&(i * 2));
                }
            })
        };
        let reader = {
            let tree = tree.clone();
            thread::spawn(move || {
                for _ in 0..50 {
                    // Odd keys are never removed.
                    assert!(tree.contains(&51));
                }
            })
        };

        writer.join().unwrap();
        reader.join().unwrap();

        assert_eq!(tree.len(), 50);
        assert!(tree.to_vec().iter().all(|k| k % 2 == 1));
    }
}
