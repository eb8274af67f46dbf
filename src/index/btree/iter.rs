//! In-order iteration.

use std::iter::FusedIterator;

use super::node::Node;

/// Lazy in-order iterator over the keys of a [`BTree`](super::BTree).
///
/// Holds a stack of `(node, next key index)` frames along the current
/// root-to-leaf path, so it uses `O(height)` memory. The tree is borrowed
/// for the iterator's lifetime and cannot change underneath it.
pub struct Iter<'a, K> {
    stack: Vec<(&'a Node<K>, usize)>,
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(super) fn new(root: Option<&'a Node<K>>, len: usize) -> Self {
        let mut iter = Self {
            stack: Vec::new(),
            remaining: len,
        };
        if let Some(root) = root {
            iter.descend_left(root);
        }
        iter
    }

    /// Push `node` and its leftmost descendants.
    fn descend_left(&mut self, mut node: &'a Node<K>) {
        loop {
            self.stack.push((node, 0));
            match node.children.first() {
                Some(child) => node = child,
                None => break,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        loop {
            let top = self.stack.last_mut()?;
            let node: &'a Node<K> = top.0;
            let index = top.1;

            if index < node.keys.len() {
                top.1 += 1;
                // The subtree right of this key comes next.
                if !node.is_leaf() {
                    self.descend_left(&node.children[index + 1]);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys[index]);
            }

            self.stack.pop();
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K> ExactSizeIterator for Iter<'_, K> {}

impl<K> FusedIterator for Iter<'_, K> {}

impl<K> Clone for Iter<'_, K> {
    fn clone(&self) -> Self {
        Self {
            stack: self.stack.clone(),
            remaining: self.remaining,
        }
    }
}

/// Owning in-order iterator, produced by `BTree::into_iter`.
pub struct IntoIter<K> {
    inner: std::vec::IntoIter<K>,
}

impl<K> IntoIter<K> {
    pub(super) fn new(root: Option<Node<K>>, len: usize) -> Self {
        let mut keys = Vec::with_capacity(len);
        if let Some(root) = root {
            root.drain_into(&mut keys);
        }
        Self {
            inner: keys.into_iter(),
        }
    }
}

impl<K> Iterator for IntoIter<K> {
    type Item = K;

    #[inline]
    fn next(&mut self) -> Option<K> {
        self.inner.next()
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

impl<K> DoubleEndedIterator for IntoIter<K> {
    #[inline]
    fn next_back(&mut self) -> Option<K> {
        self.inner.next_back()
    }
}

impl<K> ExactSizeIterator for IntoIter<K> {}

impl<K> FusedIterator for IntoIter<K> {}
