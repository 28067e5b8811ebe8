//! B-tree cursor for iteration.
//!
//! The cursor walks keys in sorted order. It maintains a stack of
//! (node_id, key_index) pairs representing the path to the next key: the top
//! frame is the node whose `key_index`-th key comes next, and every frame
//! below it is an ancestor waiting to emit its own key.

use super::node::Node;
use crate::arena::NodePool;
use crate::types::NodeId;
use std::iter::FusedIterator;

/// In-order iterator over the keys of a [`BTree`](super::BTree)
pub struct Iter<'a, K> {
    /// Node storage of the tree being walked
    pool: &'a NodePool<Node<K>>,
    /// Stack of (node_id, next key index)
    stack: Vec<(NodeId, usize)>,
    /// Keys not yet yielded
    remaining: usize,
}

impl<'a, K> Iter<'a, K> {
    pub(super) fn new(pool: &'a NodePool<Node<K>>, root: Option<NodeId>, len: usize) -> Self {
        let mut iter = Self {
            pool,
            stack: Vec::new(),
            remaining: len,
        };

        if let Some(root) = root {
            iter.descend_to_leftmost(root);
        }

        iter
    }

    /// Push the path from `id` down to its leftmost leaf
    fn descend_to_leftmost(&mut self, mut id: NodeId) {
        let pool = self.pool;
        loop {
            self.stack.push((id, 0));
            let node = &pool[id];
            match node.children.first() {
                Some(&child) if !node.is_leaf => id = child,
                _ => return,
            }
        }
    }
}

impl<'a, K> Iterator for Iter<'a, K> {
    type Item = &'a K;

    fn next(&mut self) -> Option<&'a K> {
        let pool = self.pool;

        loop {
            let (id, pos) = *self.stack.last()?;
            let node = &pool[id];

            if pos < node.keys.len() {
                if let Some(top) = self.stack.last_mut() {
                    top.1 += 1;
                }
                // The subtree right of this key comes before the next key
                if let Some(&child) = node.children.get(pos + 1) {
                    self.descend_to_leftmost(child);
                }
                self.remaining = self.remaining.saturating_sub(1);
                return Some(&node.keys[pos]);
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

#[cfg(test)]
mod tests {
    use crate::btree::BTree;

    #[test]
    fn test_cursor_empty() {
        let tree: BTree<u8> = BTree::new(2).unwrap();
        let mut iter = tree.traverse();
        assert_eq!(iter.len(), 0);
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_cursor_sorted_and_sized() {
        let mut tree = BTree::new(3).unwrap();
        tree.extend((0..100).rev());

        let mut iter = tree.traverse();
        assert_eq!(iter.len(), 100);
        assert_eq!(iter.next(), Some(&0));
        assert_eq!(iter.len(), 99);

        let rest: Vec<i32> = iter.copied().collect();
        assert_eq!(rest, (1..100).collect::<Vec<_>>());
    }

    #[test]
    fn test_cursor_is_restartable() {
        let mut tree = BTree::new(2).unwrap();
        tree.extend([5, 1, 9, 3, 7]);

        let first: Vec<_> = tree.traverse().collect();
        let second: Vec<_> = (&tree).into_iter().collect();
        assert_eq!(first, second);
        assert_eq!(first, vec![&1, &3, &5, &7, &9]);

        // Partially consumed iterators do not affect new ones
        let mut partial = tree.iter();
        partial.next();
        assert_eq!(tree.iter().next(), Some(&1));
    }
}
