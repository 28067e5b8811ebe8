//! B-tree node storage.

use crate::types::NodeId;
use std::borrow::Borrow;

/// One tree vertex.
///
/// When the node is internal, `children.len() == keys.len() + 1` and
/// `children[i]` holds every key between `keys[i - 1]` and `keys[i]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K> {
    /// Keys in strictly increasing order
    pub(crate) keys: Vec<K>,
    /// Child node IDs (empty for leaves)
    pub(crate) children: Vec<NodeId>,
    /// Whether this node has no children
    pub(crate) is_leaf: bool,
}

impl<K> Node<K> {
    /// Create an empty node
    pub fn new(is_leaf: bool) -> Self {
        Self {
            keys: Vec::new(),
            children: Vec::new(),
            is_leaf,
        }
    }

    /// Create an internal node with a single child and no keys.
    ///
    /// Used when the root splits: the old root becomes child 0.
    pub(crate) fn with_child(child: NodeId) -> Self {
        Self {
            keys: Vec::new(),
            children: vec![child],
            is_leaf: false,
        }
    }

    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.is_leaf
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Locate `key` in this node.
    ///
    /// `Ok(i)` if `keys[i] == key`, otherwise `Err(i)` where `i` is the first
    /// key greater than `key`, which is also the child to descend into.
    pub fn find<Q>(&self, key: &Q) -> Result<usize, usize>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys.binary_search_by(|k| k.borrow().cmp(key))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_node_is_empty() {
        let leaf: Node<i32> = Node::new(true);
        assert!(leaf.is_leaf());
        assert!(leaf.is_empty());
        assert!(leaf.children().is_empty());

        let internal: Node<i32> = Node::with_child(NodeId::new(3));
        assert!(!internal.is_leaf());
        assert_eq!(internal.children(), &[NodeId::new(3)]);
    }

    #[test]
    fn test_find() {
        let mut node = Node::new(true);
        node.keys = vec![10, 20, 30];

        assert_eq!(node.find(&20), Ok(1));
        assert_eq!(node.find(&5), Err(0));
        assert_eq!(node.find(&25), Err(2));
        assert_eq!(node.find(&99), Err(3));
    }
}
