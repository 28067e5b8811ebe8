//! Structural primitives: split on the way down for inserts, and the
//! rotate/merge rebalancing applied on the way down for deletes.

use super::node::Node;
use super::tree::BTree;
use crate::error::{BTreeError, Result};
use crate::types::NodeId;
use std::mem;

impl<K: Ord> BTree<K> {
    /// Split the full child `parent.children[idx]` about its median key.
    ///
    /// The child keeps its lower `t - 1` keys, the median moves up into
    /// `parent.keys[idx]`, and a new right sibling with the upper `t - 1`
    /// keys (and upper `t` children) becomes `parent.children[idx + 1]`.
    /// `parent` must not be full.
    pub(super) fn split_child(&mut self, parent: NodeId, idx: usize) {
        let t = self.config.min_degree;
        let child_id = self.pool[parent].children[idx];

        let child = &mut self.pool[child_id];
        let right_keys = child.keys.split_off(t);
        let median = child.keys.remove(t - 1);
        let right_children = if child.is_leaf {
            Vec::new()
        } else {
            child.children.split_off(t)
        };
        let right = Node {
            keys: right_keys,
            children: right_children,
            is_leaf: child.is_leaf,
        };

        let right_id = self.pool.allocate(right);
        let parent_node = &mut self.pool[parent];
        parent_node.keys.insert(idx, median);
        parent_node.children.insert(idx + 1, right_id);

        tracing::trace!(
            target: "btree_mem::split",
            parent = parent.value(),
            left = child_id.value(),
            right = right_id.value(),
            "split full child"
        );
    }

    /// Make sure `parent.children[idx]` holds at least `t` keys before the
    /// delete descends into it.
    ///
    /// Returns the index of the child to descend into, which is `idx - 1`
    /// when the last child had to merge with its left sibling.
    pub(super) fn fill_child(&mut self, parent: NodeId, idx: usize) -> Result<usize> {
        let t = self.config.min_degree;
        let node = &self.pool[parent];
        let count = node.len();
        let child = node.children[idx];
        let left_sibling = idx.checked_sub(1).map(|i| node.children[i]);
        let right_sibling = node.children.get(idx + 1).copied();

        if self.pool[child].len() >= t {
            return Ok(idx);
        }

        if let Some(left) = left_sibling {
            if self.pool[left].len() >= t {
                self.rotate_right(parent, idx)?;
                return Ok(idx);
            }
        }

        if let Some(right) = right_sibling {
            if self.pool[right].len() >= t {
                self.rotate_left(parent, idx)?;
                return Ok(idx);
            }
        }

        if count == 0 {
            return Err(BTreeError::corruption(format!(
                "node {} has a child but no keys",
                parent
            )));
        }

        let idx = if idx == count { idx - 1 } else { idx };
        self.merge(parent, idx);
        Ok(idx)
    }

    /// Move `parent.keys[idx - 1]` down to the front of `children[idx]` and
    /// lift the left sibling's last key into its place. The sibling's last
    /// child moves across with it.
    pub(super) fn rotate_right(&mut self, parent: NodeId, idx: usize) -> Result<()> {
        let (left_id, child_id) = {
            let node = &self.pool[parent];
            (node.children[idx - 1], node.children[idx])
        };

        let left = &mut self.pool[left_id];
        let lifted = left
            .keys
            .pop()
            .ok_or_else(|| BTreeError::corruption(format!("left sibling {} is empty", left_id)))?;
        let moved_child = if left.is_leaf {
            None
        } else {
            let last = left.children.pop().ok_or_else(|| {
                BTreeError::corruption(format!("internal node {} has no children", left_id))
            })?;
            Some(last)
        };

        let separator = mem::replace(&mut self.pool[parent].keys[idx - 1], lifted);
        let child = &mut self.pool[child_id];
        child.keys.insert(0, separator);
        if let Some(moved) = moved_child {
            child.children.insert(0, moved);
        }

        tracing::trace!(
            target: "btree_mem::rotate",
            parent = parent.value(),
            from = left_id.value(),
            to = child_id.value(),
            direction = "right",
            "borrowed key from left sibling"
        );
        Ok(())
    }

    /// Move `parent.keys[idx]` down to the end of `children[idx]` and lift
    /// the right sibling's first key into its place. The sibling's first
    /// child moves across with it.
    pub(super) fn rotate_left(&mut self, parent: NodeId, idx: usize) -> Result<()> {
        let (child_id, right_id) = {
            let node = &self.pool[parent];
            (node.children[idx], node.children[idx + 1])
        };

        let right = &mut self.pool[right_id];
        if right.keys.is_empty() || (!right.is_leaf && right.children.is_empty()) {
            return Err(BTreeError::corruption(format!(
                "right sibling {} is empty",
                right_id
            )));
        }
        let lifted = right.keys.remove(0);
        let moved_child = if right.is_leaf {
            None
        } else {
            Some(right.children.remove(0))
        };

        let separator = mem::replace(&mut self.pool[parent].keys[idx], lifted);
        let child = &mut self.pool[child_id];
        child.keys.push(separator);
        if let Some(moved) = moved_child {
            child.children.push(moved);
        }

        tracing::trace!(
            target: "btree_mem::rotate",
            parent = parent.value(),
            from = right_id.value(),
            to = child_id.value(),
            direction = "left",
            "borrowed key from right sibling"
        );
        Ok(())
    }

    /// Merge `children[idx + 1]` and the separator `keys[idx]` into
    /// `children[idx]`. The right node is released.
    pub(super) fn merge(&mut self, parent: NodeId, idx: usize) {
        let parent_node = &mut self.pool[parent];
        let separator = parent_node.keys.remove(idx);
        let right_id = parent_node.children.remove(idx + 1);
        let left_id = parent_node.children[idx];

        let right = self.pool.release(right_id);
        let left = &mut self.pool[left_id];
        left.keys.push(separator);
        left.keys.extend(right.keys);
        left.children.extend(right.children);

        tracing::trace!(
            target: "btree_mem::merge",
            parent = parent.value(),
            survivor = left_id.value(),
            removed = right_id.value(),
            "merged siblings"
        );
    }

    /// Remove and return the largest key under `id`, rebalancing along the
    /// rightmost path. `id` must hold at least `t` keys unless it is the root.
    pub(super) fn pop_max(&mut self, mut id: NodeId) -> Result<K> {
        loop {
            let node = &self.pool[id];
            if node.is_leaf {
                return self.pool[id].keys.pop().ok_or_else(|| {
                    BTreeError::corruption(format!("empty leaf {} on predecessor path", id))
                });
            }
            let last = node.len();
            let idx = self.fill_child(id, last)?;
            id = self.pool[id].children[idx];
        }
    }

    /// Remove and return the smallest key under `id`, rebalancing along the
    /// leftmost path. `id` must hold at least `t` keys unless it is the root.
    pub(super) fn pop_min(&mut self, mut id: NodeId) -> Result<K> {
        loop {
            let node = &self.pool[id];
            if node.is_leaf {
                if node.keys.is_empty() {
                    return Err(BTreeError::corruption(format!(
                        "empty leaf {} on successor path",
                        id
                    )));
                }
                return Ok(self.pool[id].keys.remove(0));
            }
            let idx = self.fill_child(id, 0)?;
            id = self.pool[id].children[idx];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf(tree: &mut BTree<i32>, keys: &[i32]) -> NodeId {
        tree.pool.allocate(Node {
            keys: keys.to_vec(),
            children: Vec::new(),
            is_leaf: true,
        })
    }

    fn internal(tree: &mut BTree<i32>, keys: &[i32], children: Vec<NodeId>) -> NodeId {
        tree.pool.allocate(Node {
            keys: keys.to_vec(),
            children,
            is_leaf: false,
        })
    }

    fn keys_of(tree: &BTree<i32>, id: NodeId) -> Vec<i32> {
        tree.pool[id].keys.clone()
    }

    #[test]
    fn test_split_child_leaf() {
        let mut tree = BTree::new(2).unwrap();
        let full = leaf(&mut tree, &[1, 2, 3]);
        let root = tree.pool.allocate(Node::with_child(full));

        tree.split_child(root, 0);

        assert_eq!(keys_of(&tree, root), vec![2]);
        let children = tree.pool[root].children.clone();
        assert_eq!(children.len(), 2);
        assert_eq!(keys_of(&tree, children[0]), vec![1]);
        assert_eq!(keys_of(&tree, children[1]), vec![3]);
        assert!(tree.pool[children[1]].is_leaf);
    }

    #[test]
    fn test_split_child_moves_upper_children() {
        let mut tree = BTree::new(2).unwrap();
        let leaves: Vec<NodeId> = [[1], [3], [5], [7]]
            .iter()
            .map(|k| leaf(&mut tree, k))
            .collect();
        let full = internal(&mut tree, &[2, 4, 6], leaves.clone());
        let parent = internal(&mut tree, &[10], vec![full, NodeId::new(99)]);

        tree.split_child(parent, 0);

        assert_eq!(keys_of(&tree, parent), vec![4, 10]);
        let right = tree.pool[parent].children[1];
        assert_eq!(tree.pool[full].children, leaves[..2].to_vec());
        assert_eq!(tree.pool[right].children, leaves[2..].to_vec());
        assert_eq!(keys_of(&tree, full), vec![2]);
        assert_eq!(keys_of(&tree, right), vec![6]);
        assert_eq!(tree.pool[parent].children[2], NodeId::new(99));
    }

    #[test]
    fn test_rotate_right_internal_moves_child() {
        let mut tree = BTree::new(2).unwrap();
        let l: Vec<NodeId> = [[1], [3], [5]].iter().map(|k| leaf(&mut tree, k)).collect();
        let r: Vec<NodeId> = [[11], [13]].iter().map(|k| leaf(&mut tree, k)).collect();
        let left = internal(&mut tree, &[2, 4], l.clone());
        let child = internal(&mut tree, &[12], r.clone());
        let parent = internal(&mut tree, &[10], vec![left, child]);

        tree.rotate_right(parent, 1).unwrap();

        assert_eq!(keys_of(&tree, parent), vec![4]);
        assert_eq!(keys_of(&tree, left), vec![2]);
        assert_eq!(keys_of(&tree, child), vec![10, 12]);
        assert_eq!(tree.pool[left].children, l[..2].to_vec());
        assert_eq!(tree.pool[child].children, vec![l[2], r[0], r[1]]);
    }

    #[test]
    fn test_rotate_left_internal_moves_child() {
        let mut tree = BTree::new(2).unwrap();
        let l: Vec<NodeId> = [[1], [3]].iter().map(|k| leaf(&mut tree, k)).collect();
        let r: Vec<NodeId> = [[11], [13], [15]].iter().map(|k| leaf(&mut tree, k)).collect();
        let child = internal(&mut tree, &[2], l.clone());
        let right = internal(&mut tree, &[12, 14], r.clone());
        let parent = internal(&mut tree, &[10], vec![child, right]);

        tree.rotate_left(parent, 0).unwrap();

        assert_eq!(keys_of(&tree, parent), vec![12]);
        assert_eq!(keys_of(&tree, child), vec![2, 10]);
        assert_eq!(keys_of(&tree, right), vec![14]);
        assert_eq!(tree.pool[child].children, vec![l[0], l[1], r[0]]);
        assert_eq!(tree.pool[right].children, r[1..].to_vec());
    }

    #[test]
    fn test_merge_releases_right_node() {
        let mut tree = BTree::new(2).unwrap();
        let a = leaf(&mut tree, &[5]);
        let b = leaf(&mut tree, &[15]);
        let c = leaf(&mut tree, &[25]);
        let parent = internal(&mut tree, &[10, 20], vec![a, b, c]);
        assert_eq!(tree.pool.live(), 4);

        tree.merge(parent, 0);

        assert_eq!(keys_of(&tree, parent), vec![20]);
        assert_eq!(tree.pool[parent].children, vec![a, c]);
        assert_eq!(keys_of(&tree, a), vec![5, 10, 15]);
        assert!(tree.pool.get(b).is_none());
        assert_eq!(tree.pool.live(), 3);
    }

    #[test]
    fn test_fill_child_prefers_left_rotation() {
        let mut tree = BTree::new(2).unwrap();
        let a = leaf(&mut tree, &[1, 2]);
        let b = leaf(&mut tree, &[5]);
        let c = leaf(&mut tree, &[8, 9]);
        let parent = internal(&mut tree, &[3, 7], vec![a, b, c]);

        assert_eq!(tree.fill_child(parent, 1).unwrap(), 1);
        assert_eq!(keys_of(&tree, parent), vec![2, 7]);
        assert_eq!(keys_of(&tree, b), vec![3, 5]);
        assert_eq!(keys_of(&tree, c), vec![8, 9]);
    }

    #[test]
    fn test_fill_child_last_index_merges_left() {
        let mut tree = BTree::new(2).unwrap();
        let a = leaf(&mut tree, &[1]);
        let b = leaf(&mut tree, &[5]);
        let parent = internal(&mut tree, &[3], vec![a, b]);

        assert_eq!(tree.fill_child(parent, 1).unwrap(), 0);
        assert_eq!(keys_of(&tree, a), vec![1, 3, 5]);
        assert!(tree.pool[parent].keys.is_empty());
        assert_eq!(tree.pool[parent].children, vec![a]);
    }

    #[test]
    fn test_fill_child_leaves_full_child_alone() {
        let mut tree = BTree::new(2).unwrap();
        let a = leaf(&mut tree, &[1, 2]);
        let b = leaf(&mut tree, &[5]);
        let parent = internal(&mut tree, &[3], vec![a, b]);

        assert_eq!(tree.fill_child(parent, 0).unwrap(), 0);
        assert_eq!(keys_of(&tree, a), vec![1, 2]);
        assert_eq!(keys_of(&tree, parent), vec![3]);
    }

    #[test]
    fn test_pop_max_and_min() {
        let mut tree = BTree::new(2).unwrap();
        let a = leaf(&mut tree, &[1, 2]);
        let b = leaf(&mut tree, &[5]);
        let c = leaf(&mut tree, &[8]);
        let sub = internal(&mut tree, &[3, 7], vec![a, b, c]);

        // Last child is minimal and its left sibling too: merge, then pop.
        assert_eq!(tree.pop_max(sub).unwrap(), 8);
        assert_eq!(keys_of(&tree, sub), vec![3]);
        assert_eq!(keys_of(&tree, b), vec![5, 7]);

        // First child has a spare key already.
        assert_eq!(tree.pop_min(sub).unwrap(), 1);
        assert_eq!(keys_of(&tree, a), vec![2]);
    }
}
