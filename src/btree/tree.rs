//! B-tree core implementation.
//!
//! This module provides the main BTree struct with operations for:
//! - search: Point lookups
//! - insert: Top-down insertion with preemptive splits
//! - delete: Top-down removal with rotate/merge rebalancing
//! - traverse: In-order iteration

use super::cursor::Iter;
use super::node::Node;
use crate::arena::NodePool;
use crate::error::{BTreeError, Result};
use crate::types::{BTreeConfig, NodeId};
use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt::Display;
use std::mem;

/// An in-memory B-tree of fixed minimum degree
#[derive(Debug)]
pub struct BTree<K> {
    /// Arena owning every node of the tree
    pub(super) pool: NodePool<Node<K>>,
    /// Root node (`None` when the tree is empty)
    pub(super) root: Option<NodeId>,
    /// Fixed tree parameters
    pub(super) config: BTreeConfig,
    /// Number of keys stored
    pub(super) len: usize,
    /// Current height of the tree (0 when empty)
    pub(super) height: usize,
}

/// Tree statistics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeStats {
    /// Number of keys stored
    pub len: usize,
    /// Height of the tree
    pub height: usize,
    /// Live nodes in the arena
    pub node_count: usize,
    /// Released arena slots awaiting reuse
    pub free_slots: usize,
    /// Minimum degree of the tree
    pub min_degree: usize,
}

/// Node type for visualization
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    /// Arena slot of the node
    pub node_id: u32,
    /// Whether this is a leaf node
    pub is_leaf: bool,
    /// Keys in this node
    pub keys: Vec<String>,
    /// Child nodes (only for interior nodes)
    pub children: Vec<TreeNode>,
}

/// Counters gathered while validating the tree
#[derive(Default)]
struct Walk {
    leaf_depth: Option<usize>,
    keys: usize,
    nodes: usize,
}

impl<K> Default for BTree<K> {
    fn default() -> Self {
        Self::from_valid_config(BTreeConfig::default())
    }
}

impl<K> BTree<K> {
    /// Create an empty tree with the given minimum degree
    pub fn new(min_degree: usize) -> Result<Self> {
        Self::with_config(BTreeConfig::new(min_degree)?)
    }

    /// Create an empty tree from a configuration
    pub fn with_config(config: BTreeConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_valid_config(config))
    }

    fn from_valid_config(config: BTreeConfig) -> Self {
        Self {
            pool: NodePool::new(),
            root: None,
            config,
            len: 0,
            height: 0,
        }
    }

    /// Get the tree configuration
    pub fn config(&self) -> BTreeConfig {
        self.config
    }

    /// Get the minimum degree
    pub fn min_degree(&self) -> usize {
        self.config.min_degree
    }

    /// Number of keys in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Get the height of the tree (a lone leaf root has height 1)
    pub fn height(&self) -> usize {
        self.height
    }

    /// Get the root node ID
    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Borrow a live node
    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.pool.get(id)
    }

    /// Iterate over all keys in ascending order.
    ///
    /// The iterator is lazy; calling `traverse` again starts a fresh walk.
    pub fn traverse(&self) -> Iter<'_, K> {
        Iter::new(&self.pool, self.root, self.len)
    }

    /// Alias for [`traverse`](Self::traverse)
    pub fn iter(&self) -> Iter<'_, K> {
        self.traverse()
    }

    /// Smallest key in the tree
    pub fn first(&self) -> Option<&K> {
        let mut id = self.root?;
        loop {
            let node = &self.pool[id];
            if node.is_leaf {
                return node.keys.first();
            }
            id = *node.children.first()?;
        }
    }

    /// Largest key in the tree
    pub fn last(&self) -> Option<&K> {
        let mut id = self.root?;
        loop {
            let node = &self.pool[id];
            if node.is_leaf {
                return node.keys.last();
            }
            id = *node.children.last()?;
        }
    }

    /// Release every node and reset the tree to empty
    pub fn clear(&mut self) {
        tracing::debug!(
            target: "btree_mem::root",
            nodes = self.pool.live(),
            keys = self.len,
            "tearing down tree"
        );
        self.pool.clear();
        self.root = None;
        self.len = 0;
        self.height = 0;
    }

    /// Get statistics about the tree
    pub fn stats(&self) -> TreeStats {
        TreeStats {
            len: self.len,
            height: self.height,
            node_count: self.pool.live(),
            free_slots: self.pool.free_slots(),
            min_degree: self.config.min_degree,
        }
    }

    /// Export the tree structure for visualization
    pub fn export_tree(&self) -> Option<TreeNode>
    where
        K: Display,
    {
        self.root.map(|root| self.export_node(root))
    }

    /// Export the tree structure as pretty-printed JSON (`null` when empty)
    pub fn export_json(&self) -> Result<String>
    where
        K: Display,
    {
        Ok(serde_json::to_string_pretty(&self.export_tree())?)
    }

    fn export_node(&self, id: NodeId) -> TreeNode
    where
        K: Display,
    {
        let node = &self.pool[id];
        TreeNode {
            node_id: id.value(),
            is_leaf: node.is_leaf,
            keys: node.keys.iter().map(ToString::to_string).collect(),
            children: node
                .children
                .iter()
                .map(|&child| self.export_node(child))
                .collect(),
        }
    }
}

impl<K: Ord> BTree<K> {
    /// Check whether `key` is in the tree
    pub fn search<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).is_some()
    }

    /// Get the stored key equal to `key`
    pub fn get<Q>(&self, key: &Q) -> Option<&K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.locate(key).map(|(id, idx)| &self.pool[id].keys[idx])
    }

    /// Find the node and slot holding `key`
    fn locate<Q>(&self, key: &Q) -> Option<(NodeId, usize)>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut id = self.root?;
        loop {
            let node = &self.pool[id];
            match node.find(key) {
                Ok(idx) => return Some((id, idx)),
                Err(_) if node.is_leaf => return None,
                Err(idx) => id = node.children[idx],
            }
        }
    }

    /// Insert a key.
    ///
    /// Returns `true` if the key was new. If an equal key is already stored
    /// it is overwritten in place and `false` is returned.
    pub fn insert(&mut self, key: K) -> bool {
        if let Some((id, idx)) = self.locate(&key) {
            self.pool[id].keys[idx] = key;
            return false;
        }

        let root = match self.root {
            Some(root) if self.pool[root].len() == self.config.max_keys() => {
                // Splitting the root is the only way the tree grows taller
                let new_root = self.pool.allocate(Node::with_child(root));
                self.split_child(new_root, 0);
                self.root = Some(new_root);
                self.height += 1;
                tracing::debug!(
                    target: "btree_mem::root",
                    root = new_root.value(),
                    height = self.height,
                    "split root"
                );
                new_root
            }
            Some(root) => root,
            None => {
                let root = self.pool.allocate(Node::new(true));
                self.root = Some(root);
                self.height = 1;
                root
            }
        };

        self.insert_nonfull(root, key);
        self.len += 1;
        true
    }

    /// Insert into the subtree rooted at `id`, which is not full
    fn insert_nonfull(&mut self, mut id: NodeId, key: K) {
        let max_keys = self.config.max_keys();
        loop {
            let node = &self.pool[id];
            let mut idx = match node.find(&key) {
                Ok(idx) | Err(idx) => idx,
            };

            if node.is_leaf {
                self.pool[id].keys.insert(idx, key);
                return;
            }

            let child = node.children[idx];
            if self.pool[child].len() == max_keys {
                self.split_child(id, idx);
                if key > self.pool[id].keys[idx] {
                    idx += 1;
                }
            }
            id = self.pool[id].children[idx];
        }
    }

    /// Delete a key, returning the stored key.
    ///
    /// Returns `BTreeError::KeyNotFound` without touching the tree if the
    /// key is absent.
    pub fn delete<Q>(&mut self, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let Some(root) = self.root else {
            return Err(BTreeError::KeyNotFound);
        };
        if self.locate(key).is_none() {
            tracing::trace!(target: "btree_mem::delete", "key not present");
            return Err(BTreeError::KeyNotFound);
        }

        let removed = self.delete_from(root, key)?;
        self.len -= 1;
        self.shrink_root();
        Ok(removed)
    }

    /// Delete `key` from the subtree rooted at `id`.
    ///
    /// Every non-root node this recurses into holds at least `t` keys.
    fn delete_from<Q>(&mut self, id: NodeId, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let node = &self.pool[id];
        let is_leaf = node.is_leaf;

        match node.find(key) {
            Ok(idx) if is_leaf => Ok(self.pool[id].keys.remove(idx)),
            Ok(idx) => self.delete_from_internal(id, idx, key),
            Err(_) if is_leaf => Err(BTreeError::KeyNotFound),
            Err(idx) => {
                let idx = self.fill_child(id, idx)?;
                let child = self.pool[id].children[idx];
                self.delete_from(child, key)
            }
        }
    }

    /// Delete `keys[idx]` of the internal node `id`
    fn delete_from_internal<Q>(&mut self, id: NodeId, idx: usize, key: &Q) -> Result<K>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let t = self.config.min_degree;
        let (left, right) = {
            let node = &self.pool[id];
            (node.children[idx], node.children[idx + 1])
        };

        if self.pool[left].len() >= t {
            let predecessor = self.pop_max(left)?;
            Ok(mem::replace(&mut self.pool[id].keys[idx], predecessor))
        } else if self.pool[right].len() >= t {
            let successor = self.pop_min(right)?;
            Ok(mem::replace(&mut self.pool[id].keys[idx], successor))
        } else {
            self.merge(id, idx);
            self.delete_from(left, key)
        }
    }

    /// Drop an empty root: an empty leaf empties the tree, an empty internal
    /// node hands the root over to its only child.
    fn shrink_root(&mut self) {
        let Some(root) = self.root else {
            return;
        };
        if !self.pool[root].is_empty() {
            return;
        }

        let old = self.pool.release(root);
        if old.is_leaf {
            self.root = None;
            self.height = 0;
        } else {
            // Only way to decrease the height of the tree by one
            self.root = Some(old.children[0]);
            self.height -= 1;
        }

        tracing::debug!(
            target: "btree_mem::root",
            old_root = root.value(),
            height = self.height,
            "collapsed root"
        );
    }

    /// Check every structural invariant of the tree.
    ///
    /// Verifies key order and bounds, node fill, child counts, uniform leaf
    /// depth, and that the arena holds exactly the reachable nodes.
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || self.height != 0 || self.pool.live() != 0 {
                return Err(BTreeError::corruption(format!(
                    "empty tree reports len={} height={} nodes={}",
                    self.len,
                    self.height,
                    self.pool.live()
                )));
            }
            return Ok(());
        };

        if self.pool.get(root).is_some_and(Node::is_empty) {
            return Err(BTreeError::corruption("root holds no keys"));
        }

        let mut walk = Walk::default();
        self.validate_node(root, None, None, 1, &mut walk)?;

        if walk.keys != self.len {
            return Err(BTreeError::corruption(format!(
                "found {} keys but len is {}",
                walk.keys, self.len
            )));
        }
        if walk.leaf_depth != Some(self.height) {
            return Err(BTreeError::corruption(format!(
                "leaves at depth {:?} but height is {}",
                walk.leaf_depth, self.height
            )));
        }
        if walk.nodes != self.pool.live() {
            return Err(BTreeError::corruption(format!(
                "{} reachable nodes but {} live in the pool",
                walk.nodes,
                self.pool.live()
            )));
        }
        Ok(())
    }

    fn validate_node<'a>(
        &'a self,
        id: NodeId,
        lower: Option<&'a K>,
        upper: Option<&'a K>,
        depth: usize,
        walk: &mut Walk,
    ) -> Result<()> {
        let node = self
            .pool
            .get(id)
            .ok_or_else(|| BTreeError::corruption(format!("dangling child {}", id)))?;

        walk.nodes += 1;
        walk.keys += node.len();
        if walk.nodes > self.pool.live() {
            return Err(BTreeError::corruption(format!(
                "node {} reached through more than one parent",
                id
            )));
        }

        if node.len() > self.config.max_keys() {
            return Err(BTreeError::corruption(format!(
                "node {} overflows with {} keys",
                id,
                node.len()
            )));
        }
        if Some(id) != self.root && node.len() < self.config.min_keys() {
            return Err(BTreeError::corruption(format!(
                "node {} underflows with {} keys",
                id,
                node.len()
            )));
        }
        if !node.keys.windows(2).all(|pair| pair[0] < pair[1]) {
            return Err(BTreeError::corruption(format!(
                "keys of node {} are not strictly increasing",
                id
            )));
        }
        if let (Some(lower), Some(first)) = (lower, node.keys.first()) {
            if first <= lower {
                return Err(BTreeError::corruption(format!(
                    "node {} holds a key below its separator",
                    id
                )));
            }
        }
        if let (Some(upper), Some(last)) = (upper, node.keys.last()) {
            if last >= upper {
                return Err(BTreeError::corruption(format!(
                    "node {} holds a key above its separator",
                    id
                )));
            }
        }

        if node.is_leaf {
            if !node.children.is_empty() {
                return Err(BTreeError::corruption(format!("leaf {} has children", id)));
            }
            return match walk.leaf_depth {
                None => {
                    walk.leaf_depth = Some(depth);
                    Ok(())
                }
                Some(expected) if expected == depth => Ok(()),
                Some(expected) => Err(BTreeError::corruption(format!(
                    "leaf {} at depth {} but other leaves at depth {}",
                    id, depth, expected
                ))),
            };
        }

        if node.children.len() != node.keys.len() + 1 {
            return Err(BTreeError::corruption(format!(
                "internal node {} has {} keys and {} children",
                id,
                node.keys.len(),
                node.children.len()
            )));
        }

        for (i, &child) in node.children.iter().enumerate() {
            let child_lower = if i == 0 { lower } else { Some(&node.keys[i - 1]) };
            let child_upper = node.keys.get(i).or(upper);
            self.validate_node(child, child_lower, child_upper, depth + 1, walk)?;
        }
        Ok(())
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<'a, K> IntoIterator for &'a BTree<K> {
    type Item = &'a K;
    type IntoIter = Iter<'a, K>;

    fn into_iter(self) -> Self::IntoIter {
        self.traverse()
    }
}
