//! B-tree implementation.
//!
//! This module provides an in-memory B-tree that supports:
//! - Point lookups (search)
//! - Insertions with preemptive splitting (insert)
//! - Deletions with borrow/merge rebalancing (delete)
//! - In-order traversal (traverse)

mod cursor;
mod node;
mod rebalance;
mod tree;

pub use cursor::Iter;
pub use node::Node;
pub use tree::{BTree, TreeNode, TreeStats};
