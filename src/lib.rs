//! # BTree Engine
//!
//! An in-memory B-tree of fixed minimum degree `t`, storing ordered, unique
//! keys with logarithmic search, insertion and deletion.
//!
//! ## Architecture
//!
//! - **B-Tree Layer** (`btree`): search, top-down insert with preemptive
//!   splits, top-down delete with rotate/merge rebalancing, in-order cursor
//! - **Arena** (`arena`): node slots addressed by `NodeId`, with a free list
//!   so every node is released exactly once
//! - **Types** (`types`): `BTreeConfig` and `NodeId`
//!
//! ## Usage
//!
//! ```rust
//! use btree_mem::{BTree, BTreeError};
//!
//! let mut tree = BTree::new(2)?;
//! for key in [7, 11, 3, 10, 14] {
//!     tree.insert(key);
//! }
//!
//! assert!(tree.search(&10));
//! assert_eq!(tree.delete(&3)?, 3);
//! assert!(matches!(tree.delete(&3), Err(BTreeError::KeyNotFound)));
//!
//! let keys: Vec<_> = tree.traverse().copied().collect();
//! assert_eq!(keys, vec![7, 10, 11, 14]);
//! # Ok::<(), BTreeError>(())
//! ```

pub mod arena;
pub mod btree;
pub mod error;
pub mod types;

pub use error::{BTreeError, Result};
pub use types::{BTreeConfig, NodeId, DEFAULT_MIN_DEGREE, MIN_DEGREE};

// Re-export main public API
pub use btree::{BTree, Iter, Node, TreeNode, TreeStats};
