//! Node arena: slot storage for tree nodes.
//!
//! Nodes are allocated on root creation and on every split, and released
//! exactly once when merged away or when the root collapses.

mod pool;

pub use pool::NodePool;
