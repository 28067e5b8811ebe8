//! Node pool implementation.
//!
//! The pool owns every node of a tree in a vector of slots. Nodes refer to
//! each other by [`NodeId`], so a parent owns its children through the IDs it
//! stores and no node is reachable through two owners. Released slots queue
//! up and are handed out again oldest first.

use crate::types::NodeId;
use std::collections::VecDeque;
use std::ops::{Index, IndexMut};

/// Slot arena holding nodes of type `T`
#[derive(Debug)]
pub struct NodePool<T> {
    /// Node slots indexed by node ID (`None` = free)
    slots: Vec<Option<T>>,
    /// Released slots awaiting reuse
    free: VecDeque<NodeId>,
    /// Number of occupied slots
    live: usize,
}

impl<T> Default for NodePool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> NodePool<T> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: VecDeque::new(),
            live: 0,
        }
    }

    /// Store a node and return its ID, reusing a released slot if any
    pub fn allocate(&mut self, node: T) -> NodeId {
        self.live += 1;

        if let Some(id) = self.free.pop_front() {
            self.slots[id.index()] = Some(node);
            return id;
        }

        let id = NodeId::new(self.slots.len() as u32);
        self.slots.push(Some(node));
        id
    }

    /// Take a node out of the pool, freeing its slot
    ///
    /// # Panics
    /// If the slot is already free. Every node is released exactly once.
    pub fn release(&mut self, id: NodeId) -> T {
        let Some(node) = self.slots.get_mut(id.index()).and_then(Option::take) else {
            panic!("node {} released while not allocated", id);
        };
        self.live -= 1;
        self.free.push_back(id);
        node
    }

    /// Borrow a node if the slot is occupied
    pub fn get(&self, id: NodeId) -> Option<&T> {
        self.slots.get(id.index()).and_then(Option::as_ref)
    }

    /// Mutably borrow a node if the slot is occupied
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut T> {
        self.slots.get_mut(id.index()).and_then(Option::as_mut)
    }

    /// Number of live nodes
    pub fn live(&self) -> usize {
        self.live
    }

    /// Number of released slots waiting for reuse
    pub fn free_slots(&self) -> usize {
        self.free.len()
    }

    /// Drop every node and forget all slots
    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
        self.live = 0;
    }
}

impl<T> Index<NodeId> for NodePool<T> {
    type Output = T;

    fn index(&self, id: NodeId) -> &T {
        match self.get(id) {
            Some(node) => node,
            None => panic!("dangling node reference {}", id),
        }
    }
}

impl<T> IndexMut<NodeId> for NodePool<T> {
    fn index_mut(&mut self, id: NodeId) -> &mut T {
        match self.get_mut(id) {
            Some(node) => node,
            None => panic!("dangling node reference {}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_allocate_and_index() {
        let mut pool = NodePool::new();
        let a = pool.allocate("a");
        let b = pool.allocate("b");

        assert_eq!(a, NodeId::new(0));
        assert_eq!(b, NodeId::new(1));
        assert_eq!(pool[a], "a");
        assert_eq!(pool.live(), 2);

        pool[b] = "bb";
        assert_eq!(pool.get(b), Some(&"bb"));
    }

    #[test]
    fn test_pool_reuses_released_slots() {
        let mut pool = NodePool::new();
        let a = pool.allocate(1);
        let b = pool.allocate(2);

        assert_eq!(pool.release(a), 1);
        assert_eq!(pool.live(), 1);
        assert_eq!(pool.free_slots(), 1);
        assert!(pool.get(a).is_none());

        let c = pool.allocate(3);
        assert_eq!(c, a);
        assert_eq!(pool.free_slots(), 0);
        assert_eq!(pool[c], 3);
        assert_eq!(pool[b], 2);
    }

    #[test]
    fn test_pool_reuses_oldest_release_first() {
        let mut pool = NodePool::new();
        let ids: Vec<NodeId> = (0..4).map(|n| pool.allocate(n)).collect();

        pool.release(ids[2]);
        pool.release(ids[0]);
        assert_eq!(pool.free_slots(), 2);

        assert_eq!(pool.allocate(10), ids[2]);
        assert_eq!(pool.allocate(11), ids[0]);
        assert_eq!(pool.allocate(12), NodeId::new(4));
        assert_eq!(pool.live(), 5);
    }

    #[test]
    #[should_panic(expected = "released while not allocated")]
    fn test_pool_double_release_panics() {
        let mut pool = NodePool::new();
        let a = pool.allocate(1);
        pool.release(a);
        pool.release(a);
    }

    #[test]
    fn test_pool_clear() {
        let mut pool = NodePool::new();
        let a = pool.allocate(1);
        pool.allocate(2);
        pool.release(a);
        pool.clear();

        assert_eq!(pool.live(), 0);
        assert_eq!(pool.free_slots(), 0);
        assert_eq!(pool.allocate(9), NodeId::new(0));
    }
}
