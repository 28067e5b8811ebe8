//! Arena handle for tree nodes.

use std::fmt;

/// Handle to a node slot in a [`NodePool`](crate::arena::NodePool).
///
/// Handles are plain slot positions handed out by the pool. A released slot
/// may be handed out again, so a handle is only meaningful while the node it
/// names is live.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u32);

impl NodeId {
    pub const fn new(slot: u32) -> Self {
        Self(slot)
    }

    /// Raw slot number, as shown in tree exports
    pub const fn value(self) -> u32 {
        self.0
    }

    pub(crate) const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_slot_and_display() {
        let id = NodeId::new(42);
        assert_eq!(id.value(), 42);
        assert_eq!(id.index(), 42);
        assert_eq!(id.to_string(), "#42");
    }
}
