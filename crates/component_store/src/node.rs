//! Node references.
//!
//! A `ref` field stores a raw 32-bit node id. `0` is reserved for "no node",
//! which surfaces as `None` instead of a handle.

use std::fmt;
use std::num::NonZeroU32;

/// A handle to a live scene node. Never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeHandle(NonZeroU32);

impl NodeHandle {
    /// Wrap a raw id; `0` yields `None`.
    #[must_use]
    pub const fn new(raw: u32) -> Option<Self> {
        match NonZeroU32::new(raw) {
            Some(id) => Some(Self(id)),
            None => None,
        }
    }

    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for NodeHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Translation between raw node ids stored in component buffers and node
/// handles handed to callers.
pub trait NodeRegistry {
    /// Resolve a non-zero raw id. `None` if the host does not know the node.
    fn resolve_node_handle(&self, raw: u32) -> Option<NodeHandle>;

    /// The raw id to store for `node`.
    fn node_handle_to_raw_id(&self, node: NodeHandle) -> u32;
}

/// A registry that treats every non-zero raw id as a node.
#[derive(Debug, Clone, Copy, Default)]
pub struct RawNodeIds;

impl NodeRegistry for RawNodeIds {
    fn resolve_node_handle(&self, raw: u32) -> Option<NodeHandle> {
        NodeHandle::new(raw)
    }

    fn node_handle_to_raw_id(&self, node: NodeHandle) -> u32 {
        node.raw()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_not_a_handle() {
        assert!(NodeHandle::new(0).is_none());
        assert_eq!(NodeHandle::new(9).map(NodeHandle::raw), Some(9));
    }

    #[test]
    fn test_raw_node_ids() {
        let nodes = RawNodeIds;
        let node = nodes.resolve_node_handle(3).unwrap();
        assert_eq!(nodes.node_handle_to_raw_id(node), 3);
        assert_eq!(node.to_string(), "Node(3)");
    }
}
