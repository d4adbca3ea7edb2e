//! What a world needs from its host.
//!
//! Schema lookups come through [`SchemaSource`] and node ids through
//! [`NodeRegistry`]; the two traits here cover store sizing and which nodes
//! carry which components.

use component_schema::{ComponentId, SchemaSource};
use component_store::{NodeHandle, NodeRegistry};

use crate::error::HostError;

/// Number of instance slots every component store of a world gets.
pub trait CapacityProvider {
    fn component_store_size(&self) -> u32;
}

/// Node-to-component membership, owned by the host.
///
/// The world only reads and writes the store slot at the index the host
/// reports for a node.
pub trait ComponentAssociation {
    /// Attach `component` to `node`. Returns `false` if it was already there.
    fn add_component(&self, node: NodeHandle, component: ComponentId) -> Result<bool, HostError>;

    /// Detach `component` from `node`. Returns `false` if it was not there.
    fn remove_component(&self, node: NodeHandle, component: ComponentId)
    -> Result<bool, HostError>;

    fn has_component(&self, node: NodeHandle, component: ComponentId) -> Result<bool, HostError>;

    /// The instance index of `node` in every component store.
    fn component_store_index(&self, node: NodeHandle) -> Result<u32, HostError>;
}

/// Everything a [`World`](crate::World) consumes from its host.
pub trait Host: SchemaSource + NodeRegistry + CapacityProvider + ComponentAssociation {}

impl<T> Host for T where T: SchemaSource + NodeRegistry + CapacityProvider + ComponentAssociation {}
