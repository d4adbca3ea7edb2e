//! In-memory host.
//!
//! Backs schema lookups with a [`DefinitionRegistry`] and keeps its own node
//! table. Every live node owns one component store index; indices of
//! disposed nodes are reused.

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

use component_schema::{
    ComponentDefinition, ComponentId, DefaultValue, DefinitionRegistry, SchemaError, SchemaSource,
};
use component_store::{NodeHandle, NodeRegistry};
use tracing::{debug, warn};

use crate::config::WorldConfig;
use crate::error::HostError;
use crate::host::{CapacityProvider, ComponentAssociation};

#[derive(Debug)]
struct NodeRecord {
    store_index: u32,
    components: HashSet<ComponentId>,
}

#[derive(Debug, Default)]
struct NodeTable {
    next_id: u32,
    next_index: u32,
    free_indices: Vec<u32>,
    nodes: HashMap<u32, NodeRecord>,
}

/// A self-contained host for tools and tests.
#[derive(Debug)]
pub struct LocalHost {
    definitions: RefCell<DefinitionRegistry>,
    max_entities: u32,
    store_size: Cell<u32>,
    nodes: RefCell<NodeTable>,
}

impl LocalHost {
    /// # Errors
    ///
    /// [`HostError::StoreSizeTooLarge`] if `config` is invalid.
    pub fn new(definitions: DefinitionRegistry, config: WorldConfig) -> Result<Self, HostError> {
        config.validate()?;
        Ok(Self {
            definitions: RefCell::new(definitions),
            max_entities: config.max_entities,
            store_size: Cell::new(config.component_store_size),
            nodes: RefCell::new(NodeTable {
                next_id: 1,
                ..NodeTable::default()
            }),
        })
    }

    /// Register another component definition.
    pub fn define(&self, definition: ComponentDefinition) -> Result<ComponentId, SchemaError> {
        self.definitions.borrow_mut().define(definition)
    }

    #[must_use]
    pub fn max_entities(&self) -> u32 {
        self.max_entities
    }

    /// Change the instance capacity used for stores created from now on.
    ///
    /// # Errors
    ///
    /// [`HostError::StoreSizeTooLarge`] if `size` exceeds the entity limit.
    pub fn set_component_store_size(&self, size: u32) -> Result<(), HostError> {
        if size > self.max_entities {
            warn!(requested = size, max = self.max_entities, "rejected component store size");
            return Err(HostError::StoreSizeTooLarge {
                requested: size,
                max: self.max_entities,
            });
        }
        self.store_size.set(size);
        Ok(())
    }

    /// Create a node and give it a store index.
    ///
    /// # Errors
    ///
    /// [`HostError::TooManyNodes`] at the entity limit.
    pub fn create_node(&self) -> Result<NodeHandle, HostError> {
        let mut table = self.nodes.borrow_mut();
        if table.nodes.len() >= self.max_entities as usize {
            return Err(HostError::TooManyNodes {
                max: self.max_entities,
            });
        }
        let store_index = match table.free_indices.pop() {
            Some(index) => index,
            None => {
                let index = table.next_index;
                table.next_index += 1;
                index
            }
        };
        let node = NodeHandle::new(table.next_id).ok_or(HostError::TooManyNodes {
            max: self.max_entities,
        })?;
        table.next_id += 1;
        table.nodes.insert(
            node.raw(),
            NodeRecord {
                store_index,
                components: HashSet::new(),
            },
        );
        debug!(%node, store_index, "created node");
        Ok(node)
    }

    /// Remove a node; its store index becomes free again.
    pub fn dispose_node(&self, node: NodeHandle) -> Result<(), HostError> {
        let mut table = self.nodes.borrow_mut();
        let record = table
            .nodes
            .remove(&node.raw())
            .ok_or(HostError::UnknownNode(node))?;
        table.free_indices.push(record.store_index);
        debug!(%node, "disposed node");
        Ok(())
    }

    fn with_node<T>(
        &self,
        node: NodeHandle,
        f: impl FnOnce(&mut NodeRecord) -> T,
    ) -> Result<T, HostError> {
        let mut table = self.nodes.borrow_mut();
        let record = table
            .nodes
            .get_mut(&node.raw())
            .ok_or(HostError::UnknownNode(node))?;
        Ok(f(record))
    }

    fn check_component(&self, component: ComponentId) -> Result<(), HostError> {
        if self.definitions.borrow().get(component).is_none() {
            return Err(HostError::UnknownComponent(component));
        }
        Ok(())
    }
}

impl SchemaSource for LocalHost {
    fn find_component_by_name(&self, name: &str) -> ComponentId {
        self.definitions.borrow().find_component_by_name(name)
    }

    fn component_name(&self, id: ComponentId) -> Option<String> {
        self.definitions.borrow().component_name(id)
    }

    fn prop_count(&self, id: ComponentId) -> Option<u32> {
        self.definitions.borrow().prop_count(id)
    }

    fn prop_name(&self, id: ComponentId, index: u32) -> Option<String> {
        self.definitions.borrow().prop_name(id, index)
    }

    fn prop_type(&self, id: ComponentId, index: u32) -> Option<String> {
        self.definitions.borrow().prop_type(id, index)
    }

    fn prop_ref_type(&self, id: ComponentId, index: u32) -> Option<String> {
        self.definitions.borrow().prop_ref_type(id, index)
    }

    fn prop_storage_type(&self, id: ComponentId, index: u32) -> i32 {
        self.definitions.borrow().prop_storage_type(id, index)
    }

    fn prop_size(&self, id: ComponentId, index: u32) -> Option<u32> {
        self.definitions.borrow().prop_size(id, index)
    }

    fn prop_default(&self, id: ComponentId, index: u32) -> Option<DefaultValue> {
        self.definitions.borrow().prop_default(id, index)
    }
}

impl NodeRegistry for LocalHost {
    fn resolve_node_handle(&self, raw: u32) -> Option<NodeHandle> {
        if self.nodes.borrow().nodes.contains_key(&raw) {
            NodeHandle::new(raw)
        } else {
            None
        }
    }

    fn node_handle_to_raw_id(&self, node: NodeHandle) -> u32 {
        node.raw()
    }
}

impl CapacityProvider for LocalHost {
    fn component_store_size(&self) -> u32 {
        self.store_size.get()
    }
}

impl ComponentAssociation for LocalHost {
    fn add_component(&self, node: NodeHandle, component: ComponentId) -> Result<bool, HostError> {
        self.check_component(component)?;
        self.with_node(node, |record| record.components.insert(component))
    }

    fn remove_component(
        &self,
        node: NodeHandle,
        component: ComponentId,
    ) -> Result<bool, HostError> {
        self.with_node(node, |record| record.components.remove(&component))
    }

    fn has_component(&self, node: NodeHandle, component: ComponentId) -> Result<bool, HostError> {
        self.with_node(node, |record| record.components.contains(&component))
    }

    fn component_store_index(&self, node: NodeHandle) -> Result<u32, HostError> {
        self.with_node(node, |record| record.store_index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_schema::PropDefinition;

    fn host(max: u32, size: u32) -> LocalHost {
        let config = WorldConfig::new()
            .with_max_entities(max)
            .with_component_store_size(size);
        LocalHost::new(DefinitionRegistry::new(), config).unwrap()
    }

    #[test]
    fn test_store_size_limit() {
        let host = host(4, 4);
        assert_eq!(
            host.set_component_store_size(5),
            Err(HostError::StoreSizeTooLarge {
                requested: 5,
                max: 4
            })
        );
        assert_eq!(host.component_store_size(), 4);
        host.set_component_store_size(2).unwrap();
        assert_eq!(host.component_store_size(), 2);

        let config = WorldConfig::new()
            .with_max_entities(1)
            .with_component_store_size(2);
        assert!(LocalHost::new(DefinitionRegistry::new(), config).is_err());
    }

    #[test]
    fn test_nodes_and_store_indices() {
        let host = host(3, 3);
        let a = host.create_node().unwrap();
        let b = host.create_node().unwrap();
        assert_eq!(host.component_store_index(a), Ok(0));
        assert_eq!(host.component_store_index(b), Ok(1));
        assert_eq!(host.resolve_node_handle(a.raw()), Some(a));

        host.dispose_node(a).unwrap();
        assert_eq!(host.resolve_node_handle(a.raw()), None);
        assert_eq!(host.component_store_index(a), Err(HostError::UnknownNode(a)));

        let c = host.create_node().unwrap();
        assert_ne!(c, a);
        assert_eq!(host.component_store_index(c), Ok(0));
    }

    #[test]
    fn test_entity_limit() {
        let host = host(1, 1);
        host.create_node().unwrap();
        assert_eq!(host.create_node(), Err(HostError::TooManyNodes { max: 1 }));
    }

    #[test]
    fn test_association() {
        let host = host(2, 2);
        let id = host
            .define(ComponentDefinition::new("spin").with_prop(PropDefinition::new("rate", "f32")))
            .unwrap();
        let node = host.create_node().unwrap();

        assert_eq!(host.has_component(node, id), Ok(false));
        assert_eq!(host.add_component(node, id), Ok(true));
        assert_eq!(host.add_component(node, id), Ok(false));
        assert_eq!(host.has_component(node, id), Ok(true));
        assert_eq!(host.remove_component(node, id), Ok(true));
        assert_eq!(host.remove_component(node, id), Ok(false));

        assert_eq!(
            host.add_component(node, ComponentId(99)),
            Err(HostError::UnknownComponent(ComponentId(99)))
        );
    }

    #[test]
    fn test_schema_source_delegates() {
        let host = host(2, 2);
        let id = host
            .define(ComponentDefinition::new("spin").with_prop(PropDefinition::new("rate", "f32")))
            .unwrap();
        assert_eq!(host.find_component_by_name("spin"), id);
        assert_eq!(host.prop_name(id, 0).as_deref(), Some("rate"));
        assert_eq!(host.prop_storage_type(id, 0), 2);
    }
}
