//! World runtime: one component store per component type, created on demand.
//!
//! Creating a store runs the whole pipeline (read schema, compile layout,
//! allocate, bind accessors) and registers the store only once every step
//! has succeeded. Stores are addressed through [`StoreHandle`]s, which carry
//! a generation so that a handle to a disposed store stays invalid even if a
//! store for the same component is created again.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use component_schema::{ComponentId, SchemaReader};
use component_store::{
    AccessorBinder, ComponentStore, ComponentView, InstanceCache, NodeHandle, NodeRegistry,
    StoreError, StoreSnapshot, ViewType,
};
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::WorldError;
use crate::host::Host;

/// A reference to a live store of a [`World`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreHandle {
    id: ComponentId,
    generation: u64,
}

impl StoreHandle {
    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.id
    }
}

impl fmt::Display for StoreHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Store({}#{})", self.id.0, self.generation)
    }
}

struct StoreEntry {
    generation: u64,
    cache: InstanceCache,
}

/// The component stores of one host.
pub struct World<H: Host + 'static> {
    host: Rc<H>,
    session: Uuid,
    binder: AccessorBinder,
    stores: HashMap<ComponentId, StoreEntry>,
    next_generation: u64,
}

impl<H: Host + 'static> World<H> {
    pub fn new(host: Rc<H>) -> Self {
        let session = Uuid::new_v4();
        info!(%session, capacity = host.component_store_size(), "world created");
        Self {
            host,
            session,
            binder: AccessorBinder::new(),
            stores: HashMap::new(),
            next_generation: 1,
        }
    }

    #[must_use]
    pub fn host(&self) -> &Rc<H> {
        &self.host
    }

    /// Identifier of this world instance, attached to its log events.
    #[must_use]
    pub fn session(&self) -> Uuid {
        self.session
    }

    /// Number of live stores.
    #[must_use]
    pub fn store_count(&self) -> usize {
        self.stores.len()
    }

    // -- Store lifecycle --

    /// The store for component `id`, created on first use.
    ///
    /// # Errors
    ///
    /// Schema, layout and binding errors abort the creation; nothing is
    /// registered in that case.
    pub fn create_store(&mut self, id: ComponentId) -> Result<StoreHandle, WorldError> {
        if let Some(entry) = self.stores.get(&id) {
            return Ok(StoreHandle {
                id,
                generation: entry.generation,
            });
        }

        let schema = SchemaReader::new(self.host.as_ref()).read(id)?;
        let capacity = self.host.component_store_size();
        let store = Rc::new(ComponentStore::create(id, schema, capacity).map_err(StoreError::from)?);
        let nodes: Rc<dyn NodeRegistry> = self.host.clone();
        let view_type = self
            .binder
            .bind(id, store.schema(), nodes)
            .map_err(StoreError::from)?;

        let generation = self.next_generation;
        self.next_generation += 1;
        info!(
            session = %self.session,
            component = %store.schema().name,
            %id,
            capacity,
            bytes = store.layout().total_bytes,
            "created component store"
        );
        self.stores.insert(
            id,
            StoreEntry {
                generation,
                cache: InstanceCache::new(store, view_type),
            },
        );
        Ok(StoreHandle { id, generation })
    }

    /// Look a component up by name and return its store, creating it if
    /// needed. `None` if the host knows no such component.
    pub fn find_store_by_name(&mut self, name: &str) -> Result<Option<StoreHandle>, WorldError> {
        let id = self.host.find_component_by_name(name);
        if !id.is_valid() {
            return Ok(None);
        }
        self.create_store(id).map(Some)
    }

    fn entry(&self, handle: StoreHandle) -> Result<&StoreEntry, WorldError> {
        match self.stores.get(&handle.id) {
            Some(entry) if entry.generation == handle.generation => Ok(entry),
            _ => {
                warn!(session = %self.session, %handle, "stale store handle");
                Err(WorldError::StaleHandle(handle.id))
            }
        }
    }

    fn entry_mut(&mut self, handle: StoreHandle) -> Result<&mut StoreEntry, WorldError> {
        match self.stores.get_mut(&handle.id) {
            Some(entry) if entry.generation == handle.generation => Ok(entry),
            _ => {
                warn!(session = %self.session, %handle, "stale store handle");
                Err(WorldError::StaleHandle(handle.id))
            }
        }
    }

    pub fn store(&self, handle: StoreHandle) -> Result<&Rc<ComponentStore>, WorldError> {
        Ok(self.entry(handle)?.cache.store())
    }

    pub fn view_type(&self, handle: StoreHandle) -> Result<&Rc<ViewType>, WorldError> {
        Ok(self.entry(handle)?.cache.view_type())
    }

    /// The canonical view of instance `index` of a store.
    pub fn get_view(
        &mut self,
        handle: StoreHandle,
        index: u32,
    ) -> Result<Rc<ComponentView>, WorldError> {
        Ok(self.entry_mut(handle)?.cache.get_or_create(index)?)
    }

    /// Dispose a store: its views first, then its buffer. The handle and
    /// every view of the store are unusable afterwards.
    pub fn dispose(&mut self, handle: StoreHandle) -> Result<(), WorldError> {
        self.entry(handle)?;
        if let Some(mut entry) = self.stores.remove(&handle.id) {
            entry.cache.dispose();
            entry.cache.store().dispose();
            info!(session = %self.session, %handle, "disposed component store");
        }
        Ok(())
    }

    /// Dispose every store. Also runs when the world is dropped.
    pub fn teardown(&mut self) {
        if self.stores.is_empty() {
            return;
        }
        let count = self.stores.len();
        for (_, mut entry) in self.stores.drain() {
            entry.cache.dispose();
            entry.cache.store().dispose();
        }
        info!(session = %self.session, stores = count, "world torn down");
    }

    // -- Snapshots --

    pub fn snapshot(&self, handle: StoreHandle) -> Result<StoreSnapshot, WorldError> {
        Ok(self.store(handle)?.snapshot()?)
    }

    pub fn restore(&self, handle: StoreHandle, snapshot: &StoreSnapshot) -> Result<(), WorldError> {
        Ok(self.store(handle)?.restore(snapshot)?)
    }

    // -- Node association --

    /// Attach component `id` to `node` and return the node's view.
    ///
    /// When the node did not have the component yet, its slot is reset to
    /// the field defaults.
    pub fn add_component(
        &mut self,
        node: NodeHandle,
        id: ComponentId,
    ) -> Result<Rc<ComponentView>, WorldError> {
        let handle = self.create_store(id)?;
        let index = self.host.component_store_index(node)?;
        let view = self.get_view(handle, index)?;
        if self.host.add_component(node, id)? {
            self.store(handle)?.reset_instance(index)?;
        }
        Ok(view)
    }

    /// Detach component `id` from `node`. Returns `false` if it was not
    /// attached.
    pub fn remove_component(&mut self, node: NodeHandle, id: ComponentId) -> Result<bool, WorldError> {
        Ok(self.host.remove_component(node, id)?)
    }

    pub fn has_component(&self, node: NodeHandle, id: ComponentId) -> Result<bool, WorldError> {
        Ok(self.host.has_component(node, id)?)
    }

    /// The view of component `id` on `node`, or `None` if the node does not
    /// have it.
    pub fn get_component(
        &mut self,
        node: NodeHandle,
        id: ComponentId,
    ) -> Result<Option<Rc<ComponentView>>, WorldError> {
        if !self.host.has_component(node, id)? {
            return Ok(None);
        }
        let handle = self.create_store(id)?;
        let index = self.host.component_store_index(node)?;
        Ok(Some(self.get_view(handle, index)?))
    }
}

impl<H: Host + 'static> Drop for World<H> {
    fn drop(&mut self) {
        self.teardown();
    }
}
