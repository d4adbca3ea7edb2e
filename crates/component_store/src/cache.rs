//! Canonical views per instance index.

use std::collections::HashMap;
use std::rc::Rc;

use tracing::debug;

use crate::binder::ViewType;
use crate::error::{BoundsError, StoreError};
use crate::store::ComponentStore;
use crate::view::ComponentView;

/// Maps instance indices of one store to their single [`ComponentView`].
///
/// Entries are created on first request and only removed by
/// [`dispose`](Self::dispose), after which the cache hands out nothing.
#[derive(Debug)]
pub struct InstanceCache {
    store: Rc<ComponentStore>,
    view_type: Rc<ViewType>,
    views: HashMap<u32, Rc<ComponentView>>,
    disposed: bool,
}

impl InstanceCache {
    pub fn new(store: Rc<ComponentStore>, view_type: Rc<ViewType>) -> Self {
        Self {
            store,
            view_type,
            views: HashMap::new(),
            disposed: false,
        }
    }

    #[must_use]
    pub fn store(&self) -> &Rc<ComponentStore> {
        &self.store
    }

    #[must_use]
    pub fn view_type(&self) -> &Rc<ViewType> {
        &self.view_type
    }

    /// The view of instance `index`, created on the first call.
    ///
    /// # Errors
    ///
    /// [`StoreError::Disposed`] once the cache or the store is gone, and
    /// [`BoundsError::Instance`] for `index >= capacity`.
    pub fn get_or_create(&mut self, index: u32) -> Result<Rc<ComponentView>, StoreError> {
        if self.disposed || self.store.is_disposed() {
            return Err(StoreError::Disposed(self.store.id()));
        }
        if let Some(view) = self.views.get(&index) {
            return Ok(Rc::clone(view));
        }
        let capacity = self.store.capacity();
        if index >= capacity {
            return Err(BoundsError::Instance { index, capacity }.into());
        }

        let view = Rc::new(ComponentView::new(
            Rc::clone(&self.store),
            Rc::clone(&self.view_type),
            index,
        ));
        view.activate();
        self.views.insert(index, Rc::clone(&view));
        Ok(view)
    }

    /// The view of `index` if one was already created.
    #[must_use]
    pub fn get(&self, index: u32) -> Option<Rc<ComponentView>> {
        self.views.get(&index).cloned()
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Mark every view disposed and drop the cache entries. The owner
    /// disposes the store afterwards.
    pub fn dispose(&mut self) {
        self.disposed = true;
        debug!(component = %self.store.id(), views = self.views.len(), "disposing instance cache");
        for view in self.views.values() {
            view.mark_disposed();
        }
        self.views.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binder::AccessorBinder;
    use crate::node::RawNodeIds;
    use crate::view::{FieldValue, ViewState};
    use component_schema::{ComponentId, ComponentSchema, FieldDescriptor, FieldType};

    fn cache(capacity: u32) -> InstanceCache {
        let schema = ComponentSchema::new("health")
            .with_field(FieldDescriptor::new("hp", FieldType::Int32))
            .with_field(FieldDescriptor::new("pos", FieldType::Vec3));
        let store = Rc::new(ComponentStore::create(ComponentId(1), schema.clone(), capacity).unwrap());
        let view_type = AccessorBinder::new()
            .bind(ComponentId(1), &schema, Rc::new(RawNodeIds))
            .unwrap();
        InstanceCache::new(store, view_type)
    }

    #[test]
    fn test_health_scenario() {
        let mut cache = cache(2);
        assert_eq!(cache.store().layout().field_offsets, vec![0, 8]);
        assert_eq!(cache.store().layout().total_bytes, 32);

        let hp = cache.view_type().field("hp").unwrap().clone();
        let pos = cache.view_type().field("pos").unwrap().clone();

        cache.get_or_create(1).unwrap().set_i32(&hp, 42).unwrap();
        assert_eq!(cache.get_or_create(1).unwrap().get_i32(&hp).unwrap(), 42);

        let first = cache.get_or_create(0).unwrap();
        first.composite(&pos).unwrap().set_slice(&[1.0, 2.0, 3.0]).unwrap();
        let again = cache.get_or_create(0).unwrap();
        assert_eq!(again.composite(&pos).unwrap().y().unwrap(), 2.0);
        assert_eq!(again.get_field("hp").unwrap(), FieldValue::Int32(0));
    }

    #[test]
    fn test_identity_is_stable() {
        let mut cache = cache(4);
        let a = cache.get_or_create(2).unwrap();
        let b = cache.get_or_create(2).unwrap();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(!Rc::ptr_eq(&a, &cache.get_or_create(3).unwrap()));
        assert_eq!(cache.len(), 2);
        assert_eq!(a.state(), ViewState::Active);

        let pos = cache.view_type().field("pos").unwrap().clone();
        assert!(Rc::ptr_eq(&a.composite(&pos).unwrap(), &b.composite(&pos).unwrap()));
    }

    #[test]
    fn test_bounds() {
        let mut cache = cache(2);
        assert!(matches!(
            cache.get_or_create(2),
            Err(StoreError::Bounds(BoundsError::Instance { index: 2, capacity: 2 }))
        ));
        assert!(cache.is_empty());

        let mut empty = self::cache(0);
        assert!(empty.get_or_create(0).is_err());
    }

    #[test]
    fn test_dispose_marks_views() {
        let mut cache = cache(2);
        let view = cache.get_or_create(0).unwrap();
        cache.dispose();
        cache.store().dispose();

        assert_eq!(view.state(), ViewState::Disposed);
        assert!(cache.get(0).is_none());
        assert!(matches!(view.get_field("hp"), Err(StoreError::Disposed(_))));
        assert!(matches!(cache.get_or_create(0), Err(StoreError::Disposed(_))));
    }

    #[test]
    fn test_disposed_cache_stays_disposed() {
        let mut cache = cache(2);
        cache.get_or_create(1).unwrap();
        cache.dispose();
        assert!(cache.is_disposed());
        assert!(!cache.store().is_disposed());

        assert!(matches!(cache.get_or_create(1), Err(StoreError::Disposed(ComponentId(1)))));
        assert!(cache.is_empty());
    }
}
