//! The packed buffer behind one component type.

use std::cell::{Cell, RefCell};

use component_schema::{ComponentId, ComponentSchema, FieldType};
use tracing::debug;

use crate::error::{BoundsError, LayoutError, StoreError};
use crate::layout::{LayoutTable, compile};
use crate::snapshot::StoreSnapshot;

/// One zero-initialised buffer holding `capacity` instances of a component,
/// laid out by its [`LayoutTable`].
///
/// The buffer never grows. After [`dispose`](Self::dispose) it is freed and
/// every access fails with [`StoreError::Disposed`].
#[derive(Debug)]
pub struct ComponentStore {
    id: ComponentId,
    schema: ComponentSchema,
    layout: LayoutTable,
    /// Encoded default words of each field, empty when the field has none.
    defaults: Vec<Vec<u32>>,
    buffer: RefCell<Vec<u8>>,
    disposed: Cell<bool>,
}

impl ComponentStore {
    /// Compile `schema` and allocate a store for `capacity` instances.
    ///
    /// # Errors
    ///
    /// Any [`LayoutError`] from [`compile`], or
    /// [`LayoutError::InvalidDefault`] when a default value cannot be
    /// encoded in its field's storage.
    pub fn create(
        id: ComponentId,
        schema: ComponentSchema,
        capacity: u32,
    ) -> Result<Self, LayoutError> {
        let layout = compile(&schema, capacity)?;

        let defaults = schema
            .fields
            .iter()
            .map(|field| match &field.default {
                None => Ok(Vec::new()),
                // Node refs always start out null.
                Some(_) if field.field_type() == Some(FieldType::NodeRef) => {
                    Err(LayoutError::InvalidDefault {
                        field: field.name.clone(),
                    })
                }
                Some(value) => value
                    .to_words(field.storage, field.storage_words)
                    .ok_or_else(|| LayoutError::InvalidDefault {
                        field: field.name.clone(),
                    }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        debug!(component = %schema.name, %id, bytes = layout.total_bytes, "allocated component store");
        Ok(Self {
            id,
            buffer: RefCell::new(vec![0; layout.total_bytes as usize]),
            schema,
            layout,
            defaults,
            disposed: Cell::new(false),
        })
    }

    #[must_use]
    pub fn id(&self) -> ComponentId {
        self.id
    }

    #[must_use]
    pub fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutTable {
        &self.layout
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.layout.capacity
    }

    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed.get()
    }

    /// Byte address of the slot of field `field` for instance `instance`.
    ///
    /// This is the only address formula; reads and writes both go through it.
    ///
    /// # Errors
    ///
    /// [`BoundsError`] if either index is out of range.
    pub fn address_of(&self, field: usize, instance: u32) -> Result<usize, BoundsError> {
        let count = self.layout.field_count();
        if field >= count {
            return Err(BoundsError::Field {
                index: field,
                count,
            });
        }
        if instance >= self.layout.capacity {
            return Err(BoundsError::Instance {
                index: instance,
                capacity: self.layout.capacity,
            });
        }
        let slot = self.layout.field_words[field] as usize * 4;
        Ok(self.layout.field_offsets[field] as usize + slot * instance as usize)
    }

    fn word_address(&self, field: usize, instance: u32, element: usize) -> Result<usize, StoreError> {
        if self.disposed.get() {
            return Err(StoreError::Disposed(self.id));
        }
        let base = self.address_of(field, instance)?;
        let len = self.layout.field_words[field] as usize;
        if element >= len {
            return Err(BoundsError::Element {
                index: element,
                len,
            }
            .into());
        }
        Ok(base + element * 4)
    }

    /// Read word `element` of a slot as raw little-endian bits.
    pub fn read_word(&self, field: usize, instance: u32, element: usize) -> Result<u32, StoreError> {
        let addr = self.word_address(field, instance, element)?;
        let buffer = self.buffer.borrow();
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(&buffer[addr..addr + 4]);
        Ok(u32::from_le_bytes(bytes))
    }

    /// Write word `element` of a slot as raw little-endian bits.
    pub fn write_word(
        &self,
        field: usize,
        instance: u32,
        element: usize,
        word: u32,
    ) -> Result<(), StoreError> {
        let addr = self.word_address(field, instance, element)?;
        self.buffer.borrow_mut()[addr..addr + 4].copy_from_slice(&word.to_le_bytes());
        Ok(())
    }

    /// Write every field's default (or zero) into the slots of `instance`.
    pub fn reset_instance(&self, instance: u32) -> Result<(), StoreError> {
        if self.disposed.get() {
            return Err(StoreError::Disposed(self.id));
        }
        if instance >= self.layout.capacity {
            return Err(BoundsError::Instance {
                index: instance,
                capacity: self.layout.capacity,
            }
            .into());
        }
        for (field, default) in self.defaults.iter().enumerate() {
            for element in 0..self.layout.field_words[field] as usize {
                let word = default.get(element).copied().unwrap_or(0);
                self.write_word(field, instance, element, word)?;
            }
        }
        Ok(())
    }

    /// Free the buffer. Idempotent.
    pub fn dispose(&self) {
        if !self.disposed.replace(true) {
            *self.buffer.borrow_mut() = Vec::new();
            debug!(component = %self.schema.name, id = %self.id, "disposed component store");
        }
    }

    /// Copy the buffer out together with its layout.
    pub fn snapshot(&self) -> Result<StoreSnapshot, StoreError> {
        if self.disposed.get() {
            return Err(StoreError::Disposed(self.id));
        }
        Ok(StoreSnapshot {
            component: self.schema.name.clone(),
            layout: self.layout.clone(),
            bytes: self.buffer.borrow().clone(),
        })
    }

    /// Overwrite the buffer from a snapshot taken with an identical layout.
    ///
    /// # Errors
    ///
    /// [`StoreError::LayoutMismatch`] if the snapshot's component name,
    /// layout or byte length differ from this store's.
    pub fn restore(&self, snapshot: &StoreSnapshot) -> Result<(), StoreError> {
        if self.disposed.get() {
            return Err(StoreError::Disposed(self.id));
        }
        if snapshot.component != self.schema.name
            || snapshot.layout != self.layout
            || snapshot.bytes.len() != self.layout.total_bytes as usize
        {
            return Err(StoreError::LayoutMismatch(self.schema.name.clone()));
        }
        self.buffer.borrow_mut().copy_from_slice(&snapshot.bytes);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_schema::{DefaultValue, FieldDescriptor};

    fn health_store(capacity: u32) -> ComponentStore {
        let schema = ComponentSchema::new("health")
            .with_field(FieldDescriptor::new("hp", FieldType::Int32))
            .with_field(FieldDescriptor::new("pos", FieldType::Vec3));
        ComponentStore::create(ComponentId(1), schema, capacity).unwrap()
    }

    #[test]
    fn test_address_of() {
        let store = health_store(2);
        assert_eq!(store.address_of(0, 0), Ok(0));
        assert_eq!(store.address_of(0, 1), Ok(4));
        assert_eq!(store.address_of(1, 0), Ok(8));
        assert_eq!(store.address_of(1, 1), Ok(20));
    }

    #[test]
    fn test_address_bounds() {
        let store = health_store(2);
        assert_eq!(
            store.address_of(0, 2),
            Err(BoundsError::Instance {
                index: 2,
                capacity: 2
            })
        );
        assert_eq!(
            store.address_of(2, 0),
            Err(BoundsError::Field { index: 2, count: 2 })
        );
        assert!(matches!(
            store.read_word(1, 0, 3),
            Err(StoreError::Bounds(BoundsError::Element { index: 3, len: 3 }))
        ));
    }

    #[test]
    fn test_words_are_little_endian_and_zeroed() {
        let store = health_store(2);
        assert_eq!(store.read_word(0, 1, 0).unwrap(), 0);
        store.write_word(0, 1, 0, 0x0102_0304).unwrap();
        assert_eq!(store.read_word(0, 1, 0).unwrap(), 0x0102_0304);
        assert_eq!(store.buffer.borrow()[4..8], [4, 3, 2, 1]);
        assert_eq!(store.read_word(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_zero_capacity_and_tag_stores() {
        let store = health_store(0);
        assert!(matches!(
            store.read_word(0, 0, 0),
            Err(StoreError::Bounds(BoundsError::Instance { .. }))
        ));

        let tag = ComponentStore::create(ComponentId(2), ComponentSchema::new("tag"), 4).unwrap();
        assert!(matches!(
            tag.read_word(0, 0, 0),
            Err(StoreError::Bounds(BoundsError::Field { .. }))
        ));
        tag.reset_instance(3).unwrap();
    }

    #[test]
    fn test_reset_instance_writes_defaults() {
        let schema = ComponentSchema::new("health")
            .with_field(
                FieldDescriptor::new("hp", FieldType::Int32).with_default(DefaultValue::Number(100.0)),
            )
            .with_field(
                FieldDescriptor::new("pos", FieldType::Vec3)
                    .with_default(DefaultValue::List(vec![0.0, 1.0, 0.0])),
            )
            .with_field(FieldDescriptor::new("score", FieldType::UInt32));
        let store = ComponentStore::create(ComponentId(1), schema, 2).unwrap();
        store.write_word(2, 1, 0, 7).unwrap();
        store.reset_instance(1).unwrap();
        assert_eq!(store.read_word(0, 1, 0).unwrap(), 100);
        assert_eq!(store.read_word(1, 1, 1).unwrap(), 1.0f32.to_bits());
        assert_eq!(store.read_word(2, 1, 0).unwrap(), 0);
        assert_eq!(store.read_word(0, 0, 0).unwrap(), 0);
    }

    #[test]
    fn test_invalid_default_rejected() {
        let schema = ComponentSchema::new("bad").with_field(
            FieldDescriptor::new("pos", FieldType::Vec3).with_default(DefaultValue::Number(1.0)),
        );
        let err = ComponentStore::create(ComponentId(1), schema, 1).unwrap_err();
        assert_eq!(
            err,
            LayoutError::InvalidDefault {
                field: "pos".to_string()
            }
        );
    }

    #[test]
    fn test_node_ref_default_rejected() {
        let schema = ComponentSchema::new("follow").with_field(
            FieldDescriptor::new("target", FieldType::NodeRef).with_default(DefaultValue::Number(5.0)),
        );
        assert_eq!(
            ComponentStore::create(ComponentId(1), schema, 2).unwrap_err(),
            LayoutError::InvalidDefault {
                field: "target".to_string()
            }
        );
    }

    #[test]
    fn test_dispose_frees_and_rejects() {
        let store = health_store(2);
        store.dispose();
        store.dispose();
        assert!(store.is_disposed());
        assert!(store.buffer.borrow().is_empty());
        assert!(matches!(
            store.read_word(0, 0, 0),
            Err(StoreError::Disposed(ComponentId(1)))
        ));
        assert!(matches!(store.reset_instance(0), Err(StoreError::Disposed(_))));
        assert!(matches!(store.snapshot(), Err(StoreError::Disposed(_))));
    }

    #[test]
    fn test_restore_checks_layout() {
        let store = health_store(2);
        store.write_word(0, 0, 0, 42).unwrap();
        let snapshot = store.snapshot().unwrap();

        let copy = health_store(2);
        copy.restore(&snapshot).unwrap();
        assert_eq!(copy.read_word(0, 0, 0).unwrap(), 42);

        let bigger = health_store(3);
        assert!(matches!(
            bigger.restore(&snapshot),
            Err(StoreError::LayoutMismatch(ref n)) if n == "health"
        ));
    }
}
