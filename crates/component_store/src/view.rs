//! Per-instance views of a component store.

use std::cell::{Cell, OnceCell};
use std::fmt;
use std::rc::Rc;

use component_schema::ComponentId;

use crate::binder::{AccessorKind, FieldAccessor, ViewType};
use crate::composite::CompositeView;
use crate::error::StoreError;
use crate::node::NodeHandle;
use crate::store::ComponentStore;

/// Lifecycle of a view. There is no way back from `Disposed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Unbound,
    Active,
    Disposed,
}

/// A field value read from or written to a view.
#[derive(Debug, Clone)]
pub enum FieldValue {
    Bool(bool),
    Int32(i32),
    UInt32(u32),
    Float(f64),
    Node(Option<NodeHandle>),
    Composite(Rc<CompositeView>),
}

impl PartialEq for FieldValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Int32(a), Self::Int32(b)) => a == b,
            (Self::UInt32(a), Self::UInt32(b)) => a == b,
            (Self::Float(a), Self::Float(b)) => a == b,
            (Self::Node(a), Self::Node(b)) => a == b,
            (Self::Composite(a), Self::Composite(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Int32(v) => write!(f, "{v}"),
            Self::UInt32(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Node(Some(node)) => write!(f, "{node}"),
            Self::Node(None) => write!(f, "null"),
            Self::Composite(view) => match view.to_vec() {
                Ok(values) => write!(f, "{values:?}"),
                Err(_) => write!(f, "<disposed>"),
            },
        }
    }
}

/// The canonical view of one instance slot of a store.
///
/// Views come from an [`InstanceCache`](crate::InstanceCache), which hands
/// out the same `Rc` for the same index every time. Every get and set is one
/// address computation plus one typed word access.
pub struct ComponentView {
    store: Rc<ComponentStore>,
    view_type: Rc<ViewType>,
    index: u32,
    composites: Vec<OnceCell<Rc<CompositeView>>>,
    state: Cell<ViewState>,
}

impl ComponentView {
    pub(crate) fn new(store: Rc<ComponentStore>, view_type: Rc<ViewType>, index: u32) -> Self {
        let composites = view_type
            .accessors()
            .iter()
            .map(|_| OnceCell::new())
            .collect();
        Self {
            store,
            view_type,
            index,
            composites,
            state: Cell::new(ViewState::Unbound),
        }
    }

    pub(crate) fn activate(&self) {
        if self.state.get() == ViewState::Unbound {
            self.state.set(ViewState::Active);
        }
    }

    pub(crate) fn mark_disposed(&self) {
        self.state.set(ViewState::Disposed);
    }

    #[must_use]
    pub fn index(&self) -> u32 {
        self.index
    }

    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.view_type.component()
    }

    #[must_use]
    pub fn view_type(&self) -> &Rc<ViewType> {
        &self.view_type
    }

    #[must_use]
    pub fn state(&self) -> ViewState {
        self.state.get()
    }

    fn check(&self, accessor: &FieldAccessor) -> Result<(), StoreError> {
        if self.state.get() == ViewState::Disposed || self.store.is_disposed() {
            return Err(StoreError::Disposed(self.component()));
        }
        if self.view_type.accessors().get(accessor.field_index) != Some(accessor) {
            return Err(StoreError::UnknownField(accessor.name.clone()));
        }
        Ok(())
    }

    fn mismatch(accessor: &FieldAccessor, expected: &'static str) -> StoreError {
        StoreError::TypeMismatch {
            field: accessor.name.clone(),
            expected,
        }
    }

    fn read(&self, accessor: &FieldAccessor) -> Result<u32, StoreError> {
        self.check(accessor)?;
        self.store.read_word(accessor.field_index, self.index, 0)
    }

    fn write(&self, accessor: &FieldAccessor, word: u32) -> Result<(), StoreError> {
        self.check(accessor)?;
        self.store.write_word(accessor.field_index, self.index, 0, word)
    }

    // -- Typed access --

    pub fn get_bool(&self, accessor: &FieldAccessor) -> Result<bool, StoreError> {
        if accessor.kind != AccessorKind::Bool {
            return Err(Self::mismatch(accessor, "bool"));
        }
        Ok(self.read(accessor)? != 0)
    }

    pub fn set_bool(&self, accessor: &FieldAccessor, value: bool) -> Result<(), StoreError> {
        if accessor.kind != AccessorKind::Bool {
            return Err(Self::mismatch(accessor, "bool"));
        }
        self.write(accessor, u32::from(value))
    }

    pub fn get_i32(&self, accessor: &FieldAccessor) -> Result<i32, StoreError> {
        if accessor.kind != AccessorKind::Int32 {
            return Err(Self::mismatch(accessor, "i32"));
        }
        Ok(self.read(accessor)? as i32)
    }

    pub fn set_i32(&self, accessor: &FieldAccessor, value: i32) -> Result<(), StoreError> {
        if accessor.kind != AccessorKind::Int32 {
            return Err(Self::mismatch(accessor, "i32"));
        }
        self.write(accessor, value as u32)
    }

    pub fn get_u32(&self, accessor: &FieldAccessor) -> Result<u32, StoreError> {
        if accessor.kind != AccessorKind::UInt32 {
            return Err(Self::mismatch(accessor, "u32"));
        }
        self.read(accessor)
    }

    pub fn set_u32(&self, accessor: &FieldAccessor, value: u32) -> Result<(), StoreError> {
        if accessor.kind != AccessorKind::UInt32 {
            return Err(Self::mismatch(accessor, "u32"));
        }
        self.write(accessor, value)
    }

    /// Read an `f32` field, widened to `f64`.
    pub fn get_f32(&self, accessor: &FieldAccessor) -> Result<f64, StoreError> {
        if accessor.kind != AccessorKind::Float32 {
            return Err(Self::mismatch(accessor, "f32"));
        }
        Ok(f64::from(f32::from_bits(self.read(accessor)?)))
    }

    /// Write an `f32` field; `value` is narrowed to `f32`.
    pub fn set_f32(&self, accessor: &FieldAccessor, value: f64) -> Result<(), StoreError> {
        if accessor.kind != AccessorKind::Float32 {
            return Err(Self::mismatch(accessor, "f32"));
        }
        self.write(accessor, (value as f32).to_bits())
    }

    /// Read a `ref` field. A stored `0`, or an id the registry cannot
    /// resolve, reads as `None`.
    pub fn get_node(&self, accessor: &FieldAccessor) -> Result<Option<NodeHandle>, StoreError> {
        if accessor.kind != AccessorKind::NodeRef {
            return Err(Self::mismatch(accessor, "ref"));
        }
        let raw = self.read(accessor)?;
        if raw == 0 {
            return Ok(None);
        }
        Ok(self.view_type.nodes().resolve_node_handle(raw))
    }

    /// Write a `ref` field; `None` stores `0`.
    pub fn set_node(
        &self,
        accessor: &FieldAccessor,
        node: Option<NodeHandle>,
    ) -> Result<(), StoreError> {
        if accessor.kind != AccessorKind::NodeRef {
            return Err(Self::mismatch(accessor, "ref"));
        }
        let raw = node.map_or(0, |n| self.view_type.nodes().node_handle_to_raw_id(n));
        self.write(accessor, raw)
    }

    /// The sub-view of a composite field. Created on first use; later calls
    /// return the same `Rc`.
    pub fn composite(&self, accessor: &FieldAccessor) -> Result<Rc<CompositeView>, StoreError> {
        let AccessorKind::Composite(kind) = accessor.kind else {
            return Err(Self::mismatch(accessor, "composite"));
        };
        self.check(accessor)?;
        let cell = self
            .composites
            .get(accessor.field_index)
            .ok_or_else(|| StoreError::UnknownField(accessor.name.clone()))?;
        // Validate the slot before caching a view of it.
        self.store.address_of(accessor.field_index, self.index)?;
        Ok(Rc::clone(cell.get_or_init(|| {
            Rc::new(CompositeView::new(
                Rc::clone(&self.store),
                accessor.field_index,
                self.index,
                kind,
            ))
        })))
    }

    // -- Dynamic access --

    /// Read any field as a [`FieldValue`].
    pub fn get(&self, accessor: &FieldAccessor) -> Result<FieldValue, StoreError> {
        Ok(match accessor.kind {
            AccessorKind::Bool => FieldValue::Bool(self.get_bool(accessor)?),
            AccessorKind::Int32 => FieldValue::Int32(self.get_i32(accessor)?),
            AccessorKind::UInt32 => FieldValue::UInt32(self.get_u32(accessor)?),
            AccessorKind::Float32 => FieldValue::Float(self.get_f32(accessor)?),
            AccessorKind::NodeRef => FieldValue::Node(self.get_node(accessor)?),
            AccessorKind::Composite(_) => FieldValue::Composite(self.composite(accessor)?),
        })
    }

    /// Write any settable field. Numbers written to an `f32` field are
    /// narrowed whatever their variant.
    ///
    /// # Errors
    ///
    /// [`StoreError::ReadOnlyField`] for composite fields, and
    /// [`StoreError::TypeMismatch`] when `value` does not fit the field.
    pub fn set(&self, accessor: &FieldAccessor, value: FieldValue) -> Result<(), StoreError> {
        match (accessor.kind, value) {
            (AccessorKind::Composite(_), _) => {
                self.check(accessor)?;
                Err(StoreError::ReadOnlyField(accessor.name.clone()))
            }
            (AccessorKind::Bool, FieldValue::Bool(v)) => self.set_bool(accessor, v),
            (AccessorKind::Int32, FieldValue::Int32(v)) => self.set_i32(accessor, v),
            (AccessorKind::UInt32, FieldValue::UInt32(v)) => self.set_u32(accessor, v),
            (AccessorKind::Float32, FieldValue::Float(v)) => self.set_f32(accessor, v),
            (AccessorKind::Float32, FieldValue::Int32(v)) => self.set_f32(accessor, f64::from(v)),
            (AccessorKind::Float32, FieldValue::UInt32(v)) => self.set_f32(accessor, f64::from(v)),
            (AccessorKind::NodeRef, FieldValue::Node(v)) => self.set_node(accessor, v),
            (kind, _) => Err(Self::mismatch(accessor, kind.name())),
        }
    }

    fn accessor(&self, name: &str) -> Result<FieldAccessor, StoreError> {
        self.view_type
            .field(name)
            .cloned()
            .ok_or_else(|| StoreError::UnknownField(name.to_string()))
    }

    /// Read a field by name. Prefer resolving the accessor once with
    /// [`ViewType::field`] on hot paths.
    pub fn get_field(&self, name: &str) -> Result<FieldValue, StoreError> {
        self.get(&self.accessor(name)?)
    }

    /// Write a field by name.
    pub fn set_field(&self, name: &str, value: FieldValue) -> Result<(), StoreError> {
        self.set(&self.accessor(name)?, value)
    }
}

impl fmt::Debug for ComponentView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentView")
            .field("component", &self.component())
            .field("index", &self.index)
            .field("state", &self.state.get())
            .finish_non_exhaustive()
    }
}
