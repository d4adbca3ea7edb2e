//! Binding component schemas to typed field accessors.
//!
//! Binding happens once per component type and produces a [`ViewType`]: the
//! ordered accessor table every [`ComponentView`](crate::ComponentView) of
//! that type shares. Field names are resolved to indices here, so no access
//! ever looks a name up in the schema again.

use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use component_schema::{ComponentId, ComponentSchema, FieldDescriptor, FieldType};
use tracing::debug;

use crate::composite::CompositeKind;
use crate::error::BindingError;
use crate::node::NodeRegistry;

/// Ref target kinds a `ref` field may point at.
const NODE_REF_TARGET: &str = "node";

/// How a field is read and written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AccessorKind {
    Bool,
    Int32,
    UInt32,
    /// Stored as `f32`, surfaced as `f64`.
    Float32,
    NodeRef,
    /// Multi-word field; read through a cached [`CompositeView`](crate::CompositeView).
    Composite(CompositeKind),
}

impl AccessorKind {
    #[must_use]
    pub fn from_field_type(ty: FieldType) -> Self {
        match ty {
            FieldType::Bool => Self::Bool,
            FieldType::Int32 => Self::Int32,
            FieldType::UInt32 => Self::UInt32,
            FieldType::Float32 => Self::Float32,
            FieldType::NodeRef => Self::NodeRef,
            FieldType::Vec2 => Self::Composite(CompositeKind::Vec2),
            FieldType::Vec3 => Self::Composite(CompositeKind::Vec3),
            FieldType::Vec4 => Self::Composite(CompositeKind::Vec4),
            FieldType::Rgb => Self::Composite(CompositeKind::Rgb),
            FieldType::Rgba => Self::Composite(CompositeKind::Rgba),
            FieldType::Quat => Self::Composite(CompositeKind::Quat),
        }
    }

    /// Composite fields have a getter only.
    #[must_use]
    pub const fn has_setter(self) -> bool {
        !matches!(self, Self::Composite(_))
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::Float32 => "f32",
            Self::NodeRef => "ref",
            Self::Composite(kind) => kind.name(),
        }
    }
}

impl fmt::Display for AccessorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A bound field: which slot column to address and how to interpret it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldAccessor {
    pub component: ComponentId,
    pub name: String,
    pub field_index: usize,
    pub kind: AccessorKind,
}

/// The record shape shared by every view of one component type.
pub struct ViewType {
    component: ComponentId,
    schema: ComponentSchema,
    accessors: Vec<FieldAccessor>,
    by_name: HashMap<String, usize>,
    nodes: Rc<dyn NodeRegistry>,
}

impl ViewType {
    #[must_use]
    pub fn component(&self) -> ComponentId {
        self.component
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.schema.name
    }

    #[must_use]
    pub fn schema(&self) -> &ComponentSchema {
        &self.schema
    }

    /// Accessors in field order.
    #[must_use]
    pub fn accessors(&self) -> &[FieldAccessor] {
        &self.accessors
    }

    /// Resolve a field name to its accessor.
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldAccessor> {
        self.by_name.get(name).map(|&i| &self.accessors[i])
    }

    pub(crate) fn nodes(&self) -> &dyn NodeRegistry {
        self.nodes.as_ref()
    }
}

impl fmt::Debug for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewType")
            .field("component", &self.component)
            .field("name", &self.schema.name)
            .field("accessors", &self.accessors)
            .finish_non_exhaustive()
    }
}

/// Builds and caches one [`ViewType`] per component id.
#[derive(Default)]
pub struct AccessorBinder {
    bound: HashMap<ComponentId, Rc<ViewType>>,
}

impl AccessorBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `schema` as component `id`.
    ///
    /// Binding an id again with the same schema returns the existing
    /// [`ViewType`].
    ///
    /// # Errors
    ///
    /// A [`BindingError`] for the first field whose declaration does not
    /// match its type, [`BindingError::DuplicateField`] when two fields share
    /// a name, or [`BindingError::Conflict`] if `id` is already bound
    /// to a different schema.
    pub fn bind(
        &mut self,
        id: ComponentId,
        schema: &ComponentSchema,
        nodes: Rc<dyn NodeRegistry>,
    ) -> Result<Rc<ViewType>, BindingError> {
        if let Some(existing) = self.bound.get(&id) {
            if existing.schema == *schema {
                return Ok(Rc::clone(existing));
            }
            return Err(BindingError::Conflict(id));
        }

        let accessors = schema
            .fields
            .iter()
            .enumerate()
            .map(|(field_index, field)| {
                Ok(FieldAccessor {
                    component: id,
                    name: field.name.clone(),
                    field_index,
                    kind: bind_field(field)?,
                })
            })
            .collect::<Result<Vec<_>, BindingError>>()?;

        let mut by_name = HashMap::with_capacity(accessors.len());
        for accessor in &accessors {
            if by_name
                .insert(accessor.name.clone(), accessor.field_index)
                .is_some()
            {
                return Err(BindingError::DuplicateField {
                    field: accessor.name.clone(),
                });
            }
        }

        debug!(component = %schema.name, %id, accessors = accessors.len(), "bound accessors");
        let view_type = Rc::new(ViewType {
            component: id,
            schema: schema.clone(),
            accessors,
            by_name,
            nodes,
        });
        self.bound.insert(id, Rc::clone(&view_type));
        Ok(view_type)
    }

    #[must_use]
    pub fn get(&self, id: ComponentId) -> Option<Rc<ViewType>> {
        self.bound.get(&id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bound.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bound.is_empty()
    }
}

fn bind_field(field: &FieldDescriptor) -> Result<AccessorKind, BindingError> {
    let ty = field.field_type().ok_or_else(|| BindingError::UnknownType {
        field: field.name.clone(),
        type_name: field.type_name.clone(),
    })?;

    if ty == FieldType::NodeRef {
        match field.ref_target.as_deref() {
            None => {
                return Err(BindingError::MissingRefTarget {
                    field: field.name.clone(),
                });
            }
            Some(NODE_REF_TARGET) => {}
            Some(other) => {
                return Err(BindingError::UnknownRefTarget {
                    field: field.name.clone(),
                    target: other.to_string(),
                });
            }
        }
    }

    if field.storage_words != ty.storage_words() {
        return Err(BindingError::WidthMismatch {
            field: field.name.clone(),
            expected: ty.storage_words(),
            found: field.storage_words,
        });
    }
    if field.storage != ty.storage_type() {
        return Err(BindingError::StorageMismatch {
            field: field.name.clone(),
            expected: ty.storage_type(),
            found: field.storage,
        });
    }

    Ok(AccessorKind::from_field_type(ty))
}
