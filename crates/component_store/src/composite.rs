//! Sub-views over the words of one multi-word field slot.
//!
//! A [`CompositeView`] is bound to a single (store, field, instance) slot and
//! reads and writes its `f32` elements in place. Vectors and quaternions
//! expose `x`/`y`/`z`/`w`, colours expose `r`/`g`/`b`/`a`; both also have
//! index access and `glam` conversions.

use std::rc::Rc;

use component_schema::FieldType;
use glam::{Quat, Vec2, Vec3, Vec4};

use crate::error::{BoundsError, StoreError};
use crate::store::ComponentStore;

/// Shape of a multi-word field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CompositeKind {
    Vec2,
    Vec3,
    Vec4,
    Rgb,
    Rgba,
    Quat,
}

impl CompositeKind {
    #[must_use]
    pub fn from_field_type(ty: FieldType) -> Option<Self> {
        match ty {
            FieldType::Vec2 => Some(Self::Vec2),
            FieldType::Vec3 => Some(Self::Vec3),
            FieldType::Vec4 => Some(Self::Vec4),
            FieldType::Rgb => Some(Self::Rgb),
            FieldType::Rgba => Some(Self::Rgba),
            FieldType::Quat => Some(Self::Quat),
            _ => None,
        }
    }

    /// Number of elements.
    #[must_use]
    pub const fn len(self) -> usize {
        match self {
            Self::Vec2 => 2,
            Self::Vec3 | Self::Rgb => 3,
            Self::Vec4 | Self::Rgba | Self::Quat => 4,
        }
    }

    #[must_use]
    pub const fn is_color(self) -> bool {
        matches!(self, Self::Rgb | Self::Rgba)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Quat => "quat",
        }
    }
}

/// In-place view of one composite slot.
#[derive(Debug)]
pub struct CompositeView {
    store: Rc<ComponentStore>,
    field: usize,
    instance: u32,
    kind: CompositeKind,
}

impl CompositeView {
    pub(crate) fn new(
        store: Rc<ComponentStore>,
        field: usize,
        instance: u32,
        kind: CompositeKind,
    ) -> Self {
        Self {
            store,
            field,
            instance,
            kind,
        }
    }

    #[must_use]
    pub fn kind(&self) -> CompositeKind {
        self.kind
    }

    /// Number of elements; composite slots are never empty.
    #[must_use]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.kind.len()
    }

    /// Element `index` of the slot.
    pub fn get(&self, index: usize) -> Result<f32, StoreError> {
        self.check_element(index)?;
        let word = self.store.read_word(self.field, self.instance, index)?;
        Ok(f32::from_bits(word))
    }

    /// Overwrite element `index` of the slot.
    pub fn set(&self, index: usize, value: f32) -> Result<(), StoreError> {
        self.check_element(index)?;
        self.store
            .write_word(self.field, self.instance, index, value.to_bits())
    }

    /// All elements, in order.
    pub fn to_vec(&self) -> Result<Vec<f32>, StoreError> {
        (0..self.len()).map(|i| self.get(i)).collect()
    }

    /// Overwrite every element. `values` must have exactly [`len`](Self::len)
    /// entries.
    pub fn set_slice(&self, values: &[f32]) -> Result<(), StoreError> {
        if values.len() != self.len() {
            return Err(BoundsError::Length {
                expected: self.len(),
                found: values.len(),
            }
            .into());
        }
        for (i, v) in values.iter().enumerate() {
            self.set(i, *v)?;
        }
        Ok(())
    }

    fn check_element(&self, index: usize) -> Result<(), StoreError> {
        if index >= self.len() {
            return Err(BoundsError::Element {
                index,
                len: self.len(),
            }
            .into());
        }
        Ok(())
    }

    fn expect_kind(&self, kinds: &[CompositeKind], expected: &'static str) -> Result<(), StoreError> {
        if kinds.contains(&self.kind) {
            Ok(())
        } else {
            Err(StoreError::TypeMismatch {
                field: self.store.schema().fields[self.field].name.clone(),
                expected,
            })
        }
    }

    // -- Named elements --

    pub fn x(&self) -> Result<f32, StoreError> {
        self.get(0)
    }

    pub fn y(&self) -> Result<f32, StoreError> {
        self.get(1)
    }

    pub fn z(&self) -> Result<f32, StoreError> {
        self.get(2)
    }

    pub fn w(&self) -> Result<f32, StoreError> {
        self.get(3)
    }

    pub fn set_x(&self, value: f32) -> Result<(), StoreError> {
        self.set(0, value)
    }

    pub fn set_y(&self, value: f32) -> Result<(), StoreError> {
        self.set(1, value)
    }

    pub fn set_z(&self, value: f32) -> Result<(), StoreError> {
        self.set(2, value)
    }

    pub fn set_w(&self, value: f32) -> Result<(), StoreError> {
        self.set(3, value)
    }

    pub fn r(&self) -> Result<f32, StoreError> {
        self.get(0)
    }

    pub fn g(&self) -> Result<f32, StoreError> {
        self.get(1)
    }

    pub fn b(&self) -> Result<f32, StoreError> {
        self.get(2)
    }

    pub fn a(&self) -> Result<f32, StoreError> {
        self.get(3)
    }

    pub fn set_r(&self, value: f32) -> Result<(), StoreError> {
        self.set(0, value)
    }

    pub fn set_g(&self, value: f32) -> Result<(), StoreError> {
        self.set(1, value)
    }

    pub fn set_b(&self, value: f32) -> Result<(), StoreError> {
        self.set(2, value)
    }

    pub fn set_a(&self, value: f32) -> Result<(), StoreError> {
        self.set(3, value)
    }

    // -- glam conversions --

    pub fn to_vec2(&self) -> Result<Vec2, StoreError> {
        self.expect_kind(&[CompositeKind::Vec2], "vec2")?;
        Ok(Vec2::new(self.get(0)?, self.get(1)?))
    }

    pub fn set_vec2(&self, value: Vec2) -> Result<(), StoreError> {
        self.expect_kind(&[CompositeKind::Vec2], "vec2")?;
        self.set_slice(&value.to_array())
    }

    /// Read a `vec3` or `rgb` slot.
    pub fn to_vec3(&self) -> Result<Vec3, StoreError> {
        self.expect_kind(&[CompositeKind::Vec3, CompositeKind::Rgb], "vec3")?;
        Ok(Vec3::new(self.get(0)?, self.get(1)?, self.get(2)?))
    }

    pub fn set_vec3(&self, value: Vec3) -> Result<(), StoreError> {
        self.expect_kind(&[CompositeKind::Vec3, CompositeKind::Rgb], "vec3")?;
        self.set_slice(&value.to_array())
    }

    /// Read a `vec4` or `rgba` slot.
    pub fn to_vec4(&self) -> Result<Vec4, StoreError> {
        self.expect_kind(&[CompositeKind::Vec4, CompositeKind::Rgba], "vec4")?;
        Ok(Vec4::new(self.get(0)?, self.get(1)?, self.get(2)?, self.get(3)?))
    }

    pub fn set_vec4(&self, value: Vec4) -> Result<(), StoreError> {
        self.expect_kind(&[CompositeKind::Vec4, CompositeKind::Rgba], "vec4")?;
        self.set_slice(&value.to_array())
    }

    pub fn to_quat(&self) -> Result<Quat, StoreError> {
        self.expect_kind(&[CompositeKind::Quat], "quat")?;
        Ok(Quat::from_xyzw(
            self.get(0)?,
            self.get(1)?,
            self.get(2)?,
            self.get(3)?,
        ))
    }

    pub fn set_quat(&self, value: Quat) -> Result<(), StoreError> {
        self.expect_kind(&[CompositeKind::Quat], "quat")?;
        self.set_slice(&value.to_array())
    }
}
