//! Struct-of-arrays layout compilation.
//!
//! Each field gets one contiguous column of `capacity` slots, and columns are
//! laid out back to back in schema order:
//!
//! ```text
//! | field 0: slot 0 .. slot cap-1 | field 1: slot 0 .. slot cap-1 | ...
//! ```
//!
//! A slot is `storage_words * 4` bytes. All arithmetic is checked so that a
//! layout which would not fit in a 32-bit buffer is rejected instead of
//! wrapping.

use std::ops::Range;

use component_schema::ComponentSchema;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::LayoutError;

/// Byte offsets of every field column, plus the total buffer length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutTable {
    /// Start of each field's column, parallel to the schema's fields.
    pub field_offsets: Vec<u32>,
    /// Words per slot of each field.
    pub field_words: Vec<u32>,
    /// Number of instance slots per column.
    pub capacity: u32,
    /// Length of the whole buffer in bytes.
    pub total_bytes: u32,
}

impl LayoutTable {
    #[must_use]
    pub fn field_count(&self) -> usize {
        self.field_offsets.len()
    }

    /// Bytes one slot of field `index` occupies.
    #[must_use]
    pub fn slot_bytes(&self, index: usize) -> Option<u32> {
        self.field_words.get(index).map(|w| w * 4)
    }

    /// Byte range of the column of field `index`.
    #[must_use]
    pub fn column(&self, index: usize) -> Option<Range<usize>> {
        let start = *self.field_offsets.get(index)? as usize;
        let len = self.slot_bytes(index)? as usize * self.capacity as usize;
        Some(start..start + len)
    }
}

/// Compile `schema` into a layout holding `capacity` instances.
///
/// # Errors
///
/// - [`LayoutError::UnknownType`] for a type keyword outside the known set.
/// - [`LayoutError::InvalidWidth`] for a field with zero storage words.
/// - [`LayoutError::TooLarge`] if the buffer length overflows `u32`.
pub fn compile(schema: &ComponentSchema, capacity: u32) -> Result<LayoutTable, LayoutError> {
    let mut field_offsets = Vec::with_capacity(schema.fields.len());
    let mut field_words = Vec::with_capacity(schema.fields.len());
    let too_large = || LayoutError::TooLarge {
        component: schema.name.clone(),
    };

    let mut offset: u32 = 0;
    for field in &schema.fields {
        if field.field_type().is_none() {
            return Err(LayoutError::UnknownType {
                field: field.name.clone(),
                type_name: field.type_name.clone(),
            });
        }
        if field.storage_words == 0 {
            return Err(LayoutError::InvalidWidth {
                field: field.name.clone(),
                words: 0,
            });
        }

        let column_bytes = field
            .storage_words
            .checked_mul(4)
            .and_then(|slot| slot.checked_mul(capacity))
            .ok_or_else(too_large)?;
        field_offsets.push(offset);
        field_words.push(field.storage_words);
        offset = offset.checked_add(column_bytes).ok_or_else(too_large)?;
    }

    debug!(
        component = %schema.name,
        fields = field_offsets.len(),
        capacity,
        total_bytes = offset,
        "compiled component layout"
    );

    Ok(LayoutTable {
        field_offsets,
        field_words,
        capacity,
        total_bytes: offset,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use component_schema::{FieldDescriptor, FieldType};

    fn health() -> ComponentSchema {
        ComponentSchema::new("health")
            .with_field(FieldDescriptor::new("hp", FieldType::Int32))
            .with_field(FieldDescriptor::new("pos", FieldType::Vec3))
    }

    #[test]
    fn test_compile_offsets() {
        let layout = compile(&health(), 2).unwrap();
        assert_eq!(layout.field_offsets, vec![0, 8]);
        assert_eq!(layout.field_words, vec![1, 3]);
        assert_eq!(layout.total_bytes, 32);
        assert_eq!(layout.column(1), Some(8..32));
    }

    #[test]
    fn test_compile_is_deterministic() {
        assert_eq!(compile(&health(), 16).unwrap(), compile(&health(), 16).unwrap());
    }

    #[test]
    fn test_columns_do_not_overlap() {
        let schema = ComponentSchema::new("all").with_field(FieldDescriptor::new("a", FieldType::Bool));
        let schema = FieldType::ALL
            .iter()
            .enumerate()
            .fold(schema, |s, (i, ty)| s.with_field(FieldDescriptor::new(format!("f{i}"), *ty)));
        let layout = compile(&schema, 7).unwrap();
        let mut end = 0;
        for i in 0..layout.field_count() {
            let column = layout.column(i).unwrap();
            assert_eq!(column.start, end);
            assert_eq!(column.len(), layout.field_words[i] as usize * 4 * 7);
            end = column.end;
        }
        assert_eq!(end, layout.total_bytes as usize);
    }

    #[test]
    fn test_compile_empty_and_zero_capacity() {
        let layout = compile(&ComponentSchema::new("tag"), 8).unwrap();
        assert_eq!(layout.total_bytes, 0);
        assert_eq!(layout.field_count(), 0);

        let layout = compile(&health(), 0).unwrap();
        assert_eq!(layout.field_offsets, vec![0, 0]);
        assert_eq!(layout.total_bytes, 0);
    }

    #[test]
    fn test_compile_unknown_type() {
        let mut field = FieldDescriptor::new("m", FieldType::Vec4);
        field.type_name = "mat4".to_string();
        let schema = ComponentSchema::new("bad").with_field(field);
        let err = compile(&schema, 1).unwrap_err();
        assert_eq!(
            err,
            LayoutError::UnknownType {
                field: "m".to_string(),
                type_name: "mat4".to_string()
            }
        );
    }

    #[test]
    fn test_compile_zero_width() {
        let mut field = FieldDescriptor::new("x", FieldType::Float32);
        field.storage_words = 0;
        let schema = ComponentSchema::new("bad").with_field(field);
        assert!(matches!(
            compile(&schema, 1),
            Err(LayoutError::InvalidWidth { words: 0, .. })
        ));
    }

    #[test]
    fn test_compile_too_large() {
        let schema = ComponentSchema::new("big").with_field(FieldDescriptor::new("q", FieldType::Quat));
        assert!(matches!(
            compile(&schema, u32::MAX / 8),
            Err(LayoutError::TooLarge { .. })
        ));
    }
}
