//! MessagePack snapshots of a store's buffer.
//!
//! A snapshot carries the layout it was taken with, so it can only be
//! restored into a store with the same layout.

use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::layout::LayoutTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Name of the component the buffer belongs to.
    pub component: String,
    pub layout: LayoutTable,
    /// Raw buffer, encoded as a MessagePack `bin`.
    #[serde(with = "serde_bytes")]
    pub bytes: Vec<u8>,
}

impl StoreSnapshot {
    /// Encode to MessagePack bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Encode`] if serialisation fails.
    pub fn encode(&self) -> Result<Vec<u8>, StoreError> {
        rmp_serde::to_vec_named(self).map_err(StoreError::Encode)
    }

    /// Decode from MessagePack bytes.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Decode`] if deserialisation fails.
    pub fn decode(bytes: &[u8]) -> Result<Self, StoreError> {
        rmp_serde::from_slice(bytes).map_err(StoreError::Decode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::ComponentStore;
    use component_schema::{ComponentId, ComponentSchema, FieldDescriptor, FieldType};

    fn store() -> ComponentStore {
        let schema = ComponentSchema::new("spin")
            .with_field(FieldDescriptor::new("rate", FieldType::Float32))
            .with_field(FieldDescriptor::new("axis", FieldType::Vec3));
        ComponentStore::create(ComponentId(3), schema, 4).unwrap()
    }

    #[test]
    fn test_snapshot_through_msgpack() {
        let source = store();
        source.write_word(0, 2, 0, 2.5f32.to_bits()).unwrap();
        source.write_word(1, 3, 2, 1.0f32.to_bits()).unwrap();

        let bytes = source.snapshot().unwrap().encode().unwrap();
        let snapshot = StoreSnapshot::decode(&bytes).unwrap();
        assert_eq!(snapshot.bytes.len(), source.layout().total_bytes as usize);

        let target = store();
        target.restore(&snapshot).unwrap();
        assert_eq!(target.read_word(0, 2, 0).unwrap(), 2.5f32.to_bits());
        assert_eq!(target.read_word(1, 3, 2).unwrap(), 1.0f32.to_bits());
    }

    #[test]
    fn test_buffer_encoded_as_bin() {
        let source = store();
        for instance in 0..4 {
            source.write_word(0, instance, 0, u32::MAX).unwrap();
        }
        let encoded = source.snapshot().unwrap().encode().unwrap();
        // bin8 marker followed by the 64-byte buffer length.
        assert!(encoded.windows(2).any(|w| w == [0xC4, 64]));
        assert_eq!(StoreSnapshot::decode(&encoded).unwrap().bytes[..4], [0xFF; 4]);
    }

    #[test]
    fn test_decode_invalid_bytes() {
        assert!(matches!(
            StoreSnapshot::decode(&[0xFF, 0xFF]),
            Err(StoreError::Decode(_))
        ));
    }
}
