//! Resolved component schemas as the store side sees them.
//!
//! A [`ComponentSchema`] is what the [`SchemaReader`](crate::SchemaReader)
//! produces from a host registry: the component name plus an ordered list of
//! [`FieldDescriptor`]s. Field order decides the byte
//! layout of the store, so nothing in this crate re-sorts it.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Host-assigned identifier of a component type.
///
/// `0` is reserved by the host to mean "no such component".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(pub u32);

impl ComponentId {
    /// The "not found" sentinel.
    pub const NONE: ComponentId = ComponentId(0);

    /// Returns `true` if this is not the [`ComponentId::NONE`] sentinel.
    #[must_use]
    pub const fn is_valid(self) -> bool {
        self.0 != 0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ComponentId({})", self.0)
    }
}

/// The storage class of one 4-byte word of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    I32,
    U32,
    F32,
}

impl StorageType {
    /// Parse a storage keyword (`i32`, `u32`, `f32`).
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "i32" => Some(Self::I32),
            "u32" => Some(Self::U32),
            "f32" => Some(Self::F32),
            _ => None,
        }
    }

    /// Decode the host's numeric storage enum (`0 = i32, 1 = u32, 2 = f32`).
    #[must_use]
    pub fn from_raw(raw: i32) -> Option<Self> {
        match raw {
            0 => Some(Self::I32),
            1 => Some(Self::U32),
            2 => Some(Self::F32),
            _ => None,
        }
    }

    /// Encode as the host's numeric storage enum.
    #[must_use]
    pub const fn as_raw(self) -> i32 {
        match self {
            Self::I32 => 0,
            Self::U32 => 1,
            Self::F32 => 2,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::I32 => "i32",
            Self::U32 => "u32",
            Self::F32 => "f32",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The closed set of field types a component store can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldType {
    #[serde(rename = "bool")]
    Bool,
    #[serde(rename = "i32")]
    Int32,
    #[serde(rename = "u32")]
    UInt32,
    #[serde(rename = "f32")]
    Float32,
    #[serde(rename = "vec2")]
    Vec2,
    #[serde(rename = "vec3")]
    Vec3,
    #[serde(rename = "vec4")]
    Vec4,
    #[serde(rename = "rgb")]
    Rgb,
    #[serde(rename = "rgba")]
    Rgba,
    #[serde(rename = "quat")]
    Quat,
    #[serde(rename = "ref")]
    NodeRef,
}

impl FieldType {
    /// Every field type, in declaration order.
    pub const ALL: [FieldType; 11] = [
        Self::Bool,
        Self::Int32,
        Self::UInt32,
        Self::Float32,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Rgb,
        Self::Rgba,
        Self::Quat,
        Self::NodeRef,
    ];

    /// Parse a schema type keyword. `node` is accepted as an alias of `ref`.
    #[must_use]
    pub fn parse(keyword: &str) -> Option<Self> {
        match keyword {
            "bool" => Some(Self::Bool),
            "i32" => Some(Self::Int32),
            "u32" => Some(Self::UInt32),
            "f32" => Some(Self::Float32),
            "vec2" => Some(Self::Vec2),
            "vec3" => Some(Self::Vec3),
            "vec4" => Some(Self::Vec4),
            "rgb" => Some(Self::Rgb),
            "rgba" => Some(Self::Rgba),
            "quat" => Some(Self::Quat),
            "ref" | "node" => Some(Self::NodeRef),
            _ => None,
        }
    }

    /// The canonical keyword for this type.
    #[must_use]
    pub const fn keyword(self) -> &'static str {
        match self {
            Self::Bool => "bool",
            Self::Int32 => "i32",
            Self::UInt32 => "u32",
            Self::Float32 => "f32",
            Self::Vec2 => "vec2",
            Self::Vec3 => "vec3",
            Self::Vec4 => "vec4",
            Self::Rgb => "rgb",
            Self::Rgba => "rgba",
            Self::Quat => "quat",
            Self::NodeRef => "ref",
        }
    }

    /// Number of 4-byte words one instance of this type occupies.
    #[must_use]
    pub const fn storage_words(self) -> u32 {
        match self {
            Self::Bool | Self::Int32 | Self::UInt32 | Self::Float32 | Self::NodeRef => 1,
            Self::Vec2 => 2,
            Self::Vec3 | Self::Rgb => 3,
            Self::Vec4 | Self::Rgba | Self::Quat => 4,
        }
    }

    /// The storage class every word of this type uses.
    #[must_use]
    pub const fn storage_type(self) -> StorageType {
        match self {
            Self::Bool | Self::Int32 => StorageType::I32,
            Self::UInt32 | Self::NodeRef => StorageType::U32,
            _ => StorageType::F32,
        }
    }

    /// Composite types are accessed through a sub-view rather than a
    /// field-level setter.
    #[must_use]
    pub const fn is_composite(self) -> bool {
        self.storage_words() > 1
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// A default value for a field, written into an instance slot when an entity
/// gains the component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultValue {
    Bool(bool),
    Number(f64),
    List(Vec<f64>),
}

impl DefaultValue {
    /// Encode this default as the raw word bit patterns of a slot with the
    /// given storage class and width.
    ///
    /// Returns `None` if the value cannot be represented: a list whose length
    /// differs from `words`, a non-integral or out-of-range number for an
    /// integer slot, or a boolean for a float slot.
    #[must_use]
    pub fn to_words(&self, storage: StorageType, words: u32) -> Option<Vec<u32>> {
        match self {
            Self::Bool(b) => match (storage, words) {
                (StorageType::I32 | StorageType::U32, 1) => Some(vec![u32::from(*b)]),
                _ => None,
            },
            Self::Number(n) => {
                if words != 1 {
                    return None;
                }
                encode_number(*n, storage).map(|w| vec![w])
            }
            Self::List(values) => {
                if values.len() != words as usize {
                    return None;
                }
                values.iter().map(|v| encode_number(*v, storage)).collect()
            }
        }
    }
}

fn encode_number(n: f64, storage: StorageType) -> Option<u32> {
    match storage {
        StorageType::F32 => Some((n as f32).to_bits()),
        StorageType::I32 => {
            if n.fract() != 0.0 || n < f64::from(i32::MIN) || n > f64::from(i32::MAX) {
                return None;
            }
            Some((n as i32) as u32)
        }
        StorageType::U32 => {
            if n.fract() != 0.0 || n < 0.0 || n > f64::from(u32::MAX) {
                return None;
            }
            Some(n as u32)
        }
    }
}

/// One field of a component, immutable once read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Field name, unique within its component.
    pub name: String,
    /// The type keyword exactly as the host supplied it.
    #[serde(rename = "type")]
    pub type_name: String,
    /// Storage class of the field's words.
    pub storage: StorageType,
    /// Number of 4-byte words per instance.
    pub storage_words: u32,
    /// Entity kind a `ref` field points at (only `"node"` is recognised).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_target: Option<String>,
    /// Value written into a fresh instance slot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<DefaultValue>,
}

impl FieldDescriptor {
    /// Build a well-formed descriptor for `ty`, deriving storage class and
    /// width from the type. `ref` fields target nodes.
    #[must_use]
    pub fn new(name: impl Into<String>, ty: FieldType) -> Self {
        Self {
            name: name.into(),
            type_name: ty.keyword().to_string(),
            storage: ty.storage_type(),
            storage_words: ty.storage_words(),
            ref_target: (ty == FieldType::NodeRef).then(|| "node".to_string()),
            default: None,
        }
    }

    /// Attach a default value.
    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    /// The parsed field type, or `None` for an unrecognised keyword.
    #[must_use]
    pub fn field_type(&self) -> Option<FieldType> {
        FieldType::parse(&self.type_name)
    }

    /// Bytes one instance of this field occupies.
    #[must_use]
    pub fn byte_width(&self) -> u32 {
        self.storage_words * 4
    }
}

/// A component's name and its ordered fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSchema {
    pub name: String,
    pub fields: Vec<FieldDescriptor>,
}

impl ComponentSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Append a field; fields keep insertion order.
    #[must_use]
    pub fn with_field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    #[must_use]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Position of the field called `name`.
    #[must_use]
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// A component without fields only marks membership.
    #[must_use]
    pub fn is_tag(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_field_type_keywords_roundtrip() {
        for ty in FieldType::ALL {
            assert_eq!(FieldType::parse(ty.keyword()), Some(ty));
        }
        assert_eq!(FieldType::parse("node"), Some(FieldType::NodeRef));
        assert_eq!(FieldType::parse("mat4"), None);
    }

    #[test]
    fn test_field_type_widths() {
        assert_eq!(FieldType::Bool.storage_words(), 1);
        assert_eq!(FieldType::Vec2.storage_words(), 2);
        assert_eq!(FieldType::Rgb.storage_words(), 3);
        assert_eq!(FieldType::Quat.storage_words(), 4);
        assert!(FieldType::Vec3.is_composite());
        assert!(!FieldType::NodeRef.is_composite());
        assert_eq!(FieldType::NodeRef.storage_type(), StorageType::U32);
        assert_eq!(FieldType::Bool.storage_type(), StorageType::I32);
    }

    #[test]
    fn test_descriptor_new_derives_storage() {
        let pos = FieldDescriptor::new("pos", FieldType::Vec3);
        assert_eq!(pos.storage, StorageType::F32);
        assert_eq!(pos.storage_words, 3);
        assert_eq!(pos.byte_width(), 12);
        assert!(pos.ref_target.is_none());

        let target = FieldDescriptor::new("target", FieldType::NodeRef);
        assert_eq!(target.ref_target.as_deref(), Some("node"));
    }

    #[test]
    fn test_schema_field_index_keeps_order() {
        let schema = ComponentSchema::new("health")
            .with_field(FieldDescriptor::new("hp", FieldType::Int32))
            .with_field(FieldDescriptor::new("pos", FieldType::Vec3));
        assert_eq!(schema.field_index("hp"), Some(0));
        assert_eq!(schema.field_index("pos"), Some(1));
        assert_eq!(schema.field_index("missing"), None);
        assert!(!schema.is_tag());
    }

    #[test]
    fn test_default_words() {
        assert_eq!(
            DefaultValue::Bool(true).to_words(StorageType::I32, 1),
            Some(vec![1])
        );
        assert_eq!(
            DefaultValue::Number(-2.0).to_words(StorageType::I32, 1),
            Some(vec![(-2i32) as u32])
        );
        assert_eq!(
            DefaultValue::Number(1.5).to_words(StorageType::F32, 1),
            Some(vec![1.5f32.to_bits()])
        );
        assert_eq!(
            DefaultValue::List(vec![0.0, 1.0, 0.0]).to_words(StorageType::F32, 3),
            Some(vec![0.0f32.to_bits(), 1.0f32.to_bits(), 0.0f32.to_bits()])
        );
    }

    #[test]
    fn test_default_words_rejects_mismatch() {
        assert_eq!(DefaultValue::Number(1.5).to_words(StorageType::I32, 1), None);
        assert_eq!(DefaultValue::Number(-1.0).to_words(StorageType::U32, 1), None);
        assert_eq!(DefaultValue::Bool(true).to_words(StorageType::F32, 1), None);
        assert_eq!(
            DefaultValue::List(vec![1.0, 2.0]).to_words(StorageType::F32, 3),
            None
        );
        assert_eq!(DefaultValue::Number(1.0).to_words(StorageType::F32, 3), None);
    }

    #[test]
    fn test_descriptor_json_shape() {
        let field = FieldDescriptor::new("hp", FieldType::Int32).with_default(DefaultValue::Number(10.0));
        let json = serde_json::to_value(&field).unwrap();
        assert_eq!(json["type"], "i32");
        assert_eq!(json["storage"], "i32");
        assert_eq!(json["default"], 10.0);
        let back: FieldDescriptor = serde_json::from_value(json).unwrap();
        assert_eq!(back, field);
    }
}
