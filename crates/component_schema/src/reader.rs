//! Reading component schemas out of a host registry.

use std::collections::HashSet;

use tracing::debug;

use crate::error::SchemaError;
use crate::schema::{ComponentId, ComponentSchema, DefaultValue, FieldDescriptor, StorageType};

/// Lookup surface of an external component registry.
///
/// Every method is a single query against the host. A `None` (or, for
/// [`prop_storage_type`](SchemaSource::prop_storage_type), a value outside
/// the storage enum) means the host could not answer.
pub trait SchemaSource {
    /// Id of the component called `name`, or [`ComponentId::NONE`].
    fn find_component_by_name(&self, name: &str) -> ComponentId;

    fn component_name(&self, id: ComponentId) -> Option<String>;

    fn prop_count(&self, id: ComponentId) -> Option<u32>;

    fn prop_name(&self, id: ComponentId, index: u32) -> Option<String>;

    fn prop_type(&self, id: ComponentId, index: u32) -> Option<String>;

    /// Reference target kind; empty or `None` when the prop is not a reference.
    fn prop_ref_type(&self, id: ComponentId, index: u32) -> Option<String>;

    /// Host storage enum: `0 = i32`, `1 = u32`, `2 = f32`.
    fn prop_storage_type(&self, id: ComponentId, index: u32) -> i32;

    /// Number of 4-byte words one instance of the prop occupies.
    fn prop_size(&self, id: ComponentId, index: u32) -> Option<u32>;

    fn prop_default(&self, id: ComponentId, index: u32) -> Option<DefaultValue>;
}

/// Turns [`SchemaSource`] lookups into a validated [`ComponentSchema`].
///
/// The reader only checks that the host answered and that the answers are
/// non-empty; type keywords and widths are judged later by the layout
/// compiler and the accessor binder.
pub struct SchemaReader<'a, S: ?Sized> {
    source: &'a S,
}

impl<'a, S: SchemaSource + ?Sized> SchemaReader<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Read the schema of the component `id`.
    ///
    /// # Errors
    ///
    /// Returns a distinct [`SchemaError`] for each kind of missing or empty
    /// answer, and [`SchemaError::DuplicateField`] when two props share a name.
    pub fn read(&self, id: ComponentId) -> Result<ComponentSchema, SchemaError> {
        let name = self
            .source
            .component_name(id)
            .ok_or(SchemaError::UnknownComponent(id))?;
        if name.is_empty() {
            return Err(SchemaError::EmptyComponentName(id));
        }

        let count = self
            .source
            .prop_count(id)
            .ok_or_else(|| SchemaError::PropCountUnavailable(name.clone()))?;
        if count == 0 {
            return Err(SchemaError::NoFields(name));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::new();
        for index in 0..count {
            let field = self.read_prop(id, &name, index)?;
            if !seen.insert(field.name.clone()) {
                return Err(SchemaError::DuplicateField {
                    component: name,
                    field: field.name,
                });
            }
            fields.push(field);
        }

        debug!(component = %name, %id, fields = fields.len(), "read component schema");
        Ok(ComponentSchema { name, fields })
    }

    /// Resolve `name` through the host and read its schema.
    ///
    /// # Errors
    ///
    /// [`SchemaError::UnknownComponentName`] if the host does not know the
    /// name, otherwise whatever [`read`](Self::read) returns.
    pub fn read_by_name(&self, name: &str) -> Result<(ComponentId, ComponentSchema), SchemaError> {
        let id = self.source.find_component_by_name(name);
        if !id.is_valid() {
            return Err(SchemaError::UnknownComponentName(name.to_string()));
        }
        Ok((id, self.read(id)?))
    }

    fn read_prop(
        &self,
        id: ComponentId,
        component: &str,
        index: u32,
    ) -> Result<FieldDescriptor, SchemaError> {
        let name = self
            .source
            .prop_name(id, index)
            .filter(|n| !n.is_empty())
            .ok_or_else(|| SchemaError::EmptyPropName {
                component: component.to_string(),
                index,
            })?;

        let type_name = self
            .source
            .prop_type(id, index)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| SchemaError::EmptyPropType {
                component: component.to_string(),
                field: name.clone(),
            })?;

        let raw_storage = self.source.prop_storage_type(id, index);
        let storage =
            StorageType::from_raw(raw_storage).ok_or_else(|| SchemaError::InvalidStorageType {
                component: component.to_string(),
                field: name.clone(),
                storage: raw_storage.to_string(),
            })?;

        let storage_words =
            self.source
                .prop_size(id, index)
                .ok_or_else(|| SchemaError::PropSizeUnavailable {
                    component: component.to_string(),
                    field: name.clone(),
                })?;

        let ref_target = self
            .source
            .prop_ref_type(id, index)
            .filter(|r| !r.is_empty());

        Ok(FieldDescriptor {
            name,
            type_name,
            storage,
            storage_words,
            ref_target,
            default: self.source.prop_default(id, index),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::definition::{ComponentDefinition, PropDefinition};
    use crate::registry::DefinitionRegistry;
    use crate::schema::FieldType;

    /// Reports an absurd prop count and nothing else.
    struct HugeCount;

    impl SchemaSource for HugeCount {
        fn find_component_by_name(&self, _: &str) -> ComponentId {
            ComponentId(1)
        }

        fn component_name(&self, _: ComponentId) -> Option<String> {
            Some("huge".to_string())
        }

        fn prop_count(&self, _: ComponentId) -> Option<u32> {
            Some(u32::MAX)
        }

        fn prop_name(&self, _: ComponentId, _: u32) -> Option<String> {
            None
        }

        fn prop_type(&self, _: ComponentId, _: u32) -> Option<String> {
            None
        }

        fn prop_ref_type(&self, _: ComponentId, _: u32) -> Option<String> {
            None
        }

        fn prop_storage_type(&self, _: ComponentId, _: u32) -> i32 {
            -1
        }

        fn prop_size(&self, _: ComponentId, _: u32) -> Option<u32> {
            None
        }

        fn prop_default(&self, _: ComponentId, _: u32) -> Option<DefaultValue> {
            None
        }
    }

    fn registry_with(def: ComponentDefinition) -> (DefinitionRegistry, ComponentId) {
        let mut registry = DefinitionRegistry::new();
        let id = registry.define(def).unwrap();
        (registry, id)
    }

    #[test]
    fn test_read_schema_in_order() {
        let (registry, id) = registry_with(
            ComponentDefinition::new("health")
                .with_prop(PropDefinition::new("hp", "i32"))
                .with_prop(PropDefinition::new("pos", "vec3"))
                .with_prop(PropDefinition::new("target", "ref").with_ref_type("node")),
        );
        let schema = SchemaReader::new(&registry).read(id).unwrap();
        assert_eq!(schema.name, "health");
        let names: Vec<_> = schema.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["hp", "pos", "target"]);
        assert_eq!(schema.fields[1].field_type(), Some(FieldType::Vec3));
        assert_eq!(schema.fields[1].storage_words, 3);
        assert_eq!(schema.fields[2].storage, StorageType::U32);
        assert_eq!(schema.fields[2].ref_target.as_deref(), Some("node"));
    }

    #[test]
    fn test_read_by_name() {
        let (registry, id) =
            registry_with(ComponentDefinition::new("spin").with_prop(PropDefinition::new("rate", "f32")));
        let (found, schema) = SchemaReader::new(&registry).read_by_name("spin").unwrap();
        assert_eq!(found, id);
        assert_eq!(schema.field_count(), 1);

        let err = SchemaReader::new(&registry).read_by_name("missing").unwrap_err();
        assert!(matches!(err, SchemaError::UnknownComponentName(ref n) if n == "missing"));
    }

    #[test]
    fn test_read_unknown_id() {
        let registry = DefinitionRegistry::new();
        let err = SchemaReader::new(&registry).read(ComponentId(7)).unwrap_err();
        assert!(matches!(err, SchemaError::UnknownComponent(ComponentId(7))));
    }

    #[test]
    fn test_read_rejects_empty_component() {
        let (registry, id) = registry_with(ComponentDefinition::new("tag"));
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::NoFields(ref n) if n == "tag"));
    }

    #[test]
    fn test_read_rejects_empty_prop_parts() {
        let (registry, id) =
            registry_with(ComponentDefinition::new("a").with_prop(PropDefinition::new("", "f32")));
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyPropName { index: 0, .. }));

        let (registry, id) =
            registry_with(ComponentDefinition::new("b").with_prop(PropDefinition::new("x", "")));
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyPropType { ref field, .. } if field == "x"));
    }

    #[test]
    fn test_read_huge_prop_count_fails_cleanly() {
        let err = SchemaReader::new(&HugeCount).read(ComponentId(1)).unwrap_err();
        assert!(matches!(err, SchemaError::EmptyPropName { index: 0, ref component } if component == "huge"));
    }

    #[test]
    fn test_read_rejects_bad_storage() {
        let (registry, id) = registry_with(
            ComponentDefinition::new("c").with_prop(PropDefinition::new("x", "f32").with_storage("f64", 1)),
        );
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::InvalidStorageType { .. }));
    }

    #[test]
    fn test_read_unknown_keyword_needs_size() {
        let (registry, id) = registry_with(
            ComponentDefinition::new("d").with_prop(PropDefinition {
                storage_type: Some("u32".into()),
                ..PropDefinition::new("raw", "custom")
            }),
        );
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::PropSizeUnavailable { .. }));
    }

    #[test]
    fn test_read_rejects_duplicate_field() {
        let (registry, id) = registry_with(
            ComponentDefinition::new("e")
                .with_prop(PropDefinition::new("x", "f32"))
                .with_prop(PropDefinition::new("x", "i32")),
        );
        let err = SchemaReader::new(&registry).read(id).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateField { ref field, .. } if field == "x"));
    }

    #[test]
    fn test_read_passes_zero_size_through() {
        let (registry, id) = registry_with(
            ComponentDefinition::new("f").with_prop(PropDefinition::new("x", "f32").with_storage("f32", 0)),
        );
        let schema = SchemaReader::new(&registry).read(id).unwrap();
        assert_eq!(schema.fields[0].storage_words, 0);
    }
}
