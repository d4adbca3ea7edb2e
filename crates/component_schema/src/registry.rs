/// Definition registry: collects component definitions from IDL or JSON
/// sources and hands out stable component ids.
use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use crate::definition::ComponentDefinition;
use crate::error::SchemaError;
use crate::parser::Parser;
use crate::reader::SchemaSource;
use crate::schema::{ComponentId, DefaultValue, StorageType};

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonDefinitions {
    Many(Vec<ComponentDefinition>),
    One(ComponentDefinition),
}

/// All known component definitions. Ids are assigned from 1 in definition
/// order; [`ComponentId::NONE`] never names a definition.
#[derive(Debug, Clone, Default)]
pub struct DefinitionRegistry {
    definitions: Vec<ComponentDefinition>,
    ids_by_name: HashMap<String, ComponentId>,
}

impl DefinitionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a definition and return its id.
    ///
    /// Defining the same component twice with identical contents returns the
    /// existing id.
    ///
    /// # Errors
    ///
    /// [`SchemaError::DuplicateComponent`] if a different definition already
    /// uses the name.
    pub fn define(&mut self, definition: ComponentDefinition) -> Result<ComponentId, SchemaError> {
        if let Some(&id) = self.ids_by_name.get(&definition.name) {
            return if self.get(id) == Some(&definition) {
                Ok(id)
            } else {
                Err(SchemaError::DuplicateComponent(definition.name))
            };
        }

        let id = ComponentId(self.definitions.len() as u32 + 1);
        debug!(component = %definition.name, %id, props = definition.props.len(), "defined component");
        self.ids_by_name.insert(definition.name.clone(), id);
        self.definitions.push(definition);
        Ok(id)
    }

    /// Load a `.json` file or a definition-language file.
    pub fn load_file(&mut self, path: &Path) -> Result<Vec<ComponentId>, SchemaError> {
        let source = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            self.load_json(&source)
        } else {
            self.load_source(&source)
        }
    }

    /// Parse definition-language source and register every component in it.
    pub fn load_source(&mut self, source: &str) -> Result<Vec<ComponentId>, SchemaError> {
        Parser::parse(source)?
            .into_iter()
            .map(|def| self.define(def))
            .collect()
    }

    /// Register one JSON definition object or an array of them.
    pub fn load_json(&mut self, json: &str) -> Result<Vec<ComponentId>, SchemaError> {
        let defs = match serde_json::from_str(json)? {
            JsonDefinitions::Many(defs) => defs,
            JsonDefinitions::One(def) => vec![def],
        };
        defs.into_iter().map(|def| self.define(def)).collect()
    }

    pub fn get(&self, id: ComponentId) -> Option<&ComponentDefinition> {
        let index = id.0.checked_sub(1)?;
        self.definitions.get(index as usize)
    }

    pub fn find(&self, name: &str) -> Option<ComponentId> {
        self.ids_by_name.get(name).copied()
    }

    /// Definitions with their ids, in definition order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentId, &ComponentDefinition)> {
        self.definitions
            .iter()
            .enumerate()
            .map(|(i, def)| (ComponentId(i as u32 + 1), def))
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Serialise every definition as a JSON array.
    pub fn to_json(&self) -> Result<String, SchemaError> {
        Ok(serde_json::to_string_pretty(&self.definitions)?)
    }

    fn prop(&self, id: ComponentId, index: u32) -> Option<&crate::definition::PropDefinition> {
        self.get(id)?.prop(index as usize)
    }
}

impl SchemaSource for DefinitionRegistry {
    fn find_component_by_name(&self, name: &str) -> ComponentId {
        self.find(name).unwrap_or(ComponentId::NONE)
    }

    fn component_name(&self, id: ComponentId) -> Option<String> {
        self.get(id).map(|def| def.name.clone())
    }

    fn prop_count(&self, id: ComponentId) -> Option<u32> {
        self.get(id).map(|def| def.props.len() as u32)
    }

    fn prop_name(&self, id: ComponentId, index: u32) -> Option<String> {
        self.prop(id, index).map(|p| p.name.clone())
    }

    fn prop_type(&self, id: ComponentId, index: u32) -> Option<String> {
        self.prop(id, index).map(|p| p.prop_type.clone())
    }

    fn prop_ref_type(&self, id: ComponentId, index: u32) -> Option<String> {
        self.prop(id, index)?.ref_type.clone()
    }

    fn prop_storage_type(&self, id: ComponentId, index: u32) -> i32 {
        self.prop(id, index)
            .and_then(|p| p.resolved_storage_type())
            .and_then(|s| StorageType::parse(&s))
            .map_or(-1, StorageType::as_raw)
    }

    fn prop_size(&self, id: ComponentId, index: u32) -> Option<u32> {
        self.prop(id, index)?.resolved_size()
    }

    fn prop_default(&self, id: ComponentId, index: u32) -> Option<DefaultValue> {
        self.prop(id, index)?.default_value.clone()
    }
}
