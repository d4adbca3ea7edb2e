//! Host-side component definitions.
//!
//! These are the records a host registry stores. Storage type and size may
//! be left out, in which case they are derived from the type keyword. An
//! explicit `storageType`/`size` is kept as written so that a mismatch with
//! the keyword surfaces when the accessors are bound.

use serde::{Deserialize, Serialize};

use crate::schema::{DefaultValue, FieldType};

/// One declared property of a component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PropDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub prop_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ref_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<DefaultValue>,
}

impl PropDefinition {
    pub fn new(name: impl Into<String>, prop_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            prop_type: prop_type.into(),
            storage_type: None,
            size: None,
            ref_type: None,
            default_value: None,
        }
    }

    #[must_use]
    pub fn with_storage(mut self, storage_type: impl Into<String>, size: u32) -> Self {
        self.storage_type = Some(storage_type.into());
        self.size = Some(size);
        self
    }

    #[must_use]
    pub fn with_ref_type(mut self, ref_type: impl Into<String>) -> Self {
        self.ref_type = Some(ref_type.into());
        self
    }

    #[must_use]
    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default_value = Some(default);
        self
    }

    /// The declared storage keyword, or the one the type keyword implies.
    #[must_use]
    pub fn resolved_storage_type(&self) -> Option<String> {
        self.storage_type.clone().or_else(|| {
            FieldType::parse(&self.prop_type).map(|t| t.storage_type().as_str().to_string())
        })
    }

    /// The declared word count, or the one the type keyword implies.
    #[must_use]
    pub fn resolved_size(&self) -> Option<u32> {
        self.size
            .or_else(|| FieldType::parse(&self.prop_type).map(FieldType::storage_words))
    }
}

/// A named component and its ordered properties.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentDefinition {
    pub name: String,
    #[serde(default)]
    pub props: Vec<PropDefinition>,
}

impl ComponentDefinition {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_prop(mut self, prop: PropDefinition) -> Self {
        self.props.push(prop);
        self
    }

    pub fn prop(&self, index: usize) -> Option<&PropDefinition> {
        self.props.get(index)
    }
}
