//! # component_schema
//!
//! Describes component types at runtime: what fields a component has, how
//! each field is stored, and where those descriptions come from.
//!
//! This crate provides:
//!
//! - [`ComponentSchema`] / [`FieldDescriptor`]: the resolved, ordered field
//!   list a component store is compiled from.
//! - [`FieldType`] / [`StorageType`]: the closed set of field types and
//!   their word storage classes.
//! - [`ComponentDefinition`]: host-side definition records, loadable from
//!   JSON or from the `.component` definition language.
//! - [`DefinitionRegistry`]: an id-assigning registry of definitions.
//! - [`SchemaSource`] / [`SchemaReader`]: the registry lookup contract and
//!   the reader that turns lookups into a validated [`ComponentSchema`].

pub mod definition;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod reader;
pub mod registry;
pub mod schema;

pub use definition::{ComponentDefinition, PropDefinition};
pub use error::SchemaError;
pub use parser::{ParseError, Parser};
pub use reader::{SchemaReader, SchemaSource};
pub use registry::DefinitionRegistry;
pub use schema::{
    ComponentId, ComponentSchema, DefaultValue, FieldDescriptor, FieldType, StorageType,
};
