//! # component_store
//!
//! Packed columnar storage for runtime-described components, and the typed
//! accessors that read and write it.
//!
//! A component type goes through four steps, each done once per type:
//! the schema is compiled into a [`LayoutTable`], a [`ComponentStore`]
//! allocates one buffer of that layout, an [`AccessorBinder`] turns the
//! schema into a [`ViewType`], and an [`InstanceCache`] hands out one
//! canonical [`ComponentView`] per instance index.
//!
//! This crate provides:
//!
//! - [`compile`] / [`LayoutTable`]: struct-of-arrays layout compilation.
//! - [`ComponentStore`]: the owned buffer and its single address formula.
//! - [`AccessorBinder`] / [`ViewType`] / [`FieldAccessor`]: bound accessors.
//! - [`ComponentView`] / [`CompositeView`]: per-instance field access.
//! - [`InstanceCache`]: identity-stable views.
//! - [`NodeHandle`] / [`NodeRegistry`]: node references with `0` as null.
//! - [`StoreSnapshot`]: MessagePack export and import of a store.
//!
//! Everything here is single-threaded (`Rc`/`RefCell`), so none of these
//! types are `Send` or `Sync`.

pub mod binder;
pub mod cache;
pub mod composite;
pub mod error;
pub mod layout;
pub mod node;
pub mod snapshot;
pub mod store;
pub mod view;

pub use binder::{AccessorBinder, AccessorKind, FieldAccessor, ViewType};
pub use cache::InstanceCache;
pub use composite::{CompositeKind, CompositeView};
pub use error::{BindingError, BoundsError, LayoutError, StoreError};
pub use layout::{LayoutTable, compile};
pub use node::{NodeHandle, NodeRegistry, RawNodeIds};
pub use snapshot::StoreSnapshot;
pub use store::ComponentStore;
pub use view::{ComponentView, FieldValue, ViewState};
