//! # component_world
//!
//! The surface a host or scripting layer talks to. A [`World`] creates one
//! component store per component type on demand, hands out identity-stable
//! views, and tears everything down when it is dropped.
//!
//! This crate provides:
//!
//! - [`World`] / [`StoreHandle`]: store lifecycle, views and node
//!   association helpers.
//! - [`Host`] and its parts ([`CapacityProvider`], [`ComponentAssociation`]):
//!   what a world needs from its host besides schemas and nodes.
//! - [`LocalHost`]: an in-memory host backed by a
//!   [`DefinitionRegistry`](component_schema::DefinitionRegistry).
//! - [`WorldConfig`]: entity limit and store size, with environment
//!   overrides.

pub mod config;
pub mod error;
pub mod host;
pub mod local;
pub mod world;

pub use config::WorldConfig;
pub use error::{HostError, WorldError};
pub use host::{CapacityProvider, ComponentAssociation, Host};
pub use local::LocalHost;
pub use world::{StoreHandle, World};
