use component_schema::{ComponentId, SchemaError};
use component_store::{NodeHandle, StoreError};
use thiserror::Error;

/// Failures reported by a host.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeHandle),
    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),
    #[error("component store size {requested} exceeds the entity limit {max}")]
    StoreSizeTooLarge { requested: u32, max: u32 },
    #[error("entity limit {max} reached")]
    TooManyNodes { max: u32 },
}

#[derive(Debug, Error)]
pub enum WorldError {
    #[error(transparent)]
    Schema(#[from] SchemaError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Host(#[from] HostError),
    #[error("stale store handle for {0}")]
    StaleHandle(ComponentId),
}
