use component_schema::{ComponentId, StorageType};
use thiserror::Error;

/// Layout compilation failures. Raised once, when a store is created.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayoutError {
    #[error("field '{field}' has unknown type '{type_name}'")]
    UnknownType { field: String, type_name: String },
    #[error("field '{field}' has invalid storage width {words}")]
    InvalidWidth { field: String, words: u32 },
    #[error("layout of '{component}' does not fit in a 32-bit buffer")]
    TooLarge { component: String },
    #[error("default value of field '{field}' does not fit its storage")]
    InvalidDefault { field: String },
}

/// Accessor binding failures. Raised once per component type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BindingError {
    #[error("ref field '{field}' has no ref target")]
    MissingRefTarget { field: String },
    #[error("ref field '{field}' targets unknown kind '{target}'")]
    UnknownRefTarget { field: String, target: String },
    #[error("field '{field}' declares {found} words, its type needs {expected}")]
    WidthMismatch {
        field: String,
        expected: u32,
        found: u32,
    },
    #[error("field '{field}' declares {found} storage, its type needs {expected}")]
    StorageMismatch {
        field: String,
        expected: StorageType,
        found: StorageType,
    },
    #[error("field '{field}' has unknown type '{type_name}'")]
    UnknownType { field: String, type_name: String },
    #[error("field '{field}' is declared more than once")]
    DuplicateField { field: String },
    #[error("{0} is already bound to a different schema")]
    Conflict(ComponentId),
}

/// An address computation fell outside the store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoundsError {
    #[error("field index {index} out of range (field count {count})")]
    Field { index: usize, count: usize },
    #[error("instance index {index} out of range (capacity {capacity})")]
    Instance { index: u32, capacity: u32 },
    #[error("element {index} out of range (width {len})")]
    Element { index: usize, len: usize },
    #[error("expected {expected} values, got {found}")]
    Length { expected: usize, found: usize },
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error(transparent)]
    Binding(#[from] BindingError),
    #[error(transparent)]
    Bounds(#[from] BoundsError),
    #[error("store for {0} has been disposed")]
    Disposed(ComponentId),
    #[error("field '{field}' is not a {expected} field")]
    TypeMismatch { field: String, expected: &'static str },
    #[error("field '{0}' has no setter; write through its composite view")]
    ReadOnlyField(String),
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("snapshot does not match the layout of '{0}'")]
    LayoutMismatch(String),
    #[error("snapshot encode error: {0}")]
    Encode(#[from] rmp_serde::encode::Error),
    #[error("snapshot decode error: {0}")]
    Decode(#[from] rmp_serde::decode::Error),
}
