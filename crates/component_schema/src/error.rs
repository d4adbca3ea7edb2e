use thiserror::Error;

use crate::schema::ComponentId;

/// Errors raised while loading definitions or reading a component schema.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("parse error: {0}")]
    Parse(#[from] crate::parser::ParseError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate component: {0}")]
    DuplicateComponent(String),
    #[error("unknown component: {0}")]
    UnknownComponent(ComponentId),
    #[error("unknown component name: {0}")]
    UnknownComponentName(String),
    #[error("{0} has an empty name")]
    EmptyComponentName(ComponentId),
    #[error("prop count unavailable for '{0}'")]
    PropCountUnavailable(String),
    #[error("component '{0}' has no fields")]
    NoFields(String),
    #[error("prop {index} of '{component}' has an empty name")]
    EmptyPropName { component: String, index: u32 },
    #[error("field '{component}.{field}' has an empty type")]
    EmptyPropType { component: String, field: String },
    #[error("field '{component}.{field}' has invalid storage type '{storage}'")]
    InvalidStorageType {
        component: String,
        field: String,
        storage: String,
    },
    #[error("size unavailable for field '{component}.{field}'")]
    PropSizeUnavailable { component: String, field: String },
    #[error("duplicate field '{field}' in '{component}'")]
    DuplicateField { component: String, field: String },
}
