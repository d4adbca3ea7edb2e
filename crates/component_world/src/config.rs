//! World configuration.

use tracing::warn;

use crate::error::HostError;

/// Default upper bound on live nodes.
pub const DEFAULT_MAX_ENTITIES: u32 = 10_000;

/// Default number of instance slots per component store.
pub const DEFAULT_COMPONENT_STORE_SIZE: u32 = 1_000;

/// Environment variable overriding [`WorldConfig::max_entities`].
pub const MAX_ENTITIES_ENV: &str = "COMPONENT_MAX_ENTITIES";

/// Environment variable overriding [`WorldConfig::component_store_size`].
pub const STORE_SIZE_ENV: &str = "COMPONENT_STORE_SIZE";

/// Sizing of a world and its component stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    /// Maximum number of live nodes.
    pub max_entities: u32,
    /// Instance capacity of every component store. Never above
    /// `max_entities`.
    pub component_store_size: u32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            max_entities: DEFAULT_MAX_ENTITIES,
            component_store_size: DEFAULT_COMPONENT_STORE_SIZE,
        }
    }
}

impl WorldConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Defaults overridden by [`MAX_ENTITIES_ENV`] and [`STORE_SIZE_ENV`].
    /// Values that do not parse as `u32` are ignored with a warning.
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(max) = env_u32(MAX_ENTITIES_ENV) {
            config.max_entities = max;
        }
        if let Some(size) = env_u32(STORE_SIZE_ENV) {
            config.component_store_size = size;
        }
        config
    }

    #[must_use]
    pub fn with_max_entities(mut self, max_entities: u32) -> Self {
        self.max_entities = max_entities;
        self
    }

    #[must_use]
    pub fn with_component_store_size(mut self, size: u32) -> Self {
        self.component_store_size = size;
        self
    }

    /// # Errors
    ///
    /// [`HostError::StoreSizeTooLarge`] if the store size exceeds the entity
    /// limit.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.component_store_size > self.max_entities {
            return Err(HostError::StoreSizeTooLarge {
                requested: self.component_store_size,
                max: self.max_entities,
            });
        }
        Ok(())
    }
}

fn env_u32(name: &str) -> Option<u32> {
    let value = std::env::var(name).ok()?;
    match value.trim().parse() {
        Ok(parsed) => Some(parsed),
        Err(_) => {
            warn!(var = name, value = %value, "ignoring non-numeric override");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = WorldConfig::new();
        assert_eq!(config.max_entities, DEFAULT_MAX_ENTITIES);
        assert_eq!(config.component_store_size, DEFAULT_COMPONENT_STORE_SIZE);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_and_validate() {
        let config = WorldConfig::new()
            .with_max_entities(8)
            .with_component_store_size(16);
        assert_eq!(
            config.validate(),
            Err(HostError::StoreSizeTooLarge {
                requested: 16,
                max: 8
            })
        );
        assert!(config.with_component_store_size(8).validate().is_ok());
    }

    #[test]
    fn test_env_parse() {
        assert_eq!(env_u32("COMPONENT_WORLD_TEST_UNSET_VARIABLE"), None);
    }
}
