use serde::{Deserialize, Serialize};

use crate::{any::AnyStore, error::ConfigError};

/// Redis (or Valkey) store settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Redis {
    /// Connection URL, e.g. `redis://localhost:6379/0`.
    pub connection_string: String,
    /// Optional label for this store (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
}

/// In-memory store settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq, Eq)]
pub struct Memory {
    /// Optional label for this store (used in metrics/tracing).
    #[serde(default)]
    pub label: Option<String>,
}

/// Which store to build, tagged by `type`.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(tag = "type")]
pub enum StoreConfig {
    /// Redis protocol server.
    Redis(Redis),
    /// Process-local store.
    Memory(Memory),
}

impl StoreConfig {
    /// Parses a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        serde_saphyr::from_str(yaml).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Builds the configured store.
    ///
    /// Nothing is contacted yet, network stores connect on first use.
    pub fn into_store(self) -> Result<AnyStore, ConfigError> {
        match self {
            #[cfg(feature = "redis")]
            StoreConfig::Redis(config) => {
                use indexbox_redis::RedisStore;

                let mut builder = RedisStore::builder().server(config.connection_string);
                if let Some(label) = config.label {
                    builder = builder.label(label);
                }
                let store = builder
                    .build()
                    .map_err(|e| ConfigError::StoreNotAvailable(format!("Redis: {}", e)))?;
                Ok(AnyStore::Redis(store))
            }
            #[cfg(not(feature = "redis"))]
            StoreConfig::Redis(_) => Err(ConfigError::StoreNotAvailable("Redis".to_string())),
            #[cfg(feature = "memory")]
            StoreConfig::Memory(config) => {
                use indexbox_memory::MemoryStore;

                let mut builder = MemoryStore::builder();
                if let Some(label) = config.label {
                    builder = builder.label(label);
                }
                Ok(AnyStore::Memory(builder.build()))
            }
            #[cfg(not(feature = "memory"))]
            StoreConfig::Memory(_) => Err(ConfigError::StoreNotAvailable("Memory".to_string())),
        }
    }
}
