//! Cache store selection.

use std::sync::Arc;
use std::time::Duration;

use bytesize::ByteSize;
use serde::{Deserialize, Serialize};
use swcache_store::{CacheStore, MemoryStore};

use crate::error::ConfigError;

/// Settings of a bounded Moka store.
///
/// Bounds apply to every generation separately.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
pub struct Moka {
    /// Maximum number of entries per generation.
    #[serde(default)]
    pub max_entries: Option<u64>,
    /// Maximum total size of response bodies per generation (e.g. "50MB").
    #[serde(default)]
    pub max_bytes: Option<ByteSize>,
    /// Label used in logs and metrics.
    #[serde(default)]
    pub label: Option<String>,
    /// Drop entries older than this (e.g. "7d").
    #[serde(default, with = "humantime_serde")]
    pub time_to_live: Option<Duration>,
}

/// Which store holds the cache generations.
///
/// ```yaml
/// type: Moka
/// max_bytes: 50MB
/// time_to_live: 7d
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq, Default)]
#[serde(tag = "type")]
pub enum Store {
    /// Unbounded in-memory store.
    #[default]
    Memory,
    /// Bounded in-memory store with eviction.
    Moka(Moka),
}

impl Store {
    /// Builds the configured store.
    pub fn into_store(self) -> Result<Arc<dyn CacheStore>, ConfigError> {
        match self {
            Store::Memory => Ok(Arc::new(MemoryStore::new())),
            #[cfg(feature = "moka")]
            Store::Moka(config) => {
                use swcache_moka::MokaStore;

                let label = config.label.unwrap_or_else(|| "moka".to_string());
                let store = match (config.max_entries, config.max_bytes) {
                    (Some(entries), None) => {
                        let mut builder = MokaStore::builder().max_entries(entries).label(label);
                        if let Some(ttl) = config.time_to_live {
                            builder = builder.time_to_live(ttl);
                        }
                        builder.build()
                    }
                    (None, Some(bytes)) => {
                        let mut builder = MokaStore::builder()
                            .max_bytes(bytes.as_u64())
                            .label(label);
                        if let Some(ttl) = config.time_to_live {
                            builder = builder.time_to_live(ttl);
                        }
                        builder.build()
                    }
                    _ => {
                        return Err(ConfigError::InvalidCapacity {
                            store: "Moka".to_string(),
                        });
                    }
                };
                Ok(Arc::new(store))
            }
            #[cfg(not(feature = "moka"))]
            Store::Moka(_) => Err(ConfigError::StoreNotAvailable("Moka".to_string())),
        }
    }
}
