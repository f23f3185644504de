//! Top-level configuration document.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use swcache::{Parsed, ServiceWorker, WorkerConfig};
use swcache_store::CacheStore;

use crate::error::ConfigError;
use crate::store::Store;

/// A complete configuration: the worker and the store backing it.
///
/// ```yaml
/// worker:
///   scope: https://catolid.app
///   version: 3
///   freshness_window: 5m
///   backend_hosts: [supabase.co]
/// store:
///   type: Memory
/// ```
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
pub struct Settings {
    /// Worker configuration.
    pub worker: WorkerConfig,
    /// Cache store, in-memory by default.
    #[serde(default)]
    pub store: Store,
}

impl Settings {
    /// Parses and validates a YAML document.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_saphyr::from_str(yaml)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Parses and validates a JSON document.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Checks that every configured path is absolute.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let worker = &self.worker;
        let paths = worker
            .static_assets
            .iter()
            .map(|path| ("static_assets", path))
            .chain(std::iter::once(("entry_document", &worker.entry_document)));
        for (field, path) in paths {
            if !path.starts_with('/') {
                return Err(ConfigError::InvalidPath {
                    field,
                    path: path.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Splits into the worker configuration and the built store.
    pub fn into_parts(self) -> Result<(WorkerConfig, Arc<dyn CacheStore>), ConfigError> {
        let store = self.store.into_store()?;
        Ok((self.worker, store))
    }

    /// Builds a worker ready to be installed.
    pub fn into_worker(self) -> Result<ServiceWorker<Parsed>, ConfigError> {
        let (config, store) = self.into_parts()?;
        Ok(ServiceWorker::new(config, store))
    }
}
