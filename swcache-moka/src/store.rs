//! Moka store implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use moka::future::Cache;
use smol_str::SmolStr;
use swcache_core::{CacheKey, CachedResponse, GenerationName};
use swcache_store::{CacheStore, DeleteStatus, StoreError, StoreResult};

use crate::builder::{MokaStoreBuilder, NoCapacity};

pub(crate) type GenerationFactory =
    Arc<dyn Fn() -> Cache<CacheKey, CachedResponse> + Send + Sync>;

struct Generation {
    created: u64,
    cache: Cache<CacheKey, CachedResponse>,
}

/// Bounded in-memory cache store powered by Moka.
///
/// Each generation is a separate Moka cache built with the store's capacity
/// settings. Reads are lock-free; the generation index is a [`DashMap`].
///
/// ```
/// use swcache_moka::MokaStore;
///
/// let store = MokaStore::builder().max_entries(10_000).build();
/// ```
#[derive(Clone)]
pub struct MokaStore {
    generations: Arc<DashMap<GenerationName, Arc<Generation>>>,
    sequence: Arc<AtomicU64>,
    factory: GenerationFactory,
    label: SmolStr,
}

impl std::fmt::Debug for MokaStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MokaStore")
            .field("label", &self.label)
            .field("generations", &self.generations.len())
            .finish()
    }
}

impl MokaStore {
    /// Creates a new builder for `MokaStore`.
    pub fn builder() -> MokaStoreBuilder<NoCapacity> {
        MokaStoreBuilder::new()
    }

    pub(crate) fn from_factory(label: SmolStr, factory: GenerationFactory) -> Self {
        Self {
            generations: Arc::new(DashMap::new()),
            sequence: Arc::new(AtomicU64::new(0)),
            factory,
            label,
        }
    }

    /// Returns the Moka cache behind a generation, if it exists.
    pub fn cache(&self, generation: &GenerationName) -> Option<Cache<CacheKey, CachedResponse>> {
        self.get(generation).map(|generation| generation.cache.clone())
    }

    fn get(&self, generation: &GenerationName) -> Option<Arc<Generation>> {
        self.generations
            .get(generation)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn get_or_create(&self, generation: &GenerationName) -> Arc<Generation> {
        let entry = self
            .generations
            .entry(generation.clone())
            .or_insert_with(|| {
                tracing::debug!(store = %self.label, %generation, "creating generation");
                Arc::new(Generation {
                    created: self.sequence.fetch_add(1, Ordering::Relaxed),
                    cache: (self.factory)(),
                })
            });
        Arc::clone(entry.value())
    }
}

#[async_trait]
impl CacheStore for MokaStore {
    async fn open(&self, generation: &GenerationName) -> StoreResult<()> {
        self.get_or_create(generation);
        Ok(())
    }

    async fn put(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
        response: CachedResponse,
    ) -> StoreResult<()> {
        let target = self.get_or_create(generation);
        target.cache.insert(key.clone(), response).await;
        crate::metrics::record_capacity(
            &self.label,
            generation.as_str(),
            target.cache.entry_count(),
            target.cache.weighted_size(),
        );
        Ok(())
    }

    async fn lookup(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<Option<CachedResponse>> {
        match self.get(generation) {
            Some(generation) => Ok(generation.cache.get(key).await),
            None => Ok(None),
        }
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationName>> {
        let mut names: Vec<(u64, GenerationName)> = self
            .generations
            .iter()
            .map(|entry| (entry.value().created, entry.key().clone()))
            .collect();
        names.sort_by_key(|(created, _)| *created);
        Ok(names.into_iter().map(|(_, name)| name).collect())
    }

    async fn delete_generation(&self, generation: &GenerationName) -> StoreResult<DeleteStatus> {
        match self.generations.remove(generation) {
            Some((_, removed)) => {
                removed.cache.run_pending_tasks().await;
                let entries = removed.cache.entry_count();
                removed.cache.invalidate_all();
                Ok(DeleteStatus::Deleted(entries.min(u32::MAX as u64) as u32))
            }
            None => Ok(DeleteStatus::Missing),
        }
    }

    async fn entries(&self, generation: &GenerationName) -> StoreResult<Vec<CacheKey>> {
        let target = self
            .get(generation)
            .ok_or_else(|| StoreError::GenerationMissing(generation.clone()))?;
        Ok(target
            .cache
            .iter()
            .map(|(key, _)| CacheKey::clone(&key))
            .collect())
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<DeleteStatus> {
        let removed = match self.get(generation) {
            Some(generation) => generation.cache.remove(key).await,
            None => None,
        };
        Ok(match removed {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn label(&self) -> &str {
        &self.label
    }
}
