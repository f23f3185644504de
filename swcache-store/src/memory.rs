//! Unbounded in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use swcache_core::{CacheKey, CachedResponse, GenerationName};

use crate::{CacheStore, DeleteStatus, StoreError, StoreResult};

#[derive(Debug, Default)]
struct Generation {
    created: u64,
    entries: DashMap<CacheKey, CachedResponse>,
}

/// In-memory cache store built on [`DashMap`].
///
/// Thread-safe and cheap to clone (`Arc` internally). Clones share the same
/// generations. Nothing is evicted: a generation lives until it is deleted.
///
/// ```
/// use swcache_store::MemoryStore;
///
/// let store = MemoryStore::new();
/// let shared = store.clone();
/// assert_eq!(store.len(), shared.len());
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    generations: Arc<DashMap<GenerationName, Arc<Generation>>>,
    sequence: Arc<AtomicU64>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of entries over all generations.
    pub fn len(&self) -> usize {
        self.generations
            .iter()
            .map(|generation| generation.entries.len())
            .sum()
    }

    /// Whether the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Check if a generation exists.
    pub fn has_generation(&self, generation: &GenerationName) -> bool {
        self.generations.contains_key(generation)
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
                Arc::new(Generation {
                    created: self.sequence.fetch_add(1, Ordering::Relaxed),
                    entries: DashMap::new(),
                })
            });
        Arc::clone(entry.value())
    }
}

#[async_trait]
impl CacheStore for MemoryStore {
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
        self.get_or_create(generation)
            .entries
            .insert(key.clone(), response);
        Ok(())
    }

    async fn lookup(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<Option<CachedResponse>> {
        Ok(self
            .get(generation)
            .and_then(|generation| generation.entries.get(key).map(|entry| entry.clone())))
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
        Ok(match self.generations.remove(generation) {
            Some((_, removed)) => DeleteStatus::Deleted(removed.entries.len() as u32),
            None => DeleteStatus::Missing,
        })
    }

    async fn entries(&self, generation: &GenerationName) -> StoreResult<Vec<CacheKey>> {
        let generation = self
            .get(generation)
            .ok_or_else(|| StoreError::GenerationMissing(generation.clone()))?;
        Ok(generation
            .entries
            .iter()
            .map(|entry| entry.key().clone())
            .collect())
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<DeleteStatus> {
        let removed = self
            .get(generation)
            .and_then(|generation| generation.entries.remove(key));
        Ok(match removed {
            Some(_) => DeleteStatus::Deleted(1),
            None => DeleteStatus::Missing,
        })
    }

    fn label(&self) -> &str {
        "memory"
    }
}
