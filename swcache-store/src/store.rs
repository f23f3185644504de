use std::sync::Arc;

use async_trait::async_trait;
use swcache_core::{CacheKey, CachedResponse, GenerationName};

use crate::{DeleteStatus, StoreError};

/// Result of a cache store operation.
pub type StoreResult<T> = Result<T, StoreError>;

/// Named cache generations of request/response entries.
///
/// A store keeps generations in creation order. [`generations`] and
/// [`match_any`] observe that order, so the oldest surviving generation
/// answers first when a key exists in several of them.
///
/// Implementations must be safe to share between concurrently running
/// requests. There is no ordering between requests: the last write to a key
/// wins.
///
/// [`generations`]: CacheStore::generations
/// [`match_any`]: CacheStore::match_any
#[async_trait]
pub trait CacheStore: Send + Sync {
    /// Creates the generation if it does not exist yet.
    async fn open(&self, generation: &GenerationName) -> StoreResult<()>;

    /// Stores `response` under `key`, replacing any previous entry.
    ///
    /// The generation is created if it does not exist.
    async fn put(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
        response: CachedResponse,
    ) -> StoreResult<()>;

    /// Looks `key` up in a single generation.
    ///
    /// A missing generation is a miss, not an error.
    async fn lookup(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<Option<CachedResponse>>;

    /// Looks `key` up across every generation, oldest first.
    async fn match_any(
        &self,
        key: &CacheKey,
    ) -> StoreResult<Option<(GenerationName, CachedResponse)>> {
        for generation in self.generations().await? {
            if let Some(response) = self.lookup(&generation, key).await? {
                return Ok(Some((generation, response)));
            }
        }
        Ok(None)
    }

    /// Lists generation names in creation order.
    async fn generations(&self) -> StoreResult<Vec<GenerationName>>;

    /// Deletes a whole generation with all its entries.
    ///
    /// `Deleted(n)` carries the number of entries dropped with it, which may
    /// be zero for an empty generation.
    async fn delete_generation(&self, generation: &GenerationName) -> StoreResult<DeleteStatus>;

    /// Lists the keys stored in a generation.
    async fn entries(&self, generation: &GenerationName) -> StoreResult<Vec<CacheKey>>;

    /// Removes a single entry.
    async fn remove(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<DeleteStatus>;

    /// Returns the name of this store for logs and metrics.
    fn label(&self) -> &str {
        "store"
    }
}

macro_rules! forward_cache_store {
    ($($ty:ty),* $(,)?) => {$(
        #[async_trait]
        impl<T> CacheStore for $ty
        where
            T: CacheStore + ?Sized,
        {
            async fn open(&self, generation: &GenerationName) -> StoreResult<()> {
                (**self).open(generation).await
            }

            async fn put(
                &self,
                generation: &GenerationName,
                key: &CacheKey,
                response: CachedResponse,
            ) -> StoreResult<()> {
                (**self).put(generation, key, response).await
            }

            async fn lookup(
                &self,
                generation: &GenerationName,
                key: &CacheKey,
            ) -> StoreResult<Option<CachedResponse>> {
                (**self).lookup(generation, key).await
            }

            async fn match_any(
                &self,
                key: &CacheKey,
            ) -> StoreResult<Option<(GenerationName, CachedResponse)>> {
                (**self).match_any(key).await
            }

            async fn generations(&self) -> StoreResult<Vec<GenerationName>> {
                (**self).generations().await
            }

            async fn delete_generation(
                &self,
                generation: &GenerationName,
            ) -> StoreResult<DeleteStatus> {
                (**self).delete_generation(generation).await
            }

            async fn entries(&self, generation: &GenerationName) -> StoreResult<Vec<CacheKey>> {
                (**self).entries(generation).await
            }

            async fn remove(
                &self,
                generation: &GenerationName,
                key: &CacheKey,
            ) -> StoreResult<DeleteStatus> {
                (**self).remove(generation, key).await
            }

            fn label(&self) -> &str {
                (**self).label()
            }
        }
    )*};
}

forward_cache_store!(&T, Box<T>, Arc<T>);
