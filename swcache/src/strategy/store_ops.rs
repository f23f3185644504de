//! Store access that never fails a request.

use bytes::Bytes;
use http::Response;
use swcache_core::{CacheKey, CachedResponse, GenerationName};
use swcache_store::CacheStore;

use crate::metrics;

/// Looks `key` up across all generations. Read errors are misses.
pub(crate) async fn match_any(
    store: &dyn CacheStore,
    key: &CacheKey,
) -> Option<(GenerationName, CachedResponse)> {
    match store.match_any(key).await {
        Ok(found) => {
            metrics::record_store_read(store.label(), found.is_some());
            found
        }
        Err(error) => {
            tracing::warn!(store = store.label(), %key, %error, "cache read failed, treating as miss");
            metrics::record_store_error(store.label(), "read");
            None
        }
    }
}

/// Stores a 2xx response. Returns whether it was written.
pub(crate) async fn put_success(
    store: &dyn CacheStore,
    generation: &GenerationName,
    key: &CacheKey,
    response: &Response<Bytes>,
) -> bool {
    if !response.status().is_success() {
        tracing::debug!(%key, status = %response.status(), "not caching unsuccessful response");
        return false;
    }
    match store
        .put(generation, key, CachedResponse::from_http(response))
        .await
    {
        Ok(()) => {
            tracing::debug!(%key, %generation, "stored");
            metrics::record_store_write(store.label(), response.body().len());
            true
        }
        Err(error) => {
            tracing::warn!(store = store.label(), %key, %generation, %error, "cache write failed");
            metrics::record_store_error(store.label(), "write");
            false
        }
    }
}
