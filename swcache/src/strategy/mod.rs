//! Strategy executors.
//!
//! Every routed request is handled by exactly one [`Strategy`]. Each
//! strategy has an [`Executor`] implementing its read, write and fallback
//! behavior against the cache store and the network.
//!
//! Rules shared by all executors:
//!
//! - only 2xx responses are written to the store
//! - a failed store write is logged and never fails the request
//! - a failed store read is logged and treated as a miss
//! - an HTTP error status is a valid response: it is returned as is and
//!   never triggers a fallback

mod cache_first;
mod network_first;
mod network_only;
mod stale_while_revalidate;
mod store_ops;

pub use cache_first::CacheFirstExecutor;
pub use network_first::{EntryFallbackExecutor, NetworkFirstExecutor};
pub use network_only::NetworkOnlyExecutor;
pub use stale_while_revalidate::StaleWhileRevalidateExecutor;

use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use http::{HeaderName, HeaderValue, Response, Uri};
use serde::{Deserialize, Serialize};
use swcache_core::{
    CacheKey, CacheStatus, CachedResponse, Fetch, FetchRequest, GenerationName, ResponseSource,
};
use swcache_store::CacheStore;

use crate::config::WorkerConfig;
use crate::error::WorkerError;

/// Header carrying the [`CacheStatus`] of an answered request.
pub const CACHE_STATUS_HEADER: &str = "x-cache-status";

/// The five ways a routed request can be answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    /// Network first; on network failure serve the cached entry document.
    NetworkFirstEntryFallback,
    /// Cache first; on a miss fetch and store into the static generation.
    CacheFirst,
    /// Network first; store 2xx into the runtime generation and fall back
    /// to the cached entry for the same request.
    NetworkFirst,
    /// Network only; read the cache solely when the network fails. Never
    /// writes.
    NetworkOnly,
    /// Serve a fresh cached entry without touching the network, otherwise
    /// revalidate and fall back to the stale entry.
    StaleWhileRevalidate,
}

impl Strategy {
    /// All strategies, in routing-table order.
    pub const ALL: [Strategy; 5] = [
        Strategy::NetworkFirstEntryFallback,
        Strategy::CacheFirst,
        Strategy::NetworkFirst,
        Strategy::NetworkOnly,
        Strategy::StaleWhileRevalidate,
    ];

    /// Returns the strategy name as a string slice.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Strategy::NetworkFirstEntryFallback => "network_first_entry_fallback",
            Strategy::CacheFirst => "cache_first",
            Strategy::NetworkFirst => "network_first",
            Strategy::NetworkOnly => "network_only",
            Strategy::StaleWhileRevalidate => "stale_while_revalidate",
        }
    }

    /// Returns the executor implementing this strategy.
    pub fn executor(&self) -> &'static dyn Executor {
        match self {
            Strategy::NetworkFirstEntryFallback => &EntryFallbackExecutor,
            Strategy::CacheFirst => &CacheFirstExecutor,
            Strategy::NetworkFirst => &NetworkFirstExecutor,
            Strategy::NetworkOnly => &NetworkOnlyExecutor,
            Strategy::StaleWhileRevalidate => &StaleWhileRevalidateExecutor,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The answer to a routed request.
#[derive(Debug)]
pub struct Outcome {
    /// The response handed back to the requester.
    pub response: Response<Bytes>,
    /// Whether the response came fresh from cache, from the network, or
    /// from a stale fallback.
    pub status: CacheStatus,
    /// The network or the generation the response was read from.
    pub source: ResponseSource,
    /// The strategy that produced the answer.
    pub strategy: Strategy,
}

impl Outcome {
    /// An answer fetched from the network.
    pub fn network(response: Response<Bytes>, strategy: Strategy) -> Self {
        Self {
            response,
            status: CacheStatus::Miss,
            source: ResponseSource::Network,
            strategy,
        }
    }

    /// An answer read from a cache generation.
    pub fn cached(
        generation: GenerationName,
        cached: CachedResponse,
        status: CacheStatus,
        strategy: Strategy,
    ) -> Self {
        Self {
            response: cached.into(),
            status,
            source: ResponseSource::Store(generation),
            strategy,
        }
    }

    /// Returns the response with the `x-cache-status` header set.
    pub fn into_response(self) -> Response<Bytes> {
        self.into_response_with(HeaderName::from_static(CACHE_STATUS_HEADER))
    }

    /// Returns the response with the cache status written to `header`.
    pub fn into_response_with(self, header: HeaderName) -> Response<Bytes> {
        let mut response = self.response;
        response.headers_mut().insert(
            header,
            HeaderValue::from_static(self.status.as_header_value()),
        );
        response
    }
}

/// Everything an executor needs to answer a request.
pub struct StrategyContext<'a> {
    /// The cache store.
    pub store: &'a dyn CacheStore,
    /// The network.
    pub network: &'a dyn Fetch,
    /// The worker configuration.
    pub config: &'a WorkerConfig,
    /// The current static generation.
    pub static_generation: &'a GenerationName,
    /// The current runtime generation.
    pub runtime_generation: &'a GenerationName,
}

impl StrategyContext<'_> {
    /// Key of a same-origin path, e.g. the entry document.
    pub fn same_origin_key(&self, path: &str) -> CacheKey {
        match Uri::try_from(path) {
            Ok(uri) => FetchRequest::get(uri).resolve(&self.config.scope).key(),
            Err(_) => CacheKey::get(format!("{}{}", self.config.scope, path)),
        }
    }
}

/// Implements the read, write and fallback behavior of one strategy.
#[async_trait]
pub trait Executor: Send + Sync {
    /// Answers an absolute `GET` request.
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError>;
}
