#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

/// Worker configuration.
///
/// Provides [`WorkerConfig`] with the page origin, generation names, the
/// static asset manifest and the routing knobs.
pub mod config;

/// Control channel messages.
///
/// `SKIP_WAITING` and `CLEAR_CACHE` sent by the foreground application.
pub mod control;

/// Error types of the caching worker.
pub mod error;

/// Worker lifecycle: install and activate.
pub mod lifecycle;

/// Metrics collection.
///
/// When the `metrics` feature is enabled, this module records counters and
/// histograms for:
/// - Cache hits, misses, and stale responses
/// - Request latency per strategy
/// - Store reads, writes and swallowed errors
/// - Lifecycle transitions and deleted generations
pub mod metrics;

/// Active and waiting workers.
pub mod registration;

/// Request routing.
pub mod router;

/// Strategy executors.
pub mod strategy;

pub use config::{DEFAULT_FRESHNESS_WINDOW, NavigationPolicy, WorkerConfig, WorkerConfigBuilder};
pub use control::{ControlMessage, ControlOutcome};
pub use error::WorkerError;
pub use lifecycle::{Active, Installed, LifecycleState, Parsed, ServiceWorker};
pub use registration::Registration;
pub use router::{Route, Router};
pub use strategy::{CACHE_STATUS_HEADER, Outcome, Strategy};

pub use swcache_core::{
    CacheKey, CacheMode, CacheStatus, CachedResponse, Fetch, FetchError, FetchRequest,
    FetchResult, GenerationName, Origin, ResponseSource,
};
pub use swcache_store::{CacheStore, MemoryStore};
