use http::StatusCode;
use smol_str::SmolStr;
use swcache_core::{CacheKey, FetchError};
use swcache_store::StoreError;
use thiserror::Error;

/// Errors of the caching worker.
///
/// HTTP error statuses are never errors here: a 404 or a 500 from a
/// reachable server is a valid response and is handed back as is. Only
/// failures to obtain any response end up in this type.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// A static asset could not be fetched during install.
    #[error("install failed: cannot fetch static asset {path}")]
    Install {
        /// Manifest path of the asset.
        path: SmolStr,
        /// Transport failure.
        #[source]
        source: FetchError,
    },
    /// A static asset answered with a non-2xx status during install.
    #[error("install failed: static asset {path} answered {status}")]
    InstallStatus {
        /// Manifest path of the asset.
        path: SmolStr,
        /// Status the server answered with.
        status: StatusCode,
    },
    /// A cache store operation failed where it cannot be ignored.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A cache-first miss could not reach the network.
    #[error(transparent)]
    Network(#[from] FetchError),
    /// The network failed and no cached response exists for the request.
    #[error("network failed and no cached response exists for {key}")]
    NoFallback {
        /// Key that missed the cache.
        key: CacheKey,
        /// The network failure that triggered the fallback.
        #[source]
        source: FetchError,
    },
    /// The network failed and nothing, not even a stale entry, is cached
    /// for a cross-origin request.
    #[error("Network unavailable")]
    NetworkUnavailable {
        /// Key that missed the cache.
        key: CacheKey,
        /// The network failure that triggered the fallback.
        #[source]
        source: FetchError,
    },
    /// No worker is active in the registration.
    #[error("no active worker")]
    NoActiveWorker,
}

impl WorkerError {
    /// Whether the error was caused by the network being unreachable.
    pub fn is_offline(&self) -> bool {
        matches!(
            self,
            WorkerError::Network(_)
                | WorkerError::NoFallback { .. }
                | WorkerError::NetworkUnavailable { .. }
                | WorkerError::Install { .. }
        )
    }
}
