//! Metrics declaration and recording.

use std::time::Duration;

use crate::strategy::Outcome;

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    // Request metrics

    /// Track number of routed requests.
    pub static ref REQUESTS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_requests_total",
            "Total number of requests handled by a caching strategy."
        );
        "swcache_requests_total"
    };
    /// Track number of declined requests.
    pub static ref DECLINED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_declined_total",
            "Total number of requests passed through without interception."
        );
        "swcache_declined_total"
    };
    /// Track number of failed requests.
    pub static ref FAILED_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_failed_total",
            "Total number of requests without network and without cached fallback."
        );
        "swcache_failed_total"
    };
    /// Track number of cache hit events.
    pub static ref CACHE_HIT_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_cache_hit_total",
            "Total number of cache hit events."
        );
        "swcache_cache_hit_total"
    };
    /// Track number of cache miss events.
    pub static ref CACHE_MISS_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_cache_miss_total",
            "Total number of cache miss events."
        );
        "swcache_cache_miss_total"
    };
    /// Track number of cache stale events.
    pub static ref CACHE_STALE_COUNTER: &'static str = {
        metrics::describe_counter!(
            "swcache_cache_stale_total",
            "Total number of cache stale events."
        );
        "swcache_cache_stale_total"
    };
    /// Histogram of request duration.
    pub static ref REQUEST_DURATION: &'static str = {
        metrics::describe_histogram!(
            "swcache_request_duration_seconds",
            metrics::Unit::Seconds,
            "Duration of intercepted requests in seconds."
        );
        "swcache_request_duration_seconds"
    };

    // Store metrics

    /// Track store reads per store.
    pub static ref STORE_READS: &'static str = {
        metrics::describe_counter!(
            "swcache_store_reads_total",
            "Total number of cache store reads per store."
        );
        "swcache_store_reads_total"
    };
    /// Track store writes per store.
    pub static ref STORE_WRITES: &'static str = {
        metrics::describe_counter!(
            "swcache_store_writes_total",
            "Total number of cache store writes per store."
        );
        "swcache_store_writes_total"
    };
    /// Track bytes written per store.
    pub static ref STORE_BYTES_WRITTEN: &'static str = {
        metrics::describe_counter!(
            "swcache_store_bytes_written_total",
            "Total response body bytes written per store."
        );
        "swcache_store_bytes_written_total"
    };
    /// Track swallowed store errors per store and operation.
    pub static ref STORE_ERRORS: &'static str = {
        metrics::describe_counter!(
            "swcache_store_errors_total",
            "Total number of cache store errors per store and operation."
        );
        "swcache_store_errors_total"
    };

    // Lifecycle metrics

    /// Track lifecycle transitions.
    pub static ref LIFECYCLE_TRANSITIONS: &'static str = {
        metrics::describe_counter!(
            "swcache_lifecycle_transitions_total",
            "Total number of worker lifecycle transitions per target state."
        );
        "swcache_lifecycle_transitions_total"
    };
    /// Track deleted generations.
    pub static ref GENERATIONS_DELETED: &'static str = {
        metrics::describe_counter!(
            "swcache_generations_deleted_total",
            "Total number of cache generations deleted."
        );
        "swcache_generations_deleted_total"
    };
}

/// Record metrics of an answered request.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_outcome(outcome: &Outcome, duration: Duration) {
    let status = outcome.status.as_str();
    let strategy = outcome.strategy.as_str();

    metrics::histogram!(
        *REQUEST_DURATION,
        "status" => status,
        "strategy" => strategy
    )
    .record(duration.as_secs_f64());
    metrics::counter!(*REQUESTS_COUNTER, "strategy" => strategy).increment(1);

    let counter = match outcome.status {
        swcache_core::CacheStatus::Hit => *CACHE_HIT_COUNTER,
        swcache_core::CacheStatus::Miss => *CACHE_MISS_COUNTER,
        swcache_core::CacheStatus::Stale => *CACHE_STALE_COUNTER,
    };
    metrics::counter!(counter, "source" => outcome.source.as_str().to_string()).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_outcome(_outcome: &Outcome, _duration: Duration) {}

/// Record a request that was passed through.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_declined() {
    metrics::counter!(*DECLINED_COUNTER).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_declined() {}

/// Record a request that failed without fallback.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_failed(strategy: &'static str) {
    metrics::counter!(*FAILED_COUNTER, "strategy" => strategy).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_failed(_strategy: &'static str) {}

/// Record a store read.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_read(store: &str, hit: bool) {
    metrics::counter!(
        *STORE_READS,
        "store" => store.to_string(),
        "found" => if hit { "true" } else { "false" }
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_read(_store: &str, _hit: bool) {}

/// Record a store write.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_write(store: &str, bytes: usize) {
    metrics::counter!(*STORE_WRITES, "store" => store.to_string()).increment(1);
    metrics::counter!(*STORE_BYTES_WRITTEN, "store" => store.to_string()).increment(bytes as u64);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_write(_store: &str, _bytes: usize) {}

/// Record a swallowed store error.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_store_error(store: &str, operation: &'static str) {
    metrics::counter!(
        *STORE_ERRORS,
        "store" => store.to_string(),
        "operation" => operation
    )
    .increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_store_error(_store: &str, _operation: &'static str) {}

/// Record a lifecycle transition.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_transition(state: &'static str) {
    metrics::counter!(*LIFECYCLE_TRANSITIONS, "state" => state).increment(1);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_transition(_state: &'static str) {}

/// Record deleted generations.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_generations_deleted(count: usize) {
    metrics::counter!(*GENERATIONS_DELETED).increment(count as u64);
}

/// No-op version when metrics feature is disabled.
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_generations_deleted(_count: usize) {}
