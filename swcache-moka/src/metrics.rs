//! Moka store capacity metrics.
//!
//! Enable the `metrics` feature to use these metrics.
//!
//! ## Metrics
//!
//! - `swcache_moka_entries` - Current number of entries in a generation (gauge)
//! - `swcache_moka_size_bytes` - Current weighted size of a generation (gauge)
//!
//! Both metrics carry `store` and `generation` labels.

#[cfg(feature = "metrics")]
use lazy_static::lazy_static;

#[cfg(feature = "metrics")]
lazy_static! {
    /// Metric name for generation entry count gauge.
    pub static ref MOKA_ENTRIES: &'static str = {
        metrics::describe_gauge!(
            "swcache_moka_entries",
            "Current number of entries in a Moka cache generation."
        );
        "swcache_moka_entries"
    };

    /// Metric name for generation size gauge.
    pub static ref MOKA_SIZE_BYTES: &'static str = {
        metrics::describe_gauge!(
            "swcache_moka_size_bytes",
            "Current weighted size of a Moka cache generation."
        );
        "swcache_moka_size_bytes"
    };
}

/// Record current generation capacity metrics.
#[cfg(feature = "metrics")]
#[inline]
pub fn record_capacity(store: &str, generation: &str, entries: u64, size: u64) {
    metrics::gauge!(
        *MOKA_ENTRIES,
        "store" => store.to_string(),
        "generation" => generation.to_string()
    )
    .set(entries as f64);
    metrics::gauge!(
        *MOKA_SIZE_BYTES,
        "store" => store.to_string(),
        "generation" => generation.to_string()
    )
    .set(size as f64);
}

/// Record current generation capacity metrics (no-op when `metrics` feature disabled).
#[cfg(not(feature = "metrics"))]
#[inline]
pub fn record_capacity(_store: &str, _generation: &str, _entries: u64, _size: u64) {}
