//! Builder for configuring [`MokaStore`].

use std::sync::Arc;
use std::time::Duration;

use moka::future::{Cache, CacheBuilder};
use moka::policy::EvictionPolicy;
use smol_str::SmolStr;
use swcache_core::{CacheKey, CachedResponse};

use crate::store::{GenerationFactory, MokaStore};

/// Marker type: capacity has not been configured yet.
///
/// You must call either [`max_entries()`](MokaStoreBuilder::max_entries) or
/// [`max_bytes()`](MokaStoreBuilder::max_bytes) before calling `build()`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapacity;

/// Marker type: each generation holds at most `n` entries.
#[derive(Debug, Clone, Copy)]
pub struct EntryCapacity(pub(crate) u64);

/// Marker type: each generation uses at most `n` bytes (approximate).
#[derive(Debug, Clone, Copy)]
pub struct ByteCapacity(pub(crate) u64);

/// Builder for creating and configuring a [`MokaStore`].
///
/// Capacity applies to every generation separately. It is set with exactly
/// one of [`max_entries`](Self::max_entries) or
/// [`max_bytes`](Self::max_bytes); `build()` only exists once it is set.
///
/// ```
/// use std::time::Duration;
/// use swcache_moka::MokaStore;
///
/// let store = MokaStore::builder()
///     .label("runtime")
///     .time_to_live(Duration::from_secs(24 * 60 * 60))
///     .max_entries(1_000)
///     .build();
/// ```
pub struct MokaStoreBuilder<Cap> {
    capacity: Cap,
    label: SmolStr,
    eviction_policy: Option<EvictionPolicy>,
    time_to_live: Option<Duration>,
}

impl MokaStoreBuilder<NoCapacity> {
    /// Creates a new builder without capacity.
    pub fn new() -> Self {
        Self {
            capacity: NoCapacity,
            label: SmolStr::new_static("moka"),
            eviction_policy: None,
            time_to_live: None,
        }
    }

    /// Sets the maximum number of entries per generation.
    pub fn max_entries(self, capacity: u64) -> MokaStoreBuilder<EntryCapacity> {
        MokaStoreBuilder {
            capacity: EntryCapacity(capacity),
            label: self.label,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
        }
    }

    /// Sets the approximate memory budget per generation, in bytes.
    ///
    /// An entry weighs its key plus its response snapshot, headers and body
    /// included.
    pub fn max_bytes(self, bytes: u64) -> MokaStoreBuilder<ByteCapacity> {
        MokaStoreBuilder {
            capacity: ByteCapacity(bytes),
            label: self.label,
            eviction_policy: self.eviction_policy,
            time_to_live: self.time_to_live,
        }
    }
}

impl Default for MokaStoreBuilder<NoCapacity> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Cap> MokaStoreBuilder<Cap> {
    /// Sets a custom label for this store.
    ///
    /// # Default
    ///
    /// `"moka"`
    pub fn label(mut self, label: impl Into<SmolStr>) -> Self {
        self.label = label.into();
        self
    }

    /// Sets the eviction policy for every generation.
    ///
    /// # Default
    ///
    /// - entry-based capacity: [`EvictionPolicy::tiny_lfu()`]
    /// - byte-based capacity: [`EvictionPolicy::lru()`]
    pub fn eviction_policy(mut self, policy: EvictionPolicy) -> Self {
        self.eviction_policy = Some(policy);
        self
    }

    /// Drops entries this long after they were written.
    ///
    /// Unrelated to the freshness window of stale-while-revalidate routes,
    /// which decides whether a stored entry is *served*, not whether it is
    /// *kept*.
    pub fn time_to_live(mut self, ttl: Duration) -> Self {
        self.time_to_live = Some(ttl);
        self
    }

    fn finish(self, factory: GenerationFactory) -> MokaStore {
        MokaStore::from_factory(self.label, factory)
    }
}

impl MokaStoreBuilder<EntryCapacity> {
    /// Builds the [`MokaStore`] with entry-count based capacity.
    pub fn build(self) -> MokaStore {
        let capacity = self.capacity.0;
        let policy = self
            .eviction_policy
            .clone()
            .unwrap_or_else(EvictionPolicy::tiny_lfu);
        let ttl = self.time_to_live;
        self.finish(Arc::new(move || {
            let mut builder: CacheBuilder<_, _, Cache<CacheKey, CachedResponse>> =
                CacheBuilder::new(capacity).eviction_policy(policy.clone());
            if let Some(ttl) = ttl {
                builder = builder.time_to_live(ttl);
            }
            builder.build()
        }))
    }
}

impl MokaStoreBuilder<ByteCapacity> {
    /// Builds the [`MokaStore`] with byte-based capacity.
    ///
    /// Default eviction policy is LRU: TinyLFU admission can reject a large
    /// entry even when eviction could make room for it.
    pub fn build(self) -> MokaStore {
        let capacity = self.capacity.0;
        let policy = self
            .eviction_policy
            .clone()
            .unwrap_or_else(EvictionPolicy::lru);
        let ttl = self.time_to_live;
        self.finish(Arc::new(move || {
            let mut builder: CacheBuilder<_, _, Cache<CacheKey, CachedResponse>> =
                CacheBuilder::new(capacity)
                    .weigher(byte_weigher)
                    .eviction_policy(policy.clone());
            if let Some(ttl) = ttl {
                builder = builder.time_to_live(ttl);
            }
            builder.build()
        }))
    }
}

fn byte_weigher(key: &CacheKey, value: &CachedResponse) -> u32 {
    (key.memory_size() + value.memory_size()).min(u32::MAX as usize) as u32
}
