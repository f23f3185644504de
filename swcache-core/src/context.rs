//! Where an answer came from.

use crate::generation::GenerationName;

/// Whether the request was answered from cache, from the network, or from
/// stale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheStatus {
    /// Cache hit - a cached entry was served without contacting the network.
    Hit,
    /// Cache miss - the response came from the network.
    #[default]
    Miss,
    /// Stale data - a cached entry was served because the network failed.
    Stale,
}

impl CacheStatus {
    /// Returns the status as a string slice.
    #[inline]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "hit",
            CacheStatus::Miss => "miss",
            CacheStatus::Stale => "stale",
        }
    }

    /// Returns the status as an upper-case header value.
    #[inline]
    pub const fn as_header_value(&self) -> &'static str {
        match self {
            CacheStatus::Hit => "HIT",
            CacheStatus::Miss => "MISS",
            CacheStatus::Stale => "STALE",
        }
    }
}

/// Source of the response - the network or a cache generation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ResponseSource {
    /// Response came from the network.
    #[default]
    Network,
    /// Response came from the named cache generation.
    Store(GenerationName),
}

impl ResponseSource {
    /// Returns the source as a string slice.
    #[inline]
    pub fn as_str(&self) -> &str {
        match self {
            ResponseSource::Network => "network",
            ResponseSource::Store(generation) => generation.as_str(),
        }
    }
}
