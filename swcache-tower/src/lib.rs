//! Tower middleware integration for the swcache offline caching layer.
//!
//! This crate provides [`ServiceWorkerLayer`], a Tower [`Layer`] that puts a
//! [`Registration`] in front of any Tower HTTP service. The wrapped service
//! plays the role of the network: strategies call it on cache misses and
//! revalidations, and requests the router declines reach it untouched.
//!
//! # Request Flow
//!
//! 1. The request head is copied into a [`FetchRequest`](swcache::FetchRequest).
//! 2. The active worker routes it. Without an active worker, or when the
//!    router declines it (non-`GET`, non-http), the request goes to the
//!    wrapped service as is and its response streams back.
//! 3. Otherwise the strategy answers, from the store or through a clone of
//!    the wrapped service, and the buffered response carries a cache status
//!    header.
//! 4. When the strategy has neither network nor fallback, the service fails
//!    with the [`WorkerError`](swcache::WorkerError) boxed as a
//!    [`BoxError`](tower::BoxError).
//!
//! # Response Headers
//!
//! | Header Value | Meaning |
//! |--------------|---------|
//! | `HIT` | Served from a cache generation without the network |
//! | `MISS` | Fetched from the network |
//! | `STALE` | Cached entry served because the network failed |
//!
//! The default header name is `x-cache-status`. Customize it with
//! [`ServiceWorkerLayer::cache_status_header`]. Declined requests carry no
//! header.
//!
//! [`Layer`]: tower::Layer
//! [`Registration`]: swcache::Registration

#![warn(missing_docs)]

mod body;
mod layer;
/// Network adapter for bridging Tower services to swcache.
pub mod network;
mod service;

pub use body::ResponseBody;
pub use layer::ServiceWorkerLayer;
pub use network::TowerNetwork;
pub use service::ServiceWorkerService;
pub use swcache::CACHE_STATUS_HEADER;
