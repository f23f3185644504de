#![warn(missing_docs)]
//! # swcache-core
//!
//! Core types for the swcache offline caching layer.
//!
//! swcache sits between a client's network stack and the application it
//! serves, and answers every intercepted request from the network, from a
//! cache generation, or from a combination of both. This crate holds the
//! types every other swcache crate agrees on:
//!
//! - **Identify** a request in the cache ([`CacheKey`])
//! - **Describe** an intercepted request ([`FetchRequest`], [`Origin`])
//! - **Snapshot** a response for storage ([`CachedResponse`])
//! - **Name** cache generations ([`GenerationName`])
//! - **Reach** the network ([`Fetch`], [`FetchError`])
//! - **Report** where an answer came from ([`CacheStatus`], [`ResponseSource`])
//!

pub mod context;
pub mod fetch;
pub mod generation;
pub mod key;
pub mod origin;
pub mod request;
pub mod response;

pub use context::{CacheStatus, ResponseSource};
pub use fetch::{Fetch, FetchError, FetchResult};
pub use generation::GenerationName;
pub use key::CacheKey;
pub use origin::{Origin, OriginError};
pub use request::{CacheMode, FetchRequest};
pub use response::CachedResponse;
#[doc(hidden)]
pub use smol_str::SmolStr;

/// Raw byte data type used for response bodies.
/// Using `Bytes` provides efficient zero-copy cloning via reference counting.
pub type Raw = bytes::Bytes;
