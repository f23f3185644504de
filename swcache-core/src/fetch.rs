//! The network, as seen by the interception layer.

use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use bytes::Bytes;
use http::Response;

use crate::request::FetchRequest;

/// Boxed error coming from a transport or an upstream service.
pub type BoxError = Box<dyn StdError + Send + Sync>;

/// Result of a network fetch.
pub type FetchResult = Result<Response<Bytes>, FetchError>;

/// Transport-level fetch failure.
///
/// An HTTP error status is *not* a `FetchError`: a reachable server that
/// answers 404 or 500 produced a valid response. This error means no
/// response was obtained at all (DNS failure, connection refused, offline).
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// The request could not be delivered or no response arrived.
    #[error("network request to {url} failed: {source}")]
    Transport {
        /// URL of the failed request.
        url: String,
        /// Underlying transport error.
        #[source]
        source: BoxError,
    },
    /// A wrapped service failed without producing a response.
    #[error("upstream service failed: {0}")]
    Upstream(#[source] BoxError),
    /// The request cannot be sent as is (relative URL without an origin,
    /// unsupported scheme).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl FetchError {
    /// Builds a [`FetchError::Transport`].
    pub fn transport(url: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Transport {
            url: url.into(),
            source: source.into(),
        }
    }
}

/// Trait for reaching the network.
///
/// Implementations must resolve HTTP error statuses to `Ok` and reserve `Err`
/// for transport failures; the caching strategies depend on that split.
///
/// # Examples
///
/// ```rust
/// use async_trait::async_trait;
/// use bytes::Bytes;
/// use http::Response;
/// use swcache_core::{Fetch, FetchRequest, FetchResult};
///
/// struct AlwaysOk;
///
/// #[async_trait]
/// impl Fetch for AlwaysOk {
///     async fn fetch(&self, _request: FetchRequest) -> FetchResult {
///         Ok(Response::new(Bytes::from_static(b"ok")))
///     }
/// }
/// ```
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Sends the request and waits for the full response.
    async fn fetch(&self, request: FetchRequest) -> FetchResult;
}

#[async_trait]
impl<T> Fetch for &T
where
    T: Fetch + ?Sized,
{
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<T> Fetch for Box<T>
where
    T: Fetch + ?Sized,
{
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        (**self).fetch(request).await
    }
}

#[async_trait]
impl<T> Fetch for Arc<T>
where
    T: Fetch + ?Sized,
{
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        (**self).fetch(request).await
    }
}
