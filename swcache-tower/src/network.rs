//! Network adapter for Tower services.
//!
//! [`TowerNetwork`] lets the caching strategies reach the network through
//! the service the layer wraps. Users typically don't interact with it
//! directly: it is used by
//! [`ServiceWorkerService`](crate::ServiceWorkerService).

use std::marker::PhantomData;

use async_trait::async_trait;
use bytes::Bytes;
use http::{Request, Response};
use http_body::Body as HttpBody;
use http_body_util::BodyExt;
use swcache_core::{Fetch, FetchError, FetchRequest, FetchResult};
use tower::{BoxError, Service, ServiceExt};

/// Adapter implementing [`Fetch`] for a Tower service.
///
/// The intercepted request head is turned back into an `http::Request` with
/// an empty body and sent through a clone of the service. The response body
/// is collected into [`Bytes`] so it can be stored. A service error is a
/// network failure; any response, whatever its status, is not.
///
/// # Type Parameters
///
/// * `S` - The Tower service being adapted
/// * `ReqBody` - Request body type, built with `Default`
pub struct TowerNetwork<S, ReqBody> {
    service: S,
    _phantom: PhantomData<fn() -> ReqBody>,
}

impl<S, ReqBody> TowerNetwork<S, ReqBody> {
    /// Creates a new network adapter wrapping the given service.
    pub fn new(service: S) -> Self {
        Self {
            service,
            _phantom: PhantomData,
        }
    }
}

impl<S: Clone, ReqBody> Clone for TowerNetwork<S, ReqBody> {
    fn clone(&self) -> Self {
        Self::new(self.service.clone())
    }
}

#[async_trait]
impl<S, ReqBody, ResBody> Fetch for TowerNetwork<S, ReqBody>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + Sync,
    S::Future: Send,
    S::Error: Into<BoxError>,
    ReqBody: Default + Send,
    ResBody: HttpBody + Send,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        let url = request.uri().to_string();
        let response = self
            .service
            .clone()
            .oneshot(request.into_http::<ReqBody>())
            .await
            .map_err(|error| FetchError::Upstream(error.into()))?;

        let (parts, body) = response.into_parts();
        let bytes: Bytes = body
            .collect()
            .await
            .map_err(|error| FetchError::transport(url, error))?
            .to_bytes();
        Ok(Response::from_parts(parts, bytes))
    }
}
