use std::task::{Context, Poll};

use futures::future::BoxFuture;
use http::{HeaderName, Request, Response};
use http_body::Body as HttpBody;
use swcache::{FetchRequest, Registration};
use tower::{BoxError, Service};

use crate::body::ResponseBody;
use crate::network::TowerNetwork;

/// The Tower service built by [`ServiceWorkerLayer`](crate::ServiceWorkerLayer).
pub struct ServiceWorkerService<S> {
    inner: S,
    registration: Registration,
    cache_status_header: HeaderName,
}

impl<S> ServiceWorkerService<S> {
    /// Wraps `inner`.
    pub fn new(inner: S, registration: Registration, cache_status_header: HeaderName) -> Self {
        Self {
            inner,
            registration,
            cache_status_header,
        }
    }
}

impl<S: Clone> Clone for ServiceWorkerService<S> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            registration: self.registration.clone(),
            cache_status_header: self.cache_status_header.clone(),
        }
    }
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for ServiceWorkerService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + Sync + 'static,
    S::Future: Send,
    S::Error: Into<BoxError>,
    ReqBody: Default + Send + 'static,
    ResBody: HttpBody + Send + 'static,
    ResBody::Data: Send,
    ResBody::Error: Into<BoxError>,
{
    type Response = Response<ResponseBody<ResBody>>;
    type Error = BoxError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, request: Request<ReqBody>) -> Self::Future {
        // The readied service handles a declined request; the clone reaches
        // the network for the strategies.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let network = TowerNetwork::<S, ReqBody>::new(self.inner.clone());
        let registration = self.registration.clone();
        let header = self.cache_status_header.clone();

        Box::pin(async move {
            let fetch_request = FetchRequest::from_http(&request);
            match registration.handle_fetch(&fetch_request, &network).await {
                Ok(Some(outcome)) => Ok(outcome
                    .into_response_with(header)
                    .map(ResponseBody::complete)),
                Ok(None) => {
                    let response = inner.call(request).await.map_err(Into::into)?;
                    Ok(response.map(ResponseBody::Passthrough))
                }
                Err(error) => {
                    tracing::debug!(%error, uri = %fetch_request.uri(), "request failed without fallback");
                    Err(error.into())
                }
            }
        })
    }
}
