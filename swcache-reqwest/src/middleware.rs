//! Offline caching middleware for reqwest-middleware.

use async_trait::async_trait;
use bytes::Bytes;
use http::{Extensions, Uri};
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};
use swcache::{FetchRequest, Registration};
use swcache_core::{Fetch, FetchError, FetchResult};

use crate::network::into_response;

/// Answers client requests through a [`Registration`].
///
/// Requests the active worker intercepts are answered by its caching
/// strategies; those reach the network through the rest of the middleware
/// chain. Declined requests, and every request while no worker is active,
/// continue down the chain untouched. A request with neither network nor
/// fallback fails with [`reqwest_middleware::Error::Middleware`] wrapping
/// the [`WorkerError`](swcache::WorkerError).
///
/// Intercepted responses carry an `x-cache-status` header.
#[derive(Clone, Debug)]
pub struct ServiceWorkerMiddleware {
    registration: Registration,
}

impl ServiceWorkerMiddleware {
    /// Creates a middleware answering through `registration`.
    pub fn new(registration: Registration) -> Self {
        Self { registration }
    }
}

#[async_trait]
impl Middleware for ServiceWorkerMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        let Some(fetch_request) = fetch_request(&req) else {
            return next.run(req, extensions).await;
        };

        let network = NextNetwork {
            next: next.clone(),
            extensions: extensions.clone(),
        };
        match self.registration.handle_fetch(&fetch_request, &network).await {
            Ok(Some(outcome)) => Ok(outcome.into_response().into()),
            Ok(None) => next.run(req, extensions).await,
            Err(error) => Err(reqwest_middleware::Error::middleware(error)),
        }
    }
}

fn fetch_request(req: &Request) -> Option<FetchRequest> {
    let uri: Uri = req.url().as_str().parse().ok()?;
    let mut request = FetchRequest::new(req.method().clone(), uri);
    *request.headers_mut() = req.headers().clone();
    Some(request)
}

/// The rest of the middleware chain seen as the network.
struct NextNetwork<'a> {
    next: Next<'a>,
    extensions: Extensions,
}

#[async_trait]
impl<'a> Fetch for NextNetwork<'a> {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        let url = request.uri().to_string();
        let request = Request::try_from(request.into_http::<Bytes>())
            .map_err(|error| FetchError::InvalidRequest(error.to_string()))?;
        let mut extensions = self.extensions.clone();
        let response = self
            .next
            .clone()
            .run(request, &mut extensions)
            .await
            .map_err(|error| FetchError::transport(url.clone(), error))?;
        into_response(url, response).await
    }
}
