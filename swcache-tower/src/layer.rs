use http::HeaderName;
use swcache::{CACHE_STATUS_HEADER, Registration};
use tower::Layer;

use crate::service::ServiceWorkerService;

/// Tower [`Layer`] putting a [`Registration`] in front of a service.
///
/// Requests the active worker intercepts are answered by its caching
/// strategies, which reach the network through the wrapped service.
/// Everything else, including every request while no worker is active, goes
/// straight to the wrapped service.
///
/// ```ignore
/// use swcache::Registration;
/// use swcache_tower::ServiceWorkerLayer;
/// use tower::ServiceBuilder;
///
/// let registration = Registration::new();
/// let service = ServiceBuilder::new()
///     .layer(ServiceWorkerLayer::new(registration.clone()))
///     .service(app);
/// ```
#[derive(Clone, Debug)]
pub struct ServiceWorkerLayer {
    registration: Registration,
    cache_status_header: HeaderName,
}

impl ServiceWorkerLayer {
    /// Creates a layer answering through `registration`.
    pub fn new(registration: Registration) -> Self {
        Self {
            registration,
            cache_status_header: HeaderName::from_static(CACHE_STATUS_HEADER),
        }
    }

    /// Sets the header carrying the cache status of intercepted responses.
    ///
    /// Defaults to `x-cache-status`.
    pub fn cache_status_header(mut self, header: HeaderName) -> Self {
        self.cache_status_header = header;
        self
    }

    /// The registration requests are answered through.
    pub fn registration(&self) -> &Registration {
        &self.registration
    }
}

impl<S> Layer<S> for ServiceWorkerLayer {
    type Service = ServiceWorkerService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ServiceWorkerService::new(
            inner,
            self.registration.clone(),
            self.cache_status_header.clone(),
        )
    }
}
