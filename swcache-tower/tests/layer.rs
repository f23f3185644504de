use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use bytes::Bytes;
use http::{Method, Request, Response, StatusCode};
use http_body_util::{BodyExt, Full};
use pretty_assertions::assert_eq;
use swcache::{Registration, ServiceWorker, WorkerConfig, WorkerError};
use swcache_store::MemoryStore;
use swcache_tower::{CACHE_STATUS_HEADER, ServiceWorkerLayer, TowerNetwork};
use tower::{Layer, Service, ServiceExt, service_fn};

#[derive(Clone, Default)]
struct Origin {
    offline: Arc<AtomicBool>,
    calls: Arc<AtomicUsize>,
}

impl Origin {
    fn service(
        &self,
    ) -> impl Service<
        Request<Full<Bytes>>,
        Response = Response<Full<Bytes>>,
        Error = io::Error,
        Future = impl Send,
    > + Clone
    + Send
    + Sync
    + 'static {
        let origin = self.clone();
        service_fn(move |request: Request<Full<Bytes>>| {
            let origin = origin.clone();
            async move {
                origin.calls.fetch_add(1, Ordering::SeqCst);
                if origin.offline.load(Ordering::SeqCst) {
                    return Err(io::Error::new(io::ErrorKind::NotConnected, "offline"));
                }
                let body = format!("{} {}", request.method(), request.uri().path());
                Ok(Response::new(Full::new(Bytes::from(body))))
            }
        })
    }
}

fn request(method: Method, path: &str) -> Request<Full<Bytes>> {
    Request::builder()
        .method(method)
        .uri(path)
        .body(Full::default())
        .unwrap()
}

async fn body_of<B>(response: Response<B>) -> Bytes
where
    B: http_body::Body,
    B::Error: std::fmt::Debug,
{
    response.into_body().collect().await.unwrap().to_bytes()
}

async fn registered(origin: &Origin) -> Registration {
    let registration = Registration::new();
    let config = WorkerConfig::new("https://catolid.app".parse().unwrap());
    let network = TowerNetwork::<_, Full<Bytes>>::new(origin.service());
    registration
        .register(
            ServiceWorker::new(config, Arc::new(MemoryStore::new())),
            &network,
        )
        .await
        .unwrap();
    registration
}

#[tokio::test]
async fn passes_through_without_active_worker() {
    let origin = Origin::default();
    let service = ServiceWorkerLayer::new(Registration::new()).layer(origin.service());

    let response = service.oneshot(request(Method::GET, "/perfil")).await.unwrap();

    assert!(response.headers().get(CACHE_STATUS_HEADER).is_none());
    assert_eq!(body_of(response).await, Bytes::from("GET /perfil"));
}

#[tokio::test]
async fn static_asset_is_served_from_cache() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let installs = origin.calls.load(Ordering::SeqCst);
    let service = ServiceWorkerLayer::new(registration).layer(origin.service());

    let response = service.oneshot(request(Method::GET, "/icon.svg")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[CACHE_STATUS_HEADER], "HIT");
    assert_eq!(body_of(response).await, Bytes::from("GET /icon.svg"));
    assert_eq!(origin.calls.load(Ordering::SeqCst), installs);
}

#[tokio::test]
async fn network_answer_is_tagged_miss() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let service = ServiceWorkerLayer::new(registration).layer(origin.service());

    let response = service.oneshot(request(Method::GET, "/perfil")).await.unwrap();

    assert_eq!(response.headers()[CACHE_STATUS_HEADER], "MISS");
}

#[tokio::test]
async fn non_get_requests_pass_through() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let service = ServiceWorkerLayer::new(registration).layer(origin.service());

    let response = service.oneshot(request(Method::POST, "/gatos")).await.unwrap();

    assert!(response.headers().get(CACHE_STATUS_HEADER).is_none());
    assert_eq!(body_of(response).await, Bytes::from("POST /gatos"));
}

#[tokio::test]
async fn entry_document_is_served_offline() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let mut service = ServiceWorkerLayer::new(registration).layer(origin.service());
    origin.offline.store(true, Ordering::SeqCst);

    let response = service
        .ready()
        .await
        .unwrap()
        .call(request(Method::GET, "/"))
        .await
        .unwrap();

    assert_eq!(response.headers()[CACHE_STATUS_HEADER], "STALE");
    assert_eq!(body_of(response).await, Bytes::from("GET /index.html"));
}

#[tokio::test]
async fn offline_without_fallback_fails() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let service = ServiceWorkerLayer::new(registration).layer(origin.service());
    origin.offline.store(true, Ordering::SeqCst);

    let error = service
        .oneshot(request(Method::GET, "/gatos"))
        .await
        .unwrap_err();

    let error = error.downcast::<WorkerError>().unwrap();
    assert!(matches!(*error, WorkerError::NoFallback { .. }));
}

#[tokio::test]
async fn custom_status_header() {
    let origin = Origin::default();
    let registration = registered(&origin).await;
    let service = ServiceWorkerLayer::new(registration)
        .cache_status_header(http::HeaderName::from_static("x-sw-cache"))
        .layer(origin.service());

    let response = service.oneshot(request(Method::GET, "/icon.svg")).await.unwrap();

    assert_eq!(response.headers()["x-sw-cache"], "HIT");
    assert!(response.headers().get(CACHE_STATUS_HEADER).is_none());
}
