//! Integration tests for the reqwest integration using wiremock.

use std::sync::Arc;

use http::{Method, Uri};
use pretty_assertions::assert_eq;
use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use swcache::{
    CacheStatus, Fetch, FetchError, FetchRequest, Registration, ServiceWorker, WorkerConfig,
};
use swcache_reqwest::{CACHE_STATUS_HEADER, ReqwestNetwork, ServiceWorkerMiddleware};
use swcache_store::MemoryStore;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_manifest(server: &MockServer, config: &WorkerConfig) {
    for asset in &config.static_assets {
        Mock::given(method("GET"))
            .and(path(asset.as_str()))
            .respond_with(ResponseTemplate::new(200).set_body_string(format!("asset {asset}")))
            .expect(1)
            .mount(server)
            .await;
    }
}

async fn registered(server: &MockServer) -> Registration {
    let config = WorkerConfig::new(server.uri().parse().unwrap());
    mount_manifest(server, &config).await;

    let registration = Registration::new();
    registration
        .register(
            ServiceWorker::new(config, Arc::new(MemoryStore::new())),
            &ReqwestNetwork::default(),
        )
        .await
        .unwrap();
    registration
}

#[tokio::test]
async fn error_statuses_are_responses() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("nope"))
        .mount(&server)
        .await;

    let network = ReqwestNetwork::default();
    let request = FetchRequest::get(format!("{}/missing", server.uri()).parse().unwrap());
    let response = network.fetch(request).await.unwrap();

    assert_eq!(response.status(), 404);
    assert_eq!(response.body().as_ref(), b"nope");
}

#[tokio::test]
async fn relative_requests_resolve_against_origin() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/perfil"))
        .respond_with(ResponseTemplate::new(200).set_body_string("me"))
        .expect(1)
        .mount(&server)
        .await;

    let network = ReqwestNetwork::default().with_origin(server.uri().parse().unwrap());
    let response = network
        .fetch(FetchRequest::get(Uri::from_static("/perfil")))
        .await
        .unwrap();
    assert_eq!(response.body().as_ref(), b"me");

    let error = ReqwestNetwork::default()
        .fetch(FetchRequest::get(Uri::from_static("/perfil")))
        .await
        .unwrap_err();
    assert!(matches!(error, FetchError::InvalidRequest(_)));
}

#[tokio::test]
async fn unreachable_server_is_a_transport_error() {
    let server = MockServer::start().await;
    let url = format!("{}/perfil", server.uri());
    drop(server);

    let error = ReqwestNetwork::default()
        .fetch(FetchRequest::get(url.parse().unwrap()))
        .await
        .unwrap_err();
    assert!(matches!(error, FetchError::Transport { .. }));
}

#[tokio::test]
async fn static_assets_are_served_from_cache() {
    let server = MockServer::start().await;
    let registration = registered(&server).await;
    let client = ClientBuilder::new(Client::new())
        .with(ServiceWorkerMiddleware::new(registration))
        .build();

    for _ in 0..3 {
        let response = client
            .get(format!("{}/icon.svg", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.headers()[CACHE_STATUS_HEADER], "HIT");
        assert_eq!(response.text().await.unwrap(), "asset /icon.svg");
    }
}

#[tokio::test]
async fn cross_origin_resources_are_reused_within_freshness_window() {
    let server = MockServer::start().await;
    let cdn = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/inter.woff2"))
        .respond_with(ResponseTemplate::new(200).set_body_string("font"))
        .expect(1)
        .mount(&cdn)
        .await;
    let registration = registered(&server).await;
    let client = ClientBuilder::new(Client::new())
        .with(ServiceWorkerMiddleware::new(registration.clone()))
        .build();
    let url = format!("{}/inter.woff2", cdn.uri());

    let first = client.get(&url).send().await.unwrap();
    assert_eq!(first.headers()[CACHE_STATUS_HEADER], "MISS");
    let second = client.get(&url).send().await.unwrap();
    assert_eq!(second.headers()[CACHE_STATUS_HEADER], "HIT");

    let outcome = registration
        .handle_fetch(&FetchRequest::get(url.parse().unwrap()), &ReqwestNetwork::default())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(outcome.status, CacheStatus::Hit);
}

#[tokio::test]
async fn non_get_requests_pass_through() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/gatos"))
        .respond_with(ResponseTemplate::new(201))
        .expect(2)
        .mount(&server)
        .await;
    let registration = registered(&server).await;
    let client = ClientBuilder::new(Client::new())
        .with(ServiceWorkerMiddleware::new(registration))
        .build();

    for _ in 0..2 {
        let response = client
            .request(Method::POST, format!("{}/gatos", server.uri()))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), 201);
        assert!(response.headers().get(CACHE_STATUS_HEADER).is_none());
    }
}
