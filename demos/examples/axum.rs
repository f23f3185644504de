//! Axum Integration Example
//!
//! Serves a small single-page application behind the offline caching layer.
//! The router stands in for the origin server; a switch lets you take it
//! "offline" to watch the fallbacks kick in.
//!
//! Run:
//!   cargo run -p swcache-demos --example axum
//!
//! Try it:
//!   curl -i http://localhost:3000/icon.svg               # HIT, precached at install
//!   curl -i http://localhost:3000/api/cats.json          # MISS, stored in the runtime generation
//!   curl -i -X POST http://localhost:3000/sw/offline     # the origin goes away
//!   curl -i http://localhost:3000/                       # STALE, cached /index.html
//!   curl -i http://localhost:3000/api/cats.json          # STALE, runtime copy
//!   curl -i http://localhost:3000/api/dogs.json          # 503, nothing to fall back to
//!   curl -i -X POST http://localhost:3000/sw/online
//!
//! Control channel:
//!   curl -i -X POST -d '{"type":"CLEAR_CACHE"}' http://localhost:3000/sw/message

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Router,
    body::{Body, Bytes},
    error_handling::HandleErrorLayer,
    extract::State,
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use swcache::{ControlOutcome, Registration, ServiceWorker, WorkerConfig};
use swcache_moka::MokaStore;
use swcache_tower::{ServiceWorkerLayer, TowerNetwork};
use tower::{BoxError, ServiceBuilder};

// Origin server

const INDEX: &str = r#"<!doctype html>
<html>
  <head><link rel="manifest" href="/manifest.json"></head>
  <body><h1>Catolid</h1></body>
</html>"#;

const ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><circle cx="5" cy="5" r="4"/></svg>"#;

async fn index() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/html")], INDEX)
}

const MANIFEST: &str = r#"{"name":"Catolid","start_url":"/","display":"standalone"}"#;

async fn manifest() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/manifest+json")], MANIFEST)
}

async fn icon() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], ICON)
}

async fn png() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/png")], Bytes::from_static(b"\x89PNG"))
}

async fn cats() -> impl IntoResponse {
    tracing::info!("origin: serving cats");
    (
        [(header::CONTENT_TYPE, "application/json")],
        r#"[{"name":"Tom"},{"name":"Mia"}]"#,
    )
}

fn origin() -> Router {
    Router::new()
        .route("/", get(index))
        .route("/index.html", get(index))
        .route("/manifest.json", get(manifest))
        .route("/icon.svg", get(icon))
        .route("/icon-192.png", get(png))
        .route("/icon-512.png", get(png))
        .route("/api/cats.json", get(cats))
}

// Worker control

#[derive(Clone)]
struct AppState {
    registration: Registration,
    offline: Arc<AtomicBool>,
}

async fn post_message(State(state): State<AppState>, body: Bytes) -> impl IntoResponse {
    match state.registration.post_message(&body).await {
        ControlOutcome::Ignored => (StatusCode::BAD_REQUEST, "ignored".to_owned()),
        ControlOutcome::SkippedWaiting { activated } => {
            (StatusCode::OK, format!("activated waiting worker: {activated}"))
        }
        ControlOutcome::CachesCleared { generations } => {
            (StatusCode::OK, format!("deleted {generations} generations"))
        }
    }
}

async fn go_offline(State(state): State<AppState>) -> &'static str {
    state.offline.store(true, Ordering::SeqCst);
    "origin is offline"
}

async fn go_online(State(state): State<AppState>) -> &'static str {
    state.offline.store(false, Ordering::SeqCst);
    "origin is online"
}

async fn handle_error(error: BoxError) -> (StatusCode, String) {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        format!("offline and not cached: {error}"),
    )
}

// Main

#[tokio::main]
async fn main() {
    let subscriber = tracing_subscriber::fmt()
        .pretty()
        .with_env_filter("info,swcache=debug")
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");

    let offline = Arc::new(AtomicBool::new(false));
    let switch = Arc::clone(&offline);
    let origin = ServiceBuilder::new()
        .filter(move |request: Request<Body>| {
            if switch.load(Ordering::SeqCst) {
                Err(std::io::Error::new(
                    std::io::ErrorKind::NotConnected,
                    "origin is offline",
                ))
            } else {
                Ok(request)
            }
        })
        .service(origin());

    let config = WorkerConfig::new("http://localhost:3000".parse().expect("valid origin"));
    let store = MokaStore::builder().max_entries(1024).label("demo").build();
    let registration = Registration::new();
    let network = TowerNetwork::<_, Body>::new(origin.clone());
    let state = registration
        .register(ServiceWorker::new(config, Arc::new(store)), &network)
        .await
        .expect("Failed to install the worker");
    tracing::info!(%state, "worker registered");

    let app = Router::new()
        .route("/sw/message", post(post_message))
        .route("/sw/offline", post(go_offline))
        .route("/sw/online", post(go_online))
        .with_state(AppState {
            registration: registration.clone(),
            offline,
        })
        .fallback_service(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_error))
                .layer(ServiceWorkerLayer::new(registration))
                .service(origin),
        );

    let listener = tokio::net::TcpListener::bind("0.0.0.0:3000")
        .await
        .expect("Failed to bind to port 3000");
    tracing::info!(
        "Listening on http://{}",
        listener.local_addr().expect("bound listener has an address")
    );
    axum::serve(listener, app).await.expect("Server error");
}
