//! Example of using swcache-reqwest with reqwest-middleware.
//!
//! The worker is configured from YAML, installed with a plain client and
//! then answers requests made through the middleware client.
//!
//! Run:
//!   cargo run -p swcache-demos --example reqwest

use reqwest::Client;
use reqwest_middleware::ClientBuilder;
use swcache::Registration;
use swcache_configuration::Settings;
use swcache_reqwest::{CACHE_STATUS_HEADER, ReqwestNetwork, ServiceWorkerMiddleware};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter("swcache=debug")
        .init();

    // httpbin plays the part of the application origin
    let config_yaml = r#"
    worker:
      scope: https://httpbin.org
      cache_prefix: demo
      version: 1
      static_assets:
        - /html
        - /robots.txt
      entry_document: /html
      freshness_window: 1m
    store:
      type: Moka
      max_bytes: 10MB
    "#;

    let settings = Settings::from_yaml(config_yaml)?;
    let scope = settings.worker.scope.clone();
    let worker = settings.into_worker()?;

    let client = Client::new();
    let registration = Registration::new();
    let state = registration
        .register(
            worker,
            &ReqwestNetwork::new(client.clone()).with_origin(scope),
        )
        .await?;
    println!("Worker state: {state}");

    let client = ClientBuilder::new(client)
        .with(ServiceWorkerMiddleware::new(registration))
        .build();

    for url in [
        // precached: served without touching the network
        "https://httpbin.org/robots.txt",
        // same origin: network first, stored for offline use
        "https://httpbin.org/json",
        "https://httpbin.org/json",
        // cross origin: fresh for one minute, so the second one is a HIT
        "https://fonts.googleapis.com/css2?family=Inter",
        "https://fonts.googleapis.com/css2?family=Inter",
    ] {
        let response = client.get(url).send().await?;
        println!(
            "{url}: {} {:?}",
            response.status(),
            response.headers().get(CACHE_STATUS_HEADER)
        );
    }

    Ok(())
}
