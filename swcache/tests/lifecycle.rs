mod common;

use std::sync::Arc;

use http::StatusCode;
use pretty_assertions::assert_eq;
use swcache::{CacheMode, GenerationName, LifecycleState, ServiceWorker, WorkerError};
use swcache_store::{CacheStore, MemoryStore};

use common::{FlakyStore, ScriptedNetwork, cached, config, key, url};

#[tokio::test]
async fn install_caches_every_static_asset() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);
    let store = MemoryStore::new();

    let worker = ServiceWorker::new(config.clone(), Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap();

    assert_eq!(worker.state(), LifecycleState::Installed);
    let mut entries: Vec<String> = store
        .entries(&config.static_generation())
        .await
        .unwrap()
        .iter()
        .map(|key| key.url().to_owned())
        .collect();
    entries.sort();
    let mut expected: Vec<String> = config.static_assets.iter().map(|path| url(path)).collect();
    expected.sort();
    assert_eq!(entries, expected);
}

#[tokio::test]
async fn install_bypasses_http_caches() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);

    ServiceWorker::new(config, Arc::new(MemoryStore::new()))
        .install(&network)
        .await
        .unwrap();

    assert_eq!(network.cache_modes(&url("/icon.svg")), vec![CacheMode::Reload]);
}

#[tokio::test]
async fn install_fails_on_error_status_and_writes_nothing() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);
    network.respond(&url("/icon-512.png"), StatusCode::NOT_FOUND, "missing");
    let store = MemoryStore::new();

    let worker = ServiceWorker::new(config.clone(), Arc::new(store.clone()));
    let handle = worker.clone();
    let error = worker.install(&network).await.unwrap_err();

    assert!(matches!(
        error,
        WorkerError::InstallStatus { ref path, status }
            if path == "/icon-512.png" && status == StatusCode::NOT_FOUND
    ));
    assert_eq!(handle.state(), LifecycleState::Redundant);
    assert!(!store.has_generation(&config.static_generation()));
}

#[tokio::test]
async fn install_fails_when_offline() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);
    network.go_offline();
    let store = MemoryStore::new();

    let error = ServiceWorker::new(config, Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap_err();

    assert!(matches!(error, WorkerError::Install { .. }));
    assert!(error.is_offline());
    assert!(store.is_empty());
}

#[tokio::test]
async fn install_drops_generation_when_a_write_fails() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);
    let inner = MemoryStore::new();
    let store = FlakyStore::new(inner.clone());
    store.fail_puts_after(2);

    let worker = ServiceWorker::new(config.clone(), Arc::new(store));
    let handle = worker.clone();
    let error = worker.install(&network).await.unwrap_err();

    assert!(matches!(error, WorkerError::Store(_)));
    assert_eq!(handle.state(), LifecycleState::Redundant);
    assert!(!inner.has_generation(&config.static_generation()));
}

#[tokio::test]
async fn install_is_idempotent() {
    let config = config();
    let network = ScriptedNetwork::serving_manifest(&config);
    let store = MemoryStore::new();

    for _ in 0..2 {
        ServiceWorker::new(config.clone(), Arc::new(store.clone()))
            .install(&network)
            .await
            .unwrap();
    }

    assert_eq!(
        store.generations().await.unwrap(),
        vec![config.static_generation()]
    );
    assert_eq!(
        store.entries(&config.static_generation()).await.unwrap().len(),
        config.static_assets.len()
    );
}

#[tokio::test]
async fn activate_evicts_previous_versions() {
    let store = MemoryStore::new();
    let old_static = GenerationName::new("catolid-v1");
    let old_runtime = GenerationName::new("catolid-runtime-v1");
    let foreign = GenerationName::new("workbox-precache");
    for generation in [&old_static, &old_runtime, &foreign] {
        store
            .put(generation, &key(&url("/old")), cached("old"))
            .await
            .unwrap();
    }

    let config = config();
    let runtime = config.runtime_generation();
    store
        .put(&runtime, &key(&url("/perfil")), cached("kept"))
        .await
        .unwrap();

    let network = ScriptedNetwork::serving_manifest(&config);
    let worker = ServiceWorker::new(config.clone(), Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap()
        .activate()
        .await
        .unwrap();

    assert_eq!(worker.state(), LifecycleState::Active);
    let mut generations = store.generations().await.unwrap();
    generations.sort();
    assert_eq!(generations, vec![config.runtime_generation(), config.static_generation()]);
    assert!(
        store
            .lookup(&runtime, &key(&url("/perfil")))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn version_bump_replaces_generations() {
    let store = MemoryStore::new();
    let v2 = config();
    let network = ScriptedNetwork::serving_manifest(&v2);

    ServiceWorker::new(v2.clone(), Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap()
        .activate()
        .await
        .unwrap();

    let v3 = swcache::WorkerConfig::builder(v2.scope.clone()).version(3).build();
    ServiceWorker::new(v3.clone(), Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap()
        .activate()
        .await
        .unwrap();

    let generations = store.generations().await.unwrap();
    assert!(!generations.contains(&v2.static_generation()));
    assert!(generations.contains(&v3.static_generation()));
}

#[tokio::test]
async fn clear_caches_deletes_current_generations_too() {
    let config = config();
    let store = MemoryStore::new();
    let network = ScriptedNetwork::serving_manifest(&config);
    let worker = ServiceWorker::new(config.clone(), Arc::new(store.clone()))
        .install(&network)
        .await
        .unwrap()
        .activate()
        .await
        .unwrap();
    store
        .put(&config.runtime_generation(), &key(&url("/perfil")), cached("me"))
        .await
        .unwrap();

    assert_eq!(worker.clear_caches().await, 2);
    assert!(store.generations().await.unwrap().is_empty());
    assert_eq!(worker.state(), LifecycleState::Active);
}
