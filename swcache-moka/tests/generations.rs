//! Tests for per-generation capacity and generation management.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use swcache_core::{CacheKey, CachedResponse, GenerationName};
use swcache_moka::{MokaStore, MokaStoreBuilder};
use swcache_store::{CacheStore, DeleteStatus};

fn make_key(id: u32) -> CacheKey {
    CacheKey::get(format!("https://catolid.app/assets/{id}.js"))
}

fn make_value(size: usize) -> CachedResponse {
    CachedResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from(vec![0u8; size]))
}

#[tokio::test]
async fn test_max_bytes_eviction_is_per_generation() {
    let key = make_key(1);
    let value = make_value(100);
    let single_entry_size = key.memory_size() + value.memory_size();

    // Capacity fits exactly 3 entries per generation
    let store = MokaStoreBuilder::default()
        .max_bytes((single_entry_size * 3) as u64)
        .build();
    let runtime = GenerationName::new("catolid-runtime-v2");
    let shell = GenerationName::new("catolid-v2");

    store.put(&shell, &make_key(100), make_value(100)).await.unwrap();
    for i in 1..=3 {
        store.put(&runtime, &make_key(i), make_value(100)).await.unwrap();
    }
    let cache = store.cache(&runtime).unwrap();
    cache.run_pending_tasks().await;

    store.put(&runtime, &make_key(4), make_value(100)).await.unwrap();
    cache.run_pending_tasks().await;

    let mut count = 0;
    for i in 1..=4 {
        if store.lookup(&runtime, &make_key(i)).await.unwrap().is_some() {
            count += 1;
        }
    }
    assert_eq!(count, 3, "runtime generation should keep exactly 3 entries");

    // The shell generation is untouched by runtime pressure
    assert!(
        store
            .lookup(&shell, &make_key(100))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_generations_keep_creation_order() {
    let store = MokaStore::builder().max_entries(10).build();
    for name in ["catolid-v1", "catolid-v2", "catolid-runtime-v2"] {
        store.open(&GenerationName::new(name)).await.unwrap();
    }

    let names: Vec<String> = store
        .generations()
        .await
        .unwrap()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(names, ["catolid-v1", "catolid-v2", "catolid-runtime-v2"]);
}

#[tokio::test]
async fn test_delete_generation() {
    let store = MokaStore::builder().label("test").max_entries(10).build();
    let old = GenerationName::new("catolid-v1");
    store.put(&old, &make_key(1), make_value(10)).await.unwrap();
    store.put(&old, &make_key(2), make_value(10)).await.unwrap();

    assert_eq!(store.entries(&old).await.unwrap().len(), 2);
    assert_eq!(
        store.delete_generation(&old).await.unwrap(),
        DeleteStatus::Deleted(2)
    );
    assert_eq!(
        store.delete_generation(&old).await.unwrap(),
        DeleteStatus::Missing
    );
    assert!(store.match_any(&make_key(1)).await.unwrap().is_none());
    assert!(store.generations().await.unwrap().is_empty());
    assert_eq!(store.label(), "test");
}

#[tokio::test]
async fn test_remove_single_entry() {
    let store = MokaStore::builder().max_entries(10).build();
    let runtime = GenerationName::new("catolid-runtime-v2");
    store.put(&runtime, &make_key(1), make_value(10)).await.unwrap();

    assert_eq!(
        store.remove(&runtime, &make_key(1)).await.unwrap(),
        DeleteStatus::Deleted(1)
    );
    assert_eq!(
        store.remove(&runtime, &make_key(1)).await.unwrap(),
        DeleteStatus::Missing
    );
}
