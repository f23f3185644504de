use std::time::Duration;

use pretty_assertions::assert_eq;
use swcache::{NavigationPolicy, WorkerConfig};
use swcache_configuration::{ConfigError, Moka, Settings, Store};

#[test]
fn minimal_document_uses_defaults() {
    let yaml = r#"
worker:
  scope: https://catolid.app
"#;

    let settings = Settings::from_yaml(yaml).expect("failed to parse");

    assert_eq!(
        settings.worker,
        WorkerConfig::new("https://catolid.app".parse().unwrap())
    );
    assert_eq!(settings.store, Store::Memory);
}

#[test]
fn full_document() {
    let yaml = r#"
worker:
  scope: http://localhost:5173
  cache_prefix: gatos
  version: 7
  static_assets:
    - /manifest.json
    - /index.html
  entry_document: /index.html
  freshness_window: 30s
  backend_hosts:
    - supabase.co
    - api.catolid.app
  navigation: shell_cache_first
  skip_waiting: false
store:
  type: Moka
  max_bytes: 50MB
  label: shell
  time_to_live: 7d
"#;

    let settings = Settings::from_yaml(yaml).expect("failed to parse");
    let worker = &settings.worker;

    assert_eq!(worker.static_generation().as_str(), "gatos-v7");
    assert_eq!(worker.runtime_generation().as_str(), "gatos-runtime-v7");
    assert_eq!(worker.static_assets.len(), 2);
    assert_eq!(worker.freshness_window, Duration::from_secs(30));
    assert_eq!(worker.backend_hosts.len(), 2);
    assert_eq!(worker.navigation, NavigationPolicy::ShellCacheFirst);
    assert!(!worker.skip_waiting);

    match &settings.store {
        Store::Moka(moka) => {
            assert_eq!(moka.max_bytes.map(|size| size.as_u64()), Some(50_000_000));
            assert_eq!(moka.max_entries, None);
            assert_eq!(moka.label.as_deref(), Some("shell"));
            assert_eq!(moka.time_to_live, Some(Duration::from_secs(7 * 24 * 3600)));
        }
        other => panic!("expected Moka store, got {other:?}"),
    }
}

#[test]
fn json_documents_are_accepted() {
    let json = r#"{"worker": {"scope": "https://catolid.app", "version": 4}}"#;

    let settings = Settings::from_json(json).expect("failed to parse");
    assert_eq!(settings.worker.version, 4);
}

#[test]
fn relative_asset_paths_are_rejected() {
    let yaml = r#"
worker:
  scope: https://catolid.app
  static_assets:
    - icon.svg
"#;

    let error = Settings::from_yaml(yaml).unwrap_err();
    assert!(matches!(
        error,
        ConfigError::InvalidPath { field: "static_assets", ref path } if path == "icon.svg"
    ));
}

#[test]
fn scope_must_be_an_origin() {
    let yaml = r#"
worker:
  scope: /index.html
"#;

    assert!(matches!(
        Settings::from_yaml(yaml),
        Err(ConfigError::Yaml(_))
    ));
}

#[cfg(feature = "moka")]
#[test]
fn moka_store_needs_one_capacity() {
    let store = Store::Moka(Moka {
        max_entries: Some(100),
        max_bytes: Some(bytesize::ByteSize::mb(1)),
        ..Default::default()
    });

    assert!(matches!(
        store.into_store(),
        Err(ConfigError::InvalidCapacity { .. })
    ));
}

#[cfg(not(feature = "moka"))]
#[test]
fn moka_store_needs_its_feature() {
    let store = Store::Moka(Moka {
        max_entries: Some(100),
        ..Default::default()
    });

    assert!(matches!(
        store.into_store(),
        Err(ConfigError::StoreNotAvailable(_))
    ));
}

#[test]
fn settings_build_an_installable_worker() {
    let yaml = r#"
worker:
  scope: https://catolid.app
  version: 9
"#;

    let worker = Settings::from_yaml(yaml).unwrap().into_worker().unwrap();

    assert_eq!(worker.static_generation().as_str(), "catolid-v9");
    assert_eq!(worker.state(), swcache::LifecycleState::Parsed);
}

#[test]
fn round_trips_through_yaml() {
    let settings = Settings {
        worker: WorkerConfig::new("https://catolid.app".parse().unwrap()),
        store: Store::Memory,
    };

    let yaml = serde_saphyr::to_string(&settings).expect("failed to serialize");
    assert_eq!(Settings::from_yaml(&yaml).unwrap(), settings);
}
