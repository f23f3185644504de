//! Worker configuration.
//!
//! [`WorkerConfig`] carries everything that varies between deployments of
//! the caching layer: the page origin, the cache generation names, the
//! static asset manifest and the routing knobs. It is serde-friendly so it
//! can be loaded from YAML (see `swcache-configuration`), and it has a
//! builder for programmatic use.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;
use swcache_core::{GenerationName, Origin};

/// How long a cross-origin entry served by stale-while-revalidate stays
/// fresh: 5 minutes.
pub const DEFAULT_FRESHNESS_WINDOW: Duration = Duration::from_millis(300_000);

const DEFAULT_CACHE_PREFIX: &str = "catolid";
const DEFAULT_VERSION: u32 = 2;
const DEFAULT_ENTRY_DOCUMENT: &str = "/index.html";
const DEFAULT_BACKEND_HOST: &str = "supabase.co";
const DEFAULT_STATIC_ASSETS: [&str; 5] = [
    "/manifest.json",
    "/icon.svg",
    "/icon-192.png",
    "/icon-512.png",
    "/index.html",
];

/// How requests for the site root and the entry document are answered.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, Default)]
#[serde(rename_all = "snake_case")]
pub enum NavigationPolicy {
    /// Always try the network; fall back to the cached entry document only
    /// when the network is unreachable.
    #[default]
    NetworkFirst,
    /// Serve the cached entry document when present and go to the network
    /// only when it is missing.
    ShellCacheFirst,
}

/// Configuration of a caching worker.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use swcache::config::{NavigationPolicy, WorkerConfig};
///
/// let config = WorkerConfig::builder("https://catolid.app".parse().unwrap())
///     .version(3)
///     .freshness_window(Duration::from_secs(60))
///     .navigation(NavigationPolicy::ShellCacheFirst)
///     .build();
///
/// assert_eq!(config.static_generation().as_str(), "catolid-v3");
/// assert_eq!(config.runtime_generation().as_str(), "catolid-runtime-v3");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Eq, PartialEq)]
pub struct WorkerConfig {
    /// Origin of the page that registers the worker.
    pub scope: Origin,
    /// Prefix of both generation names.
    #[serde(default = "default_cache_prefix")]
    pub cache_prefix: SmolStr,
    /// Application version embedded in the generation names.
    #[serde(default = "default_version")]
    pub version: u32,
    /// Paths fetched into the static generation at install.
    #[serde(default = "default_static_assets")]
    pub static_assets: Vec<SmolStr>,
    /// Path of the single-page application entry document.
    #[serde(default = "default_entry_document")]
    pub entry_document: SmolStr,
    /// Freshness window of cross-origin entries (e.g. "5m", "30s").
    #[serde(default = "default_freshness_window", with = "humantime_serde")]
    pub freshness_window: Duration,
    /// Host substrings identifying backend API origins.
    #[serde(default = "default_backend_hosts")]
    pub backend_hosts: Vec<SmolStr>,
    /// Policy for the site root and the entry document.
    #[serde(default)]
    pub navigation: NavigationPolicy,
    /// Whether a freshly installed worker activates without waiting for
    /// open clients to close.
    #[serde(default = "default_skip_waiting")]
    pub skip_waiting: bool,
}

fn default_cache_prefix() -> SmolStr {
    SmolStr::new_static(DEFAULT_CACHE_PREFIX)
}

fn default_version() -> u32 {
    DEFAULT_VERSION
}

fn default_static_assets() -> Vec<SmolStr> {
    DEFAULT_STATIC_ASSETS
        .into_iter()
        .map(SmolStr::new_static)
        .collect()
}

fn default_entry_document() -> SmolStr {
    SmolStr::new_static(DEFAULT_ENTRY_DOCUMENT)
}

fn default_freshness_window() -> Duration {
    DEFAULT_FRESHNESS_WINDOW
}

fn default_backend_hosts() -> Vec<SmolStr> {
    vec![SmolStr::new_static(DEFAULT_BACKEND_HOST)]
}

fn default_skip_waiting() -> bool {
    true
}

impl WorkerConfig {
    /// Creates the default configuration for the given page origin.
    pub fn new(scope: Origin) -> Self {
        Self {
            scope,
            cache_prefix: default_cache_prefix(),
            version: default_version(),
            static_assets: default_static_assets(),
            entry_document: default_entry_document(),
            freshness_window: default_freshness_window(),
            backend_hosts: default_backend_hosts(),
            navigation: NavigationPolicy::default(),
            skip_waiting: default_skip_waiting(),
        }
    }

    /// Creates a [`WorkerConfigBuilder`] starting from the defaults.
    pub fn builder(scope: Origin) -> WorkerConfigBuilder {
        WorkerConfigBuilder {
            config: Self::new(scope),
        }
    }

    /// Name of the static generation, `{prefix}-v{version}`.
    pub fn static_generation(&self) -> GenerationName {
        GenerationName::versioned(&self.cache_prefix, self.version)
    }

    /// Name of the runtime generation, `{prefix}-runtime-v{version}`.
    pub fn runtime_generation(&self) -> GenerationName {
        GenerationName::versioned(&format!("{}-runtime", self.cache_prefix), self.version)
    }

    /// The generations that survive activation.
    pub fn whitelist(&self) -> [GenerationName; 2] {
        [self.static_generation(), self.runtime_generation()]
    }
}

/// Builder for [`WorkerConfig`].
#[derive(Debug, Clone)]
pub struct WorkerConfigBuilder {
    config: WorkerConfig,
}

impl WorkerConfigBuilder {
    /// Sets the generation name prefix.
    pub fn cache_prefix(mut self, prefix: impl Into<SmolStr>) -> Self {
        self.config.cache_prefix = prefix.into();
        self
    }

    /// Sets the application version.
    pub fn version(mut self, version: u32) -> Self {
        self.config.version = version;
        self
    }

    /// Replaces the static asset manifest.
    pub fn static_assets<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SmolStr>,
    {
        self.config.static_assets = paths.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the entry document path.
    pub fn entry_document(mut self, path: impl Into<SmolStr>) -> Self {
        self.config.entry_document = path.into();
        self
    }

    /// Sets the freshness window of cross-origin entries.
    pub fn freshness_window(mut self, window: Duration) -> Self {
        self.config.freshness_window = window;
        self
    }

    /// Replaces the backend host patterns.
    pub fn backend_hosts<I, P>(mut self, hosts: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SmolStr>,
    {
        self.config.backend_hosts = hosts.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the navigation policy.
    pub fn navigation(mut self, policy: NavigationPolicy) -> Self {
        self.config.navigation = policy;
        self
    }

    /// Sets whether installed workers activate immediately.
    pub fn skip_waiting(mut self, skip_waiting: bool) -> Self {
        self.config.skip_waiting = skip_waiting;
        self
    }

    /// Builds the [`WorkerConfig`].
    pub fn build(self) -> WorkerConfig {
        self.config
    }
}
