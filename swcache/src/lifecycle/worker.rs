use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Instant;

use bytes::Bytes;
use futures::future::{join_all, try_join_all};
use http::{Response, Uri};
use swcache_core::{
    CacheKey, CacheMode, CachedResponse, Fetch, FetchError, FetchRequest, GenerationName,
};
use swcache_store::CacheStore;
use tracing::Instrument;

use super::state::states::{Active, Installed, Parsed, WorkerState};
use super::state::{LifecycleState, SharedState};
use crate::config::WorkerConfig;
use crate::error::WorkerError;
use crate::metrics;
use crate::router::Router;
use crate::strategy::{Outcome, StrategyContext};

static NEXT_WORKER_ID: AtomicU64 = AtomicU64::new(1);

struct WorkerShared {
    id: u64,
    config: WorkerConfig,
    router: Router,
    store: Arc<dyn CacheStore>,
    static_generation: GenerationName,
    runtime_generation: GenerationName,
    state: SharedState,
}

/// One version of the caching layer.
///
/// The lifecycle is encoded in the type: a worker is created
/// [`Parsed`], becomes [`Installed`] once its static assets are cached, and
/// [`Active`] once stale generations are evicted. Only an active worker can
/// answer requests, so serving before install does not compile.
///
/// Handles are cheap to clone and share the same runtime
/// [`LifecycleState`].
///
/// # Example
///
/// ```no_run
/// # async fn run(network: &dyn swcache_core::Fetch) -> Result<(), swcache::WorkerError> {
/// use std::sync::Arc;
/// use swcache::{ServiceWorker, WorkerConfig};
/// use swcache_store::MemoryStore;
///
/// let config = WorkerConfig::new("https://catolid.app".parse().unwrap());
/// let worker = ServiceWorker::new(config, Arc::new(MemoryStore::new()))
///     .install(network)
///     .await?
///     .activate()
///     .await?;
/// # let _ = worker;
/// # Ok(())
/// # }
/// ```
pub struct ServiceWorker<S: WorkerState> {
    shared: Arc<WorkerShared>,
    _state: PhantomData<S>,
}

impl<S: WorkerState> Clone for ServiceWorker<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            _state: PhantomData,
        }
    }
}

impl<S: WorkerState> fmt::Debug for ServiceWorker<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceWorker")
            .field("id", &self.shared.id)
            .field("state", &self.shared.state.get())
            .field("static_generation", &self.shared.static_generation)
            .field("runtime_generation", &self.shared.runtime_generation)
            .finish()
    }
}

impl<S: WorkerState> ServiceWorker<S> {
    /// Process-unique identifier of this worker.
    pub fn id(&self) -> u64 {
        self.shared.id
    }

    /// Current runtime lifecycle state.
    pub fn state(&self) -> LifecycleState {
        self.shared.state.get()
    }

    /// The configuration this worker was created with.
    pub fn config(&self) -> &WorkerConfig {
        &self.shared.config
    }

    /// The routing table.
    pub fn router(&self) -> &Router {
        &self.shared.router
    }

    /// The cache store.
    pub fn store(&self) -> &Arc<dyn CacheStore> {
        &self.shared.store
    }

    /// Name of the static generation.
    pub fn static_generation(&self) -> &GenerationName {
        &self.shared.static_generation
    }

    /// Name of the runtime generation.
    pub fn runtime_generation(&self) -> &GenerationName {
        &self.shared.runtime_generation
    }

    /// Whether both handles refer to the same worker.
    pub fn same_worker<T: WorkerState>(&self, other: &ServiceWorker<T>) -> bool {
        Arc::ptr_eq(&self.shared, &other.shared)
    }

    pub(crate) fn mark_redundant(&self) {
        tracing::info!(worker = self.shared.id, "worker is redundant");
        self.shared.state.set(LifecycleState::Redundant);
    }

    fn transition<T: WorkerState>(self, state: LifecycleState) -> ServiceWorker<T> {
        self.shared.state.set(state);
        ServiceWorker {
            shared: self.shared,
            _state: PhantomData,
        }
    }
}

impl ServiceWorker<Parsed> {
    /// Creates a worker with the standard routing table.
    pub fn new(config: WorkerConfig, store: Arc<dyn CacheStore>) -> Self {
        let router = Router::from_config(&config);
        Self::with_router(config, store, router)
    }

    /// Creates a worker with a custom routing table.
    pub fn with_router(config: WorkerConfig, store: Arc<dyn CacheStore>, router: Router) -> Self {
        let shared = WorkerShared {
            id: NEXT_WORKER_ID.fetch_add(1, Ordering::Relaxed),
            static_generation: config.static_generation(),
            runtime_generation: config.runtime_generation(),
            config,
            router,
            store,
            state: SharedState::new(),
        };
        Self {
            shared: Arc::new(shared),
            _state: PhantomData,
        }
    }

    /// Caches every static asset of the manifest into the static generation.
    ///
    /// All assets are fetched concurrently, bypassing HTTP caches, and each
    /// must answer 2xx. Entries are written only after every fetch
    /// succeeded, so a failed install leaves no partial generation behind.
    /// On failure the worker becomes redundant.
    ///
    /// Installing twice with the same manifest yields the same generation.
    pub async fn install(
        self,
        network: &dyn Fetch,
    ) -> Result<ServiceWorker<Installed>, WorkerError> {
        let span = tracing::info_span!(
            "install",
            worker = self.shared.id,
            generation = %self.shared.static_generation
        );
        self.shared.state.set(LifecycleState::Installing);
        match self.precache(network).instrument(span.clone()).await {
            Ok(count) => {
                span.in_scope(|| tracing::info!(assets = count, "installed"));
                Ok(self.transition(LifecycleState::Installed))
            }
            Err(error) => {
                span.in_scope(|| tracing::warn!(%error, "install failed"));
                self.shared.state.set(LifecycleState::Redundant);
                Err(error)
            }
        }
    }

    async fn precache(&self, network: &dyn Fetch) -> Result<usize, WorkerError> {
        let shared = &self.shared;
        let fetches = shared
            .config
            .static_assets
            .iter()
            .map(|path| fetch_asset(network, &shared.config, path));
        let assets = try_join_all(fetches).await?;

        shared.store.open(&shared.static_generation).await?;

        for (key, response) in &assets {
            let stored = shared
                .store
                .put(
                    &shared.static_generation,
                    key,
                    CachedResponse::from_http(response),
                )
                .await;
            if let Err(error) = stored {
                // a half-written static generation must never be served
                if let Err(cleanup) = shared
                    .store
                    .delete_generation(&shared.static_generation)
                    .await
                {
                    tracing::warn!(error = %cleanup, "failed to drop partial generation");
                }
                return Err(error.into());
            }
        }
        Ok(assets.len())
    }
}

async fn fetch_asset(
    network: &dyn Fetch,
    config: &WorkerConfig,
    path: &smol_str::SmolStr,
) -> Result<(CacheKey, Response<Bytes>), WorkerError> {
    let uri = Uri::try_from(path.as_str()).map_err(|error| WorkerError::Install {
        path: path.clone(),
        source: FetchError::InvalidRequest(error.to_string()),
    })?;
    let request = FetchRequest::get(uri)
        .resolve(&config.scope)
        .with_cache_mode(CacheMode::Reload);
    let key = request.key();

    let response = network
        .fetch(request)
        .await
        .map_err(|source| WorkerError::Install {
            path: path.clone(),
            source,
        })?;
    if !response.status().is_success() {
        return Err(WorkerError::InstallStatus {
            path: path.clone(),
            status: response.status(),
        });
    }
    tracing::debug!(%key, "fetched static asset");
    Ok((key, response))
}

impl ServiceWorker<Installed> {
    /// Whether this worker asks to activate without waiting for open
    /// clients to close.
    pub fn skip_waiting_requested(&self) -> bool {
        self.shared.config.skip_waiting
    }

    /// Deletes every generation except the current static and runtime ones,
    /// then starts answering requests.
    ///
    /// Individual deletions run in parallel; a failed deletion is logged and
    /// does not stop activation. Failing to list generations makes the
    /// worker redundant.
    pub async fn activate(self) -> Result<ServiceWorker<Active>, WorkerError> {
        let span = tracing::info_span!("activate", worker = self.shared.id);
        self.shared.state.set(LifecycleState::Activating);
        match self.evict_stale_generations().instrument(span.clone()).await {
            Ok(deleted) => {
                span.in_scope(|| tracing::info!(deleted, "activated"));
                Ok(self.transition(LifecycleState::Active))
            }
            Err(error) => {
                span.in_scope(|| tracing::warn!(%error, "activation failed"));
                self.shared.state.set(LifecycleState::Redundant);
                Err(error)
            }
        }
    }

    async fn evict_stale_generations(&self) -> Result<usize, WorkerError> {
        let shared = &self.shared;
        let whitelist = shared.config.whitelist();
        let stale: Vec<GenerationName> = shared
            .store
            .generations()
            .await?
            .into_iter()
            .filter(|generation| !whitelist.contains(generation))
            .collect();
        Ok(delete_generations(shared.store.as_ref(), &stale).await)
    }
}

impl ServiceWorker<Active> {
    /// Answers an intercepted request.
    ///
    /// Returns `Ok(None)` when the router declines the request: it must be
    /// sent to the network untouched. Relative requests are resolved
    /// against the page origin first.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
        network: &dyn Fetch,
    ) -> Result<Option<Outcome>, WorkerError> {
        let start = Instant::now();
        let request = request.clone().resolve(&self.shared.config.scope);
        let Some(strategy) = self.shared.router.route(&request) else {
            metrics::record_declined();
            return Ok(None);
        };

        let shared = &self.shared;
        let ctx = StrategyContext {
            store: shared.store.as_ref(),
            network,
            config: &shared.config,
            static_generation: &shared.static_generation,
            runtime_generation: &shared.runtime_generation,
        };
        let span = tracing::debug_span!("fetch", %strategy, url = %request.uri());
        match strategy
            .executor()
            .execute(&ctx, request)
            .instrument(span.clone())
            .await
        {
            Ok(outcome) => {
                span.in_scope(|| {
                    tracing::debug!(
                        status = outcome.status.as_str(),
                        source = outcome.source.as_str(),
                        http_status = %outcome.response.status(),
                        "answered"
                    )
                });
                metrics::record_outcome(&outcome, start.elapsed());
                Ok(Some(outcome))
            }
            Err(error) => {
                span.in_scope(|| tracing::debug!(%error, "no response available"));
                metrics::record_failed(strategy.as_str());
                Err(error)
            }
        }
    }

    /// Deletes every generation, current ones included.
    ///
    /// Failures are logged and skipped. Returns the number of generations
    /// deleted.
    pub async fn clear_caches(&self) -> usize {
        let store = self.shared.store.as_ref();
        let generations = match store.generations().await {
            Ok(generations) => generations,
            Err(error) => {
                tracing::warn!(%error, "cannot list cache generations");
                return 0;
            }
        };
        let deleted = delete_generations(store, &generations).await;
        tracing::info!(deleted, "cleared all cache generations");
        deleted
    }
}

async fn delete_generations(store: &dyn CacheStore, generations: &[GenerationName]) -> usize {
    let results = join_all(
        generations
            .iter()
            .map(|generation| store.delete_generation(generation)),
    )
    .await;

    let mut deleted = 0;
    for (generation, result) in generations.iter().zip(results) {
        match result {
            Ok(status) if status.is_deleted() => {
                tracing::debug!(%generation, "deleted generation");
                deleted += 1;
            }
            Ok(_) => {}
            Err(error) => tracing::warn!(%generation, %error, "failed to delete generation"),
        }
    }
    metrics::record_generations_deleted(deleted);
    deleted
}
