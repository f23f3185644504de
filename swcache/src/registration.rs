//! Worker registration.
//!
//! A [`Registration`] is the single place the foreground application talks
//! to. It holds at most one active worker, which answers requests, and at
//! most one waiting worker, which is installed and waits for the active
//! one to be released.

use std::fmt;
use std::sync::Arc;

use swcache_core::{Fetch, FetchRequest};
use tokio::sync::RwLock;

use crate::error::WorkerError;
use crate::lifecycle::{Active, Installed, LifecycleState, Parsed, ServiceWorker};
use crate::strategy::Outcome;

#[derive(Default)]
struct Slots {
    active: Option<ServiceWorker<Active>>,
    waiting: Option<ServiceWorker<Installed>>,
}

/// Holds the active and waiting workers.
///
/// Cheap to clone; clones share the same slots. Slots are only locked to
/// swap worker handles, never across a network call.
///
/// # Example
///
/// ```no_run
/// # async fn run(network: &dyn swcache_core::Fetch) {
/// use std::sync::Arc;
/// use swcache::{Registration, ServiceWorker, WorkerConfig};
/// use swcache_store::MemoryStore;
///
/// let registration = Registration::new();
/// let config = WorkerConfig::new("https://catolid.app".parse().unwrap());
/// let worker = ServiceWorker::new(config, Arc::new(MemoryStore::new()));
///
/// // Registration failures only mean "no offline support".
/// registration.register_silently(worker, network).await;
/// # }
/// ```
#[derive(Clone, Default)]
pub struct Registration {
    slots: Arc<RwLock<Slots>>,
}

impl Registration {
    /// Creates an empty registration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs a new worker.
    ///
    /// The worker is activated at once when it asks to skip waiting or when
    /// no worker is active yet; otherwise it waits. Returns the state the
    /// worker ended up in. A failed install leaves the current workers
    /// untouched.
    pub async fn register(
        &self,
        worker: ServiceWorker<Parsed>,
        network: &dyn Fetch,
    ) -> Result<LifecycleState, WorkerError> {
        let installed = worker.install(network).await?;
        let activate_now =
            installed.skip_waiting_requested() || self.slots.read().await.active.is_none();

        if activate_now {
            self.promote(installed).await?;
            return Ok(LifecycleState::Active);
        }

        tracing::info!(worker = installed.id(), "installed worker is waiting");
        let mut slots = self.slots.write().await;
        if let Some(previous) = slots.waiting.replace(installed) {
            previous.mark_redundant();
        }
        Ok(LifecycleState::Installed)
    }

    /// Registers a worker and swallows any failure.
    ///
    /// The application keeps working without offline support when
    /// registration fails; the error is only logged at debug level.
    pub async fn register_silently(
        &self,
        worker: ServiceWorker<Parsed>,
        network: &dyn Fetch,
    ) -> Option<LifecycleState> {
        match self.register(worker, network).await {
            Ok(state) => Some(state),
            Err(error) => {
                tracing::debug!(%error, "worker registration failed");
                None
            }
        }
    }

    /// Activates the waiting worker, if any. Returns whether one was
    /// activated.
    pub async fn skip_waiting(&self) -> Result<bool, WorkerError> {
        let waiting = self.slots.write().await.waiting.take();
        match waiting {
            Some(worker) => {
                self.promote(worker).await?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Signals that every client controlled by the active worker is gone.
    ///
    /// The waiting worker, if any, takes over.
    pub async fn clients_closed(&self) -> Result<bool, WorkerError> {
        self.skip_waiting().await
    }

    /// The active worker.
    pub async fn controller(&self) -> Option<ServiceWorker<Active>> {
        self.slots.read().await.active.clone()
    }

    /// The waiting worker.
    pub async fn waiting(&self) -> Option<ServiceWorker<Installed>> {
        self.slots.read().await.waiting.clone()
    }

    /// Answers a request with the active worker.
    ///
    /// Returns `Ok(None)` when the request is not intercepted: no worker is
    /// active, or the router declined it.
    pub async fn handle_fetch(
        &self,
        request: &FetchRequest,
        network: &dyn Fetch,
    ) -> Result<Option<Outcome>, WorkerError> {
        match self.controller().await {
            Some(worker) => worker.handle_fetch(request, network).await,
            None => Ok(None),
        }
    }

    /// Deletes every cache generation through the active worker.
    pub async fn clear_caches(&self) -> Result<usize, WorkerError> {
        let worker = self.controller().await.ok_or(WorkerError::NoActiveWorker)?;
        Ok(worker.clear_caches().await)
    }

    async fn promote(&self, installed: ServiceWorker<Installed>) -> Result<(), WorkerError> {
        let active = installed.activate().await?;

        let mut slots = self.slots.write().await;
        if let Some(previous) = slots.active.replace(active.clone()) {
            previous.mark_redundant();
        }
        if let Some(waiting) = slots.waiting.take() {
            waiting.mark_redundant();
        }
        tracing::info!(worker = active.id(), "worker claimed clients");
        Ok(())
    }
}

impl fmt::Debug for Registration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registration").finish_non_exhaustive()
    }
}
