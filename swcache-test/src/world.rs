use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Error, anyhow};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use cucumber::World;
use http::header::DATE;
use http::{HeaderMap, HeaderValue, StatusCode};
use swcache::{
    CACHE_STATUS_HEADER, ControlOutcome, LifecycleState, Registration, ServiceWorker,
    WorkerConfig,
};
use swcache_core::{CacheKey, CachedResponse, FetchRequest, GenerationName};
use swcache_store::{CacheStore, MemoryStore};

use crate::network::ScriptedNetwork;

/// Origin of the page every scenario runs on.
pub const ORIGIN: &str = "https://catolid.app";

static WORLD_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// What the page got back for its last request.
#[derive(Debug, Clone)]
pub enum Answer {
    /// The worker declined: the request went to the network untouched.
    NotIntercepted,
    /// The worker answered.
    Response {
        status: StatusCode,
        body: Bytes,
        cache_status: Option<String>,
        source: String,
    },
    /// The worker had no response to give.
    Failed(String),
}

#[derive(World)]
#[world(init = Self::new)]
pub struct SwWorld {
    pub id: u64,
    pub config: WorkerConfig,
    pub store: Arc<dyn CacheStore>,
    pub network: Arc<ScriptedNetwork>,
    pub registration: Registration,
    pub registered: Option<Result<LifecycleState, String>>,
    pub answer: Option<Answer>,
    pub control: Option<ControlOutcome>,
}

impl SwWorld {
    pub fn new() -> Self {
        Self {
            id: WORLD_ID_COUNTER.fetch_add(1, Ordering::SeqCst),
            config: WorkerConfig::new(ORIGIN.parse().expect("valid origin")),
            store: Arc::new(MemoryStore::new()),
            network: Arc::new(ScriptedNetwork::new()),
            registration: Registration::new(),
            registered: None,
            answer: None,
            control: None,
        }
    }

    /// Absolute URL of `target`; paths are resolved against [`ORIGIN`].
    pub fn url(target: &str) -> String {
        if target.starts_with('/') {
            format!("{ORIGIN}{target}")
        } else {
            target.to_owned()
        }
    }

    /// Scripts a 200 answer for every static asset of the current config.
    pub fn serve_static_assets(&self) {
        for path in &self.config.static_assets {
            self.network
                .respond(&Self::url(path), StatusCode::OK, format!("asset {path}"));
        }
    }

    /// Builds a worker of `version` from the current config and registers
    /// it.
    pub async fn register(&mut self, version: u32) {
        let mut config = self.config.clone();
        config.version = version;
        let worker = ServiceWorker::new(config, Arc::clone(&self.store));
        let result = self
            .registration
            .register(worker, self.network.as_ref())
            .await
            .map_err(|error| error.to_string());
        self.registered = Some(result);
    }

    pub async fn request(&mut self, target: &str) -> Result<(), Error> {
        let uri = Self::url(target)
            .parse()
            .with_context(|| format!("invalid request target {target}"))?;
        let request = FetchRequest::get(uri);
        let answer = match self
            .registration
            .handle_fetch(&request, self.network.as_ref())
            .await
        {
            Ok(None) => Answer::NotIntercepted,
            Ok(Some(outcome)) => {
                let source = outcome.source.as_str().to_owned();
                let response = outcome.into_response();
                Answer::Response {
                    status: response.status(),
                    cache_status: response
                        .headers()
                        .get(CACHE_STATUS_HEADER)
                        .and_then(|value| value.to_str().ok())
                        .map(str::to_owned),
                    body: response.into_body(),
                    source,
                }
            }
            Err(error) => Answer::Failed(error.to_string()),
        };
        self.answer = Some(answer);
        Ok(())
    }

    /// Puts an entry straight into a generation, bypassing the worker.
    pub async fn seed(
        &self,
        generation: &str,
        target: &str,
        body: &str,
        date: Option<DateTime<Utc>>,
    ) -> Result<(), Error> {
        let mut headers = HeaderMap::new();
        if let Some(date) = date {
            let value = date.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
            headers.insert(DATE, HeaderValue::from_str(&value)?);
        }
        let entry = CachedResponse::new(StatusCode::OK, headers, Bytes::from(body.to_owned()));
        let generation = GenerationName::new(generation);
        self.store.open(&generation).await?;
        self.store
            .put(&generation, &CacheKey::get(Self::url(target)), entry)
            .await?;
        Ok(())
    }

    pub async fn lookup(
        &self,
        generation: &str,
        target: &str,
    ) -> Result<Option<CachedResponse>, Error> {
        let entry = self
            .store
            .lookup(
                &GenerationName::new(generation),
                &CacheKey::get(Self::url(target)),
            )
            .await?;
        Ok(entry)
    }

    pub async fn generations(&self) -> Result<Vec<String>, Error> {
        let mut names: Vec<String> = self
            .store
            .generations()
            .await?
            .into_iter()
            .map(|generation| generation.as_str().to_owned())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn answer(&self) -> Result<&Answer, Error> {
        self.answer
            .as_ref()
            .ok_or_else(|| anyhow!("no request was made in this scenario"))
    }

    pub fn response(&self) -> Result<(StatusCode, &Bytes, Option<&str>, &str), Error> {
        match self.answer()? {
            Answer::Response {
                status,
                body,
                cache_status,
                source,
            } => Ok((*status, body, cache_status.as_deref(), source.as_str())),
            other => Err(anyhow!("expected a response, got {other:?}")),
        }
    }
}

impl Default for SwWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for SwWorld {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SwWorld")
            .field("id", &self.id)
            .field("version", &self.config.version)
            .field("registered", &self.registered)
            .field("answer", &self.answer)
            .field("control", &self.control)
            .finish_non_exhaustive()
    }
}
