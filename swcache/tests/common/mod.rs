//! Test doubles: a scripted network and a store with injectable failures.
#![allow(dead_code)]

use std::io;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use http::header::DATE;
use http::{HeaderValue, Response, StatusCode};
use swcache::{
    CacheKey, CacheMode, CachedResponse, Fetch, FetchError, FetchRequest, FetchResult,
    GenerationName, WorkerConfig,
};
use swcache_store::{CacheStore, DeleteStatus, MemoryStore, StoreError, StoreResult};

pub const ORIGIN: &str = "https://catolid.app";

pub fn config() -> WorkerConfig {
    WorkerConfig::new(ORIGIN.parse().unwrap())
}

pub fn url(path: &str) -> String {
    format!("{ORIGIN}{path}")
}

pub fn key(url: &str) -> CacheKey {
    CacheKey::get(url)
}

pub fn get(uri: &str) -> FetchRequest {
    FetchRequest::get(uri.parse().unwrap())
}

pub fn cached(body: &'static str) -> CachedResponse {
    CachedResponse::new(
        StatusCode::OK,
        Default::default(),
        Bytes::from_static(body.as_bytes()),
    )
}

#[derive(Clone)]
enum Reply {
    Respond {
        status: StatusCode,
        body: Bytes,
        date: Option<DateTime<Utc>>,
    },
    Fail,
}

/// A network answering from a script.
///
/// Unknown URLs answer 404. While offline every request fails with a
/// transport error.
#[derive(Default)]
pub struct ScriptedNetwork {
    replies: DashMap<String, Reply>,
    calls: DashMap<String, Vec<CacheMode>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every static asset of the default manifest with 200.
    pub fn serving_manifest(config: &WorkerConfig) -> Self {
        let network = Self::new();
        for path in &config.static_assets {
            network.respond(&url(path), StatusCode::OK, format!("asset {path}"));
        }
        network
    }

    pub fn respond(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) -> &Self {
        self.replies.insert(
            url.to_owned(),
            Reply::Respond {
                status,
                body: body.into(),
                date: None,
            },
        );
        self
    }

    pub fn respond_dated(
        &self,
        url: &str,
        body: impl Into<Bytes>,
        date: DateTime<Utc>,
    ) -> &Self {
        self.replies.insert(
            url.to_owned(),
            Reply::Respond {
                status: StatusCode::OK,
                body: body.into(),
                date: Some(date),
            },
        );
        self
    }

    pub fn fail(&self, url: &str) -> &Self {
        self.replies.insert(url.to_owned(), Reply::Fail);
        self
    }

    pub fn go_offline(&self) {
        self.offline.store(true, Ordering::SeqCst);
    }

    pub fn go_online(&self) {
        self.offline.store(false, Ordering::SeqCst);
    }

    /// Number of requests that reached the network for `url`.
    pub fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map(|modes| modes.len()).unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.iter().map(|entry| entry.value().len()).sum()
    }

    pub fn cache_modes(&self, url: &str) -> Vec<CacheMode> {
        self.calls
            .get(url)
            .map(|modes| modes.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Fetch for ScriptedNetwork {
    async fn fetch(&self, request: FetchRequest) -> FetchResult {
        let url = request.uri().to_string();
        self.calls
            .entry(url.clone())
            .or_default()
            .push(request.cache_mode());

        if self.offline.load(Ordering::SeqCst) {
            return Err(FetchError::transport(
                url,
                io::Error::new(io::ErrorKind::NotConnected, "offline"),
            ));
        }

        let reply = self.replies.get(&url).map(|reply| reply.clone());
        match reply {
            Some(Reply::Respond { status, body, date }) => {
                let mut response = Response::new(body);
                *response.status_mut() = status;
                if let Some(date) = date {
                    let value = date.format("%a, %d %b %Y %H:%M:%S GMT").to_string();
                    response
                        .headers_mut()
                        .insert(DATE, HeaderValue::from_str(&value).unwrap());
                }
                Ok(response)
            }
            Some(Reply::Fail) => Err(FetchError::transport(
                url,
                io::Error::new(io::ErrorKind::ConnectionRefused, "connection refused"),
            )),
            None => {
                let mut response = Response::new(Bytes::from_static(b"not found"));
                *response.status_mut() = StatusCode::NOT_FOUND;
                Ok(response)
            }
        }
    }
}

/// A [`MemoryStore`] whose reads or writes can be made to fail.
#[derive(Clone, Default)]
pub struct FlakyStore {
    inner: MemoryStore,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    puts_before_failure: Arc<AtomicUsize>,
    limit_puts: Arc<AtomicBool>,
}

impl FlakyStore {
    pub fn new(inner: MemoryStore) -> Self {
        Self {
            inner,
            ..Default::default()
        }
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Lets `count` more puts succeed, then fails every following put.
    pub fn fail_puts_after(&self, count: usize) {
        self.puts_before_failure.store(count, Ordering::SeqCst);
        self.limit_puts.store(true, Ordering::SeqCst);
    }

    fn check_put(&self) -> StoreResult<()> {
        if !self.limit_puts.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.puts_before_failure
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .map(|_| ())
            .map_err(|_| StoreError::internal("quota exceeded"))
    }

    fn check(&self, flag: &AtomicBool) -> StoreResult<()> {
        if flag.load(Ordering::SeqCst) {
            Err(StoreError::internal("quota exceeded"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl CacheStore for FlakyStore {
    async fn open(&self, generation: &GenerationName) -> StoreResult<()> {
        self.check(&self.fail_writes)?;
        self.inner.open(generation).await
    }

    async fn put(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
        response: CachedResponse,
    ) -> StoreResult<()> {
        self.check(&self.fail_writes)?;
        self.check_put()?;
        self.inner.put(generation, key, response).await
    }

    async fn lookup(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<Option<CachedResponse>> {
        self.check(&self.fail_reads)?;
        self.inner.lookup(generation, key).await
    }

    async fn generations(&self) -> StoreResult<Vec<GenerationName>> {
        self.check(&self.fail_reads)?;
        self.inner.generations().await
    }

    async fn delete_generation(&self, generation: &GenerationName) -> StoreResult<DeleteStatus> {
        self.check(&self.fail_writes)?;
        self.inner.delete_generation(generation).await
    }

    async fn entries(&self, generation: &GenerationName) -> StoreResult<Vec<CacheKey>> {
        self.check(&self.fail_reads)?;
        self.inner.entries(generation).await
    }

    async fn remove(
        &self,
        generation: &GenerationName,
        key: &CacheKey,
    ) -> StoreResult<DeleteStatus> {
        self.check(&self.fail_writes)?;
        self.inner.remove(generation, key).await
    }

    fn label(&self) -> &str {
        "flaky"
    }
}
