//! A network that answers from a script.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use http::{Response, StatusCode};
use swcache_core::{CacheMode, Fetch, FetchError, FetchRequest, FetchResult};

#[derive(Debug, Clone)]
enum Reply {
    Respond { status: StatusCode, body: Bytes },
    Fail,
}

/// Scripted network.
///
/// URLs without a scripted reply answer 404. While offline every request
/// fails with a transport error. Every request is recorded, offline ones
/// included.
#[derive(Debug, Default)]
pub struct ScriptedNetwork {
    replies: DashMap<String, Reply>,
    calls: DashMap<String, Vec<CacheMode>>,
    offline: AtomicBool,
}

impl ScriptedNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(&self, url: &str, status: StatusCode, body: impl Into<Bytes>) {
        self.replies.insert(
            url.to_owned(),
            Reply::Respond {
                status,
                body: body.into(),
            },
        );
    }

    pub fn fail(&self, url: &str) {
        self.replies.insert(url.to_owned(), Reply::Fail);
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn calls(&self, url: &str) -> usize {
        self.calls.get(url).map(|modes| modes.len()).unwrap_or(0)
    }

    pub fn cache_modes(&self, url: &str) -> Vec<CacheMode> {
        self.calls
            .get(url)
            .map(|modes| modes.clone())
            .unwrap_or_default()
    }

    pub fn reset_calls(&self) {
        self.calls.clear();
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
            Some(Reply::Respond { status, body }) => {
                let mut response = Response::new(body);
                *response.status_mut() = status;
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
