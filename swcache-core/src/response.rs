//! Stored response snapshots.
//!
//! A [`CachedResponse`] is what a cache generation keeps for a request: the
//! status line, headers and the full body, plus the instant it was stored.
//!
//! ## Freshness timestamp
//!
//! Freshness checks use the response `Date` header, the time the origin
//! server produced the response. When the header is missing or cannot be
//! parsed, the time the snapshot was stored is used instead.

use std::mem::size_of;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use http::header::DATE;
use http::{HeaderMap, Response, StatusCode};

/// A response snapshot stored in a cache generation.
///
/// # Example
///
/// ```
/// use bytes::Bytes;
/// use http::{HeaderMap, StatusCode};
/// use swcache_core::CachedResponse;
///
/// let response = CachedResponse::new(StatusCode::OK, HeaderMap::new(), Bytes::from("{}"));
/// assert!(response.is_success());
/// assert_eq!(response.body(), &Bytes::from("{}"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    status: StatusCode,
    headers: HeaderMap,
    body: Bytes,
    stored_at: DateTime<Utc>,
}

impl CachedResponse {
    /// Creates a snapshot stamped with the current time.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Bytes) -> Self {
        Self {
            status,
            headers,
            body,
            stored_at: Utc::now(),
        }
    }

    /// Snapshots an HTTP response. The body is shared, not copied.
    pub fn from_http(response: &Response<Bytes>) -> Self {
        Self::new(
            response.status(),
            response.headers().clone(),
            response.body().clone(),
        )
    }

    /// Overrides the stored-at timestamp.
    pub fn with_stored_at(mut self, stored_at: DateTime<Utc>) -> Self {
        self.stored_at = stored_at;
        self
    }

    /// Returns the status code.
    #[inline]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the headers.
    #[inline]
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the body.
    #[inline]
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Returns when the snapshot was stored.
    #[inline]
    pub fn stored_at(&self) -> DateTime<Utc> {
        self.stored_at
    }

    /// Whether the status is in the 2xx range.
    ///
    /// Only successful responses are ever written to a generation.
    #[inline]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Parses the `Date` header.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        let value = self.headers.get(DATE)?.to_str().ok()?;
        DateTime::parse_from_rfc2822(value)
            .ok()
            .map(|date| date.with_timezone(&Utc))
    }

    /// The instant freshness is measured from: the `Date` header, or the
    /// stored-at time when the header is unusable.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.date().unwrap_or(self.stored_at)
    }

    /// Whether the snapshot is younger than `window` at `now`.
    pub fn is_fresh_at(&self, window: std::time::Duration, now: DateTime<Utc>) -> bool {
        let Ok(window) = chrono::Duration::from_std(window) else {
            return true;
        };
        now.signed_duration_since(self.timestamp()) < window
    }

    /// Rebuilds an HTTP response sharing the stored body.
    pub fn to_http(&self) -> Response<Bytes> {
        let mut response = Response::new(self.body.clone());
        *response.status_mut() = self.status;
        *response.headers_mut() = self.headers.clone();
        response
    }

    /// Returns the estimated memory usage of this snapshot in bytes.
    pub fn memory_size(&self) -> usize {
        let headers: usize = self
            .headers
            .iter()
            .map(|(name, value)| name.as_str().len() + value.len())
            .sum();
        size_of::<Self>() + headers + self.body.len()
    }
}

impl From<CachedResponse> for Response<Bytes> {
    fn from(cached: CachedResponse) -> Self {
        let mut response = Response::new(cached.body);
        *response.status_mut() = cached.status;
        *response.headers_mut() = cached.headers;
        response
    }
}
