//! Request identity used as the cache key.
//!
//! A cache entry is addressed by the request method and the absolute URL,
//! the same identity a browser cache uses for `match` and `put`.
//!
//! ```
//! use http::Method;
//! use swcache_core::CacheKey;
//!
//! let key = CacheKey::new(Method::GET, "https://catolid.app/icon.svg");
//! assert_eq!(format!("{}", key), "GET https://catolid.app/icon.svg");
//! ```
//!
//! ## Performance
//!
//! [`CacheKey`] uses `Arc` internally for cheap cloning - copying a key
//! only increments a reference count.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::mem::size_of;
use std::sync::Arc;

use http::Method;
use smol_str::SmolStr;

/// Inner structure containing the actual cache key data.
/// Wrapped in Arc for cheap cloning.
#[derive(Debug, Eq, PartialEq, Hash)]
struct CacheKeyInner {
    method: Method,
    url: SmolStr,
}

/// A cache key identifying a cached entry: method plus absolute URL.
///
/// # Example
///
/// ```
/// use http::Method;
/// use swcache_core::CacheKey;
///
/// let key = CacheKey::get("https://catolid.app/manifest.json");
///
/// assert_eq!(key.method(), &Method::GET);
/// assert_eq!(key.url(), "https://catolid.app/manifest.json");
/// ```
#[derive(Clone, Debug)]
pub struct CacheKey {
    inner: Arc<CacheKeyInner>,
}

impl PartialEq for CacheKey {
    fn eq(&self, other: &Self) -> bool {
        // Fast path: same Arc pointer
        Arc::ptr_eq(&self.inner, &other.inner) || self.inner == other.inner
    }
}

impl Eq for CacheKey {}

impl Hash for CacheKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.hash(state);
    }
}

impl CacheKey {
    /// Creates a key from a method and an absolute URL.
    pub fn new(method: Method, url: impl Into<SmolStr>) -> Self {
        CacheKey {
            inner: Arc::new(CacheKeyInner {
                method,
                url: url.into(),
            }),
        }
    }

    /// Creates a `GET` key for the given URL.
    pub fn get(url: impl Into<SmolStr>) -> Self {
        Self::new(Method::GET, url)
    }

    /// Returns the request method.
    #[inline]
    pub fn method(&self) -> &Method {
        &self.inner.method
    }

    /// Returns the absolute request URL.
    #[inline]
    pub fn url(&self) -> &str {
        &self.inner.url
    }

    /// Returns the estimated memory usage of this key in bytes.
    ///
    /// SmolStr stores strings ≤23 bytes inline, so only longer URLs add
    /// heap content on top of the fixed struct size.
    pub fn memory_size(&self) -> usize {
        size_of::<Self>() + size_of::<CacheKeyInner>() + self.inner.url.len().saturating_sub(23)
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.inner.method, self.inner.url)
    }
}
