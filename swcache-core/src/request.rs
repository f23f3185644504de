//! Intercepted requests.

use http::header::{CACHE_CONTROL, PRAGMA};
use http::uri::{Parts, PathAndQuery};
use http::{HeaderMap, HeaderValue, Method, Request, Uri};

use crate::key::CacheKey;
use crate::origin::{Origin, is_http_scheme};

/// How a fetch should treat intermediate HTTP caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Let HTTP caches answer as they normally would.
    #[default]
    Default,
    /// Bypass HTTP caches and go to the origin server.
    ///
    /// Used when installing static assets so a new version never picks up
    /// a stale copy from an intermediate cache.
    Reload,
}

/// A request observed by the interception layer.
///
/// Only the request head is kept: the layer intercepts reads, which carry no
/// body.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    cache_mode: CacheMode,
}

impl FetchRequest {
    /// Creates a request with the given method and URI.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            headers: HeaderMap::new(),
            cache_mode: CacheMode::Default,
        }
    }

    /// Creates a `GET` request.
    pub fn get(uri: Uri) -> Self {
        Self::new(Method::GET, uri)
    }

    /// Copies the head of an `http::Request`.
    pub fn from_http<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
            cache_mode: CacheMode::Default,
        }
    }

    /// Sets the cache mode.
    pub fn with_cache_mode(mut self, cache_mode: CacheMode) -> Self {
        self.cache_mode = cache_mode;
        self
    }

    /// Returns the method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the URI.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Returns the headers.
    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the headers for modification.
    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    /// Returns the cache mode.
    pub fn cache_mode(&self) -> CacheMode {
        self.cache_mode
    }

    /// Returns the origin of the request URI, if it is absolute.
    pub fn origin(&self) -> Option<Origin> {
        Origin::from_uri(&self.uri)
    }

    /// Whether the request URI uses `http` or `https`.
    ///
    /// Relative URIs are resolved against an http origin by the caller, so
    /// they count as http.
    pub fn is_http(&self) -> bool {
        self.uri.scheme().is_none_or(is_http_scheme)
    }

    /// Returns the request path, `/` when empty.
    pub fn path(&self) -> &str {
        match self.uri.path() {
            "" => "/",
            path => path,
        }
    }

    /// Returns the cache key of this request.
    ///
    /// Absolute URIs are keyed by their normalized origin, so
    /// `https://CATOLID.app:443/icon.svg` and `https://catolid.app/icon.svg`
    /// address the same entry.
    pub fn key(&self) -> CacheKey {
        match self.origin() {
            Some(origin) => {
                let path_and_query = self.uri.path_and_query().map_or("/", PathAndQuery::as_str);
                CacheKey::new(self.method.clone(), format!("{origin}{path_and_query}"))
            }
            None => CacheKey::new(self.method.clone(), self.uri.to_string()),
        }
    }

    /// Makes a relative URI absolute against `origin`.
    ///
    /// Absolute URIs are left untouched.
    pub fn resolve(mut self, origin: &Origin) -> Self {
        if self.uri.scheme().is_some() {
            return self;
        }
        let mut parts = Parts::default();
        parts.scheme = Some(origin.scheme().clone());
        parts.authority = origin.authority().parse().ok();
        parts.path_and_query = self
            .uri
            .path_and_query()
            .cloned()
            .or_else(|| Some(PathAndQuery::from_static("/")));
        if let Ok(uri) = Uri::from_parts(parts) {
            self.uri = uri;
        }
        self
    }

    /// Converts into an `http::Request` with an empty body.
    ///
    /// [`CacheMode::Reload`] is expressed as `Cache-Control: no-cache` and
    /// `Pragma: no-cache`.
    pub fn into_http<B: Default>(self) -> Request<B> {
        let mut request = Request::new(B::default());
        *request.method_mut() = self.method;
        *request.uri_mut() = self.uri;
        *request.headers_mut() = self.headers;
        if self.cache_mode == CacheMode::Reload {
            let headers = request.headers_mut();
            headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        }
        request
    }
}
