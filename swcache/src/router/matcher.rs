//! Request matchers and their logical combinators.
//!
//! A [`Matcher`] decides whether a route applies to a request. Matchers are
//! pure and synchronous: they look at the request URL and the page origin
//! only. They compose with [`MatcherExt`]:
//!
//! ```
//! use swcache::router::{HostContains, MatcherExt, SameOrigin};
//!
//! // cross-origin requests to a backend host
//! let backend = SameOrigin.not().and(HostContains::new("supabase.co"));
//! # let _ = backend;
//! ```

use std::fmt::Debug;

use smol_str::SmolStr;
use swcache_core::{FetchRequest, Origin};

/// A request seen by the router, together with the page origin.
#[derive(Debug, Clone, Copy)]
pub struct RouteRequest<'a> {
    request: &'a FetchRequest,
    scope: &'a Origin,
}

impl<'a> RouteRequest<'a> {
    /// Pairs a request with the page origin.
    pub fn new(request: &'a FetchRequest, scope: &'a Origin) -> Self {
        Self { request, scope }
    }

    /// The intercepted request.
    pub fn request(&self) -> &'a FetchRequest {
        self.request
    }

    /// The page origin.
    pub fn scope(&self) -> &'a Origin {
        self.scope
    }

    /// Whether the request targets the page origin.
    ///
    /// Relative requests are same-origin.
    pub fn is_same_origin(&self) -> bool {
        self.request
            .origin()
            .is_none_or(|origin| origin == *self.scope)
    }

    /// The request host, lowercased. Relative requests use the page host.
    pub fn host(&self) -> SmolStr {
        self.request
            .origin()
            .map(|origin| SmolStr::from(origin.host()))
            .unwrap_or_else(|| SmolStr::from(self.scope.host()))
    }

    /// The request path.
    pub fn path(&self) -> &'a str {
        self.request.path()
    }
}

/// Decides whether a route applies to a request.
pub trait Matcher: Debug + Send + Sync {
    /// Returns `true` when the route applies.
    fn matches(&self, request: &RouteRequest<'_>) -> bool;
}

impl<M> Matcher for Box<M>
where
    M: Matcher + ?Sized,
{
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        (**self).matches(request)
    }
}

/// Boxed matcher for dynamic dispatch.
pub type BoxMatcher = Box<dyn Matcher>;

/// Matches every request.
#[derive(Debug, Clone, Copy, Default)]
pub struct Any;

impl Matcher for Any {
    fn matches(&self, _request: &RouteRequest<'_>) -> bool {
        true
    }
}

/// Matches requests to the page origin.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameOrigin;

impl Matcher for SameOrigin {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        request.is_same_origin()
    }
}

/// Matches requests whose path is one of a fixed set.
#[derive(Debug, Clone, Default)]
pub struct PathIn {
    paths: Vec<SmolStr>,
}

impl PathIn {
    /// Creates a matcher for the given paths.
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<SmolStr>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }
}

impl Matcher for PathIn {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        let path = request.path();
        self.paths.iter().any(|candidate| candidate == path)
    }
}

/// Matches requests whose host contains a substring.
///
/// The comparison is case-insensitive and purely textual: the pattern
/// `supabase.co` also matches `abc.supabase.co.evil.example`.
#[derive(Debug, Clone)]
pub struct HostContains {
    pattern: SmolStr,
}

impl HostContains {
    /// Creates a matcher for the given host substring.
    pub fn new(pattern: impl AsRef<str>) -> Self {
        Self {
            pattern: SmolStr::from(pattern.as_ref().to_ascii_lowercase()),
        }
    }
}

impl Matcher for HostContains {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        request.host().contains(self.pattern.as_str())
    }
}

/// Inverts a matcher.
#[derive(Debug)]
pub struct Not<M> {
    matcher: M,
}

impl<M> Not<M> {
    /// Creates a new `Not` combinator wrapping the given matcher.
    pub fn new(matcher: M) -> Self {
        Self { matcher }
    }
}

impl<M: Matcher> Matcher for Not<M> {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        !self.matcher.matches(request)
    }
}

/// Requires both matchers. Short-circuits on the left one.
#[derive(Debug)]
pub struct And<L, R> {
    left: L,
    right: R,
}

impl<L, R> And<L, R> {
    /// Creates a new `And` combinator from two matchers.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L: Matcher, R: Matcher> Matcher for And<L, R> {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        self.left.matches(request) && self.right.matches(request)
    }
}

/// Requires either matcher. Short-circuits on the left one.
#[derive(Debug)]
pub struct Or<L, R> {
    left: L,
    right: R,
}

impl<L, R> Or<L, R> {
    /// Creates a new `Or` combinator from two matchers.
    pub fn new(left: L, right: R) -> Self {
        Self { left, right }
    }
}

impl<L: Matcher, R: Matcher> Matcher for Or<L, R> {
    fn matches(&self, request: &RouteRequest<'_>) -> bool {
        self.left.matches(request) || self.right.matches(request)
    }
}

/// Extension trait for fluent matcher composition.
pub trait MatcherExt: Matcher + Sized {
    /// Matches when both matchers do.
    fn and<R: Matcher>(self, right: R) -> And<Self, R> {
        And::new(self, right)
    }

    /// Matches when either matcher does.
    fn or<R: Matcher>(self, right: R) -> Or<Self, R> {
        Or::new(self, right)
    }

    /// Matches when this matcher does not.
    fn not(self) -> Not<Self> {
        Not::new(self)
    }

    /// Boxes this matcher into a trait object.
    fn boxed(self) -> BoxMatcher
    where
        Self: 'static,
    {
        Box::new(self)
    }
}

impl<T: Matcher + Sized> MatcherExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use http::Uri;

    fn scope() -> Origin {
        "https://catolid.app".parse().unwrap()
    }

    fn check(matcher: &dyn Matcher, uri: &'static str) -> bool {
        let scope = scope();
        let request = FetchRequest::get(Uri::from_static(uri));
        matcher.matches(&RouteRequest::new(&request, &scope))
    }

    #[test]
    fn same_origin_ignores_default_port() {
        assert!(check(&SameOrigin, "https://catolid.app:443/perfil"));
        assert!(check(&SameOrigin, "/perfil"));
        assert!(!check(&SameOrigin, "http://catolid.app/perfil"));
        assert!(!check(&SameOrigin, "https://api.catolid.app/perfil"));
    }

    #[test]
    fn host_contains_is_a_substring_match() {
        let matcher = HostContains::new("supabase.co");
        assert!(check(&matcher, "https://xyz.supabase.co/rest/v1/profiles"));
        assert!(check(&matcher, "https://XYZ.SUPABASE.CO/rest"));
        assert!(!check(&matcher, "https://fonts.googleapis.com/css"));
    }

    #[test]
    fn combinators_compose() {
        let backend = SameOrigin.not().and(HostContains::new("catolid"));
        assert!(check(&backend, "https://api.catolid.app/x"));
        assert!(!check(&backend, "https://catolid.app/x"));

        let shell = PathIn::new(["/"]).or(PathIn::new(["/index.html"]));
        assert!(check(&shell, "https://catolid.app/"));
        assert!(check(&shell, "/index.html"));
        assert!(!check(&shell, "/icon.svg"));
        assert!(check(&Any, "chrome-extension://abc/x"));
    }
}
