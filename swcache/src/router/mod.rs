//! Request routing.
//!
//! The [`Router`] classifies every intercepted request into exactly one
//! [`Strategy`], or declines it. Declined requests are left alone and reach
//! the network untouched.
//!
//! A request is declined when its scheme is not `http`/`https` (browser
//! extensions, `data:` URLs) or when its method is not `GET`. Otherwise the
//! first route of an ordered table whose [`Matcher`] applies wins.

mod matcher;

pub use matcher::{
    And, Any, BoxMatcher, HostContains, Matcher, MatcherExt, Not, Or, PathIn, RouteRequest,
    SameOrigin,
};

use std::fmt;

use http::Method;
use swcache_core::{FetchRequest, Origin};

use crate::config::WorkerConfig;
use crate::strategy::Strategy;

/// A single (matcher, strategy) pair of the routing table.
#[derive(Debug)]
pub struct Route {
    matcher: BoxMatcher,
    strategy: Strategy,
}

impl Route {
    /// Creates a route.
    pub fn new<M: Matcher + 'static>(matcher: M, strategy: Strategy) -> Self {
        Self {
            matcher: matcher.boxed(),
            strategy,
        }
    }

    /// The matcher deciding whether the route applies.
    pub fn matcher(&self) -> &dyn Matcher {
        self.matcher.as_ref()
    }

    /// The strategy requests matching this route are handled with.
    pub fn strategy(&self) -> Strategy {
        self.strategy
    }
}

/// Ordered routing table.
///
/// # Example
///
/// ```
/// use http::Uri;
/// use swcache::config::WorkerConfig;
/// use swcache::router::Router;
/// use swcache::strategy::Strategy;
/// use swcache_core::FetchRequest;
///
/// let config = WorkerConfig::new("https://catolid.app".parse().unwrap());
/// let router = Router::from_config(&config);
///
/// let icon = FetchRequest::get(Uri::from_static("https://catolid.app/icon.svg"));
/// assert_eq!(router.route(&icon), Some(Strategy::CacheFirst));
/// ```
pub struct Router {
    scope: Origin,
    routes: Vec<Route>,
}

impl Router {
    /// Creates an empty router for the given page origin.
    ///
    /// A router without routes declines everything.
    pub fn new(scope: Origin) -> Self {
        Self {
            scope,
            routes: Vec::new(),
        }
    }

    /// Appends a route. Routes are tried in insertion order.
    pub fn route_to<M: Matcher + 'static>(mut self, matcher: M, strategy: Strategy) -> Self {
        self.routes.push(Route::new(matcher, strategy));
        self
    }

    /// Builds the standard routing table of a worker:
    ///
    /// 1. same-origin `/` or the entry document: network-first with
    ///    entry-document fallback, or shell-first under
    ///    [`NavigationPolicy::ShellCacheFirst`](crate::config::NavigationPolicy::ShellCacheFirst)
    /// 2. same-origin static asset: cache-first
    /// 3. any other same-origin request: network-first
    /// 4. cross-origin backend host: network-only
    /// 5. anything else: stale-while-revalidate
    pub fn from_config(config: &WorkerConfig) -> Self {
        let mut backend: BoxMatcher = Not::new(Any).boxed();
        for host in &config.backend_hosts {
            backend = backend.or(HostContains::new(host)).boxed();
        }

        Self::new(config.scope.clone())
            .route_to(
                SameOrigin.and(PathIn::new(["/", config.entry_document.as_str()])),
                Strategy::NetworkFirstEntryFallback,
            )
            .route_to(
                SameOrigin.and(PathIn::new(config.static_assets.iter().cloned())),
                Strategy::CacheFirst,
            )
            .route_to(SameOrigin, Strategy::NetworkFirst)
            .route_to(SameOrigin.not().and(backend), Strategy::NetworkOnly)
            .route_to(Any, Strategy::StaleWhileRevalidate)
    }

    /// The page origin.
    pub fn scope(&self) -> &Origin {
        &self.scope
    }

    /// The routing table, in matching order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Picks the strategy for a request, or `None` to decline it.
    pub fn route(&self, request: &FetchRequest) -> Option<Strategy> {
        if !request.is_http() {
            tracing::trace!(uri = %request.uri(), "declined: not an http request");
            return None;
        }
        if *request.method() != Method::GET {
            tracing::trace!(method = %request.method(), uri = %request.uri(), "declined: not a GET");
            return None;
        }
        let route_request = RouteRequest::new(request, &self.scope);
        let strategy = self
            .routes
            .iter()
            .find(|route| route.matcher.matches(&route_request))
            .map(|route| route.strategy);
        tracing::debug!(uri = %request.uri(), ?strategy, "routed");
        strategy
    }
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("scope", &self.scope)
            .field("routes", &self.routes.len())
            .finish()
    }
}
