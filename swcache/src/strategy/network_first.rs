use async_trait::async_trait;
use swcache_core::{CacheStatus, FetchRequest};

use super::store_ops::{match_any, put_success};
use super::{Executor, Outcome, Strategy, StrategyContext};
use crate::config::NavigationPolicy;
use crate::error::WorkerError;

/// Site root and entry document.
///
/// Goes to the network and hands back whatever status it answers with.
/// When the network is unreachable the cached entry document is served
/// instead, so the single-page application still boots offline. Never
/// writes to the store.
///
/// Under [`NavigationPolicy::ShellCacheFirst`] a cached entry document is
/// served first and the network is only used when it is missing.
#[derive(Debug, Clone, Copy, Default)]
pub struct EntryFallbackExecutor;

#[async_trait]
impl Executor for EntryFallbackExecutor {
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError> {
        const STRATEGY: Strategy = Strategy::NetworkFirstEntryFallback;
        let entry_key = ctx.same_origin_key(&ctx.config.entry_document);

        if ctx.config.navigation == NavigationPolicy::ShellCacheFirst {
            if let Some((generation, cached)) = match_any(ctx.store, &entry_key).await {
                return Ok(Outcome::cached(generation, cached, CacheStatus::Hit, STRATEGY));
            }
        }

        match ctx.network.fetch(request).await {
            Ok(response) => Ok(Outcome::network(response, STRATEGY)),
            Err(error) => {
                tracing::debug!(%error, "network failed, falling back to entry document");
                match match_any(ctx.store, &entry_key).await {
                    Some((generation, cached)) => Ok(Outcome::cached(
                        generation,
                        cached,
                        CacheStatus::Stale,
                        STRATEGY,
                    )),
                    None => Err(WorkerError::NoFallback {
                        key: entry_key,
                        source: error,
                    }),
                }
            }
        }
    }
}

/// Same-origin requests that are not static assets.
///
/// Goes to the network; a 2xx answer is stored in the runtime generation.
/// When the network is unreachable the cached entry for the same request
/// is served from any generation.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkFirstExecutor;

#[async_trait]
impl Executor for NetworkFirstExecutor {
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError> {
        const STRATEGY: Strategy = Strategy::NetworkFirst;
        let key = request.key();

        match ctx.network.fetch(request).await {
            Ok(response) => {
                put_success(ctx.store, ctx.runtime_generation, &key, &response).await;
                Ok(Outcome::network(response, STRATEGY))
            }
            Err(error) => {
                tracing::debug!(%key, %error, "network failed, falling back to cache");
                match match_any(ctx.store, &key).await {
                    Some((generation, cached)) => Ok(Outcome::cached(
                        generation,
                        cached,
                        CacheStatus::Stale,
                        STRATEGY,
                    )),
                    None => Err(WorkerError::NoFallback { key, source: error }),
                }
            }
        }
    }
}
