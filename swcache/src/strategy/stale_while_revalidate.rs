use async_trait::async_trait;
use chrono::Utc;
use swcache_core::{CacheStatus, FetchRequest};

use super::store_ops::{match_any, put_success};
use super::{Executor, Outcome, Strategy, StrategyContext};
use crate::error::WorkerError;

/// Cross-origin resources that are not backend calls (fonts, CDN assets).
///
/// A cached entry younger than the freshness window is served without
/// touching the network. Otherwise the resource is fetched and a 2xx answer
/// is stored in the runtime generation. When the network is unreachable the
/// stale entry is served; without one the request fails with
/// [`WorkerError::NetworkUnavailable`].
///
/// Entry age is measured from the response `Date` header, or from the time
/// it was stored when the header is missing or malformed.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaleWhileRevalidateExecutor;

#[async_trait]
impl Executor for StaleWhileRevalidateExecutor {
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError> {
        const STRATEGY: Strategy = Strategy::StaleWhileRevalidate;
        let key = request.key();
        let cached = match_any(ctx.store, &key).await;

        let fresh = cached
            .as_ref()
            .is_some_and(|(_, entry)| entry.is_fresh_at(ctx.config.freshness_window, Utc::now()));
        if fresh {
            if let Some((generation, entry)) = cached {
                return Ok(Outcome::cached(generation, entry, CacheStatus::Hit, STRATEGY));
            }
        }

        match ctx.network.fetch(request).await {
            Ok(response) => {
                put_success(ctx.store, ctx.runtime_generation, &key, &response).await;
                Ok(Outcome::network(response, STRATEGY))
            }
            Err(error) => match cached {
                Some((generation, entry)) => {
                    tracing::debug!(%key, %error, "network failed, serving stale entry");
                    Ok(Outcome::cached(generation, entry, CacheStatus::Stale, STRATEGY))
                }
                None => Err(WorkerError::NetworkUnavailable { key, source: error }),
            },
        }
    }
}
