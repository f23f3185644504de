use async_trait::async_trait;
use swcache_core::{CacheStatus, FetchRequest};

use super::store_ops::{match_any, put_success};
use super::{Executor, Outcome, Strategy, StrategyContext};
use crate::error::WorkerError;

/// Same-origin static assets.
///
/// Serves the cached copy from any generation without touching the
/// network. On a miss the asset is fetched and a 2xx answer is stored in the
/// static generation before being returned. A network failure on a miss is
/// an error: there is nothing to fall back to.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheFirstExecutor;

#[async_trait]
impl Executor for CacheFirstExecutor {
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError> {
        let key = request.key();
        if let Some((generation, cached)) = match_any(ctx.store, &key).await {
            return Ok(Outcome::cached(
                generation,
                cached,
                CacheStatus::Hit,
                Strategy::CacheFirst,
            ));
        }

        let response = ctx.network.fetch(request).await?;
        put_success(ctx.store, ctx.static_generation, &key, &response).await;
        Ok(Outcome::network(response, Strategy::CacheFirst))
    }
}
