use async_trait::async_trait;
use swcache_core::{CacheStatus, FetchRequest};

use super::store_ops::match_any;
use super::{Executor, Outcome, Strategy, StrategyContext};
use crate::error::WorkerError;

/// Cross-origin backend API calls.
///
/// Always goes to the network and hands back whatever it answers. The cache
/// is read only when the network is unreachable, and nothing is ever
/// written: backend data is never served from a copy this layer made.
#[derive(Debug, Clone, Copy, Default)]
pub struct NetworkOnlyExecutor;

#[async_trait]
impl Executor for NetworkOnlyExecutor {
    async fn execute(
        &self,
        ctx: &StrategyContext<'_>,
        request: FetchRequest,
    ) -> Result<Outcome, WorkerError> {
        let key = request.key();
        match ctx.network.fetch(request).await {
            Ok(response) => Ok(Outcome::network(response, Strategy::NetworkOnly)),
            Err(error) => match match_any(ctx.store, &key).await {
                Some((generation, cached)) => Ok(Outcome::cached(
                    generation,
                    cached,
                    CacheStatus::Stale,
                    Strategy::NetworkOnly,
                )),
                None => Err(WorkerError::NoFallback { key, source: error }),
            },
        }
    }
}
