//! Cache-aside decorator over a cake repository.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use tracing::{debug, warn};

use crate::application::context::RequestContext;
use crate::application::repos::{CakesRepo, RepoError};
use crate::domain::entities::CakeRecord;

use super::config::{CacheConfig, CacheFailurePolicy};
use super::keys::cake_key;
use super::{CacheError, CakeCache};

const SOURCE: &str = "cache::repository";

/// Reads go to the cache first and populate it after a store hit; writes
/// invalidate the cached entry instead of rewriting it.
///
/// `find_all` is never cached.
#[derive(Clone)]
pub struct CachedCakesRepo {
    store: Arc<dyn CakesRepo>,
    cache: Arc<dyn CakeCache>,
    ttl: Duration,
    policy: CacheFailurePolicy,
}

impl CachedCakesRepo {
    pub fn new(store: Arc<dyn CakesRepo>, cache: Arc<dyn CakeCache>, config: &CacheConfig) -> Self {
        Self {
            store,
            cache,
            ttl: config.ttl,
            policy: config.failure_policy,
        }
    }

    /// Run a cache call under the request deadline. Expiry comes back as
    /// `CacheError::Timeout` and goes through the failure policy.
    async fn bounded<T, F>(&self, ctx: &RequestContext, call: F) -> Result<T, CacheError>
    where
        F: Future<Output = Result<T, CacheError>>,
    {
        match ctx.run(async { Ok(call.await) }).await {
            Ok(outcome) => outcome,
            Err(_) => Err(CacheError::Timeout),
        }
    }

    /// Apply the failure policy. `Ok(())` means the caller carries on.
    fn tolerate(
        &self,
        ctx: &RequestContext,
        operation: &'static str,
        key: &str,
        err: CacheError,
    ) -> Result<(), RepoError> {
        counter!("cakestore_cache_error_total", "operation" => operation).increment(1);
        match self.policy {
            CacheFailurePolicy::Strict => {
                warn!(
                    target = SOURCE,
                    request_id = %ctx.request_id,
                    operation,
                    key,
                    error = %err,
                    "cache failure"
                );
                Err(match err {
                    CacheError::Timeout => RepoError::Timeout,
                    other => RepoError::from_cache(other),
                })
            }
            CacheFailurePolicy::BestEffort => {
                warn!(
                    target = SOURCE,
                    request_id = %ctx.request_id,
                    operation,
                    key,
                    error = %err,
                    "ignoring cache failure"
                );
                Ok(())
            }
        }
    }

    async fn invalidate(&self, ctx: &RequestContext, id: i64) -> Result<(), RepoError> {
        let key = cake_key(id);
        match self.bounded(ctx, self.cache.delete(&key)).await {
            Ok(()) => {
                counter!("cakestore_cache_invalidate_total").increment(1);
                debug!(target = SOURCE, request_id = %ctx.request_id, key = %key, "invalidated");
                Ok(())
            }
            Err(err) => self.tolerate(ctx, "invalidate", &key, err),
        }
    }

    async fn read_cached(
        &self,
        ctx: &RequestContext,
        key: &str,
    ) -> Result<Option<CakeRecord>, RepoError> {
        let raw = match self.bounded(ctx, self.cache.get(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(None),
            Err(err) => {
                self.tolerate(ctx, "get", key, err)?;
                return Ok(None);
            }
        };

        match serde_json::from_str::<CakeRecord>(&raw) {
            Ok(cake) => Ok(Some(cake)),
            Err(err) => {
                self.tolerate(ctx, "decode", key, CacheError::Decode(err.to_string()))?;
                Ok(None)
            }
        }
    }

    async fn populate(
        &self,
        ctx: &RequestContext,
        key: &str,
        cake: &CakeRecord,
    ) -> Result<(), RepoError> {
        let payload = match serde_json::to_string(cake) {
            Ok(payload) => payload,
            Err(err) => {
                return self.tolerate(ctx, "encode", key, CacheError::Encode(err.to_string()));
            }
        };

        match self
            .bounded(ctx, self.cache.set(key, payload, self.ttl))
            .await
        {
            Ok(()) => Ok(()),
            Err(err) => self.tolerate(ctx, "set", key, err),
        }
    }
}

#[async_trait]
impl CakesRepo for CachedCakesRepo {
    async fn save(&self, ctx: &RequestContext, cake: &mut CakeRecord) -> Result<(), RepoError> {
        // New ids cannot be cached yet.
        self.store.save(ctx, cake).await
    }

    async fn update(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        self.store.update(ctx, cake).await?;
        self.invalidate(ctx, cake.id).await
    }

    async fn delete(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError> {
        self.store.delete(ctx, cake).await?;
        self.invalidate(ctx, cake.id).await
    }

    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<CakeRecord>, RepoError> {
        self.store.find_all(ctx).await
    }

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<CakeRecord>, RepoError> {
        let key = cake_key(id);
        if let Some(cake) = self.read_cached(ctx, &key).await? {
            counter!("cakestore_cache_hit_total").increment(1);
            debug!(target = SOURCE, request_id = %ctx.request_id, key = %key, "cache hit");
            return Ok(Some(cake));
        }
        counter!("cakestore_cache_miss_total").increment(1);

        let Some(cake) = self.store.find_by_id(ctx, id).await? else {
            return Ok(None);
        };
        self.populate(ctx, &key, &cake).await?;
        Ok(Some(cake))
    }
}
