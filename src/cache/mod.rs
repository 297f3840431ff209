//! Look-aside cache for cake reads.
//!
//! `CakeCache` is the storage capability (Redis, in-process LRU, or disabled).
//! `CachedCakesRepo` wraps any `CakesRepo` and applies cache-aside reads
//! and invalidate-on-write on top of it.

mod config;
mod keys;
mod lock;
mod redis_cache;
mod repository;
mod store;

pub use config::{CacheBackendKind, CacheConfig, CacheFailurePolicy};
pub use keys::cake_key;
pub use redis_cache::RedisCache;
pub use repository::CachedCakesRepo;
pub use store::MemoryCache;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
    #[error("cached entry could not be decoded: {0}")]
    Decode(String),
    #[error("cache entry could not be encoded: {0}")]
    Encode(String),
    #[error("cache call exceeded the request deadline")]
    Timeout,
}

impl CacheError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }
}

/// Key/value store holding serialized entities with an expiry.
#[async_trait]
pub trait CakeCache: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError>;

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError>;

    async fn delete(&self, key: &str) -> Result<(), CacheError>;
}

/// Always misses; writes and deletes succeed without effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct DisabledCache;

#[async_trait]
impl CakeCache for DisabledCache {
    async fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
        Ok(None)
    }

    async fn set(&self, _key: &str, _value: String, _ttl: Duration) -> Result<(), CacheError> {
        Ok(())
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Ok(())
    }
}

/// Build the backend selected by `config`.
pub async fn connect(config: &CacheConfig) -> Result<Arc<dyn CakeCache>, CacheError> {
    match config.backend {
        CacheBackendKind::Disabled => Ok(Arc::new(DisabledCache)),
        CacheBackendKind::Memory => Ok(Arc::new(MemoryCache::new(config.memory_capacity))),
        CacheBackendKind::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or_else(|| CacheError::backend("redis url is not configured"))?;
            Ok(Arc::new(RedisCache::connect(url).await?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn disabled_cache_never_hits() {
        let cache = DisabledCache;
        cache
            .set("cake:1", "{}".to_string(), Duration::from_secs(60))
            .await
            .unwrap();
        assert_eq!(cache.get("cake:1").await.unwrap(), None);
        cache.delete("cake:1").await.unwrap();
    }

    #[tokio::test]
    async fn connect_requires_redis_url_for_redis_backend() {
        let config = CacheConfig {
            backend: CacheBackendKind::Redis,
            redis_url: None,
            ..Default::default()
        };
        let err = connect(&config).await.err().expect("missing url");
        assert!(matches!(err, CacheError::Backend(_)));
    }
}
