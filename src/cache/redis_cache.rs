//! Redis cache backend.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use tracing::info;

use super::{CacheError, CakeCache};

/// Redis client sharing one multiplexed, auto-reconnecting connection.
#[derive(Clone)]
pub struct RedisCache {
    manager: ConnectionManager,
}

impl RedisCache {
    /// Open a client for `url` and establish the initial connection.
    pub async fn connect(url: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(url).map_err(CacheError::backend)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(CacheError::backend)?;
        info!(target = "cache::redis_cache", "connected to redis");
        Ok(Self { manager })
    }
}

#[async_trait]
impl CakeCache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        let mut conn = self.manager.clone();
        conn.get(key).await.map_err(CacheError::backend)
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        // SET EX rejects a zero expiry.
        let seconds = ttl.as_secs().max(1);
        conn.set_ex::<_, _, ()>(key, value, seconds)
            .await
            .map_err(CacheError::backend)
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.manager.clone();
        conn.del::<_, ()>(key).await.map_err(CacheError::backend)
    }
}
