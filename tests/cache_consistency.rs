use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use cakestore::application::cakes::{CakeError, CakeService};
use cakestore::application::context::RequestContext;
use cakestore::application::repos::RepoError;
use cakestore::cache::{
    CacheBackendKind, CacheConfig, CacheError, CacheFailurePolicy, CachedCakesRepo, CakeCache,
    MemoryCache, cake_key,
};
use cakestore::domain::cakes::CakeDraft;

mod support;

use support::MemoryStore;

fn draft(title: &str, rating: f32) -> CakeDraft {
    CakeDraft {
        title: title.to_string(),
        description: "Layered and rich".to_string(),
        rating,
        image: "https://img.example/cake.png".to_string(),
    }
}

fn memory_config(policy: CacheFailurePolicy) -> CacheConfig {
    CacheConfig {
        backend: CacheBackendKind::Memory,
        ttl: Duration::from_secs(60),
        memory_capacity: NonZeroUsize::new(64).unwrap(),
        failure_policy: policy,
        ..CacheConfig::default()
    }
}

struct Stack {
    service: CakeService,
    store: Arc<MemoryStore>,
    cache: Arc<dyn CakeCache>,
}

fn stack(cache: Arc<dyn CakeCache>, policy: CacheFailurePolicy) -> Stack {
    let store = Arc::new(MemoryStore::default());
    let repo = CachedCakesRepo::new(store.clone(), cache.clone(), &memory_config(policy));
    Stack {
        service: CakeService::new(Arc::new(repo)),
        store,
        cache,
    }
}

/// Reads work, every invalidation fails.
struct StuckCache {
    inner: MemoryCache,
}

impl StuckCache {
    fn new() -> Self {
        Self {
            inner: MemoryCache::new(NonZeroUsize::new(8).unwrap()),
        }
    }
}

#[async_trait]
impl CakeCache for StuckCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::backend(
            "READONLY You can't write against a read only replica",
        ))
    }
}

/// Reads work, invalidation never answers before the deadline.
struct SlowDeleteCache {
    inner: MemoryCache,
}

impl SlowDeleteCache {
    fn new() -> Self {
        Self {
            inner: MemoryCache::new(NonZeroUsize::new(8).unwrap()),
        }
    }
}

#[async_trait]
impl CakeCache for SlowDeleteCache {
    async fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        self.inner.get(key).await
    }

    async fn set(&self, key: &str, value: String, ttl: Duration) -> Result<(), CacheError> {
        self.inner.set(key, value, ttl).await
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        tokio::time::sleep(Duration::from_secs(30)).await;
        self.inner.delete(key).await
    }
}

#[tokio::test]
async fn second_lookup_is_served_from_cache() {
    let memory: Arc<dyn CakeCache> = Arc::new(MemoryCache::new(NonZeroUsize::new(64).unwrap()));
    let stack = stack(memory, CacheFailurePolicy::Strict);
    let ctx = RequestContext::background();

    let created = stack.service.create(&ctx, draft("Opera", 9.0)).await.unwrap();
    let first = stack.service.find_by_id(&ctx, created.id).await.unwrap();
    let second = stack.service.find_by_id(&ctx, created.id).await.unwrap();

    assert_eq!(first, created);
    assert_eq!(second, created);
    assert_eq!(stack.store.lookups(), 1);
    assert!(
        stack
            .cache
            .get(&cake_key(created.id))
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn update_and_delete_evict_the_cached_entry() {
    let memory: Arc<dyn CakeCache> = Arc::new(MemoryCache::new(NonZeroUsize::new(64).unwrap()));
    let stack = stack(memory, CacheFailurePolicy::Strict);
    let ctx = RequestContext::background();

    let created = stack
        .service
        .create(&ctx, draft("Tiramisu", 8.0))
        .await
        .unwrap();
    stack.service.find_by_id(&ctx, created.id).await.unwrap();

    let updated = stack
        .service
        .update(&ctx, created.id, draft("Tiramisu classico", 8.5))
        .await
        .unwrap();
    assert!(stack.cache.get(&cake_key(created.id)).await.unwrap().is_none());

    let fetched = stack.service.find_by_id(&ctx, created.id).await.unwrap();
    assert_eq!(fetched, updated);

    stack.service.delete(&ctx, created.id).await.unwrap();
    assert!(stack.cache.get(&cake_key(created.id)).await.unwrap().is_none());
    assert!(matches!(
        stack.service.find_by_id(&ctx, created.id).await,
        Err(CakeError::NotFound)
    ));
}

#[tokio::test]
async fn strict_policy_fails_update_after_commit_when_invalidation_fails() {
    let stack = stack(Arc::new(StuckCache::new()), CacheFailurePolicy::Strict);
    let ctx = RequestContext::background();

    let created = stack.service.create(&ctx, draft("Pavlova", 6.0)).await.unwrap();
    let result = stack
        .service
        .update(&ctx, created.id, draft("Pavlova", 7.0))
        .await;

    assert!(matches!(result, Err(CakeError::Repo(RepoError::Cache(_)))));
    assert_eq!(stack.store.raw(created.id).unwrap().rating, 7.0);
}

#[tokio::test]
async fn best_effort_policy_tolerates_invalidation_failure() {
    let stack = stack(Arc::new(StuckCache::new()), CacheFailurePolicy::BestEffort);
    let ctx = RequestContext::background();

    let created = stack.service.create(&ctx, draft("Pavlova", 6.0)).await.unwrap();
    let updated = stack
        .service
        .update(&ctx, created.id, draft("Pavlova", 7.0))
        .await
        .unwrap();

    assert_eq!(updated.rating, 7.0);
    assert_eq!(stack.store.raw(created.id).unwrap().rating, 7.0);
}

#[tokio::test(start_paused = true)]
async fn expired_entries_fall_back_to_the_store() {
    let memory: Arc<dyn CakeCache> = Arc::new(MemoryCache::new(NonZeroUsize::new(64).unwrap()));
    let stack = stack(memory, CacheFailurePolicy::Strict);
    let ctx = RequestContext::background();

    let created = stack.service.create(&ctx, draft("Eclair", 5.5)).await.unwrap();
    stack.service.find_by_id(&ctx, created.id).await.unwrap();
    stack.service.find_by_id(&ctx, created.id).await.unwrap();
    assert_eq!(stack.store.lookups(), 1);

    tokio::time::advance(Duration::from_secs(61)).await;

    stack.service.find_by_id(&ctx, created.id).await.unwrap();
    assert_eq!(stack.store.lookups(), 2);
}

#[tokio::test(start_paused = true)]
async fn best_effort_policy_tolerates_invalidation_past_deadline() {
    let stack = stack(Arc::new(SlowDeleteCache::new()), CacheFailurePolicy::BestEffort);
    let ctx = RequestContext::new("slow-cache").with_timeout(Duration::from_secs(5));

    let created = stack.service.create(&ctx, draft("Pavlova", 6.0)).await.unwrap();
    let updated = stack
        .service
        .update(&ctx, created.id, draft("Pavlova", 7.0))
        .await
        .expect("committed update should not fail on a slow cache");

    assert_eq!(updated.rating, 7.0);
    assert_eq!(stack.store.raw(created.id).unwrap().rating, 7.0);
}

#[tokio::test(start_paused = true)]
async fn strict_policy_reports_timeout_when_invalidation_misses_deadline() {
    let stack = stack(Arc::new(SlowDeleteCache::new()), CacheFailurePolicy::Strict);
    let ctx = RequestContext::new("slow-cache").with_timeout(Duration::from_secs(5));

    let created = stack.service.create(&ctx, draft("Pavlova", 6.0)).await.unwrap();
    let result = stack
        .service
        .update(&ctx, created.id, draft("Pavlova", 7.0))
        .await;

    assert!(matches!(result, Err(CakeError::Repo(RepoError::Timeout))));
    assert_eq!(stack.store.raw(created.id).unwrap().rating, 7.0);
}
