//! Repository traits describing persistence adapters.

use async_trait::async_trait;
use thiserror::Error;

use crate::application::context::RequestContext;
use crate::domain::entities::CakeRecord;

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("database timeout")]
    Timeout,
    #[error("cache error: {0}")]
    Cache(String),
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }

    pub fn from_cache(err: impl std::fmt::Display) -> Self {
        Self::Cache(err.to_string())
    }
}

/// Storage contract for cakes.
///
/// Reads never return soft-deleted rows. `find_by_id` reports a missing
/// row as `Ok(None)`; turning that into a not-found error is up to the caller.
#[async_trait]
pub trait CakesRepo: Send + Sync {
    /// Insert `cake` and write the generated id back into it.
    async fn save(&self, ctx: &RequestContext, cake: &mut CakeRecord) -> Result<(), RepoError>;

    /// Persist title, description, rating, image and `updated_at`.
    async fn update(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError>;

    /// Persist `deleted_at` only.
    async fn delete(&self, ctx: &RequestContext, cake: &CakeRecord) -> Result<(), RepoError>;

    /// Active cakes ordered by rating (highest first), then title.
    async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<CakeRecord>, RepoError>;

    async fn find_by_id(
        &self,
        ctx: &RequestContext,
        id: i64,
    ) -> Result<Option<CakeRecord>, RepoError>;
}

/// Liveness probe for the backing store.
#[async_trait]
pub trait HealthRepo: Send + Sync {
    async fn ping(&self) -> Result<(), RepoError>;
}
