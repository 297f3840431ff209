use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};

use crate::application::context::RequestContext;
use crate::application::repos::{CakesRepo, RepoError};
use crate::domain::cakes::{CakeDraft, now_utc};
use crate::domain::entities::{CakeRecord, UNSET_CAKE_ID};
use crate::domain::error::ValidationErrors;

const SOURCE: &str = "application::cakes";

#[derive(Debug, Error)]
pub enum CakeError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),
    #[error("cake not found")]
    NotFound,
    #[error("cake already deleted")]
    AlreadyDeleted,
    #[error(transparent)]
    Repo(#[from] RepoError),
}

#[derive(Clone)]
pub struct CakeService {
    repo: Arc<dyn CakesRepo>,
}

impl CakeService {
    pub fn new(repo: Arc<dyn CakesRepo>) -> Self {
        Self { repo }
    }

    pub async fn create(
        &self,
        ctx: &RequestContext,
        draft: CakeDraft,
    ) -> Result<CakeRecord, CakeError> {
        if let Err(errors) = draft.validate() {
            debug!(
                target = SOURCE,
                request_id = %ctx.request_id,
                operation = "create",
                error = %errors,
                "rejected cake payload"
            );
            return Err(CakeError::Validation(errors));
        }

        let mut cake = draft.into_new_record(now_utc());
        self.repo
            .save(ctx, &mut cake)
            .await
            .inspect_err(|err| log_repo_error(ctx, "create", cake.id, err))?;

        Ok(cake)
    }

    pub async fn find_by_id(&self, ctx: &RequestContext, id: i64) -> Result<CakeRecord, CakeError> {
        if id == UNSET_CAKE_ID {
            return Err(CakeError::InvalidArgument("id"));
        }

        self.repo
            .find_by_id(ctx, id)
            .await
            .inspect_err(|err| log_repo_error(ctx, "find_by_id", id, err))?
            .ok_or(CakeError::NotFound)
    }

    /// Existence is checked before the payload is validated.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        id: i64,
        draft: CakeDraft,
    ) -> Result<CakeRecord, CakeError> {
        let mut cake = self.find_by_id(ctx, id).await?;
        if cake.is_deleted() {
            return Err(CakeError::NotFound);
        }

        draft.validate()?;
        draft.apply_to(&mut cake, now_utc());

        self.repo
            .update(ctx, &cake)
            .await
            .inspect_err(|err| log_repo_error(ctx, "update", id, err))?;

        Ok(cake)
    }

    pub async fn delete(&self, ctx: &RequestContext, id: i64) -> Result<CakeRecord, CakeError> {
        let mut cake = self.find_by_id(ctx, id).await?;
        if cake.is_deleted() {
            return Err(CakeError::AlreadyDeleted);
        }

        cake.deleted_at = Some(now_utc());

        self.repo
            .delete(ctx, &cake)
            .await
            .inspect_err(|err| log_repo_error(ctx, "delete", id, err))?;

        Ok(cake)
    }

    pub async fn find_all(&self, ctx: &RequestContext) -> Result<Vec<CakeRecord>, CakeError> {
        self.repo
            .find_all(ctx)
            .await
            .inspect_err(|err| log_repo_error(ctx, "find_all", UNSET_CAKE_ID, err))
            .map_err(CakeError::from)
    }
}

fn log_repo_error(ctx: &RequestContext, operation: &'static str, cake_id: i64, err: &RepoError) {
    warn!(
        target = SOURCE,
        request_id = %ctx.request_id,
        operation,
        cake_id,
        error = %err,
        "cake repository call failed"
    );
}
