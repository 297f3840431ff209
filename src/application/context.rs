//! Per-request context passed explicitly into every storage call.

use std::future::Future;
use std::time::Duration;

use tokio::time::{Instant, timeout_at};
use uuid::Uuid;

use crate::application::repos::RepoError;

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub request_id: String,
    deadline: Option<Instant>,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            deadline: None,
        }
    }

    /// Fresh context with a random request id and no deadline.
    pub fn background() -> Self {
        Self::new(Uuid::new_v4().to_string())
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.deadline = Some(Instant::now() + timeout);
        self
    }

    /// Drive `fut` until it completes or the deadline passes.
    pub async fn run<F, T>(&self, fut: F) -> Result<T, RepoError>
    where
        F: Future<Output = Result<T, RepoError>>,
    {
        match self.deadline {
            Some(deadline) => timeout_at(deadline, fut)
                .await
                .map_err(|_| RepoError::Timeout)?,
            None => fut.await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn run_without_deadline_passes_result_through() {
        let ctx = RequestContext::new("req-1");
        let value = ctx.run(async { Ok::<_, RepoError>(7) }).await.unwrap();
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn run_reports_timeout_once_deadline_passes() {
        let ctx = RequestContext::new("req-2").with_timeout(Duration::from_millis(10));
        let result = ctx
            .run(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok::<_, RepoError>(())
            })
            .await;
        assert!(matches!(result, Err(RepoError::Timeout)));
    }
}
