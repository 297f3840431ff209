use std::sync::Arc;
use std::time::Duration;

use crate::application::cakes::CakeService;
use crate::application::repos::HealthRepo;

#[derive(Clone)]
pub struct HttpState {
    pub cakes: Arc<CakeService>,
    pub health: Arc<dyn HealthRepo>,
    /// Deadline applied to each request's storage calls.
    pub request_timeout: Duration,
}
