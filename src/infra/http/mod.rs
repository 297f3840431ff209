mod cakes;
pub mod error;
mod middleware;
mod state;

pub use state::HttpState;

use axum::extract::{Extension, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::{Router, middleware as axum_middleware, routing::get};

use crate::application::context::RequestContext;
use crate::application::error::ErrorReport;

/// Routes under `/api`, wrapped in request-context and response-logging middleware.
pub fn build_router(state: HttpState) -> Router {
    let context_state = state.clone();

    Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/cakes",
            get(cakes::list_cakes).post(cakes::create_cake),
        )
        .route(
            "/api/cakes/{id}",
            get(cakes::get_cake)
                .put(cakes::update_cake)
                .delete(cakes::delete_cake),
        )
        .with_state(state)
        .layer(axum_middleware::from_fn(middleware::log_responses))
        .layer(axum_middleware::from_fn_with_state(
            context_state,
            middleware::set_request_context,
        ))
}

async fn health(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
) -> Response {
    match ctx.run(state.health.ping()).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
