//! Cake CRUD handlers.

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Extension, Path, State};
use axum::response::IntoResponse;

use crate::application::context::RequestContext;
use crate::domain::cakes::CakeDraft;

use super::HttpState;
use super::error::{ApiError, Envelope};

fn parse_id(raw: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|err| ApiError::invalid_argument(format!("path id `{raw}`: {err}")))
}

fn parse_draft(payload: Result<Json<CakeDraft>, JsonRejection>) -> Result<CakeDraft, ApiError> {
    payload
        .map(|Json(draft)| draft)
        .map_err(|rejection| ApiError::invalid_argument(rejection.body_text()))
}

pub async fn list_cakes(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
) -> Result<impl IntoResponse, ApiError> {
    let cakes = state.cakes.find_all(&ctx).await?;
    Ok(Envelope::ok(cakes))
}

pub async fn create_cake(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
    payload: Result<Json<CakeDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let draft = parse_draft(payload)?;
    let cake = state.cakes.create(&ctx, draft).await?;
    Ok(Envelope::ok(cake))
}

pub async fn get_cake(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let cake = state.cakes.find_by_id(&ctx, id).await?;
    Ok(Envelope::ok(cake))
}

pub async fn update_cake(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
    payload: Result<Json<CakeDraft>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let draft = parse_draft(payload)?;
    let cake = state.cakes.update(&ctx, id, draft).await?;
    Ok(Envelope::ok(cake))
}

pub async fn delete_cake(
    State(state): State<HttpState>,
    Extension(ctx): Extension<RequestContext>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let id = parse_id(&id)?;
    let cake = state.cakes.delete(&ctx, id).await?;
    Ok(Envelope::ok(cake))
}
