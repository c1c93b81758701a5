use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a001_agent::aggregate::{Agent, AgentCreateRequest, AgentPatchRequest};

use super::ListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::a001_agent;
use crate::system::auth::extractor::CurrentSession;

/// GET /api/a001-agent
pub async fn list_all(
    CurrentSession(ctx): CurrentSession,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<Agent>> {
    Ok(Json(a001_agent::service::list_all(&ctx, params.cached).await?))
}

/// GET /api/a001-agent/:id
pub async fn get_by_id(CurrentSession(ctx): CurrentSession, Path(id): Path<String>) -> ApiResult<Agent> {
    Ok(Json(a001_agent::service::get_by_id(&ctx, &id).await?))
}

/// POST /api/a001-agent
pub async fn create(
    CurrentSession(ctx): CurrentSession,
    Json(request): Json<AgentCreateRequest>,
) -> ApiResult<Agent> {
    Ok(Json(a001_agent::service::create(&ctx, request).await?))
}

/// PATCH /api/a001-agent/:id
pub async fn update(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
    Json(patch): Json<AgentPatchRequest>,
) -> ApiResult<Agent> {
    Ok(Json(a001_agent::service::update(&ctx, &id, patch).await?))
}

/// DELETE /api/a001-agent/:id
pub async fn delete(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    a001_agent::service::delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}
