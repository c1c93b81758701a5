use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a002_llm_config::aggregate::LlmConfig;
use contracts::domain::a002_llm_config::form::LlmConfigForm;
use contracts::domain::a002_llm_config::tool_form::ToolForm;
use serde::Deserialize;

use super::ListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::a002_llm_config::service::{self, LlmConfigSaved, SanitizePreview};
use crate::shared::config;
use crate::system::auth::extractor::CurrentSession;

#[derive(Deserialize)]
pub struct SanitizeRequest {
    #[serde(default)]
    pub tools: Vec<ToolForm>,
}

/// GET /api/a002-llm-config
pub async fn list_all(
    CurrentSession(ctx): CurrentSession,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<LlmConfig>> {
    Ok(Json(service::list_all(&ctx, params.cached).await?))
}

/// GET /api/a002-llm-config/:id
pub async fn get_by_id(CurrentSession(ctx): CurrentSession, Path(id): Path<String>) -> ApiResult<LlmConfig> {
    Ok(Json(service::get_by_id(&ctx, &id).await?))
}

/// GET /api/a002-llm-config/:id/form
/// Конфигурация в виде состояния формы редактора
pub async fn get_form(CurrentSession(ctx): CurrentSession, Path(id): Path<String>) -> ApiResult<LlmConfigForm> {
    Ok(Json(service::get_form(&ctx, &id).await?))
}

/// POST /api/a002-llm-config
pub async fn create(
    CurrentSession(ctx): CurrentSession,
    Json(form): Json<LlmConfigForm>,
) -> ApiResult<LlmConfigSaved> {
    let policy = config::get().tools.placeholder_policy;
    Ok(Json(service::create(&ctx, form, policy).await?))
}

/// PATCH /api/a002-llm-config/:id
pub async fn update(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
    Json(form): Json<LlmConfigForm>,
) -> ApiResult<LlmConfigSaved> {
    let policy = config::get().tools.placeholder_policy;
    Ok(Json(service::update(&ctx, &id, form, policy).await?))
}

/// DELETE /api/a002-llm-config/:id
pub async fn delete(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service::delete(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/a002-llm-config/sanitize
/// Пробная санитизация списка инструментов без отправки на платформу
pub async fn sanitize(Json(request): Json<SanitizeRequest>) -> ApiResult<SanitizePreview> {
    let policy = config::get().tools.placeholder_policy;
    Ok(Json(service::sanitize_preview(&request.tools, policy)?))
}
