use axum::{extract::Path, http::StatusCode, Json};
use contracts::domain::a005_call::aggregate::{
    Call, CallListRequest, PhoneCallCreateRequest, WebCallCreateRequest, WebCallResponse,
};

use crate::api::error::{ApiError, ApiResult};
use crate::domain::a005_call::service;
use crate::domain::a005_call::watch::{CallWatchSnapshot, CALL_WATCHES};
use crate::shared::config;
use crate::system::auth::extractor::CurrentSession;

/// POST /api/a005-call/web
pub async fn create_web_call(
    CurrentSession(ctx): CurrentSession,
    Json(request): Json<WebCallCreateRequest>,
) -> ApiResult<WebCallResponse> {
    Ok(Json(service::create_web_call(&ctx, request).await?))
}

/// POST /api/a005-call/phone
/// Создаёт звонок и запускает опрос его статуса
pub async fn create_phone_call(
    CurrentSession(ctx): CurrentSession,
    Json(request): Json<PhoneCallCreateRequest>,
) -> ApiResult<Call> {
    let interval = config::get().calls.poll_interval();
    Ok(Json(
        service::create_phone_call(&ctx, &CALL_WATCHES, request, interval).await?,
    ))
}

/// POST /api/a005-call/list
pub async fn list(
    CurrentSession(ctx): CurrentSession,
    request: Option<Json<CallListRequest>>,
) -> ApiResult<Vec<Call>> {
    let request = request.map(|Json(r)| r).unwrap_or_default();
    Ok(Json(service::list(&ctx, request).await?))
}

/// GET /api/a005-call/:id
pub async fn get_by_id(CurrentSession(ctx): CurrentSession, Path(id): Path<String>) -> ApiResult<Call> {
    Ok(Json(service::get_by_id(&ctx, &id).await?))
}

/// POST /api/a005-call/:id/end
pub async fn end_call(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    service::end_call(&ctx, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/a005-call/:id/watch
pub async fn watch(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<CallWatchSnapshot> {
    let interval = config::get().calls.poll_interval();
    Ok(Json(service::watch(&ctx, &CALL_WATCHES, &id, interval).await?))
}

/// DELETE /api/a005-call/:id/watch
pub async fn stop_watch(
    CurrentSession(ctx): CurrentSession,
    Path(id): Path<String>,
) -> ApiResult<CallWatchSnapshot> {
    Ok(Json(service::stop_watch(&ctx, &CALL_WATCHES, &id)?))
}
