use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Json,
};
use contracts::domain::a004_phone_number::aggregate::{
    PhoneNumber, PhoneNumberCreateRequest, PhoneNumberUpdateRequest,
};

use super::ListParams;
use crate::api::error::{ApiError, ApiResult};
use crate::domain::a004_phone_number;
use crate::system::auth::extractor::CurrentSession;

/// GET /api/a004-phone-number
pub async fn list_all(
    CurrentSession(ctx): CurrentSession,
    Query(params): Query<ListParams>,
) -> ApiResult<Vec<PhoneNumber>> {
    Ok(Json(
        a004_phone_number::service::list_all(&ctx, params.cached).await?,
    ))
}

/// POST /api/a004-phone-number
pub async fn create(
    CurrentSession(ctx): CurrentSession,
    Json(request): Json<PhoneNumberCreateRequest>,
) -> ApiResult<PhoneNumber> {
    Ok(Json(a004_phone_number::service::create(&ctx, request).await?))
}

/// PATCH /api/a004-phone-number/:number
pub async fn update(
    CurrentSession(ctx): CurrentSession,
    Path(number): Path<String>,
    Json(request): Json<PhoneNumberUpdateRequest>,
) -> ApiResult<PhoneNumber> {
    Ok(Json(
        a004_phone_number::service::update(&ctx, &number, request).await?,
    ))
}

/// DELETE /api/a004-phone-number/:number
pub async fn delete(
    CurrentSession(ctx): CurrentSession,
    Path(number): Path<String>,
) -> Result<StatusCode, ApiError> {
    a004_phone_number::service::delete(&ctx, &number).await?;
    Ok(StatusCode::NO_CONTENT)
}
