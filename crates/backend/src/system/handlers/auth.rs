use axum::{extract::Json, http::StatusCode, Extension};
use contracts::system::auth::{AuthResponse, LoginRequest, SignupRequest};

use crate::api::error::ApiError;
use crate::domain::a005_call::watch::CALL_WATCHES;
use crate::shared::account::AccountClient;
use crate::shared::mirror::MIRROR_STORE;
use crate::shared::session::PlatformSession;

/// Login handler
pub async fn login(Json(request): Json<LoginRequest>) -> Result<Json<AuthResponse>, ApiError> {
    let response = AccountClient::from_config().login(&request).await?;
    tracing::info!("User logged in: {}", response.user.email);
    Ok(Json(response))
}

/// Signup handler
pub async fn signup(Json(request): Json<SignupRequest>) -> Result<Json<AuthResponse>, ApiError> {
    let response = AccountClient::from_config().signup(&request).await?;
    tracing::info!("User signed up: {}", response.user.email);
    Ok(Json(response))
}

/// Logout handler: forget mirrored lists and call watches of this token
pub async fn logout(Extension(session): Extension<PlatformSession>) -> StatusCode {
    let key = session.key();
    MIRROR_STORE.drop_session(&key).await;
    let watches = CALL_WATCHES.drop_session(&key);
    tracing::info!(
        "Session {} logged out ({} call watches stopped)",
        key.short(),
        watches
    );
    StatusCode::NO_CONTENT
}
