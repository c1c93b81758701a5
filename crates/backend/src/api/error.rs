use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::shared::voice_platform::PlatformError;

/// Ошибка обработчика: `{ "error": message }` с HTTP-статусом
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<PlatformError> for ApiError {
    fn from(e: PlatformError) -> Self {
        let status = match &e {
            PlatformError::Validation(_) => StatusCode::BAD_REQUEST,
            PlatformError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            // 4xx платформы отдаём как есть, остальное считается ошибкой шлюза
            PlatformError::Api { status, .. } => StatusCode::from_u16(*status)
                .ok()
                .filter(StatusCode::is_client_error)
                .unwrap_or(StatusCode::BAD_GATEWAY),
            PlatformError::Network(_) | PlatformError::Decode(_) => StatusCode::BAD_GATEWAY,
        };
        if status.is_server_error() {
            tracing::error!("Voice platform request failed: {}", e);
        }
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

pub type ApiResult<T> = Result<Json<T>, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(e: PlatformError) -> StatusCode {
        ApiError::from(e).status
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(PlatformError::Validation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status_of(PlatformError::Unauthorized("x".into())), StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_of(PlatformError::Api { status: 404, message: "x".into() }),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            status_of(PlatformError::Api { status: 422, message: "x".into() }),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            status_of(PlatformError::Api { status: 500, message: "x".into() }),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(status_of(PlatformError::Network("x".into())), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_message_is_kept() {
        let err = ApiError::from(PlatformError::Api {
            status: 400,
            message: "voice_id is invalid".into(),
        });
        assert_eq!(err.message, "voice_id is invalid");
    }
}
