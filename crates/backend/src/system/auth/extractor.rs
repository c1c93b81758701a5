use axum::{async_trait, extract::FromRequestParts, http::request::Parts};

use crate::api::error::ApiError;
use crate::shared::session::{PlatformSession, SessionContext};

/// Extractor for the session context of the current request
/// Usage in handlers: `async fn handler(CurrentSession(ctx): CurrentSession) -> Response`
pub struct CurrentSession(pub SessionContext);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentSession
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // PlatformSession is set by require_session middleware
        let session = parts
            .extensions
            .get::<PlatformSession>()
            .cloned()
            .ok_or_else(|| {
                ApiError::new(axum::http::StatusCode::UNAUTHORIZED, "Not authenticated")
            })?;

        Ok(CurrentSession(SessionContext::for_session(&session).await))
    }
}
