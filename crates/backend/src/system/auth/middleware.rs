use axum::{body::Body, extract::Request, middleware::Next, response::Response};

use crate::api::error::ApiError;
use crate::shared::session::PlatformSession;

/// Middleware that requires a platform bearer token
pub async fn require_session(mut req: Request<Body>, next: Next) -> Result<Response, ApiError> {
    let token = bearer_token(&req).ok_or_else(|| {
        ApiError::new(
            axum::http::StatusCode::UNAUTHORIZED,
            "Missing or invalid Authorization header",
        )
    })?;

    // Add session to request extensions for use in handlers
    let session = PlatformSession::new(token);
    req.extensions_mut().insert(session);

    Ok(next.run(req).await)
}

fn bearer_token(req: &Request<Body>) -> Option<String> {
    let auth_header = req
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}
