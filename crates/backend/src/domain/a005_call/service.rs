use contracts::domain::a005_call::aggregate::{
    Call, CallListRequest, PhoneCallCreateRequest, WebCallCreateRequest, WebCallResponse,
};
use std::sync::Arc;
use std::time::Duration;

use super::watch::{CallWatchRegistry, CallWatchSnapshot};
use crate::shared::session::SessionContext;
use crate::shared::voice_platform::PlatformError;

/// Web-звонок: платформа возвращает access token для голосового SDK
pub async fn create_web_call(
    ctx: &SessionContext,
    request: WebCallCreateRequest,
) -> Result<WebCallResponse, PlatformError> {
    if request.agent_id.trim().is_empty() {
        return Err(PlatformError::Validation("Agent is required".into()));
    }

    let response = ctx.api.create_web_call(&request).await?;
    tracing::info!("Web call registered: {}", response.call_id);
    Ok(response)
}

/// Исходящий звонок; сразу после создания запускается наблюдение за статусом
pub async fn create_phone_call(
    ctx: &SessionContext,
    watches: &Arc<CallWatchRegistry>,
    request: PhoneCallCreateRequest,
    interval: Duration,
) -> Result<Call, PlatformError> {
    request.validate().map_err(PlatformError::Validation)?;

    let call = ctx.api.create_phone_call(&request).await?;
    tracing::info!(
        "Phone call {} started: {} -> {}",
        call.call_id,
        request.from_number,
        request.to_number
    );
    watches.start(ctx.api.clone(), ctx.key.clone(), call.clone(), interval);
    Ok(call)
}

pub async fn get_by_id(ctx: &SessionContext, call_id: &str) -> Result<Call, PlatformError> {
    ctx.api.get_call(call_id).await
}

pub async fn list(ctx: &SessionContext, request: CallListRequest) -> Result<Vec<Call>, PlatformError> {
    ctx.api.list_calls(&request.normalized()).await
}

pub async fn end_call(ctx: &SessionContext, call_id: &str) -> Result<(), PlatformError> {
    ctx.api.end_call(call_id).await?;
    tracing::info!("End requested for call {}", call_id);
    Ok(())
}

/// Снимок наблюдения; если его нет, звонок запрашивается и опрос запускается
pub async fn watch(
    ctx: &SessionContext,
    watches: &Arc<CallWatchRegistry>,
    call_id: &str,
    interval: Duration,
) -> Result<CallWatchSnapshot, PlatformError> {
    if let Some(snapshot) = watches.snapshot(&ctx.key, call_id) {
        return Ok(snapshot);
    }

    let call = ctx.api.get_call(call_id).await?;
    Ok(watches.start(ctx.api.clone(), ctx.key.clone(), call, interval))
}

pub fn stop_watch(
    ctx: &SessionContext,
    watches: &CallWatchRegistry,
    call_id: &str,
) -> Result<CallWatchSnapshot, PlatformError> {
    watches.cancel(&ctx.key, call_id).ok_or_else(|| PlatformError::Api {
        status: 404,
        message: format!("Call {} is not being watched", call_id),
    })
}
