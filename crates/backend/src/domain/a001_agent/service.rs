use contracts::domain::a001_agent::aggregate::{Agent, AgentCreateRequest, AgentPatchRequest};

use crate::shared::session::SessionContext;
use crate::shared::voice_platform::PlatformError;

/// Список агентов. При `cached` и загруженном зеркале запрос не выполняется.
pub async fn list_all(ctx: &SessionContext, cached: bool) -> Result<Vec<Agent>, PlatformError> {
    if cached {
        let mirror = ctx.mirror.lock().await;
        if mirror.agents.is_loaded() {
            return Ok(mirror.agents.items().to_vec());
        }
    }

    let agents = ctx.api.list_agents().await?;
    ctx.mirror.lock().await.agents.replace_all(agents.clone());
    Ok(agents)
}

pub async fn get_by_id(ctx: &SessionContext, id: &str) -> Result<Agent, PlatformError> {
    ctx.api.get_agent(id).await
}

/// Создание агента
pub async fn create(ctx: &SessionContext, request: AgentCreateRequest) -> Result<Agent, PlatformError> {
    request.validate().map_err(PlatformError::Validation)?;

    let agent = ctx.api.create_agent(&request).await?;
    tracing::info!("Agent created: {}", agent.agent_id);
    ctx.mirror.lock().await.agents.upsert(agent.clone());
    Ok(agent)
}

/// Частичное обновление (имя, голос, LLM, базы знаний)
pub async fn update(
    ctx: &SessionContext,
    id: &str,
    patch: AgentPatchRequest,
) -> Result<Agent, PlatformError> {
    patch.validate().map_err(PlatformError::Validation)?;

    let agent = ctx.api.update_agent(id, &patch).await?;
    ctx.mirror.lock().await.agents.upsert(agent.clone());
    Ok(agent)
}

/// Один запрос на удаление, затем из зеркала убирается ровно этот id
pub async fn delete(ctx: &SessionContext, id: &str) -> Result<(), PlatformError> {
    ctx.api.delete_agent(id).await?;
    ctx.mirror.lock().await.agents.remove(id);
    tracing::info!("Agent deleted: {}", id);
    Ok(())
}
