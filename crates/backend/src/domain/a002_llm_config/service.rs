use contracts::domain::a002_llm_config::aggregate::LlmConfig;
use contracts::domain::a002_llm_config::form::{LlmConfigForm, LlmConfigFormError, PreparedLlmConfig};
use contracts::domain::a002_llm_config::sanitizer::{sanitize_tools, PlaceholderPolicy};
use contracts::domain::a002_llm_config::tool_form::ToolForm;
use serde::Serialize;

use crate::shared::session::SessionContext;
use crate::shared::voice_platform::PlatformError;

/// Результат сохранения: конфигурация с платформы и поля, заполненные заглушками
#[derive(Debug, Clone, Serialize)]
pub struct LlmConfigSaved {
    #[serde(flatten)]
    pub config: LlmConfig,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub defaulted_fields: Vec<String>,
}

/// Результат пробной санитизации
#[derive(Debug, Clone, Serialize)]
pub struct SanitizePreview {
    pub general_tools: Vec<serde_json::Value>,
    pub defaulted_fields: Vec<String>,
}

impl From<LlmConfigFormError> for PlatformError {
    fn from(e: LlmConfigFormError) -> Self {
        PlatformError::Validation(e.to_string())
    }
}

pub async fn list_all(ctx: &SessionContext, cached: bool) -> Result<Vec<LlmConfig>, PlatformError> {
    if cached {
        let mirror = ctx.mirror.lock().await;
        if mirror.llm_configs.is_loaded() {
            return Ok(mirror.llm_configs.items().to_vec());
        }
    }

    let configs = ctx.api.list_llm_configs().await?;
    ctx.mirror.lock().await.llm_configs.replace_all(configs.clone());
    Ok(configs)
}

pub async fn get_by_id(ctx: &SessionContext, id: &str) -> Result<LlmConfig, PlatformError> {
    ctx.api.get_llm_config(id).await
}

/// Форма редактирования для существующей конфигурации
pub async fn get_form(ctx: &SessionContext, id: &str) -> Result<LlmConfigForm, PlatformError> {
    let config = ctx.api.get_llm_config(id).await?;
    Ok(LlmConfigForm::from_config(&config))
}

fn prepare(form: &LlmConfigForm, policy: PlaceholderPolicy) -> Result<PreparedLlmConfig, PlatformError> {
    let prepared = form.prepare(policy)?;
    for (tool, field) in &prepared.defaulted {
        tracing::warn!(
            "Tool '{}': field '{}' was empty and got a placeholder value",
            tool,
            field
        );
    }
    Ok(prepared)
}

fn defaulted_fields(prepared: &PreparedLlmConfig) -> Vec<String> {
    prepared
        .defaulted
        .iter()
        .map(|(tool, field)| format!("{}.{}", tool, field))
        .collect()
}

/// Создание: все инструменты проходят санитизацию, иначе запрос не отправляется
pub async fn create(
    ctx: &SessionContext,
    form: LlmConfigForm,
    policy: PlaceholderPolicy,
) -> Result<LlmConfigSaved, PlatformError> {
    let prepared = prepare(&form, policy)?;

    let config = ctx.api.create_llm_config(&prepared.request).await?;
    tracing::info!(
        "LLM config created: {} ({} tools)",
        config.llm_id,
        config.general_tools.len()
    );
    ctx.mirror.lock().await.llm_configs.upsert(config.clone());

    Ok(LlmConfigSaved {
        defaulted_fields: defaulted_fields(&prepared),
        config,
    })
}

pub async fn update(
    ctx: &SessionContext,
    id: &str,
    form: LlmConfigForm,
    policy: PlaceholderPolicy,
) -> Result<LlmConfigSaved, PlatformError> {
    let prepared = prepare(&form, policy)?;

    let config = ctx.api.update_llm_config(id, &prepared.request).await?;
    ctx.mirror.lock().await.llm_configs.upsert(config.clone());

    Ok(LlmConfigSaved {
        defaulted_fields: defaulted_fields(&prepared),
        config,
    })
}

pub async fn delete(ctx: &SessionContext, id: &str) -> Result<(), PlatformError> {
    ctx.api.delete_llm_config(id).await?;
    ctx.mirror.lock().await.llm_configs.remove(id);
    tracing::info!("LLM config deleted: {}", id);
    Ok(())
}

/// Санитизация без отправки (предпросмотр в редакторе инструментов)
pub fn sanitize_preview(
    tools: &[ToolForm],
    policy: PlaceholderPolicy,
) -> Result<SanitizePreview, PlatformError> {
    let sanitized =
        sanitize_tools(tools, policy).map_err(|e| PlatformError::Validation(e.to_string()))?;

    Ok(SanitizePreview {
        general_tools: sanitized.iter().map(|s| s.payload()).collect(),
        defaulted_fields: sanitized
            .iter()
            .flat_map(|s| {
                s.defaulted
                    .iter()
                    .map(move |field| format!("{}.{}", s.tool.name(), field))
            })
            .collect(),
    })
}
