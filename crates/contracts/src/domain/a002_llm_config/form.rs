use super::aggregate::{LlmConfig, LlmConfigRequest};
use super::sanitizer::{sanitize_tools, PlaceholderPolicy, ToolValidationError};
use super::tool_form::ToolForm;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LlmConfigFormError {
    #[error(transparent)]
    Tool(#[from] ToolValidationError),

    #[error("Temperature must be in range 0.0-1.0, got {0}")]
    InvalidTemperature(f64),
}

/// Состояние формы редактирования LLM-конфигурации
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfigForm {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub model_temperature: Option<f64>,
    #[serde(default)]
    pub general_prompt: Option<String>,
    #[serde(default)]
    pub begin_message: Option<String>,
    #[serde(default)]
    pub knowledge_base_ids: Vec<String>,
    #[serde(default)]
    pub inbound_dynamic_variables_webhook_url: Option<String>,
    #[serde(default)]
    pub tools: Vec<ToolForm>,
    /// Инструменты платформы, которых нет в редакторе; сохраняются без изменений
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub passthrough_tools: Vec<Value>,
}

/// Готовый к отправке запрос и список полей, заполненных заглушками
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedLlmConfig {
    pub request: LlmConfigRequest,
    /// `(имя инструмента, поле)`
    pub defaulted: Vec<(String, &'static str)>,
}

impl LlmConfigForm {
    /// Загрузить существующую конфигурацию в форму
    pub fn from_config(config: &LlmConfig) -> Self {
        Self {
            model: config.model.clone(),
            model_temperature: config.model_temperature,
            general_prompt: config.general_prompt.clone(),
            begin_message: config.begin_message.clone(),
            knowledge_base_ids: config.knowledge_base_ids.clone(),
            inbound_dynamic_variables_webhook_url: config
                .inbound_dynamic_variables_webhook_url
                .clone(),
            tools: config
                .general_tools
                .iter()
                .filter_map(|t| t.known())
                .map(ToolForm::from)
                .collect(),
            passthrough_tools: config
                .general_tools
                .iter()
                .filter(|t| t.known().is_none())
                .filter_map(|t| t.to_payload().ok())
                .collect(),
        }
    }

    /// Валидация и приведение формы к запросу. Ошибка в любом инструменте
    /// отменяет сохранение целиком.
    pub fn prepare(&self, policy: PlaceholderPolicy) -> Result<PreparedLlmConfig, LlmConfigFormError> {
        if let Some(t) = self.model_temperature {
            if !(0.0..=1.0).contains(&t) {
                return Err(LlmConfigFormError::InvalidTemperature(t));
            }
        }

        let sanitized = sanitize_tools(&self.tools, policy)?;

        let defaulted = sanitized
            .iter()
            .flat_map(|s| {
                s.defaulted
                    .iter()
                    .map(move |field| (s.tool.name().to_string(), *field))
            })
            .collect();

        let request = LlmConfigRequest {
            model: trimmed(&self.model),
            model_temperature: self.model_temperature,
            general_prompt: trimmed(&self.general_prompt),
            begin_message: trimmed(&self.begin_message),
            general_tools: Some(
                sanitized
                    .iter()
                    .map(|s| s.payload())
                    .chain(self.passthrough_tools.iter().cloned())
                    .collect(),
            ),
            knowledge_base_ids: Some(
                self.knowledge_base_ids
                    .iter()
                    .map(|id| id.trim())
                    .filter(|id| !id.is_empty())
                    .map(str::to_string)
                    .collect(),
            ),
            inbound_dynamic_variables_webhook_url: trimmed(
                &self.inbound_dynamic_variables_webhook_url,
            ),
        };

        Ok(PreparedLlmConfig { request, defaulted })
    }
}

fn trimmed(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
