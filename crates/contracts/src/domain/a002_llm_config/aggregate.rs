use super::tools::PlatformTool;
use crate::domain::common::AggregateRoot;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Агрегат LLM Configuration ("мозг" агента)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LlmConfig {
    pub llm_id: String,

    /// Название модели
    #[serde(default)]
    pub model: Option<String>,

    /// Temperature (0.0-1.0)
    #[serde(default)]
    pub model_temperature: Option<f64>,

    /// Системный промпт
    #[serde(default)]
    pub general_prompt: Option<String>,

    /// Первая реплика агента
    #[serde(default)]
    pub begin_message: Option<String>,

    #[serde(default)]
    pub general_tools: Vec<PlatformTool>,

    #[serde(default)]
    pub knowledge_base_ids: Vec<String>,

    #[serde(default)]
    pub inbound_dynamic_variables_webhook_url: Option<String>,

    #[serde(default)]
    pub last_modification_timestamp: Option<i64>,
}

impl AggregateRoot for LlmConfig {
    fn id(&self) -> &str {
        &self.llm_id
    }

    fn display_name(&self) -> &str {
        self.model.as_deref().unwrap_or(&self.llm_id)
    }

    fn aggregate_index() -> &'static str {
        "a002"
    }

    fn collection_name() -> &'static str {
        "llm_config"
    }

    fn element_name() -> &'static str {
        "LLM configuration"
    }

    fn list_name() -> &'static str {
        "LLM configurations"
    }
}

/// Тело запроса создания/обновления LLM-конфигурации.
/// Инструменты уже приведены к схеме платформы.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LlmConfigRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub begin_message: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub general_tools: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_dynamic_variables_webhook_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_llm_config_reads_tool_list() {
        let config: LlmConfig = serde_json::from_value(json!({
            "llm_id": "llm_1",
            "model": "gpt-4o",
            "general_tools": [
                {"type": "end_call", "name": "end_call"},
                {
                    "type": "check_availability_cal",
                    "name": "availability",
                    "cal_api_key": "cal_live_1",
                    "event_type_id": 7
                }
            ]
        }))
        .unwrap();

        assert_eq!(config.general_tools.len(), 2);
        assert_eq!(config.general_tools[1].type_name(), "check_availability_cal");
        assert_eq!(config.display_name(), "gpt-4o");
    }

    #[test]
    fn test_request_omits_unset_fields() {
        let req = LlmConfigRequest {
            general_prompt: Some("You are a receptionist".into()),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"general_prompt": "You are a receptionist"})
        );
    }

    #[test]
    fn test_list_survives_unknown_tool_type() {
        let configs: Vec<LlmConfig> = serde_json::from_value(json!([
            {
                "llm_id": "llm_1",
                "general_tools": [{"type": "end_call", "name": "end_call"}]
            },
            {
                "llm_id": "llm_2",
                "general_tools": [
                    {"type": "end_call", "name": "end_call"},
                    {"type": "press_digit", "name": "ivr", "delay_ms": 500}
                ]
            }
        ]))
        .unwrap();

        assert_eq!(configs.len(), 2);
        let tools = &configs[1].general_tools;
        assert!(tools[0].known().is_some());
        assert!(tools[1].known().is_none());
        assert_eq!(tools[1].type_name(), "press_digit");
    }
}
