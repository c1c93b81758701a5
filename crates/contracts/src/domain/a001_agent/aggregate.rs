use crate::domain::common::AggregateRoot;
use serde::{Deserialize, Serialize};

/// Тип движка ответов для LLM-конфигурации платформы
pub const RESPONSE_ENGINE_LLM: &str = "retell-llm";

/// Ссылка агента на движок ответов ("мозг")
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseEngine {
    #[serde(rename = "type")]
    pub engine_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub llm_id: Option<String>,
}

impl ResponseEngine {
    /// Ссылка на LLM-конфигурацию по её ID
    pub fn llm(llm_id: impl Into<String>) -> Self {
        Self {
            engine_type: RESPONSE_ENGINE_LLM.to_string(),
            llm_id: Some(llm_id.into()),
        }
    }
}

/// Агрегат Agent (зеркало агента на голосовой платформе)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub agent_id: String,

    #[serde(default)]
    pub agent_name: Option<String>,

    /// Голос
    pub voice_id: String,

    #[serde(default)]
    pub voice_temperature: Option<f64>,

    #[serde(default)]
    pub voice_speed: Option<f64>,

    #[serde(default)]
    pub language: Option<String>,

    /// Ровно одна LLM-конфигурация в каждый момент времени
    pub response_engine: ResponseEngine,

    #[serde(default)]
    pub knowledge_base_ids: Vec<String>,

    #[serde(default)]
    pub webhook_url: Option<String>,

    /// Unix-время последнего изменения, мс
    #[serde(default)]
    pub last_modification_timestamp: Option<i64>,
}

impl Agent {
    /// ID LLM-конфигурации, на которую ссылается агент
    pub fn llm_id(&self) -> Option<&str> {
        self.response_engine.llm_id.as_deref()
    }
}

impl AggregateRoot for Agent {
    fn id(&self) -> &str {
        &self.agent_id
    }

    fn display_name(&self) -> &str {
        self.agent_name
            .as_deref()
            .filter(|n| !n.trim().is_empty())
            .unwrap_or(&self.agent_id)
    }

    fn aggregate_index() -> &'static str {
        "a001"
    }

    fn collection_name() -> &'static str {
        "agent"
    }

    fn element_name() -> &'static str {
        "Agent"
    }

    fn list_name() -> &'static str {
        "Agents"
    }
}

/// Запрос на создание агента
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentCreateRequest {
    pub response_engine: ResponseEngine,
    pub voice_id: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub knowledge_base_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl AgentCreateRequest {
    /// Локальная проверка перед отправкой. Существование LLM проверяет платформа.
    pub fn validate(&self) -> Result<(), String> {
        let llm_id = self.response_engine.llm_id.as_deref().unwrap_or("");
        if llm_id.trim().is_empty() {
            return Err("LLM configuration is required".into());
        }
        if self.voice_id.trim().is_empty() {
            return Err("Voice is required".into());
        }
        validate_voice_settings(self.voice_temperature, self.voice_speed)
    }
}

/// Частичное обновление агента (PATCH). Пустые поля не отправляются.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AgentPatchRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_engine: Option<ResponseEngine>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_temperature: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_speed: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub knowledge_base_ids: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
}

impl AgentPatchRequest {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.is_empty() {
            return Err("Nothing to update".into());
        }
        if let Some(engine) = &self.response_engine {
            if engine.llm_id.as_deref().unwrap_or("").trim().is_empty() {
                return Err("LLM configuration is required".into());
            }
        }
        if matches!(self.voice_id.as_deref(), Some(v) if v.trim().is_empty()) {
            return Err("Voice is required".into());
        }
        validate_voice_settings(self.voice_temperature, self.voice_speed)
    }
}

fn validate_voice_settings(temperature: Option<f64>, speed: Option<f64>) -> Result<(), String> {
    if let Some(t) = temperature {
        if !(0.0..=2.0).contains(&t) {
            return Err("Voice temperature must be in range 0.0-2.0".into());
        }
    }
    if let Some(s) = speed {
        if !(0.5..=2.0).contains(&s) {
            return Err("Voice speed must be in range 0.5-2.0".into());
        }
    }
    Ok(())
}
