//! Строгая схема инструментов LLM-конфигурации в том виде, в каком её
//! принимает платформа. Один вариант на каждый `type`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Инструмент, доступный LLM во время звонка
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Tool {
    EndCall(EndCallTool),
    TransferCall(TransferCallTool),
    AgentTransfer(AgentTransferTool),
    CheckAvailabilityCal(CalendarTool),
    BookAppointmentCal(CalendarTool),
    SendSms(SendSmsTool),
    ExtractDynamicVariable(ExtractDynamicVariableTool),
    Custom(CustomTool),
}

impl Tool {
    /// Значение дискриминатора `type`
    pub fn type_name(&self) -> &'static str {
        match self {
            Tool::EndCall(_) => "end_call",
            Tool::TransferCall(_) => "transfer_call",
            Tool::AgentTransfer(_) => "agent_transfer",
            Tool::CheckAvailabilityCal(_) => "check_availability_cal",
            Tool::BookAppointmentCal(_) => "book_appointment_cal",
            Tool::SendSms(_) => "send_sms",
            Tool::ExtractDynamicVariable(_) => "extract_dynamic_variable",
            Tool::Custom(_) => "custom",
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Tool::EndCall(t) => &t.name,
            Tool::TransferCall(t) => &t.name,
            Tool::AgentTransfer(t) => &t.name,
            Tool::CheckAvailabilityCal(t) | Tool::BookAppointmentCal(t) => &t.name,
            Tool::SendSms(t) => &t.name,
            Tool::ExtractDynamicVariable(t) => &t.name,
            Tool::Custom(t) => &t.name,
        }
    }

    /// JSON для отправки на платформу: без null и пустых строк
    /// (кроме `name` и `type`).
    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        Ok(match serde_json::to_value(self)? {
            Value::Object(map) => Value::Object(compact(map)),
            other => other,
        })
    }
}

/// Инструмент из ответа платформы. Типы, которых нет в `Tool`, хранятся
/// как есть и при повторном сохранении отправляются без изменений.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PlatformTool {
    Known(Tool),
    Unknown(Value),
}

impl PlatformTool {
    pub fn type_name(&self) -> &str {
        match self {
            PlatformTool::Known(tool) => tool.type_name(),
            PlatformTool::Unknown(value) => value
                .get("type")
                .and_then(Value::as_str)
                .unwrap_or("unknown"),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            PlatformTool::Known(tool) => tool.name(),
            PlatformTool::Unknown(value) => {
                value.get("name").and_then(Value::as_str).unwrap_or_default()
            }
        }
    }

    pub fn known(&self) -> Option<&Tool> {
        match self {
            PlatformTool::Known(tool) => Some(tool),
            PlatformTool::Unknown(_) => None,
        }
    }

    pub fn to_payload(&self) -> Result<Value, serde_json::Error> {
        match self {
            PlatformTool::Known(tool) => tool.to_payload(),
            PlatformTool::Unknown(value) => Ok(value.clone()),
        }
    }
}

impl From<Tool> for PlatformTool {
    fn from(tool: Tool) -> Self {
        PlatformTool::Known(tool)
    }
}

const KEPT_WHEN_EMPTY: [&str; 2] = ["name", "type"];

fn compact(map: Map<String, Value>) -> Map<String, Value> {
    map.into_iter()
        .filter(|(key, value)| {
            if KEPT_WHEN_EMPTY.contains(&key.as_str()) {
                return true;
            }
            match value {
                Value::Null => false,
                Value::String(s) => !s.is_empty(),
                _ => true,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndCallTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

// ─── transfer_call ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransferCallTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub transfer_destination: TransferDestination,
    pub transfer_option: TransferOption,
}

/// Куда переводить звонок
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferDestination {
    /// Фиксированный номер
    Predefined { number: String },
    /// Номер определяет LLM по подсказке
    Inferred { prompt: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransferOption {
    ColdTransfer {
        #[serde(default)]
        show_transferee_as_caller: bool,
    },
    WarmTransfer {
        #[serde(default)]
        show_transferee_as_caller: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        public_handoff_message: Option<String>,
    },
}

impl Default for TransferOption {
    fn default() -> Self {
        TransferOption::ColdTransfer {
            show_transferee_as_caller: false,
        }
    }
}

// ─── agent_transfer ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentTransferTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub agent_id: String,
    pub post_call_analysis_setting: PostCallAnalysisSetting,
}

/// Чей звонок анализировать после передачи другому агенту
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostCallAnalysisSetting {
    #[default]
    BothAgents,
    OnlyDestinationAgent,
}

// ─── Cal.com ─────────────────────────────────────────────────────────────────

/// Общая форма для `check_availability_cal` и `book_appointment_cal`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalendarTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cal_api_key: String,
    pub event_type_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timezone: Option<String>,
}

// ─── send_sms ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendSmsTool {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub sms_content: SmsContent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SmsContent {
    Predefined { content: String },
    Inferred { prompt: String },
}

// ─── extract_dynamic_variable ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractDynamicVariableTool {
    pub name: String,
    pub description: String,
    pub variables: Vec<DynamicVariable>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicVariable {
    #[serde(rename = "type")]
    pub kind: DynamicVariableKind,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DynamicVariableKind {
    #[default]
    String,
    Enum,
    Boolean,
    Number,
}

// ─── custom ──────────────────────────────────────────────────────────────────

/// Пользовательский HTTP-инструмент
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomTool {
    pub name: String,
    pub description: String,
    pub url: String,

    #[serde(default = "default_method")]
    pub method: String,

    /// JSON Schema: `{type: "object", properties, required}`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Value>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub headers: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub query_params: BTreeMap<String, String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub response_variables: BTreeMap<String, String>,

    #[serde(default)]
    pub speak_during_execution: bool,

    #[serde(default = "default_speak_after_execution")]
    pub speak_after_execution: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_message_description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

pub(crate) fn default_method() -> String {
    "POST".to_string()
}

pub(crate) fn default_speak_after_execution() -> bool {
    true
}
