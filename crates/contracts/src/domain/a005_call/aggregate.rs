use crate::domain::common::AggregateRoot;
use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Статус звонка. Переходы выполняет только платформа.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Registered,
    Ongoing,
    Ended,
    Error,
}

impl CallStatus {
    /// После `ended` и `error` статус больше не меняется
    pub fn is_terminal(&self) -> bool {
        matches!(self, CallStatus::Ended | CallStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CallStatus::Registered => "registered",
            CallStatus::Ongoing => "ongoing",
            CallStatus::Ended => "ended",
            CallStatus::Error => "error",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    WebCall,
    PhoneCall,
}

/// Анализ звонка после завершения
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallAnalysis {
    #[serde(default)]
    pub call_summary: Option<String>,
    #[serde(default)]
    pub user_sentiment: Option<String>,
    #[serde(default)]
    pub call_successful: Option<bool>,
    #[serde(default)]
    pub in_voicemail: Option<bool>,
    #[serde(default)]
    pub custom_analysis_data: Option<Value>,
}

/// Агрегат Call (только чтение)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Call {
    pub call_id: String,

    #[serde(default)]
    pub call_type: Option<CallType>,

    pub agent_id: String,

    pub call_status: CallStatus,

    #[serde(default)]
    pub from_number: Option<String>,

    #[serde(default)]
    pub to_number: Option<String>,

    #[serde(default)]
    pub transcript: Option<String>,

    #[serde(default)]
    pub call_analysis: Option<CallAnalysis>,

    #[serde(default)]
    pub recording_url: Option<String>,

    /// Unix-время, мс
    #[serde(default)]
    pub start_timestamp: Option<i64>,

    #[serde(default)]
    pub end_timestamp: Option<i64>,

    #[serde(default)]
    pub disconnection_reason: Option<String>,
}

impl Call {
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.start_timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    pub fn ended_at(&self) -> Option<DateTime<Utc>> {
        self.end_timestamp
            .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
    }

    /// Длительность звонка, мс (только для завершённых)
    pub fn duration_ms(&self) -> Option<i64> {
        match (self.start_timestamp, self.end_timestamp) {
            (Some(start), Some(end)) if end >= start => Some(end - start),
            _ => None,
        }
    }
}

impl AggregateRoot for Call {
    fn id(&self) -> &str {
        &self.call_id
    }

    fn display_name(&self) -> &str {
        &self.call_id
    }

    fn aggregate_index() -> &'static str {
        "a005"
    }

    fn collection_name() -> &'static str {
        "call"
    }

    fn element_name() -> &'static str {
        "Call"
    }

    fn list_name() -> &'static str {
        "Calls"
    }
}

// ============================================================================
// Запросы
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCallCreateRequest {
    pub agent_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Value>,
}

/// Ответ на создание web-звонка: токен для голосового SDK в браузере
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebCallResponse {
    pub call_id: String,
    pub access_token: String,
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub call_status: Option<CallStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneCallCreateRequest {
    pub from_number: String,
    pub to_number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub override_agent_id: Option<String>,
}

impl PhoneCallCreateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !is_e164(&self.from_number) {
            return Err(format!("Invalid caller number: {}", self.from_number));
        }
        if !is_e164(&self.to_number) {
            return Err(format!("Invalid destination number: {}", self.to_number));
        }
        Ok(())
    }
}

/// `+` и от 8 до 15 цифр
fn is_e164(number: &str) -> bool {
    match number.strip_prefix('+') {
        Some(digits) => {
            (8..=15).contains(&digits.len()) && digits.chars().all(|c| c.is_ascii_digit())
        }
        None => false,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CallFilter {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub agent_id: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_status: Vec<CallStatus>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub call_type: Vec<CallType>,
}

impl CallFilter {
    pub fn is_empty(&self) -> bool {
        self.agent_id.is_empty() && self.call_status.is_empty() && self.call_type.is_empty()
    }
}

pub const DEFAULT_CALL_LIST_LIMIT: u32 = 50;
pub const MAX_CALL_LIST_LIMIT: u32 = 1000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallListRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_criteria: Option<CallFilter>,
    #[serde(default)]
    pub sort_order: SortOrder,
    #[serde(default = "default_limit")]
    pub limit: u32,
}

fn default_limit() -> u32 {
    DEFAULT_CALL_LIST_LIMIT
}

impl Default for CallListRequest {
    fn default() -> Self {
        Self {
            filter_criteria: None,
            sort_order: SortOrder::default(),
            limit: DEFAULT_CALL_LIST_LIMIT,
        }
    }
}

impl CallListRequest {
    /// Ограничить limit и убрать пустой фильтр
    pub fn normalized(mut self) -> Self {
        self.limit = self.limit.clamp(1, MAX_CALL_LIST_LIMIT);
        if self.filter_criteria.as_ref().is_some_and(CallFilter::is_empty) {
            self.filter_criteria = None;
        }
        self
    }
}
