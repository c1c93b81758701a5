//! Приведение инструментов из состояния формы к строгой схеме платформы.
//!
//! Выполняется синхронно перед сохранением LLM-конфигурации. Список
//! проверяется целиком: первая ошибка прерывает сохранение, частичный
//! список не формируется.

use super::tool_form::{
    KeyValuePair, LooseId, ParameterField, ParametersMode, SmsContentInput, ToolForm,
    TransferDestinationInput,
};
use super::tools::{
    default_method, default_speak_after_execution, AgentTransferTool, CalendarTool, CustomTool,
    EndCallTool, ExtractDynamicVariableTool, SendSmsTool, SmsContent, Tool, TransferCallTool,
    TransferDestination,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use thiserror::Error;

/// Значения, которые старые формы подставляли вместо отсутствующих полей
pub const PLACEHOLDER_TRANSFER_NUMBER: &str = "+10000000000";
pub const PLACEHOLDER_AGENT_ID: &str = "agent_id_placeholder";
pub const PLACEHOLDER_CAL_API_KEY: &str = "cal_api_key_placeholder";
pub const PLACEHOLDER_EVENT_TYPE_ID: i64 = 0;

/// Что делать с отсутствующими ключами и ID у встроенных инструментов
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceholderPolicy {
    /// Ошибка валидации
    #[default]
    Reject,
    /// Подставить заглушку (поведение старых форм) и сообщить об этом
    Fill,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ToolIssue {
    #[error("unknown tool type '{0}'")]
    UnknownType(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Ошибка валидации одного инструмента (с именем инструмента)
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Tool '{tool_name}' (#{position}): {issue}")]
pub struct ToolValidationError {
    pub tool_name: String,
    /// Позиция в списке, с 1
    pub position: usize,
    pub issue: ToolIssue,
}

/// Результат приведения одного инструмента
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedTool {
    pub tool: Tool,
    /// Поля, заполненные заглушками (только для `PlaceholderPolicy::Fill`)
    pub defaulted: Vec<&'static str>,
    payload: Value,
}

impl SanitizedTool {
    /// Тело инструмента для платформы, собранное при приведении
    pub fn payload(&self) -> Value {
        self.payload.clone()
    }
}

/// Проверить и привести весь список. Первая ошибка прерывает операцию.
pub fn sanitize_tools(
    forms: &[ToolForm],
    policy: PlaceholderPolicy,
) -> Result<Vec<SanitizedTool>, ToolValidationError> {
    forms
        .iter()
        .enumerate()
        .map(|(idx, form)| {
            sanitize_tool(form, policy).map_err(|issue| ToolValidationError {
                tool_name: tool_label(form, idx),
                position: idx + 1,
                issue,
            })
        })
        .collect()
}

fn tool_label(form: &ToolForm, idx: usize) -> String {
    let name = form.name.trim();
    if name.is_empty() {
        format!("tool #{}", idx + 1)
    } else {
        name.to_string()
    }
}

/// Привести один инструмент к схеме платформы
pub fn sanitize_tool(form: &ToolForm, policy: PlaceholderPolicy) -> Result<SanitizedTool, ToolIssue> {
    let mut defaulted = Vec::new();
    let name = form.name.trim().to_string();
    let description = non_empty(form.description.as_deref());

    let tool = match form.tool_type.trim() {
        "end_call" => Tool::EndCall(EndCallTool { name, description }),
        "transfer_call" => {
            let transfer_destination = match &form.transfer_destination {
                Some(TransferDestinationInput::Bare(number)) if !number.trim().is_empty() => {
                    TransferDestination::Predefined {
                        number: number.trim().to_string(),
                    }
                }
                Some(TransferDestinationInput::Structured(dest)) if destination_is_set(dest) => {
                    dest.clone()
                }
                _ => {
                    fill(policy, "transfer_destination", &mut defaulted)?;
                    TransferDestination::Predefined {
                        number: PLACEHOLDER_TRANSFER_NUMBER.to_string(),
                    }
                }
            };
            Tool::TransferCall(TransferCallTool {
                name,
                description,
                transfer_destination,
                transfer_option: form.transfer_option.clone().unwrap_or_default(),
            })
        }
        "agent_transfer" => {
            let agent_id = match non_empty(form.agent_id.as_deref()) {
                Some(id) => id,
                None => {
                    fill(policy, "agent_id", &mut defaulted)?;
                    PLACEHOLDER_AGENT_ID.to_string()
                }
            };
            Tool::AgentTransfer(AgentTransferTool {
                name,
                description,
                agent_id,
                post_call_analysis_setting: form.post_call_analysis_setting.unwrap_or_default(),
            })
        }
        kind @ ("check_availability_cal" | "book_appointment_cal") => {
            let calendar = calendar_tool(form, name, description, policy, &mut defaulted)?;
            if kind == "check_availability_cal" {
                Tool::CheckAvailabilityCal(calendar)
            } else {
                Tool::BookAppointmentCal(calendar)
            }
        }
        "send_sms" => {
            let sms_content = match &form.sms_content {
                Some(SmsContentInput::Bare(content)) if !content.trim().is_empty() => {
                    SmsContent::Predefined {
                        content: content.clone(),
                    }
                }
                Some(SmsContentInput::Structured(content)) if sms_content_is_set(content) => {
                    content.clone()
                }
                _ => return Err(ToolIssue::MissingField("sms_content")),
            };
            Tool::SendSms(SendSmsTool {
                name,
                description,
                sms_content,
            })
        }
        "extract_dynamic_variable" => {
            let description = description.ok_or(ToolIssue::MissingField("description"))?;
            let variables: Vec<_> = form
                .variables
                .iter()
                .filter(|v| !v.name.trim().is_empty())
                .cloned()
                .collect();
            if variables.is_empty() {
                return Err(ToolIssue::MissingField("variables"));
            }
            Tool::ExtractDynamicVariable(ExtractDynamicVariableTool {
                name,
                description,
                variables,
            })
        }
        "custom" => Tool::Custom(custom_tool(form, name, description)?),
        other => return Err(ToolIssue::UnknownType(other.to_string())),
    };

    let payload = tool.to_payload().map_err(|e| ToolIssue::InvalidField {
        field: "payload",
        reason: e.to_string(),
    })?;
    Ok(SanitizedTool {
        tool,
        defaulted,
        payload,
    })
}

fn sms_content_is_set(content: &SmsContent) -> bool {
    match content {
        SmsContent::Predefined { content } => !content.trim().is_empty(),
        SmsContent::Inferred { prompt } => !prompt.trim().is_empty(),
    }
}

fn fill(
    policy: PlaceholderPolicy,
    field: &'static str,
    defaulted: &mut Vec<&'static str>,
) -> Result<(), ToolIssue> {
    match policy {
        PlaceholderPolicy::Reject => Err(ToolIssue::MissingField(field)),
        PlaceholderPolicy::Fill => {
            defaulted.push(field);
            Ok(())
        }
    }
}

fn destination_is_set(dest: &TransferDestination) -> bool {
    match dest {
        TransferDestination::Predefined { number } => !number.trim().is_empty(),
        TransferDestination::Inferred { prompt } => !prompt.trim().is_empty(),
    }
}

fn calendar_tool(
    form: &ToolForm,
    name: String,
    description: Option<String>,
    policy: PlaceholderPolicy,
    defaulted: &mut Vec<&'static str>,
) -> Result<CalendarTool, ToolIssue> {
    let cal_api_key = match non_empty(form.cal_api_key.as_deref()) {
        Some(key) => key,
        None => {
            fill(policy, "cal_api_key", defaulted)?;
            PLACEHOLDER_CAL_API_KEY.to_string()
        }
    };

    let event_type_id = match &form.event_type_id {
        Some(LooseId::Number(id)) => *id,
        Some(LooseId::Text(text)) if !text.trim().is_empty() => {
            text.trim()
                .parse::<i64>()
                .map_err(|e| ToolIssue::InvalidField {
                    field: "event_type_id",
                    reason: e.to_string(),
                })?
        }
        _ => {
            fill(policy, "event_type_id", defaulted)?;
            PLACEHOLDER_EVENT_TYPE_ID
        }
    };

    Ok(CalendarTool {
        name,
        description,
        cal_api_key,
        event_type_id,
        timezone: non_empty(form.timezone.as_deref()),
    })
}

fn custom_tool(
    form: &ToolForm,
    name: String,
    description: Option<String>,
) -> Result<CustomTool, ToolIssue> {
    let url = non_empty(form.url.as_deref()).ok_or(ToolIssue::MissingField("url"))?;
    let description = description.ok_or(ToolIssue::MissingField("description"))?;

    let parameters = match form.parameters_mode {
        ParametersMode::Form => schema_from_fields(&form.parameter_fields),
        ParametersMode::Json => match &form.parameters {
            None | Some(Value::Null) => None,
            Some(Value::String(raw)) => schema_from_json_text(raw)?,
            Some(Value::Object(obj)) => Some(schema_from_object(obj.clone())),
            Some(_) => {
                return Err(ToolIssue::InvalidField {
                    field: "parameters",
                    reason: "expected a JSON object".into(),
                })
            }
        },
    };

    Ok(CustomTool {
        name,
        description,
        url: normalize_url(&url),
        method: non_empty(form.method.as_deref())
            .map(|m| m.to_uppercase())
            .unwrap_or_else(default_method),
        parameters,
        headers: pairs_to_map(&form.headers),
        query_params: pairs_to_map(&form.query_params),
        response_variables: pairs_to_map(&form.response_variables),
        speak_during_execution: form.speak_during_execution.unwrap_or(false),
        speak_after_execution: form
            .speak_after_execution
            .unwrap_or_else(default_speak_after_execution),
        execution_message_description: non_empty(form.execution_message_description.as_deref()),
        timeout_ms: form.timeout_ms,
    })
}

/// Голый хост получает `https://`
pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    let lower = url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    }
}

/// Список `{key, value}` в отображение; пустые ключи отбрасываются
pub fn pairs_to_map(pairs: &[KeyValuePair]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .filter(|p| !p.key.trim().is_empty())
        .map(|p| (p.key.trim().to_string(), p.value.clone()))
        .collect()
}

fn schema_from_json_text(raw: &str) -> Result<Option<Value>, ToolIssue> {
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let parsed: Value = serde_json::from_str(raw).map_err(|e| ToolIssue::InvalidField {
        field: "parameters",
        reason: format!("invalid JSON: {}", e),
    })?;
    match parsed {
        Value::Object(obj) => Ok(Some(schema_from_object(obj))),
        _ => Err(ToolIssue::InvalidField {
            field: "parameters",
            reason: "expected a JSON object".into(),
        }),
    }
}

/// Готовая схема дополняется `type`/`properties`/`required`; простой объект
/// `ключ: значение` превращается в схему по типам значений, все ключи обязательны.
fn schema_from_object(obj: Map<String, Value>) -> Value {
    if obj.contains_key("type") || obj.contains_key("properties") {
        let mut schema = obj;
        schema
            .entry("type")
            .or_insert_with(|| Value::String("object".into()));
        schema
            .entry("properties")
            .or_insert_with(|| Value::Object(Map::new()));
        schema
            .entry("required")
            .or_insert_with(|| Value::Array(vec![]));
        return Value::Object(schema);
    }

    let mut properties = Map::new();
    let mut required = Vec::with_capacity(obj.len());
    for (key, value) in obj {
        properties.insert(key.clone(), json!({ "type": json_schema_type(&value) }));
        required.push(Value::String(key));
    }
    json!({
        "type": "object",
        "properties": properties,
        "required": required,
    })
}

fn json_schema_type(value: &Value) -> &'static str {
    match value {
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
        Value::String(_) | Value::Null => "string",
    }
}

fn schema_from_fields(fields: &[ParameterField]) -> Option<Value> {
    let fields: Vec<_> = fields.iter().filter(|f| !f.name.trim().is_empty()).collect();
    if fields.is_empty() {
        return None;
    }

    let mut properties = Map::new();
    let mut required: Vec<Value> = Vec::new();
    for field in fields {
        let key = field.name.trim().to_string();
        let mut prop = Map::new();
        let field_type = if field.field_type.trim().is_empty() {
            "string"
        } else {
            field.field_type.trim()
        };
        prop.insert("type".into(), Value::String(field_type.to_string()));
        if let Some(desc) = non_empty(field.description.as_deref()) {
            prop.insert("description".into(), Value::String(desc));
        }
        if !field.enum_values.is_empty() {
            prop.insert(
                "enum".into(),
                Value::Array(field.enum_values.iter().cloned().map(Value::String).collect()),
            );
        }
        properties.insert(key.clone(), Value::Object(prop));

        let key_value = Value::String(key);
        if field.required && !required.contains(&key_value) {
            required.push(key_value);
        }
    }

    Some(json!({
        "type": "object",
        "properties": properties,
        "required": required,
    }))
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
