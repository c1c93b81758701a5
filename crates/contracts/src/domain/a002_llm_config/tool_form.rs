//! Редактируемое представление инструмента в форме dashboard.
//!
//! Форма допускает "сырые" значения: номер перевода строкой, параметры
//! JSON-текстом или списком полей, заголовки списком пар `{key, value}`.
//! Перед сохранением форма проходит через [`super::sanitizer`].

use super::tools::{
    DynamicVariable, PostCallAnalysisSetting, SmsContent, Tool, TransferDestination,
    TransferOption,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Пара ключ-значение из табличного редактора
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KeyValuePair {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: String,
}

impl KeyValuePair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Переключатель способа ввода параметров custom-инструмента
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParametersMode {
    #[default]
    Json,
    Form,
}

/// Одно поле параметров в режиме формы
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterField {
    #[serde(default)]
    pub name: String,
    /// string | number | integer | boolean | array | object
    #[serde(rename = "type", default = "default_field_type")]
    pub field_type: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub required: bool,
    #[serde(default, rename = "enum")]
    pub enum_values: Vec<String>,
}

fn default_field_type() -> String {
    "string".to_string()
}

/// Номер перевода: строкой (старые формы) или структурой
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TransferDestinationInput {
    Bare(String),
    Structured(TransferDestination),
}

/// Текст SMS: строкой или структурой
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SmsContentInput {
    Bare(String),
    Structured(SmsContent),
}

/// ID типа события Cal.com: из поля ввода приходит строка, из API число
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseId {
    Number(i64),
    Text(String),
}

/// Инструмент в состоянии формы
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolForm {
    #[serde(rename = "type", default)]
    pub tool_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,

    // transfer_call
    #[serde(default)]
    pub transfer_destination: Option<TransferDestinationInput>,
    #[serde(default)]
    pub transfer_option: Option<TransferOption>,

    // agent_transfer
    #[serde(default)]
    pub agent_id: Option<String>,
    #[serde(default)]
    pub post_call_analysis_setting: Option<PostCallAnalysisSetting>,

    // check_availability_cal / book_appointment_cal
    #[serde(default)]
    pub cal_api_key: Option<String>,
    #[serde(default)]
    pub event_type_id: Option<LooseId>,
    #[serde(default)]
    pub timezone: Option<String>,

    // send_sms
    #[serde(default)]
    pub sms_content: Option<SmsContentInput>,

    // extract_dynamic_variable
    #[serde(default)]
    pub variables: Vec<DynamicVariable>,

    // custom
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub parameters_mode: ParametersMode,
    /// JSON-строка или уже готовый объект
    #[serde(default)]
    pub parameters: Option<Value>,
    #[serde(default)]
    pub parameter_fields: Vec<ParameterField>,
    #[serde(default)]
    pub headers: Vec<KeyValuePair>,
    #[serde(default)]
    pub query_params: Vec<KeyValuePair>,
    #[serde(default)]
    pub response_variables: Vec<KeyValuePair>,
    #[serde(default)]
    pub speak_during_execution: Option<bool>,
    #[serde(default)]
    pub speak_after_execution: Option<bool>,
    #[serde(default)]
    pub execution_message_description: Option<String>,
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

impl ToolForm {
    /// Пустая форма нужного типа
    pub fn new(tool_type: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            tool_type: tool_type.into(),
            name: name.into(),
            ..Default::default()
        }
    }
}

fn pairs<'a>(map: impl IntoIterator<Item = (&'a String, &'a String)>) -> Vec<KeyValuePair> {
    map.into_iter()
        .map(|(k, v)| KeyValuePair::new(k.clone(), v.clone()))
        .collect()
}

/// Загрузка сохранённого инструмента обратно в форму для редактирования
impl From<&Tool> for ToolForm {
    fn from(tool: &Tool) -> Self {
        let mut form = ToolForm::new(tool.type_name(), tool.name());
        match tool {
            Tool::EndCall(t) => {
                form.description = t.description.clone();
            }
            Tool::TransferCall(t) => {
                form.description = t.description.clone();
                form.transfer_destination =
                    Some(TransferDestinationInput::Structured(t.transfer_destination.clone()));
                form.transfer_option = Some(t.transfer_option.clone());
            }
            Tool::AgentTransfer(t) => {
                form.description = t.description.clone();
                form.agent_id = Some(t.agent_id.clone());
                form.post_call_analysis_setting = Some(t.post_call_analysis_setting);
            }
            Tool::CheckAvailabilityCal(t) | Tool::BookAppointmentCal(t) => {
                form.description = t.description.clone();
                form.cal_api_key = Some(t.cal_api_key.clone());
                form.event_type_id = Some(LooseId::Number(t.event_type_id));
                form.timezone = t.timezone.clone();
            }
            Tool::SendSms(t) => {
                form.description = t.description.clone();
                form.sms_content = Some(SmsContentInput::Structured(t.sms_content.clone()));
            }
            Tool::ExtractDynamicVariable(t) => {
                form.description = Some(t.description.clone());
                form.variables = t.variables.clone();
            }
            Tool::Custom(t) => {
                form.description = Some(t.description.clone());
                form.url = Some(t.url.clone());
                form.method = Some(t.method.clone());
                form.parameters_mode = ParametersMode::Json;
                form.parameters = t
                    .parameters
                    .as_ref()
                    .and_then(|p| serde_json::to_string_pretty(p).ok())
                    .map(Value::String);
                form.headers = pairs(&t.headers);
                form.query_params = pairs(&t.query_params);
                form.response_variables = pairs(&t.response_variables);
                form.speak_during_execution = Some(t.speak_during_execution);
                form.speak_after_execution = Some(t.speak_after_execution);
                form.execution_message_description = t.execution_message_description.clone();
                form.timeout_ms = t.timeout_ms;
            }
        }
        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_form_accepts_loose_inputs() {
        let form: ToolForm = serde_json::from_value(json!({
            "type": "transfer_call",
            "name": "transfer",
            "transfer_destination": "+14155551234",
            "event_type_id": "42",
            "parameters_mode": "form",
            "parameter_fields": [{"name": "order_id", "required": true}]
        }))
        .unwrap();

        assert_eq!(
            form.transfer_destination,
            Some(TransferDestinationInput::Bare("+14155551234".into()))
        );
        assert_eq!(form.event_type_id, Some(LooseId::Text("42".into())));
        assert_eq!(form.parameters_mode, ParametersMode::Form);
        assert_eq!(form.parameter_fields[0].field_type, "string");
    }

    #[test]
    fn test_structured_destination_is_not_bare() {
        let form: ToolForm = serde_json::from_value(json!({
            "type": "transfer_call",
            "transfer_destination": {"type": "inferred", "prompt": "the manager"}
        }))
        .unwrap();
        assert_eq!(
            form.transfer_destination,
            Some(TransferDestinationInput::Structured(TransferDestination::Inferred {
                prompt: "the manager".into()
            }))
        );
    }
}
