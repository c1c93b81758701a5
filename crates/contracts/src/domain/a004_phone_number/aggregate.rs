use crate::domain::common::AggregateRoot;
use serde::{Deserialize, Deserializer, Serialize};

/// Агрегат Phone Number. Номер привязан максимум к одному входящему
/// и одному исходящему агенту.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumber {
    /// Номер в формате E.164, он же идентификатор
    pub phone_number: String,

    #[serde(default)]
    pub phone_number_pretty: Option<String>,

    #[serde(default)]
    pub nickname: Option<String>,

    #[serde(default)]
    pub inbound_agent_id: Option<String>,

    #[serde(default)]
    pub outbound_agent_id: Option<String>,

    #[serde(default)]
    pub area_code: Option<u16>,

    #[serde(default)]
    pub last_modification_timestamp: Option<i64>,
}

impl AggregateRoot for PhoneNumber {
    fn id(&self) -> &str {
        &self.phone_number
    }

    fn display_name(&self) -> &str {
        self.nickname
            .as_deref()
            .or(self.phone_number_pretty.as_deref())
            .unwrap_or(&self.phone_number)
    }

    fn aggregate_index() -> &'static str {
        "a004"
    }

    fn collection_name() -> &'static str {
        "phone_number"
    }

    fn element_name() -> &'static str {
        "Phone number"
    }

    fn list_name() -> &'static str {
        "Phone numbers"
    }
}

/// Покупка нового номера
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberCreateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub area_code: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(default)]
    pub toll_free: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_inbound_country_list: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allowed_outbound_country_list: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inbound_agent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outbound_agent_id: Option<String>,
}

impl PhoneNumberCreateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if let Some(code) = self.area_code {
            if !(100..=999).contains(&code) {
                return Err("Area code must have 3 digits".into());
            }
        }
        for list in [
            &self.allowed_inbound_country_list,
            &self.allowed_outbound_country_list,
        ]
        .into_iter()
        .flatten()
        {
            if let Some(bad) = list.iter().find(|c| !is_country_code(c)) {
                return Err(format!("Invalid country code: {}", bad));
            }
        }
        Ok(())
    }
}

/// ISO 3166-1 alpha-2, например "US"
fn is_country_code(code: &str) -> bool {
    code.len() == 2 && code.chars().all(|c| c.is_ascii_uppercase())
}

/// Обновление номера: псевдоним и привязки агентов.
///
/// Привязки агентов: отсутствующее поле (`None`) не меняется,
/// `null` (`Some(None)`) снимает привязку, строка (`Some(Some(id))`) задаёт агента.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhoneNumberUpdateRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nickname: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_binding",
        skip_serializing_if = "Option::is_none"
    )]
    pub inbound_agent_id: Option<Option<String>>,

    #[serde(
        default,
        deserialize_with = "deserialize_binding",
        skip_serializing_if = "Option::is_none"
    )]
    pub outbound_agent_id: Option<Option<String>>,
}

/// Присутствующее поле, в том числе `null`, становится `Some(_)`
fn deserialize_binding<'de, D>(deserializer: D) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    Option::<String>::deserialize(deserializer).map(Some)
}

impl PhoneNumberUpdateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self == &Self::default() {
            return Err("Nothing to update".into());
        }
        for binding in [&self.inbound_agent_id, &self.outbound_agent_id] {
            if let Some(Some(agent_id)) = binding {
                if agent_id.trim().is_empty() {
                    return Err("Agent id must not be empty, send null to unbind".into());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_request_validation() {
        let mut req = PhoneNumberCreateRequest {
            area_code: Some(415),
            allowed_outbound_country_list: Some(vec!["US".into(), "CA".into()]),
            ..Default::default()
        };
        assert!(req.validate().is_ok());

        req.area_code = Some(41);
        assert!(req.validate().is_err());

        req.area_code = None;
        req.allowed_inbound_country_list = Some(vec!["usa".into()]);
        assert_eq!(req.validate(), Err("Invalid country code: usa".to_string()));
    }

    #[test]
    fn test_update_can_clear_binding() {
        let req: PhoneNumberUpdateRequest =
            serde_json::from_value(json!({"inbound_agent_id": null})).unwrap();
        assert_eq!(req.inbound_agent_id, Some(None));
        assert_eq!(req.outbound_agent_id, None);
        assert!(req.validate().is_ok());
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"inbound_agent_id": null})
        );

        let req: PhoneNumberUpdateRequest =
            serde_json::from_value(json!({"outbound_agent_id": "agent_out"})).unwrap();
        assert_eq!(req.outbound_agent_id, Some(Some("agent_out".to_string())));
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({"outbound_agent_id": "agent_out"})
        );

        let empty: PhoneNumberUpdateRequest = serde_json::from_value(json!({})).unwrap();
        assert_eq!(empty.validate(), Err("Nothing to update".to_string()));

        let blank = PhoneNumberUpdateRequest {
            inbound_agent_id: Some(Some(" ".into())),
            ..Default::default()
        };
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_display_name_prefers_nickname() {
        let number = PhoneNumber {
            phone_number: "+14155551234".into(),
            phone_number_pretty: Some("(415) 555-1234".into()),
            nickname: None,
            inbound_agent_id: None,
            outbound_agent_id: None,
            area_code: Some(415),
            last_modification_timestamp: None,
        };
        assert_eq!(number.display_name(), "(415) 555-1234");
        assert_eq!(number.id(), "+14155551234");
    }
}
