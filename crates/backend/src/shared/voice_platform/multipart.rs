//! Тело multipart-запроса создания базы знаний.
//!
//! Собирается из проверенной заявки и остаётся обычной структурой до
//! самой отправки, в `reqwest::multipart::Form` превращается только в клиенте.

use super::PlatformError;
use contracts::domain::a003_knowledge_base::form::{KnowledgeBaseContent, KnowledgeBaseSubmission};
use serde_json::json;

pub const FIELD_NAME: &str = "knowledge_base_name";
pub const FIELD_TEXTS: &str = "knowledge_base_texts";
pub const FIELD_FILES: &str = "knowledge_base_files";
pub const FIELD_URLS: &str = "knowledge_base_urls";

#[derive(Debug, Clone, PartialEq)]
pub enum PartBody {
    Text(String),
    File {
        file_name: String,
        content_type: Option<String>,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct MultipartPart {
    pub name: String,
    pub body: PartBody,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct KnowledgeBaseMultipart {
    pub parts: Vec<MultipartPart>,
}

impl KnowledgeBaseMultipart {
    /// Имя и ровно один источник содержимого
    pub fn from_submission(submission: KnowledgeBaseSubmission) -> Self {
        let mut parts = vec![MultipartPart {
            name: FIELD_NAME.into(),
            body: PartBody::Text(submission.name),
        }];

        match submission.content {
            KnowledgeBaseContent::Text { title, text } => {
                let texts = json!([{ "title": title, "text": text }]);
                parts.push(MultipartPart {
                    name: FIELD_TEXTS.into(),
                    body: PartBody::Text(texts.to_string()),
                });
            }
            KnowledgeBaseContent::Files(files) => {
                parts.extend(files.into_iter().map(|f| MultipartPart {
                    name: FIELD_FILES.into(),
                    body: PartBody::File {
                        file_name: f.file_name,
                        content_type: f.content_type,
                        bytes: f.bytes,
                    },
                }));
            }
            KnowledgeBaseContent::Url(url) => {
                parts.push(MultipartPart {
                    name: FIELD_URLS.into(),
                    body: PartBody::Text(json!([url]).to_string()),
                });
            }
        }

        Self { parts }
    }

    /// Текстовое поле по имени (первое совпадение)
    pub fn text(&self, name: &str) -> Option<&str> {
        self.parts.iter().find_map(|p| match &p.body {
            PartBody::Text(value) if p.name == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn file_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|p| matches!(p.body, PartBody::File { .. }))
            .count()
    }

    pub fn into_form(self) -> Result<reqwest::multipart::Form, PlatformError> {
        let mut form = reqwest::multipart::Form::new();
        for part in self.parts {
            form = match part.body {
                PartBody::Text(value) => form.text(part.name, value),
                PartBody::File {
                    file_name,
                    content_type,
                    bytes,
                } => {
                    let mut file_part = reqwest::multipart::Part::bytes(bytes).file_name(file_name);
                    if let Some(mime) = content_type {
                        file_part = file_part
                            .mime_str(&mime)
                            .map_err(|e| PlatformError::Validation(format!("Invalid content type '{}': {}", mime, e)))?;
                    }
                    form.part(part.name, file_part)
                }
            };
        }
        Ok(form)
    }
}
