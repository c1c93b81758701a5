//! Форма создания базы знаний: три взаимоисключающие вкладки
//! (текст, файлы, URL). Отправляется только активная.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeBaseTab {
    #[default]
    Text,
    Files,
    Url,
}

/// Загруженный файл
#[derive(Debug, Clone, PartialEq)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum KnowledgeBaseFormError {
    #[error("Knowledge base name is required")]
    EmptyName,

    #[error("Text content is required")]
    EmptyText,

    #[error("At least one file is required")]
    NoFiles,

    #[error("File '{0}' is empty")]
    EmptyFile(String),

    #[error("URL is required")]
    EmptyUrl,

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

/// Состояние формы
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseForm {
    #[serde(default)]
    pub knowledge_base_name: String,
    #[serde(default)]
    pub active_tab: KnowledgeBaseTab,
    #[serde(default)]
    pub text_title: String,
    #[serde(default)]
    pub text: String,
    #[serde(skip)]
    pub files: Vec<UploadFile>,
    #[serde(default)]
    pub url: String,
}

/// Содержимое из активной вкладки
#[derive(Debug, Clone, PartialEq)]
pub enum KnowledgeBaseContent {
    Text { title: String, text: String },
    Files(Vec<UploadFile>),
    Url(String),
}

/// Проверенная заявка на создание базы знаний
#[derive(Debug, Clone, PartialEq)]
pub struct KnowledgeBaseSubmission {
    pub name: String,
    pub content: KnowledgeBaseContent,
}

impl KnowledgeBaseForm {
    /// Проверить активную вкладку и собрать заявку. Остальные вкладки игнорируются.
    pub fn into_submission(self) -> Result<KnowledgeBaseSubmission, KnowledgeBaseFormError> {
        let name = self.knowledge_base_name.trim().to_string();
        if name.is_empty() {
            return Err(KnowledgeBaseFormError::EmptyName);
        }

        let content = match self.active_tab {
            KnowledgeBaseTab::Text => {
                if self.text.trim().is_empty() {
                    return Err(KnowledgeBaseFormError::EmptyText);
                }
                let title = match self.text_title.trim() {
                    "" => name.clone(),
                    t => t.to_string(),
                };
                KnowledgeBaseContent::Text {
                    title,
                    text: self.text,
                }
            }
            KnowledgeBaseTab::Files => {
                if self.files.is_empty() {
                    return Err(KnowledgeBaseFormError::NoFiles);
                }
                if let Some(empty) = self.files.iter().find(|f| f.bytes.is_empty()) {
                    return Err(KnowledgeBaseFormError::EmptyFile(empty.file_name.clone()));
                }
                KnowledgeBaseContent::Files(self.files)
            }
            KnowledgeBaseTab::Url => KnowledgeBaseContent::Url(normalize_source_url(&self.url)?),
        };

        Ok(KnowledgeBaseSubmission { name, content })
    }
}

fn normalize_source_url(url: &str) -> Result<String, KnowledgeBaseFormError> {
    let url = url.trim();
    if url.is_empty() {
        return Err(KnowledgeBaseFormError::EmptyUrl);
    }
    if url.chars().any(char::is_whitespace) {
        return Err(KnowledgeBaseFormError::InvalidUrl(url.to_string()));
    }
    let lower = url.to_ascii_lowercase();
    let url = if lower.starts_with("http://") || lower.starts_with("https://") {
        url.to_string()
    } else {
        format!("https://{}", url)
    };
    // После схемы должен быть хост
    let host = url.splitn(2, "://").nth(1).unwrap_or("");
    if host.is_empty() || host.starts_with('/') {
        return Err(KnowledgeBaseFormError::InvalidUrl(url));
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(tab: KnowledgeBaseTab) -> KnowledgeBaseForm {
        KnowledgeBaseForm {
            knowledge_base_name: "Support FAQ".into(),
            active_tab: tab,
            ..Default::default()
        }
    }

    #[test]
    fn test_text_tab_requires_text() {
        let mut f = form(KnowledgeBaseTab::Text);
        f.text = "   ".into();
        f.url = "https://ignored.example.com".into();
        assert_eq!(f.into_submission(), Err(KnowledgeBaseFormError::EmptyText));
    }

    #[test]
    fn test_text_tab_title_defaults_to_name() {
        let mut f = form(KnowledgeBaseTab::Text);
        f.text = "We open at 9am.".into();
        let submission = f.into_submission().unwrap();
        assert_eq!(
            submission.content,
            KnowledgeBaseContent::Text {
                title: "Support FAQ".into(),
                text: "We open at 9am.".into()
            }
        );
    }

    #[test]
    fn test_files_tab() {
        let f = form(KnowledgeBaseTab::Files);
        assert_eq!(f.into_submission(), Err(KnowledgeBaseFormError::NoFiles));

        let mut f = form(KnowledgeBaseTab::Files);
        f.files = vec![UploadFile {
            file_name: "empty.pdf".into(),
            content_type: None,
            bytes: vec![],
        }];
        assert_eq!(
            f.into_submission(),
            Err(KnowledgeBaseFormError::EmptyFile("empty.pdf".into()))
        );
    }

    #[test]
    fn test_url_tab() {
        let mut f = form(KnowledgeBaseTab::Url);
        f.text = "ignored".into();
        assert_eq!(f.clone().into_submission(), Err(KnowledgeBaseFormError::EmptyUrl));

        f.url = "docs.example.com/help".into();
        assert_eq!(
            f.into_submission().unwrap().content,
            KnowledgeBaseContent::Url("https://docs.example.com/help".into())
        );

        let mut f = form(KnowledgeBaseTab::Url);
        f.url = "https://bad url".into();
        assert!(matches!(
            f.into_submission(),
            Err(KnowledgeBaseFormError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_name_is_required() {
        let mut f = form(KnowledgeBaseTab::Text);
        f.knowledge_base_name = " ".into();
        f.text = "content".into();
        assert_eq!(f.into_submission(), Err(KnowledgeBaseFormError::EmptyName));
    }
}
