use crate::domain::common::AggregateRoot;
use serde::{Deserialize, Serialize};

/// Статус обработки базы знаний на платформе
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnowledgeBaseStatus {
    #[serde(alias = "complete")]
    Ready,
    #[serde(alias = "processing")]
    InProgress,
    Error,
}

impl KnowledgeBaseStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            KnowledgeBaseStatus::Ready => "ready",
            KnowledgeBaseStatus::InProgress => "in_progress",
            KnowledgeBaseStatus::Error => "error",
        }
    }
}

/// Источник содержимого базы знаний
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBaseSource {
    /// document | text | url
    #[serde(rename = "type")]
    pub source_type: String,

    #[serde(default)]
    pub source_id: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub filename: Option<String>,

    #[serde(default)]
    pub file_url: Option<String>,

    #[serde(default)]
    pub url: Option<String>,
}

/// Агрегат Knowledge Base
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeBase {
    pub knowledge_base_id: String,

    pub knowledge_base_name: String,

    pub status: KnowledgeBaseStatus,

    #[serde(default)]
    pub knowledge_base_sources: Vec<KnowledgeBaseSource>,

    #[serde(default)]
    pub last_refreshed_timestamp: Option<i64>,
}

impl KnowledgeBase {
    pub fn is_ready(&self) -> bool {
        self.status == KnowledgeBaseStatus::Ready
    }
}

impl AggregateRoot for KnowledgeBase {
    fn id(&self) -> &str {
        &self.knowledge_base_id
    }

    fn display_name(&self) -> &str {
        &self.knowledge_base_name
    }

    fn aggregate_index() -> &'static str {
        "a003"
    }

    fn collection_name() -> &'static str {
        "knowledge_base"
    }

    fn element_name() -> &'static str {
        "Knowledge base"
    }

    fn list_name() -> &'static str {
        "Knowledge bases"
    }
}
