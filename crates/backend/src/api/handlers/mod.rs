use serde::Deserialize;

// Aggregate handlers (a001-a005)
pub mod a001_agent;
pub mod a002_llm_config;
pub mod a003_knowledge_base;
pub mod a004_phone_number;
pub mod a005_call;

/// `?cached=true` отдаёт зеркало сессии, если список уже загружался
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    #[serde(default)]
    pub cached: bool,
}
