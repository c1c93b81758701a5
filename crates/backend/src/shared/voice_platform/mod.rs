pub mod client;
pub mod multipart;

#[cfg(test)]
pub mod mock;

use async_trait::async_trait;
use contracts::domain::a001_agent::aggregate::{Agent, AgentCreateRequest, AgentPatchRequest};
use contracts::domain::a002_llm_config::aggregate::{LlmConfig, LlmConfigRequest};
use contracts::domain::a003_knowledge_base::aggregate::KnowledgeBase;
use contracts::domain::a004_phone_number::aggregate::{
    PhoneNumber, PhoneNumberCreateRequest, PhoneNumberUpdateRequest,
};
use contracts::domain::a005_call::aggregate::{
    Call, CallListRequest, PhoneCallCreateRequest, WebCallCreateRequest, WebCallResponse,
};
use thiserror::Error;

pub use client::RemotePlatformClient;
pub use multipart::KnowledgeBaseMultipart;

/// Ошибки обращения к голосовой платформе
#[derive(Debug, Clone, Error)]
pub enum PlatformError {
    /// Локальная проверка, запрос не отправлялся
    #[error("{0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Unexpected response: {0}")]
    Decode(String),
}

impl PlatformError {
    pub fn is_validation(&self) -> bool {
        matches!(self, PlatformError::Validation(_))
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            PlatformError::Decode(e.to_string())
        } else {
            PlatformError::Network(e.to_string())
        }
    }
}

/// Операции удалённой платформы голосовых агентов
#[async_trait]
pub trait VoicePlatformApi: Send + Sync {
    // Agents
    async fn list_agents(&self) -> Result<Vec<Agent>, PlatformError>;
    async fn get_agent(&self, agent_id: &str) -> Result<Agent, PlatformError>;
    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<Agent, PlatformError>;
    async fn update_agent(
        &self,
        agent_id: &str,
        patch: &AgentPatchRequest,
    ) -> Result<Agent, PlatformError>;
    async fn delete_agent(&self, agent_id: &str) -> Result<(), PlatformError>;

    // LLM configurations
    async fn list_llm_configs(&self) -> Result<Vec<LlmConfig>, PlatformError>;
    async fn get_llm_config(&self, llm_id: &str) -> Result<LlmConfig, PlatformError>;
    async fn create_llm_config(&self, request: &LlmConfigRequest) -> Result<LlmConfig, PlatformError>;
    async fn update_llm_config(
        &self,
        llm_id: &str,
        request: &LlmConfigRequest,
    ) -> Result<LlmConfig, PlatformError>;
    async fn delete_llm_config(&self, llm_id: &str) -> Result<(), PlatformError>;

    // Knowledge bases
    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>, PlatformError>;
    async fn create_knowledge_base(
        &self,
        body: KnowledgeBaseMultipart,
    ) -> Result<KnowledgeBase, PlatformError>;
    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), PlatformError>;

    // Phone numbers
    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>, PlatformError>;
    async fn create_phone_number(
        &self,
        request: &PhoneNumberCreateRequest,
    ) -> Result<PhoneNumber, PlatformError>;
    async fn update_phone_number(
        &self,
        phone_number: &str,
        request: &PhoneNumberUpdateRequest,
    ) -> Result<PhoneNumber, PlatformError>;
    async fn delete_phone_number(&self, phone_number: &str) -> Result<(), PlatformError>;

    // Calls
    async fn create_web_call(
        &self,
        request: &WebCallCreateRequest,
    ) -> Result<WebCallResponse, PlatformError>;
    async fn create_phone_call(&self, request: &PhoneCallCreateRequest) -> Result<Call, PlatformError>;
    async fn get_call(&self, call_id: &str) -> Result<Call, PlatformError>;
    async fn list_calls(&self, request: &CallListRequest) -> Result<Vec<Call>, PlatformError>;
    async fn end_call(&self, call_id: &str) -> Result<(), PlatformError>;
}
