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
use once_cell::sync::Lazy;
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::{KnowledgeBaseMultipart, PlatformError, VoicePlatformApi};
use crate::shared::config;

/// Общий пул соединений для всех сессий
static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    let timeout = Duration::from_secs(config::get().voice_platform.timeout_secs);
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .unwrap_or_else(|e| {
            tracing::error!("Failed to build voice platform HTTP client: {}", e);
            reqwest::Client::new()
        })
});

/// HTTP-клиент голосовой платформы, привязанный к токену одной сессии
#[derive(Clone)]
pub struct RemotePlatformClient {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl RemotePlatformClient {
    pub fn new(token: impl Into<String>) -> Self {
        Self::with_base_url(config::get().voice_platform.base_url.clone(), token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            client: HTTP_CLIENT.clone(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token: token.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, self.url(path))
            .bearer_auth(&self.token)
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, PlatformError> {
        let response = builder.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = extract_error_message(status.as_u16(), &body);
        tracing::warn!("Voice platform returned {}: {}", status.as_u16(), message);

        if status == reqwest::StatusCode::UNAUTHORIZED {
            Err(PlatformError::Unauthorized(message))
        } else {
            Err(PlatformError::Api {
                status: status.as_u16(),
                message,
            })
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, PlatformError> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode(response).await
    }

    async fn send_json<B, T>(&self, method: Method, path: &str, body: &B) -> Result<T, PlatformError>
    where
        B: Serialize + ?Sized + Sync,
        T: DeserializeOwned,
    {
        let response = self.send(self.request(method, path).json(body)).await?;
        decode(response).await
    }

    async fn delete(&self, path: &str) -> Result<(), PlatformError> {
        self.send(self.request(Method::DELETE, path)).await?;
        Ok(())
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, PlatformError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| PlatformError::Decode(e.to_string()))
}

fn segment(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

/// Текст ошибки из тела ответа: поля `message`, `error`, `detail`
pub fn extract_error_message(status: u16, body: &str) -> String {
    let from_body = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "error", "detail"].iter().find_map(|key| {
                value
                    .get(*key)
                    .and_then(|v| v.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
            })
        });

    from_body.unwrap_or_else(|| format!("Request failed with status {}", status))
}

#[async_trait]
impl VoicePlatformApi for RemotePlatformClient {
    async fn list_agents(&self) -> Result<Vec<Agent>, PlatformError> {
        self.get_json("/list-agents").await
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, PlatformError> {
        self.get_json(&format!("/get-agent/{}", segment(agent_id))).await
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<Agent, PlatformError> {
        self.send_json(Method::POST, "/create-agent", request).await
    }

    async fn update_agent(
        &self,
        agent_id: &str,
        patch: &AgentPatchRequest,
    ) -> Result<Agent, PlatformError> {
        self.send_json(
            Method::PATCH,
            &format!("/update-agent/{}", segment(agent_id)),
            patch,
        )
        .await
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), PlatformError> {
        self.delete(&format!("/delete-agent/{}", segment(agent_id))).await
    }

    async fn list_llm_configs(&self) -> Result<Vec<LlmConfig>, PlatformError> {
        self.get_json("/list-retell-llms").await
    }

    async fn get_llm_config(&self, llm_id: &str) -> Result<LlmConfig, PlatformError> {
        self.get_json(&format!("/get-retell-llm/{}", segment(llm_id))).await
    }

    async fn create_llm_config(&self, request: &LlmConfigRequest) -> Result<LlmConfig, PlatformError> {
        self.send_json(Method::POST, "/create-retell-llm", request).await
    }

    async fn update_llm_config(
        &self,
        llm_id: &str,
        request: &LlmConfigRequest,
    ) -> Result<LlmConfig, PlatformError> {
        self.send_json(
            Method::PATCH,
            &format!("/update-retell-llm/{}", segment(llm_id)),
            request,
        )
        .await
    }

    async fn delete_llm_config(&self, llm_id: &str) -> Result<(), PlatformError> {
        self.delete(&format!("/delete-retell-llm/{}", segment(llm_id))).await
    }

    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>, PlatformError> {
        self.get_json("/list-knowledge-bases").await
    }

    async fn create_knowledge_base(
        &self,
        body: KnowledgeBaseMultipart,
    ) -> Result<KnowledgeBase, PlatformError> {
        let form = body.into_form()?;
        let response = self
            .send(self.request(Method::POST, "/create-knowledge-base").multipart(form))
            .await?;
        decode(response).await
    }

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), PlatformError> {
        self.delete(&format!(
            "/delete-knowledge-base/{}",
            segment(knowledge_base_id)
        ))
        .await
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>, PlatformError> {
        self.get_json("/list-phone-numbers").await
    }

    async fn create_phone_number(
        &self,
        request: &PhoneNumberCreateRequest,
    ) -> Result<PhoneNumber, PlatformError> {
        self.send_json(Method::POST, "/create-phone-number", request).await
    }

    async fn update_phone_number(
        &self,
        phone_number: &str,
        request: &PhoneNumberUpdateRequest,
    ) -> Result<PhoneNumber, PlatformError> {
        self.send_json(
            Method::PATCH,
            &format!("/update-phone-number/{}", segment(phone_number)),
            request,
        )
        .await
    }

    async fn delete_phone_number(&self, phone_number: &str) -> Result<(), PlatformError> {
        self.delete(&format!("/delete-phone-number/{}", segment(phone_number)))
            .await
    }

    async fn create_web_call(
        &self,
        request: &WebCallCreateRequest,
    ) -> Result<WebCallResponse, PlatformError> {
        self.send_json(Method::POST, "/v2/create-web-call", request).await
    }

    async fn create_phone_call(&self, request: &PhoneCallCreateRequest) -> Result<Call, PlatformError> {
        self.send_json(Method::POST, "/v2/create-phone-call", request).await
    }

    async fn get_call(&self, call_id: &str) -> Result<Call, PlatformError> {
        self.get_json(&format!("/v2/get-call/{}", segment(call_id))).await
    }

    async fn list_calls(&self, request: &CallListRequest) -> Result<Vec<Call>, PlatformError> {
        self.send_json(Method::POST, "/v2/list-calls", &request.clone().normalized())
            .await
    }

    async fn end_call(&self, call_id: &str) -> Result<(), PlatformError> {
        self.send(self.request(
            Method::POST,
            &format!("/v2/end-call/{}", segment(call_id)),
        ))
        .await?;
        Ok(())
    }
}
