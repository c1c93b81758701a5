//! Платформа в памяти для тестов сервисов: считает запросы и отдаёт
//! заранее заданные ответы.

use async_trait::async_trait;
use contracts::domain::a001_agent::aggregate::{
    Agent, AgentCreateRequest, AgentPatchRequest, ResponseEngine,
};
use contracts::domain::a002_llm_config::aggregate::{LlmConfig, LlmConfigRequest};
use contracts::domain::a003_knowledge_base::aggregate::{KnowledgeBase, KnowledgeBaseStatus};
use contracts::domain::a004_phone_number::aggregate::{
    PhoneNumber, PhoneNumberCreateRequest, PhoneNumberUpdateRequest,
};
use contracts::domain::a005_call::aggregate::{
    Call, CallListRequest, CallStatus, CallType, PhoneCallCreateRequest, WebCallCreateRequest,
    WebCallResponse,
};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::shared::mirror::SharedMirror;
use crate::shared::session::{SessionContext, SessionKey};

use super::multipart::FIELD_NAME;
use super::{KnowledgeBaseMultipart, PlatformError, VoicePlatformApi};

#[derive(Default)]
pub struct MockPlatform {
    requests: Mutex<Vec<String>>,
    pub agents: Mutex<Vec<Agent>>,
    pub llm_configs: Mutex<Vec<LlmConfig>>,
    pub knowledge_bases: Mutex<Vec<KnowledgeBase>>,
    pub phone_numbers: Mutex<Vec<PhoneNumber>>,
    pub calls: Mutex<Vec<Call>>,
    /// Ответы `get_call` по порядку; последний повторяется
    call_script: Mutex<VecDeque<Result<Call, PlatformError>>>,
    /// Следующий запрос завершится этой ошибкой
    fail_next: Mutex<Option<PlatformError>>,
    pub kb_bodies: Mutex<Vec<KnowledgeBaseMultipart>>,
}

impl MockPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_agents(agents: Vec<Agent>) -> Self {
        let mock = Self::default();
        *mock.agents.lock().unwrap() = agents;
        mock
    }

    pub fn script_calls(&self, responses: Vec<Result<Call, PlatformError>>) {
        *self.call_script.lock().unwrap() = responses.into();
    }

    pub fn fail_next(&self, error: PlatformError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }

    /// Число запросов, начинающихся с `prefix` (например "delete_agent")
    pub fn count(&self, prefix: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|r| r.starts_with(prefix))
            .count()
    }

    fn record(&self, request: String) -> Result<(), PlatformError> {
        self.requests.lock().unwrap().push(request);
        match self.fail_next.lock().unwrap().take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

/// Контекст сессии поверх мока с пустым зеркалом
pub fn context(mock: &Arc<MockPlatform>) -> SessionContext {
    let mirror: SharedMirror = Default::default();
    SessionContext::new(mock.clone(), mirror, SessionKey::from_token("test-token"))
}

fn not_found(what: &str, id: &str) -> PlatformError {
    PlatformError::Api {
        status: 404,
        message: format!("{} {} not found", what, id),
    }
}

pub fn sample_agent(id: &str, name: &str) -> Agent {
    Agent {
        agent_id: id.to_string(),
        agent_name: Some(name.to_string()),
        voice_id: "11labs-Adrian".into(),
        voice_temperature: None,
        voice_speed: None,
        language: Some("en-US".into()),
        response_engine: ResponseEngine::llm("llm_1"),
        knowledge_base_ids: vec![],
        webhook_url: None,
        last_modification_timestamp: None,
    }
}

pub fn sample_call(id: &str, status: CallStatus) -> Call {
    Call {
        call_id: id.to_string(),
        call_type: Some(CallType::PhoneCall),
        agent_id: "agent_1".into(),
        call_status: status,
        from_number: Some("+14155550100".into()),
        to_number: Some("+14155550199".into()),
        transcript: None,
        call_analysis: None,
        recording_url: None,
        start_timestamp: None,
        end_timestamp: None,
        disconnection_reason: None,
    }
}

pub fn sample_phone_number(number: &str) -> PhoneNumber {
    PhoneNumber {
        phone_number: number.to_string(),
        phone_number_pretty: None,
        nickname: None,
        inbound_agent_id: None,
        outbound_agent_id: None,
        area_code: Some(415),
        last_modification_timestamp: None,
    }
}

#[async_trait]
impl VoicePlatformApi for MockPlatform {
    async fn list_agents(&self) -> Result<Vec<Agent>, PlatformError> {
        self.record("list_agents".into())?;
        Ok(self.agents.lock().unwrap().clone())
    }

    async fn get_agent(&self, agent_id: &str) -> Result<Agent, PlatformError> {
        self.record(format!("get_agent {}", agent_id))?;
        self.agents
            .lock()
            .unwrap()
            .iter()
            .find(|a| a.agent_id == agent_id)
            .cloned()
            .ok_or_else(|| not_found("Agent", agent_id))
    }

    async fn create_agent(&self, request: &AgentCreateRequest) -> Result<Agent, PlatformError> {
        self.record("create_agent".into())?;
        let mut agents = self.agents.lock().unwrap();
        let agent = Agent {
            agent_id: format!("agent_{}", agents.len() + 1),
            agent_name: request.agent_name.clone(),
            voice_id: request.voice_id.clone(),
            voice_temperature: request.voice_temperature,
            voice_speed: request.voice_speed,
            language: request.language.clone(),
            response_engine: request.response_engine.clone(),
            knowledge_base_ids: request.knowledge_base_ids.clone(),
            webhook_url: request.webhook_url.clone(),
            last_modification_timestamp: None,
        };
        agents.push(agent.clone());
        Ok(agent)
    }

    async fn update_agent(
        &self,
        agent_id: &str,
        patch: &AgentPatchRequest,
    ) -> Result<Agent, PlatformError> {
        self.record(format!("update_agent {}", agent_id))?;
        let mut agents = self.agents.lock().unwrap();
        let agent = agents
            .iter_mut()
            .find(|a| a.agent_id == agent_id)
            .ok_or_else(|| not_found("Agent", agent_id))?;
        if let Some(name) = &patch.agent_name {
            agent.agent_name = Some(name.clone());
        }
        if let Some(voice) = &patch.voice_id {
            agent.voice_id = voice.clone();
        }
        if let Some(engine) = &patch.response_engine {
            agent.response_engine = engine.clone();
        }
        Ok(agent.clone())
    }

    async fn delete_agent(&self, agent_id: &str) -> Result<(), PlatformError> {
        self.record(format!("delete_agent {}", agent_id))?;
        self.agents.lock().unwrap().retain(|a| a.agent_id != agent_id);
        Ok(())
    }

    async fn list_llm_configs(&self) -> Result<Vec<LlmConfig>, PlatformError> {
        self.record("list_llm_configs".into())?;
        Ok(self.llm_configs.lock().unwrap().clone())
    }

    async fn get_llm_config(&self, llm_id: &str) -> Result<LlmConfig, PlatformError> {
        self.record(format!("get_llm_config {}", llm_id))?;
        self.llm_configs
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.llm_id == llm_id)
            .cloned()
            .ok_or_else(|| not_found("LLM", llm_id))
    }

    async fn create_llm_config(&self, request: &LlmConfigRequest) -> Result<LlmConfig, PlatformError> {
        self.record("create_llm_config".into())?;
        let mut configs = self.llm_configs.lock().unwrap();
        let general_tools = match &request.general_tools {
            Some(tools) => tools
                .iter()
                .map(|t| serde_json::from_value(t.clone()))
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| PlatformError::Api {
                    status: 400,
                    message: e.to_string(),
                })?,
            None => vec![],
        };
        let config = LlmConfig {
            llm_id: format!("llm_{}", configs.len() + 1),
            model: request.model.clone(),
            model_temperature: request.model_temperature,
            general_prompt: request.general_prompt.clone(),
            begin_message: request.begin_message.clone(),
            general_tools,
            knowledge_base_ids: request.knowledge_base_ids.clone().unwrap_or_default(),
            inbound_dynamic_variables_webhook_url: request
                .inbound_dynamic_variables_webhook_url
                .clone(),
            last_modification_timestamp: None,
        };
        configs.push(config.clone());
        Ok(config)
    }

    async fn update_llm_config(
        &self,
        llm_id: &str,
        request: &LlmConfigRequest,
    ) -> Result<LlmConfig, PlatformError> {
        self.record(format!("update_llm_config {}", llm_id))?;
        let mut configs = self.llm_configs.lock().unwrap();
        let config = configs
            .iter_mut()
            .find(|c| c.llm_id == llm_id)
            .ok_or_else(|| not_found("LLM", llm_id))?;
        if let Some(prompt) = &request.general_prompt {
            config.general_prompt = Some(prompt.clone());
        }
        if let Some(model) = &request.model {
            config.model = Some(model.clone());
        }
        Ok(config.clone())
    }

    async fn delete_llm_config(&self, llm_id: &str) -> Result<(), PlatformError> {
        self.record(format!("delete_llm_config {}", llm_id))?;
        self.llm_configs.lock().unwrap().retain(|c| c.llm_id != llm_id);
        Ok(())
    }

    async fn list_knowledge_bases(&self) -> Result<Vec<KnowledgeBase>, PlatformError> {
        self.record("list_knowledge_bases".into())?;
        Ok(self.knowledge_bases.lock().unwrap().clone())
    }

    async fn create_knowledge_base(
        &self,
        body: KnowledgeBaseMultipart,
    ) -> Result<KnowledgeBase, PlatformError> {
        self.record("create_knowledge_base".into())?;
        let mut bases = self.knowledge_bases.lock().unwrap();
        let kb = KnowledgeBase {
            knowledge_base_id: format!("kb_{}", bases.len() + 1),
            knowledge_base_name: body.text(FIELD_NAME).unwrap_or_default().to_string(),
            status: KnowledgeBaseStatus::InProgress,
            knowledge_base_sources: vec![],
            last_refreshed_timestamp: None,
        };
        bases.push(kb.clone());
        self.kb_bodies.lock().unwrap().push(body);
        Ok(kb)
    }

    async fn delete_knowledge_base(&self, knowledge_base_id: &str) -> Result<(), PlatformError> {
        self.record(format!("delete_knowledge_base {}", knowledge_base_id))?;
        self.knowledge_bases
            .lock()
            .unwrap()
            .retain(|kb| kb.knowledge_base_id != knowledge_base_id);
        Ok(())
    }

    async fn list_phone_numbers(&self) -> Result<Vec<PhoneNumber>, PlatformError> {
        self.record("list_phone_numbers".into())?;
        Ok(self.phone_numbers.lock().unwrap().clone())
    }

    async fn create_phone_number(
        &self,
        request: &PhoneNumberCreateRequest,
    ) -> Result<PhoneNumber, PlatformError> {
        self.record("create_phone_number".into())?;
        let mut numbers = self.phone_numbers.lock().unwrap();
        let area_code = request.area_code.unwrap_or(415);
        let mut number = sample_phone_number(&format!("+1{}555{:04}", area_code, numbers.len()));
        number.area_code = Some(area_code);
        number.nickname = request.nickname.clone();
        number.inbound_agent_id = request.inbound_agent_id.clone();
        number.outbound_agent_id = request.outbound_agent_id.clone();
        numbers.push(number.clone());
        Ok(number)
    }

    async fn update_phone_number(
        &self,
        phone_number: &str,
        request: &PhoneNumberUpdateRequest,
    ) -> Result<PhoneNumber, PlatformError> {
        self.record(format!("update_phone_number {}", phone_number))?;
        let mut numbers = self.phone_numbers.lock().unwrap();
        let number = numbers
            .iter_mut()
            .find(|n| n.phone_number == phone_number)
            .ok_or_else(|| not_found("Phone number", phone_number))?;
        if request.nickname.is_some() {
            number.nickname = request.nickname.clone();
        }
        if let Some(binding) = &request.inbound_agent_id {
            number.inbound_agent_id = binding.clone();
        }
        if let Some(binding) = &request.outbound_agent_id {
            number.outbound_agent_id = binding.clone();
        }
        Ok(number.clone())
    }

    async fn delete_phone_number(&self, phone_number: &str) -> Result<(), PlatformError> {
        self.record(format!("delete_phone_number {}", phone_number))?;
        self.phone_numbers
            .lock()
            .unwrap()
            .retain(|n| n.phone_number != phone_number);
        Ok(())
    }

    async fn create_web_call(
        &self,
        request: &WebCallCreateRequest,
    ) -> Result<WebCallResponse, PlatformError> {
        self.record(format!("create_web_call {}", request.agent_id))?;
        Ok(WebCallResponse {
            call_id: "call_web_1".into(),
            access_token: "web-access-token".into(),
            agent_id: Some(request.agent_id.clone()),
            call_status: Some(CallStatus::Registered),
        })
    }

    async fn create_phone_call(&self, request: &PhoneCallCreateRequest) -> Result<Call, PlatformError> {
        self.record(format!("create_phone_call {}", request.to_number))?;
        let mut call = sample_call("call_phone_1", CallStatus::Registered);
        call.from_number = Some(request.from_number.clone());
        call.to_number = Some(request.to_number.clone());
        Ok(call)
    }

    async fn get_call(&self, call_id: &str) -> Result<Call, PlatformError> {
        self.record(format!("get_call {}", call_id))?;
        let mut script = self.call_script.lock().unwrap();
        let next = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().cloned()
        };
        next.unwrap_or_else(|| Err(not_found("Call", call_id)))
    }

    async fn list_calls(&self, request: &CallListRequest) -> Result<Vec<Call>, PlatformError> {
        self.record(format!("list_calls limit={}", request.limit))?;
        let calls = self.calls.lock().unwrap();
        Ok(calls.iter().take(request.limit as usize).cloned().collect())
    }

    async fn end_call(&self, call_id: &str) -> Result<(), PlatformError> {
        self.record(format!("end_call {}", call_id))
    }
}
