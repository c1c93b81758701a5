pub mod a001_agent;
pub mod a002_llm_config;
pub mod a003_knowledge_base;
pub mod a004_phone_number;
pub mod a005_call;
