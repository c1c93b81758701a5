//! Общие контракты между dashboard и backend: зеркала сущностей
//! голосовой платформы, DTO запросов и формы редактирования.

pub mod domain;
pub mod system;
