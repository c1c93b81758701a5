//! Локальные зеркала списков сущностей платформы.
//!
//! Список заполняется последним ответом `list`, дальше правится точечно
//! после успешных create/update/delete. С сервером не сверяется.

use contracts::domain::a001_agent::aggregate::Agent;
use contracts::domain::a002_llm_config::aggregate::LlmConfig;
use contracts::domain::a003_knowledge_base::aggregate::KnowledgeBase;
use contracts::domain::a004_phone_number::aggregate::PhoneNumber;
use contracts::domain::common::AggregateRoot;
use once_cell::sync::Lazy;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

use super::session::SessionKey;

#[derive(Debug, Clone)]
pub struct ListState<T> {
    items: Vec<T>,
    loaded: bool,
}

impl<T> Default for ListState<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            loaded: false,
        }
    }
}

impl<T: AggregateRoot + Clone> ListState<T> {
    pub fn items(&self) -> &[T] {
        &self.items
    }

    /// Был ли хотя бы один успешный `list`
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn replace_all(&mut self, items: Vec<T>) {
        self.items = items;
        self.loaded = true;
        tracing::debug!("{}: {} mirrored", T::full_name(), self.items.len());
    }

    /// Заменить запись с тем же id или вставить новую в начало
    pub fn upsert(&mut self, item: T) {
        match self.items.iter_mut().find(|existing| existing.id() == item.id()) {
            Some(existing) => *existing = item,
            None => self.items.insert(0, item),
        }
    }

    /// Удалить ровно запись с этим id
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        let removed = self.items.len() != before;
        if !removed {
            tracing::debug!("{} {} was not in the mirror", T::element_name(), id);
        }
        removed
    }
}

/// Зеркала одной сессии
#[derive(Debug, Default)]
pub struct SessionMirror {
    pub agents: ListState<Agent>,
    pub llm_configs: ListState<LlmConfig>,
    pub knowledge_bases: ListState<KnowledgeBase>,
    pub phone_numbers: ListState<PhoneNumber>,
}

pub type SharedMirror = Arc<Mutex<SessionMirror>>;

/// Зеркала сессии без обращений дольше этого срока удаляются
const SESSION_IDLE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

struct SessionEntry {
    mirror: SharedMirror,
    last_used: Instant,
}

pub struct MirrorStore {
    sessions: Mutex<HashMap<SessionKey, SessionEntry>>,
    idle_ttl: Duration,
}

impl Default for MirrorStore {
    fn default() -> Self {
        Self::with_idle_ttl(SESSION_IDLE_TTL)
    }
}

pub static MIRROR_STORE: Lazy<MirrorStore> = Lazy::new(MirrorStore::default);

impl MirrorStore {
    pub fn with_idle_ttl(idle_ttl: Duration) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            idle_ttl,
        }
    }

    /// Зеркала сессии. Сессии, простаивающие дольше `idle_ttl`, удаляются.
    pub async fn session(&self, key: &SessionKey) -> SharedMirror {
        let now = Instant::now();
        let mut sessions = self.sessions.lock().await;

        let before = sessions.len();
        sessions.retain(|owner, entry| {
            owner == key || now.duration_since(entry.last_used) < self.idle_ttl
        });
        let pruned = before - sessions.len();
        if pruned > 0 {
            tracing::debug!("Dropped {} idle session mirrors", pruned);
        }

        let entry = sessions.entry(key.clone()).or_insert_with(|| SessionEntry {
            mirror: SharedMirror::default(),
            last_used: now,
        });
        entry.last_used = now;
        entry.mirror.clone()
    }

    /// Забыть зеркала сессии (logout)
    pub async fn drop_session(&self, key: &SessionKey) -> bool {
        self.sessions.lock().await.remove(key).is_some()
    }

    pub async fn session_count(&self) -> usize {
        self.sessions.lock().await.len()
    }
}
