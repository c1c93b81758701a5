//! Реестр наблюдений за звонками: последний полученный `Call` и состояние
//! опроса по каждой паре (сессия, call_id).

use chrono::{DateTime, Utc};
use contracts::domain::a005_call::aggregate::Call;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::poller::{CallPoller, PollCancel, PollOutcome};
use crate::shared::session::SessionKey;
use crate::shared::voice_platform::VoicePlatformApi;

/// Завершённые наблюдения старше этого срока (часы) удаляются
const FINISHED_RETENTION_HOURS: i64 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WatchState {
    Polling,
    Finished,
    Failed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize)]
pub struct CallWatchSnapshot {
    pub call_id: String,
    pub state: WatchState,
    pub last_call: Option<Call>,
    pub polls: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub updated_at: DateTime<Utc>,
}

struct WatchEntry {
    generation: u64,
    snapshot: CallWatchSnapshot,
    cancel: Option<PollCancel>,
}

type WatchKey = (SessionKey, String);

#[derive(Default)]
pub struct CallWatchRegistry {
    entries: Mutex<HashMap<WatchKey, WatchEntry>>,
    generation: AtomicU64,
}

pub static CALL_WATCHES: Lazy<Arc<CallWatchRegistry>> =
    Lazy::new(|| Arc::new(CallWatchRegistry::default()));

impl CallWatchRegistry {
    fn entries(&self) -> MutexGuard<'_, HashMap<WatchKey, WatchEntry>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Начать наблюдение за звонком. Уже идущее наблюдение за тем же звонком
    /// останавливается. Для завершённого звонка опрос не запускается.
    pub fn start(
        self: &Arc<Self>,
        api: Arc<dyn VoicePlatformApi>,
        session: SessionKey,
        call: Call,
        interval: Duration,
    ) -> CallWatchSnapshot {
        self.prune();

        let key: WatchKey = (session, call.call_id.clone());
        let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
        let terminal = call.call_status.is_terminal();

        let snapshot = CallWatchSnapshot {
            call_id: call.call_id.clone(),
            state: if terminal {
                WatchState::Finished
            } else {
                WatchState::Polling
            },
            last_call: Some(call),
            polls: 0,
            error: None,
            updated_at: Utc::now(),
        };

        let (cancel, rx) = PollCancel::pair();
        {
            let mut entries = self.entries();
            if let Some(previous) = entries.get(&key).and_then(|e| e.cancel.as_ref()) {
                previous.cancel();
            }
            entries.insert(
                key.clone(),
                WatchEntry {
                    generation,
                    snapshot: snapshot.clone(),
                    cancel: (!terminal).then(|| cancel.clone()),
                },
            );
        }

        if terminal {
            return snapshot;
        }

        tracing::info!("Watching call {} (session {})", key.1, key.0.short());
        let registry = Arc::clone(self);
        tokio::spawn(async move {
            let poller = CallPoller::new(api, key.1.clone(), interval);
            let outcome = poller
                .run(rx, |call| registry.record_update(&key, generation, call))
                .await;
            registry.finish(&key, generation, outcome);
            drop(cancel);
        });

        snapshot
    }

    fn record_update(&self, key: &WatchKey, generation: u64, call: &Call) {
        let mut entries = self.entries();
        if let Some(entry) = entries.get_mut(key).filter(|e| e.generation == generation) {
            entry.snapshot.last_call = Some(call.clone());
            entry.snapshot.polls += 1;
            entry.snapshot.updated_at = Utc::now();
        }
    }

    fn finish(&self, key: &WatchKey, generation: u64, outcome: PollOutcome) {
        let mut entries = self.entries();
        let Some(entry) = entries.get_mut(key).filter(|e| e.generation == generation) else {
            return;
        };

        entry.cancel = None;
        entry.snapshot.updated_at = Utc::now();
        match outcome {
            PollOutcome::Terminal(call) => {
                entry.snapshot.state = WatchState::Finished;
                entry.snapshot.last_call = Some(call);
            }
            PollOutcome::FetchFailed(message) => {
                entry.snapshot.state = WatchState::Failed;
                entry.snapshot.error = Some(message);
            }
            PollOutcome::Cancelled => {
                entry.snapshot.state = WatchState::Cancelled;
            }
        }
    }

    pub fn snapshot(&self, session: &SessionKey, call_id: &str) -> Option<CallWatchSnapshot> {
        self.entries()
            .get(&(session.clone(), call_id.to_string()))
            .map(|e| e.snapshot.clone())
    }

    /// Остановить опрос. Снимок остаётся доступным.
    pub fn cancel(&self, session: &SessionKey, call_id: &str) -> Option<CallWatchSnapshot> {
        let mut entries = self.entries();
        let entry = entries.get_mut(&(session.clone(), call_id.to_string()))?;
        if let Some(cancel) = entry.cancel.take() {
            cancel.cancel();
            entry.snapshot.state = WatchState::Cancelled;
            entry.snapshot.updated_at = Utc::now();
            tracing::info!("Stopped watching call {}", call_id);
        }
        Some(entry.snapshot.clone())
    }

    /// Остановить и забыть все наблюдения сессии (logout)
    pub fn drop_session(&self, session: &SessionKey) -> usize {
        let mut entries = self.entries();
        let before = entries.len();
        entries.retain(|(owner, _), entry| {
            if owner != session {
                return true;
            }
            if let Some(cancel) = entry.cancel.take() {
                cancel.cancel();
            }
            false
        });
        before - entries.len()
    }

    fn prune(&self) {
        let cutoff = Utc::now() - chrono::Duration::hours(FINISHED_RETENTION_HOURS);
        self.entries().retain(|_, entry| {
            entry.snapshot.state == WatchState::Polling || entry.snapshot.updated_at > cutoff
        });
    }
}
