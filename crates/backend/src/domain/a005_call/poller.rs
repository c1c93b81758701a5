//! Опрос статуса одного звонка до терминального состояния.
//!
//! Первый запрос уходит через один интервал после старта, дальше не чаще
//! одного запроса за интервал. Любая ошибка запроса останавливает опрос
//! без повторов. Остановить опрос можно через `PollCancel`.

use contracts::domain::a005_call::aggregate::Call;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::shared::voice_platform::VoicePlatformApi;

#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    /// Звонок в статусе `ended` или `error`
    Terminal(Call),
    /// Запрос статуса не удался, последнее состояние не менялось
    FetchFailed(String),
    Cancelled,
}

/// Ручка остановки опроса
#[derive(Debug, Clone)]
pub struct PollCancel(Arc<watch::Sender<bool>>);

impl PollCancel {
    pub fn pair() -> (Self, watch::Receiver<bool>) {
        let (tx, rx) = watch::channel(false);
        (Self(Arc::new(tx)), rx)
    }

    pub fn cancel(&self) {
        // получателя может уже не быть, если опрос завершился сам
        let _ = self.0.send(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.0.borrow()
    }
}

pub struct CallPoller {
    api: Arc<dyn VoicePlatformApi>,
    call_id: String,
    interval: Duration,
}

impl CallPoller {
    pub fn new(api: Arc<dyn VoicePlatformApi>, call_id: impl Into<String>, interval: Duration) -> Self {
        Self {
            api,
            call_id: call_id.into(),
            interval,
        }
    }

    /// Опрашивает платформу, передавая каждый полученный `Call` в `on_update`
    pub async fn run<F>(&self, mut cancel: watch::Receiver<bool>, mut on_update: F) -> PollOutcome
    where
        F: FnMut(&Call) + Send,
    {
        let mut ticker = time::interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::debug!("Polling call {} every {:?}", self.call_id, self.interval);

        loop {
            tokio::select! {
                _ = ticker.tick() => {}
                _ = wait_cancelled(&mut cancel) => return PollOutcome::Cancelled,
            }

            let fetched = tokio::select! {
                result = self.api.get_call(&self.call_id) => result,
                _ = wait_cancelled(&mut cancel) => return PollOutcome::Cancelled,
            };

            match fetched {
                Ok(call) => {
                    on_update(&call);
                    if call.call_status.is_terminal() {
                        tracing::info!(
                            "Call {} reached status {}",
                            self.call_id,
                            call.call_status.as_str()
                        );
                        return PollOutcome::Terminal(call);
                    }
                }
                Err(e) => {
                    tracing::warn!("Polling call {} stopped: {}", self.call_id, e);
                    return PollOutcome::FetchFailed(e.to_string());
                }
            }
        }
    }
}

/// Завершается при отмене или при закрытии канала
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    loop {
        if *rx.borrow_and_update() {
            return;
        }
        if rx.changed().await.is_err() {
            return;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::voice_platform::mock::{sample_call, MockPlatform};
    use crate::shared::voice_platform::PlatformError;
    use contracts::domain::a005_call::aggregate::CallStatus;

    const INTERVAL: Duration = Duration::from_secs(3);

    fn poller(mock: &Arc<MockPlatform>) -> CallPoller {
        CallPoller::new(mock.clone(), "call_1", INTERVAL)
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_ended() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![
            Ok(sample_call("call_1", CallStatus::Registered)),
            Ok(sample_call("call_1", CallStatus::Ongoing)),
            Ok(sample_call("call_1", CallStatus::Ended)),
        ]);
        let (_cancel, rx) = PollCancel::pair();

        let started = Instant::now();
        let mut seen = Vec::new();
        let outcome = poller(&mock)
            .run(rx, |call| seen.push(call.call_status))
            .await;

        assert!(matches!(outcome, PollOutcome::Terminal(ref c) if c.call_status == CallStatus::Ended));
        assert_eq!(seen, vec![CallStatus::Registered, CallStatus::Ongoing, CallStatus::Ended]);
        assert_eq!(mock.count("get_call"), 3);
        assert!(started.elapsed() >= INTERVAL * 3);
        assert!(started.elapsed() < INTERVAL * 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_error_status() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![Ok(sample_call("call_1", CallStatus::Error))]);
        let (_cancel, rx) = PollCancel::pair();

        let outcome = poller(&mock).run(rx, |_| {}).await;

        assert!(matches!(outcome, PollOutcome::Terminal(ref c) if c.call_status == CallStatus::Error));
        assert_eq!(mock.count("get_call"), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_at_most_one_request_per_interval() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![Ok(sample_call("call_1", CallStatus::Ongoing))]);
        let (cancel, rx) = PollCancel::pair();

        let poller = poller(&mock);
        let handle = tokio::spawn(async move { poller.run(rx, |_| {}).await });

        time::sleep(INTERVAL * 5 + INTERVAL / 2).await;
        assert_eq!(mock.count("get_call"), 5);

        cancel.cancel();
        assert_eq!(handle.await.unwrap(), PollOutcome::Cancelled);

        time::sleep(INTERVAL * 3).await;
        assert_eq!(mock.count("get_call"), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fetch_failure_stops_without_retry() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![
            Ok(sample_call("call_1", CallStatus::Ongoing)),
            Err(PlatformError::Network("connection reset".into())),
        ]);
        let (_cancel, rx) = PollCancel::pair();

        let mut last = None;
        let outcome = poller(&mock)
            .run(rx, |call| last = Some(call.call_status))
            .await;

        assert!(matches!(outcome, PollOutcome::FetchFailed(ref msg) if msg.contains("connection reset")));
        assert_eq!(last, Some(CallStatus::Ongoing));
        assert_eq!(mock.count("get_call"), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_first_poll() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![Ok(sample_call("call_1", CallStatus::Ongoing))]);
        let (cancel, rx) = PollCancel::pair();

        cancel.cancel();
        assert!(cancel.is_cancelled());
        let outcome = poller(&mock).run(rx, |_| {}).await;

        assert_eq!(outcome, PollOutcome::Cancelled);
        assert!(mock.requests().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_cancels() {
        let mock = Arc::new(MockPlatform::new());
        mock.script_calls(vec![Ok(sample_call("call_1", CallStatus::Ongoing))]);
        let (cancel, rx) = PollCancel::pair();
        drop(cancel);

        let outcome = poller(&mock).run(rx, |_| {}).await;
        assert_eq!(outcome, PollOutcome::Cancelled);
    }
}
