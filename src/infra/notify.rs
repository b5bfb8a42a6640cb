//! Хуки "после раунда": ачивки, миссии и т.п.
//!
//! Вызываются best-effort: ошибка хука логируется и не влияет на результат раунда.

use std::sync::Mutex;

use async_trait::async_trait;
use thiserror::Error;

use crate::payout::RoundResult;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("Хук уведомлений упал: {0}")]
pub struct NotifyError(pub String);

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn round_resolved(&self, result: &RoundResult) -> Result<(), NotifyError>;
}

/// Ничего не делает.
#[derive(Clone, Debug, Default)]
pub struct NoopNotifier;

#[async_trait]
impl Notifier for NoopNotifier {
    async fn round_resolved(&self, _result: &RoundResult) -> Result<(), NotifyError> {
        Ok(())
    }
}

/// Запоминает все результаты; может имитировать падение хука.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    pub fail: bool,
    seen: Mutex<Vec<RoundResult>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<RoundResult> {
        self.seen.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn round_resolved(&self, result: &RoundResult) -> Result<(), NotifyError> {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(result.clone());
        }
        if self.fail {
            return Err(NotifyError("achievement service is down".into()));
        }
        Ok(())
    }
}
