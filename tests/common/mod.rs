//! Общий стенд для тестов движка: ручные часы, сценарный RNG,
//! in-memory леджер и запись событий.

#![allow(dead_code)]

use std::sync::Arc;

use casino_engine::api::events::{CancelReason, RecordingPresenter, TableEvent};
use casino_engine::config::CasinoConfig;
use casino_engine::domain::chips::Chips;
use casino_engine::domain::session::Session;
use casino_engine::domain::{ChannelId, PlayerId};
use casino_engine::engine::{Collaborators, TableManager};
use casino_engine::infra::ledger::InMemoryLedger;
use casino_engine::infra::notify::RecordingNotifier;
use casino_engine::infra::rng::ScriptedRng;
use casino_engine::payout::RoundResult;
use casino_engine::time_ctrl::ManualScheduler;

pub const CHANNEL: ChannelId = 42;

pub struct Stand {
    pub manager: TableManager<ManualScheduler, ScriptedRng>,
    pub ledger: Arc<InMemoryLedger>,
    pub notifier: Arc<RecordingNotifier>,
    pub presenter: Arc<RecordingPresenter>,
}

impl Stand {
    pub fn new(config: CasinoConfig, balances: &[(PlayerId, u64)]) -> Self {
        Self::with_rng(config, balances, ScriptedRng::new())
    }

    pub fn with_rng(config: CasinoConfig, balances: &[(PlayerId, u64)], rng: ScriptedRng) -> Self {
        Self::build(config, balances, rng, RecordingNotifier::new())
    }

    /// Стенд, у которого хук уведомлений всегда падает.
    pub fn with_failing_notifier(config: CasinoConfig, balances: &[(PlayerId, u64)]) -> Self {
        Self::build(config, balances, ScriptedRng::new(), RecordingNotifier::failing())
    }

    fn build(
        config: CasinoConfig,
        balances: &[(PlayerId, u64)],
        rng: ScriptedRng,
        notifier: RecordingNotifier,
    ) -> Self {
        let ledger = Arc::new(InMemoryLedger::with_balances(
            balances.iter().map(|(p, b)| (*p, Chips(*b))),
        ));
        let notifier = Arc::new(notifier);
        let presenter = Arc::new(RecordingPresenter::new());
        let collab = Collaborators {
            ledger: ledger.clone(),
            notifier: notifier.clone(),
            presenter: presenter.clone(),
        };
        let manager = TableManager::new(config, ManualScheduler::new(), rng, collab).unwrap();
        Self {
            manager,
            ledger,
            notifier,
            presenter,
        }
    }

    /// Сдвинуть часы и доставить все сработавшие таймеры.
    pub async fn advance(&mut self, ms: u64) {
        let fired = self.manager.scheduler_mut().advance(ms);
        for f in fired {
            self.manager.on_timer(f).await;
        }
    }

    /// Двигать часы шагами по `step` мс, пока не пройдёт `total`.
    pub async fn advance_in_steps(&mut self, total: u64, step: u64) {
        let mut passed = 0;
        while passed < total {
            let ms = step.min(total - passed);
            self.advance(ms).await;
            passed += ms;
        }
    }

    pub fn session(&self) -> Option<&Session> {
        self.manager.store().get(CHANNEL)
    }

    pub fn balance(&self, player_id: PlayerId) -> u64 {
        self.ledger.balance(player_id).0
    }

    pub fn events(&self) -> Vec<TableEvent> {
        self.presenter.events()
    }

    pub fn cancel_reason(&self) -> Option<CancelReason> {
        self.events().into_iter().find_map(|e| match e {
            TableEvent::Cancelled { reason, .. } => Some(reason),
            _ => None,
        })
    }

    pub fn resolved(&self) -> Option<RoundResult> {
        self.events().into_iter().find_map(|e| match e {
            TableEvent::RoundResolved(result) => Some(result),
            _ => None,
        })
    }

    pub fn channel_freed(&self) -> bool {
        self.events()
            .iter()
            .any(|e| matches!(e, TableEvent::ChannelFreed(f) if f.channel_id == CHANNEL))
    }
}

/// Конфиг по умолчанию: окно лобби 60 с, тик 10 с, 30 с на ход.
pub fn config() -> CasinoConfig {
    CasinoConfig::standard()
}
