// src/engine/table_manager.rs

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use crate::api::dto::{build_session_view, build_session_view_for, SessionView};
use crate::api::events::{CancelReason, Presenter, TableEvent};
use crate::config::{CasinoConfig, ConfigError};
use crate::domain::chips::Chips;
use crate::domain::session::Phase;
use crate::domain::{ChannelId, PlayerId};
use crate::engine::errors::SessionError;
use crate::engine::store::SessionStore;
use crate::infra::ledger::{Ledger, LedgerReason};
use crate::infra::notify::Notifier;
use crate::infra::rng::RandomSource;
use crate::time_ctrl::{Scheduler, TimerFired, TimerKind};

/// Внешние сервисы, с которыми работает движок.
#[derive(Clone)]
pub struct Collaborators {
    pub ledger: Arc<dyn Ledger>,
    pub notifier: Arc<dyn Notifier>,
    pub presenter: Arc<dyn Presenter>,
}

/// Менеджер столов:
/// - хранит сессии по каналам (через `SessionStore`);
/// - владеет RNG и конфигом;
/// - операции лобби (`lobby.rs`), ходов (`turn.rs`) и расчёта (`resolution.rs`)
///   реализованы отдельными impl-блоками.
///
/// Все методы рассчитаны на вызов из одного цикла событий: между вызовами
/// нет параллелизма, но внутри async-метода сессия может исчезнуть
/// на любом `await`, поэтому после каждого `await` сессию берём из стора заново.
pub struct TableManager<S: Scheduler, R: RandomSource> {
    pub(crate) store: SessionStore<S>,
    pub(crate) rng: R,
    pub(crate) config: CasinoConfig,
    pub(crate) collab: Collaborators,
}

impl<S: Scheduler, R: RandomSource> TableManager<S, R> {
    pub fn new(config: CasinoConfig, scheduler: S, rng: R, collab: Collaborators) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            store: SessionStore::new(scheduler),
            rng,
            config,
            collab,
        })
    }

    pub fn config(&self) -> &CasinoConfig {
        &self.config
    }

    pub fn store(&self) -> &SessionStore<S> {
        &self.store
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        self.store.scheduler_mut()
    }

    /// Публичный вид сессии в канале.
    pub fn view(&self, channel_id: ChannelId) -> Option<SessionView> {
        let now = self.store.now_ms();
        self.store.get(channel_id).map(|s| build_session_view(s, now))
    }

    /// Вид сессии глазами игрока: со своими карманными картами.
    pub fn view_for(&self, channel_id: ChannelId, player_id: PlayerId) -> Option<SessionView> {
        let now = self.store.now_ms();
        self.store
            .get(channel_id)
            .map(|s| build_session_view_for(s, now, player_id))
    }

    pub(crate) fn emit(&self, event: TableEvent) {
        self.collab.presenter.present(event);
    }

    pub(crate) fn emit_view(&self, channel_id: ChannelId, wrap: fn(SessionView) -> TableEvent) {
        if let Some(view) = self.view(channel_id) {
            self.emit(wrap(view));
        }
    }

    /// Разослать каждому игроку его личный вид.
    pub(crate) fn emit_private_views(&self, channel_id: ChannelId) {
        let Some(session) = self.store.get(channel_id) else {
            return;
        };
        let now = self.store.now_ms();
        for seat in &session.players {
            self.emit(TableEvent::PrivateView {
                player_id: seat.player_id,
                view: build_session_view_for(session, now, seat.player_id),
            });
        }
    }

    /// Взвести дедлайн хода под текущим поколением и записать его в сессию.
    pub(crate) fn arm_turn_deadline(&mut self, channel_id: ChannelId, after: Duration) {
        if let Some(timer) = self.store.arm(channel_id, TimerKind::TurnDeadline, after) {
            if let Some(session) = self.store.get_mut(channel_id) {
                session.deadline_ms = Some(timer.fires_at_ms);
            }
        }
    }

    /// Вход для всех срабатываний таймеров. Ошибки не пробрасываются:
    /// таймер не должен оставить сессию зависшей посреди хода.
    pub async fn on_timer(&mut self, fired: TimerFired) {
        let result = match fired.kind {
            TimerKind::LobbyTick => self.on_lobby_tick(fired).await,
            TimerKind::TurnDeadline => self.on_deadline(fired).await.map(|_| ()),
        };
        match result {
            Ok(()) => {}
            Err(SessionError::InternalInconsistency(msg)) => {
                error!(channel = fired.channel_id, %msg, "несогласованность на таймере, отменяем сессию");
                self.force_cancel(fired.channel_id, CancelReason::InternalInconsistency).await;
            }
            Err(e) => warn!(channel = fired.channel_id, error = %e, "ошибка обработки таймера"),
        }
    }

    /// Отменить сессию: синхронно фаза `Cancelled`, снятие таймеров и удаление
    /// из стора, потом возврат всех ставок через леджер.
    pub(crate) async fn force_cancel(&mut self, channel_id: ChannelId, reason: CancelReason) -> Vec<(PlayerId, Chips)> {
        let Some(session) = self.store.get_mut(channel_id) else {
            return Vec::new();
        };
        session.phase = Phase::Cancelled;
        session.current = None;
        let refunds: Vec<(PlayerId, Chips)> = session
            .players
            .iter()
            .filter(|s| !s.staked.is_zero())
            .map(|s| (s.player_id, s.staked))
            .collect();
        self.store.disarm_all(channel_id);
        let freed = self.store.remove(channel_id);
        info!(channel = channel_id, ?reason, players = refunds.len(), "сессия отменена");

        let ledger = Arc::clone(&self.collab.ledger);
        for (player_id, amount) in &refunds {
            if let Err(e) = ledger
                .credit(*player_id, *amount, LedgerReason::Refund { channel_id })
                .await
            {
                error!(channel = channel_id, player = player_id, %amount, error = %e, "возврат ставки не прошёл");
            }
        }

        self.emit(TableEvent::Cancelled {
            channel_id,
            reason,
            refunds: refunds.clone(),
        });
        if let Some(freed) = freed {
            self.emit(TableEvent::ChannelFreed(freed));
        }
        refunds
    }

    /// Отменить все живые сессии (остановка сервиса).
    pub async fn shutdown(&mut self) {
        for channel_id in self.store.channels() {
            debug!(channel = channel_id, "остановка: отменяем сессию");
            self.force_cancel(channel_id, CancelReason::Shutdown).await;
        }
    }
}
