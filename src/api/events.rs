//! События для внешнего рендерера (чат-UI).
//!
//! Ядро отдаёт только плоские данные; кнопки и эмбеды собирает рендерер.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::api::dto::SessionView;
use crate::domain::chips::Chips;
use crate::domain::{ChannelId, PlayerId};
use crate::engine::store::ChannelFreed;
use crate::payout::RoundResult;

/// Почему сессия отменена.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CancelReason {
    HostCancelled,
    /// Лобби закрылось с недобором игроков.
    NotEnoughPlayers,
    /// Никто не смог внести залог банкира тинчиро.
    BankerCannotCover,
    InternalInconsistency,
    /// Сервис останавливается.
    Shutdown,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableEvent {
    LobbyOpened(SessionView),
    PlayerJoined {
        player_id: PlayerId,
        view: SessionView,
    },
    LobbyCountdown {
        channel_id: ChannelId,
        seconds_remaining: u64,
        players: usize,
    },
    RoundStarted(SessionView),
    /// Личный вид для одного игрока (карманные карты покера).
    /// Рендерер показывает его только адресату.
    PrivateView {
        player_id: PlayerId,
        view: SessionView,
    },
    /// Ход передан (после действия, таймаута или старта раунда).
    TurnStarted(SessionView),
    RoundResolved(RoundResult),
    Cancelled {
        channel_id: ChannelId,
        reason: CancelReason,
        refunds: Vec<(PlayerId, Chips)>,
    },
    ChannelFreed(ChannelFreed),
}

/// Получатель событий. Вызывается синхронно из цикла сервиса, поэтому
/// реализация не должна блокироваться.
pub trait Presenter: Send + Sync {
    fn present(&self, event: TableEvent);
}

/// Выбрасывает всё.
#[derive(Clone, Debug, Default)]
pub struct NullPresenter;

impl Presenter for NullPresenter {
    fn present(&self, _event: TableEvent) {}
}

/// Копит события в памяти (тесты, dev-CLI).
#[derive(Debug, Default)]
pub struct RecordingPresenter {
    events: Mutex<Vec<TableEvent>>,
}

impl RecordingPresenter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TableEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn take(&self) -> Vec<TableEvent> {
        self.events
            .lock()
            .map(|mut e| std::mem::take(&mut *e))
            .unwrap_or_default()
    }
}

impl Presenter for RecordingPresenter {
    fn present(&self, event: TableEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Пересылка событий в канал (рендерер живёт в своей задаче).
impl Presenter for mpsc::UnboundedSender<TableEvent> {
    fn present(&self, event: TableEvent) {
        // Рендерер мог уйти, это не ошибка движка.
        let _ = self.send(event);
    }
}
