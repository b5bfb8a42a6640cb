// src/time_ctrl/scheduler.rs
//! Планировщик таймеров сессий.
//!
//! Таймер ничего не делает сам: при срабатывании он только отдаёт
//! `TimerFired`, а решение (устарел / нет) принимает координатор, сверяя
//! id таймера и поколение хода с состоянием сессии.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::domain::{ChannelId, TurnGeneration};

pub type TimerId = u64;

/// Назначение таймера.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Тик обратного отсчёта лобби.
    LobbyTick,
    /// Дедлайн хода текущего игрока.
    TurnDeadline,
}

/// Таймер, взведённый для сессии.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArmedTimer {
    pub id: TimerId,
    pub kind: TimerKind,
    /// Поколение хода на момент взведения.
    pub generation: TurnGeneration,
    pub fires_at_ms: u64,
}

/// Событие срабатывания таймера.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerFired {
    pub timer_id: TimerId,
    pub channel_id: ChannelId,
    pub kind: TimerKind,
    pub generation: TurnGeneration,
}

/// Источник времени и таймеров.
///
/// Реализации: `ManualScheduler` (ручные часы для тестов)
/// и `TokioScheduler` (таймеры на tokio-задачах).
pub trait Scheduler {
    /// Монотонное время планировщика, мс.
    fn now_ms(&self) -> u64;

    /// Взвести таймер; через `after` придёт `TimerFired`.
    fn arm(
        &mut self,
        channel_id: ChannelId,
        kind: TimerKind,
        generation: TurnGeneration,
        after: Duration,
    ) -> ArmedTimer;

    /// Снять таймер. Снятие уже сработавшего или неизвестного таймера ничего не делает.
    fn disarm(&mut self, timer_id: TimerId);
}
