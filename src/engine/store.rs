//! Реестр сессий: не больше одной сессии на канал.
//!
//! Стор владеет планировщиком, поэтому таймеры сессии и её список
//! `timers` всегда меняются вместе.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::session::{GameKind, Session};
use crate::domain::{ChannelId, PlayerId, TurnGeneration};
use crate::engine::errors::SessionError;
use crate::time_ctrl::{ArmedTimer, Scheduler, TimerFired, TimerKind};

/// Сигнал "канал свободен" после удаления сессии.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChannelFreed {
    pub channel_id: ChannelId,
}

pub struct SessionStore<S: Scheduler> {
    sessions: HashMap<ChannelId, Session>,
    scheduler: S,
    /// Счётчик ротации банкира тинчиро по каналам.
    banker_rotation: HashMap<ChannelId, u64>,
}

impl<S: Scheduler> SessionStore<S> {
    pub fn new(scheduler: S) -> Self {
        Self {
            sessions: HashMap::new(),
            scheduler,
            banker_rotation: HashMap::new(),
        }
    }

    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn scheduler_mut(&mut self) -> &mut S {
        &mut self.scheduler
    }

    pub fn now_ms(&self) -> u64 {
        self.scheduler.now_ms()
    }

    /// Завести сессию. Второй `create` на занятый канал отклоняется.
    pub fn create(
        &mut self,
        channel_id: ChannelId,
        game: GameKind,
        host: PlayerId,
    ) -> Result<&mut Session, SessionError> {
        if self.sessions.contains_key(&channel_id) {
            return Err(SessionError::AlreadyActive(channel_id));
        }
        let now = self.scheduler.now_ms();
        Ok(self
            .sessions
            .entry(channel_id)
            .or_insert_with(|| Session::new(channel_id, game, host, now)))
    }

    pub fn contains(&self, channel_id: ChannelId) -> bool {
        self.sessions.contains_key(&channel_id)
    }

    pub fn get(&self, channel_id: ChannelId) -> Option<&Session> {
        self.sessions.get(&channel_id)
    }

    pub fn get_mut(&mut self, channel_id: ChannelId) -> Option<&mut Session> {
        self.sessions.get_mut(&channel_id)
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    pub fn channels(&self) -> Vec<ChannelId> {
        let mut ids: Vec<ChannelId> = self.sessions.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Удалить сессию: сначала снимаем все её таймеры.
    pub fn remove(&mut self, channel_id: ChannelId) -> Option<ChannelFreed> {
        let session = self.sessions.remove(&channel_id)?;
        for timer in &session.timers {
            self.scheduler.disarm(timer.id);
        }
        debug!(channel = channel_id, timers = session.timers.len(), "сессия удалена");
        Some(ChannelFreed { channel_id })
    }

    /// Взвести таймер вида `kind` под текущим поколением сессии.
    /// Старый таймер того же вида снимается.
    pub fn arm(&mut self, channel_id: ChannelId, kind: TimerKind, after: Duration) -> Option<ArmedTimer> {
        self.disarm(channel_id, kind);
        let session = self.sessions.get_mut(&channel_id)?;
        let timer = self.scheduler.arm(channel_id, kind, session.generation, after);
        session.timers.push(timer);
        Some(timer)
    }

    pub fn disarm(&mut self, channel_id: ChannelId, kind: TimerKind) {
        if let Some(session) = self.sessions.get_mut(&channel_id) {
            let scheduler = &mut self.scheduler;
            session.timers.retain(|t| {
                if t.kind == kind {
                    scheduler.disarm(t.id);
                    false
                } else {
                    true
                }
            });
        }
    }

    pub fn disarm_all(&mut self, channel_id: ChannelId) {
        if let Some(session) = self.sessions.get_mut(&channel_id) {
            for timer in session.timers.drain(..) {
                self.scheduler.disarm(timer.id);
            }
        }
    }

    /// Увеличить поколение хода. Возвращает новое значение.
    pub fn bump_generation(&mut self, channel_id: ChannelId) -> Option<TurnGeneration> {
        let session = self.sessions.get_mut(&channel_id)?;
        session.generation += 1;
        Some(session.generation)
    }

    /// Принять срабатывание таймера: true, только если это живой таймер
    /// этой сессии. Таймер при этом вычёркивается из списка.
    pub fn take_fired(&mut self, fired: &TimerFired) -> bool {
        let Some(session) = self.sessions.get_mut(&fired.channel_id) else {
            return false;
        };
        let Some(pos) = session.timers.iter().position(|t| t.id == fired.timer_id) else {
            return false;
        };
        let timer = session.timers.remove(pos);
        self.scheduler.disarm(timer.id);
        timer.kind == fired.kind && timer.generation == fired.generation
    }

    pub fn banker_rotation(&self, channel_id: ChannelId) -> u64 {
        self.banker_rotation.get(&channel_id).copied().unwrap_or(0)
    }

    /// Сдвинуть банкира на следующее место (после раунда тинчиро).
    pub fn advance_banker(&mut self, channel_id: ChannelId) {
        *self.banker_rotation.entry(channel_id).or_insert(0) += 1;
    }
}
