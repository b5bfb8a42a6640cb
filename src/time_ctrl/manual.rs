// src/time_ctrl/manual.rs
//! Ручные часы: время двигается только через `advance`.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::{ChannelId, TurnGeneration};

use super::scheduler::{ArmedTimer, Scheduler, TimerFired, TimerId, TimerKind};

#[derive(Clone, Debug, Default)]
pub struct ManualScheduler {
    now_ms: u64,
    next_id: TimerId,
    /// (момент срабатывания, id) -> событие. Порядок ключей = порядок срабатывания.
    pending: BTreeMap<(u64, TimerId), TimerFired>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Сдвинуть часы на `ms` и вернуть все сработавшие таймеры по порядку.
    pub fn advance(&mut self, ms: u64) -> Vec<TimerFired> {
        self.now_ms = self.now_ms.saturating_add(ms);
        let still_pending = self.pending.split_off(&(self.now_ms.saturating_add(1), 0));
        let fired = std::mem::replace(&mut self.pending, still_pending);
        fired.into_values().collect()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn is_armed(&self, timer_id: TimerId) -> bool {
        self.pending.keys().any(|(_, id)| *id == timer_id)
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn arm(
        &mut self,
        channel_id: ChannelId,
        kind: TimerKind,
        generation: TurnGeneration,
        after: Duration,
    ) -> ArmedTimer {
        self.next_id += 1;
        let id = self.next_id;
        let fires_at_ms = self.now_ms.saturating_add(after.as_millis() as u64);
        self.pending.insert(
            (fires_at_ms, id),
            TimerFired {
                timer_id: id,
                channel_id,
                kind,
                generation,
            },
        );
        ArmedTimer {
            id,
            kind,
            generation,
            fires_at_ms,
        }
    }

    fn disarm(&mut self, timer_id: TimerId) {
        self.pending.retain(|(_, id), _| *id != timer_id);
    }
}
