// src/time_ctrl/tokio_timer.rs
//! Таймеры на tokio: каждый взведённый таймер живёт в отдельной задаче,
//! которая спит и отправляет `TimerFired` в канал событий сервиса.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::trace;

use crate::domain::{ChannelId, TurnGeneration};

use super::scheduler::{ArmedTimer, Scheduler, TimerFired, TimerId, TimerKind};

/// Требует запущенного tokio-рантайма (arm делает `tokio::spawn`).
#[derive(Debug)]
pub struct TokioScheduler {
    origin: Instant,
    next_id: TimerId,
    events: mpsc::UnboundedSender<TimerFired>,
    tasks: HashMap<TimerId, AbortHandle>,
}

impl TokioScheduler {
    pub fn new(events: mpsc::UnboundedSender<TimerFired>) -> Self {
        Self {
            origin: Instant::now(),
            next_id: 0,
            events,
            tasks: HashMap::new(),
        }
    }

    /// Сколько задач-таймеров ещё числится за планировщиком.
    pub fn live_tasks(&self) -> usize {
        self.tasks.len()
    }
}

impl Scheduler for TokioScheduler {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
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
        let fired = TimerFired {
            timer_id: id,
            channel_id,
            kind,
            generation,
        };
        let tx = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(after).await;
            // Сервис мог уже остановиться, тогда событие просто теряется.
            let _ = tx.send(fired);
        });
        self.tasks.insert(id, task.abort_handle());
        trace!(timer = id, channel = channel_id, ?kind, generation, "таймер взведён");

        ArmedTimer {
            id,
            kind,
            generation,
            fires_at_ms: self.now_ms().saturating_add(after.as_millis() as u64),
        }
    }

    fn disarm(&mut self, timer_id: TimerId) {
        if let Some(handle) = self.tasks.remove(&timer_id) {
            handle.abort();
            trace!(timer = timer_id, "таймер снят");
        }
    }
}
