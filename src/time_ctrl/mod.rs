// src/time_ctrl/mod.rs
//! Контроль времени: правила тайминга хода и планировщики таймеров.
//!
//! Здесь собираем:
//! - правила (`TimeRules`);
//! - абстракцию планировщика (`Scheduler`) и события таймеров;
//! - ручные часы для тестов (`ManualScheduler`);
//! - боевые таймеры на tokio (`TokioScheduler`).

pub mod manual;
pub mod scheduler;
pub mod time_rules;
pub mod tokio_timer;

pub use manual::ManualScheduler;
pub use scheduler::{ArmedTimer, Scheduler, TimerFired, TimerId, TimerKind};
pub use time_rules::{TimeProfile, TimeRules};
pub use tokio_timer::TokioScheduler;

/// Сколько целых секунд осталось до дедлайна (округляем вверх, как в отсчёте лобби).
pub fn seconds_remaining(deadline_ms: u64, now_ms: u64) -> u64 {
    deadline_ms.saturating_sub(now_ms).div_ceil(1000)
}
