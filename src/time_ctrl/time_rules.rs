// src/time_ctrl/time_rules.rs
//! Конфигурация тайминга хода (shot-clock).
//!
//! Здесь описываем только "правила", без состояния и без привязки к конкретному столу.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Профиль тайминга.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TimeProfile {
    /// Обычный стол: 30 сек на ход.
    Standard,
    /// Быстрый стол: 15 сек на ход.
    Turbo,
}

/// Правила тайминга для одного стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRules {
    /// Сколько секунд даётся на одно решение.
    pub base_action_secs: u32,
}

impl TimeRules {
    pub const fn new(base_action_secs: u32) -> Self {
        Self { base_action_secs }
    }

    pub const fn standard() -> Self {
        Self {
            base_action_secs: 30,
        }
    }

    pub const fn turbo() -> Self {
        Self {
            base_action_secs: 15,
        }
    }

    pub const fn from_profile(profile: TimeProfile) -> Self {
        match profile {
            TimeProfile::Standard => Self::standard(),
            TimeProfile::Turbo => Self::turbo(),
        }
    }

    pub fn action_timeout(&self) -> Duration {
        Duration::from_secs(self.base_action_secs as u64)
    }
}
