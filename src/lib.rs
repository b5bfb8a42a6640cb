//! Движок настольных игр для чат-каналов: блэкджек, тинчиро, покер.
//!
//! Ядро занимается сессиями столов: набор в лобби, очерёдность ходов с дедлайнами,
//! правила игр и целочисленный расчёт выплат. Рендеринг, разбор команд,
//! хранение балансов и загрузка конфига остаются внешним сервисам (см. `infra`, `api`).

pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod eval;
pub mod games;
pub mod infra;
pub mod payout;
pub mod time_ctrl;

pub use config::CasinoConfig;
pub use engine::{CasinoService, Collaborators, ServiceHandle, TableManager};
