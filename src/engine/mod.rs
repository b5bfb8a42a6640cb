//! Движок сессий: реестр, лобби, ходы, расчёт и асинхронный сервис.
//!
//! Высокоуровневый объект: `TableManager`
//! Основные операции:
//!   - `open_lobby` / `join` / `force_start` / `cancel` – лобби
//!   - `submit_action` – действие игрока
//!   - `on_timer` – тики лобби и дедлайны ходов
//!
//! `CasinoService` крутит `TableManager` в одной tokio-задаче.

pub mod errors;
pub mod lobby;
pub mod resolution;
pub mod service;
pub mod store;
pub mod table_manager;
pub mod turn;

pub use errors::{SessionError, ValidationError};
pub use service::{CasinoService, CommandOutput, ServiceHandle};
pub use store::{ChannelFreed, SessionStore};
pub use table_manager::{Collaborators, TableManager};
pub use turn::{ActionRequest, TurnOutcome};
