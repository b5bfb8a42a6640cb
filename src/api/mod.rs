//! Внешний API движка столов.
//!
//! Здесь описываются:
//! - команды (commands.rs): всё, что меняет состояние;
//! - DTO (dto.rs): плоские виды сессии для рендерера;
//! - события (events.rs): что ядро сообщает наружу;
//! - ошибки (errors.rs): то, что видит игрок.

pub mod commands;
pub mod dto;
pub mod errors;
pub mod events;

pub use commands::*;
pub use dto::*;
pub use errors::*;
pub use events::*;
