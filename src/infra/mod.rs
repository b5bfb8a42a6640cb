//! Инфраструктурный слой вокруг движка столов:
//! - RNG-реализации для движков игр;
//! - леджер балансов (внешний коллаборатор) + in-memory реализация;
//! - best-effort хуки уведомлений.

pub mod ledger;
pub mod notify;
pub mod rng;

pub use ledger::*;
pub use notify::*;
pub use rng::*;
