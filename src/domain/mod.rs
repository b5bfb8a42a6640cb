//! Доменная модель казино-столов: фишки, карты, кости, сессия канала.

pub mod card;
pub mod chips;
pub mod deck;
pub mod dice;
pub mod session;

// Базовые идентификаторы. Чат-платформа отдаёт числовые snowflake-id.
pub type PlayerId = u64;
pub type ChannelId = u64;

/// Номер "поколения" хода. Штампуется на таймерах и на действиях игроков,
/// чтобы отбрасывать устаревшие события.
pub type TurnGeneration = u64;

pub use card::*;
pub use chips::*;
pub use deck::*;
pub use dice::*;
pub use session::*;
