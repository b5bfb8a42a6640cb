use thiserror::Error;

use crate::domain::chips::Chips;
use crate::domain::session::Phase;
use crate::domain::{ChannelId, PlayerId, TurnGeneration};
use crate::games::RuleError;
use crate::infra::ledger::LedgerError;

/// Запрос отклонён ещё до каких-либо мутаций.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Ставка {bet} вне лимитов стола [{min}, {max}]")]
    BetOutOfRange { bet: Chips, min: Chips, max: Chips },

    #[error("Игрок {0} уже за столом")]
    AlreadyJoined(PlayerId),

    #[error("Стол заполнен")]
    TableFull,

    #[error("Игрок {0} не хост этой сессии")]
    NotHost(PlayerId),

    #[error("Недостаточно игроков: есть {have}, нужно {need}")]
    NotEnoughPlayers { have: usize, need: usize },

    #[error("Игрок {0} не участвует в этой сессии")]
    NotAPlayer(PlayerId),

    #[error("Сейчас не ход игрока с id={0}")]
    NotYourTurn(PlayerId),

    #[error("Команда недоступна в фазе {0:?}")]
    WrongPhase(Phase),

    #[error("Действие относится к другой игре")]
    WrongGame,

    #[error(transparent)]
    Rule(#[from] RuleError),
}

/// Ошибки движка сессий.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Недостаточно фишек у игрока {player_id}: баланс {balance}, нужно {required}")]
    InsufficientFunds {
        player_id: PlayerId,
        balance: Chips,
        required: Chips,
    },

    /// Действие от уже закончившегося хода. Молча отбрасывается.
    #[error("Устаревшее действие: ожидалось поколение {expected}, пришло {got}")]
    StaleAction {
        expected: TurnGeneration,
        got: TurnGeneration,
    },

    #[error("В канале {0} нет активной сессии")]
    SessionNotFound(ChannelId),

    #[error("Сессия в канале {0} уже завершается")]
    AlreadyResolved(ChannelId),

    #[error("В канале {0} уже идёт игра")]
    AlreadyActive(ChannelId),

    /// Фатально только для одной сессии: она принудительно отменяется.
    #[error("Внутренняя несогласованность: {0}")]
    InternalInconsistency(String),

    #[error("Ошибка леджера: {0}")]
    Ledger(String),
}

impl From<RuleError> for SessionError {
    fn from(e: RuleError) -> Self {
        SessionError::Validation(ValidationError::Rule(e))
    }
}

impl From<LedgerError> for SessionError {
    fn from(e: LedgerError) -> Self {
        match e {
            LedgerError::InsufficientFunds {
                player_id,
                balance,
                required,
            } => SessionError::InsufficientFunds {
                player_id,
                balance,
                required,
            },
            LedgerError::Unavailable(msg) => SessionError::Ledger(msg),
        }
    }
}
