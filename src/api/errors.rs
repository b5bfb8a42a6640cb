use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::ChannelId;
use crate::engine::errors::SessionError;

/// Ошибки внешнего API (то, что показываем игроку в чате).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ApiError {
    /// Команда не может быть выполнена в текущем состоянии.
    InvalidCommand(String),

    /// В канале нет игры.
    SessionNotFound(ChannelId),

    /// В канале уже идёт игра.
    ChannelBusy(ChannelId),

    InsufficientFunds { balance: Chips, required: Chips },

    /// Действие от прошлого хода. Игроку не показываем.
    Stale,

    /// Сервис остановлен или недоступен леджер.
    Unavailable(String),

    /// Внутренняя ошибка сервера.
    Internal(String),
}

impl ApiError {
    /// Ошибки, о которых игрока не уведомляем.
    pub fn is_silent(&self) -> bool {
        matches!(self, ApiError::Stale)
    }

    /// Текст уведомления для игрока.
    pub fn notice(&self) -> Option<String> {
        match self {
            ApiError::Stale => None,
            ApiError::InvalidCommand(msg) => Some(msg.clone()),
            ApiError::SessionNotFound(_) => Some("В этом канале сейчас нет игры".into()),
            ApiError::ChannelBusy(_) => Some("В этом канале уже идёт игра".into()),
            ApiError::InsufficientFunds { balance, required } => {
                Some(format!("Недостаточно фишек: баланс {balance}, нужно {required}"))
            }
            ApiError::Unavailable(_) => Some("Сервис временно недоступен, попробуйте позже".into()),
            ApiError::Internal(_) => Some("Внутренняя ошибка, игра отменена".into()),
        }
    }
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Validation(e) => ApiError::InvalidCommand(e.to_string()),
            SessionError::InsufficientFunds { balance, required, .. } => {
                ApiError::InsufficientFunds { balance, required }
            }
            SessionError::StaleAction { .. } => ApiError::Stale,
            SessionError::SessionNotFound(channel) => ApiError::SessionNotFound(channel),
            SessionError::AlreadyResolved(_) => ApiError::InvalidCommand(err.to_string()),
            SessionError::AlreadyActive(channel) => ApiError::ChannelBusy(channel),
            SessionError::InternalInconsistency(msg) => ApiError::Internal(msg),
            SessionError::Ledger(msg) => ApiError::Unavailable(msg),
        }
    }
}
