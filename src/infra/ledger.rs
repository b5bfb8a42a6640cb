//! Внешний сервис баланса (леджер) и in-memory реализация для тестов / dev-CLI.
//!
//! Леджер остаётся единственным источником правды о том, может ли игрок себе позволить ставку.
//! Движок никогда не держит у себя "стек" игрока: каждое списание/начисление
//! идёт через `Ledger::debit` / `Ledger::credit`.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{ChannelId, Chips, PlayerId};

/// Зачем двигаем фишки (уходит в журнал леджера).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum LedgerReason {
    /// Ставка при входе в лобби.
    Escrow { channel_id: ChannelId },
    /// Дабл в блэкджеке.
    Double { channel_id: ChannelId },
    /// Сплит в блэкджеке.
    Split { channel_id: ChannelId },
    /// Страховка в блэкджеке.
    Insurance { channel_id: ChannelId },
    /// Колл / рейз в покере.
    PokerBet { channel_id: ChannelId },
    /// Залог банкира в тинчиро.
    BankerCollateral { channel_id: ChannelId },
    /// Выплата по итогам раунда.
    Payout { channel_id: ChannelId },
    /// Возврат при отмене сессии.
    Refund { channel_id: ChannelId },
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Недостаточно фишек у игрока {player_id}: баланс {balance}, нужно {required}")]
    InsufficientFunds {
        player_id: PlayerId,
        balance: Chips,
        required: Chips,
    },

    #[error("Леджер недоступен: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait Ledger: Send + Sync {
    /// Списать `amount`. Атомарно: либо списано целиком, либо ничего.
    async fn debit(
        &self,
        player_id: PlayerId,
        amount: Chips,
        reason: LedgerReason,
    ) -> Result<Chips, LedgerError>;

    /// Начислить `amount`. Возвращает новый баланс.
    async fn credit(
        &self,
        player_id: PlayerId,
        amount: Chips,
        reason: LedgerReason,
    ) -> Result<Chips, LedgerError>;
}

/// Запись журнала in-memory леджера.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LedgerEntry {
    pub player_id: PlayerId,
    /// Плюс: начисление, минус: списание.
    pub delta: i64,
    pub reason: LedgerReason,
}

#[derive(Debug, Default)]
struct LedgerInner {
    balances: HashMap<PlayerId, Chips>,
    journal: Vec<LedgerEntry>,
}

/// Простая in-memory реализация для тестов и локального запуска.
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    inner: Mutex<LedgerInner>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Леджер с начальными балансами.
    pub fn with_balances<I>(balances: I) -> Self
    where
        I: IntoIterator<Item = (PlayerId, Chips)>,
    {
        let ledger = Self::new();
        if let Ok(mut inner) = ledger.inner.lock() {
            inner.balances.extend(balances);
        }
        ledger
    }

    pub fn balance(&self, player_id: PlayerId) -> Chips {
        self.inner
            .lock()
            .map(|inner| inner.balances.get(&player_id).copied().unwrap_or(Chips::ZERO))
            .unwrap_or(Chips::ZERO)
    }

    /// Сумма всех балансов (для проверки сохранения фишек в тестах).
    pub fn total(&self) -> Chips {
        self.inner
            .lock()
            .map(|inner| inner.balances.values().copied().sum())
            .unwrap_or(Chips::ZERO)
    }

    pub fn journal(&self) -> Vec<LedgerEntry> {
        self.inner
            .lock()
            .map(|inner| inner.journal.clone())
            .unwrap_or_default()
    }

    fn poisoned() -> LedgerError {
        LedgerError::Unavailable("ledger mutex poisoned".into())
    }
}

#[async_trait]
impl Ledger for InMemoryLedger {
    async fn debit(
        &self,
        player_id: PlayerId,
        amount: Chips,
        reason: LedgerReason,
    ) -> Result<Chips, LedgerError> {
        let mut inner = self.inner.lock().map_err(|_| Self::poisoned())?;
        let balance = inner.balances.get(&player_id).copied().unwrap_or(Chips::ZERO);
        if balance < amount {
            return Err(LedgerError::InsufficientFunds {
                player_id,
                balance,
                required: amount,
            });
        }
        let new_balance = balance - amount;
        inner.balances.insert(player_id, new_balance);
        inner.journal.push(LedgerEntry {
            player_id,
            delta: -(amount.0 as i64),
            reason,
        });
        Ok(new_balance)
    }

    async fn credit(
        &self,
        player_id: PlayerId,
        amount: Chips,
        reason: LedgerReason,
    ) -> Result<Chips, LedgerError> {
        let mut inner = self.inner.lock().map_err(|_| Self::poisoned())?;
        let balance = inner.balances.entry(player_id).or_insert(Chips::ZERO);
        *balance += amount;
        let new_balance = *balance;
        inner.journal.push(LedgerEntry {
            player_id,
            delta: amount.0 as i64,
            reason,
        });
        Ok(new_balance)
    }
}
