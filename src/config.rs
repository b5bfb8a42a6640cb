//! Конфигурация столов.
//!
//! Загрузка конфига (файлы, env) делает внешний код; здесь только
//! структура, пресеты, валидация и разбор из JSON.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::chips::{Chips, Ratio};
use crate::domain::session::GameKind;
use crate::time_ctrl::TimeRules;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Некорректный конфиг: {0}")]
    Invalid(String),

    #[error("Не удалось разобрать конфиг: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Набор игроков в лобби.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LobbyRules {
    /// Сколько секунд лобби принимает игроков.
    pub join_window_secs: u32,
    /// Как часто обновляем обратный отсчёт (последний тик делает переход).
    pub tick_secs: u32,
}

impl LobbyRules {
    pub const fn standard() -> Self {
        Self {
            join_window_secs: 60,
            tick_secs: 10,
        }
    }
}

/// Лимиты стола: игроки и ставки.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TableLimits {
    pub min_players: u8,
    pub max_players: u8,
    pub min_bet: Chips,
    pub max_bet: Chips,
}

impl TableLimits {
    fn validate(&self, game: &str) -> Result<(), ConfigError> {
        if self.min_players == 0 {
            return Err(ConfigError::Invalid(format!("{game}: min_players = 0")));
        }
        if self.min_players > self.max_players {
            return Err(ConfigError::Invalid(format!("{game}: min_players > max_players")));
        }
        if self.min_bet.is_zero() {
            return Err(ConfigError::Invalid(format!("{game}: min_bet = 0")));
        }
        if self.min_bet > self.max_bet {
            return Err(ConfigError::Invalid(format!("{game}: min_bet > max_bet")));
        }
        Ok(())
    }
}

/// Коэффициенты выплат блэкджека (gross, включая саму ставку).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackPayouts {
    /// Обычная победа: 2x.
    pub win: Ratio,
    /// Натуральный блэкджек: 2.5x.
    pub natural: Ratio,
    /// Страховка при блэкджеке дилера: 3x (2:1 + ставка).
    pub insurance: Ratio,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackRules {
    pub limits: TableLimits,
    pub turn: TimeRules,
    /// Сколько колод в шу.
    pub decks: u8,
    /// Максимум рук у одного игрока после сплитов.
    pub max_hands: u8,
    pub dealer_hits_soft_17: bool,
    pub payouts: BlackjackPayouts,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChinchiroRules {
    pub limits: TableLimits,
    pub turn: TimeRules,
    /// Всего бросков на мэнаши: первый + два переброса.
    pub max_rolls: u8,
    /// Обычная победа/поражение: 1x ставки.
    pub ordinary: Ratio,
    /// Хифуми (и хифуми банкира): 2x ставки.
    pub hifumi: Ratio,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PokerRules {
    pub limits: TableLimits,
    pub turn: TimeRules,
    /// Минимальный размер повышающей части рейза.
    pub min_raise: Chips,
}

/// Полный конфиг движка столов.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CasinoConfig {
    pub lobby: LobbyRules,
    pub blackjack: BlackjackRules,
    pub chinchiro: ChinchiroRules,
    pub poker: PokerRules,
}

impl Default for CasinoConfig {
    fn default() -> Self {
        Self::standard()
    }
}

impl CasinoConfig {
    /// Стандартный пресет.
    pub fn standard() -> Self {
        Self {
            lobby: LobbyRules::standard(),
            blackjack: BlackjackRules {
                limits: TableLimits {
                    min_players: 1,
                    max_players: 6,
                    min_bet: Chips(100),
                    max_bet: Chips(100_000),
                },
                turn: TimeRules::standard(),
                decks: 4,
                max_hands: 4,
                dealer_hits_soft_17: false,
                payouts: BlackjackPayouts {
                    win: Ratio::whole(2),
                    natural: Ratio::new(5, 2),
                    insurance: Ratio::whole(3),
                },
            },
            chinchiro: ChinchiroRules {
                limits: TableLimits {
                    min_players: 2,
                    max_players: 6,
                    min_bet: Chips(100),
                    max_bet: Chips(50_000),
                },
                turn: TimeRules::standard(),
                max_rolls: 3,
                ordinary: Ratio::whole(1),
                hifumi: Ratio::whole(2),
            },
            poker: PokerRules {
                limits: TableLimits {
                    min_players: 2,
                    max_players: 8,
                    min_bet: Chips(100),
                    max_bet: Chips(10_000),
                },
                turn: TimeRules::standard(),
                min_raise: Chips(100),
            },
        }
    }

    /// Разобрать конфиг из JSON и сразу провалидировать.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: CasinoConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Жёсткая валидация конфига.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lobby.join_window_secs == 0 {
            return Err(ConfigError::Invalid("lobby: join_window_secs = 0".into()));
        }
        if self.lobby.tick_secs == 0 {
            return Err(ConfigError::Invalid("lobby: tick_secs = 0".into()));
        }

        self.blackjack.limits.validate("blackjack")?;
        if self.blackjack.decks == 0 {
            return Err(ConfigError::Invalid("blackjack: decks = 0".into()));
        }
        if !(1..=4).contains(&self.blackjack.max_hands) {
            return Err(ConfigError::Invalid("blackjack: max_hands must be in [1, 4]".into()));
        }
        for (name, ratio) in [
            ("win", self.blackjack.payouts.win),
            ("natural", self.blackjack.payouts.natural),
            ("insurance", self.blackjack.payouts.insurance),
        ] {
            if ratio.den == 0 {
                return Err(ConfigError::Invalid(format!("blackjack: payouts.{name} den = 0")));
            }
        }

        self.chinchiro.limits.validate("chinchiro")?;
        if self.chinchiro.limits.min_players < 2 {
            return Err(ConfigError::Invalid("chinchiro: needs a banker and a player".into()));
        }
        if self.chinchiro.max_rolls == 0 {
            return Err(ConfigError::Invalid("chinchiro: max_rolls = 0".into()));
        }
        if self.chinchiro.ordinary.den == 0 || self.chinchiro.hifumi.den == 0 {
            return Err(ConfigError::Invalid("chinchiro: ratio den = 0".into()));
        }
        // Эскроу считается по хифуми, значит хифуми должен быть худшим исходом для игрока.
        let (o, h) = (self.chinchiro.ordinary, self.chinchiro.hifumi);
        if (o.num as u128) * (h.den as u128) > (h.num as u128) * (o.den as u128) {
            return Err(ConfigError::Invalid("chinchiro: ordinary > hifumi".into()));
        }

        self.poker.limits.validate("poker")?;
        if self.poker.limits.min_players < 2 {
            return Err(ConfigError::Invalid("poker: min_players < 2".into()));
        }
        if self.poker.min_raise.is_zero() {
            return Err(ConfigError::Invalid("poker: min_raise = 0".into()));
        }

        for (name, turn) in [
            ("blackjack", &self.blackjack.turn),
            ("chinchiro", &self.chinchiro.turn),
            ("poker", &self.poker.turn),
        ] {
            if turn.base_action_secs == 0 {
                return Err(ConfigError::Invalid(format!("{name}: base_action_secs = 0")));
            }
        }
        Ok(())
    }

    pub fn limits(&self, game: GameKind) -> &TableLimits {
        match game {
            GameKind::Blackjack => &self.blackjack.limits,
            GameKind::Chinchiro => &self.chinchiro.limits,
            GameKind::Poker => &self.poker.limits,
        }
    }

    pub fn turn_rules(&self, game: GameKind) -> &TimeRules {
        match game {
            GameKind::Blackjack => &self.blackjack.turn,
            GameKind::Chinchiro => &self.chinchiro.turn,
            GameKind::Poker => &self.poker.turn,
        }
    }

    /// Сколько списываем при входе в лобби со ставкой `bet`.
    ///
    /// В тинчиро игрок может проиграть хифуми (2x), поэтому эскроу = bet * hifumi.
    pub fn escrow_for(&self, game: GameKind, bet: Chips) -> Option<Chips> {
        match game {
            GameKind::Blackjack | GameKind::Poker => Some(bet),
            GameKind::Chinchiro => self.chinchiro.hifumi.apply(bet),
        }
    }
}
