//! Расчёт выплат по итогам раунда.
//!
//! Чистые функции: никаких I/O, только целочисленная арифметика
//! (сначала умножаем, потом делим). На входе финальное состояние
//! раунда и места со ставками, на выходе один `RoundResult`.

pub mod blackjack;
pub mod chinchiro;
pub mod lottery;
pub mod poker;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::CasinoConfig;
use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::session::{GameKind, Seat};
use crate::domain::{ChannelId, PlayerId};
use crate::eval::HandCategory;
use crate::games::{ChinchiroHand, GameState};

pub use blackjack::BjOutcome;
pub use lottery::{split_pool, LotteryPayout, LotteryShare};
pub use poker::{compute_side_pots, SidePot};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PayoutError {
    #[error("Переполнение при расчёте выплаты")]
    Overflow,

    #[error("Ставка игрока {player_id} не сходится: учтено {tracked}, по раунду {derived}")]
    StakeMismatch {
        player_id: PlayerId,
        tracked: Chips,
        derived: Chips,
    },

    #[error("Состояние раунда неполное: {0}")]
    IncompleteState(&'static str),

    #[error("Места сессии не совпадают с местами раунда")]
    SeatCountMismatch,
}

/// Итог одной руки блэкджека.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BjHandSummary {
    pub cards: Vec<Card>,
    pub value: u8,
    pub bet: Chips,
    pub outcome: BjOutcome,
    pub payout: Chips,
}

/// Что показать про руку игрока в итогах.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandSummary {
    Blackjack {
        hands: Vec<BjHandSummary>,
        dealer_cards: Vec<Card>,
        dealer_value: u8,
        insurance: Chips,
        insurance_payout: Chips,
    },
    Chinchiro {
        hand: Option<ChinchiroHand>,
        is_banker: bool,
        skipped: bool,
    },
    Poker {
        category: Option<HandCategory>,
        best_cards: Vec<Card>,
        folded: bool,
        won: Chips,
    },
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PlayerResult {
    pub player_id: PlayerId,
    /// Сколько игрок внёс за раунд.
    pub staked: Chips,
    /// Сколько возвращается игроку (включая его же ставку).
    pub gross_payout: Chips,
    /// gross - staked.
    pub net_change: i64,
    pub summary: HandSummary,
}

impl PlayerResult {
    pub fn new(player_id: PlayerId, staked: Chips, gross_payout: Chips, summary: HandSummary) -> Self {
        Self {
            player_id,
            staked,
            gross_payout,
            net_change: gross_payout.signed_diff(staked),
            summary,
        }
    }
}

/// Неизменяемый итог раунда.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct RoundResult {
    pub channel_id: ChannelId,
    pub game: GameKind,
    pub players: Vec<PlayerResult>,
}

impl RoundResult {
    pub fn total_staked(&self) -> Chips {
        self.players.iter().map(|p| p.staked).sum()
    }

    pub fn total_paid(&self) -> Chips {
        self.players.iter().map(|p| p.gross_payout).sum()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerResult> {
        self.players.iter().find(|p| p.player_id == player_id)
    }
}

/// Посчитать итог раунда для любой игры.
pub fn settle(
    channel_id: ChannelId,
    seats: &[Seat],
    state: &GameState,
    config: &CasinoConfig,
) -> Result<RoundResult, PayoutError> {
    let players = match state {
        GameState::Blackjack(round) => blackjack::settle(seats, round, &config.blackjack.payouts)?,
        GameState::Chinchiro(round) => chinchiro::settle(seats, round, &config.chinchiro)?,
        GameState::Poker(round) => poker::settle(seats, round)?,
    };
    Ok(RoundResult {
        channel_id,
        game: state.game(),
        players,
    })
}
