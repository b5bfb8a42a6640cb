//! Движки правил игр.
//!
//! Каждая игра реализует `RoundEngine`; сессия хранит состояние раунда
//! в теговом enum `GameState` и диспатчит действия через него.
//!
//! Контракт движка:
//!   - `validate` не мутирует ничего;
//!   - `apply_action` сначала валидирует, потом мутирует (ошибка = состояние не тронуто);
//!   - `default_action_on_timeout`: действие, которым закрывается ход по таймауту.

pub mod betting;
pub mod blackjack;
pub mod chinchiro;
pub mod errors;
pub mod poker;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::session::GameKind;
use crate::infra::rng::RandomSource;

pub use blackjack::{BlackjackAction, BlackjackRound};
pub use chinchiro::{ChinchiroAction, ChinchiroHand, ChinchiroRound};
pub use errors::RuleError;
pub use poker::{PokerAction, PokerRound};

/// Общий интерфейс движка правил одной игры.
pub trait RoundEngine {
    type Action: Clone + core::fmt::Debug;

    /// Допустимо ли действие для места `seat` прямо сейчас.
    fn validate(&self, seat: usize, action: &Self::Action) -> Result<(), RuleError>;

    /// Сколько фишек нужно дополнительно списать под это действие.
    /// Вызывается только после успешного `validate`.
    fn stake_for(&self, seat: usize, action: &Self::Action) -> Chips;

    fn apply_action<R: RandomSource>(
        &mut self,
        seat: usize,
        action: Self::Action,
        rng: &mut R,
    ) -> Result<(), RuleError>;

    fn is_terminal(&self) -> bool;

    fn is_seat_done(&self, seat: usize) -> bool;

    /// Чей сейчас ход (None в терминальном состоянии).
    fn next_actor(&self) -> Option<usize>;

    fn default_action_on_timeout(&self, seat: usize) -> Self::Action;
}

/// Действие игрока любой игры.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameAction {
    Blackjack(BlackjackAction),
    Chinchiro(ChinchiroAction),
    Poker(PokerAction),
}

impl GameAction {
    pub fn game(&self) -> GameKind {
        match self {
            GameAction::Blackjack(_) => GameKind::Blackjack,
            GameAction::Chinchiro(_) => GameKind::Chinchiro,
            GameAction::Poker(_) => GameKind::Poker,
        }
    }
}

/// Состояние раунда конкретной игры.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum GameState {
    Blackjack(BlackjackRound),
    Chinchiro(ChinchiroRound),
    Poker(PokerRound),
}

impl GameState {
    pub fn game(&self) -> GameKind {
        match self {
            GameState::Blackjack(_) => GameKind::Blackjack,
            GameState::Chinchiro(_) => GameKind::Chinchiro,
            GameState::Poker(_) => GameKind::Poker,
        }
    }

    pub fn validate(&self, seat: usize, action: &GameAction) -> Result<(), RuleError> {
        match (self, action) {
            (GameState::Blackjack(r), GameAction::Blackjack(a)) => r.validate(seat, a),
            (GameState::Chinchiro(r), GameAction::Chinchiro(a)) => r.validate(seat, a),
            (GameState::Poker(r), GameAction::Poker(a)) => r.validate(seat, a),
            _ => Err(RuleError::WrongGame),
        }
    }

    pub fn stake_for(&self, seat: usize, action: &GameAction) -> Chips {
        match (self, action) {
            (GameState::Blackjack(r), GameAction::Blackjack(a)) => r.stake_for(seat, a),
            (GameState::Chinchiro(r), GameAction::Chinchiro(a)) => r.stake_for(seat, a),
            (GameState::Poker(r), GameAction::Poker(a)) => r.stake_for(seat, a),
            _ => Chips::ZERO,
        }
    }

    pub fn apply_action<R: RandomSource>(
        &mut self,
        seat: usize,
        action: GameAction,
        rng: &mut R,
    ) -> Result<(), RuleError> {
        match (self, action) {
            (GameState::Blackjack(r), GameAction::Blackjack(a)) => r.apply_action(seat, a, rng),
            (GameState::Chinchiro(r), GameAction::Chinchiro(a)) => r.apply_action(seat, a, rng),
            (GameState::Poker(r), GameAction::Poker(a)) => r.apply_action(seat, a, rng),
            _ => Err(RuleError::WrongGame),
        }
    }

    pub fn is_terminal(&self) -> bool {
        match self {
            GameState::Blackjack(r) => r.is_terminal(),
            GameState::Chinchiro(r) => r.is_terminal(),
            GameState::Poker(r) => r.is_terminal(),
        }
    }

    pub fn is_seat_done(&self, seat: usize) -> bool {
        match self {
            GameState::Blackjack(r) => r.is_seat_done(seat),
            GameState::Chinchiro(r) => r.is_seat_done(seat),
            GameState::Poker(r) => r.is_seat_done(seat),
        }
    }

    pub fn next_actor(&self) -> Option<usize> {
        match self {
            GameState::Blackjack(r) => r.next_actor(),
            GameState::Chinchiro(r) => r.next_actor(),
            GameState::Poker(r) => r.next_actor(),
        }
    }

    pub fn default_action_on_timeout(&self, seat: usize) -> GameAction {
        match self {
            GameState::Blackjack(r) => GameAction::Blackjack(r.default_action_on_timeout(seat)),
            GameState::Chinchiro(r) => GameAction::Chinchiro(r.default_action_on_timeout(seat)),
            GameState::Poker(r) => GameAction::Poker(r.default_action_on_timeout(seat)),
        }
    }
}
