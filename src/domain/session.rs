//! Сессия канала: одна активная игра на один чат-канал.

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::{ChannelId, PlayerId, TurnGeneration};
use crate::games::GameState;
use crate::time_ctrl::{ArmedTimer, TimerKind};

/// Какая игра идёт за столом.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum GameKind {
    Blackjack,
    Chinchiro,
    Poker,
}

impl GameKind {
    pub fn name(&self) -> &'static str {
        match self {
            GameKind::Blackjack => "blackjack",
            GameKind::Chinchiro => "chinchiro",
            GameKind::Poker => "poker",
        }
    }
}

/// Фаза жизненного цикла сессии.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Phase {
    /// Лобби открыто, идёт набор игроков.
    Waiting,
    /// Набор закрыт, раздаём/готовим раунд.
    Starting,
    /// Игроки ходят по очереди.
    Playing,
    /// Раунд закончен, идут выплаты.
    Resolving,
    Cancelled,
}

impl Phase {
    /// Фазы, в которых сессию ещё можно отменить хостом.
    pub fn is_cancellable(&self) -> bool {
        matches!(self, Phase::Waiting | Phase::Starting | Phase::Playing)
    }
}

/// Место игрока за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub player_id: PlayerId,
    /// Базовая ставка.
    pub bet: Chips,
    /// Всё, что списано с игрока за раунд: эскроу, даблы, сплиты, страховка, коллы, залог банкира.
    pub staked: Chips,
    /// Игрок закончил свои действия в этом раунде.
    pub done: bool,
}

impl Seat {
    pub fn new(player_id: PlayerId, bet: Chips, staked: Chips) -> Self {
        Self {
            player_id,
            bet,
            staked,
            done: false,
        }
    }
}

/// Состояние одной игровой сессии в канале.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    pub channel_id: ChannelId,
    pub game: GameKind,
    pub host: PlayerId,
    pub phase: Phase,
    pub players: Vec<Seat>,
    /// Индекс места, которое сейчас ходит (только в `Playing`).
    pub current: Option<usize>,
    /// Дедлайн лобби или текущего хода, мс монотонных часов планировщика.
    pub deadline_ms: Option<u64>,
    pub generation: TurnGeneration,
    /// Место банкира (тинчиро).
    pub banker: Option<usize>,
    pub state: Option<GameState>,
    pub timers: Vec<ArmedTimer>,
    pub created_at_ms: u64,
}

impl Session {
    pub fn new(channel_id: ChannelId, game: GameKind, host: PlayerId, now_ms: u64) -> Self {
        Self {
            channel_id,
            game,
            host,
            phase: Phase::Waiting,
            players: Vec::new(),
            current: None,
            deadline_ms: None,
            generation: 0,
            banker: None,
            state: None,
            timers: Vec::new(),
            created_at_ms: now_ms,
        }
    }

    pub fn seat_of(&self, player_id: PlayerId) -> Option<usize> {
        self.players.iter().position(|s| s.player_id == player_id)
    }

    pub fn has_player(&self, player_id: PlayerId) -> bool {
        self.seat_of(player_id).is_some()
    }

    pub fn current_player(&self) -> Option<PlayerId> {
        self.current
            .and_then(|idx| self.players.get(idx))
            .map(|s| s.player_id)
    }

    pub fn timer(&self, kind: TimerKind) -> Option<&ArmedTimer> {
        self.timers.iter().find(|t| t.kind == kind)
    }

    /// Сколько всего фишек сейчас в эскроу за столом.
    pub fn total_staked(&self) -> Chips {
        self.players.iter().map(|s| s.staked).sum()
    }

    /// Проверка инварианта хода: в `Playing` есть ровно один текущий
    /// индекс, и это место ещё не закончило.
    pub fn turn_invariant_holds(&self) -> bool {
        match self.phase {
            Phase::Playing => match self.current {
                Some(idx) => self.players.get(idx).map(|s| !s.done).unwrap_or(false),
                None => false,
            },
            _ => true,
        }
    }
}
