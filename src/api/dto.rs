use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::dice::DiceRoll;
use crate::domain::session::{GameKind, Phase, Session};
use crate::domain::{ChannelId, PlayerId, TurnGeneration};
use crate::games::blackjack::HandStatus;
use crate::games::poker::Street;
use crate::games::{ChinchiroHand, GameState};
use crate::time_ctrl::seconds_remaining;

/// DTO места за столом.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatView {
    pub player_id: PlayerId,
    pub seat_index: u8,
    pub bet: Chips,
    pub staked: Chips,
    pub done: bool,
    pub is_current: bool,
    /// Карманные карты покера. Заполняются только в личном виде игрока.
    pub hole_cards: Option<Vec<Card>>,
}

/// Одна рука блэкджека.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct HandView {
    pub cards: Vec<Card>,
    pub value: u8,
    pub bet: Chips,
    pub status: HandStatus,
}

/// Броски одного места в тинчиро.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DiceView {
    pub rolls: Vec<DiceRoll>,
    pub hand: Option<ChinchiroHand>,
    pub finalized: bool,
}

/// Игровая часть стола.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TableView {
    /// Раунд ещё не раздан.
    Lobby,
    Blackjack {
        /// Пока дилер не доиграл, видна только открытая карта.
        dealer_cards: Vec<Card>,
        dealer_hidden: usize,
        /// hands[seat] = руки места.
        hands: Vec<Vec<HandView>>,
        insurance: Vec<Chips>,
    },
    Chinchiro {
        banker_seat: usize,
        seats: Vec<DiceView>,
    },
    Poker {
        street: Street,
        board: Vec<Card>,
        pot: Chips,
        current_bet: Chips,
        folded: Vec<bool>,
    },
}

/// DTO сессии: всё, что нужно внешнему рендереру.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionView {
    pub channel_id: ChannelId,
    pub game: GameKind,
    pub phase: Phase,
    pub host: PlayerId,
    pub players: Vec<SeatView>,
    pub current_player: Option<PlayerId>,
    pub generation: TurnGeneration,
    /// Секунд до дедлайна лобби/хода.
    pub seconds_remaining: Option<u64>,
    pub table: TableView,
}

fn table_view(state: &GameState) -> TableView {
    match state {
        GameState::Blackjack(round) => {
            let (dealer_cards, dealer_hidden) = if round.dealer_done {
                (round.dealer.clone(), 0)
            } else {
                let shown: Vec<Card> = round.dealer.iter().take(1).copied().collect();
                let hidden = round.dealer.len().saturating_sub(shown.len());
                (shown, hidden)
            };
            TableView::Blackjack {
                dealer_cards,
                dealer_hidden,
                hands: round
                    .seats
                    .iter()
                    .map(|s| {
                        s.hands
                            .iter()
                            .map(|h| HandView {
                                cards: h.cards.clone(),
                                value: h.value(),
                                bet: h.bet,
                                status: h.status,
                            })
                            .collect()
                    })
                    .collect(),
                insurance: round.seats.iter().map(|s| s.insurance).collect(),
            }
        }
        GameState::Chinchiro(round) => TableView::Chinchiro {
            banker_seat: round.banker,
            seats: round
                .seats
                .iter()
                .map(|s| DiceView {
                    rolls: s.rolls.clone(),
                    hand: s.hand,
                    finalized: s.finalized,
                })
                .collect(),
        },
        // Карманные карты в публичный вид не попадают.
        GameState::Poker(round) => TableView::Poker {
            street: round.street,
            board: round.board.clone(),
            pot: round.pot(),
            current_bet: round.betting.current_bet,
            folded: round.seats.iter().map(|s| s.folded).collect(),
        },
    }
}

/// Собрать публичный вид сессии на момент `now_ms`.
pub fn build_session_view(session: &Session, now_ms: u64) -> SessionView {
    map_session(session, now_ms, |_| false)
}

/// Личный вид для `viewer`: то же, что публичный, плюс его карманные карты.
/// Чужие карты остаются закрытыми.
pub fn build_session_view_for(session: &Session, now_ms: u64, viewer: PlayerId) -> SessionView {
    map_session(session, now_ms, |player_id| player_id == viewer)
}

fn map_session(session: &Session, now_ms: u64, is_viewer: impl Fn(PlayerId) -> bool) -> SessionView {
    let poker = match session.state.as_ref() {
        Some(GameState::Poker(round)) => Some(round),
        _ => None,
    };

    SessionView {
        channel_id: session.channel_id,
        game: session.game,
        phase: session.phase,
        host: session.host,
        players: session
            .players
            .iter()
            .enumerate()
            .map(|(idx, seat)| SeatView {
                player_id: seat.player_id,
                seat_index: idx as u8,
                bet: seat.bet,
                staked: seat.staked,
                done: seat.done,
                is_current: session.current == Some(idx),
                hole_cards: poker
                    .filter(|_| is_viewer(seat.player_id))
                    .and_then(|round| round.seats.get(idx))
                    .map(|s| s.hole.clone()),
            })
            .collect(),
        current_player: session.current_player(),
        generation: session.generation,
        seconds_remaining: session.deadline_ms.map(|d| seconds_remaining(d, now_ms)),
        table: session.state.as_ref().map(table_view).unwrap_or(TableView::Lobby),
    }
}
