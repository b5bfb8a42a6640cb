//! Техасский холдем на один банк.
//!
//! Анте = эскроу при входе в лобби. Дальше четыре улицы торговли;
//! all-in нет: если игроку не хватает на колл, леджер вернёт InsufficientFunds
//! и игрок может только сбросить.

use serde::{Deserialize, Serialize};

use crate::domain::card::Card;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::games::betting::{bet_cost, validate_bet, BetAction, BettingState};
use crate::games::errors::RuleError;
use crate::games::RoundEngine;
use crate::infra::rng::RandomSource;

pub type PokerAction = BetAction;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum Street {
    Preflop,
    Flop,
    Turn,
    River,
    Showdown,
}

impl Street {
    fn next(self) -> Street {
        match self {
            Street::Preflop => Street::Flop,
            Street::Flop => Street::Turn,
            Street::Turn => Street::River,
            Street::River | Street::Showdown => Street::Showdown,
        }
    }

    /// Сколько карт борда открывается при переходе на эту улицу.
    fn board_cards(self) -> usize {
        match self {
            Street::Flop => 3,
            Street::Turn | Street::River => 1,
            Street::Preflop | Street::Showdown => 0,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PokerSeat {
    pub hole: Vec<Card>,
    /// Сколько поставлено на текущей улице.
    pub street_bet: Chips,
    /// Сколько всего внесено в банк (включая анте).
    pub contributed: Chips,
    pub folded: bool,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct PokerRound {
    pub deck: Deck,
    pub board: Vec<Card>,
    pub street: Street,
    pub seats: Vec<PokerSeat>,
    pub betting: BettingState,
    /// Базовый минимальный рейз (сбрасывается на каждой улице).
    pub min_raise: Chips,
}

impl PokerRound {
    /// Раздать по две карты. `antes[seat]` уже внесено в банк.
    pub fn deal(antes: &[Chips], mut deck: Deck, min_raise: Chips) -> Result<Self, RuleError> {
        // 2 карты на место + 5 на борд.
        if deck.len() < antes.len() * 2 + 5 {
            return Err(RuleError::DeckExhausted);
        }

        let mut holes: Vec<Vec<Card>> = vec![Vec::with_capacity(2); antes.len()];
        for _ in 0..2 {
            for hole in holes.iter_mut() {
                hole.extend(deck.draw_one());
            }
        }

        let seats = holes
            .into_iter()
            .zip(antes.iter())
            .map(|(hole, ante)| PokerSeat {
                hole,
                street_bet: Chips::ZERO,
                contributed: *ante,
                folded: false,
            })
            .collect();

        Ok(Self {
            deck,
            board: Vec::with_capacity(5),
            street: Street::Preflop,
            seats,
            betting: BettingState::new(min_raise, (0..antes.len()).collect()),
            min_raise,
        })
    }

    pub fn pot(&self) -> Chips {
        self.seats.iter().map(|s| s.contributed).sum()
    }

    pub fn active_seats(&self) -> Vec<usize> {
        self.seats
            .iter()
            .enumerate()
            .filter(|(_, s)| !s.folded)
            .map(|(i, _)| i)
            .collect()
    }

    /// Кто должен ответить на рейз: все не сбросившие, по кругу после рейзера.
    fn order_after(&self, seat: usize) -> Vec<usize> {
        let n = self.seats.len();
        (1..n)
            .map(|offset| (seat + offset) % n)
            .filter(|&i| !self.seats[i].folded)
            .collect()
    }

    fn advance_street(&mut self) {
        let next = self.street.next();
        self.street = next;
        self.board.extend(self.deck.draw_n(next.board_cards()));
        for s in self.seats.iter_mut() {
            s.street_bet = Chips::ZERO;
        }
        let to_act = if next == Street::Showdown {
            Vec::new()
        } else {
            self.active_seats()
        };
        self.betting = BettingState::new(self.min_raise, to_act);
    }
}

impl RoundEngine for PokerRound {
    type Action = PokerAction;

    fn validate(&self, seat: usize, action: &PokerAction) -> Result<(), RuleError> {
        if self.is_terminal() {
            return Err(RuleError::RoundOver);
        }
        let s = self.seats.get(seat).ok_or(RuleError::UnknownSeat(seat))?;
        if s.folded {
            return Err(RuleError::SeatDone);
        }
        if self.betting.to_act.first() != Some(&seat) {
            return Err(RuleError::NotYourTurn(seat));
        }
        validate_bet(action, s.street_bet, &self.betting)
    }

    fn stake_for(&self, seat: usize, action: &PokerAction) -> Chips {
        self.seats
            .get(seat)
            .map(|s| bet_cost(action, s.street_bet, &self.betting))
            .unwrap_or(Chips::ZERO)
    }

    fn apply_action<R: RandomSource>(
        &mut self,
        seat: usize,
        action: PokerAction,
        _rng: &mut R,
    ) -> Result<(), RuleError> {
        self.validate(seat, &action)?;
        let cost = self.stake_for(seat, &action);

        match action {
            BetAction::Fold => {
                self.seats[seat].folded = true;
                self.betting.mark_acted(seat);
            }
            BetAction::Check => self.betting.mark_acted(seat),
            BetAction::Call => {
                let s = &mut self.seats[seat];
                s.street_bet += cost;
                s.contributed += cost;
                self.betting.mark_acted(seat);
            }
            BetAction::Raise(total) => {
                let raise_size = total - self.betting.current_bet;
                let s = &mut self.seats[seat];
                s.street_bet = total;
                s.contributed += cost;
                let to_act = self.order_after(seat);
                self.betting.on_raise(seat, total, raise_size, to_act);
            }
        }

        if self.active_seats().len() <= 1 {
            // Остался один: банк его без вскрытия.
            self.street = Street::Showdown;
            self.betting.to_act.clear();
            return Ok(());
        }

        while self.betting.is_round_complete() && self.street != Street::Showdown {
            self.advance_street();
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.street == Street::Showdown
    }

    fn is_seat_done(&self, seat: usize) -> bool {
        self.is_terminal() || self.seats.get(seat).map(|s| s.folded).unwrap_or(true)
    }

    fn next_actor(&self) -> Option<usize> {
        if self.is_terminal() {
            return None;
        }
        self.betting.to_act.first().copied()
    }

    fn default_action_on_timeout(&self, _seat: usize) -> PokerAction {
        BetAction::Fold
    }
}
