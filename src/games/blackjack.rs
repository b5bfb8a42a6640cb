//! Блэкджек: шу из нескольких колод, игроки против дилера.
//!
//! Порядок хода: места по очереди, внутри места руки после сплита слева направо.
//! Когда последнее место закончило, дилер добирает до 17.

use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank};
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::games::errors::RuleError;
use crate::games::RoundEngine;
use crate::infra::rng::RandomSource;

/// Жёсткий потолок рук у одного места после сплитов.
pub const MAX_HANDS: usize = 4;

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BlackjackAction {
    Hit,
    Stand,
    Double,
    Split,
    Insurance,
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum HandStatus {
    Playing,
    Stood,
    Doubled,
    Busted,
    /// Натуральный блэкджек на раздаче.
    Natural,
}

/// Очки карты: 2..10 по номиналу, картинки 10, туз 11.
pub fn card_points(card: Card) -> u8 {
    match card.rank {
        Rank::Ace => 11,
        Rank::Jack | Rank::Queen | Rank::King => 10,
        r => r as u8,
    }
}

/// Сумма руки и флаг "мягкой" руки (туз считается за 11).
pub fn hand_value(cards: &[Card]) -> (u8, bool) {
    let mut value: u16 = 0;
    let mut aces: u8 = 0;

    for &card in cards {
        if card.rank == Rank::Ace {
            aces += 1;
        }
        value += card_points(card) as u16;
    }

    while value > 21 && aces > 0 {
        value -= 10;
        aces -= 1;
    }

    let is_soft = aces > 0 && value <= 21;
    (value.min(255) as u8, is_soft)
}

/// 21 на двух картах.
pub fn is_natural(cards: &[Card]) -> bool {
    cards.len() == 2 && hand_value(cards).0 == 21
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BjHand {
    pub cards: Vec<Card>,
    pub bet: Chips,
    pub status: HandStatus,
    /// Рука получена сплитом (такая рука не может быть натуральной).
    pub from_split: bool,
}

impl BjHand {
    fn new(cards: Vec<Card>, bet: Chips, from_split: bool) -> Self {
        Self {
            cards,
            bet,
            status: HandStatus::Playing,
            from_split,
        }
    }

    pub fn value(&self) -> u8 {
        hand_value(&self.cards).0
    }

    pub fn is_natural(&self) -> bool {
        !self.from_split && is_natural(&self.cards)
    }

    pub fn is_busted(&self) -> bool {
        self.value() > 21
    }

    pub fn is_open(&self) -> bool {
        self.status == HandStatus::Playing
    }

    /// После добора: перебор или автостоп на 21.
    fn settle_after_draw(&mut self) {
        let v = self.value();
        if v > 21 {
            self.status = HandStatus::Busted;
        } else if v == 21 {
            self.status = HandStatus::Stood;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BjSeat {
    pub hands: Vec<BjHand>,
    /// Индекс руки, которая сейчас ходит.
    pub active: usize,
    pub insurance: Chips,
}

impl BjSeat {
    pub fn is_done(&self) -> bool {
        self.hands.iter().all(|h| !h.is_open())
    }

    pub fn active_hand(&self) -> Option<&BjHand> {
        self.hands.get(self.active).filter(|h| h.is_open())
    }

    fn advance(&mut self) {
        while self.active < self.hands.len() && !self.hands[self.active].is_open() {
            self.active += 1;
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlackjackRound {
    pub shoe: Deck,
    pub dealer: Vec<Card>,
    pub seats: Vec<BjSeat>,
    pub max_hands: usize,
    pub dealer_hits_soft_17: bool,
    /// Дилер доиграл, раунд терминален.
    pub dealer_done: bool,
}

impl BlackjackRound {
    /// Раздать по две карты каждому месту и дилеру.
    ///
    /// Порядок: по карте каждому месту, карта дилеру, и ещё раз по кругу.
    pub fn deal(
        bets: &[Chips],
        mut shoe: Deck,
        max_hands: u8,
        dealer_hits_soft_17: bool,
    ) -> Result<Self, RuleError> {
        if shoe.len() < 2 * (bets.len() + 1) {
            return Err(RuleError::DeckExhausted);
        }

        let mut player_cards: Vec<Vec<Card>> = vec![Vec::with_capacity(2); bets.len()];
        let mut dealer = Vec::with_capacity(2);
        for _ in 0..2 {
            for cards in player_cards.iter_mut() {
                cards.extend(shoe.draw_one());
            }
            dealer.extend(shoe.draw_one());
        }

        let seats = player_cards
            .into_iter()
            .zip(bets.iter())
            .map(|(cards, bet)| {
                let mut hand = BjHand::new(cards, *bet, false);
                if hand.is_natural() {
                    hand.status = HandStatus::Natural;
                }
                BjSeat {
                    hands: vec![hand],
                    active: 0,
                    insurance: Chips::ZERO,
                }
            })
            .collect();

        let mut round = Self {
            shoe,
            dealer,
            seats,
            max_hands: (max_hands as usize).clamp(1, MAX_HANDS),
            dealer_hits_soft_17,
            dealer_done: false,
        };
        for seat in round.seats.iter_mut() {
            seat.advance();
        }
        round.finish_if_all_done();
        Ok(round)
    }

    pub fn dealer_upcard(&self) -> Option<Card> {
        self.dealer.first().copied()
    }

    pub fn dealer_has_natural(&self) -> bool {
        is_natural(&self.dealer)
    }

    pub fn dealer_value(&self) -> u8 {
        hand_value(&self.dealer).0
    }

    fn finish_if_all_done(&mut self) {
        if !self.dealer_done && self.seats.iter().all(BjSeat::is_done) {
            self.play_dealer();
        }
    }

    /// Дилер добирает, только если есть живая (не перебор, не натуральная) рука.
    fn play_dealer(&mut self) {
        let needs_draw = self
            .seats
            .iter()
            .flat_map(|s| s.hands.iter())
            .any(|h| h.status != HandStatus::Busted && h.status != HandStatus::Natural);

        if needs_draw {
            loop {
                let (value, soft) = hand_value(&self.dealer);
                let hits = value < 17 || (value == 17 && soft && self.dealer_hits_soft_17);
                if !hits {
                    break;
                }
                match self.shoe.draw_one() {
                    Some(card) => self.dealer.push(card),
                    // Шу кончился, дилер стоит с тем, что есть.
                    None => break,
                }
            }
        }
        self.dealer_done = true;
    }

    fn insurance_cost(hand: &BjHand) -> Chips {
        Chips(hand.bet.0 / 2)
    }

    fn draw(&mut self) -> Result<Card, RuleError> {
        self.shoe.draw_one().ok_or(RuleError::DeckExhausted)
    }
}

impl RoundEngine for BlackjackRound {
    type Action = BlackjackAction;

    fn validate(&self, seat: usize, action: &BlackjackAction) -> Result<(), RuleError> {
        if self.is_terminal() {
            return Err(RuleError::RoundOver);
        }
        let bj_seat = self.seats.get(seat).ok_or(RuleError::UnknownSeat(seat))?;
        if bj_seat.is_done() {
            return Err(RuleError::SeatDone);
        }
        if self.next_actor() != Some(seat) {
            return Err(RuleError::NotYourTurn(seat));
        }
        let hand = bj_seat.active_hand().ok_or(RuleError::SeatDone)?;

        match action {
            BlackjackAction::Stand => Ok(()),
            BlackjackAction::Hit => {
                if self.shoe.is_empty() {
                    return Err(RuleError::DeckExhausted);
                }
                Ok(())
            }
            BlackjackAction::Double => {
                if hand.cards.len() != 2 {
                    return Err(RuleError::CannotDouble);
                }
                if self.shoe.is_empty() {
                    return Err(RuleError::DeckExhausted);
                }
                Ok(())
            }
            BlackjackAction::Split => {
                let pair = hand.cards.len() == 2 && card_points(hand.cards[0]) == card_points(hand.cards[1]);
                if !pair || bj_seat.hands.len() >= self.max_hands {
                    return Err(RuleError::CannotSplit);
                }
                if self.shoe.len() < 2 {
                    return Err(RuleError::DeckExhausted);
                }
                Ok(())
            }
            BlackjackAction::Insurance => {
                let dealer_ace = self.dealer_upcard().map(|c| c.rank == Rank::Ace).unwrap_or(false);
                let initial_hand = bj_seat.hands.len() == 1 && hand.cards.len() == 2;
                if !dealer_ace
                    || !initial_hand
                    || !bj_seat.insurance.is_zero()
                    || Self::insurance_cost(hand).is_zero()
                {
                    return Err(RuleError::InsuranceUnavailable);
                }
                Ok(())
            }
        }
    }

    fn stake_for(&self, seat: usize, action: &BlackjackAction) -> Chips {
        let Some(hand) = self.seats.get(seat).and_then(BjSeat::active_hand) else {
            return Chips::ZERO;
        };
        match action {
            BlackjackAction::Double | BlackjackAction::Split => hand.bet,
            BlackjackAction::Insurance => Self::insurance_cost(hand),
            BlackjackAction::Hit | BlackjackAction::Stand => Chips::ZERO,
        }
    }

    fn apply_action<R: RandomSource>(
        &mut self,
        seat: usize,
        action: BlackjackAction,
        _rng: &mut R,
    ) -> Result<(), RuleError> {
        self.validate(seat, &action)?;
        let active = self.seats[seat].active;

        match action {
            BlackjackAction::Stand => {
                self.seats[seat].hands[active].status = HandStatus::Stood;
            }
            BlackjackAction::Hit => {
                let card = self.draw()?;
                let hand = &mut self.seats[seat].hands[active];
                hand.cards.push(card);
                hand.settle_after_draw();
            }
            BlackjackAction::Double => {
                let card = self.draw()?;
                let hand = &mut self.seats[seat].hands[active];
                hand.bet += hand.bet;
                hand.cards.push(card);
                hand.status = if hand.is_busted() {
                    HandStatus::Busted
                } else {
                    HandStatus::Doubled
                };
            }
            BlackjackAction::Split => {
                let first_draw = self.draw()?;
                let second_draw = self.draw()?;
                let hand = &mut self.seats[seat].hands[active];
                let aces = hand.cards[0].rank == Rank::Ace;
                let moved = hand.cards.pop().ok_or(RuleError::CannotSplit)?;
                hand.from_split = true;
                hand.cards.push(first_draw);
                let bet = hand.bet;

                let mut new_hand = BjHand::new(vec![moved, second_draw], bet, true);
                let hand = &mut self.seats[seat].hands[active];
                if aces {
                    // Тузы после сплита получают по одной карте и стоят.
                    hand.status = HandStatus::Stood;
                    new_hand.status = HandStatus::Stood;
                } else {
                    hand.settle_after_draw();
                    new_hand.settle_after_draw();
                }
                self.seats[seat].hands.insert(active + 1, new_hand);
            }
            BlackjackAction::Insurance => {
                let cost = Self::insurance_cost(&self.seats[seat].hands[active]);
                self.seats[seat].insurance = cost;
            }
        }

        self.seats[seat].advance();
        self.finish_if_all_done();
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.dealer_done
    }

    fn is_seat_done(&self, seat: usize) -> bool {
        self.seats.get(seat).map(BjSeat::is_done).unwrap_or(true)
    }

    fn next_actor(&self) -> Option<usize> {
        if self.dealer_done {
            return None;
        }
        self.seats.iter().position(|s| !s.is_done())
    }

    fn default_action_on_timeout(&self, _seat: usize) -> BlackjackAction {
        BlackjackAction::Stand
    }
}
