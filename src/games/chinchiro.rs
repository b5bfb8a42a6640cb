//! Тинчиро: три кости, банкир против всех.
//!
//! Старшинство (сверху вниз): пиндзоро (1-1-1), тройки, сигоро (4-5-6),
//! очко (пара + третья кость), мэнаси (ничего), хифуми (1-2-3).

use core::cmp::Ordering;
use core::fmt;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::dice::DiceRoll;
use crate::games::errors::RuleError;
use crate::games::RoundEngine;
use crate::infra::rng::RandomSource;

/// Комбинация тинчиро. Порядок вариантов = порядок силы (derive Ord).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ChinchiroHand {
    /// 1-2-3: проигрыш вдвойне.
    Hifumi,
    /// Нет комбинации, можно перебросить.
    Menashi,
    /// Пара + очко третьей кости (1..=6).
    Point(u8),
    /// 4-5-6.
    Shigoro,
    /// Тройка 2..=6.
    Trips(u8),
    /// 1-1-1.
    Pinzoro,
}

impl fmt::Display for ChinchiroHand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChinchiroHand::Hifumi => write!(f, "хифуми"),
            ChinchiroHand::Menashi => write!(f, "мэнаси"),
            ChinchiroHand::Point(p) => write!(f, "очко {p}"),
            ChinchiroHand::Shigoro => write!(f, "сигоро"),
            ChinchiroHand::Trips(t) => write!(f, "тройка {t}"),
            ChinchiroHand::Pinzoro => write!(f, "пиндзоро"),
        }
    }
}

/// Классифицировать бросок. Определено для всех 216 троек.
pub fn evaluate_roll(roll: DiceRoll) -> ChinchiroHand {
    match roll.sorted() {
        [1, 1, 1] => ChinchiroHand::Pinzoro,
        [a, b, c] if a == b && b == c => ChinchiroHand::Trips(a),
        [4, 5, 6] => ChinchiroHand::Shigoro,
        [1, 2, 3] => ChinchiroHand::Hifumi,
        [a, b, c] if a == b => ChinchiroHand::Point(c),
        [a, b, c] if b == c => ChinchiroHand::Point(a),
        _ => ChinchiroHand::Menashi,
    }
}

/// Сравнить две комбинации: строгий порядок, равные комбинации = ничья.
pub fn compare(a: ChinchiroHand, b: ChinchiroHand) -> Ordering {
    a.cmp(&b)
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChinchiroAction {
    /// Первый бросок.
    Roll,
    /// Перебросить мэнаси.
    Reroll,
    /// Остаться с мэнаси.
    Keep,
    /// Авто-действие по таймауту: бросить, если ещё не бросал, и зафиксировать.
    FinalRoll,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChinchiroSeat {
    pub rolls: Vec<DiceRoll>,
    pub hand: Option<ChinchiroHand>,
    pub finalized: bool,
    /// Ход пропущен: банкир выбросил хифуми раньше.
    pub skipped: bool,
}

impl ChinchiroSeat {
    fn pending_menashi(&self) -> bool {
        !self.finalized && self.hand == Some(ChinchiroHand::Menashi)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChinchiroRound {
    pub banker: usize,
    /// Порядок ходов: банкир, потом остальные по кругу.
    pub order: Vec<usize>,
    pub seats: Vec<ChinchiroSeat>,
    pub max_rolls: u8,
}

impl ChinchiroRound {
    pub fn new(seat_count: usize, banker: usize, max_rolls: u8) -> Self {
        let banker = if seat_count == 0 { 0 } else { banker % seat_count };
        let order = (0..seat_count).map(|i| (banker + i) % seat_count).collect();
        Self {
            banker,
            order,
            seats: vec![ChinchiroSeat::default(); seat_count],
            max_rolls: max_rolls.max(1),
        }
    }

    pub fn banker_hand(&self) -> Option<ChinchiroHand> {
        self.seats.get(self.banker).and_then(|s| s.hand)
    }

    fn roll_into<R: RandomSource>(&mut self, seat: usize, rng: &mut R) {
        let roll = DiceRoll::roll(rng);
        let hand = evaluate_roll(roll);
        let max_rolls = self.max_rolls as usize;
        let s = &mut self.seats[seat];
        s.rolls.push(roll);
        s.hand = Some(hand);
        if hand != ChinchiroHand::Menashi || s.rolls.len() >= max_rolls {
            self.finalize(seat);
        }
    }

    fn finalize(&mut self, seat: usize) {
        self.seats[seat].finalized = true;
        if seat == self.banker && self.seats[seat].hand == Some(ChinchiroHand::Hifumi) {
            // Хифуми банкира: раунд окончен, остальные не бросают.
            for (idx, s) in self.seats.iter_mut().enumerate() {
                if idx != self.banker && !s.finalized {
                    s.finalized = true;
                    s.skipped = true;
                }
            }
        }
    }
}

impl RoundEngine for ChinchiroRound {
    type Action = ChinchiroAction;

    fn validate(&self, seat: usize, action: &ChinchiroAction) -> Result<(), RuleError> {
        if self.is_terminal() {
            return Err(RuleError::RoundOver);
        }
        let s = self.seats.get(seat).ok_or(RuleError::UnknownSeat(seat))?;
        if s.finalized {
            return Err(RuleError::SeatDone);
        }
        if self.next_actor() != Some(seat) {
            return Err(RuleError::NotYourTurn(seat));
        }

        match action {
            ChinchiroAction::Roll => {
                if s.rolls.is_empty() {
                    Ok(())
                } else {
                    Err(RuleError::AlreadyRolled)
                }
            }
            ChinchiroAction::Reroll => {
                if !s.pending_menashi() {
                    Err(RuleError::NoPendingMenashi)
                } else if s.rolls.len() >= self.max_rolls as usize {
                    Err(RuleError::RerollLimit)
                } else {
                    Ok(())
                }
            }
            ChinchiroAction::Keep => {
                if s.pending_menashi() {
                    Ok(())
                } else {
                    Err(RuleError::NoPendingMenashi)
                }
            }
            ChinchiroAction::FinalRoll => Ok(()),
        }
    }

    fn stake_for(&self, _seat: usize, _action: &ChinchiroAction) -> Chips {
        Chips::ZERO
    }

    fn apply_action<R: RandomSource>(
        &mut self,
        seat: usize,
        action: ChinchiroAction,
        rng: &mut R,
    ) -> Result<(), RuleError> {
        self.validate(seat, &action)?;

        match action {
            ChinchiroAction::Roll | ChinchiroAction::Reroll => self.roll_into(seat, rng),
            ChinchiroAction::Keep => self.finalize(seat),
            ChinchiroAction::FinalRoll => {
                if self.seats[seat].rolls.is_empty() {
                    self.roll_into(seat, rng);
                }
                if !self.seats[seat].finalized {
                    self.finalize(seat);
                }
            }
        }
        Ok(())
    }

    fn is_terminal(&self) -> bool {
        self.seats.iter().all(|s| s.finalized)
    }

    fn is_seat_done(&self, seat: usize) -> bool {
        self.seats.get(seat).map(|s| s.finalized).unwrap_or(true)
    }

    fn next_actor(&self) -> Option<usize> {
        self.order.iter().copied().find(|&idx| !self.seats[idx].finalized)
    }

    fn default_action_on_timeout(&self, _seat: usize) -> ChinchiroAction {
        ChinchiroAction::FinalRoll
    }
}
