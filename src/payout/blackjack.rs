use core::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::config::BlackjackPayouts;
use crate::domain::card::Card;
use crate::domain::chips::{Chips, Ratio};
use crate::domain::session::Seat;
use crate::games::blackjack::{hand_value, is_natural, BjHand, BjSeat, BlackjackRound};

use super::{BjHandSummary, HandSummary, PayoutError, PlayerResult};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BjOutcome {
    /// Натуральный блэкджек игрока.
    Natural,
    Win,
    Push,
    Lose,
    Bust,
}

/// Итог места: выплата (gross) и ставка, выведенная из рук.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SeatSettlement {
    pub gross: Chips,
    pub derived_stake: Chips,
    pub hands: Vec<BjHandSummary>,
    pub insurance_payout: Chips,
}

fn apply(ratio: Ratio, amount: Chips) -> Result<Chips, PayoutError> {
    ratio.apply(amount).ok_or(PayoutError::Overflow)
}

/// Исход одной руки против дилера.
pub fn hand_outcome(hand: &BjHand, dealer: &[Card]) -> BjOutcome {
    if hand.is_busted() {
        return BjOutcome::Bust;
    }
    let dealer_natural = is_natural(dealer);
    if hand.is_natural() {
        return if dealer_natural { BjOutcome::Push } else { BjOutcome::Natural };
    }
    if dealer_natural {
        return BjOutcome::Lose;
    }
    let dealer_value = hand_value(dealer).0;
    if dealer_value > 21 {
        return BjOutcome::Win;
    }
    match hand.value().cmp(&dealer_value) {
        Ordering::Greater => BjOutcome::Win,
        Ordering::Equal => BjOutcome::Push,
        Ordering::Less => BjOutcome::Lose,
    }
}

/// Выплата (gross) по исходу.
pub fn outcome_payout(outcome: BjOutcome, bet: Chips, payouts: &BlackjackPayouts) -> Result<Chips, PayoutError> {
    match outcome {
        BjOutcome::Natural => apply(payouts.natural, bet),
        BjOutcome::Win => apply(payouts.win, bet),
        BjOutcome::Push => Ok(bet),
        BjOutcome::Lose | BjOutcome::Bust => Ok(Chips::ZERO),
    }
}

/// Посчитать одно место: сумма по всем рукам после сплитов + страховка.
pub fn settle_seat(seat: &BjSeat, dealer: &[Card], payouts: &BlackjackPayouts) -> Result<SeatSettlement, PayoutError> {
    let mut gross = Chips::ZERO;
    let mut derived_stake = seat.insurance;
    let mut hands = Vec::with_capacity(seat.hands.len());

    for hand in &seat.hands {
        let outcome = hand_outcome(hand, dealer);
        let payout = outcome_payout(outcome, hand.bet, payouts)?;
        gross = gross.checked_add(payout).ok_or(PayoutError::Overflow)?;
        derived_stake = derived_stake.checked_add(hand.bet).ok_or(PayoutError::Overflow)?;
        hands.push(BjHandSummary {
            cards: hand.cards.clone(),
            value: hand.value(),
            bet: hand.bet,
            outcome,
            payout,
        });
    }

    // Страховка живёт отдельно от рук.
    let insurance_payout = if !seat.insurance.is_zero() && is_natural(dealer) {
        apply(payouts.insurance, seat.insurance)?
    } else {
        Chips::ZERO
    };
    gross = gross.checked_add(insurance_payout).ok_or(PayoutError::Overflow)?;

    Ok(SeatSettlement {
        gross,
        derived_stake,
        hands,
        insurance_payout,
    })
}

pub fn settle(
    seats: &[Seat],
    round: &BlackjackRound,
    payouts: &BlackjackPayouts,
) -> Result<Vec<PlayerResult>, PayoutError> {
    if seats.len() != round.seats.len() {
        return Err(PayoutError::SeatCountMismatch);
    }
    if !round.dealer_done {
        return Err(PayoutError::IncompleteState("дилер не доиграл"));
    }

    let dealer_value = round.dealer_value();
    seats
        .iter()
        .zip(round.seats.iter())
        .map(|(seat, bj_seat)| {
            let s = settle_seat(bj_seat, &round.dealer, payouts)?;
            if s.derived_stake != seat.staked {
                return Err(PayoutError::StakeMismatch {
                    player_id: seat.player_id,
                    tracked: seat.staked,
                    derived: s.derived_stake,
                });
            }
            Ok(PlayerResult::new(
                seat.player_id,
                seat.staked,
                s.gross,
                HandSummary::Blackjack {
                    hands: s.hands,
                    dealer_cards: round.dealer.clone(),
                    dealer_value,
                    insurance: bj_seat.insurance,
                    insurance_payout: s.insurance_payout,
                },
            ))
        })
        .collect()
}
