//! Расчёт тинчиро: каждый игрок против банкира.
//!
//! Правила применяются по порядку, срабатывает первое подходящее:
//! 1. у банкира мэнаси: игрок выигрывает 1x, если сам не выбросил хифуми;
//! 2. у банкира хифуми: игрок выигрывает 2x;
//! 3. у игрока хифуми: игрок проигрывает 2x;
//! 4. сравнение комбинаций, равные дают ничью.

use core::cmp::Ordering;

use crate::config::ChinchiroRules;
use crate::domain::chips::Chips;
use crate::domain::session::Seat;
use crate::games::chinchiro::{compare, ChinchiroHand, ChinchiroRound};

use super::{HandSummary, PayoutError, PlayerResult};

/// Исход игрока против банкира в единицах ставки.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Versus {
    Win,
    DoubleWin,
    Push,
    Lose,
    DoubleLose,
}

/// `player` = None: игрок не бросал (пропущен после хифуми банкира).
pub fn versus_banker(banker: ChinchiroHand, player: Option<ChinchiroHand>) -> Result<Versus, PayoutError> {
    use ChinchiroHand::{Hifumi, Menashi};

    let outcome = match (banker, player) {
        (Menashi, Some(Hifumi)) => Versus::DoubleLose,
        (Menashi, _) => Versus::Win,
        (Hifumi, _) => Versus::DoubleWin,
        (_, None) => return Err(PayoutError::IncompleteState("игрок не бросал кости")),
        (_, Some(Hifumi)) => Versus::DoubleLose,
        (b, Some(p)) => match compare(p, b) {
            Ordering::Greater => Versus::Win,
            Ordering::Equal => Versus::Push,
            Ordering::Less => Versus::Lose,
        },
    };
    Ok(outcome)
}

/// Изменение баланса игрока (со знаком) для ставки `bet`.
pub fn player_delta(outcome: Versus, bet: Chips, rules: &ChinchiroRules) -> Result<i64, PayoutError> {
    let amount = |ratio: crate::domain::chips::Ratio| -> Result<i64, PayoutError> {
        let chips = ratio.apply(bet).ok_or(PayoutError::Overflow)?;
        i64::try_from(chips.0).map_err(|_| PayoutError::Overflow)
    };
    Ok(match outcome {
        Versus::Win => amount(rules.ordinary)?,
        Versus::DoubleWin => amount(rules.hifumi)?,
        Versus::Push => 0,
        Versus::Lose => -amount(rules.ordinary)?,
        Versus::DoubleLose => -amount(rules.hifumi)?,
    })
}

fn gross_from(seat: &Seat, delta: i64) -> Result<Chips, PayoutError> {
    let gross = seat.staked.0 as i128 + delta as i128;
    if gross < 0 {
        // Эскроу/залог не покрывает проигрыш: бухгалтерия сессии разошлась.
        return Err(PayoutError::StakeMismatch {
            player_id: seat.player_id,
            tracked: seat.staked,
            derived: Chips(delta.unsigned_abs()),
        });
    }
    u64::try_from(gross).map(Chips).map_err(|_| PayoutError::Overflow)
}

pub fn settle(seats: &[Seat], round: &ChinchiroRound, rules: &ChinchiroRules) -> Result<Vec<PlayerResult>, PayoutError> {
    if seats.len() != round.seats.len() {
        return Err(PayoutError::SeatCountMismatch);
    }
    let banker_hand = round
        .banker_hand()
        .ok_or(PayoutError::IncompleteState("банкир не бросал кости"))?;

    let mut deltas = vec![0i64; seats.len()];
    let mut banker_delta: i64 = 0;
    for (idx, seat) in seats.iter().enumerate() {
        if idx == round.banker {
            continue;
        }
        let outcome = versus_banker(banker_hand, round.seats[idx].hand)?;
        let delta = player_delta(outcome, seat.bet, rules)?;
        deltas[idx] = delta;
        banker_delta = banker_delta.checked_sub(delta).ok_or(PayoutError::Overflow)?;
    }
    deltas[round.banker] = banker_delta;

    seats
        .iter()
        .enumerate()
        .map(|(idx, seat)| {
            let gross = gross_from(seat, deltas[idx])?;
            let state = &round.seats[idx];
            Ok(PlayerResult::new(
                seat.player_id,
                seat.staked,
                gross,
                HandSummary::Chinchiro {
                    hand: state.hand,
                    is_banker: idx == round.banker,
                    skipped: state.skipped,
                },
            ))
        })
        .collect()
}
