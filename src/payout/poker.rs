use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::session::Seat;
use crate::eval::{evaluate_best_hand, BestHand};
use crate::games::poker::PokerRound;

use super::{HandSummary, PayoutError, PlayerResult};

/// Сайд-пот: часть банка, в которую участвуют только некоторые места.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SidePot {
    pub amount: Chips,
    pub eligible_seats: Vec<usize>,
}

/// Посчитать сайд-поты из сумм, которые внесли места.
///
/// Вход: contributions[seat] = сколько всего фишек внесло место.
/// Выход: поты "от младших к старшим". Без all-in обычно получается
/// один банк, но сброшенные на ранних улицах вносят меньше остальных.
pub fn compute_side_pots(contributions: &BTreeMap<usize, Chips>) -> Result<Vec<SidePot>, PayoutError> {
    let mut entries: Vec<(usize, Chips)> = contributions
        .iter()
        .filter(|(_, chips)| !chips.is_zero())
        .map(|(seat, chips)| (*seat, *chips))
        .collect();

    if entries.is_empty() {
        return Ok(Vec::new());
    }

    entries.sort_by_key(|(_, c)| c.0);

    let mut pots = Vec::new();
    let mut prev_level = Chips::ZERO;

    for &(_, amount) in entries.iter() {
        if amount == prev_level {
            continue;
        }
        let level_diff = amount - prev_level;

        // На этом уровне участвуют все, кто внёс не меньше.
        let mut eligible: Vec<usize> = entries
            .iter()
            .filter(|(_, contrib)| *contrib >= amount)
            .map(|(seat, _)| *seat)
            .collect();
        eligible.sort_unstable();

        let pot_amount = level_diff
            .checked_mul(eligible.len() as u64)
            .ok_or(PayoutError::Overflow)?;
        pots.push(SidePot {
            amount: pot_amount,
            eligible_seats: eligible,
        });

        prev_level = amount;
    }

    Ok(pots)
}

/// Разделить сумму поровну; лишние фишки уходят первым по порядку мест.
pub fn split_evenly(amount: Chips, winners: &[usize]) -> Vec<(usize, Chips)> {
    if winners.is_empty() {
        return Vec::new();
    }
    let n = winners.len() as u64;
    let share = amount.0 / n;
    let odd = amount.0 % n;
    winners
        .iter()
        .enumerate()
        .map(|(i, &seat)| (seat, Chips(share + u64::from((i as u64) < odd))))
        .collect()
}

pub fn settle(seats: &[Seat], round: &PokerRound) -> Result<Vec<PlayerResult>, PayoutError> {
    if seats.len() != round.seats.len() {
        return Err(PayoutError::SeatCountMismatch);
    }
    for (seat, ps) in seats.iter().zip(round.seats.iter()) {
        if seat.staked != ps.contributed {
            return Err(PayoutError::StakeMismatch {
                player_id: seat.player_id,
                tracked: seat.staked,
                derived: ps.contributed,
            });
        }
    }

    let live = round.active_seats();
    if live.is_empty() {
        return Err(PayoutError::IncompleteState("все места сбросили"));
    }

    // Оценка рук нужна, только если до вскрытия дошли двое и больше.
    let mut best: BTreeMap<usize, BestHand> = BTreeMap::new();
    if live.len() > 1 {
        for &idx in &live {
            let hand = evaluate_best_hand(&round.seats[idx].hole, &round.board)
                .ok_or(PayoutError::IncompleteState("мало карт для оценки руки"))?;
            best.insert(idx, hand);
        }
    }

    let contributions: BTreeMap<usize, Chips> = round
        .seats
        .iter()
        .enumerate()
        .map(|(idx, s)| (idx, s.contributed))
        .collect();

    let mut won = vec![Chips::ZERO; seats.len()];
    let mut carry = Chips::ZERO;
    for pot in compute_side_pots(&contributions)? {
        let contenders: Vec<usize> = pot
            .eligible_seats
            .iter()
            .copied()
            .filter(|idx| !round.seats[*idx].folded)
            .collect();
        let amount = pot.amount.checked_add(carry).ok_or(PayoutError::Overflow)?;
        if contenders.is_empty() {
            // Уровень, где остались только сброшенные: уходит в следующий пот.
            carry = amount;
            continue;
        }
        carry = Chips::ZERO;

        let winners = if contenders.len() == 1 || best.is_empty() {
            contenders
        } else {
            let top = contenders.iter().filter_map(|idx| best.get(idx)).map(|b| b.rank).max();
            contenders
                .into_iter()
                .filter(|idx| best.get(idx).map(|b| Some(b.rank) == top).unwrap_or(false))
                .collect()
        };

        for (idx, chips) in split_evenly(amount, &winners) {
            won[idx] = won[idx].checked_add(chips).ok_or(PayoutError::Overflow)?;
        }
    }
    if !carry.is_zero() {
        // Не должно случаться: без all-in живые места вносят максимум.
        if let Some(&first) = live.first() {
            won[first] = won[first].checked_add(carry).ok_or(PayoutError::Overflow)?;
        }
    }

    Ok(seats
        .iter()
        .enumerate()
        .map(|(idx, seat)| {
            let b = best.get(&idx);
            PlayerResult::new(
                seat.player_id,
                seat.staked,
                won[idx],
                HandSummary::Poker {
                    category: b.map(BestHand::category),
                    best_cards: b.map(|h| h.cards.to_vec()).unwrap_or_default(),
                    folded: round.seats[idx].folded,
                    won: won[idx],
                },
            )
        })
        .collect())
}
