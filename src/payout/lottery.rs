//! Пул-выплата в стиле лотереи: пул делится между держателями выигрышных билетов.
//!
//! Каждый держатель `k` из `W` билетов получает ровно `⌊P·k/W⌋`.
//! Остаток от деления не раздаётся никому в этом раунде.

use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::PlayerId;

use super::PayoutError;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotteryShare {
    pub player_id: PlayerId,
    pub tickets: u64,
    pub payout: Chips,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LotteryPayout {
    pub shares: Vec<LotteryShare>,
    /// Нераспределённый остаток пула.
    pub remainder: Chips,
}

pub fn split_pool(pool: Chips, holders: &[(PlayerId, u64)]) -> Result<LotteryPayout, PayoutError> {
    let total_tickets: u64 = holders
        .iter()
        .try_fold(0u64, |acc, (_, k)| acc.checked_add(*k))
        .ok_or(PayoutError::Overflow)?;

    if total_tickets == 0 {
        return Ok(LotteryPayout {
            shares: holders
                .iter()
                .map(|(player_id, tickets)| LotteryShare {
                    player_id: *player_id,
                    tickets: *tickets,
                    payout: Chips::ZERO,
                })
                .collect(),
            remainder: pool,
        });
    }

    let mut paid = Chips::ZERO;
    let mut shares = Vec::with_capacity(holders.len());
    for (player_id, tickets) in holders {
        let payout = pool.mul_div(*tickets, total_tickets).ok_or(PayoutError::Overflow)?;
        paid += payout;
        shares.push(LotteryShare {
            player_id: *player_id,
            tickets: *tickets,
            payout,
        });
    }

    Ok(LotteryPayout {
        shares,
        remainder: pool.saturating_sub(paid),
    })
}
