use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank};

use super::hand_rank::{HandCategory, HandRank};
use super::lookup_tables::{detect_straight, rank_to_bit, straight_ranks, RankMask};

/// Лучшая 5-карточная комбинация игрока.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BestHand {
    pub rank: HandRank,
    pub cards: [Card; 5],
}

impl BestHand {
    pub fn category(&self) -> HandCategory {
        self.rank.category()
    }
}

/// Главная функция: вычислить лучшую 5-карточную руку из hole + board.
///
/// Работает для любых 5–7 карт; на 7 картах перебирает все C(7,5) = 21 подмножество.
/// `None`, если карт меньше пяти или больше семи.
pub fn evaluate_best_hand(hole: &[Card], board: &[Card]) -> Option<BestHand> {
    let mut all_cards = Vec::with_capacity(hole.len() + board.len());
    all_cards.extend_from_slice(hole);
    all_cards.extend_from_slice(board);

    if !(5..=7).contains(&all_cards.len()) {
        return None;
    }

    let mut best: Option<BestHand> = None;
    for five in five_card_subsets(&all_cards) {
        let rank = evaluate_five(&five);
        if best.map_or(true, |b| rank > b.rank) {
            best = Some(BestHand { rank, cards: five });
        }
    }
    best
}

/// Все 5-карточные подмножества (в лексикографическом порядке индексов).
pub fn five_card_subsets(cards: &[Card]) -> Vec<[Card; 5]> {
    let n = cards.len();
    let mut out = Vec::new();
    if n < 5 {
        return out;
    }
    for a in 0..(n - 4) {
        for b in (a + 1)..(n - 3) {
            for c in (b + 1)..(n - 2) {
                for d in (c + 1)..(n - 1) {
                    for e in (d + 1)..n {
                        out.push([cards[a], cards[b], cards[c], cards[d], cards[e]]);
                    }
                }
            }
        }
    }
    out
}

/// Оценка строго 5-карточной комбинации.
pub fn evaluate_five(cards: &[Card; 5]) -> HandRank {
    let mut rank_counts = [0u8; 15]; // индексы 2..14
    let mut rank_mask: RankMask = 0;

    for card in cards.iter() {
        rank_counts[card.rank as usize] += 1;
        rank_mask |= rank_to_bit(card.rank);
    }

    let is_flush = cards.iter().all(|c| c.suit == cards[0].suit);
    let straight_high = detect_straight(rank_mask);

    // (rank, count), сначала по количеству (desc), затем по рангу (desc).
    let mut groups: Vec<(Rank, u8)> = Rank::ALL
        .iter()
        .rev()
        .filter(|r| rank_counts[**r as usize] > 0)
        .map(|r| (*r, rank_counts[*r as usize]))
        .collect();
    groups.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| b.0.cmp(&a.0)));

    // pattern: [4,1], [3,2], [3,1,1], [2,2,1], [2,1,1,1], [1,1,1,1,1]
    let pattern: Vec<u8> = groups.iter().map(|g| g.1).collect();
    let ranks = padded_ranks(&groups);

    if is_flush {
        if let Some(high) = straight_high {
            let category = if high == Rank::Ace {
                HandCategory::RoyalFlush
            } else {
                HandCategory::StraightFlush
            };
            return HandRank::from_category_and_ranks(category, straight_ranks(high));
        }
    }

    let category = match pattern.as_slice() {
        [4, 1] => HandCategory::FourOfAKind,
        [3, 2] => HandCategory::FullHouse,
        _ if is_flush => HandCategory::Flush,
        _ if straight_high.is_some() => HandCategory::Straight,
        [3, 1, 1] => HandCategory::ThreeOfAKind,
        [2, 2, 1] => HandCategory::TwoPair,
        [2, 1, 1, 1] => HandCategory::OnePair,
        _ => HandCategory::HighCard,
    };

    match (category, straight_high) {
        (HandCategory::Straight, Some(high)) => {
            HandRank::from_category_and_ranks(category, straight_ranks(high))
        }
        _ => HandRank::from_category_and_ranks(category, ranks),
    }
}

/// Ранги групп по порядку значимости, добитые двойками до пяти
/// (хвостовые "двойки" одинаковы у всех рук одной категории и не влияют на сравнение).
fn padded_ranks(groups: &[(Rank, u8)]) -> [Rank; 5] {
    let mut out = [Rank::Two; 5];
    for (slot, (rank, _)) in out.iter_mut().zip(groups.iter()) {
        *slot = *rank;
    }
    out
}
