use serde::{Deserialize, Serialize};

use crate::domain::card::Rank;

/// Категория покерной руки по силе.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HandCategory {
    HighCard = 0,
    OnePair = 1,
    TwoPair = 2,
    ThreeOfAKind = 3,
    Straight = 4,
    Flush = 5,
    FullHouse = 6,
    FourOfAKind = 7,
    StraightFlush = 8,
    RoyalFlush = 9,
}

impl HandCategory {
    fn from_id(id: u8) -> HandCategory {
        match id {
            1 => HandCategory::OnePair,
            2 => HandCategory::TwoPair,
            3 => HandCategory::ThreeOfAKind,
            4 => HandCategory::Straight,
            5 => HandCategory::Flush,
            6 => HandCategory::FullHouse,
            7 => HandCategory::FourOfAKind,
            8 => HandCategory::StraightFlush,
            9 => HandCategory::RoyalFlush,
            _ => HandCategory::HighCard,
        }
    }
}

/// Сила руки, упакованная в одно сравнимое число.
///
/// Схема кодирования (u32):
///   [категория:4 бита][r0:4][r1:4][r2:4][r3:4][r4:4]
/// Rank: 2..14 (2..A) влазит в 4 бита. Сравнение рук = сравнение чисел.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HandRank(pub u32);

impl HandRank {
    /// Собрать HandRank из категории и 5 рангов (от старшего к младшему).
    pub fn from_category_and_ranks(category: HandCategory, ranks: [Rank; 5]) -> Self {
        let mut value = (category as u32) & 0x0F;
        for r in ranks {
            value = (value << 4) | (r as u32 & 0x0F);
        }
        HandRank(value)
    }

    /// Вытащить категорию из HandRank.
    pub fn category(&self) -> HandCategory {
        HandCategory::from_id(((self.0 >> 20) & 0x0F) as u8)
    }

    /// Достать 5 рангов (от старшего к младшему) из HandRank.
    pub fn ranks(&self) -> [Rank; 5] {
        let mut out = [Rank::Two; 5];
        for (i, slot) in out.iter_mut().enumerate() {
            let shift = 16 - 4 * i as u32;
            let nibble = ((self.0 >> shift) & 0x0F) as u8;
            *slot = Rank::from_value(nibble).unwrap_or(Rank::Two);
        }
        out
    }
}

/// Человеческое описание руки по категории.
pub fn describe_hand(rank: HandRank) -> &'static str {
    match rank.category() {
        HandCategory::HighCard => "High card",
        HandCategory::OnePair => "One pair",
        HandCategory::TwoPair => "Two pair",
        HandCategory::ThreeOfAKind => "Three of a kind",
        HandCategory::Straight => "Straight",
        HandCategory::Flush => "Flush",
        HandCategory::FullHouse => "Full house",
        HandCategory::FourOfAKind => "Four of a kind",
        HandCategory::StraightFlush => "Straight flush",
        HandCategory::RoyalFlush => "Royal flush",
    }
}
