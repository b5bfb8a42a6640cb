//! Карты для блэкджека и покера.
//!
//! Текстовая запись карты: ранг + масть, например `Ah`, `Td`, `7c`.
//! Так карты пишутся в логах и в тестовых раскладах.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Символы рангов по порядку `Rank::ALL`.
const RANK_CHARS: [char; 13] = ['2', '3', '4', '5', '6', '7', '8', '9', 'T', 'J', 'Q', 'K', 'A'];
/// Символы мастей по порядку `Suit::ALL`.
const SUIT_CHARS: [char; 4] = ['c', 'd', 'h', 's'];

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Suit {
    Clubs,
    Diamonds,
    Hearts,
    Spades,
}

impl Suit {
    /// Порядок мастей в свежей колоде.
    pub const ALL: [Suit; 4] = [Suit::Clubs, Suit::Diamonds, Suit::Hearts, Suit::Spades];

    fn symbol(self) -> char {
        SUIT_CHARS[self as usize]
    }
}

/// Ранг карты. Числовое значение совпадает с покерным старшинством (2..14).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, Ord, PartialOrd)]
pub enum Rank {
    Two = 2,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Ten,
    Jack,
    Queen,
    King,
    Ace,
}

impl Rank {
    pub const ALL: [Rank; 13] = {
        use Rank::*;
        [Two, Three, Four, Five, Six, Seven, Eight, Nine, Ten, Jack, Queen, King, Ace]
    };

    /// Ранг по покерному значению (2..14).
    pub fn from_value(v: u8) -> Option<Rank> {
        let idx = v.checked_sub(2)? as usize;
        Rank::ALL.get(idx).copied()
    }

    fn symbol(self) -> char {
        RANK_CHARS[self as usize - 2]
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Card {
    pub rank: Rank,
    pub suit: Suit,
}

impl Card {
    pub const fn new(rank: Rank, suit: Suit) -> Self {
        Self { rank, suit }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.rank.symbol(), self.suit.symbol())
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CardParseError {
    #[error("Карта записывается двумя символами, получено {0:?}")]
    Length(String),

    #[error("Неизвестный ранг {0:?}")]
    Rank(char),

    #[error("Неизвестная масть {0:?}")]
    Suit(char),
}

impl FromStr for Card {
    type Err = CardParseError;

    /// Регистр не важен: `ah` и `AH` дают туз червей.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        let (Some(r), Some(su), None) = (chars.next(), chars.next(), chars.next()) else {
            return Err(CardParseError::Length(s.to_string()));
        };
        let rank = RANK_CHARS
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&r))
            .map(|idx| Rank::ALL[idx])
            .ok_or(CardParseError::Rank(r))?;
        let suit = SUIT_CHARS
            .iter()
            .position(|c| c.eq_ignore_ascii_case(&su))
            .map(|idx| Suit::ALL[idx])
            .ok_or(CardParseError::Suit(su))?;
        Ok(Card::new(rank, suit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_form_round_trips_for_whole_deck() {
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                let card = Card::new(rank, suit);
                assert_eq!(card.to_string().parse::<Card>(), Ok(card));
            }
        }
    }

    #[test]
    fn bad_text_is_rejected() {
        assert_eq!("A".parse::<Card>(), Err(CardParseError::Length("A".into())));
        assert_eq!("Ahh".parse::<Card>(), Err(CardParseError::Length("Ahh".into())));
        assert_eq!("1h".parse::<Card>(), Err(CardParseError::Rank('1')));
        assert_eq!("Ax".parse::<Card>(), Err(CardParseError::Suit('x')));
        assert_eq!("tD".parse::<Card>(), Ok(Card::new(Rank::Ten, Suit::Diamonds)));
    }

    #[test]
    fn rank_values_match_poker_order() {
        assert_eq!(Rank::from_value(14), Some(Rank::Ace));
        assert_eq!(Rank::from_value(2), Some(Rank::Two));
        assert_eq!(Rank::from_value(1), None);
        assert_eq!(Rank::from_value(15), None);
    }
}
