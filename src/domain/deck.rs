use serde::{Deserialize, Serialize};

use crate::domain::card::{Card, Rank, Suit};
use crate::infra::rng::RandomSource;

/// Колода (или шу из нескольких колод). Верх колоды в конце вектора.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Deck {
    pub cards: Vec<Card>,
}

impl Deck {
    /// Стандартная 52-карточная колода в порядке:
    /// Clubs 2..A, Diamonds 2..A, Hearts 2..A, Spades 2..A.
    pub fn standard_52() -> Self {
        let mut cards = Vec::with_capacity(52);
        for suit in Suit::ALL {
            for rank in Rank::ALL {
                cards.push(Card::new(rank, suit));
            }
        }
        Deck { cards }
    }

    /// Шу для блэкджека: `decks` колод подряд (минимум одна).
    pub fn shoe(decks: u8) -> Self {
        let mut cards = Vec::with_capacity(52 * decks.max(1) as usize);
        for _ in 0..decks.max(1) {
            cards.extend(Deck::standard_52().cards);
        }
        Deck { cards }
    }

    /// Колода, из которой карты выходят ровно в переданном порядке.
    /// Удобно для тестов и реплея.
    pub fn stacked(draw_order: &[Card]) -> Self {
        let mut cards = draw_order.to_vec();
        cards.reverse();
        Deck { cards }
    }

    /// Перемешать через RNG из infra.
    pub fn shuffle_with<R: RandomSource>(&mut self, rng: &mut R) {
        rng.shuffle(&mut self.cards);
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Взять одну карту сверху колоды.
    pub fn draw_one(&mut self) -> Option<Card> {
        self.cards.pop()
    }

    /// Взять n карт сверху.
    pub fn draw_n(&mut self, n: usize) -> Vec<Card> {
        let mut taken = Vec::with_capacity(n);
        for _ in 0..n {
            match self.cards.pop() {
                Some(card) => taken.push(card),
                None => break,
            }
        }
        taken
    }
}
