use core::fmt;

use serde::{Deserialize, Serialize};

use crate::infra::rng::RandomSource;

/// Бросок трёх костей (значения 1..=6).
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct DiceRoll(pub [u8; 3]);

impl DiceRoll {
    /// Проверенный конструктор: каждая кость в диапазоне 1..=6.
    pub fn new(dice: [u8; 3]) -> Option<Self> {
        if dice.iter().all(|d| (1..=6).contains(d)) {
            Some(Self(dice))
        } else {
            None
        }
    }

    /// Бросить три кости через RNG.
    pub fn roll<R: RandomSource>(rng: &mut R) -> Self {
        let mut dice = [0u8; 3];
        for d in dice.iter_mut() {
            *d = rng.roll_die().clamp(1, 6);
        }
        Self(dice)
    }

    /// Значения по возрастанию.
    pub fn sorted(&self) -> [u8; 3] {
        let mut d = self.0;
        d.sort_unstable();
        d
    }

    /// Все 216 возможных бросков (для перебора в тестах/таблицах).
    pub fn all() -> impl Iterator<Item = DiceRoll> {
        (1..=6u8).flat_map(|a| (1..=6u8).flat_map(move |b| (1..=6u8).map(move |c| DiceRoll([a, b, c]))))
    }
}

impl fmt::Display for DiceRoll {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.0[0], self.0[1], self.0[2])
    }
}
