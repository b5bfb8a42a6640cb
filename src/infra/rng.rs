use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

/// RNG интерфейс для движков игр: перемешать колоду и бросить кость.
pub trait RandomSource {
    fn shuffle<T>(&mut self, slice: &mut [T]);

    /// Одна шестигранная кость, 1..=6.
    fn roll_die(&mut self) -> u8;
}

/// Системный RNG (thread_rng) для боевого запуска.
#[derive(Clone, Debug, Default)]
pub struct SystemRng;

impl RandomSource for SystemRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut rand::thread_rng());
    }

    fn roll_die(&mut self) -> u8 {
        rand::thread_rng().gen_range(1..=6)
    }
}

/// Детерминированный RNG для тестов и реплея.
/// Позволяет воспроизводить одни и те же раздачи при одинаковом seed.
#[derive(Clone, Debug)]
pub struct DeterministicRng {
    inner: StdRng,
}

impl DeterministicRng {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            inner: StdRng::seed_from_u64(seed),
        }
    }
}

impl RandomSource for DeterministicRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    fn roll_die(&mut self) -> u8 {
        self.inner.gen_range(1..=6)
    }
}

/// Сценарный RNG: кости выпадают из заранее заданной очереди,
/// колода не перемешивается, а разворачивается (первой выходит 2♣, потом 3♣ ...).
///
/// Когда очередь костей кончилась, дальше всегда выпадает 1.
#[derive(Clone, Debug, Default)]
pub struct ScriptedRng {
    dice: std::collections::VecDeque<u8>,
    cut: usize,
}

impl ScriptedRng {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dice(dice: &[u8]) -> Self {
        Self {
            dice: dice.iter().copied().collect(),
            cut: 0,
        }
    }

    /// Снять колоду: первые `cards` карт уходят вниз,
    /// раздача начинается с карты номер `cards` (cut 8 → первой выходит T♣).
    pub fn with_cut(mut self, cards: usize) -> Self {
        self.cut = cards;
        self
    }

    /// Добавить бросок из трёх костей в очередь.
    pub fn push_roll(&mut self, roll: [u8; 3]) {
        self.dice.extend(roll);
    }
}

impl RandomSource for ScriptedRng {
    fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.reverse();
        if !slice.is_empty() {
            let k = self.cut % slice.len();
            slice.rotate_right(k);
        }
    }

    fn roll_die(&mut self) -> u8 {
        self.dice.pop_front().unwrap_or(1)
    }
}
