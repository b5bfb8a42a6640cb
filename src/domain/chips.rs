use core::fmt;
use core::ops::{Add, AddAssign, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Количество фишек. Обёртка над u64, чтобы не путать с обычными числами.
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Chips(pub u64);

impl Chips {
    pub const ZERO: Chips = Chips(0);

    pub fn new(amount: u64) -> Self {
        Chips(amount)
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Безопасное вычитание, не даёт уйти в минус.
    pub fn saturating_sub(self, other: Chips) -> Chips {
        Chips(self.0.saturating_sub(other.0))
    }

    /// Сложение с проверкой переполнения (для расчёта выплат).
    pub fn checked_add(self, other: Chips) -> Option<Chips> {
        self.0.checked_add(other.0).map(Chips)
    }

    /// Умножить на целое число с проверкой переполнения.
    pub fn checked_mul(self, factor: u64) -> Option<Chips> {
        self.0.checked_mul(factor).map(Chips)
    }

    /// Сначала умножаем, потом делим, только целые, никаких f64.
    /// Промежуточное значение считаем в u128, чтобы не переполниться.
    pub fn mul_div(self, numerator: u64, denominator: u64) -> Option<Chips> {
        if denominator == 0 {
            return None;
        }
        let value = (self.0 as u128) * (numerator as u128) / (denominator as u128);
        u64::try_from(value).ok().map(Chips)
    }

    /// Знаковая разница `self - other` (для net-результата раунда).
    pub fn signed_diff(self, other: Chips) -> i64 {
        (self.0 as i128 - other.0 as i128).clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

impl fmt::Display for Chips {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for Chips {
    type Output = Chips;

    fn add(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Chips {
    fn add_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl Sub for Chips {
    type Output = Chips;

    fn sub(self, rhs: Chips) -> Self::Output {
        Chips(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Chips {
    fn sub_assign(&mut self, rhs: Chips) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl core::iter::Sum for Chips {
    fn sum<I: Iterator<Item = Chips>>(iter: I) -> Self {
        iter.fold(Chips::ZERO, |acc, c| acc + c)
    }
}

/// Коэффициент выплаты в виде дроби `num / den`.
///
/// 2x = 2/1, блэкджек 2.5x = 5/2. Применяется как multiply-then-divide.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Ratio {
    pub num: u64,
    pub den: u64,
}

impl Ratio {
    pub const fn new(num: u64, den: u64) -> Self {
        Self { num, den }
    }

    pub const fn whole(num: u64) -> Self {
        Self { num, den: 1 }
    }

    /// `amount * num / den`, округление вниз.
    pub fn apply(&self, amount: Chips) -> Option<Chips> {
        amount.mul_div(self.num, self.den)
    }
}
