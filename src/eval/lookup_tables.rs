use crate::domain::card::Rank;

/// Битовая маска рангов: бит 0 = двойка, бит 12 = туз.
pub type RankMask = u16;

/// Все возможные стриты (маска, старшая карта), от сильнейшего к слабейшему.
/// Wheel (A2345) считается стритом до пятёрки.
pub const STRAIGHTS: [(RankMask, Rank); 10] = [
    (mask_from_ranks(&[Rank::Ten, Rank::Jack, Rank::Queen, Rank::King, Rank::Ace]), Rank::Ace),
    (mask_from_ranks(&[Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen, Rank::King]), Rank::King),
    (mask_from_ranks(&[Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack, Rank::Queen]), Rank::Queen),
    (mask_from_ranks(&[Rank::Seven, Rank::Eight, Rank::Nine, Rank::Ten, Rank::Jack]), Rank::Jack),
    (mask_from_ranks(&[Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine, Rank::Ten]), Rank::Ten),
    (mask_from_ranks(&[Rank::Five, Rank::Six, Rank::Seven, Rank::Eight, Rank::Nine]), Rank::Nine),
    (mask_from_ranks(&[Rank::Four, Rank::Five, Rank::Six, Rank::Seven, Rank::Eight]), Rank::Eight),
    (mask_from_ranks(&[Rank::Three, Rank::Four, Rank::Five, Rank::Six, Rank::Seven]), Rank::Seven),
    (mask_from_ranks(&[Rank::Two, Rank::Three, Rank::Four, Rank::Five, Rank::Six]), Rank::Six),
    (mask_from_ranks(&[Rank::Ace, Rank::Two, Rank::Three, Rank::Four, Rank::Five]), Rank::Five),
];

/// Получить битовую маску для одного ранга.
pub fn rank_to_bit(rank: Rank) -> RankMask {
    1u16 << (rank as u8).saturating_sub(2)
}

/// Построить маску из списка рангов.
pub const fn mask_from_ranks(ranks: &[Rank]) -> RankMask {
    let mut mask: RankMask = 0;
    let mut i = 0;
    while i < ranks.len() {
        let idx = (ranks[i] as u8).saturating_sub(2);
        mask |= 1 << idx;
        i += 1;
    }
    mask
}

/// Найти стрит в битовой маске рангов. Возвращает старшую карту стрита.
pub fn detect_straight(rank_mask: RankMask) -> Option<Rank> {
    STRAIGHTS
        .iter()
        .find(|(mask, _)| rank_mask & mask == *mask)
        .map(|(_, high)| *high)
}

/// Ранги стрита с заданной старшей картой, от старшего к младшему.
/// Для wheel туз идёт последним.
pub fn straight_ranks(high: Rank) -> [Rank; 5] {
    if high == Rank::Five {
        return [Rank::Five, Rank::Four, Rank::Three, Rank::Two, Rank::Ace];
    }
    let top = high as u8;
    let mut out = [high; 5];
    for (i, slot) in out.iter_mut().enumerate() {
        *slot = Rank::from_value(top - i as u8).unwrap_or(Rank::Two);
    }
    out
}
