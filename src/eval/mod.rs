//! Модуль оценки силы покерных рук (Texas Hold'em).
//!
//! Основная функция:
//!   `evaluate_best_hand(hole, board) -> Option<BestHand>`
//!
//! Используется только на резолве раунда, не во время ходов.

pub mod evaluator;
pub mod hand_rank;
pub mod lookup_tables;

pub use evaluator::{evaluate_best_hand, evaluate_five, five_card_subsets, BestHand};
pub use hand_rank::{describe_hand, HandCategory, HandRank};
