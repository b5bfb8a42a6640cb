use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::games::errors::RuleError;

/// Состояние раунда ставок (на конкретной улице).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BettingState {
    /// Текущая целевая ставка улицы, до которой должны дотянуться игроки.
    pub current_bet: Chips,
    /// Минимальный размер повышающей части рейза.
    pub min_raise: Chips,
    /// Место последнего агрессора (bet/raise).
    pub last_aggressor: Option<usize>,
    /// Очередь ходящих, кто ещё должен сделать действие на этой улице.
    pub to_act: Vec<usize>,
}

impl BettingState {
    pub fn new(min_raise: Chips, to_act: Vec<usize>) -> Self {
        Self {
            current_bet: Chips::ZERO,
            min_raise,
            last_aggressor: None,
            to_act,
        }
    }

    /// Удалить место из очереди to_act, если оно там есть.
    pub fn mark_acted(&mut self, seat: usize) {
        self.to_act.retain(|s| *s != seat);
    }

    /// Обновить состояние после bet/raise и перезапустить очередь.
    pub fn on_raise(&mut self, seat: usize, new_bet: Chips, raise_size: Chips, new_to_act: Vec<usize>) {
        self.current_bet = new_bet;
        if raise_size > self.min_raise {
            self.min_raise = raise_size;
        }
        self.last_aggressor = Some(seat);
        self.to_act = new_to_act;
    }

    pub fn is_round_complete(&self) -> bool {
        self.to_act.is_empty()
    }

    /// Сколько фишек нужно добавить месту, уже поставившему `street_bet`, чтобы уравнять.
    pub fn to_call(&self, street_bet: Chips) -> Chips {
        self.current_bet.saturating_sub(street_bet)
    }
}

/// Действие в покерном раунде ставок.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum BetAction {
    Fold,
    Check,
    Call,
    /// Поднять ставку улицы ДО указанной суммы. Без ставки на улице это bet.
    Raise(Chips),
}

/// Проверка, может ли место выполнить это действие при текущем состоянии ставок.
///
/// Баланс игрока здесь не проверяется: платёжеспособность решает леджер.
pub fn validate_bet(action: &BetAction, street_bet: Chips, betting: &BettingState) -> Result<(), RuleError> {
    let to_call = betting.to_call(street_bet);

    match action {
        BetAction::Fold => Ok(()),

        BetAction::Check => {
            if to_call.is_zero() {
                Ok(())
            } else {
                Err(RuleError::CannotCheck)
            }
        }

        BetAction::Call => {
            if to_call.is_zero() {
                Err(RuleError::CannotCall)
            } else {
                Ok(())
            }
        }

        BetAction::Raise(total_bet) => {
            if *total_bet <= betting.current_bet {
                return Err(RuleError::RaiseTooSmall);
            }
            let raise_size = *total_bet - betting.current_bet;
            if raise_size < betting.min_raise {
                return Err(RuleError::RaiseTooSmall);
            }
            Ok(())
        }
    }
}

/// Сколько фишек действие добавляет в банк.
pub fn bet_cost(action: &BetAction, street_bet: Chips, betting: &BettingState) -> Chips {
    match action {
        BetAction::Fold | BetAction::Check => Chips::ZERO,
        BetAction::Call => betting.to_call(street_bet),
        BetAction::Raise(total_bet) => total_bet.saturating_sub(street_bet),
    }
}
