//! Координатор ходов.
//!
//! Действие игрока и таймаут хода проходят через один и тот же путь
//! `advance_turn`. Перед первым `await` дедлайн снимается, а поколение хода
//! увеличивается: таймер, который успеет сработать, увидит чужое поколение
//! и ничего не сделает.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::api::events::{CancelReason, TableEvent};
use crate::domain::chips::Chips;
use crate::domain::session::{Phase, Session};
use crate::domain::{ChannelId, PlayerId, TurnGeneration};
use crate::engine::errors::{SessionError, ValidationError};
use crate::engine::table_manager::TableManager;
use crate::games::{BlackjackAction, GameAction, GameState};
use crate::infra::ledger::LedgerReason;
use crate::infra::rng::RandomSource;
use crate::payout::RoundResult;
use crate::time_ctrl::{Scheduler, TimerFired, TimerKind};

/// Действие игрока, привязанное к поколению хода, которое он видел.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionRequest {
    pub player_id: PlayerId,
    pub generation: TurnGeneration,
    pub action: GameAction,
}

/// Чем закончилось продвижение хода.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Ход перешёл (возможно, к тому же игроку, например после hit).
    Advanced {
        next_player: PlayerId,
        generation: TurnGeneration,
    },
    Resolved(RoundResult),
    /// Сессия отменена из-за внутренней ошибки.
    Cancelled,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Trigger {
    Action,
    Timeout,
}

fn ledger_reason(action: &GameAction, channel_id: ChannelId) -> LedgerReason {
    match action {
        GameAction::Blackjack(BlackjackAction::Double) => LedgerReason::Double { channel_id },
        GameAction::Blackjack(BlackjackAction::Split) => LedgerReason::Split { channel_id },
        GameAction::Blackjack(BlackjackAction::Insurance) => LedgerReason::Insurance { channel_id },
        GameAction::Blackjack(_) | GameAction::Chinchiro(_) => LedgerReason::Escrow { channel_id },
        GameAction::Poker(_) => LedgerReason::PokerBet { channel_id },
    }
}

/// Перенести флаги `done` из движка правил в места сессии.
fn sync_done(session: &mut Session) {
    if let Some(state) = session.state.as_ref() {
        for (idx, seat) in session.players.iter_mut().enumerate() {
            seat.done = state.is_seat_done(idx);
        }
    }
}

fn require_state(session: &Session) -> Result<&GameState, SessionError> {
    session
        .state
        .as_ref()
        .ok_or_else(|| SessionError::InternalInconsistency("нет состояния раунда".into()))
}

impl<S: Scheduler, R: RandomSource> TableManager<S, R> {
    fn turn_timeout(&self, session: &Session) -> Duration {
        self.config.turn_rules(session.game).action_timeout()
    }

    /// Первый ход раунда (или сразу расчёт, если раздача уже терминальна).
    pub(crate) async fn begin_play(&mut self, channel_id: ChannelId) -> Result<(), SessionError> {
        match self.hand_over_turn(channel_id) {
            Ok(true) => self.resolve(channel_id).await.map(|_| ()),
            Ok(false) => Ok(()),
            Err(e) => {
                self.cancel_inconsistent(channel_id, &e).await;
                Err(e)
            }
        }
    }

    /// Синхронно: выставить текущего игрока и взвести дедлайн.
    /// `Ok(true)`: раунд терминален, пора считать.
    fn hand_over_turn(&mut self, channel_id: ChannelId) -> Result<bool, SessionError> {
        let timeout = {
            let session = self
                .store
                .get_mut(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            sync_done(session);
            let state = require_state(session)?;
            if state.is_terminal() {
                return Ok(true);
            }
            let next = state.next_actor().ok_or_else(|| {
                SessionError::InternalInconsistency("раунд не окончен, но ходить некому".into())
            })?;
            if session.players.get(next).map(|s| s.done).unwrap_or(true) {
                return Err(SessionError::InternalInconsistency(format!(
                    "движок передал ход месту {next}, которое уже закончило"
                )));
            }
            session.current = Some(next);
            self.config.turn_rules(session.game).action_timeout()
        };
        self.arm_turn_deadline(channel_id, timeout);
        self.emit_view(channel_id, TableEvent::TurnStarted);
        Ok(false)
    }

    /// Действие игрока.
    pub async fn submit_action(&mut self, channel_id: ChannelId, req: ActionRequest) -> Result<TurnOutcome, SessionError> {
        let seat = {
            let session = self
                .store
                .get(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            match session.phase {
                Phase::Playing => {}
                Phase::Resolving | Phase::Cancelled => return Err(SessionError::AlreadyResolved(channel_id)),
                phase => return Err(ValidationError::WrongPhase(phase).into()),
            }
            if req.generation != session.generation {
                debug!(channel = channel_id, player = req.player_id, expected = session.generation, got = req.generation, "устаревшее действие");
                return Err(SessionError::StaleAction {
                    expected: session.generation,
                    got: req.generation,
                });
            }
            let seat = session
                .seat_of(req.player_id)
                .ok_or(ValidationError::NotAPlayer(req.player_id))?;
            if session.current != Some(seat) {
                return Err(ValidationError::NotYourTurn(req.player_id).into());
            }
            let state = require_state(session)?;
            if state.game() != req.action.game() {
                return Err(ValidationError::WrongGame.into());
            }
            state.validate(seat, &req.action)?;
            seat
        };
        self.advance_turn(channel_id, seat, req.action, Trigger::Action).await
    }

    /// Дедлайн хода. Устаревшее срабатывание игнорируется.
    pub(crate) async fn on_deadline(&mut self, fired: TimerFired) -> Result<Option<TurnOutcome>, SessionError> {
        let channel_id = fired.channel_id;
        let live = self
            .store
            .get(channel_id)
            .map(|s| s.phase == Phase::Playing && s.generation == fired.generation)
            .unwrap_or(false);
        if !live || !self.store.take_fired(&fired) {
            debug!(channel = channel_id, timer = fired.timer_id, generation = fired.generation, "устаревший дедлайн");
            return Ok(None);
        }

        let (seat, action) = {
            let session = self
                .store
                .get(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            let seat = session
                .current
                .ok_or_else(|| SessionError::InternalInconsistency("дедлайн без текущего игрока".into()))?;
            let state = require_state(session)?;
            let action = state.default_action_on_timeout(seat);
            if let Err(e) = state.validate(seat, &action) {
                return Err(SessionError::InternalInconsistency(format!("авто-действие недопустимо: {e}")));
            }
            (seat, action)
        };
        info!(channel = channel_id, seat, ?action, "время хода вышло");
        self.advance_turn(channel_id, seat, action, Trigger::Timeout).await.map(Some)
    }

    async fn advance_turn(
        &mut self,
        channel_id: ChannelId,
        seat: usize,
        action: GameAction,
        trigger: Trigger,
    ) -> Result<TurnOutcome, SessionError> {
        // До первого await: снять дедлайн и закрыть поколение.
        let now = self.store.now_ms();
        let (player_id, stake, time_left) = {
            let session = self
                .store
                .get(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            let state = require_state(session)?;
            let stake = state.stake_for(seat, &action);
            let time_left = session
                .deadline_ms
                .map(|d| Duration::from_millis(d.saturating_sub(now)))
                .unwrap_or_else(|| self.turn_timeout(session));
            (session.players[seat].player_id, stake, time_left)
        };
        self.store.disarm(channel_id, TimerKind::TurnDeadline);
        let generation = self
            .store
            .bump_generation(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        debug!(channel = channel_id, player = player_id, generation, ?trigger, "ход принят");

        if !stake.is_zero() {
            if let Err(e) = self.debit(player_id, stake, ledger_reason(&action, channel_id)).await {
                // Состояние игры не тронуто: тот же игрок, новое поколение, остаток времени.
                warn!(channel = channel_id, player = player_id, %stake, error = %e, "списание под действие не прошло");
                self.rearm_same_player(channel_id, generation, time_left);
                return Err(e);
            }
        }

        // Сессию берём заново: пока ждали леджер, её могли отменить.
        let still_ours = self
            .store
            .get(channel_id)
            .map(|s| s.phase == Phase::Playing && s.generation == generation)
            .unwrap_or(false);
        if !still_ours {
            self.refund(channel_id, player_id, stake).await;
            return Err(SessionError::SessionNotFound(channel_id));
        }

        let applied = {
            let session = self
                .store
                .get_mut(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            session.players[seat].staked += stake;
            match session.state.as_mut() {
                Some(state) => state.apply_action(seat, action, &mut self.rng),
                None => Err(crate::games::RuleError::RoundOver),
            }
        };
        if let Err(e) = applied {
            let err = SessionError::InternalInconsistency(format!("проверенное действие не применилось: {e}"));
            self.cancel_inconsistent(channel_id, &err).await;
            return Ok(TurnOutcome::Cancelled);
        }

        match self.hand_over_turn(channel_id) {
            Ok(true) => self.resolve(channel_id).await.map(TurnOutcome::Resolved),
            Ok(false) => {
                let session = self
                    .store
                    .get(channel_id)
                    .ok_or(SessionError::SessionNotFound(channel_id))?;
                let next_player = session
                    .current_player()
                    .ok_or_else(|| SessionError::InternalInconsistency("нет текущего игрока".into()))?;
                Ok(TurnOutcome::Advanced {
                    next_player,
                    generation: session.generation,
                })
            }
            Err(e) => {
                self.cancel_inconsistent(channel_id, &e).await;
                Ok(TurnOutcome::Cancelled)
            }
        }
    }

    /// После неудачного списания: ход остаётся за тем же игроком.
    fn rearm_same_player(&mut self, channel_id: ChannelId, generation: TurnGeneration, time_left: Duration) {
        let alive = self
            .store
            .get(channel_id)
            .map(|s| s.phase == Phase::Playing && s.generation == generation)
            .unwrap_or(false);
        if alive {
            self.arm_turn_deadline(channel_id, time_left.max(Duration::from_millis(1)));
            self.emit_view(channel_id, TableEvent::TurnStarted);
        }
    }

    pub(crate) async fn cancel_inconsistent(&mut self, channel_id: ChannelId, err: &SessionError) {
        error!(channel = channel_id, error = %err, "сессия в несогласованном состоянии, отменяем");
        self.force_cancel(channel_id, CancelReason::InternalInconsistency).await;
    }

    /// Сколько фишек уйдёт с игрока под действие (для подсказок в UI).
    pub fn quote_action(&self, channel_id: ChannelId, player_id: PlayerId, action: &GameAction) -> Option<Chips> {
        let session = self.store.get(channel_id)?;
        let seat = session.seat_of(player_id)?;
        let state = session.state.as_ref()?;
        state.validate(seat, action).ok()?;
        Some(state.stake_for(seat, action))
    }
}
