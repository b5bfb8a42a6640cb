//! Координатор лобби: набор игроков, обратный отсчёт, старт или отмена.
//!
//! Порядок для любой операции со ставкой: проверить → списать через леджер →
//! заново взять сессию из стора → мутировать. Если после `await` сессия уже
//! не принимает игрока, списанное возвращается.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info};

use crate::api::dto::SessionView;
use crate::api::events::{CancelReason, TableEvent};
use crate::config::CasinoConfig;
use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::session::{GameKind, Phase, Seat, Session};
use crate::domain::{ChannelId, PlayerId};
use crate::engine::errors::{SessionError, ValidationError};
use crate::engine::table_manager::TableManager;
use crate::games::{BlackjackRound, ChinchiroRound, GameState, PokerRound};
use crate::infra::ledger::LedgerReason;
use crate::infra::rng::RandomSource;
use crate::time_ctrl::{seconds_remaining, Scheduler, TimerFired, TimerKind};

/// Проверить ставку по лимитам стола и вернуть сумму эскроу.
fn escrow_for_bet(config: &CasinoConfig, game: GameKind, bet: Chips) -> Result<Chips, SessionError> {
    let limits = config.limits(game);
    if bet < limits.min_bet || bet > limits.max_bet {
        return Err(ValidationError::BetOutOfRange {
            bet,
            min: limits.min_bet,
            max: limits.max_bet,
        }
        .into());
    }
    config
        .escrow_for(game, bet)
        .ok_or_else(|| SessionError::InternalInconsistency("переполнение эскроу".into()))
}

fn phase_error(session: &Session) -> SessionError {
    match session.phase {
        Phase::Resolving | Phase::Cancelled => SessionError::AlreadyResolved(session.channel_id),
        phase => ValidationError::WrongPhase(phase).into(),
    }
}

/// Может ли игрок сесть за стол прямо сейчас.
fn check_joinable(config: &CasinoConfig, session: &Session, player_id: PlayerId) -> Result<(), SessionError> {
    if session.phase != Phase::Waiting {
        return Err(phase_error(session));
    }
    if session.has_player(player_id) {
        return Err(ValidationError::AlreadyJoined(player_id).into());
    }
    if session.players.len() >= config.limits(session.game).max_players as usize {
        return Err(ValidationError::TableFull.into());
    }
    Ok(())
}

impl<S: Scheduler, R: RandomSource> TableManager<S, R> {
    fn lobby_tick_after(&self, remaining_ms: u64) -> Duration {
        let tick_ms = self.config.lobby.tick_secs as u64 * 1000;
        Duration::from_millis(tick_ms.min(remaining_ms).max(1))
    }

    pub(crate) async fn debit(
        &self,
        player_id: PlayerId,
        amount: Chips,
        reason: LedgerReason,
    ) -> Result<(), SessionError> {
        if amount.is_zero() {
            return Ok(());
        }
        let ledger = Arc::clone(&self.collab.ledger);
        ledger.debit(player_id, amount, reason).await?;
        Ok(())
    }

    /// Вернуть фишки, списанные под операцию, которая не состоялась.
    pub(crate) async fn refund(&self, channel_id: ChannelId, player_id: PlayerId, amount: Chips) {
        if amount.is_zero() {
            return;
        }
        let ledger = Arc::clone(&self.collab.ledger);
        if let Err(e) = ledger
            .credit(player_id, amount, LedgerReason::Refund { channel_id })
            .await
        {
            error!(channel = channel_id, player = player_id, %amount, error = %e, "возврат не прошёл");
        }
    }

    /// Открыть лобби. Хост садится первым, его ставка уходит в эскроу.
    pub async fn open_lobby(
        &mut self,
        channel_id: ChannelId,
        host: PlayerId,
        game: GameKind,
        bet: Chips,
    ) -> Result<SessionView, SessionError> {
        if self.store.contains(channel_id) {
            return Err(SessionError::AlreadyActive(channel_id));
        }
        let escrow = escrow_for_bet(&self.config, game, bet)?;
        self.debit(host, escrow, LedgerReason::Escrow { channel_id }).await?;

        let window_ms = self.config.lobby.join_window_secs as u64 * 1000;
        let now = self.store.now_ms();
        let created = self.store.create(channel_id, game, host).map(|session| {
            session.players.push(Seat::new(host, bet, escrow));
            session.deadline_ms = Some(now + window_ms);
        });
        if let Err(e) = created {
            // Канал заняли, пока ждали леджер.
            self.refund(channel_id, host, escrow).await;
            return Err(e);
        }
        let tick = self.lobby_tick_after(window_ms);
        self.store.arm(channel_id, TimerKind::LobbyTick, tick);
        info!(channel = channel_id, host, game = game.name(), %bet, "лобби открыто");

        let view = self
            .view(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        self.emit(TableEvent::LobbyOpened(view.clone()));

        if self.is_full(channel_id) {
            self.start_round(channel_id).await?;
        }
        Ok(view)
    }

    /// Сесть за стол. Повторный вход отклоняется без мутаций.
    ///
    /// Вход после дедлайна, но до финального тика принимается.
    pub async fn join(
        &mut self,
        channel_id: ChannelId,
        player_id: PlayerId,
        bet: Chips,
    ) -> Result<SessionView, SessionError> {
        let escrow = {
            let session = self
                .store
                .get(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            check_joinable(&self.config, session, player_id)?;
            escrow_for_bet(&self.config, session.game, bet)?
        };

        self.debit(player_id, escrow, LedgerReason::Escrow { channel_id }).await?;

        let recheck = match self.store.get(channel_id) {
            Some(session) => check_joinable(&self.config, session, player_id),
            None => Err(SessionError::SessionNotFound(channel_id)),
        };
        if let Err(e) = recheck {
            self.refund(channel_id, player_id, escrow).await;
            return Err(e);
        }
        if let Some(session) = self.store.get_mut(channel_id) {
            session.players.push(Seat::new(player_id, bet, escrow));
        }
        debug!(channel = channel_id, player = player_id, %bet, "игрок сел за стол");

        let view = self
            .view(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        self.emit(TableEvent::PlayerJoined {
            player_id,
            view: view.clone(),
        });

        if self.is_full(channel_id) {
            self.start_round(channel_id).await?;
        }
        Ok(view)
    }

    /// Хост запускает игру, не дожидаясь конца набора.
    pub async fn force_start(&mut self, channel_id: ChannelId, by: PlayerId) -> Result<(), SessionError> {
        let session = self
            .store
            .get(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        if session.phase != Phase::Waiting {
            return Err(phase_error(session));
        }
        if session.host != by {
            return Err(ValidationError::NotHost(by).into());
        }
        let need = self.config.limits(session.game).min_players as usize;
        if session.players.len() < need {
            return Err(ValidationError::NotEnoughPlayers {
                have: session.players.len(),
                need,
            }
            .into());
        }
        self.start_round(channel_id).await
    }

    /// Хост отменяет игру. Все ставки возвращаются.
    pub async fn cancel(&mut self, channel_id: ChannelId, by: PlayerId) -> Result<Vec<(PlayerId, Chips)>, SessionError> {
        let session = self
            .store
            .get(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        if session.host != by {
            return Err(ValidationError::NotHost(by).into());
        }
        if !session.phase.is_cancellable() {
            return Err(SessionError::AlreadyResolved(channel_id));
        }
        Ok(self.force_cancel(channel_id, CancelReason::HostCancelled).await)
    }

    fn is_full(&self, channel_id: ChannelId) -> bool {
        self.store
            .get(channel_id)
            .map(|s| {
                s.phase == Phase::Waiting
                    && s.players.len() >= self.config.limits(s.game).max_players as usize
            })
            .unwrap_or(false)
    }

    /// Тик лобби: отсчёт до дедлайна, на финальном тике старт или отмена.
    pub(crate) async fn on_lobby_tick(&mut self, fired: TimerFired) -> Result<(), SessionError> {
        if !self.store.take_fired(&fired) {
            debug!(channel = fired.channel_id, timer = fired.timer_id, "устаревший тик лобби");
            return Ok(());
        }
        let channel_id = fired.channel_id;
        let now = self.store.now_ms();
        let Some(session) = self.store.get(channel_id) else {
            return Ok(());
        };
        if session.phase != Phase::Waiting {
            return Ok(());
        }
        let deadline = session.deadline_ms.unwrap_or(now);
        let have = session.players.len();

        if now < deadline {
            self.emit(TableEvent::LobbyCountdown {
                channel_id,
                seconds_remaining: seconds_remaining(deadline, now),
                players: have,
            });
            let tick = self.lobby_tick_after(deadline - now);
            self.store.arm(channel_id, TimerKind::LobbyTick, tick);
            return Ok(());
        }

        let need = self.config.limits(session.game).min_players as usize;
        if have >= need {
            info!(channel = channel_id, players = have, "набор закрыт, стартуем");
            self.start_round(channel_id).await
        } else {
            info!(channel = channel_id, players = have, need, "недобор игроков, отмена");
            self.force_cancel(channel_id, CancelReason::NotEnoughPlayers).await;
            Ok(())
        }
    }

    /// Закрыть набор и раздать раунд. Несогласованность отменяет сессию.
    pub(crate) async fn start_round(&mut self, channel_id: ChannelId) -> Result<(), SessionError> {
        let result = self.try_start_round(channel_id).await;
        if let Err(SessionError::InternalInconsistency(msg)) = &result {
            error!(channel = channel_id, %msg, "не удалось начать раунд");
            self.force_cancel(channel_id, CancelReason::InternalInconsistency).await;
        }
        result
    }

    async fn try_start_round(&mut self, channel_id: ChannelId) -> Result<(), SessionError> {
        self.store.disarm(channel_id, TimerKind::LobbyTick);
        let (game, bets, staked) = {
            let session = self
                .store
                .get_mut(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            session.phase = Phase::Starting;
            session.deadline_ms = None;
            let bets: Vec<Chips> = session.players.iter().map(|s| s.bet).collect();
            let staked: Vec<Chips> = session.players.iter().map(|s| s.staked).collect();
            (session.game, bets, staked)
        };

        let mut banker = None;
        let state = match game {
            GameKind::Blackjack => {
                let rules = &self.config.blackjack;
                let mut shoe = Deck::shoe(rules.decks);
                shoe.shuffle_with(&mut self.rng);
                let round = BlackjackRound::deal(&bets, shoe, rules.max_hands, rules.dealer_hits_soft_17)
                    .map_err(|e| SessionError::InternalInconsistency(e.to_string()))?;
                GameState::Blackjack(round)
            }
            GameKind::Poker => {
                let mut deck = Deck::standard_52();
                deck.shuffle_with(&mut self.rng);
                let round = PokerRound::deal(&staked, deck, self.config.poker.min_raise)
                    .map_err(|e| SessionError::InternalInconsistency(e.to_string()))?;
                GameState::Poker(round)
            }
            GameKind::Chinchiro => match self.seat_banker(channel_id).await? {
                Some(idx) => {
                    banker = Some(idx);
                    GameState::Chinchiro(ChinchiroRound::new(bets.len(), idx, self.config.chinchiro.max_rolls))
                }
                None => {
                    self.force_cancel(channel_id, CancelReason::BankerCannotCover).await;
                    return Ok(());
                }
            },
        };

        let session = self
            .store
            .get_mut(channel_id)
            .ok_or(SessionError::SessionNotFound(channel_id))?;
        session.state = Some(state);
        session.banker = banker;
        session.phase = Phase::Playing;
        info!(channel = channel_id, game = game.name(), players = bets.len(), "раунд начался");
        self.emit_view(channel_id, TableEvent::RoundStarted);
        if game == GameKind::Poker {
            self.emit_private_views(channel_id);
        }

        self.begin_play(channel_id).await
    }

    /// Выбрать банкира тинчиро по ротации канала и добрать с него залог,
    /// покрывающий худший исход: хифуми-множитель × сумма чужих ставок.
    ///
    /// Кандидат без денег пропускается; `None`, если не смог никто.
    async fn seat_banker(&mut self, channel_id: ChannelId) -> Result<Option<usize>, SessionError> {
        let hifumi = self.config.chinchiro.hifumi;
        let candidates: Vec<(PlayerId, Chips)> = {
            let session = self
                .store
                .get(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            let total: Chips = session.players.iter().map(|s| s.bet).sum();
            session
                .players
                .iter()
                .map(|seat| {
                    let covered = hifumi
                        .apply(total - seat.bet)
                        .ok_or_else(|| SessionError::InternalInconsistency("переполнение залога".into()))?;
                    Ok((seat.player_id, covered.saturating_sub(seat.staked)))
                })
                .collect::<Result<_, SessionError>>()?
        };

        let n = candidates.len();
        if n == 0 {
            return Ok(None);
        }
        let start = (self.store.banker_rotation(channel_id) % n as u64) as usize;

        for offset in 0..n {
            let idx = (start + offset) % n;
            let (player_id, top_up) = candidates[idx];
            match self.debit(player_id, top_up, LedgerReason::BankerCollateral { channel_id }).await {
                Ok(()) => {}
                Err(SessionError::InsufficientFunds { .. }) => {
                    info!(channel = channel_id, player = player_id, %top_up, "кандидат в банкиры не покрывает залог");
                    continue;
                }
                Err(e) => return Err(e),
            }
            match self.store.get_mut(channel_id) {
                Some(session) if session.phase == Phase::Starting => {
                    session.players[idx].staked += top_up;
                    debug!(channel = channel_id, banker = player_id, %top_up, "банкир выбран");
                    return Ok(Some(idx));
                }
                _ => {
                    self.refund(channel_id, player_id, top_up).await;
                    return Err(SessionError::SessionNotFound(channel_id));
                }
            }
        }
        Ok(None)
    }
}
