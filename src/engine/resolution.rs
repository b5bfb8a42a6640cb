//! Завершение раунда: расчёт, выплаты, уведомления, освобождение канала.

use std::sync::Arc;

use tracing::{error, info, warn};

use crate::api::events::TableEvent;
use crate::domain::session::{GameKind, Phase};
use crate::domain::ChannelId;
use crate::engine::errors::SessionError;
use crate::engine::table_manager::TableManager;
use crate::infra::ledger::LedgerReason;
use crate::infra::rng::RandomSource;
use crate::payout::{self, PayoutError, RoundResult};
use crate::time_ctrl::Scheduler;

impl<S: Scheduler, R: RandomSource> TableManager<S, R> {
    /// Посчитать и выплатить терминальный раунд.
    ///
    /// Расчёт чистый и синхронный; сессия покидает стор до первого `await`,
    /// поэтому ни один таймер уже не может до неё дотянуться.
    pub(crate) async fn resolve(&mut self, channel_id: ChannelId) -> Result<RoundResult, SessionError> {
        let settled = {
            let session = self
                .store
                .get_mut(channel_id)
                .ok_or(SessionError::SessionNotFound(channel_id))?;
            session.phase = Phase::Resolving;
            session.current = None;
            session.deadline_ms = None;
            match session.state.as_ref() {
                Some(state) => payout::settle(channel_id, &session.players, state, &self.config),
                None => Err(PayoutError::IncompleteState("нет состояния раунда")),
            }
        };
        self.store.disarm_all(channel_id);

        let result = match settled {
            Ok(result) => result,
            Err(e) => {
                let err = SessionError::InternalInconsistency(e.to_string());
                self.cancel_inconsistent(channel_id, &err).await;
                return Err(err);
            }
        };

        if result.game == GameKind::Chinchiro {
            self.store.advance_banker(channel_id);
        }
        let freed = self.store.remove(channel_id);
        info!(
            channel = channel_id,
            game = result.game.name(),
            staked = %result.total_staked(),
            paid = %result.total_paid(),
            "раунд рассчитан"
        );

        let ledger = Arc::clone(&self.collab.ledger);
        for p in &result.players {
            if p.gross_payout.is_zero() {
                continue;
            }
            if let Err(e) = ledger
                .credit(p.player_id, p.gross_payout, LedgerReason::Payout { channel_id })
                .await
            {
                error!(channel = channel_id, player = p.player_id, amount = %p.gross_payout, error = %e, "выплата не прошла");
            }
        }

        // Best-effort: ошибка хука не меняет итог раунда.
        let notifier = Arc::clone(&self.collab.notifier);
        if let Err(e) = notifier.round_resolved(&result).await {
            warn!(channel = channel_id, error = %e, "хук уведомлений вернул ошибку");
        }

        self.emit(TableEvent::RoundResolved(result.clone()));
        if let Some(freed) = freed {
            self.emit(TableEvent::ChannelFreed(freed));
        }
        Ok(result)
    }
}
