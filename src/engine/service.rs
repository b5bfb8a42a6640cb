//! Асинхронный сервис столов.
//!
//! Один цикл событий на одной tokio-задаче: команды от чат-слоя и
//! срабатывания таймеров обрабатываются строго по одному, поэтому
//! стору сессий не нужен мьютекс.

use serde::{Deserialize, Serialize};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::api::commands::Command;
use crate::api::dto::SessionView;
use crate::api::errors::ApiError;
use crate::config::{CasinoConfig, ConfigError};
use crate::domain::chips::Chips;
use crate::domain::session::GameKind;
use crate::domain::{ChannelId, PlayerId};
use crate::engine::errors::SessionError;
use crate::engine::table_manager::{Collaborators, TableManager};
use crate::engine::turn::{ActionRequest, TurnOutcome};
use crate::infra::rng::RandomSource;
use crate::time_ctrl::{TimerFired, TokioScheduler};

/// Размер очереди команд.
const COMMAND_QUEUE: usize = 64;

/// Ответ сервиса на команду.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandOutput {
    View(SessionView),
    Started,
    Turn(TurnOutcome),
    Refunded(Vec<(PlayerId, Chips)>),
}

enum Request {
    Command {
        command: Command,
        reply: oneshot::Sender<Result<CommandOutput, ApiError>>,
    },
    View {
        channel_id: ChannelId,
        viewer: Option<PlayerId>,
        reply: oneshot::Sender<Option<SessionView>>,
    },
}

pub struct CasinoService<R: RandomSource> {
    manager: TableManager<TokioScheduler, R>,
    requests: mpsc::Receiver<Request>,
    timers: mpsc::UnboundedReceiver<TimerFired>,
}

impl<R> CasinoService<R>
where
    R: RandomSource + Send + Sync + 'static,
{
    pub fn new(config: CasinoConfig, rng: R, collab: Collaborators) -> Result<(Self, ServiceHandle), ConfigError> {
        let (timer_tx, timer_rx) = mpsc::unbounded_channel();
        let (tx, rx) = mpsc::channel(COMMAND_QUEUE);
        let manager = TableManager::new(config, TokioScheduler::new(timer_tx), rng, collab)?;
        Ok((
            Self {
                manager,
                requests: rx,
                timers: timer_rx,
            },
            ServiceHandle { tx },
        ))
    }

    /// Создать сервис и запустить его цикл в отдельной задаче.
    pub fn spawn(
        config: CasinoConfig,
        rng: R,
        collab: Collaborators,
    ) -> Result<(ServiceHandle, JoinHandle<()>), ConfigError> {
        let (service, handle) = Self::new(config, rng, collab)?;
        Ok((handle, tokio::spawn(service.run())))
    }

    /// Цикл событий. Заканчивается, когда закрыты все `ServiceHandle`;
    /// оставшиеся сессии при этом отменяются с возвратом ставок.
    pub async fn run(mut self) {
        info!("сервис столов запущен");
        loop {
            tokio::select! {
                request = self.requests.recv() => match request {
                    Some(request) => self.handle(request).await,
                    None => break,
                },
                Some(fired) = self.timers.recv() => {
                    self.manager.on_timer(fired).await;
                }
            }
        }
        self.manager.shutdown().await;
        info!("сервис столов остановлен");
    }

    async fn handle(&mut self, request: Request) {
        match request {
            Request::Command { command, reply } => {
                let channel_id = command.channel_id();
                let result = self.execute(command).await.map_err(ApiError::from);
                if let Err(e) = &result {
                    debug!(channel = channel_id, error = ?e, "команда отклонена");
                }
                let _ = reply.send(result);
            }
            Request::View {
                channel_id,
                viewer,
                reply,
            } => {
                let view = match viewer {
                    Some(player_id) => self.manager.view_for(channel_id, player_id),
                    None => self.manager.view(channel_id),
                };
                let _ = reply.send(view);
            }
        }
    }

    async fn execute(&mut self, command: Command) -> Result<CommandOutput, SessionError> {
        match command {
            Command::OpenLobby {
                channel_id,
                host,
                game,
                bet,
            } => self
                .manager
                .open_lobby(channel_id, host, game, bet)
                .await
                .map(CommandOutput::View),
            Command::Join {
                channel_id,
                player_id,
                bet,
            } => self
                .manager
                .join(channel_id, player_id, bet)
                .await
                .map(CommandOutput::View),
            Command::ForceStart { channel_id, player_id } => self
                .manager
                .force_start(channel_id, player_id)
                .await
                .map(|_| CommandOutput::Started),
            Command::Cancel { channel_id, player_id } => self
                .manager
                .cancel(channel_id, player_id)
                .await
                .map(CommandOutput::Refunded),
            Command::Act { channel_id, request } => self
                .manager
                .submit_action(channel_id, request)
                .await
                .map(CommandOutput::Turn),
        }
    }
}

/// Клонируемая ручка для отправки команд в сервис.
#[derive(Clone, Debug)]
pub struct ServiceHandle {
    tx: mpsc::Sender<Request>,
}

impl std::fmt::Debug for Request {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Request::Command { command, .. } => f.debug_tuple("Command").field(command).finish(),
            Request::View { channel_id, .. } => f.debug_tuple("View").field(channel_id).finish(),
        }
    }
}

fn stopped() -> ApiError {
    ApiError::Unavailable("сервис столов остановлен".into())
}

fn unexpected(output: CommandOutput) -> ApiError {
    ApiError::Internal(format!("неожиданный ответ сервиса: {output:?}"))
}

impl ServiceHandle {
    pub async fn execute(&self, command: Command) -> Result<CommandOutput, ApiError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Command { command, reply })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())?
    }

    pub async fn open_lobby(
        &self,
        channel_id: ChannelId,
        host: PlayerId,
        game: GameKind,
        bet: Chips,
    ) -> Result<SessionView, ApiError> {
        match self
            .execute(Command::OpenLobby {
                channel_id,
                host,
                game,
                bet,
            })
            .await?
        {
            CommandOutput::View(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    pub async fn join(&self, channel_id: ChannelId, player_id: PlayerId, bet: Chips) -> Result<SessionView, ApiError> {
        match self
            .execute(Command::Join {
                channel_id,
                player_id,
                bet,
            })
            .await?
        {
            CommandOutput::View(view) => Ok(view),
            other => Err(unexpected(other)),
        }
    }

    pub async fn force_start(&self, channel_id: ChannelId, player_id: PlayerId) -> Result<(), ApiError> {
        self.execute(Command::ForceStart { channel_id, player_id })
            .await
            .map(|_| ())
    }

    pub async fn cancel(&self, channel_id: ChannelId, player_id: PlayerId) -> Result<Vec<(PlayerId, Chips)>, ApiError> {
        match self.execute(Command::Cancel { channel_id, player_id }).await? {
            CommandOutput::Refunded(refunds) => Ok(refunds),
            other => Err(unexpected(other)),
        }
    }

    pub async fn act(&self, channel_id: ChannelId, request: ActionRequest) -> Result<TurnOutcome, ApiError> {
        match self.execute(Command::Act { channel_id, request }).await? {
            CommandOutput::Turn(outcome) => Ok(outcome),
            other => Err(unexpected(other)),
        }
    }

    pub async fn view(&self, channel_id: ChannelId) -> Result<Option<SessionView>, ApiError> {
        self.request_view(channel_id, None).await
    }

    /// Вид стола глазами игрока, с его карманными картами.
    pub async fn view_for(&self, channel_id: ChannelId, player_id: PlayerId) -> Result<Option<SessionView>, ApiError> {
        self.request_view(channel_id, Some(player_id)).await
    }

    async fn request_view(&self, channel_id: ChannelId, viewer: Option<PlayerId>) -> Result<Option<SessionView>, ApiError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::View {
                channel_id,
                viewer,
                reply,
            })
            .await
            .map_err(|_| stopped())?;
        rx.await.map_err(|_| stopped())
    }
}
