use serde::{Deserialize, Serialize};

use crate::domain::chips::Chips;
use crate::domain::session::GameKind;
use crate::domain::{ChannelId, PlayerId};
use crate::engine::turn::ActionRequest;

/// Команда верхнего уровня от чат-слоя (слэш-команды и кнопки разбираются снаружи).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Command {
    /// Открыть лобби; хост сразу садится за стол.
    OpenLobby {
        channel_id: ChannelId,
        host: PlayerId,
        game: GameKind,
        bet: Chips,
    },
    Join {
        channel_id: ChannelId,
        player_id: PlayerId,
        bet: Chips,
    },
    /// Хост запускает игру досрочно.
    ForceStart {
        channel_id: ChannelId,
        player_id: PlayerId,
    },
    /// Хост отменяет игру (ставки возвращаются).
    Cancel {
        channel_id: ChannelId,
        player_id: PlayerId,
    },
    Act {
        channel_id: ChannelId,
        request: ActionRequest,
    },
}

impl Command {
    pub fn channel_id(&self) -> ChannelId {
        match self {
            Command::OpenLobby { channel_id, .. }
            | Command::Join { channel_id, .. }
            | Command::ForceStart { channel_id, .. }
            | Command::Cancel { channel_id, .. }
            | Command::Act { channel_id, .. } => *channel_id,
        }
    }
}
