// src/bin/casino_dev_cli.rs
//
// Локальный прогон сервиса: один канал блэкджека и один канал тинчиро
// с ботами, которые ходят по простой стратегии.
//
// Запуск: RUST_LOG=casino_engine=debug cargo run --bin casino_dev_cli -- [seed]

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use casino_engine::api::{SessionView, TableEvent, TableView};
use casino_engine::config::CasinoConfig;
use casino_engine::domain::chips::Chips;
use casino_engine::domain::session::{GameKind, Phase};
use casino_engine::domain::{ChannelId, PlayerId};
use casino_engine::engine::{ActionRequest, CasinoService, Collaborators, ServiceHandle};
use casino_engine::games::{BlackjackAction, ChinchiroAction, ChinchiroHand, GameAction};
use casino_engine::infra::{DeterministicRng, InMemoryLedger, NoopNotifier};

const BLACKJACK_CHANNEL: ChannelId = 100;
const CHINCHIRO_CHANNEL: ChannelId = 200;
const PLAYERS: [PlayerId; 3] = [1, 2, 3];

fn print_event(event: &TableEvent) {
    match event {
        TableEvent::LobbyOpened(view) => {
            println!("[{}] лобби {} открыто хостом {}", view.channel_id, view.game.name(), view.host)
        }
        TableEvent::PlayerJoined { player_id, view } => {
            println!("[{}] игрок {} сел за стол ({} мест)", view.channel_id, player_id, view.players.len())
        }
        TableEvent::LobbyCountdown {
            channel_id,
            seconds_remaining,
            players,
        } => println!("[{channel_id}] до старта {seconds_remaining} c, игроков: {players}"),
        TableEvent::RoundStarted(view) => println!("[{}] раунд начался", view.channel_id),
        TableEvent::PrivateView { player_id, view } => {
            let hole = view
                .players
                .iter()
                .find(|s| s.player_id == *player_id)
                .and_then(|s| s.hole_cards.as_ref())
                .map(|cards| cards.iter().map(ToString::to_string).collect::<Vec<_>>().join(" "))
                .unwrap_or_default();
            println!("[{}] (лично игроку {}) карманные карты: {}", view.channel_id, player_id, hole)
        }
        TableEvent::TurnStarted(view) => println!(
            "[{}] ходит {:?}, поколение {}, осталось {:?} c",
            view.channel_id, view.current_player, view.generation, view.seconds_remaining
        ),
        TableEvent::RoundResolved(result) => {
            println!("[{}] итоги раунда:", result.channel_id);
            for p in &result.players {
                println!(
                    "    игрок {}: внёс {}, получил {}, итог {:+}",
                    p.player_id, p.staked, p.gross_payout, p.net_change
                );
            }
        }
        TableEvent::Cancelled {
            channel_id, reason, ..
        } => println!("[{channel_id}] игра отменена: {reason:?}"),
        TableEvent::ChannelFreed(freed) => println!("[{}] канал свободен", freed.channel_id),
    }
}

/// Бот блэкджека: добирает до 17.
fn blackjack_move(view: &SessionView) -> Option<GameAction> {
    let seat = view.players.iter().position(|s| s.is_current)?;
    let TableView::Blackjack { hands, .. } = &view.table else {
        return None;
    };
    let hand = hands.get(seat)?.iter().find(|h| {
        h.status == casino_engine::games::blackjack::HandStatus::Playing
    })?;
    let action = if hand.value < 17 {
        BlackjackAction::Hit
    } else {
        BlackjackAction::Stand
    };
    Some(GameAction::Blackjack(action))
}

/// Бот тинчиро: перебрасывает мэнаси, пока можно.
fn chinchiro_move(view: &SessionView) -> Option<GameAction> {
    let seat = view.players.iter().position(|s| s.is_current)?;
    let TableView::Chinchiro { seats, .. } = &view.table else {
        return None;
    };
    let dice = seats.get(seat)?;
    let action = match dice.hand {
        None => ChinchiroAction::Roll,
        Some(ChinchiroHand::Menashi) if dice.rolls.len() < 3 => ChinchiroAction::Reroll,
        Some(_) => ChinchiroAction::Keep,
    };
    Some(GameAction::Chinchiro(action))
}

async fn play_channel(
    handle: &ServiceHandle,
    channel_id: ChannelId,
    game: GameKind,
    bet: Chips,
    bot: fn(&SessionView) -> Option<GameAction>,
) -> Result<(), Box<dyn std::error::Error>> {
    handle.open_lobby(channel_id, PLAYERS[0], game, bet).await.map_err(|e| format!("{e:?}"))?;
    for &player in &PLAYERS[1..] {
        handle.join(channel_id, player, bet).await.map_err(|e| format!("{e:?}"))?;
    }
    handle.force_start(channel_id, PLAYERS[0]).await.map_err(|e| format!("{e:?}"))?;

    while let Some(view) = handle.view(channel_id).await.map_err(|e| format!("{e:?}"))? {
        if view.phase != Phase::Playing {
            break;
        }
        let (Some(player_id), Some(action)) = (view.current_player, bot(&view)) else {
            break;
        };
        let request = ActionRequest {
            player_id,
            generation: view.generation,
            action,
        };
        if let Err(e) = handle.act(channel_id, request).await {
            if let Some(notice) = e.notice() {
                println!("[{channel_id}] игроку {player_id}: {notice}");
            }
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let seed: u64 = std::env::args()
        .nth(1)
        .and_then(|s| s.parse().ok())
        .unwrap_or(42);
    println!("casino_dev_cli: стартуем, seed = {seed}");

    let ledger = Arc::new(InMemoryLedger::with_balances(
        PLAYERS.iter().map(|&p| (p, Chips(100_000))),
    ));
    let (events_tx, mut events_rx) = mpsc::unbounded_channel();
    let collab = Collaborators {
        ledger: ledger.clone(),
        notifier: Arc::new(NoopNotifier),
        presenter: Arc::new(events_tx),
    };

    let mut config = CasinoConfig::standard();
    config.lobby.join_window_secs = 5;
    config.lobby.tick_secs = 1;

    let (handle, service) = CasinoService::spawn(config, DeterministicRng::from_seed(seed), collab)?;
    let printer = tokio::spawn(async move {
        while let Some(event) = events_rx.recv().await {
            print_event(&event);
        }
    });

    play_channel(&handle, BLACKJACK_CHANNEL, GameKind::Blackjack, Chips(1_000), blackjack_move).await?;
    play_channel(&handle, CHINCHIRO_CHANNEL, GameKind::Chinchiro, Chips(500), chinchiro_move).await?;

    drop(handle);
    service.await?;
    printer.await?;

    println!("Балансы после игры:");
    for &player in &PLAYERS {
        println!("    игрок {}: {}", player, ledger.balance(player));
    }
    println!("Всего фишек: {}", ledger.total());
    Ok(())
}
