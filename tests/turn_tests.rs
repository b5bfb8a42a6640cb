mod common;

use casino_engine::api::dto::{SessionView, TableView};
use casino_engine::api::events::TableEvent;
use casino_engine::domain::card::Card;
use casino_engine::domain::chips::Chips;
use casino_engine::domain::session::{GameKind, Phase};
use casino_engine::domain::PlayerId;
use casino_engine::engine::{ActionRequest, SessionError, TurnOutcome, ValidationError};
use casino_engine::games::betting::BetAction;
use casino_engine::games::blackjack::{BjSeat, HandStatus};
use casino_engine::games::{BlackjackAction, ChinchiroAction, ChinchiroHand, GameAction, GameState, RuleError};
use casino_engine::infra::rng::ScriptedRng;
use casino_engine::time_ctrl::TimerKind;

use common::{config, Stand, CHANNEL};

fn bj(player_id: PlayerId, generation: u64, action: BlackjackAction) -> ActionRequest {
    ActionRequest {
        player_id,
        generation,
        action: GameAction::Blackjack(action),
    }
}

fn dice(player_id: PlayerId, generation: u64, action: ChinchiroAction) -> ActionRequest {
    ActionRequest {
        player_id,
        generation,
        action: GameAction::Chinchiro(action),
    }
}

fn poker(player_id: PlayerId, generation: u64, action: BetAction) -> ActionRequest {
    ActionRequest {
        player_id,
        generation,
        action: GameAction::Poker(action),
    }
}

/// Блэкджек на одного игрока со ставкой 1000.
///
/// Сценарный RNG разворачивает шу: игрок получает 2♣ и 4♣ (6 очков),
/// дилер 3♣ и 5♣ (8 очков), дальше из шу идут 6♣, 7♣, 8♣ ...
async fn solo_blackjack(balance: u64) -> Stand {
    let mut t = Stand::new(config(), &[(1, balance)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Blackjack, Chips(1_000)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();
    t
}

fn player_cards(t: &Stand, seat: usize) -> usize {
    match t.session().and_then(|s| s.state.as_ref()) {
        Some(GameState::Blackjack(round)) => round.seats[seat].hands[0].cards.len(),
        _ => 0,
    }
}

#[tokio::test]
async fn action_advances_generation_and_resolves() {
    let mut t = solo_blackjack(10_000).await;
    let session = t.session().unwrap();
    assert_eq!(session.current, Some(0));
    assert_eq!(session.generation, 0);
    assert_eq!(session.deadline_ms, Some(30_000));

    let outcome = t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit)).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 1,
            generation: 1,
        }
    );
    assert_eq!(player_cards(&t, 0), 3);

    // 12 против 8: дилер добирает 7♣ и 8♣ и перебирает.
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 1, BlackjackAction::Stand)).await.unwrap();
    let TurnOutcome::Resolved(result) = outcome else {
        panic!("раунд должен был закончиться");
    };
    let p = result.player(1).unwrap();
    assert_eq!(p.staked, Chips(1_000));
    assert_eq!(p.gross_payout, Chips(2_000));

    assert!(t.session().is_none());
    assert_eq!(t.balance(1), 11_000);
    assert!(t.channel_freed());
    assert_eq!(t.notifier.seen().len(), 1);
    assert_eq!(t.manager.store().scheduler().pending_count(), 0);
}

#[tokio::test]
async fn timeout_applies_default_action() {
    let mut t = solo_blackjack(10_000).await;

    t.advance(29_999).await;
    assert_eq!(t.session().unwrap().phase, Phase::Playing);

    t.advance(1).await;

    // Stand по таймауту: 6 против 8 + 6♣ + 7♣ = 21.
    let result = t.resolved().expect("раунд рассчитан по таймауту");
    assert_eq!(result.player(1).unwrap().gross_payout, Chips::ZERO);
    assert!(t.session().is_none());
    assert_eq!(t.balance(1), 9_000);
}

#[tokio::test]
async fn stale_generation_is_rejected_without_effect() {
    let mut t = solo_blackjack(10_000).await;
    t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit)).await.unwrap();

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::StaleAction { expected: 1, got: 0 });
    assert_eq!(player_cards(&t, 0), 3);
    assert_eq!(t.session().unwrap().generation, 1);
}

#[tokio::test]
async fn action_before_late_timer_wins_and_timer_is_noop() {
    let mut t = solo_blackjack(10_000).await;

    // Дедлайн сработал, но событие ещё не доставлено.
    let fired = t.manager.scheduler_mut().advance(30_000);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].kind, TimerKind::TurnDeadline);

    t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit)).await.unwrap();
    for f in fired {
        t.manager.on_timer(f).await;
    }

    let session = t.session().unwrap();
    assert_eq!(session.phase, Phase::Playing);
    assert_eq!(session.generation, 1);
    assert_eq!(session.current, Some(0));
    assert_eq!(player_cards(&t, 0), 3);
    assert!(t.resolved().is_none());

    // Новый дедлайн отсчитывается от момента действия.
    assert_eq!(t.session().unwrap().deadline_ms, Some(60_000));
    t.advance(29_999).await;
    assert!(t.session().is_some());
    t.advance(1).await;
    assert_eq!(t.resolved().unwrap().player(1).unwrap().gross_payout, Chips(2_000));
}

#[tokio::test]
async fn timer_before_late_action_wins_and_action_is_rejected() {
    let mut t = solo_blackjack(10_000).await;
    t.advance(30_000).await;
    assert!(t.resolved().is_some());

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::SessionNotFound(CHANNEL));
    assert_eq!(t.balance(1), 9_000);
}

#[tokio::test]
async fn failed_double_keeps_turn_with_remaining_time() {
    // Весь баланс ушёл в эскроу: на дабл денег нет.
    let mut t = solo_blackjack(1_000).await;
    t.advance(10_000).await;

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Double))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::InsufficientFunds {
            player_id: 1,
            balance: Chips::ZERO,
            required: Chips(1_000),
        }
    );

    let session = t.session().unwrap();
    assert_eq!(session.phase, Phase::Playing);
    assert_eq!(session.current, Some(0));
    assert_eq!(session.generation, 1);
    assert_eq!(session.players[0].staked, Chips(1_000));
    assert_eq!(session.deadline_ms, Some(30_000));
    match session.state.as_ref() {
        Some(GameState::Blackjack(round)) => {
            let hand = &round.seats[0].hands[0];
            assert_eq!(hand.cards.len(), 2);
            assert_eq!(hand.bet, Chips(1_000));
            assert_eq!(hand.status, HandStatus::Playing);
        }
        other => panic!("ожидали блэкджек, получили {other:?}"),
    }

    // Игрок может сходить иначе под новым поколением.
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 1, BlackjackAction::Stand)).await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Resolved(_)));
}

#[tokio::test]
async fn failed_double_rearm_expires_at_original_deadline() {
    let mut t = solo_blackjack(1_000).await;
    t.advance(10_000).await;
    let _ = t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Double)).await;

    t.advance(19_999).await;
    assert!(t.session().is_some());
    t.advance(1).await;
    assert!(t.session().is_none());
    assert!(t.resolved().is_some());
}

#[tokio::test]
async fn double_debits_and_settles_doubled_bet() {
    let mut t = solo_blackjack(10_000).await;

    // 6 + 6♣ = 12, дилер 8 + 7♣ + 8♣ = 23.
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Double)).await.unwrap();
    let TurnOutcome::Resolved(result) = outcome else {
        panic!("дабл закрывает единственную руку");
    };
    let p = result.player(1).unwrap();
    assert_eq!(p.staked, Chips(2_000));
    assert_eq!(p.gross_payout, Chips(4_000));
    assert_eq!(t.balance(1), 12_000);
}

/// Блэкджек на одного игрока со ставкой 1000 и снятой колодой.
///
/// cut 8: игрок T♣ Q♣ (пара по очкам), дилер J♣ K♣, дальше A♣, 2♦, 3♦ ...
/// cut 11: игрок K♣ 2♦, дилер A♣ 3♦ (туз открыт), дальше 4♦, 5♦ ...
async fn cut_blackjack(balance: u64, cut: usize) -> Stand {
    let mut t = Stand::with_rng(config(), &[(1, balance)], ScriptedRng::new().with_cut(cut));
    t.manager.open_lobby(CHANNEL, 1, GameKind::Blackjack, Chips(1_000)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();
    t
}

fn bj_seat(t: &Stand) -> BjSeat {
    match t.session().and_then(|s| s.state.as_ref()) {
        Some(GameState::Blackjack(round)) => round.seats[0].clone(),
        other => panic!("ожидали блэкджек, получили {other:?}"),
    }
}

#[tokio::test]
async fn unfunded_split_keeps_single_hand_and_turn() {
    let mut t = cut_blackjack(1_000, 8).await;
    t.advance(5_000).await;

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Split))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::InsufficientFunds {
            player_id: 1,
            balance: Chips::ZERO,
            required: Chips(1_000),
        }
    );

    let seat = bj_seat(&t);
    assert_eq!(seat.hands.len(), 1);
    assert_eq!(seat.hands[0].cards.len(), 2);
    assert_eq!(seat.hands[0].bet, Chips(1_000));
    assert!(!seat.hands[0].from_split);

    let session = t.session().unwrap();
    assert_eq!(session.current, Some(0));
    assert_eq!(session.generation, 1);
    assert_eq!(session.players[0].staked, Chips(1_000));
    assert_eq!(session.deadline_ms, Some(30_000));
    assert_eq!(t.balance(1), 0);
}

#[tokio::test]
async fn funded_split_debits_bet_and_settles_both_hands() {
    let mut t = cut_blackjack(10_000, 8).await;

    let outcome = t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Split)).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 1,
            generation: 1,
        }
    );
    assert_eq!(t.balance(1), 8_000);
    assert_eq!(t.session().unwrap().players[0].staked, Chips(2_000));

    // Левая рука T♣ A♣ = 21 встала сама, правая Q♣ 2♦ = 12 ходит.
    let seat = bj_seat(&t);
    assert_eq!(seat.hands.len(), 2);
    assert_eq!(seat.hands[0].status, HandStatus::Stood);
    assert_eq!(seat.hands[0].value(), 21);
    assert!(!seat.hands[0].is_natural());
    assert_eq!(seat.hands[1].value(), 12);
    assert_eq!(seat.active, 1);

    // Дилер стоит на 20: левая выигрывает, правая проигрывает.
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 1, BlackjackAction::Stand)).await.unwrap();
    let TurnOutcome::Resolved(result) = outcome else {
        panic!("обе руки закрыты, раунд должен закончиться");
    };
    let p = result.player(1).unwrap();
    assert_eq!(p.staked, Chips(2_000));
    assert_eq!(p.gross_payout, Chips(2_000));
    assert_eq!(t.balance(1), 10_000);
    assert_eq!(t.ledger.total(), Chips(10_000));
}

#[tokio::test]
async fn funded_insurance_debits_half_bet_and_keeps_turn() {
    let mut t = cut_blackjack(10_000, 11).await;

    let outcome = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Insurance))
        .await
        .unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 1,
            generation: 1,
        }
    );
    assert_eq!(t.balance(1), 8_500);
    assert_eq!(t.session().unwrap().players[0].staked, Chips(1_500));
    let seat = bj_seat(&t);
    assert_eq!(seat.insurance, Chips(500));
    assert_eq!(seat.hands[0].cards.len(), 2);
    assert_eq!(seat.hands[0].status, HandStatus::Playing);

    // У дилера нет блэкджека: A♣ 3♦ + 4♦ = 18 против 12, страховка сгорает.
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 1, BlackjackAction::Stand)).await.unwrap();
    let TurnOutcome::Resolved(result) = outcome else {
        panic!("раунд должен был закончиться");
    };
    let p = result.player(1).unwrap();
    assert_eq!(p.staked, Chips(1_500));
    assert_eq!(p.gross_payout, Chips::ZERO);
    assert_eq!(t.balance(1), 8_500);
}

#[tokio::test]
async fn unfunded_insurance_leaves_seat_untouched() {
    let mut t = cut_blackjack(1_000, 11).await;

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Insurance))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SessionError::InsufficientFunds {
            player_id: 1,
            balance: Chips::ZERO,
            required: Chips(500),
        }
    );

    let seat = bj_seat(&t);
    assert_eq!(seat.insurance, Chips::ZERO);
    assert_eq!(seat.hands.len(), 1);
    assert_eq!(seat.hands[0].cards.len(), 2);

    let session = t.session().unwrap();
    assert_eq!(session.current, Some(0));
    assert_eq!(session.generation, 1);
    assert_eq!(session.players[0].staked, Chips(1_000));
}

#[tokio::test]
async fn turn_invariant_holds_through_multi_seat_round() {
    let mut t = Stand::new(config(), &[(1, 10_000), (2, 10_000)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Blackjack, Chips(1_000)).await.unwrap();
    t.manager.join(CHANNEL, 2, Chips(1_000)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();
    assert!(t.session().unwrap().turn_invariant_holds());

    // Не свой ход.
    let err = t
        .manager
        .submit_action(CHANNEL, bj(2, 0, BlackjackAction::Stand))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::NotYourTurn(2)));

    let outcome = t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Stand)).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 2,
            generation: 1,
        }
    );
    let session = t.session().unwrap();
    assert!(session.turn_invariant_holds());
    assert!(session.players[0].done);

    // Второй игрок молчит: таймаут.
    t.advance(30_000).await;
    let result = t.resolved().unwrap();
    assert_eq!(result.players.len(), 2);
    assert_eq!(result.total_staked(), Chips(2_000));
    // 7 и 9 против 4 + 7 + 8 = 19.
    assert_eq!(result.total_paid(), Chips::ZERO);
    assert_eq!(t.ledger.total(), Chips(18_000));
}

#[tokio::test]
async fn foreign_and_mismatched_actions_are_rejected() {
    let mut t = solo_blackjack(10_000).await;

    let err = t
        .manager
        .submit_action(CHANNEL, bj(9, 0, BlackjackAction::Stand))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::NotAPlayer(9)));

    let err = t
        .manager
        .submit_action(CHANNEL, dice(1, 0, ChinchiroAction::Roll))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::WrongGame));

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Split))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::Rule(RuleError::CannotSplit)));

    // Отклонённые действия не двигают поколение.
    assert_eq!(t.session().unwrap().generation, 0);
}

#[tokio::test]
async fn action_in_lobby_is_wrong_phase() {
    let mut t = Stand::new(config(), &[(1, 10_000)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Blackjack, Chips(1_000)).await.unwrap();

    let err = t
        .manager
        .submit_action(CHANNEL, bj(1, 0, BlackjackAction::Stand))
        .await
        .unwrap_err();
    assert_eq!(err, SessionError::Validation(ValidationError::WrongPhase(Phase::Waiting)));
}

#[tokio::test]
async fn dealer_hole_card_hidden_until_dealer_plays() {
    let t = solo_blackjack(10_000).await;
    let view = t.manager.view(CHANNEL).unwrap();

    assert_eq!(view.current_player, Some(1));
    assert_eq!(view.seconds_remaining, Some(30));
    match view.table {
        TableView::Blackjack {
            dealer_cards,
            dealer_hidden,
            hands,
            ..
        } => {
            assert_eq!(dealer_cards.len(), 1);
            assert_eq!(dealer_hidden, 1);
            assert_eq!(hands[0][0].value, 6);
        }
        other => panic!("ожидали блэкджек, получили {other:?}"),
    }
    assert!(t
        .events()
        .iter()
        .any(|e| matches!(e, TableEvent::TurnStarted(v) if v.current_player == Some(1))));
}

/// Тинчиро на троих со ставкой 500, банкир на месте 0.
async fn chinchiro_table(rng: ScriptedRng) -> Stand {
    let mut t = Stand::with_rng(config(), &[(1, 10_000), (2, 10_000), (3, 10_000)], rng);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Chinchiro, Chips(500)).await.unwrap();
    t.manager.join(CHANNEL, 2, Chips(500)).await.unwrap();
    t.manager.join(CHANNEL, 3, Chips(500)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();
    t
}

#[tokio::test]
async fn chinchiro_round_settles_against_banker() {
    let rng = ScriptedRng::with_dice(&[4, 5, 6, 2, 2, 5, 1, 2, 3]);
    let mut t = chinchiro_table(rng).await;

    let outcome = t.manager.submit_action(CHANNEL, dice(1, 0, ChinchiroAction::Roll)).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 2,
            generation: 1,
        }
    );
    t.manager.submit_action(CHANNEL, dice(2, 1, ChinchiroAction::Roll)).await.unwrap();
    let outcome = t.manager.submit_action(CHANNEL, dice(3, 2, ChinchiroAction::Roll)).await.unwrap();

    let TurnOutcome::Resolved(result) = outcome else {
        panic!("все бросили, раунд окончен");
    };
    assert_eq!(result.total_staked(), result.total_paid());
    // Банкир с сигоро: +500 с очка, +1000 с хифуми.
    assert_eq!(result.player(1).unwrap().net_change, 1_500);
    assert_eq!(result.player(2).unwrap().net_change, -500);
    assert_eq!(result.player(3).unwrap().net_change, -1_000);

    assert_eq!(t.balance(1), 11_500);
    assert_eq!(t.balance(2), 9_500);
    assert_eq!(t.balance(3), 9_000);
    assert_eq!(t.ledger.total(), Chips(30_000));
}

#[tokio::test]
async fn chinchiro_banker_rotates_to_next_seat_after_round() {
    let rng = ScriptedRng::with_dice(&[1, 2, 3]);
    let mut t = chinchiro_table(rng).await;

    // Хифуми банкира: остальные не бросают, раунд сразу рассчитан.
    let outcome = t.manager.submit_action(CHANNEL, dice(1, 0, ChinchiroAction::Roll)).await.unwrap();
    assert!(matches!(outcome, TurnOutcome::Resolved(_)));
    assert_eq!(t.balance(1), 8_000);
    assert_eq!(t.balance(2), 11_000);
    assert_eq!(t.balance(3), 11_000);

    t.manager.open_lobby(CHANNEL, 1, GameKind::Chinchiro, Chips(500)).await.unwrap();
    t.manager.join(CHANNEL, 2, Chips(500)).await.unwrap();
    t.manager.join(CHANNEL, 3, Chips(500)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();

    let session = t.session().unwrap();
    assert_eq!(session.banker, Some(1));
    assert_eq!(session.current, Some(1));
}

#[tokio::test]
async fn chinchiro_menashi_reroll_keeps_turn() {
    let rng = ScriptedRng::with_dice(&[1, 3, 5, 6, 6, 2]);
    let mut t = chinchiro_table(rng).await;

    let outcome = t.manager.submit_action(CHANNEL, dice(1, 0, ChinchiroAction::Roll)).await.unwrap();
    assert_eq!(
        outcome,
        TurnOutcome::Advanced {
            next_player: 1,
            generation: 1,
        }
    );
    t.manager.submit_action(CHANNEL, dice(1, 1, ChinchiroAction::Reroll)).await.unwrap();

    match t.manager.view(CHANNEL).unwrap().table {
        TableView::Chinchiro { seats, .. } => {
            assert_eq!(seats[0].rolls.len(), 2);
            assert_eq!(seats[0].hand, Some(ChinchiroHand::Point(2)));
            assert!(seats[0].finalized);
        }
        other => panic!("ожидали тинчиро, получили {other:?}"),
    }
    assert_eq!(t.session().unwrap().current, Some(1));
}

#[tokio::test]
async fn chinchiro_timeout_rolls_for_idle_player() {
    let rng = ScriptedRng::with_dice(&[2, 2, 3, 4, 4, 6]);
    let mut t = chinchiro_table(rng).await;

    t.manager.submit_action(CHANNEL, dice(1, 0, ChinchiroAction::Roll)).await.unwrap();
    t.advance(30_000).await;

    let session = t.session().unwrap();
    assert_eq!(session.current, Some(2));
    match session.state.as_ref() {
        Some(GameState::Chinchiro(round)) => {
            assert_eq!(round.seats[1].hand, Some(ChinchiroHand::Point(6)));
            assert!(round.seats[1].finalized);
        }
        other => panic!("ожидали тинчиро, получили {other:?}"),
    }
}

#[tokio::test]
async fn poker_call_without_funds_leaves_fold_only() {
    let mut t = Stand::new(config(), &[(1, 10_000), (2, 100)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Poker, Chips(100)).await.unwrap();
    t.manager.join(CHANNEL, 2, Chips(100)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();

    t.manager
        .submit_action(CHANNEL, poker(1, 0, BetAction::Raise(Chips(200))))
        .await
        .unwrap();
    let err = t
        .manager
        .submit_action(CHANNEL, poker(2, 1, BetAction::Call))
        .await
        .unwrap_err();
    assert!(matches!(err, SessionError::InsufficientFunds { player_id: 2, .. }));
    assert_eq!(t.session().unwrap().current, Some(1));

    let outcome = t.manager.submit_action(CHANNEL, poker(2, 2, BetAction::Fold)).await.unwrap();
    let TurnOutcome::Resolved(result) = outcome else {
        panic!("фолд оставляет одного игрока");
    };
    assert_eq!(result.player(1).unwrap().gross_payout, Chips(400));
    assert_eq!(t.balance(1), 10_100);
    assert_eq!(t.balance(2), 0);
}

fn hole(view: &SessionView, player_id: PlayerId) -> Option<Vec<Card>> {
    view.players
        .iter()
        .find(|s| s.player_id == player_id)
        .and_then(|s| s.hole_cards.clone())
}

fn cards(list: &[&str]) -> Vec<Card> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

#[tokio::test]
async fn poker_hole_cards_are_shown_only_to_their_owner() {
    let mut t = Stand::new(config(), &[(1, 10_000), (2, 10_000)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Poker, Chips(100)).await.unwrap();
    t.manager.join(CHANNEL, 2, Chips(100)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();

    // Раздача по кругу: место 0 получает 2♣ 4♣, место 1 получает 3♣ 5♣.
    let public = t.manager.view(CHANNEL).unwrap();
    assert!(public.players.iter().all(|s| s.hole_cards.is_none()));

    let first = t.manager.view_for(CHANNEL, 1).unwrap();
    assert_eq!(hole(&first, 1), Some(cards(&["2c", "4c"])));
    assert_eq!(hole(&first, 2), None);

    let second = t.manager.view_for(CHANNEL, 2).unwrap();
    assert_eq!(hole(&second, 2), Some(cards(&["3c", "5c"])));
    assert_eq!(hole(&second, 1), None);

    // Зритель не видит ничьих карт.
    let stranger = t.manager.view_for(CHANNEL, 9).unwrap();
    assert!(stranger.players.iter().all(|s| s.hole_cards.is_none()));

    let private: Vec<(PlayerId, SessionView)> = t
        .events()
        .into_iter()
        .filter_map(|e| match e {
            TableEvent::PrivateView { player_id, view } => Some((player_id, view)),
            _ => None,
        })
        .collect();
    assert_eq!(private.len(), 2);
    for (player_id, view) in &private {
        for seat in &view.players {
            assert_eq!(seat.hole_cards.is_some(), seat.player_id == *player_id);
        }
    }

    // Публичные события карманных карт не несут.
    for event in t.events() {
        if let TableEvent::RoundStarted(view) | TableEvent::TurnStarted(view) = event {
            assert!(view.players.iter().all(|s| s.hole_cards.is_none()));
        }
    }
}

#[tokio::test]
async fn blackjack_round_sends_no_private_views() {
    let t = solo_blackjack(10_000).await;
    assert!(!t.events().iter().any(|e| matches!(e, TableEvent::PrivateView { .. })));
    let view = t.manager.view_for(CHANNEL, 1).unwrap();
    assert_eq!(view.players[0].hole_cards, None);
}

#[tokio::test]
async fn failing_notifier_does_not_block_payout() {
    let mut t = Stand::with_failing_notifier(config(), &[(1, 10_000)]);
    t.manager.open_lobby(CHANNEL, 1, GameKind::Blackjack, Chips(1_000)).await.unwrap();
    t.manager.force_start(CHANNEL, 1).await.unwrap();
    t.manager.submit_action(CHANNEL, bj(1, 0, BlackjackAction::Hit)).await.unwrap();
    let outcome = t.manager.submit_action(CHANNEL, bj(1, 1, BlackjackAction::Stand)).await.unwrap();

    assert!(matches!(outcome, TurnOutcome::Resolved(_)));
    assert_eq!(t.balance(1), 11_000);
    assert!(t.channel_freed());
}
