use casino_engine::domain::card::Card;
use casino_engine::domain::chips::Chips;
use casino_engine::domain::deck::Deck;
use casino_engine::games::blackjack::{hand_value, is_natural, BlackjackAction, BlackjackRound, HandStatus};
use casino_engine::games::{RoundEngine, RuleError};
use casino_engine::infra::rng::ScriptedRng;

/// Утилита: карты из строк вида "Ah", "Td".
fn cards(list: &[&str]) -> Vec<Card> {
    list.iter().map(|s| s.parse().unwrap()).collect()
}

/// Раздать раунд из колоды, где карты выходят ровно в заданном порядке.
///
/// Порядок раздачи: по карте каждому месту, дилеру, потом второй круг.
fn deal(bets: &[u64], draw_order: &[&str]) -> BlackjackRound {
    let bets: Vec<Chips> = bets.iter().map(|b| Chips(*b)).collect();
    BlackjackRound::deal(&bets, Deck::stacked(&cards(draw_order)), 4, false).unwrap()
}

#[test]
fn hand_value_counts_aces_soft_then_hard() {
    assert_eq!(hand_value(&cards(&["Ah", "6d"])), (17, true));
    assert_eq!(hand_value(&cards(&["Ah", "6d", "9c"])), (16, false));
    assert_eq!(hand_value(&cards(&["Ah", "Ad"])), (12, true));
    assert_eq!(hand_value(&cards(&["Ah", "Ad", "Ac", "As"])), (14, true));
    assert_eq!(hand_value(&cards(&["Kh", "Qd", "5c"])), (25, false));
    assert!(is_natural(&cards(&["As", "Jd"])));
    assert!(!is_natural(&cards(&["7s", "7d", "7c"])));
}

#[test]
fn deal_order_alternates_players_and_dealer() {
    let round = deal(&[100, 100], &["2c", "3c", "4c", "5c", "6c", "7c", "8c"]);

    assert_eq!(round.seats[0].hands[0].cards, cards(&["2c", "5c"]));
    assert_eq!(round.seats[1].hands[0].cards, cards(&["3c", "6c"]));
    assert_eq!(round.dealer, cards(&["4c", "7c"]));
    assert_eq!(round.dealer_upcard(), Some(cards(&["4c"])[0]));
    assert_eq!(round.next_actor(), Some(0));
}

#[test]
fn hit_to_bust_moves_turn_to_next_seat() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100, 100], &["Tc", "9c", "7c", "5c", "9d", "9h", "Kd", "2s"]);

    round.apply_action(0, BlackjackAction::Hit, &mut rng).unwrap();
    assert_eq!(round.seats[0].hands[0].status, HandStatus::Busted);
    assert!(round.is_seat_done(0));
    assert_eq!(round.next_actor(), Some(1));
}

#[test]
fn drawing_to_21_stands_automatically() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["5c", "9c", "6c", "7c", "Th"]);

    round.apply_action(0, BlackjackAction::Hit, &mut rng).unwrap();

    assert_eq!(round.seats[0].hands[0].value(), 21);
    assert_eq!(round.seats[0].hands[0].status, HandStatus::Stood);
    // Последнее место закончило, дилер доиграл.
    assert!(round.is_terminal());
}

#[test]
fn double_takes_exactly_one_card_and_doubles_bet() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100, 100], &["5c", "9c", "Tc", "6c", "9d", "7c", "2h"]);

    assert_eq!(round.stake_for(0, &BlackjackAction::Double), Chips(100));
    round.apply_action(0, BlackjackAction::Double, &mut rng).unwrap();

    let hand = &round.seats[0].hands[0];
    assert_eq!(hand.cards.len(), 3);
    assert_eq!(hand.bet, Chips(200));
    assert_eq!(hand.status, HandStatus::Doubled);
    assert_eq!(round.next_actor(), Some(1));
}

#[test]
fn double_only_on_two_cards() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["2c", "9c", "3c", "7c", "4h", "5h"]);

    round.apply_action(0, BlackjackAction::Hit, &mut rng).unwrap();
    assert_eq!(
        round.validate(0, &BlackjackAction::Double),
        Err(RuleError::CannotDouble)
    );
}

#[test]
fn split_pair_plays_hands_left_to_right() {
    let mut rng = ScriptedRng::new();
    // Место 0: 8-8; дилер 10-7; сплит добирает 3 и K.
    let mut round = deal(&[100], &["8c", "Tc", "8d", "7c", "3h", "Kh", "Ts"]);

    assert_eq!(round.stake_for(0, &BlackjackAction::Split), Chips(100));
    round.apply_action(0, BlackjackAction::Split, &mut rng).unwrap();

    let seat = &round.seats[0];
    assert_eq!(seat.hands.len(), 2);
    assert_eq!(seat.hands[0].cards, cards(&["8c", "3h"]));
    assert_eq!(seat.hands[1].cards, cards(&["8d", "Kh"]));
    assert!(seat.hands.iter().all(|h| h.bet == Chips(100) && h.from_split));
    assert_eq!(seat.active, 0);

    // Первая рука: 11 + T = 21, автостоп; ход переходит на вторую руку.
    round.apply_action(0, BlackjackAction::Hit, &mut rng).unwrap();
    assert_eq!(round.seats[0].hands[0].status, HandStatus::Stood);
    assert_eq!(round.seats[0].active, 1);
    assert_eq!(round.next_actor(), Some(0));

    round.apply_action(0, BlackjackAction::Stand, &mut rng).unwrap();
    assert!(round.is_terminal());
}

#[test]
fn split_allowed_on_equal_point_value() {
    let round = deal(&[100], &["Kc", "9c", "Qd", "7c", "3h", "4h"]);
    assert_eq!(round.validate(0, &BlackjackAction::Split), Ok(()));
}

#[test]
fn split_aces_receive_one_card_and_stand() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["Ac", "9c", "Ad", "8c", "Kh", "5h"]);

    round.apply_action(0, BlackjackAction::Split, &mut rng).unwrap();

    let seat = &round.seats[0];
    assert!(seat.hands.iter().all(|h| h.status == HandStatus::Stood));
    // 21 после сплита не считается натуральным блэкджеком.
    assert_eq!(seat.hands[0].value(), 21);
    assert!(!seat.hands[0].is_natural());
    assert!(round.is_terminal());
}

#[test]
fn split_capped_by_max_hands() {
    let mut rng = ScriptedRng::new();
    let bets = [Chips(100)];
    let draw = cards(&["8c", "Tc", "8d", "7c", "8h", "8s", "2c", "3c"]);
    let mut round = BlackjackRound::deal(&bets, Deck::stacked(&draw), 2, false).unwrap();

    round.apply_action(0, BlackjackAction::Split, &mut rng).unwrap();
    assert_eq!(round.seats[0].hands.len(), 2);
    assert_eq!(round.seats[0].hands[0].cards, cards(&["8c", "8h"]));
    assert_eq!(
        round.validate(0, &BlackjackAction::Split),
        Err(RuleError::CannotSplit)
    );
}

#[test]
fn insurance_only_against_dealer_ace_once() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["Tc", "Ac", "9c", "6d", "5h"]);

    assert_eq!(round.stake_for(0, &BlackjackAction::Insurance), Chips(50));
    round.apply_action(0, BlackjackAction::Insurance, &mut rng).unwrap();
    assert_eq!(round.seats[0].insurance, Chips(50));
    // Ход остаётся за игроком.
    assert_eq!(round.next_actor(), Some(0));
    assert_eq!(
        round.validate(0, &BlackjackAction::Insurance),
        Err(RuleError::InsuranceUnavailable)
    );

    let no_ace = deal(&[100], &["Tc", "9d", "9c", "6d"]);
    assert_eq!(
        no_ace.validate(0, &BlackjackAction::Insurance),
        Err(RuleError::InsuranceUnavailable)
    );
}

#[test]
fn natural_seats_are_done_at_deal() {
    let round = deal(&[100, 100], &["Ac", "9c", "Tc", "Kd", "5d", "7c"]);

    assert_eq!(round.seats[0].hands[0].status, HandStatus::Natural);
    assert!(round.is_seat_done(0));
    assert_eq!(round.next_actor(), Some(1));
}

#[test]
fn dealer_skips_drawing_when_every_hand_is_settled() {
    // Единственный игрок с натуральным: дилеру добирать незачем.
    let round = deal(&[100], &["Ac", "2c", "Kd", "3c", "4c", "5c"]);

    assert!(round.is_terminal());
    assert_eq!(round.dealer, cards(&["2c", "3c"]));
}

#[test]
fn dealer_draws_to_17_and_stands_on_soft_17() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["Tc", "2c", "9c", "4c", "Ah", "5d"]);

    round.apply_action(0, BlackjackAction::Stand, &mut rng).unwrap();
    // 2 + 4 + A = soft 17: стоит.
    assert_eq!(round.dealer_value(), 17);
    assert_eq!(round.dealer.len(), 3);
}

#[test]
fn dealer_hits_soft_17_when_configured() {
    let mut rng = ScriptedRng::new();
    let bets = [Chips(100)];
    let draw = cards(&["Tc", "2c", "9c", "4c", "Ah", "5d"]);
    let mut round = BlackjackRound::deal(&bets, Deck::stacked(&draw), 4, true).unwrap();

    round.apply_action(0, BlackjackAction::Stand, &mut rng).unwrap();
    assert_eq!(round.dealer_value(), 12);
    assert_eq!(round.dealer.len(), 4);
}

#[test]
fn dealer_stands_when_shoe_runs_out() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100], &["Tc", "2c", "9c", "3c"]);

    round.apply_action(0, BlackjackAction::Stand, &mut rng).unwrap();
    assert!(round.is_terminal());
    assert_eq!(round.dealer_value(), 5);
}

#[test]
fn hit_rejected_on_empty_shoe() {
    let round = deal(&[100], &["2c", "2d", "3c", "3d"]);
    assert_eq!(round.validate(0, &BlackjackAction::Hit), Err(RuleError::DeckExhausted));
    assert_eq!(round.validate(0, &BlackjackAction::Stand), Ok(()));
}

#[test]
fn out_of_turn_and_finished_round_are_rejected() {
    let mut rng = ScriptedRng::new();
    let mut round = deal(&[100, 100], &["Tc", "9c", "7c", "5c", "9d", "9h"]);

    assert_eq!(round.validate(1, &BlackjackAction::Stand), Err(RuleError::NotYourTurn(1)));
    assert_eq!(round.validate(5, &BlackjackAction::Stand), Err(RuleError::UnknownSeat(5)));

    round.apply_action(0, BlackjackAction::Stand, &mut rng).unwrap();
    round.apply_action(1, BlackjackAction::Stand, &mut rng).unwrap();
    assert!(round.is_terminal());
    assert_eq!(round.next_actor(), None);
    assert_eq!(round.validate(0, &BlackjackAction::Stand), Err(RuleError::RoundOver));
}

#[test]
fn timeout_default_is_stand() {
    let round = deal(&[100], &["Tc", "9c", "7c", "5c", "9d"]);
    assert_eq!(round.default_action_on_timeout(0), BlackjackAction::Stand);
}
