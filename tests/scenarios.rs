//! End-to-end scripted hands over the public API.

use omnipoker::betting::Stakes;
use omnipoker::betting::Structure;
use omnipoker::cards::parse_cards;
use omnipoker::game::Game;
use omnipoker::game::GameEvent;
use omnipoker::game::GameState;
use omnipoker::game::PlayerAction;
use omnipoker::rules::DrawAmount;
use omnipoker::rules::RelativeTo;
use omnipoker::rules::StepAction;
use omnipoker::rules::StepBody;
use omnipoker::variants;
use rand::rngs::SmallRng;
use rand::SeedableRng;

fn rng(seed: u64) -> Box<dyn rand::RngCore + Send> {
    Box::new(SmallRng::seed_from_u64(seed))
}

fn act(game: &mut Game, player: u64, action: PlayerAction) {
    let result = game.player_action(player, action);
    assert!(result.success, "P{} rejected: {:?}", player, result.error);
    if result.advance_step {
        game.advance().unwrap();
    }
}

#[test]
fn heads_up_fold_short_circuits() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(1),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.rig_next_deck(parse_cards("As Ks 2c 7d").unwrap());
    game.start_hand().unwrap();
    // heads-up: the dealer posts the small blind and acts first preflop
    assert_eq!(game.current_actor(), Some(1));
    assert_eq!(game.pot_total(), 3);
    let result = game.player_action(1, PlayerAction::Fold);
    assert!(result.success);
    assert_eq!(game.state(), GameState::Complete);
    let results = game.hand_results().unwrap().clone();
    assert_eq!(results.won_by(2), 3);
    assert_eq!(game.table().seat(2).unwrap().stack, 201);
    assert_eq!(game.table().seat(1).unwrap().stack, 199);
    // no community cards were ever dealt
    let events = game.drain_events();
    assert!(!events.iter().any(|e| matches!(
        e,
        GameEvent::Deal {
            location: omnipoker::rules::DealLocation::Community,
            ..
        }
    )));
}

#[test]
fn three_way_preflop_calls_and_postflop_order() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::Limit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(2),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.add_player(3, "p3", 200).unwrap();
    game.start_hand().unwrap();
    // button p1, sb p2, bb p3; first actor is after the big blind
    assert_eq!(game.current_actor(), Some(1));
    act(&mut game, 1, PlayerAction::Call);
    act(&mut game, 2, PlayerAction::Call);
    act(&mut game, 3, PlayerAction::Check);
    assert_eq!(game.pot_total(), 6);
    // three community cards are out, first active clockwise of the
    // dealer opens the flop
    let view = game.view_for(None);
    assert_eq!(view.community.values().map(|v| v.len()).sum::<usize>(), 3);
    assert_eq!(game.current_actor(), Some(2));
}

#[test]
fn stud_bring_in_and_high_hand_order() {
    let rules = variants::seven_card_stud();
    let mut game = Game::new(
        rules,
        Structure::Limit,
        Stakes::stud(1, 3, 10),
        100..=500,
        rng(3),
    )
    .unwrap();
    for (id, name) in [(1, "p1"), (2, "p2"), (3, "p3"), (4, "p4"), (5, "p5")] {
        game.add_player(id, name, 200).unwrap();
    }
    // dealer is seat 0 (p1); third street deals start left of the button:
    // p2, p3, p4, p5, p1, each two down one up
    game.rig_next_deck(
        parse_cards(
            "2h 3h 9h \
             4h 5h Jd \
             6h 7h Ks \
             8h Th Qc \
             Jh Qh 2c \
             3c 4c Kd 5c 6c",
        )
        .unwrap(),
    );
    game.start_hand().unwrap();
    // p1 shows the lowest up-card and was forced in for the bring-in;
    // action proceeds clockwise to p2
    assert_eq!(game.pot_total(), 5 + 3);
    assert_eq!(game.current_actor(), Some(2));
    for player in [2, 3, 4, 5] {
        act(&mut game, player, PlayerAction::Call);
    }
    // fourth street: 3c 4c Kd 5c to p2..p5, 6c to p1; p4 pairs nothing
    // but holds K-K high board, the best hand showing opens
    assert_eq!(game.current_actor(), Some(4));
}

#[test]
fn omaha_hi_lo_splits_high_and_low() {
    let rules = variants::omaha_hi_lo_8();
    let mut game = Game::new(
        rules,
        Structure::Limit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(4),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    // heads-up: p1 is dealer and small blind, dealt first
    game.rig_next_deck(
        parse_cards("Kh Kd 9s Ts As 2s 5h Jd Ks Qd 7d 4c 8d").unwrap(),
    );
    game.start_hand().unwrap();
    act(&mut game, 1, PlayerAction::Call);
    act(&mut game, 2, PlayerAction::Check);
    for _ in 0..3 {
        act(&mut game, 2, PlayerAction::Check);
        act(&mut game, 1, PlayerAction::Check);
    }
    assert_eq!(game.state(), GameState::Complete);
    let results = game.hand_results().unwrap();
    // trips kings take the high half, the eight-low takes the low half
    assert_eq!(results.won_by(1), 2);
    assert_eq!(results.won_by(2), 2);
    let high = results
        .pots
        .iter()
        .find(|p| p.configuration == "High Hand")
        .unwrap();
    assert_eq!(high.winners, vec![(1, 2)]);
    let low = results
        .pots
        .iter()
        .find(|p| p.configuration == "Low Hand")
        .unwrap();
    assert_eq!(low.winners, vec![(2, 2)]);
}

#[test]
fn omaha_hi_lo_scoops_when_one_hand_wins_both() {
    let rules = variants::omaha_hi_lo_8();
    let mut game = Game::new(
        rules,
        Structure::Limit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(5),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.rig_next_deck(
        parse_cards("4s 5h Kd Ks 9c 9d Qc Jc Ad 2d 3s 8h Kc").unwrap(),
    );
    game.start_hand().unwrap();
    act(&mut game, 1, PlayerAction::Call);
    act(&mut game, 2, PlayerAction::Check);
    for _ in 0..3 {
        act(&mut game, 2, PlayerAction::Check);
        act(&mut game, 1, PlayerAction::Check);
    }
    let results = game.hand_results().unwrap();
    // p1 holds the wheel for low and trip kings for high: a full scoop
    assert_eq!(results.won_by(1), 4);
    assert_eq!(results.won_by(2), 0);
}

#[test]
fn multi_way_all_in_builds_nested_side_pots() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        40..=100,
        rng(6),
    )
    .unwrap();
    game.add_player(1, "p1", 100).unwrap();
    game.add_player(2, "p2", 60).unwrap();
    game.add_player(3, "p3", 40).unwrap();
    // dealing starts at the small blind: p2, p3, then the button
    game.rig_next_deck(parse_cards("Kh Kd As Ad 2c 3d Ah Ks 7d 8d 4c").unwrap());
    game.start_hand().unwrap();
    // button p1 shoves, both blinds call for their stacks
    act(&mut game, 1, PlayerAction::Bet { to: 100 });
    act(&mut game, 2, PlayerAction::Call);
    act(&mut game, 3, PlayerAction::Call);
    // board runs out with no further decisions
    assert_eq!(game.state(), GameState::Complete);
    let results = game.hand_results().unwrap();
    let amounts = results.pots.iter().map(|p| p.amount).collect::<Vec<i64>>();
    assert_eq!(amounts, vec![120, 40, 40]);
    assert_eq!(results.pots[0].pot, None);
    assert_eq!(results.pots[1].pot, Some(0));
    assert_eq!(results.pots[2].pot, Some(1));
    // trip aces take the main, trip kings the first side, and the
    // uncalled remainder returns to the big stack
    assert_eq!(results.pots[0].winners, vec![(3, 120)]);
    assert_eq!(results.pots[1].winners, vec![(2, 40)]);
    assert_eq!(results.pots[2].winners, vec![(1, 40)]);
    assert_eq!(game.table().seat(3).unwrap().stack, 120);
    assert_eq!(game.table().seat(2).unwrap().stack, 40);
    assert_eq!(game.table().seat(1).unwrap().stack, 40);
}

#[test]
fn draw_amount_relative_to_discard() {
    let mut rules = variants::five_card_draw();
    // deal three new cards for every four discarded
    for step in rules.gameplay.iter_mut() {
        let actions = match &mut step.body {
            StepBody::Grouped { grouped_actions } => grouped_actions.iter_mut(),
            StepBody::Single(action) => std::slice::from_mut(action).iter_mut(),
        };
        for action in actions {
            if let StepAction::Draw(draw) = action {
                draw.draw_amount = Some(DrawAmount {
                    relative_to: RelativeTo::Discard,
                    offset: -1,
                });
            }
        }
    }
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(7),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.start_hand().unwrap();
    act(&mut game, 1, PlayerAction::Call);
    act(&mut game, 2, PlayerAction::Check);
    // the draw round starts at the small blind (dealer, heads-up)
    assert_eq!(game.current_actor(), Some(1));
    let hand = game.view_for(Some(1)).seat(1).unwrap().subsets["default"]
        .iter()
        .filter_map(|c| c.card)
        .collect::<Vec<_>>();
    act(
        &mut game,
        1,
        PlayerAction::Discard {
            cards: hand[..4].to_vec(),
        },
    );
    // four went out, three came back
    assert_eq!(game.table().seat(1).unwrap().hand_size(), 4);
    act(&mut game, 2, PlayerAction::Discard { cards: vec![] });
    assert_eq!(game.table().seat(2).unwrap().hand_size(), 5);
}

#[test]
fn scripted_hands_are_deterministic() {
    let run = || {
        let rules = variants::texas_holdem();
        let mut game = Game::new(
            rules,
            Structure::NoLimit,
            Stakes::blinds(1, 2),
            100..=500,
            rng(42),
        )
        .unwrap();
        game.add_player(1, "p1", 200).unwrap();
        game.add_player(2, "p2", 200).unwrap();
        game.add_player(3, "p3", 200).unwrap();
        game.start_hand().unwrap();
        act(&mut game, 1, PlayerAction::Call);
        act(&mut game, 2, PlayerAction::Call);
        act(&mut game, 3, PlayerAction::Check);
        for _ in 0..3 {
            act(&mut game, 2, PlayerAction::Check);
            act(&mut game, 3, PlayerAction::Check);
            act(&mut game, 1, PlayerAction::Check);
        }
        assert_eq!(game.state(), GameState::Complete);
        game.hand_results().unwrap().clone()
    };
    assert_eq!(run(), run());
}

#[test]
fn event_log_round_trips_through_serde() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(9),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.start_hand().unwrap();
    game.player_action(1, PlayerAction::Fold);
    let events = game.drain_events();
    let json = serde_json::to_string(&events).unwrap();
    let back: Vec<GameEvent> = serde_json::from_str(&json).unwrap();
    assert_eq!(events, back);
}

#[test]
fn status_resets_between_hands() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(10),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.add_player(3, "p3", 200).unwrap();
    game.start_hand().unwrap();
    act(&mut game, 1, PlayerAction::Fold);
    act(&mut game, 2, PlayerAction::Fold);
    assert_eq!(game.state(), GameState::Complete);
    game.start_hand().unwrap();
    assert!(game
        .table()
        .occupied()
        .all(|s| s.status == omnipoker::table::SeatStatus::Active));
    // the button moved clockwise
    assert_eq!(game.table().dealer(), 1);
}

#[test]
fn views_redact_other_players_hole_cards() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(11),
    )
    .unwrap();
    game.add_player(1, "p1", 200).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.start_hand().unwrap();
    let own = game.view_for(Some(1));
    let other = game.view_for(Some(2));
    let spectator = game.view_for(None);
    let cards = |view: &omnipoker::game::GameStateView, id: u64| {
        view.seat(id).unwrap().subsets["default"]
            .iter()
            .map(|c| c.card)
            .collect::<Vec<_>>()
    };
    assert!(cards(&own, 1).iter().all(|c| c.is_some()));
    assert!(cards(&other, 1).iter().all(|c| c.is_none()));
    assert!(cards(&spectator, 1).iter().all(|c| c.is_none()));
    assert!(cards(&other, 2).iter().all(|c| c.is_some()));
}

#[test]
fn chip_conservation_across_a_full_hand() {
    let rules = variants::texas_holdem();
    let mut game = Game::new(
        rules,
        Structure::NoLimit,
        Stakes::blinds(1, 2),
        100..=500,
        rng(12),
    )
    .unwrap();
    game.add_player(1, "p1", 150).unwrap();
    game.add_player(2, "p2", 200).unwrap();
    game.add_player(3, "p3", 250).unwrap();
    game.start_hand().unwrap();
    let total = |game: &Game| {
        game.table().occupied().map(|s| s.stack).sum::<i64>() + game.pot_total()
    };
    assert_eq!(total(&game), 600);
    act(&mut game, 1, PlayerAction::Bet { to: 10 });
    assert_eq!(total(&game), 600);
    act(&mut game, 2, PlayerAction::Call);
    act(&mut game, 3, PlayerAction::Call);
    assert_eq!(total(&game), 600);
    for _ in 0..3 {
        act(&mut game, 2, PlayerAction::Check);
        act(&mut game, 3, PlayerAction::Check);
        act(&mut game, 1, PlayerAction::Check);
    }
    assert_eq!(game.state(), GameState::Complete);
    assert_eq!(game.table().occupied().map(|s| s.stack).sum::<i64>(), 600);
}
