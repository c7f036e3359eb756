//! Event bus tests: causal nesting, resolution order, subscriber snapshots
//! and the game log.

mod common;

use std::sync::{Arc, Mutex};

use amber_engine::cards::Token;
use amber_engine::core::{PlayerId, Target, Zone};
use amber_engine::effects::{AbilityDeclaration, Effect, GameAction};
use amber_engine::game::{Choice, GameMessage, MatchBuilder, MessageArg, Progress};
use amber_engine::triggers::{EventKind, EventOutcome};

use common::{answer, builder, catalog, config, find, play, start};

// ============================================================================
// Causality
// ============================================================================

/// Once the stack is empty every event is resolved, and children always
/// come after their parent.
#[test]
fn test_all_events_resolved_and_linked() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"])
            .with_amber(PlayerId::SECOND, 1),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    assert_eq!(game.game().resolution_depth(), 0);
    for record in game.events().iter() {
        assert!(record.resolved, "{} unresolved", record.event.kind);
        if let Some(parent) = record.parent {
            assert!(parent < record.id);
            assert!(game.events().get(parent).unwrap().children.contains(&record.id));
        }
    }

    let played = game.events().last_of(EventKind::CardPlayed).unwrap();
    assert_eq!(played.parent, None);
}

/// Reactions to a nested destroy run before the outer continuation.
#[test]
fn test_reactions_run_before_continuation() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::FIRST, ["vulture"])
            .with_in_play(PlayerId::SECOND, ["pixie"])
            .with_amber(PlayerId::SECOND, 2),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    let destroyed = game.events().last_of(EventKind::CardDestroyed).unwrap();
    let gained = game.events().last_of(EventKind::AmberGained).unwrap();
    let stolen = game.events().last_of(EventKind::AmberStolen).unwrap();

    assert_eq!(gained.parent, Some(destroyed.id));
    assert!(gained.id < stolen.id);
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 2);
}

// ============================================================================
// Subscriptions
// ============================================================================

/// Handlers run for a no-effect event too; only a condition on the
/// outcome keeps a reaction out.
#[test]
fn test_no_effect_event_reaches_subscribers() {
    let mut game = MatchBuilder::new()
        .with_config(config())
        .with_in_play(PlayerId::SECOND, ["witness", "auditor"])
        .with_scripted_phases(Vec::new())
        .build(&catalog())
        .unwrap();
    let witness = find(&game, PlayerId::SECOND, Zone::PlayArea, "witness");
    let gain = |amount| {
        Arc::new(AbilityDeclaration::play(
            "gain",
            Effect::new(GameAction::GainAmber { amount }),
        ))
    };

    game.resolve_ability(gain(0), PlayerId::FIRST, None).unwrap();
    assert_eq!(game.advance_until_input().unwrap(), Progress::Idle);

    let nothing = game.events().iter().next().unwrap();
    assert_eq!(nothing.outcome, EventOutcome::NoEffect);
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 0);
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 1);
    let reaction = game.events().last_of(EventKind::AmberGained).unwrap();
    assert_eq!(reaction.parent, Some(nothing.id));
    assert_eq!(reaction.event.source, Some(witness));

    game.resolve_ability(gain(2), PlayerId::FIRST, None).unwrap();
    assert_eq!(game.advance_until_input().unwrap(), Progress::Idle);

    assert_eq!(game.state().player(PlayerId::FIRST).amber, 2);
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 3);
}

/// A card leaving play stops reacting, even to its own destruction.
#[test]
fn test_leaving_play_unsubscribes() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["purge"])
            .with_in_play(PlayerId::SECOND, ["vulture"]),
    );
    let vulture = find(&game, PlayerId::SECOND, Zone::PlayArea, "vulture");
    assert_eq!(game.game().bus().for_source(vulture).count(), 1);

    play(&mut game, PlayerId::FIRST, "purge");

    assert!(game.state().cards_in(PlayerId::SECOND, Zone::Discard).contains(&vulture));
    assert_eq!(game.game().bus().for_source(vulture).count(), 0);
    assert!(game.events().last_of(EventKind::AmberGained).is_none());
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 0);
}

/// A surviving watcher still reacts to another card's destruction.
#[test]
fn test_other_watcher_reacts() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["purge"])
            .with_in_play(PlayerId::SECOND, ["vulture", "vulture"]),
    );
    let victims = game.state().cards_in(PlayerId::SECOND, Zone::PlayArea).to_vec();

    play(&mut game, PlayerId::FIRST, "purge");
    answer(&mut game, PlayerId::FIRST, Choice::Target(Target::Card(victims[0])));

    assert!(!game.state().in_play(victims[0]));
    assert!(game.state().in_play(victims[1]));
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 1);

    let gained = game.events().last_of(EventKind::AmberGained).unwrap();
    assert_eq!(gained.event.source, Some(victims[1]));
}

/// Handlers are fixed when an event is raised: a card never reacts to its
/// own play, but a copy already in play does.
#[test]
fn test_subscriber_snapshot() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["herald", "herald"])
            .with_in_play(PlayerId::SECOND, ["herald"]),
    );

    play(&mut game, PlayerId::FIRST, "herald");
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 0);

    play(&mut game, PlayerId::FIRST, "herald");
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 1);
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 0);
    assert_eq!(game.events().of_kind(EventKind::AmberGained).count(), 1);
}

/// Captured amber returns to the opponent of the card's controller.
#[test]
fn test_captured_amber_released_on_leave_play() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["hoard", "purge"])
            .with_in_play(PlayerId::FIRST, ["pixie"])
            .with_amber(PlayerId::SECOND, 3),
    );
    let pixie = find(&game, PlayerId::FIRST, Zone::PlayArea, "pixie");

    play(&mut game, PlayerId::FIRST, "hoard");
    assert_eq!(game.state().card(pixie).unwrap().tokens(Token::Amber), 2);
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 1);

    play(&mut game, PlayerId::FIRST, "purge");
    assert_eq!(game.state().card(pixie).unwrap().tokens(Token::Amber), 0);
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 3);
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 0);
}

// ============================================================================
// Game Log
// ============================================================================

/// Every resolved event leaves exactly one `event.*` message.
#[test]
fn test_one_message_per_resolved_event() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"]),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    let resolved = game.events().iter().filter(|r| r.resolved).count();
    let logged = game
        .log()
        .iter()
        .filter(|m| m.template.starts_with("event."))
        .count();
    assert_eq!(logged, resolved);
}

/// Event messages carry player, source, target and amount.
#[test]
fn test_event_message_args() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["ogre"]),
    );
    let whispers = find(&game, PlayerId::FIRST, Zone::Hand, "whispers");
    let ogre = find(&game, PlayerId::SECOND, Zone::PlayArea, "ogre");
    play(&mut game, PlayerId::FIRST, "whispers");

    let message = game.log().with_template("event.damage_dealt").next().unwrap();
    assert_eq!(
        message.args.to_vec(),
        vec![
            MessageArg::Player(PlayerId::FIRST),
            MessageArg::Card {
                entity: whispers,
                name: "Relentless Whispers".into(),
            },
            MessageArg::Card {
                entity: ogre,
                name: "Ogre".into(),
            },
            MessageArg::Amount(2),
        ]
    );
}

/// A sink sees messages in the order they are logged.
#[test]
fn test_message_sink() {
    let seen: Arc<Mutex<Vec<String>>> = Arc::default();
    let sink = Arc::clone(&seen);

    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["spark"])
            .with_sink(move |message: &GameMessage| {
                sink.lock().unwrap().push(message.template.to_string());
            }),
    );
    play(&mut game, PlayerId::FIRST, "spark");

    let seen = seen.lock().unwrap();
    let logged: Vec<String> = game.log().iter().map(|m| m.template.to_string()).collect();
    assert_eq!(*seen, logged);
    assert!(seen.contains(&"event.amber_gained".to_string()));
}

/// Deck lists are bottom to top.
#[test]
fn test_draw_takes_last_listed_card() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["ponder"])
            .with_deck(PlayerId::FIRST, ["ogre", "troll"]),
    );
    play(&mut game, PlayerId::FIRST, "ponder");
    answer(&mut game, PlayerId::FIRST, Choice::Accept);

    let hand = game.state().cards_in(PlayerId::FIRST, Zone::Hand);
    assert_eq!(hand.len(), 1);
    assert_eq!(game.state().card(hand[0]).unwrap().card_id.as_str(), "troll");
}
