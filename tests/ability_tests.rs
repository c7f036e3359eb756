//! Ability resolution tests: targeting, continuations, optional abilities
//! and target prompts.

mod common;

use amber_engine::cards::Token;
use amber_engine::core::{PlayerId, Target, Zone};
use amber_engine::error::EngineError;
use amber_engine::game::{Choice, Progress, PromptKind};
use amber_engine::stack::ResolutionOutcome;
use amber_engine::triggers::{EventKind, EventOutcome};

use common::{answer, builder, find, play, start, WHISPERS_STEAL};

// ============================================================================
// Continuations
// ============================================================================

/// Lethal damage nests a destroy under the damage event, and the steal fires.
#[test]
fn test_whispers_destroys_and_steals() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"])
            .with_amber(PlayerId::SECOND, 3),
    );
    let pixie = find(&game, PlayerId::SECOND, Zone::PlayArea, "pixie");

    assert_eq!(play(&mut game, PlayerId::FIRST, "whispers"), Progress::WaitingForInput(PlayerId::FIRST));

    let state = game.state();
    assert!(state.cards_in(PlayerId::SECOND, Zone::Discard).contains(&pixie));
    assert_eq!(state.player(PlayerId::FIRST).amber, 1);
    assert_eq!(state.player(PlayerId::SECOND).amber, 2);

    let damage = game.events().last_of(EventKind::DamageDealt).unwrap();
    let damage = game.events().resolved(damage.id).unwrap();
    assert_eq!(damage.target(), Some(Target::Card(pixie)));
    assert!(damage.destroy_event().unwrap().destroyed_by_damage_dealt());

    let stolen = game.events().last_of(EventKind::AmberStolen).unwrap();
    assert_eq!(stolen.event.amount, 1);
    assert_eq!(stolen.event.target, Some(Target::Player(PlayerId::SECOND)));

    let record = game.history().last().unwrap();
    assert_eq!(record.ability, "relentless whispers");
    assert!(record.then_fired());
}

/// Both the damage and the steal are children of the play event.
#[test]
fn test_continuation_events_share_the_play_parent() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"])
            .with_amber(PlayerId::SECOND, 1),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    let played = game.events().last_of(EventKind::CardPlayed).unwrap().id;
    let damage = game.events().last_of(EventKind::DamageDealt).unwrap();
    let stolen = game.events().last_of(EventKind::AmberStolen).unwrap();
    assert_eq!(damage.parent, Some(played));
    assert_eq!(stolen.parent, Some(played));

    let destroyed = game.events().last_of(EventKind::CardDestroyed).unwrap();
    assert_eq!(destroyed.parent, Some(damage.id));
}

/// The continuation message names the acting player, the card and the opponent.
#[test]
fn test_continuation_message() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"])
            .with_amber(PlayerId::SECOND, 2),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    let message = game.log().with_template(WHISPERS_STEAL).next().unwrap();
    assert_eq!(message.render(), "Player 1 uses Relentless Whispers to steal 1 amber from Player 2");
}

/// A surviving creature means no destroy and no steal.
#[test]
fn test_whispers_on_survivor_does_not_steal() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["ogre"])
            .with_amber(PlayerId::SECOND, 3),
    );
    let ogre = find(&game, PlayerId::SECOND, Zone::PlayArea, "ogre");

    play(&mut game, PlayerId::FIRST, "whispers");

    let state = game.state();
    assert!(state.in_play(ogre));
    assert_eq!(state.card(ogre).unwrap().tokens(Token::Damage), 2);
    assert_eq!(state.player(PlayerId::SECOND).amber, 3);
    assert_eq!(state.player(PlayerId::FIRST).amber, 0);

    let damage = game.events().last_of(EventKind::DamageDealt).unwrap();
    assert!(game.events().resolved(damage.id).unwrap().destroy_event().is_none());
    assert!(game.events().last_of(EventKind::AmberStolen).is_none());
    assert!(game.events().last_of(EventKind::CardDestroyed).is_none());

    let record = game.history().last().unwrap();
    assert!(!record.then_fired());
    assert!(!record.fizzled());
    assert!(game.log().with_template(WHISPERS_STEAL).next().is_none());
}

/// A steal from an empty pool still resolves, as a no-effect event.
#[test]
fn test_steal_from_empty_pool_has_no_effect() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::SECOND, ["pixie"]),
    );
    play(&mut game, PlayerId::FIRST, "whispers");

    let stolen = game.events().last_of(EventKind::AmberStolen).unwrap();
    assert_eq!(stolen.outcome, EventOutcome::NoEffect);
    assert_eq!(stolen.event.amount, 0);
    assert_eq!(game.state().player(PlayerId::FIRST).amber, 0);
    assert!(game.history().last().unwrap().then_fired());
}

// ============================================================================
// Fizzling
// ============================================================================

/// No enemy creature: the ability fizzles before any damage event.
#[test]
fn test_whispers_without_targets_fizzles() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["whispers"])
            .with_in_play(PlayerId::FIRST, ["pixie"])
            .with_amber(PlayerId::SECOND, 3),
    );
    let whispers = find(&game, PlayerId::FIRST, Zone::Hand, "whispers");

    play(&mut game, PlayerId::FIRST, "whispers");

    assert!(game.events().last_of(EventKind::DamageDealt).is_none());
    assert!(game.events().last_of(EventKind::AmberStolen).is_none());
    assert_eq!(game.state().player(PlayerId::SECOND).amber, 3);
    assert!(game.state().cards_in(PlayerId::FIRST, Zone::Discard).contains(&whispers));

    let record = game.history().last().unwrap();
    assert_eq!(record.outcome, ResolutionOutcome::Fizzled);
    assert_eq!(record.source, Some(whispers));

    let fizzled = game.log().with_template("ability.fizzled").next().unwrap();
    assert_eq!(fizzled.render(), "ability.fizzled");
    assert_eq!(fizzled.args.len(), 3);
}

// ============================================================================
// Optional Abilities
// ============================================================================

/// An optional ability asks its controller before resolving.
#[test]
fn test_optional_ability_accepted() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["ponder"])
            .with_deck(PlayerId::FIRST, ["ogre"]),
    );

    assert_eq!(play(&mut game, PlayerId::FIRST, "ponder"), Progress::WaitingForInput(PlayerId::FIRST));
    let request = game.pending_decision().unwrap();
    assert_eq!(request.kind, PromptKind::ConfirmOptional);
    assert!(request.allow_pass);

    answer(&mut game, PlayerId::FIRST, Choice::Accept);

    assert_eq!(game.state().cards_in(PlayerId::FIRST, Zone::Hand).len(), 1);
    assert!(game.state().cards_in(PlayerId::FIRST, Zone::Deck).is_empty());
    assert!(matches!(
        game.history().last().unwrap().outcome,
        ResolutionOutcome::Resolved { then_fired: false, .. }
    ));
    assert_eq!(game.pending_decision().unwrap().kind, PromptKind::MainAction);
}

/// Declining records the decision and raises nothing.
#[test]
fn test_optional_ability_declined() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["ponder"])
            .with_deck(PlayerId::FIRST, ["ogre"]),
    );
    play(&mut game, PlayerId::FIRST, "ponder");

    answer(&mut game, PlayerId::FIRST, Choice::Pass);

    assert!(game.state().cards_in(PlayerId::FIRST, Zone::Hand).is_empty());
    assert_eq!(game.state().cards_in(PlayerId::FIRST, Zone::Deck).len(), 1);
    assert!(game.events().last_of(EventKind::CardsDrawn).is_none());
    assert_eq!(game.history().last().unwrap().outcome, ResolutionOutcome::Declined);
    assert_eq!(game.log().with_template("ability.declined").count(), 1);
}

// ============================================================================
// Target Prompts
// ============================================================================

/// Several legal targets park the resolution on a prompt.
#[test]
fn test_target_prompt() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["poke"])
            .with_in_play(PlayerId::SECOND, ["ogre", "troll"]),
    );
    let ogre = find(&game, PlayerId::SECOND, Zone::PlayArea, "ogre");
    let troll = find(&game, PlayerId::SECOND, Zone::PlayArea, "troll");

    play(&mut game, PlayerId::FIRST, "poke");

    let request = game.pending_decision().unwrap();
    assert_eq!(request.kind, PromptKind::ChooseTarget);
    assert!(!request.allow_pass);
    assert_eq!(
        request.options,
        vec![Choice::Target(Target::Card(ogre)), Choice::Target(Target::Card(troll))]
    );
    assert!(game.events().last_of(EventKind::DamageDealt).is_none());

    answer(&mut game, PlayerId::FIRST, Choice::Target(Target::Card(troll)));

    assert_eq!(game.state().card(troll).unwrap().tokens(Token::Damage), 1);
    assert_eq!(game.state().card(ogre).unwrap().tokens(Token::Damage), 0);
}

/// Rejected answers keep the prompt open and change nothing.
#[test]
fn test_illegal_target_keeps_prompt() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["poke"])
            .with_in_play(PlayerId::SECOND, ["ogre", "troll"]),
    );
    let ogre = find(&game, PlayerId::SECOND, Zone::PlayArea, "ogre");
    play(&mut game, PlayerId::FIRST, "poke");
    let events = game.events().len();

    let illegal = Choice::Target(Target::Player(PlayerId::SECOND));
    assert!(matches!(
        game.submit_decision(PlayerId::FIRST, illegal),
        Err(EngineError::IllegalChoice { .. })
    ));
    assert!(matches!(
        game.submit_decision(PlayerId::FIRST, Choice::Pass),
        Err(EngineError::IllegalChoice { .. })
    ));
    assert!(matches!(
        game.submit_decision(PlayerId::SECOND, Choice::Target(Target::Card(ogre))),
        Err(EngineError::WrongPlayer { .. })
    ));

    assert!(game.is_waiting_for_input());
    assert_eq!(game.pending_decision().unwrap().kind, PromptKind::ChooseTarget);
    assert_eq!(game.events().len(), events);

    answer(&mut game, PlayerId::FIRST, Choice::Target(Target::Card(ogre)));
    assert_eq!(game.state().card(ogre).unwrap().tokens(Token::Damage), 1);
}

/// Passing an optional target runs the action with no target.
#[test]
fn test_optional_target_pass() {
    let mut game = start(
        builder()
            .with_hand(PlayerId::FIRST, ["snipe"])
            .with_in_play(PlayerId::SECOND, ["ogre", "troll"]),
    );
    play(&mut game, PlayerId::FIRST, "snipe");
    assert!(game.pending_decision().unwrap().allow_pass);

    answer(&mut game, PlayerId::FIRST, Choice::Pass);

    let damage = game.events().last_of(EventKind::DamageDealt).unwrap();
    assert_eq!(damage.event.target, None);
    assert_eq!(damage.outcome, EventOutcome::NoEffect);
    assert!(matches!(
        game.history().last().unwrap().outcome,
        ResolutionOutcome::Resolved { .. }
    ));
}

/// An optional target with nothing to pick resolves without a prompt.
#[test]
fn test_optional_target_without_candidates() {
    let mut game = start(builder().with_hand(PlayerId::FIRST, ["snipe"]));

    assert_eq!(play(&mut game, PlayerId::FIRST, "snipe"), Progress::WaitingForInput(PlayerId::FIRST));

    assert_eq!(game.pending_decision().unwrap().kind, PromptKind::MainAction);
    let damage = game.events().last_of(EventKind::DamageDealt).unwrap();
    assert_eq!(damage.outcome, EventOutcome::NoEffect);
    assert!(!game.history().last().unwrap().fizzled());
}
