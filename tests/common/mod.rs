//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use amber_engine::cards::{CardDefinition, CardId, CardRegistry, CardType, Keyword};
use amber_engine::core::{EntityId, MatchConfig, PhaseKind, PlayerId, PlayerRelation, Zone};
use amber_engine::effects::{AbilityDeclaration, Effect, GameAction, MessageRef, TargetSpec, ThenClause};
use amber_engine::game::{Choice, Match, MatchBuilder, Progress};
use amber_engine::triggers::{EventKind, TriggerCondition};

/// Template logged when Relentless Whispers steals.
pub const WHISPERS_STEAL: &str = "{0} uses {1} to steal 1 amber from {3}";

/// Route engine traces to the test writer. `RUST_LOG=amber_engine=trace`
/// shows every frame transition of a failing test.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_test_writer()
        .try_init();
}

/// Every card the integration tests use.
pub fn catalog() -> CardRegistry {
    init_tracing();
    CardRegistry::new().with_cards([
        // Creatures
        CardDefinition::new("pixie", "Pixie", CardType::Creature).with_power(2),
        CardDefinition::new("ogre", "Ogre", CardType::Creature).with_power(3),
        CardDefinition::new("troll", "Troll", CardType::Creature).with_power(8),
        CardDefinition::new("rover", "Rover", CardType::Creature)
            .with_power(1)
            .playable_as_upgrade()
            .grants_keyword(Keyword::Skirmish, 1),
        CardDefinition::new("vulture", "Vulture", CardType::Creature)
            .with_power(4)
            .with_ability(AbilityDeclaration::reaction(
                "vulture",
                EventKind::CardDestroyed,
                TriggerCondition::Always,
                Effect::new(GameAction::GainAmber { amount: 1 }),
            )),
        CardDefinition::new("herald", "Herald", CardType::Creature)
            .with_power(2)
            .with_ability(AbilityDeclaration::reaction(
                "herald",
                EventKind::CardPlayed,
                TriggerCondition::ForPlayer(PlayerRelation::Controller),
                Effect::new(GameAction::GainAmber { amount: 1 }),
            )),
        CardDefinition::new("echo", "Echo", CardType::Creature)
            .with_power(1)
            .with_ability(AbilityDeclaration::reaction(
                "echo",
                EventKind::AmberGained,
                TriggerCondition::ForPlayer(PlayerRelation::Controller),
                Effect::new(GameAction::GainAmber { amount: 1 }),
            )),
        CardDefinition::new("witness", "Witness", CardType::Creature)
            .with_power(2)
            .with_ability(AbilityDeclaration::reaction(
                "witness",
                EventKind::AmberGained,
                TriggerCondition::ForPlayer(PlayerRelation::Opponent),
                Effect::new(GameAction::GainAmber { amount: 1 }),
            )),
        CardDefinition::new("auditor", "Auditor", CardType::Creature)
            .with_power(2)
            .with_ability(AbilityDeclaration::reaction(
                "auditor",
                EventKind::AmberGained,
                TriggerCondition::ForPlayer(PlayerRelation::Opponent).and(TriggerCondition::Applied),
                Effect::new(GameAction::GainAmber { amount: 1 }),
            )),
        // Upgrades
        CardDefinition::new("armor", "Armor", CardType::Upgrade)
            .grants_power(2)
            .grants_keyword(Keyword::Taunt, 1),
        // Actions
        CardDefinition::new("whispers", "Relentless Whispers", CardType::Action).with_ability(
            AbilityDeclaration::play(
                "relentless whispers",
                Effect::new(GameAction::DealDamage { amount: 2 })
                    .with_target(TargetSpec::enemy_creature())
                    .then(
                        ThenClause::new(Effect::new(GameAction::Steal { amount: 1 }))
                            .when(|ctx| {
                                ctx.pre_then_event
                                    .destroy_event()
                                    .is_some_and(|destroy| destroy.destroyed_by_damage_dealt())
                            })
                            .with_message(WHISPERS_STEAL, [MessageRef::Opponent]),
                    ),
            ),
        ),
        CardDefinition::new("spark", "Spark", CardType::Action).with_ability(AbilityDeclaration::play(
            "spark",
            Effect::new(GameAction::GainAmber { amount: 2 }),
        )),
        CardDefinition::new("poke", "Poke", CardType::Action).with_ability(AbilityDeclaration::play(
            "poke",
            Effect::new(GameAction::DealDamage { amount: 1 }),
        )),
        CardDefinition::new("snipe", "Snipe", CardType::Action).with_ability(AbilityDeclaration::play(
            "snipe",
            Effect::new(GameAction::DealDamage { amount: 3 }).with_target(TargetSpec::creature().optional()),
        )),
        CardDefinition::new("ponder", "Ponder", CardType::Action).with_ability(
            AbilityDeclaration::play("ponder", Effect::new(GameAction::Draw { count: 1 })).optional(),
        ),
        CardDefinition::new("hoard", "Hoard", CardType::Action).with_ability(AbilityDeclaration::play(
            "hoard",
            Effect::new(GameAction::Capture { amount: 2 }),
        )),
        CardDefinition::new("purge", "Purge", CardType::Action).with_ability(AbilityDeclaration::play(
            "purge",
            Effect::new(GameAction::Destroy).with_target(TargetSpec::creature()),
        )),
        CardDefinition::new("release", "Release", CardType::Action).with_ability(AbilityDeclaration::play(
            "release",
            Effect::new(GameAction::Detach).with_target(TargetSpec::card()),
        )),
    ])
}

/// Unshuffled, no opening hands, a single scripted Main phase.
pub fn builder() -> MatchBuilder {
    MatchBuilder::new()
        .with_config(config())
        .with_scripted_phases(vec![PhaseKind::Main])
}

pub fn config() -> MatchConfig {
    MatchConfig::default()
        .with_shuffle(false)
        .with_opening_hands(false)
}

/// Build and advance to the first main-phase prompt.
pub fn start(builder: MatchBuilder) -> Match {
    let mut game = builder.build(&catalog()).expect("match builds");
    assert_eq!(
        game.advance_until_input().expect("advance"),
        Progress::WaitingForInput(PlayerId::FIRST)
    );
    game
}

pub fn find(game: &Match, owner: PlayerId, zone: Zone, card: &str) -> EntityId {
    game.state()
        .find(owner, zone, &CardId::new(card))
        .unwrap_or_else(|| panic!("{card} not in {owner}'s {zone:?}"))
}

/// Submit a choice and run until the next prompt.
pub fn answer(game: &mut Match, player: PlayerId, choice: Choice) -> Progress {
    game.submit_decision(player, choice).expect("choice accepted");
    game.advance_until_input().expect("advance")
}

/// Play a card from `player`'s hand.
pub fn play(game: &mut Match, player: PlayerId, card: &str) -> Progress {
    let entity = find(game, player, Zone::Hand, card);
    answer(game, player, Choice::Play(entity))
}
