//! # amber-engine
//!
//! A deterministic match engine for a two-player card game.
//!
//! ## Design Principles
//!
//! 1. **Abilities are data**: cards declare abilities as `AbilityDeclaration`
//!    records (trigger, target spec, action, `then` continuation) which one
//!    resolver interprets. Card-specific logic is limited to predicates,
//!    parameters and message templates.
//!
//! 2. **Causality is explicit**: every event is a node in an `EventLog`
//!    arena, linked to the event that was in flight when it was raised, and
//!    flagged resolved only after its children and reactions finished.
//!
//! 3. **Resumable resolution**: the resolver is an explicit frame stack,
//!    so the engine can park on a player decision at any nesting depth.
//!
//! ## Architecture
//!
//! ```text
//! Match::advance ─▶ Pipeline (phases, FIFO steps)
//!                     │
//!                     ▼
//!                 Game::raise ─▶ frame stack ─▶ GameAction::apply
//!                                   ▲                  │
//!                                   │                  ▼
//!                         ability frames ◀── EventBus dispatch
//! ```
//!
//! ## Modules
//!
//! - `core`: Entity ids, players, match state, RNG, configuration, snapshots
//! - `zones`: Ordered per-player zones
//! - `cards`: Card definitions, instances, enhancements and the catalog
//! - `effects`: Game actions, targeting and ability declarations
//! - `triggers`: Events, the event log and the event bus
//! - `stack`: The resolution frame stack
//! - `rules`: Win conditions
//! - `pipeline`: Phases and steps
//! - `game`: The engine context, orchestrator, decisions and game log
//!
//! ## Example
//!
//! ```
//! use amber_engine::cards::{CardDefinition, CardRegistry, CardType};
//! use amber_engine::core::{MatchConfig, PhaseKind, PlayerId};
//! use amber_engine::effects::{AbilityDeclaration, Effect, GameAction};
//! use amber_engine::game::{Choice, MatchBuilder, Progress};
//!
//! let catalog = CardRegistry::new().with_cards([CardDefinition::new("spark", "Spark", CardType::Action)
//!     .with_ability(AbilityDeclaration::play(
//!         "spark",
//!         Effect::new(GameAction::GainAmber { amount: 2 }),
//!     ))]);
//!
//! let mut game = MatchBuilder::new()
//!     .with_config(MatchConfig::default().with_opening_hands(false))
//!     .with_hand(PlayerId::FIRST, ["spark"])
//!     .with_scripted_phases(vec![PhaseKind::Main])
//!     .build(&catalog)
//!     .unwrap();
//!
//! assert_eq!(game.advance_until_input().unwrap(), Progress::WaitingForInput(PlayerId::FIRST));
//! let spark = game.state().cards_in(PlayerId::FIRST, amber_engine::core::Zone::Hand)[0];
//! game.submit_decision(PlayerId::FIRST, Choice::Play(spark)).unwrap();
//! game.advance_until_input().unwrap();
//!
//! assert_eq!(game.state().player(PlayerId::FIRST).amber, 2);
//! ```

pub mod core;
pub mod zones;
pub mod cards;
pub mod effects;
pub mod triggers;
pub mod stack;
pub mod rules;
pub mod pipeline;
pub mod game;
pub mod error;

// Re-export commonly used types
pub use crate::core::{
    EntityId, GameRng, MatchConfig, MatchSnapshot, MatchState, PhaseKind, Player, PlayerId,
    PlayerPair, PlayerRelation, Target, Zone, ZoneKey,
};

pub use crate::zones::{ZoneManager, ZonePosition};

pub use crate::cards::{
    CachedCatalog, CardCatalog, CardDefinition, CardId, CardInstance, CardRegistry, CardSource,
    CardType, EnhancementKind, Keyword, Token,
};

pub use crate::effects::{
    AbilityDeclaration, Effect, GameAction, MessageRef, TargetFilter, TargetSelector, TargetSpec,
    ThenClause, ThenContext,
};

pub use crate::triggers::{
    EventBus, EventId, EventKind, EventLog, EventOutcome, GameEvent, ResolvedEvent,
    TriggerCondition,
};

pub use crate::stack::{ResolutionOutcome, ResolutionRecord};

pub use crate::rules::{GameResult, KeysForged, VictoryCondition};

pub use crate::pipeline::{Pipeline, Step};

pub use crate::game::{
    Choice, DecisionMaker, DecisionRequest, Game, GameMessage, Match, MatchBuilder, Progress,
    PromptKind,
};

pub use crate::error::{EngineError, ErrorSeverity};
