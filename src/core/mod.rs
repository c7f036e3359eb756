//! Core engine types: entities, players, state, RNG, configuration.
//!
//! Everything else in the crate builds on these. `MatchState` is the only
//! mutable game data; the other types are small value types.

pub mod entity;
pub mod player;
pub mod rng;
pub mod config;
pub mod state;
pub mod snapshot;

pub use entity::{EntityId, Target};
pub use player::{Player, PlayerId, PlayerPair, PlayerRelation};
pub use rng::{GameRng, GameRngState};
pub use config::{MatchConfig, PhaseKind, Zone, ZoneKey};
pub use state::MatchState;
pub use snapshot::MatchSnapshot;
