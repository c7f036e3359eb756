//! Serializable match snapshots for reconnect and replay.
//!
//! A snapshot captures the state a persistence collaborator needs to show
//! or restore a match: turn bookkeeping, players, card instances, zone
//! contents, RNG position and the result. The engine never reads one back;
//! the frame stack and pending prompts are transient and not included.

use serde::{Deserialize, Serialize};

use super::config::{PhaseKind, ZoneKey};
use super::entity::EntityId;
use super::player::{Player, PlayerId};
use super::rng::GameRngState;
use super::state::MatchState;
use crate::cards::CardInstance;
use crate::error::EngineError;
use crate::rules::GameResult;

/// Point-in-time copy of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    pub round: u32,
    pub active_player: PlayerId,
    pub phase: Option<PhaseKind>,
    pub players: Vec<Player>,
    /// Card instances, ordered by entity id.
    pub cards: Vec<CardInstance>,
    /// Non-empty zones with their ordered contents.
    pub zones: Vec<(ZoneKey, Vec<EntityId>)>,
    pub rng: GameRngState,
    pub result: Option<GameResult>,
}

impl MatchSnapshot {
    /// Capture the current state.
    #[must_use]
    pub fn capture(state: &MatchState, result: Option<GameResult>) -> Self {
        Self {
            round: state.round(),
            active_player: state.active_player(),
            phase: state.phase(),
            players: state.players().iter().map(|(_, p)| p.clone()).collect(),
            cards: state.cards().into_iter().cloned().collect(),
            zones: state.zones().zones(),
            rng: state.rng().state(),
            result,
        }
    }

    /// Encode with bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, EngineError> {
        bincode::serialize(self).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Decode a bincode snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngineError> {
        bincode::deserialize(bytes).map_err(|e| EngineError::Snapshot(e.to_string()))
    }

    /// Instance by entity id.
    #[must_use]
    pub fn card(&self, entity: EntityId) -> Option<&CardInstance> {
        self.cards.iter().find(|c| c.entity_id == entity)
    }
}
