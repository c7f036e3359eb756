//! Card identity and action targets.
//!
//! Every card copy that exists in a match has a unique `EntityId`, allocated
//! by `MatchState` when the copy is created. Players are not entities; they
//! are addressed by `PlayerId`. Actions that may hit either a player or a
//! card take a `Target`.
//!
//! ## Usage
//!
//! ```
//! use amber_engine::core::{EntityId, PlayerId, Target};
//!
//! let card = Target::Card(EntityId(7));
//! assert_eq!(card.card(), Some(EntityId(7)));
//! assert_eq!(card.player(), None);
//!
//! let player = Target::Player(PlayerId::SECOND);
//! assert_eq!(player.player(), Some(PlayerId::SECOND));
//! ```

use serde::{Deserialize, Serialize};

use super::player::PlayerId;

/// Unique identifier for a card instance within one match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EntityId(pub u32);

impl EntityId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Card#{}", self.0)
    }
}

/// The thing a game action is aimed at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Target {
    /// A participant (resource pools, hand, deck).
    Player(PlayerId),
    /// A card instance, wherever it currently sits.
    Card(EntityId),
}

impl Target {
    /// The targeted card, if this is a card target.
    #[must_use]
    pub const fn card(self) -> Option<EntityId> {
        match self {
            Self::Card(id) => Some(id),
            Self::Player(_) => None,
        }
    }

    /// The targeted player, if this is a player target.
    #[must_use]
    pub const fn player(self) -> Option<PlayerId> {
        match self {
            Self::Player(id) => Some(id),
            Self::Card(_) => None,
        }
    }
}

impl std::fmt::Display for Target {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(p) => write!(f, "{p}"),
            Self::Card(c) => write!(f, "{c}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_display() {
        assert_eq!(format!("{}", EntityId(12)), "Card#12");
        assert_eq!(EntityId(12).raw(), 12);
    }

    #[test]
    fn test_target_accessors() {
        let card = Target::Card(EntityId(3));
        assert_eq!(card.card(), Some(EntityId(3)));
        assert!(card.player().is_none());

        let player = Target::Player(PlayerId::FIRST);
        assert_eq!(player.player(), Some(PlayerId::FIRST));
        assert!(player.card().is_none());
    }

    #[test]
    fn test_entity_ordering() {
        let mut ids = vec![EntityId(5), EntityId(1), EntityId(3)];
        ids.sort();
        assert_eq!(ids, vec![EntityId(1), EntityId(3), EntityId(5)]);
    }
}
