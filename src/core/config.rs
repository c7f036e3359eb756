//! Match configuration types.
//!
//! A match is configured once at startup:
//! - `Zone` / `ZoneKey`: where a card can be (every player owns one of each zone)
//! - `PhaseKind`: the phases a round walks through
//! - `MatchConfig`: numeric rules (hand size, key cost) plus seed and limits
//!
//! `MatchConfig` derives serde so a host can load it from JSON as well as
//! build it in code.

use serde::{Deserialize, Serialize};

use super::PlayerId;
use crate::error::EngineError;

/// A kind of zone. Each player owns one zone of every kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Zone {
    /// Draw pile. The top card is the last one in order.
    Deck,
    /// Cards available to play.
    Hand,
    /// Cards in play, in the order they entered.
    PlayArea,
    /// Destroyed, discarded and spent cards.
    Discard,
}

impl Zone {
    /// Every zone kind.
    pub const ALL: [Zone; 4] = [Zone::Deck, Zone::Hand, Zone::PlayArea, Zone::Discard];

    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Hand => "hand",
            Self::PlayArea => "play area",
            Self::Discard => "discard",
        }
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A concrete zone: a zone kind plus the player it belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneKey {
    /// Player who owns the zone.
    pub owner: PlayerId,
    /// Which zone.
    pub zone: Zone,
}

impl ZoneKey {
    /// Create a zone key.
    #[must_use]
    pub const fn new(owner: PlayerId, zone: Zone) -> Self {
        Self { owner, zone }
    }
}

impl std::fmt::Display for ZoneKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}'s {}", self.owner, self.zone)
    }
}

/// The phases of a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PhaseKind {
    /// Forge a key if the active player can afford one.
    Key,
    /// The active player plays cards until they end their turn.
    Main,
    /// Refill the hand, then end the round.
    Draw,
}

impl PhaseKind {
    /// Human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Key => "key",
            Self::Main => "main",
            Self::Draw => "draw",
        }
    }
}

impl std::fmt::Display for PhaseKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Complete match configuration.
///
/// ```
/// use amber_engine::core::{MatchConfig, PhaseKind, PlayerId};
///
/// let config = MatchConfig::default()
///     .with_seed(99)
///     .with_first_player(PlayerId::SECOND)
///     .with_phases(vec![PhaseKind::Main, PhaseKind::Draw]);
///
/// assert!(config.validate().is_ok());
/// assert_eq!(config.hand_size, 6);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    /// Target hand size for refills and opening hands.
    pub hand_size: usize,

    /// Amber spent to forge one key.
    pub key_cost: u32,

    /// Keys needed to win.
    pub keys_to_win: u32,

    /// Player who takes the first turn.
    pub first_player: PlayerId,

    /// Seed for deck shuffling.
    pub seed: u64,

    /// Shuffle decks at setup.
    pub shuffle_decks: bool,

    /// Draw opening hands at setup for players whose hand is empty.
    pub opening_hands: bool,

    /// Phase order for every round.
    pub phases: Vec<PhaseKind>,

    /// Maximum number of nested resolution frames before the engine aborts.
    pub max_resolution_depth: usize,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            hand_size: 6,
            key_cost: 6,
            keys_to_win: 3,
            first_player: PlayerId::FIRST,
            seed: 0,
            shuffle_decks: true,
            opening_hands: true,
            phases: vec![PhaseKind::Key, PhaseKind::Main, PhaseKind::Draw],
            max_resolution_depth: 64,
        }
    }
}

impl MatchConfig {
    /// Set the refill hand size.
    #[must_use]
    pub fn with_hand_size(mut self, hand_size: usize) -> Self {
        self.hand_size = hand_size;
        self
    }

    /// Set the key cost.
    #[must_use]
    pub fn with_key_cost(mut self, key_cost: u32) -> Self {
        self.key_cost = key_cost;
        self
    }

    /// Set the number of keys needed to win.
    #[must_use]
    pub fn with_keys_to_win(mut self, keys: u32) -> Self {
        self.keys_to_win = keys;
        self
    }

    /// Set the first player.
    #[must_use]
    pub fn with_first_player(mut self, player: PlayerId) -> Self {
        self.first_player = player;
        self
    }

    /// Set the shuffle seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Enable or disable the setup shuffle.
    #[must_use]
    pub fn with_shuffle(mut self, shuffle: bool) -> Self {
        self.shuffle_decks = shuffle;
        self
    }

    /// Enable or disable opening hands.
    #[must_use]
    pub fn with_opening_hands(mut self, draw: bool) -> Self {
        self.opening_hands = draw;
        self
    }

    /// Set the per-round phase order.
    #[must_use]
    pub fn with_phases(mut self, phases: Vec<PhaseKind>) -> Self {
        self.phases = phases;
        self
    }

    /// Set the nested resolution limit.
    #[must_use]
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// Reject configurations the engine cannot run.
    pub fn validate(&self) -> Result<(), EngineError> {
        if self.phases.is_empty() {
            return Err(EngineError::InvalidConfig("a round needs at least one phase"));
        }
        if self.keys_to_win == 0 {
            return Err(EngineError::InvalidConfig("keys_to_win must be positive"));
        }
        if self.hand_size == 0 {
            return Err(EngineError::InvalidConfig("hand_size must be positive"));
        }
        if self.max_resolution_depth == 0 {
            return Err(EngineError::InvalidConfig("max_resolution_depth must be positive"));
        }
        Ok(())
    }
}
