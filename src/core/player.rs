//! Player identification and per-player data storage.
//!
//! ## PlayerId
//!
//! A match is always played between exactly two participants, so a
//! `PlayerId` is either `FIRST` or `SECOND` and every player has exactly
//! one opponent.
//!
//! ## PlayerPair
//!
//! Per-player storage backed by a fixed array, indexable by `PlayerId`.
//!
//! ## Player
//!
//! The mutable participant record: resource pool (amber), forged keys and
//! turn flags. Zones are tracked by the `ZoneManager`, keyed by owner.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};

/// Identifier for one of the two participants.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(u8);

impl PlayerId {
    /// The player seated first.
    pub const FIRST: Self = Self(0);
    /// The player seated second.
    pub const SECOND: Self = Self(1);

    /// Get the raw player index (0 or 1).
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }

    /// The other participant.
    #[must_use]
    pub const fn opponent(self) -> Self {
        Self(1 - self.0)
    }

    /// Both players in seating order.
    ///
    /// ```
    /// use amber_engine::core::PlayerId;
    ///
    /// let seats: Vec<_> = PlayerId::both().collect();
    /// assert_eq!(seats, vec![PlayerId::FIRST, PlayerId::SECOND]);
    /// ```
    pub fn both() -> impl Iterator<Item = PlayerId> {
        [Self::FIRST, Self::SECOND].into_iter()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Player {}", self.0 + 1)
    }
}

/// How a player stands relative to the one acting.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerRelation {
    Controller,
    Opponent,
    Either,
}

impl PlayerRelation {
    /// Does `other` stand in this relation to `me`?
    #[must_use]
    pub fn matches(self, me: PlayerId, other: PlayerId) -> bool {
        match self {
            Self::Controller => me == other,
            Self::Opponent => me != other,
            Self::Either => true,
        }
    }

    /// Players in this relation to `me`, `me` first.
    pub fn players(self, me: PlayerId) -> impl Iterator<Item = PlayerId> {
        [me, me.opponent()]
            .into_iter()
            .filter(move |&p| self.matches(me, p))
    }
}

/// One value per player.
///
/// ```
/// use amber_engine::core::{PlayerId, PlayerPair};
///
/// let mut amber = PlayerPair::with_value(0u32);
/// amber[PlayerId::SECOND] = 3;
/// assert_eq!(amber[PlayerId::FIRST], 0);
/// assert_eq!(amber[PlayerId::SECOND], 3);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PlayerPair<T> {
    data: [T; 2],
}

impl<T> PlayerPair<T> {
    /// Build a pair from a factory receiving each seat.
    pub fn new(mut factory: impl FnMut(PlayerId) -> T) -> Self {
        Self {
            data: [factory(PlayerId::FIRST), factory(PlayerId::SECOND)],
        }
    }

    /// Build a pair with the same value in both seats.
    pub fn with_value(value: T) -> Self
    where
        T: Clone,
    {
        Self {
            data: [value.clone(), value],
        }
    }

    /// Get a player's entry.
    #[must_use]
    pub fn get(&self, player: PlayerId) -> &T {
        &self.data[player.index()]
    }

    /// Get a mutable reference to a player's entry.
    pub fn get_mut(&mut self, player: PlayerId) -> &mut T {
        &mut self.data[player.index()]
    }

    /// Iterate over `(PlayerId, &T)` in seating order.
    pub fn iter(&self) -> impl Iterator<Item = (PlayerId, &T)> {
        PlayerId::both().zip(self.data.iter())
    }

    /// Map both entries into a new pair.
    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> PlayerPair<U> {
        PlayerPair {
            data: [f(&self.data[0]), f(&self.data[1])],
        }
    }
}

impl<T> Index<PlayerId> for PlayerPair<T> {
    type Output = T;

    fn index(&self, player: PlayerId) -> &Self::Output {
        self.get(player)
    }
}

impl<T> IndexMut<PlayerId> for PlayerPair<T> {
    fn index_mut(&mut self, player: PlayerId) -> &mut Self::Output {
        self.get_mut(player)
    }
}

/// Mutable participant state for the lifetime of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Which seat this is.
    pub id: PlayerId,
    /// Spendable resource pool.
    pub amber: u32,
    /// Keys forged so far.
    pub keys: u32,
    /// Cards played since this player's turn began.
    pub cards_played_this_turn: u32,
    /// Set once this player has forged a key in the current turn.
    pub forged_this_turn: bool,
}

impl Player {
    /// A fresh participant with empty pools.
    #[must_use]
    pub const fn new(id: PlayerId) -> Self {
        Self {
            id,
            amber: 0,
            keys: 0,
            cards_played_this_turn: 0,
            forged_this_turn: false,
        }
    }

    /// Clear the per-turn flags.
    pub fn reset_turn_flags(&mut self) {
        self.cards_played_this_turn = 0;
        self.forged_this_turn = false;
    }
}
