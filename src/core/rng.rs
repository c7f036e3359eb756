//! Deterministic random number generation for deck handling.
//!
//! The only randomness in a match is deck order: the initial shuffle and the
//! reshuffle of a discard pile into an empty deck. Both draw from one
//! ChaCha8 stream seeded from `MatchConfig::seed`, so a given seed and the
//! same sequence of decisions always replays identically.
//!
//! ```
//! use amber_engine::core::GameRng;
//!
//! let mut a = GameRng::new(7);
//! let mut b = GameRng::new(7);
//! let mut left: Vec<u32> = (0..30).collect();
//! let mut right = left.clone();
//! a.shuffle(&mut left);
//! b.shuffle(&mut right);
//! assert_eq!(left, right);
//! ```

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Seeded shuffler owned by the match state.
#[derive(Clone, Debug)]
pub struct GameRng {
    inner: ChaCha8Rng,
    seed: u64,
}

impl GameRng {
    /// Create a new RNG with the given seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self {
            inner: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }

    /// The seed this stream started from.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Shuffle a slice in place.
    pub fn shuffle<T>(&mut self, slice: &mut [T]) {
        slice.shuffle(&mut self.inner);
    }

    /// Get the current state for serialization.
    #[must_use]
    pub fn state(&self) -> GameRngState {
        GameRngState {
            seed: self.seed,
            word_pos: self.inner.get_word_pos(),
        }
    }

    /// Restore from a saved state.
    #[must_use]
    pub fn from_state(state: &GameRngState) -> Self {
        let mut inner = ChaCha8Rng::seed_from_u64(state.seed);
        inner.set_word_pos(state.word_pos);
        Self {
            inner,
            seed: state.seed,
        }
    }
}

/// Serializable RNG state carried by match snapshots.
///
/// The ChaCha8 word position restores the stream in O(1) regardless of how
/// many shuffles have happened.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameRngState {
    /// Original seed.
    pub seed: u64,
    /// ChaCha8 word position (128-bit counter).
    pub word_pos: u128,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn deck() -> Vec<u32> {
        (0..36).collect()
    }

    #[test]
    fn test_determinism() {
        let mut rng1 = GameRng::new(42);
        let mut rng2 = GameRng::new(42);
        let mut d1 = deck();
        let mut d2 = deck();

        rng1.shuffle(&mut d1);
        rng2.shuffle(&mut d2);

        assert_eq!(d1, d2);
    }

    #[test]
    fn test_different_seeds() {
        let mut d1 = deck();
        let mut d2 = deck();

        GameRng::new(1).shuffle(&mut d1);
        GameRng::new(2).shuffle(&mut d2);

        assert_ne!(d1, d2);
    }

    #[test]
    fn test_shuffle_keeps_elements() {
        let mut rng = GameRng::new(42);
        let mut data = deck();

        rng.shuffle(&mut data);

        assert_ne!(data, deck());
        data.sort_unstable();
        assert_eq!(data, deck());
    }

    #[test]
    fn test_state_round_trip_continues_stream() {
        let mut rng = GameRng::new(42);
        let mut warmup = deck();
        rng.shuffle(&mut warmup);

        let saved = rng.state();

        let mut expected = deck();
        rng.shuffle(&mut expected);

        let mut restored = GameRng::from_state(&saved);
        let mut actual = deck();
        restored.shuffle(&mut actual);

        assert_eq!(expected, actual);
        assert_eq!(restored.seed(), 42);
    }
}
