//! Win conditions.
//!
//! The match checks its `VictoryCondition` after every event resolves. The
//! first `Some` ends the match: the pipeline is torn down and no further
//! step runs.

use serde::{Deserialize, Serialize};

use crate::core::{MatchConfig, MatchState, PlayerId};

/// Result of a completed match.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Winner(PlayerId),
}

impl GameResult {
    /// Check if a player won.
    #[must_use]
    pub fn is_winner(&self, player: PlayerId) -> bool {
        match self {
            GameResult::Winner(p) => *p == player,
        }
    }
}

/// A terminal check over match state.
pub trait VictoryCondition: Send + Sync {
    /// Returns `Some(result)` once the match is decided.
    fn check(&self, state: &MatchState, config: &MatchConfig) -> Option<GameResult>;
}

/// The first player to hold `keys_to_win` keys wins. The active player is
/// checked first.
#[derive(Clone, Copy, Debug, Default)]
pub struct KeysForged;

impl VictoryCondition for KeysForged {
    fn check(&self, state: &MatchState, config: &MatchConfig) -> Option<GameResult> {
        let active = state.active_player();
        [active, active.opponent()]
            .into_iter()
            .find(|&p| state.player(p).keys >= config.keys_to_win)
            .map(GameResult::Winner)
    }
}

impl<F> VictoryCondition for F
where
    F: Fn(&MatchState, &MatchConfig) -> Option<GameResult> + Send + Sync,
{
    fn check(&self, state: &MatchState, config: &MatchConfig) -> Option<GameResult> {
        self(state, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_result_is_winner() {
        let result = GameResult::Winner(PlayerId::SECOND);
        assert!(result.is_winner(PlayerId::SECOND));
        assert!(!result.is_winner(PlayerId::FIRST));
    }

    #[test]
    fn test_keys_forged() {
        let config = MatchConfig::default().with_keys_to_win(2);
        let mut state = MatchState::new(PlayerId::FIRST, 0);
        assert_eq!(KeysForged.check(&state, &config), None);

        state.player_mut(PlayerId::SECOND).keys = 2;
        assert_eq!(
            KeysForged.check(&state, &config),
            Some(GameResult::Winner(PlayerId::SECOND))
        );
    }

    #[test]
    fn test_closure_condition() {
        let never = |_: &MatchState, _: &MatchConfig| -> Option<GameResult> { None };
        let state = MatchState::new(PlayerId::FIRST, 0);
        assert_eq!(never.check(&state, &MatchConfig::default()), None);
    }
}
