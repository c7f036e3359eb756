//! Decision points.
//!
//! When the engine needs a player's input it parks with a
//! `DecisionRequest`: a prompt kind, the legal options and whether "pass"
//! is allowed. The answer comes back through `Match::submit_decision`, which
//! rejects anything not offered and leaves the prompt in place.
//!
//! `DecisionMaker` is the synchronous form of the input collaborator, used
//! by `Match::run` and tests.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, MatchState, PlayerId, Target};

/// What the player is asked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PromptKind {
    /// Pick one of several legal targets.
    ChooseTarget,
    /// Resolve an optional ability or not.
    ConfirmOptional,
    /// Choose the next main-phase action.
    MainAction,
}

/// One answer to a prompt.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Choice {
    Target(Target),
    /// Play a card from hand.
    Play(EntityId),
    /// Play a card from hand attached to a creature.
    PlayUpgrade { card: EntityId, parent: EntityId },
    EndTurn,
    Accept,
    Pass,
}

/// A prompt addressed to one player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub player: PlayerId,
    pub kind: PromptKind,
    pub options: Vec<Choice>,
    pub allow_pass: bool,
}

impl DecisionRequest {
    /// Pick among `targets`.
    #[must_use]
    pub fn choose_target(player: PlayerId, targets: &[Target], allow_pass: bool) -> Self {
        Self {
            player,
            kind: PromptKind::ChooseTarget,
            options: targets.iter().copied().map(Choice::Target).collect(),
            allow_pass,
        }
    }

    /// Yes or pass.
    #[must_use]
    pub fn confirm(player: PlayerId) -> Self {
        Self {
            player,
            kind: PromptKind::ConfirmOptional,
            options: vec![Choice::Accept],
            allow_pass: true,
        }
    }

    #[must_use]
    pub fn main_action(player: PlayerId, options: Vec<Choice>) -> Self {
        Self {
            player,
            kind: PromptKind::MainAction,
            options,
            allow_pass: false,
        }
    }

    /// Is `choice` an acceptable answer?
    #[must_use]
    pub fn allows(&self, choice: &Choice) -> bool {
        self.options.contains(choice) || (self.allow_pass && *choice == Choice::Pass)
    }
}

/// Who is waiting on the answer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DecisionOrigin {
    /// The ability frame on top of the resolution stack.
    Ability,
    /// The pipeline's current gate step.
    Step,
}

/// The prompt the engine is parked on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingDecision {
    pub request: DecisionRequest,
    pub origin: DecisionOrigin,
}

/// A synchronous decision collaborator.
pub trait DecisionMaker {
    fn decide(&mut self, request: &DecisionRequest, state: &MatchState) -> Choice;
}

/// Always takes the first option, or passes when there is none.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstOption;

impl DecisionMaker for FirstOption {
    fn decide(&mut self, request: &DecisionRequest, _state: &MatchState) -> Choice {
        request.options.first().copied().unwrap_or(Choice::Pass)
    }
}

/// Answers from a script, then falls back to `FirstOption`.
#[derive(Clone, Debug, Default)]
pub struct ScriptedDecisions {
    script: VecDeque<Choice>,
}

impl ScriptedDecisions {
    pub fn new(script: impl IntoIterator<Item = Choice>) -> Self {
        Self {
            script: script.into_iter().collect(),
        }
    }

    /// Choices not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

impl DecisionMaker for ScriptedDecisions {
    fn decide(&mut self, request: &DecisionRequest, state: &MatchState) -> Choice {
        self.script
            .pop_front()
            .unwrap_or_else(|| FirstOption.decide(request, state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allows() {
        let request = DecisionRequest::choose_target(
            PlayerId::FIRST,
            &[Target::Card(EntityId(1)), Target::Card(EntityId(2))],
            false,
        );
        assert!(request.allows(&Choice::Target(Target::Card(EntityId(2)))));
        assert!(!request.allows(&Choice::Target(Target::Card(EntityId(3)))));
        assert!(!request.allows(&Choice::Pass));

        let confirm = DecisionRequest::confirm(PlayerId::SECOND);
        assert!(confirm.allows(&Choice::Pass));
        assert!(confirm.allows(&Choice::Accept));
    }

    #[test]
    fn test_scripted_then_first_option() {
        let state = MatchState::new(PlayerId::FIRST, 0);
        let request = DecisionRequest::main_action(PlayerId::FIRST, vec![Choice::EndTurn]);
        let mut maker = ScriptedDecisions::new([Choice::Pass]);

        assert_eq!(maker.decide(&request, &state), Choice::Pass);
        assert_eq!(maker.remaining(), 0);
        assert_eq!(maker.decide(&request, &state), Choice::EndTurn);
    }
}
