//! Phases and their default steps.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::{PhaseKind, PlayerId, Target};
use crate::effects::{ActionContext, GameAction};
use crate::triggers::EventKind;

use super::step::Step;

/// Builds the steps of a phase for the given active player.
pub type StepFactory = Arc<dyn Fn(PlayerId) -> Vec<Step> + Send + Sync>;

/// The active phase: its kind and the steps left, in FIFO order.
#[derive(Debug)]
pub struct Phase {
    pub kind: PhaseKind,
    /// Active player when the phase was entered.
    pub active: PlayerId,
    pub(crate) steps: VecDeque<Step>,
    pub(crate) end_raised: bool,
}

impl Phase {
    pub(crate) fn new(kind: PhaseKind, active: PlayerId, steps: Vec<Step>) -> Self {
        Self {
            kind,
            active,
            steps: steps.into(),
            end_raised: false,
        }
    }

    /// Steps not run yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.steps.len()
    }

    /// Label of the next step.
    #[must_use]
    pub fn next_step(&self) -> Option<&'static str> {
        self.steps.front().map(Step::label)
    }
}

/// Default steps for a phase kind.
#[must_use]
pub fn default_steps(kind: PhaseKind, active: PlayerId) -> Vec<Step> {
    let ctx = ActionContext::new(active, None);
    match kind {
        PhaseKind::Key => vec![Step::simple("forge key", move |game| {
            if game.state().player(active).amber >= game.config().key_cost {
                game.raise(GameAction::ForgeKey, Some(Target::Player(active)), ctx)?;
            }
            Ok(())
        })],
        PhaseKind::Main => vec![Step::gate("main actions", EventKind::TurnEndDeclared)],
        PhaseKind::Draw => vec![Step::simple("refill hand", move |game| {
            game.raise(GameAction::Refill, Some(Target::Player(active)), ctx)?;
            Ok(())
        })],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_steps() {
        let labels = |kind| {
            default_steps(kind, PlayerId::FIRST)
                .iter()
                .map(Step::label)
                .collect::<Vec<_>>()
        };
        assert_eq!(labels(PhaseKind::Key), vec!["forge key"]);
        assert_eq!(labels(PhaseKind::Main), vec!["main actions"]);
        assert_eq!(labels(PhaseKind::Draw), vec!["refill hand"]);
    }

    #[test]
    fn test_phase_is_fifo() {
        let phase = Phase::new(
            PhaseKind::Main,
            PlayerId::SECOND,
            vec![
                Step::simple("first", |_| Ok(())),
                Step::simple("second", |_| Ok(())),
            ],
        );
        assert_eq!(phase.remaining(), 2);
        assert_eq!(phase.next_step(), Some("first"));
    }
}
