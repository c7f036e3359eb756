//! Step / phase pipeline.
//!
//! A round is a fixed order of phases. Entering a phase materializes its
//! steps into a FIFO queue and raises `PhaseStarted`. Steps are popped one
//! per advance, and only while the resolution stack is empty, so a step
//! never starts before everything the previous one raised has resolved.
//! An empty queue raises `PhaseEnded`; after the last phase of the round a
//! `RoundEnded` notification flips the active player when it resolves.
//!
//! Phase steps default to `phase::default_steps` and can be replaced per
//! phase kind with a `StepFactory`.

mod phase;
mod step;

pub use phase::{default_steps, Phase, StepFactory};
pub use step::{Step, StepWork};

use rustc_hash::FxHashMap;

use crate::core::{MatchConfig, PhaseKind};
use crate::error::EngineError;
use crate::game::{DecisionOrigin, DecisionRequest, Game, Progress};
use crate::stack::ResolvedHook;
use crate::triggers::GameEvent;

/// Drives phases and steps for one match.
pub struct Pipeline {
    order: Vec<PhaseKind>,
    /// Index of the next phase to enter.
    cursor: usize,
    /// Start over after the last phase (`false` for scripted phases).
    repeat: bool,
    current: Option<Phase>,
    overrides: FxHashMap<PhaseKind, StepFactory>,
    torn_down: bool,
}

impl Pipeline {
    /// Cycle through the configured phases forever.
    #[must_use]
    pub fn new(config: &MatchConfig) -> Self {
        Self::with_order(config.phases.clone(), true)
    }

    /// Run `phases` once as a single round, then go idle.
    #[must_use]
    pub fn scripted(phases: Vec<PhaseKind>) -> Self {
        Self::with_order(phases, false)
    }

    fn with_order(order: Vec<PhaseKind>, repeat: bool) -> Self {
        Self {
            order,
            cursor: 0,
            repeat,
            current: None,
            overrides: FxHashMap::default(),
            torn_down: false,
        }
    }

    /// Replace the default steps of a phase kind.
    pub fn set_steps(&mut self, kind: PhaseKind, factory: StepFactory) {
        self.overrides.insert(kind, factory);
    }

    #[must_use]
    pub fn current(&self) -> Option<&Phase> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.torn_down
    }

    /// Drop the active phase and stop. Used once the match is decided.
    pub(crate) fn tear_down(&mut self) {
        if !self.torn_down {
            tracing::debug!(phase = ?self.current.as_ref().map(|p| p.kind), "pipeline torn down");
        }
        self.current = None;
        self.torn_down = true;
    }

    /// Run one unit of pipeline work. Call only with an empty resolution
    /// stack and no pending prompt.
    pub(crate) fn advance(&mut self, game: &mut Game) -> Result<Progress, EngineError> {
        if self.torn_down {
            return Ok(Progress::Idle);
        }
        let Some(phase) = self.current.as_mut() else {
            return self.enter_next(game);
        };

        match phase.steps.front_mut() {
            Some(Step::Gate {
                label,
                until,
                scanned,
            }) => {
                let from = *scanned.get_or_insert(game.events.len());
                let closed = game
                    .events
                    .since(from)
                    .any(|record| record.event.kind == *until && record.resolved);
                *scanned = Some(game.events.len());
                if closed {
                    tracing::trace!(step = *label, "gate closed");
                    phase.steps.pop_front();
                    return Ok(Progress::Advanced);
                }
                let active = game.state.active_player();
                let options = game.main_options(active)?;
                game.prompt(DecisionRequest::main_action(active, options), DecisionOrigin::Step);
                Ok(Progress::WaitingForInput(active))
            }
            Some(Step::Simple { .. }) => {
                if let Some(Step::Simple { label, work }) = phase.steps.pop_front() {
                    tracing::trace!(step = label, phase = %phase.kind, "step");
                    work(game)?;
                }
                Ok(Progress::Advanced)
            }
            None if !phase.end_raised => {
                phase.end_raised = true;
                tracing::info!(phase = %phase.kind, "phase ended");
                game.notify(GameEvent::phase_ended(phase.kind, phase.active))?;
                Ok(Progress::Advanced)
            }
            None => {
                let active = phase.active;
                self.current = None;
                game.state.set_phase(None);
                if self.cursor >= self.order.len() {
                    if self.repeat {
                        self.cursor = 0;
                    }
                    game.notify_with(GameEvent::round_ended(active), ResolvedHook::EndRound)?;
                }
                Ok(Progress::Advanced)
            }
        }
    }

    fn enter_next(&mut self, game: &mut Game) -> Result<Progress, EngineError> {
        let Some(&kind) = self.order.get(self.cursor) else {
            return Ok(Progress::Idle);
        };
        self.cursor += 1;

        let active = game.state.active_player();
        let steps = match self.overrides.get(&kind) {
            Some(factory) => factory(active),
            None => default_steps(kind, active),
        };
        tracing::info!(phase = %kind, round = game.state.round(), %active, steps = steps.len(), "phase started");

        game.state.set_phase(Some(kind));
        self.current = Some(Phase::new(kind, active, steps));
        game.notify(GameEvent::phase_started(kind, active))?;
        Ok(Progress::Advanced)
    }
}

impl std::fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Pipeline")
            .field("order", &self.order)
            .field("cursor", &self.cursor)
            .field("current", &self.current)
            .field("torn_down", &self.torn_down)
            .finish()
    }
}
