//! Match orchestrator.
//!
//! `Match` pairs a `Game` with its `Pipeline` and exposes the driving
//! surface: `advance`, `is_waiting_for_input`, `submit_decision`.
//!
//! Each `advance` does one unit of work, in priority order:
//! 1. nothing, if the match is decided or a prompt is pending
//! 2. one transition of the top resolution frame
//! 3. one pipeline step, once the resolution stack is empty
//!
//! The win check runs whenever an event resolves. Once it reports a result
//! the pipeline is torn down and `advance` keeps returning `GameOver`.

use std::sync::Arc;

use crate::core::{EntityId, MatchSnapshot, MatchState, PhaseKind, PlayerId};
use crate::effects::AbilityDeclaration;
use crate::error::EngineError;
use crate::pipeline::Pipeline;
use crate::rules::GameResult;
use crate::stack::ResolutionRecord;
use crate::triggers::EventLog;

use super::decision::{Choice, DecisionMaker, DecisionRequest, FirstOption};
use super::log::GameLog;
use super::Game;

/// Upper bound on work done by one `advance_until_input` call.
const MAX_STEPS_PER_CALL: usize = 1 << 16;

/// What one call to `advance` did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Work was done; call again.
    Advanced,
    /// Parked on a prompt for this player.
    WaitingForInput(PlayerId),
    GameOver(GameResult),
    /// Nothing left to do (a scripted pipeline ran out).
    Idle,
}

/// A running match.
#[derive(Debug)]
pub struct Match {
    pub(crate) game: Game,
    pub(crate) pipeline: Pipeline,
}

impl Match {
    pub(crate) fn new(game: Game, pipeline: Pipeline) -> Self {
        Self { game, pipeline }
    }

    /// Do one unit of work.
    ///
    /// An internal fault aborts the current resolution (frames, in-flight
    /// events and the pending prompt are dropped) and is returned here.
    pub fn advance(&mut self) -> Result<Progress, EngineError> {
        if let Some(result) = self.game.result {
            return Ok(Progress::GameOver(result));
        }
        if let Some(pending) = &self.game.pending {
            return Ok(Progress::WaitingForInput(pending.request.player));
        }

        let step = if self.game.frames.is_empty() {
            self.pipeline.advance(&mut self.game)
        } else {
            self.game.step_frame().map(|()| Progress::Advanced)
        };

        match step {
            Ok(progress) => Ok(self.settle(progress)),
            Err(err) => {
                self.game.fault(&err);
                Err(err)
            }
        }
    }

    fn settle(&mut self, progress: Progress) -> Progress {
        if let Some(result) = self.game.result {
            self.pipeline.tear_down();
            return Progress::GameOver(result);
        }
        match &self.game.pending {
            Some(pending) => Progress::WaitingForInput(pending.request.player),
            None => progress,
        }
    }

    /// Advance until the match needs input, ends, or runs out of work.
    pub fn advance_until_input(&mut self) -> Result<Progress, EngineError> {
        for _ in 0..MAX_STEPS_PER_CALL {
            match self.advance()? {
                Progress::Advanced => continue,
                settled => return Ok(settled),
            }
        }
        tracing::warn!(steps = MAX_STEPS_PER_CALL, "advance did not settle");
        Ok(Progress::Advanced)
    }

    #[must_use]
    pub fn is_waiting_for_input(&self) -> bool {
        self.game.pending.is_some()
    }

    #[must_use]
    pub fn pending_decision(&self) -> Option<&DecisionRequest> {
        self.game.pending_decision()
    }

    /// Answer the pending prompt.
    ///
    /// Player-facing errors (`IllegalChoice`, `WrongPlayer`,
    /// `NotWaitingForInput`, `MatchOver`) change nothing and keep the
    /// prompt open.
    pub fn submit_decision(&mut self, player: PlayerId, choice: Choice) -> Result<(), EngineError> {
        let submitted = self.game.submit(player, choice);
        if let Err(err) = &submitted {
            if err.severity().is_internal() {
                self.game.fault(err);
            }
        }
        submitted
    }

    /// Queue an ability outside the pipeline, as a host-activated effect.
    ///
    /// Refused with `AwaitingInput` while a prompt is open.
    pub fn resolve_ability(
        &mut self,
        ability: Arc<AbilityDeclaration>,
        player: PlayerId,
        source: Option<EntityId>,
    ) -> Result<(), EngineError> {
        self.game.resolve_ability(ability, player, source)
    }

    /// Play the match out with `maker` answering every prompt.
    ///
    /// Returns the result, or `None` if the pipeline went idle or
    /// `max_decisions` prompts were answered first.
    pub fn run(
        &mut self,
        maker: &mut dyn DecisionMaker,
        max_decisions: usize,
    ) -> Result<Option<GameResult>, EngineError> {
        let mut answered = 0;
        loop {
            match self.advance_until_input()? {
                Progress::GameOver(result) => return Ok(Some(result)),
                Progress::Idle | Progress::Advanced => return Ok(None),
                Progress::WaitingForInput(player) => {
                    if answered >= max_decisions {
                        return Ok(None);
                    }
                    let Some(request) = self.game.pending_decision().cloned() else {
                        return Err(EngineError::Internal("waiting without a prompt"));
                    };
                    let choice = maker.decide(&request, &self.game.state);
                    if let Err(err) = self.submit_decision(player, choice) {
                        if !err.is_player_facing() {
                            return Err(err);
                        }
                        tracing::warn!(error = %err, "decision maker answered badly; taking the first option");
                        let fallback = FirstOption.decide(&request, &self.game.state);
                        self.submit_decision(player, fallback)?;
                    }
                    answered += 1;
                }
            }
        }
    }

    // === Read access ===

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.game.result
    }

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.game.state
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.game.events
    }

    #[must_use]
    pub fn log(&self) -> &GameLog {
        &self.game.log
    }

    #[must_use]
    pub fn history(&self) -> &[ResolutionRecord] {
        &self.game.history
    }

    #[must_use]
    pub fn current_phase(&self) -> Option<PhaseKind> {
        self.game.state.phase()
    }

    #[must_use]
    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    #[must_use]
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// Serializable copy of the match state.
    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        self.game.snapshot()
    }
}
