//! The match engine.
//!
//! ## Key Types
//!
//! - [`Game`]: the engine context: match state, event bus, event log, game
//!   log, resolution stack and pending prompt
//! - [`Match`]: the orchestrator driving a `Game` through its `Pipeline`
//! - [`MatchBuilder`]: match setup from a card catalog
//! - [`DecisionRequest`] / [`Choice`]: the decision collaborator contract
//! - [`GameMessage`]: the log collaborator contract
//!
//! Nothing outside this crate mutates a `Game` directly. Hosts read it
//! through the accessors, drive it with `Match::advance` and answer prompts
//! with `Match::submit_decision`.

mod builder;
mod decision;
mod log;
mod orchestrator;

pub use builder::MatchBuilder;
pub use decision::{
    Choice, DecisionMaker, DecisionOrigin, DecisionRequest, FirstOption, PendingDecision, PromptKind,
    ScriptedDecisions,
};
pub use log::{GameLog, GameMessage, MessageArg, MessageSink};
pub use orchestrator::{Match, Progress};

use std::sync::Arc;

use crate::core::{EntityId, MatchConfig, MatchSnapshot, MatchState, PlayerId, Target, Zone};
use crate::effects::{AbilityDeclaration, ActionContext, Context, GameAction};
use crate::error::EngineError;
use crate::rules::{GameResult, VictoryCondition};
use crate::stack::{AbilityFrame, Frame, ResolutionRecord, ResolvedHook};
use crate::triggers::{EventBus, EventId, EventLog, GameEvent};

/// Engine context for one match.
pub struct Game {
    pub(crate) state: MatchState,
    pub(crate) bus: EventBus,
    pub(crate) events: EventLog,
    pub(crate) log: GameLog,
    pub(crate) config: MatchConfig,
    pub(crate) frames: Vec<Frame>,
    pub(crate) pending: Option<PendingDecision>,
    pub(crate) history: Vec<ResolutionRecord>,
    pub(crate) victory: Box<dyn VictoryCondition>,
    pub(crate) result: Option<GameResult>,
}

impl Game {
    pub(crate) fn new(
        state: MatchState,
        bus: EventBus,
        config: MatchConfig,
        victory: Box<dyn VictoryCondition>,
        log: GameLog,
    ) -> Self {
        Self {
            state,
            bus,
            events: EventLog::new(),
            log,
            config,
            frames: Vec::new(),
            pending: None,
            history: Vec::new(),
            victory,
            result: None,
        }
    }

    // === Read access ===

    #[must_use]
    pub fn state(&self) -> &MatchState {
        &self.state
    }

    #[must_use]
    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    #[must_use]
    pub fn events(&self) -> &EventLog {
        &self.events
    }

    #[must_use]
    pub fn log(&self) -> &GameLog {
        &self.log
    }

    #[must_use]
    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Ability resolutions so far, in completion order.
    #[must_use]
    pub fn history(&self) -> &[ResolutionRecord] {
        &self.history
    }

    #[must_use]
    pub fn pending_decision(&self) -> Option<&DecisionRequest> {
        self.pending.as_ref().map(|p| &p.request)
    }

    #[must_use]
    pub fn result(&self) -> Option<GameResult> {
        self.result
    }

    /// Frames still on the resolution stack.
    #[must_use]
    pub fn resolution_depth(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::capture(&self.state, self.result)
    }

    // === Raising ===

    /// Raise the event for `action` on `target`. It resolves as the match
    /// advances; the pipeline does not move on until it has.
    pub fn raise(
        &mut self,
        action: GameAction,
        target: Option<Target>,
        ctx: ActionContext,
    ) -> Result<EventId, EngineError> {
        let event = action.event_for(target, &ctx);
        self.push_event(Some(action), event, None)
    }

    /// Raise a notification: an event with no action behind it.
    pub fn notify(&mut self, event: GameEvent) -> Result<EventId, EngineError> {
        self.push_event(None, event, None)
    }

    pub(crate) fn notify_with(&mut self, event: GameEvent, hook: ResolvedHook) -> Result<EventId, EngineError> {
        self.push_event(None, event, Some(hook))
    }

    fn push_event(
        &mut self,
        action: Option<GameAction>,
        event: GameEvent,
        hook: Option<ResolvedHook>,
    ) -> Result<EventId, EngineError> {
        let frame = self.open_event(action, event, hook)?;
        let id = frame.id;
        self.frames.push(Frame::Event(frame));
        Ok(id)
    }

    /// Queue an ability resolution outside of any event.
    ///
    /// The frame stack is frozen while a prompt is open, so nothing can be
    /// queued on top of the frame that asked.
    pub fn resolve_ability(
        &mut self,
        ability: Arc<AbilityDeclaration>,
        player: PlayerId,
        source: Option<EntityId>,
    ) -> Result<(), EngineError> {
        if self.result.is_some() {
            return Err(EngineError::MatchOver);
        }
        if self.pending.is_some() {
            tracing::warn!(ability = %ability.name, %player, "activation refused while a prompt is open");
            return Err(EngineError::AwaitingInput);
        }
        tracing::debug!(ability = %ability.name, %player, "ability activated");
        self.frames
            .push(Frame::Ability(AbilityFrame::new(ability, Context::new(player, source))));
        Ok(())
    }

    // === Decisions ===

    pub(crate) fn prompt(&mut self, request: DecisionRequest, origin: DecisionOrigin) {
        tracing::debug!(
            player = %request.player,
            kind = ?request.kind,
            options = request.options.len(),
            "waiting for input"
        );
        self.pending = Some(PendingDecision { request, origin });
    }

    /// Validate and apply an answer to the pending prompt.
    ///
    /// Rejected answers leave the prompt in place and change nothing.
    pub(crate) fn submit(&mut self, player: PlayerId, choice: Choice) -> Result<(), EngineError> {
        if self.result.is_some() {
            return Err(EngineError::MatchOver);
        }
        let Some(pending) = self.pending.take() else {
            return Err(EngineError::NotWaitingForInput);
        };
        let expected = pending.request.player;
        let answered = if player != expected {
            tracing::warn!(submitted = %player, %expected, "answer from the wrong player");
            Err(EngineError::WrongPlayer {
                submitted: player,
                expected,
            })
        } else if !pending.request.allows(&choice) {
            tracing::warn!(?choice, "choice not offered; prompt stays open");
            Err(EngineError::IllegalChoice { choice })
        } else {
            match pending.origin {
                DecisionOrigin::Ability => self.answer_ability(choice),
                DecisionOrigin::Step => self.answer_step(player, choice),
            }
        };

        if answered.as_ref().is_err_and(EngineError::is_player_facing) {
            self.pending = Some(pending);
        }
        answered
    }

    fn answer_step(&mut self, player: PlayerId, choice: Choice) -> Result<(), EngineError> {
        let (card, parent) = match choice {
            Choice::EndTurn => {
                self.notify(GameEvent::turn_end_declared(player))?;
                return Ok(());
            }
            Choice::Play(card) => (card, None),
            Choice::PlayUpgrade { card, parent } => (card, Some(parent)),
            Choice::Target(_) | Choice::Accept | Choice::Pass => {
                return Err(EngineError::IllegalChoice { choice });
            }
        };

        let action = GameAction::Play { upgrade_parent: parent };
        let ctx = ActionContext::new(player, Some(card));
        if !action.can_affect(Target::Card(card), &ctx, &self.state, &self.config)? {
            // Re-prompted by the gate on the next advance.
            tracing::warn!(%card, "card can no longer be played");
            return Ok(());
        }
        self.raise(action, Some(Target::Card(card)), ctx)?;
        Ok(())
    }

    /// Main-phase options for `player`: playable cards, upgrade placements
    /// and ending the turn.
    pub fn main_options(&self, player: PlayerId) -> Result<Vec<Choice>, EngineError> {
        let ctx = ActionContext::new(player, None);
        let in_play: Vec<EntityId> = [player, player.opponent()]
            .into_iter()
            .flat_map(|p| self.state.cards_in(p, Zone::PlayArea).iter().copied())
            .collect();

        let play = GameAction::Play { upgrade_parent: None };
        let mut options = Vec::new();
        for &card in self.state.cards_in(player, Zone::Hand) {
            let target = Target::Card(card);
            if play.can_affect(target, &ctx, &self.state, &self.config)? {
                options.push(Choice::Play(card));
            }
            for &parent in &in_play {
                let attach = GameAction::Play {
                    upgrade_parent: Some(parent),
                };
                if attach.can_affect(target, &ctx, &self.state, &self.config)? {
                    options.push(Choice::PlayUpgrade { card, parent });
                }
            }
        }
        options.push(Choice::EndTurn);
        Ok(options)
    }

    // === Termination ===

    /// Run the win check. A decided match drops every pending resolution.
    pub(crate) fn check_victory(&mut self) {
        if self.result.is_some() {
            return;
        }
        let Some(result) = self.victory.check(&self.state, &self.config) else {
            return;
        };
        self.result = Some(result);
        self.frames.clear();
        self.bus.clear_in_flight();
        self.pending = None;

        let GameResult::Winner(winner) = result;
        self.log
            .push(GameMessage::new("match.won").with_arg(MessageArg::Player(winner)));
        tracing::info!(%winner, round = self.state.round(), "match won");
    }

    /// Abort the current resolution after an invariant fault.
    pub(crate) fn fault(&mut self, err: &EngineError) {
        tracing::error!(error = %err, severity = err.severity().as_str(), "resolution aborted");
        self.frames.clear();
        self.bus.clear_in_flight();
        self.pending = None;
        self.log
            .push(GameMessage::new("engine.fault").with_arg(MessageArg::Text(err.to_string().into())));
    }

    // === Message arguments ===

    pub(crate) fn card_arg(&self, entity: Option<EntityId>) -> MessageArg {
        entity
            .and_then(|e| {
                self.state.definition(e).ok().map(|def| MessageArg::Card {
                    entity: e,
                    name: def.name.clone(),
                })
            })
            .unwrap_or(MessageArg::Empty)
    }

    pub(crate) fn target_arg(&self, target: Option<Target>) -> MessageArg {
        match target {
            Some(Target::Player(p)) => MessageArg::Player(p),
            Some(Target::Card(card)) => self.card_arg(Some(card)),
            None => MessageArg::Empty,
        }
    }
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("round", &self.state.round())
            .field("active_player", &self.state.active_player())
            .field("events", &self.events.len())
            .field("frames", &self.frames.len())
            .field("pending", &self.pending)
            .field("result", &self.result)
            .finish()
    }
}
