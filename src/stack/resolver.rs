//! The frame interpreter.
//!
//! `step_frame` pops the top frame, runs exactly one transition and pushes
//! back whatever is left. Events are opened (recorded and pushed on the
//! in-flight stack) at the moment their frame is created, so the parent of
//! a new event is always the innermost event still in flight.

use std::sync::Arc;

use crate::core::Target;
use crate::effects::{
    ActionContext, ActionScope, Applied, Context, GameAction, MessageRef, MessageTemplate,
    TargetSelector, ThenContext,
};
use crate::error::EngineError;
use crate::game::{Choice, DecisionOrigin, DecisionRequest, Game, GameMessage, MessageArg};
use crate::triggers::{
    ConditionContext, ConditionEvaluator, EventId, EventOutcome, GameEvent, Reaction,
};

use super::frame::{AbilityFrame, AbilityStage, EventFrame, EventStage, Flow, Frame, ResolvedHook};
use super::{ResolutionOutcome, ResolutionRecord};

impl Game {
    /// Advance the top frame by one transition.
    pub(crate) fn step_frame(&mut self) -> Result<(), EngineError> {
        if self.pending.is_some() {
            return Ok(());
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        tracing::trace!(frame = %frame.label(), depth = self.frames.len(), "step");

        let flow = match frame {
            Frame::Ability(ability) => self.step_ability(ability)?,
            Frame::Event(event) => self.step_event(event)?,
        };
        match flow {
            Flow::Keep(frame) => self.frames.push(frame),
            Flow::Spawn(frame, child) => {
                self.frames.push(frame);
                self.frames.push(child);
            }
            Flow::Done => {}
        }
        Ok(())
    }

    /// Record `event` and put it in flight under the current event.
    pub(crate) fn open_event(
        &mut self,
        action: Option<GameAction>,
        event: GameEvent,
        hook: Option<ResolvedHook>,
    ) -> Result<EventFrame, EngineError> {
        let limit = self.config.max_resolution_depth;
        if self.bus.depth() >= limit {
            return Err(EngineError::ResolutionDepthExceeded { limit });
        }

        let kind = event.kind;
        let subscribers = self.bus.handlers_for(kind);
        let parent = self.bus.current();
        let id = self.events.open(event, parent);
        self.bus.push_in_flight(id);
        tracing::debug!(%id, %kind, ?parent, handlers = subscribers.len(), "event raised");

        Ok(EventFrame {
            id,
            action,
            stage: EventStage::Apply,
            children: Default::default(),
            reactions: Default::default(),
            subscribers,
            hook,
        })
    }

    // === Events ===

    fn step_event(&mut self, mut frame: EventFrame) -> Result<Flow, EngineError> {
        match frame.stage {
            EventStage::Apply => {
                let event = self
                    .events
                    .get(frame.id)
                    .map(|record| record.event.clone())
                    .ok_or(EngineError::Internal("event frame without a record"))?;

                let applied = match &frame.action {
                    Some(action) => {
                        let mut scope = ActionScope {
                            state: &mut self.state,
                            bus: &mut self.bus,
                            config: &self.config,
                        };
                        action.apply(&event, &mut scope)?
                    }
                    None => Applied {
                        outcome: EventOutcome::Applied,
                        amount: event.amount,
                        children: Vec::new(),
                        own: Vec::new(),
                    },
                };
                tracing::trace!(id = %frame.id, outcome = ?applied.outcome, amount = applied.amount, "applied");

                self.events.set_outcome(frame.id, applied.outcome, applied.amount);
                frame.children = applied.children.into();
                frame.reactions = applied.own.into();
                frame
                    .reactions
                    .extend(frame.subscribers.iter().copied().map(Reaction::Subscribed));
                frame.stage = EventStage::Nested;
                Ok(Flow::Keep(Frame::Event(frame)))
            }
            EventStage::Nested => {
                if let Some(child) = frame.children.pop_front() {
                    let child = self.open_event(Some(child.action), child.event, None)?;
                    return Ok(Flow::Spawn(Frame::Event(frame), Frame::Event(child)));
                }
                frame.stage = EventStage::Dispatch;
                Ok(Flow::Keep(Frame::Event(frame)))
            }
            EventStage::Dispatch => {
                while let Some(reaction) = frame.reactions.pop_front() {
                    if let Some(ability) = self.reaction_frame(reaction, frame.id) {
                        return Ok(Flow::Spawn(Frame::Event(frame), Frame::Ability(ability)));
                    }
                }
                frame.stage = EventStage::Resolve;
                Ok(Flow::Keep(Frame::Event(frame)))
            }
            EventStage::Resolve => {
                self.events.mark_resolved(frame.id);
                if self.bus.pop_in_flight() != Some(frame.id) {
                    return Err(EngineError::Internal("in-flight events resolved out of order"));
                }
                tracing::debug!(id = %frame.id, "event resolved");
                self.log_event(frame.id);

                if let Some(ResolvedHook::EndRound) = frame.hook {
                    self.state.end_round();
                    tracing::info!(
                        round = self.state.round(),
                        active = %self.state.active_player(),
                        "round ended"
                    );
                }
                self.check_victory();
                Ok(Flow::Done)
            }
        }
    }

    /// Build the ability frame for a queued reaction, or `None` to skip it.
    fn reaction_frame(&self, reaction: Reaction, event: EventId) -> Option<AbilityFrame> {
        match reaction {
            Reaction::Own {
                ability,
                source,
                controller,
            } => Some(AbilityFrame::new(
                ability,
                Context::new(controller, Some(source)).triggered_by(event),
            )),
            Reaction::Subscribed(id) => {
                let Some(subscription) = self.bus.get(id) else {
                    tracing::trace!(%id, "subscription removed before dispatch");
                    return None;
                };
                let record = self.events.get(event)?;
                let ctx = ConditionContext::new(
                    &record.event,
                    &self.state,
                    subscription.source,
                    subscription.controller,
                )
                .with_outcome(record.outcome);
                if !ConditionEvaluator::evaluate(&subscription.condition, &ctx) {
                    return None;
                }
                tracing::debug!(%id, ability = %subscription.ability.name, %event, "reaction fires");
                Some(AbilityFrame::new(
                    Arc::clone(&subscription.ability),
                    Context::new(subscription.controller, subscription.source).triggered_by(event),
                ))
            }
        }
    }

    fn log_event(&mut self, id: EventId) {
        let Some(record) = self.events.get(id) else {
            return;
        };
        let event = &record.event;
        let message = GameMessage::new(event.kind.template())
            .with_arg(event.player.map_or(MessageArg::Empty, MessageArg::Player))
            .with_arg(self.card_arg(event.source))
            .with_arg(self.target_arg(event.target))
            .with_arg(MessageArg::Amount(event.amount));
        self.log.push(message);
    }

    // === Abilities ===

    fn step_ability(&mut self, mut frame: AbilityFrame) -> Result<Flow, EngineError> {
        match frame.stage {
            AbilityStage::Declared => {
                if frame.ability.optional && !frame.confirmed {
                    frame.stage = AbilityStage::AwaitingConfirmation;
                    self.prompt(DecisionRequest::confirm(frame.context.player), DecisionOrigin::Ability);
                    return Ok(Flow::Keep(Frame::Ability(frame)));
                }
                self.choose_target(frame)
            }
            AbilityStage::AwaitingConfirmation | AbilityStage::AwaitingTarget => {
                Err(EngineError::Internal("ability parked without a pending prompt"))
            }
            AbilityStage::Targeted(target) => {
                let ctx = ActionContext::new(frame.context.player, frame.context.source);
                let action = frame.effect.action.clone();
                let event = action.event_for(target, &ctx);
                let child = self.open_event(Some(action), event, None)?;
                frame.stage = AbilityStage::Executing(child.id);
                Ok(Flow::Spawn(Frame::Ability(frame), Frame::Event(child)))
            }
            AbilityStage::Executing(id) => {
                if self.events.resolved(id).is_none() {
                    return Err(EngineError::UnresolvedEvent(id));
                }
                frame.first_event.get_or_insert(id);
                frame.stage = AbilityStage::Executed(id);
                Ok(Flow::Keep(Frame::Ability(frame)))
            }
            AbilityStage::Executed(id) => self.evaluate_then(frame, id),
            AbilityStage::ThenEvaluated => {
                frame.stage = AbilityStage::Complete;
                Ok(Flow::Keep(Frame::Ability(frame)))
            }
            AbilityStage::Complete => {
                let event = frame
                    .first_event
                    .ok_or(EngineError::Internal("ability completed without an event"))?;
                tracing::trace!(ability = %frame.ability.name, %event, then_fired = frame.then_fired, "ability complete");
                self.record(
                    &frame,
                    ResolutionOutcome::Resolved {
                        event,
                        then_fired: frame.then_fired,
                    },
                );
                Ok(Flow::Done)
            }
        }
    }

    fn choose_target(&mut self, mut frame: AbilityFrame) -> Result<Flow, EngineError> {
        let spec = &frame.effect.target;
        let optional = spec.optional;
        let targets = TargetSelector::new(spec, frame.context.player, frame.context.source)
            .legal_targets(&frame.effect.action, &self.state, &self.config)?;

        match targets.as_slice() {
            [] if optional => frame.stage = AbilityStage::Targeted(None),
            [] => return Ok(self.fizzle(frame)),
            [only] => frame.stage = AbilityStage::Targeted(Some(*only)),
            _ => {
                frame.stage = AbilityStage::AwaitingTarget;
                self.prompt(
                    DecisionRequest::choose_target(frame.context.player, &targets, optional),
                    DecisionOrigin::Ability,
                );
            }
        }
        Ok(Flow::Keep(Frame::Ability(frame)))
    }

    /// No legal target: the action never runs and no event is raised.
    fn fizzle(&mut self, frame: AbilityFrame) -> Flow {
        match frame.first_event {
            // A continuation without a target ends the chain.
            Some(event) => {
                tracing::debug!(ability = %frame.ability.name, "continuation has no legal target");
                self.record(
                    &frame,
                    ResolutionOutcome::Resolved {
                        event,
                        then_fired: frame.then_fired,
                    },
                );
            }
            None => {
                tracing::debug!(ability = %frame.ability.name, "ability fizzled");
                let message = GameMessage::new("ability.fizzled")
                    .with_arg(MessageArg::Player(frame.context.player))
                    .with_arg(self.card_arg(frame.context.source))
                    .with_arg(MessageArg::Text(frame.ability.name.clone().into()));
                self.log.push(message);
                self.record(&frame, ResolutionOutcome::Fizzled);
            }
        }
        Flow::Done
    }

    fn evaluate_then(&mut self, mut frame: AbilityFrame, id: EventId) -> Result<Flow, EngineError> {
        let Some(clause) = frame.effect.then.clone() else {
            frame.stage = AbilityStage::ThenEvaluated;
            return Ok(Flow::Keep(Frame::Ability(frame)));
        };

        let pre_then_event = self.events.resolved(id).ok_or(EngineError::UnresolvedEvent(id))?;
        let player = frame.context.player;
        let ctx = ThenContext {
            player,
            opponent: player.opponent(),
            source: frame.context.source,
            pre_then_event,
            state: &self.state,
        };
        let fires = clause.condition.as_ref().map_or(true, |condition| condition(&ctx));
        tracing::debug!(ability = %frame.ability.name, pre_then_event = %id, fires, "then evaluated");

        if !fires {
            frame.stage = AbilityStage::ThenEvaluated;
            return Ok(Flow::Keep(Frame::Ability(frame)));
        }

        if let Some(template) = &clause.message {
            let message = self.then_message(template, &frame.context, id);
            self.log.push(message);
        }
        frame.then_fired = true;
        frame.context.pre_then_event = Some(id);
        frame.effect = clause.effect.clone();
        frame.stage = AbilityStage::Declared;
        Ok(Flow::Keep(Frame::Ability(frame)))
    }

    fn then_message(&self, template: &MessageTemplate, context: &Context, pre_then_event: EventId) -> GameMessage {
        let event = self.events.get(pre_then_event).map(|record| &record.event);
        let mut message = GameMessage::new(template.template.clone())
            .with_arg(MessageArg::Player(context.player))
            .with_arg(self.card_arg(context.source))
            .with_arg(self.target_arg(event.and_then(|e| e.target)));
        for extra in &template.extra {
            message = message.with_arg(match extra {
                MessageRef::Opponent => MessageArg::Player(context.player.opponent()),
                MessageRef::Amount => MessageArg::Amount(event.map_or(0, |e| e.amount)),
                MessageRef::Text(text) => MessageArg::Text(text.clone()),
            });
        }
        message
    }

    fn record(&mut self, frame: &AbilityFrame, outcome: ResolutionOutcome) {
        self.history.push(ResolutionRecord {
            ability: frame.ability.name.clone(),
            source: frame.context.source,
            player: frame.context.player,
            outcome,
        });
    }

    /// Feed an accepted answer to the ability waiting on top of the stack.
    pub(crate) fn answer_ability(&mut self, choice: Choice) -> Result<(), EngineError> {
        let Some(Frame::Ability(mut frame)) = self.frames.pop() else {
            return Err(EngineError::Internal("ability prompt without an ability frame"));
        };

        match (frame.stage, choice) {
            (AbilityStage::AwaitingConfirmation, Choice::Accept) => {
                frame.confirmed = true;
                frame.stage = AbilityStage::Declared;
            }
            (AbilityStage::AwaitingConfirmation, Choice::Pass) => {
                tracing::debug!(ability = %frame.ability.name, "optional ability declined");
                let message = GameMessage::new("ability.declined")
                    .with_arg(MessageArg::Player(frame.context.player))
                    .with_arg(self.card_arg(frame.context.source));
                self.log.push(message);
                self.record(&frame, ResolutionOutcome::Declined);
                return Ok(());
            }
            (AbilityStage::AwaitingTarget, Choice::Pass) => {
                frame.stage = AbilityStage::Targeted(None);
            }
            (AbilityStage::AwaitingTarget, Choice::Target(target)) => {
                if self.still_legal(&frame, target)? {
                    frame.stage = AbilityStage::Targeted(Some(target));
                } else if frame.effect.target.optional {
                    tracing::warn!(%target, "chosen target is no longer legal; passing");
                    frame.stage = AbilityStage::Targeted(None);
                } else {
                    tracing::warn!(%target, "chosen target is no longer legal; fizzling");
                    self.fizzle(frame);
                    return Ok(());
                }
            }
            _ => {
                self.frames.push(Frame::Ability(frame));
                return Err(EngineError::IllegalChoice { choice });
            }
        }
        self.frames.push(Frame::Ability(frame));
        Ok(())
    }

    fn still_legal(&self, frame: &AbilityFrame, target: Target) -> Result<bool, EngineError> {
        TargetSelector::new(&frame.effect.target, frame.context.player, frame.context.source).is_legal(
            target,
            &frame.effect.action,
            &self.state,
            &self.config,
        )
    }
}
