//! Trigger conditions.
//!
//! Every subscription registered for an event's kind is dispatched, whether
//! the event applied or had no effect. A subscription fires when its
//! condition holds. Conditions are data, relative to the subscribing card
//! and its controller, so the same declaration works for every copy of a
//! card. `Applied` restricts a reaction to events that changed the match.

use serde::{Deserialize, Serialize};

use crate::cards::CardType;
use crate::core::{EntityId, MatchState, PhaseKind, PlayerId, PlayerRelation, Target};

use super::event::{EventOutcome, GameEvent};

/// A condition that must hold for a subscription to fire.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TriggerCondition {
    /// Always matches.
    Always,

    // === Entity Filters ===

    /// The event was caused by the subscribing card.
    SourceIsSelf,

    /// The event affects the subscribing card.
    TargetIsSelf,

    /// The affected card (or player) relates to the subscriber's controller.
    TargetControlledBy(PlayerRelation),

    /// The event's player relates to the subscriber's controller.
    ForPlayer(PlayerRelation),

    /// The affected card currently counts as this type.
    TargetTypeIs(CardType),

    /// The event belongs to this phase.
    PhaseIs(PhaseKind),

    /// The event's action changed the match.
    Applied,

    // === Combinators ===

    All(Vec<TriggerCondition>),
    Any(Vec<TriggerCondition>),
    Not(Box<TriggerCondition>),
}

impl TriggerCondition {
    /// Create an AND condition.
    pub fn all(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::All(conditions.into_iter().collect())
    }

    /// Create an OR condition.
    pub fn any(conditions: impl IntoIterator<Item = TriggerCondition>) -> Self {
        Self::Any(conditions.into_iter().collect())
    }

    /// Negate this condition.
    #[must_use]
    pub fn negate(self) -> Self {
        Self::Not(Box::new(self))
    }

    /// Add another condition with AND.
    #[must_use]
    pub fn and(self, other: TriggerCondition) -> Self {
        match self {
            Self::All(mut conditions) => {
                conditions.push(other);
                Self::All(conditions)
            }
            _ => Self::All(vec![self, other]),
        }
    }
}

/// Context for evaluating trigger conditions.
pub struct ConditionContext<'a> {
    /// The event being dispatched.
    pub event: &'a GameEvent,
    /// Current match state.
    pub state: &'a MatchState,
    /// Card that owns the subscription.
    pub source: Option<EntityId>,
    /// Player controlling the subscription.
    pub controller: PlayerId,
    /// What the event's action did.
    pub outcome: EventOutcome,
}

impl<'a> ConditionContext<'a> {
    pub fn new(
        event: &'a GameEvent,
        state: &'a MatchState,
        source: Option<EntityId>,
        controller: PlayerId,
    ) -> Self {
        Self {
            event,
            state,
            source,
            controller,
            outcome: EventOutcome::Applied,
        }
    }

    #[must_use]
    pub fn with_outcome(mut self, outcome: EventOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}

/// Evaluator for trigger conditions.
pub struct ConditionEvaluator;

impl ConditionEvaluator {
    /// Check if a condition is satisfied.
    pub fn evaluate(condition: &TriggerCondition, ctx: &ConditionContext) -> bool {
        match condition {
            TriggerCondition::Always => true,

            TriggerCondition::SourceIsSelf => ctx.source.is_some() && ctx.event.source == ctx.source,

            TriggerCondition::TargetIsSelf => {
                ctx.source.is_some() && ctx.event.target_card() == ctx.source
            }

            TriggerCondition::TargetControlledBy(relation) => {
                let controller = match ctx.event.target {
                    Some(Target::Player(player)) => Some(player),
                    Some(Target::Card(card)) => ctx.state.card(card).map(|c| c.controller),
                    None => None,
                };
                controller.is_some_and(|p| relation.matches(ctx.controller, p))
            }

            TriggerCondition::ForPlayer(relation) => ctx
                .event
                .player
                .is_some_and(|p| relation.matches(ctx.controller, p)),

            TriggerCondition::TargetTypeIs(card_type) => ctx
                .event
                .target_card()
                .and_then(|card| ctx.state.effective_type(card).ok())
                .is_some_and(|t| t == *card_type),

            TriggerCondition::PhaseIs(phase) => ctx.event.phase == Some(*phase),

            TriggerCondition::Applied => ctx.outcome == EventOutcome::Applied,

            TriggerCondition::All(conditions) => conditions.iter().all(|c| Self::evaluate(c, ctx)),

            TriggerCondition::Any(conditions) => conditions.iter().any(|c| Self::evaluate(c, ctx)),

            TriggerCondition::Not(inner) => !Self::evaluate(inner, ctx),
        }
    }
}
