//! Resolution frames.
//!
//! The resolver keeps an explicit stack of frames instead of recursing, so
//! it can park on a player decision at any nesting depth and resume later.
//! Two kinds of frame alternate on the stack:
//!
//! - `AbilityFrame`: one ability walking its state machine
//!   `Declared → Targeted → Executing → Executed → ThenEvaluated → Complete`
//! - `EventFrame`: one raised event walking
//!   `Apply → Nested → Dispatch → Resolve`
//!
//! An ability at `Targeted` pushes the event frame for its action and waits
//! at `Executing` until that frame (and everything nested in it) is gone.
//! An event frame at `Dispatch` pushes one ability frame per reaction.

use std::collections::VecDeque;
use std::sync::Arc;

use crate::core::Target;
use crate::effects::{AbilityDeclaration, Context, Effect, GameAction, PendingEvent};
use crate::triggers::{EventId, Reaction, SubscriptionId};

/// Where an ability resolution stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AbilityStage {
    /// Not yet targeted.
    Declared,
    /// Optional ability waiting for its controller's yes/pass.
    AwaitingConfirmation,
    /// Several legal targets; waiting for a choice.
    AwaitingTarget,
    /// Target fixed (`None` for a passed optional target).
    Targeted(Option<Target>),
    /// The action's event is being resolved.
    Executing(EventId),
    /// The action's event resolved.
    Executed(EventId),
    /// Continuation handled (fired or not).
    ThenEvaluated,
    /// Ready to be recorded in the resolution history.
    Complete,
}

/// One ability resolution.
#[derive(Clone, Debug)]
pub struct AbilityFrame {
    pub ability: Arc<AbilityDeclaration>,
    /// The effect being resolved: the declaration's, or a continuation's.
    pub effect: Effect,
    pub context: Context,
    pub stage: AbilityStage,
    /// Optional abilities confirm once, not per continuation.
    pub confirmed: bool,
    /// Event of the ability's primary action.
    pub first_event: Option<EventId>,
    pub then_fired: bool,
}

impl AbilityFrame {
    pub fn new(ability: Arc<AbilityDeclaration>, context: Context) -> Self {
        Self {
            effect: ability.effect.clone(),
            ability,
            context,
            stage: AbilityStage::Declared,
            confirmed: false,
            first_event: None,
            then_fired: false,
        }
    }
}

/// Where a raised event stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventStage {
    /// Run the action.
    Apply,
    /// Raise causal children, one at a time.
    Nested,
    /// Run reactions, one at a time.
    Dispatch,
    /// Mark resolved and pop from the in-flight stack.
    Resolve,
}

/// Extra work run when an event resolves.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResolvedHook {
    /// Flip the active player and start the next round.
    EndRound,
}

/// One raised event.
#[derive(Clone, Debug)]
pub struct EventFrame {
    pub id: EventId,
    /// `None` for pure notifications (phase boundaries, round end).
    pub action: Option<GameAction>,
    pub stage: EventStage,
    pub children: VecDeque<PendingEvent>,
    pub reactions: VecDeque<Reaction>,
    /// Handlers registered when the event was raised.
    pub subscribers: Vec<SubscriptionId>,
    pub hook: Option<ResolvedHook>,
}

/// A frame on the resolution stack.
#[derive(Clone, Debug)]
pub enum Frame {
    Ability(AbilityFrame),
    Event(EventFrame),
}

impl Frame {
    /// Short label for tracing.
    #[must_use]
    pub fn label(&self) -> String {
        match self {
            Self::Ability(frame) => format!("ability `{}` {:?}", frame.ability.name, frame.stage),
            Self::Event(frame) => format!("{} {:?}", frame.id, frame.stage),
        }
    }
}

/// What processing the top frame produced.
#[derive(Debug)]
pub(crate) enum Flow {
    /// Put the frame back.
    Keep(Frame),
    /// Put the frame back with a new frame above it.
    Spawn(Frame, Frame),
    /// The frame finished.
    Done,
}
