//! Ability resolution.
//!
//! Abilities and the events they raise are resolved by an explicit stack
//! interpreter (`frame` + `resolver`). Each call to `Game::step_frame`
//! advances the top frame by one transition, so a resolution can stop at
//! any depth to wait for a player and pick up where it left off.
//!
//! ## Ordering guarantees
//!
//! - An event is marked resolved only after its action applied, every
//!   nested child event resolved and every reaction ran to `Complete`.
//! - A `then` continuation is evaluated only against the resolved event of
//!   the preceding action.
//! - A step of the pipeline is done only when the stack is empty again.
//!
//! ## Outcomes
//!
//! Every ability resolution leaves a `ResolutionRecord` in the match
//! history. An ability with no legal target leaves `Fizzled` and raises no
//! event, which is how it differs from an action that resolved with no
//! effect.

mod frame;
mod resolver;

pub use frame::{AbilityFrame, AbilityStage, EventFrame, EventStage, Frame, ResolvedHook};
pub(crate) use frame::Flow;

use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::triggers::EventId;

/// How one ability resolution ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResolutionOutcome {
    /// The primary action ran and produced `event`.
    Resolved { event: EventId, then_fired: bool },
    /// No legal target. The action never ran.
    Fizzled,
    /// An optional ability its controller passed on.
    Declined,
}

/// History entry for one ability resolution.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionRecord {
    pub ability: String,
    pub source: Option<EntityId>,
    pub player: PlayerId,
    pub outcome: ResolutionOutcome,
}

impl ResolutionRecord {
    #[must_use]
    pub fn fizzled(&self) -> bool {
        self.outcome == ResolutionOutcome::Fizzled
    }

    /// Did a continuation of this ability fire?
    #[must_use]
    pub fn then_fired(&self) -> bool {
        matches!(self.outcome, ResolutionOutcome::Resolved { then_fired: true, .. })
    }
}
