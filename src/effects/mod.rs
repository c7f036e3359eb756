//! Game actions, targeting and ability declarations.
//!
//! ## Key Types
//!
//! - `GameAction`: atomic mutations (damage, draw, steal, play, ...)
//! - `TargetSpec` / `TargetSelector`: legal target enumeration
//! - `AbilityDeclaration` / `Effect` / `ThenClause`: declarative abilities
//! - `Context` / `ThenContext`: what a resolution and its continuations see
//!
//! Declarations are interpreted by the resolver in `stack`.

pub mod ability;
pub mod action;
pub mod targeting;

pub use ability::{
    AbilityDeclaration, AbilityTrigger, Context, Effect, MessageRef, MessageTemplate, ThenClause,
    ThenCondition, ThenContext,
};
pub use action::{ActionContext, ActionScope, Applied, GameAction, PendingEvent};
pub use targeting::{TargetFilter, TargetKind, TargetSelector, TargetSpec};
