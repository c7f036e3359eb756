//! Event bus, event records and trigger conditions.
//!
//! ## Key Components
//!
//! - [`GameEvent`] / [`EventKind`]: what happened, with its parameters
//! - [`EventLog`]: arena of every raised event, linked parent to child
//! - [`ResolvedEvent`]: read-only view available once an event resolved
//! - [`TriggerCondition`]: filters for when a reaction fires
//! - [`EventBus`]: dispatch table of reactions plus the in-flight stack
//!
//! Raising an event is driven by the resolver (`stack`), which opens the
//! record, applies the action, resolves nested children, dispatches the
//! handlers captured at raise time and only then marks it resolved.

mod condition;
mod event;
mod registry;

pub use condition::{ConditionContext, ConditionEvaluator, TriggerCondition};
pub use event::{EventId, EventKind, EventLog, EventOutcome, EventRecord, GameEvent, ResolvedEvent};
pub use registry::{EventBus, Reaction, Subscription, SubscriptionId};
