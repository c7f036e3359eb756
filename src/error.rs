//! Engine error taxonomy.
//!
//! Two families of failure exist and they are handled differently:
//!
//! - **Player-facing input errors** (`IllegalChoice`, `WrongPlayer`, ...) are
//!   recovered locally. The pending prompt stays open and no state changes.
//! - **Internal faults** (`InconsistentAttachment`, `UnresolvedEvent`, ...)
//!   mean an invariant of the match no longer holds. The current resolution
//!   is aborted and the error is returned to whoever called `Match::advance`.
//!
//! Every variant reports an `ErrorSeverity` so callers can route it without
//! matching on individual variants.

use crate::cards::CardId;
use crate::core::{EntityId, PlayerId};
use crate::game::Choice;
use crate::triggers::EventId;

/// Severity level of an error, used for routing and recovery.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorSeverity {
    /// The caller may retry with a different input.
    Recoverable,
    /// Invalid input or setup; retrying unchanged fails again.
    Validation,
    /// A match invariant was violated. Indicates a bug.
    Internal,
    /// The match cannot continue.
    Fatal,
}

impl ErrorSeverity {
    /// Returns a human-readable description of this severity level.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    /// Returns true if this error indicates an internal bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Errors produced by the match engine.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    #[error("no decision is pending")]
    NotWaitingForInput,

    #[error("a decision is pending; answer it first")]
    AwaitingInput,

    #[error("{submitted} answered a prompt addressed to {expected}")]
    WrongPlayer { submitted: PlayerId, expected: PlayerId },

    #[error("choice {choice:?} is not among the offered options")]
    IllegalChoice { choice: Choice },

    #[error("the match is already over")]
    MatchOver,

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("unknown card definition `{0}`")]
    UnknownCard(CardId),

    #[error("no card instance {0}")]
    UnknownEntity(EntityId),

    #[error("{card} is attached to {parent}, which is not in the same play area")]
    InconsistentAttachment { card: EntityId, parent: EntityId },

    #[error("event {0} was consulted before it resolved")]
    UnresolvedEvent(EventId),

    #[error("more than {limit} events in flight")]
    ResolutionDepthExceeded { limit: usize },

    #[error("snapshot encoding failed: {0}")]
    Snapshot(String),

    #[error("internal resolution fault: {0}")]
    Internal(&'static str),
}

impl EngineError {
    /// Classify this error.
    #[must_use]
    pub const fn severity(&self) -> ErrorSeverity {
        match self {
            Self::NotWaitingForInput
            | Self::AwaitingInput
            | Self::WrongPlayer { .. }
            | Self::IllegalChoice { .. } => ErrorSeverity::Recoverable,
            Self::MatchOver
            | Self::InvalidConfig(_)
            | Self::UnknownCard(_)
            | Self::Snapshot(_) => ErrorSeverity::Validation,
            Self::UnknownEntity(_) | Self::UnresolvedEvent(_) | Self::Internal(_) => {
                ErrorSeverity::Internal
            }
            Self::InconsistentAttachment { .. } | Self::ResolutionDepthExceeded { .. } => {
                ErrorSeverity::Fatal
            }
        }
    }

    /// True for player-facing input errors that leave the prompt open.
    #[must_use]
    pub const fn is_player_facing(&self) -> bool {
        matches!(self.severity(), ErrorSeverity::Recoverable)
    }
}
