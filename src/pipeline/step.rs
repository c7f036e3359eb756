//! Pipeline steps.

use crate::error::EngineError;
use crate::game::Game;
use crate::triggers::EventKind;

/// Deferred work run against the game when its step is popped.
pub type StepWork = Box<dyn FnOnce(&mut Game) -> Result<(), EngineError> + Send>;

/// A unit of pipeline work.
///
/// A step is consumed once. Anything it raises resolves before the next
/// step of the phase is popped.
pub enum Step {
    /// Run a closure once.
    Simple { label: &'static str, work: StepWork },
    /// Prompt the active player for main actions until an event of kind
    /// `until` resolves.
    Gate {
        label: &'static str,
        until: EventKind,
        /// Event log length at the last check. Each check only reads the
        /// records raised since, so events from before the gate first ran
        /// never close it.
        scanned: Option<usize>,
    },
}

impl Step {
    pub fn simple(
        label: &'static str,
        work: impl FnOnce(&mut Game) -> Result<(), EngineError> + Send + 'static,
    ) -> Self {
        Self::Simple {
            label,
            work: Box::new(work),
        }
    }

    #[must_use]
    pub fn gate(label: &'static str, until: EventKind) -> Self {
        Self::Gate {
            label,
            until,
            scanned: None,
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Simple { label, .. } | Self::Gate { label, .. } => label,
        }
    }
}

impl std::fmt::Debug for Step {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simple { label, .. } => f.debug_tuple("Simple").field(label).finish(),
            Self::Gate { label, until, scanned } => f
                .debug_struct("Gate")
                .field("label", label)
                .field("until", until)
                .field("scanned", scanned)
                .finish(),
        }
    }
}
