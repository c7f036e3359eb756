//! Game log: `(template, positional args)` messages for human-readable
//! rendering.
//!
//! The engine emits one message per resolved event, per fired continuation
//! and per fizzled ability. Messages are observational only; nothing reads
//! them back into game state.

use std::borrow::Cow;

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PlayerId};

/// One positional argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MessageArg {
    Player(PlayerId),
    Card { entity: EntityId, name: String },
    Amount(u32),
    Text(Cow<'static, str>),
    /// Placeholder for an absent argument.
    Empty,
}

impl std::fmt::Display for MessageArg {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Player(p) => write!(f, "{p}"),
            Self::Card { name, .. } => f.write_str(name),
            Self::Amount(n) => write!(f, "{n}"),
            Self::Text(text) => f.write_str(text),
            Self::Empty => Ok(()),
        }
    }
}

/// A log entry.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameMessage {
    pub template: Cow<'static, str>,
    pub args: SmallVec<[MessageArg; 4]>,
}

impl GameMessage {
    pub fn new(template: impl Into<Cow<'static, str>>) -> Self {
        Self {
            template: template.into(),
            args: SmallVec::new(),
        }
    }

    #[must_use]
    pub fn with_arg(mut self, arg: MessageArg) -> Self {
        self.args.push(arg);
        self
    }

    /// Fill `{n}` placeholders with the positional args.
    ///
    /// ```
    /// use amber_engine::core::PlayerId;
    /// use amber_engine::game::{GameMessage, MessageArg};
    ///
    /// let message = GameMessage::new("{0} gains {1}")
    ///     .with_arg(MessageArg::Player(PlayerId::FIRST))
    ///     .with_arg(MessageArg::Amount(2));
    /// assert_eq!(message.render(), "Player 1 gains 2");
    /// ```
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = self.template.to_string();
        for (i, arg) in self.args.iter().enumerate() {
            out = out.replace(&format!("{{{i}}}"), &arg.to_string());
        }
        out
    }
}

/// Receives every message as it is logged.
pub trait MessageSink: Send {
    fn emit(&mut self, message: &GameMessage);
}

impl<F: FnMut(&GameMessage) + Send> MessageSink for F {
    fn emit(&mut self, message: &GameMessage) {
        self(message);
    }
}

/// Messages logged so far, plus an optional live sink.
#[derive(Default)]
pub struct GameLog {
    messages: Vector<GameMessage>,
    sink: Option<Box<dyn MessageSink>>,
}

impl GameLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Forward messages to `sink` as they arrive.
    #[must_use]
    pub fn with_sink(mut self, sink: Box<dyn MessageSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub(crate) fn push(&mut self, message: GameMessage) {
        tracing::trace!(template = %message.template, "log");
        if let Some(sink) = self.sink.as_mut() {
            sink.emit(&message);
        }
        self.messages.push_back(message);
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameMessage> {
        self.messages.iter()
    }

    /// Messages with a given template, in order.
    pub fn with_template<'a>(&'a self, template: &'a str) -> impl Iterator<Item = &'a GameMessage> {
        self.messages.iter().filter(move |m| m.template == template)
    }

    #[must_use]
    pub fn last(&self) -> Option<&GameMessage> {
        self.messages.last()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

impl std::fmt::Debug for GameLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameLog")
            .field("messages", &self.messages.len())
            .field("sink", &self.sink.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn test_render_positional() {
        let message = GameMessage::new("{0} uses {1} to steal 1 amber from {3}")
            .with_arg(MessageArg::Player(PlayerId::FIRST))
            .with_arg(MessageArg::Card {
                entity: EntityId(4),
                name: "Relentless Whispers".into(),
            })
            .with_arg(MessageArg::Empty)
            .with_arg(MessageArg::Player(PlayerId::SECOND));

        assert_eq!(
            message.render(),
            "Player 1 uses Relentless Whispers to steal 1 amber from Player 2"
        );
    }

    #[test]
    fn test_sink_receives_messages() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink_seen = Arc::clone(&seen);
        let mut log = GameLog::new().with_sink(Box::new(move |m: &GameMessage| {
            sink_seen.lock().unwrap().push(m.template.to_string());
        }));

        log.push(GameMessage::new("a"));
        log.push(GameMessage::new("b"));

        assert_eq!(*seen.lock().unwrap(), vec!["a", "b"]);
        assert_eq!(log.len(), 2);
        assert_eq!(log.with_template("b").count(), 1);
        assert_eq!(log.last().unwrap().template, "b");
    }
}
