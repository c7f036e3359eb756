//! Ability declarations.
//!
//! An ability is data: a trigger, an `Effect` (target spec plus action) and
//! an optional `then` continuation. Card definitions share declarations
//! across every copy through `Arc`, and the resolver interprets them
//! uniformly, so card-specific behavior is limited to the target
//! predicates, action parameters, conditions and message templates supplied
//! here.
//!
//! ## Example
//!
//! "Deal 2 damage to an enemy creature. If this destroys it, steal 1":
//!
//! ```
//! use amber_engine::effects::{AbilityDeclaration, Effect, GameAction, MessageRef, TargetSpec, ThenClause};
//!
//! let ability = AbilityDeclaration::play(
//!     "whispers",
//!     Effect::new(GameAction::DealDamage { amount: 2 })
//!         .with_target(TargetSpec::enemy_creature())
//!         .then(
//!             ThenClause::new(Effect::new(GameAction::Steal { amount: 1 }))
//!                 .when(|ctx| {
//!                     ctx.pre_then_event
//!                         .destroy_event()
//!                         .is_some_and(|destroy| destroy.destroyed_by_damage_dealt())
//!                 })
//!                 .with_message("{0} uses {1} to steal 1 amber from {3}", [MessageRef::Opponent]),
//!         ),
//! );
//!
//! assert!(ability.effect.then.is_some());
//! ```

use std::borrow::Cow;
use std::sync::Arc;

use crate::core::{EntityId, MatchState, PlayerId};
use crate::triggers::{EventId, EventKind, ResolvedEvent, TriggerCondition};

use super::action::GameAction;
use super::targeting::TargetSpec;

/// When an ability fires.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AbilityTrigger {
    /// When the card is played.
    Play,
    /// While the card is in play, on every matching event.
    Reaction {
        event: EventKind,
        condition: TriggerCondition,
    },
}

/// A declared ability.
#[derive(Clone, Debug)]
pub struct AbilityDeclaration {
    pub name: String,
    pub trigger: AbilityTrigger,
    /// Optional abilities ask their controller before resolving.
    pub optional: bool,
    pub effect: Effect,
}

impl AbilityDeclaration {
    /// An ability that fires when its card is played.
    pub fn play(name: impl Into<String>, effect: Effect) -> Self {
        Self {
            name: name.into(),
            trigger: AbilityTrigger::Play,
            optional: false,
            effect,
        }
    }

    /// An ability that reacts to events while its card is in play.
    pub fn reaction(
        name: impl Into<String>,
        event: EventKind,
        condition: TriggerCondition,
        effect: Effect,
    ) -> Self {
        Self {
            name: name.into(),
            trigger: AbilityTrigger::Reaction { event, condition },
            optional: false,
            effect,
        }
    }

    /// Ask before resolving (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// One action with its target and continuation.
#[derive(Clone, Debug)]
pub struct Effect {
    pub target: TargetSpec,
    pub action: GameAction,
    pub then: Option<Arc<ThenClause>>,
}

impl Effect {
    /// Effect on the action's default target.
    #[must_use]
    pub fn new(action: GameAction) -> Self {
        Self {
            target: action.default_target(),
            action,
            then: None,
        }
    }

    /// Override the target (builder pattern).
    #[must_use]
    pub fn with_target(mut self, target: TargetSpec) -> Self {
        self.target = target;
        self
    }

    /// Attach a continuation (builder pattern).
    #[must_use]
    pub fn then(mut self, clause: ThenClause) -> Self {
        self.then = Some(Arc::new(clause));
        self
    }
}

/// Predicate over the resolved outcome of the preceding action.
pub type ThenCondition = Arc<dyn Fn(&ThenContext<'_>) -> bool + Send + Sync>;

/// A follow-up that runs once the preceding event resolved.
#[derive(Clone)]
pub struct ThenClause {
    /// `None` always fires.
    pub condition: Option<ThenCondition>,
    pub message: Option<MessageTemplate>,
    pub effect: Effect,
}

impl ThenClause {
    #[must_use]
    pub fn new(effect: Effect) -> Self {
        Self {
            condition: None,
            message: None,
            effect,
        }
    }

    /// Fire only when `condition` holds (builder pattern).
    #[must_use]
    pub fn when(mut self, condition: impl Fn(&ThenContext<'_>) -> bool + Send + Sync + 'static) -> Self {
        self.condition = Some(Arc::new(condition));
        self
    }

    /// Log a message when the continuation fires (builder pattern).
    #[must_use]
    pub fn with_message(
        mut self,
        template: impl Into<Cow<'static, str>>,
        extra: impl IntoIterator<Item = MessageRef>,
    ) -> Self {
        self.message = Some(MessageTemplate {
            template: template.into(),
            extra: extra.into_iter().collect(),
        });
        self
    }
}

impl std::fmt::Debug for ThenClause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ThenClause")
            .field("conditional", &self.condition.is_some())
            .field("message", &self.message)
            .field("effect", &self.effect)
            .finish()
    }
}

/// Positional message template.
///
/// Arguments `{0}`, `{1}` and `{2}` are always the acting player, the
/// source card and the preceding event's target. `extra` fills `{3}` on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MessageTemplate {
    pub template: Cow<'static, str>,
    pub extra: Vec<MessageRef>,
}

/// Extra message arguments, filled from the resolution context.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MessageRef {
    Opponent,
    /// Amount applied by the preceding event.
    Amount,
    Text(Cow<'static, str>),
}

/// What a `then` condition sees.
pub struct ThenContext<'a> {
    pub player: PlayerId,
    pub opponent: PlayerId,
    pub source: Option<EntityId>,
    /// The event produced by the preceding action, resolved.
    pub pre_then_event: ResolvedEvent<'a>,
    pub state: &'a MatchState,
}

/// Per-resolution context threaded through an ability.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Context {
    pub player: PlayerId,
    pub source: Option<EntityId>,
    /// Event produced by the preceding action in this chain.
    pub pre_then_event: Option<EventId>,
    /// Event this reaction responds to.
    pub triggering_event: Option<EventId>,
}

impl Context {
    #[must_use]
    pub const fn new(player: PlayerId, source: Option<EntityId>) -> Self {
        Self {
            player,
            source,
            pre_then_event: None,
            triggering_event: None,
        }
    }

    #[must_use]
    pub const fn triggered_by(mut self, event: EventId) -> Self {
        self.triggering_event = Some(event);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_defaults_target_from_action() {
        assert_eq!(
            Effect::new(GameAction::Steal { amount: 1 }).target,
            TargetSpec::opponent()
        );
        assert_eq!(
            Effect::new(GameAction::DealDamage { amount: 1 }).target,
            TargetSpec::creature()
        );
    }

    #[test]
    fn test_declaration_builders() {
        let ability = AbilityDeclaration::reaction(
            "gain",
            EventKind::CardDestroyed,
            TriggerCondition::Always,
            Effect::new(GameAction::GainAmber { amount: 1 }),
        )
        .optional();

        assert!(ability.optional);
        assert!(matches!(
            ability.trigger,
            AbilityTrigger::Reaction { event: EventKind::CardDestroyed, .. }
        ));
    }

    #[test]
    fn test_then_clause_debug_hides_closure() {
        let clause = ThenClause::new(Effect::new(GameAction::Draw { count: 1 }))
            .when(|_| true)
            .with_message("{0} draws", []);

        let text = format!("{:?}", clause);
        assert!(text.contains("conditional: true"));
        assert_eq!(clause.message.unwrap().template, "{0} draws");
    }

    #[test]
    fn test_context() {
        let ctx = Context::new(PlayerId::FIRST, Some(EntityId(3))).triggered_by(EventId(7));
        assert_eq!(ctx.triggering_event, Some(EventId(7)));
        assert_eq!(ctx.pre_then_event, None);
    }
}
