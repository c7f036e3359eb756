//! Event bus: the dispatch table for reactive abilities.
//!
//! Cards in play subscribe their reaction abilities to event kinds. When an
//! event is raised, the resolver takes a snapshot of the handlers registered
//! for its kind at that moment, and dispatches them in subscription order
//! once the event's own action has applied.
//!
//! The bus also keeps the in-flight event stack: the chain of events that
//! are raised but not yet resolved. A newly raised event is nested under
//! the top of that stack, which is how a lethal damage event ends up owning
//! the destroy it caused.
//!
//! The bus holds no game state.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::{EntityId, PlayerId};
use crate::effects::{AbilityDeclaration, AbilityTrigger};

use super::condition::TriggerCondition;
use super::event::{EventId, EventKind};

/// Unique identifier for a subscription.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub u32);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Subscription({})", self.0)
    }
}

/// A reaction ability listening for one event kind.
#[derive(Clone, Debug)]
pub struct Subscription {
    pub id: SubscriptionId,
    pub event: EventKind,
    /// Card the reaction belongs to. `None` for match-level handlers.
    pub source: Option<EntityId>,
    /// Player who resolves the reaction.
    pub controller: PlayerId,
    pub condition: TriggerCondition,
    pub ability: Arc<AbilityDeclaration>,
}

/// An ability queued to resolve in reaction to an event.
#[derive(Clone, Debug)]
pub enum Reaction {
    /// A bus subscription, looked up again when its turn comes.
    Subscribed(SubscriptionId),
    /// An ability granted by the event itself (a played card's own abilities).
    Own {
        ability: Arc<AbilityDeclaration>,
        source: EntityId,
        controller: PlayerId,
    },
}

/// Dispatch table plus in-flight event stack.
#[derive(Clone, Debug, Default)]
pub struct EventBus {
    subscriptions: FxHashMap<SubscriptionId, Subscription>,

    /// Index by event kind for fast lookup.
    by_event: FxHashMap<EventKind, Vec<SubscriptionId>>,

    next_id: u32,

    /// Raised but unresolved events, outermost first.
    in_flight: Vec<EventId>,
}

impl EventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for an event kind.
    pub fn subscribe(
        &mut self,
        event: EventKind,
        source: Option<EntityId>,
        controller: PlayerId,
        condition: TriggerCondition,
        ability: Arc<AbilityDeclaration>,
    ) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.by_event.entry(event).or_default().push(id);
        self.subscriptions.insert(
            id,
            Subscription {
                id,
                event,
                source,
                controller,
                condition,
                ability,
            },
        );
        id
    }

    /// Subscribe a card's reaction ability. Returns `None` for non-reactions.
    pub fn subscribe_ability(
        &mut self,
        source: EntityId,
        controller: PlayerId,
        ability: &Arc<AbilityDeclaration>,
    ) -> Option<SubscriptionId> {
        let AbilityTrigger::Reaction { event, condition } = &ability.trigger else {
            return None;
        };
        Some(self.subscribe(*event, Some(source), controller, condition.clone(), Arc::clone(ability)))
    }

    /// Remove a subscription.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> Option<Subscription> {
        let subscription = self.subscriptions.remove(&id)?;
        if let Some(list) = self.by_event.get_mut(&subscription.event) {
            list.retain(|&s| s != id);
            if list.is_empty() {
                self.by_event.remove(&subscription.event);
            }
        }
        Some(subscription)
    }

    /// Remove every subscription owned by a card. Returns how many went.
    pub fn remove_for_source(&mut self, source: EntityId) -> usize {
        let to_remove: Vec<_> = self
            .subscriptions
            .values()
            .filter(|s| s.source == Some(source))
            .map(|s| s.id)
            .collect();
        for id in &to_remove {
            self.unsubscribe(*id);
        }
        to_remove.len()
    }

    /// Handlers registered for a kind right now, in subscription order.
    #[must_use]
    pub fn handlers_for(&self, event: EventKind) -> Vec<SubscriptionId> {
        let mut ids = self.by_event.get(&event).cloned().unwrap_or_default();
        ids.sort_unstable();
        ids
    }

    #[must_use]
    pub fn get(&self, id: SubscriptionId) -> Option<&Subscription> {
        self.subscriptions.get(&id)
    }

    /// Subscriptions owned by a card.
    pub fn for_source(&self, source: EntityId) -> impl Iterator<Item = &Subscription> {
        self.subscriptions
            .values()
            .filter(move |s| s.source == Some(source))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.subscriptions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.subscriptions.is_empty()
    }

    // === In-flight stack ===

    pub(crate) fn push_in_flight(&mut self, event: EventId) {
        self.in_flight.push(event);
    }

    pub(crate) fn pop_in_flight(&mut self) -> Option<EventId> {
        self.in_flight.pop()
    }

    pub(crate) fn clear_in_flight(&mut self) {
        self.in_flight.clear();
    }

    /// Innermost unresolved event.
    #[must_use]
    pub fn current(&self) -> Option<EventId> {
        self.in_flight.last().copied()
    }

    /// Number of unresolved events.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.in_flight.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, GameAction};

    fn reaction(event: EventKind) -> Arc<AbilityDeclaration> {
        Arc::new(AbilityDeclaration::reaction(
            "react",
            event,
            TriggerCondition::Always,
            Effect::new(GameAction::GainAmber { amount: 1 }),
        ))
    }

    #[test]
    fn test_subscribe_and_lookup() {
        let mut bus = EventBus::new();
        let a = bus.subscribe(
            EventKind::RoundEnded,
            Some(EntityId(1)),
            PlayerId::FIRST,
            TriggerCondition::Always,
            reaction(EventKind::RoundEnded),
        );
        let b = bus.subscribe(
            EventKind::RoundEnded,
            Some(EntityId(2)),
            PlayerId::SECOND,
            TriggerCondition::Always,
            reaction(EventKind::RoundEnded),
        );

        assert_eq!(bus.handlers_for(EventKind::RoundEnded), vec![a, b]);
        assert!(bus.handlers_for(EventKind::CardPlayed).is_empty());
        assert_eq!(bus.get(b).unwrap().controller, PlayerId::SECOND);
    }

    #[test]
    fn test_subscribe_ability_skips_play_abilities() {
        let mut bus = EventBus::new();
        let play = Arc::new(AbilityDeclaration::play("draw", Effect::new(GameAction::Draw { count: 1 })));

        assert!(bus.subscribe_ability(EntityId(1), PlayerId::FIRST, &play).is_none());
        assert!(bus
            .subscribe_ability(EntityId(1), PlayerId::FIRST, &reaction(EventKind::CardDestroyed))
            .is_some());
        assert_eq!(bus.len(), 1);
    }

    #[test]
    fn test_remove_for_source() {
        let mut bus = EventBus::new();
        bus.subscribe_ability(EntityId(1), PlayerId::FIRST, &reaction(EventKind::RoundEnded));
        bus.subscribe_ability(EntityId(1), PlayerId::FIRST, &reaction(EventKind::CardPlayed));
        let kept = bus
            .subscribe_ability(EntityId(2), PlayerId::FIRST, &reaction(EventKind::RoundEnded))
            .unwrap();

        assert_eq!(bus.remove_for_source(EntityId(1)), 2);
        assert_eq!(bus.handlers_for(EventKind::RoundEnded), vec![kept]);
        assert!(bus.handlers_for(EventKind::CardPlayed).is_empty());
        assert_eq!(bus.for_source(EntityId(2)).count(), 1);
    }

    #[test]
    fn test_in_flight_stack() {
        let mut bus = EventBus::new();
        assert_eq!(bus.current(), None);

        bus.push_in_flight(EventId(0));
        bus.push_in_flight(EventId(1));
        assert_eq!(bus.current(), Some(EventId(1)));
        assert_eq!(bus.depth(), 2);

        assert_eq!(bus.pop_in_flight(), Some(EventId(1)));
        assert_eq!(bus.current(), Some(EventId(0)));

        bus.clear_in_flight();
        assert_eq!(bus.depth(), 0);
    }
}
