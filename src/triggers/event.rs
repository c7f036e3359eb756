//! Game events and the causal event log.
//!
//! Every game action produces a `GameEvent`. The engine records each event
//! in an `EventLog` arena as an `EventRecord`, linked to the event that was
//! in flight when it was raised. A lethal `DamageDealt` therefore owns a
//! child `CardDestroyed` record, flagged `destroyed_by_damage_dealt`.
//!
//! ## Resolution
//!
//! A record starts `resolved == false`. It flips to `true` only after the
//! action applied, every nested child resolved and every reaction
//! dispatched for it ran to completion. Code that inspects outcomes
//! (then-conditions, tests) goes through `ResolvedEvent`, which:
//! - can only be obtained for a resolved record
//! - only hands out children that are themselves resolved
//!
//! so reading a half-finished outcome is not expressible.

use im::Vector;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::core::{EntityId, PhaseKind, PlayerId, Target, ZoneKey};

/// Index of an event in the match's `EventLog`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct EventId(pub u32);

impl EventId {
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for EventId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Event#{}", self.0)
    }
}

/// The named kinds of event the engine raises.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventKind {
    CardPlayed,
    DamageDealt,
    CardDestroyed,
    CardsDrawn,
    AmberStolen,
    AmberCaptured,
    AmberGained,
    AmberLost,
    KeyForged,
    CardMoved,
    UpgradeDetached,
    PhaseStarted,
    PhaseEnded,
    RoundEnded,
    TurnEndDeclared,
}

impl EventKind {
    /// Snake-case event name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CardPlayed => "card_played",
            Self::DamageDealt => "damage_dealt",
            Self::CardDestroyed => "card_destroyed",
            Self::CardsDrawn => "cards_drawn",
            Self::AmberStolen => "amber_stolen",
            Self::AmberCaptured => "amber_captured",
            Self::AmberGained => "amber_gained",
            Self::AmberLost => "amber_lost",
            Self::KeyForged => "key_forged",
            Self::CardMoved => "card_moved",
            Self::UpgradeDetached => "upgrade_detached",
            Self::PhaseStarted => "phase_started",
            Self::PhaseEnded => "phase_ended",
            Self::RoundEnded => "round_ended",
            Self::TurnEndDeclared => "turn_end_declared",
        }
    }

    /// Log template emitted when an event of this kind resolves.
    #[must_use]
    pub const fn template(self) -> &'static str {
        match self {
            Self::CardPlayed => "event.card_played",
            Self::DamageDealt => "event.damage_dealt",
            Self::CardDestroyed => "event.card_destroyed",
            Self::CardsDrawn => "event.cards_drawn",
            Self::AmberStolen => "event.amber_stolen",
            Self::AmberCaptured => "event.amber_captured",
            Self::AmberGained => "event.amber_gained",
            Self::AmberLost => "event.amber_lost",
            Self::KeyForged => "event.key_forged",
            Self::CardMoved => "event.card_moved",
            Self::UpgradeDetached => "event.upgrade_detached",
            Self::PhaseStarted => "event.phase_started",
            Self::PhaseEnded => "event.phase_ended",
            Self::RoundEnded => "event.round_ended",
            Self::TurnEndDeclared => "event.turn_end_declared",
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters of something that happened.
///
/// `amount` starts as the requested amount and is overwritten with the
/// amount actually applied once the action runs (a steal of 2 from a pool
/// of 1 records 1).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameEvent {
    pub kind: EventKind,

    /// Acting player, or the player the event is about.
    pub player: Option<PlayerId>,

    /// Card that caused the event.
    pub source: Option<EntityId>,

    /// Card or player affected.
    pub target: Option<Target>,

    pub amount: u32,

    pub zone_from: Option<ZoneKey>,
    pub zone_to: Option<ZoneKey>,

    pub phase: Option<PhaseKind>,

    /// Creature a played card attaches to.
    pub parent_card: Option<EntityId>,

    /// Set on a `CardDestroyed` raised by lethal damage.
    pub destroyed_by_damage_dealt: bool,
}

impl GameEvent {
    /// Create an event with no parameters.
    #[must_use]
    pub const fn new(kind: EventKind) -> Self {
        Self {
            kind,
            player: None,
            source: None,
            target: None,
            amount: 0,
            zone_from: None,
            zone_to: None,
            phase: None,
            parent_card: None,
            destroyed_by_damage_dealt: false,
        }
    }

    #[must_use]
    pub fn with_player(mut self, player: PlayerId) -> Self {
        self.player = Some(player);
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: Option<EntityId>) -> Self {
        self.source = source;
        self
    }

    #[must_use]
    pub fn with_target(mut self, target: Option<Target>) -> Self {
        self.target = target;
        self
    }

    #[must_use]
    pub fn with_amount(mut self, amount: u32) -> Self {
        self.amount = amount;
        self
    }

    #[must_use]
    pub fn with_zones(mut self, from: Option<ZoneKey>, to: ZoneKey) -> Self {
        self.zone_from = from;
        self.zone_to = Some(to);
        self
    }

    #[must_use]
    pub fn with_phase(mut self, phase: PhaseKind) -> Self {
        self.phase = Some(phase);
        self
    }

    #[must_use]
    pub fn with_parent_card(mut self, parent: Option<EntityId>) -> Self {
        self.parent_card = parent;
        self
    }

    /// Mark a destroy as caused by damage.
    #[must_use]
    pub fn by_damage(mut self) -> Self {
        self.destroyed_by_damage_dealt = true;
        self
    }

    // === Constructors ===

    #[must_use]
    pub fn phase_started(phase: PhaseKind, active: PlayerId) -> Self {
        Self::new(EventKind::PhaseStarted).with_phase(phase).with_player(active)
    }

    #[must_use]
    pub fn phase_ended(phase: PhaseKind, active: PlayerId) -> Self {
        Self::new(EventKind::PhaseEnded).with_phase(phase).with_player(active)
    }

    #[must_use]
    pub fn round_ended(active: PlayerId) -> Self {
        Self::new(EventKind::RoundEnded).with_player(active)
    }

    #[must_use]
    pub fn turn_end_declared(player: PlayerId) -> Self {
        Self::new(EventKind::TurnEndDeclared).with_player(player)
    }

    /// Card target, if the event is about a card.
    #[must_use]
    pub fn target_card(&self) -> Option<EntityId> {
        self.target.and_then(Target::card)
    }
}

/// What applying an event's action did.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventOutcome {
    /// Not applied yet.
    Pending,
    /// The action changed the match.
    Applied,
    /// The action could not affect its target; nothing changed.
    NoEffect,
}

/// An event together with its causal links and resolution state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EventId,
    pub event: GameEvent,
    /// Event that was in flight when this one was raised.
    pub parent: Option<EventId>,
    /// Events raised while this one was in flight, in raise order.
    pub children: SmallVec<[EventId; 2]>,
    pub resolved: bool,
    pub outcome: EventOutcome,
}

/// Arena of every event raised in a match.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventLog {
    records: Vector<EventRecord>,
}

impl EventLog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new, unresolved event and link it under `parent`.
    pub(crate) fn open(&mut self, event: GameEvent, parent: Option<EventId>) -> EventId {
        let id = EventId(self.records.len() as u32);
        if let Some(parent_record) = parent.and_then(|p| self.records.get_mut(p.0 as usize)) {
            parent_record.children.push(id);
        }
        self.records.push_back(EventRecord {
            id,
            event,
            parent,
            children: SmallVec::new(),
            resolved: false,
            outcome: EventOutcome::Pending,
        });
        id
    }

    /// Store what applying the event did.
    pub(crate) fn set_outcome(&mut self, id: EventId, outcome: EventOutcome, amount: u32) {
        if let Some(record) = self.records.get_mut(id.0 as usize) {
            record.outcome = outcome;
            record.event.amount = amount;
        }
    }

    pub(crate) fn mark_resolved(&mut self, id: EventId) {
        if let Some(record) = self.records.get_mut(id.0 as usize) {
            record.resolved = true;
        }
    }

    /// Raw record, resolved or not.
    #[must_use]
    pub fn get(&self, id: EventId) -> Option<&EventRecord> {
        self.records.get(id.0 as usize)
    }

    /// A view of the event, if it has resolved.
    #[must_use]
    pub fn resolved(&self, id: EventId) -> Option<ResolvedEvent<'_>> {
        self.get(id)
            .filter(|r| r.resolved)
            .map(|record| ResolvedEvent { log: self, record })
    }

    /// All records in raise order.
    pub fn iter(&self) -> impl Iterator<Item = &EventRecord> {
        self.records.iter()
    }

    /// Records raised at or after position `start`, in raise order.
    pub fn since(&self, start: usize) -> impl Iterator<Item = &EventRecord> {
        (start..self.records.len()).filter_map(move |i| self.records.get(i))
    }

    /// Records of one kind, in raise order.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &EventRecord> {
        self.records.iter().filter(move |r| r.event.kind == kind)
    }

    /// Most recent record of a kind.
    #[must_use]
    pub fn last_of(&self, kind: EventKind) -> Option<&EventRecord> {
        self.records.iter().rev().find(|r| r.event.kind == kind)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Read-only view of a resolved event.
#[derive(Clone, Copy, Debug)]
pub struct ResolvedEvent<'a> {
    log: &'a EventLog,
    record: &'a EventRecord,
}

impl<'a> ResolvedEvent<'a> {
    #[must_use]
    pub fn id(&self) -> EventId {
        self.record.id
    }

    #[must_use]
    pub fn kind(&self) -> EventKind {
        self.record.event.kind
    }

    #[must_use]
    pub fn event(&self) -> &'a GameEvent {
        &self.record.event
    }

    #[must_use]
    pub fn amount(&self) -> u32 {
        self.record.event.amount
    }

    #[must_use]
    pub fn target(&self) -> Option<Target> {
        self.record.event.target
    }

    #[must_use]
    pub fn outcome(&self) -> EventOutcome {
        self.record.outcome
    }

    /// Did the action change anything?
    #[must_use]
    pub fn had_effect(&self) -> bool {
        self.record.outcome == EventOutcome::Applied
    }

    #[must_use]
    pub fn destroyed_by_damage_dealt(&self) -> bool {
        self.record.event.destroyed_by_damage_dealt
    }

    /// Resolved children, in raise order.
    pub fn children(&self) -> impl Iterator<Item = ResolvedEvent<'a>> + 'a {
        let log = self.log;
        self.record
            .children
            .iter()
            .filter_map(move |&id| log.resolved(id))
    }

    /// First resolved child of a kind.
    #[must_use]
    pub fn child(&self, kind: EventKind) -> Option<ResolvedEvent<'a>> {
        self.children().find(|c| c.kind() == kind)
    }

    /// The nested destroy, if this event destroyed its target.
    #[must_use]
    pub fn destroy_event(&self) -> Option<ResolvedEvent<'a>> {
        self.child(EventKind::CardDestroyed)
    }
}
