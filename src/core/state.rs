//! Match state: players, card instances, zones and turn bookkeeping.
//!
//! `MatchState` is the data the engine mutates. Reading is public; every
//! mutator is crate-private so that only game actions (under direction of
//! the ability resolver and pipeline) change it.
//!
//! ## Derived card properties
//!
//! A card's *effective* type, power and keywords are computed on demand,
//! never stored:
//! - effective type is `Upgrade` while the card has a parent, otherwise the
//!   printed type
//! - effective power is printed power plus the power granted by attached
//!   upgrades
//! - keyword values are the card's own keywords (only while unattached)
//!   plus the keywords granted by attached upgrades
//!
//! Because nothing is cached, detaching an upgrade reverts both its own
//! type and the bonuses its former parent had.

use std::sync::Arc;

use rustc_hash::FxHashMap;

use crate::cards::{CardDefinition, CardId, CardInstance, CardType, Keyword, Token};
use crate::error::EngineError;
use crate::zones::{ZoneManager, ZonePosition};

use super::config::{PhaseKind, Zone, ZoneKey};
use super::entity::EntityId;
use super::player::{Player, PlayerId, PlayerPair};
use super::rng::GameRng;

/// Full state of one match.
#[derive(Clone, Debug)]
pub struct MatchState {
    players: PlayerPair<Player>,
    cards: FxHashMap<EntityId, CardInstance>,
    zones: ZoneManager,
    definitions: FxHashMap<CardId, Arc<CardDefinition>>,
    active_player: PlayerId,
    round: u32,
    phase: Option<PhaseKind>,
    rng: GameRng,
    next_entity_id: u32,
}

impl MatchState {
    /// Create an empty match state.
    #[must_use]
    pub fn new(first_player: PlayerId, seed: u64) -> Self {
        Self {
            players: PlayerPair::new(Player::new),
            cards: FxHashMap::default(),
            zones: ZoneManager::new(),
            definitions: FxHashMap::default(),
            active_player: first_player,
            round: 1,
            phase: None,
            rng: GameRng::new(seed),
            next_entity_id: 1,
        }
    }

    // === Players and turn ===

    /// Get a player's record.
    #[must_use]
    pub fn player(&self, player: PlayerId) -> &Player {
        &self.players[player]
    }

    /// Both players.
    #[must_use]
    pub fn players(&self) -> &PlayerPair<Player> {
        &self.players
    }

    /// The player whose turn it is.
    #[must_use]
    pub const fn active_player(&self) -> PlayerId {
        self.active_player
    }

    /// Current round, starting at 1.
    #[must_use]
    pub const fn round(&self) -> u32 {
        self.round
    }

    /// Phase currently running, if any.
    #[must_use]
    pub const fn phase(&self) -> Option<PhaseKind> {
        self.phase
    }

    /// The shuffle stream.
    #[must_use]
    pub fn rng(&self) -> &GameRng {
        &self.rng
    }

    pub(crate) fn player_mut(&mut self, player: PlayerId) -> &mut Player {
        &mut self.players[player]
    }

    pub(crate) fn set_phase(&mut self, phase: Option<PhaseKind>) {
        self.phase = phase;
    }

    /// Hand the turn to the other player and start a new round.
    pub(crate) fn end_round(&mut self) {
        for player in PlayerId::both() {
            self.players[player].reset_turn_flags();
        }
        self.active_player = self.active_player.opponent();
        self.round += 1;
    }

    // === Definitions ===

    /// Cache a definition for the rest of the match.
    pub(crate) fn register_definition(&mut self, definition: Arc<CardDefinition>) {
        self.definitions.entry(definition.id.clone()).or_insert(definition);
    }

    /// Look up a cached definition by catalog identity.
    #[must_use]
    pub fn definition_for(&self, card_id: &CardId) -> Option<&Arc<CardDefinition>> {
        self.definitions.get(card_id)
    }

    /// Definition behind a card instance.
    pub fn definition(&self, entity: EntityId) -> Result<&Arc<CardDefinition>, EngineError> {
        let card = self.card(entity).ok_or(EngineError::UnknownEntity(entity))?;
        self.definitions
            .get(&card.card_id)
            .ok_or_else(|| EngineError::UnknownCard(card.card_id.clone()))
    }

    // === Cards and zones ===

    /// Get a card instance.
    #[must_use]
    pub fn card(&self, entity: EntityId) -> Option<&CardInstance> {
        self.cards.get(&entity)
    }

    /// All card instances, ordered by entity id.
    #[must_use]
    pub fn cards(&self) -> Vec<&CardInstance> {
        let mut cards: Vec<_> = self.cards.values().collect();
        cards.sort_by_key(|c| c.entity_id);
        cards
    }

    pub(crate) fn card_mut(&mut self, entity: EntityId) -> Result<&mut CardInstance, EngineError> {
        self.cards.get_mut(&entity).ok_or(EngineError::UnknownEntity(entity))
    }

    /// The zone manager.
    #[must_use]
    pub fn zones(&self) -> &ZoneManager {
        &self.zones
    }

    /// Cards in one of a player's zones, bottom to top.
    #[must_use]
    pub fn cards_in(&self, owner: PlayerId, zone: Zone) -> &[EntityId] {
        self.zones.cards_in_zone(ZoneKey::new(owner, zone))
    }

    /// First copy of `card_id` in a player's zone.
    #[must_use]
    pub fn find(&self, owner: PlayerId, zone: Zone, card_id: &CardId) -> Option<EntityId> {
        self.cards_in(owner, zone)
            .iter()
            .copied()
            .find(|id| self.cards.get(id).is_some_and(|c| &c.card_id == card_id))
    }

    /// Is the card in either play area?
    #[must_use]
    pub fn in_play(&self, entity: EntityId) -> bool {
        self.cards
            .get(&entity)
            .is_some_and(|c| c.zone.zone == Zone::PlayArea)
    }

    /// Create a card instance in a zone. The definition must already be cached.
    pub(crate) fn create_card(
        &mut self,
        card_id: &CardId,
        owner: PlayerId,
        zone: ZoneKey,
    ) -> Result<EntityId, EngineError> {
        if !self.definitions.contains_key(card_id) {
            return Err(EngineError::UnknownCard(card_id.clone()));
        }
        let entity = EntityId(self.next_entity_id);
        self.next_entity_id += 1;
        self.cards
            .insert(entity, CardInstance::new(entity, card_id.clone(), owner, zone));
        self.zones.add_to_zone(entity, zone, ZonePosition::Top);
        Ok(entity)
    }

    /// Move a card, keeping the instance and the zone manager in step.
    pub(crate) fn move_card(
        &mut self,
        entity: EntityId,
        to: ZoneKey,
        position: ZonePosition,
    ) -> Result<ZoneKey, EngineError> {
        let card = self.cards.get_mut(&entity).ok_or(EngineError::UnknownEntity(entity))?;
        let from = self
            .zones
            .move_to_zone(entity, to, position)
            .ok_or(EngineError::UnknownEntity(entity))?;
        card.zone = to;
        Ok(from)
    }

    /// Move a whole zone onto another (discard into deck).
    pub(crate) fn move_zone(&mut self, from: ZoneKey, to: ZoneKey) -> usize {
        let moving = self.zones.cards_in_zone(from).to_vec();
        for entity in &moving {
            if let Some(card) = self.cards.get_mut(entity) {
                card.zone = to;
            }
        }
        self.zones.move_all(from, to)
    }

    pub(crate) fn shuffle(&mut self, zone: ZoneKey) {
        self.zones.shuffle_zone(zone, &mut self.rng);
    }

    // === Derived properties ===

    /// Verify the attachment invariant for one card.
    ///
    /// A card with a parent must sit in a play area, and its parent must be
    /// a known, unattached card in that same play area.
    pub fn check_attachment(&self, entity: EntityId) -> Result<(), EngineError> {
        let card = self.card(entity).ok_or(EngineError::UnknownEntity(entity))?;
        let Some(parent_id) = card.parent else {
            return Ok(());
        };
        let fault = EngineError::InconsistentAttachment {
            card: entity,
            parent: parent_id,
        };
        let Some(parent) = self.card(parent_id) else {
            return Err(fault);
        };
        if card.zone.zone != Zone::PlayArea || parent.zone != card.zone || parent.parent.is_some() {
            return Err(fault);
        }
        Ok(())
    }

    /// Cards attached to `entity`, in play-area order.
    pub fn attached_to(&self, entity: EntityId) -> Result<Vec<EntityId>, EngineError> {
        let card = self.card(entity).ok_or(EngineError::UnknownEntity(entity))?;
        let attached: Vec<_> = self
            .zones
            .cards_in_zone(card.zone)
            .iter()
            .copied()
            .filter(|id| self.cards.get(id).and_then(|c| c.parent) == Some(entity))
            .collect();
        for id in &attached {
            self.check_attachment(*id)?;
        }
        Ok(attached)
    }

    /// The type a card currently counts as.
    pub fn effective_type(&self, entity: EntityId) -> Result<CardType, EngineError> {
        self.check_attachment(entity)?;
        let card = self.card(entity).ok_or(EngineError::UnknownEntity(entity))?;
        if card.is_attached() {
            return Ok(CardType::Upgrade);
        }
        Ok(self.definition(entity)?.card_type)
    }

    /// Is the card an in-play creature right now?
    pub fn is_creature_in_play(&self, entity: EntityId) -> Result<bool, EngineError> {
        Ok(self.in_play(entity) && self.effective_type(entity)? == CardType::Creature)
    }

    /// Printed power plus upgrade grants plus power counters.
    pub fn effective_power(&self, entity: EntityId) -> Result<i64, EngineError> {
        let mut power = self.definition(entity)?.power;
        for upgrade in self.attached_to(entity)? {
            power += self.definition(upgrade)?.grants.power;
        }
        if let Some(card) = self.card(entity) {
            power += card.tokens(Token::Power);
        }
        Ok(power)
    }

    /// Current value of a keyword on a card.
    pub fn keyword_value(&self, entity: EntityId, keyword: Keyword) -> Result<i64, EngineError> {
        self.check_attachment(entity)?;
        let card = self.card(entity).ok_or(EngineError::UnknownEntity(entity))?;
        let mut value = if card.is_attached() {
            0
        } else {
            self.definition(entity)?.keywords.get(&keyword).copied().unwrap_or(0)
        };
        for upgrade in self.attached_to(entity)? {
            value += self
                .definition(upgrade)?
                .grants
                .keywords
                .get(&keyword)
                .copied()
                .unwrap_or(0);
        }
        Ok(value)
    }

    /// Damage still needed to destroy a creature.
    pub fn remaining_health(&self, entity: EntityId) -> Result<i64, EngineError> {
        let damage = self
            .card(entity)
            .ok_or(EngineError::UnknownEntity(entity))?
            .tokens(Token::Damage);
        Ok(self.effective_power(entity)? - damage)
    }
}
