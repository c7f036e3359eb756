//! Zone manager for card locations and movement.
//!
//! The `ZoneManager` tracks where every card copy is and in which order.
//! All zones are ordered:
//! - Decks: index 0 is the bottom, the last index is the top
//! - Play areas: entry order (left to right)
//! - Hands and discards: arrival order

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::ZoneKey;
use crate::core::entity::EntityId;
use crate::core::rng::GameRng;

/// Position for inserting a card into a zone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ZonePosition {
    /// Add to the top (end) of the zone.
    Top,
    /// Add to the bottom (start) of the zone.
    Bottom,
    /// Insert at specific index (0 = bottom).
    Index(usize),
}

/// Manages card locations across zones.
///
/// ## Usage
///
/// ```
/// use amber_engine::core::{EntityId, PlayerId, Zone, ZoneKey};
/// use amber_engine::zones::{ZoneManager, ZonePosition};
///
/// let mut manager = ZoneManager::new();
/// let deck = ZoneKey::new(PlayerId::FIRST, Zone::Deck);
/// let hand = ZoneKey::new(PlayerId::FIRST, Zone::Hand);
///
/// manager.add_to_zone(EntityId(10), deck, ZonePosition::Top);
/// manager.add_to_zone(EntityId(11), deck, ZonePosition::Top);
///
/// assert_eq!(manager.top_card(deck), Some(EntityId(11)));
/// manager.move_to_zone(EntityId(11), hand, ZonePosition::Top);
/// assert_eq!(manager.cards_in_zone(hand), &[EntityId(11)]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ZoneManager {
    /// Card locations: entity_id -> zone
    locations: FxHashMap<EntityId, ZoneKey>,

    /// Ordered card lists per zone.
    zone_order: FxHashMap<ZoneKey, Vec<EntityId>>,
}

impl ZoneManager {
    /// Create a new empty zone manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn insert_ordered(&mut self, entity: EntityId, zone: ZoneKey, position: ZonePosition) {
        let order = self.zone_order.entry(zone).or_default();
        match position {
            ZonePosition::Top => order.push(entity),
            ZonePosition::Bottom => order.insert(0, entity),
            ZonePosition::Index(i) => {
                let idx = i.min(order.len());
                order.insert(idx, entity);
            }
        }
    }

    /// Add a card that is not tracked yet.
    ///
    /// Returns `false` (and changes nothing) if the card is already tracked.
    pub fn add_to_zone(&mut self, entity: EntityId, zone: ZoneKey, position: ZonePosition) -> bool {
        if self.locations.contains_key(&entity) {
            return false;
        }
        self.locations.insert(entity, zone);
        self.insert_ordered(entity, zone, position);
        true
    }

    /// Move a card from its current zone to another.
    ///
    /// Returns the old zone, or `None` if the card wasn't found. Moving a
    /// card into the zone it already occupies leaves its position alone.
    pub fn move_to_zone(
        &mut self,
        entity: EntityId,
        new_zone: ZoneKey,
        position: ZonePosition,
    ) -> Option<ZoneKey> {
        let old_zone = self.locations.get(&entity).copied()?;

        if old_zone == new_zone {
            return Some(old_zone);
        }

        if let Some(order) = self.zone_order.get_mut(&old_zone) {
            order.retain(|&e| e != entity);
        }

        self.locations.insert(entity, new_zone);
        self.insert_ordered(entity, new_zone, position);

        Some(old_zone)
    }

    /// Get the zone a card is in.
    #[must_use]
    pub fn get_zone(&self, entity: EntityId) -> Option<ZoneKey> {
        self.locations.get(&entity).copied()
    }

    /// Check if a card is in a specific zone.
    #[must_use]
    pub fn is_in_zone(&self, entity: EntityId, zone: ZoneKey) -> bool {
        self.locations.get(&entity) == Some(&zone)
    }

    /// Cards in a zone, bottom to top.
    #[must_use]
    pub fn cards_in_zone(&self, zone: ZoneKey) -> &[EntityId] {
        self.zone_order.get(&zone).map_or(&[], |v| v.as_slice())
    }

    /// Get the number of cards in a zone.
    #[must_use]
    pub fn zone_size(&self, zone: ZoneKey) -> usize {
        self.cards_in_zone(zone).len()
    }

    /// Get the top card of a zone (last in order).
    #[must_use]
    pub fn top_card(&self, zone: ZoneKey) -> Option<EntityId> {
        self.cards_in_zone(zone).last().copied()
    }

    /// Move every card of `from` onto the top of `to`, keeping their order.
    ///
    /// Returns how many cards moved.
    pub fn move_all(&mut self, from: ZoneKey, to: ZoneKey) -> usize {
        if from == to {
            return 0;
        }
        let moved = self.zone_order.remove(&from).unwrap_or_default();
        let count = moved.len();
        for entity in moved {
            self.locations.insert(entity, to);
            self.insert_ordered(entity, to, ZonePosition::Top);
        }
        count
    }

    /// Shuffle a zone.
    pub fn shuffle_zone(&mut self, zone: ZoneKey, rng: &mut GameRng) {
        if let Some(order) = self.zone_order.get_mut(&zone) {
            rng.shuffle(order);
        }
    }

    /// Get total number of cards tracked.
    #[must_use]
    pub fn total_cards(&self) -> usize {
        self.locations.len()
    }

    /// Check if the manager contains an entity.
    #[must_use]
    pub fn contains(&self, entity: EntityId) -> bool {
        self.locations.contains_key(&entity)
    }

    /// Every non-empty zone with its contents, sorted by zone key.
    #[must_use]
    pub fn zones(&self) -> Vec<(ZoneKey, Vec<EntityId>)> {
        let mut zones: Vec<_> = self
            .zone_order
            .iter()
            .filter(|(_, cards)| !cards.is_empty())
            .map(|(&key, cards)| (key, cards.clone()))
            .collect();
        zones.sort_by_key(|(key, _)| *key);
        zones
    }
}
