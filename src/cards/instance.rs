//! Card instances - runtime card state.
//!
//! `CardInstance` represents one copy of a card in a match. It tracks the
//! mutable state that definitions do not: where the copy is, who controls
//! it, the creature it is attached to, accumulated tokens and the
//! enhancement markers it was dealt with.
//!
//! ## Attachment
//!
//! `parent` is a non-owning back-reference used for lookup only. The play
//! action that attached the card sets it, and leaving play clears it. While
//! `parent` is set the card's effective type is `Upgrade` (see
//! `MatchState::effective_type`).

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::definition::CardId;
use super::enhancement::EnhancementKind;
use crate::core::config::ZoneKey;
use crate::core::entity::EntityId;
use crate::core::player::PlayerId;

/// Kinds of tokens a card can accumulate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Token {
    /// Damage marked on a creature.
    Damage,
    /// Amber captured onto a creature.
    Amber,
    /// Power counters.
    Power,
}

/// A card instance in a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardInstance {
    /// Unique entity ID for this instance.
    pub entity_id: EntityId,

    /// Reference to the card definition.
    pub card_id: CardId,

    /// Player whose deck this copy came from.
    pub owner: PlayerId,

    /// Player currently controlling it.
    pub controller: PlayerId,

    /// Current zone.
    pub zone: ZoneKey,

    /// Creature this card is attached to, if any.
    pub parent: Option<EntityId>,

    /// Accumulated tokens.
    #[serde(default)]
    pub tokens: FxHashMap<Token, i64>,

    /// Enhancement markers added to this copy.
    #[serde(default)]
    pub enhancements: Vec<EnhancementKind>,
}

impl CardInstance {
    /// Create a card instance owned and controlled by `owner`.
    #[must_use]
    pub fn new(entity_id: EntityId, card_id: CardId, owner: PlayerId, zone: ZoneKey) -> Self {
        Self {
            entity_id,
            card_id,
            owner,
            controller: owner,
            zone,
            parent: None,
            tokens: FxHashMap::default(),
            enhancements: Vec::new(),
        }
    }

    /// Add enhancement markers (builder pattern).
    #[must_use]
    pub fn with_enhancements(mut self, enhancements: impl IntoIterator<Item = EnhancementKind>) -> Self {
        self.enhancements.extend(enhancements);
        self
    }

    /// Is this card attached to another card?
    #[must_use]
    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Number of tokens of a kind.
    #[must_use]
    pub fn tokens(&self, token: Token) -> i64 {
        self.tokens.get(&token).copied().unwrap_or(0)
    }

    /// Add tokens of a kind.
    pub fn add_tokens(&mut self, token: Token, amount: i64) {
        *self.tokens.entry(token).or_insert(0) += amount;
    }

    /// Remove up to `amount` tokens, returning how many were removed.
    pub fn remove_tokens(&mut self, token: Token, amount: i64) -> i64 {
        let current = self.tokens(token);
        let removed = current.min(amount).max(0);
        if current - removed == 0 {
            self.tokens.remove(&token);
        } else {
            self.tokens.insert(token, current - removed);
        }
        removed
    }

    /// Drop every token (the card changed zones).
    pub fn clear_tokens(&mut self) {
        self.tokens.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::Zone;

    fn instance() -> CardInstance {
        CardInstance::new(
            EntityId(10),
            CardId::new("troll"),
            PlayerId::FIRST,
            ZoneKey::new(PlayerId::FIRST, Zone::Hand),
        )
    }

    #[test]
    fn test_card_instance_new() {
        let card = instance();

        assert_eq!(card.entity_id, EntityId(10));
        assert_eq!(card.owner, PlayerId::FIRST);
        assert_eq!(card.controller, PlayerId::FIRST);
        assert!(!card.is_attached());
        assert_eq!(card.tokens(Token::Damage), 0);
    }

    #[test]
    fn test_tokens() {
        let mut card = instance();

        card.add_tokens(Token::Damage, 2);
        card.add_tokens(Token::Damage, 1);
        assert_eq!(card.tokens(Token::Damage), 3);

        assert_eq!(card.remove_tokens(Token::Damage, 5), 3);
        assert_eq!(card.tokens(Token::Damage), 0);
        assert!(card.tokens.is_empty());

        card.add_tokens(Token::Amber, 2);
        card.clear_tokens();
        assert_eq!(card.tokens(Token::Amber), 0);
    }

    #[test]
    fn test_enhancements() {
        let card = instance().with_enhancements([EnhancementKind::Draw, EnhancementKind::Amber]);
        assert_eq!(card.enhancements.len(), 2);
    }

    #[test]
    fn test_serialization() {
        let mut card = instance();
        card.parent = Some(EntityId(3));
        card.add_tokens(Token::Damage, 1);

        let json = serde_json::to_string(&card).unwrap();
        let back: CardInstance = serde_json::from_str(&json).unwrap();

        assert_eq!(card, back);
    }
}
