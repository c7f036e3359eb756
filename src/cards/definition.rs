//! Card definitions - static card data.
//!
//! `CardDefinition` holds the immutable properties of a card: its printed
//! type, power, keywords, bonus icons and ability declarations. Definitions
//! come from the catalog collaborator and are shared read-only by every copy
//! of the card in a match.
//!
//! Instance-specific data (damage taken, attachment, zone) is stored
//! separately in `CardInstance`.

use std::sync::Arc;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use super::enhancement::EnhancementKind;
use crate::effects::{AbilityDeclaration, AbilityTrigger};

/// Catalog identity of a card (e.g. `"relentless-whispers"`).
///
/// This identifies the printed card, not a specific copy in a match.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CardId(pub String);

impl CardId {
    /// Create a new card ID.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the raw identifier.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CardId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Printed card type.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardType {
    /// Stays in play, has power, can be damaged.
    Creature,
    /// Stays in play attached to a creature.
    Upgrade,
    /// Resolves once, then goes to the discard.
    Action,
    /// Stays in play, has no power.
    Artifact,
}

impl CardType {
    /// Lowercase name used in messages.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Creature => "creature",
            Self::Upgrade => "upgrade",
            Self::Action => "action",
            Self::Artifact => "artifact",
        }
    }
}

/// Keywords a card can carry or grant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Keyword {
    Skirmish,
    Elusive,
    Taunt,
    Assault,
    Hazardous,
    Poison,
}

/// Bonuses an upgrade grants to the creature it is attached to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradeGrant {
    /// Added to the parent's power.
    pub power: i64,
    /// Added to the parent's keyword values.
    pub keywords: FxHashMap<Keyword, i64>,
}

/// Static card definition.
///
/// ## Example
///
/// ```
/// use amber_engine::cards::{CardDefinition, CardType, Keyword};
///
/// let rover = CardDefinition::new("explo-rover", "Explo-rover", CardType::Creature)
///     .with_power(2)
///     .playable_as_upgrade()
///     .grants_keyword(Keyword::Skirmish, 1);
///
/// assert_eq!(rover.power, 2);
/// assert!(rover.can_be_upgrade());
/// assert_eq!(rover.grants.keywords.get(&Keyword::Skirmish), Some(&1));
/// ```
#[derive(Clone, Debug)]
pub struct CardDefinition {
    /// Catalog identity.
    pub id: CardId,

    /// Card name (for messages).
    pub name: String,

    /// Printed type.
    pub card_type: CardType,

    /// Printed power. Also the damage needed to destroy the creature.
    pub power: i64,

    /// Printed keywords and their values.
    pub keywords: FxHashMap<Keyword, i64>,

    /// Printed bonus icons, resolved when the card is played.
    pub bonus_icons: Vec<EnhancementKind>,

    /// A creature that may alternatively be played attached to another creature.
    pub playable_as_upgrade: bool,

    /// What this card grants its parent while attached.
    pub grants: UpgradeGrant,

    /// Declared abilities, shared across all copies.
    pub abilities: Vec<Arc<AbilityDeclaration>>,
}

impl CardDefinition {
    /// Create a new card definition.
    #[must_use]
    pub fn new(id: impl Into<CardId>, name: impl Into<String>, card_type: CardType) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_type,
            power: 0,
            keywords: FxHashMap::default(),
            bonus_icons: Vec::new(),
            playable_as_upgrade: false,
            grants: UpgradeGrant::default(),
            abilities: Vec::new(),
        }
    }

    /// Set printed power (builder pattern).
    #[must_use]
    pub fn with_power(mut self, power: i64) -> Self {
        self.power = power;
        self
    }

    /// Add a printed keyword (builder pattern).
    #[must_use]
    pub fn with_keyword(mut self, keyword: Keyword, value: i64) -> Self {
        *self.keywords.entry(keyword).or_insert(0) += value;
        self
    }

    /// Add a printed bonus icon (builder pattern).
    #[must_use]
    pub fn with_bonus(mut self, icon: EnhancementKind) -> Self {
        self.bonus_icons.push(icon);
        self
    }

    /// Allow this creature to be played as an upgrade (builder pattern).
    #[must_use]
    pub fn playable_as_upgrade(mut self) -> Self {
        self.playable_as_upgrade = true;
        self
    }

    /// Power granted to the parent while attached (builder pattern).
    #[must_use]
    pub fn grants_power(mut self, power: i64) -> Self {
        self.grants.power += power;
        self
    }

    /// Keyword granted to the parent while attached (builder pattern).
    #[must_use]
    pub fn grants_keyword(mut self, keyword: Keyword, value: i64) -> Self {
        *self.grants.keywords.entry(keyword).or_insert(0) += value;
        self
    }

    /// Declare an ability (builder pattern).
    #[must_use]
    pub fn with_ability(mut self, ability: AbilityDeclaration) -> Self {
        self.abilities.push(Arc::new(ability));
        self
    }

    /// Can this card be played attached to a creature?
    #[must_use]
    pub fn can_be_upgrade(&self) -> bool {
        self.card_type == CardType::Upgrade || self.playable_as_upgrade
    }

    /// Abilities that fire when this card is played.
    pub fn play_abilities(&self) -> impl Iterator<Item = &Arc<AbilityDeclaration>> {
        self.abilities
            .iter()
            .filter(|a| matches!(a.trigger, AbilityTrigger::Play))
    }

    /// Abilities that subscribe to events while this card is in play.
    pub fn reactions(&self) -> impl Iterator<Item = &Arc<AbilityDeclaration>> {
        self.abilities
            .iter()
            .filter(|a| matches!(a.trigger, AbilityTrigger::Reaction { .. }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effects::{Effect, GameAction};
    use crate::triggers::{EventKind, TriggerCondition};

    #[test]
    fn test_card_id() {
        let id = CardId::new("poke");
        assert_eq!(id.as_str(), "poke");
        assert_eq!(format!("{}", id), "poke");
        assert_eq!(CardId::from("poke"), id);
    }

    #[test]
    fn test_card_definition_builder() {
        let card = CardDefinition::new("troll", "Troll", CardType::Creature)
            .with_power(8)
            .with_keyword(Keyword::Taunt, 1)
            .with_bonus(EnhancementKind::Amber);

        assert_eq!(card.name, "Troll");
        assert_eq!(card.power, 8);
        assert_eq!(card.keywords.get(&Keyword::Taunt), Some(&1));
        assert_eq!(card.bonus_icons, vec![EnhancementKind::Amber]);
        assert!(!card.can_be_upgrade());
    }

    #[test]
    fn test_upgrade_capability() {
        let upgrade = CardDefinition::new("armor", "Armor", CardType::Upgrade).grants_power(2);
        assert!(upgrade.can_be_upgrade());
        assert_eq!(upgrade.grants.power, 2);

        let rover = CardDefinition::new("rover", "Rover", CardType::Creature).playable_as_upgrade();
        assert!(rover.can_be_upgrade());
    }

    #[test]
    fn test_ability_partition() {
        let card = CardDefinition::new("x", "X", CardType::Creature)
            .with_ability(AbilityDeclaration::play("draw", Effect::new(GameAction::Draw { count: 1 })))
            .with_ability(AbilityDeclaration::reaction(
                "gain",
                EventKind::RoundEnded,
                TriggerCondition::Always,
                Effect::new(GameAction::GainAmber { amount: 1 }),
            ));

        assert_eq!(card.play_abilities().count(), 1);
        assert_eq!(card.reactions().count(), 1);
    }
}
