//! Bonus icons and enhancement markers.
//!
//! A card can carry bonus icons, either printed or added later as
//! enhancements. Each icon resolves as a tiny ability when the card is
//! played, before the card's own `Play` abilities.
//!
//! Deck data encodes enhancements as glyphs inside card text
//! (`"Enhance PDRA."`): one letter or private-use icon code point per pip.
//! `count_enhancements` decodes those into per-kind totals. Assigning the
//! totals back onto individual enhanced cards is not implemented.

use std::str::FromStr;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::effects::{AbilityDeclaration, Effect, GameAction, TargetSpec};

/// A kind of bonus icon.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EnhancementKind {
    /// Gain 1 amber.
    Amber,
    /// A friendly creature captures 1 amber from the opponent.
    Capture,
    /// Deal 1 damage to a creature.
    Damage,
    /// Draw 1 card.
    Draw,
}

/// Errors from decoding enhancement names.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnhancementError {
    #[error("unknown enhancement `{0}`")]
    Unknown(String),
}

impl EnhancementKind {
    /// Resolution order when a card is played.
    pub const ORDER: [EnhancementKind; 4] = [Self::Amber, Self::Capture, Self::Damage, Self::Draw];

    /// Decode a single glyph.
    #[must_use]
    pub const fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            'A' | '\u{f360}' => Some(Self::Amber),
            'P' | '\u{f565}' => Some(Self::Capture),
            'D' | '\u{f361}' => Some(Self::Damage),
            'R' | '\u{f36e}' => Some(Self::Draw),
            _ => None,
        }
    }

    /// Lowercase name used in deck data.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Amber => "amber",
            Self::Capture => "capture",
            Self::Damage => "damage",
            Self::Draw => "draw",
        }
    }

    /// The ability this icon resolves as.
    #[must_use]
    pub fn bonus_ability(self) -> AbilityDeclaration {
        let effect = match self {
            Self::Amber => Effect::new(GameAction::GainAmber { amount: 1 }),
            Self::Capture => Effect::new(GameAction::Capture { amount: 1 })
                .with_target(TargetSpec::friendly_creature()),
            Self::Damage => Effect::new(GameAction::DealDamage { amount: 1 }),
            Self::Draw => Effect::new(GameAction::Draw { count: 1 }),
        };
        AbilityDeclaration::play(format!("{} bonus", self.name()), effect)
    }
}

impl FromStr for EnhancementKind {
    type Err = EnhancementError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "amber" | "aember" => Ok(Self::Amber),
            "capture" => Ok(Self::Capture),
            "damage" => Ok(Self::Damage),
            "draw" => Ok(Self::Draw),
            other => Err(EnhancementError::Unknown(other.to_string())),
        }
    }
}

impl std::fmt::Display for EnhancementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Sort icons into resolution order.
#[must_use]
pub fn in_resolution_order(icons: impl IntoIterator<Item = EnhancementKind>) -> Vec<EnhancementKind> {
    let mut icons: Vec<_> = icons.into_iter().collect();
    icons.sort_by_key(|icon| EnhancementKind::ORDER.iter().position(|o| o == icon));
    icons
}

/// Count enhancement pips granted by a batch of card texts.
///
/// Only text of the form `Enhance <glyphs>.` contributes; unknown glyphs
/// inside the run are skipped.
///
/// ```
/// use amber_engine::cards::{count_enhancements, EnhancementKind};
///
/// let counts = count_enhancements(["Play: Enhance AAR.", "Fight: gain 1."]);
/// assert_eq!(counts.get(&EnhancementKind::Amber), Some(&2));
/// assert_eq!(counts.get(&EnhancementKind::Draw), Some(&1));
/// assert_eq!(counts.values().sum::<u32>(), 3);
/// ```
pub fn count_enhancements<'a>(texts: impl IntoIterator<Item = &'a str>) -> FxHashMap<EnhancementKind, u32> {
    let mut counts = FxHashMap::default();

    for text in texts {
        let Some(start) = text.find("Enhance ") else {
            continue;
        };
        let rest = &text[start + "Enhance ".len()..];
        let Some(end) = rest.find('.') else {
            continue;
        };
        for kind in rest[..end].chars().filter_map(EnhancementKind::from_glyph) {
            *counts.entry(kind).or_insert(0) += 1;
        }
    }

    counts
}
