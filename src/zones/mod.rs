//! Zone system for card locations.
//!
//! Every player owns a deck, a hand, a play area and a discard. A concrete
//! zone is addressed by `ZoneKey` (owner plus `Zone` kind).
//!
//! ## Key Types
//!
//! - `ZoneKey` / `Zone`: zone addressing (from `core::config`)
//! - `ZoneManager`: card location tracking and movement
//! - `ZonePosition`: position specifier for insertion

pub mod manager;

pub use manager::{ZoneManager, ZonePosition};

// Re-export zone types from core for convenience
pub use crate::core::config::{Zone, ZoneKey};
