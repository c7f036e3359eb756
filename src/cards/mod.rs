//! Card system: definitions, instances, enhancements and the catalog.
//!
//! ## Key Types
//!
//! - `CardId`: Catalog identity of a printed card
//! - `CardDefinition`: Static card data (type, power, keywords, abilities)
//! - `CardInstance`: Runtime copy state (zone, controller, parent, tokens)
//! - `EnhancementKind`: Bonus icons and enhancement markers
//! - `CardCatalog`: Definition lookup, with `CardRegistry` and `CachedCatalog`

pub mod definition;
pub mod enhancement;
pub mod instance;
pub mod registry;

pub use definition::{CardDefinition, CardId, CardType, Keyword, UpgradeGrant};
pub use enhancement::{count_enhancements, in_resolution_order, EnhancementError, EnhancementKind};
pub use instance::{CardInstance, Token};
pub use registry::{CachedCatalog, CardCatalog, CardRegistry, CardSource};
