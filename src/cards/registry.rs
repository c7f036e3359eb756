//! Card catalog collaborator.
//!
//! The engine never owns card text. It asks a `CardCatalog` for the
//! immutable definition behind a `CardId` once, at match setup, and caches
//! the answer in `MatchState`. Two catalogs are provided:
//!
//! - `CardRegistry`: an in-memory table, filled in code.
//! - `CachedCatalog`: a read-through cache in front of a slower
//!   `CardSource` (database, file, network). Entries live until `refresh`
//!   or `invalidate` is called; there is no ambient global cache.

use std::sync::{Arc, RwLock};

use rustc_hash::FxHashMap;

use super::definition::{CardDefinition, CardId};

/// Supplies immutable card definitions by identity.
pub trait CardCatalog: Send + Sync {
    /// Look up a definition. `None` means the catalog has no such card.
    fn definition(&self, id: &CardId) -> Option<Arc<CardDefinition>>;
}

/// In-memory catalog of card definitions.
///
/// ## Example
///
/// ```
/// use amber_engine::cards::{CardCatalog, CardDefinition, CardId, CardRegistry, CardType};
///
/// let mut registry = CardRegistry::new();
/// registry.register(CardDefinition::new("troll", "Troll", CardType::Creature).with_power(8));
///
/// let found = registry.definition(&CardId::new("troll")).unwrap();
/// assert_eq!(found.power, 8);
/// ```
#[derive(Clone, Debug, Default)]
pub struct CardRegistry {
    cards: FxHashMap<CardId, Arc<CardDefinition>>,
}

impl CardRegistry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a card definition, returning the one it replaced.
    pub fn register(&mut self, card: CardDefinition) -> Option<Arc<CardDefinition>> {
        self.cards.insert(card.id.clone(), Arc::new(card))
    }

    /// Register several definitions (builder pattern).
    #[must_use]
    pub fn with_cards(mut self, cards: impl IntoIterator<Item = CardDefinition>) -> Self {
        for card in cards {
            self.register(card);
        }
        self
    }

    /// Get a card definition by ID.
    #[must_use]
    pub fn get(&self, id: &CardId) -> Option<&Arc<CardDefinition>> {
        self.cards.get(id)
    }

    /// Check if a card ID is registered.
    #[must_use]
    pub fn contains(&self, id: &CardId) -> bool {
        self.cards.contains_key(id)
    }

    /// Get the number of registered cards.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cards.len()
    }

    /// Check if the registry is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }
}

impl CardCatalog for CardRegistry {
    fn definition(&self, id: &CardId) -> Option<Arc<CardDefinition>> {
        self.cards.get(id).cloned()
    }
}

/// A slow backing store for card definitions.
pub trait CardSource: Send + Sync {
    /// Fetch a definition. Failures are the source's concern and surface as `None`.
    fn fetch(&self, id: &CardId) -> Option<CardDefinition>;
}

/// Read-through cache over a `CardSource`.
///
/// Hits are served from memory. Misses go to the source and, when found,
/// are kept until the next `refresh`. Misses that the source cannot answer
/// are not cached, so a later fetch may still succeed.
pub struct CachedCatalog<S> {
    source: S,
    cache: RwLock<FxHashMap<CardId, Arc<CardDefinition>>>,
}

impl<S: CardSource> CachedCatalog<S> {
    /// Wrap a source with an empty cache.
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: RwLock::new(FxHashMap::default()),
        }
    }

    /// Drop every cached entry.
    pub fn refresh(&self) {
        match self.cache.write() {
            Ok(mut cache) => cache.clear(),
            Err(poisoned) => poisoned.into_inner().clear(),
        }
    }

    /// Drop one cached entry.
    pub fn invalidate(&self, id: &CardId) {
        match self.cache.write() {
            Ok(mut cache) => {
                cache.remove(id);
            }
            Err(poisoned) => {
                poisoned.into_inner().remove(id);
            }
        }
    }

    /// Number of cached definitions.
    #[must_use]
    pub fn cached_len(&self) -> usize {
        self.cache.read().map(|cache| cache.len()).unwrap_or(0)
    }

    /// Borrow the wrapped source.
    pub fn source(&self) -> &S {
        &self.source
    }
}

impl<S: CardSource> CardCatalog for CachedCatalog<S> {
    fn definition(&self, id: &CardId) -> Option<Arc<CardDefinition>> {
        if let Ok(cache) = self.cache.read() {
            if let Some(found) = cache.get(id) {
                return Some(Arc::clone(found));
            }
        }

        let fetched = Arc::new(self.source.fetch(id)?);
        tracing::debug!("catalog cache miss for {}", id);

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(id.clone(), Arc::clone(&fetched));
        }
        Some(fetched)
    }
}
