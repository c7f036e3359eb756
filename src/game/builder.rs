//! Match setup.
//!
//! ```
//! use amber_engine::cards::{CardDefinition, CardRegistry, CardType};
//! use amber_engine::core::{MatchConfig, PlayerId, Zone};
//! use amber_engine::game::MatchBuilder;
//!
//! let catalog = CardRegistry::new()
//!     .with_cards([CardDefinition::new("troll", "Troll", CardType::Creature).with_power(8)]);
//!
//! let game = MatchBuilder::new()
//!     .with_config(MatchConfig::default().with_hand_size(2))
//!     .with_deck(PlayerId::FIRST, ["troll", "troll", "troll"])
//!     .with_in_play(PlayerId::SECOND, ["troll"])
//!     .build(&catalog)
//!     .unwrap();
//!
//! assert_eq!(game.state().cards_in(PlayerId::FIRST, Zone::Hand).len(), 2);
//! assert_eq!(game.state().cards_in(PlayerId::SECOND, Zone::PlayArea).len(), 1);
//! ```

use rustc_hash::FxHashMap;

use crate::cards::{CardCatalog, CardId, EnhancementKind};
use crate::core::{EntityId, MatchConfig, MatchState, PhaseKind, PlayerId, PlayerPair, Zone, ZoneKey};
use crate::error::EngineError;
use crate::pipeline::{Pipeline, StepFactory};
use crate::rules::{KeysForged, VictoryCondition};
use crate::triggers::EventBus;
use crate::zones::ZonePosition;

use super::log::{GameLog, MessageSink};
use super::orchestrator::Match;
use super::Game;

/// Builder for a `Match`.
///
/// Deck lists are bottom to top: the last card listed is drawn first.
pub struct MatchBuilder {
    config: MatchConfig,
    decks: PlayerPair<Vec<CardId>>,
    hands: PlayerPair<Vec<CardId>>,
    in_play: PlayerPair<Vec<CardId>>,
    amber: PlayerPair<u32>,
    keys: PlayerPair<u32>,
    enhancements: FxHashMap<(PlayerId, CardId), Vec<EnhancementKind>>,
    scripted_phases: Option<Vec<PhaseKind>>,
    steps: Vec<(PhaseKind, StepFactory)>,
    victory: Box<dyn VictoryCondition>,
    sink: Option<Box<dyn MessageSink>>,
}

impl Default for MatchBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn ids<I, S>(cards: I) -> Vec<CardId>
where
    I: IntoIterator<Item = S>,
    S: Into<CardId>,
{
    cards.into_iter().map(Into::into).collect()
}

impl MatchBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            config: MatchConfig::default(),
            decks: PlayerPair::default(),
            hands: PlayerPair::default(),
            in_play: PlayerPair::default(),
            amber: PlayerPair::default(),
            keys: PlayerPair::default(),
            enhancements: FxHashMap::default(),
            scripted_phases: None,
            steps: Vec::new(),
            victory: Box::new(KeysForged),
            sink: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: MatchConfig) -> Self {
        self.config = config;
        self
    }

    #[must_use]
    pub fn with_deck<S: Into<CardId>>(mut self, player: PlayerId, cards: impl IntoIterator<Item = S>) -> Self {
        self.decks[player] = ids(cards);
        self
    }

    /// Cards dealt straight to hand. Opening hands only top up to the
    /// hand size for players with an empty hand.
    #[must_use]
    pub fn with_hand<S: Into<CardId>>(mut self, player: PlayerId, cards: impl IntoIterator<Item = S>) -> Self {
        self.hands[player] = ids(cards);
        self
    }

    /// Cards already in play, with their reactions subscribed.
    #[must_use]
    pub fn with_in_play<S: Into<CardId>>(mut self, player: PlayerId, cards: impl IntoIterator<Item = S>) -> Self {
        self.in_play[player] = ids(cards);
        self
    }

    #[must_use]
    pub fn with_amber(mut self, player: PlayerId, amber: u32) -> Self {
        self.amber[player] = amber;
        self
    }

    #[must_use]
    pub fn with_keys(mut self, player: PlayerId, keys: u32) -> Self {
        self.keys[player] = keys;
        self
    }

    /// Enhancement markers for every copy of `card` that `player` owns.
    #[must_use]
    pub fn with_enhancements(
        mut self,
        player: PlayerId,
        card: impl Into<CardId>,
        markers: impl IntoIterator<Item = EnhancementKind>,
    ) -> Self {
        self.enhancements
            .entry((player, card.into()))
            .or_default()
            .extend(markers);
        self
    }

    /// Run these phases once instead of cycling the configured rounds.
    #[must_use]
    pub fn with_scripted_phases(mut self, phases: Vec<PhaseKind>) -> Self {
        self.scripted_phases = Some(phases);
        self
    }

    /// Replace the default steps of a phase kind.
    #[must_use]
    pub fn with_steps(mut self, kind: PhaseKind, factory: StepFactory) -> Self {
        self.steps.push((kind, factory));
        self
    }

    #[must_use]
    pub fn with_victory(mut self, victory: impl VictoryCondition + 'static) -> Self {
        self.victory = Box::new(victory);
        self
    }

    /// Forward game log messages to `sink` as they are emitted.
    #[must_use]
    pub fn with_sink(mut self, sink: impl MessageSink + 'static) -> Self {
        self.sink = Some(Box::new(sink));
        self
    }

    /// Resolve every card through `catalog` and set up the match.
    pub fn build(self, catalog: &dyn CardCatalog) -> Result<Match, EngineError> {
        self.config.validate()?;
        let mut state = MatchState::new(self.config.first_player, self.config.seed);
        let mut bus = EventBus::new();

        for list in [&self.decks, &self.hands, &self.in_play] {
            for (_, cards) in list.iter() {
                for id in cards {
                    if state.definition_for(id).is_none() {
                        let definition = catalog
                            .definition(id)
                            .ok_or_else(|| EngineError::UnknownCard(id.clone()))?;
                        state.register_definition(definition);
                    }
                }
            }
        }

        for player in PlayerId::both() {
            self.place(&mut state, player, &self.decks[player], Zone::Deck)?;
            self.place(&mut state, player, &self.hands[player], Zone::Hand)?;
            for entity in self.place(&mut state, player, &self.in_play[player], Zone::PlayArea)? {
                let definition = state.definition(entity)?.clone();
                for ability in definition.reactions() {
                    bus.subscribe_ability(entity, player, ability);
                }
            }

            let seat = state.player_mut(player);
            seat.amber = self.amber[player];
            seat.keys = self.keys[player];
        }

        if self.config.shuffle_decks {
            for player in PlayerId::both() {
                state.shuffle(ZoneKey::new(player, Zone::Deck));
            }
        }
        if self.config.opening_hands {
            for player in PlayerId::both() {
                if state.cards_in(player, Zone::Hand).is_empty() {
                    deal(&mut state, player, self.config.hand_size)?;
                }
            }
        }
        tracing::debug!(
            seed = self.config.seed,
            first = %self.config.first_player,
            cards = state.cards().len(),
            "match set up"
        );

        let mut log = GameLog::new();
        if let Some(sink) = self.sink {
            log = log.with_sink(sink);
        }
        let mut pipeline = match self.scripted_phases {
            Some(phases) => Pipeline::scripted(phases),
            None => Pipeline::new(&self.config),
        };
        for (kind, factory) in self.steps {
            pipeline.set_steps(kind, factory);
        }

        let game = Game::new(state, bus, self.config, self.victory, log);
        Ok(Match::new(game, pipeline))
    }

    fn place(
        &self,
        state: &mut MatchState,
        player: PlayerId,
        cards: &[CardId],
        zone: Zone,
    ) -> Result<Vec<EntityId>, EngineError> {
        let mut placed = Vec::with_capacity(cards.len());
        for id in cards {
            let entity = state.create_card(id, player, ZoneKey::new(player, zone))?;
            if let Some(markers) = self.enhancements.get(&(player, id.clone())) {
                state.card_mut(entity)?.enhancements.extend(markers.iter().copied());
            }
            placed.push(entity);
        }
        Ok(placed)
    }
}

/// Move cards from the top of the deck to hand, without raising events.
fn deal(state: &mut MatchState, player: PlayerId, count: usize) -> Result<(), EngineError> {
    let deck = ZoneKey::new(player, Zone::Deck);
    let hand = ZoneKey::new(player, Zone::Hand);
    for _ in 0..count {
        let Some(top) = state.zones().top_card(deck) else {
            break;
        };
        state.move_card(top, hand, ZonePosition::Top)?;
    }
    Ok(())
}

impl std::fmt::Debug for MatchBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchBuilder")
            .field("config", &self.config)
            .field("decks", &self.decks)
            .field("hands", &self.hands)
            .field("in_play", &self.in_play)
            .field("scripted_phases", &self.scripted_phases)
            .finish()
    }
}
