//! Effect targeting system.
//!
//! Defines how an ability's action finds its target:
//! - `TargetSpec`: what kind of thing may be targeted, and filters on it
//! - `TargetFilter`: capability predicates a legal card must satisfy
//! - `TargetSelector`: enumerates the legal targets in a fixed order
//!
//! Legal targets are enumerated acting player first, then the opponent,
//! each in zone order, and filtered through the action's own `can_affect`.
//! Enumeration reads state only, so two queries with no mutation in
//! between return the same list.

use serde::{Deserialize, Serialize};

use crate::cards::{CardType, Keyword, Token};
use crate::core::{EntityId, MatchConfig, MatchState, PlayerId, PlayerRelation, Target, Zone};
use crate::error::EngineError;

use super::action::{ActionContext, GameAction};

/// What an ability can target.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetKind {
    /// A player, relative to the acting player. Never prompts unless the
    /// relation admits both players.
    Player(PlayerRelation),
    /// A card chosen among those passing the filters.
    Card,
    /// The card the ability belongs to.
    Source,
}

/// Filters for legal card targets.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TargetFilter {
    /// Card must currently count as this type.
    CardType(CardType),
    /// Card's controller must relate to the acting player.
    Controller(PlayerRelation),
    /// Card must not be the ability's source.
    NotSource,
    /// Card must carry damage.
    Damaged,
    /// Card must have the keyword (printed or granted).
    HasKeyword(Keyword),
    /// Card must be in this zone. Without this filter, play areas are searched.
    InZone(Zone),
}

/// Specification for effect targeting.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetSpec {
    pub kind: TargetKind,
    pub filters: Vec<TargetFilter>,
    /// An optional target may be passed; the action then runs with none.
    pub optional: bool,
}

impl TargetSpec {
    /// Any card passing the filters added later.
    #[must_use]
    pub fn card() -> Self {
        Self {
            kind: TargetKind::Card,
            filters: Vec::new(),
            optional: false,
        }
    }

    /// Any creature in play.
    #[must_use]
    pub fn creature() -> Self {
        Self::card().with_filter(TargetFilter::CardType(CardType::Creature))
    }

    /// A creature controlled by the opponent.
    #[must_use]
    pub fn enemy_creature() -> Self {
        Self::creature().with_filter(TargetFilter::Controller(PlayerRelation::Opponent))
    }

    /// A creature controlled by the acting player.
    #[must_use]
    pub fn friendly_creature() -> Self {
        Self::creature().with_filter(TargetFilter::Controller(PlayerRelation::Controller))
    }

    /// The acting player.
    #[must_use]
    pub fn controller() -> Self {
        Self::player(PlayerRelation::Controller)
    }

    /// The acting player's opponent.
    #[must_use]
    pub fn opponent() -> Self {
        Self::player(PlayerRelation::Opponent)
    }

    #[must_use]
    pub fn player(relation: PlayerRelation) -> Self {
        Self {
            kind: TargetKind::Player(relation),
            filters: Vec::new(),
            optional: false,
        }
    }

    /// The ability's own card.
    #[must_use]
    pub fn source() -> Self {
        Self {
            kind: TargetKind::Source,
            filters: Vec::new(),
            optional: false,
        }
    }

    /// Add a filter (builder pattern).
    #[must_use]
    pub fn with_filter(mut self, filter: TargetFilter) -> Self {
        self.filters.push(filter);
        self
    }

    /// Make targeting optional (builder pattern).
    #[must_use]
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    fn search_zone(&self) -> Zone {
        self.filters
            .iter()
            .find_map(|f| match f {
                TargetFilter::InZone(zone) => Some(*zone),
                _ => None,
            })
            .unwrap_or(Zone::PlayArea)
    }
}

/// Enumerates legal targets for one spec, acting player and source.
#[derive(Clone, Debug)]
pub struct TargetSelector<'a> {
    spec: &'a TargetSpec,
    acting_player: PlayerId,
    source: Option<EntityId>,
}

impl<'a> TargetSelector<'a> {
    pub fn new(spec: &'a TargetSpec, acting_player: PlayerId, source: Option<EntityId>) -> Self {
        Self {
            spec,
            acting_player,
            source,
        }
    }

    /// All legal targets for `action`, in deterministic order.
    ///
    /// An attachment fault on a candidate is returned, not read as "not a
    /// legal target".
    pub fn legal_targets(
        &self,
        action: &GameAction,
        state: &MatchState,
        config: &MatchConfig,
    ) -> Result<Vec<Target>, EngineError> {
        let ctx = ActionContext::new(self.acting_player, self.source);

        let candidates: Vec<Target> = match self.spec.kind {
            // A player is always a legal recipient; an action that cannot
            // change that player still resolves as a no-effect event.
            TargetKind::Player(relation) => {
                return Ok(relation.players(self.acting_player).map(Target::Player).collect());
            }
            TargetKind::Source => self.source.map(Target::Card).into_iter().collect(),
            TargetKind::Card => {
                let zone = self.spec.search_zone();
                [self.acting_player, self.acting_player.opponent()]
                    .into_iter()
                    .flat_map(|p| state.cards_in(p, zone).iter().copied())
                    .map(Target::Card)
                    .collect()
            }
        };

        let mut legal = Vec::with_capacity(candidates.len());
        for target in candidates {
            if self.passes_filters(state, target)? && action.can_affect(target, &ctx, state, config)? {
                legal.push(target);
            }
        }
        Ok(legal)
    }

    /// Is `target` among the legal targets right now?
    pub fn is_legal(
        &self,
        target: Target,
        action: &GameAction,
        state: &MatchState,
        config: &MatchConfig,
    ) -> Result<bool, EngineError> {
        Ok(self.legal_targets(action, state, config)?.contains(&target))
    }

    fn passes_filters(&self, state: &MatchState, target: Target) -> Result<bool, EngineError> {
        let Target::Card(entity) = target else {
            return Ok(false);
        };
        for filter in &self.spec.filters {
            if !self.passes_filter(state, entity, filter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn passes_filter(
        &self,
        state: &MatchState,
        entity: EntityId,
        filter: &TargetFilter,
    ) -> Result<bool, EngineError> {
        let Some(card) = state.card(entity) else {
            return Ok(false);
        };
        Ok(match filter {
            TargetFilter::CardType(card_type) => state.effective_type(entity)? == *card_type,
            TargetFilter::Controller(relation) => relation.matches(self.acting_player, card.controller),
            TargetFilter::NotSource => self.source != Some(entity),
            TargetFilter::Damaged => card.tokens(Token::Damage) > 0,
            TargetFilter::HasKeyword(keyword) => state.keyword_value(entity, *keyword)? > 0,
            TargetFilter::InZone(zone) => card.zone.zone == *zone,
        })
    }
}
