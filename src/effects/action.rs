//! Game actions: the atomic effect primitives.
//!
//! Every mutation of a match goes through one of these. An action exposes:
//! - `can_affect`: legality of a target right now
//! - `event_for`: the event describing an application to a target
//! - `apply`: the mutation itself, run by the resolver once the event is
//!   opened
//!
//! `apply` never fails on an illegal target. It returns a `NoEffect`
//! outcome instead, so continuations can branch on "nothing happened".
//! Errors are reserved for broken invariants.
//!
//! Causal consequences are returned as child events (`PendingEvent`) that
//! the resolver raises nested under the current one: lethal damage yields a
//! `Destroy` flagged `destroyed_by_damage_dealt`, and a card leaving play
//! yields a discard move for each upgrade that was attached to it.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cards::{in_resolution_order, CardType, Token};
use crate::core::{EntityId, MatchConfig, MatchState, PlayerId, Target, Zone, ZoneKey};
use crate::error::EngineError;
use crate::triggers::{EventBus, EventKind, EventOutcome, GameEvent, Reaction};
use crate::zones::ZonePosition;

use super::targeting::TargetSpec;

/// An atomic game action.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Damage a creature in play. Lethal damage destroys it.
    DealDamage { amount: u32 },
    /// Put a card in play into its owner's discard.
    Destroy,
    /// Target player draws cards.
    Draw { count: u32 },
    /// Target player draws up to the configured hand size.
    Refill,
    /// Acting player takes amber from the target player.
    Steal { amount: u32 },
    /// Target creature takes amber from its controller's opponent.
    Capture { amount: u32 },
    GainAmber { amount: u32 },
    LoseAmber { amount: u32 },
    /// Target player pays the key cost for a key.
    ForgeKey,
    /// Move a card to a zone of its owner.
    MoveCard { to: Zone },
    /// Play a card from hand, optionally attached to a creature.
    Play { upgrade_parent: Option<EntityId> },
    /// Clear an attached card's parent.
    Detach,
}

/// Who is acting and with what card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActionContext {
    pub player: PlayerId,
    pub source: Option<EntityId>,
}

impl ActionContext {
    #[must_use]
    pub const fn new(player: PlayerId, source: Option<EntityId>) -> Self {
        Self { player, source }
    }

    /// Recover the context an event was raised with.
    #[must_use]
    pub fn of(event: &GameEvent, fallback: PlayerId) -> Self {
        Self::new(event.player.unwrap_or(fallback), event.source)
    }
}

/// A child event waiting to be raised under the current one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingEvent {
    pub action: GameAction,
    pub event: GameEvent,
}

/// Result of applying an action.
#[derive(Debug)]
pub struct Applied {
    pub outcome: EventOutcome,
    /// Amount actually applied.
    pub amount: u32,
    /// Causal consequences, raised in order before dispatch.
    pub children: Vec<PendingEvent>,
    /// Abilities granted by this event, run before subscribed reactions.
    pub own: Vec<Reaction>,
}

impl Applied {
    fn applied(amount: u32) -> Self {
        Self {
            outcome: EventOutcome::Applied,
            amount,
            children: Vec::new(),
            own: Vec::new(),
        }
    }

    fn no_effect() -> Self {
        Self {
            outcome: EventOutcome::NoEffect,
            amount: 0,
            children: Vec::new(),
            own: Vec::new(),
        }
    }

    /// Applied if anything moved, otherwise no effect.
    fn counted(amount: u32) -> Self {
        if amount == 0 {
            Self::no_effect()
        } else {
            Self::applied(amount)
        }
    }
}

/// The mutable pieces an action may touch.
pub struct ActionScope<'a> {
    pub state: &'a mut MatchState,
    pub bus: &'a mut EventBus,
    pub config: &'a MatchConfig,
}

impl GameAction {
    /// Event kind raised by this action.
    #[must_use]
    pub const fn event_kind(&self) -> EventKind {
        match self {
            Self::DealDamage { .. } => EventKind::DamageDealt,
            Self::Destroy => EventKind::CardDestroyed,
            Self::Draw { .. } | Self::Refill => EventKind::CardsDrawn,
            Self::Steal { .. } => EventKind::AmberStolen,
            Self::Capture { .. } => EventKind::AmberCaptured,
            Self::GainAmber { .. } => EventKind::AmberGained,
            Self::LoseAmber { .. } => EventKind::AmberLost,
            Self::ForgeKey => EventKind::KeyForged,
            Self::MoveCard { .. } => EventKind::CardMoved,
            Self::Play { .. } => EventKind::CardPlayed,
            Self::Detach => EventKind::UpgradeDetached,
        }
    }

    /// Target used when a declaration does not name one.
    #[must_use]
    pub fn default_target(&self) -> TargetSpec {
        match self {
            Self::DealDamage { .. } | Self::Destroy | Self::MoveCard { .. } => TargetSpec::creature(),
            Self::Capture { .. } => TargetSpec::friendly_creature(),
            Self::Draw { .. } | Self::Refill | Self::GainAmber { .. } | Self::ForgeKey => {
                TargetSpec::controller()
            }
            Self::Steal { .. } | Self::LoseAmber { .. } => TargetSpec::opponent(),
            Self::Play { .. } | Self::Detach => TargetSpec::source(),
        }
    }

    /// Requested amount carried on the event.
    const fn requested(&self) -> u32 {
        match self {
            Self::DealDamage { amount }
            | Self::Steal { amount }
            | Self::Capture { amount }
            | Self::GainAmber { amount }
            | Self::LoseAmber { amount } => *amount,
            Self::Draw { count } => *count,
            Self::Destroy
            | Self::Refill
            | Self::ForgeKey
            | Self::MoveCard { .. }
            | Self::Play { .. }
            | Self::Detach => 0,
        }
    }

    /// Describe an application of this action.
    #[must_use]
    pub fn event_for(&self, target: Option<Target>, ctx: &ActionContext) -> GameEvent {
        let event = GameEvent::new(self.event_kind())
            .with_player(ctx.player)
            .with_source(ctx.source)
            .with_target(target)
            .with_amount(self.requested());
        match self {
            Self::Play { upgrade_parent } => event.with_parent_card(*upgrade_parent),
            _ => event,
        }
    }

    /// Could this action change `target` right now?
    ///
    /// Fails only when reading the target trips an attachment fault.
    pub fn can_affect(
        &self,
        target: Target,
        ctx: &ActionContext,
        state: &MatchState,
        config: &MatchConfig,
    ) -> Result<bool, EngineError> {
        Ok(match (self, target) {
            (Self::DealDamage { .. } | Self::Capture { .. }, Target::Card(card)) => {
                state.is_creature_in_play(card)?
            }
            (Self::Destroy, Target::Card(card)) => state.in_play(card),
            (Self::MoveCard { to }, Target::Card(card)) => state
                .card(card)
                .is_some_and(|c| *to != Zone::PlayArea && c.zone != ZoneKey::new(c.owner, *to)),
            (Self::Play { upgrade_parent }, Target::Card(card)) => {
                can_play(state, ctx.player, card, *upgrade_parent)?
            }
            (Self::Detach, Target::Card(card)) => state
                .card(card)
                .is_some_and(|c| c.is_attached() && c.zone.zone == Zone::PlayArea),
            (Self::Draw { .. } | Self::Refill, Target::Player(p)) => {
                !state.cards_in(p, Zone::Deck).is_empty() || !state.cards_in(p, Zone::Discard).is_empty()
            }
            (Self::Steal { .. } | Self::LoseAmber { .. }, Target::Player(p)) => state.player(p).amber > 0,
            (Self::GainAmber { amount }, Target::Player(_)) => *amount > 0,
            (Self::ForgeKey, Target::Player(p)) => state.player(p).amber >= config.key_cost,
            _ => false,
        })
    }

    /// Perform the action described by `event`.
    pub fn apply(&self, event: &GameEvent, scope: &mut ActionScope<'_>) -> Result<Applied, EngineError> {
        let Some(target) = event.target else {
            return Ok(Applied::no_effect());
        };
        let ctx = ActionContext::of(event, scope.state.active_player());
        if !self.can_affect(target, &ctx, scope.state, scope.config)? {
            return Ok(Applied::no_effect());
        }

        match (self, target) {
            (Self::DealDamage { amount }, Target::Card(card)) => deal_damage(scope, event, card, *amount),
            (Self::Destroy, Target::Card(card)) => {
                let owner = owner_of(scope.state, card)?;
                let children = move_card(scope, event, card, ZoneKey::new(owner, Zone::Discard))?;
                Ok(Applied {
                    children,
                    ..Applied::applied(1)
                })
            }
            (Self::Draw { count }, Target::Player(p)) => Ok(Applied::counted(draw(scope.state, p, *count)?)),
            (Self::Refill, Target::Player(p)) => {
                let missing = scope
                    .config
                    .hand_size
                    .saturating_sub(scope.state.cards_in(p, Zone::Hand).len());
                Ok(Applied::counted(draw(scope.state, p, missing as u32)?))
            }
            (Self::Steal { amount }, Target::Player(p)) => {
                let taken = take_amber(scope.state, p, *amount);
                scope.state.player_mut(ctx.player).amber += taken;
                Ok(Applied::counted(taken))
            }
            (Self::Capture { amount }, Target::Card(card)) => {
                let controller = scope.state.card_mut(card)?.controller;
                let taken = take_amber(scope.state, controller.opponent(), *amount);
                scope.state.card_mut(card)?.add_tokens(Token::Amber, i64::from(taken));
                Ok(Applied::counted(taken))
            }
            (Self::GainAmber { amount }, Target::Player(p)) => {
                scope.state.player_mut(p).amber += *amount;
                Ok(Applied::applied(*amount))
            }
            (Self::LoseAmber { amount }, Target::Player(p)) => {
                Ok(Applied::counted(take_amber(scope.state, p, *amount)))
            }
            (Self::ForgeKey, Target::Player(p)) => {
                let cost = scope.config.key_cost;
                let player = scope.state.player_mut(p);
                player.amber -= cost;
                player.keys += 1;
                player.forged_this_turn = true;
                Ok(Applied::applied(cost))
            }
            (Self::MoveCard { to }, Target::Card(card)) => {
                let owner = owner_of(scope.state, card)?;
                let children = move_card(scope, event, card, ZoneKey::new(owner, *to))?;
                Ok(Applied {
                    children,
                    ..Applied::applied(1)
                })
            }
            (Self::Play { upgrade_parent }, Target::Card(card)) => play(scope, ctx.player, card, *upgrade_parent),
            (Self::Detach, Target::Card(card)) => detach(scope, event, card),
            _ => Ok(Applied::no_effect()),
        }
    }
}

fn owner_of(state: &MatchState, card: EntityId) -> Result<PlayerId, EngineError> {
    state
        .card(card)
        .map(|c| c.owner)
        .ok_or(EngineError::UnknownEntity(card))
}

fn take_amber(state: &mut MatchState, from: PlayerId, amount: u32) -> u32 {
    let player = state.player_mut(from);
    let taken = player.amber.min(amount);
    player.amber -= taken;
    taken
}

fn can_play(
    state: &MatchState,
    player: PlayerId,
    card: EntityId,
    parent: Option<EntityId>,
) -> Result<bool, EngineError> {
    let Some(instance) = state.card(card) else {
        return Ok(false);
    };
    if instance.zone != ZoneKey::new(player, Zone::Hand) {
        return Ok(false);
    }
    let definition = state.definition(card)?;
    Ok(match parent {
        Some(parent) => parent != card && definition.can_be_upgrade() && state.is_creature_in_play(parent)?,
        None => definition.card_type != CardType::Upgrade,
    })
}

fn deal_damage(
    scope: &mut ActionScope<'_>,
    event: &GameEvent,
    card: EntityId,
    amount: u32,
) -> Result<Applied, EngineError> {
    if amount == 0 {
        return Ok(Applied::no_effect());
    }
    scope.state.card_mut(card)?.add_tokens(Token::Damage, i64::from(amount));

    let mut applied = Applied::applied(amount);
    if scope.state.remaining_health(card)? <= 0 {
        let destroy = GameAction::Destroy;
        let ctx = ActionContext::of(event, scope.state.active_player());
        applied.children.push(PendingEvent {
            event: destroy.event_for(Some(Target::Card(card)), &ctx).by_damage(),
            action: destroy,
        });
    }
    Ok(applied)
}

/// Draw up to `count` cards, reshuffling the discard into an empty deck.
fn draw(state: &mut MatchState, player: PlayerId, count: u32) -> Result<u32, EngineError> {
    let deck = ZoneKey::new(player, Zone::Deck);
    let discard = ZoneKey::new(player, Zone::Discard);
    let hand = ZoneKey::new(player, Zone::Hand);

    let mut drawn = 0;
    while drawn < count {
        if state.zones().zone_size(deck) == 0 {
            if state.move_zone(discard, deck) == 0 {
                break;
            }
            state.shuffle(deck);
            tracing::debug!(%player, "reshuffled discard into deck");
        }
        let Some(top) = state.zones().top_card(deck) else {
            break;
        };
        state.move_card(top, hand, ZonePosition::Top)?;
        drawn += 1;
    }
    Ok(drawn)
}

/// Move a card, handling the leave-play cleanup. Returns child events.
fn move_card(
    scope: &mut ActionScope<'_>,
    event: &GameEvent,
    card: EntityId,
    to: ZoneKey,
) -> Result<Vec<PendingEvent>, EngineError> {
    let leaving_play = scope.state.in_play(card) && to.zone != Zone::PlayArea;
    let children = if leaving_play {
        leave_play(scope, event, card)?
    } else {
        Vec::new()
    };
    scope.state.move_card(card, to, ZonePosition::Top)?;
    Ok(children)
}

/// Cleanup for a card leaving play.
fn leave_play(
    scope: &mut ActionScope<'_>,
    event: &GameEvent,
    card: EntityId,
) -> Result<Vec<PendingEvent>, EngineError> {
    let attached = scope.state.attached_to(card)?;
    let removed = scope.bus.remove_for_source(card);

    let instance = scope.state.card_mut(card)?;
    let captured = instance.tokens(Token::Amber);
    let controller = instance.controller;
    instance.clear_tokens();
    instance.parent = None;
    instance.controller = instance.owner;
    if captured > 0 {
        scope.state.player_mut(controller.opponent()).amber += captured as u32;
    }
    tracing::trace!(%card, removed, attached = attached.len(), "card left play");

    let ctx = ActionContext::of(event, scope.state.active_player());
    let discard = GameAction::MoveCard { to: Zone::Discard };
    let mut children = Vec::with_capacity(attached.len());
    for upgrade in attached {
        scope.state.card_mut(upgrade)?.parent = None;
        children.push(PendingEvent {
            event: discard.event_for(Some(Target::Card(upgrade)), &ctx),
            action: discard.clone(),
        });
    }
    Ok(children)
}

fn play(
    scope: &mut ActionScope<'_>,
    player: PlayerId,
    card: EntityId,
    parent: Option<EntityId>,
) -> Result<Applied, EngineError> {
    let definition = Arc::clone(scope.state.definition(card)?);
    scope.state.player_mut(player).cards_played_this_turn += 1;

    let controller = match parent {
        Some(parent_id) => scope
            .state
            .card(parent_id)
            .map(|p| p.controller)
            .ok_or(EngineError::UnknownEntity(parent_id))?,
        None => player,
    };

    if definition.card_type == CardType::Action {
        let owner = owner_of(scope.state, card)?;
        scope
            .state
            .move_card(card, ZoneKey::new(owner, Zone::Discard), ZonePosition::Top)?;
    } else {
        scope
            .state
            .move_card(card, ZoneKey::new(controller, Zone::PlayArea), ZonePosition::Top)?;
        let instance = scope.state.card_mut(card)?;
        instance.controller = controller;
        instance.parent = parent;
        scope.state.check_attachment(card)?;

        for ability in definition.reactions() {
            scope.bus.subscribe_ability(card, controller, ability);
        }
    }

    let enhancements = scope
        .state
        .card(card)
        .map(|c| c.enhancements.clone())
        .unwrap_or_default();
    let icons = in_resolution_order(definition.bonus_icons.iter().copied().chain(enhancements));

    let mut applied = Applied::applied(1);
    applied.own = icons
        .into_iter()
        .map(|icon| Arc::new(icon.bonus_ability()))
        .chain(definition.play_abilities().cloned())
        .map(|ability| Reaction::Own {
            ability,
            source: card,
            controller: player,
        })
        .collect();
    Ok(applied)
}

fn detach(scope: &mut ActionScope<'_>, event: &GameEvent, card: EntityId) -> Result<Applied, EngineError> {
    scope.state.check_attachment(card)?;
    scope.state.card_mut(card)?.parent = None;

    let mut applied = Applied::applied(1);
    if scope.state.definition(card)?.card_type == CardType::Upgrade {
        let discard = GameAction::MoveCard { to: Zone::Discard };
        let ctx = ActionContext::of(event, scope.state.active_player());
        applied.children.push(PendingEvent {
            event: discard.event_for(Some(Target::Card(card)), &ctx),
            action: discard,
        });
    }
    Ok(applied)
}
