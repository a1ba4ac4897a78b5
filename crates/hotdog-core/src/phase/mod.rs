//! The six cooking phases and the handler seam the controller drives.
//!
//! Each phase is a small state machine behind the [`PhaseHandler`] trait.
//! Handlers receive placement and timing input through a [`PhaseContext`]
//! (the item, the counter, the zone lookup, the event bus and the tuning),
//! keep their own working state, and commit results into [`ItemState`] when
//! their exit condition is met. They never advance the pipeline themselves:
//! returning [`Outcome::Completed`] is the completion signal.

pub mod batter;
pub mod completion;
pub mod frying;
pub mod ingredient;
pub mod stick;
pub mod topping;

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::KitchenConfig;
use crate::event::{CookingEvent, EventBus};
use crate::id::{FillingId, ZoneId};
use crate::item::{Counter, ItemState, SauceKind};
use crate::replay::StateHash;
use crate::zone::{Point, Station, ZoneLookup};

use batter::BatterPhase;
use completion::CompletionPhase;
use frying::FryingPhase;
use ingredient::IngredientPhase;
use stick::StickPickupPhase;
use topping::ToppingPhase;

// ---------------------------------------------------------------------------
// Phase tag
// ---------------------------------------------------------------------------

/// Where the pipeline is. `Completed` is the serving step: the item is
/// finished and waits to be handed over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    #[default]
    None,
    StickPickup,
    Ingredient,
    Batter,
    Frying,
    Topping,
    Completed,
}

impl Phase {
    /// The fixed successor. `Completed` and `None` have none.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::StickPickup => Some(Phase::Ingredient),
            Phase::Ingredient => Some(Phase::Batter),
            Phase::Batter => Some(Phase::Frying),
            Phase::Frying => Some(Phase::Topping),
            Phase::Topping => Some(Phase::Completed),
            Phase::Completed | Phase::None => None,
        }
    }

    pub fn is_active(self) -> bool {
        self != Phase::None
    }

    fn tag(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Phase::None => "none",
            Phase::StickPickup => "stick pickup",
            Phase::Ingredient => "ingredient",
            Phase::Batter => "batter",
            Phase::Frying => "frying",
            Phase::Topping => "topping",
            Phase::Completed => "completed",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// What an input did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// State changed; the phase continues.
    Accepted,
    /// Not applicable right now (wrong phase, duplicate trigger). No change.
    Ignored,
    /// Invalid drop: the item went back to its last accepted position.
    Reverted,
    /// The created item or ingredient was thrown away.
    Discarded,
    /// Refused by a game rule (sugar after sauce).
    Denied,
    /// The phase's exit condition is met.
    Completed,
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// Mutable view handed to the active handler for one input.
pub struct PhaseContext<'a> {
    pub item: &'a mut ItemState,
    pub counter: &'a mut Counter,
    pub zones: &'a dyn ZoneLookup,
    pub events: &'a mut EventBus,
    pub config: &'a KitchenConfig,
}

impl PhaseContext<'_> {
    /// The zone for `station`. Reports a missing zone to the host.
    pub fn require_zone(&mut self, station: Station) -> Option<ZoneId> {
        let zone = self.zones.station_zone(station);
        if zone.is_none() {
            warn!(%station, "no zone configured; ignoring action");
            self.events.emit(CookingEvent::ZoneMissing { station });
        }
        zone
    }

    /// Whether `target` is the zone of `station`. `None` if the station has
    /// no zone (already reported).
    pub fn targets(&mut self, target: Option<ZoneId>, station: Station) -> Option<bool> {
        let zone = self.require_zone(station)?;
        Some(target == Some(zone))
    }

    /// Move the dragged item to follow the pointer.
    pub fn follow(&mut self, point: Point) -> Outcome {
        match self.counter.current_mut() {
            Some((_, piece)) if piece.dragging => {
                piece.position = point;
                Outcome::Accepted
            }
            _ => Outcome::Ignored,
        }
    }

    /// Mark the current item as picked up.
    pub fn lift(&mut self) -> Outcome {
        match self.counter.current_mut() {
            Some((_, piece)) if !piece.dragging => {
                piece.dragging = true;
                Outcome::Accepted
            }
            _ => Outcome::Ignored,
        }
    }

    /// Put the current item back where it last rested.
    pub fn revert_item(&mut self) -> Outcome {
        let Some((id, piece)) = self.counter.current_mut() else {
            return Outcome::Ignored;
        };
        piece.revert();
        let to = piece.rest;
        self.events.emit(CookingEvent::ItemReverted { item: id, to });
        Outcome::Reverted
    }

    /// Snap the current item into `zone` and accept it there.
    pub fn settle_item(&mut self, station: Station, zone: ZoneId) {
        let snap = self.zones.snap_point(zone);
        if let Some((id, piece)) = self.counter.current_mut() {
            let at = snap.unwrap_or(piece.position);
            piece.settle(at);
            self.events.emit(CookingEvent::ItemPlaced { item: id, station });
        }
    }
}

// ---------------------------------------------------------------------------
// Handler trait
// ---------------------------------------------------------------------------

/// One phase of the pipeline. Every input defaults to [`Outcome::Ignored`],
/// so a handler only overrides the inputs its phase reacts to.
pub trait PhaseHandler: fmt::Debug {
    fn phase(&self) -> Phase;

    /// Whether the exit condition has been met.
    fn is_complete(&self) -> bool;

    /// Called once when the controller makes this phase current.
    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>) {
        let _ = ctx;
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>, dt: f64) -> Outcome {
        let _ = (ctx, dt);
        Outcome::Ignored
    }

    fn pick_up(&mut self, ctx: &mut PhaseContext<'_>, at: Point) -> Outcome {
        let _ = (ctx, at);
        Outcome::Ignored
    }

    fn drag_begin(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Ignored
    }

    fn drag_move(&mut self, ctx: &mut PhaseContext<'_>, point: Point) -> Outcome {
        let _ = (ctx, point);
        Outcome::Ignored
    }

    fn drag_end(&mut self, ctx: &mut PhaseContext<'_>, zone: Option<ZoneId>) -> Outcome {
        let _ = (ctx, zone);
        Outcome::Ignored
    }

    fn place_filling(
        &mut self,
        ctx: &mut PhaseContext<'_>,
        filling: FillingId,
        zone: Option<ZoneId>,
    ) -> Outcome {
        let _ = (ctx, filling, zone);
        Outcome::Ignored
    }

    fn apply_sugar(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Ignored
    }

    fn select_sauce(&mut self, ctx: &mut PhaseContext<'_>, sauce: SauceKind) -> Outcome {
        let _ = (ctx, sauce);
        Outcome::Ignored
    }

    fn draw_to(&mut self, ctx: &mut PhaseContext<'_>, point: Point) -> Outcome {
        let _ = (ctx, point);
        Outcome::Ignored
    }

    fn draw_end(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Ignored
    }

    /// The explicit "finish" trigger from the host UI.
    fn finish(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        let _ = ctx;
        Outcome::Ignored
    }

    /// Feed working state into a determinism hash.
    fn hash_into(&self, hash: &mut StateHash) {
        let _ = hash;
    }
}

// ---------------------------------------------------------------------------
// Handler table
// ---------------------------------------------------------------------------

/// One handler per phase, built once per item and selected by phase tag.
#[derive(Debug, Default)]
pub struct HandlerTable {
    pub stick: StickPickupPhase,
    pub ingredient: IngredientPhase,
    pub batter: BatterPhase,
    pub frying: FryingPhase,
    pub topping: ToppingPhase,
    pub completion: CompletionPhase,
}

impl HandlerTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, phase: Phase) -> Option<&dyn PhaseHandler> {
        match phase {
            Phase::None => None,
            Phase::StickPickup => Some(&self.stick),
            Phase::Ingredient => Some(&self.ingredient),
            Phase::Batter => Some(&self.batter),
            Phase::Frying => Some(&self.frying),
            Phase::Topping => Some(&self.topping),
            Phase::Completed => Some(&self.completion),
        }
    }

    pub fn get_mut(&mut self, phase: Phase) -> Option<&mut dyn PhaseHandler> {
        match phase {
            Phase::None => None,
            Phase::StickPickup => Some(&mut self.stick),
            Phase::Ingredient => Some(&mut self.ingredient),
            Phase::Batter => Some(&mut self.batter),
            Phase::Frying => Some(&mut self.frying),
            Phase::Topping => Some(&mut self.topping),
            Phase::Completed => Some(&mut self.completion),
        }
    }

    pub(crate) fn hash_into(&self, phase: Phase, hash: &mut StateHash) {
        hash.write_u8(phase.tag());
        if let Some(handler) = self.get(phase) {
            handler.hash_into(hash);
        }
    }
}
