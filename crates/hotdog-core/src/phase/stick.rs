//! Stick pickup: take a bare stick and set it down on the preparation board.

use tracing::debug;

use crate::event::CookingEvent;
use crate::id::ZoneId;
use crate::item::ItemState;
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::{Point, Station};

#[derive(Debug, Default, Clone)]
pub struct StickPickupPhase {
    complete: bool,
}

impl PhaseHandler for StickPickupPhase {
    fn phase(&self) -> Phase {
        Phase::StickPickup
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn pick_up(&mut self, ctx: &mut PhaseContext<'_>, at: Point) -> Outcome {
        // One stick in hand at a time.
        if self.complete || ctx.counter.current_id().is_some() {
            return Outcome::Ignored;
        }
        let id = ctx.counter.create(at);
        if let Some((_, piece)) = ctx.counter.current_mut() {
            piece.dragging = true;
        }
        debug!(?id, "stick picked up");
        ctx.events.emit(CookingEvent::ItemCreated { item: id });
        Outcome::Accepted
    }

    fn drag_begin(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        ctx.lift()
    }

    fn drag_move(&mut self, ctx: &mut PhaseContext<'_>, point: Point) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        ctx.follow(point)
    }

    fn drag_end(&mut self, ctx: &mut PhaseContext<'_>, zone: Option<ZoneId>) -> Outcome {
        if self.complete || ctx.counter.current_id().is_none() {
            return Outcome::Ignored;
        }
        match ctx.targets(zone, Station::Preparation) {
            None => Outcome::Ignored,
            Some(true) => {
                if let Some(prep) = zone {
                    ctx.settle_item(Station::Preparation, prep);
                }
                self.complete = true;
                Outcome::Completed
            }
            Some(false) => {
                // Dropped anywhere else: the stick is gone and nothing is kept.
                if let Some(id) = ctx.counter.discard() {
                    debug!(?id, "stick dropped outside the preparation board");
                    ctx.events.emit(CookingEvent::ItemDiscarded { item: id });
                }
                *ctx.item = ItemState::new();
                Outcome::Discarded
            }
        }
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_bool(self.complete);
    }
}
