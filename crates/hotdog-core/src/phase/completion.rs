//! Serving: hand the finished item over at the serving window.

use crate::id::ZoneId;
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::{Point, Station};

#[derive(Debug, Default, Clone)]
pub struct CompletionPhase {
    complete: bool,
}

impl PhaseHandler for CompletionPhase {
    fn phase(&self) -> Phase {
        Phase::Completed
    }

    fn is_complete(&self) -> bool {
        self.complete
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
        if self.complete || !ctx.counter.current().is_some_and(|(_, p)| p.dragging) {
            return Outcome::Ignored;
        }
        match ctx.targets(zone, Station::ServingWindow) {
            None => Outcome::Ignored,
            Some(true) => {
                if let Some(window) = zone {
                    ctx.settle_item(Station::ServingWindow, window);
                }
                self.complete = true;
                Outcome::Completed
            }
            // The player may retry as often as they like.
            Some(false) => ctx.revert_item(),
        }
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_bool(self.complete);
    }
}
