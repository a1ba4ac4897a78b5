//! Ingredients: skewer two half-fillings onto the stick, in arrival order.

use tracing::debug;

use crate::event::CookingEvent;
use crate::id::{FillingId, ZoneId};
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::Station;

#[derive(Debug, Default, Clone)]
pub struct IngredientPhase {
    placed: u8,
}

impl IngredientPhase {
    /// Number of filling slots assigned so far.
    pub fn placed(&self) -> u8 {
        self.placed
    }
}

impl PhaseHandler for IngredientPhase {
    fn phase(&self) -> Phase {
        Phase::Ingredient
    }

    fn is_complete(&self) -> bool {
        self.placed >= 2
    }

    fn place_filling(
        &mut self,
        ctx: &mut PhaseContext<'_>,
        filling: FillingId,
        zone: Option<ZoneId>,
    ) -> Outcome {
        if self.is_complete() {
            return Outcome::Ignored;
        }
        match ctx.targets(zone, Station::IngredientBoard) {
            None => Outcome::Ignored,
            Some(false) => {
                ctx.events.emit(CookingEvent::FillingDiscarded { filling });
                Outcome::Discarded
            }
            Some(true) => {
                // Slots fill in arrival order and are never swapped.
                let slot = if ctx.item.filling1.is_none() {
                    ctx.item.filling1 = Some(filling);
                    1
                } else {
                    ctx.item.filling2 = Some(filling);
                    2
                };
                self.placed = slot;
                debug!(slot, ?filling, "filling placed");
                ctx.events.emit(CookingEvent::FillingPlaced { slot, filling });
                if self.is_complete() {
                    Outcome::Completed
                } else {
                    Outcome::Accepted
                }
            }
        }
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_u8(self.placed);
    }
}
