//! Batter: dip the skewered item and hold it in the vat.
//!
//! A dwell timer runs while the dragged item stays inside the batter zone and
//! drops to zero the moment it leaves. The coating stage follows from the
//! dwell time (see [`stage_for`]). Lifting the item out with at least one
//! stage completes the phase; reaching the top stage completes it on the spot.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::CookingEvent;
use crate::id::ZoneId;
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::{Point, Station};

/// Absorbs float drift from summing per-frame deltas at stage boundaries.
const STAGE_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatterTuning {
    /// Seconds in the vat before the first stage.
    pub first_stage_delay: f64,
    /// Seconds per additional stage.
    pub time_per_stage: f64,
    pub max_stage: u8,
}

impl Default for BatterTuning {
    fn default() -> Self {
        Self {
            first_stage_delay: 0.7,
            time_per_stage: 1.5,
            max_stage: 3,
        }
    }
}

/// Coating stage reached after `dwell` seconds of continuous dipping.
///
/// 0 before `first_stage_delay`, then one more stage every
/// `time_per_stage`, capped at `max_stage`. Negative or NaN input is stage 0.
pub fn stage_for(tuning: &BatterTuning, dwell: f64) -> u8 {
    if !(dwell + STAGE_EPSILON >= tuning.first_stage_delay) {
        return 0;
    }
    let steps = ((dwell - tuning.first_stage_delay) / tuning.time_per_stage + STAGE_EPSILON).floor();
    (steps + 1.0).min(f64::from(tuning.max_stage)) as u8
}

#[derive(Debug, Default, Clone)]
pub struct BatterPhase {
    dwell: f64,
    inside: bool,
    stage: u8,
    complete: bool,
}

impl BatterPhase {
    /// Seconds of continuous dipping so far.
    pub fn dwell(&self) -> f64 {
        self.dwell
    }

    /// The stage the current dip has reached.
    pub fn stage(&self) -> u8 {
        self.stage
    }

    fn in_vat(ctx: &mut PhaseContext<'_>, point: Point) -> bool {
        ctx.require_zone(Station::BatterVat)
            .is_some_and(|vat| ctx.zones.contains(vat, point))
    }

    fn is_dragging(ctx: &PhaseContext<'_>) -> bool {
        ctx.counter.current().is_some_and(|(_, p)| p.dragging)
    }

    fn reset_dip(&mut self) {
        self.dwell = 0.0;
        self.stage = 0;
    }

    fn commit(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        ctx.item.batter_stage = ctx.item.batter_stage.max(self.stage);
        self.complete = true;
        debug!(stage = self.stage, dwell = self.dwell, "batter done");
        Outcome::Completed
    }
}

impl PhaseHandler for BatterPhase {
    fn phase(&self) -> Phase {
        Phase::Batter
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn drag_begin(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        let outcome = ctx.lift();
        if outcome == Outcome::Accepted {
            self.reset_dip();
            let position = ctx.counter.current().map(|(_, p)| p.position);
            self.inside = position.is_some_and(|p| Self::in_vat(ctx, p));
        }
        outcome
    }

    fn drag_move(&mut self, ctx: &mut PhaseContext<'_>, point: Point) -> Outcome {
        if self.complete || ctx.follow(point) == Outcome::Ignored {
            return Outcome::Ignored;
        }
        let now_inside = Self::in_vat(ctx, point);
        if self.inside && !now_inside {
            if self.stage >= 1 {
                self.inside = false;
                return self.commit(ctx);
            }
            self.reset_dip();
        }
        self.inside = now_inside;
        Outcome::Accepted
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>, dt: f64) -> Outcome {
        if self.complete || !self.inside || !Self::is_dragging(ctx) {
            return Outcome::Ignored;
        }
        let tuning = &ctx.config.batter;
        self.dwell += dt;
        let stage = stage_for(tuning, self.dwell);
        if stage > self.stage {
            self.stage = stage;
            ctx.events.emit(CookingEvent::BatterStageChanged { stage });
        }
        if self.stage >= tuning.max_stage {
            return self.commit(ctx);
        }
        Outcome::Accepted
    }

    fn drag_end(&mut self, ctx: &mut PhaseContext<'_>, _zone: Option<ZoneId>) -> Outcome {
        if self.complete || !Self::is_dragging(ctx) {
            return Outcome::Ignored;
        }
        self.inside = false;
        if self.stage >= 1 {
            if let Some((_, piece)) = ctx.counter.current_mut() {
                let at = piece.position;
                piece.settle(at);
            }
            return self.commit(ctx);
        }
        // Not coated yet: back to where it was, nothing recorded.
        self.reset_dip();
        ctx.revert_item()
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_f64(self.dwell);
        hash.write_bool(self.inside);
        hash.write_u8(self.stage);
        hash.write_bool(self.complete);
    }
}
