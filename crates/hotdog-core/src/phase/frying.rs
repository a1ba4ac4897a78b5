//! Frying: time in the oil decides the color.
//!
//! The timer only runs while the item sits in the fryer. Lifting it out for a
//! look pauses the timer, dropping it back resumes it; a drop anywhere but the
//! fryer or the cooling rack puts it back in the oil. Elapsed time is never
//! reset within an item.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::CookingEvent;
use crate::id::ZoneId;
use crate::item::FryingColor;
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::{Point, Station};

/// Color thresholds, in seconds of frying.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FryingTuning {
    pub yellow_at: f64,
    pub golden_at: f64,
    pub brown_at: f64,
    pub burnt_at: f64,
}

impl Default for FryingTuning {
    fn default() -> Self {
        Self {
            yellow_at: 3.0,
            golden_at: 7.0,
            brown_at: 9.0,
            burnt_at: 11.0,
        }
    }
}

/// Color after `elapsed` seconds in the oil. Never moves backwards as time
/// grows; NaN and negative input are `Raw`.
pub fn color_for(tuning: &FryingTuning, elapsed: f64) -> FryingColor {
    if elapsed >= tuning.burnt_at {
        FryingColor::Burnt
    } else if elapsed >= tuning.brown_at {
        FryingColor::Brown
    } else if elapsed >= tuning.golden_at {
        FryingColor::Golden
    } else if elapsed >= tuning.yellow_at {
        FryingColor::Yellow
    } else {
        FryingColor::Raw
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FryState {
    /// Not yet in the oil.
    #[default]
    Waiting,
    Frying,
    /// Held above the oil; timer paused.
    Lifted,
}

#[derive(Debug, Default, Clone)]
pub struct FryingPhase {
    state: FryState,
    elapsed: f64,
    color: FryingColor,
    complete: bool,
}

impl FryingPhase {
    pub fn state(&self) -> FryState {
        self.state
    }

    /// Seconds spent in the oil so far.
    pub fn elapsed(&self) -> f64 {
        self.elapsed
    }

    pub fn color(&self) -> FryingColor {
        self.color
    }

    fn has_fried(&self) -> bool {
        self.state != FryState::Waiting
    }

    fn start(&mut self, ctx: &mut PhaseContext<'_>) {
        if self.state != FryState::Frying {
            self.state = FryState::Frying;
            ctx.events.emit(CookingEvent::FryingStarted);
        }
    }
}

impl PhaseHandler for FryingPhase {
    fn phase(&self) -> Phase {
        Phase::Frying
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn tick(&mut self, ctx: &mut PhaseContext<'_>, dt: f64) -> Outcome {
        if self.complete || self.state != FryState::Frying {
            return Outcome::Ignored;
        }
        self.elapsed += dt;
        let color = color_for(&ctx.config.frying, self.elapsed);
        if color != self.color {
            self.color = color;
            debug!(%color, elapsed = self.elapsed, "frying color changed");
            ctx.events.emit(CookingEvent::FryingColorChanged { color });
        }
        Outcome::Accepted
    }

    fn drag_begin(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        let outcome = ctx.lift();
        if outcome == Outcome::Accepted && self.state == FryState::Frying {
            self.state = FryState::Lifted;
            ctx.events.emit(CookingEvent::FryingPaused);
        }
        outcome
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
        let Some(fryer) = ctx.require_zone(Station::Fryer) else {
            return Outcome::Ignored;
        };

        if zone == Some(fryer) {
            ctx.settle_item(Station::Fryer, fryer);
            self.start(ctx);
            return Outcome::Accepted;
        }

        let on_rack = zone.is_some() && ctx.targets(zone, Station::CoolingRack) == Some(true);
        if on_rack && self.has_fried() {
            if let Some(rack) = zone {
                ctx.settle_item(Station::CoolingRack, rack);
            }
            self.complete = true;
            self.state = FryState::Waiting;
            ctx.item.frying_elapsed = self.elapsed;
            ctx.item.frying_color = self.color;
            debug!(color = %self.color, elapsed = self.elapsed, "frying done");
            return Outcome::Completed;
        }

        // Anywhere else: back to the last resting place. Once the item has
        // been in the oil that is the fryer, and the timer resumes.
        let outcome = ctx.revert_item();
        if self.has_fried() {
            self.start(ctx);
        }
        outcome
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_u8(self.state as u8);
        hash.write_f64(self.elapsed);
        hash.write_u8(self.color as u8);
        hash.write_bool(self.complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[test]
    fn color_boundaries() {
        let t = FryingTuning::default();
        let cases = [
            (0.0, FryingColor::Raw),
            (2.999, FryingColor::Raw),
            (3.0, FryingColor::Yellow),
            (6.999, FryingColor::Yellow),
            (7.0, FryingColor::Golden),
            (8.999, FryingColor::Golden),
            (9.0, FryingColor::Brown),
            (10.999, FryingColor::Brown),
            (11.0, FryingColor::Burnt),
            (500.0, FryingColor::Burnt),
        ];
        for (t_secs, expected) in cases {
            assert_eq!(color_for(&t, t_secs), expected, "at {t_secs}s");
        }
        assert_eq!(color_for(&t, f64::NAN), FryingColor::Raw);
    }

    fn into_oil(k: &mut Kitchen, phase: &mut FryingPhase) {
        let fryer = k.zone(Station::Fryer);
        phase.drag_begin(&mut k.ctx());
        phase.drag_move(&mut k.ctx(), FRYER_CENTER);
        assert_eq!(phase.drag_end(&mut k.ctx(), Some(fryer)), Outcome::Accepted);
        assert_eq!(phase.state(), FryState::Frying);
    }

    #[test]
    fn timer_waits_for_the_oil() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        assert_eq!(phase.tick(&mut k.ctx(), 4.0), Outcome::Ignored);
        assert_eq!(phase.elapsed(), 0.0);

        into_oil(&mut k, &mut phase);
        phase.tick(&mut k.ctx(), 4.0);
        assert_eq!(phase.elapsed(), 4.0);
        assert_eq!(phase.color(), FryingColor::Yellow);
    }

    #[test]
    fn lifting_pauses_and_dropping_back_resumes() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        into_oil(&mut k, &mut phase);
        phase.tick(&mut k.ctx(), 2.0);

        assert_eq!(phase.drag_begin(&mut k.ctx()), Outcome::Accepted);
        assert_eq!(phase.state(), FryState::Lifted);
        phase.tick(&mut k.ctx(), 10.0);
        assert_eq!(phase.elapsed(), 2.0);

        let fryer = k.zone(Station::Fryer);
        phase.drag_end(&mut k.ctx(), Some(fryer));
        phase.tick(&mut k.ctx(), 1.0);
        assert_eq!(phase.elapsed(), 3.0);
    }

    #[test]
    fn invalid_drop_returns_to_fryer_without_resetting_time() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        into_oil(&mut k, &mut phase);
        phase.tick(&mut k.ctx(), 5.0);

        phase.drag_begin(&mut k.ctx());
        phase.drag_move(&mut k.ctx(), OUTSIDE);
        assert_eq!(phase.drag_end(&mut k.ctx(), None), Outcome::Reverted);
        assert_eq!(phase.state(), FryState::Frying);
        assert_eq!(k.counter.current().unwrap().1.position, FRYER_CENTER);

        phase.tick(&mut k.ctx(), 2.5);
        assert_eq!(phase.elapsed(), 7.5);
        assert_eq!(phase.color(), FryingColor::Golden);
    }

    #[test]
    fn cooling_rack_records_color_and_time() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        into_oil(&mut k, &mut phase);
        for _ in 0..80 {
            phase.tick(&mut k.ctx(), 0.1);
        }

        let rack = k.zone(Station::CoolingRack);
        phase.drag_begin(&mut k.ctx());
        assert_eq!(phase.drag_end(&mut k.ctx(), Some(rack)), Outcome::Completed);
        assert_eq!(k.item.frying_color, FryingColor::Golden);
        assert!((k.item.frying_elapsed - 8.0).abs() < 1e-9);

        // Timer is stopped for good.
        assert_eq!(phase.tick(&mut k.ctx(), 10.0), Outcome::Ignored);
        assert_eq!(k.item.frying_color, FryingColor::Golden);
    }

    #[test]
    fn cooling_rack_before_frying_is_refused() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        let rack = k.zone(Station::CoolingRack);
        phase.drag_begin(&mut k.ctx());
        assert_eq!(phase.drag_end(&mut k.ctx(), Some(rack)), Outcome::Reverted);
        assert!(!phase.is_complete());
        assert_eq!(k.counter.current().unwrap().1.position, PREP_CENTER);
    }

    #[test]
    fn color_events_follow_thresholds() {
        let mut k = Kitchen::with_item_at(PREP_CENTER);
        let mut phase = FryingPhase::default();
        into_oil(&mut k, &mut phase);
        for _ in 0..12 {
            phase.tick(&mut k.ctx(), 1.0);
        }
        // Yellow, Golden, Brown, Burnt.
        assert_eq!(
            k.events.total_emitted(crate::event::EventKind::FryingColorChanged),
            4
        );
        assert_eq!(phase.color(), FryingColor::Burnt);
    }
}
