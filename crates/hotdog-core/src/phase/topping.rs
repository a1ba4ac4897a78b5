//! Toppings: sugar or sauces, and the explicit finish trigger.
//!
//! Sugar is a single flip and is only allowed before any sauce is picked up.
//! Selecting a sauce locks sugar out for the rest of the phase, even if no
//! sauce is ever drawn. Sauce is drawn in strokes over the sauce canvas; each
//! unit of distance between consecutive in-canvas points drains the selected
//! gauge by `decrease_rate`, floored at zero.
//!
//! Nothing is written to the item until `finish`.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::event::CookingEvent;
use crate::item::SauceKind;
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::zone::{Point, Station};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SauceTuning {
    /// Gauge consumed per unit of drawing distance.
    pub decrease_rate: f32,
}

impl Default for SauceTuning {
    fn default() -> Self {
        Self { decrease_rate: 0.002 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Gauge {
    remaining: f32,
    used: bool,
}

impl Default for Gauge {
    fn default() -> Self {
        Self {
            remaining: 1.0,
            used: false,
        }
    }
}

impl Gauge {
    fn is_empty(&self) -> bool {
        self.remaining <= 0.0
    }

    /// Drain `amount`, returning the new level.
    fn drain(&mut self, amount: f32) -> f32 {
        self.remaining = (self.remaining - amount).max(0.0);
        self.used = true;
        self.remaining
    }
}

#[derive(Debug, Default, Clone)]
pub struct ToppingPhase {
    sugar: bool,
    sauce_locked: bool,
    selected: Option<SauceKind>,
    ketchup: Gauge,
    mustard: Gauge,
    /// Last in-canvas point of the current stroke.
    stroke: Option<Point>,
    complete: bool,
}

impl ToppingPhase {
    pub fn has_sugar(&self) -> bool {
        self.sugar
    }

    pub fn selected(&self) -> Option<SauceKind> {
        self.selected
    }

    /// Whether sugar is still allowed.
    pub fn sugar_allowed(&self) -> bool {
        !self.sauce_locked
    }

    /// Remaining level of a sauce gauge, 1.0 = full.
    pub fn gauge(&self, sauce: SauceKind) -> f32 {
        self.gauge_ref(sauce).remaining
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    fn gauge_ref(&self, sauce: SauceKind) -> &Gauge {
        match sauce {
            SauceKind::Ketchup => &self.ketchup,
            SauceKind::Mustard => &self.mustard,
        }
    }

    fn gauge_mut(&mut self, sauce: SauceKind) -> &mut Gauge {
        match sauce {
            SauceKind::Ketchup => &mut self.ketchup,
            SauceKind::Mustard => &mut self.mustard,
        }
    }
}

impl PhaseHandler for ToppingPhase {
    fn phase(&self) -> Phase {
        Phase::Topping
    }

    fn is_complete(&self) -> bool {
        self.complete
    }

    fn on_enter(&mut self, ctx: &mut PhaseContext<'_>) {
        self.ketchup.remaining = ctx.item.ketchup_amount;
        self.mustard.remaining = ctx.item.mustard_amount;
        self.sauce_locked = ctx.item.has_sauce();
    }

    fn apply_sugar(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        // Checked before the duplicate guard: sugar, sauce, sugar is denied.
        if self.sauce_locked {
            debug!("sugar refused after sauce");
            ctx.events.emit(CookingEvent::SugarDenied);
            return Outcome::Denied;
        }
        if self.sugar {
            return Outcome::Ignored;
        }
        self.sugar = true;
        ctx.events.emit(CookingEvent::SugarApplied);
        Outcome::Accepted
    }

    fn select_sauce(&mut self, ctx: &mut PhaseContext<'_>, sauce: SauceKind) -> Outcome {
        if self.complete || self.selected == Some(sauce) {
            return Outcome::Ignored;
        }
        self.selected = Some(sauce);
        self.sauce_locked = true;
        self.stroke = None;
        debug!(%sauce, "sauce selected");
        ctx.events.emit(CookingEvent::SauceSelected { sauce });
        Outcome::Accepted
    }

    fn draw_to(&mut self, ctx: &mut PhaseContext<'_>, point: Point) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        let Some(sauce) = self.selected else {
            return Outcome::Ignored;
        };
        if self.gauge_ref(sauce).is_empty() {
            return Outcome::Ignored;
        }
        let Some(canvas) = ctx.require_zone(Station::SauceCanvas) else {
            return Outcome::Ignored;
        };
        if !ctx.zones.contains(canvas, point) {
            // Off the canvas: the stroke is broken.
            self.stroke = None;
            return Outcome::Ignored;
        }

        let Some(prev) = self.stroke.replace(point) else {
            return Outcome::Accepted;
        };
        let amount = prev.distance(&point) * ctx.config.sauce.decrease_rate;
        if amount <= 0.0 {
            return Outcome::Accepted;
        }
        let remaining = self.gauge_mut(sauce).drain(amount);
        ctx.events.emit(CookingEvent::SauceGaugeChanged { sauce, remaining });
        if remaining <= 0.0 {
            debug!(%sauce, "sauce gauge exhausted");
            self.stroke = None;
            ctx.events.emit(CookingEvent::SauceDepleted { sauce });
        }
        Outcome::Accepted
    }

    fn draw_end(&mut self, _ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete || self.stroke.take().is_none() {
            return Outcome::Ignored;
        }
        Outcome::Accepted
    }

    fn finish(&mut self, ctx: &mut PhaseContext<'_>) -> Outcome {
        if self.complete {
            return Outcome::Ignored;
        }
        self.stroke = None;
        self.complete = true;

        let item = &mut *ctx.item;
        item.has_sugar = self.sugar;
        item.has_ketchup |= self.ketchup.used;
        item.has_mustard |= self.mustard.used;
        item.ketchup_amount = self.ketchup.remaining;
        item.mustard_amount = self.mustard.remaining;
        debug!(
            sugar = item.has_sugar,
            ketchup = item.has_ketchup,
            mustard = item.has_mustard,
            "toppings frozen"
        );
        Outcome::Completed
    }

    fn hash_into(&self, hash: &mut StateHash) {
        hash.write_bool(self.sugar);
        hash.write_bool(self.sauce_locked);
        hash.write_u8(match self.selected {
            None => 0,
            Some(SauceKind::Ketchup) => 1,
            Some(SauceKind::Mustard) => 2,
        });
        for gauge in [&self.ketchup, &self.mustard] {
            hash.write_u32(gauge.remaining.to_bits());
            hash.write_bool(gauge.used);
        }
        hash.write_bool(self.stroke.is_some());
        hash.write_bool(self.complete);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventKind;
    use crate::test_utils::*;

    fn entered(k: &mut Kitchen) -> ToppingPhase {
        let mut phase = ToppingPhase::default();
        phase.on_enter(&mut k.ctx());
        phase
    }

    fn canvas(x: f32) -> Point {
        Point::new(x, CANVAS_CENTER.y)
    }

    #[test]
    fn sugar_applies_once() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        assert_eq!(phase.apply_sugar(&mut k.ctx()), Outcome::Accepted);
        assert_eq!(phase.apply_sugar(&mut k.ctx()), Outcome::Ignored);
        assert_eq!(k.events.total_emitted(EventKind::SugarApplied), 1);
    }

    #[test]
    fn selecting_sauce_locks_out_sugar_even_unused() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        assert_eq!(phase.select_sauce(&mut k.ctx(), SauceKind::Mustard), Outcome::Accepted);

        assert_eq!(phase.apply_sugar(&mut k.ctx()), Outcome::Denied);
        assert!(!phase.has_sugar());
        assert_eq!(k.events.total_emitted(EventKind::SugarDenied), 1);

        phase.finish(&mut k.ctx());
        assert!(!k.item.has_sugar);
        assert!(!k.item.has_mustard);
        assert_eq!(k.item.mustard_amount, 1.0);
    }

    #[test]
    fn sugar_again_after_sauce_is_denied() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        assert_eq!(phase.apply_sugar(&mut k.ctx()), Outcome::Accepted);
        phase.select_sauce(&mut k.ctx(), SauceKind::Ketchup);
        phase.draw_to(&mut k.ctx(), canvas(460.0));
        phase.draw_to(&mut k.ctx(), canvas(560.0));

        assert_eq!(phase.apply_sugar(&mut k.ctx()), Outcome::Denied);
        assert_eq!(k.events.total_emitted(EventKind::SugarDenied), 1);
        assert_eq!(k.events.total_emitted(EventKind::SugarApplied), 1);

        phase.finish(&mut k.ctx());
        assert!(k.item.has_sugar);
        assert!(k.item.has_ketchup);
    }

    #[test]
    fn drawing_drains_by_distance() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        phase.select_sauce(&mut k.ctx(), SauceKind::Ketchup);

        assert_eq!(phase.draw_to(&mut k.ctx(), canvas(460.0)), Outcome::Accepted);
        assert_eq!(phase.gauge(SauceKind::Ketchup), 1.0);
        phase.draw_to(&mut k.ctx(), canvas(560.0));
        assert!((phase.gauge(SauceKind::Ketchup) - 0.8).abs() < 1e-5);
        assert_eq!(phase.gauge(SauceKind::Mustard), 1.0);
    }

    #[test]
    fn leaving_the_canvas_breaks_the_stroke() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        phase.select_sauce(&mut k.ctx(), SauceKind::Ketchup);
        phase.draw_to(&mut k.ctx(), canvas(460.0));
        assert_eq!(phase.draw_to(&mut k.ctx(), OUTSIDE), Outcome::Ignored);
        assert!(!phase.is_drawing());

        // Re-entering starts a fresh stroke: the jump is not charged.
        phase.draw_to(&mut k.ctx(), canvas(640.0));
        assert_eq!(phase.gauge(SauceKind::Ketchup), 1.0);
    }

    #[test]
    fn gauge_floors_at_zero_and_stops_drawing() {
        let mut k = Kitchen::standard();
        k.config.sauce.decrease_rate = 0.01;
        let mut phase = entered(&mut k);
        phase.select_sauce(&mut k.ctx(), SauceKind::Mustard);

        let mut x = 460.0;
        phase.draw_to(&mut k.ctx(), canvas(x));
        let mut last = phase.gauge(SauceKind::Mustard);
        for _ in 0..20 {
            x = if x > 550.0 { 460.0 } else { 640.0 };
            phase.draw_to(&mut k.ctx(), canvas(x));
            let now = phase.gauge(SauceKind::Mustard);
            assert!(now <= last);
            last = now;
        }
        assert_eq!(phase.gauge(SauceKind::Mustard), 0.0);
        assert_eq!(k.events.total_emitted(EventKind::SauceDepleted), 1);
        assert_eq!(phase.draw_to(&mut k.ctx(), canvas(500.0)), Outcome::Ignored);
    }

    #[test]
    fn draw_without_selection_is_ignored() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        assert_eq!(phase.draw_to(&mut k.ctx(), CANVAS_CENTER), Outcome::Ignored);
        assert_eq!(phase.draw_end(&mut k.ctx()), Outcome::Ignored);
        assert!(phase.sugar_allowed());
    }

    #[test]
    fn finish_freezes_toppings_once() {
        let mut k = Kitchen::standard();
        let mut phase = entered(&mut k);
        phase.select_sauce(&mut k.ctx(), SauceKind::Ketchup);
        phase.draw_to(&mut k.ctx(), canvas(460.0));
        phase.draw_to(&mut k.ctx(), canvas(510.0));
        phase.draw_end(&mut k.ctx());

        // Not written before finish.
        assert!(!k.item.has_ketchup);

        assert_eq!(phase.finish(&mut k.ctx()), Outcome::Completed);
        assert!(k.item.has_ketchup);
        assert!(!k.item.has_mustard);
        assert!((k.item.ketchup_amount - 0.9).abs() < 1e-5);
        assert_eq!(phase.finish(&mut k.ctx()), Outcome::Ignored);
        assert_eq!(phase.draw_to(&mut k.ctx(), canvas(600.0)), Outcome::Ignored);
    }

    #[test]
    fn missing_canvas_is_reported() {
        let mut k = Kitchen::without(Station::SauceCanvas);
        let mut phase = entered(&mut k);
        phase.select_sauce(&mut k.ctx(), SauceKind::Ketchup);
        assert_eq!(phase.draw_to(&mut k.ctx(), CANVAS_CENTER), Outcome::Ignored);
        assert_eq!(k.events.total_emitted(EventKind::ZoneMissing), 1);
    }
}
