//! The phase controller: owns the session and drives the active handler.
//!
//! # Architecture
//!
//! The `PhaseController` owns:
//! - the zone lookup handed in by the host,
//! - the [`KitchenConfig`] tuning,
//! - the current [`OrderSpec`], [`ItemState`] and counter item,
//! - a [`HandlerTable`] with one handler per phase, rebuilt per item,
//! - the [`EventBus`] the presentation layer listens on,
//! - [`ShiftStats`] and the report of the last served session.
//!
//! # Call pipeline
//!
//! Every input method:
//! 1. checks for an active session (and a current item id, for drags),
//! 2. hands the input to the active phase handler,
//! 3. advances to the next phase if the handler completed and
//!    `auto_advance` is on (finishing the session after the serving step),
//! 4. delivers the buffered events.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{KitchenConfig, RestartPolicy};
use crate::error::CookingError;
use crate::event::{CookingEvent, EventBus, EventKind, EventListener};
use crate::id::{FillingId, ItemId, ZoneId};
use crate::item::{Counter, ItemState, OrderSpec, SauceKind, Workpiece};
use crate::order::OrderSource;
use crate::phase::{HandlerTable, Outcome, Phase, PhaseContext, PhaseHandler};
use crate::replay::StateHash;
use crate::scoring::{self, ScoreBreakdown};
use crate::stats::ShiftStats;
use crate::zone::{Point, Station, ZoneLookup};

/// What a served session came to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionReport {
    pub order: OrderSpec,
    /// The item as it was handed over.
    pub item: ItemState,
    pub breakdown: ScoreBreakdown,
    pub score: u32,
}

#[derive(Debug)]
pub struct PhaseController {
    zones: Box<dyn ZoneLookup>,
    config: KitchenConfig,
    events: EventBus,
    counter: Counter,
    item: ItemState,
    order: Option<OrderSpec>,
    handlers: HandlerTable,
    phase: Phase,
    last_report: Option<SessionReport>,
    stats: ShiftStats,
}

impl PhaseController {
    /// Build an idle controller. Fails if the tuning does not validate.
    pub fn new(zones: impl ZoneLookup + 'static, config: KitchenConfig) -> Result<Self, CookingError> {
        config.validate()?;
        Ok(Self {
            zones: Box::new(zones),
            events: EventBus::new(config.event_capacity),
            config,
            counter: Counter::new(),
            item: ItemState::new(),
            order: None,
            handlers: HandlerTable::new(),
            phase: Phase::None,
            last_report: None,
            stats: ShiftStats::new(),
        })
    }

    // -----------------------------------------------------------------------
    // Session lifecycle
    // -----------------------------------------------------------------------

    /// Begin cooking for `order` with a fresh item.
    ///
    /// While a session is running the restart policy decides: the running
    /// session is abandoned, or the call fails with `SessionActive`.
    pub fn start_session(&mut self, order: OrderSpec) -> Result<(), CookingError> {
        if self.phase.is_active() {
            match self.config.restart_policy {
                RestartPolicy::Reject => return Err(CookingError::SessionActive),
                RestartPolicy::DiscardAndRestart => {
                    debug!(phase = %self.phase, "restarting over a running session");
                    self.abandon();
                }
            }
        }
        self.counter.discard();
        self.item = ItemState::new();
        self.handlers = HandlerTable::new();
        self.order = Some(order);
        debug!(?order, "session started");
        self.events.emit(CookingEvent::SessionStarted { order });
        self.enter(Phase::StickPickup);
        self.events.deliver();
        Ok(())
    }

    /// Start a session with the next order from `source`. `Ok(None)` when
    /// the source has run dry.
    pub fn start_next_session(
        &mut self,
        source: &mut dyn OrderSource,
    ) -> Result<Option<OrderSpec>, CookingError> {
        if self.phase.is_active() && self.config.restart_policy == RestartPolicy::Reject {
            return Err(CookingError::SessionActive);
        }
        let Some(order) = source.next_order() else {
            return Ok(None);
        };
        self.start_session(order)?;
        Ok(Some(order))
    }

    /// Move to the next phase by hand. Only needed with `auto_advance` off.
    pub fn advance(&mut self) -> Result<Phase, CookingError> {
        self.require_active()?;
        let complete = self.handlers.get(self.phase).is_some_and(|h| h.is_complete());
        if !complete {
            return Err(CookingError::PhaseIncomplete { phase: self.phase });
        }
        self.step_phase();
        self.events.deliver();
        Ok(self.phase)
    }

    /// Throw the item away and start over at stick pickup. The order stays.
    pub fn scrap(&mut self) -> Result<Outcome, CookingError> {
        self.require_active()?;
        let outcome = self.scrap_item();
        self.events.deliver();
        Ok(outcome)
    }

    /// End the session without serving.
    pub fn abandon_session(&mut self) -> Result<(), CookingError> {
        self.require_active()?;
        self.abandon();
        self.events.deliver();
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Inputs
    // -----------------------------------------------------------------------

    /// Advance the active handler's timers by `dt` seconds. Negative or
    /// non-finite deltas count as zero. Ignored while idle.
    pub fn tick(&mut self, dt: f64) -> Result<Outcome, CookingError> {
        if !self.phase.is_active() {
            return Ok(Outcome::Ignored);
        }
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!(dt, "malformed frame delta; treating as 0");
            0.0
        };
        self.dispatch(|h, ctx| h.tick(ctx, dt))
    }

    pub fn pick_up(&mut self, at: Point) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.pick_up(ctx, at))
    }

    pub fn drag_begin(&mut self, item: ItemId) -> Result<Outcome, CookingError> {
        self.require_item(item)?;
        self.dispatch(|h, ctx| h.drag_begin(ctx))
    }

    pub fn drag_move(&mut self, item: ItemId, point: Point) -> Result<Outcome, CookingError> {
        self.require_item(item)?;
        self.dispatch(|h, ctx| h.drag_move(ctx, point))
    }

    /// Release the dragged item over `zone`. A drop on the trash bin scraps
    /// the item whatever the phase; a handler that destroys the item on
    /// release counts as a scrap too.
    pub fn drag_end(&mut self, item: ItemId, zone: Option<ZoneId>) -> Result<Outcome, CookingError> {
        self.require_item(item)?;
        let dragging = self.counter.current().is_some_and(|(_, p)| p.dragging);
        let on_trash = zone.is_some_and(|z| self.zones.station_of(z) == Some(Station::TrashBin));
        if dragging && on_trash {
            let outcome = self.scrap_item();
            self.events.deliver();
            return Ok(outcome);
        }
        let outcome = self.dispatch(|h, ctx| h.drag_end(ctx, zone))?;
        if outcome == Outcome::Discarded {
            self.stats.record_scrapped();
        }
        Ok(outcome)
    }

    pub fn place_filling(&mut self, filling: FillingId, zone: Option<ZoneId>) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.place_filling(ctx, filling, zone))
    }

    pub fn apply_sugar(&mut self) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.apply_sugar(ctx))
    }

    pub fn select_sauce(&mut self, sauce: SauceKind) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.select_sauce(ctx, sauce))
    }

    pub fn draw_to(&mut self, point: Point) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.draw_to(ctx, point))
    }

    pub fn draw_end(&mut self) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.draw_end(ctx))
    }

    /// The "finish" button of the topping step.
    pub fn finish_topping(&mut self) -> Result<Outcome, CookingError> {
        self.dispatch(|h, ctx| h.finish(ctx))
    }

    // -----------------------------------------------------------------------
    // Events
    // -----------------------------------------------------------------------

    pub fn subscribe(&mut self, kind: EventKind, listener: EventListener) {
        self.events.subscribe(kind, listener);
    }

    pub fn subscribe_all(&mut self, listener: EventListener) {
        self.events.subscribe_all(listener);
    }

    /// Direct access for priorities, filters and suppression.
    pub fn events_mut(&mut self) -> &mut EventBus {
        &mut self.events
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase.is_active()
    }

    pub fn order(&self) -> Option<&OrderSpec> {
        self.order.as_ref()
    }

    /// The item record. After a session ends it holds the served item until
    /// the next session starts.
    pub fn item(&self) -> &ItemState {
        &self.item
    }

    pub fn current_item(&self) -> Option<ItemId> {
        self.counter.current_id()
    }

    pub fn workpiece(&self) -> Option<&Workpiece> {
        self.counter.current().map(|(_, p)| p)
    }

    pub fn handlers(&self) -> &HandlerTable {
        &self.handlers
    }

    pub fn active_handler(&self) -> Option<&dyn PhaseHandler> {
        self.handlers.get(self.phase)
    }

    pub fn config(&self) -> &KitchenConfig {
        &self.config
    }

    pub fn zones(&self) -> &dyn ZoneLookup {
        self.zones.as_ref()
    }

    pub fn last_report(&self) -> Option<&SessionReport> {
        self.last_report.as_ref()
    }

    pub fn stats(&self) -> &ShiftStats {
        &self.stats
    }

    /// Hash of everything that decides future behaviour: phase, handler
    /// working state, item record, order and item position.
    pub fn state_hash(&self) -> u64 {
        let mut h = StateHash::new();
        self.handlers.hash_into(self.phase, &mut h);
        hash_item(&self.item, &mut h);
        match &self.order {
            Some(order) => {
                h.write_bool(true);
                h.write_u32(order.wanted_filling1.0);
                h.write_u32(order.wanted_filling2.0);
                h.write_bool(order.wants_sugar);
                h.write_bool(order.wants_ketchup);
                h.write_bool(order.wants_mustard);
            }
            None => h.write_bool(false),
        }
        match self.counter.current() {
            Some((_, piece)) => {
                h.write_bool(true);
                for p in [piece.position, piece.rest] {
                    h.write_f32(p.x);
                    h.write_f32(p.y);
                }
                h.write_bool(piece.dragging);
            }
            None => h.write_bool(false),
        }
        h.finish()
    }

    // -----------------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------------

    fn require_active(&self) -> Result<(), CookingError> {
        if self.phase.is_active() {
            Ok(())
        } else {
            Err(CookingError::NoActiveSession)
        }
    }

    fn require_item(&self, item: ItemId) -> Result<(), CookingError> {
        self.require_active()?;
        if self.counter.is_current(item) {
            Ok(())
        } else {
            Err(CookingError::UnknownItem(item))
        }
    }

    /// Run `f` against the active handler.
    fn with_handler<R>(
        &mut self,
        f: impl FnOnce(&mut dyn PhaseHandler, &mut PhaseContext<'_>) -> R,
    ) -> Option<R> {
        let handler = self.handlers.get_mut(self.phase)?;
        let mut ctx = PhaseContext {
            item: &mut self.item,
            counter: &mut self.counter,
            zones: self.zones.as_ref(),
            events: &mut self.events,
            config: &self.config,
        };
        Some(f(handler, &mut ctx))
    }

    fn dispatch(
        &mut self,
        input: impl FnOnce(&mut dyn PhaseHandler, &mut PhaseContext<'_>) -> Outcome,
    ) -> Result<Outcome, CookingError> {
        self.require_active()?;
        let outcome = self.with_handler(input).unwrap_or(Outcome::Ignored);
        if outcome == Outcome::Completed {
            debug!(phase = %self.phase, "phase complete");
            if self.config.auto_advance {
                self.step_phase();
            }
        }
        self.events.deliver();
        Ok(outcome)
    }

    fn set_phase(&mut self, to: Phase) {
        let from = self.phase;
        self.phase = to;
        if from != to {
            debug!(%from, %to, "phase changed");
            self.events.emit(CookingEvent::PhaseChanged { from, to });
        }
    }

    fn enter(&mut self, phase: Phase) {
        self.set_phase(phase);
        self.with_handler(|h, ctx| h.on_enter(ctx));
    }

    /// Completed is the last step; leaving it finishes the session.
    fn step_phase(&mut self) {
        match self.phase.next() {
            Some(next) => self.enter(next),
            None if self.phase == Phase::Completed => self.finish_session(),
            None => {}
        }
    }

    fn finish_session(&mut self) {
        let Some(order) = self.order.take() else {
            self.set_phase(Phase::None);
            return;
        };
        let weights = &self.config.scoring;
        let breakdown = scoring::breakdown(weights, &order, &self.item);
        let score = breakdown.total();
        self.stats.record_served(score, weights.max_total());
        self.counter.discard();
        debug!(score, ?breakdown, "session finished");
        self.last_report = Some(SessionReport {
            order,
            item: self.item.clone(),
            breakdown,
            score,
        });
        self.events.emit(CookingEvent::SessionFinished { score });
        self.set_phase(Phase::None);
    }

    fn scrap_item(&mut self) -> Outcome {
        let Some(id) = self.counter.discard() else {
            return Outcome::Ignored;
        };
        debug!(?id, phase = %self.phase, "item scrapped");
        self.events.emit(CookingEvent::ItemDiscarded { item: id });
        self.item = ItemState::new();
        self.handlers = HandlerTable::new();
        self.stats.record_scrapped();
        self.enter(Phase::StickPickup);
        Outcome::Discarded
    }

    fn abandon(&mut self) {
        if let Some(id) = self.counter.discard() {
            self.events.emit(CookingEvent::ItemDiscarded { item: id });
        }
        self.order = None;
        self.handlers = HandlerTable::new();
        self.stats.record_abandoned();
        debug!(phase = %self.phase, "session abandoned");
        self.events.emit(CookingEvent::SessionAbandoned);
        self.set_phase(Phase::None);
    }
}

fn hash_item(item: &ItemState, h: &mut StateHash) {
    for slot in [item.filling1, item.filling2] {
        match slot {
            Some(f) => {
                h.write_bool(true);
                h.write_u32(f.0);
            }
            None => h.write_bool(false),
        }
    }
    h.write_u8(item.batter_stage);
    h.write_u8(item.frying_color as u8);
    h.write_f64(item.frying_elapsed);
    h.write_bool(item.has_sugar);
    h.write_bool(item.has_ketchup);
    h.write_bool(item.has_mustard);
    h.write_f32(item.ketchup_amount);
    h.write_f32(item.mustard_amount);
}
