//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`.

use crate::config::KitchenConfig;
use crate::controller::PhaseController;
use crate::event::EventBus;
use crate::id::{FillingId, ZoneId};
use crate::item::{Counter, ItemState, OrderSpec, SauceKind};
use crate::phase::{Outcome, Phase, PhaseContext, PhaseHandler};
use crate::zone::{Point, Shape, Station, Zone, ZoneLookup, ZoneRegistry};

// ===========================================================================
// Standard layout
// ===========================================================================

/// Where sticks are picked up. Outside every zone.
pub const STICK_BIN: Point = Point::new(50.0, 350.0);
pub const PREP_CENTER: Point = Point::new(50.0, 50.0);
pub const BOARD_CENTER: Point = Point::new(50.0, 200.0);
pub const VAT_CENTER: Point = Point::new(200.0, 50.0);
pub const FRYER_CENTER: Point = Point::new(350.0, 50.0);
pub const RACK_CENTER: Point = Point::new(500.0, 50.0);
pub const CANVAS_CENTER: Point = Point::new(550.0, 200.0);
pub const WINDOW_CENTER: Point = Point::new(750.0, 50.0);
pub const TRASH_CENTER: Point = Point::new(750.0, 200.0);
pub const OUTSIDE: Point = Point::new(1000.0, 1000.0);

/// One frame at 60 fps.
pub const FRAME: f64 = 1.0 / 60.0;
/// Frying time that lands well inside the golden window.
pub const GOLDEN_SECS: f64 = 8.0;

fn rect(x0: f32, y0: f32, x1: f32, y1: f32) -> Shape {
    Shape::Rect {
        min: Point::new(x0, y0),
        max: Point::new(x1, y1),
    }
}

fn standard_layout() -> Vec<Zone> {
    vec![
        Zone::new("prep", Station::Preparation, rect(0.0, 0.0, 100.0, 100.0)),
        Zone::new("board", Station::IngredientBoard, rect(0.0, 150.0, 100.0, 250.0)),
        Zone::new("vat", Station::BatterVat, rect(150.0, 0.0, 250.0, 100.0)),
        Zone::new("fryer", Station::Fryer, rect(300.0, 0.0, 400.0, 100.0)),
        Zone::new("rack", Station::CoolingRack, rect(450.0, 0.0, 550.0, 100.0)),
        Zone::new("canvas", Station::SauceCanvas, rect(450.0, 150.0, 650.0, 250.0)),
        Zone::new("window", Station::ServingWindow, rect(700.0, 0.0, 800.0, 100.0)),
        Zone::new("trash", Station::TrashBin, rect(700.0, 150.0, 800.0, 250.0)),
    ]
}

pub fn standard_zones() -> ZoneRegistry {
    let mut zones = ZoneRegistry::new();
    for zone in standard_layout() {
        zones.insert(zone).unwrap();
    }
    zones
}

/// The standard layout with one station left out.
pub fn standard_zones_without(station: Station) -> ZoneRegistry {
    let mut zones = ZoneRegistry::new();
    for zone in standard_layout().into_iter().filter(|z| z.station != station) {
        zones.insert(zone).unwrap();
    }
    zones
}

// ===========================================================================
// Stock fillings and orders
// ===========================================================================

pub fn sausage() -> FillingId {
    FillingId(0)
}
pub fn cheese() -> FillingId {
    FillingId(1)
}
pub fn fish_cake() -> FillingId {
    FillingId(2)
}

/// Two sausages, sugar and ketchup: everything right scores the maximum.
pub fn perfect_order() -> OrderSpec {
    OrderSpec::plain(sausage(), sausage())
        .with_sugar(true)
        .with_ketchup(true)
}

// ===========================================================================
// Handler-level fixture
// ===========================================================================

/// Everything a phase handler touches, without a controller around it.
#[derive(Debug)]
pub struct Kitchen {
    pub item: ItemState,
    pub counter: Counter,
    pub zones: ZoneRegistry,
    pub events: EventBus,
    pub config: KitchenConfig,
}

impl Kitchen {
    pub fn standard() -> Self {
        Self::on(standard_zones())
    }

    pub fn without(station: Station) -> Self {
        Self::on(standard_zones_without(station))
    }

    /// Standard kitchen with an item resting (not held) at `at`.
    pub fn with_item_at(at: Point) -> Self {
        let mut kitchen = Self::standard();
        kitchen.counter.create(at);
        kitchen
    }

    fn on(zones: ZoneRegistry) -> Self {
        Self {
            item: ItemState::new(),
            counter: Counter::new(),
            zones,
            events: EventBus::default(),
            config: KitchenConfig::default(),
        }
    }

    pub fn ctx(&mut self) -> PhaseContext<'_> {
        PhaseContext {
            item: &mut self.item,
            counter: &mut self.counter,
            zones: &self.zones,
            events: &mut self.events,
            config: &self.config,
        }
    }

    pub fn zone(&self, station: Station) -> ZoneId {
        self.zones.station_zone(station).unwrap()
    }
}

// ===========================================================================
// Controller drivers
// ===========================================================================

pub fn controller() -> PhaseController {
    controller_with(KitchenConfig::default())
}

pub fn controller_with(config: KitchenConfig) -> PhaseController {
    PhaseController::new(standard_zones(), config).unwrap()
}

pub fn controller_on(zones: ZoneRegistry) -> PhaseController {
    PhaseController::new(zones, KitchenConfig::default()).unwrap()
}

pub fn zone_of(c: &PhaseController, station: Station) -> ZoneId {
    c.zones().station_zone(station).unwrap()
}

/// Tick at 60 fps for `seconds`.
pub fn run_for(c: &mut PhaseController, seconds: f64) {
    let frames = (seconds * 60.0).round() as u32;
    for _ in 0..frames {
        c.tick(FRAME).unwrap();
    }
}

/// Pick up a stick and set it down on the preparation board.
pub fn place_stick(c: &mut PhaseController) {
    assert_eq!(c.pick_up(STICK_BIN).unwrap(), Outcome::Accepted);
    let item = c.current_item().unwrap();
    let prep = zone_of(c, Station::Preparation);
    c.drag_move(item, PREP_CENTER).unwrap();
    assert_eq!(c.drag_end(item, Some(prep)).unwrap(), Outcome::Completed);
}

pub fn add_fillings(c: &mut PhaseController, first: FillingId, second: FillingId) {
    let board = zone_of(c, Station::IngredientBoard);
    c.place_filling(first, Some(board)).unwrap();
    assert_eq!(c.place_filling(second, Some(board)).unwrap(), Outcome::Completed);
}

/// Hold the item in the batter for `seconds`, then lift it out.
pub fn dip(c: &mut PhaseController, seconds: f64) {
    let item = c.current_item().unwrap();
    c.drag_begin(item).unwrap();
    c.drag_move(item, VAT_CENTER).unwrap();
    run_for(c, seconds);
    if !c.handlers().batter.is_complete() {
        c.drag_move(item, PREP_CENTER).unwrap();
    }
}

/// Fry for `seconds`, then move the item to the cooling rack.
pub fn fry(c: &mut PhaseController, seconds: f64) {
    let item = c.current_item().unwrap();
    let fryer = zone_of(c, Station::Fryer);
    let rack = zone_of(c, Station::CoolingRack);
    // The item may still be in hand from the batter step.
    c.drag_begin(item).unwrap();
    c.drag_move(item, FRYER_CENTER).unwrap();
    assert_eq!(c.drag_end(item, Some(fryer)).unwrap(), Outcome::Accepted);
    run_for(c, seconds);
    c.drag_begin(item).unwrap();
    c.drag_move(item, RACK_CENTER).unwrap();
    assert_eq!(c.drag_end(item, Some(rack)).unwrap(), Outcome::Completed);
}

/// Apply the requested toppings and press finish.
pub fn top(c: &mut PhaseController, sugar: bool, ketchup: bool, mustard: bool) {
    if sugar {
        c.apply_sugar().unwrap();
    }
    for (wanted, sauce) in [(ketchup, SauceKind::Ketchup), (mustard, SauceKind::Mustard)] {
        if wanted {
            c.select_sauce(sauce).unwrap();
            c.draw_to(Point::new(460.0, 200.0)).unwrap();
            c.draw_to(Point::new(560.0, 200.0)).unwrap();
            c.draw_end().unwrap();
        }
    }
    assert_eq!(c.finish_topping().unwrap(), Outcome::Completed);
}

/// Hand the item over at the serving window and return the score.
pub fn serve(c: &mut PhaseController) -> u32 {
    let item = c.current_item().unwrap();
    let window = zone_of(c, Station::ServingWindow);
    c.drag_begin(item).unwrap();
    c.drag_move(item, WINDOW_CENTER).unwrap();
    c.drag_end(item, Some(window)).unwrap();
    c.last_report().unwrap().score
}

/// Cook `order` exactly as asked, frying for `fry_secs`, and serve it.
/// Needs `auto_advance`.
pub fn cook(c: &mut PhaseController, order: OrderSpec, fry_secs: f64) -> u32 {
    c.start_session(order).unwrap();
    place_stick(c);
    add_fillings(c, order.wanted_filling1, order.wanted_filling2);
    dip(c, 1.0);
    assert_eq!(c.phase(), Phase::Frying);
    fry(c, fry_secs);
    top(c, order.wants_sugar, order.wants_ketchup, order.wants_mustard);
    assert_eq!(c.phase(), Phase::Completed);
    serve(c)
}
