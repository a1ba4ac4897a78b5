//! Full session example: one order cooked from stick to serving window.
//!
//! Builds a kitchen layout by hand, listens to every event, and drives the
//! controller the way a frontend would: pointer input plus a 60 fps tick.
//!
//! Run with: `RUST_LOG=debug cargo run -p hotdog-core --example full_session`

use std::cell::RefCell;
use std::rc::Rc;

use hotdog_core::config::KitchenConfig;
use hotdog_core::controller::PhaseController;
use hotdog_core::error::CookingError;
use hotdog_core::event::CookingEvent;
use hotdog_core::item::{OrderSpec, SauceKind};
use hotdog_core::order::Menu;
use hotdog_core::zone::{Point, Shape, Station, Zone, ZoneLookup, ZoneRegistry};
use tracing_subscriber::EnvFilter;

const FRAME: f64 = 1.0 / 60.0;

fn square(x: f32, y: f32) -> Shape {
    Shape::Rect {
        min: Point::new(x - 50.0, y - 50.0),
        max: Point::new(x + 50.0, y + 50.0),
    }
}

fn build_kitchen() -> Result<ZoneRegistry, Box<dyn std::error::Error>> {
    let mut zones = ZoneRegistry::new();
    zones.insert(Zone::new("prep board", Station::Preparation, square(100.0, 100.0)))?;
    zones.insert(Zone::new("fillings", Station::IngredientBoard, square(100.0, 300.0)))?;
    zones.insert(Zone::new("batter vat", Station::BatterVat, square(300.0, 100.0)))?;
    zones.insert(
        Zone::new("fryer", Station::Fryer, square(500.0, 100.0)).with_snap(Point::new(500.0, 120.0)),
    )?;
    zones.insert(Zone::new("rack", Station::CoolingRack, square(700.0, 100.0)))?;
    zones.insert(Zone::new(
        "sauce canvas",
        Station::SauceCanvas,
        Shape::Circle {
            center: Point::new(700.0, 300.0),
            radius: 80.0,
        },
    ))?;
    zones.insert(Zone::new("window", Station::ServingWindow, square(900.0, 100.0)))?;
    zones.insert(Zone::new("trash", Station::TrashBin, square(900.0, 300.0)))?;
    Ok(zones)
}

fn station(c: &PhaseController, station: Station) -> Option<hotdog_core::id::ZoneId> {
    c.zones().station_zone(station)
}

fn run_for(c: &mut PhaseController, seconds: f64) -> Result<(), CookingError> {
    for _ in 0..(seconds / FRAME).round() as u32 {
        c.tick(FRAME)?;
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).compact().init();

    let menu: Menu = ["sausage", "cheese", "fish cake"].into_iter().collect();
    let sausage = menu.id("sausage").ok_or("sausage not on the menu")?;
    let cheese = menu.id("cheese").ok_or("cheese not on the menu")?;

    let mut kitchen = PhaseController::new(build_kitchen()?, KitchenConfig::default())?;

    // --- Print every event as it is delivered ---

    let events = Rc::new(RefCell::new(0u32));
    let seen = Rc::clone(&events);
    kitchen.subscribe_all(Box::new(move |event| {
        *seen.borrow_mut() += 1;
        match event {
            CookingEvent::SauceGaugeChanged { .. } => {}
            other => println!("  event: {other:?}"),
        }
    }));

    let order = OrderSpec::plain(sausage, cheese).with_mustard(true);
    println!("Order: sausage + cheese, mustard\n");
    kitchen.start_session(order)?;

    // --- Stick ---
    kitchen.pick_up(Point::new(100.0, 500.0))?;
    let item = kitchen.current_item().ok_or("no item after pickup")?;
    kitchen.drag_move(item, Point::new(100.0, 100.0))?;
    kitchen.drag_end(item, station(&kitchen, Station::Preparation))?;

    // --- Fillings ---
    let board = station(&kitchen, Station::IngredientBoard);
    kitchen.place_filling(sausage, board)?;
    kitchen.place_filling(cheese, board)?;

    // --- Batter: one second in the vat, then straight to the fryer ---
    kitchen.drag_begin(item)?;
    kitchen.drag_move(item, Point::new(300.0, 100.0))?;
    run_for(&mut kitchen, 1.0)?;
    kitchen.drag_move(item, Point::new(500.0, 100.0))?;

    // --- Frying ---
    kitchen.drag_end(item, station(&kitchen, Station::Fryer))?;
    run_for(&mut kitchen, 8.0)?;
    kitchen.drag_begin(item)?;
    kitchen.drag_move(item, Point::new(700.0, 100.0))?;
    kitchen.drag_end(item, station(&kitchen, Station::CoolingRack))?;

    // --- Toppings: a zigzag of mustard ---
    kitchen.select_sauce(SauceKind::Mustard)?;
    for (i, x) in (640..=760).step_by(20).enumerate() {
        let y = if i % 2 == 0 { 280.0 } else { 320.0 };
        kitchen.draw_to(Point::new(x as f32, y))?;
    }
    kitchen.draw_end()?;
    kitchen.finish_topping()?;

    // --- Serve ---
    kitchen.drag_begin(item)?;
    kitchen.drag_move(item, Point::new(900.0, 100.0))?;
    kitchen.drag_end(item, station(&kitchen, Station::ServingWindow))?;

    let report = kitchen.last_report().ok_or("session did not finish")?;
    println!("\nScore: {}", report.score);
    println!("  breakdown: {:?}", report.breakdown);
    println!("  mustard left: {:.2}", report.item.mustard_amount);
    println!("  events delivered: {}", events.borrow());
    println!("  quoted maximum: {}", kitchen.config().scoring.documented_max);
    println!("  table maximum:  {}", kitchen.config().scoring.max_total());
    Ok(())
}
