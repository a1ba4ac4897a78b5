//! Hotdog Core -- the cooking pipeline behind a street-food stand minigame.
//!
//! One session cooks one hotdog against one customer order. The
//! [`controller::PhaseController`] walks the item through a fixed pipeline,
//! handing pointer input and frame ticks to the handler of the current phase:
//!
//! 1. **StickPickup** -- Take a stick from the bin and set it on the prep board.
//! 2. **Ingredient** -- Put two half-fillings on the stick.
//! 3. **Batter** -- Hold the item in the batter vat until it is coated.
//! 4. **Frying** -- Fry until the color is right, then move it to the rack.
//! 5. **Topping** -- Optional sugar, then ketchup and mustard strokes.
//! 6. **Completed** -- Carry the item to the serving window.
//!
//! Serving scores the item against the order with [`scoring::score`] and the
//! controller returns to [`phase::Phase::None`].
//!
//! # Input Pattern
//!
//! Hosts resolve pointer positions to zones themselves and pass the result
//! in. Every input returns an [`phase::Outcome`]; input the current phase
//! does not care about is [`phase::Outcome::Ignored`], never an error:
//!
//! ```rust,ignore
//! let mut kitchen = PhaseController::new(zones, KitchenConfig::default())?;
//! kitchen.start_session(order)?;
//! kitchen.pick_up(bin_position)?;
//! let item = kitchen.current_item().unwrap();
//! kitchen.drag_end(item, Some(prep_zone))?;
//! ```
//!
//! # Key Types
//!
//! - [`controller::PhaseController`] -- Session lifecycle and input routing.
//! - [`phase::PhaseHandler`] -- Per-phase behavior behind one trait.
//! - [`zone::ZoneLookup`] -- Station geometry supplied by the host.
//! - [`scoring::ScoreWeights`] -- The points table.
//! - [`event::EventBus`] -- Subscription-based event bus with buffered delivery.
//! - [`replay::ReplayLog`] -- Command recording with determinism checkpoints.

pub mod config;
pub mod controller;
pub mod error;
pub mod event;
pub mod id;
pub mod item;
pub mod order;
pub mod phase;
pub mod replay;
pub mod rng;
pub mod scoring;
pub mod stats;
pub mod zone;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
