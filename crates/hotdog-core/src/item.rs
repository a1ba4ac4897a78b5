//! The shared state records: the hotdog under construction and the order it
//! is judged against.

use std::fmt;

use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

use crate::id::{FillingId, ItemId};
use crate::zone::Point;

// ---------------------------------------------------------------------------
// Frying color
// ---------------------------------------------------------------------------

/// Doneness of the batter, derived from time spent in the oil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FryingColor {
    #[default]
    Raw,
    Yellow,
    /// The optimum.
    Golden,
    Brown,
    Burnt,
}

impl fmt::Display for FryingColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FryingColor::Raw => "raw",
            FryingColor::Yellow => "yellow",
            FryingColor::Golden => "golden",
            FryingColor::Brown => "brown",
            FryingColor::Burnt => "burnt",
        };
        f.write_str(name)
    }
}

// ---------------------------------------------------------------------------
// Sauces
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SauceKind {
    Ketchup,
    Mustard,
}

impl fmt::Display for SauceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SauceKind::Ketchup => f.write_str("ketchup"),
            SauceKind::Mustard => f.write_str("mustard"),
        }
    }
}

// ---------------------------------------------------------------------------
// ItemState
// ---------------------------------------------------------------------------

/// Derived attributes of the hotdog being cooked.
///
/// Only the active phase handler writes to it; the scoring engine reads the
/// frozen copy once the item is served.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemState {
    pub filling1: Option<FillingId>,
    pub filling2: Option<FillingId>,
    /// 0..=max_stage; never decreases for the life of the item.
    pub batter_stage: u8,
    pub frying_color: FryingColor,
    pub frying_elapsed: f64,
    pub has_sugar: bool,
    pub has_ketchup: bool,
    pub has_mustard: bool,
    /// Remaining ketchup gauge, 1.0 = full.
    pub ketchup_amount: f32,
    /// Remaining mustard gauge, 1.0 = full.
    pub mustard_amount: f32,
}

impl Default for ItemState {
    fn default() -> Self {
        Self {
            filling1: None,
            filling2: None,
            batter_stage: 0,
            frying_color: FryingColor::Raw,
            frying_elapsed: 0.0,
            has_sugar: false,
            has_ketchup: false,
            has_mustard: false,
            ketchup_amount: 1.0,
            mustard_amount: 1.0,
        }
    }
}

impl ItemState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any sauce has been applied.
    pub fn has_sauce(&self) -> bool {
        self.has_ketchup || self.has_mustard
    }

    pub fn sauce_amount(&self, sauce: SauceKind) -> f32 {
        match sauce {
            SauceKind::Ketchup => self.ketchup_amount,
            SauceKind::Mustard => self.mustard_amount,
        }
    }
}

// ---------------------------------------------------------------------------
// OrderSpec
// ---------------------------------------------------------------------------

/// What the customer asked for. Immutable for the session it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrderSpec {
    pub wanted_filling1: FillingId,
    pub wanted_filling2: FillingId,
    pub wants_sugar: bool,
    pub wants_ketchup: bool,
    pub wants_mustard: bool,
}

impl OrderSpec {
    /// An order for two fillings with no toppings.
    pub fn plain(filling1: FillingId, filling2: FillingId) -> Self {
        Self {
            wanted_filling1: filling1,
            wanted_filling2: filling2,
            wants_sugar: false,
            wants_ketchup: false,
            wants_mustard: false,
        }
    }

    pub fn with_sugar(mut self, sugar: bool) -> Self {
        self.wants_sugar = sugar;
        self
    }

    pub fn with_ketchup(mut self, ketchup: bool) -> Self {
        self.wants_ketchup = ketchup;
        self
    }

    pub fn with_mustard(mut self, mustard: bool) -> Self {
        self.wants_mustard = mustard;
        self
    }
}

// ---------------------------------------------------------------------------
// Workpiece
// ---------------------------------------------------------------------------

/// Where the physical item is. Tracked alongside [`ItemState`] so invalid
/// drops can put it back.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Workpiece {
    /// Current position (follows the pointer while dragged).
    pub position: Point,
    /// Last accepted resting position; invalid drops revert here.
    pub rest: Point,
    pub dragging: bool,
}

impl Workpiece {
    pub fn new(at: Point) -> Self {
        Self {
            position: at,
            rest: at,
            dragging: false,
        }
    }

    /// Put the item back at its last accepted position.
    pub fn revert(&mut self) {
        self.position = self.rest;
        self.dragging = false;
    }

    /// Accept the item at `at`.
    pub fn settle(&mut self, at: Point) {
        self.position = at;
        self.rest = at;
        self.dragging = false;
    }
}

/// The item slot on the counter. Holds at most one workpiece at a time; ids
/// of discarded items stay invalid.
#[derive(Debug, Default, Clone)]
pub struct Counter {
    items: SlotMap<ItemId, Workpiece>,
    current: Option<ItemId>,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place a new workpiece at `at`, discarding any previous one.
    pub fn create(&mut self, at: Point) -> ItemId {
        self.discard();
        let id = self.items.insert(Workpiece::new(at));
        self.current = Some(id);
        id
    }

    /// Throw the current workpiece away.
    pub fn discard(&mut self) -> Option<ItemId> {
        let id = self.current.take()?;
        self.items.remove(id);
        Some(id)
    }

    pub fn current_id(&self) -> Option<ItemId> {
        self.current
    }

    pub fn is_current(&self, id: ItemId) -> bool {
        self.current == Some(id)
    }

    pub fn current(&self) -> Option<(ItemId, &Workpiece)> {
        let id = self.current?;
        self.items.get(id).map(|p| (id, p))
    }

    pub fn current_mut(&mut self) -> Option<(ItemId, &mut Workpiece)> {
        let id = self.current?;
        self.items.get_mut(id).map(|p| (id, p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_item_is_empty_with_full_gauges() {
        let item = ItemState::new();
        assert_eq!(item.filling1, None);
        assert_eq!(item.filling2, None);
        assert_eq!(item.batter_stage, 0);
        assert_eq!(item.frying_color, FryingColor::Raw);
        assert_eq!(item.frying_elapsed, 0.0);
        assert!(!item.has_sugar);
        assert!(!item.has_sauce());
        assert_eq!(item.sauce_amount(SauceKind::Ketchup), 1.0);
        assert_eq!(item.sauce_amount(SauceKind::Mustard), 1.0);
    }

    #[test]
    fn frying_colors_order_by_doneness() {
        assert!(FryingColor::Raw < FryingColor::Yellow);
        assert!(FryingColor::Golden < FryingColor::Brown);
        assert!(FryingColor::Brown < FryingColor::Burnt);
    }

    #[test]
    fn order_builder() {
        let order = OrderSpec::plain(FillingId(1), FillingId(2))
            .with_sugar(true)
            .with_mustard(true);
        assert_eq!(order.wanted_filling1, FillingId(1));
        assert_eq!(order.wanted_filling2, FillingId(2));
        assert!(order.wants_sugar);
        assert!(!order.wants_ketchup);
        assert!(order.wants_mustard);
    }

    #[test]
    fn workpiece_revert_returns_to_rest() {
        let mut w = Workpiece::new(Point::new(1.0, 1.0));
        w.dragging = true;
        w.position = Point::new(9.0, 9.0);
        w.revert();
        assert_eq!(w.position, Point::new(1.0, 1.0));
        assert!(!w.dragging);

        w.settle(Point::new(3.0, 4.0));
        w.position = Point::new(0.0, 0.0);
        w.revert();
        assert_eq!(w.position, Point::new(3.0, 4.0));
    }

    #[test]
    fn counter_holds_one_item_and_forgets_discarded_ids() {
        let mut counter = Counter::new();
        let first = counter.create(Point::new(0.0, 0.0));
        assert!(counter.is_current(first));

        let second = counter.create(Point::new(1.0, 0.0));
        assert_ne!(first, second);
        assert!(!counter.is_current(first));
        assert_eq!(counter.current().map(|(_, p)| p.position), Some(Point::new(1.0, 0.0)));

        assert_eq!(counter.discard(), Some(second));
        assert_eq!(counter.discard(), None);
        assert!(counter.current().is_none());
    }
}
