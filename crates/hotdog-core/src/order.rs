//! Where orders come from: the filling menu and the order sources a shift
//! draws customers from.

use std::collections::{HashMap, VecDeque};

use crate::id::FillingId;
use crate::item::OrderSpec;
use crate::rng::SimRng;

// ---------------------------------------------------------------------------
// Menu
// ---------------------------------------------------------------------------

/// Filling names in registration order. A filling's id is its position.
#[derive(Debug, Clone, Default)]
pub struct Menu {
    names: Vec<String>,
    by_name: HashMap<String, FillingId>,
}

impl Menu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a filling. A name already on the menu keeps its id.
    pub fn add(&mut self, name: &str) -> FillingId {
        if let Some(&id) = self.by_name.get(name) {
            return id;
        }
        let id = FillingId(self.names.len() as u32);
        self.names.push(name.to_string());
        self.by_name.insert(name.to_string(), id);
        id
    }

    pub fn id(&self, name: &str) -> Option<FillingId> {
        self.by_name.get(name).copied()
    }

    pub fn name(&self, id: FillingId) -> Option<&str> {
        self.names.get(id.0 as usize).map(String::as_str)
    }

    pub fn ids(&self) -> impl Iterator<Item = FillingId> + '_ {
        (0..self.names.len() as u32).map(FillingId)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl<S: AsRef<str>> FromIterator<S> for Menu {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let mut menu = Menu::new();
        for name in iter {
            menu.add(name.as_ref());
        }
        menu
    }
}

// ---------------------------------------------------------------------------
// Order sources
// ---------------------------------------------------------------------------

/// Supplies one order per session. `None` means the shift is over.
pub trait OrderSource {
    fn next_order(&mut self) -> Option<OrderSpec>;
}

/// A fixed queue of orders, served first come first served.
#[derive(Debug, Clone, Default)]
pub struct ScriptedOrders {
    queue: VecDeque<OrderSpec>,
}

impl ScriptedOrders {
    pub fn new(orders: impl IntoIterator<Item = OrderSpec>) -> Self {
        Self {
            queue: orders.into_iter().collect(),
        }
    }

    pub fn push(&mut self, order: OrderSpec) {
        self.queue.push_back(order);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl OrderSource for ScriptedOrders {
    fn next_order(&mut self) -> Option<OrderSpec> {
        self.queue.pop_front()
    }
}

/// Seeded random customers. Sugar and each sauce are wanted independently;
/// an order with both is cooked sugar first.
#[derive(Debug, Clone)]
pub struct RandomOrders {
    rng: SimRng,
    fillings: Vec<FillingId>,
    sugar_chance: f64,
    sauce_chance: f64,
    limit: Option<usize>,
    issued: usize,
}

impl RandomOrders {
    pub fn new(menu: &Menu, seed: u64) -> Self {
        Self {
            rng: SimRng::new(seed),
            fillings: menu.ids().collect(),
            sugar_chance: 0.3,
            sauce_chance: 0.5,
            limit: None,
            issued: 0,
        }
    }

    pub fn with_sugar_chance(mut self, chance: f64) -> Self {
        self.sugar_chance = chance;
        self
    }

    pub fn with_sauce_chance(mut self, chance: f64) -> Self {
        self.sauce_chance = chance;
        self
    }

    /// Stop after `count` orders.
    pub fn with_limit(mut self, count: usize) -> Self {
        self.limit = Some(count);
        self
    }
}

impl OrderSource for RandomOrders {
    fn next_order(&mut self) -> Option<OrderSpec> {
        if self.limit.is_some_and(|limit| self.issued >= limit) {
            return None;
        }
        let filling1 = *self.rng.pick(&self.fillings)?;
        let filling2 = *self.rng.pick(&self.fillings)?;
        let order = OrderSpec::plain(filling1, filling2)
            .with_sugar(self.rng.chance(self.sugar_chance))
            .with_ketchup(self.rng.chance(self.sauce_chance))
            .with_mustard(self.rng.chance(self.sauce_chance));
        self.issued += 1;
        Some(order)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn menu() -> Menu {
        ["sausage", "cheese", "fish cake"].into_iter().collect()
    }

    #[test]
    fn menu_ids_follow_registration_order() {
        let mut menu = menu();
        assert_eq!(menu.id("sausage"), Some(FillingId(0)));
        assert_eq!(menu.id("fish cake"), Some(FillingId(2)));
        assert_eq!(menu.name(FillingId(1)), Some("cheese"));
        assert_eq!(menu.id("onion"), None);

        // Re-adding keeps the id.
        assert_eq!(menu.add("cheese"), FillingId(1));
        assert_eq!(menu.len(), 3);
    }

    #[test]
    fn scripted_orders_are_fifo() {
        let first = OrderSpec::plain(FillingId(0), FillingId(1));
        let second = OrderSpec::plain(FillingId(1), FillingId(1)).with_sugar(true);
        let mut source = ScriptedOrders::new([first, second]);
        assert_eq!(source.remaining(), 2);
        assert_eq!(source.next_order(), Some(first));
        assert_eq!(source.next_order(), Some(second));
        assert_eq!(source.next_order(), None);
    }

    #[test]
    fn random_orders_are_reproducible() {
        let mut a = RandomOrders::new(&menu(), 9);
        let mut b = RandomOrders::new(&menu(), 9);
        for _ in 0..50 {
            assert_eq!(a.next_order(), b.next_order());
        }
    }

    #[test]
    fn random_orders_mix_sugar_and_sauce_freely() {
        let mut source = RandomOrders::new(&menu(), 1).with_sugar_chance(0.5).with_sauce_chance(0.5);
        let (mut sugar_only, mut sugar_and_sauce, mut sauce_only) = (false, false, false);
        for _ in 0..500 {
            let order = source.next_order().unwrap();
            assert!(order.wanted_filling1.0 < 3 && order.wanted_filling2.0 < 3);
            let sauce = order.wants_ketchup || order.wants_mustard;
            match (order.wants_sugar, sauce) {
                (true, false) => sugar_only = true,
                (true, true) => sugar_and_sauce = true,
                (false, true) => sauce_only = true,
                (false, false) => {}
            }
        }
        assert!(sugar_only && sugar_and_sauce && sauce_only);
    }

    #[test]
    fn empty_menu_yields_nothing() {
        let mut source = RandomOrders::new(&Menu::new(), 1);
        assert_eq!(source.next_order(), None);
    }

    #[test]
    fn limit_ends_the_shift() {
        let mut source = RandomOrders::new(&menu(), 1).with_limit(2);
        assert!(source.next_order().is_some());
        assert!(source.next_order().is_some());
        assert!(source.next_order().is_none());
    }
}
