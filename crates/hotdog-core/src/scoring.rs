//! The scoring engine: compares a finished item with the order it was made
//! for. Pure; no dependency on phases or time.

use serde::{Deserialize, Serialize};

use crate::item::{FryingColor, ItemState, OrderSpec};

/// Points per matching component.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoreWeights {
    /// Per filling slot.
    pub filling: u32,
    pub golden: u32,
    /// Yellow or brown.
    pub near_golden: u32,
    pub sugar: u32,
    pub ketchup: u32,
    pub mustard: u32,
    /// The maximum payout quoted to players. It does not match the sum of
    /// the weights (2000 against 3900 by default); kept as its own value so
    /// hosts can display or reconcile it.
    pub documented_max: u32,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            filling: 600,
            golden: 1500,
            near_golden: 600,
            sugar: 600,
            ketchup: 300,
            mustard: 300,
            documented_max: 2000,
        }
    }
}

impl ScoreWeights {
    /// The best achievable score under these weights, or `None` if it does
    /// not fit in a `u32`.
    pub fn checked_max_total(&self) -> Option<u32> {
        self.filling
            .checked_mul(2)?
            .checked_add(self.golden.max(self.near_golden))?
            .checked_add(self.sugar)?
            .checked_add(self.ketchup)?
            .checked_add(self.mustard)
    }

    /// The best achievable score under these weights. Saturates at
    /// `u32::MAX`.
    pub fn max_total(&self) -> u32 {
        self.checked_max_total().unwrap_or(u32::MAX)
    }

    /// Whether `documented_max` agrees with the weights.
    pub fn is_consistent(&self) -> bool {
        self.documented_max == self.max_total()
    }

    fn frying(&self, color: FryingColor) -> u32 {
        match color {
            FryingColor::Golden => self.golden,
            FryingColor::Yellow | FryingColor::Brown => self.near_golden,
            FryingColor::Raw | FryingColor::Burnt => 0,
        }
    }
}

/// Points awarded per component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub filling1: u32,
    pub filling2: u32,
    pub frying: u32,
    pub sugar: u32,
    pub ketchup: u32,
    pub mustard: u32,
}

impl ScoreBreakdown {
    /// Sum of the components, saturating at `u32::MAX`.
    pub fn total(&self) -> u32 {
        [self.filling2, self.frying, self.sugar, self.ketchup, self.mustard]
            .into_iter()
            .fold(self.filling1, u32::saturating_add)
    }
}

/// Component-wise comparison. Fillings match by slot: the order's first
/// filling against the first one skewered, not as an unordered pair.
pub fn breakdown(weights: &ScoreWeights, order: &OrderSpec, item: &ItemState) -> ScoreBreakdown {
    let award = |hit: bool, points: u32| if hit { points } else { 0 };
    ScoreBreakdown {
        filling1: award(item.filling1 == Some(order.wanted_filling1), weights.filling),
        filling2: award(item.filling2 == Some(order.wanted_filling2), weights.filling),
        frying: weights.frying(item.frying_color),
        sugar: award(order.wants_sugar == item.has_sugar, weights.sugar),
        ketchup: award(order.wants_ketchup == item.has_ketchup, weights.ketchup),
        mustard: award(order.wants_mustard == item.has_mustard, weights.mustard),
    }
}

/// Score with custom weights; 0 if either side is absent.
pub fn score_with(weights: &ScoreWeights, order: Option<&OrderSpec>, item: Option<&ItemState>) -> u32 {
    match (order, item) {
        (Some(order), Some(item)) => breakdown(weights, order, item).total(),
        _ => 0,
    }
}

/// Score with the shipped weights; 0 if either side is absent.
pub fn score(order: Option<&OrderSpec>, item: Option<&ItemState>) -> u32 {
    score_with(&ScoreWeights::default(), order, item)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::FillingId;

    const SAUSAGE: FillingId = FillingId(0);
    const CHEESE: FillingId = FillingId(1);

    fn item(f1: FillingId, f2: FillingId, color: FryingColor) -> ItemState {
        ItemState {
            filling1: Some(f1),
            filling2: Some(f2),
            frying_color: color,
            ..ItemState::new()
        }
    }

    #[test]
    fn scenario_full_match() {
        let order = OrderSpec::plain(SAUSAGE, SAUSAGE).with_sugar(true).with_ketchup(true);
        let mut it = item(SAUSAGE, SAUSAGE, FryingColor::Golden);
        it.has_sugar = true;
        it.has_ketchup = true;
        assert_eq!(score(Some(&order), Some(&it)), 3900);
        assert_eq!(score(Some(&order), Some(&it)), ScoreWeights::default().max_total());
    }

    #[test]
    fn scenario_burnt_and_everything_wrong() {
        let order = OrderSpec::plain(SAUSAGE, SAUSAGE).with_sugar(true);
        let mut it = item(CHEESE, CHEESE, FryingColor::Burnt);
        it.has_ketchup = true;
        it.has_mustard = true;
        assert_eq!(score(Some(&order), Some(&it)), 0);
    }

    #[test]
    fn scenario_absent_inputs() {
        let order = OrderSpec::plain(SAUSAGE, CHEESE);
        let it = item(SAUSAGE, CHEESE, FryingColor::Golden);
        assert_eq!(score(None, Some(&it)), 0);
        assert_eq!(score(Some(&order), None), 0);
        assert_eq!(score(None, None), 0);
    }

    #[test]
    fn scenario_partial() {
        let order = OrderSpec::plain(SAUSAGE, CHEESE).with_mustard(true);
        let mut it = item(SAUSAGE, SAUSAGE, FryingColor::Yellow);
        it.has_ketchup = true;
        let b = breakdown(&ScoreWeights::default(), &order, &it);
        assert_eq!(
            b,
            ScoreBreakdown {
                filling1: 600,
                filling2: 0,
                frying: 600,
                sugar: 600,
                ketchup: 0,
                mustard: 0,
            }
        );
        assert_eq!(b.total(), 1800);
    }

    #[test]
    fn fillings_match_by_slot_not_as_a_pair() {
        let order = OrderSpec::plain(SAUSAGE, CHEESE);
        let swapped = item(CHEESE, SAUSAGE, FryingColor::Raw);
        let b = breakdown(&ScoreWeights::default(), &order, &swapped);
        assert_eq!(b.filling1 + b.filling2, 0);
    }

    #[test]
    fn frying_tiers() {
        let w = ScoreWeights::default();
        assert_eq!(w.frying(FryingColor::Raw), 0);
        assert_eq!(w.frying(FryingColor::Yellow), 600);
        assert_eq!(w.frying(FryingColor::Golden), 1500);
        assert_eq!(w.frying(FryingColor::Brown), 600);
        assert_eq!(w.frying(FryingColor::Burnt), 0);
    }

    #[test]
    fn unfilled_slots_never_match() {
        let order = OrderSpec::plain(SAUSAGE, SAUSAGE);
        let b = breakdown(&ScoreWeights::default(), &order, &ItemState::new());
        assert_eq!(b.filling1, 0);
        assert_eq!(b.filling2, 0);
    }

    #[test]
    fn documented_max_disagrees_with_weights() {
        let w = ScoreWeights::default();
        assert_eq!(w.documented_max, 2000);
        assert_eq!(w.max_total(), 3900);
        assert!(!w.is_consistent());
    }

    #[test]
    fn custom_weights_apply() {
        let w = ScoreWeights {
            golden: 100,
            ..ScoreWeights::default()
        };
        let order = OrderSpec::plain(SAUSAGE, SAUSAGE);
        let it = item(SAUSAGE, SAUSAGE, FryingColor::Golden);
        // 600 + 600 + 100 + 600 + 300 + 300
        assert_eq!(score_with(&w, Some(&order), Some(&it)), 2500);
        // near_golden now outranks golden.
        assert_eq!(w.max_total(), 3000);
    }

    #[test]
    fn oversized_weights_saturate_instead_of_overflowing() {
        let w = ScoreWeights {
            filling: u32::MAX / 2 + 1,
            ..ScoreWeights::default()
        };
        assert_eq!(w.checked_max_total(), None);
        assert_eq!(w.max_total(), u32::MAX);

        let order = OrderSpec::plain(SAUSAGE, SAUSAGE);
        let it = item(SAUSAGE, SAUSAGE, FryingColor::Golden);
        assert_eq!(score_with(&w, Some(&order), Some(&it)), u32::MAX);
    }
}
