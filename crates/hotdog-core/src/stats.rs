//! Running totals for one shift at the stand.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftStats {
    /// Sessions that ended at the serving window.
    pub served: u32,
    /// Sessions ended without serving (explicitly, or by a restart).
    pub abandoned: u32,
    /// Items thrown away mid-pipeline.
    pub scrapped: u32,
    /// Sum of all scores: the money taken this shift.
    pub earnings: u64,
    pub best_score: Option<u32>,
    /// Servings that hit the maximum score.
    pub perfect: u32,
}

impl ShiftStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_served(&mut self, score: u32, max_score: u32) {
        self.served += 1;
        self.earnings += u64::from(score);
        self.best_score = Some(self.best_score.map_or(score, |best| best.max(score)));
        if score >= max_score {
            self.perfect += 1;
        }
    }

    pub fn record_abandoned(&mut self) {
        self.abandoned += 1;
    }

    pub fn record_scrapped(&mut self) {
        self.scrapped += 1;
    }

    /// Mean score per served session.
    pub fn average_score(&self) -> Option<f64> {
        (self.served > 0).then(|| self.earnings as f64 / f64::from(self.served))
    }
}
