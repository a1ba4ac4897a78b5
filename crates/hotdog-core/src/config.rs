//! Kitchen tuning: every timing, rate and weight the pipeline uses.
//!
//! All fields default to the shipped values, so a data file only needs to
//! name what it overrides.

use serde::{Deserialize, Serialize};

use crate::phase::batter::BatterTuning;
use crate::phase::frying::FryingTuning;
use crate::phase::topping::SauceTuning;
use crate::scoring::ScoreWeights;

/// What `start_session` does while another session is still running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestartPolicy {
    /// Abandon the running session and start the new one.
    #[default]
    DiscardAndRestart,
    /// Refuse the new session with [`crate::error::CookingError::SessionActive`].
    Reject,
}

/// Errors reported by [`KitchenConfig::validate`].
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a positive number of seconds, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("batter max_stage must be at least 1")]
    NoBatterStages,

    #[error("frying thresholds must strictly increase (yellow < golden < brown < burnt)")]
    UnorderedFryingThresholds,

    #[error("sauce decrease_rate must be a non-negative finite number, got {0}")]
    InvalidSauceRate(f32),

    #[error("event_capacity must be at least 1")]
    NoEventCapacity,

    #[error("score weights sum past u32::MAX")]
    ScoreOverflow,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KitchenConfig {
    pub batter: BatterTuning,
    pub frying: FryingTuning,
    pub sauce: SauceTuning,
    pub scoring: ScoreWeights,
    pub restart_policy: RestartPolicy,
    /// Advance as soon as a phase's exit condition is met. When false the
    /// host calls `PhaseController::advance` itself.
    pub auto_advance: bool,
    /// Ring buffer capacity per event kind.
    pub event_capacity: usize,
}

impl Default for KitchenConfig {
    fn default() -> Self {
        Self {
            batter: BatterTuning::default(),
            frying: FryingTuning::default(),
            sauce: SauceTuning::default(),
            scoring: ScoreWeights::default(),
            restart_policy: RestartPolicy::default(),
            auto_advance: true,
            event_capacity: 256,
        }
    }
}

impl KitchenConfig {
    /// Check the tuning for values the phase handlers cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let b = &self.batter;
        if !(b.first_stage_delay > 0.0) || !b.first_stage_delay.is_finite() {
            return Err(ConfigError::NonPositiveDuration {
                field: "batter.first_stage_delay",
                value: b.first_stage_delay,
            });
        }
        if !(b.time_per_stage > 0.0) || !b.time_per_stage.is_finite() {
            return Err(ConfigError::NonPositiveDuration {
                field: "batter.time_per_stage",
                value: b.time_per_stage,
            });
        }
        if b.max_stage == 0 {
            return Err(ConfigError::NoBatterStages);
        }

        let f = &self.frying;
        if !(f.yellow_at > 0.0) {
            return Err(ConfigError::NonPositiveDuration {
                field: "frying.yellow_at",
                value: f.yellow_at,
            });
        }
        if !(f.yellow_at < f.golden_at && f.golden_at < f.brown_at && f.brown_at < f.burnt_at) {
            return Err(ConfigError::UnorderedFryingThresholds);
        }

        let rate = self.sauce.decrease_rate;
        if !(rate >= 0.0) || !rate.is_finite() {
            return Err(ConfigError::InvalidSauceRate(rate));
        }

        if self.scoring.checked_max_total().is_none() {
            return Err(ConfigError::ScoreOverflow);
        }

        if self.event_capacity == 0 {
            return Err(ConfigError::NoEventCapacity);
        }
        Ok(())
    }
}
