use crate::config::ConfigError;
use crate::id::ItemId;
use crate::phase::Phase;

/// Structural misuse of the controller. Gameplay mistakes (bad drops, a
/// second pickup) are never errors; they come back as an [`Outcome`].
///
/// [`Outcome`]: crate::phase::Outcome
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CookingError {
    #[error("no cooking session is active")]
    NoActiveSession,
    #[error("a cooking session is already active")]
    SessionActive,
    #[error("unknown or discarded item: {0:?}")]
    UnknownItem(ItemId),
    #[error("the {phase} phase has not met its exit condition")]
    PhaseIncomplete { phase: Phase },
    #[error("invalid kitchen config: {0}")]
    InvalidConfig(#[from] ConfigError),
}
