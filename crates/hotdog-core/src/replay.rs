//! Command recording, playback and determinism hashing.
//!
//! Every controller input has a [`KitchenCommand`] twin. Zones are named by
//! station and the item is always the current one, so a log recorded
//! against one controller replays against any controller built from the same
//! layout and tuning. Hash checkpoints taken while recording are compared
//! during playback.

use serde::{Deserialize, Serialize};

use crate::controller::PhaseController;
use crate::error::CookingError;
use crate::id::{FillingId, ZoneId};
use crate::item::{OrderSpec, SauceKind};
use crate::phase::Outcome;
use crate::zone::{Point, Station};

// ---------------------------------------------------------------------------
// StateHash
// ---------------------------------------------------------------------------

/// FNV-1a hasher over controller state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateHash(pub u64);

impl StateHash {
    const FNV_OFFSET: u64 = 0xcbf29ce484222325;
    const FNV_PRIME: u64 = 0x100000001b3;

    pub fn new() -> Self {
        Self(Self::FNV_OFFSET)
    }

    pub fn write(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.0 ^= b as u64;
            self.0 = self.0.wrapping_mul(Self::FNV_PRIME);
        }
    }

    pub fn write_u8(&mut self, v: u8) {
        self.write(&[v]);
    }

    pub fn write_bool(&mut self, v: bool) {
        self.write_u8(v as u8);
    }

    pub fn write_u32(&mut self, v: u32) {
        self.write(&v.to_le_bytes());
    }

    pub fn write_u64(&mut self, v: u64) {
        self.write(&v.to_le_bytes());
    }

    /// Floats are hashed by bit pattern.
    pub fn write_f32(&mut self, v: f32) {
        self.write_u32(v.to_bits());
    }

    pub fn write_f64(&mut self, v: f64) {
        self.write_u64(v.to_bits());
    }

    pub fn finish(self) -> u64 {
        self.0
    }
}

impl Default for StateHash {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// KitchenCommand
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum KitchenCommand {
    StartSession { order: OrderSpec },
    Advance,
    Tick { dt: f64 },
    PickUp { at: Point },
    DragBegin,
    DragMove { to: Point },
    DragEnd { target: Option<Station> },
    PlaceFilling { filling: FillingId, target: Option<Station> },
    ApplySugar,
    SelectSauce { sauce: SauceKind },
    DrawTo { at: Point },
    DrawEnd,
    FinishTopping,
    Scrap,
    Abandon,
}

/// Apply one command. Commands that need an item while none exists, or a
/// station the layout lacks, come back as [`Outcome::Ignored`] the same way
/// every time, so they replay faithfully.
pub fn apply_command(
    controller: &mut PhaseController,
    cmd: &KitchenCommand,
) -> Result<Outcome, CookingError> {
    match cmd {
        KitchenCommand::StartSession { order } => {
            controller.start_session(*order).map(|()| Outcome::Accepted)
        }
        KitchenCommand::Advance => controller.advance().map(|_| Outcome::Accepted),
        KitchenCommand::Tick { dt } => controller.tick(*dt),
        KitchenCommand::PickUp { at } => controller.pick_up(*at),
        KitchenCommand::DragBegin => match controller.current_item() {
            Some(item) => controller.drag_begin(item),
            None => Ok(Outcome::Ignored),
        },
        KitchenCommand::DragMove { to } => match controller.current_item() {
            Some(item) => controller.drag_move(item, *to),
            None => Ok(Outcome::Ignored),
        },
        KitchenCommand::DragEnd { target } => match controller.current_item() {
            Some(item) => {
                let target = resolve(controller, *target);
                controller.drag_end(item, target)
            }
            None => Ok(Outcome::Ignored),
        },
        KitchenCommand::PlaceFilling { filling, target } => {
            let target = resolve(controller, *target);
            controller.place_filling(*filling, target)
        }
        KitchenCommand::ApplySugar => controller.apply_sugar(),
        KitchenCommand::SelectSauce { sauce } => controller.select_sauce(*sauce),
        KitchenCommand::DrawTo { at } => controller.draw_to(*at),
        KitchenCommand::DrawEnd => controller.draw_end(),
        KitchenCommand::FinishTopping => controller.finish_topping(),
        KitchenCommand::Scrap => controller.scrap(),
        KitchenCommand::Abandon => controller.abandon_session().map(|()| Outcome::Accepted),
    }
}

fn resolve(controller: &PhaseController, station: Option<Station>) -> Option<ZoneId> {
    station.and_then(|s| controller.zones().station_zone(s))
}

// ---------------------------------------------------------------------------
// ReplayLog
// ---------------------------------------------------------------------------

/// Where playback diverged from the recording.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayMismatch {
    pub command_index: usize,
    pub expected_hash: u64,
    pub actual_hash: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayLog {
    /// Controller hash before the first command.
    pub initial_hash: u64,
    pub commands: Vec<KitchenCommand>,
    /// `(command_index, state_hash)` taken right after that command.
    pub hash_checkpoints: Vec<(usize, u64)>,
}

impl ReplayLog {
    pub fn new(controller: &PhaseController) -> Self {
        Self {
            initial_hash: controller.state_hash(),
            commands: Vec::new(),
            hash_checkpoints: Vec::new(),
        }
    }

    pub fn record(&mut self, cmd: KitchenCommand) {
        self.commands.push(cmd);
    }

    pub fn record_with_hash(&mut self, cmd: KitchenCommand, hash: u64) {
        let index = self.commands.len();
        self.commands.push(cmd);
        self.hash_checkpoints.push((index, hash));
    }

    /// Apply `cmd` to `controller`, record it with the resulting hash.
    pub fn apply(
        &mut self,
        controller: &mut PhaseController,
        cmd: KitchenCommand,
    ) -> Result<Outcome, CookingError> {
        let result = apply_command(controller, &cmd);
        self.record_with_hash(cmd, controller.state_hash());
        result
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

#[derive(Debug)]
pub struct ReplayResult {
    pub commands_executed: usize,
    /// Whether the fresh controller started from the recorded state.
    pub initial_matches: bool,
    pub is_verified: bool,
    pub first_mismatch: Option<ReplayMismatch>,
}

/// Re-apply a log to `controller` (normally a fresh one) and compare
/// checkpoints. Command errors are part of the recording and do not stop
/// playback.
pub fn replay_and_verify(controller: &mut PhaseController, log: &ReplayLog) -> ReplayResult {
    let initial_matches = controller.state_hash() == log.initial_hash;
    let mut first_mismatch: Option<ReplayMismatch> = None;
    let mut checkpoint_idx = 0;

    for (i, cmd) in log.commands.iter().enumerate() {
        let _ = apply_command(controller, cmd);

        while checkpoint_idx < log.hash_checkpoints.len() && log.hash_checkpoints[checkpoint_idx].0 == i {
            let (_, expected_hash) = log.hash_checkpoints[checkpoint_idx];
            let actual_hash = controller.state_hash();
            if actual_hash != expected_hash && first_mismatch.is_none() {
                first_mismatch = Some(ReplayMismatch {
                    command_index: i,
                    expected_hash,
                    actual_hash,
                });
            }
            checkpoint_idx += 1;
        }
    }

    ReplayResult {
        commands_executed: log.commands.len(),
        initial_matches,
        is_verified: initial_matches && first_mismatch.is_none(),
        first_mismatch,
    }
}
