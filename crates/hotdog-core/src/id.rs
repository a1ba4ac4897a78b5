use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a registered interaction zone.
    pub struct ZoneId;

    /// Identifies the hotdog currently on the counter. A scrapped or
    /// discarded item's id is never reused.
    pub struct ItemId;
}

/// Identifies a half-filling (sausage, cheese, ...) on the menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FillingId(pub u32);
