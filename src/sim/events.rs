//! Discrete gameplay events
//!
//! The tick appends events as they happen; collaborators (audio, HUD) read
//! them after the tick and the next tick clears the list.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::state::{CraftId, EntityId};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// A craft collected an energy orb
    Collect { craft: CraftId, pos: Vec3 },
    /// Two craft bumped into each other
    Collision { a: CraftId, b: CraftId },
    /// A craft hit an asteroid without a shield
    ObstacleHit { craft: CraftId, obstacle: EntityId },
    /// A shielded craft smashed an asteroid
    ObstacleDestroyed { craft: CraftId, obstacle: EntityId },
    ShieldUp,
    ShieldDown,
    MagneticFieldOn,
    MagneticFieldOff,
    TractorActivate,
    TractorRelease,
    GameOver { score: u64 },
}
