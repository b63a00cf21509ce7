//! Simulation module
//!
//! All gameplay logic lives here. This module must stay free of rendering,
//! audio playback and input capture:
//! - Caller-supplied clock only (milliseconds per tick)
//! - Seeded RNG only
//! - Stable iteration order (player first, then by craft id)

pub mod agent;
pub mod collision;
pub mod events;
pub mod movement;
pub mod population;
pub mod session;
pub mod state;
pub mod tick;

pub use events::GameEvent;
pub use movement::{MoveAxes, MoveIntent, engine_intensity};
pub use population::{Falloff, FieldEntity, Population};
pub use session::{Ability, ExpiringEffect, Phase, Session};
pub use state::{
    AgentBrain, Behavior, CollectionEffect, Craft, CraftId, EntityId, Obstacle, PLAYER_ID,
    Pickup, Pilot, SizeClass, World,
};
pub use tick::{TickInput, tick};
