//! Space Scavenger - simulation core for a 3D arcade flight game
//!
//! Core modules:
//! - `sim`: Tick-driven simulation (movement, AI pilots, collisions, fields, economy)
//! - `config`: Data-driven game balance
//! - `snapshot`: Read-only views for rendering and HUD collaborators
//! - `audio`: Named sound cues and engine intensity for the audio collaborator
//! - `leaderboard`: Fixed-position pilot rankings

pub mod audio;
pub mod config;
pub mod leaderboard;
pub mod sim;
pub mod snapshot;

pub use config::{ConfigError, SimConfig};
pub use leaderboard::Rankings;

use glam::Vec3;

/// Milliseconds on the caller's clock
pub type Millis = u64;

/// Game configuration constants
pub mod consts {
    use super::Millis;

    /// Nominal frame length for the headless runner (~60 Hz)
    pub const FRAME_MS: Millis = 16;

    /// Number of AI pilots in a session
    pub const AI_COUNT: usize = 3;
    /// AI pilots start evenly spaced on a ring of this radius
    pub const AI_START_RING: f32 = 30.0;

    /// Craft defaults
    pub const CRAFT_MAX_SPEED: f32 = 0.5;
    pub const CRAFT_DRAG: f32 = 0.98;
    pub const CRAFT_ACCELERATION: f32 = 0.02;
    pub const CRAFT_COLLISION_RADIUS: f32 = 1.5;
    pub const PLAYER_COLLECTION_RADIUS: f32 = 5.0;
    pub const AGENT_COLLECTION_RADIUS: f32 = 3.0;

    /// Energy bounds
    pub const MAX_ENERGY: f32 = 100.0;

    /// Blink period while invulnerable
    pub const BLINK_PERIOD_MS: Millis = 100;
}

/// Convert spherical (r, theta, phi) to cartesian, phi measured from +Z
#[inline]
pub fn spherical_to_cartesian(r: f32, theta: f32, phi: f32) -> Vec3 {
    Vec3::new(
        r * phi.sin() * theta.cos(),
        r * phi.sin() * theta.sin(),
        r * phi.cos(),
    )
}

/// Point on the horizontal (XZ) circle of radius `r` at angle `theta`
#[inline]
pub fn horizontal_polar(r: f32, theta: f32) -> Vec3 {
    Vec3::new(r * theta.cos(), 0.0, r * theta.sin())
}

/// Elapsed milliseconds since `since`, or `None` when it never happened
#[inline]
pub fn elapsed_since(now: Millis, since: Option<Millis>) -> Option<Millis> {
    since.map(|t| now.saturating_sub(t))
}
