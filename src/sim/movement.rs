//! Movement integration
//!
//! Intent is turned into a world-space direction, scaled by a fixed
//! acceleration, and added to velocity. Position and drag are applied every
//! tick whether or not the craft is thrusting.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};

use super::state::Craft;

/// Six independent movement keys
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveAxes {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
    pub up: bool,
    pub down: bool,
}

impl MoveAxes {
    pub fn is_idle(&self) -> bool {
        *self == Self::default()
    }
}

/// Player movement intent
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveIntent {
    /// Keyboard style, one flag per axis
    Axes(MoveAxes),
    /// Stick style: x = right, y = up, z = forward, each in -1..1
    Analog(Vec3),
}

impl MoveIntent {
    /// False for analog input carrying NaN or infinity
    pub fn is_finite(&self) -> bool {
        match self {
            MoveIntent::Axes(_) => true,
            MoveIntent::Analog(v) => v.is_finite(),
        }
    }
}

impl Default for MoveIntent {
    fn default() -> Self {
        MoveIntent::Axes(MoveAxes::default())
    }
}

fn axis(positive: bool, negative: bool) -> f32 {
    (positive as i32 - negative as i32) as f32
}

/// World-space thrust direction for an intent
///
/// Horizontal input is craft-local (forward is -Z, right is +X) and rotated
/// by `orientation`; vertical input is world Y regardless of orientation.
pub fn intent_direction(intent: &MoveIntent, orientation: Quat) -> Vec3 {
    let (strafe, lift, thrust) = match *intent {
        MoveIntent::Axes(keys) => (
            axis(keys.right, keys.left),
            axis(keys.up, keys.down),
            axis(keys.forward, keys.back),
        ),
        MoveIntent::Analog(v) => (v.x, v.y, v.z),
    };

    let local = Vec3::new(strafe, 0.0, -thrust);
    let world = orientation * local + Vec3::Y * lift;

    match intent {
        MoveIntent::Axes(_) => world.normalize_or_zero(),
        MoveIntent::Analog(_) => world.clamp_length_max(1.0),
    }
}

/// Accelerate along `direction` and clamp to the craft's top speed
pub fn apply_thrust(craft: &mut Craft, direction: Vec3, acceleration: f32) {
    if direction == Vec3::ZERO {
        return;
    }
    craft.vel += direction * acceleration;
    craft.vel = craft.vel.clamp_length_max(craft.max_speed);
}

/// Advance position by velocity, then bleed velocity by drag
pub fn integrate(craft: &mut Craft) {
    craft.pos += craft.vel;
    craft.vel *= craft.drag;
}

/// Engine loudness for the audio collaborator (silent near rest)
pub fn engine_intensity(vel: Vec3) -> f32 {
    let speed = vel.length();
    if speed <= 0.01 {
        0.0
    } else {
        (speed * 2.0).min(0.3)
    }
}
