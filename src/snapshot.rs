//! Per-frame views for rendering and HUD collaborators
//!
//! A `Snapshot` is a flat, owned copy of what the host needs to draw one
//! frame. Nothing in here feeds back into the simulation.

use glam::{Quat, Vec3};
use serde::Serialize;

use crate::consts::BLINK_PERIOD_MS;
use crate::leaderboard::Rankings;
use crate::sim::{CraftId, EntityId, SizeClass, World, engine_intensity};
use crate::Millis;

#[derive(Debug, Clone, Serialize)]
pub struct CraftView {
    pub id: CraftId,
    pub name: String,
    pub pos: Vec3,
    pub orientation: Quat,
    /// False on the "off" half of the invulnerability blink
    pub visible: bool,
    pub shield_visible: bool,
    pub magnet_visible: bool,
    pub tractor_visible: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObstacleView {
    pub id: EntityId,
    pub pos: Vec3,
    pub rotation: Vec3,
    pub size: SizeClass,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickupView {
    pub id: EntityId,
    pub pos: Vec3,
}

#[derive(Debug, Clone, Serialize)]
pub struct EffectView {
    pub pos: Vec3,
    /// Ring opacity, 1.0 when fresh
    pub life: f32,
    /// Ring scale grows as the effect fades
    pub scale: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct HudView {
    pub score: u64,
    pub energy: f32,
    pub shield_text: &'static str,
    pub magnetic_field: bool,
    pub elapsed_ms: Millis,
    pub paused: bool,
    pub game_over: bool,
    pub engine_intensity: f32,
    pub rankings: Rankings,
}

#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub now: Millis,
    pub crafts: Vec<CraftView>,
    pub obstacles: Vec<ObstacleView>,
    pub pickups: Vec<PickupView>,
    pub effects: Vec<EffectView>,
    pub hud: HudView,
}

/// Blink phase counted from the hit: visible first, toggling every period
fn blink_visible(invulnerable_until: Option<Millis>, window_ms: Millis, now: Millis) -> bool {
    match invulnerable_until {
        Some(until) if now < until => {
            let since_hit = window_ms.saturating_sub(until - now);
            (since_hit / BLINK_PERIOD_MS) % 2 == 0
        }
        _ => true,
    }
}

impl Snapshot {
    pub fn capture(world: &World, now: Millis) -> Self {
        let window_ms = world.config.economy.invulnerability_ms;
        let crafts = world
            .crafts
            .iter()
            .map(|craft| CraftView {
                id: craft.id,
                name: craft.name.clone(),
                pos: craft.pos,
                orientation: craft.orientation,
                visible: blink_visible(craft.invulnerable_until, window_ms, now),
                shield_visible: craft.is_shielded(now),
                magnet_visible: craft.has_magnet(now),
                tractor_visible: craft.tractor_beam,
            })
            .collect();

        let obstacles = world
            .obstacles
            .iter()
            .map(|o| ObstacleView {
                id: o.id,
                pos: o.pos,
                rotation: o.rotation,
                size: o.size,
            })
            .collect();

        let pickups = world
            .pickups
            .iter()
            .map(|p| PickupView { id: p.id, pos: p.pos })
            .collect();

        let effects = world
            .effects
            .iter()
            .map(|e| EffectView {
                pos: e.pos,
                life: e.life,
                scale: 1.0 + (1.0 - e.life) * 2.0,
            })
            .collect();

        let session = &world.session;
        let hud = HudView {
            score: session.score,
            energy: session.energy(),
            shield_text: if session.shield_active { "Active" } else { "Ready" },
            magnetic_field: session.magnetic_field_active,
            elapsed_ms: session.elapsed_ms(now),
            paused: session.is_paused(),
            game_over: session.is_game_over(),
            engine_intensity: engine_intensity(world.player().vel),
            rankings: Rankings::capture(world),
        };

        Self {
            now,
            crafts,
            obstacles,
            pickups,
            effects,
            hud,
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
