//! Simulation tuning
//!
//! Every gameplay constant lives here so a session can be rebalanced from a
//! JSON file without recompiling. Missing fields fall back to defaults.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::Millis;
use crate::consts::*;

/// Errors from loading or validating a config
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("config read error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Movement integrator tuning (units per tick)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    pub acceleration: f32,
    pub max_speed: f32,
    /// Multiplicative velocity decay per tick
    pub drag: f32,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            acceleration: CRAFT_ACCELERATION,
            max_speed: CRAFT_MAX_SPEED,
            drag: CRAFT_DRAG,
        }
    }
}

/// Craft radii
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    pub collision_radius: f32,
    pub player_collection_radius: f32,
    pub agent_collection_radius: f32,
    /// Number of AI pilots
    pub ai_count: usize,
    pub ai_names: Vec<String>,
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self {
            collision_radius: CRAFT_COLLISION_RADIUS,
            player_collection_radius: PLAYER_COLLECTION_RADIUS,
            agent_collection_radius: AGENT_COLLECTION_RADIUS,
            ai_count: AI_COUNT,
            ai_names: vec!["Stark".into(), "Zuck".into(), "Alia".into()],
        }
    }
}

/// AI pilot tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentConfig {
    pub detection_radius: f32,
    pub personal_space: f32,
    /// Minimum time between re-plans
    pub decision_interval_ms: Millis,
    /// Minimum time between wander target re-samples
    pub wander_interval_ms: Millis,
    pub wander_min_radius: f32,
    pub wander_max_radius: f32,
    /// Seeking target counts as reached below this distance
    pub arrive_threshold: f32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            detection_radius: 50.0,
            personal_space: 15.0,
            decision_interval_ms: 3000,
            wander_interval_ms: 6000,
            wander_min_radius: 30.0,
            wander_max_radius: 80.0,
            arrive_threshold: 5.0,
        }
    }
}

/// Bounded field parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PopulationConfig {
    pub max_count: usize,
    pub spawn_radius: f32,
    /// Reference point must move this far before the field re-anchors
    pub spawn_threshold: f32,
}

impl PopulationConfig {
    pub fn asteroids() -> Self {
        Self {
            max_count: 50,
            spawn_radius: 150.0,
            spawn_threshold: 50.0,
        }
    }

    pub fn energy_orbs() -> Self {
        Self {
            max_count: 20,
            spawn_radius: 100.0,
            spawn_threshold: 40.0,
        }
    }
}

/// Score, energy and ability tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub pickup_energy: f32,
    pub pickup_score: u64,
    pub obstacle_damage: f32,
    pub ship_damage: f32,
    /// Awarded for ramming an obstacle with the shield up
    pub shield_bonus: u64,
    /// Score an AI pilot loses on an obstacle hit
    pub agent_obstacle_penalty: u64,
    pub ship_bump_impulse: f32,

    pub shield_ms: Millis,
    pub magnetic_field_ms: Millis,
    pub invulnerability_ms: Millis,
    pub collect_cooldown_ms: Millis,
    pub ship_collision_cooldown_ms: Millis,

    /// Collection effect life lost per tick
    pub effect_decay: f32,

    /// Passive drift of nearby orbs toward the player (squared falloff)
    pub orb_pull_radius: f32,
    pub orb_pull_force: f32,

    pub magnetic_radius: f32,
    pub magnetic_force: f32,
    pub tractor_range: f32,
    pub tractor_force: f32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            pickup_energy: 10.0,
            pickup_score: 10,
            obstacle_damage: 20.0,
            ship_damage: 20.0,
            shield_bonus: 25,
            agent_obstacle_penalty: 10,
            ship_bump_impulse: 0.5,

            shield_ms: 2000,
            magnetic_field_ms: 5000,
            invulnerability_ms: 1500,
            collect_cooldown_ms: 250,
            ship_collision_cooldown_ms: 500,

            effect_decay: 0.05,

            orb_pull_radius: 40.0,
            orb_pull_force: 0.5,

            magnetic_radius: 15.0,
            magnetic_force: 0.5,
            tractor_range: 20.0,
            tractor_force: 0.2,
        }
    }
}

/// Complete simulation config
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub movement: MovementConfig,
    pub craft: CraftConfig,
    pub agent: AgentConfig,
    pub obstacles: PopulationConfig,
    pub pickups: PopulationConfig,
    pub economy: EconomyConfig,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            movement: MovementConfig::default(),
            craft: CraftConfig::default(),
            agent: AgentConfig::default(),
            obstacles: PopulationConfig::asteroids(),
            pickups: PopulationConfig::energy_orbs(),
            economy: EconomyConfig::default(),
        }
    }
}

impl SimConfig {
    /// Parse and validate a JSON config
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Read a config file, falling back to defaults on any problem
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path)
            .map_err(ConfigError::from)
            .and_then(|json| Self::from_json(&json))
        {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("Using default config ({})", e);
                Self::default()
            }
        }
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check value ranges the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        if !(m.drag > 0.0 && m.drag <= 1.0) {
            return Err(invalid("movement.drag", "must be in (0, 1]"));
        }
        if m.max_speed <= 0.0 || m.acceleration < 0.0 {
            return Err(invalid(
                "movement.max_speed",
                "speed must be positive and acceleration non-negative",
            ));
        }

        let a = &self.agent;
        if a.wander_min_radius > a.wander_max_radius {
            return Err(invalid(
                "agent.wander_min_radius",
                "must not exceed wander_max_radius",
            ));
        }

        for (field, pop) in [("obstacles", &self.obstacles), ("pickups", &self.pickups)] {
            if pop.spawn_radius <= 0.0 {
                return Err(invalid(field, "spawn_radius must be positive"));
            }
        }

        let e = &self.economy;
        if !(0.0..=1.0).contains(&e.effect_decay) || e.effect_decay == 0.0 {
            return Err(invalid("economy.effect_decay", "must be in (0, 1]"));
        }
        if e.pickup_energy < 0.0 || e.obstacle_damage < 0.0 || e.ship_damage < 0.0 {
            return Err(invalid("economy", "energy amounts must be non-negative"));
        }
        if e.orb_pull_radius < 0.0 || e.orb_pull_force < 0.0 {
            return Err(invalid("economy.orb_pull", "radius and force must be non-negative"));
        }

        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SimConfig::from_json(r#"{ "economy": { "shield_ms": 3000 } }"#).unwrap();
        assert_eq!(config.economy.shield_ms, 3000);
        assert_eq!(config.economy.magnetic_field_ms, 5000);
        assert_eq!(config.pickups.max_count, 20);
        assert_eq!(config.obstacles.max_count, 50);
    }

    #[test]
    fn test_json_roundtrip_preserves_values() {
        let mut config = SimConfig::default();
        config.craft.ai_count = 5;
        let json = config.to_json().unwrap();
        let back = SimConfig::from_json(&json).unwrap();
        assert_eq!(back.craft.ai_count, 5);
    }

    #[test]
    fn test_invalid_drag_rejected() {
        let err = SimConfig::from_json(r#"{ "movement": { "drag": 1.5 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "movement.drag", .. }));
    }

    #[test]
    fn test_negative_orb_pull_rejected() {
        let err = SimConfig::from_json(r#"{ "economy": { "orb_pull_force": -1.0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { field: "economy.orb_pull", .. }));
    }

    #[test]
    fn test_malformed_json_rejected() {
        let err = SimConfig::from_json("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_missing_file_falls_back() {
        let config = SimConfig::load("/definitely/not/here.json");
        assert_eq!(config.pickups.max_count, 20);
    }
}
