//! World state and entity records
//!
//! Everything the tick mutates lives in [`World`]. Craft are created once and
//! repositioned on restart; obstacles and pickups come and go through their
//! population managers.

use std::collections::HashMap;

use glam::{Quat, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::population::{FieldEntity, Population};
use super::session::Session;
use crate::config::SimConfig;
use crate::consts::*;
use crate::{Millis, horizontal_polar};

pub type CraftId = u32;
pub type EntityId = u32;

/// Id of the player craft in every world
pub const PLAYER_ID: CraftId = 0;

/// AI behavior state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Behavior {
    #[default]
    Seeking,
    Pursuing,
    Evading,
}

/// Decision state of an AI pilot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentBrain {
    pub behavior: Behavior,
    pub target: Option<Vec3>,
    pub detection_radius: f32,
    pub personal_space: f32,
    pub last_decision: Option<Millis>,
    pub decision_interval_ms: Millis,
    pub wander_interval_ms: Millis,
    pub last_wander: Option<Millis>,
}

impl AgentBrain {
    pub fn new(config: &SimConfig) -> Self {
        Self {
            behavior: Behavior::Seeking,
            target: None,
            detection_radius: config.agent.detection_radius,
            personal_space: config.agent.personal_space,
            last_decision: None,
            decision_interval_ms: config.agent.decision_interval_ms,
            wander_interval_ms: config.agent.wander_interval_ms,
            last_wander: None,
        }
    }

    /// Forget the current plan (used on restart)
    pub fn clear(&mut self) {
        self.behavior = Behavior::Seeking;
        self.target = None;
        self.last_decision = None;
        self.last_wander = None;
    }
}

/// Who flies a craft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Pilot {
    /// Intent supplied by the input adapter
    Player,
    /// Intent computed by the agent controller
    Agent(AgentBrain),
}

/// A craft (player or AI)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Craft {
    pub id: CraftId,
    pub name: String,
    pub pilot: Pilot,
    pub pos: Vec3,
    pub vel: Vec3,
    /// View orientation for the player, self-held for AI
    pub orientation: Quat,
    pub max_speed: f32,
    pub drag: f32,
    pub collision_radius: f32,
    pub collection_radius: f32,
    pub invulnerable_until: Option<Millis>,
    pub shield_until: Option<Millis>,
    pub magnet_until: Option<Millis>,
    pub tractor_beam: bool,
    /// Per-craft score (AI only; the player's lives in the session)
    pub score: u64,
    /// World-space steering direction chosen this tick
    #[serde(skip)]
    pub thrust: Vec3,
}

impl Craft {
    fn base(id: CraftId, name: String, pilot: Pilot, config: &SimConfig) -> Self {
        let collection_radius = match pilot {
            Pilot::Player => config.craft.player_collection_radius,
            Pilot::Agent(_) => config.craft.agent_collection_radius,
        };
        Self {
            id,
            name,
            pilot,
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            orientation: Quat::IDENTITY,
            max_speed: config.movement.max_speed,
            drag: config.movement.drag,
            collision_radius: config.craft.collision_radius,
            collection_radius,
            invulnerable_until: None,
            shield_until: None,
            magnet_until: None,
            tractor_beam: false,
            score: 0,
            thrust: Vec3::ZERO,
        }
    }

    pub fn player(config: &SimConfig) -> Self {
        Self::base(PLAYER_ID, "Player".into(), Pilot::Player, config)
    }

    pub fn agent(id: CraftId, name: String, config: &SimConfig) -> Self {
        Self::base(id, name, Pilot::Agent(AgentBrain::new(config)), config)
    }

    pub fn is_player(&self) -> bool {
        matches!(self.pilot, Pilot::Player)
    }

    pub fn brain(&self) -> Option<&AgentBrain> {
        match &self.pilot {
            Pilot::Agent(brain) => Some(brain),
            Pilot::Player => None,
        }
    }

    pub fn is_shielded(&self, now: Millis) -> bool {
        self.shield_until.is_some_and(|t| now < t)
    }

    pub fn is_invulnerable(&self, now: Millis) -> bool {
        self.invulnerable_until.is_some_and(|t| now < t)
    }

    pub fn has_magnet(&self, now: Millis) -> bool {
        self.magnet_until.is_some_and(|t| now < t)
    }

    /// Put the craft back at rest at `pos`, dropping every timed state
    pub fn reposition(&mut self, pos: Vec3) {
        self.pos = pos;
        self.vel = Vec3::ZERO;
        self.thrust = Vec3::ZERO;
        self.orientation = Quat::IDENTITY;
        self.invulnerable_until = None;
        self.shield_until = None;
        self.magnet_until = None;
        self.tractor_beam = false;
        self.score = 0;
        if let Pilot::Agent(brain) = &mut self.pilot {
            brain.clear();
        }
    }
}

/// Visual size of an obstacle (no gameplay effect)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SizeClass {
    Small,
    Medium,
    Large,
}

impl SizeClass {
    pub fn scale(&self) -> f32 {
        match self {
            SizeClass::Small => 1.0,
            SizeClass::Medium => 2.0,
            SizeClass::Large => 3.0,
        }
    }
}

/// A drifting asteroid
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: EntityId,
    pub pos: Vec3,
    /// Euler rotation (radians)
    pub rotation: Vec3,
    /// Rotation added per tick
    pub spin: Vec3,
    pub size: SizeClass,
}

impl FieldEntity for Obstacle {
    fn spawn(id: EntityId, pos: Vec3, rng: &mut Pcg32) -> Self {
        use std::f32::consts::PI;
        let size = match rng.random_range(0..3) {
            0 => SizeClass::Small,
            1 => SizeClass::Medium,
            _ => SizeClass::Large,
        };
        let rotation = Vec3::new(
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
            rng.random::<f32>() * PI,
        );
        let spin = Vec3::new(
            (rng.random::<f32>() - 0.5) * 0.02,
            (rng.random::<f32>() - 0.5) * 0.02,
            (rng.random::<f32>() - 0.5) * 0.02,
        );
        Self {
            id,
            pos,
            rotation,
            spin,
            size,
        }
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Vec3 {
        self.pos
    }

    fn set_pos(&mut self, pos: Vec3) {
        self.pos = pos;
    }

    fn animate(&mut self) {
        self.rotation += self.spin;
    }
}

/// An energy orb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub id: EntityId,
    pub pos: Vec3,
}

impl FieldEntity for Pickup {
    fn spawn(id: EntityId, pos: Vec3, _rng: &mut Pcg32) -> Self {
        Self { id, pos }
    }

    fn id(&self) -> EntityId {
        self.id
    }

    fn pos(&self) -> Vec3 {
        self.pos
    }

    fn set_pos(&mut self, pos: Vec3) {
        self.pos = pos;
    }
}

/// Expanding ring left behind by a collected orb
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CollectionEffect {
    pub pos: Vec3,
    /// 1.0 at spawn, pruned at 0
    pub life: f32,
}

impl CollectionEffect {
    pub fn new(pos: Vec3) -> Self {
        Self { pos, life: 1.0 }
    }

    pub fn decay(&mut self, amount: f32) {
        self.life -= amount;
        // Absorb float residue so N steps of 1/N land exactly on zero
        if self.life < 1e-4 {
            self.life = 0.0;
        }
    }

    pub fn is_alive(&self) -> bool {
        self.life > 0.0
    }
}

/// Seed offsets so each field draws from its own stream
const OBSTACLE_STREAM: u64 = 0x0b57_ac1e;
const PICKUP_STREAM: u64 = 0x0e7e_0b5;

/// Complete simulation state
pub struct World {
    pub config: SimConfig,
    pub seed: u64,
    pub session: Session,
    /// Player first, then AI pilots in id order
    pub crafts: Vec<Craft>,
    pub obstacles: Population<Obstacle>,
    pub pickups: Population<Pickup>,
    pub effects: Vec<CollectionEffect>,
    /// Events raised by the most recent tick
    pub events: Vec<GameEvent>,
    /// Last collection per collector
    pub collect_cooldowns: HashMap<CraftId, Millis>,
    /// Last effective craft/craft collision per (low id, high id) pair
    pub pair_cooldowns: HashMap<(CraftId, CraftId), Millis>,
    pub rng: Pcg32,
    pub time_ticks: u64,
    /// Last `now` seen by the tick
    pub now: Millis,
}

impl World {
    /// Create a world with the given config and seed
    pub fn new(config: SimConfig, seed: u64) -> Self {
        let mut crafts = Vec::with_capacity(config.craft.ai_count + 1);
        crafts.push(Craft::player(&config));
        for i in 0..config.craft.ai_count {
            let name = config
                .craft
                .ai_names
                .get(i)
                .cloned()
                .unwrap_or_else(|| format!("Pilot {}", i + 1));
            crafts.push(Craft::agent(i as CraftId + 1, name, &config));
        }

        let obstacles = Population::new(
            config.obstacles.clone(),
            Vec3::ZERO,
            seed ^ OBSTACLE_STREAM,
        );
        let pickups = Population::new(config.pickups.clone(), Vec3::ZERO, seed ^ PICKUP_STREAM);

        let mut world = Self {
            config,
            seed,
            session: Session::new(),
            crafts,
            obstacles,
            pickups,
            effects: Vec::new(),
            events: Vec::new(),
            collect_cooldowns: HashMap::new(),
            pair_cooldowns: HashMap::new(),
            rng: Pcg32::seed_from_u64(seed),
            time_ticks: 0,
            now: 0,
        };
        world.place_crafts();
        world
    }

    pub fn with_seed(seed: u64) -> Self {
        Self::new(SimConfig::default(), seed)
    }

    pub fn player(&self) -> &Craft {
        &self.crafts[0]
    }

    pub fn player_mut(&mut self) -> &mut Craft {
        &mut self.crafts[0]
    }

    pub fn craft(&self, id: CraftId) -> Option<&Craft> {
        self.crafts.iter().find(|c| c.id == id)
    }

    pub fn craft_mut(&mut self, id: CraftId) -> Option<&mut Craft> {
        self.crafts.iter_mut().find(|c| c.id == id)
    }

    /// Player at the origin, AI pilots evenly on the start ring
    fn place_crafts(&mut self) {
        let ai_count = self.crafts.len().saturating_sub(1).max(1) as f32;
        for (i, craft) in self.crafts.iter_mut().enumerate() {
            let pos = if craft.is_player() {
                Vec3::ZERO
            } else {
                let angle = (i - 1) as f32 / ai_count * std::f32::consts::TAU;
                horizontal_polar(AI_START_RING, angle)
            };
            craft.reposition(pos);
        }
    }

    /// Return to the idle state: craft repositioned, fields regenerated,
    /// every pending ability window dropped
    pub fn reset(&mut self) {
        self.session.reset();
        self.place_crafts();
        self.obstacles.regenerate(Vec3::ZERO);
        self.pickups.regenerate(Vec3::ZERO);
        self.effects.clear();
        self.collect_cooldowns.clear();
        self.pair_cooldowns.clear();
        log::info!(
            "World reset: {} obstacles, {} pickups",
            self.obstacles.len(),
            self.pickups.len()
        );
    }

    /// Reset and immediately start a new run
    pub fn restart(&mut self, now: Millis) {
        self.reset();
        self.session.start(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_world_layout() {
        let world = World::with_seed(7);
        assert_eq!(world.crafts.len(), AI_COUNT + 1);
        assert!(world.player().is_player());
        assert_eq!(world.player().pos, Vec3::ZERO);
        assert_eq!(world.player().collection_radius, PLAYER_COLLECTION_RADIUS);

        for ai in &world.crafts[1..] {
            assert!(ai.brain().is_some());
            assert!((ai.pos.length() - AI_START_RING).abs() < 1e-3);
            assert_eq!(ai.collection_radius, AGENT_COLLECTION_RADIUS);
        }

        assert_eq!(world.obstacles.len(), world.config.obstacles.max_count);
        assert_eq!(world.pickups.len(), world.config.pickups.max_count);
    }

    #[test]
    fn test_ai_names_from_config() {
        let world = World::with_seed(1);
        let names: Vec<_> = world.crafts[1..].iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, ["Stark", "Zuck", "Alia"]);
    }

    #[test]
    fn test_reposition_clears_timed_state() {
        let mut world = World::with_seed(3);
        let craft = world.craft_mut(2).unwrap();
        craft.vel = Vec3::X;
        craft.shield_until = Some(500);
        craft.score = 40;
        craft.reposition(Vec3::ONE);
        assert_eq!(craft.vel, Vec3::ZERO);
        assert_eq!(craft.shield_until, None);
        assert_eq!(craft.score, 0);
        assert_eq!(craft.pos, Vec3::ONE);
    }

    #[test]
    fn test_timed_flags_are_wall_clock() {
        let mut craft = Craft::player(&SimConfig::default());
        craft.shield_until = Some(2000);
        assert!(craft.is_shielded(0));
        assert!(craft.is_shielded(1999));
        assert!(!craft.is_shielded(2000));
    }

    #[test]
    fn test_collection_effect_decays_to_zero_in_twenty_steps() {
        let mut effect = CollectionEffect::new(Vec3::ZERO);
        for _ in 0..19 {
            effect.decay(0.05);
        }
        assert!(effect.is_alive());
        effect.decay(0.05);
        assert!(!effect.is_alive());
        assert!(effect.life <= 0.0);
    }

    #[test]
    fn test_obstacle_spin_advances_rotation() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut obstacle = Obstacle::spawn(1, Vec3::ZERO, &mut rng);
        let before = obstacle.rotation;
        obstacle.animate();
        assert_eq!(obstacle.rotation, before + obstacle.spin);
    }
}
