//! Bounded, regenerating entity fields
//!
//! A population keeps exactly `max_count` entities scattered in a spherical
//! shell around a moving reference point (the player). Entities that drift
//! too far behind are culled and replaced ahead of the player.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::state::EntityId;
use crate::config::PopulationConfig;
use crate::spherical_to_cartesian;

/// Inner radius of the spawn shell as a fraction of `spawn_radius`
pub const SPAWN_INNER_FRACTION: f32 = 0.3;

/// An entity that can live in a [`Population`]
pub trait FieldEntity {
    fn spawn(id: EntityId, pos: Vec3, rng: &mut Pcg32) -> Self;
    fn id(&self) -> EntityId;
    fn pos(&self) -> Vec3;
    fn set_pos(&mut self, pos: Vec3);
    /// Passive per-tick animation
    fn animate(&mut self) {}
}

/// Sample a point in the spawn shell around `center`
///
/// Latitude uses inverse-cosine sampling so points are uniform over solid
/// angle instead of bunching at the poles.
pub fn sample_spawn_point(rng: &mut Pcg32, center: Vec3, spawn_radius: f32) -> Vec3 {
    let theta = rng.random::<f32>() * std::f32::consts::TAU;
    let phi = (rng.random::<f32>() * 2.0 - 1.0).clamp(-1.0, 1.0).acos();
    let r = spawn_radius * (SPAWN_INNER_FRACTION + rng.random::<f32>() * (1.0 - SPAWN_INNER_FRACTION));
    center + spherical_to_cartesian(r, theta, phi)
}

/// How an attraction weakens toward the edge of its radius
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Falloff {
    /// `(1 - d/r) * force`
    Linear,
    /// `(1 - d/r)^2 * force`, gentle at range
    Squared,
}

impl Falloff {
    fn weight(self, closeness: f32) -> f32 {
        match self {
            Falloff::Linear => closeness,
            Falloff::Squared => closeness * closeness,
        }
    }
}

/// Bounded field of entities following a reference point
pub struct Population<E: FieldEntity> {
    config: PopulationConfig,
    entities: Vec<E>,
    /// Center of the last refill
    anchor: Vec3,
    rng: Pcg32,
    next_id: EntityId,
}

impl<E: FieldEntity> Population<E> {
    /// Create a full population around `center`
    pub fn new(config: PopulationConfig, center: Vec3, seed: u64) -> Self {
        let mut population = Self {
            entities: Vec::with_capacity(config.max_count),
            config,
            anchor: center,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        };
        population.fill(center);
        population
    }

    pub fn config(&self) -> &PopulationConfig {
        &self.config
    }

    pub fn anchor(&self) -> Vec3 {
        self.anchor
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.entities.len() >= self.config.max_count
    }

    pub fn iter(&self) -> impl Iterator<Item = &E> {
        self.entities.iter()
    }

    pub fn get(&self, id: EntityId) -> Option<&E> {
        self.entities.iter().find(|e| e.id() == id)
    }

    fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn one entity at a sampled point around `center`
    fn spawn_around(&mut self, center: Vec3) {
        let pos = sample_spawn_point(&mut self.rng, center, self.config.spawn_radius);
        let id = self.next_entity_id();
        let entity = E::spawn(id, pos, &mut self.rng);
        self.entities.push(entity);
    }

    /// Top up to `max_count` around `center`
    fn fill(&mut self, center: Vec3) -> usize {
        let mut spawned = 0;
        while self.entities.len() < self.config.max_count {
            self.spawn_around(center);
            spawned += 1;
        }
        spawned
    }

    /// Place an entity at an exact position; refused when the field is full
    pub fn spawn_at(&mut self, pos: Vec3) -> Option<EntityId> {
        if self.is_full() {
            return None;
        }
        let id = self.next_entity_id();
        let entity = E::spawn(id, pos, &mut self.rng);
        self.entities.push(entity);
        Some(id)
    }

    pub fn remove(&mut self, id: EntityId) -> Option<E> {
        let index = self.entities.iter().position(|e| e.id() == id)?;
        Some(self.entities.remove(index))
    }

    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Drop everything and refill around `center`
    pub fn regenerate(&mut self, center: Vec3) {
        self.entities.clear();
        self.anchor = center;
        self.fill(center);
    }

    /// Nearest entity within `radius` of `pos` (first encountered wins ties)
    pub fn nearest_within(&self, pos: Vec3, radius: f32) -> Option<(&E, f32)> {
        let mut best: Option<(&E, f32)> = None;
        for entity in &self.entities {
            let dist = entity.pos().distance(pos);
            if dist < radius && best.is_none_or(|(_, d)| dist < d) {
                best = Some((entity, dist));
            }
        }
        best
    }

    /// First entity (in field order) strictly within `radius` of `pos`
    pub fn first_within(&self, pos: Vec3, radius: f32) -> Option<&E> {
        self.entities.iter().find(|e| e.pos().distance(pos) < radius)
    }

    /// Pull entities inside `radius` toward `toward`, harder when closer
    pub fn attract(&mut self, toward: Vec3, radius: f32, force: f32, falloff: Falloff) {
        if radius <= 0.0 {
            return;
        }
        for entity in &mut self.entities {
            let offset = toward - entity.pos();
            let dist = offset.length();
            if dist < radius && dist > f32::EPSILON {
                let step = falloff.weight(1.0 - dist / radius) * force;
                // Never overshoot the attractor
                let step = step.min(dist);
                entity.set_pos(entity.pos() + offset / dist * step);
            }
        }
    }

    /// Per-tick upkeep: animate, cull stragglers, re-anchor and refill
    ///
    /// Returns the number of entities spawned.
    pub fn maintain(&mut self, reference: Vec3) -> usize {
        for entity in &mut self.entities {
            entity.animate();
        }

        let cull_radius = self.config.spawn_radius * 2.0;
        let before = self.entities.len();
        self.entities
            .retain(|e| e.pos().distance(reference) <= cull_radius);
        let culled = before - self.entities.len();

        let moved = reference.distance(self.anchor) > self.config.spawn_threshold;
        if moved {
            self.anchor = reference;
        }

        let spawned = if moved || culled > 0 || !self.is_full() {
            self.fill(reference)
        } else {
            0
        };

        if culled > 0 {
            log::debug!("Field culled {} and spawned {}", culled, spawned);
        }
        spawned
    }
}
