//! Collision detection and response
//!
//! Plain radius checks, run once per tick after movement: craft against
//! craft, craft against asteroids, craft against energy orbs. Every effect is
//! gated per craft (or per craft pair) so an overlap that lasts several ticks
//! only counts once.

use glam::Vec3;

use super::events::GameEvent;
use super::session::Session;
use super::state::{CollectionEffect, Craft, CraftId, World};
use crate::{Millis, elapsed_since};

/// Cooldown key for an unordered craft pair
#[inline]
pub fn pair_key(a: CraftId, b: CraftId) -> (CraftId, CraftId) {
    if a <= b { (a, b) } else { (b, a) }
}

/// Unit axis from `b` to `a`; +Y when the centers coincide
#[inline]
pub fn separation_axis(a: Vec3, b: Vec3) -> Vec3 {
    (a - b).try_normalize().unwrap_or(Vec3::Y)
}

/// Charge `amount` energy to the player for a hit
///
/// Shielded or invulnerable craft are immune. A landed hit opens an
/// invulnerability window. Returns true when the hit landed.
fn damage_player(
    session: &mut Session,
    craft: &mut Craft,
    amount: f32,
    now: Millis,
    invulnerability_ms: Millis,
) -> bool {
    if craft.is_shielded(now) || craft.is_invulnerable(now) {
        return false;
    }
    session.apply_damage(amount);
    session.grant_invulnerability(craft, now, invulnerability_ms);
    true
}

/// Age collection effects and drop the finished ones
pub fn update_collection_effects(effects: &mut Vec<CollectionEffect>, decay: f32) {
    for effect in effects.iter_mut() {
        effect.decay(decay);
    }
    effects.retain(|e| e.is_alive());
}

/// Craft against craft: push apart, damage the player, one event per pair
pub fn craft_vs_craft(world: &mut World, now: Millis) {
    let impulse = world.config.economy.ship_bump_impulse;
    let damage = world.config.economy.ship_damage;
    let cooldown = world.config.economy.ship_collision_cooldown_ms;
    let invulnerability_ms = world.config.economy.invulnerability_ms;

    let n = world.crafts.len();
    for i in 0..n {
        for j in (i + 1)..n {
            let (a, b) = (&world.crafts[i], &world.crafts[j]);
            if a.pos.distance(b.pos) >= a.collision_radius + b.collision_radius {
                continue;
            }

            let key = pair_key(a.id, b.id);
            let last = world.pair_cooldowns.get(&key).copied();
            if elapsed_since(now, last).is_some_and(|dt| dt < cooldown) {
                continue;
            }
            world.pair_cooldowns.insert(key, now);

            let axis = separation_axis(a.pos, b.pos);
            let (left, right) = world.crafts.split_at_mut(j);
            let (a, b) = (&mut left[i], &mut right[0]);
            a.vel += axis * impulse;
            b.vel -= axis * impulse;

            for craft in [a, b] {
                if craft.is_player() {
                    damage_player(
                        &mut world.session,
                        craft,
                        damage,
                        now,
                        invulnerability_ms,
                    );
                }
            }

            world.events.push(GameEvent::Collision { a: key.0, b: key.1 });
        }
    }
}

/// Craft against asteroids: first overlapping asteroid per craft
pub fn craft_vs_obstacles(world: &mut World, now: Millis) {
    let economy = &world.config.economy;
    let (damage, bonus, penalty, invulnerability_ms) = (
        economy.obstacle_damage,
        economy.shield_bonus,
        economy.agent_obstacle_penalty,
        economy.invulnerability_ms,
    );

    for craft in world.crafts.iter_mut() {
        let Some(obstacle) = world
            .obstacles
            .first_within(craft.pos, craft.collision_radius)
            .map(|o| o.id)
        else {
            continue;
        };

        if craft.is_shielded(now) {
            // Ramming with the shield up smashes the rock for a bonus
            world.obstacles.remove(obstacle);
            if craft.is_player() {
                world.session.add_score(bonus);
            } else {
                craft.score = craft.score.saturating_add(bonus);
            }
            world.events.push(GameEvent::ObstacleDestroyed {
                craft: craft.id,
                obstacle,
            });
            continue;
        }

        if craft.is_invulnerable(now) {
            continue;
        }

        if craft.is_player() {
            damage_player(&mut world.session, craft, damage, now, invulnerability_ms);
        } else {
            craft.score = craft.score.saturating_sub(penalty);
            world
                .session
                .grant_invulnerability(craft, now, invulnerability_ms);
        }
        world.events.push(GameEvent::ObstacleHit {
            craft: craft.id,
            obstacle,
        });
    }
}

/// Craft against energy orbs: one collection per collector per cooldown
///
/// Collectors are visited player first, then AI in id order, so when two
/// craft overlap the same orb the earlier one takes it.
pub fn craft_vs_pickups(world: &mut World, now: Millis) {
    let economy = &world.config.economy;
    let (energy, score, cooldown) = (
        economy.pickup_energy,
        economy.pickup_score,
        economy.collect_cooldown_ms,
    );

    for craft in world.crafts.iter_mut() {
        let last = world.collect_cooldowns.get(&craft.id).copied();
        if elapsed_since(now, last).is_some_and(|dt| dt < cooldown) {
            continue;
        }

        let Some(pickup) = world
            .pickups
            .first_within(craft.pos, craft.collection_radius)
            .map(|p| p.id)
        else {
            continue;
        };
        let Some(pickup) = world.pickups.remove(pickup) else {
            continue;
        };

        world.effects.push(CollectionEffect::new(pickup.pos));
        if craft.is_player() {
            world.session.grant_energy(energy);
            world.session.add_score(score);
        } else {
            craft.score = craft.score.saturating_add(score);
        }
        world.collect_cooldowns.insert(craft.id, now);
        world.events.push(GameEvent::Collect {
            craft: craft.id,
            pos: pickup.pos,
        });
    }
}

/// The full collision pass for one tick
pub fn resolve(world: &mut World, now: Millis) {
    let decay = world.config.economy.effect_decay;
    update_collection_effects(&mut world.effects, decay);

    // A fatal hit ends gameplay for the rest of the pass
    craft_vs_craft(world, now);
    if world.session.is_game_over() {
        return;
    }
    craft_vs_obstacles(world, now);
    if world.session.is_game_over() {
        return;
    }
    craft_vs_pickups(world, now);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::PLAYER_ID;

    /// World with empty fields and AI parked far away
    fn quiet_world() -> World {
        let mut world = World::with_seed(1);
        world.obstacles.clear();
        world.pickups.clear();
        for (i, craft) in world.crafts.iter_mut().enumerate().skip(1) {
            craft.pos = Vec3::new(1000.0 * i as f32, 0.0, 0.0);
        }
        world.session.start(0);
        world
    }

    #[test]
    fn test_pair_key_unordered() {
        assert_eq!(pair_key(3, 1), (1, 3));
        assert_eq!(pair_key(1, 3), (1, 3));
    }

    #[test]
    fn test_separation_axis_degenerate() {
        assert_eq!(separation_axis(Vec3::ONE, Vec3::ONE), Vec3::Y);
        assert_eq!(separation_axis(Vec3::X * 2.0, Vec3::ZERO), Vec3::X);
    }

    #[test]
    fn test_craft_collision_pushes_apart_and_damages_player() {
        let mut world = quiet_world();
        world.crafts[1].pos = Vec3::new(2.0, 0.0, 0.0);

        craft_vs_craft(&mut world, 100);

        assert!(world.player().vel.x < 0.0);
        assert!(world.crafts[1].vel.x > 0.0);
        assert_eq!(world.session.energy(), 80.0);
        let collisions = world
            .events
            .iter()
            .filter(|e| matches!(e, GameEvent::Collision { .. }))
            .count();
        assert_eq!(collisions, 1);
    }

    #[test]
    fn test_craft_collision_once_per_window() {
        let mut world = quiet_world();
        world.crafts[1].pos = Vec3::new(2.0, 0.0, 0.0);

        craft_vs_craft(&mut world, 100);
        world.crafts[1].pos = Vec3::new(2.0, 0.0, 0.0);
        world.player_mut().pos = Vec3::ZERO;
        craft_vs_craft(&mut world, 116);
        assert_eq!(world.events.len(), 1);
        assert_eq!(world.session.energy(), 80.0);
    }

    #[test]
    fn test_shielded_player_takes_no_ship_damage() {
        let mut world = quiet_world();
        world.crafts[1].pos = Vec3::new(2.0, 0.0, 0.0);
        world.player_mut().shield_until = Some(2000);

        craft_vs_craft(&mut world, 100);
        assert_eq!(world.session.energy(), 100.0);
        // Still bumped
        assert!(world.player().vel.x < 0.0);
    }

    #[test]
    fn test_obstacle_hit_costs_energy() {
        let mut world = quiet_world();
        world.obstacles.spawn_at(Vec3::new(1.0, 0.0, 0.0));

        craft_vs_obstacles(&mut world, 0);
        assert_eq!(world.session.energy(), 80.0);
        assert!(world.player().is_invulnerable(1));
        assert_eq!(world.obstacles.len(), 1);

        // Still overlapping inside the grace window: nothing more
        craft_vs_obstacles(&mut world, 500);
        assert_eq!(world.session.energy(), 80.0);
    }

    #[test]
    fn test_shielded_obstacle_hit_awards_bonus() {
        let mut world = quiet_world();
        let obstacle = world.obstacles.spawn_at(Vec3::new(1.0, 0.0, 0.0)).unwrap();
        world.player_mut().shield_until = Some(2000);

        craft_vs_obstacles(&mut world, 100);

        assert_eq!(world.session.energy(), 100.0);
        assert_eq!(world.session.score, world.config.economy.shield_bonus);
        assert!(world.obstacles.get(obstacle).is_none());
        assert!(matches!(
            world.events[0],
            GameEvent::ObstacleDestroyed { craft: PLAYER_ID, .. }
        ));
    }

    #[test]
    fn test_agent_obstacle_hit_costs_score() {
        let mut world = quiet_world();
        world.crafts[1].score = 25;
        let pos = world.crafts[1].pos;
        world.obstacles.spawn_at(pos);

        craft_vs_obstacles(&mut world, 0);
        assert_eq!(world.crafts[1].score, 15);
        assert_eq!(world.session.energy(), 100.0);
    }

    #[test]
    fn test_pickup_collected_by_player() {
        let mut world = quiet_world();
        world.session.set_energy(50.0);
        world.pickups.spawn_at(Vec3::new(3.0, 0.0, 0.0));

        craft_vs_pickups(&mut world, 0);

        assert!(world.pickups.is_empty());
        assert_eq!(world.session.energy(), 60.0);
        assert_eq!(world.session.score, 10);
        assert_eq!(world.effects.len(), 1);
        assert_eq!(world.effects[0].life, 1.0);
    }

    #[test]
    fn test_agent_radius_smaller_than_player() {
        let mut world = quiet_world();
        let ai_pos = world.crafts[1].pos;
        world.pickups.spawn_at(ai_pos + Vec3::new(4.0, 0.0, 0.0));

        craft_vs_pickups(&mut world, 0);
        // 4 units is inside the player's reach but not the AI's
        assert_eq!(world.pickups.len(), 1);

        world.crafts[1].pos = ai_pos + Vec3::new(2.0, 0.0, 0.0);
        craft_vs_pickups(&mut world, 0);
        assert!(world.pickups.is_empty());
        assert_eq!(world.crafts[1].score, 10);
        assert_eq!(world.session.score, 0);
    }

    #[test]
    fn test_collection_cooldown_per_collector() {
        let mut world = quiet_world();
        world.session.set_energy(50.0);
        world.pickups.spawn_at(Vec3::new(1.0, 0.0, 0.0));
        world.pickups.spawn_at(Vec3::new(-1.0, 0.0, 0.0));

        craft_vs_pickups(&mut world, 1000);
        assert_eq!(world.pickups.len(), 1);
        craft_vs_pickups(&mut world, 1100);
        assert_eq!(world.pickups.len(), 1);
        assert_eq!(world.session.score, 10);

        craft_vs_pickups(&mut world, 1250);
        assert!(world.pickups.is_empty());
        assert_eq!(world.session.score, 20);
    }

    #[test]
    fn test_shared_pickup_single_winner() {
        let mut world = quiet_world();
        world.crafts[1].pos = Vec3::new(0.0, 0.0, 2.5);
        world.pickups.spawn_at(Vec3::new(0.0, 0.0, 1.0));

        craft_vs_pickups(&mut world, 0);
        assert_eq!(world.session.score, 10);
        assert_eq!(world.crafts[1].score, 0);
        assert_eq!(world.effects.len(), 1);
    }

    #[test]
    fn test_fatal_hit_stops_the_pass() {
        let mut world = quiet_world();
        world.session.set_energy(20.0);
        world.obstacles.spawn_at(Vec3::new(1.0, 0.0, 0.0));
        world.pickups.spawn_at(Vec3::new(3.0, 0.0, 0.0));

        resolve(&mut world, 0);
        assert!(world.session.is_game_over());
        assert_eq!(world.session.energy(), 0.0);
        assert_eq!(world.session.score, 0);
        assert_eq!(world.pickups.len(), 1);
        assert!(world.effects.is_empty());
    }

    #[test]
    fn test_effects_pruned() {
        let mut effects = vec![CollectionEffect::new(Vec3::ZERO)];
        for _ in 0..19 {
            update_collection_effects(&mut effects, 0.05);
        }
        assert_eq!(effects.len(), 1);
        update_collection_effects(&mut effects, 0.05);
        assert!(effects.is_empty());
    }
}
