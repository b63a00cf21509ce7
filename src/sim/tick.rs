//! Simulation tick
//!
//! One call advances the world by one frame. Sub-steps always run in the same
//! order: agents, movement, collisions, fields, session. Later steps read the
//! positions produced by earlier ones.

use glam::{Quat, Vec3};

use super::agent;
use super::collision;
use super::events::GameEvent;
use super::movement::{self, MoveIntent};
use super::population::Falloff;
use super::session::Ability;
use super::state::{CraftId, Pilot, World};
use crate::Millis;

/// Input commands for a single tick
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Player movement intent
    pub movement: MoveIntent,
    /// Current view orientation (None keeps the previous one)
    pub orientation: Option<Quat>,
    /// Raise the shield
    pub shield: bool,
    /// Turn on the magnetic field
    pub magnetic_field: bool,
    /// Tractor beam held
    pub tractor_beam: bool,
    /// Idle -> Running
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Reset and start a fresh run
    pub restart: bool,
    /// Reset back to idle
    pub reset: bool,
}

/// Advance the world by one frame at time `now`
pub fn tick(world: &mut World, input: &TickInput, now: Millis) {
    world.events.clear();
    world.now = now;

    // Session commands
    if input.reset {
        world.reset();
        return;
    }
    if input.restart {
        world.restart(now);
        return;
    }
    if input.start {
        world.session.start(now);
    }
    if input.pause {
        world.session.toggle_pause(now);
    }

    // Ability windows are wall-clock and keep expiring while paused
    if world.session.is_paused() || world.session.is_game_over() {
        expire_abilities(world, now);
        return;
    }
    if !world.session.is_running() {
        return;
    }

    world.time_ticks += 1;
    let was_game_over = world.session.is_game_over();

    apply_player_commands(world, input, now);
    run_agents(world, now);
    run_movement(world, input);
    collision::resolve(world, now);
    if !world.session.is_game_over() {
        run_fields(world);
    }
    expire_abilities(world, now);

    if !was_game_over && world.session.is_game_over() {
        world.events.push(GameEvent::GameOver {
            score: world.session.score,
        });
    }
}

/// View orientation, abilities and tractor beam for the player craft
fn apply_player_commands(world: &mut World, input: &TickInput, now: Millis) {
    let economy = &world.config.economy;
    let (shield_ms, magnetic_field_ms) = (economy.shield_ms, economy.magnetic_field_ms);
    let player = &mut world.crafts[0];

    if let Some(orientation) = input.orientation {
        if orientation.is_finite() && orientation.length_squared() > f32::EPSILON {
            player.orientation = orientation.normalize();
        } else {
            log::warn!("Ignoring malformed view orientation {:?}", orientation);
        }
    }

    if input.shield && world.session.activate_shield(player, now, shield_ms) {
        world.events.push(GameEvent::ShieldUp);
    }
    if input.magnetic_field
        && world
            .session
            .activate_magnetic_field(player, now, magnetic_field_ms)
    {
        world.events.push(GameEvent::MagneticFieldOn);
    }

    if input.tractor_beam != player.tractor_beam {
        player.tractor_beam = input.tractor_beam;
        world.events.push(if input.tractor_beam {
            GameEvent::TractorActivate
        } else {
            GameEvent::TractorRelease
        });
    }
}

/// Re-plan (when due) and pick a steering direction for every AI craft
fn run_agents(world: &mut World, now: Millis) {
    let positions: Vec<(CraftId, Vec3)> = world.crafts.iter().map(|c| (c.id, c.pos)).collect();
    let arrive = world.config.agent.arrive_threshold;

    for craft in world.crafts.iter_mut() {
        let Pilot::Agent(brain) = &mut craft.pilot else {
            continue;
        };
        agent::decide(
            brain,
            craft.id,
            craft.pos,
            &positions,
            Some(&world.pickups),
            now,
            &mut world.rng,
            &world.config.agent,
        );
        craft.thrust = agent::steer(brain, craft.pos, arrive);
    }
}

/// Thrust then integrate every craft
fn run_movement(world: &mut World, input: &TickInput) {
    let acceleration = world.config.movement.acceleration;
    for craft in world.crafts.iter_mut() {
        if craft.is_player() {
            craft.thrust = if input.movement.is_finite() {
                movement::intent_direction(&input.movement, craft.orientation)
            } else {
                log::warn!("Ignoring malformed movement intent {:?}", input.movement);
                Vec3::ZERO
            };
        }
        let thrust = craft.thrust;
        movement::apply_thrust(craft, thrust, acceleration);
        movement::integrate(craft);
    }
}

/// Orb drift and ability pulls, then keep both fields topped up around the player
fn run_fields(world: &mut World) {
    let reference = world.player().pos;
    if !reference.is_finite() {
        log::warn!("Player position {:?} is not finite; field upkeep skipped", reference);
        return;
    }

    let economy = &world.config.economy;
    let now = world.now;
    let player = &world.crafts[0];
    world.pickups.attract(
        reference,
        economy.orb_pull_radius,
        economy.orb_pull_force,
        Falloff::Squared,
    );
    if player.has_magnet(now) {
        world
            .pickups
            .attract(
                reference,
                economy.magnetic_radius,
                economy.magnetic_force,
                Falloff::Linear,
            );
    }
    if player.tractor_beam {
        world
            .pickups
            .attract(
                reference,
                economy.tractor_range,
                economy.tractor_force,
                Falloff::Linear,
            );
    }

    world.obstacles.maintain(reference);
    world.pickups.maintain(reference);
}

/// Sweep expired ability windows and report the player's that ended
fn expire_abilities(world: &mut World, now: Millis) {
    let expired = world.session.expire_effects(now, &mut world.crafts);
    for effect in expired {
        if effect.craft != world.crafts[0].id {
            continue;
        }
        match effect.ability {
            Ability::Shield => world.events.push(GameEvent::ShieldDown),
            Ability::MagneticField => world.events.push(GameEvent::MagneticFieldOff),
            Ability::Invulnerability => {}
        }
    }
}
