//! Space Scavenger headless runner
//!
//! Flies a scripted session against the simulation core and prints the final
//! frame snapshot as JSON. Usage: `space-scavenger [config.json] [frames]`.

use std::time::{SystemTime, UNIX_EPOCH};

use glam::{Quat, Vec3};

use space_scavenger::audio::AudioFeed;
use space_scavenger::consts::FRAME_MS;
use space_scavenger::sim::{MoveIntent, TickInput, World, tick};
use space_scavenger::snapshot::Snapshot;
use space_scavenger::{Millis, SimConfig};

const DEFAULT_FRAMES: u64 = 1800;
const SUMMARY_EVERY: u64 = 300;

/// Scripted pilot: cruise in a slow circle, try each ability once, pause briefly
fn scripted_input(frame: u64) -> TickInput {
    let t = frame * FRAME_MS;
    let yaw = t as f32 * 0.0004;
    TickInput {
        movement: MoveIntent::Analog(Vec3::new(0.2, 0.0, 1.0)),
        orientation: Some(Quat::from_rotation_y(yaw)),
        start: frame == 0,
        shield: t >= 2_000 && t < 2_000 + FRAME_MS,
        magnetic_field: t >= 5_000 && t < 5_000 + FRAME_MS,
        tractor_beam: (8_000..10_000).contains(&t),
        pause: (t >= 12_000 && t < 12_000 + FRAME_MS) || (t >= 13_000 && t < 13_000 + FRAME_MS),
        ..Default::default()
    }
}

fn seed_from_env_or_clock() -> u64 {
    if let Some(seed) = std::env::var("SPACE_SCAVENGER_SEED")
        .ok()
        .and_then(|s| s.parse().ok())
    {
        return seed;
    }
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

fn main() {
    env_logger::init();
    log::info!("Space Scavenger (headless) starting...");

    let mut args = std::env::args().skip(1);
    let config = match args.next() {
        Some(path) => SimConfig::load(path),
        None => SimConfig::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse::<u64>().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let seed = seed_from_env_or_clock();
    log::info!("Seed {}, {} frames", seed, frames);

    let mut world = World::new(config, seed);
    let audio = AudioFeed::new();
    let mut now: Millis = 0;

    for frame in 0..frames {
        let input = scripted_input(frame);
        tick(&mut world, &input, now);

        for cue in audio.cues(&world.events) {
            log::debug!("[{}ms] cue {}", now, cue.name());
        }

        if frame % SUMMARY_EVERY == 0 {
            log::info!(
                "[{}ms] score {} energy {:.0} pickups {} obstacles {} engine {:.2}",
                now,
                world.session.score,
                world.session.energy(),
                world.pickups.len(),
                world.obstacles.len(),
                audio.engine_volume(world.player().vel),
            );
        }

        if world.session.is_game_over() {
            log::info!("Game over at frame {}", frame);
            break;
        }
        now += FRAME_MS;
    }

    match Snapshot::capture(&world, now).to_json() {
        Ok(json) => println!("{}", json),
        Err(e) => log::error!("Failed to serialize snapshot: {}", e),
    }
}
