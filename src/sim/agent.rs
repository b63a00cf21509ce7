//! AI pilot decision making
//!
//! Each AI craft re-plans at most once per `decision_interval_ms`: evade a
//! craft inside its personal space, otherwise chase the nearest orb in
//! detection range, otherwise wander. Between plans it keeps steering toward
//! (or away from) the target it picked.

use glam::Vec3;
use rand::Rng;
use rand_pcg::Pcg32;

use super::population::Population;
use super::state::{AgentBrain, Behavior, CraftId, Pickup};
use crate::config::AgentConfig;
use crate::{Millis, elapsed_since, horizontal_polar};

/// Nearest other craft strictly within `radius` (first encountered wins ties)
pub fn nearest_craft(
    me: CraftId,
    pos: Vec3,
    others: &[(CraftId, Vec3)],
    radius: f32,
) -> Option<(CraftId, Vec3, f32)> {
    let mut best: Option<(CraftId, Vec3, f32)> = None;
    for &(id, other) in others {
        if id == me {
            continue;
        }
        let dist = pos.distance(other);
        if dist < radius && best.is_none_or(|(_, _, d)| dist < d) {
            best = Some((id, other, dist));
        }
    }
    best
}

/// Random point on the horizontal annulus around `center`
pub fn sample_wander_target(rng: &mut Pcg32, center: Vec3, min_radius: f32, max_radius: f32) -> Vec3 {
    let angle = rng.random::<f32>() * std::f32::consts::TAU;
    let radius = min_radius + rng.random::<f32>() * (max_radius - min_radius);
    center + horizontal_polar(radius, angle)
}

/// Re-plan if the decision interval has elapsed; returns whether it did
#[allow(clippy::too_many_arguments)]
pub fn decide(
    brain: &mut AgentBrain,
    me: CraftId,
    pos: Vec3,
    others: &[(CraftId, Vec3)],
    pickups: Option<&Population<Pickup>>,
    now: Millis,
    rng: &mut Pcg32,
    cfg: &AgentConfig,
) -> bool {
    if elapsed_since(now, brain.last_decision).is_some_and(|dt| dt < brain.decision_interval_ms) {
        return false;
    }

    let nearest_pickup = pickups
        .and_then(|field| field.nearest_within(pos, brain.detection_radius))
        .map(|(pickup, _)| pickup.pos);
    let nearest_ship = nearest_craft(me, pos, others, brain.personal_space);

    let previous = brain.behavior;
    if let Some((_, ship_pos, _)) = nearest_ship {
        brain.behavior = Behavior::Evading;
        brain.target = Some(ship_pos);
    } else if let Some(pickup_pos) = nearest_pickup {
        brain.behavior = Behavior::Pursuing;
        brain.target = Some(pickup_pos);
    } else {
        brain.behavior = Behavior::Seeking;
        let reached = brain
            .target
            .is_some_and(|t| t.distance(pos) < cfg.arrive_threshold);
        let wander_due = elapsed_since(now, brain.last_wander)
            .is_none_or(|dt| dt >= brain.wander_interval_ms);
        if brain.target.is_none() || previous != Behavior::Seeking || reached || wander_due {
            brain.target = Some(sample_wander_target(
                rng,
                pos,
                cfg.wander_min_radius,
                cfg.wander_max_radius,
            ));
            brain.last_wander = Some(now);
        }
    }

    if brain.behavior != previous {
        log::debug!(
            "Pilot {} {:?} -> {:?} at {}ms",
            me,
            previous,
            brain.behavior,
            now
        );
    }
    brain.last_decision = Some(now);
    true
}

/// Normalized steering direction for the current plan
///
/// Zero when there is no target, or when a wander target has been reached.
/// The craft then coasts (up to `decision_interval_ms`) and [`decide`] picks
/// a fresh wander point on its next run; resampling here would change the
/// plan between decisions.
pub fn steer(brain: &AgentBrain, pos: Vec3, arrive_threshold: f32) -> Vec3 {
    let Some(target) = brain.target else {
        return Vec3::ZERO;
    };
    match brain.behavior {
        Behavior::Evading => (pos - target).normalize_or_zero(),
        Behavior::Pursuing => (target - pos).normalize_or_zero(),
        Behavior::Seeking => {
            if target.distance(pos) < arrive_threshold {
                Vec3::ZERO
            } else {
                (target - pos).normalize_or_zero()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{PopulationConfig, SimConfig};
    use rand::SeedableRng;

    fn brain() -> AgentBrain {
        AgentBrain::new(&SimConfig::default())
    }

    fn field_with(points: &[Vec3]) -> Population<Pickup> {
        let config = PopulationConfig {
            max_count: 8,
            spawn_radius: 100.0,
            spawn_threshold: 40.0,
        };
        let mut field = Population::new(config, Vec3::ZERO, 11);
        field.clear();
        for &p in points {
            field.spawn_at(p);
        }
        field
    }

    #[test]
    fn test_pursues_nearest_pickup() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(1);
        let field = field_with(&[Vec3::new(20.0, 0.0, 0.0), Vec3::new(10.0, 0.0, 0.0)]);
        let mut b = brain();

        assert!(decide(&mut b, 1, Vec3::ZERO, &[], Some(&field), 0, &mut rng, &cfg));
        assert_eq!(b.behavior, Behavior::Pursuing);
        assert_eq!(b.target, Some(Vec3::new(10.0, 0.0, 0.0)));
        assert_eq!(steer(&b, Vec3::ZERO, cfg.arrive_threshold), Vec3::X);
    }

    #[test]
    fn test_evading_beats_pursuing() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(2);
        let field = field_with(&[Vec3::new(10.0, 0.0, 0.0)]);
        let others = [(1, Vec3::ZERO), (2, Vec3::new(0.0, 0.0, 5.0))];
        let mut b = brain();

        decide(&mut b, 1, Vec3::ZERO, &others, Some(&field), 0, &mut rng, &cfg);
        assert_eq!(b.behavior, Behavior::Evading);
        assert_eq!(b.target, Some(Vec3::new(0.0, 0.0, 5.0)));
        // Steer directly away
        assert_eq!(steer(&b, Vec3::ZERO, cfg.arrive_threshold), Vec3::NEG_Z);
    }

    #[test]
    fn test_ignores_self_and_far_craft() {
        let others = [(1, Vec3::ZERO), (2, Vec3::new(100.0, 0.0, 0.0))];
        assert!(nearest_craft(1, Vec3::ZERO, &others, 15.0).is_none());
    }

    #[test]
    fn test_seeks_on_annulus_without_targets() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(3);
        let pos = Vec3::new(5.0, 2.0, -7.0);
        let mut b = brain();

        decide(&mut b, 1, pos, &[], Some(&field_with(&[])), 0, &mut rng, &cfg);
        assert_eq!(b.behavior, Behavior::Seeking);
        let target = b.target.unwrap();
        let offset = target - pos;
        assert_eq!(offset.y, 0.0);
        let r = offset.length();
        assert!((cfg.wander_min_radius..=cfg.wander_max_radius).contains(&r));
    }

    #[test]
    fn test_missing_pickup_field_means_no_target() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut b = brain();
        decide(&mut b, 1, Vec3::ZERO, &[], None, 0, &mut rng, &cfg);
        assert_eq!(b.behavior, Behavior::Seeking);
        assert!(b.target.is_some());
    }

    #[test]
    fn test_decisions_rate_limited() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(5);
        let mut b = brain();
        let empty = field_with(&[]);

        assert!(decide(&mut b, 1, Vec3::ZERO, &[], Some(&empty), 1000, &mut rng, &cfg));
        let first = (b.behavior, b.target);

        // A pickup shows up, but the interval has not elapsed
        let field = field_with(&[Vec3::new(3.0, 0.0, 0.0)]);
        assert!(!decide(&mut b, 1, Vec3::ZERO, &[], Some(&field), 3999, &mut rng, &cfg));
        assert_eq!((b.behavior, b.target), first);

        assert!(decide(&mut b, 1, Vec3::ZERO, &[], Some(&field), 4000, &mut rng, &cfg));
        assert_eq!(b.behavior, Behavior::Pursuing);
    }

    #[test]
    fn test_wander_target_kept_until_due() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(6);
        let mut b = brain();
        let empty = field_with(&[]);

        decide(&mut b, 1, Vec3::ZERO, &[], Some(&empty), 0, &mut rng, &cfg);
        let target = b.target;
        // Next plan before the wander interval: same target
        decide(&mut b, 1, Vec3::ZERO, &[], Some(&empty), 3000, &mut rng, &cfg);
        assert_eq!(b.target, target);
        // Wander interval elapsed: fresh target
        decide(&mut b, 1, Vec3::ZERO, &[], Some(&empty), 6000, &mut rng, &cfg);
        assert_ne!(b.target, target);
    }

    #[test]
    fn test_reached_wander_target_resampled_on_next_plan() {
        let cfg = AgentConfig::default();
        let mut rng = Pcg32::seed_from_u64(7);
        let mut b = brain();
        let empty = field_with(&[]);

        decide(&mut b, 1, Vec3::ZERO, &[], Some(&empty), 0, &mut rng, &cfg);
        let target = b.target.unwrap();
        // Parked on the target: coast
        assert_eq!(steer(&b, target, cfg.arrive_threshold), Vec3::ZERO);

        decide(&mut b, 1, target, &[], Some(&empty), 3000, &mut rng, &cfg);
        assert_ne!(b.target, Some(target));
    }

    #[test]
    fn test_steer_without_target_is_zero() {
        assert_eq!(steer(&brain(), Vec3::ONE, 5.0), Vec3::ZERO);
    }
}
