//! Audio feed
//!
//! Playback is the host's job. This module turns tick events into named
//! sound cues and derives the engine hum volume from the player's speed.

use glam::Vec3;
use serde::Serialize;

use crate::sim::{GameEvent, engine_intensity};

/// Sound cue types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SoundCue {
    /// Orb collected
    Collect,
    /// Craft bump or unshielded asteroid hit
    Collision,
    /// Shield raised
    Shield,
    /// Magnetic field switched on
    Magnetic,
    /// Tractor beam engaged
    Tractor,
    /// Session ended
    GameOver,
}

impl SoundCue {
    /// Asset name the host plays for this cue
    pub fn name(&self) -> &'static str {
        match self {
            SoundCue::Collect => "collect",
            SoundCue::Collision => "collision",
            SoundCue::Shield => "shield",
            SoundCue::Magnetic => "magnetic",
            SoundCue::Tractor => "tractor",
            SoundCue::GameOver => "gameOver",
        }
    }

    /// Cue for an event, if it makes a sound
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Collect { .. } => Some(SoundCue::Collect),
            GameEvent::Collision { .. }
            | GameEvent::ObstacleHit { .. }
            | GameEvent::ObstacleDestroyed { .. } => Some(SoundCue::Collision),
            GameEvent::ShieldUp => Some(SoundCue::Shield),
            GameEvent::MagneticFieldOn => Some(SoundCue::Magnetic),
            GameEvent::TractorActivate => Some(SoundCue::Tractor),
            GameEvent::GameOver { .. } => Some(SoundCue::GameOver),
            GameEvent::ShieldDown | GameEvent::MagneticFieldOff | GameEvent::TractorRelease => {
                None
            }
        }
    }
}

/// Volume state plus event-to-cue mapping
#[derive(Debug, Clone)]
pub struct AudioFeed {
    master_volume: f32,
    sfx_volume: f32,
    muted: bool,
}

impl Default for AudioFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioFeed {
    pub fn new() -> Self {
        Self {
            master_volume: 0.8,
            sfx_volume: 1.0,
            muted: false,
        }
    }

    /// Set master volume (0.0 - 1.0)
    pub fn set_master_volume(&mut self, vol: f32) {
        self.master_volume = vol.clamp(0.0, 1.0);
    }

    /// Set SFX volume (0.0 - 1.0)
    pub fn set_sfx_volume(&mut self, vol: f32) {
        self.sfx_volume = vol.clamp(0.0, 1.0);
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// Get effective volume
    pub fn effective_volume(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.master_volume * self.sfx_volume
        }
    }

    /// Cues to play for one tick's events, in event order
    ///
    /// A cue fires at most once per tick so that a pile-up of collections
    /// does not stack the same sample. Nothing plays while muted.
    pub fn cues(&self, events: &[GameEvent]) -> Vec<SoundCue> {
        if self.effective_volume() <= 0.0 {
            return Vec::new();
        }
        let mut out: Vec<SoundCue> = Vec::new();
        for cue in events.iter().filter_map(SoundCue::for_event) {
            if !out.contains(&cue) {
                out.push(cue);
            }
        }
        out
    }

    /// Engine hum volume for a craft moving at `vel`
    pub fn engine_volume(&self, vel: Vec3) -> f32 {
        engine_intensity(vel) * self.effective_volume()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cue_names() {
        assert_eq!(SoundCue::Collect.name(), "collect");
        assert_eq!(SoundCue::GameOver.name(), "gameOver");
        assert_eq!(SoundCue::Magnetic.name(), "magnetic");
    }

    #[test]
    fn test_cues_deduplicated_in_order() {
        let feed = AudioFeed::new();
        let events = [
            GameEvent::Collect {
                craft: 0,
                pos: Vec3::ZERO,
            },
            GameEvent::ShieldUp,
            GameEvent::Collect {
                craft: 1,
                pos: Vec3::X,
            },
            GameEvent::ShieldDown,
        ];
        assert_eq!(feed.cues(&events), vec![SoundCue::Collect, SoundCue::Shield]);
    }

    #[test]
    fn test_release_edges_are_silent() {
        let feed = AudioFeed::new();
        let events = [GameEvent::TractorRelease, GameEvent::MagneticFieldOff];
        assert!(feed.cues(&events).is_empty());
    }

    #[test]
    fn test_muted_plays_nothing() {
        let mut feed = AudioFeed::new();
        feed.set_muted(true);
        assert!(feed.cues(&[GameEvent::GameOver { score: 10 }]).is_empty());
        assert_eq!(feed.engine_volume(Vec3::X), 0.0);
    }

    #[test]
    fn test_engine_volume_scaled() {
        let mut feed = AudioFeed::new();
        feed.set_master_volume(1.0);
        assert_eq!(feed.engine_volume(Vec3::ZERO), 0.0);
        assert!((feed.engine_volume(Vec3::new(0.5, 0.0, 0.0)) - 0.3).abs() < 1e-6);
        feed.set_sfx_volume(0.5);
        assert!((feed.engine_volume(Vec3::new(0.5, 0.0, 0.0)) - 0.15).abs() < 1e-6);
    }
}
