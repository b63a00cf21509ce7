//! Session economy and lifecycle
//!
//! Score, energy, the run phase and every timed ability window. Windows are
//! plain records with an expiry timestamp, swept once per tick, so pausing
//! and resetting never depend on a host timer.

use serde::{Deserialize, Serialize};

use super::state::{Craft, CraftId};
use crate::Millis;
use crate::consts::MAX_ENERGY;

/// Run phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Phase {
    /// Menu shown, nothing simulated
    #[default]
    Idle,
    Running,
    Paused,
    /// Energy ran out; terminal until reset
    GameOver,
}

/// Timed ability kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Ability {
    Shield,
    MagneticField,
    Invulnerability,
}

/// A scheduled deactivation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpiringEffect {
    pub craft: CraftId,
    pub ability: Ability,
    pub expires_at: Millis,
}

/// Aggregate session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub score: u64,
    energy: f32,
    pub phase: Phase,
    /// Mirrors of the player's ability flags for the HUD
    pub shield_active: bool,
    pub magnetic_field_active: bool,
    /// When the current run started
    pub started_at: Option<Millis>,
    paused_at: Option<Millis>,
    paused_total: Millis,
    effects: Vec<ExpiringEffect>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            score: 0,
            energy: MAX_ENERGY,
            phase: Phase::Idle,
            shield_active: false,
            magnetic_field_active: false,
            started_at: None,
            paused_at: None,
            paused_total: 0,
            effects: Vec::new(),
        }
    }

    pub fn energy(&self) -> f32 {
        self.energy
    }

    /// Set energy directly (clamped); reaching zero ends the run
    pub fn set_energy(&mut self, energy: f32) {
        self.energy = energy.clamp(0.0, MAX_ENERGY);
        self.check_depleted();
    }

    pub fn is_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn is_running(&self) -> bool {
        self.phase == Phase::Running
    }

    pub fn is_paused(&self) -> bool {
        self.phase == Phase::Paused
    }

    pub fn is_game_over(&self) -> bool {
        self.phase == Phase::GameOver
    }

    pub fn pending_effects(&self) -> &[ExpiringEffect] {
        &self.effects
    }

    /// No-op once the run is over
    pub fn grant_energy(&mut self, amount: f32) {
        if self.is_game_over() {
            return;
        }
        self.energy = (self.energy + amount).clamp(0.0, MAX_ENERGY);
    }

    /// Subtract energy; returns true when this hit ended the run
    pub fn apply_damage(&mut self, amount: f32) -> bool {
        if self.is_game_over() {
            return false;
        }
        self.energy = (self.energy - amount).clamp(0.0, MAX_ENERGY);
        self.check_depleted()
    }

    fn check_depleted(&mut self) -> bool {
        if self.energy <= 0.0 && self.phase != Phase::GameOver {
            self.energy = 0.0;
            self.phase = Phase::GameOver;
            self.paused_at = None;
            log::info!("Game over (score {})", self.score);
            return true;
        }
        false
    }

    pub fn add_score(&mut self, amount: u64) {
        if self.is_game_over() {
            return;
        }
        self.score = self.score.saturating_add(amount);
    }

    /// Idle -> Running
    pub fn start(&mut self, now: Millis) {
        if self.phase != Phase::Idle {
            return;
        }
        self.phase = Phase::Running;
        self.started_at = Some(now);
        self.paused_at = None;
        self.paused_total = 0;
        log::info!("Session started at {}ms", now);
    }

    pub fn pause(&mut self, now: Millis) {
        if self.phase == Phase::Running {
            self.phase = Phase::Paused;
            self.paused_at = Some(now);
        }
    }

    pub fn resume(&mut self, now: Millis) {
        if self.phase == Phase::Paused {
            self.phase = Phase::Running;
            if let Some(at) = self.paused_at.take() {
                self.paused_total += now.saturating_sub(at);
            }
        }
    }

    pub fn toggle_pause(&mut self, now: Millis) {
        match self.phase {
            Phase::Running => self.pause(now),
            Phase::Paused => self.resume(now),
            _ => {}
        }
    }

    /// Run time excluding pauses
    pub fn elapsed_ms(&self, now: Millis) -> Millis {
        let Some(start) = self.started_at else {
            return 0;
        };
        let paused_now = self.paused_at.map_or(0, |at| now.saturating_sub(at));
        now.saturating_sub(start)
            .saturating_sub(self.paused_total + paused_now)
    }

    /// Back to Idle with full energy; pending windows are dropped
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    fn schedule(&mut self, craft: CraftId, ability: Ability, expires_at: Millis) {
        // One window per (craft, ability); a new one replaces the old
        self.effects
            .retain(|e| !(e.craft == craft && e.ability == ability));
        self.effects.push(ExpiringEffect {
            craft,
            ability,
            expires_at,
        });
    }

    /// Raise the shield; no-op while one is already up
    pub fn activate_shield(&mut self, craft: &mut Craft, now: Millis, duration: Millis) -> bool {
        if craft.is_shielded(now) {
            return false;
        }
        let expires_at = now + duration;
        craft.shield_until = Some(expires_at);
        self.schedule(craft.id, Ability::Shield, expires_at);
        if craft.is_player() {
            self.shield_active = true;
        }
        true
    }

    /// Start the magnetic field; no-op while one is already active
    pub fn activate_magnetic_field(
        &mut self,
        craft: &mut Craft,
        now: Millis,
        duration: Millis,
    ) -> bool {
        if craft.has_magnet(now) {
            return false;
        }
        let expires_at = now + duration;
        craft.magnet_until = Some(expires_at);
        self.schedule(craft.id, Ability::MagneticField, expires_at);
        if craft.is_player() {
            self.magnetic_field_active = true;
        }
        true
    }

    /// Post-hit grace window
    pub fn grant_invulnerability(&mut self, craft: &mut Craft, now: Millis, duration: Millis) {
        let expires_at = now + duration;
        craft.invulnerable_until = Some(expires_at);
        self.schedule(craft.id, Ability::Invulnerability, expires_at);
    }

    /// Clear every window that has run out; returns what expired
    pub fn expire_effects(&mut self, now: Millis, crafts: &mut [Craft]) -> Vec<ExpiringEffect> {
        let (expired, pending): (Vec<_>, Vec<_>) = std::mem::take(&mut self.effects)
            .into_iter()
            .partition(|e| e.expires_at <= now);
        self.effects = pending;

        for effect in &expired {
            let Some(craft) = crafts.iter_mut().find(|c| c.id == effect.craft) else {
                continue;
            };
            match effect.ability {
                Ability::Shield => craft.shield_until = None,
                Ability::MagneticField => craft.magnet_until = None,
                Ability::Invulnerability => craft.invulnerable_until = None,
            }
        }

        if let Some(player) = crafts.iter().find(|c| c.is_player()) {
            self.shield_active = player.is_shielded(now);
            self.magnetic_field_active = player.has_magnet(now);
        }
        expired
    }
}
