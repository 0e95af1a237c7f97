//! Cadenced pattern emitters
//!
//! Ties a pattern to a burst interval and a spawn origin. The emitter only
//! decides *when* a burst happens; the scene evaluates the pattern and
//! acquires the bullets. Cadence is fixed-rate with no catch-up: at most
//! one burst per update call even when dt exceeds the rate, mirroring the
//! scheduler's policy.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::entity::Team;
use crate::pattern::PatternSpec;

/// Emitter construction parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmitterConfig {
    pub pos: Vec2,
    /// Seconds between bursts
    pub rate: f32,
    pub pattern: PatternSpec,
    pub team: Team,
    pub enabled: bool,
    /// Aim at this actor instead of the scene player
    pub target: Option<u32>,
}

impl EmitterConfig {
    pub fn new(pos: Vec2, rate: f32, pattern: PatternSpec) -> Self {
        Self {
            pos,
            rate,
            pattern,
            team: Team::Enemy,
            enabled: true,
            target: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Emitter {
    pub id: u32,
    pub pos: Vec2,
    pub rate: f32,
    pub pattern: PatternSpec,
    pub team: Team,
    pub enabled: bool,
    pub target: Option<u32>,
    timer: f32,
    age: f32,
}

impl Emitter {
    pub fn new(id: u32, cfg: EmitterConfig) -> Self {
        Self {
            id,
            pos: cfg.pos,
            rate: cfg.rate,
            pattern: cfg.pattern,
            team: cfg.team,
            enabled: cfg.enabled,
            target: cfg.target,
            // First burst after one full interval
            timer: cfg.rate,
            age: 0.0,
        }
    }

    /// Elapsed enabled time
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Advance the cadence. Returns the emitter age when a burst is due
    /// this tick. Disabled emitters do no work and do not age.
    pub fn tick(&mut self, dt: f32) -> Option<f32> {
        if !self.enabled {
            return None;
        }
        self.age += dt;
        self.timer -= dt;
        if self.timer <= 0.0 {
            // Reset relative to the firing tick, not to absolute zero
            self.timer = self.rate;
            Some(self.age)
        } else {
            None
        }
    }
}
