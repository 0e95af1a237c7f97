//! Pooled projectile record
//!
//! Bullets are owned by the scene's pool and live for a few hundred
//! milliseconds to a few seconds. Each tick they integrate
//! acceleration → velocity → position and self-terminate once their
//! lifetime budget runs out or they leave the playfield by more than the
//! offscreen margin.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{self, color};
use crate::entity::Team;
use crate::pattern::SpawnState;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bullet {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    pub radius: f32,
    pub color: u32,
    /// Lifetime budget in seconds
    pub life: f32,
    pub age: f32,
    pub team: Team,
    pub alive: bool,
    /// Oriented rectangular visual, spun by `spin`
    pub rotate: bool,
    pub theta: f32,
    pub spin: f32,
}

impl Default for Bullet {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            radius: consts::BULLET_RADIUS,
            color: color::BULLET,
            life: consts::BULLET_LIFE,
            age: 0.0,
            team: Team::Enemy,
            alive: false,
            rotate: false,
            theta: 0.0,
            spin: 0.0,
        }
    }
}

impl Bullet {
    /// Rearm a recycled bullet with a freshly computed spawn state
    pub fn reset(&mut self, init: &SpawnState, team: Team) {
        *self = Self {
            pos: init.pos,
            vel: init.vel,
            accel: init.accel,
            radius: init.radius,
            color: init.color,
            life: init.life,
            age: 0.0,
            team,
            alive: true,
            rotate: init.rotate,
            theta: init.theta,
            spin: init.spin,
        };
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    /// Integrate one tick and run the self-expiry checks
    pub fn update(&mut self, dt: f32, bounds: Vec2) {
        self.age += dt;
        self.vel += self.accel * dt;
        self.pos += self.vel * dt;
        if self.rotate {
            self.theta += self.spin * dt;
        }
        if self.age >= self.life || self.offscreen(bounds) {
            self.kill();
        }
    }

    fn offscreen(&self, bounds: Vec2) -> bool {
        let m = consts::OFFSCREEN_MARGIN;
        self.pos.x < -m || self.pos.x > bounds.x + m || self.pos.y < -m || self.pos.y > bounds.y + m
    }
}
