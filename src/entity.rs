//! Simulated actors
//!
//! A closed variant set instead of an open hierarchy: every actor owns
//! position, radius, color and a liveness flag; the `ActorKind` tag carries
//! the player or enemy extras. Enemy-ness is a queryable tag on the one
//! actor store, so there is no second collection to keep in sync.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{self, color};
use crate::input::InputSnapshot;
use crate::pattern::SpawnState;

/// Which side a bullet or actor fights for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Player,
    Enemy,
}

/// A simulated object in the scene's actor set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Actor {
    pub id: u32,
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub alive: bool,
    pub kind: ActorKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ActorKind {
    /// Plain drawable circle; update is a no-op
    Prop,
    Player(Player),
    Enemy(Enemy),
}

impl Actor {
    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, ActorKind::Player(_))
    }

    pub fn is_enemy(&self) -> bool {
        matches!(self.kind, ActorKind::Enemy(_))
    }

    pub fn as_player(&self) -> Option<&Player> {
        match &self.kind {
            ActorKind::Player(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_enemy(&self) -> Option<&Enemy> {
        match &self.kind {
            ActorKind::Enemy(e) => Some(e),
            _ => None,
        }
    }
}

/// Player construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub speed: f32,
    pub lives: i32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: consts::PLAYER_RADIUS,
            color: color::PLAYER,
            speed: consts::PLAYER_SPEED,
            lives: consts::PLAYER_LIVES,
        }
    }
}

/// Player-specific state: movement coupling, lives, autofire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub speed: f32,
    pub lives: i32,
    /// Seconds of invulnerability remaining after a hit
    pub invul: f32,
    pub slow: bool,
    fire_cooldown: f32,
}

impl Player {
    pub fn new(speed: f32, lives: i32) -> Self {
        Self {
            speed,
            lives,
            invul: 0.0,
            slow: false,
            fire_cooldown: 0.0,
        }
    }

    /// One tick of movement, invulnerability decay and autofire.
    /// Returns the shot fan when the cooldown elapsed this tick.
    pub fn advance(
        &mut self,
        pos: &mut Vec2,
        radius: f32,
        input: &InputSnapshot,
        bounds: Vec2,
        dt: f32,
    ) -> Option<Vec<SpawnState>> {
        self.slow = input.slow;
        let spd = self.speed * if self.slow { consts::SLOW_FACTOR } else { 1.0 };
        *pos += input.axis * spd * dt;

        // Pointer follow is an exponential approach applied per tick,
        // additive with the axis movement
        if let Some(p) = input.pointer {
            *pos += (p - *pos) * consts::POINTER_FOLLOW;
        }

        pos.x = pos.x.clamp(radius, bounds.x - radius);
        pos.y = pos.y.clamp(radius, bounds.y - radius);

        if self.invul > 0.0 {
            self.invul -= dt;
        }

        self.fire_cooldown -= dt;
        if self.fire_cooldown <= 0.0 {
            self.fire_cooldown = if self.slow {
                consts::FIRE_COOLDOWN_SLOW
            } else {
                consts::FIRE_COOLDOWN
            };
            Some(fire_spread(*pos, self.slow))
        } else {
            None
        }
    }

    /// Take a hit. Returns true when this hit killed the player.
    /// No-op while invulnerable.
    pub fn hit(&mut self) -> bool {
        if self.invul > 0.0 {
            return false;
        }
        self.lives -= 1;
        self.invul = consts::INVULN_TIME;
        self.lives < 0
    }
}

/// Shot fan for one autofire trigger: a single straight shot while slow,
/// three shots in a fixed horizontal fan otherwise
pub fn fire_spread(pos: Vec2, slow: bool) -> Vec<SpawnState> {
    let speed = if slow { consts::SHOT_SPEED_SLOW } else { consts::SHOT_SPEED };
    let spread = if slow { consts::SHOT_SPREAD_SLOW } else { consts::SHOT_SPREAD };
    let n = if slow { 1 } else { 3 };
    (0..n)
        .map(|i| {
            let dx = (i as f32 - (n as f32 - 1.0) / 2.0) * spread;
            SpawnState {
                pos: Vec2::new(pos.x + dx * 20.0, pos.y - 8.0),
                vel: Vec2::new(dx * 80.0, -speed),
                radius: consts::SHOT_RADIUS,
                color: color::SHOT,
                life: consts::SHOT_LIFE,
                ..Default::default()
            }
        })
        .collect()
}

/// Enemy construction parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EnemyConfig {
    pub pos: Vec2,
    pub radius: f32,
    pub color: u32,
    pub hp: i32,
    pub vel: Vec2,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            radius: consts::ENEMY_RADIUS,
            color: color::ENEMY,
            hp: consts::ENEMY_HP,
            vel: Vec2::ZERO,
        }
    }
}

/// Enemy-specific state: hit points and constant drift
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Enemy {
    pub hp: i32,
    pub vel: Vec2,
}

impl Enemy {
    pub fn damage(&mut self, d: i32) {
        self.hp -= d;
    }
}
