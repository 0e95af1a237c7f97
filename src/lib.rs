//! danmaku-core - a bullet-pattern simulation engine
//!
//! A fixed-timestep simulation core for arcade bullet-hell play: pooled
//! projectiles, declarative emission patterns, circle collisions. The crate
//! is deterministic and headless:
//! - Fixed timestep only
//! - Seeded RNG only
//! - No rendering, audio or platform dependencies
//!
//! Core modules:
//! - `scene`: owns all live objects and runs the per-tick pipeline
//! - `engine`: wall-clock accumulator that drives `Scene::update`
//! - `pattern`: pure spawn-state generators (spiral, ring, aimed, ...)
//! - `pool`: pre-warmed free-list arena for high-churn bullets
//! - `scheduler`: simulation-clock timers for scripting waves
//!
//! A host feeds an [`InputSnapshot`] and elapsed wall time into
//! [`Engine::advance`] each display frame, then reads the scene's bullet
//! and actor snapshots to draw.

pub mod bullet;
pub mod emitter;
pub mod engine;
pub mod entity;
pub mod input;
pub mod pattern;
pub mod pool;
pub mod rng;
pub mod scene;
pub mod scheduler;

pub use bullet::Bullet;
pub use emitter::{Emitter, EmitterConfig};
pub use engine::Engine;
pub use entity::{Actor, ActorKind, Enemy, EnemyConfig, Player, PlayerConfig, Team};
pub use input::InputSnapshot;
pub use pattern::{EmitContext, PatternSpec, SpawnState};
pub use pool::{Handle, Pool};
pub use rng::Xorshift32;
pub use scene::{Scene, SceneConfig, SceneEvent};
pub use scheduler::{Scheduler, TimerId};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Longest wall-clock slice converted to ticks in one frame
    pub const MAX_FRAME_SLICE: f32 = 0.1;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Playfield defaults
    pub const PLAYFIELD_WIDTH: f32 = 480.0;
    pub const PLAYFIELD_HEIGHT: f32 = 720.0;
    pub const DEFAULT_SEED: u32 = 20240830;

    /// Bullet defaults
    pub const BULLET_RADIUS: f32 = 4.0;
    pub const BULLET_LIFE: f32 = 6.0;
    /// Bullets die this far past any playfield edge
    pub const OFFSCREEN_MARGIN: f32 = 20.0;
    /// Pool pre-warm size
    pub const BULLET_POOL_CAPACITY: usize = 2048;

    /// Player defaults
    pub const PLAYER_RADIUS: f32 = 5.0;
    pub const PLAYER_SPEED: f32 = 220.0;
    pub const PLAYER_LIVES: i32 = 3;
    /// Speed multiplier while the slow modifier is held
    pub const SLOW_FACTOR: f32 = 0.5;
    /// Exponential pointer-follow factor, applied per tick
    pub const POINTER_FOLLOW: f32 = 0.22;
    /// Seconds between autofire shots (normal / slow)
    pub const FIRE_COOLDOWN: f32 = 0.08;
    pub const FIRE_COOLDOWN_SLOW: f32 = 0.12;
    /// Invulnerability window granted after a hit
    pub const INVULN_TIME: f32 = 2.0;
    /// Player shot kinematics (normal / slow)
    pub const SHOT_SPEED: f32 = 640.0;
    pub const SHOT_SPEED_SLOW: f32 = 520.0;
    pub const SHOT_SPREAD: f32 = 0.18;
    pub const SHOT_SPREAD_SLOW: f32 = 0.08;
    pub const SHOT_RADIUS: f32 = 3.0;
    pub const SHOT_LIFE: f32 = 1.2;

    /// Enemy defaults
    pub const ENEMY_RADIUS: f32 = 14.0;
    pub const ENEMY_HP: i32 = 100;
    /// Damage one player bullet deals to an enemy
    pub const BULLET_DAMAGE: i32 = 10;

    /// Color tags, 0xRRGGBBAA. The core never interprets these; they flow
    /// through to the renderer's palette lookup.
    pub mod color {
        pub const WHITE: u32 = 0xFFFF_FFFF;
        pub const BULLET: u32 = 0xFFFF_FFBB;
        pub const PLAYER: u32 = 0x66CC_FFFF;
        pub const ENEMY: u32 = 0xFF66_66FF;
        pub const SHOT: u32 = 0x88FF_FFFF;
        pub const SPIRAL: u32 = 0xFFFF_88FF;
        pub const RING: u32 = 0xFFBB_88FF;
        pub const AIMED: u32 = 0xFFBB_BBFF;
        pub const WAVE: u32 = 0xBBBB_FFFF;
        pub const SPREAD: u32 = 0xDDFF_88FF;
    }
}

/// Circle overlap test on squared distance (no square root)
#[inline]
pub fn circle_hit(a_pos: Vec2, a_r: f32, b_pos: Vec2, b_r: f32) -> bool {
    let rr = a_r + b_r;
    a_pos.distance_squared(b_pos) <= rr * rr
}

/// Unit vector at the given bearing (0 = +x, counterclockwise)
#[inline]
pub fn unit_vec(theta: f32) -> Vec2 {
    Vec2::new(theta.cos(), theta.sin())
}
