//! Pattern generator library
//!
//! Each pattern is a pure data transform: given the emission context
//! (origin, pattern age, target) it produces an ordered list of
//! [`SpawnState`] initializers. Patterns never touch the pool and never
//! spawn bullets themselves, which keeps them independently testable.
//! The only randomness comes through the seeded RNG handed in by the
//! caller, so emission is reproducible for a fixed seed.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

use crate::consts::{self, color};
use crate::rng::Xorshift32;
use crate::unit_vec;

/// Context for one burst: where, when, and at what
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmitContext {
    /// Spawn origin
    pub origin: Vec2,
    /// Elapsed age of the owning emitter
    pub age: f32,
    /// Aim point (the scene's player unless overridden)
    pub target: Vec2,
}

/// Computed initial kinematic state for one bullet
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpawnState {
    pub pos: Vec2,
    pub vel: Vec2,
    pub accel: Vec2,
    pub radius: f32,
    pub color: u32,
    pub life: f32,
    /// Oriented rendering: rectangular visual spun by `spin`
    pub rotate: bool,
    pub theta: f32,
    pub spin: f32,
}

impl Default for SpawnState {
    fn default() -> Self {
        Self {
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            accel: Vec2::ZERO,
            radius: consts::BULLET_RADIUS,
            color: color::BULLET,
            life: consts::BULLET_LIFE,
            rotate: false,
            theta: 0.0,
            spin: 0.0,
        }
    }
}

/// `count` bullets stepping outward from a base angle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Spiral {
    pub angle: f32,
    /// Angular step between consecutive bullets
    pub delta: f32,
    pub count: u32,
    pub speed: f32,
    pub color: u32,
    pub radius: f32,
    pub spin: f32,
}

impl Default for Spiral {
    fn default() -> Self {
        Self {
            angle: 0.0,
            delta: 0.2,
            count: 1,
            speed: 120.0,
            color: color::SPIRAL,
            radius: 4.0,
            spin: 0.0,
        }
    }
}

/// `bullets` projectiles evenly spaced around a full circle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ring {
    pub base: f32,
    pub bullets: u32,
    pub speed: f32,
    pub color: u32,
    pub radius: f32,
}

impl Default for Ring {
    fn default() -> Self {
        Self {
            base: 0.0,
            bullets: 24,
            speed: 160.0,
            color: color::RING,
            radius: 4.0,
        }
    }
}

/// Fan of `count` bullets centered on the bearing toward the target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aimed {
    /// Radians between adjacent bullets in the fan
    pub spread: f32,
    pub count: u32,
    pub speed: f32,
    pub color: u32,
    pub radius: f32,
}

impl Default for Aimed {
    fn default() -> Self {
        Self {
            spread: 0.0,
            count: 1,
            speed: 200.0,
            color: color::AIMED,
            radius: 4.0,
        }
    }
}

/// Single bullet with sine-modulated acceleration for undulating flight
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Wave {
    pub base: f32,
    pub amplitude: f32,
    pub freq: f32,
    pub speed: f32,
    pub color: u32,
    pub radius: f32,
}

impl Default for Wave {
    fn default() -> Self {
        Self {
            base: 0.0,
            amplitude: 0.8,
            freq: 3.0,
            speed: 180.0,
            color: color::WAVE,
            radius: 4.0,
        }
    }
}

/// `count` bullets at angles drawn uniformly from `center ± arc/2`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomSpread {
    pub center: f32,
    pub arc: f32,
    pub count: u32,
    pub speed: f32,
    pub color: u32,
    pub radius: f32,
}

impl Default for RandomSpread {
    fn default() -> Self {
        Self {
            center: 0.0,
            arc: TAU,
            count: 10,
            speed: 140.0,
            color: color::SPREAD,
            radius: 3.0,
        }
    }
}

/// Closed set of emission patterns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PatternSpec {
    Spiral(Spiral),
    Ring(Ring),
    Aimed(Aimed),
    Wave(Wave),
    RandomSpread(RandomSpread),
}

impl PatternSpec {
    /// Evaluate the pattern into concrete spawn states for one burst
    pub fn evaluate(&self, ctx: &EmitContext, rng: &mut Xorshift32) -> Vec<SpawnState> {
        match self {
            PatternSpec::Spiral(p) => p.spawns(ctx),
            PatternSpec::Ring(p) => p.spawns(ctx),
            PatternSpec::Aimed(p) => p.spawns(ctx),
            PatternSpec::Wave(p) => p.spawns(ctx, rng),
            PatternSpec::RandomSpread(p) => p.spawns(ctx, rng),
        }
    }
}

impl Spiral {
    pub fn spawns(&self, ctx: &EmitContext) -> Vec<SpawnState> {
        (0..self.count)
            .map(|i| {
                let th = self.angle + i as f32 * self.delta;
                SpawnState {
                    pos: ctx.origin,
                    vel: unit_vec(th) * self.speed,
                    radius: self.radius,
                    color: self.color,
                    rotate: true,
                    theta: th,
                    spin: self.spin,
                    ..Default::default()
                }
            })
            .collect()
    }
}

impl Ring {
    pub fn spawns(&self, ctx: &EmitContext) -> Vec<SpawnState> {
        (0..self.bullets)
            .map(|i| {
                let th = self.base + (i as f32 / self.bullets as f32) * TAU;
                SpawnState {
                    pos: ctx.origin,
                    vel: unit_vec(th) * self.speed,
                    radius: self.radius,
                    color: self.color,
                    rotate: true,
                    theta: th,
                    spin: 4.0,
                    ..Default::default()
                }
            })
            .collect()
    }
}

impl Aimed {
    pub fn spawns(&self, ctx: &EmitContext) -> Vec<SpawnState> {
        let aim = ctx.target - ctx.origin;
        // Degenerate aim vector falls back to bearing 0 instead of
        // feeding NaN into velocities
        let base = if aim.length_squared() > 1e-6 {
            aim.y.atan2(aim.x)
        } else {
            0.0
        };
        (0..self.count)
            .map(|i| {
                let off = (i as f32 - (self.count as f32 - 1.0) / 2.0) * self.spread;
                SpawnState {
                    pos: ctx.origin,
                    vel: unit_vec(base + off) * self.speed,
                    radius: self.radius,
                    color: self.color,
                    ..Default::default()
                }
            })
            .collect()
    }
}

impl Wave {
    pub fn spawns(&self, ctx: &EmitContext, rng: &mut Xorshift32) -> Vec<SpawnState> {
        // Phase jitter comes from the scene RNG so a seeded run replays
        // identically
        let jx = rng.next01();
        let jy = rng.next01();
        let ax = ((ctx.age + jx) * self.freq).cos() * self.amplitude * 20.0;
        let ay = ((ctx.age + jy) * self.freq).sin() * self.amplitude * 20.0;
        vec![SpawnState {
            pos: ctx.origin,
            vel: unit_vec(self.base) * self.speed,
            accel: Vec2::new(ax, ay),
            radius: self.radius,
            color: self.color,
            ..Default::default()
        }]
    }
}

impl RandomSpread {
    pub fn spawns(&self, ctx: &EmitContext, rng: &mut Xorshift32) -> Vec<SpawnState> {
        (0..self.count)
            .map(|_| {
                let th = self.center + (rng.next01() - 0.5) * self.arc;
                SpawnState {
                    pos: ctx.origin,
                    vel: unit_vec(th) * self.speed,
                    radius: self.radius,
                    color: self.color,
                    ..Default::default()
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn ctx_at(origin: Vec2, target: Vec2) -> EmitContext {
        EmitContext {
            origin,
            age: 0.0,
            target,
        }
    }

    #[test]
    fn test_ring_four_perpendicular() {
        let ring = Ring {
            bullets: 4,
            speed: 100.0,
            ..Default::default()
        };
        let out = ring.spawns(&ctx_at(Vec2::ZERO, Vec2::ZERO));
        assert_eq!(out.len(), 4);
        for (i, s) in out.iter().enumerate() {
            let expect = unit_vec(i as f32 * PI / 2.0) * 100.0;
            assert!((s.vel - expect).length() < 1e-3, "bullet {i}: {:?}", s.vel);
            assert!((s.vel.length() - 100.0).abs() < 1e-3);
        }
        // Adjacent velocities are perpendicular
        assert!(out[0].vel.dot(out[1].vel).abs() < 1e-2);
    }

    #[test]
    fn test_ring_zero_bullets_yields_empty_burst() {
        let ring = Ring {
            bullets: 0,
            ..Default::default()
        };
        assert!(ring.spawns(&ctx_at(Vec2::ZERO, Vec2::ZERO)).is_empty());
    }

    #[test]
    fn test_spiral_angular_step() {
        let spiral = Spiral {
            angle: 0.5,
            delta: 0.25,
            count: 3,
            speed: 120.0,
            spin: 2.0,
            ..Default::default()
        };
        let out = spiral.spawns(&ctx_at(Vec2::new(10.0, 20.0), Vec2::ZERO));
        assert_eq!(out.len(), 3);
        for (i, s) in out.iter().enumerate() {
            assert!((s.theta - (0.5 + i as f32 * 0.25)).abs() < 1e-6);
            assert!(s.rotate);
            assert!((s.spin - 2.0).abs() < 1e-6);
            assert_eq!(s.pos, Vec2::new(10.0, 20.0));
        }
    }

    #[test]
    fn test_aimed_bearing_toward_target() {
        let aimed = Aimed {
            count: 1,
            speed: 200.0,
            ..Default::default()
        };
        // Target straight below the origin
        let out = aimed.spawns(&ctx_at(Vec2::new(100.0, 0.0), Vec2::new(100.0, 50.0)));
        assert_eq!(out.len(), 1);
        assert!(out[0].vel.x.abs() < 1e-3);
        assert!((out[0].vel.y - 200.0).abs() < 1e-3);
    }

    #[test]
    fn test_aimed_fan_centered() {
        let aimed = Aimed {
            count: 3,
            spread: 0.2,
            speed: 200.0,
            ..Default::default()
        };
        let out = aimed.spawns(&ctx_at(Vec2::ZERO, Vec2::new(1.0, 0.0)));
        let angles: Vec<f32> = out.iter().map(|s| s.vel.y.atan2(s.vel.x)).collect();
        assert!((angles[0] + 0.2).abs() < 1e-3);
        assert!(angles[1].abs() < 1e-3);
        assert!((angles[2] - 0.2).abs() < 1e-3);
    }

    #[test]
    fn test_aimed_zero_length_falls_back_to_bearing_zero() {
        let aimed = Aimed {
            count: 1,
            speed: 150.0,
            ..Default::default()
        };
        let pos = Vec2::new(42.0, 7.0);
        let out = aimed.spawns(&ctx_at(pos, pos));
        assert!(out[0].vel.x > 149.0);
        assert!(out[0].vel.y.abs() < 1e-3);
        assert!(out[0].vel.is_finite());
    }

    #[test]
    fn test_random_spread_within_arc_and_reproducible() {
        let spread = RandomSpread {
            center: PI / 2.0,
            arc: 1.0,
            count: 16,
            speed: 140.0,
            ..Default::default()
        };
        let ctx = ctx_at(Vec2::ZERO, Vec2::ZERO);
        let mut rng = Xorshift32::new(777);
        let out = spread.spawns(&ctx, &mut rng);
        assert_eq!(out.len(), 16);
        for s in &out {
            let th = s.vel.y.atan2(s.vel.x);
            assert!(th >= PI / 2.0 - 0.5 - 1e-3 && th <= PI / 2.0 + 0.5 + 1e-3);
        }
        // Same seed, same burst
        let mut rng2 = Xorshift32::new(777);
        let out2 = spread.spawns(&ctx, &mut rng2);
        assert_eq!(out, out2);
    }

    #[test]
    fn test_wave_accel_bounded_and_age_dependent() {
        let wave = Wave {
            amplitude: 0.8,
            ..Default::default()
        };
        let mut rng = Xorshift32::new(5);
        let out = wave.spawns(&ctx_at(Vec2::ZERO, Vec2::ZERO), &mut rng);
        assert_eq!(out.len(), 1);
        let cap = 0.8 * 20.0 + 1e-3;
        assert!(out[0].accel.x.abs() <= cap);
        assert!(out[0].accel.y.abs() <= cap);

        // A different age shifts the modulation phase
        let mut rng_a = Xorshift32::new(5);
        let mut rng_b = Xorshift32::new(5);
        let young = wave.spawns(
            &EmitContext {
                origin: Vec2::ZERO,
                age: 0.0,
                target: Vec2::ZERO,
            },
            &mut rng_a,
        );
        let old = wave.spawns(
            &EmitContext {
                origin: Vec2::ZERO,
                age: 1.0,
                target: Vec2::ZERO,
            },
            &mut rng_b,
        );
        assert_ne!(young[0].accel, old[0].accel);
    }

    #[test]
    fn test_evaluate_dispatch() {
        let mut rng = Xorshift32::new(1);
        let ctx = ctx_at(Vec2::ZERO, Vec2::new(0.0, 1.0));
        let spec = PatternSpec::Ring(Ring {
            bullets: 8,
            ..Default::default()
        });
        assert_eq!(spec.evaluate(&ctx, &mut rng).len(), 8);
    }
}
