//! Fixed-timestep driver
//!
//! Converts elapsed wall-clock time into zero or more fixed simulation
//! ticks per rendered frame. The frame slice is capped and substeps are
//! bounded so a stall never snowballs into a spiral of death; a host that
//! loses visibility should call [`Engine::reset_clock`] instead of feeding
//! the huge gap in.

use crate::consts;
use crate::input::InputSnapshot;
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Engine {
    /// Fixed tick size in seconds
    pub dt: f32,
    /// Longest wall-clock slice accepted per frame
    pub max_frame: f32,
    /// Tick cap per frame
    pub max_substeps: u32,
    accumulator: f32,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new()
    }
}

impl Engine {
    pub fn new() -> Self {
        Self {
            dt: consts::SIM_DT,
            max_frame: consts::MAX_FRAME_SLICE,
            max_substeps: consts::MAX_SUBSTEPS,
            accumulator: 0.0,
        }
    }

    /// Feed one frame's elapsed wall time; runs the due fixed ticks
    /// synchronously and in order. Returns how many ticks ran, so a host
    /// can tell an idle frame from a simulated one.
    pub fn advance(&mut self, elapsed: f32, scene: &mut Scene, input: &InputSnapshot) -> u32 {
        self.accumulator += elapsed.clamp(0.0, self.max_frame);
        let mut steps = 0;
        while self.accumulator >= self.dt && steps < self.max_substeps {
            scene.update(self.dt, input);
            self.accumulator -= self.dt;
            steps += 1;
        }
        steps
    }

    /// Drop accumulated time. Call when the host window regains focus or
    /// visibility so the pause is not simulated as one giant gap.
    pub fn reset_clock(&mut self) {
        self.accumulator = 0.0;
    }
}
