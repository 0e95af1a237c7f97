//! Polled input state for a single tick
//!
//! The core never subscribes to platform events. The host samples its
//! devices once per frame, translates them into simulation coordinates,
//! and hands the snapshot to every tick of that frame.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct InputSnapshot {
    /// Discrete movement axis; each component is -1, 0 or 1
    pub axis: Vec2,
    /// Focus/slow modifier held
    pub slow: bool,
    /// Pointer position in playfield coordinates while active
    pub pointer: Option<Vec2>,
}

impl InputSnapshot {
    /// Snapshot with no movement, no modifier, no pointer
    pub fn idle() -> Self {
        Self::default()
    }
}
