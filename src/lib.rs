//! Horde Survivor - simulation core of a wave-survival arena game
//!
//! Core modules:
//! - `sim`: Simulation (pools, spawning, movement, combat, progression)
//! - `config`: Data-driven game balance
//! - `session`: Frame controller (fixed timestep, input edges, loop suspension)

pub mod config;
pub mod session;
pub mod sim;

pub use config::{ConfigError, SimConfig};
pub use session::{Action, Session};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (120 Hz)
    pub const SIM_DT: f32 = 1.0 / 120.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Frame deltas above this are clamped (tab switches, debugger pauses)
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Collision radii are scaled down so sprites can overlap a little
    pub const HITBOX_SCALE: f32 = 0.35;
    /// Projectiles are released once this far outside the field
    pub const OFFFIELD_MARGIN: f32 = 100.0;

    /// Status effects deal their periodic damage once per this many ms
    pub const STATUS_TICK_MS: f64 = 1000.0;

    /// Shield capacity granted per stacked shield upgrade level
    pub const SHIELD_PER_LEVEL: f32 = 40.0;

    /// Inactive slots pre-allocated per pool at run start
    pub const POOL_PREALLOC: usize = 400;

    /// Offers presented per level-up
    pub const OFFER_COUNT: usize = 3;

    /// Angular spacing between projectiles of a multi-shot volley (radians)
    pub const VOLLEY_SPREAD: f32 = 0.15;
}

/// Unit vector pointing from `from` toward `to` (zero when they coincide)
#[inline]
pub fn direction_to(from: Vec2, to: Vec2) -> Vec2 {
    (to - from).normalize_or_zero()
}

/// Rotate a vector by `angle` radians
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}
