//! Coil - an arcade game where trails that cross themselves enclose enemies
//!
//! Core modules:
//! - `sim`: Deterministic simulation (trails, closures, enemies, scoring)
//! - `tuning`: Data-driven game balance
//!
//! Rendering, input wiring and frame scheduling belong to the host; it talks to
//! the core through [`sim::tick`], the pointer operations on [`sim::GameState`]
//! and the [`sim::GameEvent`] stream.

pub mod sim;
pub mod tuning;

pub use tuning::{Tuning, TuningError};

/// Game configuration constants
pub mod consts {
    /// Target simulation framerate; time factors and fps scaling are relative to it
    pub const FRAMERATE: f32 = 30.0;

    /// Default world dimensions
    pub const DEFAULT_WIDTH: f32 = 900.0;
    pub const DEFAULT_HEIGHT: f32 = 510.0;

    /// Enemies alive at once before difficulty is added
    pub const ENEMY_COUNT: f32 = 2.0;
    /// Enemy collision radius (also the enclosure probe offset)
    pub const ENEMY_SIZE: f32 = 10.0;
    /// Frames before mover variants may spawn
    pub const ENEMY_MOVER_START_FRAME: u64 = (FRAMERATE as u64) * 2;
    /// Enemies never spawn closer than this to the world edge
    pub const SPAWN_PADDING: f32 = 60.0;
    /// Enemy age at which it expires
    pub const ENEMY_MAX_TIME: f32 = 100.0;

    /// Scoring defaults
    pub const SCORE_PER_ENEMY: f64 = 30.0;
    pub const SCORE_PER_TICK: f64 = 1.0;

    /// Energy deltas
    pub const MAX_ENERGY: f32 = 100.0;
    pub const ENERGY_PER_ENEMY_DEATH: f32 = -30.0;
    pub const ENERGY_PER_ENEMY_ENCLOSED: f32 = 1.0;
    pub const ENERGY_PER_BOMB_ENCLOSED: f32 = -30.0;

    /// Combo multiplier
    pub const MULTIPLIER_LIMIT: u32 = 4;
    pub const MULTIPLIER_STEP: f64 = 0.2;

    /// Contacts
    pub const MOUSE_CONTACT_ID: i64 = -1;
    pub const CONTACT_TRAIL_LENGTH: usize = 45;
    pub const CONTACT_SMOOTHING: f32 = 0.4;

    /// Entries below this alpha are pruned
    pub const FADE_CUTOFF: f32 = 0.05;
}

/// Move `current` toward `target` by `rate` of the remaining distance
#[inline]
pub fn approach(current: f32, target: f32, rate: f32) -> f32 {
    current + (target - current) * rate
}
