//! Game balance and world configuration
//!
//! Every knob the simulation reads lives in [`Tuning`]. Missing JSON fields
//! fall back to the defaults in [`crate::consts`].

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Errors raised while loading a tuning file
#[derive(Debug, Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    // === Timing ===
    /// Target framerate (frames per second)
    pub framerate: f32,
    /// Difficulty gained per frame (scaled by the time factor)
    pub difficulty_rate: f32,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,

    // === Enemies ===
    /// Population target is `floor(base_enemy_count + difficulty)`
    pub base_enemy_count: f32,
    /// Collision radius, also the enclosure probe offset
    pub enemy_radius: f32,
    /// Age gained per frame at the target framerate
    pub enemy_aging_rate: f32,
    /// Inset from the world edge for spawn positions
    pub spawn_padding: f32,
    /// A spawn roll succeeds when a uniform sample exceeds this
    pub spawn_threshold: f32,
    /// Bombs may spawn while their share of the population is below this
    pub bomb_fraction_limit: f32,
    /// Movers may spawn while their share of the population is below this
    pub mover_fraction_limit: f32,
    /// Frame count after which movers may spawn
    pub mover_start_frame: u64,
    /// Mover speed in pixels per frame
    pub mover_speed: f32,

    // === Contacts ===
    /// Trail capacity in points
    pub trail_length: usize,
    /// Fraction of the remaining distance covered per frame
    pub contact_smoothing: f32,
    /// Enclosures are tested on one frame out of this many
    pub enclosure_interval: u64,

    // === Scoring ===
    pub score_per_enemy: f64,
    pub score_per_tick: f64,
    pub energy_per_enemy_death: f32,
    pub energy_per_enemy_enclosed: f32,
    pub energy_per_bomb_enclosed: f32,
    pub multiplier_step: f64,
    pub multiplier_limit: u32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            framerate: FRAMERATE,
            difficulty_rate: 0.002,

            world_width: DEFAULT_WIDTH,
            world_height: DEFAULT_HEIGHT,

            base_enemy_count: ENEMY_COUNT,
            enemy_radius: ENEMY_SIZE,
            enemy_aging_rate: 0.2,
            spawn_padding: SPAWN_PADDING,
            spawn_threshold: 0.85,
            bomb_fraction_limit: 0.4,
            mover_fraction_limit: 0.3,
            mover_start_frame: ENEMY_MOVER_START_FRAME,
            mover_speed: 1.5,

            trail_length: CONTACT_TRAIL_LENGTH,
            contact_smoothing: CONTACT_SMOOTHING,
            enclosure_interval: 2,

            score_per_enemy: SCORE_PER_ENEMY,
            score_per_tick: SCORE_PER_TICK,
            energy_per_enemy_death: ENERGY_PER_ENEMY_DEATH,
            energy_per_enemy_enclosed: ENERGY_PER_ENEMY_ENCLOSED,
            energy_per_bomb_enclosed: ENERGY_PER_BOMB_ENCLOSED,
            multiplier_step: MULTIPLIER_STEP,
            multiplier_limit: MULTIPLIER_LIMIT,
        }
    }
}

impl Tuning {
    /// Parse and validate tuning from JSON
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load and validate a tuning file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Serialize to pretty JSON
    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Frame duration at the target framerate, in milliseconds
    pub fn frame_millis(&self) -> f64 {
        1000.0 / self.framerate as f64
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn invalid(field: &'static str, reason: impl Into<String>) -> TuningError {
            TuningError::Invalid {
                field,
                reason: reason.into(),
            }
        }

        if !(self.framerate > 0.0) {
            return Err(invalid("framerate", "must be positive"));
        }
        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return Err(invalid("world_width", "world must have a positive size"));
        }
        if self.spawn_padding < 0.0
            || self.spawn_padding * 2.0 >= self.world_width
            || self.spawn_padding * 2.0 >= self.world_height
        {
            return Err(invalid("spawn_padding", "leaves no room to spawn enemies"));
        }
        if !(0.0..1.0).contains(&self.spawn_threshold) {
            return Err(invalid("spawn_threshold", "must be in [0, 1)"));
        }
        if self.trail_length < 2 {
            return Err(invalid("trail_length", "must hold at least two points"));
        }
        if !(self.contact_smoothing > 0.0 && self.contact_smoothing <= 1.0) {
            return Err(invalid("contact_smoothing", "must be in (0, 1]"));
        }
        if self.enclosure_interval == 0 {
            return Err(invalid("enclosure_interval", "must be at least 1"));
        }
        if !(self.multiplier_step > 0.0) {
            return Err(invalid("multiplier_step", "must be positive"));
        }
        if self.multiplier_limit < 1 {
            return Err(invalid("multiplier_limit", "must be at least 1"));
        }
        Ok(())
    }
}
