//! Frame timing
//!
//! The host calls `tick` with the wall-clock time since the previous frame.
//! Durations are expressed relative to the target framerate so that aging and
//! difficulty progress at the same speed on slow and fast machines.

use serde::{Deserialize, Serialize};

/// Measured framerate and per-frame time factor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameClock {
    /// Target frames per second
    framerate: f32,
    /// Latest measured fps, capped at the target (starts at the target)
    pub fps: f32,
    pub fps_min: Option<f32>,
    pub fps_max: Option<f32>,
    /// Last frame's duration in target frames (1.0 = on time)
    pub time_factor: f32,
    frames_this_second: u32,
    millis_this_second: f64,
}

impl FrameClock {
    pub fn new(framerate: f32) -> Self {
        Self {
            framerate,
            fps: framerate,
            fps_min: None,
            fps_max: None,
            time_factor: 1.0,
            frames_this_second: 0,
            millis_this_second: 0.0,
        }
    }

    pub fn framerate(&self) -> f32 {
        self.framerate
    }

    /// Account for one frame that took `elapsed_ms`
    pub fn advance(&mut self, elapsed_ms: f64) {
        let elapsed_ms = elapsed_ms.max(0.0);

        self.frames_this_second += 1;
        self.millis_this_second += elapsed_ms;

        if self.millis_this_second > 1000.0 {
            let measured =
                (self.frames_this_second as f64 * 1000.0 / self.millis_this_second).round() as f32;
            self.fps = measured.min(self.framerate);
            self.fps_min = Some(self.fps_min.map_or(self.fps, |m| m.min(self.fps)));
            self.fps_max = Some(self.fps_max.map_or(self.fps, |m| m.max(self.fps)));

            self.frames_this_second = 0;
            self.millis_this_second = 0.0;
        }

        self.time_factor = (elapsed_ms / (1000.0 / self.framerate as f64)) as f32;
    }

    /// Measured fps over target fps, the score scaling factor
    pub fn fps_ratio(&self) -> f64 {
        (self.fps / self.framerate) as f64
    }

    /// Rounded mean of min, max and current fps, once a full second was measured
    pub fn average_fps(&self) -> Option<f32> {
        match (self.fps_min, self.fps_max) {
            (Some(min), Some(max)) => Some(((min + max + self.fps) / 3.0).round()),
            _ => None,
        }
    }
}
