//! Energy, score and the combo multiplier
//!
//! Outcome handlers react to enemies dying of age, being enclosed, or bombs
//! being enclosed. Energy and score only move while the game is playing, and
//! energy hitting zero ends the run on the spot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::{Enemy, Rgb};
use super::geometry::Point;
use super::state::{GameEvent, GamePhase, GameState};
use crate::consts::MAX_ENERGY;

/// Tolerance for `minor` reaching a whole level after repeated float steps
const LEVEL_EPSILON: f64 = 1e-9;

/// Combo multiplier: a whole `major` level plus fractional progress `minor`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Multiplier {
    pub major: u32,
    pub minor: f64,
    step: f64,
    limit: u32,
}

impl Multiplier {
    pub fn new(step: f64, limit: u32) -> Self {
        Self {
            major: 1,
            minor: 0.0,
            step,
            limit: limit.max(1),
        }
    }

    pub fn reset(&mut self) {
        self.major = 1;
        self.minor = 0.0;
    }

    /// Add one step of progress; returns true when `major` went up
    pub fn increase(&mut self) -> bool {
        let before = self.major;
        self.minor += self.step;

        while self.minor >= 1.0 - LEVEL_EPSILON {
            if self.major < self.limit {
                self.major += 1;
            }
            self.minor = (1.0 - self.minor).max(0.0);
        }

        self.major > before
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }
}

impl GameState {
    /// Shift energy, clamped to `[0, MAX_ENERGY]`; reaching zero ends the run
    pub fn adjust_energy(&mut self, delta: f32) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.energy = (self.energy + delta).clamp(0.0, MAX_ENERGY);
        if self.energy <= 0.0 {
            self.stop();
        }
    }

    /// Add `offset` times the multiplier to the score, scaled by the measured
    /// framerate so slow machines earn no advantage
    ///
    /// Returns the multiplied offset before framerate scaling (the figure shown
    /// to the player), or zero when not playing.
    pub fn adjust_score(&mut self, offset: f64) -> f64 {
        if self.phase != GamePhase::Playing {
            return 0.0;
        }
        let multiplied = offset * self.multiplier.major as f64;
        self.score += multiplied * self.clock.fps_ratio();
        multiplied
    }

    /// An enemy reached the end of its life span
    ///
    /// Energy is charged last so a fatal death still reports itself before
    /// `GameOver`.
    pub fn handle_enemy_death(&mut self, enemy: &Enemy) {
        let delta = self.tuning.energy_per_enemy_death;
        self.multiplier.reset();

        self.emit_particles(Rgb::DEBRIS, enemy.pos, 3.0, 15);
        self.notify(energy_label(delta), enemy.pos, 1.2, Rgb::DAMAGE);
        self.emit_effect(enemy.pos);
        self.events.push(GameEvent::EnemyExpired { id: enemy.id });

        self.adjust_energy(delta);
    }

    /// A non-bomb enemy was enclosed
    pub fn handle_enemy_in_closure(&mut self, enemy: &Enemy) {
        self.adjust_energy(self.tuning.energy_per_enemy_enclosed);

        if self.multiplier.increase() {
            let major = self.multiplier.major;
            let center = self.world_center();
            self.notify(format!("X{major}"), center, major as f32, Rgb::MULTIPLIER);
            self.emit_effect(center);
            self.events.push(GameEvent::MultiplierUp { major });
            log::debug!("Multiplier up: x{major}");
        }

        self.emit_particles(Rgb::DEBRIS, enemy.pos, 3.0, 6);

        let change = self.adjust_score(self.tuning.score_per_enemy);
        self.notify(format!("{}", change.floor()), enemy.pos, 1.0, Rgb::WHITE);
        self.emit_effect(enemy.pos);
        self.events.push(GameEvent::EnemyEnclosed {
            id: enemy.id,
            kind: enemy.kind,
        });
    }

    /// A bomb was enclosed
    pub fn handle_bomb_in_closure(&mut self, enemy: &Enemy) {
        let delta = self.tuning.energy_per_bomb_enclosed;
        self.multiplier.reset();

        self.notify(energy_label(delta), enemy.pos, 1.2, Rgb::DAMAGE);
        self.emit_effect(enemy.pos);
        self.events.push(GameEvent::EnemyEnclosed {
            id: enemy.id,
            kind: enemy.kind,
        });

        self.adjust_energy(delta);
    }

    /// Bonus for enclosing several enemies with one loop
    pub fn award_multi_enclosure(&mut self, casualties: usize, anchor: Point) {
        let change = self.adjust_score(casualties as f64 * self.tuning.score_per_enemy);
        self.notify(
            format!("{}", change.floor()),
            anchor - Vec2::new(0.0, 10.0),
            casualties as f32 / 1.5,
            Rgb::BONUS,
        );
        log::debug!("Multi-enclosure: {casualties} enemies, +{change}");
    }
}

/// "-30♥" style label for an energy change
fn energy_label(delta: f32) -> String {
    format!("{}♥", delta.round() as i32)
}
