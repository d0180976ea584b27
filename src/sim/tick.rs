//! Per-frame simulation tick
//!
//! Advances every subsystem once, in a fixed order, and scales time-dependent
//! work by the frame's time factor so progress does not depend on the host's
//! framerate.

use serde::{Deserialize, Serialize};

use super::closure::{find_intersections, solve_intersections};
use super::spawn::spawn_enemies;
use super::state::{GameEvent, GamePhase, GameState};

/// Minimum average fps before the lag warning fires
const LAG_FPS_THRESHOLD: f32 = 30.0;
/// Seconds of play before lag is judged
const LAG_GRACE_SECONDS: f32 = 6.0;

/// What a tick leaves behind for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickSummary {
    pub phase: GamePhase,
    pub energy: f32,
    pub score: f64,
    pub duration_ms: f64,
    pub multiplier_major: u32,
    pub multiplier_minor: f64,
    pub enemies: usize,
}

impl TickSummary {
    fn of(state: &GameState) -> Self {
        Self {
            phase: state.phase,
            energy: state.energy,
            score: state.score,
            duration_ms: state.duration_ms,
            multiplier_major: state.multiplier.major,
            multiplier_minor: state.multiplier.minor,
            enemies: state.enemies.len(),
        }
    }
}

/// Reset and begin a new run
pub fn start_game(state: &mut GameState) {
    state.reset();
    state.phase = GamePhase::Playing;
    state.events.push(GameEvent::GameStarted);
    log::info!("Game started (seed {})", state.seed);
}

/// Return to the welcome phase with every run value at its initial state
pub fn reset_game(state: &mut GameState) {
    state.reset();
}

/// Advance the game by one frame that took `elapsed_ms` of wall-clock time
pub fn tick(state: &mut GameState, elapsed_ms: f64) -> TickSummary {
    if state.phase != GamePhase::Playing {
        return TickSummary::of(state);
    }
    let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };

    update_meta(state, elapsed_ms);
    update_contacts(state);
    update_particles(state);

    find_intersections(state);
    let interval = state.tuning.enclosure_interval.max(1);
    let test_enclosures = state.frame_count % interval == interval - 1;
    solve_intersections(state, test_enclosures);

    if state.is_playing() {
        update_enemies(state);
    }
    update_notifications(state);

    TickSummary::of(state)
}

/// Timing, difficulty, the per-frame score trickle and lag detection
fn update_meta(state: &mut GameState, elapsed_ms: f64) {
    state.clock.advance(elapsed_ms);

    let time_factor = state.clock.time_factor;
    state.difficulty += state.tuning.difficulty_rate * time_factor.max(1.0);
    state.adjust_score(state.tuning.score_per_tick);

    state.frame_count += 1;
    state.duration_ms += elapsed_ms;

    let grace_frames = (state.tuning.framerate * LAG_GRACE_SECONDS) as u64;
    if !state.lag_warned && state.frame_count > grace_frames {
        if let Some(average) = state.clock.average_fps() {
            if average < LAG_FPS_THRESHOLD.min(state.tuning.framerate) {
                state.lag_warned = true;
                state.events.push(GameEvent::LagWarning);
                log::warn!("Running slow: average {average} fps");
            }
        }
    }
}

/// Ease contacts toward their input and extend their trails
fn update_contacts(state: &mut GameState) {
    let smoothing = state.tuning.contact_smoothing;
    for contact in &mut state.contacts {
        contact.interpolate(smoothing);
        contact.advance_trail();
    }
}

fn update_particles(state: &mut GameState) {
    let GameState { particles, rng, .. } = state;
    for particle in particles.iter_mut() {
        particle.update(&mut *rng);
    }
    particles.retain(|p| !p.is_dead());
}

/// Spawn, animate and age enemies
fn update_enemies(state: &mut GameState) {
    spawn_enemies(state);

    let time_factor = state.clock.time_factor;
    let aging_rate = state.tuning.enemy_aging_rate;
    let radius = state.tuning.enemy_radius;
    let world = state.world_size();

    let mut expired = Vec::new();
    for enemy in &mut state.enemies {
        enemy.animate(time_factor, aging_rate);
        if enemy.kind.is_mover() {
            enemy.drift(time_factor, world, radius);
        }

        if enemy.is_expired() {
            if enemy.kind.is_bomb() {
                enemy.begin_fade_out();
            } else {
                enemy.alive = false;
                expired.push(enemy.clone());
            }
        }
    }

    // Expired enemies leave at once; retired bombs stay until faded out
    state
        .enemies
        .retain(|e| e.alive || (e.kind.is_bomb() && !e.is_faded_out()));

    for enemy in &expired {
        if !state.is_playing() {
            break;
        }
        state.handle_enemy_death(enemy);
    }
}

fn update_notifications(state: &mut GameState) {
    for notification in &mut state.notifications {
        notification.update();
    }
    state.notifications.retain(|n| !n.is_dead());
}
