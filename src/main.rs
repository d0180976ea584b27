//! Coil headless driver
//!
//! Runs the simulation with a scripted pointer that keeps circling the middle
//! of the field, then prints the final snapshot as JSON.
//!
//! Usage: `coil [tuning.json] [frames]`

use coil::Tuning;
use coil::consts::MOUSE_CONTACT_ID;
use coil::sim::{GameEvent, GamePhase, GameState, start_game, tick};
use glam::Vec2;

const DEFAULT_FRAMES: u64 = 900;
const DEMO_SEED: u64 = 0xC011;

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(&path).unwrap_or_else(|e| {
            log::warn!("Ignoring tuning file {path}: {e}");
            Tuning::default()
        }),
        None => Tuning::default(),
    };
    let frames = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    log::info!("Coil (headless) starting: {frames} frames");

    let frame_ms = tuning.frame_millis();
    let mut state = GameState::with_tuning(DEMO_SEED, tuning);
    start_game(&mut state);

    let center = state.world_center();
    let radius = state.world_size().min_element() * 0.3;
    state.pointer_start(MOUSE_CONTACT_ID, center.x + radius, center.y);

    let mut enclosed = 0;
    for frame in 0..frames {
        // One lap every 40 frames, slightly wobbling so loops land in new places
        let angle = frame as f32 * std::f32::consts::TAU / 40.0;
        let wobble = 1.0 + 0.15 * (frame as f32 * 0.05).sin();
        let p = center + Vec2::from_angle(angle) * radius * wobble;
        state.pointer_move(MOUSE_CONTACT_ID, p.x, p.y);

        let summary = tick(&mut state, frame_ms);
        for event in state.drain_events() {
            match event {
                GameEvent::EnemyEnclosed { .. } => enclosed += 1,
                GameEvent::MultiplierUp { major } => log::info!("Multiplier x{major}"),
                GameEvent::LagWarning => log::warn!("Lag warning raised"),
                GameEvent::GameOver { score } => log::info!("Final score {score}"),
                _ => {}
            }
        }
        if summary.phase != GamePhase::Playing {
            break;
        }
    }

    log::info!(
        "Done after {} frames: {} enclosed, score {:.0}, energy {:.0}",
        state.frame_count,
        enclosed,
        state.score,
        state.energy
    );

    match serde_json::to_string_pretty(&state.snapshot()) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize snapshot: {e}"),
    }
}
