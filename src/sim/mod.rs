//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only
//! - Wall-clock time enters only through `tick`'s elapsed argument
//! - Stable iteration order (insertion order of every collection)
//! - No rendering or platform dependencies

pub mod clock;
pub mod closure;
pub mod entities;
pub mod geometry;
pub mod scoring;
pub mod spawn;
pub mod state;
pub mod tick;

pub use clock::FrameClock;
pub use closure::{Candidate, Closure, find_candidates, resolve_enclosures};
pub use entities::{Contact, Enemy, EnemyKind, Notification, Particle, Rgb};
pub use geometry::{Point, Rect, Region, interpolate, point_in_polygon, segment_intersect};
pub use scoring::Multiplier;
pub use spawn::{SpawnRules, population_target, spawn_enemies};
pub use state::{GameEvent, GamePhase, GameState, Snapshot};
pub use tick::{TickSummary, reset_game, start_game, tick};
