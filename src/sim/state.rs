//! Game state and outbound events
//!
//! `GameState` owns every collection the simulation touches. The host feeds it
//! pointer events, calls `tick` once per frame, and reads back entities,
//! events and snapshots for drawing.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::clock::FrameClock;
use super::entities::{Contact, Enemy, EnemyKind, Notification, Particle, Rgb};
use super::geometry::Point;
use super::scoring::Multiplier;
use crate::consts::MAX_ENERGY;
use crate::tuning::Tuning;

/// Current phase of gameplay
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Before the first game, or after an explicit reset
    #[default]
    Welcome,
    /// Active gameplay
    Playing,
    /// Energy ran out (or the host stopped the run)
    GameOver,
}

/// Signals raised for the renderer / effects layer, drained by the host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Shockwave effect at a position
    Effect { pos: Point },
    /// A trail closed a loop; fill it with a radial gradient
    ClosureFilled { center: Point, radius: f32 },
    EnemySpawned { id: u32, kind: EnemyKind },
    /// A non-bomb enemy died of age
    EnemyExpired { id: u32 },
    /// An enemy (bomb or not) was caught inside a loop
    EnemyEnclosed { id: u32, kind: EnemyKind },
    MultiplierUp { major: u32 },
    /// The measured framerate stayed low; effects should be toned down
    LagWarning,
    GameStarted,
    GameOver { score: u64 },
}

/// Complete game state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// 0 to `MAX_ENERGY`; the run ends at zero
    pub energy: f32,
    pub score: f64,
    /// Milliseconds of play in the current run
    pub duration_ms: f64,
    /// Grows every frame; raises the enemy population target
    pub difficulty: f32,
    /// Frames simulated in the current run
    pub frame_count: u64,
    pub multiplier: Multiplier,
    pub clock: FrameClock,
    /// Active contacts, looked up by device id
    pub contacts: Vec<Contact>,
    pub enemies: Vec<Enemy>,
    /// Visual debris (not gameplay-affecting)
    pub particles: Vec<Particle>,
    pub notifications: Vec<Notification>,
    /// Signals raised since the last drain
    pub events: Vec<GameEvent>,
    pub(crate) lag_warned: bool,
    pub(crate) rng: Pcg32,
    next_id: u32,
}

impl GameState {
    /// Create a new game state with the given seed and default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self {
            seed,
            phase: GamePhase::Welcome,
            energy: MAX_ENERGY,
            score: 0.0,
            duration_ms: 0.0,
            difficulty: 1.0,
            frame_count: 0,
            multiplier: Multiplier::new(tuning.multiplier_step, tuning.multiplier_limit),
            clock: FrameClock::new(tuning.framerate),
            contacts: Vec::new(),
            enemies: Vec::new(),
            particles: Vec::new(),
            notifications: Vec::new(),
            events: Vec::new(),
            lag_warned: false,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
            tuning,
        }
    }

    /// Return every run-scoped value to its initial state
    ///
    /// Seed, tuning and RNG stream carry over so consecutive runs stay
    /// reproducible from the seed.
    pub fn reset(&mut self) {
        self.phase = GamePhase::Welcome;
        self.energy = MAX_ENERGY;
        self.score = 0.0;
        self.duration_ms = 0.0;
        self.difficulty = 1.0;
        self.frame_count = 0;
        self.multiplier.reset();
        self.clock = FrameClock::new(self.tuning.framerate);
        self.contacts.clear();
        self.enemies.clear();
        self.particles.clear();
        self.notifications.clear();
        self.events.clear();
        self.lag_warned = false;
        self.next_id = 1;
    }

    /// End the current run
    pub fn stop(&mut self) {
        if self.phase != GamePhase::Playing {
            return;
        }
        self.phase = GamePhase::GameOver;
        let score = self.score.floor() as u64;
        self.events.push(GameEvent::GameOver { score });
        log::info!(
            "Game over: score {} after {:.1}s",
            score,
            self.duration_ms / 1000.0
        );
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.tuning.world_width, self.tuning.world_height)
    }

    pub fn world_center(&self) -> Point {
        self.world_size() * 0.5
    }

    pub fn contact(&self, id: i64) -> Option<&Contact> {
        self.contacts.iter().find(|c| c.id == id)
    }

    // === Pointer input ===

    /// Start tracking a pointer; an id that is already tracked is left alone
    pub fn pointer_start(&mut self, id: i64, x: f32, y: f32) {
        if self.contact(id).is_some() {
            return;
        }
        let contact = Contact::new(id, Vec2::new(x, y), self.tuning.trail_length);
        self.contacts.push(contact);
    }

    /// Record a pointer move; unknown ids are ignored
    pub fn pointer_move(&mut self, id: i64, x: f32, y: f32) {
        let world = self.world_size();
        if let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) {
            contact.move_to(Vec2::new(x, y), world);
        }
    }

    /// Stop tracking a pointer; unknown ids are ignored
    pub fn pointer_end(&mut self, id: i64) {
        self.contacts.retain(|c| c.id != id);
    }

    // === Outbound signals ===

    pub fn emit_effect(&mut self, pos: Point) {
        self.events.push(GameEvent::Effect { pos });
    }

    pub fn notify(&mut self, text: impl Into<String>, pos: Point, scale: f32, color: Rgb) {
        self.notifications.push(Notification::new(text, pos, scale, color));
    }

    pub fn emit_particles(&mut self, color: Rgb, pos: Point, speed: f32, quantity: usize) {
        for _ in 0..quantity {
            let particle = Particle::new(pos, speed, color, &mut self.rng);
            self.particles.push(particle);
        }
    }

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Serializable view of everything the renderer draws
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            phase: self.phase,
            energy: self.energy,
            score: self.score.floor() as u64,
            duration_secs: (self.duration_ms / 1000.0).round() as u64,
            difficulty: self.difficulty,
            multiplier_major: self.multiplier.major,
            multiplier_minor: self.multiplier.minor,
            fps: self.clock.fps,
            trails: self
                .contacts
                .iter()
                .map(|c| c.trail.iter().copied().collect())
                .collect(),
            enemies: self.enemies.clone(),
            particles: self.particles.clone(),
            notifications: self.notifications.clone(),
        }
    }
}

/// Read-only view of a frame for the renderer / HUD
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub phase: GamePhase,
    pub energy: f32,
    pub score: u64,
    pub duration_secs: u64,
    pub difficulty: f32,
    pub multiplier_major: u32,
    pub multiplier_minor: f64,
    pub fps: f32,
    /// One polyline per contact, oldest point first
    pub trails: Vec<Vec<Point>>,
    pub enemies: Vec<Enemy>,
    pub particles: Vec<Particle>,
    pub notifications: Vec<Notification>,
}
