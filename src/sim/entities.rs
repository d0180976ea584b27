//! Entities owned by the game state
//!
//! Each entity embeds its own position and carries only the per-tick update
//! rules that touch nothing but itself. Cross-entity work (spawning, scoring,
//! enclosure) happens in the orchestrating modules.

use std::collections::VecDeque;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::closure::Candidate;
use super::geometry::{Point, interpolate};
use crate::approach;
use crate::consts::*;

/// 8-bit RGB color hint for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

impl Rgb {
    pub const WHITE: Rgb = Rgb(255, 255, 255);
    /// Debris from enemies
    pub const DEBRIS: Rgb = Rgb(238, 238, 238);
    /// Energy loss
    pub const DAMAGE: Rgb = Rgb(230, 90, 90);
    /// Multiplier level-up
    pub const MULTIPLIER: Rgb = Rgb(60, 250, 130);
    /// Multi-enclosure bonus
    pub const BONUS: Rgb = Rgb(250, 250, 100);
}

/// A tracked pointer drawing a trail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contact {
    /// Device id (`MOUSE_CONTACT_ID` for the mouse)
    pub id: i64,
    /// Latest raw input position
    pub target: Point,
    /// Smoothed position the trail follows
    pub pos: Point,
    /// Raw input position before the latest move
    pub previous: Point,
    /// Per-axis speed of the latest move, relative to the world size
    pub velocity: Vec2,
    /// Trail capacity
    pub length: usize,
    /// Recent smoothed positions, oldest first
    pub trail: VecDeque<Point>,
    /// Self-intersections found this frame
    #[serde(skip)]
    pub intersections: Vec<Candidate>,
}

impl Contact {
    pub fn new(id: i64, pos: Point, length: usize) -> Self {
        Self {
            id,
            target: pos,
            pos,
            previous: pos,
            velocity: Vec2::ZERO,
            length,
            trail: VecDeque::with_capacity(length),
            intersections: Vec::new(),
        }
    }

    /// Record a raw input position
    pub fn move_to(&mut self, target: Point, world: Vec2) {
        self.previous = self.target;
        self.target = target;
        self.velocity = (self.target - self.previous).abs() / world;
    }

    /// Ease the smoothed position toward the raw input
    pub fn interpolate(&mut self, factor: f32) {
        self.pos = interpolate(self.pos, self.target, factor);
    }

    /// Top the trail up to capacity with the current position, then drop the
    /// oldest point
    pub fn advance_trail(&mut self) {
        while self.trail.len() < self.length {
            self.trail.push_back(self.pos);
        }
        self.trail.pop_front();
    }
}

/// Enemy variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EnemyKind {
    #[default]
    Normal,
    Bomb,
    NormalMover,
    BombMover,
}

impl EnemyKind {
    pub fn is_bomb(self) -> bool {
        matches!(self, EnemyKind::Bomb | EnemyKind::BombMover)
    }

    pub fn is_mover(self) -> bool {
        matches!(self, EnemyKind::NormalMover | EnemyKind::BombMover)
    }

    /// The drifting variant of this kind
    pub fn as_mover(self) -> Self {
        match self {
            EnemyKind::Normal | EnemyKind::NormalMover => EnemyKind::NormalMover,
            EnemyKind::Bomb | EnemyKind::BombMover => EnemyKind::BombMover,
        }
    }
}

/// A scoring target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub kind: EnemyKind,
    pub pos: Point,
    /// Pixels per frame (movers only)
    pub velocity: Vec2,
    pub scale: f32,
    pub scale_target: f32,
    pub alpha: f32,
    pub alpha_target: f32,
    /// Age, 0 to `ENEMY_MAX_TIME`
    pub time: f32,
    pub alive: bool,
}

impl Enemy {
    pub fn new(id: u32, kind: EnemyKind, pos: Point) -> Self {
        Self {
            id,
            kind,
            pos,
            velocity: Vec2::ZERO,
            scale: 0.01,
            scale_target: 1.0,
            alpha: 0.0,
            alpha_target: 1.0,
            time: 0.0,
            alive: true,
        }
    }

    /// Age the enemy and ease scale/alpha toward their targets
    pub fn animate(&mut self, time_factor: f32, aging_rate: f32) {
        self.time = (self.time + aging_rate * time_factor).min(ENEMY_MAX_TIME);
        self.scale += ((self.scale_target - self.scale) + 0.01) * 0.3;
        self.alpha = approach(self.alpha, self.alpha_target, 0.1);
    }

    /// Drift and bounce off the world edges
    pub fn drift(&mut self, time_factor: f32, world: Vec2, radius: f32) {
        self.pos += self.velocity * time_factor;

        if (self.pos.x < 0.0 && self.velocity.x < 0.0)
            || (self.pos.x > world.x - radius && self.velocity.x > 0.0)
        {
            self.velocity.x = -self.velocity.x;
        }
        if (self.pos.y < 0.0 && self.velocity.y < 0.0)
            || (self.pos.y > world.y - radius && self.velocity.y > 0.0)
        {
            self.velocity.y = -self.velocity.y;
        }
    }

    /// Alive enemy that reached the end of its life span
    pub fn is_expired(&self) -> bool {
        self.alive && self.time >= ENEMY_MAX_TIME
    }

    /// Retire a bomb: shrink and fade instead of vanishing
    pub fn begin_fade_out(&mut self) {
        self.alive = false;
        self.alpha_target = 0.0;
        self.scale_target = 0.01;
    }

    pub fn is_faded_out(&self) -> bool {
        !self.alive && self.alpha_target == 0.0 && self.alpha < FADE_CUTOFF
    }

    /// Late in life; the renderer flashes these
    pub fn is_dying(&self) -> bool {
        self.time > 65.0
    }
}

/// Visual debris
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Particle {
    pub pos: Point,
    pub velocity: Vec2,
    pub color: Rgb,
    pub alpha: f32,
    /// Once set, alpha decays every tick
    pub fading: bool,
}

impl Particle {
    /// Random velocity in `[-speed, speed]` on each axis
    pub fn new(pos: Point, speed: f32, color: Rgb, rng: &mut impl Rng) -> Self {
        let velocity = Vec2::new(
            -speed + rng.random::<f32>() * speed * 2.0,
            -speed + rng.random::<f32>() * speed * 2.0,
        );
        Self {
            pos,
            velocity,
            color,
            alpha: 1.0,
            fading: false,
        }
    }

    pub fn update(&mut self, rng: &mut impl Rng) {
        self.pos += self.velocity;
        self.velocity *= 0.98;

        if self.fading {
            self.alpha *= 0.92;
        } else if rng.random::<f32>() > 0.92 {
            self.fading = true;
        }
    }

    pub fn is_dead(&self) -> bool {
        self.alpha < FADE_CUTOFF
    }
}

/// Floating score / energy / multiplier text
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub pos: Point,
    pub scale: f32,
    pub color: Rgb,
    pub alpha: f32,
}

impl Notification {
    pub fn new(text: impl Into<String>, pos: Point, scale: f32, color: Rgb) -> Self {
        Self {
            text: text.into(),
            pos,
            scale,
            color,
            alpha: 1.0,
        }
    }

    /// Float upward; fade slowly at first, then faster
    pub fn update(&mut self) {
        self.pos.y -= 0.4;
        self.alpha *= 1.0 - 0.08 * (1.0 - (self.alpha - 0.08));
    }

    pub fn is_dead(&self) -> bool {
        self.alpha < FADE_CUTOFF
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_contact_trail_is_bounded() {
        let mut contact = Contact::new(MOUSE_CONTACT_ID, Vec2::new(10.0, 10.0), 5);
        contact.advance_trail();
        // Refilled to capacity, then the oldest point dropped
        assert_eq!(contact.trail.len(), 4);

        for i in 0..20 {
            contact.pos = Vec2::new(i as f32, 0.0);
            contact.advance_trail();
            assert!(contact.trail.len() < contact.length);
        }
        // Newest point is last
        assert_eq!(contact.trail.back(), Some(&Vec2::new(19.0, 0.0)));
        assert_eq!(contact.trail.front(), Some(&Vec2::new(16.0, 0.0)));
    }

    #[test]
    fn test_contact_move_and_interpolate() {
        let world = Vec2::new(900.0, 500.0);
        let mut contact = Contact::new(3, Vec2::new(100.0, 100.0), 45);
        contact.move_to(Vec2::new(190.0, 50.0), world);
        assert_eq!(contact.previous, Vec2::new(100.0, 100.0));
        assert!((contact.velocity - Vec2::new(0.1, 0.1)).length() < 1e-6);

        // Smoothed position lags behind the raw input
        contact.interpolate(0.4);
        assert!((contact.pos - Vec2::new(136.0, 80.0)).length() < 1e-4);
        contact.interpolate(0.4);
        assert!(contact.pos.distance(contact.target) < Vec2::new(54.0, 30.0).length());
    }

    #[test]
    fn test_enemy_kind_helpers() {
        assert!(EnemyKind::Bomb.is_bomb());
        assert!(EnemyKind::BombMover.is_bomb());
        assert!(!EnemyKind::NormalMover.is_bomb());
        assert!(EnemyKind::NormalMover.is_mover());
        assert!(!EnemyKind::Normal.is_mover());
        assert_eq!(EnemyKind::Normal.as_mover(), EnemyKind::NormalMover);
        assert_eq!(EnemyKind::Bomb.as_mover(), EnemyKind::BombMover);
    }

    #[test]
    fn test_enemy_ages_and_fades_in() {
        let mut enemy = Enemy::new(1, EnemyKind::Normal, Vec2::new(200.0, 200.0));
        for _ in 0..60 {
            enemy.animate(1.0, 0.2);
        }
        assert!((enemy.time - 12.0).abs() < 1e-3);
        assert!(enemy.alpha > 0.99);
        assert!(enemy.scale > 1.0);

        for _ in 0..1000 {
            enemy.animate(1.0, 0.2);
        }
        assert_eq!(enemy.time, ENEMY_MAX_TIME);
        assert!(enemy.is_expired());
    }

    #[test]
    fn test_bomb_fade_out() {
        let mut bomb = Enemy::new(2, EnemyKind::Bomb, Vec2::new(200.0, 200.0));
        bomb.alpha = 1.0;
        bomb.begin_fade_out();
        assert!(!bomb.is_expired());
        assert!(!bomb.is_faded_out());
        for _ in 0..60 {
            bomb.animate(1.0, 0.2);
        }
        assert!(bomb.is_faded_out());
    }

    #[test]
    fn test_mover_bounces() {
        let world = Vec2::new(100.0, 100.0);
        let mut enemy = Enemy::new(3, EnemyKind::NormalMover, Vec2::new(88.0, 50.0));
        enemy.velocity = Vec2::new(3.0, 0.0);
        enemy.drift(1.0, world, 10.0);
        assert_eq!(enemy.velocity.x, -3.0);
        enemy.drift(1.0, world, 10.0);
        assert_eq!(enemy.pos.x, 88.0);
    }

    #[test]
    fn test_particle_decays_and_dies() {
        let mut rng = Pcg32::seed_from_u64(7);
        let mut particle = Particle::new(Vec2::ZERO, 3.0, Rgb::DEBRIS, &mut rng);
        assert!(particle.velocity.x.abs() <= 3.0 && particle.velocity.y.abs() <= 3.0);

        let mut ticks = 0;
        while !particle.is_dead() {
            let was_fading = particle.fading;
            particle.update(&mut rng);
            assert!(!was_fading || particle.fading);
            ticks += 1;
            assert!(ticks < 10_000);
        }
    }

    #[test]
    fn test_notification_drifts_and_fades() {
        let mut n = Notification::new("30", Vec2::new(10.0, 100.0), 1.0, Rgb::WHITE);
        n.update();
        assert!((n.pos.y - 99.6).abs() < 1e-4);
        let first_step = 1.0 - n.alpha;

        let mut previous = n.alpha;
        let mut ticks = 0;
        while !n.is_dead() {
            n.update();
            assert!(n.alpha < previous);
            previous = n.alpha;
            ticks += 1;
        }
        // Slow start, faster finish
        assert!(first_step < 0.01);
        assert!(ticks > 10 && ticks < 500);
    }
}
