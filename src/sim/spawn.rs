//! Enemy spawn policy
//!
//! The population target grows with difficulty. Spawns are rolled one
//! opportunity at a time so arrivals trickle in instead of appearing in
//! bursts.

use glam::Vec2;
use rand::Rng;

use super::entities::{Enemy, EnemyKind};
use super::state::{GameEvent, GameState};
use crate::tuning::Tuning;

/// Live enemies the field should hold at `difficulty`
pub fn population_target(tuning: &Tuning, difficulty: f32) -> usize {
    (tuning.base_enemy_count + difficulty).floor().max(0.0) as usize
}

/// Which variants may spawn right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnRules {
    pub bombs: bool,
    pub movers: bool,
}

impl SpawnRules {
    /// Bombs need an existing population with few bombs in it; movers also
    /// wait for the warm-up frames to pass
    pub fn for_population(enemies: &[Enemy], frame_count: u64, tuning: &Tuning) -> Self {
        let total = enemies.len() as f32;
        let bombs = enemies.iter().filter(|e| e.kind.is_bomb()).count() as f32;
        let movers = enemies.iter().filter(|e| e.kind.is_mover()).count() as f32;

        let bombs_allowed = total > 0.0 && bombs / total < tuning.bomb_fraction_limit;
        let movers_allowed = frame_count > tuning.mover_start_frame
            && (total == 0.0 || movers / total < tuning.mover_fraction_limit);

        Self {
            bombs: bombs_allowed,
            movers: movers_allowed,
        }
    }

    pub fn choose_kind(&self, rng: &mut impl Rng) -> EnemyKind {
        let mut kind = EnemyKind::Normal;
        if self.bombs && rng.random_bool(0.5) {
            kind = EnemyKind::Bomb;
        }
        if self.movers && rng.random_bool(0.5) {
            kind = kind.as_mover();
        }
        kind
    }
}

/// Roll spawns for the population deficit; returns how many spawned
///
/// Each opportunity succeeds when a uniform roll beats the spawn threshold;
/// the first miss ends this frame's spawning.
pub fn spawn_enemies(state: &mut GameState) -> usize {
    let target = population_target(&state.tuning, state.difficulty);
    let deficit = target.saturating_sub(state.enemies.len());
    if deficit == 0 {
        return 0;
    }

    let rules = SpawnRules::for_population(&state.enemies, state.frame_count, &state.tuning);
    let padding = state.tuning.spawn_padding;
    let area = state.world_size() - Vec2::splat(padding * 2.0);

    let mut spawned = 0;
    for _ in 0..deficit {
        if state.rng.random::<f32>() <= state.tuning.spawn_threshold {
            break;
        }

        let kind = rules.choose_kind(&mut state.rng);
        let pos = Vec2::new(
            padding + (state.rng.random::<f32>() * area.x).round(),
            padding + (state.rng.random::<f32>() * area.y).round(),
        );

        let id = state.next_entity_id();
        let mut enemy = Enemy::new(id, kind, pos);
        if kind.is_mover() {
            let angle = state.rng.random::<f32>() * std::f32::consts::TAU;
            enemy.velocity = Vec2::from_angle(angle) * state.tuning.mover_speed;
        }

        log::debug!("Spawned {:?} #{} at ({:.0}, {:.0})", kind, id, pos.x, pos.y);
        state.enemies.push(enemy);
        state.events.push(GameEvent::EnemySpawned { id, kind });
        spawned += 1;
    }
    spawned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::GamePhase;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_population_target() {
        let tuning = Tuning::default();
        assert_eq!(population_target(&tuning, 1.0), 3);
        assert_eq!(population_target(&tuning, 1.999), 3);
        assert_eq!(population_target(&tuning, 4.5), 6);
    }

    #[test]
    fn test_first_enemy_is_never_a_bomb() {
        let rules = SpawnRules::for_population(&[], 0, &Tuning::default());
        assert!(!rules.bombs);
        assert!(!rules.movers);

        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            assert_eq!(rules.choose_kind(&mut rng), EnemyKind::Normal);
        }
    }

    #[test]
    fn test_bomb_fraction_limit() {
        let tuning = Tuning::default();
        let pos = Vec2::new(100.0, 100.0);
        let mostly_bombs = vec![
            Enemy::new(1, EnemyKind::Bomb, pos),
            Enemy::new(2, EnemyKind::BombMover, pos),
            Enemy::new(3, EnemyKind::Normal, pos),
        ];
        assert!(!SpawnRules::for_population(&mostly_bombs, 0, &tuning).bombs);

        let few_bombs = vec![
            Enemy::new(1, EnemyKind::Bomb, pos),
            Enemy::new(2, EnemyKind::Normal, pos),
            Enemy::new(3, EnemyKind::Normal, pos),
        ];
        assert!(SpawnRules::for_population(&few_bombs, 0, &tuning).bombs);
    }

    #[test]
    fn test_movers_wait_for_warm_up() {
        let tuning = Tuning::default();
        let early = SpawnRules::for_population(&[], tuning.mover_start_frame, &tuning);
        assert!(!early.movers);
        let late = SpawnRules::for_population(&[], tuning.mover_start_frame + 1, &tuning);
        assert!(late.movers);
    }

    #[test]
    fn test_spawns_inside_padding_and_under_target() {
        let mut state = GameState::new(2024);
        state.phase = GamePhase::Playing;
        state.frame_count = 1_000;
        let padding = state.tuning.spawn_padding;
        let world = state.world_size();

        for _ in 0..2_000 {
            spawn_enemies(&mut state);
            let target = population_target(&state.tuning, state.difficulty);
            assert!(state.enemies.len() <= target);
            state.difficulty += 0.01;
        }

        assert!(!state.enemies.is_empty());
        for enemy in &state.enemies {
            assert!(enemy.pos.x >= padding && enemy.pos.x <= world.x - padding);
            assert!(enemy.pos.y >= padding && enemy.pos.y <= world.y - padding);
            if enemy.kind.is_mover() {
                assert!((enemy.velocity.length() - state.tuning.mover_speed).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_no_spawn_without_deficit() {
        let mut state = GameState::new(5);
        for id in 0..3 {
            state.enemies.push(Enemy::new(id, EnemyKind::Normal, Vec2::new(100.0, 100.0)));
        }
        assert_eq!(spawn_enemies(&mut state), 0);
        assert_eq!(state.enemies.len(), 3);
    }
}
