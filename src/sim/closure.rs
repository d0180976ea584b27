//! Trail self-intersection and closure resolution
//!
//! A contact's trail is a polyline. When two non-adjacent segments cross, the
//! points between them form a closed loop; enemies inside the loop are
//! enclosed and dispatched to the scoring handlers.

use std::collections::HashSet;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::entities::Enemy;
use super::geometry::{Point, Region, point_in_polygon, segment_intersect};
use super::state::{GameEvent, GameState};

/// A crossing between trail segments `first` and `last` (`first < last - 1`)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub first: usize,
    pub last: usize,
    pub point: Point,
}

/// Every self-crossing of `trail`, one per segment pair
///
/// Segment `i` runs from `trail[i]` to `trail[i + 1]`. Adjacent segments share
/// a vertex and are skipped.
pub fn find_candidates(trail: &[Point]) -> Vec<Candidate> {
    if trail.len() < 4 {
        return Vec::new();
    }

    let segments = trail.len() - 1;
    let mut candidates = Vec::new();
    for i in 0..segments {
        for j in 0..segments {
            if i.abs_diff(j) <= 1 {
                continue;
            }
            if let Some(point) = segment_intersect(trail[i], trail[i + 1], trail[j], trail[j + 1]) {
                candidates.push(Candidate {
                    first: i.min(j),
                    last: i.max(j),
                    point,
                });
            }
        }
    }

    dedup_candidates(candidates)
}

/// Keep one candidate per `(first, last)` pair
pub fn dedup_candidates(mut candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::with_capacity(candidates.len());
    let mut unique = Vec::with_capacity(candidates.len() / 2);
    while let Some(candidate) = candidates.pop() {
        if seen.insert((candidate.first, candidate.last)) {
            unique.push(candidate);
        }
    }
    unique
}

/// The four points `radius` away from `center` along the axes
pub fn probes(center: Point, radius: f32) -> [Point; 4] {
    [
        center - Vec2::new(radius, 0.0),
        center + Vec2::new(radius, 0.0),
        center - Vec2::new(0.0, radius),
        center + Vec2::new(0.0, radius),
    ]
}

/// A closed loop cut out of a trail at a crossing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Closure {
    /// Loop vertices; first and last are the crossing point
    pub points: Vec<Point>,
    pub bounds: Region,
}

impl Closure {
    /// Cut the loop for `candidate` out of `trail`
    ///
    /// Returns `None` when the candidate does not fit the trail.
    pub fn from_trail(trail: &[Point], candidate: &Candidate) -> Option<Self> {
        let end = candidate.last + 1;
        if end >= trail.len() || candidate.first + 1 >= candidate.last {
            return None;
        }

        let mut points = trail[candidate.first..=end].to_vec();
        points[0] = candidate.point;
        points[end - candidate.first] = candidate.point;

        let bounds = Region::from_points(&points);
        Some(Self { points, bounds })
    }

    pub fn center(&self) -> Point {
        self.bounds.center()
    }

    /// Radius for a radial fill
    pub fn radius(&self) -> f32 {
        self.bounds.size()
    }

    pub fn contains(&self, point: Point) -> bool {
        point_in_polygon(point, &self.points)
    }

    /// Every probe around `center` lies inside the loop
    pub fn encloses(&self, center: Point, radius: f32) -> bool {
        probes(center, radius).iter().all(|&p| self.contains(p))
    }
}

/// Record this frame's self-crossings on every contact
pub fn find_intersections(state: &mut GameState) {
    for contact in &mut state.contacts {
        contact.intersections = find_candidates(contact.trail.make_contiguous());
    }
}

/// Resolve every contact's crossings into loops; on enclosure frames, test the
/// loops against live enemies
pub fn solve_intersections(state: &mut GameState, test_enclosures: bool) {
    for c in (0..state.contacts.len()).rev() {
        let contact = &mut state.contacts[c];
        let anchor = contact.pos;
        let mut candidates = std::mem::take(&mut contact.intersections);
        let trail = contact.trail.make_contiguous();

        let mut closures = Vec::with_capacity(candidates.len());
        while let Some(candidate) = candidates.pop() {
            if let Some(closure) = Closure::from_trail(trail, &candidate) {
                closures.push(closure);
            }
        }

        for closure in &closures {
            state.events.push(GameEvent::ClosureFilled {
                center: closure.center(),
                radius: closure.radius(),
            });
        }

        if !test_enclosures {
            continue;
        }
        for closure in &closures {
            if !state.is_playing() {
                return;
            }
            resolve_enclosures(state, closure, anchor);
        }
    }
}

/// Remove the live enemies `closure` encloses and dispatch their outcomes
///
/// Bombs take the penalty path, everything else is a casualty. More than one
/// casualty in the same loop earns the aggregate bonus, announced at `anchor`.
/// Dispatch stops as soon as the run ends; enemies not yet handled stay in the
/// live set. Returns the casualty count.
pub fn resolve_enclosures(state: &mut GameState, closure: &Closure, anchor: Point) -> usize {
    let radius = state.tuning.enemy_radius;
    let (enclosed, remaining): (Vec<Enemy>, Vec<Enemy>) = std::mem::take(&mut state.enemies)
        .into_iter()
        .partition(|e| e.alive && closure.encloses(e.pos, radius));
    state.enemies = remaining;

    let mut casualties = 0;
    let mut pending = enclosed.into_iter();
    while let Some(enemy) = pending.next() {
        if !state.is_playing() {
            state.enemies.push(enemy);
            state.enemies.extend(pending);
            break;
        }
        if enemy.kind.is_bomb() {
            state.handle_bomb_in_closure(&enemy);
        } else {
            state.handle_enemy_in_closure(&enemy);
            casualties += 1;
        }
    }

    if casualties > 1 && state.is_playing() {
        state.award_multi_enclosure(casualties, anchor);
    }
    casualties
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::MOUSE_CONTACT_ID;
    use crate::sim::entities::{Contact, EnemyKind};
    use crate::sim::state::GamePhase;

    fn v(x: f32, y: f32) -> Point {
        Vec2::new(x, y)
    }

    /// Square-ish loop around (cx, cy) whose last segment crosses the first
    pub(crate) fn looped_trail(cx: f32, cy: f32, half: f32) -> Vec<Point> {
        vec![
            v(cx - half - 20.0, cy - half),
            v(cx + half, cy - half),
            v(cx + half, cy + half),
            v(cx - half, cy + half),
            v(cx - half, cy - half - 20.0),
        ]
    }

    #[test]
    fn test_short_trail_has_no_candidates() {
        assert!(find_candidates(&[]).is_empty());
        assert!(find_candidates(&[v(0.0, 0.0), v(10.0, 10.0), v(0.0, 10.0)]).is_empty());
    }

    #[test]
    fn test_straight_trail_has_no_candidates() {
        let trail: Vec<Point> = (0..20).map(|i| v(i as f32 * 5.0, 0.0)).collect();
        assert!(find_candidates(&trail).is_empty());
    }

    #[test]
    fn test_loop_yields_single_candidate() {
        let trail = looped_trail(100.0, 100.0, 50.0);
        let candidates = find_candidates(&trail);
        assert_eq!(candidates.len(), 1);

        let c = candidates[0];
        assert_eq!((c.first, c.last), (0, 3));
        assert!((c.point - v(50.0, 50.0)).length() < 1e-3);
    }

    #[test]
    fn test_dedup_collapses_same_pair() {
        let a = Candidate {
            first: 2,
            last: 9,
            point: v(1.0, 1.0),
        };
        let b = Candidate {
            first: 2,
            last: 9,
            point: v(1.0, 1.0001),
        };
        let c = Candidate {
            first: 3,
            last: 9,
            point: v(4.0, 4.0),
        };
        let unique = dedup_candidates(vec![a, b, c]);
        assert_eq!(unique.len(), 2);
        assert_eq!(unique.iter().filter(|u| (u.first, u.last) == (2, 9)).count(), 1);
    }

    #[test]
    fn test_closure_from_trail() {
        let trail = looped_trail(100.0, 100.0, 50.0);
        let candidate = find_candidates(&trail)[0];
        let closure = Closure::from_trail(&trail, &candidate).expect("fits trail");

        assert_eq!(closure.points.len(), 5);
        assert_eq!(closure.points.first(), closure.points.last());
        assert!((closure.center() - v(100.0, 100.0)).length() < 1e-3);
        assert!((closure.radius() - 50.0).abs() < 1e-3);

        assert!(closure.contains(v(100.0, 100.0)));
        assert!(!closure.contains(v(200.0, 100.0)));
        assert!(closure.encloses(v(100.0, 100.0), 10.0));
        // Probe pokes out past the left edge
        assert!(!closure.encloses(v(55.0, 100.0), 10.0));
    }

    #[test]
    fn test_closure_rejects_bad_candidate() {
        let trail = looped_trail(100.0, 100.0, 50.0);
        let past_end = Candidate {
            first: 1,
            last: 4,
            point: v(0.0, 0.0),
        };
        assert!(Closure::from_trail(&trail, &past_end).is_none());
        let adjacent = Candidate {
            first: 1,
            last: 2,
            point: v(0.0, 0.0),
        };
        assert!(Closure::from_trail(&trail, &adjacent).is_none());
    }

    fn playing_state() -> GameState {
        let mut state = GameState::new(42);
        state.phase = GamePhase::Playing;
        state
    }

    #[test]
    fn test_resolve_enclosures_dispatch() {
        let mut state = playing_state();
        let trail = looped_trail(300.0, 200.0, 80.0);
        let closure = Closure::from_trail(&trail, &find_candidates(&trail)[0]).unwrap();

        state.enemies.push(Enemy::new(1, EnemyKind::Normal, v(280.0, 190.0)));
        state.enemies.push(Enemy::new(2, EnemyKind::NormalMover, v(320.0, 220.0)));
        state.enemies.push(Enemy::new(3, EnemyKind::Normal, v(600.0, 400.0)));

        let casualties = resolve_enclosures(&mut state, &closure, v(300.0, 200.0));
        assert_eq!(casualties, 2);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.enemies[0].id, 3);
        // Bonus notification floats just above the anchor, sized by casualties
        assert!(state.notifications.iter().any(|n| n.pos.y == 190.0 && n.scale == 2.0 / 1.5));
    }

    #[test]
    fn test_fading_bomb_is_not_enclosed() {
        let mut state = playing_state();
        let trail = looped_trail(300.0, 200.0, 80.0);
        let closure = Closure::from_trail(&trail, &find_candidates(&trail)[0]).unwrap();

        let mut bomb = Enemy::new(1, EnemyKind::Bomb, v(300.0, 200.0));
        bomb.begin_fade_out();
        state.enemies.push(bomb);

        assert_eq!(resolve_enclosures(&mut state, &closure, v(300.0, 200.0)), 0);
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.energy, 100.0);
    }

    #[test]
    fn test_fatal_bomb_stops_dispatch() {
        let mut state = playing_state();
        state.energy = 30.0;
        let trail = looped_trail(300.0, 200.0, 80.0);
        let closure = Closure::from_trail(&trail, &find_candidates(&trail)[0]).unwrap();

        state.enemies.push(Enemy::new(1, EnemyKind::Bomb, v(280.0, 190.0)));
        state.enemies.push(Enemy::new(2, EnemyKind::Normal, v(320.0, 220.0)));
        state.enemies.push(Enemy::new(3, EnemyKind::Normal, v(300.0, 200.0)));

        assert_eq!(resolve_enclosures(&mut state, &closure, v(300.0, 200.0)), 0);
        assert_eq!(state.phase, GamePhase::GameOver);
        assert_eq!((state.multiplier.major, state.multiplier.minor), (1, 0.0));
        assert_eq!(state.score, 0.0);

        // The enemies behind the bomb were never handled
        let mut left: Vec<u32> = state.enemies.iter().map(|e| e.id).collect();
        left.sort_unstable();
        assert_eq!(left, vec![2, 3]);

        let events = state.drain_events();
        assert!(events.contains(&GameEvent::EnemyEnclosed {
            id: 1,
            kind: EnemyKind::Bomb
        }));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::EnemyEnclosed { id: 2 | 3, .. })));
        assert!(matches!(events.last(), Some(GameEvent::GameOver { .. })));
    }

    fn looping_contact(cx: f32, cy: f32, half: f32) -> Contact {
        let trail = looped_trail(cx, cy, half);
        let mut contact = Contact::new(MOUSE_CONTACT_ID, trail[trail.len() - 1], 45);
        contact.trail = trail.into();
        contact
    }

    #[test]
    fn test_loops_fill_without_enclosure_test() {
        let mut state = playing_state();
        state.contacts.push(looping_contact(300.0, 200.0, 80.0));
        state.enemies.push(Enemy::new(1, EnemyKind::Normal, v(300.0, 200.0)));

        find_intersections(&mut state);
        solve_intersections(&mut state, false);
        let events = state.drain_events();
        assert!(events.iter().any(|e| matches!(e, GameEvent::ClosureFilled { .. })));
        assert!(!events.iter().any(|e| matches!(e, GameEvent::EnemyEnclosed { .. })));
        assert_eq!(state.enemies.len(), 1);
        assert_eq!(state.energy, 100.0);

        find_intersections(&mut state);
        solve_intersections(&mut state, true);
        assert!(state.drain_events().contains(&GameEvent::EnemyEnclosed {
            id: 1,
            kind: EnemyKind::Normal
        }));
        assert!(state.enemies.is_empty());
    }
}
