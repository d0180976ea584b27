//! Planar geometry kernel
//!
//! Segment intersection, bounding regions and the point-in-loop test used to
//! decide which enemies a closed trail surrounds. Pure functions, no state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// A position in world space (pixels, y grows downward)
pub type Point = Vec2;

/// Intersection of segments `p1-p2` and `p3-p4`
///
/// Solves the 2x2 system for the parametric positions `s` (along `p3-p4`) and
/// `t` (along `p1-p2`); the crossing only counts when both lie in `[0, 1]`.
/// Parallel, collinear and zero-length segments have a vanishing determinant
/// and never intersect.
pub fn segment_intersect(p1: Point, p2: Point, p3: Point, p4: Point) -> Option<Point> {
    let s1 = p2 - p1;
    let s2 = p4 - p3;

    let denom = -s2.x * s1.y + s1.x * s2.y;
    if denom.abs() <= f32::EPSILON {
        return None;
    }

    let d = p1 - p3;
    let s = (-s1.y * d.x + s1.x * d.y) / denom;
    let t = (s2.x * d.y - s2.y * d.x) / denom;

    if (0.0..=1.0).contains(&s) && (0.0..=1.0).contains(&t) {
        Some(p1 + s1 * t)
    } else {
        None
    }
}

/// Even-odd test of `point` against the closed polyline `polygon`
///
/// The edge from the last vertex back to the first is implied. Fewer than
/// three vertices enclose nothing.
pub fn point_in_polygon(point: Point, polygon: &[Point]) -> bool {
    if polygon.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = polygon.len() - 1;
    for (i, &a) in polygon.iter().enumerate() {
        let b = polygon[j];
        if (a.y > point.y) != (b.y > point.y) {
            let crossing_x = a.x + (b.x - a.x) * (point.y - a.y) / (b.y - a.y);
            if point.x < crossing_x {
                inside = !inside;
            }
        }
        j = i;
    }
    inside
}

/// Move `from` toward `to` by `factor` of the remaining distance
#[inline]
pub fn interpolate(from: Point, to: Point, factor: f32) -> Point {
    from.lerp(to, factor)
}

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Bounding box accumulated from a set of points
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Region {
    fn default() -> Self {
        Self::new()
    }
}

impl Region {
    /// An empty region; the first `inflate` sets both corners
    pub fn new() -> Self {
        Self {
            min: Vec2::splat(f32::INFINITY),
            max: Vec2::splat(f32::NEG_INFINITY),
        }
    }

    /// Region covering every point in `points`
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point>) -> Self {
        let mut region = Self::new();
        for p in points {
            region.inflate(*p);
        }
        region
    }

    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    /// Grow to include `p`
    pub fn inflate(&mut self, p: Point) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    /// Grow by `dx` / `dy` on every side
    pub fn expand(&mut self, dx: f32, dy: f32) {
        if self.is_empty() {
            return;
        }
        let pad = Vec2::new(dx, dy);
        self.min -= pad;
        self.max += pad;
    }

    pub fn center(&self) -> Point {
        if self.is_empty() {
            return Vec2::ZERO;
        }
        (self.min + self.max) * 0.5
    }

    /// Half of the larger side (a gradient radius, not a tight bound)
    pub fn size(&self) -> f32 {
        if self.is_empty() {
            return 0.0;
        }
        let extent = self.max - self.min;
        extent.x.max(extent.y) * 0.5
    }

    pub fn to_rect(&self) -> Rect {
        if self.is_empty() {
            return Rect::default();
        }
        Rect {
            x: self.min.x,
            y: self.min.y,
            width: self.max.x - self.min.x,
            height: self.max.y - self.min.y,
        }
    }
}
