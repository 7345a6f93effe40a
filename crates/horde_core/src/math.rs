//! Geometry helpers shared by the combat, physics and render passes.
//!
//! Vectors are [`glam::Vec2`]. Everything here guards its own degenerate
//! inputs: zero-length directions normalize to zero, angles are wrapped,
//! and ray casts against empty rectangles report no hit instead of NaN.

pub use glam::Vec2;

use std::f32::consts::{PI, TAU};

/// Wrap an angle into `(-PI, PI]`.
#[must_use]
pub fn wrap_angle(angle: f32) -> f32 {
    if !angle.is_finite() {
        return 0.0;
    }
    let mut a = angle % TAU;
    if a <= -PI {
        a += TAU;
    } else if a > PI {
        a -= TAU;
    }
    a
}

/// Signed shortest rotation from `from` to `to`.
#[must_use]
pub fn angle_delta(from: f32, to: f32) -> f32 {
    wrap_angle(to - from)
}

/// Angle of the vector `from -> to`, or `fallback` when the points coincide.
#[must_use]
pub fn angle_between_points(from: Vec2, to: Vec2, fallback: f32) -> f32 {
    let d = to - from;
    if d.length_squared() <= f32::EPSILON {
        return fallback;
    }
    d.y.atan2(d.x)
}

/// Unit vector for an angle in radians.
#[must_use]
pub fn direction(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Normalize, returning zero for zero-length or non-finite input.
#[must_use]
pub fn safe_normalize(v: Vec2) -> Vec2 {
    v.try_normalize().unwrap_or(Vec2::ZERO)
}

/// Circle-circle overlap test.
#[must_use]
pub fn circles_overlap(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) < r * r
}

/// Whether circle `b` touches or overlaps circle `a`; tangent circles count.
#[must_use]
pub fn circle_within(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    let r = ra + rb;
    a.distance_squared(b) <= r * r
}

/// Decrement a timer by `dt`, never going below zero.
#[must_use]
pub fn tick_down(timer: f32, dt: f32) -> f32 {
    (timer - dt).max(0.0)
}

/// Axis-aligned rectangle in world or screen space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// Minimum corner.
    pub min: Vec2,
    /// Maximum corner.
    pub max: Vec2,
}

impl Rect {
    /// Rectangle centered on `center` with the given full size.
    #[must_use]
    pub fn from_center_size(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Whether a point lies inside (inclusive).
    #[must_use]
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Whether the rectangle has positive area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.max.x <= self.min.x || self.max.y <= self.min.y
    }
}

/// Distance along `dir` from `origin` to where the ray leaves `rect`.
///
/// Returns `None` when the origin is outside the rectangle, the rectangle is
/// empty, or the direction is degenerate. Used to clip the laser sight to the
/// visible area.
#[must_use]
pub fn ray_exit_distance(origin: Vec2, dir: Vec2, rect: &Rect) -> Option<f32> {
    if rect.is_empty() || !rect.contains(origin) {
        return None;
    }
    let dir = safe_normalize(dir);
    if dir == Vec2::ZERO {
        return None;
    }

    let mut t_exit = f32::INFINITY;
    if dir.x > 0.0 {
        t_exit = t_exit.min((rect.max.x - origin.x) / dir.x);
    } else if dir.x < 0.0 {
        t_exit = t_exit.min((rect.min.x - origin.x) / dir.x);
    }
    if dir.y > 0.0 {
        t_exit = t_exit.min((rect.max.y - origin.y) / dir.y);
    } else if dir.y < 0.0 {
        t_exit = t_exit.min((rect.min.y - origin.y) / dir.y);
    }

    t_exit.is_finite().then_some(t_exit.max(0.0))
}
