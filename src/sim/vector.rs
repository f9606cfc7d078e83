//! 2D vector helpers on top of `glam::Vec2`
//!
//! glam covers add/sub/scale/dot/length/normalize; the bounce-specific
//! operations live here so collision code reads the same everywhere.

use glam::Vec2;

/// Reflect velocity off a surface
///
/// Standard reflection: v' = v - 2(v·n)n, `normal` must be unit length.
#[inline]
pub fn reflect_velocity(velocity: Vec2, normal: Vec2) -> Vec2 {
    velocity - 2.0 * velocity.dot(normal) * normal
}

/// Rescale to exactly `max` if the magnitude exceeds it
#[inline]
pub fn limit(v: Vec2, max: f32) -> Vec2 {
    let len_sq = v.length_squared();
    if len_sq > max * max {
        v * (max / len_sq.sqrt())
    } else {
        v
    }
}

/// Rotate by `angle` radians (positive is clockwise on screen, y points down)
#[inline]
pub fn rotate(v: Vec2, angle: f32) -> Vec2 {
    Vec2::from_angle(angle).rotate(v)
}

/// Normalize, or return `fallback` when the vector is too short to have a direction
#[inline]
pub fn safe_normal(v: Vec2, fallback: Vec2) -> Vec2 {
    let n = v.normalize_or_zero();
    if n == Vec2::ZERO { fallback } else { n }
}
