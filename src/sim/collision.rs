//! Collision detection and response against static geometry
//!
//! Every function here only mutates the ball (and, for pegs, the hit
//! timestamp used by the renderer). Overlaps are resolved one obstacle at a
//! time with a full positional correction; nothing is solved jointly.

use glam::Vec2;

use super::board::{Board, Segment};
use super::peg::Peg;
use super::rng::JitterSource;
use super::slot::{Slot, SlotDivider, slot_at};
use super::state::Ball;
use super::vector::{reflect_velocity, rotate, safe_normal};
use crate::config::LandingConfig;
use crate::tuning::PhysicsParams;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Closest point on the obstacle surface
    pub point: Vec2,
    /// Unit normal pointing from the obstacle toward the ball center
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Circle-circle test between a ball and a peg
pub fn ball_peg_collision(ball_pos: Vec2, ball_radius: f32, peg: &Peg) -> CollisionResult {
    let offset = ball_pos - peg.pos;
    let reach = ball_radius + peg.radius;
    let dist_sq = offset.length_squared();

    if dist_sq >= reach * reach {
        return CollisionResult::miss();
    }

    let dist = dist_sq.sqrt();
    // Concentric: push straight up, out the way the ball came in
    let normal = safe_normal(offset, Vec2::NEG_Y);
    CollisionResult {
        hit: true,
        point: peg.pos + normal * peg.radius,
        normal,
        penetration: reach - dist,
    }
}

/// Bounce a ball off a peg. Returns true on contact.
pub fn resolve_peg(
    ball: &mut Ball,
    peg: &mut Peg,
    params: &PhysicsParams,
    rng: &mut dyn JitterSource,
    now: f64,
) -> bool {
    let result = ball_peg_collision(ball.pos, ball.radius, peg);
    if !result.hit {
        return false;
    }

    ball.pos += result.normal * result.penetration;
    let bounced = reflect_velocity(ball.vel, result.normal) * params.peg_restitution;
    // Rotation keeps speed, so the bounce still loses energy
    ball.vel = rotate(bounced, rng.symmetric(params.peg_jitter_angle));
    peg.strike(now);
    true
}

/// Keep the ball inside the board's inner left/right walls and ceiling.
/// Returns true if any wall was touched.
pub fn resolve_walls(ball: &mut Ball, board: &Board, restitution: f32) -> bool {
    let r = ball.radius;
    let mut hit = false;

    if ball.pos.x - r < board.inner_left {
        ball.pos.x = board.inner_left + r;
        ball.vel.x = ball.vel.x.abs() * restitution;
        hit = true;
    }
    if ball.pos.x + r > board.inner_right {
        ball.pos.x = board.inner_right - r;
        ball.vel.x = -ball.vel.x.abs() * restitution;
        hit = true;
    }
    if ball.pos.y - r < board.inner_top {
        ball.pos.y = board.inner_top + r;
        ball.vel.y = ball.vel.y.abs() * restitution;
        hit = true;
    }

    hit
}

/// Point-to-segment test. Zero-length segments never collide.
pub fn ball_segment_collision(
    ball_pos: Vec2,
    ball_radius: f32,
    segment: &Segment,
) -> CollisionResult {
    let Some(t) = segment.project(ball_pos) else {
        return CollisionResult::miss();
    };
    let closest = segment.start + (segment.end - segment.start) * t;

    let offset = ball_pos - closest;
    let dist = offset.length();
    if dist >= ball_radius {
        return CollisionResult::miss();
    }

    // Center crossed the edge this step: push back out of the front face
    let crossed = t > 0.0 && t < 1.0 && offset.dot(segment.normal) < 0.0;
    let (normal, penetration) = if crossed {
        (segment.normal, ball_radius + dist)
    } else {
        (safe_normal(offset, segment.normal), ball_radius - dist)
    };

    CollisionResult {
        hit: true,
        point: closest,
        normal,
        penetration,
    }
}

/// Bounce a ball off a chevron edge. Returns true on contact.
pub fn resolve_segment(
    ball: &mut Ball,
    segment: &Segment,
    params: &PhysicsParams,
    rng: &mut dyn JitterSource,
) -> bool {
    let result = ball_segment_collision(ball.pos, ball.radius, segment);
    if !result.hit || result.normal == Vec2::ZERO {
        return false;
    }

    ball.pos += result.normal * result.penetration;
    ball.vel = reflect_velocity(ball.vel, result.normal) * params.wall_restitution;
    // Horizontal only, a vertical kick would fight the fall
    ball.vel.x += rng.symmetric(params.bounce_jitter);
    true
}

/// Bounce a ball off the side faces of a slot divider.
///
/// Only engages when the ball overlaps a face by less than its radius, so a
/// ball sliding past (or already deep over the divider) is left alone.
pub fn resolve_divider(
    ball: &mut Ball,
    divider: &SlotDivider,
    params: &PhysicsParams,
    rng: &mut dyn JitterSource,
) -> bool {
    let r = ball.radius;
    if ball.pos.y + r <= divider.top || ball.pos.y - r >= divider.bottom() {
        return false;
    }

    let kick = rng.next_f32() * params.bounce_jitter;

    if ball.pos.x <= divider.center_x {
        let penetration = ball.pos.x + r - divider.left_face();
        if penetration > 0.0 && penetration < r {
            ball.pos.x = divider.left_face() - r;
            ball.vel.x = -(ball.vel.x.abs() * params.wall_restitution + kick);
            return true;
        }
    } else {
        let penetration = divider.right_face() - (ball.pos.x - r);
        if penetration > 0.0 && penetration < r {
            ball.pos.x = divider.right_face() + r;
            ball.vel.x = ball.vel.x.abs() * params.wall_restitution + kick;
            return true;
        }
    }

    false
}

/// Slot floor contact and settle test.
///
/// Clamps the ball onto the floor, applies the weak floor bounce and
/// friction, then returns the slot index once the ball is at rest inside a
/// slot's range. A ball resting outside every slot keeps simulating.
pub fn settle_in_slot(
    ball: &mut Ball,
    floor_y: f32,
    slots: &[Slot],
    landing: &LandingConfig,
) -> Option<usize> {
    let rest_y = floor_y - ball.radius;

    if ball.pos.y >= rest_y {
        ball.pos.y = rest_y;
        if ball.vel.y > landing.bounce_threshold {
            ball.vel.y = -ball.vel.y * landing.floor_bounce;
        } else if ball.vel.y > 0.0 {
            ball.vel.y = 0.0;
        }
        ball.vel.x *= landing.floor_friction;
    }

    let settled = (rest_y - ball.pos.y).abs() < landing.settle_epsilon
        && ball.vel.x.abs() < landing.settle_speed_x
        && ball.vel.y.abs() < landing.settle_speed_y;

    if settled { slot_at(slots, ball.pos.x) } else { None }
}
