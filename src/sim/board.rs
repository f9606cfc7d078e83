//! Playfield geometry
//!
//! A rounded rectangle whose left and right inner walls carry inward
//! triangular notches (chevrons). Each chevron contributes two line
//! segments, precomputed once at construction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::config::BoardConfig;

/// A finite collision edge
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
    /// Unit perpendicular facing the play area (used when the ball center
    /// sits exactly on the segment)
    pub normal: Vec2,
}

impl Segment {
    /// Build a segment whose normal points along `direction` (picks the
    /// perpendicular with a non-negative component along it)
    pub fn facing(start: Vec2, end: Vec2, direction: Vec2) -> Self {
        let perp = (end - start).perp().normalize_or_zero();
        let normal = if perp.dot(direction) >= 0.0 { perp } else { -perp };
        Self { start, end, normal }
    }

    #[inline]
    pub fn length_squared(&self) -> f32 {
        (self.end - self.start).length_squared()
    }

    /// Parametric projection of `p` onto the segment, clamped to [0, 1].
    /// Returns `None` for a zero-length segment.
    pub fn project(&self, p: Vec2) -> Option<f32> {
        let len_sq = self.length_squared();
        if len_sq < 1e-6 {
            return None;
        }
        let t = (p - self.start).dot(self.end - self.start) / len_sq;
        Some(t.clamp(0.0, 1.0))
    }
}

/// Which wall a chevron is cut into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WallSide {
    Left,
    Right,
}

/// One triangular notch: top corner, tip, bottom corner
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Chevron {
    pub side: WallSide,
    pub top: Vec2,
    pub tip: Vec2,
    pub bottom: Vec2,
}

/// Static playfield
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub inner_left: f32,
    pub inner_right: f32,
    pub inner_top: f32,
    pub inner_bottom: f32,
    pub chevron_depth: f32,
    pub chevron_count: u32,
    pub drop_zone_height: f32,
    /// Top edge of the slot row; chevrons stay above it
    pub slot_top: f32,
    pub chevrons: Vec<Chevron>,
    /// Two segments per chevron
    pub segments: Vec<Segment>,
}

impl Board {
    /// Build the board and derive its chevron segments.
    ///
    /// `slot_height` reserves the bottom band of the interior for slots.
    pub fn new(config: &BoardConfig, slot_height: f32) -> Self {
        let inner_left = config.x + config.wall_inset;
        let inner_right = config.x + config.width - config.wall_inset;
        let inner_top = config.y + config.wall_inset;
        let inner_bottom = config.y + config.height - config.wall_inset;
        let slot_top = inner_bottom - slot_height;

        let mut board = Self {
            x: config.x,
            y: config.y,
            width: config.width,
            height: config.height,
            corner_radius: config.corner_radius,
            inner_left,
            inner_right,
            inner_top,
            inner_bottom,
            chevron_depth: config.chevron_depth,
            chevron_count: config.chevron_count,
            drop_zone_height: config.drop_zone_height,
            slot_top,
            chevrons: Vec::new(),
            segments: Vec::new(),
        };
        board.build_chevrons(config.chevron_height);
        board
    }

    fn build_chevrons(&mut self, chevron_height: f32) {
        self.chevrons.clear();
        self.segments.clear();
        if self.chevron_count == 0 || self.chevron_depth <= 0.0 {
            return;
        }

        // Chevrons share the band between the drop zone and the slot row
        let band_top = (self.inner_top + self.drop_zone_height).min(self.slot_top);
        let band_height = self.slot_top - band_top;
        if band_height <= 0.0 {
            return;
        }
        let spacing = band_height / self.chevron_count as f32;
        let half = chevron_height.min(spacing) * 0.5;

        for i in 0..self.chevron_count {
            let cy = band_top + spacing * (i as f32 + 0.5);
            for side in [WallSide::Left, WallSide::Right] {
                // Both edges of a chevron face away from the wall it is cut into
                let (wall_x, tip_x, inward) = match side {
                    WallSide::Left => (
                        self.inner_left,
                        self.inner_left + self.chevron_depth,
                        Vec2::X,
                    ),
                    WallSide::Right => (
                        self.inner_right,
                        self.inner_right - self.chevron_depth,
                        Vec2::NEG_X,
                    ),
                };
                let chevron = Chevron {
                    side,
                    top: Vec2::new(wall_x, cy - half),
                    tip: Vec2::new(tip_x, cy),
                    bottom: Vec2::new(wall_x, cy + half),
                };
                self.segments.push(Segment::facing(chevron.top, chevron.tip, inward));
                self.segments.push(Segment::facing(chevron.tip, chevron.bottom, inward));
                self.chevrons.push(chevron);
            }
        }
    }

    /// Center of the collidable interior
    pub fn center(&self) -> Vec2 {
        Vec2::new(
            (self.inner_left + self.inner_right) * 0.5,
            (self.inner_top + self.inner_bottom) * 0.5,
        )
    }

    /// Y of the slot floor, where balls come to rest
    #[inline]
    pub fn floor_y(&self) -> f32 {
        self.inner_bottom
    }

    pub fn inner_width(&self) -> f32 {
        self.inner_right - self.inner_left
    }

    /// Whether a pointer position may start aiming
    pub fn in_drop_zone(&self, point: Vec2) -> bool {
        point.x >= self.inner_left
            && point.x <= self.inner_right
            && point.y >= self.y
            && point.y <= self.inner_top + self.drop_zone_height
    }

    /// Horizontal range a ball may be released in, inset from the chevron tips
    pub fn safe_drop_range(&self, ball_radius: f32, clearance: f32) -> (f32, f32) {
        let inset = self.chevron_depth.max(0.0) + ball_radius + clearance;
        let min = self.inner_left + inset;
        let max = self.inner_right - inset;
        if min <= max {
            (min, max)
        } else {
            let mid = (self.inner_left + self.inner_right) * 0.5;
            (mid, mid)
        }
    }

    /// Y a freshly dropped ball starts at
    pub fn spawn_y(&self, ball_radius: f32) -> f32 {
        self.inner_top + ball_radius
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(&BoardConfig::default(), crate::consts::SLOT_HEIGHT)
    }

    #[test]
    fn test_inner_bounds() {
        let b = board();
        assert_eq!(b.inner_left, 20.0);
        assert_eq!(b.inner_right, 580.0);
        assert_eq!(b.inner_top, 20.0);
        assert_eq!(b.inner_bottom, 880.0);
        assert_eq!(b.slot_top, 800.0);
    }

    #[test]
    fn test_chevron_segments_contained() {
        let b = board();
        assert_eq!(b.chevrons.len(), 2 * b.chevron_count as usize);
        assert_eq!(b.segments.len(), 2 * b.chevrons.len());

        for seg in &b.segments {
            for p in [seg.start, seg.end] {
                assert!(p.y >= b.inner_top && p.y <= b.inner_bottom);
                assert!(
                    p.x >= b.inner_left && p.x <= b.inner_left + b.chevron_depth
                        || p.x <= b.inner_right && p.x >= b.inner_right - b.chevron_depth
                );
            }
            // Fallback normal faces the play area
            assert!(seg.normal.dot(b.center() - seg.start) > 0.0);
        }
        assert_normals_face_away_from_walls(&b);
    }

    fn assert_normals_face_away_from_walls(b: &Board) {
        for (chevron, edges) in b.chevrons.iter().zip(b.segments.chunks(2)) {
            for seg in edges {
                match chevron.side {
                    WallSide::Left => assert!(seg.normal.x > 0.0, "{seg:?}"),
                    WallSide::Right => assert!(seg.normal.x < 0.0, "{seg:?}"),
                }
            }
        }
    }

    #[test]
    fn test_tall_board_chevrons_face_play_area() {
        use crate::config::GameConfig;
        use crate::sim::collision::{ball_segment_collision, resolve_segment};
        use crate::sim::rng::FixedJitter;
        use crate::sim::state::Ball;
        use crate::tuning::Tuning;

        let config = BoardConfig {
            height: 2400.0,
            ..BoardConfig::default()
        };
        let b = Board::new(&config, crate::consts::SLOT_HEIGHT);
        assert_normals_face_away_from_walls(&b);

        // Ball just in front of the top edge of the highest left chevron
        let top_edge = b.segments[0];
        let mid = (top_edge.start + top_edge.end) * 0.5;
        let mut ball = Ball::new(1, mid + top_edge.normal * 8.0, 10.0);
        ball.drop_ball();
        ball.vel = Vec2::new(0.0, 3.0);

        let params = GameConfig::default().physics.resolve(&Tuning::default());
        assert!(resolve_segment(&mut ball, &top_edge, &params, &mut FixedJitter::NONE));
        assert!((ball.pos - top_edge.start).dot(top_edge.normal) > 9.9);
        assert!(!ball_segment_collision(ball.pos, 9.9, &top_edge).hit);
    }

    #[test]
    fn test_no_chevrons() {
        let config = BoardConfig {
            chevron_count: 0,
            ..BoardConfig::default()
        };
        let b = Board::new(&config, 80.0);
        assert!(b.segments.is_empty());
    }

    #[test]
    fn test_segment_projection() {
        let seg = Segment::facing(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::Y);
        assert_eq!(seg.normal, Vec2::new(0.0, 1.0));
        assert_eq!(seg.project(Vec2::new(4.0, 3.0)), Some(0.4));
        assert_eq!(seg.project(Vec2::new(-4.0, 3.0)), Some(0.0));
        assert_eq!(seg.project(Vec2::new(14.0, 3.0)), Some(1.0));

        // Opposite direction flips the normal
        let down = Segment::facing(Vec2::new(0.0, 0.0), Vec2::new(10.0, 0.0), Vec2::NEG_Y);
        assert_eq!(down.normal, Vec2::new(0.0, -1.0));

        let degenerate = Segment::facing(Vec2::ONE, Vec2::ONE, Vec2::ZERO);
        assert_eq!(degenerate.project(Vec2::ZERO), None);
    }

    #[test]
    fn test_safe_drop_range() {
        let b = board();
        let (min, max) = b.safe_drop_range(10.0, 4.0);
        assert_eq!(min, 20.0 + 22.0 + 10.0 + 4.0);
        assert_eq!(max, 580.0 - 22.0 - 10.0 - 4.0);
    }

    #[test]
    fn test_drop_zone() {
        let b = board();
        assert!(b.in_drop_zone(Vec2::new(300.0, 50.0)));
        assert!(!b.in_drop_zone(Vec2::new(300.0, 400.0)));
        assert!(!b.in_drop_zone(Vec2::new(5.0, 50.0)));
    }
}
