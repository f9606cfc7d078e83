//! Static peg obstacles

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::rng::JitterSource;

/// Peg types (identity only, the renderer colours them)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PegKind {
    #[default]
    Blue,
    Orange,
    Green,
}

/// A static circular peg
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Peg {
    pub pos: Vec2,
    pub radius: f32,
    pub kind: PegKind,
    /// Hit flash state, read by the renderer only
    #[serde(skip)]
    pub is_hit: bool,
    #[serde(skip)]
    pub hit_time: f64,
    #[serde(skip)]
    pub last_hit_time: f64,
}

impl Peg {
    pub fn new(pos: Vec2, radius: f32, kind: PegKind) -> Self {
        Self {
            pos,
            radius,
            kind,
            is_hit: false,
            hit_time: 0.0,
            last_hit_time: 0.0,
        }
    }

    /// Record a hit at simulation time `now` (seconds)
    pub fn strike(&mut self, now: f64) {
        self.last_hit_time = self.hit_time;
        self.hit_time = now;
        self.is_hit = true;
    }

    /// Clear hit flash state (round start)
    pub fn reset_hit(&mut self) {
        self.is_hit = false;
        self.hit_time = 0.0;
        self.last_hit_time = 0.0;
    }
}

/// Staggered Plinko grid filling the area between the drop zone and the slots.
///
/// Odd rows are shifted by half a column so a falling ball always meets a peg.
pub fn staggered_layout(board: &Board, peg_radius: f32, ball_radius: f32) -> Vec<Peg> {
    // Leave room for a ball to pass between neighbours and next to the chevrons
    let spacing = 2.0 * (peg_radius + ball_radius) + 16.0;
    let margin = board.chevron_depth + 2.0 * ball_radius + 2.0 + peg_radius;
    let left = board.inner_left + margin;
    let right = board.inner_right - margin;
    let top = board.inner_top + board.drop_zone_height + peg_radius;
    let bottom = board.slot_top - 2.0 * ball_radius - peg_radius;
    if right <= left || bottom <= top {
        return Vec::new();
    }

    let cols = ((right - left) / spacing).floor() as usize + 1;
    let rows = ((bottom - top) / spacing).floor() as usize + 1;
    let used_width = (cols - 1) as f32 * spacing;
    let x0 = left + (right - left - used_width) * 0.5;

    let mut pegs = Vec::with_capacity(rows * cols);
    for row in 0..rows {
        let y = top + row as f32 * spacing;
        let shifted = row % 2 == 1;
        let row_cols = if shifted { cols.saturating_sub(1) } else { cols };
        let offset = if shifted { spacing * 0.5 } else { 0.0 };
        for col in 0..row_cols {
            let x = x0 + offset + col as f32 * spacing;
            pegs.push(Peg::new(Vec2::new(x, y), peg_radius, PegKind::Blue));
        }
    }
    pegs
}

/// Re-type `count` distinct pegs as orange, the rest keep their kind except
/// previous oranges, which revert to blue.
pub fn assign_orange_pegs(pegs: &mut [Peg], count: usize, rng: &mut dyn JitterSource) {
    for peg in pegs.iter_mut() {
        if peg.kind == PegKind::Orange {
            peg.kind = PegKind::Blue;
        }
    }

    // Partial Fisher-Yates over indices
    let mut indices: Vec<usize> = (0..pegs.len()).collect();
    let count = count.min(indices.len());
    for i in 0..count {
        let remaining = indices.len() - i;
        let pick = i + ((rng.next_f32() * remaining as f32) as usize).min(remaining - 1);
        indices.swap(i, pick);
        pegs[indices[i]].kind = PegKind::Orange;
    }
}
