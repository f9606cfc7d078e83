//! Scoring slots and the dividers between them

use serde::{Deserialize, Serialize};

use super::board::Board;

/// A scoring zone on the board floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub index: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub value: u32,
    pub is_center: bool,
    /// Win animation flag, read by the renderer only
    #[serde(skip)]
    pub winning: bool,
}

impl Slot {
    /// Whether `x` falls in this slot's horizontal range `[x, x + width)`
    #[inline]
    pub fn contains_x(&self, x: f32) -> bool {
        x >= self.x && x < self.x + self.width
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width * 0.5
    }

    pub fn trigger_win(&mut self) {
        self.winning = true;
    }

    pub fn reset(&mut self) {
        self.winning = false;
    }
}

/// Thin vertical wall between two neighbouring slots
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotDivider {
    pub center_x: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl SlotDivider {
    /// Divider on the shared edge of `left` and its right neighbour
    pub fn after(left: &Slot, width: f32) -> Self {
        Self {
            center_x: left.x + left.width,
            top: left.y,
            width,
            height: left.height,
        }
    }

    #[inline]
    pub fn left_face(&self) -> f32 {
        self.center_x - self.width * 0.5
    }

    #[inline]
    pub fn right_face(&self) -> f32 {
        self.center_x + self.width * 0.5
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Lay slots edge to edge across the board floor
pub fn layout_slots(board: &Board, values: &[u32], height: f32) -> Vec<Slot> {
    let count = values.len();
    if count == 0 {
        return Vec::new();
    }
    let width = board.inner_width() / count as f32;
    let y = board.floor_y() - height;

    values
        .iter()
        .enumerate()
        .map(|(index, &value)| Slot {
            index,
            x: board.inner_left + index as f32 * width,
            y,
            width,
            height,
            value,
            is_center: is_center_index(index, count),
            winning: false,
        })
        .collect()
}

/// One divider per adjacent pair of slots
pub fn layout_dividers(slots: &[Slot], width: f32) -> Vec<SlotDivider> {
    slots
        .windows(2)
        .map(|pair| SlotDivider::after(&pair[0], width))
        .collect()
}

/// Middle slot (or both middle slots for an even count)
fn is_center_index(index: usize, count: usize) -> bool {
    if count % 2 == 1 {
        index == count / 2
    } else {
        index + 1 == count / 2 || index == count / 2
    }
}

/// Symmetric values, doubling from the center outwards (10, 20, 40, ...)
pub fn default_slot_values(count: usize) -> Vec<u32> {
    let center = (count as f32 - 1.0) * 0.5;
    (0..count)
        .map(|i| {
            let dist = (i as f32 - center).abs().floor() as u32;
            10u32.saturating_mul(1u32.checked_shl(dist).unwrap_or(u32::MAX))
        })
        .collect()
}

/// Slot whose horizontal range holds `x`
pub fn slot_at(slots: &[Slot], x: f32) -> Option<usize> {
    slots.iter().position(|s| s.contains_x(x))
}
