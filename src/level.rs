//! Peg/slot layouts
//!
//! A level is plain data: where the pegs go and what the slots are worth.
//! Imported JSON is checked against the board before it replaces anything.

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, GameConfig};
use crate::consts::{MAX_SLOTS, MIN_SLOTS};
use crate::sim::board::Board;
use crate::sim::peg::{Peg, PegKind, staggered_layout};
use crate::sim::slot::default_slot_values;

/// Level data rejected on import
#[derive(Debug, Error, PartialEq)]
pub enum LevelError {
    #[error("invalid level JSON: {0}")]
    Parse(String),
    #[error("peg {index} has a non-finite position")]
    NonFinite { index: usize },
    #[error("peg {index} radius must be greater than zero")]
    BadRadius { index: usize },
    #[error("peg {index} at ({x}, {y}) is outside the play area")]
    OutOfBounds { index: usize, x: f32, y: f32 },
    #[error("slot count {0} outside supported range [2, 24]")]
    SlotCount(usize),
    #[error("level does not fit the board: {0}")]
    Config(#[from] ConfigError),
}

/// One peg as stored in level data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PegSpec {
    pub x: f32,
    pub y: f32,
    /// Falls back to the configured peg radius
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<f32>,
    #[serde(default)]
    pub kind: PegKind,
}

/// A peg/slot layout
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Level {
    pub name: String,
    pub pegs: Vec<PegSpec>,
    /// Explicit slot values, left to right
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_values: Option<Vec<u32>>,
    /// Slot count with generated values (ignored when `slot_values` is set)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slot_count: Option<usize>,
    /// Pegs to re-type orange at random when the level is applied
    #[serde(default)]
    pub orange_pegs: usize,
}

impl Level {
    /// Default staggered grid for the configured board
    pub fn staggered(config: &GameConfig) -> Self {
        let board = Board::new(&config.board, config.slots.height);
        let pegs = staggered_layout(&board, config.peg_radius, config.ball_radius)
            .into_iter()
            .map(|p| PegSpec {
                x: p.pos.x,
                y: p.pos.y,
                radius: None,
                kind: p.kind,
            })
            .collect();

        Self {
            name: "Classic".to_string(),
            pegs,
            slot_values: None,
            slot_count: None,
            orange_pegs: 0,
        }
    }

    /// Parse level JSON; geometry is checked later against the real board
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let level: Self = serde_json::from_str(json).map_err(|e| LevelError::Parse(e.to_string()))?;
        level.check_slot_count()?;
        Ok(level)
    }

    pub fn to_json(&self) -> Result<String, LevelError> {
        serde_json::to_string_pretty(self).map_err(|e| LevelError::Parse(e.to_string()))
    }

    fn check_slot_count(&self) -> Result<(), LevelError> {
        let count = match (&self.slot_values, self.slot_count) {
            (Some(values), _) => values.len(),
            (None, Some(count)) => count,
            (None, None) => return Ok(()),
        };
        if (MIN_SLOTS..=MAX_SLOTS).contains(&count) {
            Ok(())
        } else {
            Err(LevelError::SlotCount(count))
        }
    }

    /// Every peg must sit fully inside the interior, above the slot row, and
    /// the slots must pass the same checks as a base configuration
    pub fn validate(&self, board: &Board, config: &GameConfig) -> Result<(), LevelError> {
        self.check_slot_count()?;

        let mut with_slots = config.clone();
        with_slots.slots.values = self.slot_values(&config.slots.values);
        with_slots.validate()?;

        for (index, spec) in self.pegs.iter().enumerate() {
            if !spec.x.is_finite() || !spec.y.is_finite() {
                return Err(LevelError::NonFinite { index });
            }
            let radius = spec.radius.unwrap_or(config.peg_radius);
            if !(radius.is_finite() && radius > 0.0) {
                return Err(LevelError::BadRadius { index });
            }
            let inside = spec.x - radius >= board.inner_left
                && spec.x + radius <= board.inner_right
                && spec.y - radius >= board.inner_top
                && spec.y + radius <= board.slot_top;
            if !inside {
                return Err(LevelError::OutOfBounds {
                    index,
                    x: spec.x,
                    y: spec.y,
                });
            }
        }
        Ok(())
    }

    pub fn build_pegs(&self, default_radius: f32) -> Vec<Peg> {
        self.pegs
            .iter()
            .map(|s| {
                Peg::new(
                    Vec2::new(s.x, s.y),
                    s.radius.unwrap_or(default_radius),
                    s.kind,
                )
            })
            .collect()
    }

    /// Slot values this level asks for, or `fallback` when it says nothing
    pub fn slot_values(&self, fallback: &[u32]) -> Vec<u32> {
        match (&self.slot_values, self.slot_count) {
            (Some(values), _) => values.clone(),
            (None, Some(count)) => default_slot_values(count),
            (None, None) => fallback.to_vec(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::{EventLog, GameEvent};
    use crate::sim::rng::FixedJitter;
    use crate::sim::state::GameState;

    fn config() -> GameConfig {
        GameConfig::default()
    }

    fn board(config: &GameConfig) -> Board {
        Board::new(&config.board, config.slots.height)
    }

    #[test]
    fn test_staggered_level_is_valid() {
        let config = config();
        let level = Level::staggered(&config);
        assert!(!level.pegs.is_empty());
        assert_eq!(level.validate(&board(&config), &config), Ok(()));
    }

    #[test]
    fn test_from_json() {
        let level = Level::from_json(
            r#"{
                "name": "Tiny",
                "pegs": [
                    { "x": 300, "y": 300 },
                    { "x": 200, "y": 400, "kind": "green", "radius": 8 }
                ],
                "slot_count": 5
            }"#,
        )
        .unwrap();
        assert_eq!(level.pegs.len(), 2);
        assert_eq!(level.pegs[1].kind, PegKind::Green);
        assert_eq!(level.slot_values(&[1, 2]), default_slot_values(5));

        let pegs = level.build_pegs(6.0);
        assert_eq!(pegs[0].radius, 6.0);
        assert_eq!(pegs[1].radius, 8.0);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(matches!(Level::from_json("{\"name\": 3}"), Err(LevelError::Parse(_))));
        assert_eq!(
            Level::from_json(r#"{ "name": "x", "pegs": [], "slot_count": 30 }"#),
            Err(LevelError::SlotCount(30))
        );
    }

    #[test]
    fn test_out_of_bounds_peg() {
        let config = config();
        let level = Level {
            name: "Bad".into(),
            pegs: vec![PegSpec {
                x: 5.0,
                y: 300.0,
                radius: None,
                kind: PegKind::Blue,
            }],
            slot_values: None,
            slot_count: None,
            orange_pegs: 0,
        };
        assert!(matches!(
            level.validate(&board(&config), &config),
            Err(LevelError::OutOfBounds { index: 0, .. })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let level = Level::staggered(&config());
        let parsed = Level::from_json(&level.to_json().unwrap()).unwrap();
        assert_eq!(parsed, level);
    }

    #[test]
    fn test_apply_level_rebuilds_geometry() {
        let log = EventLog::new();
        let mut state = GameState::with_jitter(config(), Box::new(FixedJitter(0.3)))
            .unwrap()
            .with_observer(Box::new(log.clone()));
        state.drop_at(300.0);
        state.slot_totals[0] = 4;

        let level = Level {
            name: "Wide".into(),
            pegs: vec![
                PegSpec {
                    x: 150.0,
                    y: 300.0,
                    radius: None,
                    kind: PegKind::Blue,
                },
                PegSpec {
                    x: 300.0,
                    y: 300.0,
                    radius: None,
                    kind: PegKind::Blue,
                },
                PegSpec {
                    x: 450.0,
                    y: 300.0,
                    radius: None,
                    kind: PegKind::Blue,
                },
            ],
            slot_values: None,
            slot_count: Some(6),
            orange_pegs: 1,
        };
        state.apply_level(&level).unwrap();

        assert_eq!(state.pegs.len(), 3);
        assert_eq!(state.pegs.iter().filter(|p| p.kind == PegKind::Orange).count(), 1);
        assert_eq!(state.slots.len(), 6);
        assert_eq!(state.dividers.len(), 5);
        assert_eq!(state.slot_totals, vec![0; 6]);
        assert!(state.balls.is_empty());
        assert!(log.snapshot().contains(&GameEvent::GeometryChanged));

        // Same input, same geometry
        let dividers = state.dividers.clone();
        let segments = state.board.segments.clone();
        state.apply_level(&level).unwrap();
        assert_eq!(state.dividers, dividers);
        assert_eq!(state.board.segments, segments);
    }

    #[test]
    fn test_too_many_slots_for_board_rejected() {
        let mut state = GameState::new(config(), 4).unwrap();
        let slots_before = state.slots.clone();
        let dividers_before = state.dividers.clone();

        let level = Level {
            name: "Crowded".into(),
            pegs: Vec::new(),
            slot_values: None,
            slot_count: Some(24),
            orange_pegs: 0,
        };
        assert_eq!(
            state.apply_level(&level),
            Err(LevelError::Config(ConfigError::BoardTooSmall(
                "slots are narrower than a ball"
            )))
        );
        assert_eq!(state.slots, slots_before);
        assert_eq!(state.dividers, dividers_before);
    }

    #[test]
    fn test_rejected_level_keeps_previous_state() {
        let mut state = GameState::new(config(), 9).unwrap();
        let pegs_before = state.pegs.len();
        state.drop_at(300.0);

        let level = Level {
            name: "Broken".into(),
            pegs: vec![PegSpec {
                x: f32::NAN,
                y: 0.0,
                radius: None,
                kind: PegKind::Blue,
            }],
            slot_values: None,
            slot_count: None,
            orange_pegs: 0,
        };
        assert_eq!(state.apply_level(&level), Err(LevelError::NonFinite { index: 0 }));
        assert_eq!(state.pegs.len(), pegs_before);
        assert_eq!(state.balls.len(), 1);
    }
}
