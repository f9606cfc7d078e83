//! Immutable base configuration
//!
//! Built once at game start (defaults or JSON) and validated before the
//! simulation ever sees it. Runtime adjustments go through [`crate::Tuning`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::*;

/// Configuration rejected at construction time
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("{field} must be a finite number greater than zero (got {value})")]
    NotPositive { field: &'static str, value: f32 },
    #[error("{field} must be within [{min}, {max}) (got {value})")]
    OutOfRange {
        field: &'static str,
        value: f32,
        min: f32,
        max: f32,
    },
    #[error("slot count {0} outside supported range [2, 24]")]
    SlotCount(usize),
    #[error("{0} must be at least 1")]
    ZeroCount(&'static str),
    #[error("board interior is too small: {0}")]
    BoardTooSmall(&'static str),
    #[error("invalid config JSON: {0}")]
    Parse(String),
}

/// Integration and collision response constants
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PhysicsConfig {
    /// Downward acceleration (pixels/step²)
    pub gravity: f32,
    /// Multiplicative damping applied to velocity every step
    pub friction: f32,
    pub peg_restitution: f32,
    pub wall_restitution: f32,
    /// Speed cap (pixels/step)
    pub max_velocity: f32,
    /// Bound of the uniform rotation applied after a peg bounce (radians)
    pub peg_jitter_angle: f32,
    /// Bound of the uniform horizontal kick after chevron/divider bounces
    pub bounce_jitter: f32,
    /// Fixed step duration in seconds
    pub timestep: f32,
    pub max_substeps: u32,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: GRAVITY,
            friction: FRICTION,
            peg_restitution: PEG_RESTITUTION,
            wall_restitution: WALL_RESTITUTION,
            max_velocity: MAX_VELOCITY,
            peg_jitter_angle: PEG_JITTER_ANGLE,
            bounce_jitter: BOUNCE_JITTER,
            timestep: SIM_DT,
            max_substeps: MAX_SUBSTEPS,
        }
    }
}

/// Slot floor settle rules
///
/// These are tuned by feel; change them only with a playtest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandingConfig {
    /// Fraction of vertical speed kept when bouncing off the slot floor
    pub floor_bounce: f32,
    /// Minimum downward speed for a floor bounce, below it the ball stops
    pub bounce_threshold: f32,
    /// Horizontal damping applied while in contact with the floor
    pub floor_friction: f32,
    pub settle_epsilon: f32,
    pub settle_speed_x: f32,
    pub settle_speed_y: f32,
}

impl Default for LandingConfig {
    fn default() -> Self {
        Self {
            floor_bounce: FLOOR_BOUNCE,
            bounce_threshold: FLOOR_BOUNCE_THRESHOLD,
            floor_friction: FLOOR_FRICTION,
            settle_epsilon: SETTLE_EPSILON,
            settle_speed_x: SETTLE_SPEED_X,
            settle_speed_y: SETTLE_SPEED_Y,
        }
    }
}

/// Playfield outline and chevron notches
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardConfig {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub corner_radius: f32,
    pub wall_inset: f32,
    /// Notches per side wall
    pub chevron_count: u32,
    pub chevron_depth: f32,
    pub chevron_height: f32,
    pub drop_zone_height: f32,
}

impl Default for BoardConfig {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: BOARD_WIDTH,
            height: BOARD_HEIGHT,
            corner_radius: BOARD_CORNER_RADIUS,
            wall_inset: WALL_INSET,
            chevron_count: CHEVRON_COUNT,
            chevron_depth: CHEVRON_DEPTH,
            chevron_height: CHEVRON_HEIGHT,
            drop_zone_height: DROP_ZONE_HEIGHT,
        }
    }
}

/// Scoring slots along the board floor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SlotConfig {
    /// Point value per slot, left to right. The slot count is `values.len()`.
    pub values: Vec<u32>,
    pub height: f32,
    pub divider_width: f32,
}

impl Default for SlotConfig {
    fn default() -> Self {
        Self {
            values: crate::sim::slot::default_slot_values(9),
            height: SLOT_HEIGHT,
            divider_width: DIVIDER_WIDTH,
        }
    }
}

/// Round structure
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoundRules {
    pub max_drops_per_round: u32,
    pub rounds: u32,
    /// Minimum gap between a released ball and the chevron tips
    pub drop_clearance: f32,
}

impl Default for RoundRules {
    fn default() -> Self {
        Self {
            max_drops_per_round: MAX_DROPS_PER_ROUND,
            rounds: ROUNDS,
            drop_clearance: DROP_CLEARANCE,
        }
    }
}

/// Complete base configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub physics: PhysicsConfig,
    pub landing: LandingConfig,
    pub board: BoardConfig,
    pub slots: SlotConfig,
    pub rules: RoundRules,
    pub ball_radius: f32,
    pub peg_radius: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            landing: LandingConfig::default(),
            board: BoardConfig::default(),
            slots: SlotConfig::default(),
            rules: RoundRules::default(),
            ball_radius: BALL_RADIUS,
            peg_radius: PEG_RADIUS,
        }
    }
}

impl GameConfig {
    /// Parse a JSON config (missing fields take defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn slot_count(&self) -> usize {
        self.slots.values.len()
    }

    /// Check every value the simulation relies on
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ball_radius", self.ball_radius)?;
        positive("peg_radius", self.peg_radius)?;

        let p = &self.physics;
        positive("gravity", p.gravity)?;
        in_range("friction", p.friction, 0.0, 1.0 + f32::EPSILON)?;
        in_range("peg_restitution", p.peg_restitution, 0.0, 1.0)?;
        in_range("wall_restitution", p.wall_restitution, 0.0, 1.0)?;
        positive("max_velocity", p.max_velocity)?;
        in_range("peg_jitter_angle", p.peg_jitter_angle, 0.0, std::f32::consts::PI)?;
        in_range("bounce_jitter", p.bounce_jitter, 0.0, f32::MAX)?;
        positive("timestep", p.timestep)?;
        if p.max_substeps == 0 {
            return Err(ConfigError::ZeroCount("max_substeps"));
        }

        let l = &self.landing;
        in_range("floor_bounce", l.floor_bounce, 0.0, 1.0)?;
        in_range("bounce_threshold", l.bounce_threshold, 0.0, f32::MAX)?;
        in_range("floor_friction", l.floor_friction, 0.0, 1.0 + f32::EPSILON)?;
        positive("settle_epsilon", l.settle_epsilon)?;
        positive("settle_speed_x", l.settle_speed_x)?;
        positive("settle_speed_y", l.settle_speed_y)?;

        let b = &self.board;
        positive("board.width", b.width)?;
        positive("board.height", b.height)?;
        in_range("board.corner_radius", b.corner_radius, 0.0, f32::MAX)?;
        in_range("board.wall_inset", b.wall_inset, 0.0, f32::MAX)?;
        in_range("board.chevron_depth", b.chevron_depth, 0.0, f32::MAX)?;
        in_range("board.chevron_height", b.chevron_height, 0.0, f32::MAX)?;
        positive("board.drop_zone_height", b.drop_zone_height)?;

        let inner_width = b.width - 2.0 * b.wall_inset;
        let inner_height = b.height - 2.0 * b.wall_inset;
        if inner_width <= 2.0 * (b.chevron_depth + self.ball_radius) {
            return Err(ConfigError::BoardTooSmall("chevrons leave no room for a ball to fall"));
        }
        if inner_height <= self.slots.height + b.drop_zone_height {
            return Err(ConfigError::BoardTooSmall("slots and drop zone overlap"));
        }

        let count = self.slot_count();
        if !(MIN_SLOTS..=MAX_SLOTS).contains(&count) {
            return Err(ConfigError::SlotCount(count));
        }
        positive("slots.height", self.slots.height)?;
        in_range("slots.divider_width", self.slots.divider_width, 0.0, f32::MAX)?;
        if inner_width / count as f32 <= self.slots.divider_width + 2.0 * self.ball_radius {
            return Err(ConfigError::BoardTooSmall("slots are narrower than a ball"));
        }

        if self.rules.max_drops_per_round == 0 {
            return Err(ConfigError::ZeroCount("max_drops_per_round"));
        }
        if self.rules.rounds == 0 {
            return Err(ConfigError::ZeroCount("rounds"));
        }
        in_range("drop_clearance", self.rules.drop_clearance, 0.0, f32::MAX)?;

        Ok(())
    }
}

fn positive(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NotPositive { field, value })
    }
}

fn in_range(field: &'static str, value: f32, min: f32, max: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= min && value < max {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}
