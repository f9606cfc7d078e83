//! Peg Drop - A Plinko/Peggle style arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, game state)
//! - `config`: Immutable base configuration with validation
//! - `tuning`: Live-adjustable physics overrides
//! - `level`: Peg/slot layouts and JSON level import
//! - `highscores`: Finished-game leaderboard

pub mod config;
pub mod highscores;
pub mod level;
pub mod sim;
pub mod tuning;

#[cfg(target_arch = "wasm32")]
pub mod web;

pub use config::{ConfigError, GameConfig};
pub use highscores::HighScores;
pub use level::{Level, LevelError};
pub use tuning::Tuning;

/// Default configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Outer board dimensions
    pub const BOARD_WIDTH: f32 = 600.0;
    pub const BOARD_HEIGHT: f32 = 900.0;
    pub const BOARD_CORNER_RADIUS: f32 = 24.0;
    /// Distance from the outer edge to the collidable interior
    pub const WALL_INSET: f32 = 20.0;

    /// Chevron notches per side wall
    pub const CHEVRON_COUNT: u32 = 3;
    pub const CHEVRON_DEPTH: f32 = 22.0;
    pub const CHEVRON_HEIGHT: f32 = 70.0;

    /// Height of the band at the top of the board where a drop can start
    pub const DROP_ZONE_HEIGHT: f32 = 90.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 10.0;
    /// Peg defaults
    pub const PEG_RADIUS: f32 = 6.0;

    /// Gravity (pixels/step²)
    pub const GRAVITY: f32 = 0.3;
    /// Per-step velocity damping
    pub const FRICTION: f32 = 0.995;
    pub const PEG_RESTITUTION: f32 = 0.75;
    pub const WALL_RESTITUTION: f32 = 0.6;
    /// Maximum ball speed (pixels/step)
    pub const MAX_VELOCITY: f32 = 15.0;
    /// Maximum rotation applied after a peg bounce (radians)
    pub const PEG_JITTER_ANGLE: f32 = 0.12;
    /// Maximum horizontal kick after a chevron/divider bounce (pixels/step)
    pub const BOUNCE_JITTER: f32 = 0.4;

    /// Slot floor behaviour
    pub const FLOOR_BOUNCE: f32 = 0.3;
    pub const FLOOR_BOUNCE_THRESHOLD: f32 = 2.0;
    pub const FLOOR_FRICTION: f32 = 0.85;
    pub const SETTLE_EPSILON: f32 = 0.5;
    pub const SETTLE_SPEED_X: f32 = 0.1;
    pub const SETTLE_SPEED_Y: f32 = 0.1;

    /// Slot defaults
    pub const SLOT_HEIGHT: f32 = 80.0;
    pub const DIVIDER_WIDTH: f32 = 4.0;
    pub const MIN_SLOTS: usize = 2;
    pub const MAX_SLOTS: usize = 24;

    /// Round defaults
    pub const MAX_DROPS_PER_ROUND: u32 = 5;
    pub const ROUNDS: u32 = 3;
    /// Extra gap kept between a dropped ball and the chevron tips
    pub const DROP_CLEARANCE: f32 = 4.0;
}
