//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Injected jitter source only
//! - Stable iteration order (balls by insertion, obstacles by index)
//! - No rendering or platform dependencies

pub mod board;
pub mod collision;
pub mod events;
pub mod peg;
pub mod rng;
pub mod slot;
pub mod state;
pub mod tick;
pub mod vector;

pub use board::{Board, Chevron, Segment, WallSide};
pub use collision::CollisionResult;
pub use events::{DropRejection, EventLog, GameEvent, GameObserver, NullObserver};
pub use peg::{Peg, PegKind};
pub use rng::{FixedJitter, JitterSource, SeededJitter};
pub use slot::{Slot, SlotDivider};
pub use state::{Ball, BallState, GamePhase, GameState, winning_slot};
pub use tick::{FixedTimestep, PointerInput, TickInput, advance, apply_input, step, tick};
