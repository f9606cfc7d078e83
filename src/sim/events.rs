//! Events the simulation reports to its collaborators
//!
//! Rendering, audio and persistence react to these; the core never performs
//! those side effects itself.

use std::cell::RefCell;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

/// Why a drop request was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DropRejection {
    /// Per-round drop limit already used up
    LimitReached,
    /// Round finished and waiting for acknowledgement
    RoundOver,
    /// Release coordinate was NaN or infinite
    InvalidPosition,
}

/// Something observable happened during a tick or a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    BallDropped { ball_id: u32, x: f32 },
    DropRejected(DropRejection),
    PegHit { peg: usize },
    /// Emitted exactly once per ball
    BallLanded { ball_id: u32, slot: usize, value: u32 },
    RoundComplete { round: u32 },
    /// Final round finished; `winner` has the most landings over all rounds
    GameComplete { winner: usize, score: u64 },
    /// Pegs, slots or dividers were rebuilt
    GeometryChanged,
}

/// Optional hooks installed when the game is composed.
///
/// Every method has a no-op default, implement only what you need.
pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent) {
        let _ = event;
    }
}

/// Observer that ignores everything
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl GameObserver for NullObserver {}

/// Recording observer; clones share the same log
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Rc<RefCell<Vec<GameEvent>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take everything recorded so far
    pub fn drain(&self) -> Vec<GameEvent> {
        self.events.borrow_mut().drain(..).collect()
    }

    pub fn snapshot(&self) -> Vec<GameEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.borrow_mut().push(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_log_shared() {
        let log = EventLog::new();
        let mut observer = log.clone();
        observer.on_event(&GameEvent::GeometryChanged);
        observer.on_event(&GameEvent::PegHit { peg: 3 });

        assert_eq!(log.len(), 2);
        assert_eq!(log.drain()[1], GameEvent::PegHit { peg: 3 });
        assert!(log.is_empty());
    }
}
