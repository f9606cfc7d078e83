//! Game state and core simulation types
//!
//! `GameState` is the session coordinator: it owns the static geometry,
//! every ball, the round counters and the injected jitter source, and it is
//! the only place those change.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::board::Board;
use super::events::{DropRejection, GameEvent, GameObserver, NullObserver};
use super::peg::{Peg, assign_orange_pegs, staggered_layout};
use super::rng::{JitterSource, SeededJitter};
use super::slot::{Slot, SlotDivider, layout_dividers, layout_slots};
use crate::config::{ConfigError, GameConfig};
use crate::level::{Level, LevelError};
use crate::tuning::{PhysicsParams, Tuning};

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Nothing in flight, waiting for the player
    Idle,
    /// Pointer held in the drop zone, preview ball follows it
    Aiming,
    /// At least one ball is falling
    Dropping,
    /// Round finished, waiting for acknowledgement
    Scoring,
}

/// Ball lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BallState {
    /// Preview only, follows the pointer, not simulated
    Pending,
    /// Simulated every tick
    Falling,
    /// At rest in a slot, terminal
    Landed { slot: usize },
}

/// Maximum number of trail points to store
pub const TRAIL_LENGTH: usize = 20;

/// A ball entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ball {
    pub id: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
    pub state: BallState,
    /// Trail history for rendering (newest first)
    #[serde(skip)]
    pub trail: Vec<Vec2>,
}

impl Ball {
    pub fn new(id: u32, pos: Vec2, radius: f32) -> Self {
        Self {
            id,
            pos,
            vel: Vec2::ZERO,
            radius,
            state: BallState::Pending,
            trail: Vec::with_capacity(TRAIL_LENGTH),
        }
    }

    /// Pending -> Falling
    pub fn drop_ball(&mut self) {
        if self.state == BallState::Pending {
            self.state = BallState::Falling;
        }
    }

    /// Falling -> Landed; stops the ball and detaches it from simulation
    pub fn land(&mut self, slot: usize) {
        if self.state == BallState::Falling {
            self.vel = Vec2::ZERO;
            self.state = BallState::Landed { slot };
        }
    }

    /// Currently simulated
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state == BallState::Falling
    }

    #[inline]
    pub fn is_landed(&self) -> bool {
        matches!(self.state, BallState::Landed { .. })
    }

    pub fn landed_slot(&self) -> Option<usize> {
        match self.state {
            BallState::Landed { slot } => Some(slot),
            _ => None,
        }
    }

    /// Record current position to trail (call each tick while falling)
    pub fn record_trail(&mut self) {
        self.trail.insert(0, self.pos);
        if self.trail.len() > TRAIL_LENGTH {
            self.trail.pop();
        }
    }
}

/// Slot with the most landings; ties go to the lowest index
pub fn winning_slot(totals: &[u32]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (i, &count) in totals.iter().enumerate() {
        if best.is_none_or(|(_, c)| count > c) {
            best = Some((i, count));
        }
    }
    best.map(|(i, _)| i)
}

/// Complete session state
pub struct GameState {
    config: GameConfig,
    /// Live physics overrides, read at the start of every step
    pub tuning: Tuning,
    pub board: Board,
    pub pegs: Vec<Peg>,
    pub slots: Vec<Slot>,
    pub dividers: Vec<SlotDivider>,
    /// Dropped balls in insertion order
    pub balls: Vec<Ball>,
    /// Aiming preview, never simulated
    pub preview: Option<Ball>,
    pub phase: GamePhase,
    pub score: u64,
    /// Current round (0-based)
    pub round: u32,
    pub drops_this_round: u32,
    pub landed_this_round: u32,
    /// Landings per slot across all rounds of the current game
    pub slot_totals: Vec<u32>,
    pub allow_dropping: bool,
    /// Winner of the most recently finished game
    pub last_winner: Option<usize>,
    /// Simulation tick counter
    pub time_ticks: u64,
    pub(crate) rng: Box<dyn JitterSource>,
    observer: Box<dyn GameObserver>,
    next_id: u32,
}

impl GameState {
    /// Create a session with a seeded jitter source and the default peg grid
    pub fn new(config: GameConfig, seed: u64) -> Result<Self, ConfigError> {
        Self::with_jitter(config, Box::new(SeededJitter::new(seed)))
    }

    /// Create a session with an explicit jitter source
    pub fn with_jitter(
        config: GameConfig,
        rng: Box<dyn JitterSource>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let board = Board::new(&config.board, config.slots.height);
        let pegs = staggered_layout(&board, config.peg_radius, config.ball_radius);
        let slots = layout_slots(&board, &config.slots.values, config.slots.height);
        let dividers = layout_dividers(&slots, config.slots.divider_width);
        let slot_totals = vec![0; slots.len()];

        log::info!(
            "Board ready: {} pegs, {} slots, {} chevron segments",
            pegs.len(),
            slots.len(),
            board.segments.len()
        );

        Ok(Self {
            config,
            tuning: Tuning::default(),
            board,
            pegs,
            slots,
            dividers,
            balls: Vec::new(),
            preview: None,
            phase: GamePhase::Idle,
            score: 0,
            round: 0,
            drops_this_round: 0,
            landed_this_round: 0,
            slot_totals,
            allow_dropping: true,
            last_winner: None,
            time_ticks: 0,
            rng,
            observer: Box::new(NullObserver),
            next_id: 1,
        })
    }

    /// Install the collaborator that receives game events
    pub fn with_observer(mut self, observer: Box<dyn GameObserver>) -> Self {
        self.observer = observer;
        self
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Base physics merged with the live tuning
    pub fn params(&self) -> PhysicsParams {
        self.config.physics.resolve(&self.tuning)
    }

    /// Simulation time in seconds
    pub fn sim_time(&self) -> f64 {
        self.time_ticks as f64 * self.config.physics.timestep as f64
    }

    pub(crate) fn emit(&mut self, event: GameEvent) {
        self.observer.on_event(&event);
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Balls still in flight
    pub fn falling_count(&self) -> usize {
        self.balls.iter().filter(|b| b.is_active()).count()
    }

    /// Whether a drop would currently be accepted
    pub fn can_drop(&self) -> bool {
        self.allow_dropping
            && self.phase != GamePhase::Scoring
            && self.drops_this_round < self.config.rules.max_drops_per_round
    }

    /// Clamp a release x into the range that clears the chevrons
    pub fn clamp_drop_x(&self, x: f32) -> f32 {
        let (min, max) = self
            .board
            .safe_drop_range(self.config.ball_radius, self.config.rules.drop_clearance);
        x.clamp(min, max)
    }

    /// Pointer pressed: start aiming if inside the drop zone
    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        if !x.is_finite() || !y.is_finite() {
            return false;
        }
        if !self.can_drop() || !self.board.in_drop_zone(Vec2::new(x, y)) {
            return false;
        }

        let pos = Vec2::new(
            self.clamp_drop_x(x),
            self.board.spawn_y(self.config.ball_radius),
        );
        self.preview = Some(Ball::new(0, pos, self.config.ball_radius));
        self.phase = GamePhase::Aiming;
        true
    }

    /// Pointer moved while aiming: preview follows, clamped
    pub fn pointer_move(&mut self, x: f32) {
        if self.phase != GamePhase::Aiming || !x.is_finite() {
            return;
        }
        let x = self.clamp_drop_x(x);
        if let Some(preview) = self.preview.as_mut() {
            preview.pos.x = x;
        }
    }

    /// Pointer released: drop a real ball where the preview was
    pub fn pointer_up(&mut self) -> Option<u32> {
        if self.phase != GamePhase::Aiming {
            return None;
        }
        let preview = self.preview.take()?;
        self.phase = if self.falling_count() > 0 {
            GamePhase::Dropping
        } else {
            GamePhase::Idle
        };
        self.drop_at(preview.pos.x)
    }

    /// Drop command: spawn a falling ball at `x`.
    ///
    /// Returns the new ball id, or `None` (with a `DropRejected` event) when
    /// the round's drop budget is spent or the round is over.
    pub fn drop_at(&mut self, x: f32) -> Option<u32> {
        let rejection = if !x.is_finite() {
            Some(DropRejection::InvalidPosition)
        } else if self.phase == GamePhase::Scoring || !self.allow_dropping {
            Some(DropRejection::RoundOver)
        } else if self.drops_this_round >= self.config.rules.max_drops_per_round {
            Some(DropRejection::LimitReached)
        } else {
            None
        };
        if let Some(reason) = rejection {
            log::warn!("Drop rejected: {:?}", reason);
            self.emit(GameEvent::DropRejected(reason));
            return None;
        }

        let x = self.clamp_drop_x(x);
        let id = self.next_entity_id();
        let pos = Vec2::new(x, self.board.spawn_y(self.config.ball_radius));
        let mut ball = Ball::new(id, pos, self.config.ball_radius);
        ball.drop_ball();
        self.balls.push(ball);
        self.drops_this_round += 1;
        if self.phase != GamePhase::Aiming {
            self.phase = GamePhase::Dropping;
        }

        log::debug!(
            "Ball {} dropped at x={:.1} ({}/{})",
            id,
            x,
            self.drops_this_round,
            self.config.rules.max_drops_per_round
        );
        self.emit(GameEvent::BallDropped { ball_id: id, x });
        Some(id)
    }

    /// Book a landing: score, counters, win flag, round completion
    pub(crate) fn record_landing(&mut self, ball_id: u32, slot: usize) {
        let Some(value) = self.slots.get(slot).map(|s| s.value) else {
            return;
        };

        self.score += value as u64;
        self.landed_this_round += 1;
        if let Some(total) = self.slot_totals.get_mut(slot) {
            *total += 1;
        }
        self.slots[slot].trigger_win();

        log::debug!("Ball {} landed in slot {} (+{})", ball_id, slot, value);
        self.emit(GameEvent::BallLanded {
            ball_id,
            slot,
            value,
        });

        if self.landed_this_round >= self.config.rules.max_drops_per_round {
            self.complete_round();
        }
    }

    fn complete_round(&mut self) {
        self.allow_dropping = false;
        self.phase = GamePhase::Scoring;
        self.preview = None;

        log::info!("Round {} complete, score {}", self.round + 1, self.score);
        self.emit(GameEvent::RoundComplete { round: self.round });

        if self.is_final_round() {
            if let Some(winner) = winning_slot(&self.slot_totals) {
                self.last_winner = Some(winner);
                log::info!("Game complete: slot {} wins, score {}", winner, self.score);
                self.emit(GameEvent::GameComplete {
                    winner,
                    score: self.score,
                });
            }
        }
    }

    pub fn is_final_round(&self) -> bool {
        self.round + 1 >= self.config.rules.rounds
    }

    /// Return to `Idle` once nothing is in flight
    pub(crate) fn update_phase(&mut self) {
        if self.phase == GamePhase::Dropping && self.falling_count() == 0 {
            self.phase = GamePhase::Idle;
        }
    }

    /// Leave `Scoring`: next round, or a fresh game after the final one
    pub fn acknowledge_round(&mut self) -> bool {
        if self.phase != GamePhase::Scoring {
            return false;
        }
        if self.is_final_round() {
            self.reset_game();
        } else {
            self.round += 1;
            self.reset_round();
            log::info!("Round {} started", self.round + 1);
        }
        true
    }

    /// Discard every ball and per-round state. Score and slot totals survive.
    pub fn reset_round(&mut self) {
        self.balls.clear();
        self.preview = None;
        for slot in &mut self.slots {
            slot.reset();
        }
        for peg in &mut self.pegs {
            peg.reset_hit();
        }
        self.drops_this_round = 0;
        self.landed_this_round = 0;
        self.allow_dropping = true;
        self.phase = GamePhase::Idle;
    }

    /// Fresh game: round state plus score, round index and totals
    pub fn reset_game(&mut self) {
        self.reset_round();
        self.score = 0;
        self.round = 0;
        self.slot_totals.iter_mut().for_each(|t| *t = 0);
    }

    /// Swap in a new peg/slot layout.
    ///
    /// Balls in flight are discarded. On error nothing changes.
    pub fn apply_level(&mut self, level: &Level) -> Result<(), LevelError> {
        level.validate(&self.board, &self.config)?;

        let values = level.slot_values(&self.config.slots.values);
        let slots_changed = values.len() != self.slots.len()
            || values.iter().zip(&self.slots).any(|(v, s)| *v != s.value);

        self.board = Board::new(&self.config.board, self.config.slots.height);
        self.pegs = level.build_pegs(self.config.peg_radius);
        if level.orange_pegs > 0 {
            assign_orange_pegs(&mut self.pegs, level.orange_pegs, self.rng.as_mut());
        }
        self.slots = layout_slots(&self.board, &values, self.config.slots.height);
        self.dividers = layout_dividers(&self.slots, self.config.slots.divider_width);
        if slots_changed {
            self.slot_totals = vec![0; self.slots.len()];
        }
        self.reset_round();

        log::info!(
            "Level '{}' applied: {} pegs, {} slots",
            level.name,
            self.pegs.len(),
            self.slots.len()
        );
        self.emit(GameEvent::GeometryChanged);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::events::EventLog;
    use crate::sim::rng::FixedJitter;

    fn state() -> (GameState, EventLog) {
        let log = EventLog::new();
        let state = GameState::with_jitter(GameConfig::default(), Box::new(FixedJitter::NONE))
            .unwrap()
            .with_observer(Box::new(log.clone()));
        (state, log)
    }

    #[test]
    fn test_ball_lifecycle() {
        let mut ball = Ball::new(1, Vec2::new(10.0, 10.0), 5.0);
        assert_eq!(ball.state, BallState::Pending);
        assert!(!ball.is_active());

        // Landing requires falling first
        ball.land(2);
        assert_eq!(ball.state, BallState::Pending);

        ball.drop_ball();
        assert!(ball.is_active());
        ball.vel = Vec2::new(1.0, 2.0);
        ball.land(2);
        assert!(ball.is_landed());
        assert!(!ball.is_active());
        assert_eq!(ball.landed_slot(), Some(2));
        assert_eq!(ball.vel, Vec2::ZERO);

        // Terminal
        ball.drop_ball();
        assert!(ball.is_landed());
    }

    #[test]
    fn test_trail_capped() {
        let mut ball = Ball::new(1, Vec2::ZERO, 5.0);
        for i in 0..30 {
            ball.pos = Vec2::new(i as f32, 0.0);
            ball.record_trail();
        }
        assert_eq!(ball.trail.len(), TRAIL_LENGTH);
        assert_eq!(ball.trail[0], Vec2::new(29.0, 0.0));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = GameConfig::default();
        config.ball_radius = 0.0;
        assert!(GameState::new(config, 1).is_err());
    }

    #[test]
    fn test_aim_and_release() {
        let (mut state, log) = state();
        assert_eq!(state.phase, GamePhase::Idle);

        // Outside the drop zone does nothing
        assert!(!state.pointer_down(300.0, 500.0));
        assert_eq!(state.phase, GamePhase::Idle);

        assert!(state.pointer_down(300.0, 40.0));
        assert_eq!(state.phase, GamePhase::Aiming);
        assert!(state.preview.is_some());

        // Preview is clamped clear of the chevrons
        state.pointer_move(-100.0);
        let (min, _) = state
            .board
            .safe_drop_range(state.config().ball_radius, state.config().rules.drop_clearance);
        assert_eq!(state.preview.as_ref().unwrap().pos.x, min);

        let id = state.pointer_up().unwrap();
        assert_eq!(state.phase, GamePhase::Dropping);
        assert!(state.preview.is_none());
        assert_eq!(state.drops_this_round, 1);
        assert_eq!(state.balls[0].id, id);
        assert_eq!(state.balls[0].pos.x, min);
        assert!(state.balls[0].is_active());
        assert_eq!(log.drain(), vec![GameEvent::BallDropped { ball_id: id, x: min }]);
    }

    #[test]
    fn test_drop_limit() {
        let (mut state, log) = state();
        for _ in 0..5 {
            assert!(state.drop_at(300.0).is_some());
        }
        log.drain();
        assert!(!state.can_drop());
        assert_eq!(state.drop_at(300.0), None);
        assert_eq!(state.balls.len(), 5);
        assert_eq!(state.drops_this_round, 5);
        assert_eq!(
            log.drain(),
            vec![GameEvent::DropRejected(DropRejection::LimitReached)]
        );
        assert!(!state.pointer_down(300.0, 40.0));
    }

    #[test]
    fn test_drop_rejects_nan() {
        let (mut state, log) = state();
        assert_eq!(state.drop_at(f32::NAN), None);
        assert!(state.balls.is_empty());
        assert_eq!(state.drops_this_round, 0);
        assert_eq!(
            log.drain(),
            vec![GameEvent::DropRejected(DropRejection::InvalidPosition)]
        );
    }

    #[test]
    fn test_landing_bookkeeping() {
        let (mut state, log) = state();
        let id = state.drop_at(300.0).unwrap();
        state.balls[0].land(4);
        state.record_landing(id, 4);

        assert_eq!(state.score, state.slots[4].value as u64);
        assert_eq!(state.landed_this_round, 1);
        assert_eq!(state.slot_totals[4], 1);
        assert!(state.slots[4].winning);
        assert!(log.snapshot().contains(&GameEvent::BallLanded {
            ball_id: id,
            slot: 4,
            value: state.slots[4].value,
        }));

        state.update_phase();
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_round_completion_and_rejection() {
        let (mut state, log) = state();
        for i in 0..5 {
            let id = state.drop_at(300.0).unwrap();
            state.balls[i].land(i);
            state.record_landing(id, i);
        }

        assert!(!state.allow_dropping);
        assert_eq!(state.phase, GamePhase::Scoring);
        assert!(log.snapshot().contains(&GameEvent::RoundComplete { round: 0 }));

        // Sixth drop before acknowledgement: nothing changes
        assert_eq!(state.drop_at(300.0), None);
        assert_eq!(state.balls.len(), 5);
        assert_eq!(state.drops_this_round, 5);
        assert_eq!(state.landed_this_round, 5);

        assert!(state.acknowledge_round());
        assert_eq!(state.round, 1);
        assert_eq!(state.phase, GamePhase::Idle);
        assert!(state.allow_dropping);
        assert!(state.balls.is_empty());
        // Score carries across rounds
        assert!(state.score > 0);
        assert_eq!(state.slot_totals.iter().sum::<u32>(), 5);
    }

    #[test]
    fn test_final_round_picks_winner_and_resets() {
        let (mut state, log) = state();
        let rounds = state.config().rules.rounds;
        for round in 0..rounds {
            for i in 0..5 {
                let id = state.drop_at(300.0).unwrap();
                // Slot 6 gets one landing per round, slots 2 and 3 get two
                let slot = match (round, i) {
                    (_, 0) => 6,
                    (_, 1) | (_, 2) => 2,
                    _ => 3,
                };
                let idx = state.balls.len() - 1;
                state.balls[idx].land(slot);
                state.record_landing(id, slot);
            }
            if round + 1 < rounds {
                assert!(state.acknowledge_round());
            }
        }

        // 2 and 3 tie on landings, lowest index wins
        assert_eq!(state.last_winner, Some(2));
        let events = log.snapshot();
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameComplete { winner: 2, .. })));

        assert!(state.acknowledge_round());
        assert_eq!(state.score, 0);
        assert_eq!(state.round, 0);
        assert!(state.slot_totals.iter().all(|&t| t == 0));
        assert_eq!(state.phase, GamePhase::Idle);
    }

    #[test]
    fn test_reset_round_idempotent() {
        let (mut state, _) = state();
        state.drop_at(200.0);
        state.drop_at(300.0);
        state.pegs[0].strike(1.0);
        state.slots[1].trigger_win();
        state.score = 40;

        state.reset_round();
        let once = (
            state.balls.len(),
            state.drops_this_round,
            state.landed_this_round,
            state.allow_dropping,
            state.phase,
            state.score,
            state.slots.iter().any(|s| s.winning),
            state.pegs.iter().any(|p| p.is_hit),
        );
        state.reset_round();
        let twice = (
            state.balls.len(),
            state.drops_this_round,
            state.landed_this_round,
            state.allow_dropping,
            state.phase,
            state.score,
            state.slots.iter().any(|s| s.winning),
            state.pegs.iter().any(|p| p.is_hit),
        );
        assert_eq!(once, twice);
        assert_eq!(once, (0, 0, 0, true, GamePhase::Idle, 40, false, false));
    }

    #[test]
    fn test_winning_slot_ties() {
        assert_eq!(winning_slot(&[1, 3, 3, 0]), Some(1));
        assert_eq!(winning_slot(&[0, 0]), Some(0));
        assert_eq!(winning_slot(&[]), None);
    }

    #[test]
    fn test_acknowledge_outside_scoring() {
        let (mut state, _) = state();
        assert!(!state.acknowledge_round());
        assert_eq!(state.round, 0);
    }
}
