//! Fixed timestep simulation tick
//!
//! Core game loop that advances simulation deterministically.

use super::board::Board;
use super::collision::{
    resolve_divider, resolve_peg, resolve_segment, resolve_walls, settle_in_slot,
};
use super::events::GameEvent;
use super::peg::Peg;
use super::rng::JitterSource;
use super::slot::{Slot, SlotDivider};
use super::state::{Ball, GameState};
use super::vector::limit;
use crate::config::LandingConfig;
use crate::tuning::PhysicsParams;

/// Pointer commands from the input collaborator
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerInput {
    Down { x: f32, y: f32 },
    Move { x: f32 },
    Up,
}

/// Input commands applied before the next step
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub pointer: Option<PointerInput>,
    /// Drop directly at this x (already clamped by the caller)
    pub drop_x: Option<f32>,
    /// Leave the scoring phase
    pub acknowledge: bool,
    /// Discard the current round
    pub reset_round: bool,
}

/// Fixed timestep accumulator.
/// Ensures physics runs at a consistent rate regardless of frame time.
#[derive(Debug, Clone)]
pub struct FixedTimestep {
    /// The fixed delta time per tick.
    dt: f32,
    /// Accumulated time from variable frame deltas.
    accumulator: f32,
    max_substeps: u32,
}

impl FixedTimestep {
    pub fn new(dt: f32, max_substeps: u32) -> Self {
        Self {
            dt,
            accumulator: 0.0,
            max_substeps: max_substeps.max(1),
        }
    }

    /// Add frame time to the accumulator. Returns the number of fixed steps to run.
    pub fn accumulate(&mut self, frame_dt: f32) -> u32 {
        if frame_dt.is_finite() && frame_dt > 0.0 {
            self.accumulator += frame_dt;
        }
        // Cap to prevent spiral of death
        self.accumulator = self.accumulator.min(self.dt * self.max_substeps as f32);
        let steps = (self.accumulator / self.dt) as u32;
        self.accumulator -= steps as f32 * self.dt;
        steps
    }

    /// Interpolation alpha for rendering between ticks (0.0 to 1.0).
    pub fn alpha(&self) -> f32 {
        self.accumulator / self.dt
    }

    /// Drop leftover time (after a reset or a long pause)
    pub fn reset(&mut self) {
        self.accumulator = 0.0;
    }
}

/// Static geometry and tunables one ball step needs
struct StepContext<'a> {
    params: PhysicsParams,
    landing: LandingConfig,
    board: &'a Board,
    pegs: &'a mut [Peg],
    slots: &'a [Slot],
    dividers: &'a [SlotDivider],
    rng: &'a mut dyn JitterSource,
    now: f64,
    peg_hits: Vec<usize>,
}

/// Integrate one ball and run its collision passes.
/// Returns the slot index once the ball has settled in one.
fn step_ball(ball: &mut Ball, ctx: &mut StepContext) -> Option<usize> {
    let p = &ctx.params;

    ball.vel.y += p.gravity;
    ball.vel *= p.friction;
    ball.vel = limit(ball.vel, p.max_velocity);
    ball.pos += ball.vel;

    for (i, peg) in ctx.pegs.iter_mut().enumerate() {
        if resolve_peg(ball, peg, p, ctx.rng, ctx.now) {
            ctx.peg_hits.push(i);
        }
    }

    for segment in &ctx.board.segments {
        resolve_segment(ball, segment, p, ctx.rng);
    }
    for divider in ctx.dividers {
        resolve_divider(ball, divider, p, ctx.rng);
    }
    // Walls last so the ball always ends the step inside the board
    resolve_walls(ball, ctx.board, p.wall_restitution);

    settle_in_slot(ball, ctx.board.floor_y(), ctx.slots, &ctx.landing)
}

/// Advance every falling ball by one fixed step
pub fn step(state: &mut GameState) {
    let params = state.params();
    let landing = state.config().landing;
    state.time_ticks += 1;
    let now = state.sim_time();

    let mut landed: Vec<(u32, usize)> = Vec::new();
    let peg_hits = {
        let GameState {
            board,
            pegs,
            slots,
            dividers,
            balls,
            rng,
            ..
        } = state;

        let mut ctx = StepContext {
            params,
            landing,
            board,
            pegs,
            slots,
            dividers,
            rng: rng.as_mut(),
            now,
            peg_hits: Vec::new(),
        };

        for ball in balls.iter_mut().filter(|b| b.is_active()) {
            if let Some(slot) = step_ball(ball, &mut ctx) {
                ball.land(slot);
                landed.push((ball.id, slot));
            }
            ball.record_trail();
        }
        ctx.peg_hits
    };

    for peg in peg_hits {
        state.emit(GameEvent::PegHit { peg });
    }
    for (ball_id, slot) in landed {
        state.record_landing(ball_id, slot);
    }
    state.update_phase();
}

/// Apply one frame's commands to the session
pub fn apply_input(state: &mut GameState, input: &TickInput) {
    if input.reset_round {
        state.reset_round();
    }
    if input.acknowledge {
        state.acknowledge_round();
    }
    match input.pointer {
        Some(PointerInput::Down { x, y }) => {
            state.pointer_down(x, y);
        }
        Some(PointerInput::Move { x }) => state.pointer_move(x),
        Some(PointerInput::Up) => {
            state.pointer_up();
        }
        None => {}
    }
    if let Some(x) = input.drop_x {
        state.drop_at(x);
    }
}

/// Apply input, then advance the game state by one fixed timestep
pub fn tick(state: &mut GameState, input: &TickInput) {
    apply_input(state, input);
    step(state);
}

/// Frame driver: apply input once, then run as many fixed steps as the
/// elapsed time allows. Returns the number of steps taken.
pub fn advance(
    state: &mut GameState,
    clock: &mut FixedTimestep,
    frame_dt: f32,
    input: &TickInput,
) -> u32 {
    apply_input(state, input);
    let steps = clock.accumulate(frame_dt);
    for _ in 0..steps {
        step(state);
    }
    steps
}
