//! Browser bindings
//!
//! The page owns the canvas, the render loop and the input listeners; it
//! forwards pointer events and frame deltas here and reads positions back.

use wasm_bindgen::prelude::*;

use crate::config::GameConfig;
use crate::highscores::HighScores;
use crate::level::{Level, PegSpec};
use crate::sim::{EventLog, FixedTimestep, GameEvent, GamePhase, GameState, TickInput, advance};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    log::info!("Peg Drop starting...");
}

const MAX_PENDING_EVENTS: usize = 1024;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

/// One game session driven by the page
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    clock: FixedTimestep,
    events: EventLog,
    /// Events since the page last asked
    pending: Vec<GameEvent>,
    high_scores: HighScores,
}

#[wasm_bindgen]
impl WebGame {
    #[wasm_bindgen(constructor)]
    pub fn new(seed: f64) -> Result<WebGame, JsValue> {
        let config = GameConfig::default();
        let clock = FixedTimestep::new(config.physics.timestep, config.physics.max_substeps);
        let events = EventLog::new();
        let mut state = GameState::new(config, seed as u64)
            .map_err(to_js)?
            .with_observer(Box::new(events.clone()));
        state.tuning = Tuning::load();

        log::info!("Game initialized with seed: {}", seed as u64);
        Ok(Self {
            state,
            clock,
            events,
            pending: Vec::new(),
            high_scores: HighScores::load(),
        })
    }

    pub fn pointer_down(&mut self, x: f32, y: f32) -> bool {
        self.state.pointer_down(x, y)
    }

    pub fn pointer_move(&mut self, x: f32) {
        self.state.pointer_move(x);
    }

    /// Returns true if a ball was dropped
    pub fn pointer_up(&mut self) -> bool {
        let dropped = self.state.pointer_up().is_some();
        self.collect_events();
        dropped
    }

    /// Advance by a frame delta in seconds. Returns the fixed steps taken.
    pub fn frame(&mut self, dt: f32) -> u32 {
        let steps = advance(&mut self.state, &mut self.clock, dt, &TickInput::default());
        self.collect_events();
        steps
    }

    /// Fraction of a step left in the accumulator, for render interpolation
    pub fn alpha(&self) -> f32 {
        self.clock.alpha()
    }

    /// Flat `[x0, y0, x1, y1, ...]` for every dropped ball
    pub fn ball_positions(&self) -> Vec<f32> {
        self.state
            .balls
            .iter()
            .flat_map(|b| [b.pos.x, b.pos.y])
            .collect()
    }

    /// Aiming preview `[x, y]`, empty when not aiming
    pub fn preview_position(&self) -> Vec<f32> {
        self.state
            .preview
            .as_ref()
            .map(|b| vec![b.pos.x, b.pos.y])
            .unwrap_or_default()
    }

    pub fn score(&self) -> f64 {
        self.state.score as f64
    }

    pub fn round(&self) -> u32 {
        self.state.round
    }

    pub fn phase(&self) -> String {
        match self.state.phase {
            GamePhase::Idle => "idle",
            GamePhase::Aiming => "aiming",
            GamePhase::Dropping => "dropping",
            GamePhase::Scoring => "scoring",
        }
        .to_string()
    }

    /// Horizontal center of each slot, for labels and win effects
    pub fn slot_centers(&self) -> Vec<f32> {
        self.state.slots.iter().map(|s| s.center_x()).collect()
    }

    pub fn slot_totals(&self) -> Vec<u32> {
        self.state.slot_totals.clone()
    }

    pub fn top_score(&self) -> f64 {
        self.high_scores.top_score().unwrap_or(0) as f64
    }

    pub fn set_gravity(&mut self, gravity: f32) {
        self.state.tuning.gravity = Some(gravity);
        self.state.tuning.save();
    }

    pub fn set_max_velocity(&mut self, max_velocity: f32) {
        self.state.tuning.max_velocity = Some(max_velocity);
        self.state.tuning.save();
    }

    pub fn set_peg_restitution(&mut self, restitution: f32) {
        self.state.tuning.peg_restitution = Some(restitution);
        self.state.tuning.save();
    }

    pub fn reset_tuning(&mut self) {
        self.state.tuning.clear();
        self.state.tuning.save();
    }

    /// Replace the peg/slot layout from level JSON
    pub fn load_level(&mut self, json: &str) -> Result<(), JsValue> {
        let level = Level::from_json(json).map_err(to_js)?;
        self.state.apply_level(&level).map_err(to_js)?;
        self.clock.reset();
        self.collect_events();
        Ok(())
    }

    /// Current layout as level JSON
    pub fn export_level(&self) -> Result<String, JsValue> {
        let level = Level {
            name: "Exported".to_string(),
            pegs: self
                .state
                .pegs
                .iter()
                .map(|p| PegSpec {
                    x: p.pos.x,
                    y: p.pos.y,
                    radius: Some(p.radius),
                    kind: p.kind,
                })
                .collect(),
            slot_values: Some(self.state.slots.iter().map(|s| s.value).collect()),
            slot_count: None,
            orange_pegs: 0,
        };
        level.to_json().map_err(to_js)
    }

    /// Leave the scoring screen
    pub fn acknowledge(&mut self) -> bool {
        let acknowledged = self.state.acknowledge_round();
        if acknowledged {
            self.clock.reset();
        }
        acknowledged
    }

    pub fn reset_round(&mut self) {
        self.state.reset_round();
        self.clock.reset();
    }

    /// Events since the last call, as a JSON array
    pub fn take_events(&mut self) -> Result<String, JsValue> {
        let json = serde_json::to_string(&self.pending).map_err(to_js)?;
        self.pending.clear();
        Ok(json)
    }
}

impl WebGame {
    fn collect_events(&mut self) {
        for event in self.events.drain() {
            if let GameEvent::GameComplete { winner, score } = event {
                let rounds = self.state.config().rules.rounds;
                let now = js_sys::Date::now();
                if let Some(rank) = self.high_scores.add_score(score, winner, rounds, now) {
                    log::info!("New high score #{}: {}", rank, score);
                    self.high_scores.save();
                }
            }
            self.pending.push(event);
        }
        // Page stopped polling; keep the newest
        if self.pending.len() > MAX_PENDING_EVENTS {
            let excess = self.pending.len() - MAX_PENDING_EVENTS;
            self.pending.drain(..excess);
        }
    }
}
