//! Peg Drop entry point
//!
//! The browser build starts from `web::start`. Natively this plays one full
//! game headless and logs the result, which is handy for checking tuning.
//!
//! Usage: `peg-drop [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Peg Drop (native) starting...");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let config = match args.next() {
        Some(path) => match load_config(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load config {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => peg_drop::GameConfig::default(),
    };

    if let Err(e) = headless::play(config, seed) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn load_config(path: &str) -> Result<peg_drop::GameConfig, Box<dyn std::error::Error>> {
    let json = std::fs::read_to_string(path)?;
    Ok(peg_drop::GameConfig::from_json(&json)?)
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is web::start, this is just to satisfy the compiler
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use peg_drop::sim::{
        EventLog, FixedTimestep, GameEvent, GamePhase, GameState, TickInput, advance,
    };
    use peg_drop::{ConfigError, GameConfig, HighScores};

    /// Frames before a round is declared stuck
    const MAX_FRAMES_PER_ROUND: u32 = 60 * 120;

    pub fn play(config: GameConfig, seed: u64) -> Result<(), ConfigError> {
        let mut clock = FixedTimestep::new(config.physics.timestep, config.physics.max_substeps);
        let frame_dt = config.physics.timestep;
        let rounds = config.rules.rounds;
        let drops = config.rules.max_drops_per_round;

        let events = EventLog::new();
        let mut state = GameState::new(config, seed)?.with_observer(Box::new(events.clone()));
        // Aim with a separate stream so drop positions don't shift the jitter
        let mut aim = Pcg32::seed_from_u64(seed ^ 0x5EED);
        let mut high_scores = HighScores::load();

        log::info!("Seed {}: {} rounds of {} drops", seed, rounds, drops);

        for round in 0..rounds {
            let (min, max) = state
                .board
                .safe_drop_range(state.config().ball_radius, state.config().rules.drop_clearance);
            for _ in 0..drops {
                let input = TickInput {
                    drop_x: Some(aim.random_range(min..=max)),
                    ..Default::default()
                };
                advance(&mut state, &mut clock, frame_dt, &input);
            }

            let mut frames = 0;
            while state.phase != GamePhase::Scoring && frames < MAX_FRAMES_PER_ROUND {
                advance(&mut state, &mut clock, frame_dt, &TickInput::default());
                frames += 1;
            }
            if state.phase != GamePhase::Scoring {
                log::warn!(
                    "Round {} stuck with {} balls falling",
                    round + 1,
                    state.falling_count()
                );
                return Ok(());
            }

            let mut peg_hits = 0;
            for event in events.drain() {
                match event {
                    GameEvent::PegHit { .. } => peg_hits += 1,
                    GameEvent::BallLanded { ball_id, slot, value } => {
                        log::info!("  ball {} -> slot {} (+{})", ball_id, slot, value);
                    }
                    GameEvent::GameComplete { winner, score } => {
                        log::info!("Winner: slot {} with score {}", winner, score);
                        if let Some(rank) = high_scores.add_score(score, winner, rounds, now_ms()) {
                            log::info!("High score rank #{}", rank);
                            high_scores.save();
                        }
                    }
                    _ => {}
                }
            }
            log::info!(
                "Round {} done in {} frames, {} peg hits, score {}",
                round + 1,
                frames,
                peg_hits,
                state.score
            );
            log::info!("Slot totals: {:?}", state.slot_totals);

            if round + 1 < rounds {
                state.acknowledge_round();
            }
        }

        Ok(())
    }

    fn now_ms() -> f64 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_secs_f64() * 1000.0)
            .unwrap_or(0.0)
    }
}
