//! Live physics tuning
//!
//! Overrides layered on top of the immutable [`PhysicsConfig`]. The
//! simulation merges them once per step, so changes apply on the next tick
//! without restarting. Persisted separately in LocalStorage on the web.

use serde::{Deserialize, Serialize};

use crate::config::PhysicsConfig;

/// Effective physics values for one step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsParams {
    pub gravity: f32,
    pub friction: f32,
    pub peg_restitution: f32,
    pub wall_restitution: f32,
    pub max_velocity: f32,
    pub peg_jitter_angle: f32,
    pub bounce_jitter: f32,
}

/// Highest restitution a live override may set; bounces must lose energy
const MAX_RESTITUTION: f32 = 0.99;

/// Optional runtime overrides (None = use the base config)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub gravity: Option<f32>,
    pub friction: Option<f32>,
    pub max_velocity: Option<f32>,
    pub peg_restitution: Option<f32>,
    pub wall_restitution: Option<f32>,
    pub peg_jitter_angle: Option<f32>,
    pub bounce_jitter: Option<f32>,
}

impl Tuning {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Drop every override
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// LocalStorage key
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "peg_drop_tuning";

    /// Load tuning from LocalStorage (WASM only), defaults on any failure
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                if let Ok(tuning) = serde_json::from_str(&json) {
                    log::info!("Loaded tuning from LocalStorage");
                    return tuning;
                }
            }
        }

        log::info!("Using default tuning");
        Self::default()
    }

    /// Save tuning to LocalStorage (WASM only), failures are ignored
    #[cfg(target_arch = "wasm32")]
    pub fn save(&self) {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if self.is_empty() {
                let _ = storage.remove_item(Self::STORAGE_KEY);
                log::info!("Tuning cleared");
            } else if let Ok(json) = serde_json::to_string(self) {
                let _ = storage.set_item(Self::STORAGE_KEY, &json);
                log::info!("Tuning saved");
            }
        }
    }

    /// Native stubs
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn save(&self) {
        // No-op for native
    }
}

impl PhysicsConfig {
    /// Merge live overrides into the base values.
    ///
    /// Overrides that are not finite are ignored; the rest are clamped so
    /// restitution stays below 1 and speeds stay positive.
    pub fn resolve(&self, tuning: &Tuning) -> PhysicsParams {
        fn pick(base: f32, over: Option<f32>, min: f32, max: f32) -> f32 {
            match over {
                Some(v) if v.is_finite() => v.clamp(min, max),
                _ => base,
            }
        }

        PhysicsParams {
            gravity: pick(self.gravity, tuning.gravity, 0.0, f32::MAX),
            friction: pick(self.friction, tuning.friction, 0.0, 1.0),
            peg_restitution: pick(
                self.peg_restitution,
                tuning.peg_restitution,
                0.0,
                MAX_RESTITUTION,
            ),
            wall_restitution: pick(
                self.wall_restitution,
                tuning.wall_restitution,
                0.0,
                MAX_RESTITUTION,
            ),
            max_velocity: pick(self.max_velocity, tuning.max_velocity, 0.01, f32::MAX),
            peg_jitter_angle: pick(
                self.peg_jitter_angle,
                tuning.peg_jitter_angle,
                0.0,
                std::f32::consts::FRAC_PI_2,
            ),
            bounce_jitter: pick(self.bounce_jitter, tuning.bounce_jitter, 0.0, f32::MAX),
        }
    }
}
