//! Aim Trainer - A reflex/aim training mini-game
//!
//! Core modules:
//! - `sim`: Deterministic session engine (targets, scoring, difficulty, countdown)
//! - `renderer`: WebGPU rendering pipeline
//! - `platform`: Browser/native platform abstraction (input, time, storage)
//! - `persistence`: Remote leaderboard submission/fetch
//! - `highscores`: Local top-10 score list

pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use highscores::{HighScoreEntry, HighScores};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Session length in seconds
    pub const SESSION_SECS: u32 = 30;
    /// Countdown tick interval (ms)
    pub const COUNTDOWN_INTERVAL_MS: u32 = 1000;

    /// Nominal target radius (surface units)
    pub const TARGET_RADIUS: f32 = 25.0;
    /// Time for a target to grow from 0 to full radius (ms)
    pub const TARGET_GROW_MS: f64 = 200.0;
    /// Target lifespan (ms)
    pub const TARGET_TTL_MS: f64 = 2000.0;
    /// Extra radius of the glow drawn around each target
    pub const TARGET_GLOW: f32 = 10.0;

    /// Keep targets this far from every surface edge
    pub const SPAWN_PADDING: f32 = 50.0;
    /// Spawn interval at difficulty 1.0 (ms)
    pub const BASE_SPAWN_MS: f64 = 1500.0;
    /// Spawn interval floor (ms)
    pub const MIN_SPAWN_MS: f64 = 300.0;

    /// Base points per hit before the combo bonus
    pub const HIT_POINTS: f64 = 100.0;
    /// Extra multiplier per combo step beyond the first hit
    pub const COMBO_STEP: f64 = 0.1;
}

/// Accuracy in percent (0 when nothing was clicked)
#[inline]
pub fn accuracy_percent(hits: u32, total_clicks: u32) -> f64 {
    if total_clicks == 0 {
        0.0
    } else {
        hits as f64 / total_clicks as f64 * 100.0
    }
}
