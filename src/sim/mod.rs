//! Deterministic session engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time is passed in by the caller (ms), never read from a clock
//! - Seeded RNG only
//! - Stable iteration order (targets kept in spawn order)
//! - No rendering or platform dependencies

pub mod countdown;
pub mod difficulty;
pub mod state;
pub mod target;
pub mod tick;

#[cfg(not(target_arch = "wasm32"))]
pub use countdown::Countdown;
pub use countdown::SharedSession;
pub use difficulty::{DifficultyInputs, difficulty_multiplier, spawn_rate_ms};
pub use state::{FinalStats, GameEvent, LiveStats, SessionPhase, SessionState};
pub use target::Target;
pub use tick::Session;
