//! Score persistence beyond the local top-10
//!
//! Features:
//! - Remote leaderboard (hosted REST `scores` table) submission and fetch
//! - Shared error type for storage and network failures
//!
//! Nothing here is fatal to gameplay: public entry points log and degrade.

pub mod error;
pub mod leaderboard;

pub use error::StoreError;
pub use leaderboard::{Leaderboard, LeaderboardConfig, RemoteScore};
