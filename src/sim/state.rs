//! Session state and core simulation types

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::target::Target;
use crate::accuracy_percent;
use crate::consts::*;

/// Current phase of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SessionPhase {
    /// Constructed, never started
    #[default]
    Idle,
    /// Countdown running, targets spawning
    Running,
    /// Countdown reached zero or the session was stopped
    Ended,
}

/// Things that happened since the shell last drained the queue
#[derive(Debug, Clone, PartialEq)]
pub enum GameEvent {
    Started,
    Spawned { id: u32 },
    /// Target timed out unhit
    Expired { id: u32 },
    Hit { id: u32, points: u64, combo: u32 },
    Miss,
    /// Countdown reached zero; carries the one and only final snapshot
    Ended(FinalStats),
}

/// Read-only projection for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LiveStats {
    pub score: u64,
    pub time_left: u32,
    /// Percent (0-100)
    pub accuracy: f64,
    pub combo: u32,
}

/// Immutable end-of-session summary
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FinalStats {
    pub score: u64,
    /// Percent (0-100)
    pub accuracy: f64,
    pub max_combo: u32,
    pub hits: u32,
    pub total_clicks: u32,
}

/// All mutable session data. Owned by a single [`super::Session`].
#[derive(Debug, Clone)]
pub struct SessionState {
    pub phase: SessionPhase,
    /// Live targets in spawn order (oldest first)
    pub targets: Vec<Target>,
    pub score: u64,
    pub hits: u32,
    pub total_clicks: u32,
    pub combo: u32,
    pub max_combo: u32,
    /// Whole seconds remaining
    pub time_left: u32,
    /// Current ms between spawns
    pub spawn_rate: f64,
    /// Current difficulty multiplier
    pub difficulty: f64,
    /// Time of the last spawn (ms)
    pub last_spawn_ms: f64,
    /// Logical play surface size
    pub surface: Vec2,
    /// Session length the countdown starts from
    pub session_secs: u32,
    rng: Pcg32,
    next_id: u32,
}

impl SessionState {
    pub fn new(seed: u64, surface: Vec2) -> Self {
        Self {
            phase: SessionPhase::Idle,
            targets: Vec::new(),
            score: 0,
            hits: 0,
            total_clicks: 0,
            combo: 0,
            max_combo: 0,
            time_left: SESSION_SECS,
            spawn_rate: BASE_SPAWN_MS,
            difficulty: 1.0,
            last_spawn_ms: 0.0,
            surface,
            session_secs: SESSION_SECS,
            rng: Pcg32::seed_from_u64(seed),
            next_id: 1,
        }
    }

    /// Reset every per-session field. The RNG stream and surface carry over.
    pub fn reset(&mut self, now_ms: f64) {
        self.phase = SessionPhase::Running;
        self.targets.clear();
        self.score = 0;
        self.hits = 0;
        self.total_clicks = 0;
        self.combo = 0;
        self.max_combo = 0;
        self.time_left = self.session_secs;
        self.spawn_rate = BASE_SPAWN_MS;
        self.difficulty = 1.0;
        self.last_spawn_ms = now_ms;
        self.next_id = 1;
    }

    /// Allocate a new target ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn rng(&mut self) -> &mut Pcg32 {
        &mut self.rng
    }

    pub fn is_running(&self) -> bool {
        self.phase == SessionPhase::Running
    }

    /// Accuracy in percent
    pub fn accuracy(&self) -> f64 {
        accuracy_percent(self.hits, self.total_clicks)
    }

    pub fn live_stats(&self) -> LiveStats {
        LiveStats {
            score: self.score,
            time_left: self.time_left,
            accuracy: self.accuracy(),
            combo: self.combo,
        }
    }

    pub fn final_stats(&self) -> FinalStats {
        FinalStats {
            score: self.score,
            accuracy: self.accuracy(),
            max_combo: self.max_combo,
            hits: self.hits,
            total_clicks: self.total_clicks,
        }
    }
}
