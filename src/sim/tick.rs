//! Session engine
//!
//! Per-frame spawn/expire cycle, click hit-testing and the one-second
//! countdown. Every mutation of [`SessionState`] goes through [`Session`].

use glam::Vec2;
use rand::Rng;

use super::difficulty::{DifficultyInputs, difficulty_multiplier, spawn_rate_ms};
use super::state::{FinalStats, GameEvent, LiveStats, SessionPhase, SessionState};
use super::target::Target;
use crate::consts::*;

/// Points awarded for a hit that brings the streak to `combo`
pub fn points_for_combo(combo: u32) -> u64 {
    let multiplier = 1.0 + (combo.max(1) - 1) as f64 * COMBO_STEP;
    (HIT_POINTS * multiplier).floor() as u64
}

/// Uniform random point inside `surface`, inset by [`SPAWN_PADDING`]
pub fn spawn_position<R: Rng>(rng: &mut R, surface: Vec2) -> Vec2 {
    let x = padded_axis(rng, surface.x);
    let y = padded_axis(rng, surface.y);
    Vec2::new(x, y)
}

fn padded_axis<R: Rng>(rng: &mut R, extent: f32) -> f32 {
    let span = extent - SPAWN_PADDING * 2.0;
    if span > 0.0 {
        SPAWN_PADDING + rng.random::<f32>() * span
    } else {
        // Surface too small for the padding; fall back to the middle
        extent.max(0.0) / 2.0
    }
}

/// One timed play session
#[derive(Debug, Clone)]
pub struct Session {
    state: SessionState,
    events: Vec<GameEvent>,
}

impl Session {
    /// Create an idle session on a play surface of the given logical size
    pub fn new(seed: u64, surface: Vec2) -> Self {
        Self {
            state: SessionState::new(seed, surface),
            events: Vec::new(),
        }
    }

    /// Override the session length (takes effect on the next start)
    pub fn with_duration(mut self, secs: u32) -> Self {
        self.state.session_secs = secs;
        self.state.time_left = secs;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn phase(&self) -> SessionPhase {
        self.state.phase
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn targets(&self) -> &[Target] {
        &self.state.targets
    }

    /// Update the logical surface size (on canvas resize)
    pub fn set_surface(&mut self, surface: Vec2) {
        self.state.surface = surface;
    }

    /// Begin a fresh session. Valid from any phase.
    pub fn start(&mut self, now_ms: f64) {
        self.state.reset(now_ms);
        self.events.clear();
        self.events.push(GameEvent::Started);
        log::debug!(
            "Session started ({}s, surface {}x{})",
            self.state.session_secs,
            self.state.surface.x,
            self.state.surface.y
        );
    }

    /// Abandon a running session without producing final stats.
    /// Returns true if a running session was stopped.
    pub fn stop(&mut self) -> bool {
        if !self.state.is_running() {
            return false;
        }
        self.state.phase = SessionPhase::Ended;
        self.state.targets.clear();
        log::debug!("Session stopped with {}s left", self.state.time_left);
        true
    }

    /// Advance one display frame: spawn if due, then age and evict targets
    pub fn frame(&mut self, now_ms: f64) {
        if !self.state.is_running() {
            return;
        }

        if now_ms - self.state.last_spawn_ms > self.state.spawn_rate {
            self.spawn_target(now_ms);
            self.state.last_spawn_ms = now_ms;
        }

        let events = &mut self.events;
        self.state.targets.retain_mut(|target| {
            let alive = target.update(now_ms);
            if !alive {
                events.push(GameEvent::Expired { id: target.id });
            }
            alive
        });
    }

    fn spawn_target(&mut self, now_ms: f64) {
        let surface = self.state.surface;
        let pos = spawn_position(self.state.rng(), surface);
        let id = self.state.next_entity_id();
        let mut target = Target::new(id, pos, now_ms);
        target.update(now_ms);
        self.state.targets.push(target);
        self.events.push(GameEvent::Spawned { id });
    }

    /// Hit-test a click in surface coordinates. Returns true on a hit.
    ///
    /// Newest targets are tested first so the one drawn on top wins when
    /// circles overlap. At most one target is credited per click.
    pub fn click(&mut self, point: Vec2) -> bool {
        if !self.state.is_running() {
            return false;
        }

        let state = &mut self.state;
        state.total_clicks += 1;

        let hit_index = state.targets.iter().rposition(|t| t.is_hit(point));
        let hit = match hit_index {
            Some(index) => {
                let target = state.targets.remove(index);
                state.hits += 1;
                state.combo += 1;
                state.max_combo = state.max_combo.max(state.combo);
                let points = points_for_combo(state.combo);
                state.score += points;
                self.events.push(GameEvent::Hit {
                    id: target.id,
                    points,
                    combo: state.combo,
                });
                true
            }
            None => {
                state.combo = 0;
                self.events.push(GameEvent::Miss);
                false
            }
        };

        self.update_difficulty();
        hit
    }

    fn update_difficulty(&mut self) {
        let state = &mut self.state;
        let inputs =
            DifficultyInputs::new(state.score, state.hits, state.total_clicks, state.combo);
        state.difficulty = difficulty_multiplier(&inputs);
        state.spawn_rate = spawn_rate_ms(state.difficulty);
    }

    /// One countdown second elapsed. Returns the final stats on the tick that
    /// ends the session, and `None` on every other call.
    pub fn tick_second(&mut self) -> Option<FinalStats> {
        if !self.state.is_running() {
            return None;
        }

        self.state.time_left = self.state.time_left.saturating_sub(1);
        if self.state.time_left > 0 {
            return None;
        }

        self.state.phase = SessionPhase::Ended;
        self.state.targets.clear();
        let stats = self.state.final_stats();
        self.events.push(GameEvent::Ended(stats));
        log::info!(
            "Session ended: score {} ({}/{} hits, max combo {})",
            stats.score,
            stats.hits,
            stats.total_clicks,
            stats.max_combo
        );
        Some(stats)
    }

    /// HUD projection; does not mutate anything
    pub fn live_stats(&self) -> LiveStats {
        self.state.live_stats()
    }

    /// Take all events queued since the last call
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}
