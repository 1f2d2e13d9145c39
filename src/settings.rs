//! Game settings and preferences
//!
//! Persisted separately from high scores.

use serde::{Deserialize, Serialize};

use crate::consts::SESSION_SECS;
use crate::platform::KeyValueStore;

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // === Audio ===
    /// Play hit/miss/start/end tones
    pub sound_enabled: bool,
    /// Master volume (0.0 - 1.0)
    pub master_volume: f32,
    /// Sound effects volume (0.0 - 1.0)
    pub sfx_volume: f32,

    // === Gameplay ===
    /// Session length in seconds
    pub session_secs: u32,

    // === HUD ===
    /// Show FPS counter
    pub show_fps: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            // Sound starts off until the player opts in
            sound_enabled: false,
            master_volume: 0.8,
            sfx_volume: 1.0,

            session_secs: SESSION_SECS,

            show_fps: false,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "aim_trainer_settings";

    /// Flip the sound toggle, returning the new state
    pub fn toggle_sound(&mut self) -> bool {
        self.sound_enabled = !self.sound_enabled;
        self.sound_enabled
    }

    /// Effective SFX gain (0 when muted)
    pub fn effective_volume(&self) -> f32 {
        if self.sound_enabled {
            (self.master_volume * self.sfx_volume).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Session length, never zero
    pub fn effective_session_secs(&self) -> u32 {
        self.session_secs.max(1)
    }

    /// Load settings; anything missing or unreadable falls back to defaults
    pub fn load<S: KeyValueStore>(store: &S) -> Self {
        match store.load_json::<Settings>(Self::STORAGE_KEY) {
            Ok(Some(settings)) => {
                log::info!("Loaded settings");
                settings
            }
            Ok(None) => {
                log::info!("Using default settings");
                Self::default()
            }
            Err(e) => {
                log::warn!("Ignoring unreadable settings: {e}");
                Self::default()
            }
        }
    }

    pub fn save<S: KeyValueStore>(&self, store: &S) {
        match store.save_json(Self::STORAGE_KEY, self) {
            Ok(()) => log::info!("Settings saved"),
            Err(e) => log::error!("Error saving settings: {e}"),
        }
    }
}
