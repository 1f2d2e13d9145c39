//! Audio system using Web Audio API
//!
//! Procedurally generated tones - no external files needed!

use crate::sim::GameEvent;

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundEffect {
    /// Target hit
    Hit,
    /// Click that hit nothing
    Miss,
    /// Session started
    Start,
    /// Countdown reached zero
    End,
    /// New local best
    HighScore,
}

/// Oscillator waveform
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wave {
    Sine,
    Square,
    Sawtooth,
    Triangle,
}

/// One enveloped oscillator note
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tone {
    pub freq: f32,
    /// Seconds
    pub duration: f64,
    pub wave: Wave,
    /// Seconds after the effect is triggered
    pub delay: f64,
}

/// Starting gain of every tone before volume scaling
pub const TONE_GAIN: f32 = 0.1;
/// Gain the envelope decays to
pub const TONE_FLOOR: f32 = 0.01;

impl SoundEffect {
    /// Notes making up the effect
    pub fn tones(self) -> Vec<Tone> {
        let note = |freq, duration, wave| Tone {
            freq,
            duration,
            wave,
            delay: 0.0,
        };
        match self {
            SoundEffect::Hit => vec![note(800.0, 0.1, Wave::Square)],
            SoundEffect::Miss => vec![note(200.0, 0.2, Wave::Sawtooth)],
            SoundEffect::Start => vec![note(600.0, 0.3, Wave::Sine)],
            SoundEffect::End => vec![note(400.0, 0.5, Wave::Triangle)],
            SoundEffect::HighScore => [500.0, 600.0, 800.0, 1000.0]
                .iter()
                .enumerate()
                .map(|(i, freq)| Tone {
                    delay: i as f64 * 0.08,
                    ..note(*freq, 0.25, Wave::Triangle)
                })
                .collect(),
        }
    }

    /// Effect to play for an engine event, if any
    pub fn for_event(event: &GameEvent) -> Option<Self> {
        match event {
            GameEvent::Started => Some(SoundEffect::Start),
            GameEvent::Hit { .. } => Some(SoundEffect::Hit),
            GameEvent::Miss => Some(SoundEffect::Miss),
            GameEvent::Ended(_) => Some(SoundEffect::End),
            GameEvent::Spawned { .. } | GameEvent::Expired { .. } => None,
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::AudioManager;

#[cfg(target_arch = "wasm32")]
mod web {
    use web_sys::{AudioContext, GainNode, OscillatorNode, OscillatorType};

    use super::{SoundEffect, TONE_FLOOR, TONE_GAIN, Tone, Wave};

    impl From<Wave> for OscillatorType {
        fn from(wave: Wave) -> Self {
            match wave {
                Wave::Sine => OscillatorType::Sine,
                Wave::Square => OscillatorType::Square,
                Wave::Sawtooth => OscillatorType::Sawtooth,
                Wave::Triangle => OscillatorType::Triangle,
            }
        }
    }

    /// Audio manager for the game
    pub struct AudioManager {
        ctx: Option<AudioContext>,
        volume: f32,
    }

    impl Default for AudioManager {
        fn default() -> Self {
            Self::new()
        }
    }

    impl AudioManager {
        pub fn new() -> Self {
            // Try to create audio context (may fail if not in secure context)
            let ctx = AudioContext::new().ok();
            if ctx.is_none() {
                log::warn!("Audio not supported - audio disabled");
            }
            Self { ctx, volume: 0.0 }
        }

        /// Set effective volume (0 mutes)
        pub fn set_volume(&mut self, vol: f32) {
            self.volume = vol.clamp(0.0, 1.0);
        }

        /// Play a sound effect
        pub fn play(&self, effect: SoundEffect) {
            if self.volume <= 0.0 {
                return;
            }

            let Some(ctx) = &self.ctx else { return };

            // Resume context if suspended (browsers require user gesture)
            if ctx.state() == web_sys::AudioContextState::Suspended {
                let _ = ctx.resume();
            }

            for tone in effect.tones() {
                if self.play_tone(ctx, &tone).is_none() {
                    log::debug!("Sound play failed: {:?}", effect);
                }
            }
        }

        /// Create an oscillator with gain envelope
        fn create_osc(
            &self,
            ctx: &AudioContext,
            freq: f32,
            osc_type: OscillatorType,
        ) -> Option<(OscillatorNode, GainNode)> {
            let osc = ctx.create_oscillator().ok()?;
            let gain = ctx.create_gain().ok()?;

            osc.set_type(osc_type);
            osc.frequency().set_value(freq);
            osc.connect_with_audio_node(&gain).ok()?;
            gain.connect_with_audio_node(&ctx.destination()).ok()?;

            Some((osc, gain))
        }

        fn play_tone(&self, ctx: &AudioContext, tone: &Tone) -> Option<()> {
            let (osc, gain) = self.create_osc(ctx, tone.freq, tone.wave.into())?;
            let t = ctx.current_time() + tone.delay;

            gain.gain()
                .set_value_at_time(TONE_GAIN * self.volume, t)
                .ok()?;
            gain.gain()
                .exponential_ramp_to_value_at_time(TONE_FLOOR * self.volume, t + tone.duration)
                .ok()?;

            osc.start_with_when(t).ok()?;
            osc.stop_with_when(t + tone.duration).ok()?;
            Some(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::FinalStats;

    #[test]
    fn test_effect_tones() {
        assert_eq!(
            SoundEffect::Hit.tones(),
            vec![Tone {
                freq: 800.0,
                duration: 0.1,
                wave: Wave::Square,
                delay: 0.0
            }]
        );
        assert_eq!(SoundEffect::Miss.tones()[0].wave, Wave::Sawtooth);
        assert_eq!(SoundEffect::End.tones()[0].duration, 0.5);
        let fanfare = SoundEffect::HighScore.tones();
        assert_eq!(fanfare.len(), 4);
        assert!(fanfare.windows(2).all(|w| w[0].delay < w[1].delay));
    }

    #[test]
    fn test_event_mapping() {
        assert_eq!(SoundEffect::for_event(&GameEvent::Miss), Some(SoundEffect::Miss));
        assert_eq!(
            SoundEffect::for_event(&GameEvent::Ended(FinalStats::default())),
            Some(SoundEffect::End)
        );
        assert_eq!(SoundEffect::for_event(&GameEvent::Spawned { id: 1 }), None);
    }
}
