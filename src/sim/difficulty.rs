//! Adaptive spawn cadence
//!
//! Pure function of session statistics; re-evaluated after every click.

use crate::consts::{BASE_SPAWN_MS, MIN_SPAWN_MS};

/// Statistics the difficulty model reacts to
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DifficultyInputs {
    pub score: u64,
    /// Hit ratio in 0..=1 (0 when nothing was clicked)
    pub accuracy: f64,
    pub combo: u32,
}

impl DifficultyInputs {
    pub fn new(score: u64, hits: u32, total_clicks: u32, combo: u32) -> Self {
        let accuracy = if total_clicks > 0 {
            hits as f64 / total_clicks as f64
        } else {
            0.0
        };
        Self {
            score,
            accuracy,
            combo,
        }
    }
}

/// Difficulty multiplier (1.0 = easiest, 6.0 = hardest)
pub fn difficulty_multiplier(inputs: &DifficultyInputs) -> f64 {
    let mut multiplier = 1.0;

    // Score factor, capped at +2
    multiplier += (inputs.score as f64 / 1000.0).min(2.0);

    // Accuracy bonuses stack
    if inputs.accuracy > 0.7 {
        multiplier += 1.0;
    }
    if inputs.accuracy > 0.8 {
        multiplier += 0.5;
    }
    if inputs.accuracy > 0.9 {
        multiplier += 0.5;
    }

    // Combo factor, capped at +1
    multiplier += (inputs.combo as f64 / 10.0).min(1.0);

    multiplier
}

/// Milliseconds between spawns for a given multiplier
#[inline]
pub fn spawn_rate_ms(multiplier: f64) -> f64 {
    (BASE_SPAWN_MS / multiplier).max(MIN_SPAWN_MS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rate(score: u64, accuracy: f64, combo: u32) -> f64 {
        spawn_rate_ms(difficulty_multiplier(&DifficultyInputs {
            score,
            accuracy,
            combo,
        }))
    }

    #[test]
    fn test_baseline() {
        let inputs = DifficultyInputs::default();
        assert_eq!(difficulty_multiplier(&inputs), 1.0);
        assert_eq!(rate(0, 0.0, 0), 1500.0);
    }

    #[test]
    fn test_accuracy_bonuses_stack() {
        let m = |acc| {
            difficulty_multiplier(&DifficultyInputs {
                score: 0,
                accuracy: acc,
                combo: 0,
            })
        };
        assert_eq!(m(0.7), 1.0);
        assert_eq!(m(0.75), 2.0);
        assert_eq!(m(0.85), 2.5);
        assert_eq!(m(0.95), 3.0);
        assert_eq!(m(1.0), 3.0);
    }

    #[test]
    fn test_score_and_combo_caps() {
        let m = difficulty_multiplier(&DifficultyInputs {
            score: 50_000,
            accuracy: 0.0,
            combo: 500,
        });
        assert_eq!(m, 4.0);
    }

    #[test]
    fn test_higher_score_never_slower() {
        for combo in [0, 3, 10] {
            for accuracy in [0.0, 0.75, 0.95] {
                assert!(rate(2000, accuracy, combo) <= rate(0, accuracy, combo));
            }
        }
    }

    #[test]
    fn test_floor_at_300ms() {
        // Max multiplier is 6.0 -> 250ms before clamping
        assert_eq!(rate(10_000, 1.0, 100), MIN_SPAWN_MS);
        assert_eq!(spawn_rate_ms(1000.0), MIN_SPAWN_MS);
    }

    #[test]
    fn test_inputs_from_counts() {
        let inputs = DifficultyInputs::new(300, 3, 4, 2);
        assert_eq!(inputs.accuracy, 0.75);
        assert_eq!(DifficultyInputs::new(0, 0, 0, 0).accuracy, 0.0);
    }
}
