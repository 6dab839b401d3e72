//! Adaptive difficulty: a per-task EMA of accuracy drives a ratcheting level.
//!
//! EMA update: `accuracy * alpha + previousEMA * (1 - alpha)`, alpha 0.3 by
//! default, so the newest observation always outweighs any single older one.
//!
//! Level selection ratchets: below the observation gate the level stays at
//! `max(1, current)`; past it the candidate from the EMA threshold table is
//! combined as `max(current, candidate)`. A task's level never decreases,
//! no matter how rough a week the player has.

use crate::config::DifficultyConfig;

pub struct AdaptiveDifficulty;

impl AdaptiveDifficulty {
    /// Recency-weighted accuracy average.
    pub fn updated_ema(current_accuracy: f64, previous_ema: f64, alpha: f64) -> f64 {
        current_accuracy * alpha + previous_ema * (1.0 - alpha)
    }

    /// Next difficulty level for a task.
    ///
    /// `total_observations` counts the task's non-calibration observations;
    /// until it reaches the configured minimum the level cannot leave 1.
    pub fn difficulty_level(
        ema: f64,
        current_level: u32,
        total_observations: u32,
        config: &DifficultyConfig,
    ) -> u32 {
        if total_observations < config.minimum_sessions_to_advance {
            return current_level.max(1);
        }
        let candidate = config.level_for_ema(ema);
        current_level.max(candidate)
    }
}
