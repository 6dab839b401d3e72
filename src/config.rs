//! Tuning values for scoring, difficulty progression, and XP.
//!
//! Everything here is a plain value threaded through each call. Hosts can
//! swap whole configurations between sessions (A/B tuning) without touching
//! any global state. `EngineConfig::default()` reproduces the shipped game
//! balance; `EngineConfig::from_env()` applies optional scalar overrides.

use serde::{Deserialize, Serialize};

/// Fractional rating bounds for one difficulty level. Each bound is a
/// fraction of the actual duration; anything beyond `off` is way-off.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingThresholds {
    pub spot_on: f64,
    pub close: f64,
    pub off: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyConfig {
    /// EMA smoothing factor. The newest observation gets this weight.
    pub ema_alpha: f64,
    /// Observations required for a task before its level may exceed 1.
    pub minimum_sessions_to_advance: u32,
    /// Minimum EMA to hold each level, index 0 = level 1. Non-decreasing.
    pub level_ema_thresholds: Vec<f64>,
    /// Rating bounds per level, index 0 = level 1. Tighter as levels rise.
    pub thresholds_per_level: Vec<RatingThresholds>,
    /// XP multiplier per level, index 0 = level 1.
    pub xp_multipliers: Vec<f64>,
    /// Spot-on never requires landing closer than this many seconds.
    pub minimum_absolute_threshold_seconds: f64,
}

impl Default for DifficultyConfig {
    fn default() -> Self {
        Self {
            ema_alpha: 0.3,
            minimum_sessions_to_advance: 5,
            level_ema_thresholds: vec![0.0, 65.0, 75.0, 83.0, 90.0],
            thresholds_per_level: vec![
                RatingThresholds { spot_on: 0.10, close: 0.25, off: 0.50 },
                RatingThresholds { spot_on: 0.08, close: 0.20, off: 0.40 },
                RatingThresholds { spot_on: 0.06, close: 0.15, off: 0.35 },
                RatingThresholds { spot_on: 0.05, close: 0.12, off: 0.30 },
                RatingThresholds { spot_on: 0.04, close: 0.10, off: 0.25 },
            ],
            xp_multipliers: vec![1.0, 1.15, 1.35, 1.60, 2.00],
            minimum_absolute_threshold_seconds: 15.0,
        }
    }
}

impl DifficultyConfig {
    pub fn max_level(&self) -> u32 {
        self.level_ema_thresholds.len() as u32
    }

    /// Highest level whose EMA threshold the given EMA meets or exceeds.
    pub fn level_for_ema(&self, ema: f64) -> u32 {
        let mut level = 1;
        for (index, threshold) in self.level_ema_thresholds.iter().enumerate() {
            if ema >= *threshold {
                level = index as u32 + 1;
            }
        }
        level
    }

    /// Rating bounds for a level. Out-of-range levels clamp, they never error:
    /// below 1 reads level 1, above the table reads the last level.
    pub fn thresholds_for_level(&self, level: u32) -> RatingThresholds {
        self.thresholds_per_level[self.clamped_index(level, self.thresholds_per_level.len())]
    }

    /// XP multiplier for a level, clamped the same way as the rating bounds.
    pub fn xp_multiplier_for_level(&self, level: u32) -> f64 {
        self.xp_multipliers[self.clamped_index(level, self.xp_multipliers.len())]
    }

    fn clamped_index(&self, level: u32, len: usize) -> usize {
        let highest = len.max(1) as u32;
        (level.clamp(1, highest) - 1) as usize
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct XpConfig {
    pub spot_on_xp: i64,
    pub close_xp: i64,
    pub off_xp: i64,
    pub way_off_xp: i64,
    /// Flat bonus for finishing a session. Never scaled by difficulty.
    pub completion_bonus: i64,
    /// Level curve: xp required for level L is `level_base_xp * L^level_exponent`.
    pub level_base_xp: f64,
    pub level_exponent: f64,
}

impl Default for XpConfig {
    fn default() -> Self {
        Self {
            spot_on_xp: 100,
            close_xp: 60,
            off_xp: 25,
            way_off_xp: 10,
            completion_bonus: 20,
            level_base_xp: 100.0,
            level_exponent: 1.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub difficulty: DifficultyConfig,
    pub xp: XpConfig,
}

impl EngineConfig {
    /// Defaults with optional scalar overrides from the environment.
    /// Unparseable values fall back to the default silently.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        config.difficulty.ema_alpha = std::env::var("TIMESENSE_EMA_ALPHA")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(config.difficulty.ema_alpha);
        config.difficulty.minimum_sessions_to_advance =
            std::env::var("TIMESENSE_MIN_SESSIONS_TO_ADVANCE")
                .ok()
                .and_then(|value| value.parse().ok())
                .unwrap_or(config.difficulty.minimum_sessions_to_advance);
        config.xp.completion_bonus = std::env::var("TIMESENSE_COMPLETION_BONUS")
            .ok()
            .and_then(|value| value.parse().ok())
            .unwrap_or(config.xp.completion_bonus);

        config
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let d = &self.difficulty;
        if !(d.ema_alpha > 0.0 && d.ema_alpha <= 1.0) {
            return Err(ConfigError::AlphaOutOfRange(d.ema_alpha));
        }
        if d.level_ema_thresholds.is_empty() {
            return Err(ConfigError::EmptyLevelTable("levelEmaThresholds"));
        }
        if d.thresholds_per_level.len() != d.level_ema_thresholds.len() {
            return Err(ConfigError::MismatchedLevelTables {
                table: "thresholdsPerLevel",
                len: d.thresholds_per_level.len(),
                expected: d.level_ema_thresholds.len(),
            });
        }
        if d.xp_multipliers.len() != d.level_ema_thresholds.len() {
            return Err(ConfigError::MismatchedLevelTables {
                table: "xpMultipliers",
                len: d.xp_multipliers.len(),
                expected: d.level_ema_thresholds.len(),
            });
        }
        if d.level_ema_thresholds.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ConfigError::UnsortedEmaThresholds);
        }
        if let Some(&bad) = d.xp_multipliers.iter().find(|&&m| m < 1.0) {
            return Err(ConfigError::MultiplierBelowOne(bad));
        }
        if d.minimum_absolute_threshold_seconds < 0.0 {
            return Err(ConfigError::NegativeSpotOnFloor(
                d.minimum_absolute_threshold_seconds,
            ));
        }

        let x = &self.xp;
        let per_rating = [x.spot_on_xp, x.close_xp, x.off_xp, x.way_off_xp];
        if per_rating.iter().any(|&xp| xp <= 0) || x.completion_bonus < 0 {
            return Err(ConfigError::NonPositiveXp);
        }
        if x.level_base_xp <= 0.0 || x.level_exponent <= 0.0 {
            return Err(ConfigError::DegenerateLevelCurve {
                base: x.level_base_xp,
                exponent: x.level_exponent,
            });
        }
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("emaAlpha must be in (0, 1], got {0}")]
    AlphaOutOfRange(f64),
    #[error("{0} must not be empty")]
    EmptyLevelTable(&'static str),
    #[error("{table} has {len} entries, expected {expected}")]
    MismatchedLevelTables {
        table: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("levelEmaThresholds must be non-decreasing")]
    UnsortedEmaThresholds,
    #[error("xpMultipliers must all be >= 1.0, got {0}")]
    MultiplierBelowOne(f64),
    #[error("minimumAbsoluteThresholdSeconds must be >= 0, got {0}")]
    NegativeSpotOnFloor(f64),
    #[error("per-rating XP must be positive and completionBonus non-negative")]
    NonPositiveXp,
    #[error("level curve needs positive base and exponent, got base {base} exponent {exponent}")]
    DegenerateLevelCurve { base: f64, exponent: f64 },
}
