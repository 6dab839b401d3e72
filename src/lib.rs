//! # timesense-engine - player progression and behavioral analytics
//!
//! Pure, stateless computations behind a children's time-estimation game:
//!
//! - **Estimation scoring** - signed difference, accuracy percent, rating band
//! - **Adaptive difficulty** - EMA-driven per-task levels that never decrease
//! - **Behavioral insights** - bias, trend (linear regression), consistency (CV)
//! - **XP and levels** - multiplier-weighted awards on a power-law curve
//! - **Streaks and reflections** - day-granularity continuity, weekly reports
//!
//! The engine never owns storage. Every function takes current state as plain
//! values and returns the next values for a collaborator to persist, so the
//! whole crate stays deterministic and trivially testable.
//!
//! ## Module structure
//!
//! - [`scorer`] - one estimate against reality
//! - [`difficulty`] - EMA update and the monotonic level ratchet
//! - [`calibration`] - the learning-phase window for new routines
//! - [`insight`] - bias / trend / consistency detectors and hints
//! - [`xp`] - estimation XP and the level curve
//! - [`streak`] - consecutive-day continuity that pauses, never resets
//! - [`personal_best`] - closest-ever estimate per task
//! - [`reflection`] - weekly aggregate reports
//! - [`feedback`] - per-estimation message catalog
//! - [`format`] - duration strings for hints and feedback
//! - [`engine`] - session-flow facade over all of the above
//! - [`config`] - tunables, env overrides, validation
//! - [`types`] - shared value records
//!
//! ## Example
//!
//! ```rust
//! use timesense_engine::{AccuracyRating, EngineConfig, EstimationScorer};
//!
//! let config = EngineConfig::default();
//! let result = EstimationScorer::score_at_level(110.0, 120.0, 1, &config.difficulty);
//! assert_eq!(result.rating, AccuracyRating::SpotOn);
//! assert!(result.accuracy_percent > 90.0);
//! ```

// ============================================================================
// Module declarations
// ============================================================================

pub mod calibration;
pub mod config;
pub mod difficulty;
pub mod engine;
pub mod feedback;
pub mod format;
pub mod insight;
pub mod personal_best;
pub mod reflection;
pub mod scorer;
pub mod streak;
pub mod types;
pub mod xp;

// ============================================================================
// Re-exports
// ============================================================================

/// Shared value records
pub use types::{
    AccuracyRating, DifficultyState, EstimationResult, EstimationSnapshot, PlayerProgress,
};

/// Configuration and validation
pub use config::{ConfigError, DifficultyConfig, EngineConfig, RatingThresholds, XpConfig};

/// Scoring and difficulty
pub use difficulty::AdaptiveDifficulty;
pub use scorer::EstimationScorer;

/// Calibration window
pub use calibration::{CalibrationTracker, CALIBRATION_SESSIONS};

/// Behavioral insights
pub use insight::{
    BiasDirection, BiasResult, ConsistencyLevel, ConsistencyResult, InsightEngine, TaskInsight,
    TrendDirection, TrendResult,
};

/// XP and level curve
pub use xp::{LevelCalculator, XpEngine};

/// Streaks and personal bests
pub use personal_best::{PersonalBest, PersonalBestTracker};
pub use streak::{StreakState, StreakTracker};

/// Weekly reflection
pub use reflection::{ImprovementResult, WeeklyReflection, WeeklyReflectionEngine};

/// Feedback and formatting
pub use feedback::{FeedbackGenerator, FeedbackMessage};
pub use format::{format_duration, format_duration_long};

/// Session-flow facade
pub use engine::{EstimationOutcome, ProgressionEngine, SessionOutcome};
