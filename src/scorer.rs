//! Estimation scoring: one (estimated, actual) pair in, accuracy and rating out.
//!
//! Accuracy percent:
//! - actual < 60s: `100 - absDiff / 60 * 100` (fixed denominator, so a small
//!   absolute miss on a short task is not a huge percentage miss)
//! - otherwise:    `100 - absDiff / actual * 100`
//! both floored at 0.
//!
//! Rating bands use the level's fractional bounds of the actual duration,
//! boundary inclusive, with an absolute floor on the spot-on band. Accuracy
//! percent never depends on the bounds, so history stays comparable when a
//! task's difficulty rises.
//!
//! Precondition: `actual_seconds > 0`. Zero and negative durations are a
//! caller contract violation, not a handled case.

use crate::config::{DifficultyConfig, RatingThresholds};
use crate::types::{AccuracyRating, EstimationResult};

/// Fixed denominator for tasks shorter than a minute.
const SHORT_TASK_DENOMINATOR_SECONDS: f64 = 60.0;

pub struct EstimationScorer;

impl EstimationScorer {
    /// Score against an explicit threshold set and spot-on floor.
    pub fn score(
        estimated_seconds: f64,
        actual_seconds: f64,
        thresholds: RatingThresholds,
        spot_on_floor_seconds: f64,
    ) -> EstimationResult {
        let difference = estimated_seconds - actual_seconds;
        let abs_difference = difference.abs();

        let accuracy_percent = if actual_seconds < SHORT_TASK_DENOMINATOR_SECONDS {
            (100.0 - abs_difference / SHORT_TASK_DENOMINATOR_SECONDS * 100.0).max(0.0)
        } else {
            (100.0 - abs_difference / actual_seconds * 100.0).max(0.0)
        };

        let spot_on_bound = spot_on_floor_seconds.max(actual_seconds * thresholds.spot_on);
        let rating = if abs_difference <= spot_on_bound {
            AccuracyRating::SpotOn
        } else if abs_difference <= actual_seconds * thresholds.close {
            AccuracyRating::Close
        } else if abs_difference <= actual_seconds * thresholds.off {
            AccuracyRating::Off
        } else {
            AccuracyRating::WayOff
        };

        EstimationResult {
            estimated_seconds,
            actual_seconds,
            difference_seconds: difference,
            accuracy_percent,
            rating,
        }
    }

    /// Score with the threshold set and floor the config holds for a level.
    pub fn score_at_level(
        estimated_seconds: f64,
        actual_seconds: f64,
        level: u32,
        config: &DifficultyConfig,
    ) -> EstimationResult {
        Self::score(
            estimated_seconds,
            actual_seconds,
            config.thresholds_for_level(level),
            config.minimum_absolute_threshold_seconds,
        )
    }
}
