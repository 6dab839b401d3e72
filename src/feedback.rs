//! User-facing feedback for a scored estimation.
//!
//! Copy is curiosity-framed and never judgmental: a large miss is a
//! discovery, not a failure. During a routine's calibration phase every
//! rating gets the same neutral learning message. Icons are carried as
//! plain symbol names for the presentation layer.

use serde::{Deserialize, Serialize};

use crate::format::format_duration;
use crate::types::{AccuracyRating, EstimationResult};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackMessage {
    pub headline: String,
    pub body: String,
    pub icon: String,
}

pub struct FeedbackGenerator;

impl FeedbackGenerator {
    pub fn message(result: &EstimationResult, is_calibration_phase: bool) -> FeedbackMessage {
        let diff_formatted = format_duration(result.abs_difference_seconds());
        let direction = if result.difference_seconds > 0.0 { "over" } else { "under" };

        if is_calibration_phase {
            return FeedbackMessage {
                headline: format!("{diff_formatted} {direction}"),
                body: "Just learning your patterns. Every guess teaches something.".to_string(),
                icon: "chart.line.uptrend.xyaxis".to_string(),
            };
        }

        match result.rating {
            AccuracyRating::SpotOn => FeedbackMessage {
                headline: "Nailed it!".to_string(),
                body: "Your time sense was right on.".to_string(),
                icon: "bullseye".to_string(),
            },
            AccuracyRating::Close => FeedbackMessage {
                headline: format!("{diff_formatted} {direction}"),
                body: "Getting dialed in.".to_string(),
                icon: "scope".to_string(),
            },
            AccuracyRating::Off => FeedbackMessage {
                headline: format!("{diff_formatted} {direction}"),
                body: "Interesting -- that one felt different than it was.".to_string(),
                icon: "magnifyingglass".to_string(),
            },
            AccuracyRating::WayOff => FeedbackMessage {
                headline: format!("{diff_formatted} {direction}!"),
                body: "Big discovery! This one's tricky to feel.".to_string(),
                icon: "sparkles".to_string(),
            },
        }
    }
}
