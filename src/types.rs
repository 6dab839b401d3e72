use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Accuracy band for a single estimate, declared best to worst so that
/// derived ordering matches "how far off was this".
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyRating {
    SpotOn,
    Close,
    Off,
    WayOff,
}

impl AccuracyRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SpotOn => "spot_on",
            Self::Close => "close",
            Self::Off => "off",
            Self::WayOff => "way_off",
        }
    }

    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "spot_on" => Self::SpotOn,
            "close" => Self::Close,
            "off" => Self::Off,
            _ => Self::WayOff,
        }
    }
}

/// Output of scoring one (estimated, actual) pair. Derived, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationResult {
    pub estimated_seconds: f64,
    pub actual_seconds: f64,
    /// Signed, estimated minus actual. Positive means the player guessed long.
    pub difference_seconds: f64,
    pub accuracy_percent: f64,
    pub rating: AccuracyRating,
}

impl EstimationResult {
    pub fn abs_difference_seconds(&self) -> f64 {
        self.difference_seconds.abs()
    }
}

/// Immutable record of one completed task attempt. Produced once, never
/// mutated; the sole input to insights, personal bests, and reflections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EstimationSnapshot {
    pub task_display_name: String,
    pub estimated_seconds: f64,
    pub actual_seconds: f64,
    pub difference_seconds: f64,
    pub accuracy_percent: f64,
    pub recorded_at: NaiveDateTime,
    pub routine_name: String,
    pub is_calibration: bool,
}

impl EstimationSnapshot {
    pub fn from_result(
        task_display_name: impl Into<String>,
        routine_name: impl Into<String>,
        result: &EstimationResult,
        recorded_at: NaiveDateTime,
        is_calibration: bool,
    ) -> Self {
        Self {
            task_display_name: task_display_name.into(),
            estimated_seconds: result.estimated_seconds,
            actual_seconds: result.actual_seconds,
            difference_seconds: result.difference_seconds,
            accuracy_percent: result.accuracy_percent,
            recorded_at,
            routine_name: routine_name.into(),
            is_calibration,
        }
    }

    pub fn abs_difference_seconds(&self) -> f64 {
        self.difference_seconds.abs()
    }
}

/// Per-task difficulty record. Owned and persisted by the caller; the engine
/// only computes next values. Level starts at 1 and never decreases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DifficultyState {
    pub task_display_name: String,
    pub difficulty_level: u32,
    pub ema: f64,
    pub sessions_at_current_level: u32,
    pub last_updated: NaiveDateTime,
}

impl DifficultyState {
    /// Fresh state for a task's first observation.
    pub fn new(task_display_name: impl Into<String>, now: NaiveDateTime) -> Self {
        Self {
            task_display_name: task_display_name.into(),
            difficulty_level: 1,
            ema: 0.0,
            sessions_at_current_level: 0,
            last_updated: now,
        }
    }
}

/// Cumulative player progression. Owned and persisted by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProgress {
    pub total_xp: i64,
    pub current_streak: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_played: Option<NaiveDate>,
}

impl Default for PlayerProgress {
    fn default() -> Self {
        Self {
            total_xp: 0,
            current_streak: 0,
            last_played: None,
        }
    }
}
