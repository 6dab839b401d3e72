//! Behavioral insight detectors over a task's observation history.
//!
//! Every detector filters out calibration snapshots first and needs at least
//! `MINIMUM_SESSIONS` eligible samples, otherwise it returns `None` ("not
//! enough sessions yet" is a normal state, not an error).
//!
//! - Bias: mean signed difference, classified against +/-15s.
//! - Trend: least-squares slope of accuracy percent over session index
//!   (0, 1, 2, ... in chronological order), classified against +/-0.5 per
//!   session. Play gaps do not skew the slope because x is the index, not
//!   wall-clock time.
//! - Consistency: coefficient of variation of the absolute differences.
//!   A mean of exactly zero (every estimate perfect) reports CV 0.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::format::format_duration;
use crate::types::EstimationSnapshot;

pub const MINIMUM_SESSIONS: usize = 5;
pub const BIAS_THRESHOLD_SECONDS: f64 = 15.0;
pub const TREND_SLOPE_THRESHOLD: f64 = 0.5;
pub const CONSISTENCY_LOW_CV: f64 = 0.3;
pub const CONSISTENCY_HIGH_CV: f64 = 0.6;

/// How many recent actual durations a hint or insight carries.
const RECENT_WINDOW: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BiasDirection {
    Overestimates,
    Underestimates,
    Balanced,
}

impl BiasDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Overestimates => "overestimates",
            Self::Underestimates => "underestimates",
            Self::Balanced => "balanced",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BiasResult {
    pub task_display_name: String,
    pub direction: BiasDirection,
    pub mean_difference_seconds: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Improving,
    Declining,
    Stable,
}

impl TrendDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Improving => "improving",
            Self::Declining => "declining",
            Self::Stable => "stable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendResult {
    pub task_display_name: String,
    pub direction: TrendDirection,
    pub slope_per_session: f64,
    pub sample_count: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ConsistencyLevel {
    VeryConsistent,
    Moderate,
    Variable,
}

impl ConsistencyLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VeryConsistent => "veryConsistent",
            Self::Moderate => "moderate",
            Self::Variable => "variable",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsistencyResult {
    pub task_display_name: String,
    pub level: ConsistencyLevel,
    pub coefficient_of_variation: f64,
    pub sample_count: usize,
}

/// Per-task bundle of whichever detectors had enough data, plus the most
/// recent actual durations for context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskInsight {
    pub task_display_name: String,
    pub routine_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bias: Option<BiasResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trend: Option<TrendResult>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consistency: Option<ConsistencyResult>,
    pub recent_actual_seconds: Vec<f64>,
}

pub struct InsightEngine;

impl InsightEngine {
    fn eligible(snapshots: &[EstimationSnapshot]) -> Vec<&EstimationSnapshot> {
        snapshots.iter().filter(|s| !s.is_calibration).collect()
    }

    /// Whether the player tends to guess long or short on this task.
    pub fn detect_bias(snapshots: &[EstimationSnapshot]) -> Option<BiasResult> {
        let eligible = Self::eligible(snapshots);
        if eligible.len() < MINIMUM_SESSIONS {
            return None;
        }

        let mean_difference = eligible
            .iter()
            .map(|s| s.difference_seconds)
            .sum::<f64>()
            / eligible.len() as f64;

        let direction = if mean_difference > BIAS_THRESHOLD_SECONDS {
            BiasDirection::Overestimates
        } else if mean_difference < -BIAS_THRESHOLD_SECONDS {
            BiasDirection::Underestimates
        } else {
            BiasDirection::Balanced
        };

        Some(BiasResult {
            task_display_name: eligible[0].task_display_name.clone(),
            direction,
            mean_difference_seconds: mean_difference,
            sample_count: eligible.len(),
        })
    }

    /// Accuracy trend from a least-squares fit over session index.
    pub fn detect_trend(snapshots: &[EstimationSnapshot]) -> Option<TrendResult> {
        let mut eligible = Self::eligible(snapshots);
        eligible.sort_by_key(|s| s.recorded_at);
        if eligible.len() < MINIMUM_SESSIONS {
            return None;
        }

        let n = eligible.len() as f64;
        let mut sum_x = 0.0;
        let mut sum_y = 0.0;
        let mut sum_xy = 0.0;
        let mut sum_x2 = 0.0;
        for (index, snapshot) in eligible.iter().enumerate() {
            let x = index as f64;
            let y = snapshot.accuracy_percent;
            sum_x += x;
            sum_y += y;
            sum_xy += x * y;
            sum_x2 += x * x;
        }

        let denominator = n * sum_x2 - sum_x * sum_x;
        // cannot be zero with >= 2 distinct indices, guarded anyway
        if denominator == 0.0 {
            return None;
        }
        let slope = (n * sum_xy - sum_x * sum_y) / denominator;

        let direction = if slope > TREND_SLOPE_THRESHOLD {
            TrendDirection::Improving
        } else if slope < -TREND_SLOPE_THRESHOLD {
            TrendDirection::Declining
        } else {
            TrendDirection::Stable
        };

        Some(TrendResult {
            task_display_name: eligible[0].task_display_name.clone(),
            direction,
            slope_per_session: slope,
            sample_count: eligible.len(),
        })
    }

    /// Spread of the absolute differences, scale-free.
    pub fn compute_consistency(snapshots: &[EstimationSnapshot]) -> Option<ConsistencyResult> {
        let eligible = Self::eligible(snapshots);
        if eligible.len() < MINIMUM_SESSIONS {
            return None;
        }

        let abs_diffs: Vec<f64> = eligible.iter().map(|s| s.abs_difference_seconds()).collect();
        let mean = abs_diffs.iter().sum::<f64>() / abs_diffs.len() as f64;

        if mean <= 0.0 {
            // perfect estimates every time, maximum consistency
            return Some(ConsistencyResult {
                task_display_name: eligible[0].task_display_name.clone(),
                level: ConsistencyLevel::VeryConsistent,
                coefficient_of_variation: 0.0,
                sample_count: eligible.len(),
            });
        }

        let variance = abs_diffs
            .iter()
            .map(|diff| (diff - mean).powi(2))
            .sum::<f64>()
            / abs_diffs.len() as f64;
        let cv = variance.sqrt() / mean;

        let level = if cv < CONSISTENCY_LOW_CV {
            ConsistencyLevel::VeryConsistent
        } else if cv < CONSISTENCY_HIGH_CV {
            ConsistencyLevel::Moderate
        } else {
            ConsistencyLevel::Variable
        };

        Some(ConsistencyResult {
            task_display_name: eligible[0].task_display_name.clone(),
            level,
            coefficient_of_variation: cv,
            sample_count: eligible.len(),
        })
    }

    /// Reference hint like "Last 5 times: ~2m 30s" for one task.
    pub fn contextual_hint(task_name: &str, snapshots: &[EstimationSnapshot]) -> Option<String> {
        let mut eligible: Vec<&EstimationSnapshot> = snapshots
            .iter()
            .filter(|s| s.task_display_name == task_name && !s.is_calibration)
            .collect();
        eligible.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));

        if eligible.len() < MINIMUM_SESSIONS {
            return None;
        }

        let recent = &eligible[..RECENT_WINDOW.min(eligible.len())];
        let avg_actual =
            recent.iter().map(|s| s.actual_seconds).sum::<f64>() / recent.len() as f64;

        Some(format!(
            "Last {} times: ~{}",
            recent.len(),
            format_duration(avg_actual)
        ))
    }

    /// One insight bundle per task with enough eligible history, ordered by
    /// task name.
    pub fn generate_insights(snapshots: &[EstimationSnapshot]) -> Vec<TaskInsight> {
        let mut by_task: BTreeMap<&str, Vec<&EstimationSnapshot>> = BTreeMap::new();
        for snapshot in snapshots.iter().filter(|s| !s.is_calibration) {
            by_task
                .entry(snapshot.task_display_name.as_str())
                .or_default()
                .push(snapshot);
        }

        by_task
            .into_iter()
            .filter(|(_, task_snapshots)| task_snapshots.len() >= MINIMUM_SESSIONS)
            .map(|(task_name, task_snapshots)| {
                let owned: Vec<EstimationSnapshot> =
                    task_snapshots.iter().map(|s| (*s).clone()).collect();

                let mut by_recency = task_snapshots.clone();
                by_recency.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
                let recent_actual_seconds: Vec<f64> = by_recency
                    .iter()
                    .take(RECENT_WINDOW)
                    .map(|s| s.actual_seconds)
                    .collect();

                TaskInsight {
                    task_display_name: task_name.to_string(),
                    routine_name: task_snapshots[0].routine_name.clone(),
                    bias: Self::detect_bias(&owned),
                    trend: Self::detect_trend(&owned),
                    consistency: Self::compute_consistency(&owned),
                    recent_actual_seconds,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn at_day(day: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, day)
            .unwrap()
            .and_hms_opt(8, 0, 0)
            .unwrap()
    }

    fn snapshot(task: &str, difference: f64, accuracy: f64, day: u32) -> EstimationSnapshot {
        EstimationSnapshot {
            task_display_name: task.to_string(),
            estimated_seconds: 120.0 + difference,
            actual_seconds: 120.0,
            difference_seconds: difference,
            accuracy_percent: accuracy,
            recorded_at: at_day(day),
            routine_name: "Morning".to_string(),
            is_calibration: false,
        }
    }

    fn calibration(task: &str, difference: f64, day: u32) -> EstimationSnapshot {
        EstimationSnapshot {
            is_calibration: true,
            ..snapshot(task, difference, 10.0, day)
        }
    }

    #[test]
    fn test_bias_needs_five_samples() {
        let snapshots: Vec<_> = (1..=4).map(|d| snapshot("Shower", 100.0, 20.0, d)).collect();
        assert!(InsightEngine::detect_bias(&snapshots).is_none());
    }

    #[test]
    fn test_bias_overestimates() {
        let snapshots: Vec<_> = (1..=6).map(|d| snapshot("Shower", 30.0, 75.0, d)).collect();
        let bias = InsightEngine::detect_bias(&snapshots).unwrap();
        assert_eq!(bias.direction, BiasDirection::Overestimates);
        assert!((bias.mean_difference_seconds - 30.0).abs() < 1e-9);
        assert_eq!(bias.sample_count, 6);
        assert_eq!(bias.task_display_name, "Shower");
    }

    #[test]
    fn test_bias_underestimates() {
        let snapshots: Vec<_> = (1..=5).map(|d| snapshot("Shower", -25.0, 80.0, d)).collect();
        let bias = InsightEngine::detect_bias(&snapshots).unwrap();
        assert_eq!(bias.direction, BiasDirection::Underestimates);
    }

    #[test]
    fn test_bias_balanced_inside_threshold() {
        let diffs = [10.0, -5.0, 3.0, 0.0, -10.0];
        let snapshots: Vec<_> = diffs
            .iter()
            .enumerate()
            .map(|(i, &diff)| snapshot("Shower", diff, 90.0, i as u32 + 1))
            .collect();
        let bias = InsightEngine::detect_bias(&snapshots).unwrap();
        assert_eq!(bias.direction, BiasDirection::Balanced);
    }

    #[test]
    fn test_bias_ignores_calibration_snapshots() {
        let mut snapshots: Vec<_> = (1..=4).map(|d| snapshot("Shower", 30.0, 75.0, d)).collect();
        snapshots.push(calibration("Shower", 500.0, 5));
        snapshots.push(calibration("Shower", 500.0, 6));
        // four eligible samples, calibration ones do not count
        assert!(InsightEngine::detect_bias(&snapshots).is_none());

        snapshots.push(snapshot("Shower", 30.0, 75.0, 7));
        let bias = InsightEngine::detect_bias(&snapshots).unwrap();
        assert_eq!(bias.sample_count, 5);
        assert!((bias.mean_difference_seconds - 30.0).abs() < 1e-9);
    }

    #[test]
    fn test_trend_improving() {
        let accuracies = [50.0, 60.0, 70.0, 80.0, 90.0];
        let snapshots: Vec<_> = accuracies
            .iter()
            .enumerate()
            .map(|(i, &acc)| snapshot("Shower", 10.0, acc, i as u32 + 1))
            .collect();
        let trend = InsightEngine::detect_trend(&snapshots).unwrap();
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert!((trend.slope_per_session - 10.0).abs() < 1e-9);
        assert_eq!(trend.sample_count, 5);
    }

    #[test]
    fn test_trend_declining() {
        let accuracies = [90.0, 80.0, 70.0, 60.0, 50.0];
        let snapshots: Vec<_> = accuracies
            .iter()
            .enumerate()
            .map(|(i, &acc)| snapshot("Shower", 10.0, acc, i as u32 + 1))
            .collect();
        let trend = InsightEngine::detect_trend(&snapshots).unwrap();
        assert_eq!(trend.direction, TrendDirection::Declining);
    }

    #[test]
    fn test_trend_stable_on_flat_accuracy() {
        let snapshots: Vec<_> = (1..=6).map(|d| snapshot("Shower", 5.0, 75.0, d)).collect();
        let trend = InsightEngine::detect_trend(&snapshots).unwrap();
        assert_eq!(trend.direction, TrendDirection::Stable);
        assert!(trend.slope_per_session.abs() < 1e-9);
    }

    #[test]
    fn test_trend_sorts_by_time_before_fitting() {
        // improving in time, handed over shuffled
        let days_and_accuracies = [(3u32, 70.0), (1u32, 50.0), (5u32, 90.0), (2u32, 60.0), (4u32, 80.0)];
        let snapshots: Vec<_> = days_and_accuracies
            .iter()
            .map(|&(day, acc)| snapshot("Shower", 10.0, acc, day))
            .collect();
        let trend = InsightEngine::detect_trend(&snapshots).unwrap();
        assert_eq!(trend.direction, TrendDirection::Improving);
        assert!((trend.slope_per_session - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_consistency_variable() {
        let diffs = [5.0, 50.0, 100.0, 10.0, 80.0];
        let snapshots: Vec<_> = diffs
            .iter()
            .enumerate()
            .map(|(i, &diff)| snapshot("Shower", diff, 60.0, i as u32 + 1))
            .collect();
        let consistency = InsightEngine::compute_consistency(&snapshots).unwrap();
        assert_eq!(consistency.level, ConsistencyLevel::Variable);
        assert!(consistency.coefficient_of_variation > CONSISTENCY_HIGH_CV);
    }

    #[test]
    fn test_consistency_very_consistent() {
        let diffs = [20.0, 21.0, 19.0, 20.0, 20.0];
        let snapshots: Vec<_> = diffs
            .iter()
            .enumerate()
            .map(|(i, &diff)| snapshot("Shower", diff, 85.0, i as u32 + 1))
            .collect();
        let consistency = InsightEngine::compute_consistency(&snapshots).unwrap();
        assert_eq!(consistency.level, ConsistencyLevel::VeryConsistent);
        assert!(consistency.coefficient_of_variation < CONSISTENCY_LOW_CV);
    }

    #[test]
    fn test_consistency_moderate() {
        let diffs = [10.0, 22.0, 10.0, 22.0, 16.0];
        let snapshots: Vec<_> = diffs
            .iter()
            .enumerate()
            .map(|(i, &diff)| snapshot("Shower", diff, 85.0, i as u32 + 1))
            .collect();
        let consistency = InsightEngine::compute_consistency(&snapshots).unwrap();
        assert_eq!(consistency.level, ConsistencyLevel::Moderate);
    }

    #[test]
    fn test_consistency_all_perfect_reports_cv_zero() {
        let snapshots: Vec<_> = (1..=5).map(|d| snapshot("Shower", 0.0, 100.0, d)).collect();
        let consistency = InsightEngine::compute_consistency(&snapshots).unwrap();
        assert_eq!(consistency.level, ConsistencyLevel::VeryConsistent);
        assert_eq!(consistency.coefficient_of_variation, 0.0);
    }

    #[test]
    fn test_hint_formats_recent_average() {
        let snapshots: Vec<_> = (1..=6)
            .map(|d| EstimationSnapshot {
                actual_seconds: 150.0,
                ..snapshot("Shower", 10.0, 90.0, d)
            })
            .collect();
        let hint = InsightEngine::contextual_hint("Shower", &snapshots).unwrap();
        assert_eq!(hint, "Last 5 times: ~2m 30s");
    }

    #[test]
    fn test_hint_uses_only_five_most_recent() {
        let mut snapshots = vec![EstimationSnapshot {
            actual_seconds: 600.0,
            ..snapshot("Shower", 10.0, 90.0, 1)
        }];
        for day in 2..=6 {
            snapshots.push(EstimationSnapshot {
                actual_seconds: 150.0,
                ..snapshot("Shower", 10.0, 90.0, day)
            });
        }
        // the 600s outlier is sixth-most-recent and must not shift the average
        let hint = InsightEngine::contextual_hint("Shower", &snapshots).unwrap();
        assert_eq!(hint, "Last 5 times: ~2m 30s");
    }

    #[test]
    fn test_hint_filters_task_and_calibration() {
        let mut snapshots: Vec<_> = (1..=5).map(|d| snapshot("Shower", 10.0, 90.0, d)).collect();
        snapshots.push(snapshot("Pack bag", 10.0, 90.0, 6));
        assert!(InsightEngine::contextual_hint("Pack bag", &snapshots).is_none());

        let mostly_calibration: Vec<_> = (1..=5).map(|d| calibration("Dress", 10.0, d)).collect();
        assert!(InsightEngine::contextual_hint("Dress", &mostly_calibration).is_none());
    }

    #[test]
    fn test_generate_insights_groups_and_gates() {
        let mut snapshots: Vec<_> = (1..=6).map(|d| snapshot("Shower", 30.0, 75.0, d)).collect();
        snapshots.extend((1..=3).map(|d| snapshot("Pack bag", 5.0, 95.0, d)));

        let insights = InsightEngine::generate_insights(&snapshots);
        assert_eq!(insights.len(), 1);
        let insight = &insights[0];
        assert_eq!(insight.task_display_name, "Shower");
        assert_eq!(insight.routine_name, "Morning");
        assert!(insight.bias.is_some());
        assert!(insight.trend.is_some());
        assert!(insight.consistency.is_some());
        assert_eq!(insight.recent_actual_seconds.len(), 5);
    }

    #[test]
    fn test_generate_insights_orders_by_task_name() {
        let mut snapshots: Vec<_> = (1..=5).map(|d| snapshot("Shower", 10.0, 80.0, d)).collect();
        snapshots.extend((1..=5).map(|d| snapshot("Brush teeth", 10.0, 80.0, d)));

        let insights = InsightEngine::generate_insights(&snapshots);
        let names: Vec<_> = insights.iter().map(|i| i.task_display_name.as_str()).collect();
        assert_eq!(names, vec!["Brush teeth", "Shower"]);
    }
}
