//! Weekly reflection: one aggregate report per calendar week.
//!
//! Weeks are ISO weeks (Monday start) and windows are [start, end) at day
//! granularity. The report compares against the prior week when that data is
//! supplied, finds the best single estimate and the most improved task, and
//! borrows one pattern highlight from the insight detectors. Everything is
//! computed fresh from the inputs; identical inputs give identical reports.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::insight::{BiasDirection, ConsistencyLevel, InsightEngine, TrendDirection};
use crate::types::EstimationSnapshot;

pub const DAYS_IN_WEEK: u32 = 7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImprovementResult {
    pub task_name: String,
    pub delta: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyReflection {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub quests_completed: u32,
    /// Mean accuracy over the week's eligible snapshots, 0 when empty.
    pub average_accuracy: f64,
    /// Signed delta against the prior week, absent without prior data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub accuracy_change_vs_prior_week: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_estimate_task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_estimate_accuracy: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_improved_task_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub most_improved_delta: Option<f64>,
    pub days_played_this_week: u32,
    pub total_days_in_week: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pattern_highlight: Option<String>,
    pub has_gaps: bool,
    pub total_estimations: usize,
}

impl WeeklyReflection {
    /// Positive streak framing, "4 of 7 days".
    pub fn streak_context(&self) -> String {
        format!("{} of {} days", self.days_played_this_week, self.total_days_in_week)
    }

    /// A reflection without a single completed quest is not worth showing.
    pub fn is_meaningful(&self) -> bool {
        self.quests_completed > 0
    }

    /// Week-over-week delta as "+N%" / "-N%", truncated toward zero.
    pub fn formatted_accuracy_change(&self) -> Option<String> {
        let delta = self.accuracy_change_vs_prior_week?;
        let sign = if delta >= 0.0 { "+" } else { "" };
        Some(format!("{sign}{}%", delta as i64))
    }
}

pub struct WeeklyReflectionEngine;

impl WeeklyReflectionEngine {
    /// [start, end) of the week `weeks_back` weeks before the one holding
    /// `date`. 0 is the current week, 1 the previous.
    pub fn week_bounds(weeks_back: u32, from: NaiveDate) -> (NaiveDate, NaiveDate) {
        let days_into_week = from.weekday().num_days_from_monday() as i64;
        let current_week_start = from - Duration::days(days_into_week);
        let start = current_week_start - Duration::days(7 * weeks_back as i64);
        (start, start + Duration::days(7))
    }

    /// [start, end) of the immediately preceding week.
    pub fn previous_week_bounds(from: NaiveDate) -> (NaiveDate, NaiveDate) {
        Self::week_bounds(1, from)
    }

    /// ISO week label like "2025-W07", used by hosts to remember which
    /// reflection was already shown or dismissed.
    pub fn week_identifier(date: NaiveDate) -> String {
        let iso = date.iso_week();
        format!("{}-W{:02}", iso.year(), iso.week())
    }

    /// Build the reflection for [week_start, week_end).
    ///
    /// `snapshots` should cover at least the target week; extra history only
    /// enriches the pattern highlight. `prior_week_snapshots` is the prior
    /// window's history when the caller has it. `completed_quest_count` is
    /// the number of completed sessions, not snapshots.
    pub fn compute_reflection(
        snapshots: &[EstimationSnapshot],
        week_start: NaiveDate,
        week_end: NaiveDate,
        prior_week_snapshots: Option<&[EstimationSnapshot]>,
        completed_quest_count: u32,
    ) -> WeeklyReflection {
        let week_snapshots: Vec<&EstimationSnapshot> = snapshots
            .iter()
            .filter(|s| {
                !s.is_calibration
                    && s.recorded_at.date() >= week_start
                    && s.recorded_at.date() < week_end
            })
            .collect();

        let average_accuracy = if week_snapshots.is_empty() {
            0.0
        } else {
            week_snapshots.iter().map(|s| s.accuracy_percent).sum::<f64>()
                / week_snapshots.len() as f64
        };

        let eligible_prior: Option<Vec<&EstimationSnapshot>> = prior_week_snapshots
            .map(|prior| prior.iter().filter(|s| !s.is_calibration).collect());

        let accuracy_change = eligible_prior.as_ref().and_then(|prior| {
            if prior.is_empty() {
                return None;
            }
            let prior_avg =
                prior.iter().map(|s| s.accuracy_percent).sum::<f64>() / prior.len() as f64;
            Some(average_accuracy - prior_avg)
        });

        let best_snapshot = week_snapshots
            .iter()
            .max_by(|a, b| a.accuracy_percent.total_cmp(&b.accuracy_percent));

        let improvement = eligible_prior
            .as_ref()
            .and_then(|prior| Self::find_most_improved(&week_snapshots, prior));

        let unique_days: BTreeSet<NaiveDate> =
            week_snapshots.iter().map(|s| s.recorded_at.date()).collect();
        let days_played = unique_days.len() as u32;

        let week_task_names: BTreeSet<String> = week_snapshots
            .iter()
            .map(|s| s.task_display_name.clone())
            .collect();
        let pattern_highlight = Self::pick_pattern_highlight(snapshots, &week_task_names);

        WeeklyReflection {
            week_start,
            week_end,
            quests_completed: completed_quest_count,
            average_accuracy,
            accuracy_change_vs_prior_week: accuracy_change,
            best_estimate_task_name: best_snapshot.map(|s| s.task_display_name.clone()),
            best_estimate_accuracy: best_snapshot.map(|s| s.accuracy_percent),
            most_improved_task_name: improvement.as_ref().map(|i| i.task_name.clone()),
            most_improved_delta: improvement.as_ref().map(|i| i.delta),
            days_played_this_week: days_played,
            total_days_in_week: DAYS_IN_WEEK,
            pattern_highlight,
            has_gaps: days_played < DAYS_IN_WEEK,
            total_estimations: week_snapshots.len(),
        }
    }

    /// Largest positive per-task accuracy gain between two windows. Only
    /// tasks present in both windows with at least 2 estimations in each
    /// qualify, which keeps single-sample noise out.
    pub fn find_most_improved_task(
        this_week: &[EstimationSnapshot],
        prior_week: &[EstimationSnapshot],
    ) -> Option<ImprovementResult> {
        let this_refs: Vec<&EstimationSnapshot> = this_week.iter().collect();
        let prior_refs: Vec<&EstimationSnapshot> = prior_week.iter().collect();
        Self::find_most_improved(&this_refs, &prior_refs)
    }

    fn find_most_improved(
        this_week: &[&EstimationSnapshot],
        prior_week: &[&EstimationSnapshot],
    ) -> Option<ImprovementResult> {
        let group = |snapshots: &[&EstimationSnapshot]| {
            let mut by_task: BTreeMap<String, Vec<f64>> = BTreeMap::new();
            for snapshot in snapshots {
                by_task
                    .entry(snapshot.task_display_name.clone())
                    .or_default()
                    .push(snapshot.accuracy_percent);
            }
            by_task
        };
        let this_by_task = group(this_week);
        let prior_by_task = group(prior_week);

        let mut best: Option<ImprovementResult> = None;
        for (task_name, this_accuracies) in &this_by_task {
            let Some(prior_accuracies) = prior_by_task.get(task_name) else {
                continue;
            };
            if this_accuracies.len() < 2 || prior_accuracies.len() < 2 {
                continue;
            }

            let this_avg = this_accuracies.iter().sum::<f64>() / this_accuracies.len() as f64;
            let prior_avg = prior_accuracies.iter().sum::<f64>() / prior_accuracies.len() as f64;
            let delta = this_avg - prior_avg;
            if delta <= 0.0 {
                continue;
            }

            match &best {
                Some(current) if delta <= current.delta => {}
                _ => {
                    best = Some(ImprovementResult {
                        task_name: task_name.clone(),
                        delta,
                    });
                }
            }
        }
        best
    }

    /// One highlight sentence from the per-task insights, restricted to
    /// tasks played this week. Fixed priority: improving trend, then a
    /// non-balanced bias, then very high consistency. Tasks are scanned in
    /// name order, first match wins.
    pub fn pick_pattern_highlight(
        all_snapshots: &[EstimationSnapshot],
        week_task_names: &BTreeSet<String>,
    ) -> Option<String> {
        if week_task_names.is_empty() {
            return None;
        }

        let insights = InsightEngine::generate_insights(all_snapshots);
        let week_insights: Vec<_> = insights
            .iter()
            .filter(|insight| week_task_names.contains(&insight.task_display_name))
            .collect();
        if week_insights.is_empty() {
            return None;
        }

        for insight in &week_insights {
            if let Some(trend) = &insight.trend {
                if trend.direction == TrendDirection::Improving {
                    return Some(format!(
                        "Your {} estimates are getting closer over time",
                        insight.task_display_name
                    ));
                }
            }
        }

        for insight in &week_insights {
            if let Some(bias) = &insight.bias {
                if bias.direction != BiasDirection::Balanced {
                    let verb = if bias.direction == BiasDirection::Overestimates {
                        "overestimate"
                    } else {
                        "underestimate"
                    };
                    return Some(format!("You tend to {verb} {}", insight.task_display_name));
                }
            }
        }

        for insight in &week_insights {
            if let Some(consistency) = &insight.consistency {
                if consistency.level == ConsistencyLevel::VeryConsistent {
                    return Some(format!(
                        "You read {} the same way each time",
                        insight.task_display_name
                    ));
                }
            }
        }

        None
    }
}
