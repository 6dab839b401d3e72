//! Personal bests: the closest-ever estimate per task.
//!
//! Closeness is the absolute signed difference. Comparisons are strict, so
//! matching an existing best is not a new best. Calibration snapshots count
//! here; a lucky first guess is still the one to beat.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::types::EstimationSnapshot;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalBest {
    pub task_display_name: String,
    pub closest_difference_seconds: f64,
    pub date: NaiveDateTime,
}

pub struct PersonalBestTracker;

impl PersonalBestTracker {
    /// Best observation per task, ordered by task name. Ties keep the
    /// earliest-recorded observation.
    pub fn find_personal_bests(snapshots: &[EstimationSnapshot]) -> Vec<PersonalBest> {
        let mut by_task: BTreeMap<&str, &EstimationSnapshot> = BTreeMap::new();
        for snapshot in snapshots {
            by_task
                .entry(snapshot.task_display_name.as_str())
                .and_modify(|best| {
                    if snapshot.abs_difference_seconds() < best.abs_difference_seconds() {
                        *best = snapshot;
                    }
                })
                .or_insert(snapshot);
        }

        by_task
            .into_values()
            .map(|best| PersonalBest {
                task_display_name: best.task_display_name.clone(),
                closest_difference_seconds: best.abs_difference_seconds(),
                date: best.recorded_at,
            })
            .collect()
    }

    /// Whether a new signed difference beats every prior observation of the
    /// same task. `prior_snapshots` is the task's history; empty means first
    /// attempt, which is always a best.
    pub fn is_new_personal_best(
        difference_seconds: f64,
        prior_snapshots: &[EstimationSnapshot],
    ) -> bool {
        let Some(best) = prior_snapshots
            .iter()
            .map(|snapshot| snapshot.abs_difference_seconds())
            .min_by(|a, b| a.total_cmp(b))
        else {
            return true;
        };
        difference_seconds.abs() < best
    }
}
