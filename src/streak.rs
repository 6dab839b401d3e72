//! Day-granularity streak continuity.
//!
//! Rules run on calendar days, not 24-hour windows: first play starts the
//! streak at 1, same-day play holds it, next-day play increments it, and a
//! gap of two or more days pauses it. A pause keeps the count and only drops
//! the active flag, so a lapse never erases earned progress.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StreakState {
    pub current_streak: u32,
    pub last_played: NaiveDate,
    pub is_active: bool,
}

pub struct StreakTracker;

impl StreakTracker {
    pub fn updated_streak(
        current_streak: u32,
        last_played: Option<NaiveDate>,
        today: NaiveDate,
    ) -> StreakState {
        let Some(last) = last_played else {
            return StreakState {
                current_streak: 1,
                last_played: today,
                is_active: true,
            };
        };

        let days_between = today.signed_duration_since(last).num_days();
        match days_between {
            0 => StreakState {
                current_streak,
                last_played: today,
                is_active: true,
            },
            1 => StreakState {
                current_streak: current_streak + 1,
                last_played: today,
                is_active: true,
            },
            // longer gaps (and clock skew backwards) hold the count
            _ => StreakState {
                current_streak,
                last_played: today,
                is_active: false,
            },
        }
    }
}
