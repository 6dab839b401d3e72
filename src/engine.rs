use chrono::{NaiveDate, NaiveDateTime};

use crate::config::{ConfigError, EngineConfig};
use crate::difficulty::AdaptiveDifficulty;
use crate::feedback::{FeedbackGenerator, FeedbackMessage};
use crate::scorer::EstimationScorer;
use crate::streak::StreakTracker;
use crate::types::{
    AccuracyRating, DifficultyState, EstimationResult, EstimationSnapshot, PlayerProgress,
};
use crate::xp::{LevelCalculator, XpEngine};

/// Everything a caller needs to persist and display after one estimation.
#[derive(Debug, Clone, PartialEq)]
pub struct EstimationOutcome {
    pub result: EstimationResult,
    pub snapshot: EstimationSnapshot,
    pub next_state: DifficultyState,
    pub level_advanced: bool,
    pub feedback: FeedbackMessage,
}

/// End-of-session summary: XP earned, player level, streak.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionOutcome {
    pub xp_awarded: i64,
    pub player_level: u32,
    pub leveled_up: bool,
    pub progress_to_next_level: f64,
    pub streak_is_active: bool,
    pub next_progress: PlayerProgress,
}

/// Stateless orchestrator over the scorer, difficulty model, XP curve and
/// streak tracker. Holds only the configuration; all player state flows in
/// and out as plain values the caller persists.
pub struct ProgressionEngine {
    config: EngineConfig,
}

impl ProgressionEngine {
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn with_defaults() -> Self {
        Self {
            config: EngineConfig::default(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Score one estimation and fold it into the task's difficulty state.
    ///
    /// `state` is the task's current record, absent on the first observation.
    /// `total_observations` counts the task's non-calibration observations,
    /// this one included; it feeds the advancement gate. Calibration
    /// observations are scored and snapshotted but leave the difficulty
    /// record untouched.
    #[allow(clippy::too_many_arguments)]
    pub fn record_estimation(
        &self,
        state: Option<&DifficultyState>,
        task_display_name: &str,
        routine_name: &str,
        estimated_seconds: f64,
        actual_seconds: f64,
        total_observations: u32,
        is_calibration: bool,
        now: NaiveDateTime,
    ) -> EstimationOutcome {
        let current_level = state.map_or(1, |s| s.difficulty_level);
        let result = EstimationScorer::score_at_level(
            estimated_seconds,
            actual_seconds,
            current_level,
            &self.config.difficulty,
        );
        let snapshot = EstimationSnapshot::from_result(
            task_display_name,
            routine_name,
            &result,
            now,
            is_calibration,
        );
        let feedback = FeedbackGenerator::message(&result, is_calibration);

        if is_calibration {
            let next_state = state
                .cloned()
                .unwrap_or_else(|| DifficultyState::new(task_display_name, now));
            return EstimationOutcome {
                result,
                snapshot,
                next_state,
                level_advanced: false,
                feedback,
            };
        }

        let prev = state
            .cloned()
            .unwrap_or_else(|| DifficultyState::new(task_display_name, now));
        let ema = AdaptiveDifficulty::updated_ema(
            result.accuracy_percent,
            prev.ema,
            self.config.difficulty.ema_alpha,
        );
        let next_level = AdaptiveDifficulty::difficulty_level(
            ema,
            prev.difficulty_level,
            total_observations,
            &self.config.difficulty,
        );
        let level_advanced = next_level > prev.difficulty_level;
        // the advancing observation is the first one played at the new level
        let sessions_at_current_level = if level_advanced {
            1
        } else {
            prev.sessions_at_current_level.saturating_add(1)
        };

        if level_advanced {
            tracing::debug!(
                task = %task_display_name,
                from = prev.difficulty_level,
                to = next_level,
                ema = ema,
                "Task difficulty advanced"
            );
        }

        EstimationOutcome {
            result,
            snapshot,
            next_state: DifficultyState {
                task_display_name: prev.task_display_name,
                difficulty_level: next_level,
                ema,
                sessions_at_current_level,
                last_updated: now,
            },
            level_advanced,
            feedback,
        }
    }

    /// Close out a session: award XP for its ratings at the task's difficulty
    /// level and advance the day streak.
    pub fn complete_session(
        &self,
        ratings: &[AccuracyRating],
        difficulty_level: u32,
        progress: &PlayerProgress,
        today: NaiveDate,
    ) -> SessionOutcome {
        let xp_awarded = XpEngine::xp_for_session(ratings, difficulty_level, &self.config);
        let total_xp = progress.total_xp.saturating_add(xp_awarded);

        let previous_level = LevelCalculator::level_for_xp(progress.total_xp, &self.config.xp);
        let player_level = LevelCalculator::level_for_xp(total_xp, &self.config.xp);
        let streak =
            StreakTracker::updated_streak(progress.current_streak, progress.last_played, today);

        tracing::debug!(
            xp = xp_awarded,
            total_xp = total_xp,
            level = player_level,
            streak = streak.current_streak,
            "Session completed"
        );

        SessionOutcome {
            xp_awarded,
            player_level,
            leveled_up: player_level > previous_level,
            progress_to_next_level: LevelCalculator::progress_to_next_level(
                total_xp,
                &self.config.xp,
            ),
            streak_is_active: streak.is_active,
            next_progress: PlayerProgress {
                total_xp,
                current_streak: streak.current_streak,
                last_played: Some(streak.last_played),
            },
        }
    }
}
