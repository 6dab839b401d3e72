//! Learning-phase classification for a routine.
//!
//! A routine's first few completed sessions are calibration: the player is
//! still discovering what the tasks feel like, so those observations are
//! kept out of difficulty updates and every statistic downstream.

/// Completed sessions before a routine leaves calibration.
pub const CALIBRATION_SESSIONS: u32 = 3;

pub struct CalibrationTracker;

impl CalibrationTracker {
    /// True while the routine has fewer completed sessions than the
    /// calibration threshold. Abandoned sessions do not count.
    pub fn is_calibration_session(completed_session_count: u32) -> bool {
        completed_session_count < CALIBRATION_SESSIONS
    }

    pub fn remaining_calibration_sessions(completed_session_count: u32) -> u32 {
        CALIBRATION_SESSIONS.saturating_sub(completed_session_count)
    }
}
