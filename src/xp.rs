//! XP awards and the level curve.
//!
//! Per-estimation XP is the rating's base value times the difficulty level's
//! multiplier, truncated. Rewards accuracy, never speed. A completed session
//! adds a flat bonus that is deliberately not multiplied: the bonus rewards
//! finishing, not difficulty.
//!
//! Level curve: `xpRequired(level) = levelBaseXP * level^levelExponent`,
//! inverted with a floor for `level_for_xp`. Defaults 100 and 1.5.

use crate::config::{EngineConfig, XpConfig};
use crate::types::AccuracyRating;

pub struct XpEngine;

impl XpEngine {
    /// Unscaled XP for a rating band.
    pub fn base_xp(rating: AccuracyRating, config: &XpConfig) -> i64 {
        match rating {
            AccuracyRating::SpotOn => config.spot_on_xp,
            AccuracyRating::Close => config.close_xp,
            AccuracyRating::Off => config.off_xp,
            AccuracyRating::WayOff => config.way_off_xp,
        }
    }

    /// XP for one estimation at a difficulty level, truncated to an integer.
    pub fn xp_for_estimation(
        rating: AccuracyRating,
        difficulty_level: u32,
        config: &EngineConfig,
    ) -> i64 {
        let base = Self::base_xp(rating, &config.xp) as f64;
        let multiplier = config.difficulty.xp_multiplier_for_level(difficulty_level);
        (base * multiplier) as i64
    }

    /// Total XP for a completed session: per-estimation XP plus the flat
    /// completion bonus.
    pub fn xp_for_session(
        ratings: &[AccuracyRating],
        difficulty_level: u32,
        config: &EngineConfig,
    ) -> i64 {
        let estimation_xp: i64 = ratings
            .iter()
            .map(|&rating| Self::xp_for_estimation(rating, difficulty_level, config))
            .sum();
        estimation_xp + config.xp.completion_bonus
    }
}

pub struct LevelCalculator;

impl LevelCalculator {
    /// Total XP required to reach a level.
    pub fn xp_required(level: u32, config: &XpConfig) -> i64 {
        (config.level_base_xp * (level as f64).powf(config.level_exponent)) as i64
    }

    /// Level for a cumulative XP total. 0 for non-positive XP, otherwise at
    /// least 1 even while the total is still short of level 1's requirement.
    pub fn level_for_xp(total_xp: i64, config: &XpConfig) -> u32 {
        if total_xp <= 0 {
            return 0;
        }
        let raw = (total_xp as f64 / config.level_base_xp)
            .powf(1.0 / config.level_exponent)
            .floor();
        (raw as u32).max(1)
    }

    /// Fraction of the current level band already earned, clamped to [0, 1].
    /// A zero-width band reports 0 instead of dividing by zero.
    pub fn progress_to_next_level(total_xp: i64, config: &XpConfig) -> f64 {
        let current_level = Self::level_for_xp(total_xp, config);
        let current_level_xp = Self::xp_required(current_level, config);
        let next_level_xp = Self::xp_required(current_level.saturating_add(1), config);

        let range = next_level_xp - current_level_xp;
        if range <= 0 {
            return 0.0;
        }

        let progress = (total_xp - current_level_xp) as f64 / range as f64;
        progress.clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    #[test]
    fn test_base_awards_at_level_one() {
        let config = config();
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::SpotOn, 1, &config), 100);
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::Close, 1, &config), 60);
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::Off, 1, &config), 25);
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::WayOff, 1, &config), 10);
    }

    #[test]
    fn test_top_level_doubles_awards() {
        let config = config();
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::SpotOn, 5, &config), 200);
        assert_eq!(XpEngine::xp_for_estimation(AccuracyRating::WayOff, 5, &config), 20);
    }

    #[test]
    fn test_award_never_shrinks_as_level_rises() {
        let config = config();
        for rating in [
            AccuracyRating::SpotOn,
            AccuracyRating::Close,
            AccuracyRating::Off,
            AccuracyRating::WayOff,
        ] {
            let mut previous = 0;
            for level in 1..=5 {
                let xp = XpEngine::xp_for_estimation(rating, level, &config);
                assert!(xp >= previous, "{rating:?} shrank at level {level}");
                previous = xp;
            }
        }
    }

    #[test]
    fn test_session_sums_and_adds_flat_bonus() {
        let config = config();
        let ratings = [AccuracyRating::SpotOn, AccuracyRating::Close, AccuracyRating::Off];
        assert_eq!(XpEngine::xp_for_session(&ratings, 1, &config), 205);
    }

    #[test]
    fn test_completion_bonus_is_not_multiplied() {
        let config = config();
        let xp = XpEngine::xp_for_session(&[AccuracyRating::SpotOn], 5, &config);
        // 200 scaled estimation XP plus the unscaled 20
        assert_eq!(xp, 220);
    }

    #[test]
    fn test_empty_session_still_earns_bonus() {
        assert_eq!(XpEngine::xp_for_session(&[], 3, &config()), 20);
    }

    #[test]
    fn test_xp_required_curve() {
        let xp = XpConfig::default();
        assert_eq!(LevelCalculator::xp_required(0, &xp), 0);
        assert_eq!(LevelCalculator::xp_required(1, &xp), 100);
        assert_eq!(LevelCalculator::xp_required(2, &xp), 282);
        assert_eq!(LevelCalculator::xp_required(3, &xp), 519);
        assert_eq!(LevelCalculator::xp_required(5, &xp), 1118);
    }

    #[test]
    fn test_level_for_xp() {
        let xp = XpConfig::default();
        assert_eq!(LevelCalculator::level_for_xp(0, &xp), 0);
        assert_eq!(LevelCalculator::level_for_xp(-50, &xp), 0);
        // any positive total is at least level 1
        assert_eq!(LevelCalculator::level_for_xp(1, &xp), 1);
        assert_eq!(LevelCalculator::level_for_xp(99, &xp), 1);
        assert_eq!(LevelCalculator::level_for_xp(100, &xp), 1);
        assert_eq!(LevelCalculator::level_for_xp(282, &xp), 1);
        assert_eq!(LevelCalculator::level_for_xp(283, &xp), 2);
        assert_eq!(LevelCalculator::level_for_xp(1000, &xp), 4);
    }

    #[test]
    fn test_level_never_decreases_with_more_xp() {
        let xp = XpConfig::default();
        let mut previous = 0;
        for total in (0..5000).step_by(7) {
            let level = LevelCalculator::level_for_xp(total, &xp);
            assert!(level >= previous, "level dropped at {total} xp");
            previous = level;
        }
    }

    #[test]
    fn test_progress_mid_band() {
        let xp = XpConfig::default();
        let progress = LevelCalculator::progress_to_next_level(150, &xp);
        // level 1 band runs 100..282
        assert!((progress - 50.0 / 182.0).abs() < 1e-9);
    }

    #[test]
    fn test_progress_clamps_at_band_edges() {
        let xp = XpConfig::default();
        assert_eq!(LevelCalculator::progress_to_next_level(0, &xp), 0.0);
        assert_eq!(LevelCalculator::progress_to_next_level(100, &xp), 0.0);
        // below level 1's requirement but clamped to level 1, progress floors at 0
        assert_eq!(LevelCalculator::progress_to_next_level(50, &xp), 0.0);
        let nearly_there = LevelCalculator::progress_to_next_level(281, &xp);
        assert!(nearly_there > 0.9 && nearly_there <= 1.0);
    }

    #[test]
    fn test_progress_guards_zero_width_band() {
        let xp = XpConfig {
            level_base_xp: 1.0,
            level_exponent: 0.0001,
            ..XpConfig::default()
        };
        assert_eq!(LevelCalculator::progress_to_next_level(5, &xp), 0.0);
    }
}
