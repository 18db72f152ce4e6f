//! Progression engine
//!
//! Maps the cumulative number of completed workouts to a level, a level name
//! and level XP, and detects level transitions. Everything here is a pure
//! function of the workout count; nothing is persisted.
//!
//! Two XP concepts exist and are kept apart:
//! - level XP, `xp_for(count)`: 50 per completed workout, derived on demand
//! - session XP, `session_xp(exercises)`: 10 per completed set, stored on
//!   each workout record when the session ends

use crate::models::Exercise;
use serde::{Deserialize, Serialize};

/// Level XP awarded per completed workout
pub const XP_PER_WORKOUT: u64 = 50;

/// Session XP awarded per completed set
pub const XP_PER_COMPLETED_SET: i64 = 10;

/// A row of the level threshold table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelDef {
    pub level: u8,
    /// Inclusive lower bound on cumulative workouts
    pub min_workouts: u32,
    pub name: &'static str,
}

/// Level threshold table, ascending; the last row is terminal
pub const LEVELS: [LevelDef; 6] = [
    LevelDef { level: 0, min_workouts: 0, name: "Rookie" },
    LevelDef { level: 1, min_workouts: 5, name: "Novice" },
    LevelDef { level: 2, min_workouts: 15, name: "Intermediate" },
    LevelDef { level: 3, min_workouts: 30, name: "Advanced" },
    LevelDef { level: 4, min_workouts: 50, name: "Expert" },
    LevelDef { level: 5, min_workouts: 75, name: "Master" },
];

/// Highest level in the table
pub const MAX_LEVEL: u8 = LEVELS[LEVELS.len() - 1].level;

/// Highest level whose threshold is at or below `count`
pub fn level_for(count: u32) -> u8 {
    LEVELS
        .iter()
        .rev()
        .find(|def| def.min_workouts <= count)
        .map(|def| def.level)
        .unwrap_or(0)
}

/// Display name of a level; levels past the table clamp to the terminal name
pub fn level_name(level: u8) -> &'static str {
    let idx = usize::from(level).min(LEVELS.len() - 1);
    LEVELS[idx].name
}

/// Level XP for a cumulative workout count
pub fn xp_for(count: u32) -> u64 {
    u64::from(count) * XP_PER_WORKOUT
}

/// Workouts needed to reach the level after `level`, `None` at the terminal level
pub fn next_level_threshold(level: u8) -> Option<u32> {
    LEVELS
        .iter()
        .find(|def| def.level == level.saturating_add(1))
        .map(|def| def.min_workouts)
}

/// Level before and after a change in workout count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelTransition {
    pub leveled_up: bool,
    pub from: u8,
    pub to: u8,
}

/// Compare levels before and after a change in workout count
///
/// Callers saving a workout must pass the count read *before* the save and
/// that count plus one, never a count re-read after the save.
pub fn detect_level_up(old_count: u32, new_count: u32) -> LevelTransition {
    let from = level_for(old_count);
    let to = level_for(new_count);
    LevelTransition {
        leveled_up: to > from,
        from,
        to,
    }
}

/// Full progression snapshot for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionState {
    pub total_workouts: u32,
    pub weekly_workouts: u32,
    pub level: u8,
    pub level_name: String,
    pub xp: u64,
    pub next_level_at: Option<u32>,
    pub workouts_to_next_level: u32,
    /// `total / next threshold`, or 1.0 at the terminal level
    pub level_progress: f64,
}

impl ProgressionState {
    pub fn from_counts(total_workouts: u32, weekly_workouts: u32) -> Self {
        let level = level_for(total_workouts);
        let next_level_at = next_level_threshold(level);

        let (workouts_to_next_level, level_progress) = match next_level_at {
            Some(threshold) => (
                threshold.saturating_sub(total_workouts),
                f64::from(total_workouts) / f64::from(threshold),
            ),
            None => (0, 1.0),
        };

        Self {
            total_workouts,
            weekly_workouts,
            level,
            level_name: level_name(level).to_string(),
            xp: xp_for(total_workouts),
            next_level_at,
            workouts_to_next_level,
            level_progress,
        }
    }

    pub fn is_max_level(&self) -> bool {
        self.level >= MAX_LEVEL
    }
}

/// Session XP for a finished workout: 10 per completed set
pub fn session_xp(exercises: &[Exercise]) -> i64 {
    let completed = exercises
        .iter()
        .flat_map(|e| e.sets.iter())
        .filter(|s| s.completed)
        .count();
    completed as i64 * XP_PER_COMPLETED_SET
}

/// Badge shown for a single session, by its stored session XP
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionRank {
    Good,
    Pro,
    Elite,
    Legend,
}

impl SessionRank {
    pub fn from_xp(xp: i64) -> Self {
        match xp {
            x if x >= 200 => SessionRank::Legend,
            x if x >= 150 => SessionRank::Elite,
            x if x >= 100 => SessionRank::Pro,
            _ => SessionRank::Good,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionRank::Good => "Good",
            SessionRank::Pro => "Pro",
            SessionRank::Elite => "Elite",
            SessionRank::Legend => "Legend",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ExerciseSet, ExerciseType};
    use proptest::prelude::*;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0)]
    #[case(4, 0)]
    #[case(5, 1)]
    #[case(14, 1)]
    #[case(15, 2)]
    #[case(29, 2)]
    #[case(30, 3)]
    #[case(49, 3)]
    #[case(50, 4)]
    #[case(74, 4)]
    #[case(75, 5)]
    #[case(1000, 5)]
    fn test_level_thresholds(#[case] count: u32, #[case] expected: u8) {
        assert_eq!(level_for(count), expected);
    }

    #[rstest]
    #[case(0, "Rookie")]
    #[case(1, "Novice")]
    #[case(2, "Intermediate")]
    #[case(3, "Advanced")]
    #[case(4, "Expert")]
    #[case(5, "Master")]
    #[case(9, "Master")]
    fn test_level_names(#[case] level: u8, #[case] expected: &str) {
        assert_eq!(level_name(level), expected);
    }

    #[test]
    fn test_detect_level_up() {
        assert_eq!(
            detect_level_up(4, 5),
            LevelTransition { leveled_up: true, from: 0, to: 1 }
        );
        assert_eq!(
            detect_level_up(5, 6),
            LevelTransition { leveled_up: false, from: 1, to: 1 }
        );
        assert!(!detect_level_up(75, 76).leveled_up);
    }

    #[test]
    fn test_xp_is_fifty_per_workout() {
        assert_eq!(xp_for(0), 0);
        assert_eq!(xp_for(7), 350);
    }

    #[test]
    fn test_progression_state_mid_level() {
        let state = ProgressionState::from_counts(10, 3);
        assert_eq!(state.level, 1);
        assert_eq!(state.level_name, "Novice");
        assert_eq!(state.xp, 500);
        assert_eq!(state.next_level_at, Some(15));
        assert_eq!(state.workouts_to_next_level, 5);
        assert!((state.level_progress - 10.0 / 15.0).abs() < 1e-12);
        assert!(!state.is_max_level());
    }

    #[test]
    fn test_progression_state_terminal_level() {
        let state = ProgressionState::from_counts(80, 0);
        assert!(state.is_max_level());
        assert_eq!(state.next_level_at, None);
        assert_eq!(state.workouts_to_next_level, 0);
        assert_eq!(state.level_progress, 1.0);
    }

    #[test]
    fn test_session_xp_counts_completed_sets_only() {
        let exercises = vec![Exercise {
            id: "e1".to_string(),
            name: "Bench Press".to_string(),
            exercise_type: ExerciseType::Strength,
            sets: (0..5)
                .map(|i| ExerciseSet {
                    id: format!("s{i}"),
                    reps: Some(8),
                    weight: Some(80.0),
                    duration_secs: None,
                    completed: i % 2 == 0,
                })
                .collect(),
        }];
        assert_eq!(session_xp(&exercises), 30);
        assert_eq!(session_xp(&[]), 0);
    }

    #[rstest]
    #[case(0, SessionRank::Good)]
    #[case(99, SessionRank::Good)]
    #[case(100, SessionRank::Pro)]
    #[case(150, SessionRank::Elite)]
    #[case(200, SessionRank::Legend)]
    fn test_session_rank(#[case] xp: i64, #[case] expected: SessionRank) {
        assert_eq!(SessionRank::from_xp(xp), expected);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_level_is_monotonic(a in 0u32..500, b in 0u32..500) {
            let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(level_for(lo) <= level_for(hi));
        }

        #[test]
        fn prop_level_up_iff_threshold_crossed(count in 0u32..200) {
            let transition = detect_level_up(count, count + 1);
            let crossed = LEVELS.iter().any(|def| def.min_workouts == count + 1);
            prop_assert_eq!(transition.leveled_up, crossed);
        }

        #[test]
        fn prop_progress_never_exceeds_one(count in 0u32..500) {
            let state = ProgressionState::from_counts(count, 0);
            prop_assert!(state.level_progress >= 0.0 && state.level_progress <= 1.0);
        }
    }
}
