//! Aggregation engine: progress of a daily summary against its goals
//!
//! Progress ratios are clamped to `[0, 1]` so a bar never passes 100%, while
//! `remaining` keeps its true sign and goes negative on overage. A goal of zero
//! (or below) yields 0% progress instead of NaN or infinity.

use crate::models::DailyNutritionSummary;
use serde::{Deserialize, Serialize};

/// Progress of one tracked quantity against its goal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacroProgress {
    pub total: f64,
    pub goal: f64,
    /// `min(total / goal, 1)`, 0 when the goal is not positive
    pub progress: f64,
    /// `goal - total`; negative means over goal
    pub remaining: f64,
}

impl MacroProgress {
    pub fn new(total: f64, goal: f64) -> Self {
        Self {
            total,
            goal,
            progress: progress_ratio(total, goal),
            remaining: goal - total,
        }
    }

    pub fn is_over_goal(&self) -> bool {
        self.remaining < 0.0
    }

    /// Progress as a whole percentage, for labels
    pub fn percent(&self) -> u32 {
        (self.progress * 100.0).round() as u32
    }
}

/// Progress for every tracked quantity of a day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NutritionProgress {
    pub calories: MacroProgress,
    pub protein: MacroProgress,
    pub carbs: MacroProgress,
    pub fats: MacroProgress,
    pub water: MacroProgress,
}

impl NutritionProgress {
    pub fn from_summary(summary: &DailyNutritionSummary) -> Self {
        Self {
            calories: MacroProgress::new(summary.total_calories as f64, summary.goal_calories),
            protein: MacroProgress::new(summary.total_protein as f64, summary.goal_protein),
            carbs: MacroProgress::new(summary.total_carbs as f64, summary.goal_carbs),
            fats: MacroProgress::new(summary.total_fats as f64, summary.goal_fats),
            water: MacroProgress::new(summary.total_water as f64, summary.goal_water),
        }
    }
}

/// `min(total / goal, 1)` with non-positive or non-finite inputs mapped to 0
pub fn progress_ratio(total: f64, goal: f64) -> f64 {
    if !goal.is_finite() || !total.is_finite() || goal <= 0.0 {
        return 0.0;
    }
    (total / goal).clamp(0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    fn summary(total_calories: i64, goal_calories: f64) -> DailyNutritionSummary {
        DailyNutritionSummary {
            date: NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
            total_calories,
            total_protein: 75,
            total_carbs: 0,
            total_fats: 70,
            total_water: 500,
            goal_calories,
            goal_protein: 150.0,
            goal_carbs: 250.0,
            goal_fats: 65.0,
            goal_water: 2000.0,
            log_count: 2,
        }
    }

    #[test]
    fn test_progress_under_goal() {
        let progress = NutritionProgress::from_summary(&summary(800, 2000.0));
        assert!((progress.calories.progress - 0.4).abs() < 1e-12);
        assert_eq!(progress.calories.remaining, 1200.0);
        assert!((progress.protein.progress - 0.5).abs() < 1e-12);
        assert!((progress.water.progress - 0.25).abs() < 1e-12);
        assert_eq!(progress.carbs.progress, 0.0);
    }

    #[test]
    fn test_over_goal_clamps_progress_but_not_remaining() {
        let progress = NutritionProgress::from_summary(&summary(2500, 2000.0));
        assert_eq!(progress.calories.progress, 1.0);
        assert_eq!(progress.calories.remaining, -500.0);
        assert!(progress.calories.is_over_goal());
        assert_eq!(progress.fats.progress, 1.0);
        assert_eq!(progress.fats.remaining, -5.0);
    }

    #[test]
    fn test_zero_goal_is_zero_progress() {
        let progress = NutritionProgress::from_summary(&summary(0, 0.0));
        assert_eq!(progress.calories.progress, 0.0);
        assert_eq!(progress.calories.remaining, 0.0);

        let progress = NutritionProgress::from_summary(&summary(300, 0.0));
        assert_eq!(progress.calories.progress, 0.0);
        assert_eq!(progress.calories.remaining, -300.0);
    }

    #[test]
    fn test_percent_label() {
        assert_eq!(MacroProgress::new(1.0, 3.0).percent(), 33);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_progress_is_bounded(total in 0.0f64..100000.0, goal in -100.0f64..10000.0) {
            let p = MacroProgress::new(total, goal);
            prop_assert!(p.progress >= 0.0 && p.progress <= 1.0);
            prop_assert!(!p.progress.is_nan());
        }

        #[test]
        fn prop_remaining_keeps_sign(total in 0.0f64..10000.0, goal in 1.0f64..10000.0) {
            let p = MacroProgress::new(total, goal);
            prop_assert!((p.remaining - (goal - total)).abs() < 1e-9);
            prop_assert_eq!(p.is_over_goal(), total > goal);
        }
    }
}
