//! Workout service
//!
//! Validates workouts at the caller boundary and ties the atomic save to the
//! level-up check. The level before the save is computed from the count read
//! before the write, so a save that already landed is never counted twice.

use crate::error::StorageResult;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use fitness_rpg_shared::progression::{detect_level_up, session_xp};
use fitness_rpg_shared::validation::{validate_nutrient, validate_user_id};
use fitness_rpg_shared::{Exercise, LevelTransition, ValidationError, Workout};
use tracing::info;
use uuid::Uuid;

/// A finished session as captured by the caller, before ids and XP are stamped
#[derive(Debug, Clone)]
pub struct WorkoutInput {
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub exercises: Vec<Exercise>,
}

/// Workout service for business logic
pub struct WorkoutService;

impl WorkoutService {
    /// Build a workout with a fresh id and its session XP
    pub fn build(input: WorkoutInput) -> Workout {
        Workout {
            id: Uuid::new_v4().to_string(),
            xp_earned: session_xp(&input.exercises),
            user_id: input.user_id,
            start_time: input.start_time,
            end_time: input.end_time,
            notes: input.notes,
            exercises: input.exercises,
        }
    }

    /// Save a workout atomically and report whether it crossed a level
    pub async fn save_workout(state: &AppState, workout: &Workout) -> StorageResult<LevelTransition> {
        Self::validate(workout)?;

        let before = state.workouts.count(&workout.user_id).await?;
        state.workouts.save(workout).await?;

        let transition = detect_level_up(before, before.saturating_add(1));
        if transition.leveled_up {
            info!(
                user_id = %workout.user_id,
                from = transition.from,
                to = transition.to,
                "Level up"
            );
        }

        Ok(transition)
    }

    /// A user's workouts, newest first
    pub async fn list_workouts(state: &AppState, user_id: &str) -> StorageResult<Vec<Workout>> {
        validate_user_id(user_id)?;
        state.workouts.get_by_user(user_id).await
    }

    /// Delete a workout with its exercises and sets; unknown ids are a no-op
    pub async fn delete_workout(state: &AppState, workout_id: &str) -> StorageResult<bool> {
        state.workouts.delete(workout_id).await
    }

    fn validate(workout: &Workout) -> Result<(), ValidationError> {
        validate_user_id(&workout.user_id)?;
        if workout.id.trim().is_empty() {
            return Err(ValidationError::Empty { field: "id" });
        }
        for set in workout.exercises.iter().flat_map(|e| e.sets.iter()) {
            if let Some(weight) = set.weight {
                validate_nutrient("weight", weight)?;
            }
        }
        Ok(())
    }
}
