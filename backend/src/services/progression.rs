//! Progression service
//!
//! Levels are derived, never stored: each call reads fresh counts and runs
//! them through the level table.

use crate::error::StorageResult;
use crate::state::AppState;
use chrono::{DateTime, Utc};
use fitness_rpg_shared::validation::validate_user_id;
use fitness_rpg_shared::ProgressionState;
use tracing::debug;

/// Progression service
pub struct ProgressionService;

impl ProgressionService {
    /// Level, XP and workout counts for a user as of `now`
    pub async fn state_for_user(
        state: &AppState,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> StorageResult<ProgressionState> {
        validate_user_id(user_id)?;

        let total = state.workouts.count(user_id).await?;
        let weekly = state.workouts.weekly_count(user_id, now).await?;
        let progression = ProgressionState::from_counts(total, weekly);

        debug!(
            user_id,
            total,
            weekly,
            level = progression.level,
            "Computed progression"
        );
        Ok(progression)
    }
}
