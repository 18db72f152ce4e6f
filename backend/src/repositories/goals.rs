//! Nutrition goals repository
//!
//! One row per user. A missing row is not an error: readers fall back to the
//! documented defaults. A stored zero goal is kept as zero.

use crate::error::StorageResult;
use fitness_rpg_shared::NutritionGoals;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

/// Nutrition goals record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NutritionGoalsRecord {
    pub user_id: String,
    pub daily_calories: f64,
    pub protein_goal: f64,
    pub carbs_goal: f64,
    pub fats_goal: f64,
    pub water_goal: f64,
}

impl From<NutritionGoalsRecord> for NutritionGoals {
    fn from(record: NutritionGoalsRecord) -> Self {
        Self {
            user_id: record.user_id,
            daily_calories: record.daily_calories,
            protein_goal: record.protein_goal,
            carbs_goal: record.carbs_goal,
            fats_goal: record.fats_goal,
            water_goal: record.water_goal,
        }
    }
}

/// Nutrition goals repository
#[derive(Clone)]
pub struct NutritionGoalsRepository {
    pool: SqlitePool,
}

impl NutritionGoalsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Stored goals of a user, if any
    pub async fn get(&self, user_id: &str) -> StorageResult<Option<NutritionGoals>> {
        let mut conn = self.pool.acquire().await?;
        fetch_goals(&mut conn, user_id).await
    }

    /// Stored goals, or the defaults when the user has none
    pub async fn get_or_default(&self, user_id: &str) -> StorageResult<NutritionGoals> {
        Ok(self
            .get(user_id)
            .await?
            .unwrap_or_else(|| NutritionGoals::defaults_for(user_id)))
    }

    /// Insert the default goals row unless one exists
    ///
    /// Returns true if a row was inserted.
    pub async fn ensure_defaults(&self, user_id: &str) -> StorageResult<bool> {
        let defaults = NutritionGoals::defaults_for(user_id);
        let result = sqlx::query(
            r#"
            INSERT INTO nutrition_goals
                (user_id, daily_calories, protein_goal, carbs_goal, fats_goal, water_goal)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(&defaults.user_id)
        .bind(defaults.daily_calories)
        .bind(defaults.protein_goal)
        .bind(defaults.carbs_goal)
        .bind(defaults.fats_goal)
        .bind(defaults.water_goal)
        .execute(&self.pool)
        .await?;

        let inserted = result.rows_affected() > 0;
        if inserted {
            info!(user_id, "Default nutrition goals created");
        }
        Ok(inserted)
    }

    /// Replace a user's goals
    pub async fn upsert(&self, goals: &NutritionGoals) -> StorageResult<NutritionGoals> {
        let record = sqlx::query_as::<_, NutritionGoalsRecord>(
            r#"
            INSERT INTO nutrition_goals
                (user_id, daily_calories, protein_goal, carbs_goal, fats_goal, water_goal)
            VALUES (?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id) DO UPDATE SET
                daily_calories = excluded.daily_calories,
                protein_goal = excluded.protein_goal,
                carbs_goal = excluded.carbs_goal,
                fats_goal = excluded.fats_goal,
                water_goal = excluded.water_goal
            RETURNING user_id, daily_calories, protein_goal, carbs_goal, fats_goal, water_goal
            "#,
        )
        .bind(&goals.user_id)
        .bind(goals.daily_calories)
        .bind(goals.protein_goal)
        .bind(goals.carbs_goal)
        .bind(goals.fats_goal)
        .bind(goals.water_goal)
        .fetch_one(&self.pool)
        .await?;

        info!(user_id = %goals.user_id, "Nutrition goals updated");
        Ok(record.into())
    }
}

/// Read goals on an already-open connection or transaction
pub(crate) async fn fetch_goals(
    conn: &mut SqliteConnection,
    user_id: &str,
) -> StorageResult<Option<NutritionGoals>> {
    let record = sqlx::query_as::<_, NutritionGoalsRecord>(
        r#"
        SELECT user_id, daily_calories, protein_goal, carbs_goal, fats_goal, water_goal
        FROM nutrition_goals
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?;

    debug!(user_id, found = record.is_some(), "Loaded nutrition goals");
    Ok(record.map(Into::into))
}
