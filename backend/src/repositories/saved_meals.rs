//! Saved meal repository
//!
//! The meal's items are stored as a JSON array in the `foods` column; totals
//! are stored alongside so listings need no decoding arithmetic.

use crate::error::{StorageError, StorageResult};
use fitness_rpg_shared::dates::{format_timestamp, parse_timestamp};
use fitness_rpg_shared::{Macros, SavedMeal, SavedMealItem};
use sqlx::SqlitePool;
use tracing::info;

/// Saved meal record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SavedMealRecord {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub foods: String,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fats: f64,
    pub created_at: String,
}

impl TryFrom<SavedMealRecord> for SavedMeal {
    type Error = StorageError;

    fn try_from(record: SavedMealRecord) -> Result<Self, Self::Error> {
        let foods: Vec<SavedMealItem> = serde_json::from_str(&record.foods)?;
        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            name: record.name,
            foods,
            totals: Macros::new(
                record.total_calories,
                record.total_protein,
                record.total_carbs,
                record.total_fats,
            ),
            created_at: parse_timestamp(&record.created_at)?,
        })
    }
}

const SAVED_MEAL_COLUMNS: &str = r#"
    id, user_id, name, foods, total_calories, total_protein,
    total_carbs, total_fats, created_at
"#;

/// Saved meal repository
#[derive(Clone)]
pub struct SavedMealRepository {
    pool: SqlitePool,
}

impl SavedMealRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Store a saved meal; an existing id is a `WriteConflict`
    pub async fn create(&self, meal: &SavedMeal) -> StorageResult<()> {
        let foods = serde_json::to_string(&meal.foods)?;

        sqlx::query(&format!(
            "INSERT INTO saved_meals ({SAVED_MEAL_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)"
        ))
        .bind(&meal.id)
        .bind(&meal.user_id)
        .bind(&meal.name)
        .bind(foods)
        .bind(meal.totals.calories)
        .bind(meal.totals.protein)
        .bind(meal.totals.carbs)
        .bind(meal.totals.fats)
        .bind(format_timestamp(&meal.created_at))
        .execute(&self.pool)
        .await?;

        info!(meal_id = %meal.id, items = meal.foods.len(), "Saved meal created");
        Ok(())
    }

    /// Find a saved meal by ID
    pub async fn get(&self, meal_id: &str) -> StorageResult<Option<SavedMeal>> {
        let record = sqlx::query_as::<_, SavedMealRecord>(&format!(
            "SELECT {SAVED_MEAL_COLUMNS} FROM saved_meals WHERE id = ?"
        ))
        .bind(meal_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(SavedMeal::try_from).transpose()
    }

    /// A user's saved meals, newest first
    pub async fn list(&self, user_id: &str) -> StorageResult<Vec<SavedMeal>> {
        let records = sqlx::query_as::<_, SavedMealRecord>(&format!(
            r#"
            SELECT {SAVED_MEAL_COLUMNS}
            FROM saved_meals
            WHERE user_id = ?
            ORDER BY created_at DESC, id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(SavedMeal::try_from).collect()
    }

    /// Delete a saved meal; unknown ids are a no-op
    pub async fn delete(&self, meal_id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM saved_meals WHERE id = ?")
            .bind(meal_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_with_bad_json_is_corrupt() {
        let record = SavedMealRecord {
            id: "m1".to_string(),
            user_id: "u1".to_string(),
            name: "Broken".to_string(),
            foods: "not json".to_string(),
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fats: 0.0,
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
        };

        assert!(matches!(
            SavedMeal::try_from(record),
            Err(StorageError::Corrupt(_))
        ));
    }
}
