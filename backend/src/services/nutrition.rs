//! Nutrition service
//!
//! The caller boundary for nutrition: inputs are validated here (repositories
//! accept whatever they are given), meal types arrive as text, and every write
//! takes the caller's wall-clock time with its UTC offset so the date bucket is
//! the caller's calendar day.

use crate::error::{StorageError, StorageResult};
use crate::repositories::{CreateFoodLog, CreateWaterLog};
use crate::state::AppState;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fitness_rpg_shared::dates::date_bucket;
use fitness_rpg_shared::validation::{
    is_searchable_query, parse_meal_type, validate_nutrient, validate_servings, validate_user_id,
    validate_water_amount,
};
use fitness_rpg_shared::{
    DailyNutritionSummary, Food, FoodSource, Macros, MealLogs, NutritionDay, NutritionGoals,
    NutritionLog, NutritionProgress, SavedMeal, SavedMealItem, ValidationError, WaterLog,
};
use tracing::{debug, info};
use uuid::Uuid;

/// Number of recent foods returned when the caller does not ask for a limit
pub const DEFAULT_RECENT_FOODS_LIMIT: i64 = 10;

/// A food to log, with the catalog values for one serving
#[derive(Debug, Clone)]
pub struct FoodLogInput {
    pub food_id: String,
    pub food_name: String,
    pub meal_type: String,
    pub servings: f64,
    pub per_serving: Macros,
}

impl FoodLogInput {
    /// Log `servings` of a catalog food
    pub fn for_food(food: &Food, meal_type: impl Into<String>, servings: f64) -> Self {
        Self {
            food_id: food.id.clone(),
            food_name: food.name_en.clone(),
            meal_type: meal_type.into(),
            servings,
            per_serving: food.per_serving(),
        }
    }
}

/// A user-created food
#[derive(Debug, Clone)]
pub struct CustomFoodInput {
    pub name: String,
    pub per_serving: Macros,
    pub serving_size: f64,
    pub serving_unit: String,
}

/// Nutrition service for business logic
pub struct NutritionService;

impl NutritionService {
    // ========================================================================
    // Foods
    // ========================================================================

    /// Search the catalog; queries under two characters return nothing
    pub async fn search_foods(state: &AppState, query: &str) -> StorageResult<Vec<Food>> {
        if !is_searchable_query(query) {
            debug!(query, "Search query too short");
            return Ok(Vec::new());
        }
        state.foods.search(query.trim()).await
    }

    /// Foods the user logged most recently, distinct
    pub async fn recent_foods(
        state: &AppState,
        user_id: &str,
        limit: Option<i64>,
    ) -> StorageResult<Vec<Food>> {
        validate_user_id(user_id)?;
        state
            .food_logs
            .get_recent_foods(user_id, limit.unwrap_or(DEFAULT_RECENT_FOODS_LIMIT))
            .await
    }

    /// Add a custom food to the catalog
    pub async fn create_custom_food(state: &AppState, input: CustomFoodInput) -> StorageResult<Food> {
        if input.name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" }.into());
        }
        validate_macros(&input.per_serving)?;
        validate_servings(input.serving_size)?;

        let food = Food {
            id: Uuid::new_v4().to_string(),
            name_en: input.name.trim().to_string(),
            name_ru: None,
            calories: input.per_serving.calories,
            protein: input.per_serving.protein,
            carbs: input.per_serving.carbs,
            fats: input.per_serving.fats,
            serving_size: input.serving_size,
            serving_unit: input.serving_unit,
            source: FoodSource::Custom,
            external_id: None,
            is_custom: true,
        };
        state.foods.create(&food).await?;
        Ok(food)
    }

    // ========================================================================
    // Food logs
    // ========================================================================

    /// Log a food at `at`, storing per serving × servings
    pub async fn add_food_log(
        state: &AppState,
        user_id: &str,
        input: FoodLogInput,
        at: DateTime<FixedOffset>,
    ) -> StorageResult<NutritionLog> {
        validate_user_id(user_id)?;
        validate_servings(input.servings)?;
        validate_macros(&input.per_serving)?;
        let meal_type = parse_meal_type(&input.meal_type)?;

        state
            .food_logs
            .add(CreateFoodLog {
                user_id: user_id.to_string(),
                food_id: input.food_id,
                food_name: input.food_name,
                meal_type,
                servings: input.servings,
                per_serving: input.per_serving,
                logged_at: at,
            })
            .await
    }

    /// Delete a food log; unknown ids are a no-op
    pub async fn delete_food_log(state: &AppState, log_id: &str) -> StorageResult<bool> {
        state.food_logs.delete(log_id).await
    }

    /// Record water intake (ml) at `at`
    pub async fn log_water(
        state: &AppState,
        user_id: &str,
        amount: f64,
        at: DateTime<FixedOffset>,
    ) -> StorageResult<WaterLog> {
        validate_user_id(user_id)?;
        validate_water_amount(amount)?;

        state
            .water_logs
            .log(CreateWaterLog {
                user_id: user_id.to_string(),
                amount,
                logged_at: at,
            })
            .await
    }

    /// Delete a water log; unknown ids are a no-op
    pub async fn delete_water_log(state: &AppState, log_id: &str) -> StorageResult<bool> {
        state.water_logs.delete(log_id).await
    }

    // ========================================================================
    // Day views
    // ========================================================================

    pub async fn daily_summary(
        state: &AppState,
        user_id: &str,
        date: NaiveDate,
    ) -> StorageResult<DailyNutritionSummary> {
        validate_user_id(user_id)?;
        state.food_logs.get_daily_summary(user_id, date).await
    }

    pub async fn meal_logs(state: &AppState, user_id: &str, date: NaiveDate) -> StorageResult<MealLogs> {
        validate_user_id(user_id)?;
        state.food_logs.get_meal_logs(user_id, date).await
    }

    /// Summary, meal buckets and progress for one date
    pub async fn nutrition_for_date(
        state: &AppState,
        user_id: &str,
        date: NaiveDate,
    ) -> StorageResult<NutritionDay> {
        validate_user_id(user_id)?;
        let (summary, meals) = state.food_logs.get_day(user_id, date).await?;
        let progress = NutritionProgress::from_summary(&summary);

        Ok(NutritionDay {
            summary,
            meals,
            progress,
        })
    }

    /// Whether anything was logged on the caller's current day
    pub async fn has_logged_today(
        state: &AppState,
        user_id: &str,
        now: DateTime<FixedOffset>,
    ) -> StorageResult<bool> {
        validate_user_id(user_id)?;
        state.food_logs.has_logged_on(user_id, date_bucket(&now)).await
    }

    // ========================================================================
    // Goals
    // ========================================================================

    pub async fn goals(state: &AppState, user_id: &str) -> StorageResult<NutritionGoals> {
        validate_user_id(user_id)?;
        state.goals.get_or_default(user_id).await
    }

    /// Replace a user's goals; zero is allowed, negative values are not
    pub async fn update_goals(state: &AppState, goals: NutritionGoals) -> StorageResult<NutritionGoals> {
        validate_user_id(&goals.user_id)?;
        validate_nutrient("daily_calories", goals.daily_calories)?;
        validate_nutrient("protein_goal", goals.protein_goal)?;
        validate_nutrient("carbs_goal", goals.carbs_goal)?;
        validate_nutrient("fats_goal", goals.fats_goal)?;
        validate_nutrient("water_goal", goals.water_goal)?;

        state.goals.upsert(&goals).await
    }

    // ========================================================================
    // Saved meals
    // ========================================================================

    /// Save a named group of foods for one-step logging
    pub async fn save_meal(
        state: &AppState,
        user_id: &str,
        name: &str,
        foods: Vec<SavedMealItem>,
        now: DateTime<Utc>,
    ) -> StorageResult<SavedMeal> {
        validate_user_id(user_id)?;
        if name.trim().is_empty() {
            return Err(ValidationError::Empty { field: "name" }.into());
        }
        if foods.is_empty() {
            return Err(ValidationError::Empty { field: "foods" }.into());
        }
        for item in &foods {
            validate_servings(item.servings)?;
            validate_macros(&item.per_serving)?;
        }

        let meal = SavedMeal::new(Uuid::new_v4().to_string(), user_id, name.trim(), foods, now);
        state.saved_meals.create(&meal).await?;
        Ok(meal)
    }

    pub async fn saved_meals(state: &AppState, user_id: &str) -> StorageResult<Vec<SavedMeal>> {
        validate_user_id(user_id)?;
        state.saved_meals.list(user_id).await
    }

    pub async fn delete_saved_meal(state: &AppState, meal_id: &str) -> StorageResult<bool> {
        state.saved_meals.delete(meal_id).await
    }

    /// Log every item of a saved meal under one meal type, atomically
    pub async fn log_saved_meal(
        state: &AppState,
        user_id: &str,
        meal_id: &str,
        meal_type: &str,
        at: DateTime<FixedOffset>,
    ) -> StorageResult<Vec<NutritionLog>> {
        validate_user_id(user_id)?;
        let meal_type = parse_meal_type(meal_type)?;

        let meal = state
            .saved_meals
            .get(meal_id)
            .await?
            .ok_or_else(|| StorageError::NotFound(format!("saved meal {}", meal_id)))?;

        let inputs = meal
            .foods
            .into_iter()
            .map(|item| CreateFoodLog {
                user_id: user_id.to_string(),
                food_id: item.food_id,
                food_name: item.food_name,
                meal_type,
                servings: item.servings,
                per_serving: item.per_serving,
                logged_at: at,
            })
            .collect();

        let logs = state.food_logs.add_all(inputs).await?;
        info!(user_id, meal_id, count = logs.len(), "Saved meal logged");
        Ok(logs)
    }
}

fn validate_macros(macros: &Macros) -> Result<(), ValidationError> {
    validate_nutrient("calories", macros.calories)?;
    validate_nutrient("protein", macros.protein)?;
    validate_nutrient("carbs", macros.carbs)?;
    validate_nutrient("fats", macros.fats)?;
    Ok(())
}
