//! Nutrition repository - food catalog and food logs
//!
//! Food logs hold a weak reference to the catalog: the food name and the
//! pre-multiplied totals are copied in at write time, so history survives
//! catalog edits and custom-food deletions.

use crate::error::{StorageError, StorageResult};
use crate::repositories::{goals, hydration};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fitness_rpg_shared::dates::{
    date_bucket, format_date_bucket, format_timestamp, parse_date_bucket, parse_timestamp,
};
use fitness_rpg_shared::{
    DailyNutritionSummary, Food, FoodSource, Macros, MealLogs, MealType, NutritionGoals,
    NutritionLog,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

/// Maximum number of rows a food search returns
pub const SEARCH_LIMIT: usize = 50;

// ============================================================================
// Foods
// ============================================================================

/// Food record from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct FoodRecord {
    pub id: String,
    pub name_en: String,
    pub name_ru: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub source: String,
    pub usda_fdc_id: Option<String>,
    pub is_custom: bool,
}

impl TryFrom<FoodRecord> for Food {
    type Error = StorageError;

    fn try_from(record: FoodRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            name_en: record.name_en,
            name_ru: record.name_ru,
            calories: record.calories,
            protein: record.protein,
            carbs: record.carbs,
            fats: record.fats,
            serving_size: record.serving_size,
            serving_unit: record.serving_unit,
            source: record.source.parse()?,
            external_id: record.usda_fdc_id,
            is_custom: record.is_custom,
        })
    }
}

const FOOD_COLUMNS: &str = r#"
    f.id, f.name_en, f.name_ru, f.calories, f.protein, f.carbs, f.fats,
    f.serving_size, f.serving_unit, f.source, f.usda_fdc_id, f.is_custom
"#;

/// Built-in catalog: id, English name, Russian name, kcal, protein, carbs, fats, unit
///
/// Values are per 100 g (or 100 ml for drinks).
const CATALOG: &[(&str, &str, &str, f64, f64, f64, f64, &str)] = &[
    // Fruits
    ("f1", "Apple", "Яблоко", 52.0, 0.3, 14.0, 0.2, "g"),
    ("f2", "Banana", "Банан", 89.0, 1.1, 23.0, 0.3, "g"),
    ("f3", "Orange", "Апельсин", 47.0, 0.9, 12.0, 0.1, "g"),
    ("f4", "Strawberries", "Клубника", 32.0, 0.7, 8.0, 0.3, "g"),
    // Vegetables
    ("v1", "Broccoli", "Брокколи", 34.0, 2.8, 7.0, 0.4, "g"),
    ("v2", "Carrot", "Морковь", 41.0, 0.9, 10.0, 0.2, "g"),
    ("v3", "Tomato", "Помидор", 18.0, 0.9, 4.0, 0.2, "g"),
    ("v4", "Cucumber", "Огурец", 15.0, 0.7, 3.6, 0.1, "g"),
    // Proteins
    ("p1", "Chicken Breast", "Куриная грудка", 165.0, 31.0, 0.0, 3.6, "g"),
    ("p2", "Salmon", "Лосось", 208.0, 20.0, 0.0, 13.0, "g"),
    ("p3", "Egg", "Яйцо", 155.0, 13.0, 1.1, 11.0, "g"),
    ("p4", "Greek Yogurt", "Греческий йогурт", 59.0, 10.0, 3.6, 0.4, "g"),
    ("p5", "Beef Steak", "Говяжий стейк", 271.0, 25.0, 0.0, 19.0, "g"),
    // Grains
    ("c1", "White Rice", "Белый рис", 130.0, 2.7, 28.0, 0.3, "g"),
    ("c2", "Brown Rice", "Коричневый рис", 111.0, 2.6, 23.0, 0.9, "g"),
    ("c3", "Oatmeal", "Овсянка", 68.0, 2.4, 12.0, 1.4, "g"),
    ("c4", "Whole Wheat Bread", "Цельнозерновой хлеб", 247.0, 13.0, 41.0, 3.4, "g"),
    ("c5", "Pasta", "Макароны", 131.0, 5.0, 25.0, 1.1, "g"),
    // Dairy
    ("d1", "Milk", "Молоко", 42.0, 3.4, 5.0, 1.0, "ml"),
    ("d2", "Cheese", "Сыр", 402.0, 25.0, 1.3, 33.0, "g"),
    // Nuts
    ("n1", "Almonds", "Миндаль", 579.0, 21.0, 22.0, 50.0, "g"),
    ("n2", "Peanut Butter", "Арахисовое масло", 588.0, 25.0, 20.0, 50.0, "g"),
    // Beverages
    ("b1", "Coffee", "Кофе", 2.0, 0.3, 0.0, 0.0, "ml"),
    ("b2", "Orange Juice", "Апельсиновый сок", 45.0, 0.7, 10.0, 0.2, "ml"),
    ("b3", "Green Tea", "Зеленый чай", 1.0, 0.0, 0.0, 0.0, "ml"),
];

/// The built-in catalog as domain values
pub fn builtin_catalog() -> Vec<Food> {
    CATALOG
        .iter()
        .map(
            |&(id, name_en, name_ru, calories, protein, carbs, fats, unit)| Food {
                id: id.to_string(),
                name_en: name_en.to_string(),
                name_ru: Some(name_ru.to_string()),
                calories,
                protein,
                carbs,
                fats,
                serving_size: 100.0,
                serving_unit: unit.to_string(),
                source: FoodSource::Local,
                external_id: None,
                is_custom: false,
            },
        )
        .collect()
}

/// Food catalog repository
#[derive(Clone)]
pub struct FoodRepository {
    pool: SqlitePool,
}

impl FoodRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Case-insensitive substring search on the English name
    ///
    /// At most 50 rows, alphabetical. No minimum query length is imposed here;
    /// an empty query matches every food. Case folding is Unicode-aware, so it
    /// runs here rather than in SQLite, whose `LOWER` only folds ASCII.
    pub async fn search(&self, query: &str) -> StorageResult<Vec<Food>> {
        let needle = query.to_lowercase();

        let records = sqlx::query_as::<_, FoodRecord>(&format!(
            r#"
            SELECT {FOOD_COLUMNS}
            FROM foods f
            ORDER BY f.name_en ASC, f.id ASC
            "#
        ))
        .fetch_all(&self.pool)
        .await?;

        let foods = records
            .into_iter()
            .filter(|record| name_matches(&record.name_en, &needle))
            .take(SEARCH_LIMIT)
            .map(Food::try_from)
            .collect::<StorageResult<Vec<_>>>()?;

        debug!(query, results = foods.len(), "Food search");
        Ok(foods)
    }

    /// Find food by ID
    pub async fn get_by_id(&self, food_id: &str) -> StorageResult<Option<Food>> {
        let record = sqlx::query_as::<_, FoodRecord>(&format!(
            "SELECT {FOOD_COLUMNS} FROM foods f WHERE f.id = ?"
        ))
        .bind(food_id)
        .fetch_optional(&self.pool)
        .await?;

        record.map(Food::try_from).transpose()
    }

    /// Insert a food; an existing id is a `WriteConflict`
    pub async fn create(&self, food: &Food) -> StorageResult<()> {
        let mut conn = self.pool.acquire().await?;
        insert_food(&mut conn, food).await?;
        info!(food_id = %food.id, name = %food.name_en, custom = food.is_custom, "Food created");
        Ok(())
    }

    /// Delete a user-created food; catalog foods and unknown ids are left alone
    pub async fn delete_custom(&self, food_id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM foods WHERE id = ? AND is_custom = 1")
            .bind(food_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Number of foods in the catalog
    pub async fn count(&self) -> StorageResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM foods")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Insert the built-in catalog if the table is empty
    ///
    /// Returns the number of foods inserted, 0 when the catalog was already
    /// populated.
    pub async fn seed_catalog(&self) -> StorageResult<usize> {
        let mut tx = self.pool.begin().await?;

        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM foods")
            .fetch_one(&mut *tx)
            .await?;
        if existing > 0 {
            debug!(existing, "Food catalog already populated");
            return Ok(0);
        }

        let foods = builtin_catalog();
        for food in &foods {
            insert_food(&mut tx, food).await?;
        }
        tx.commit().await?;

        info!(count = foods.len(), "Food catalog seeded");
        Ok(foods.len())
    }
}

async fn insert_food(conn: &mut SqliteConnection, food: &Food) -> StorageResult<()> {
    sqlx::query(
        r#"
        INSERT INTO foods (
            id, name_en, name_ru, calories, protein, carbs, fats,
            serving_size, serving_unit, source, usda_fdc_id, is_custom
        )
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&food.id)
    .bind(&food.name_en)
    .bind(&food.name_ru)
    .bind(food.calories)
    .bind(food.protein)
    .bind(food.carbs)
    .bind(food.fats)
    .bind(food.serving_size)
    .bind(&food.serving_unit)
    .bind(food.source.as_str())
    .bind(&food.external_id)
    .bind(food.is_custom)
    .execute(&mut *conn)
    .await?;

    Ok(())
}

/// Substring match of an already lowercased needle against a food name
fn name_matches(name: &str, needle: &str) -> bool {
    name.to_lowercase().contains(needle)
}

// ============================================================================
// Food Logs
// ============================================================================

/// Food log record from the database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct NutritionLogRecord {
    pub id: String,
    pub user_id: String,
    pub food_id: String,
    pub food_name: String,
    pub meal_type: String,
    pub servings: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub logged_at: String,
    pub date: String,
}

impl TryFrom<NutritionLogRecord> for NutritionLog {
    type Error = StorageError;

    fn try_from(record: NutritionLogRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            food_id: record.food_id,
            food_name: record.food_name,
            meal_type: record.meal_type.parse()?,
            servings: record.servings,
            calories: record.calories,
            protein: record.protein,
            carbs: record.carbs,
            fats: record.fats,
            logged_at: parse_timestamp(&record.logged_at)?,
            date: parse_date_bucket(&record.date)?,
        })
    }
}

/// Input for logging food
///
/// `per_serving` holds the catalog values for one serving; totals are computed
/// at write time. Precondition: `servings > 0` (checked by callers, not here).
#[derive(Debug, Clone)]
pub struct CreateFoodLog {
    pub user_id: String,
    pub food_id: String,
    pub food_name: String,
    pub meal_type: MealType,
    pub servings: f64,
    pub per_serving: Macros,
    pub logged_at: DateTime<FixedOffset>,
}

impl CreateFoodLog {
    fn into_log(self) -> NutritionLog {
        let totals = self.per_serving.scaled(self.servings);
        NutritionLog {
            id: Uuid::new_v4().to_string(),
            date: date_bucket(&self.logged_at),
            logged_at: self.logged_at.with_timezone(&Utc),
            user_id: self.user_id,
            food_id: self.food_id,
            food_name: self.food_name,
            meal_type: self.meal_type,
            servings: self.servings,
            calories: totals.calories,
            protein: totals.protein,
            carbs: totals.carbs,
            fats: totals.fats,
        }
    }
}

const LOG_COLUMNS: &str = r#"
    id, user_id, food_id, food_name, meal_type, servings,
    calories, protein, carbs, fats, logged_at, date
"#;

/// Food log repository
#[derive(Clone)]
pub struct NutritionLogRepository {
    pool: SqlitePool,
}

impl NutritionLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Log a food with totals = per serving × servings
    pub async fn add(&self, input: CreateFoodLog) -> StorageResult<NutritionLog> {
        let log = input.into_log();
        let mut conn = self.pool.acquire().await?;
        insert_log(&mut conn, &log).await?;

        info!(
            user_id = %log.user_id,
            food = %log.food_name,
            meal = %log.meal_type,
            date = %log.date,
            "Food logged"
        );
        Ok(log)
    }

    /// Log several foods in one transaction; all or none are stored
    pub async fn add_all(&self, inputs: Vec<CreateFoodLog>) -> StorageResult<Vec<NutritionLog>> {
        let logs: Vec<NutritionLog> = inputs.into_iter().map(CreateFoodLog::into_log).collect();

        let mut tx = self.pool.begin().await?;
        for log in &logs {
            insert_log(&mut tx, log).await?;
        }
        tx.commit().await?;

        info!(count = logs.len(), "Food logs added");
        Ok(logs)
    }

    /// Distinct catalog foods from the user's logs, most recently logged first
    ///
    /// Logs whose food is no longer in the catalog are skipped.
    pub async fn get_recent_foods(&self, user_id: &str, limit: i64) -> StorageResult<Vec<Food>> {
        let records = sqlx::query_as::<_, FoodRecord>(&format!(
            r#"
            SELECT {FOOD_COLUMNS}, MAX(l.logged_at) AS last_logged_at
            FROM nutrition_logs l
            JOIN foods f ON f.id = l.food_id
            WHERE l.user_id = ?
            GROUP BY f.id
            ORDER BY last_logged_at DESC, f.id ASC
            LIMIT ?
            "#
        ))
        .bind(user_id)
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        records.into_iter().map(Food::try_from).collect()
    }

    /// Food logs in a date bucket, oldest first
    pub async fn get_by_date(&self, user_id: &str, date: NaiveDate) -> StorageResult<Vec<NutritionLog>> {
        let mut conn = self.pool.acquire().await?;
        logs_on(&mut conn, user_id, date).await
    }

    /// A date's logs split into the four meal buckets
    pub async fn get_meal_logs(&self, user_id: &str, date: NaiveDate) -> StorageResult<MealLogs> {
        Ok(MealLogs::from_logs(self.get_by_date(user_id, date).await?))
    }

    /// Totals for a date bucket paired with the user's goals
    pub async fn get_daily_summary(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> StorageResult<DailyNutritionSummary> {
        let mut tx = self.pool.begin().await?;
        let summary = summary_on(&mut tx, user_id, date).await?;
        tx.commit().await?;
        Ok(summary)
    }

    /// Summary and meal buckets read from the same snapshot
    pub async fn get_day(
        &self,
        user_id: &str,
        date: NaiveDate,
    ) -> StorageResult<(DailyNutritionSummary, MealLogs)> {
        let mut tx = self.pool.begin().await?;
        let summary = summary_on(&mut tx, user_id, date).await?;
        let logs = logs_on(&mut tx, user_id, date).await?;
        tx.commit().await?;
        Ok((summary, MealLogs::from_logs(logs)))
    }

    /// Whether the user logged any food in a date bucket
    pub async fn has_logged_on(&self, user_id: &str, date: NaiveDate) -> StorageResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM nutrition_logs WHERE user_id = ? AND date = ?")
                .bind(user_id)
                .bind(format_date_bucket(date))
                .fetch_one(&self.pool)
                .await?;
        Ok(count > 0)
    }

    /// Delete a food log; unknown ids are a no-op
    pub async fn delete(&self, log_id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM nutrition_logs WHERE id = ?")
            .bind(log_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(log_id, "Food log deleted");
        }
        Ok(deleted)
    }
}

async fn insert_log(conn: &mut SqliteConnection, log: &NutritionLog) -> StorageResult<()> {
    sqlx::query(&format!(
        "INSERT INTO nutrition_logs ({LOG_COLUMNS}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)"
    ))
    .bind(&log.id)
    .bind(&log.user_id)
    .bind(&log.food_id)
    .bind(&log.food_name)
    .bind(log.meal_type.as_str())
    .bind(log.servings)
    .bind(log.calories)
    .bind(log.protein)
    .bind(log.carbs)
    .bind(log.fats)
    .bind(format_timestamp(&log.logged_at))
    .bind(format_date_bucket(log.date))
    .execute(&mut *conn)
    .await?;

    Ok(())
}

async fn logs_on(
    conn: &mut SqliteConnection,
    user_id: &str,
    date: NaiveDate,
) -> StorageResult<Vec<NutritionLog>> {
    let records = sqlx::query_as::<_, NutritionLogRecord>(&format!(
        r#"
        SELECT {LOG_COLUMNS}
        FROM nutrition_logs
        WHERE user_id = ? AND date = ?
        ORDER BY logged_at ASC, id ASC
        "#
    ))
    .bind(user_id)
    .bind(format_date_bucket(date))
    .fetch_all(&mut *conn)
    .await?;

    debug!(user_id, date = %date, count = records.len(), "Loaded food logs");
    records.into_iter().map(NutritionLog::try_from).collect()
}

async fn summary_on(
    conn: &mut SqliteConnection,
    user_id: &str,
    date: NaiveDate,
) -> StorageResult<DailyNutritionSummary> {
    let (calories, protein, carbs, fats, log_count): (f64, f64, f64, f64, i64) = sqlx::query_as(
        r#"
        SELECT TOTAL(calories), TOTAL(protein), TOTAL(carbs), TOTAL(fats), COUNT(*)
        FROM nutrition_logs
        WHERE user_id = ? AND date = ?
        "#,
    )
    .bind(user_id)
    .bind(format_date_bucket(date))
    .fetch_one(&mut *conn)
    .await?;

    let water = hydration::total_for_date(conn, user_id, date).await?;
    let goals = goals::fetch_goals(conn, user_id)
        .await?
        .unwrap_or_else(|| NutritionGoals::defaults_for(user_id));

    Ok(build_summary(
        date,
        Macros::new(calories, protein, carbs, fats),
        water,
        log_count,
        &goals,
    ))
}

/// Round raw totals to whole units and attach goals
fn build_summary(
    date: NaiveDate,
    totals: Macros,
    water: f64,
    log_count: i64,
    goals: &NutritionGoals,
) -> DailyNutritionSummary {
    DailyNutritionSummary {
        date,
        total_calories: totals.calories.round() as i64,
        total_protein: totals.protein.round() as i64,
        total_carbs: totals.carbs.round() as i64,
        total_fats: totals.fats.round() as i64,
        total_water: water.round() as i64,
        goal_calories: goals.daily_calories,
        goal_protein: goals.protein_goal,
        goal_carbs: goals.carbs_goal,
        goal_fats: goals.fats_goal,
        goal_water: goals.water_goal,
        log_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_builtin_catalog_ids_are_unique() {
        let catalog = builtin_catalog();
        assert_eq!(catalog.len(), 25);

        let mut ids: Vec<&str> = catalog.iter().map(|f| f.id.as_str()).collect();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), 25);
        assert!(catalog.iter().all(|f| !f.is_custom && f.source == FoodSource::Local));
    }

    #[test]
    fn test_name_matches_folds_unicode_case() {
        assert!(name_matches("Chicken Breast", "chick"));
        assert!(name_matches("Борщ", "борщ"));
        assert!(name_matches("ÉCLAIR", "éclair"));
        assert!(name_matches("50% off", "50%"));
        assert!(!name_matches("Rice", "50%"));
    }

    #[test]
    fn test_food_log_totals_are_premultiplied() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let log = CreateFoodLog {
            user_id: "u1".to_string(),
            food_id: "p1".to_string(),
            food_name: "Chicken Breast".to_string(),
            meal_type: MealType::Dinner,
            servings: 1.5,
            per_serving: Macros::new(165.0, 31.0, 0.0, 3.6),
            logged_at: tz.with_ymd_and_hms(2024, 6, 2, 1, 30, 0).unwrap(),
        }
        .into_log();

        assert!((log.calories - 247.5).abs() < 1e-9);
        assert!((log.protein - 46.5).abs() < 1e-9);
        // Bucket follows the caller's offset, not UTC (still June 1st in UTC)
        assert_eq!(log.date, NaiveDate::from_ymd_opt(2024, 6, 2).unwrap());
        assert_eq!(format_timestamp(&log.logged_at), "2024-06-01T22:30:00.000000000Z");
    }

    #[test]
    fn test_build_summary_rounds_totals() {
        let date = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let summary = build_summary(
            date,
            Macros::new(799.6, 40.4, 100.5, 20.0),
            500.0,
            2,
            &NutritionGoals::defaults_for("u1"),
        );

        assert_eq!(summary.total_calories, 800);
        assert_eq!(summary.total_protein, 40);
        assert_eq!(summary.total_carbs, 101);
        assert_eq!(summary.total_water, 500);
        assert_eq!(summary.goal_calories, 2000.0);
        assert_eq!(summary.log_count, 2);
    }
}
