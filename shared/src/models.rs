//! Data models for the Fitness RPG application
//!
//! Two hierarchies live here: workout logs (workout → exercises → sets) and
//! nutrition logs (foods, meal logs, water logs, goals). Identifiers are opaque
//! strings supplied by the caller or generated at write time.

use crate::aggregation::NutritionProgress;
use crate::errors::ParseEnumError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Default daily calorie target (kcal)
pub const DEFAULT_DAILY_CALORIES: f64 = 2000.0;
/// Default daily protein target (g)
pub const DEFAULT_PROTEIN_GOAL: f64 = 150.0;
/// Default daily carbohydrate target (g)
pub const DEFAULT_CARBS_GOAL: f64 = 250.0;
/// Default daily fat target (g)
pub const DEFAULT_FATS_GOAL: f64 = 65.0;
/// Default daily water target (ml)
pub const DEFAULT_WATER_GOAL: f64 = 2000.0;

// ============================================================================
// Workouts
// ============================================================================

/// Exercise category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Strength,
    Cardio,
    Flexibility,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Strength => "strength",
            ExerciseType::Cardio => "cardio",
            ExerciseType::Flexibility => "flexibility",
        }
    }
}

impl FromStr for ExerciseType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "strength" => Ok(ExerciseType::Strength),
            "cardio" => Ok(ExerciseType::Cardio),
            "flexibility" => Ok(ExerciseType::Flexibility),
            other => Err(ParseEnumError::new("exercise type", other)),
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One set of an exercise
///
/// Position within the parent exercise is the index in `Exercise::sets`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseSet {
    pub id: String,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    /// Duration in seconds, for cardio
    pub duration_secs: Option<i32>,
    pub completed: bool,
}

/// An exercise within a workout, owning its ordered sets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: String,
    pub name: String,
    pub exercise_type: ExerciseType,
    pub sets: Vec<ExerciseSet>,
}

/// A finished workout session, owning its ordered exercises
///
/// Created fully populated in a single write and never edited afterwards;
/// the only mutation is deleting the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub id: String,
    pub user_id: String,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    /// Session XP earned from completed sets (not level XP)
    pub xp_earned: i64,
    pub exercises: Vec<Exercise>,
}

impl Workout {
    /// Total number of sets across all exercises
    pub fn total_sets(&self) -> usize {
        self.exercises.iter().map(|e| e.sets.len()).sum()
    }

    /// Number of sets marked completed
    pub fn completed_sets(&self) -> usize {
        self.exercises
            .iter()
            .flat_map(|e| e.sets.iter())
            .filter(|s| s.completed)
            .count()
    }

    /// Fraction of sets completed, 0.0 when the workout has no sets
    pub fn completion_rate(&self) -> f64 {
        let total = self.total_sets();
        if total == 0 {
            return 0.0;
        }
        self.completed_sets() as f64 / total as f64
    }
}

// ============================================================================
// Foods
// ============================================================================

/// Where a food entry came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FoodSource {
    /// Built-in catalog
    Local,
    /// External nutrition database (USDA FoodData Central)
    External,
    /// Created by the user
    Custom,
}

impl FoodSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            FoodSource::Local => "local",
            FoodSource::External => "external",
            FoodSource::Custom => "custom",
        }
    }
}

impl FromStr for FoodSource {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "local" => Ok(FoodSource::Local),
            "external" | "usda" => Ok(FoodSource::External),
            "custom" => Ok(FoodSource::Custom),
            other => Err(ParseEnumError::new("food source", other)),
        }
    }
}

impl fmt::Display for FoodSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Calories and macronutrients, either per serving or as totals
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Macros {
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
}

impl Macros {
    pub fn new(calories: f64, protein: f64, carbs: f64, fats: f64) -> Self {
        Self {
            calories,
            protein,
            carbs,
            fats,
        }
    }

    /// Per-serving values multiplied by a serving count
    pub fn scaled(&self, servings: f64) -> Self {
        Self {
            calories: self.calories * servings,
            protein: self.protein * servings,
            carbs: self.carbs * servings,
            fats: self.fats * servings,
        }
    }
}

impl std::ops::Add for Macros {
    type Output = Macros;

    fn add(self, rhs: Macros) -> Macros {
        Macros {
            calories: self.calories + rhs.calories,
            protein: self.protein + rhs.protein,
            carbs: self.carbs + rhs.carbs,
            fats: self.fats + rhs.fats,
        }
    }
}

/// Food catalog entry; nutrition values are per serving
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Food {
    pub id: String,
    pub name_en: String,
    pub name_ru: Option<String>,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub serving_size: f64,
    pub serving_unit: String,
    pub source: FoodSource,
    pub external_id: Option<String>,
    pub is_custom: bool,
}

impl Food {
    pub fn per_serving(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }
}

// ============================================================================
// Nutrition logs
// ============================================================================

/// Meal a food log belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

impl MealType {
    pub const ALL: [MealType; 4] = [
        MealType::Breakfast,
        MealType::Lunch,
        MealType::Dinner,
        MealType::Snack,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
            MealType::Snack => "snack",
        }
    }
}

impl FromStr for MealType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "breakfast" => Ok(MealType::Breakfast),
            "lunch" => Ok(MealType::Lunch),
            "dinner" => Ok(MealType::Dinner),
            "snack" => Ok(MealType::Snack),
            other => Err(ParseEnumError::new("meal type", other)),
        }
    }
}

impl fmt::Display for MealType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A logged food
///
/// `food_id` is a weak reference: the name is copied in at write time and the
/// totals are computed once (per serving × servings) and never re-derived from
/// the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionLog {
    pub id: String,
    pub user_id: String,
    pub food_id: String,
    pub food_name: String,
    pub meal_type: MealType,
    pub servings: f64,
    pub calories: f64,
    pub protein: f64,
    pub carbs: f64,
    pub fats: f64,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

impl NutritionLog {
    pub fn totals(&self) -> Macros {
        Macros::new(self.calories, self.protein, self.carbs, self.fats)
    }
}

/// Water intake entry, amount in ml
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WaterLog {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub logged_at: DateTime<Utc>,
    pub date: NaiveDate,
}

/// Daily targets for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionGoals {
    pub user_id: String,
    pub daily_calories: f64,
    pub protein_goal: f64,
    pub carbs_goal: f64,
    pub fats_goal: f64,
    pub water_goal: f64,
}

impl NutritionGoals {
    /// Documented defaults, used whenever a user has no goals row
    pub fn defaults_for(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            daily_calories: DEFAULT_DAILY_CALORIES,
            protein_goal: DEFAULT_PROTEIN_GOAL,
            carbs_goal: DEFAULT_CARBS_GOAL,
            fats_goal: DEFAULT_FATS_GOAL,
            water_goal: DEFAULT_WATER_GOAL,
        }
    }
}

/// Totals for one date bucket paired with the user's goals
///
/// Totals are rounded to whole units. This is a snapshot; re-query to see
/// later writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyNutritionSummary {
    pub date: NaiveDate,
    pub total_calories: i64,
    pub total_protein: i64,
    pub total_carbs: i64,
    pub total_fats: i64,
    pub total_water: i64,
    pub goal_calories: f64,
    pub goal_protein: f64,
    pub goal_carbs: f64,
    pub goal_fats: f64,
    pub goal_water: f64,
    pub log_count: i64,
}

/// A day's food logs split by meal; every bucket is always present
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MealLogs {
    pub breakfast: Vec<NutritionLog>,
    pub lunch: Vec<NutritionLog>,
    pub dinner: Vec<NutritionLog>,
    pub snack: Vec<NutritionLog>,
}

impl MealLogs {
    /// Partition logs by meal type, keeping their input order
    pub fn from_logs(logs: impl IntoIterator<Item = NutritionLog>) -> Self {
        let mut meals = MealLogs::default();
        for log in logs {
            meals.bucket_mut(log.meal_type).push(log);
        }
        meals
    }

    pub fn get(&self, meal_type: MealType) -> &[NutritionLog] {
        match meal_type {
            MealType::Breakfast => &self.breakfast,
            MealType::Lunch => &self.lunch,
            MealType::Dinner => &self.dinner,
            MealType::Snack => &self.snack,
        }
    }

    fn bucket_mut(&mut self, meal_type: MealType) -> &mut Vec<NutritionLog> {
        match meal_type {
            MealType::Breakfast => &mut self.breakfast,
            MealType::Lunch => &mut self.lunch,
            MealType::Dinner => &mut self.dinner,
            MealType::Snack => &mut self.snack,
        }
    }

    pub fn len(&self) -> usize {
        MealType::ALL.iter().map(|m| self.get(*m).len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Everything a day view needs, computed from one consistent read
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionDay {
    pub summary: DailyNutritionSummary,
    pub meals: MealLogs,
    pub progress: NutritionProgress,
}

// ============================================================================
// Saved meals
// ============================================================================

/// One food inside a saved meal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMealItem {
    pub food_id: String,
    pub food_name: String,
    pub servings: f64,
    pub per_serving: Macros,
}

/// A reusable group of foods that can be logged in one step
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedMeal {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub foods: Vec<SavedMealItem>,
    pub totals: Macros,
    pub created_at: DateTime<Utc>,
}

impl SavedMeal {
    /// Build a saved meal, computing its totals from the items
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        name: impl Into<String>,
        foods: Vec<SavedMealItem>,
        created_at: DateTime<Utc>,
    ) -> Self {
        let totals = foods
            .iter()
            .map(|item| item.per_serving.scaled(item.servings))
            .fold(Macros::default(), |acc, m| acc + m);

        Self {
            id: id.into(),
            user_id: user_id.into(),
            name: name.into(),
            foods,
            totals,
            created_at,
        }
    }
}
