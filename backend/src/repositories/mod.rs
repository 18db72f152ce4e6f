//! Database repositories
//!
//! Provides the data access layer over the embedded SQLite store. Each
//! repository is constructed once with a pool handle and cloned freely.

pub mod goals;
pub mod hydration;
pub mod nutrition;
pub mod saved_meals;
pub mod workout;

pub use goals::NutritionGoalsRepository;
pub use hydration::{CreateWaterLog, WaterLogRepository};
pub use nutrition::{CreateFoodLog, FoodRepository, NutritionLogRepository};
pub use saved_meals::SavedMealRepository;
pub use workout::WorkoutRepository;
