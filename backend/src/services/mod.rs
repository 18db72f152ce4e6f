//! Business logic services
//!
//! Services are the caller boundary: they validate input, supply the wall
//! clock where a write needs one, and coordinate repositories.

pub mod nutrition;
pub mod progression;
pub mod workout;

pub use nutrition::{CustomFoodInput, FoodLogInput, NutritionService};
pub use progression::ProgressionService;
pub use workout::{WorkoutInput, WorkoutService};
