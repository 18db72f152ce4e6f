//! Fitness RPG Shared Library
//!
//! Domain types and the pure engines (progression, nutrition aggregation)
//! used by the storage backend and the WASM bindings.

pub mod aggregation;
pub mod dates;
pub mod errors;
pub mod models;
pub mod progression;
pub mod validation;

// Re-export commonly used items
pub use aggregation::{MacroProgress, NutritionProgress};
pub use errors::*;
pub use models::*;
pub use progression::{LevelTransition, ProgressionState, SessionRank};
