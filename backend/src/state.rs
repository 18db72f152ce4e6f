//! Application state management
//!
//! `AppState` is built once at process start from a pool and the loaded
//! configuration, then passed by reference to every service call. There is no
//! module-level global; tests build their own state over an in-memory store.

use crate::config::AppConfig;
use crate::db;
use crate::error::StorageResult;
use crate::repositories::{
    FoodRepository, NutritionGoalsRepository, NutritionLogRepository, SavedMealRepository,
    WaterLogRepository, WorkoutRepository,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Shared application state
///
/// Every field is cheap to clone: the pool is internally reference counted and
/// each repository only holds a pool handle.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool
    pub db: SqlitePool,
    /// Application configuration
    pub config: Arc<AppConfig>,
    pub workouts: WorkoutRepository,
    pub foods: FoodRepository,
    pub food_logs: NutritionLogRepository,
    pub water_logs: WaterLogRepository,
    pub goals: NutritionGoalsRepository,
    pub saved_meals: SavedMealRepository,
}

impl AppState {
    /// Create a new application state over an initialized pool
    pub fn new(db: SqlitePool, config: AppConfig) -> Self {
        Self {
            workouts: WorkoutRepository::new(db.clone()),
            foods: FoodRepository::new(db.clone()),
            food_logs: NutritionLogRepository::new(db.clone()),
            water_logs: WaterLogRepository::new(db.clone()),
            goals: NutritionGoalsRepository::new(db.clone()),
            saved_meals: SavedMealRepository::new(db.clone()),
            db,
            config: Arc::new(config),
        }
    }

    /// Open the configured store and ensure its schema
    ///
    /// Fails with `StorageError::Init` if the store cannot be opened or the
    /// schema cannot be created.
    pub async fn connect(config: AppConfig) -> StorageResult<Self> {
        let pool = db::create_pool(&config.database.url, config.database.max_connections).await?;
        db::ensure_schema(&pool).await?;
        Ok(Self::new(pool, config))
    }

    /// Fresh state over a private in-memory store
    pub async fn in_memory() -> StorageResult<Self> {
        Self::connect(AppConfig::in_memory()).await
    }

    /// Get a reference to the database pool
    #[inline]
    pub fn db(&self) -> &SqlitePool {
        &self.db
    }

    /// Get a reference to the configuration
    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Identifier of the configured local user
    #[inline]
    pub fn user_id(&self) -> &str {
        &self.config.user.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_state_has_schema() {
        let state = AppState::in_memory().await.unwrap();
        assert_eq!(state.foods.count().await.unwrap(), 0);
        assert_eq!(state.user_id(), "demo-user");
    }

    #[tokio::test]
    async fn test_clones_share_the_store() {
        let state = AppState::in_memory().await.unwrap();
        let cloned = state.clone();

        state.foods.seed_catalog().await.unwrap();
        assert_eq!(cloned.foods.count().await.unwrap(), 25);
    }
}
