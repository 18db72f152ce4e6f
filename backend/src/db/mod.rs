//! Database connection and schema management
//!
//! This module opens the embedded SQLite store and owns the schema
//! initializer. The schema is created with `IF NOT EXISTS` statements, so
//! `ensure_schema` is safe to run on every process start.
//!
//! `nutrition_logs.food_id` deliberately has no foreign key to `foods`: a log
//! keeps its own name and totals and outlives removal of the food it came from.

use crate::error::{StorageError, StorageResult};
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{info, warn};

/// Database configuration for pool creation
pub struct DbConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DbConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 5,
            acquire_timeout_secs: 30,
        }
    }
}

impl DbConfig {
    /// In-memory databases live only as long as their single connection
    pub fn is_memory(&self) -> bool {
        self.url.contains(":memory:") || self.url.contains("mode=memory")
    }
}

/// Create a SQLite connection pool
pub async fn create_pool(database_url: &str, max_connections: u32) -> StorageResult<SqlitePool> {
    let config = DbConfig {
        url: database_url.to_string(),
        max_connections,
        ..Default::default()
    };
    create_pool_with_config(&config).await
}

/// Create a SQLite connection pool with custom configuration
///
/// Foreign keys are switched on for every connection; workout cascade deletes
/// depend on it.
pub async fn create_pool_with_config(config: &DbConfig) -> StorageResult<SqlitePool> {
    let mut connect_options = SqliteConnectOptions::from_str(&config.url)
        .map_err(StorageError::init)?
        .create_if_missing(true)
        .foreign_keys(true);

    let mut pool_options = SqlitePoolOptions::new()
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    if config.is_memory() {
        // A second connection would open a second, empty database
        pool_options = pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    } else {
        connect_options = connect_options.journal_mode(SqliteJournalMode::Wal);
        pool_options = pool_options.max_connections(config.max_connections.max(1));
    }

    let pool = pool_options
        .connect_with(connect_options)
        .await
        .map_err(StorageError::init)?;

    info!(
        url = %config.url,
        max_connections = config.max_connections,
        "Database pool created"
    );

    Ok(pool)
}

/// Schema statements, applied in order
const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS workouts (
        id TEXT PRIMARY KEY,
        userId TEXT NOT NULL,
        startTime TEXT NOT NULL,
        endTime TEXT,
        notes TEXT,
        xpEarned INTEGER NOT NULL DEFAULT 0,
        createdAt TEXT DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_workouts_user_start
    ON workouts(userId, startTime)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS exercises (
        id TEXT PRIMARY KEY,
        workoutId TEXT NOT NULL,
        name TEXT NOT NULL,
        exerciseType TEXT NOT NULL,
        orderIndex INTEGER NOT NULL,
        FOREIGN KEY (workoutId) REFERENCES workouts (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_exercises_workout_order
    ON exercises(workoutId, orderIndex)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sets (
        id TEXT PRIMARY KEY,
        exerciseId TEXT NOT NULL,
        reps INTEGER,
        weight REAL,
        duration INTEGER,
        completed INTEGER NOT NULL DEFAULT 0,
        orderIndex INTEGER NOT NULL,
        FOREIGN KEY (exerciseId) REFERENCES exercises (id) ON DELETE CASCADE
    )
    "#,
    r#"
    CREATE UNIQUE INDEX IF NOT EXISTS idx_sets_exercise_order
    ON sets(exerciseId, orderIndex)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS foods (
        id TEXT PRIMARY KEY,
        name_en TEXT NOT NULL,
        name_ru TEXT,
        calories REAL NOT NULL,
        protein REAL NOT NULL,
        carbs REAL NOT NULL,
        fats REAL NOT NULL,
        serving_size REAL NOT NULL DEFAULT 100,
        serving_unit TEXT NOT NULL DEFAULT 'g',
        source TEXT NOT NULL DEFAULT 'local',
        usda_fdc_id TEXT,
        is_custom INTEGER NOT NULL DEFAULT 0,
        created_at TEXT DEFAULT CURRENT_TIMESTAMP
    )
    "#,
    // food_id is a weak reference: logs must outlive catalog edits and removals
    r#"
    CREATE TABLE IF NOT EXISTS nutrition_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        food_id TEXT NOT NULL,
        food_name TEXT NOT NULL,
        meal_type TEXT NOT NULL,
        servings REAL NOT NULL,
        calories REAL NOT NULL,
        protein REAL NOT NULL,
        carbs REAL NOT NULL,
        fats REAL NOT NULL,
        logged_at TEXT NOT NULL,
        date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_nutrition_logs_date
    ON nutrition_logs(user_id, date)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS nutrition_goals (
        user_id TEXT PRIMARY KEY,
        daily_calories REAL NOT NULL DEFAULT 2000,
        protein_goal REAL NOT NULL DEFAULT 150,
        carbs_goal REAL NOT NULL DEFAULT 250,
        fats_goal REAL NOT NULL DEFAULT 65,
        water_goal REAL NOT NULL DEFAULT 2000
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS water_logs (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        amount REAL NOT NULL,
        logged_at TEXT NOT NULL,
        date TEXT NOT NULL
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_water_logs_date
    ON water_logs(user_id, date)
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS saved_meals (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        name TEXT NOT NULL,
        foods TEXT NOT NULL,
        total_calories REAL NOT NULL,
        total_protein REAL NOT NULL,
        total_carbs REAL NOT NULL,
        total_fats REAL NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

/// Create every table and index that does not exist yet
///
/// Idempotent. Any failure is `StorageError::Init`, which callers treat as
/// fatal.
pub async fn ensure_schema(pool: &SqlitePool) -> StorageResult<()> {
    info!("Ensuring database schema...");
    for statement in SCHEMA {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(StorageError::init)?;
    }
    info!(statements = SCHEMA.len(), "Database schema ready");
    Ok(())
}

/// Check database health
pub async fn health_check(pool: &SqlitePool) -> StorageResult<()> {
    sqlx::query("SELECT 1")
        .execute(pool)
        .await
        .map(|_| ())
        .map_err(|e| {
            warn!("Database health check failed: {}", e);
            StorageError::Io(e)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_db_config() {
        let config = DbConfig::default();
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert!(!config.is_memory());
    }

    #[test]
    fn test_memory_url_detection() {
        let config = DbConfig {
            url: "sqlite::memory:".to_string(),
            ..Default::default()
        };
        assert!(config.is_memory());
    }

    #[tokio::test]
    async fn test_ensure_schema_is_idempotent() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        ensure_schema(&pool).await.unwrap();
        ensure_schema(&pool).await.unwrap();

        let tables: Vec<(String,)> = sqlx::query_as(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        let names: Vec<&str> = tables.iter().map(|t| t.0.as_str()).collect();
        assert_eq!(
            names,
            [
                "exercises",
                "foods",
                "nutrition_goals",
                "nutrition_logs",
                "saved_meals",
                "sets",
                "water_logs",
                "workouts"
            ]
        );
    }

    #[tokio::test]
    async fn test_foreign_keys_enabled() {
        let pool = create_pool("sqlite::memory:", 1).await.unwrap();
        let (enabled,): (i64,) = sqlx::query_as("PRAGMA foreign_keys")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(enabled, 1);
        health_check(&pool).await.unwrap();
    }
}
