//! Common test utilities for integration tests
//!
//! Every test gets its own in-memory store built through the same
//! `AppState::connect` path the binary uses, so tests never share data.

#![allow(dead_code)]

use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use fitness_rpg_backend::state::AppState;
use fitness_rpg_shared::{Exercise, ExerciseSet, ExerciseType, Workout};

pub const USER: &str = "test-user";

/// Test application wrapper
pub struct TestApp {
    pub state: AppState,
}

impl TestApp {
    /// Fresh, empty store with the schema applied
    pub async fn new() -> Self {
        let state = AppState::in_memory()
            .await
            .expect("Failed to open in-memory store");
        Self { state }
    }

    /// Fresh store with the built-in food catalog
    pub async fn with_catalog() -> Self {
        let app = Self::new().await;
        app.state
            .foods
            .seed_catalog()
            .await
            .expect("Failed to seed catalog");
        app
    }

    /// Count rows of a table matching `column = value`
    pub async fn count_where(&self, table: &str, column: &str, value: &str) -> i64 {
        let (count,): (i64,) =
            sqlx::query_as(&format!("SELECT COUNT(*) FROM {table} WHERE {column} = ?"))
                .bind(value)
                .fetch_one(self.state.db())
                .await
                .expect("count query failed");
        count
    }

    /// Count every row of a table
    pub async fn count_all(&self, table: &str) -> i64 {
        let (count,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
            .fetch_one(self.state.db())
            .await
            .expect("count query failed");
        count
    }
}

/// Caller wall-clock time in UTC+03:00
pub fn local(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<FixedOffset> {
    FixedOffset::east_opt(3 * 3600)
        .unwrap()
        .with_ymd_and_hms(y, m, d, h, min, 0)
        .unwrap()
}

pub fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Workout with one exercise per entry of `set_counts`
///
/// Child ids are derived from the workout id (`{id}-e0`, `{id}-e0-s1`, ...),
/// and every other set is completed.
pub fn workout(id: &str, start: DateTime<Utc>, set_counts: &[usize]) -> Workout {
    let types = [
        ExerciseType::Strength,
        ExerciseType::Cardio,
        ExerciseType::Flexibility,
    ];

    let exercises: Vec<Exercise> = set_counts
        .iter()
        .enumerate()
        .map(|(i, &sets)| Exercise {
            id: format!("{id}-e{i}"),
            name: format!("Exercise {i}"),
            exercise_type: types[i % types.len()],
            sets: (0..sets)
                .map(|j| ExerciseSet {
                    id: format!("{id}-e{i}-s{j}"),
                    reps: Some(8 + j as i32),
                    weight: Some(42.5 + j as f64),
                    duration_secs: if j % 2 == 0 { None } else { Some(60) },
                    completed: j % 2 == 0,
                })
                .collect(),
        })
        .collect();

    Workout {
        id: id.to_string(),
        user_id: USER.to_string(),
        start_time: start,
        end_time: Some(start + chrono::Duration::minutes(45)),
        notes: Some(format!("notes for {id}")),
        xp_earned: fitness_rpg_shared::progression::session_xp(&exercises),
        exercises,
    }
}
