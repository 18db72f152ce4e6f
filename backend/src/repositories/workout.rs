//! Workout repository: workout → exercises → sets
//!
//! A workout and all of its descendants are written in one transaction and
//! read back in one read transaction, so callers never see a workout with only
//! some of its exercises or sets. Sibling order is fixed by `orderIndex`,
//! assigned from the caller's vector order at save time.

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, Duration, Utc};
use fitness_rpg_shared::dates::{format_timestamp, parse_timestamp};
use fitness_rpg_shared::{Exercise, ExerciseSet, Workout};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Length of the rolling window used by the weekly count
pub const WEEKLY_WINDOW_DAYS: i64 = 7;

/// Workout row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WorkoutRecord {
    pub id: String,
    pub user_id: String,
    pub start_time: String,
    pub end_time: Option<String>,
    pub notes: Option<String>,
    pub xp_earned: i64,
}

/// Exercise row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ExerciseRecord {
    pub id: String,
    pub workout_id: String,
    pub name: String,
    pub exercise_type: String,
    pub order_index: i64,
}

/// Set row
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SetRecord {
    pub id: String,
    pub exercise_id: String,
    pub reps: Option<i32>,
    pub weight: Option<f64>,
    pub duration: Option<i32>,
    pub completed: bool,
    pub order_index: i64,
}

const WORKOUT_COLUMNS: &str = r#"
    id, userId AS user_id, startTime AS start_time, endTime AS end_time,
    notes, xpEarned AS xp_earned
"#;

/// Workout repository
#[derive(Clone)]
pub struct WorkoutRepository {
    pool: SqlitePool,
}

impl WorkoutRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Persist a workout with all exercises and sets, atomically
    ///
    /// Fails with `WriteConflict` if any id (workout, exercise or set) already
    /// exists and with `Io` on medium failure; in both cases the transaction is
    /// rolled back and no row of this workout remains.
    pub async fn save(&self, workout: &Workout) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;

        if let Err(err) = Self::insert_hierarchy(&mut tx, workout).await {
            warn!(workout_id = %workout.id, error = %err, "Workout save failed, rolling back");
            if let Err(rollback_err) = tx.rollback().await {
                warn!(error = %rollback_err, "Rollback failed; transaction dropped");
            }
            return Err(err);
        }

        tx.commit().await?;

        info!(
            workout_id = %workout.id,
            exercises = workout.exercises.len(),
            sets = workout.total_sets(),
            "Workout saved"
        );
        Ok(())
    }

    async fn insert_hierarchy(conn: &mut SqliteConnection, workout: &Workout) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO workouts (id, userId, startTime, endTime, notes, xpEarned)
            VALUES (?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&workout.id)
        .bind(&workout.user_id)
        .bind(format_timestamp(&workout.start_time))
        .bind(workout.end_time.as_ref().map(format_timestamp))
        .bind(&workout.notes)
        .bind(workout.xp_earned)
        .execute(&mut *conn)
        .await?;

        for (order_index, exercise) in workout.exercises.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO exercises (id, workoutId, name, exerciseType, orderIndex)
                VALUES (?, ?, ?, ?, ?)
                "#,
            )
            .bind(&exercise.id)
            .bind(&workout.id)
            .bind(&exercise.name)
            .bind(exercise.exercise_type.as_str())
            .bind(order_index as i64)
            .execute(&mut *conn)
            .await?;

            for (set_index, set) in exercise.sets.iter().enumerate() {
                sqlx::query(
                    r#"
                    INSERT INTO sets (id, exerciseId, reps, weight, duration, completed, orderIndex)
                    VALUES (?, ?, ?, ?, ?, ?, ?)
                    "#,
                )
                .bind(&set.id)
                .bind(&exercise.id)
                .bind(set.reps)
                .bind(set.weight)
                .bind(set.duration_secs)
                .bind(set.completed)
                .bind(set_index as i64)
                .execute(&mut *conn)
                .await?;
            }
        }

        Ok(())
    }

    /// All workouts of a user, newest start time first, fully populated
    pub async fn get_by_user(&self, user_id: &str) -> StorageResult<Vec<Workout>> {
        let mut tx = self.pool.begin().await?;

        let workouts = sqlx::query_as::<_, WorkoutRecord>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE userId = ? ORDER BY startTime DESC, id DESC"
        ))
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let exercises = sqlx::query_as::<_, ExerciseRecord>(
            r#"
            SELECT e.id, e.workoutId AS workout_id, e.name,
                   e.exerciseType AS exercise_type, e.orderIndex AS order_index
            FROM exercises e
            JOIN workouts w ON w.id = e.workoutId
            WHERE w.userId = ?
            ORDER BY e.workoutId, e.orderIndex ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        let sets = sqlx::query_as::<_, SetRecord>(
            r#"
            SELECT s.id, s.exerciseId AS exercise_id, s.reps, s.weight, s.duration,
                   s.completed, s.orderIndex AS order_index
            FROM sets s
            JOIN exercises e ON e.id = s.exerciseId
            JOIN workouts w ON w.id = e.workoutId
            WHERE w.userId = ?
            ORDER BY s.exerciseId, s.orderIndex ASC
            "#,
        )
        .bind(user_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(
            user_id,
            workouts = workouts.len(),
            exercises = exercises.len(),
            sets = sets.len(),
            "Loaded workouts"
        );

        assemble(workouts, exercises, sets)
    }

    /// One workout by id, fully populated
    pub async fn get_by_id(&self, workout_id: &str) -> StorageResult<Option<Workout>> {
        let mut tx = self.pool.begin().await?;

        let Some(record) = sqlx::query_as::<_, WorkoutRecord>(&format!(
            "SELECT {WORKOUT_COLUMNS} FROM workouts WHERE id = ?"
        ))
        .bind(workout_id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        let exercises = sqlx::query_as::<_, ExerciseRecord>(
            r#"
            SELECT id, workoutId AS workout_id, name,
                   exerciseType AS exercise_type, orderIndex AS order_index
            FROM exercises
            WHERE workoutId = ?
            ORDER BY orderIndex ASC
            "#,
        )
        .bind(workout_id)
        .fetch_all(&mut *tx)
        .await?;

        let sets = sqlx::query_as::<_, SetRecord>(
            r#"
            SELECT s.id, s.exerciseId AS exercise_id, s.reps, s.weight, s.duration,
                   s.completed, s.orderIndex AS order_index
            FROM sets s
            JOIN exercises e ON e.id = s.exerciseId
            WHERE e.workoutId = ?
            ORDER BY s.exerciseId, s.orderIndex ASC
            "#,
        )
        .bind(workout_id)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(assemble(vec![record], exercises, sets)?.pop())
    }

    /// Total workouts of a user
    pub async fn count(&self, user_id: &str) -> StorageResult<u32> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE userId = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(clamp_count(count))
    }

    /// Workouts started within the last 7 days of `now` (rolling, not calendar week)
    pub async fn weekly_count(&self, user_id: &str, now: DateTime<Utc>) -> StorageResult<u32> {
        let since = now - Duration::days(WEEKLY_WINDOW_DAYS);

        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM workouts WHERE userId = ? AND startTime >= ?")
                .bind(user_id)
                .bind(format_timestamp(&since))
                .fetch_one(&self.pool)
                .await?;

        Ok(clamp_count(count))
    }

    /// Delete a workout and, by cascade, its exercises and sets
    ///
    /// Deleting an unknown id is a no-op. Returns whether a row was removed.
    pub async fn delete(&self, workout_id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM workouts WHERE id = ?")
            .bind(workout_id)
            .execute(&self.pool)
            .await?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            info!(workout_id, "Workout deleted");
        }
        Ok(deleted)
    }

    /// Remove every workout, exercise and set
    pub async fn clear_all(&self) -> StorageResult<()> {
        let mut tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM sets").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM exercises").execute(&mut *tx).await?;
        sqlx::query("DELETE FROM workouts").execute(&mut *tx).await?;
        tx.commit().await?;

        info!("All workout data cleared");
        Ok(())
    }
}

fn clamp_count(count: i64) -> u32 {
    u32::try_from(count.max(0)).unwrap_or(u32::MAX)
}

/// Nest ordered child rows under their parents
///
/// `exercises` must be sorted by `(workout_id, order_index)` and `sets` by
/// `(exercise_id, order_index)`; the output keeps the order of `workouts`.
fn assemble(
    workouts: Vec<WorkoutRecord>,
    exercises: Vec<ExerciseRecord>,
    sets: Vec<SetRecord>,
) -> StorageResult<Vec<Workout>> {
    let mut sets_by_exercise: HashMap<String, Vec<ExerciseSet>> = HashMap::new();
    for record in sets {
        sets_by_exercise
            .entry(record.exercise_id.clone())
            .or_default()
            .push(record_to_set(record));
    }

    let mut exercises_by_workout: HashMap<String, Vec<Exercise>> = HashMap::new();
    for record in exercises {
        let sets = sets_by_exercise.remove(&record.id).unwrap_or_default();
        exercises_by_workout
            .entry(record.workout_id.clone())
            .or_default()
            .push(Exercise {
                id: record.id,
                name: record.name,
                exercise_type: record.exercise_type.parse()?,
                sets,
            });
    }

    workouts
        .into_iter()
        .map(|record| {
            let exercises = exercises_by_workout.remove(&record.id).unwrap_or_default();
            record_to_workout(record, exercises)
        })
        .collect()
}

fn record_to_workout(record: WorkoutRecord, exercises: Vec<Exercise>) -> StorageResult<Workout> {
    Ok(Workout {
        id: record.id,
        user_id: record.user_id,
        start_time: parse_timestamp(&record.start_time)?,
        end_time: record
            .end_time
            .as_deref()
            .map(parse_timestamp)
            .transpose()
            .map_err(StorageError::from)?,
        notes: record.notes,
        xp_earned: record.xp_earned,
        exercises,
    })
}

fn record_to_set(record: SetRecord) -> ExerciseSet {
    ExerciseSet {
        id: record.id,
        reps: record.reps,
        weight: record.weight,
        duration_secs: record.duration,
        completed: record.completed,
    }
}
