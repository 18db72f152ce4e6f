//! Water log repository

use crate::error::{StorageError, StorageResult};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use fitness_rpg_shared::dates::{
    date_bucket, format_date_bucket, format_timestamp, parse_date_bucket, parse_timestamp,
};
use fitness_rpg_shared::WaterLog;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

// ============================================================================
// Water Logs
// ============================================================================

/// Water log record from database
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct WaterLogRecord {
    pub id: String,
    pub user_id: String,
    pub amount: f64,
    pub logged_at: String,
    pub date: String,
}

impl TryFrom<WaterLogRecord> for WaterLog {
    type Error = chrono::ParseError;

    fn try_from(record: WaterLogRecord) -> Result<Self, Self::Error> {
        Ok(Self {
            id: record.id,
            user_id: record.user_id,
            amount: record.amount,
            logged_at: parse_timestamp(&record.logged_at)?,
            date: parse_date_bucket(&record.date)?,
        })
    }
}

/// Input for logging water
///
/// `amount` (ml) is expected to be > 0; callers validate it. `logged_at`
/// carries the caller's UTC offset, which fixes the date bucket.
#[derive(Debug, Clone)]
pub struct CreateWaterLog {
    pub user_id: String,
    pub amount: f64,
    pub logged_at: DateTime<FixedOffset>,
}

/// Water log repository
#[derive(Clone)]
pub struct WaterLogRepository {
    pool: SqlitePool,
}

impl WaterLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert one water log with a generated id
    pub async fn log(&self, input: CreateWaterLog) -> StorageResult<WaterLog> {
        let log = WaterLog {
            id: Uuid::new_v4().to_string(),
            user_id: input.user_id,
            amount: input.amount,
            logged_at: input.logged_at.with_timezone(&Utc),
            date: date_bucket(&input.logged_at),
        };

        sqlx::query(
            r#"
            INSERT INTO water_logs (id, user_id, amount, logged_at, date)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&log.id)
        .bind(&log.user_id)
        .bind(log.amount)
        .bind(format_timestamp(&log.logged_at))
        .bind(format_date_bucket(log.date))
        .execute(&self.pool)
        .await?;

        info!(user_id = %log.user_id, amount = log.amount, date = %log.date, "Water logged");
        Ok(log)
    }

    /// Water logs in a date bucket, oldest first
    pub async fn get_by_date(&self, user_id: &str, date: NaiveDate) -> StorageResult<Vec<WaterLog>> {
        let records = sqlx::query_as::<_, WaterLogRecord>(
            r#"
            SELECT id, user_id, amount, logged_at, date
            FROM water_logs
            WHERE user_id = ? AND date = ?
            ORDER BY logged_at ASC, id ASC
            "#,
        )
        .bind(user_id)
        .bind(format_date_bucket(date))
        .fetch_all(&self.pool)
        .await?;

        debug!(user_id, date = %date, count = records.len(), "Loaded water logs");

        records
            .into_iter()
            .map(|r| WaterLog::try_from(r).map_err(StorageError::from))
            .collect()
    }

    /// Delete a water log; unknown ids are a no-op
    pub async fn delete(&self, log_id: &str) -> StorageResult<bool> {
        let result = sqlx::query("DELETE FROM water_logs WHERE id = ?")
            .bind(log_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

/// Total water (ml) in a date bucket, on an open connection or transaction
pub(crate) async fn total_for_date(
    conn: &mut SqliteConnection,
    user_id: &str,
    date: NaiveDate,
) -> StorageResult<f64> {
    let (total,): (f64,) =
        sqlx::query_as("SELECT TOTAL(amount) FROM water_logs WHERE user_id = ? AND date = ?")
            .bind(user_id)
            .bind(format_date_bucket(date))
            .fetch_one(&mut *conn)
            .await?;

    Ok(total)
}
