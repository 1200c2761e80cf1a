// ABOUTME: Database operations for completed-session records and their per-exercise lines
// ABOUTME: Writes a session and archives its routine atomically; reads history for comparisons
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, NaiveDate, Utc};
use routine_core::models::{
    CatalogEntryId, DayOfWeek, Routine, RoutineId, SessionExercise, SessionId, SessionRecord,
    SessionTotals,
};
use sqlx::{sqlite::SqliteRow, Row};
use uuid::Uuid;

use super::routines::archive_routine;
use super::Database;
use crate::errors::{AppError, AppResult, ErrorCode};

/// Persisted session records
#[derive(Clone)]
pub struct SessionStore {
    database: Database,
}

impl SessionStore {
    /// Create a new session store
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Insert a session for `routine` and archive the routine in one transaction
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the elapsed time does not fit the store,
    /// `AlreadyCompleted` if the routine was archived meanwhile, `Conflict` if
    /// it changed since it was read, or a store error
    pub async fn record_completion(
        &self,
        routine: &Routine,
        totals: SessionTotals,
        exercises: Vec<SessionExercise>,
    ) -> AppResult<SessionRecord> {
        let elapsed_seconds = count_param("elapsed_seconds", totals.elapsed_seconds)
            .map_err(|e| e.with_routine_id(routine.id))?;
        let completed_at = Utc::now();
        let session_id = self
            .database
            .bounded("complete_session", async {
                let mut guard = self.database.begin("complete_session").await?;
                let conn = guard.executor()?;

                archive_routine(&mut *conn, routine.id, routine.version).await?;

                let result = sqlx::query(
                    r"
                    INSERT INTO session_records
                        (user_id, routine_id, day_of_week, elapsed_seconds, weight_volume,
                         estimated_calories, completed_at)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    ",
                )
                .bind(routine.user_id.to_string())
                .bind(routine.id.get())
                .bind(routine.day_of_week.as_str())
                .bind(elapsed_seconds)
                .bind(totals.weight_volume)
                .bind(totals.estimated_calories)
                .bind(completed_at.to_rfc3339())
                .execute(&mut *conn)
                .await?;
                let session_id = SessionId(result.last_insert_rowid());

                for (ordinal, exercise) in exercises.iter().enumerate() {
                    sqlx::query(
                        r"
                        INSERT INTO session_exercises
                            (session_id, ordinal, catalog_entry_id, set_count,
                             total_repetitions, volume)
                        VALUES ($1, $2, $3, $4, $5, $6)
                        ",
                    )
                    .bind(session_id.get())
                    .bind(count_param("ordinal", ordinal)?)
                    .bind(exercise.catalog_entry_id.get())
                    .bind(i64::from(exercise.set_count))
                    .bind(count_param("total_repetitions", exercise.total_repetitions)?)
                    .bind(exercise.volume)
                    .execute(&mut *conn)
                    .await?;
                }

                guard.commit().await?;
                Ok(session_id)
            })
            .await?;

        Ok(SessionRecord {
            id: session_id,
            user_id: routine.user_id,
            routine_id: routine.id,
            day_of_week: routine.day_of_week,
            elapsed_seconds: totals.elapsed_seconds,
            weight_volume: totals.weight_volume,
            estimated_calories: totals.estimated_calories,
            completed_at,
            exercises,
        })
    }

    /// Most recent session of `routine_id` completed by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn latest_for_routine(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<Option<SessionRecord>> {
        self.database
            .bounded("latest_session", async {
                let row = sqlx::query(
                    r"
                    SELECT id, user_id, routine_id, day_of_week, elapsed_seconds, weight_volume,
                           estimated_calories, completed_at
                    FROM session_records
                    WHERE user_id = $1 AND routine_id = $2
                    ORDER BY id DESC
                    LIMIT 1
                    ",
                )
                .bind(user_id.to_string())
                .bind(routine_id.get())
                .fetch_optional(self.database.pool())
                .await?;

                match row {
                    Some(row) => Ok(Some(self.hydrate(&row).await?)),
                    None => Ok(None),
                }
            })
            .await
    }

    /// The session completed just before `current` for the same user and day
    ///
    /// Each scheduled routine is archived when completed, so the next
    /// occurrence of a day is a new routine; sessions are linked through the
    /// day tag instead of the routine identifier.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn previous_before(&self, current: &SessionRecord) -> AppResult<Option<SessionRecord>> {
        self.database
            .bounded("previous_session", async {
                let row = sqlx::query(
                    r"
                    SELECT id, user_id, routine_id, day_of_week, elapsed_seconds, weight_volume,
                           estimated_calories, completed_at
                    FROM session_records
                    WHERE user_id = $1 AND day_of_week = $2 AND id < $3
                    ORDER BY id DESC
                    LIMIT 1
                    ",
                )
                .bind(current.user_id.to_string())
                .bind(current.day_of_week.as_str())
                .bind(current.id.get())
                .fetch_optional(self.database.pool())
                .await?;

                match row {
                    Some(row) => Ok(Some(self.hydrate(&row).await?)),
                    None => Ok(None),
                }
            })
            .await
    }

    /// Number of sessions completed by `user_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn count_for_user(&self, user_id: Uuid) -> AppResult<i64> {
        self.database
            .bounded("session_count", async {
                let count: i64 =
                    sqlx::query_scalar("SELECT COUNT(*) FROM session_records WHERE user_id = $1")
                        .bind(user_id.to_string())
                        .fetch_one(self.database.pool())
                        .await?;
                Ok(count)
            })
            .await
    }

    /// Sessions completed by `user_id` on `date` (UTC), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn on_date(&self, user_id: Uuid, date: NaiveDate) -> AppResult<Vec<SessionRecord>> {
        self.database
            .bounded("sessions_on", async {
                let rows = sqlx::query(
                    r"
                    SELECT id, user_id, routine_id, day_of_week, elapsed_seconds, weight_volume,
                           estimated_calories, completed_at
                    FROM session_records
                    WHERE user_id = $1 AND substr(completed_at, 1, 10) = $2
                    ORDER BY id DESC
                    ",
                )
                .bind(user_id.to_string())
                .bind(date.format("%Y-%m-%d").to_string())
                .fetch_all(self.database.pool())
                .await?;

                let mut sessions = Vec::with_capacity(rows.len());
                for row in &rows {
                    sessions.push(self.hydrate(row).await?);
                }
                Ok(sessions)
            })
            .await
    }

    /// Build a record from its row plus its exercise lines
    async fn hydrate(&self, row: &SqliteRow) -> AppResult<SessionRecord> {
        let mut session = row_to_session(row)?;
        let rows = sqlx::query(
            r"
            SELECT catalog_entry_id, set_count, total_repetitions, volume
            FROM session_exercises
            WHERE session_id = $1
            ORDER BY ordinal
            ",
        )
        .bind(session.id.get())
        .fetch_all(self.database.pool())
        .await?;

        session.exercises = rows
            .iter()
            .map(row_to_session_exercise)
            .collect::<AppResult<Vec<_>>>()?;
        Ok(session)
    }
}

/// Convert a database row to a `SessionRecord` without exercises
fn row_to_session(row: &SqliteRow) -> AppResult<SessionRecord> {
    let user_id: String = row.try_get("user_id")?;
    let day: String = row.try_get("day_of_week")?;
    let completed_at: String = row.try_get("completed_at")?;
    let elapsed_seconds: i64 = row.try_get("elapsed_seconds")?;

    Ok(SessionRecord {
        id: SessionId(row.try_get("id")?),
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Invalid user id '{user_id}': {e}")))?,
        routine_id: RoutineId(row.try_get("routine_id")?),
        day_of_week: day.parse::<DayOfWeek>()?,
        elapsed_seconds: stored_count("elapsed_seconds", elapsed_seconds)?,
        weight_volume: row.try_get("weight_volume")?,
        estimated_calories: row.try_get("estimated_calories")?,
        completed_at: DateTime::parse_from_rfc3339(&completed_at)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
        exercises: Vec::new(),
    })
}

/// Convert a database row to a `SessionExercise`
fn row_to_session_exercise(row: &SqliteRow) -> AppResult<SessionExercise> {
    let set_count: i64 = row.try_get("set_count")?;
    let total_repetitions: i64 = row.try_get("total_repetitions")?;

    Ok(SessionExercise {
        catalog_entry_id: CatalogEntryId(row.try_get("catalog_entry_id")?),
        set_count: stored_count("set_count", set_count)?,
        total_repetitions: stored_count("total_repetitions", total_repetitions)?,
        volume: row.try_get("volume")?,
    })
}

/// Counter as a store integer
fn count_param<T>(column: &str, value: T) -> AppResult<i64>
where
    T: TryInto<i64> + Copy + std::fmt::Display,
{
    value.try_into().map_err(|_| {
        AppError::invalid_input(format!("{column} value {value} is out of range"))
    })
}

/// Read back a non-negative counter column
fn stored_count<T: TryFrom<i64>>(column: &str, value: i64) -> AppResult<T> {
    T::try_from(value).map_err(|_| {
        AppError::new(
            ErrorCode::SerializationError,
            format!("Column {column} holds out-of-range value {value}"),
        )
    })
}
