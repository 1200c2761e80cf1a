// ABOUTME: Database operations for routines, routine details and the weekly routine calendar
// ABOUTME: Slot and set arrays pass through the codec; routine writes are guarded by a version column
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Routine persistence
//!
//! Every write to a routine's slots or status checks and bumps the routine's
//! `version`. A writer that read an older version gets `Conflict` instead of
//! overwriting a concurrent change.

use chrono::{DateTime, Utc};
use routine_core::constants::limits::{SET_CAPACITY, SLOT_CAPACITY};
use routine_core::errors::ErrorCode;
use routine_core::models::{
    CatalogEntryId, DayOfWeek, DetailId, PerformedSet, PlacedDetail, Routine, RoutineDetail,
    RoutineId, RoutineStatus, SlotDetails,
};
use sqlx::sqlite::SqliteRow;
use sqlx::{Executor, Row, Sqlite, SqliteConnection};
use tracing::{debug, warn};
use uuid::Uuid;

use super::slot_codec::{
    decode_sets, decode_slots, encode_sets, set_slot, sets_from_json, sets_to_json,
    slots_from_json, slots_to_json, RawSlotArray,
};
use super::Database;
use crate::errors::{AppError, AppResult};

/// Outcome of a committed substitution
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubstitutionOutcome {
    /// Detail now held by the substituted slots
    pub new_detail_id: DetailId,
    /// Positions that were repointed
    pub positions: Vec<usize>,
}

/// Outcome of a recorded set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetWrite {
    /// The set extended the sequence
    Appended,
    /// An existing set was replaced
    Overwritten,
}

/// Persisted routines and routine details
#[derive(Clone)]
pub struct RoutineStore {
    database: Database,
}

impl RoutineStore {
    /// Create a new routine store
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Load a routine
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine does not exist, or a store error
    pub async fn get_routine(&self, routine_id: RoutineId) -> AppResult<Routine> {
        self.database
            .bounded("get_routine", async {
                fetch_routine(self.database.pool(), routine_id)
                    .await?
                    .ok_or_else(|| AppError::routine_not_found(routine_id))
            })
            .await
    }

    /// Load one routine detail
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the detail does not exist, or a store error
    pub async fn get_detail(&self, detail_id: DetailId) -> AppResult<RoutineDetail> {
        self.database
            .bounded("get_routine_detail", async {
                fetch_detail(self.database.pool(), detail_id)
                    .await?
                    .ok_or_else(|| AppError::detail_not_found(detail_id))
            })
            .await
    }

    /// Load the detail behind every occupied slot
    ///
    /// A slot whose detail is missing or unreadable is listed in
    /// `broken_positions` and logged; the remaining slots still load.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store itself fails
    pub async fn get_slot_details(&self, routine: &Routine) -> AppResult<SlotDetails> {
        self.database
            .bounded("get_slot_details", async {
                let mut result = SlotDetails::default();
                for slot in &routine.slots {
                    match fetch_detail(self.database.pool(), slot.detail_id).await {
                        Ok(Some(detail)) => result.details.push(PlacedDetail {
                            position: slot.position,
                            detail,
                        }),
                        Ok(None) => {
                            warn!(
                                routine.id = %routine.id,
                                slot.position = slot.position,
                                detail.id = %slot.detail_id,
                                "Slot references a missing routine detail"
                            );
                            result.broken_positions.push(slot.position);
                        }
                        Err(e)
                            if matches!(
                                e.code,
                                ErrorCode::SerializationError | ErrorCode::CapacityExceeded
                            ) =>
                        {
                            warn!(
                                routine.id = %routine.id,
                                slot.position = slot.position,
                                detail.id = %slot.detail_id,
                                error = %e,
                                "Slot references an unreadable routine detail"
                            );
                            result.broken_positions.push(slot.position);
                        }
                        Err(e) => return Err(e),
                    }
                }
                Ok(result)
            })
            .await
    }

    /// Point one slot position at `new_detail_id`, leaving every other position unchanged
    ///
    /// The detail may already sit in another slot of the same routine but never
    /// in a different routine. A detail displaced from `position` that no
    /// other slot holds is deleted.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPosition` if `position` is outside the routine,
    /// `ResourceNotFound` if the routine or detail is absent, `InvalidInput`
    /// if another routine holds the detail, `AlreadyCompleted` for archived
    /// routines, or `Conflict` if the routine changed concurrently
    pub async fn replace_slot_reference(
        &self,
        routine_id: RoutineId,
        position: usize,
        new_detail_id: DetailId,
    ) -> AppResult<()> {
        if position >= SLOT_CAPACITY {
            return Err(AppError::invalid_position(position, SLOT_CAPACITY).with_routine_id(routine_id));
        }
        let routine = self.get_routine(routine_id).await?;
        self.replace_slot_reference_versioned(routine_id, routine.version, position, new_detail_id)
            .await
    }

    /// Point one slot position at `new_detail_id` if the routine is still at `expected_version`
    ///
    /// # Errors
    ///
    /// Returns `Conflict` if the routine's version moved past `expected_version`,
    /// plus the failures of [`Self::replace_slot_reference`]
    pub async fn replace_slot_reference_versioned(
        &self,
        routine_id: RoutineId,
        expected_version: i64,
        position: usize,
        new_detail_id: DetailId,
    ) -> AppResult<()> {
        if position >= SLOT_CAPACITY {
            return Err(AppError::invalid_position(position, SLOT_CAPACITY).with_routine_id(routine_id));
        }
        self.database
            .bounded("replace_slot_reference", async {
                let mut guard = self.database.begin("replace_slot_reference").await?;
                let conn = guard.executor()?;

                if fetch_detail(&mut *conn, new_detail_id).await?.is_none() {
                    return Err(AppError::detail_not_found(new_detail_id));
                }
                let mut raw = lock_state(&mut *conn, routine_id, expected_version).await?;
                if held_by_other_routine(&mut *conn, routine_id, new_detail_id).await? {
                    return Err(AppError::invalid_input(format!(
                        "Routine detail {new_detail_id} belongs to another routine"
                    ))
                    .with_routine_id(routine_id)
                    .with_detail_id(new_detail_id));
                }

                let displaced = raw.get(position).copied().flatten();
                set_slot(&mut raw, position, Some(new_detail_id))?;
                write_slots(&mut *conn, routine_id, expected_version, &raw).await?;

                // The displaced detail is only ever referenced by this routine
                if let Some(orphan) = displaced.filter(|old| !raw.contains(&Some(*old))) {
                    delete_detail(&mut *conn, orphan).await?;
                }

                guard.commit().await?;
                debug!(
                    routine.id = %routine_id,
                    slot.position = position,
                    detail.id = %new_detail_id,
                    displaced = ?displaced,
                    "Slot reference replaced"
                );
                Ok(())
            })
            .await
    }

    /// Create a routine detail with no sets that no routine references yet
    ///
    /// The detail becomes part of a routine once
    /// [`Self::replace_slot_reference`] points a slot at it.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown catalog entry, or a store error
    pub async fn create_detail(&self, catalog_entry_id: CatalogEntryId) -> AppResult<DetailId> {
        self.database
            .bounded("create_detail", async {
                let mut guard = self.database.begin("create_detail").await?;
                let conn = guard.executor()?;
                if !catalog_entry_exists(&mut *conn, catalog_entry_id).await? {
                    return Err(AppError::catalog_entry_not_found(catalog_entry_id));
                }
                let detail_id = insert_empty_detail(&mut *conn, catalog_entry_id).await?;
                guard.commit().await?;
                Ok(detail_id)
            })
            .await
    }

    /// Replace `old_detail_id` with a fresh detail for `new_catalog_entry_id` in one transaction
    ///
    /// Inside the transaction the catalog entry is checked, a detail with no
    /// sets is created, every position holding `old_detail_id` is repointed,
    /// the routine version is bumped and the old detail is deleted. Any
    /// failure rolls back all of it.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` for an unknown catalog entry or routine,
    /// `AlreadyCompleted` for archived routines, `SlotNotFound` if no slot
    /// holds `old_detail_id`, or `Conflict` if the routine moved past
    /// `expected_version`
    pub async fn substitute_detail(
        &self,
        routine_id: RoutineId,
        expected_version: i64,
        old_detail_id: DetailId,
        new_catalog_entry_id: CatalogEntryId,
    ) -> AppResult<SubstitutionOutcome> {
        self.database
            .bounded("substitute", async {
                let mut guard = self.database.begin("substitute").await?;
                let conn = guard.executor()?;

                if !catalog_entry_exists(&mut *conn, new_catalog_entry_id).await? {
                    return Err(AppError::catalog_entry_not_found(new_catalog_entry_id));
                }
                let mut raw = lock_state(&mut *conn, routine_id, expected_version).await?;
                let positions: Vec<usize> = decode_slots(&raw)
                    .iter()
                    .filter(|slot| slot.detail_id == old_detail_id)
                    .map(|slot| slot.position)
                    .collect();
                if positions.is_empty() {
                    return Err(AppError::slot_not_found(routine_id, old_detail_id));
                }

                let new_detail_id = insert_empty_detail(&mut *conn, new_catalog_entry_id).await?;
                for &position in &positions {
                    set_slot(&mut raw, position, Some(new_detail_id))?;
                }
                write_slots(&mut *conn, routine_id, expected_version, &raw).await?;

                delete_detail(&mut *conn, old_detail_id).await?;

                guard.commit().await?;
                Ok(SubstitutionOutcome {
                    new_detail_id,
                    positions,
                })
            })
            .await
    }

    /// Append or overwrite one set of a routine detail
    ///
    /// `set_index` equal to the current set count appends; a smaller index
    /// overwrites that set. The routine must still be active and holding the
    /// detail when the write commits, and its version is bumped with it.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` if `set_index` is 10 or more, `GapViolation`
    /// if `set_index` is past the current set count, `InvalidInput` for zero
    /// repetitions or a weight on a bodyweight exercise, `AlreadyCompleted`
    /// for archived routines, `SlotNotFound` if the routine does not hold the
    /// detail, or `ResourceNotFound` if the routine or detail does not exist
    pub async fn record_set(
        &self,
        routine_id: RoutineId,
        detail_id: DetailId,
        set_index: usize,
        repetitions: u32,
        weight: Option<f64>,
    ) -> AppResult<SetWrite> {
        if set_index >= SET_CAPACITY {
            return Err(
                AppError::capacity_exceeded("Routine detail sets", set_index + 1, SET_CAPACITY)
                    .with_detail_id(detail_id)
                    .with_position(set_index),
            );
        }
        if weight.is_some_and(|w| !w.is_finite() || w < 0.0) {
            return Err(AppError::invalid_input("Weight must be a non-negative number")
                .with_detail_id(detail_id));
        }

        self.database
            .bounded("record_set", async {
                let mut guard = self.database.begin("record_set").await?;
                let conn = guard.executor()?;
                let version = lock_member(&mut *conn, routine_id, detail_id).await?;

                let row = sqlx::query(
                    r"
                    SELECT d.sets, COALESCE(c.bodyweight, 0) AS bodyweight
                    FROM routine_details d
                    LEFT JOIN catalog_entries c ON c.id = d.catalog_entry_id
                    WHERE d.id = $1
                    ",
                )
                .bind(detail_id.get())
                .fetch_optional(&mut *conn)
                .await?
                .ok_or_else(|| AppError::detail_not_found(detail_id))?;

                let sets_json: String = row.try_get("sets")?;
                let bodyweight = row.try_get::<i64, _>("bodyweight")? != 0;
                let mut sets = decode_sets(&sets_from_json(&sets_json)?).into_vec();

                if set_index > sets.len() {
                    return Err(AppError::gap_violation(detail_id, set_index, sets.len()));
                }
                if bodyweight && weight.is_some() {
                    return Err(AppError::invalid_input(
                        "Bodyweight exercises cannot carry a weight",
                    )
                    .with_detail_id(detail_id));
                }
                if repetitions < 1 {
                    return Err(AppError::invalid_input("Repetitions must be at least 1")
                        .with_detail_id(detail_id)
                        .with_position(set_index));
                }

                let set = PerformedSet::new(repetitions, weight);
                let write = if let Some(existing) = sets.get_mut(set_index) {
                    *existing = set;
                    SetWrite::Overwritten
                } else {
                    sets.push(set);
                    SetWrite::Appended
                };

                sqlx::query("UPDATE routine_details SET sets = $1 WHERE id = $2")
                    .bind(sets_to_json(&encode_sets(&sets)?)?)
                    .bind(detail_id.get())
                    .execute(&mut *conn)
                    .await?;
                bump_version(&mut *conn, routine_id, version).await?;

                guard.commit().await?;
                Ok(write)
            })
            .await
    }

    /// Set a detail's skip flag
    ///
    /// Returns whether the flag changed; an already-skipped detail is left as
    /// is. A change bumps the routine version in the same transaction.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyCompleted` for archived routines, `SlotNotFound` if the
    /// routine does not hold the detail, `ResourceNotFound` if the routine or
    /// detail does not exist, or a store error
    pub async fn set_skipped(&self, routine_id: RoutineId, detail_id: DetailId) -> AppResult<bool> {
        self.database
            .bounded("mark_skipped", async {
                let mut guard = self.database.begin("mark_skipped").await?;
                let conn = guard.executor()?;
                let version = lock_member(&mut *conn, routine_id, detail_id).await?;

                let result =
                    sqlx::query("UPDATE routine_details SET skipped = 1 WHERE id = $1 AND skipped = 0")
                        .bind(detail_id.get())
                        .execute(&mut *conn)
                        .await?;
                let changed = result.rows_affected() > 0;
                if changed {
                    bump_version(&mut *conn, routine_id, version).await?;
                } else if fetch_detail(&mut *conn, detail_id).await?.is_none() {
                    return Err(AppError::detail_not_found(detail_id));
                }

                guard.commit().await?;
                Ok(changed)
            })
            .await
    }

    /// Create an active routine for `day` holding one new detail per catalog entry
    ///
    /// The routine previously assigned to `day` is archived and the calendar
    /// points at the new routine.
    ///
    /// # Errors
    ///
    /// Returns `CapacityExceeded` for more than 10 exercises, `ResourceNotFound`
    /// for an unknown catalog entry, or a store error
    pub async fn schedule_routine(
        &self,
        user_id: Uuid,
        day: DayOfWeek,
        catalog_entry_ids: &[CatalogEntryId],
    ) -> AppResult<RoutineId> {
        if catalog_entry_ids.len() > SLOT_CAPACITY {
            return Err(AppError::capacity_exceeded(
                "Routine slots",
                catalog_entry_ids.len(),
                SLOT_CAPACITY,
            )
            .with_user_id(user_id));
        }

        self.database
            .bounded("schedule_routine", async {
                let mut guard = self.database.begin("schedule_routine").await?;
                let conn = guard.executor()?;

                let mut raw: RawSlotArray = [None; SLOT_CAPACITY];
                for (position, &entry_id) in catalog_entry_ids.iter().enumerate() {
                    if !catalog_entry_exists(&mut *conn, entry_id).await? {
                        return Err(AppError::catalog_entry_not_found(entry_id));
                    }
                    let detail_id = insert_empty_detail(&mut *conn, entry_id).await?;
                    set_slot(&mut raw, position, Some(detail_id))?;
                }

                let column = day.calendar_column();
                let previous = sqlx::query_scalar::<_, Option<i64>>(&format!(
                    "SELECT {column} FROM routine_calendar WHERE user_id = $1"
                ))
                .bind(user_id.to_string())
                .fetch_optional(&mut *conn)
                .await?
                .flatten();

                if let Some(previous_id) = previous {
                    sqlx::query(
                        r"
                        UPDATE routines
                        SET status = 'archived', version = version + 1
                        WHERE id = $1 AND status = 'active'
                        ",
                    )
                    .bind(previous_id)
                    .execute(&mut *conn)
                    .await?;
                }

                let result = sqlx::query(
                    r"
                    INSERT INTO routines (user_id, day_of_week, status, slots, version, created_at)
                    VALUES ($1, $2, 'active', $3, 0, $4)
                    ",
                )
                .bind(user_id.to_string())
                .bind(day.as_str())
                .bind(slots_to_json(&raw)?)
                .bind(Utc::now().to_rfc3339())
                .execute(&mut *conn)
                .await?;
                let routine_id = RoutineId(result.last_insert_rowid());

                sqlx::query(&format!(
                    r"
                    INSERT INTO routine_calendar (user_id, {column}) VALUES ($1, $2)
                    ON CONFLICT(user_id) DO UPDATE SET {column} = excluded.{column}
                    "
                ))
                .bind(user_id.to_string())
                .bind(routine_id.get())
                .execute(&mut *conn)
                .await?;

                guard.commit().await?;
                Ok(routine_id)
            })
            .await
    }

    /// Routine currently assigned to `day` on the user's calendar
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn routine_for_day(
        &self,
        user_id: Uuid,
        day: DayOfWeek,
    ) -> AppResult<Option<RoutineId>> {
        self.database
            .bounded("routine_for_day", async {
                let column = day.calendar_column();
                let routine_id = sqlx::query_scalar::<_, Option<i64>>(&format!(
                    "SELECT {column} FROM routine_calendar WHERE user_id = $1"
                ))
                .bind(user_id.to_string())
                .fetch_optional(self.database.pool())
                .await?
                .flatten();
                Ok(routine_id.map(RoutineId))
            })
            .await
    }

    /// Whether any day of the user's calendar points at `routine_id`
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn is_on_calendar(&self, user_id: Uuid, routine_id: RoutineId) -> AppResult<bool> {
        self.database
            .bounded("verify_routine_ownership", async {
                let found: Option<i64> = sqlx::query_scalar(
                    r"
                    SELECT 1 FROM routine_calendar
                    WHERE user_id = $1
                      AND $2 IN (mon_routine_id, tue_routine_id, wed_routine_id, thu_routine_id,
                                 fri_routine_id, sat_routine_id, sun_routine_id)
                    ",
                )
                .bind(user_id.to_string())
                .bind(routine_id.get())
                .fetch_optional(self.database.pool())
                .await?;
                Ok(found.is_some())
            })
            .await
    }
}

/// Read an active routine's slots and version inside a transaction
async fn active_state(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
) -> AppResult<(RawSlotArray, i64)> {
    let row = sqlx::query("SELECT status, slots, version FROM routines WHERE id = $1")
        .bind(routine_id.get())
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| AppError::routine_not_found(routine_id))?;

    let status: String = row.try_get("status")?;
    if RoutineStatus::parse(&status) == RoutineStatus::Archived {
        return Err(AppError::already_completed(routine_id));
    }
    let slots_json: String = row.try_get("slots")?;
    Ok((slots_from_json(&slots_json)?, row.try_get("version")?))
}

/// Read a routine inside a transaction, requiring it to be active and at `expected_version`
pub(crate) async fn lock_state(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    expected_version: i64,
) -> AppResult<RawSlotArray> {
    let (raw, version) = active_state(&mut *conn, routine_id).await?;
    if version != expected_version {
        return Err(AppError::conflict(routine_id).with_details(serde_json::json!({
            "expected_version": expected_version,
            "current_version": version,
        })));
    }
    Ok(raw)
}

/// Version of an active routine that holds `detail_id` in some slot
async fn lock_member(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    detail_id: DetailId,
) -> AppResult<i64> {
    let (raw, version) = active_state(&mut *conn, routine_id).await?;
    if !raw.contains(&Some(detail_id)) {
        return Err(AppError::slot_not_found(routine_id, detail_id));
    }
    Ok(version)
}

/// Whether a routine other than `routine_id` has a slot holding `detail_id`
async fn held_by_other_routine(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    detail_id: DetailId,
) -> AppResult<bool> {
    let found: Option<i64> = sqlx::query_scalar(
        r"
        SELECT 1
        FROM routines r, json_each(r.slots) slot
        WHERE r.id != $1 AND slot.value = $2
        LIMIT 1
        ",
    )
    .bind(routine_id.get())
    .bind(detail_id.get())
    .fetch_optional(&mut *conn)
    .await?;
    Ok(found.is_some())
}

/// Bump an active routine's version, failing with `Conflict` if it moved
async fn bump_version(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    expected_version: i64,
) -> AppResult<()> {
    let result = sqlx::query(
        r"
        UPDATE routines
        SET version = version + 1
        WHERE id = $1 AND version = $2 AND status = 'active'
        ",
    )
    .bind(routine_id.get())
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::conflict(routine_id));
    }
    Ok(())
}

async fn delete_detail(conn: &mut SqliteConnection, detail_id: DetailId) -> AppResult<()> {
    sqlx::query("DELETE FROM routine_details WHERE id = $1")
        .bind(detail_id.get())
        .execute(&mut *conn)
        .await?;
    Ok(())
}

/// Write a routine's slots and bump its version, failing with `Conflict` if it moved
async fn write_slots(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    expected_version: i64,
    raw: &RawSlotArray,
) -> AppResult<()> {
    let result = sqlx::query(
        r"
        UPDATE routines
        SET slots = $1, version = version + 1
        WHERE id = $2 AND version = $3 AND status = 'active'
        ",
    )
    .bind(slots_to_json(raw)?)
    .bind(routine_id.get())
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::conflict(routine_id));
    }
    Ok(())
}

/// Archive an active routine at `expected_version`
pub(crate) async fn archive_routine(
    conn: &mut SqliteConnection,
    routine_id: RoutineId,
    expected_version: i64,
) -> AppResult<()> {
    lock_state(&mut *conn, routine_id, expected_version).await?;
    let result = sqlx::query(
        r"
        UPDATE routines
        SET status = 'archived', version = version + 1
        WHERE id = $1 AND version = $2 AND status = 'active'
        ",
    )
    .bind(routine_id.get())
    .bind(expected_version)
    .execute(&mut *conn)
    .await?;
    if result.rows_affected() == 0 {
        return Err(AppError::conflict(routine_id));
    }
    Ok(())
}

async fn catalog_entry_exists(
    conn: &mut SqliteConnection,
    entry_id: CatalogEntryId,
) -> AppResult<bool> {
    let found: Option<i64> = sqlx::query_scalar("SELECT id FROM catalog_entries WHERE id = $1")
        .bind(entry_id.get())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(found.is_some())
}

async fn insert_empty_detail(
    conn: &mut SqliteConnection,
    entry_id: CatalogEntryId,
) -> AppResult<DetailId> {
    let result = sqlx::query(
        "INSERT INTO routine_details (catalog_entry_id, skipped, sets) VALUES ($1, 0, $2)",
    )
    .bind(entry_id.get())
    .bind(sets_to_json(&encode_sets(&[])?)?)
    .execute(&mut *conn)
    .await?;
    Ok(DetailId(result.last_insert_rowid()))
}

async fn fetch_routine<'e, E>(executor: E, routine_id: RoutineId) -> AppResult<Option<Routine>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r"
        SELECT id, user_id, day_of_week, status, slots, version, created_at
        FROM routines
        WHERE id = $1
        ",
    )
    .bind(routine_id.get())
    .fetch_optional(executor)
    .await?;

    row.map(|r| row_to_routine(&r)).transpose()
}

async fn fetch_detail<'e, E>(executor: E, detail_id: DetailId) -> AppResult<Option<RoutineDetail>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query(
        r"
        SELECT id, catalog_entry_id, skipped, sets
        FROM routine_details
        WHERE id = $1
        ",
    )
    .bind(detail_id.get())
    .fetch_optional(executor)
    .await?;

    row.map(|r| row_to_detail(&r)).transpose()
}

/// Convert a database row to a `Routine`
fn row_to_routine(row: &SqliteRow) -> AppResult<Routine> {
    let user_id: String = row.try_get("user_id")?;
    let day: String = row.try_get("day_of_week")?;
    let status: String = row.try_get("status")?;
    let slots_json: String = row.try_get("slots")?;
    let created_at: String = row.try_get("created_at")?;

    Ok(Routine {
        id: RoutineId(row.try_get("id")?),
        user_id: Uuid::parse_str(&user_id)
            .map_err(|e| AppError::internal(format!("Invalid user id '{user_id}': {e}")))?,
        day_of_week: day.parse()?,
        status: RoutineStatus::parse(&status),
        slots: decode_slots(&slots_from_json(&slots_json)?),
        version: row.try_get("version")?,
        created_at: DateTime::parse_from_rfc3339(&created_at)
            .map_err(|e| AppError::internal(format!("Invalid datetime: {e}")))?
            .with_timezone(&Utc),
    })
}

/// Convert a database row to a `RoutineDetail`
fn row_to_detail(row: &SqliteRow) -> AppResult<RoutineDetail> {
    let sets_json: String = row.try_get("sets")?;

    Ok(RoutineDetail {
        id: DetailId(row.try_get("id")?),
        catalog_entry_id: CatalogEntryId(row.try_get("catalog_entry_id")?),
        skipped: row.try_get::<i64, _>("skipped")? != 0,
        sets: decode_sets(&sets_from_json(&sets_json)?),
    })
}
