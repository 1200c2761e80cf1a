// ABOUTME: Session totals, completion snapshots and session-over-session progress deltas
// ABOUTME: Pure aggregation over routine details and stored session records
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Progress aggregation
//!
//! Weight volume is the sum of `repetitions x weight` over every set of every
//! non-skipped detail, with a missing weight counting as zero. Sessions store
//! one line per catalog entry, so two sessions compare by exercise even when
//! substitution moved exercises between slots.

use std::collections::HashMap;

use chrono::NaiveDate;
use routine_core::models::{
    CatalogEntryId, DeltaKind, ExerciseDelta, OverviewLine, PlacedDetail, RoutineId,
    SessionExercise, SessionRecord, SessionTotals,
};
use uuid::Uuid;

use crate::config::CaloriePolicy;
use crate::database::{RoutineStore, SessionStore};
use crate::errors::{AppError, AppResult};
use crate::logging::RoutineLogger;
use crate::routines::OwnershipGuard;

/// Computes session totals and compares sessions
#[derive(Clone)]
pub struct ProgressAggregator {
    store: RoutineStore,
    sessions: SessionStore,
    guard: OwnershipGuard,
    calories: CaloriePolicy,
}

impl ProgressAggregator {
    /// Create a new aggregator
    #[must_use]
    pub const fn new(
        store: RoutineStore,
        sessions: SessionStore,
        guard: OwnershipGuard,
        calories: CaloriePolicy,
    ) -> Self {
        Self {
            store,
            sessions,
            guard,
            calories,
        }
    }

    /// Totals for `routine_id` given the caller-measured session length
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine does not exist, or a store error
    pub async fn session_totals(
        &self,
        routine_id: RoutineId,
        elapsed_seconds: u64,
    ) -> AppResult<SessionTotals> {
        let routine = self.store.get_routine(routine_id).await?;
        let slot_details = self.store.get_slot_details(&routine).await?;
        Ok(totals_for(
            &slot_details.details,
            elapsed_seconds,
            &self.calories,
        ))
    }

    /// Record a completed session and archive the routine
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine,
    /// `AlreadyCompleted` if it is archived, `Conflict` if it changed while
    /// the totals were computed, or a store error
    pub async fn complete_session(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        elapsed_seconds: u64,
    ) -> AppResult<SessionRecord> {
        let routine = self.guard.require_mutable(user_id, routine_id, None).await?;
        let slot_details = self.store.get_slot_details(&routine).await?;

        let totals = totals_for(&slot_details.details, elapsed_seconds, &self.calories);
        let exercises = summarize_exercises(&slot_details.details);
        let record = self
            .sessions
            .record_completion(&routine, totals, exercises)
            .await
            .map_err(|e| e.with_user_id(user_id))?;

        RoutineLogger::log_session_completed(
            user_id,
            routine_id,
            elapsed_seconds,
            totals.weight_volume,
        );
        Ok(record)
    }

    /// Per-exercise change between the latest session of `routine_id` and the session before it
    ///
    /// Exercises in the latest session come first, in slot order, followed by
    /// exercises that only the earlier session had. Without an earlier
    /// session every exercise is reported as added.
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the user has no completed session of the routine
    pub async fn compare_to_previous(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<Vec<ExerciseDelta>> {
        let current = self
            .sessions
            .latest_for_routine(user_id, routine_id)
            .await?
            .ok_or_else(|| {
                AppError::not_found(format!("Completed session of routine {routine_id}"))
                    .with_user_id(user_id)
                    .with_routine_id(routine_id)
            })?;
        let previous = self.sessions.previous_before(&current).await?;

        Ok(exercise_deltas(
            &current.exercises,
            previous
                .as_ref()
                .map(|p| p.exercises.as_slice())
                .unwrap_or_default(),
        ))
    }

    /// One line per loadable slot, for showing a routine before it starts
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine, or a store error
    pub async fn routine_overview(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<Vec<OverviewLine>> {
        let routine = self.guard.require_owner(user_id, routine_id).await?;
        let slot_details = self.store.get_slot_details(&routine).await?;

        Ok(slot_details
            .details
            .into_iter()
            .map(|placed| OverviewLine {
                position: placed.position,
                detail_id: placed.detail.id,
                catalog_entry_id: placed.detail.catalog_entry_id,
                skipped: placed.detail.skipped,
                set_count: placed.detail.sets.len(),
                first_set: placed.detail.sets.first().copied(),
            })
            .collect())
    }

    /// Number of sessions the user has completed
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn session_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.sessions.count_for_user(user_id).await
    }

    /// Sessions the user completed on `date` (UTC), newest first
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn sessions_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<SessionRecord>> {
        self.sessions.on_date(user_id, date).await
    }
}

/// Totals over the non-skipped details
#[must_use]
pub fn totals_for(
    details: &[PlacedDetail],
    elapsed_seconds: u64,
    calories: &CaloriePolicy,
) -> SessionTotals {
    let weight_volume: f64 = details
        .iter()
        .filter(|placed| !placed.detail.skipped)
        .map(|placed| placed.detail.volume())
        .sum();

    SessionTotals {
        weight_volume,
        estimated_calories: calories.estimate(elapsed_seconds, weight_volume),
        elapsed_seconds,
    }
}

/// One line per catalog entry performed, in order of first slot
///
/// Skipped details are left out; two slots holding the same exercise are merged.
#[must_use]
pub fn summarize_exercises(details: &[PlacedDetail]) -> Vec<SessionExercise> {
    let mut lines: Vec<SessionExercise> = Vec::new();
    let mut index: HashMap<CatalogEntryId, usize> = HashMap::new();

    for placed in details.iter().filter(|placed| !placed.detail.skipped) {
        let detail = &placed.detail;
        let slot = *index.entry(detail.catalog_entry_id).or_insert_with(|| {
            lines.push(SessionExercise {
                catalog_entry_id: detail.catalog_entry_id,
                set_count: 0,
                total_repetitions: 0,
                volume: 0.0,
            });
            lines.len() - 1
        });
        if let Some(line) = lines.get_mut(slot) {
            line.set_count += detail.sets.len() as u32;
            line.total_repetitions += detail.total_repetitions();
            line.volume += detail.volume();
        }
    }
    lines
}

/// Compare two sessions by catalog entry
#[must_use]
pub fn exercise_deltas(
    current: &[SessionExercise],
    previous: &[SessionExercise],
) -> Vec<ExerciseDelta> {
    let previous_by_entry: HashMap<CatalogEntryId, &SessionExercise> = previous
        .iter()
        .map(|line| (line.catalog_entry_id, line))
        .collect();

    let mut deltas: Vec<ExerciseDelta> = current
        .iter()
        .map(|line| match previous_by_entry.get(&line.catalog_entry_id) {
            Some(before) => delta_between(DeltaKind::Changed, line, Some(before)),
            None => delta_between(DeltaKind::Added, line, None),
        })
        .collect();

    let current_entries: Vec<CatalogEntryId> =
        current.iter().map(|line| line.catalog_entry_id).collect();
    deltas.extend(
        previous
            .iter()
            .filter(|line| !current_entries.contains(&line.catalog_entry_id))
            .map(|line| ExerciseDelta {
                catalog_entry_id: line.catalog_entry_id,
                kind: DeltaKind::Removed,
                volume_delta: -line.volume,
                set_count_delta: -i64::from(line.set_count),
                repetitions_delta: -(line.total_repetitions as i64),
            }),
    );
    deltas
}

fn delta_between(
    kind: DeltaKind,
    now: &SessionExercise,
    before: Option<&SessionExercise>,
) -> ExerciseDelta {
    let (volume, sets, reps) = before.map_or((0.0, 0, 0), |b| {
        (b.volume, i64::from(b.set_count), b.total_repetitions as i64)
    });
    ExerciseDelta {
        catalog_entry_id: now.catalog_entry_id,
        kind,
        volume_delta: now.volume - volume,
        set_count_delta: i64::from(now.set_count) - sets,
        repetitions_delta: now.total_repetitions as i64 - reps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_core::models::{DetailId, PerformedSet, RoutineDetail, SetList};

    fn placed(position: usize, entry: i64, skipped: bool, sets: &[(u32, Option<f64>)]) -> PlacedDetail {
        PlacedDetail {
            position,
            detail: RoutineDetail {
                id: DetailId(position as i64 + 100),
                catalog_entry_id: CatalogEntryId(entry),
                skipped,
                sets: SetList::from_vec(
                    sets.iter()
                        .map(|&(reps, weight)| PerformedSet::new(reps, weight))
                        .collect(),
                )
                .unwrap(),
            },
        }
    }

    fn line(entry: i64, set_count: u32, reps: u64, volume: f64) -> SessionExercise {
        SessionExercise {
            catalog_entry_id: CatalogEntryId(entry),
            set_count,
            total_repetitions: reps,
            volume,
        }
    }

    #[test]
    fn test_totals_ignore_skipped_details() {
        let details = vec![
            placed(0, 1, false, &[(10, Some(50.0)), (10, Some(60.0))]),
            placed(1, 2, true, &[(10, Some(100.0))]),
            placed(2, 21, false, &[(15, None)]),
        ];
        let totals = totals_for(&details, 600, &CaloriePolicy::default());
        assert!((totals.weight_volume - 1100.0).abs() < f64::EPSILON);
        assert_eq!(totals.elapsed_seconds, 600);
        // 10 minutes * 5 + 1100 * 0.05
        assert!((totals.estimated_calories - 105.0).abs() < 1e-9);
    }

    #[test]
    fn test_summary_merges_repeated_entries_in_slot_order() {
        let details = vec![
            placed(0, 7, false, &[(5, Some(100.0))]),
            placed(1, 1, false, &[(10, Some(50.0))]),
            placed(2, 7, false, &[(5, Some(110.0)), (3, Some(120.0))]),
            placed(3, 9, true, &[(12, Some(10.0))]),
        ];
        let lines = summarize_exercises(&details);
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].catalog_entry_id, CatalogEntryId(7));
        assert_eq!(lines[0].set_count, 3);
        assert_eq!(lines[0].total_repetitions, 13);
        assert!((lines[0].volume - 1410.0).abs() < f64::EPSILON);
        assert_eq!(lines[1].catalog_entry_id, CatalogEntryId(1));
    }

    #[test]
    fn test_deltas_report_changed_added_and_removed() {
        let previous = vec![line(1, 3, 30, 1650.0), line(5, 3, 36, 900.0)];
        let current = vec![line(1, 4, 32, 1760.0), line(19, 3, 30, 0.0)];

        let deltas = exercise_deltas(&current, &previous);
        assert_eq!(deltas.len(), 3);

        assert_eq!(deltas[0].kind, DeltaKind::Changed);
        assert_eq!(deltas[0].set_count_delta, 1);
        assert_eq!(deltas[0].repetitions_delta, 2);
        assert!((deltas[0].volume_delta - 110.0).abs() < f64::EPSILON);

        assert_eq!(deltas[1].kind, DeltaKind::Added);
        assert_eq!(deltas[1].catalog_entry_id, CatalogEntryId(19));
        assert_eq!(deltas[1].set_count_delta, 3);

        assert_eq!(deltas[2].kind, DeltaKind::Removed);
        assert_eq!(deltas[2].catalog_entry_id, CatalogEntryId(5));
        assert_eq!(deltas[2].set_count_delta, -3);
        assert!((deltas[2].volume_delta + 900.0).abs() < f64::EPSILON);
    }
}
