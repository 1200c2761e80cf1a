// ABOUTME: Session record models - completed-session summaries, totals and progress deltas
// ABOUTME: Session exercise lines are keyed by catalog entry so comparisons survive substitution
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CatalogEntryId, DayOfWeek, DetailId, PerformedSet, RoutineId, SessionId};

/// Aggregates computed for a routine at completion time
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SessionTotals {
    /// Sum of repetitions x weight over non-skipped details
    pub weight_volume: f64,
    /// Calorie estimate derived from elapsed time and volume
    pub estimated_calories: f64,
    /// Session length supplied by the caller
    pub elapsed_seconds: u64,
}

/// Per-exercise summary stored with a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionExercise {
    /// Exercise performed
    pub catalog_entry_id: CatalogEntryId,
    /// Number of logged sets
    pub set_count: u32,
    /// Sum of repetitions across sets
    pub total_repetitions: u64,
    /// Sum of repetitions x weight across sets
    pub volume: f64,
}

/// Durable summary of a completed routine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Session identifier
    pub id: SessionId,
    /// Owning user
    pub user_id: Uuid,
    /// Routine the session completed
    pub routine_id: RoutineId,
    /// Day tag of the routine, used to find the previous session
    pub day_of_week: DayOfWeek,
    /// Session length in seconds
    pub elapsed_seconds: u64,
    /// Total weight volume
    pub weight_volume: f64,
    /// Estimated calories
    pub estimated_calories: f64,
    /// Completion timestamp
    pub completed_at: DateTime<Utc>,
    /// Exercises performed, in slot order
    pub exercises: Vec<SessionExercise>,
}

/// How an exercise relates to the previous session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeltaKind {
    /// Present in both sessions
    Changed,
    /// Only in the current session
    Added,
    /// Only in the previous session
    Removed,
}

/// Change of one exercise between a session and its predecessor
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseDelta {
    /// Exercise compared
    pub catalog_entry_id: CatalogEntryId,
    /// Presence in each session
    pub kind: DeltaKind,
    /// Current volume minus previous volume
    pub volume_delta: f64,
    /// Current set count minus previous set count
    pub set_count_delta: i64,
    /// Current repetitions minus previous repetitions
    pub repetitions_delta: i64,
}

/// Pre-session summary of one occupied slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverviewLine {
    /// Slot position
    pub position: usize,
    /// Detail in the slot
    pub detail_id: DetailId,
    /// Exercise in the slot
    pub catalog_entry_id: CatalogEntryId,
    /// Whether the exercise is marked skipped
    pub skipped: bool,
    /// Number of logged sets
    pub set_count: usize,
    /// First logged set, if any
    pub first_set: Option<PerformedSet>,
}
