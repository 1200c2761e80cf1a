// ABOUTME: Routine domain models - day tags, lifecycle status, slots, details and performed sets
// ABOUTME: Slots and sets are bounded ordered lists with capacity 10
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::{BoundedList, CatalogEntryId, DetailId, RoutineId};
use crate::constants::limits::{SET_CAPACITY, SLOT_CAPACITY};
use crate::errors::AppError;

/// Occupied slots of a routine, in position order
pub type SlotList = BoundedList<SlotRef, SLOT_CAPACITY>;

/// Performed sets of a routine detail, contiguous from index 0
pub type SetList = BoundedList<PerformedSet, SET_CAPACITY>;

/// Day of the week a routine is scheduled on
///
/// Each tag owns exactly one column of the routine calendar; the column name
/// is chosen here and never built from caller input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    /// Monday
    Mon,
    /// Tuesday
    Tue,
    /// Wednesday
    Wed,
    /// Thursday
    Thu,
    /// Friday
    Fri,
    /// Saturday
    Sat,
    /// Sunday
    Sun,
}

impl DayOfWeek {
    /// All days, Monday first
    pub const ALL: [Self; 7] = [
        Self::Mon,
        Self::Tue,
        Self::Wed,
        Self::Thu,
        Self::Fri,
        Self::Sat,
        Self::Sun,
    ];

    /// Short tag stored in the database
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Mon => "mon",
            Self::Tue => "tue",
            Self::Wed => "wed",
            Self::Thu => "thu",
            Self::Fri => "fri",
            Self::Sat => "sat",
            Self::Sun => "sun",
        }
    }

    /// Routine calendar column holding this day's routine
    #[must_use]
    pub const fn calendar_column(&self) -> &'static str {
        match self {
            Self::Mon => "mon_routine_id",
            Self::Tue => "tue_routine_id",
            Self::Wed => "wed_routine_id",
            Self::Thu => "thu_routine_id",
            Self::Fri => "fri_routine_id",
            Self::Sat => "sat_routine_id",
            Self::Sun => "sun_routine_id",
        }
    }
}

impl FromStr for DayOfWeek {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mon" => Ok(Self::Mon),
            "tue" => Ok(Self::Tue),
            "wed" => Ok(Self::Wed),
            "thu" => Ok(Self::Thu),
            "fri" => Ok(Self::Fri),
            "sat" => Ok(Self::Sat),
            "sun" => Ok(Self::Sun),
            other => Err(AppError::invalid_input(format!(
                "Invalid day of week '{other}', expected one of mon..sun"
            ))),
        }
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(day: chrono::Weekday) -> Self {
        match day {
            chrono::Weekday::Mon => Self::Mon,
            chrono::Weekday::Tue => Self::Tue,
            chrono::Weekday::Wed => Self::Wed,
            chrono::Weekday::Thu => Self::Thu,
            chrono::Weekday::Fri => Self::Fri,
            chrono::Weekday::Sat => Self::Sat,
            chrono::Weekday::Sun => Self::Sun,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoutineStatus {
    /// Scheduled and open for substitution, skipping and set logging
    #[default]
    Active,
    /// Completed or superseded; slots are frozen
    Archived,
}

impl RoutineStatus {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Archived => "archived",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s {
            "archived" => Self::Archived,
            _ => Self::Active,
        }
    }
}

/// One occupied slot of a routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotRef {
    /// Position in `0..SLOT_CAPACITY`
    pub position: usize,
    /// Detail held by the slot
    pub detail_id: DetailId,
}

/// A scheduled workout for one user on one day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Routine {
    /// Routine identifier
    pub id: RoutineId,
    /// Owning user
    pub user_id: Uuid,
    /// Day the routine is scheduled on
    pub day_of_week: DayOfWeek,
    /// Lifecycle status
    pub status: RoutineStatus,
    /// Occupied slots in position order; unoccupied positions are omitted
    pub slots: SlotList,
    /// Optimistic-locking version, bumped on every slot or status write
    pub version: i64,
    /// When the routine was scheduled
    pub created_at: DateTime<Utc>,
}

impl Routine {
    /// Whether the routine has been archived
    #[must_use]
    pub fn is_archived(&self) -> bool {
        self.status == RoutineStatus::Archived
    }

    /// Whether any slot references `detail_id`
    #[must_use]
    pub fn references(&self, detail_id: DetailId) -> bool {
        self.slots.iter().any(|slot| slot.detail_id == detail_id)
    }

    /// Every position currently referencing `detail_id`
    #[must_use]
    pub fn positions_of(&self, detail_id: DetailId) -> Vec<usize> {
        self.slots
            .iter()
            .filter(|slot| slot.detail_id == detail_id)
            .map(|slot| slot.position)
            .collect()
    }

    /// Detail held at `position`, if occupied
    #[must_use]
    pub fn detail_at(&self, position: usize) -> Option<DetailId> {
        self.slots
            .iter()
            .find(|slot| slot.position == position)
            .map(|slot| slot.detail_id)
    }
}

/// One performed unit of an exercise
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PerformedSet {
    /// Repetitions, seconds, or distance in 100 m units depending on the catalog entry
    pub repetitions: u32,
    /// External weight; absent for bodyweight exercises
    pub weight: Option<f64>,
}

impl PerformedSet {
    /// Create a set
    #[must_use]
    pub const fn new(repetitions: u32, weight: Option<f64>) -> Self {
        Self {
            repetitions,
            weight,
        }
    }

    /// Repetitions times weight, treating a missing weight as zero
    #[must_use]
    pub fn volume(&self) -> f64 {
        f64::from(self.repetitions) * self.weight.unwrap_or(0.0)
    }
}

/// One exercise instance inside a routine slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineDetail {
    /// Detail identifier
    pub id: DetailId,
    /// Exercise performed
    pub catalog_entry_id: CatalogEntryId,
    /// Whether the exercise was skipped in this session
    pub skipped: bool,
    /// Logged sets, contiguous from index 0
    pub sets: SetList,
}

impl RoutineDetail {
    /// Weight volume of all logged sets
    #[must_use]
    pub fn volume(&self) -> f64 {
        self.sets.iter().map(PerformedSet::volume).sum()
    }

    /// Sum of repetitions across logged sets
    #[must_use]
    pub fn total_repetitions(&self) -> u64 {
        self.sets.iter().map(|set| u64::from(set.repetitions)).sum()
    }
}

/// A loaded detail together with the slot it occupies
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacedDetail {
    /// Slot position
    pub position: usize,
    /// Detail referenced by the slot
    pub detail: RoutineDetail,
}

/// Result of loading every detail referenced by a routine
///
/// Slots whose detail could not be loaded are listed in `broken_positions`
/// instead of failing the whole read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SlotDetails {
    /// Details that loaded, in position order
    pub details: Vec<PlacedDetail>,
    /// Positions whose detail is missing or unreadable
    pub broken_positions: Vec<usize>,
}

impl SlotDetails {
    /// Whether every occupied slot loaded
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.broken_positions.is_empty()
    }
}
