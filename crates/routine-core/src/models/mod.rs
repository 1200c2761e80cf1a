// ABOUTME: Core data models for routines, routine details, catalog entries and sessions
// ABOUTME: Defines typed identifiers shared by every layer of the engine
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Fixed-capacity ordered list
pub mod bounded;
/// Exercise catalog entries
pub mod catalog;
/// Routines, slots, details and performed sets
pub mod routine;
/// Session records, totals and progress deltas
pub mod session;

pub use bounded::BoundedList;
pub use catalog::{BodyPart, CatalogEntry, MeasurementUnit, NewCatalogEntry};
pub use routine::{
    DayOfWeek, PerformedSet, PlacedDetail, Routine, RoutineDetail, RoutineStatus, SetList,
    SlotDetails, SlotList, SlotRef,
};
pub use session::{
    DeltaKind, ExerciseDelta, OverviewLine, SessionExercise, SessionRecord, SessionTotals,
};

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            /// Get the raw row identifier
            #[must_use]
            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

record_id!(
    /// Identifier of a scheduled routine
    RoutineId
);
record_id!(
    /// Identifier of one exercise instance inside a routine slot
    DetailId
);
record_id!(
    /// Identifier of an exercise catalog entry
    CatalogEntryId
);
record_id!(
    /// Identifier of a completed session record
    SessionId
);
