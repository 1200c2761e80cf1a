// ABOUTME: Progress intelligence for completed routines
// ABOUTME: Session totals, calorie estimates and comparisons against the previous session
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Intelligence Module
//!
//! Aggregates what a user performed into session records and compares each
//! session with the one before it on the same day of the week.

/// Session totals, completion and comparisons
pub mod progress;

pub use progress::{exercise_deltas, summarize_exercises, totals_for, ProgressAggregator};
