// ABOUTME: Core types and constants for the routine engine
// ABOUTME: Foundation crate with error taxonomy, identifiers, bounded lists and domain models
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Routine Core
//!
//! Foundation crate providing shared types for routine composition, exercise
//! substitution and progress aggregation. It changes infrequently so the
//! engine crate can build on it incrementally.
//!
//! ## Modules
//!
//! - **errors**: `AppError`, `ErrorCode` and the routine failure taxonomy
//! - **constants**: slot and set capacities, calorie defaults, store defaults
//! - **models**: identifiers, `BoundedList`, catalog, routine and session models

/// Unified error handling with structured codes and identifiers
pub mod errors;

/// Capacities and defaults shared across the engine
pub mod constants;

/// Domain models (routines, details, catalog entries, sessions)
pub mod models;
