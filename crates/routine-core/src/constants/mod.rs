// ABOUTME: Application-wide constants for routine capacity, calorie policy and service defaults
// ABOUTME: Centralizes limits shared by the codec, the store and configuration loading
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

/// Structural limits of routines and routine details
pub mod limits {
    /// Number of exercise slots in a routine
    pub const SLOT_CAPACITY: usize = 10;

    /// Number of sets a routine detail can hold
    pub const SET_CAPACITY: usize = 10;

    /// Replacement candidates offered when the caller does not ask for a count
    pub const DEFAULT_RECOMMENDATION_LIMIT: usize = 3;
}

/// Default coefficients of the calorie estimate
pub mod calories {
    /// Energy spent per minute of session time
    pub const DEFAULT_KCAL_PER_MINUTE: f64 = 5.0;

    /// Energy spent per unit of weight volume (repetitions x weight)
    pub const DEFAULT_KCAL_PER_VOLUME_UNIT: f64 = 0.05;
}

/// Store defaults
pub mod database {
    /// Database used when `DATABASE_URL` is unset
    pub const DEFAULT_DATABASE_URL: &str = "sqlite:./data/routines.db";

    /// Pool size for file-backed databases
    pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

    /// Time allowed to obtain a pooled connection
    pub const DEFAULT_ACQUIRE_TIMEOUT_MS: u64 = 5_000;

    /// Time allowed for one store operation, including its queries
    pub const DEFAULT_OPERATION_TIMEOUT_MS: u64 = 10_000;

    /// `SQLite` busy handler timeout
    pub const BUSY_TIMEOUT_MS: u64 = 2_000;
}

/// Service names for structured logging
pub mod service_names {
    /// Name used in log output
    pub const ROUTINE_ENGINE: &str = "routine-engine";
}
