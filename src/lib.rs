// ABOUTME: Main library entry point for the routine engine
// ABOUTME: Routine composition, exercise substitution and progress aggregation over SQLite
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![deny(unsafe_code)]

//! # Routine Engine
//!
//! Backs a fitness tracker's scheduled routines: each routine is a bounded,
//! ordered list of exercise slots, each slot holds a routine detail with a
//! bounded, contiguous list of performed sets.
//!
//! ## Features
//!
//! - **Substitution**: swap the exercise behind a slot atomically, keeping its position
//! - **Skipping**: flag a slot's exercise as skipped without touching its sets
//! - **Recommendations**: random substitutes from the same body part
//! - **Progress**: session totals, calorie estimates and deltas against the previous session
//!
//! ## Architecture
//!
//! - **Config**: environment-driven store, calorie and recommendation settings
//! - **Database**: pooled store handle, slot codec, routine/catalog/session stores
//! - **Routines**: ownership checks plus the substitution, skip and recommendation engines
//! - **Intelligence**: progress aggregation over routine details and session records
//! - **Engine**: a facade exposing every operation to a request layer
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use routine_engine::config::EngineConfig;
//! use routine_engine::engine::RoutineEngine;
//! use routine_engine::errors::AppResult;
//! use routine_engine::models::{CatalogEntryId, DayOfWeek};
//!
//! #[tokio::main]
//! async fn main() -> AppResult<()> {
//!     let engine = RoutineEngine::connect(EngineConfig::from_env()?).await?;
//!     engine.seed_default_catalog().await?;
//!
//!     let user_id = uuid::Uuid::new_v4();
//!     let routine_id = engine
//!         .schedule_routine(user_id, DayOfWeek::Mon, &[CatalogEntryId(1), CatalogEntryId(2)])
//!         .await?;
//!     let routine = engine.get_routine(user_id, routine_id).await?;
//!     println!("Scheduled {} exercises", routine.slots.len());
//!     Ok(())
//! }
//! ```

/// Configuration loaded from the environment
pub mod config;

/// Pooled store, codec and persistence
pub mod database;

/// Engine facade
pub mod engine;

/// Unified error handling
pub mod errors;

/// Progress aggregation
pub mod intelligence;

/// Logging setup and mutation events
pub mod logging;

/// Ownership checks and routine mutation engines
pub mod routines;

/// Domain models shared with the core crate
pub mod models {
    pub use routine_core::models::*;
}

/// Capacities and defaults
pub mod constants {
    pub use routine_core::constants::*;
}
