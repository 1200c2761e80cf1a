// ABOUTME: Shared test utilities and setup functions for integration tests
// ABOUTME: Provides engine construction, catalog ids and routine scheduling helpers
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence
#![allow(
    dead_code,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::unwrap_used
)]
//! Shared test utilities for `routine_engine`
//!
//! Every engine built here runs against its own in-memory store with the
//! default catalog loaded, so tests never see each other's rows.

use routine_engine::config::{DatabaseConfig, EngineConfig};
use routine_engine::database::Database;
use routine_engine::engine::RoutineEngine;
use routine_engine::models::{CatalogEntryId, DayOfWeek, Routine, RoutineId};
use std::path::Path;
use std::sync::Once;
use uuid::Uuid;

static INIT_LOGGER: Once = Once::new();

// Ids assigned by seeding the default catalog into an empty store
pub const BENCH_PRESS: CatalogEntryId = CatalogEntryId(1);
pub const INCLINE_DUMBBELL_PRESS: CatalogEntryId = CatalogEntryId(2);
pub const CHEST_PRESS_MACHINE: CatalogEntryId = CatalogEntryId(3);
pub const LEG_EXTENSION: CatalogEntryId = CatalogEntryId(4);
pub const LAT_PULL_DOWN: CatalogEntryId = CatalogEntryId(5);
pub const SHOULDER_PRESS: CatalogEntryId = CatalogEntryId(9);
pub const PUSH_UP: CatalogEntryId = CatalogEntryId(21);

/// Initialize quiet logging for tests (call once per test process)
pub fn init_test_logging() {
    INIT_LOGGER.call_once(|| {
        let log_level = match std::env::var("TEST_LOG").as_deref() {
            Ok("TRACE") => tracing::Level::TRACE,
            Ok("DEBUG") => tracing::Level::DEBUG,
            Ok("INFO") => tracing::Level::INFO,
            _ => tracing::Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(log_level)
            .with_test_writer()
            .init();
    });
}

/// Engine over a fresh in-memory store with the default catalog
pub async fn create_test_engine() -> RoutineEngine {
    init_test_logging();
    let config = EngineConfig {
        database: DatabaseConfig::in_memory(),
        ..EngineConfig::default()
    };
    seeded(config).await
}

/// Engine over a file-backed store, for tests that need several connections
pub async fn create_file_engine(path: &Path) -> RoutineEngine {
    init_test_logging();
    let config = EngineConfig {
        database: DatabaseConfig::file(path),
        ..EngineConfig::default()
    };
    seeded(config).await
}

async fn seeded(config: EngineConfig) -> RoutineEngine {
    let database = Database::connect(&config.database).await.unwrap();
    let engine = RoutineEngine::new(database, config);
    engine.seed_default_catalog().await.unwrap();
    engine
}

/// Schedule a routine and load it back
pub async fn schedule(
    engine: &RoutineEngine,
    user_id: Uuid,
    day: DayOfWeek,
    entries: &[CatalogEntryId],
) -> Routine {
    let routine_id = engine.schedule_routine(user_id, day, entries).await.unwrap();
    engine.get_routine(user_id, routine_id).await.unwrap()
}

/// Current routine state, bypassing ownership checks
pub async fn reload(engine: &RoutineEngine, routine_id: RoutineId) -> Routine {
    engine.store().get_routine(routine_id).await.unwrap()
}
