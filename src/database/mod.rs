// ABOUTME: Store handle for the routine engine wrapping a pooled SQLite connection
// ABOUTME: Applies per-operation timeouts, opens guarded transactions and creates the schema
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Persisted store
//!
//! [`Database`] is constructed explicitly from a [`DatabaseConfig`] and cloned
//! into every component that needs it. Each store call acquires a pooled
//! connection for its own duration and runs under the configured operation
//! timeout; expiry surfaces as `StoreUnavailable`.

/// Exercise catalog reads, inserts and seeding
pub mod catalog;
/// Routine and routine detail persistence
pub mod routines;
/// Session record persistence
pub mod sessions;
/// Fixed-capacity slot and set codec
pub mod slot_codec;
/// RAII transaction guard and caller-directed retry
pub mod transactions;

pub use catalog::CatalogManager;
pub use routines::RoutineStore;
pub use sessions::SessionStore;
pub use transactions::{retry_transient, SqliteTransactionGuard, TransactionGuard};

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use routine_core::constants::database::BUSY_TIMEOUT_MS;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::config::{DatabaseConfig, DatabaseUrl};
use crate::errors::{AppError, AppResult};

/// Pooled store handle
#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
    operation_timeout: Duration,
}

impl Database {
    /// Open the pool described by `config`, creating the schema when `auto_migrate` is set
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated
    pub async fn connect(config: &DatabaseConfig) -> AppResult<Self> {
        let mut options = SqliteConnectOptions::from_str(&config.url.to_connection_string())
            .map_err(|e| AppError::config_invalid(format!("Invalid database URL: {e}")))?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_millis(BUSY_TIMEOUT_MS));

        let mut pool_options = SqlitePoolOptions::new()
            .max_connections(config.effective_max_connections())
            .acquire_timeout(config.acquire_timeout);

        match &config.url {
            DatabaseUrl::Memory => {
                // The in-memory database lives exactly as long as its single connection
                pool_options = pool_options
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None);
            }
            DatabaseUrl::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    tokio::fs::create_dir_all(parent).await.map_err(|e| {
                        AppError::store_unavailable("connect").with_source(e)
                    })?;
                }
                options = options.journal_mode(SqliteJournalMode::Wal);
            }
        }

        let pool = pool_options.connect_with(options).await?;
        info!(
            database.url = %config.url,
            database.max_connections = config.effective_max_connections(),
            "Routine store connected"
        );

        let database = Self {
            pool,
            operation_timeout: config.operation_timeout,
        };
        if config.auto_migrate {
            database.migrate().await?;
        }
        Ok(database)
    }

    /// Underlying connection pool
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Time allowed for one store operation
    #[must_use]
    pub const fn operation_timeout(&self) -> Duration {
        self.operation_timeout
    }

    /// Run `future` under the operation timeout
    ///
    /// # Errors
    ///
    /// Returns `StoreUnavailable` naming `operation` when the timeout expires,
    /// otherwise whatever `future` returns
    pub async fn bounded<T, F>(&self, operation: &'static str, future: F) -> AppResult<T>
    where
        F: Future<Output = AppResult<T>>,
    {
        tokio::time::timeout(self.operation_timeout, future)
            .await
            .map_err(|_| {
                debug!(operation, timeout_ms = ?self.operation_timeout, "Store operation timed out");
                AppError::store_unavailable(operation)
            })?
    }

    /// Open a guarded transaction for the named store operation
    ///
    /// # Errors
    ///
    /// Returns an error if no connection can be acquired
    pub async fn begin(
        &self,
        operation: &'static str,
    ) -> AppResult<SqliteTransactionGuard<'static>> {
        let tx = self.pool.begin().await?;
        Ok(TransactionGuard::new(tx, operation))
    }

    /// Create every table and index if missing
    ///
    /// # Errors
    ///
    /// Returns an error if a statement fails
    pub async fn migrate(&self) -> AppResult<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Routine store schema ready");
        Ok(())
    }

    /// Close every pooled connection
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

const SCHEMA: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS catalog_entries (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        body_part TEXT NOT NULL,
        unit TEXT NOT NULL DEFAULT 'repetitions',
        bodyweight INTEGER NOT NULL DEFAULT 0
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_catalog_entries_body_part ON catalog_entries(body_part)",
    r"
    CREATE TABLE IF NOT EXISTS routine_details (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        catalog_entry_id INTEGER NOT NULL REFERENCES catalog_entries(id),
        skipped INTEGER NOT NULL DEFAULT 0,
        sets TEXT NOT NULL DEFAULT '[]'
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS routines (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        day_of_week TEXT NOT NULL CHECK (day_of_week IN ('mon','tue','wed','thu','fri','sat','sun')),
        status TEXT NOT NULL DEFAULT 'active' CHECK (status IN ('active','archived')),
        slots TEXT NOT NULL DEFAULT '[]',
        version INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_routines_user ON routines(user_id)",
    r"
    CREATE TABLE IF NOT EXISTS routine_calendar (
        user_id TEXT PRIMARY KEY,
        mon_routine_id INTEGER REFERENCES routines(id),
        tue_routine_id INTEGER REFERENCES routines(id),
        wed_routine_id INTEGER REFERENCES routines(id),
        thu_routine_id INTEGER REFERENCES routines(id),
        fri_routine_id INTEGER REFERENCES routines(id),
        sat_routine_id INTEGER REFERENCES routines(id),
        sun_routine_id INTEGER REFERENCES routines(id)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS session_records (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        user_id TEXT NOT NULL,
        routine_id INTEGER NOT NULL REFERENCES routines(id),
        day_of_week TEXT NOT NULL,
        elapsed_seconds INTEGER NOT NULL,
        weight_volume REAL NOT NULL,
        estimated_calories REAL NOT NULL,
        completed_at TEXT NOT NULL
    )
    ",
    r"
    CREATE INDEX IF NOT EXISTS idx_session_records_user_day
        ON session_records(user_id, day_of_week, completed_at)
    ",
    r"
    CREATE TABLE IF NOT EXISTS session_exercises (
        session_id INTEGER NOT NULL REFERENCES session_records(id) ON DELETE CASCADE,
        ordinal INTEGER NOT NULL,
        catalog_entry_id INTEGER NOT NULL,
        set_count INTEGER NOT NULL,
        total_repetitions INTEGER NOT NULL,
        volume REAL NOT NULL,
        PRIMARY KEY (session_id, ordinal)
    )
    ",
];
