// ABOUTME: Logging configuration and structured logging setup for the routine engine
// ABOUTME: Configures log levels, output formats and the events emitted by routine mutations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Structured logging built on `tracing`

use anyhow::Result;
use routine_core::constants::service_names;
use routine_core::models::{CatalogEntryId, DetailId, RoutineId};
use std::env;
use std::io;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};
use uuid::Uuid;

/// Subscriber settings for the engine and its tools
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// `EnvFilter` directive, e.g. `info` or `routine_engine=debug`
    pub level: String,
    /// Line format
    pub format: LogFormat,
    /// Emit file and line of each event
    pub include_location: bool,
    /// Emit thread id and name of each event
    pub include_thread: bool,
    /// Reported once at startup
    pub service_name: String,
    /// Crate version reported at startup
    pub service_version: String,
    /// Deployment label; `production` turns on location and thread fields
    pub environment: String,
}

/// Event line format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// One JSON object per event
    Json,
    /// Multi-field human readable lines
    Pretty,
    /// Single short line per event
    Compact,
}

impl LogFormat {
    /// Parse `LOG_FORMAT`; anything unrecognised falls back to pretty output
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "json" => Self::Json,
            "compact" => Self::Compact,
            _ => Self::Pretty,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            format: LogFormat::Pretty,
            include_location: false,
            include_thread: false,
            service_name: service_names::ROUTINE_ENGINE.into(),
            service_version: env!("CARGO_PKG_VERSION").to_owned(),
            environment: "development".into(),
        }
    }
}

impl LoggingConfig {
    /// Read `RUST_LOG`, `LOG_FORMAT`, `ENVIRONMENT`, `LOG_INCLUDE_LOCATION`,
    /// `LOG_INCLUDE_THREAD` and `SERVICE_NAME` from the process environment
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Same as [`Self::from_env`] through an arbitrary key lookup
    #[must_use]
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let environment = lookup("ENVIRONMENT").unwrap_or(defaults.environment);
        let production = environment == "production";

        Self {
            level: lookup("RUST_LOG").unwrap_or(defaults.level),
            format: lookup("LOG_FORMAT").map_or(defaults.format, |raw| LogFormat::parse(&raw)),
            include_location: production || lookup("LOG_INCLUDE_LOCATION").is_some(),
            include_thread: production || lookup("LOG_INCLUDE_THREAD").is_some(),
            service_name: lookup("SERVICE_NAME").unwrap_or(defaults.service_name),
            service_version: defaults.service_version,
            environment,
        }
    }

    /// Install the global subscriber and log one startup line
    ///
    /// # Errors
    ///
    /// Returns an error if a global subscriber is already installed
    pub fn init(&self) -> Result<()> {
        let filter = EnvFilter::try_new(&self.level)
            .unwrap_or_else(|_| EnvFilter::new("info"))
            // Per-statement sqlx events stay out of the application stream
            .add_directive(
                "sqlx=warn"
                    .parse()
                    .unwrap_or_else(|_| tracing::Level::WARN.into()),
            );
        let registry = tracing_subscriber::registry().with(filter);

        let layer = fmt::layer()
            .with_file(self.include_location)
            .with_line_number(self.include_location)
            .with_thread_ids(self.include_thread)
            .with_thread_names(self.include_thread)
            .with_writer(io::stdout);
        match self.format {
            LogFormat::Json => registry.with(layer.json()).try_init()?,
            LogFormat::Pretty => registry.with(layer.with_target(true)).try_init()?,
            LogFormat::Compact => registry
                .with(layer.compact().with_target(false))
                .try_init()?,
        }

        info!(
            service.name = %self.service_name,
            service.version = %self.service_version,
            environment = %self.environment,
            log.level = %self.level,
            log.format = ?self.format,
            "Routine engine logging initialized"
        );
        Ok(())
    }
}

/// Initialize logging from environment
///
/// # Errors
///
/// Returns an error if logging initialization fails
pub fn init_from_env() -> Result<()> {
    LoggingConfig::from_env().init()
}

/// Structured events for routine mutations
pub struct RoutineLogger;

impl RoutineLogger {
    /// A slot was pointed at a new detail
    pub fn log_substitution(
        user_id: Uuid,
        routine_id: RoutineId,
        old_detail: DetailId,
        new_detail: DetailId,
        catalog_entry_id: CatalogEntryId,
        positions: &[usize],
    ) {
        info!(
            user.id = %user_id,
            routine.id = %routine_id,
            detail.old = %old_detail,
            detail.new = %new_detail,
            catalog.entry_id = %catalog_entry_id,
            slot.positions = ?positions,
            "Exercise substituted"
        );
    }

    /// A detail was marked skipped
    pub fn log_skip(user_id: Uuid, routine_id: RoutineId, detail_id: DetailId, changed: bool) {
        info!(
            user.id = %user_id,
            routine.id = %routine_id,
            detail.id = %detail_id,
            skip.changed = changed,
            "Exercise skipped"
        );
    }

    /// A set was appended or overwritten
    pub fn log_set_recorded(detail_id: DetailId, set_index: usize, repetitions: u32) {
        info!(
            detail.id = %detail_id,
            set.index = set_index,
            set.repetitions = repetitions,
            "Set recorded"
        );
    }

    /// A routine was created for a day
    pub fn log_scheduled(user_id: Uuid, routine_id: RoutineId, day: &str, slot_count: usize) {
        info!(
            user.id = %user_id,
            routine.id = %routine_id,
            routine.day = %day,
            routine.slots = slot_count,
            "Routine scheduled"
        );
    }

    /// A session was completed and the routine archived
    pub fn log_session_completed(
        user_id: Uuid,
        routine_id: RoutineId,
        elapsed_seconds: u64,
        weight_volume: f64,
    ) {
        info!(
            user.id = %user_id,
            routine.id = %routine_id,
            session.elapsed_seconds = elapsed_seconds,
            session.weight_volume = weight_volume,
            "Session completed"
        );
    }
}
