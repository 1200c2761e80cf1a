// ABOUTME: Routine store location, pool sizing and per-operation timeouts
// ABOUTME: Parsed from DATABASE_* variables through an injectable lookup
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use crate::errors::{AppError, AppResult};
use routine_core::constants::database;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use super::parse_var;

/// Where the routine store lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DatabaseUrl {
    /// `SQLite` file, created on first connect
    File(PathBuf),
    /// Private in-memory `SQLite`, gone when the pool closes
    Memory,
}

impl DatabaseUrl {
    /// Accepts `sqlite::memory:`, `sqlite:<path>`, `sqlite://<path>` or a bare path
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` for any other `scheme://` URL
    pub fn parse_url(raw: &str) -> AppResult<Self> {
        let raw = raw.trim();
        match raw.strip_prefix("sqlite:") {
            Some(rest) => match rest.trim_start_matches("//") {
                "" | ":memory:" => Ok(Self::Memory),
                file => Ok(Self::File(file.into())),
            },
            None if raw.contains("://") => Err(AppError::config_invalid(format!(
                "Routine store only supports sqlite, got {raw}"
            ))),
            None => Ok(Self::File(raw.into())),
        }
    }

    /// Connection string handed to `SqliteConnectOptions`
    #[must_use]
    pub fn to_connection_string(&self) -> String {
        match self {
            Self::File(path) => format!("sqlite:{}", path.display()),
            Self::Memory => String::from("sqlite::memory:"),
        }
    }

    /// In-memory store
    #[must_use]
    pub const fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

impl Default for DatabaseUrl {
    fn default() -> Self {
        Self::File(PathBuf::from("./data/routines.db"))
    }
}

impl fmt::Display for DatabaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_connection_string())
    }
}

/// Store connection and pool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database location
    pub url: DatabaseUrl,
    /// Maximum pooled connections (forced to 1 for in-memory databases)
    pub max_connections: u32,
    /// Time allowed to obtain a pooled connection
    pub acquire_timeout: Duration,
    /// Time allowed for a whole store operation
    pub operation_timeout: Duration,
    /// Create the schema on connect
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DatabaseUrl::default(),
            max_connections: database::DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_millis(database::DEFAULT_ACQUIRE_TIMEOUT_MS),
            operation_timeout: Duration::from_millis(database::DEFAULT_OPERATION_TIMEOUT_MS),
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    /// In-memory database, used by tests and one-off tooling
    #[must_use]
    pub fn in_memory() -> Self {
        Self {
            url: DatabaseUrl::Memory,
            max_connections: 1,
            ..Self::default()
        }
    }

    /// File-backed database at `path` with default pool settings
    #[must_use]
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self {
            url: DatabaseUrl::File(path.into()),
            ..Self::default()
        }
    }

    /// Pool size actually used for the configured URL
    ///
    /// Every in-memory `SQLite` connection is a separate database, so the pool
    /// must hold exactly one connection.
    #[must_use]
    pub const fn effective_max_connections(&self) -> u32 {
        if self.url.is_memory() {
            1
        } else {
            self.max_connections
        }
    }

    /// Load database configuration through `lookup`
    ///
    /// # Errors
    ///
    /// Returns an error if any database variable is present but invalid
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let defaults = Self::default();
        let url = match lookup("DATABASE_URL") {
            Some(raw) => DatabaseUrl::parse_url(&raw)?,
            None => DatabaseUrl::parse_url(database::DEFAULT_DATABASE_URL)?,
        };
        let max_connections: u32 =
            parse_var(lookup, "DATABASE_MAX_CONNECTIONS")?.unwrap_or(defaults.max_connections);
        if max_connections == 0 {
            return Err(AppError::config_invalid(
                "DATABASE_MAX_CONNECTIONS must be at least 1",
            ));
        }
        let acquire_timeout = parse_var::<u64>(lookup, "DATABASE_ACQUIRE_TIMEOUT_MS")?
            .map_or(defaults.acquire_timeout, Duration::from_millis);
        let operation_timeout = parse_var::<u64>(lookup, "DATABASE_OPERATION_TIMEOUT_MS")?
            .map_or(defaults.operation_timeout, Duration::from_millis);
        if operation_timeout.is_zero() {
            return Err(AppError::config_invalid(
                "DATABASE_OPERATION_TIMEOUT_MS must be positive",
            ));
        }
        let auto_migrate = parse_var(lookup, "AUTO_MIGRATE")?.unwrap_or(defaults.auto_migrate);

        Ok(Self {
            url,
            max_connections,
            acquire_timeout,
            operation_timeout,
            auto_migrate,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_memory_and_file_urls() {
        assert_eq!(
            DatabaseUrl::parse_url("sqlite::memory:").unwrap(),
            DatabaseUrl::Memory
        );
        assert_eq!(
            DatabaseUrl::parse_url("sqlite://./data/test.db").unwrap(),
            DatabaseUrl::File(PathBuf::from("./data/test.db"))
        );
        assert_eq!(
            DatabaseUrl::parse_url(" routines.db ").unwrap(),
            DatabaseUrl::File(PathBuf::from("routines.db"))
        );
        assert!(DatabaseUrl::parse_url("postgres://localhost/db").is_err());
    }

    #[test]
    fn test_memory_database_uses_single_connection() {
        let config = DatabaseConfig {
            max_connections: 8,
            ..DatabaseConfig::in_memory()
        };
        assert_eq!(config.effective_max_connections(), 1);
        assert_eq!(
            DatabaseConfig::file("/tmp/x.db").effective_max_connections(),
            database::DEFAULT_MAX_CONNECTIONS
        );
    }
}
