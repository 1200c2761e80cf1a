// ABOUTME: Transaction management with RAII guards and caller-directed retry for routine writes
// ABOUTME: Guards roll back on drop unless committed; retry is driven by the error taxonomy
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Transaction management
//!
//! - [`TransactionGuard`]: one transaction per named store operation, rolled
//!   back when dropped without [`TransactionGuard::commit`]
//! - [`retry_transient`]: re-runs an operation with exponential backoff while it
//!   fails with a retryable error (`Conflict` or `StoreUnavailable`)
//!
//! The engine never retries on its own. `retry_transient` exists for the
//! request layer that owns retry policy.
//!
//! ```text
//! let mut guard = database.begin("substitute").await?;
//! sqlx::query("INSERT INTO routine_details ...").execute(guard.executor()?).await?;
//! sqlx::query("UPDATE routines SET slots = ...").execute(guard.executor()?).await?;
//! guard.commit().await?;
//! ```

use std::future::Future;
use std::time::Duration;

use sqlx::{Database, Transaction};
use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::errors::{AppError, AppResult};

/// Base delay of the exponential backoff
const BASE_BACKOFF_MS: u64 = 10;

/// Re-run `f` while it fails with a retryable error
///
/// Deterministic failures (authorization, structural, not found) are returned
/// after the first attempt. Backoff doubles per attempt: 10ms, 20ms, 40ms, ...
///
/// # Errors
///
/// Returns the last error once `max_attempts` is reached, or the first
/// non-retryable error
pub async fn retry_transient<F, Fut, T>(mut f: F, max_attempts: u32) -> AppResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<T>>,
{
    let mut attempts = 0;
    loop {
        match f().await {
            Ok(result) => return Ok(result),
            Err(e) => {
                attempts += 1;
                if !e.is_retryable() {
                    debug!(attempts, error = %e, "Operation failed with non-retryable error");
                    return Err(e);
                }
                if attempts >= max_attempts {
                    error!(
                        attempts,
                        max_attempts,
                        error = %e,
                        "Operation failed after max attempts"
                    );
                    return Err(e);
                }
                let backoff_ms = BASE_BACKOFF_MS << (attempts - 1).min(10);
                warn!(
                    attempt = attempts,
                    max_attempts,
                    backoff_ms,
                    error = %e,
                    "Operation failed with retryable error, retrying after backoff"
                );
                sleep(Duration::from_millis(backoff_ms)).await;
            }
        }
    }
}

/// Transaction bound to one named store operation
///
/// Every multi-record write (substitution, set logging, scheduling, session
/// completion, catalog seeding) runs inside one guard. Dropping it before
/// [`commit`](Self::commit) discards all of the operation's writes.
pub struct TransactionGuard<'c, DB: Database> {
    transaction: Option<Transaction<'c, DB>>,
    operation: &'static str,
}

impl<'c, DB: Database> TransactionGuard<'c, DB> {
    /// Guard `transaction` on behalf of `operation`
    #[must_use]
    pub fn new(transaction: Transaction<'c, DB>, operation: &'static str) -> Self {
        Self {
            transaction: Some(transaction),
            operation,
        }
    }

    /// Name of the store operation owning this transaction
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        self.operation
    }

    /// Make the operation's writes durable
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the guard was already finished, or the
    /// mapped store error if the commit fails
    pub async fn commit(mut self) -> AppResult<()> {
        let tx = self.take("commit")?;
        tx.commit().await?;
        debug!(store.operation = self.operation, "Transaction committed");
        Ok(())
    }

    /// Discard the operation's writes
    ///
    /// # Errors
    ///
    /// Returns `InternalError` if the guard was already finished, or the
    /// mapped store error if the rollback fails
    pub async fn rollback(mut self) -> AppResult<()> {
        let tx = self.take("rollback")?;
        tx.rollback().await?;
        debug!(store.operation = self.operation, "Transaction rolled back");
        Ok(())
    }

    /// Whether the guard still holds an open transaction
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.transaction.is_some()
    }

    /// Connection for statements inside the transaction
    ///
    /// # Errors
    ///
    /// Returns `InternalError` after commit or rollback
    pub fn executor(&mut self) -> AppResult<&mut <DB as Database>::Connection> {
        let operation = self.operation;
        self.transaction
            .as_deref_mut()
            .ok_or_else(|| finished_error(operation, "execute"))
    }

    fn take(&mut self, action: &str) -> AppResult<Transaction<'c, DB>> {
        self.transaction
            .take()
            .ok_or_else(|| finished_error(self.operation, action))
    }
}

fn finished_error(operation: &str, action: &str) -> AppError {
    AppError::internal(format!(
        "Cannot {action}: transaction for {operation} is already finished"
    ))
}

impl<DB: Database> Drop for TransactionGuard<'_, DB> {
    fn drop(&mut self) {
        if self.transaction.is_some() {
            warn!(
                store.operation = self.operation,
                "Transaction dropped before commit, rolling back"
            );
        }
    }
}

/// `SQLite` transaction guard
pub type SqliteTransactionGuard<'c> = TransactionGuard<'c, sqlx::Sqlite>;

#[cfg(test)]
mod tests {
    use super::*;
    use routine_core::models::RoutineId;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_retry_stops_on_deterministic_errors() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transient(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::already_completed(RoutineId(1))) }
            },
            5,
        )
        .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_from_conflict() {
        let calls = AtomicU32::new(0);
        let result = retry_transient(
            || {
                let attempt = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if attempt < 2 {
                        Err(AppError::conflict(RoutineId(1)))
                    } else {
                        Ok(attempt)
                    }
                }
            },
            5,
        )
        .await
        .unwrap();
        assert_eq!(result, 2);
    }

    #[tokio::test]
    async fn test_retry_gives_up_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let result: AppResult<()> = retry_transient(
            || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(AppError::store_unavailable("get_routine")) }
            },
            3,
        )
        .await;
        assert!(result.unwrap_err().is_retryable());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
