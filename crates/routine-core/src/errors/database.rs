// ABOUTME: Conversion from sqlx errors into the engine's error taxonomy
// ABOUTME: Separates transient store failures (timeouts, busy locks) from permanent ones
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use super::{AppError, ErrorCode};

// SQLITE_BUSY, SQLITE_LOCKED and their extended forms
const SQLITE_CONTENTION_CODES: &[&str] = &["5", "6", "261", "262", "517"];

impl From<sqlx::Error> for AppError {
    fn from(error: sqlx::Error) -> Self {
        let code = match &error {
            sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
                ErrorCode::StoreUnavailable
            }
            sqlx::Error::RowNotFound => ErrorCode::ResourceNotFound,
            sqlx::Error::Database(db_error) if is_contention(db_error.as_ref()) => {
                ErrorCode::Conflict
            }
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                ErrorCode::SerializationError
            }
            _ => ErrorCode::DatabaseError,
        };
        Self::new(code, error.to_string()).with_source(error)
    }
}

fn is_contention(db_error: &dyn sqlx::error::DatabaseError) -> bool {
    if db_error
        .code()
        .is_some_and(|code| SQLITE_CONTENTION_CODES.contains(&code.as_ref()))
    {
        return true;
    }
    let message = db_error.message().to_lowercase();
    message.contains("database is locked") || message.contains("database table is locked")
}
