// ABOUTME: Unified error handling for the routine engine with structured codes and context
// ABOUTME: Maps the routine taxonomy (not found, unauthorized, structural, conflict) onto AppError
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Unified Error Handling System
//!
//! Every failure surfaced by the engine is an [`AppError`] carrying an [`ErrorCode`]
//! and enough identifiers (user, routine, detail, slot position) for a caller to
//! render a user-facing message. Structural and authorization failures are
//! deterministic; only [`ErrorCode::Conflict`] and [`ErrorCode::StoreUnavailable`]
//! are eligible for caller-directed retry.

#[cfg(feature = "database-errors")]
mod database;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{CatalogEntryId, DetailId, RoutineId};

/// Standard error codes used throughout the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCode {
    // Authorization (1000-1999)
    /// The acting user does not own the routine
    #[serde(rename = "PERMISSION_DENIED")]
    PermissionDenied = 1004,

    // Validation (3000-3999)
    /// Input rejected before reaching the store
    #[serde(rename = "INVALID_INPUT")]
    InvalidInput = 3000,
    /// Slot position outside the routine's capacity
    #[serde(rename = "INVALID_POSITION")]
    InvalidPosition = 3100,
    /// A bounded collection would exceed its capacity
    #[serde(rename = "CAPACITY_EXCEEDED")]
    CapacityExceeded = 3101,
    /// A set would be logged past the end of the contiguous sequence
    #[serde(rename = "GAP_VIOLATION")]
    GapViolation = 3102,

    // Resource Management (4000-4999)
    /// Routine, detail, catalog entry or session is absent
    #[serde(rename = "RESOURCE_NOT_FOUND")]
    ResourceNotFound = 4000,
    /// The detail is not currently referenced by the routine
    #[serde(rename = "SLOT_NOT_FOUND")]
    SlotNotFound = 4001,
    /// The routine has been archived by a completed session
    #[serde(rename = "ALREADY_COMPLETED")]
    AlreadyCompleted = 4002,
    /// A concurrent update won the race for the same routine
    #[serde(rename = "CONFLICT")]
    Conflict = 4003,
    /// The store timed out or could not be reached
    #[serde(rename = "STORE_UNAVAILABLE")]
    StoreUnavailable = 4004,

    // Configuration (6000-6999)
    /// Configuration value is present but invalid
    #[serde(rename = "CONFIG_INVALID")]
    ConfigInvalid = 6002,

    // Internal Errors (9000-9999)
    /// Unexpected internal state
    #[serde(rename = "INTERNAL_ERROR")]
    InternalError = 9000,
    /// The store rejected a statement for a non-transient reason
    #[serde(rename = "DATABASE_ERROR")]
    DatabaseError = 9001,
    /// A persisted value could not be encoded or decoded
    #[serde(rename = "SERIALIZATION_ERROR")]
    SerializationError = 9003,
}

impl ErrorCode {
    /// Get the HTTP status code a request layer should use for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::InvalidInput | Self::InvalidPosition | Self::CapacityExceeded | Self::GapViolation => {
                400
            }
            Self::PermissionDenied => 403,
            Self::ResourceNotFound | Self::SlotNotFound => 404,
            Self::AlreadyCompleted | Self::Conflict => 409,
            Self::StoreUnavailable => 503,
            Self::InternalError
            | Self::DatabaseError
            | Self::SerializationError
            | Self::ConfigInvalid => 500,
        }
    }

    /// Get a user-friendly description of this error
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::PermissionDenied => "You do not have permission to modify this routine",
            Self::InvalidInput => "The provided input is invalid",
            Self::InvalidPosition => "The slot position is outside the routine",
            Self::CapacityExceeded => "The collection is already at capacity",
            Self::GapViolation => "Sets must be logged in order without gaps",
            Self::ResourceNotFound => "The requested resource was not found",
            Self::SlotNotFound => "The exercise is not part of this routine",
            Self::AlreadyCompleted => "The routine has already been completed",
            Self::Conflict => "The routine was modified concurrently",
            Self::StoreUnavailable => "The data store is temporarily unavailable",
            Self::ConfigInvalid => "Configuration is invalid",
            Self::InternalError => "An internal error occurred",
            Self::DatabaseError => "Database operation failed",
            Self::SerializationError => "Data serialization/deserialization failed",
        }
    }

    /// Whether a caller may retry the failed operation unchanged
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict | Self::StoreUnavailable)
    }
}

/// Identifiers attached to an error so callers can render a precise message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Acting user, when known
    pub user_id: Option<Uuid>,
    /// Routine involved in the failure
    pub routine_id: Option<RoutineId>,
    /// Routine detail involved in the failure
    pub detail_id: Option<DetailId>,
    /// Slot or set position involved in the failure
    pub position: Option<usize>,
    /// Additional key-value context
    pub details: serde_json::Value,
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self {
            user_id: None,
            routine_id: None,
            detail_id: None,
            position: None,
            details: serde_json::Value::Null,
        }
    }
}

/// Unified error type for the engine
#[derive(Debug, Error)]
pub struct AppError {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Identifiers and details
    pub context: ErrorContext,
    /// Source error for error chaining
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new `AppError` with the given code and message
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            context: ErrorContext::default(),
            source: None,
        }
    }

    /// Attach the acting user
    #[must_use]
    pub fn with_user_id(mut self, user_id: Uuid) -> Self {
        self.context.user_id = Some(user_id);
        self
    }

    /// Attach the routine identifier
    #[must_use]
    pub fn with_routine_id(mut self, routine_id: RoutineId) -> Self {
        self.context.routine_id = Some(routine_id);
        self
    }

    /// Attach the detail identifier
    #[must_use]
    pub fn with_detail_id(mut self, detail_id: DetailId) -> Self {
        self.context.detail_id = Some(detail_id);
        self
    }

    /// Attach a slot or set position
    #[must_use]
    pub fn with_position(mut self, position: usize) -> Self {
        self.context.position = Some(position);
        self
    }

    /// Add details to the error context
    #[must_use]
    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.context.details = details;
        self
    }

    /// Add a source error for error chaining
    #[must_use]
    pub fn with_source(mut self, source: impl std::error::Error + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the HTTP status code for this error
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        self.code.http_status()
    }

    /// Whether a caller may retry the failed operation unchanged
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        self.code.is_retryable()
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.description(), self.message)
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Error body the request layer can serialize as-is
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error payload
    pub error: ErrorResponseDetails,
}

/// Error payload inside an [`ErrorResponse`]
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponseDetails {
    /// Machine-readable code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Identifiers attached to the failure
    pub context: ErrorContext,
}

impl From<AppError> for ErrorResponse {
    fn from(error: AppError) -> Self {
        Self {
            error: ErrorResponseDetails {
                code: error.code,
                message: error.message,
                context: error.context,
            },
        }
    }
}

/// Constructors for the routine error taxonomy
impl AppError {
    /// Resource not found
    #[must_use]
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::ResourceNotFound,
            format!("{} not found", resource.into()),
        )
    }

    /// Routine does not exist
    #[must_use]
    pub fn routine_not_found(routine_id: RoutineId) -> Self {
        Self::not_found(format!("Routine {routine_id}")).with_routine_id(routine_id)
    }

    /// Routine detail does not exist
    #[must_use]
    pub fn detail_not_found(detail_id: DetailId) -> Self {
        Self::not_found(format!("Routine detail {detail_id}")).with_detail_id(detail_id)
    }

    /// Catalog entry does not exist
    #[must_use]
    pub fn catalog_entry_not_found(entry_id: CatalogEntryId) -> Self {
        Self::not_found(format!("Catalog entry {entry_id}"))
            .with_details(serde_json::json!({ "catalog_entry_id": entry_id }))
    }

    /// The acting user does not own the routine
    #[must_use]
    pub fn unauthorized(user_id: Uuid, routine_id: RoutineId) -> Self {
        Self::new(
            ErrorCode::PermissionDenied,
            format!("Routine {routine_id} is not on this user's schedule"),
        )
        .with_user_id(user_id)
        .with_routine_id(routine_id)
    }

    /// The detail is not referenced by any slot of the routine
    #[must_use]
    pub fn slot_not_found(routine_id: RoutineId, detail_id: DetailId) -> Self {
        Self::new(
            ErrorCode::SlotNotFound,
            format!("Routine detail {detail_id} is not in routine {routine_id}"),
        )
        .with_routine_id(routine_id)
        .with_detail_id(detail_id)
    }

    /// Slot position outside `[0, capacity)`
    #[must_use]
    pub fn invalid_position(position: usize, capacity: usize) -> Self {
        Self::new(
            ErrorCode::InvalidPosition,
            format!("Position {position} is outside 0..{capacity}"),
        )
        .with_position(position)
    }

    /// A bounded collection would exceed its capacity
    #[must_use]
    pub fn capacity_exceeded(what: &str, requested: usize, capacity: usize) -> Self {
        Self::new(
            ErrorCode::CapacityExceeded,
            format!("{what} holds at most {capacity} entries, {requested} requested"),
        )
        .with_details(serde_json::json!({ "requested": requested, "capacity": capacity }))
    }

    /// A set index skips past the current end of the sequence
    #[must_use]
    pub fn gap_violation(detail_id: DetailId, set_index: usize, set_count: usize) -> Self {
        Self::new(
            ErrorCode::GapViolation,
            format!("Set {set_index} cannot be logged while only {set_count} sets exist"),
        )
        .with_detail_id(detail_id)
        .with_position(set_index)
    }

    /// Mutation attempted on an archived routine
    #[must_use]
    pub fn already_completed(routine_id: RoutineId) -> Self {
        Self::new(
            ErrorCode::AlreadyCompleted,
            format!("Routine {routine_id} is archived"),
        )
        .with_routine_id(routine_id)
    }

    /// A concurrent writer updated the routine first
    #[must_use]
    pub fn conflict(routine_id: RoutineId) -> Self {
        Self::new(
            ErrorCode::Conflict,
            format!("Routine {routine_id} was updated concurrently"),
        )
        .with_routine_id(routine_id)
    }

    /// Store timed out or is unreachable
    #[must_use]
    pub fn store_unavailable(operation: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::StoreUnavailable,
            format!("Store unavailable during {}", operation.into()),
        )
    }

    /// Invalid input
    #[must_use]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    /// Invalid configuration value
    #[must_use]
    pub fn config_invalid(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ConfigInvalid, message)
    }

    /// Internal error
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    /// Database error
    #[must_use]
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::DatabaseError, message)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(error: serde_json::Error) -> Self {
        Self::new(ErrorCode::SerializationError, error.to_string()).with_source(error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_http_status() {
        assert_eq!(ErrorCode::PermissionDenied.http_status(), 403);
        assert_eq!(ErrorCode::SlotNotFound.http_status(), 404);
        assert_eq!(ErrorCode::GapViolation.http_status(), 400);
        assert_eq!(ErrorCode::Conflict.http_status(), 409);
        assert_eq!(ErrorCode::StoreUnavailable.http_status(), 503);
    }

    #[test]
    fn test_only_conflict_and_store_unavailable_are_retryable() {
        assert!(AppError::conflict(RoutineId(1)).is_retryable());
        assert!(AppError::store_unavailable("get_routine").is_retryable());
        assert!(!AppError::unauthorized(Uuid::new_v4(), RoutineId(1)).is_retryable());
        assert!(!AppError::gap_violation(DetailId(3), 2, 1).is_retryable());
        assert!(!AppError::routine_not_found(RoutineId(9)).is_retryable());
    }

    #[test]
    fn test_taxonomy_errors_carry_identifiers() {
        let error = AppError::slot_not_found(RoutineId(4), DetailId(17));
        assert_eq!(error.code, ErrorCode::SlotNotFound);
        assert_eq!(error.context.routine_id, Some(RoutineId(4)));
        assert_eq!(error.context.detail_id, Some(DetailId(17)));

        let error = AppError::gap_violation(DetailId(5), 2, 1);
        assert_eq!(error.context.position, Some(2));
    }

    #[test]
    fn test_error_response_serialization() {
        let response = ErrorResponse::from(AppError::already_completed(RoutineId(8)));
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("ALREADY_COMPLETED"));
        assert!(json.contains("\"routine_id\":8"));
    }
}
