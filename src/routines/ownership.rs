// ABOUTME: Ownership and slot membership checks run before any routine mutation
// ABOUTME: A routine belongs to a user when any day of the user's calendar points at it
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use routine_core::models::{DetailId, Routine, RoutineId};
use tracing::debug;
use uuid::Uuid;

use crate::database::RoutineStore;
use crate::errors::{AppError, AppResult};

/// Verifies that the acting user may touch a routine and its slots
#[derive(Clone)]
pub struct OwnershipGuard {
    store: RoutineStore,
}

impl OwnershipGuard {
    /// Create a new ownership guard
    #[must_use]
    pub const fn new(store: RoutineStore) -> Self {
        Self { store }
    }

    /// Whether `routine_id` is reachable from any day of `user_id`'s calendar
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn verify_routine_ownership(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<bool> {
        self.store.is_on_calendar(user_id, routine_id).await
    }

    /// Whether some slot of `routine_id` currently references `detail_id`
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the routine does not exist, or a store error
    pub async fn verify_slot_belongs_to_routine(
        &self,
        routine_id: RoutineId,
        detail_id: DetailId,
    ) -> AppResult<bool> {
        let routine = self.store.get_routine(routine_id).await?;
        Ok(routine.references(detail_id))
    }

    /// Run every pre-mutation check and return the routine as read
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine,
    /// `AlreadyCompleted` if it is archived, or `SlotNotFound` if `detail_id`
    /// is given and no slot references it
    pub async fn require_mutable(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        detail_id: Option<DetailId>,
    ) -> AppResult<Routine> {
        if !self.verify_routine_ownership(user_id, routine_id).await? {
            debug!(user.id = %user_id, routine.id = %routine_id, "Ownership check failed");
            return Err(AppError::unauthorized(user_id, routine_id));
        }

        let routine = self.store.get_routine(routine_id).await?;
        if routine.is_archived() {
            return Err(AppError::already_completed(routine_id).with_user_id(user_id));
        }
        if let Some(detail_id) = detail_id {
            if !routine.references(detail_id) {
                return Err(AppError::slot_not_found(routine_id, detail_id).with_user_id(user_id));
            }
        }
        Ok(routine)
    }

    /// Ownership check alone, for reads
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine
    pub async fn require_owner(&self, user_id: Uuid, routine_id: RoutineId) -> AppResult<Routine> {
        if !self.verify_routine_ownership(user_id, routine_id).await? {
            return Err(AppError::unauthorized(user_id, routine_id));
        }
        self.store.get_routine(routine_id).await
    }
}
