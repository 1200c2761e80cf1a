// ABOUTME: Exercise substitution inside a routine slot
// ABOUTME: Replaces every slot holding a detail with a fresh detail for another catalog entry
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use routine_core::models::{CatalogEntryId, DetailId, RoutineId};
use uuid::Uuid;

use super::OwnershipGuard;
use crate::database::RoutineStore;
use crate::errors::AppResult;
use crate::logging::RoutineLogger;

/// Swaps the exercise behind a slot while keeping the slot's position
#[derive(Clone)]
pub struct SubstitutionEngine {
    store: RoutineStore,
    guard: OwnershipGuard,
}

impl SubstitutionEngine {
    /// Create a new substitution engine
    #[must_use]
    pub const fn new(store: RoutineStore, guard: OwnershipGuard) -> Self {
        Self { store, guard }
    }

    /// Replace `old_detail_id` in `routine_id` with a new detail for `new_catalog_entry_id`
    ///
    /// Every position referencing `old_detail_id` moves to the same new detail,
    /// which starts with no sets. The routine version read during the checks
    /// is the one the write must match, so a concurrent change in between
    /// fails with `Conflict` rather than being overwritten.
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied`, `AlreadyCompleted` or `SlotNotFound` from
    /// the pre-mutation checks, `ResourceNotFound` for an unknown catalog
    /// entry, or `Conflict` if the routine changed concurrently
    pub async fn substitute(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        old_detail_id: DetailId,
        new_catalog_entry_id: CatalogEntryId,
    ) -> AppResult<()> {
        let routine = self
            .guard
            .require_mutable(user_id, routine_id, Some(old_detail_id))
            .await?;

        let outcome = self
            .store
            .substitute_detail(
                routine_id,
                routine.version,
                old_detail_id,
                new_catalog_entry_id,
            )
            .await
            .map_err(|e| e.with_user_id(user_id))?;

        RoutineLogger::log_substitution(
            user_id,
            routine_id,
            old_detail_id,
            outcome.new_detail_id,
            new_catalog_entry_id,
            &outcome.positions,
        );
        Ok(())
    }
}
