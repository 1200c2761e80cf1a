// ABOUTME: Marks a routine slot's exercise as skipped for the current session
// ABOUTME: Leaves the catalog reference and logged sets untouched; repeated marks are no-ops
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use routine_core::models::{DetailId, RoutineId};
use uuid::Uuid;

use super::OwnershipGuard;
use crate::database::RoutineStore;
use crate::errors::AppResult;
use crate::logging::RoutineLogger;

/// Sets skip flags on routine details
#[derive(Clone)]
pub struct SkipTracker {
    store: RoutineStore,
    guard: OwnershipGuard,
}

impl SkipTracker {
    /// Create a new skip tracker
    #[must_use]
    pub const fn new(store: RoutineStore, guard: OwnershipGuard) -> Self {
        Self { store, guard }
    }

    /// Flag `detail_id` as skipped
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied`, `AlreadyCompleted` or `SlotNotFound` from
    /// the pre-mutation checks, or a store error
    pub async fn mark_skipped(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        detail_id: DetailId,
    ) -> AppResult<()> {
        self.guard
            .require_mutable(user_id, routine_id, Some(detail_id))
            .await?;
        let changed = self.store.set_skipped(routine_id, detail_id).await?;
        RoutineLogger::log_skip(user_id, routine_id, detail_id, changed);
        Ok(())
    }
}
