// ABOUTME: Routine engine facade bundling the store, checks and engines over one database handle
// ABOUTME: Entry point for a request layer; every user-facing operation takes the acting user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use chrono::NaiveDate;
use routine_core::models::{
    BodyPart, CatalogEntry, CatalogEntryId, DayOfWeek, DetailId, ExerciseDelta, OverviewLine,
    Routine, RoutineId, SessionRecord, SessionTotals, SlotDetails,
};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::database::routines::SetWrite;
use crate::database::{CatalogManager, Database, RoutineStore, SessionStore};
use crate::errors::AppResult;
use crate::intelligence::ProgressAggregator;
use crate::logging::RoutineLogger;
use crate::routines::{OwnershipGuard, ReplacementRecommender, SkipTracker, SubstitutionEngine};

/// Every routine operation behind one handle
#[derive(Clone)]
pub struct RoutineEngine {
    config: EngineConfig,
    database: Database,
    catalog: CatalogManager,
    store: RoutineStore,
    guard: OwnershipGuard,
    substitution: SubstitutionEngine,
    skip: SkipTracker,
    recommender: ReplacementRecommender,
    progress: ProgressAggregator,
}

impl RoutineEngine {
    /// Connect to the configured store and build the engine
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened
    pub async fn connect(config: EngineConfig) -> AppResult<Self> {
        let database = Database::connect(&config.database).await?;
        Ok(Self::new(database, config))
    }

    /// Build the engine over an open store
    #[must_use]
    pub fn new(database: Database, config: EngineConfig) -> Self {
        let catalog = CatalogManager::new(database.clone());
        let store = RoutineStore::new(database.clone());
        let sessions = SessionStore::new(database.clone());
        let guard = OwnershipGuard::new(store.clone());

        Self {
            substitution: SubstitutionEngine::new(store.clone(), guard.clone()),
            skip: SkipTracker::new(store.clone(), guard.clone()),
            recommender: ReplacementRecommender::new(catalog.clone()),
            progress: ProgressAggregator::new(
                store.clone(),
                sessions,
                guard.clone(),
                config.calories,
            ),
            config,
            database,
            catalog,
            store,
            guard,
        }
    }

    /// Store handle
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.database
    }

    /// Active configuration
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Catalog access
    #[must_use]
    pub const fn catalog(&self) -> &CatalogManager {
        &self.catalog
    }

    /// Routine store
    #[must_use]
    pub const fn store(&self) -> &RoutineStore {
        &self.store
    }

    /// Ownership checks
    #[must_use]
    pub const fn ownership(&self) -> &OwnershipGuard {
        &self.guard
    }

    /// Load the default exercise catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn seed_default_catalog(&self) -> AppResult<usize> {
        self.catalog.seed_default_catalog().await
    }

    /// Schedule a routine for `day` with one slot per catalog entry
    ///
    /// # Errors
    ///
    /// See [`RoutineStore::schedule_routine`]
    pub async fn schedule_routine(
        &self,
        user_id: Uuid,
        day: DayOfWeek,
        catalog_entry_ids: &[CatalogEntryId],
    ) -> AppResult<RoutineId> {
        let routine_id = self
            .store
            .schedule_routine(user_id, day, catalog_entry_ids)
            .await?;
        RoutineLogger::log_scheduled(user_id, routine_id, day.as_str(), catalog_entry_ids.len());
        Ok(routine_id)
    }

    /// Routine on the user's calendar for `day`
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn routine_for_day(
        &self,
        user_id: Uuid,
        day: DayOfWeek,
    ) -> AppResult<Option<RoutineId>> {
        self.store.routine_for_day(user_id, day).await
    }

    /// Load a routine the user owns
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine
    pub async fn get_routine(&self, user_id: Uuid, routine_id: RoutineId) -> AppResult<Routine> {
        self.guard.require_owner(user_id, routine_id).await
    }

    /// Load every slot's detail of a routine the user owns
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine, or a store error
    pub async fn get_slot_details(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<SlotDetails> {
        let routine = self.guard.require_owner(user_id, routine_id).await?;
        self.store.get_slot_details(&routine).await
    }

    /// Swap the exercise behind a slot
    ///
    /// # Errors
    ///
    /// See [`SubstitutionEngine::substitute`]
    pub async fn substitute(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        old_detail_id: DetailId,
        new_catalog_entry_id: CatalogEntryId,
    ) -> AppResult<()> {
        self.substitution
            .substitute(user_id, routine_id, old_detail_id, new_catalog_entry_id)
            .await
    }

    /// Flag a slot's exercise as skipped
    ///
    /// # Errors
    ///
    /// See [`SkipTracker::mark_skipped`]
    pub async fn mark_skipped(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        detail_id: DetailId,
    ) -> AppResult<()> {
        self.skip.mark_skipped(user_id, routine_id, detail_id).await
    }

    /// Log a set for a slot's exercise
    ///
    /// # Errors
    ///
    /// Returns the pre-mutation check failures, then those of
    /// [`RoutineStore::record_set`]
    pub async fn record_set(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        detail_id: DetailId,
        set_index: usize,
        repetitions: u32,
        weight: Option<f64>,
    ) -> AppResult<SetWrite> {
        self.guard
            .require_mutable(user_id, routine_id, Some(detail_id))
            .await?;
        let write = self
            .store
            .record_set(routine_id, detail_id, set_index, repetitions, weight)
            .await?;
        RoutineLogger::log_set_recorded(detail_id, set_index, repetitions);
        Ok(write)
    }

    /// Substitutes for an exercise; `limit` defaults to the configured count
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn recommend(
        &self,
        current: CatalogEntryId,
        body_part: BodyPart,
        limit: Option<usize>,
    ) -> AppResult<Vec<CatalogEntry>> {
        self.recommender
            .recommend(
                current,
                body_part,
                limit.unwrap_or(self.config.recommendation_limit),
            )
            .await
    }

    /// Substitutes for a catalog entry, using its own body part
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the entry does not exist
    pub async fn recommend_for_entry(
        &self,
        entry_id: CatalogEntryId,
        limit: Option<usize>,
    ) -> AppResult<Vec<CatalogEntry>> {
        self.recommender
            .recommend_for_entry(entry_id, limit.unwrap_or(self.config.recommendation_limit))
            .await
    }

    /// Totals of a routine the user owns
    ///
    /// # Errors
    ///
    /// Returns `PermissionDenied` if the user does not own the routine
    pub async fn session_totals(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        elapsed_seconds: u64,
    ) -> AppResult<SessionTotals> {
        self.guard.require_owner(user_id, routine_id).await?;
        self.progress
            .session_totals(routine_id, elapsed_seconds)
            .await
    }

    /// Finish a routine, storing its session and archiving it
    ///
    /// # Errors
    ///
    /// See [`ProgressAggregator::complete_session`]
    pub async fn complete_session(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
        elapsed_seconds: u64,
    ) -> AppResult<SessionRecord> {
        self.progress
            .complete_session(user_id, routine_id, elapsed_seconds)
            .await
    }

    /// Compare a routine's latest session with the one before it
    ///
    /// # Errors
    ///
    /// See [`ProgressAggregator::compare_to_previous`]
    pub async fn compare_to_previous(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<Vec<ExerciseDelta>> {
        self.progress.compare_to_previous(user_id, routine_id).await
    }

    /// Pre-session summary of a routine
    ///
    /// # Errors
    ///
    /// See [`ProgressAggregator::routine_overview`]
    pub async fn routine_overview(
        &self,
        user_id: Uuid,
        routine_id: RoutineId,
    ) -> AppResult<Vec<OverviewLine>> {
        self.progress.routine_overview(user_id, routine_id).await
    }

    /// Number of completed sessions
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn session_count(&self, user_id: Uuid) -> AppResult<i64> {
        self.progress.session_count(user_id).await
    }

    /// Sessions completed on a date
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn sessions_on(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> AppResult<Vec<SessionRecord>> {
        self.progress.sessions_on(user_id, date).await
    }
}
