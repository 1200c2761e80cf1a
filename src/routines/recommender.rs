// ABOUTME: Replacement candidates for an exercise, drawn from the same body part
// ABOUTME: Uniform sampling without replacement, excluding the exercise being replaced
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use routine_core::models::{BodyPart, CatalogEntry, CatalogEntryId};

use crate::database::CatalogManager;
use crate::errors::AppResult;

/// Suggests substitutes for an exercise
#[derive(Clone)]
pub struct ReplacementRecommender {
    catalog: CatalogManager,
}

impl ReplacementRecommender {
    /// Create a new recommender
    #[must_use]
    pub const fn new(catalog: CatalogManager) -> Self {
        Self { catalog }
    }

    /// Up to `limit` random entries in `body_part`, never `current`
    ///
    /// An empty result means no other exercise shares the body part.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn recommend(
        &self,
        current: CatalogEntryId,
        body_part: BodyPart,
        limit: usize,
    ) -> AppResult<Vec<CatalogEntry>> {
        let candidates = self.catalog.replacement_candidates(body_part, current).await?;
        Ok(sample_candidates(&candidates, limit, &mut rand::thread_rng()))
    }

    /// Same as [`Self::recommend`] with a reproducible draw
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn recommend_seeded(
        &self,
        current: CatalogEntryId,
        body_part: BodyPart,
        limit: usize,
        seed: u64,
    ) -> AppResult<Vec<CatalogEntry>> {
        let candidates = self.catalog.replacement_candidates(body_part, current).await?;
        Ok(sample_candidates(
            &candidates,
            limit,
            &mut StdRng::seed_from_u64(seed),
        ))
    }

    /// Substitutes for `entry_id`, using its own body part
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the entry does not exist, or a store error
    pub async fn recommend_for_entry(
        &self,
        entry_id: CatalogEntryId,
        limit: usize,
    ) -> AppResult<Vec<CatalogEntry>> {
        let entry = self.catalog.get_entry(entry_id).await?;
        self.recommend(entry.id, entry.body_part, limit).await
    }
}

/// Draw up to `limit` distinct candidates uniformly at random
#[must_use]
pub fn sample_candidates<R: Rng + ?Sized>(
    candidates: &[CatalogEntry],
    limit: usize,
    rng: &mut R,
) -> Vec<CatalogEntry> {
    candidates.choose_multiple(rng, limit).cloned().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use routine_core::models::MeasurementUnit;
    use std::collections::HashSet;

    fn entries(count: i64) -> Vec<CatalogEntry> {
        (1..=count)
            .map(|id| CatalogEntry {
                id: CatalogEntryId(id),
                name: format!("Chest exercise {id}"),
                body_part: BodyPart::Chest,
                unit: MeasurementUnit::Repetitions,
                bodyweight: false,
            })
            .collect()
    }

    #[test]
    fn test_sample_is_distinct_and_bounded() {
        let pool = entries(6);
        let mut rng = StdRng::seed_from_u64(7);
        for limit in 0..=8 {
            let picked = sample_candidates(&pool, limit, &mut rng);
            assert_eq!(picked.len(), limit.min(pool.len()));
            let ids: HashSet<_> = picked.iter().map(|e| e.id).collect();
            assert_eq!(ids.len(), picked.len());
        }
    }

    #[test]
    fn test_empty_pool_yields_empty_sample() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(sample_candidates(&[], 3, &mut rng).is_empty());
    }

    #[test]
    fn test_every_candidate_can_be_drawn() {
        let pool = entries(4);
        let mut rng = StdRng::seed_from_u64(42);
        let mut seen = HashSet::new();
        for _ in 0..200 {
            for entry in sample_candidates(&pool, 1, &mut rng) {
                seen.insert(entry.id);
            }
        }
        assert_eq!(seen.len(), pool.len());
    }
}
