// ABOUTME: Routine mutation engines - ownership checks, substitution, skipping and recommendations
// ABOUTME: Every mutation verifies ownership, lifecycle and slot membership before writing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! # Routine Engines
//!
//! - [`OwnershipGuard`] gates every mutation on the user's calendar, the
//!   routine's lifecycle and the slot being present
//! - [`SubstitutionEngine`] swaps the exercise behind a slot without moving it
//! - [`SkipTracker`] flags a slot's detail as skipped
//! - [`ReplacementRecommender`] samples substitutes from the same body part
//!
//! Checks run in a fixed order: ownership (`PermissionDenied`), lifecycle
//! (`AlreadyCompleted`), then slot membership (`SlotNotFound`). A failed check
//! performs no writes.

/// Ownership and slot membership checks
pub mod ownership;
/// Random replacement candidates
pub mod recommender;
/// Skip flag updates
pub mod skip;
/// Exercise substitution
pub mod substitution;

pub use ownership::OwnershipGuard;
pub use recommender::ReplacementRecommender;
pub use skip::SkipTracker;
pub use substitution::SubstitutionEngine;
