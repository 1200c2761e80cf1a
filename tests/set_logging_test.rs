// ABOUTME: Integration tests for logging sets and skipping exercises
// ABOUTME: Covers contiguity, set capacity, bodyweight rules, skip idempotence and archived rejection
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{create_test_engine, reload, schedule, BENCH_PRESS, PUSH_UP};
use routine_engine::database::routines::SetWrite;
use routine_engine::errors::ErrorCode;
use routine_engine::models::{DayOfWeek, DetailId, PerformedSet, RoutineId};
use uuid::Uuid;

// ============================================================================
// Recording Sets
// ============================================================================

#[tokio::test]
async fn test_sets_append_then_overwrite() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Mon, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();

    let first = engine
        .record_set(user, routine.id, detail, 0, 10, Some(50.0))
        .await
        .unwrap();
    let second = engine
        .record_set(user, routine.id, detail, 1, 8, Some(55.0))
        .await
        .unwrap();
    let rewrite = engine
        .record_set(user, routine.id, detail, 0, 12, Some(50.0))
        .await
        .unwrap();
    assert_eq!(first, SetWrite::Appended);
    assert_eq!(second, SetWrite::Appended);
    assert_eq!(rewrite, SetWrite::Overwritten);

    let stored = engine.store().get_detail(detail).await.unwrap();
    assert_eq!(
        &*stored.sets,
        &[
            PerformedSet::new(12, Some(50.0)),
            PerformedSet::new(8, Some(55.0))
        ]
    );
}

#[tokio::test]
async fn test_set_past_the_end_is_a_gap() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Tue, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();
    engine
        .record_set(user, routine.id, detail, 0, 10, Some(40.0))
        .await
        .unwrap();

    let error = engine
        .record_set(user, routine.id, detail, 2, 10, Some(40.0))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::GapViolation);

    let stored = engine.store().get_detail(detail).await.unwrap();
    assert_eq!(stored.sets.len(), 1);
}

#[tokio::test]
async fn test_eleventh_set_exceeds_capacity() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Wed, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();
    for index in 0..10 {
        engine
            .record_set(user, routine.id, detail, index, 5, Some(30.0))
            .await
            .unwrap();
    }

    let error = engine
        .record_set(user, routine.id, detail, 10, 5, Some(30.0))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::CapacityExceeded);
    assert_eq!(engine.store().get_detail(detail).await.unwrap().sets.len(), 10);
}

#[tokio::test]
async fn test_bodyweight_exercise_rejects_weight() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Thu, &[PUSH_UP]).await;
    let detail = routine.detail_at(0).unwrap();

    let error = engine
        .record_set(user, routine.id, detail, 0, 15, Some(10.0))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);

    engine
        .record_set(user, routine.id, detail, 0, 15, None)
        .await
        .unwrap();
    let stored = engine.store().get_detail(detail).await.unwrap();
    assert_eq!(&*stored.sets, &[PerformedSet::new(15, None)]);
}

#[tokio::test]
async fn test_invalid_repetitions_and_weight_are_rejected() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Fri, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();

    let zero_reps = engine
        .record_set(user, routine.id, detail, 0, 0, Some(20.0))
        .await
        .unwrap_err();
    assert_eq!(zero_reps.code, ErrorCode::InvalidInput);

    let negative = engine
        .record_set(user, routine.id, detail, 0, 5, Some(-1.0))
        .await
        .unwrap_err();
    assert_eq!(negative.code, ErrorCode::InvalidInput);

    assert!(engine.store().get_detail(detail).await.unwrap().sets.is_empty());
}

#[tokio::test]
async fn test_record_set_checks_ownership_and_membership() {
    let engine = create_test_engine().await;
    let owner = Uuid::new_v4();
    let routine = schedule(&engine, owner, DayOfWeek::Sat, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();

    let denied = engine
        .record_set(Uuid::new_v4(), routine.id, detail, 0, 10, Some(50.0))
        .await
        .unwrap_err();
    assert_eq!(denied.code, ErrorCode::PermissionDenied);

    let missing = engine
        .record_set(owner, routine.id, DetailId(9_999), 0, 10, Some(50.0))
        .await
        .unwrap_err();
    assert_eq!(missing.code, ErrorCode::SlotNotFound);
}

// ============================================================================
// Skipping
// ============================================================================

#[tokio::test]
async fn test_mark_skipped_is_idempotent_and_keeps_sets() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Sun, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();
    engine
        .record_set(user, routine.id, detail, 0, 10, Some(50.0))
        .await
        .unwrap();

    engine.mark_skipped(user, routine.id, detail).await.unwrap();
    let once = engine.store().get_detail(detail).await.unwrap();
    engine.mark_skipped(user, routine.id, detail).await.unwrap();
    let twice = engine.store().get_detail(detail).await.unwrap();

    assert!(once.skipped);
    assert_eq!(once, twice);
    assert_eq!(twice.sets.len(), 1);
}

#[tokio::test]
async fn test_mark_skipped_rejects_foreign_detail() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let monday = schedule(&engine, user, DayOfWeek::Mon, &[BENCH_PRESS]).await;
    let tuesday = schedule(&engine, user, DayOfWeek::Tue, &[BENCH_PRESS]).await;
    let foreign = tuesday.detail_at(0).unwrap();

    let error = engine
        .mark_skipped(user, monday.id, foreign)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::SlotNotFound);
    assert!(!engine.store().get_detail(foreign).await.unwrap().skipped);
}

#[tokio::test]
async fn test_set_skipped_requires_the_routine_to_hold_the_detail() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Mon, &[BENCH_PRESS]).await;

    let error = engine
        .store()
        .set_skipped(routine.id, DetailId(777))
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::SlotNotFound);

    let error = engine
        .store()
        .set_skipped(RoutineId(4_040), routine.detail_at(0).unwrap())
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);
}

// ============================================================================
// Writes Racing Completion
// ============================================================================

#[tokio::test]
async fn test_set_and_skip_writes_bump_routine_version() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Tue, &[BENCH_PRESS, PUSH_UP]).await;

    engine
        .record_set(user, routine.id, routine.detail_at(0).unwrap(), 0, 10, Some(50.0))
        .await
        .unwrap();
    assert_eq!(reload(&engine, routine.id).await.version, routine.version + 1);

    let skipped = routine.detail_at(1).unwrap();
    assert!(engine.store().set_skipped(routine.id, skipped).await.unwrap());
    assert_eq!(reload(&engine, routine.id).await.version, routine.version + 2);

    assert!(!engine.store().set_skipped(routine.id, skipped).await.unwrap());
    assert_eq!(reload(&engine, routine.id).await.version, routine.version + 2);
}

#[tokio::test]
async fn test_store_writes_after_completion_are_rejected() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Wed, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();
    engine
        .record_set(user, routine.id, detail, 0, 10, Some(50.0))
        .await
        .unwrap();
    engine.complete_session(user, routine.id, 600).await.unwrap();
    let archived = engine.store().get_detail(detail).await.unwrap();

    // Writers whose checks ran before the archive reach the store afterwards
    let late_set = engine
        .store()
        .record_set(routine.id, detail, 1, 10, Some(50.0))
        .await
        .unwrap_err();
    assert_eq!(late_set.code, ErrorCode::AlreadyCompleted);

    let late_skip = engine
        .store()
        .set_skipped(routine.id, detail)
        .await
        .unwrap_err();
    assert_eq!(late_skip.code, ErrorCode::AlreadyCompleted);

    assert_eq!(engine.store().get_detail(detail).await.unwrap(), archived);
}
