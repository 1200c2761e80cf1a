// ABOUTME: Integration tests for scheduling routines, calendar ownership and slot detail loading
// ABOUTME: Includes partial-result reads over dangling and corrupt routine details
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

#![allow(missing_docs, clippy::unwrap_used, clippy::expect_used)]

mod common;

use common::{
    create_test_engine, reload, schedule, BENCH_PRESS, LAT_PULL_DOWN, LEG_EXTENSION, PUSH_UP,
};
use routine_engine::errors::ErrorCode;
use routine_engine::models::{CatalogEntryId, DayOfWeek, RoutineStatus};
use uuid::Uuid;

// ============================================================================
// Scheduling
// ============================================================================

#[tokio::test]
async fn test_schedule_creates_one_empty_detail_per_exercise() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(
        &engine,
        user,
        DayOfWeek::Mon,
        &[BENCH_PRESS, LEG_EXTENSION, PUSH_UP],
    )
    .await;

    assert_eq!(routine.user_id, user);
    assert_eq!(routine.status, RoutineStatus::Active);
    assert_eq!(routine.day_of_week, DayOfWeek::Mon);
    let positions: Vec<usize> = routine.slots.iter().map(|s| s.position).collect();
    assert_eq!(positions, vec![0, 1, 2]);

    let details = engine.get_slot_details(user, routine.id).await.unwrap();
    assert!(details.is_complete());
    let entries: Vec<CatalogEntryId> = details
        .details
        .iter()
        .map(|p| p.detail.catalog_entry_id)
        .collect();
    assert_eq!(entries, vec![BENCH_PRESS, LEG_EXTENSION, PUSH_UP]);
    assert!(details.details.iter().all(|p| p.detail.sets.is_empty()));

    assert_eq!(
        engine.routine_for_day(user, DayOfWeek::Mon).await.unwrap(),
        Some(routine.id)
    );
    assert_eq!(engine.routine_for_day(user, DayOfWeek::Tue).await.unwrap(), None);
}

#[tokio::test]
async fn test_rescheduling_a_day_archives_the_previous_routine() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let first = schedule(&engine, user, DayOfWeek::Tue, &[BENCH_PRESS]).await;
    let second = schedule(&engine, user, DayOfWeek::Tue, &[LAT_PULL_DOWN]).await;

    assert_ne!(first.id, second.id);
    assert_eq!(
        engine.routine_for_day(user, DayOfWeek::Tue).await.unwrap(),
        Some(second.id)
    );
    assert!(reload(&engine, first.id).await.is_archived());

    // Off the calendar means no longer owned
    let error = engine.get_routine(user, first.id).await.unwrap_err();
    assert_eq!(error.code, ErrorCode::PermissionDenied);
}

#[tokio::test]
async fn test_schedule_rejects_too_many_exercises() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let entries: Vec<CatalogEntryId> = (1..=11).map(CatalogEntryId).collect();

    let error = engine
        .schedule_routine(user, DayOfWeek::Wed, &entries)
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::CapacityExceeded);
    assert_eq!(engine.routine_for_day(user, DayOfWeek::Wed).await.unwrap(), None);

    let full: Vec<CatalogEntryId> = (1..=10).map(CatalogEntryId).collect();
    let routine_id = engine
        .schedule_routine(user, DayOfWeek::Wed, &full)
        .await
        .unwrap();
    assert_eq!(reload(&engine, routine_id).await.slots.len(), 10);
}

#[tokio::test]
async fn test_schedule_with_unknown_entry_leaves_calendar_alone() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let existing = schedule(&engine, user, DayOfWeek::Thu, &[BENCH_PRESS]).await;

    let error = engine
        .schedule_routine(user, DayOfWeek::Thu, &[LEG_EXTENSION, CatalogEntryId(5_000)])
        .await
        .unwrap_err();
    assert_eq!(error.code, ErrorCode::ResourceNotFound);

    assert_eq!(
        engine.routine_for_day(user, DayOfWeek::Thu).await.unwrap(),
        Some(existing.id)
    );
    assert!(!reload(&engine, existing.id).await.is_archived());
}

#[test]
fn test_day_tags_outside_the_week_are_invalid() {
    assert_eq!("fri".parse::<DayOfWeek>().unwrap(), DayOfWeek::Fri);
    assert_eq!("SUN".parse::<DayOfWeek>().unwrap(), DayOfWeek::Sun);

    let error = "funday".parse::<DayOfWeek>().unwrap_err();
    assert_eq!(error.code, ErrorCode::InvalidInput);
}

// ============================================================================
// Ownership
// ============================================================================

#[tokio::test]
async fn test_ownership_follows_the_calendar() {
    let engine = create_test_engine().await;
    let owner = Uuid::new_v4();
    let stranger = Uuid::new_v4();
    let routine = schedule(&engine, owner, DayOfWeek::Fri, &[BENCH_PRESS]).await;
    let detail = routine.detail_at(0).unwrap();
    let guard = engine.ownership();

    assert!(guard.verify_routine_ownership(owner, routine.id).await.unwrap());
    assert!(!guard.verify_routine_ownership(stranger, routine.id).await.unwrap());
    assert!(guard
        .verify_slot_belongs_to_routine(routine.id, detail)
        .await
        .unwrap());

    let read = engine.get_slot_details(stranger, routine.id).await.unwrap_err();
    assert_eq!(read.code, ErrorCode::PermissionDenied);
}

// ============================================================================
// Partial slot reads
// ============================================================================

#[tokio::test]
async fn test_dangling_detail_is_reported_without_failing_the_read() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(
        &engine,
        user,
        DayOfWeek::Sat,
        &[BENCH_PRESS, LEG_EXTENSION, LAT_PULL_DOWN],
    )
    .await;
    let dangling = routine.detail_at(1).unwrap();

    sqlx::query("DELETE FROM routine_details WHERE id = $1")
        .bind(dangling.get())
        .execute(engine.database().pool())
        .await
        .unwrap();

    let details = engine.get_slot_details(user, routine.id).await.unwrap();
    assert!(!details.is_complete());
    assert_eq!(details.broken_positions, vec![1]);
    let loaded: Vec<usize> = details.details.iter().map(|p| p.position).collect();
    assert_eq!(loaded, vec![0, 2]);
}

#[tokio::test]
async fn test_corrupt_sets_are_reported_as_broken() {
    let engine = create_test_engine().await;
    let user = Uuid::new_v4();
    let routine = schedule(&engine, user, DayOfWeek::Sun, &[BENCH_PRESS, LEG_EXTENSION]).await;
    let corrupt = routine.detail_at(0).unwrap();

    sqlx::query("UPDATE routine_details SET sets = 'not json' WHERE id = $1")
        .bind(corrupt.get())
        .execute(engine.database().pool())
        .await
        .unwrap();

    let details = engine.get_slot_details(user, routine.id).await.unwrap();
    assert_eq!(details.broken_positions, vec![0]);
    assert_eq!(details.details.len(), 1);
    assert_eq!(details.details[0].detail.catalog_entry_id, LEG_EXTENSION);

    // Totals still cover the readable slots
    let totals = engine.session_totals(user, routine.id, 60).await.unwrap();
    assert!(totals.weight_volume.abs() < 1e-9);
}
