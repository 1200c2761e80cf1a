// ABOUTME: Database operations for the exercise catalog
// ABOUTME: Lookups by id and body part, replacement candidates and default catalog seeding
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use routine_core::models::{BodyPart, CatalogEntry, CatalogEntryId, MeasurementUnit, NewCatalogEntry};
use sqlx::{sqlite::SqliteRow, Row};
use tracing::info;

use super::Database;
use crate::errors::{AppError, AppResult};

/// Catalog reads and seeding
#[derive(Clone)]
pub struct CatalogManager {
    database: Database,
}

impl CatalogManager {
    /// Create a new catalog manager
    #[must_use]
    pub const fn new(database: Database) -> Self {
        Self { database }
    }

    /// Get a catalog entry by ID
    ///
    /// # Errors
    ///
    /// Returns `ResourceNotFound` if the entry does not exist, or a store error
    pub async fn get_entry(&self, id: CatalogEntryId) -> AppResult<CatalogEntry> {
        self.find_entry(id)
            .await?
            .ok_or_else(|| AppError::catalog_entry_not_found(id))
    }

    /// Get a catalog entry by ID if it exists
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn find_entry(&self, id: CatalogEntryId) -> AppResult<Option<CatalogEntry>> {
        self.database
            .bounded("get_catalog_entry", async {
                let row = sqlx::query(
                    r"
                    SELECT id, name, body_part, unit, bodyweight
                    FROM catalog_entries
                    WHERE id = $1
                    ",
                )
                .bind(id.get())
                .fetch_optional(self.database.pool())
                .await?;

                row.map(|r| row_to_catalog_entry(&r)).transpose()
            })
            .await
    }

    /// List entries in one body part, ordered by ID
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn list_by_body_part(&self, body_part: BodyPart) -> AppResult<Vec<CatalogEntry>> {
        self.database
            .bounded("list_catalog_entries", async {
                let rows = sqlx::query(
                    r"
                    SELECT id, name, body_part, unit, bodyweight
                    FROM catalog_entries
                    WHERE body_part = $1
                    ORDER BY id
                    ",
                )
                .bind(body_part.as_str())
                .fetch_all(self.database.pool())
                .await?;

                rows.iter()
                    .map(row_to_catalog_entry)
                    .collect::<AppResult<Vec<_>>>()
            })
            .await
    }

    /// Entries sharing `body_part`, excluding `exclude`
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn replacement_candidates(
        &self,
        body_part: BodyPart,
        exclude: CatalogEntryId,
    ) -> AppResult<Vec<CatalogEntry>> {
        self.database
            .bounded("replacement_candidates", async {
                let rows = sqlx::query(
                    r"
                    SELECT id, name, body_part, unit, bodyweight
                    FROM catalog_entries
                    WHERE body_part = $1 AND id <> $2
                    ORDER BY id
                    ",
                )
                .bind(body_part.as_str())
                .bind(exclude.get())
                .fetch_all(self.database.pool())
                .await?;

                rows.iter()
                    .map(row_to_catalog_entry)
                    .collect::<AppResult<Vec<_>>>()
            })
            .await
    }

    /// Add an entry to the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the name is already taken or the store operation fails
    pub async fn insert_entry(&self, entry: &NewCatalogEntry) -> AppResult<CatalogEntry> {
        if entry.name.trim().is_empty() {
            return Err(AppError::invalid_input("Catalog entry name cannot be empty"));
        }
        self.database
            .bounded("insert_catalog_entry", async {
                let result = sqlx::query(
                    r"
                    INSERT INTO catalog_entries (name, body_part, unit, bodyweight)
                    VALUES ($1, $2, $3, $4)
                    ",
                )
                .bind(&entry.name)
                .bind(entry.body_part.as_str())
                .bind(entry.unit.as_str())
                .bind(entry.bodyweight)
                .execute(self.database.pool())
                .await?;

                Ok(CatalogEntry {
                    id: CatalogEntryId(result.last_insert_rowid()),
                    name: entry.name.clone(),
                    body_part: entry.body_part,
                    unit: entry.unit,
                    bodyweight: entry.bodyweight,
                })
            })
            .await
    }

    /// Number of entries in the catalog
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn count(&self) -> AppResult<i64> {
        self.database
            .bounded("count_catalog_entries", async {
                let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM catalog_entries")
                    .fetch_one(self.database.pool())
                    .await?;
                Ok(count)
            })
            .await
    }

    /// Load the default catalog, skipping entries whose name already exists
    ///
    /// On an empty catalog the entries receive IDs 1 through 25 in listing order.
    ///
    /// # Errors
    ///
    /// Returns an error if the store operation fails
    pub async fn seed_default_catalog(&self) -> AppResult<usize> {
        let entries = default_catalog();
        let inserted = self
            .database
            .bounded("seed_default_catalog", async {
                let mut guard = self.database.begin("seed_default_catalog").await?;
                let mut inserted = 0_usize;
                for entry in &entries {
                    let result = sqlx::query(
                        r"
                        INSERT OR IGNORE INTO catalog_entries (name, body_part, unit, bodyweight)
                        VALUES ($1, $2, $3, $4)
                        ",
                    )
                    .bind(&entry.name)
                    .bind(entry.body_part.as_str())
                    .bind(entry.unit.as_str())
                    .bind(entry.bodyweight)
                    .execute(guard.executor()?)
                    .await?;
                    if result.rows_affected() > 0 {
                        inserted += 1;
                    }
                }
                guard.commit().await?;
                Ok(inserted)
            })
            .await?;

        info!(
            catalog.inserted = inserted,
            catalog.total = entries.len(),
            "Default exercise catalog seeded"
        );
        Ok(inserted)
    }
}

/// The built-in exercise catalog
#[must_use]
pub fn default_catalog() -> Vec<NewCatalogEntry> {
    use BodyPart::{Back, Cardio, Chest, Core, Legs, Shoulders};
    use MeasurementUnit::{Distance, Repetitions, Seconds};

    vec![
        NewCatalogEntry::weighted("Bench Press", Chest),
        NewCatalogEntry::weighted("Incline Dumbbell Press", Chest),
        NewCatalogEntry::weighted("Chest Press Machine", Chest),
        NewCatalogEntry::weighted("Leg Extension", Legs),
        NewCatalogEntry::weighted("Lat Pull Down", Back),
        NewCatalogEntry::weighted("Barbell Row", Back),
        NewCatalogEntry::weighted("Deadlift", Back),
        NewCatalogEntry::weighted("Dumbbell Row", Back),
        NewCatalogEntry::weighted("Shoulder Press", Shoulders),
        NewCatalogEntry::weighted("Side Lateral Raise", Shoulders),
        NewCatalogEntry::weighted("Front Dumbbell Raise", Shoulders),
        NewCatalogEntry::weighted("Bent Over Lateral Raise", Shoulders),
        NewCatalogEntry::weighted("Seated Row", Back),
        NewCatalogEntry::weighted("Leg Curl", Legs),
        NewCatalogEntry::weighted("Leg Press", Legs),
        NewCatalogEntry::weighted("Bench Fly", Chest),
        NewCatalogEntry::weighted("Hip Thrust", Legs),
        NewCatalogEntry::weighted("Hip Raise", Legs),
        NewCatalogEntry::bodyweight("Chest Dips", Chest, Repetitions),
        NewCatalogEntry::bodyweight("Pull Up", Back, Repetitions),
        NewCatalogEntry::bodyweight("Push Up", Chest, Repetitions),
        NewCatalogEntry::bodyweight("Front Plank", Core, Seconds),
        NewCatalogEntry::bodyweight("Side Plank", Core, Seconds),
        NewCatalogEntry::bodyweight("Running", Cardio, Distance),
        NewCatalogEntry::bodyweight("Cycling", Cardio, Distance),
    ]
}

/// Convert a database row to a `CatalogEntry`
fn row_to_catalog_entry(row: &SqliteRow) -> AppResult<CatalogEntry> {
    let body_part: String = row.try_get("body_part")?;
    let unit: String = row.try_get("unit")?;

    Ok(CatalogEntry {
        id: CatalogEntryId(row.try_get("id")?),
        name: row.try_get("name")?,
        body_part: body_part.parse()?,
        unit: MeasurementUnit::parse(&unit),
        bodyweight: row.try_get::<i64, _>("bodyweight")? != 0,
    })
}
