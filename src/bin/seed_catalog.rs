// ABOUTME: Exercise catalog seeding utility for the routine engine
// ABOUTME: Creates the schema if needed and loads the default 25-entry exercise catalog
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Exercise catalog seeder.
//!
//! Usage:
//! ```bash
//! # Seed the catalog (uses DATABASE_URL from environment)
//! cargo run --bin seed-catalog
//!
//! # Override database URL
//! cargo run --bin seed-catalog -- --database-url sqlite:./data/routines.db
//!
//! # Verbose output
//! cargo run --bin seed-catalog -- -v
//!
//! # Seed even if the catalog already has entries
//! cargo run --bin seed-catalog -- --force
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use routine_engine::config::{DatabaseConfig, DatabaseUrl};
use routine_engine::database::{CatalogManager, Database};
use routine_engine::logging::LoggingConfig;
use tracing::info;

#[derive(Parser)]
#[command(
    name = "seed-catalog",
    about = "Routine Engine Exercise Catalog Seeder",
    long_about = "Create the routine schema and load the default exercise catalog"
)]
struct SeedArgs {
    /// Database URL override
    #[arg(long)]
    database_url: Option<String>,

    /// Seed even if the catalog already has entries
    #[arg(long)]
    force: bool,

    /// Enable verbose logging
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = SeedArgs::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    LoggingConfig {
        level: log_level.into(),
        ..LoggingConfig::from_env()
    }
    .init()?;

    info!("=== Routine Engine Catalog Seeder ===");

    let mut config = DatabaseConfig::from_lookup(&|key| std::env::var(key).ok())
        .context("Invalid database configuration")?;
    if let Some(url) = args.database_url.as_deref() {
        config.url = DatabaseUrl::parse_url(url).context("Invalid --database-url")?;
    }
    config.auto_migrate = true;

    info!("Connecting to database: {}", config.url);
    let database = Database::connect(&config)
        .await
        .context("Failed to open database")?;
    let catalog = CatalogManager::new(database.clone());

    let existing = catalog.count().await?;
    if existing > 0 && !args.force {
        info!(
            "Catalog already seeded ({} entries). Use --force to add missing defaults.",
            existing
        );
        return Ok(());
    }

    let inserted = catalog.seed_default_catalog().await?;
    info!(
        "Seeded {} catalog entries ({} total)",
        inserted,
        catalog.count().await?
    );

    database.close().await;
    Ok(())
}
