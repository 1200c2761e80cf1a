// ABOUTME: Configuration management for the routine engine
// ABOUTME: Loads store, calorie policy and recommendation settings from the environment
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

//! Configuration module for the routine engine
//!
//! - **Database**: store location, pool sizing and operation timeouts
//! - **Calories**: the deterministic calorie estimate used for session totals
//! - **Recommendations**: default number of replacement candidates
//!
//! Values come from environment variables. A variable that is present but
//! cannot be parsed is a configuration error rather than a silent default.

/// Store configuration types
pub mod database;

pub use database::{DatabaseConfig, DatabaseUrl};

use crate::errors::{AppError, AppResult};
use routine_core::constants::{calories, limits};
use serde::{Deserialize, Serialize};
use std::env;
use std::str::FromStr;
use tracing::debug;

/// Calorie estimate: `elapsed_minutes * kcal_per_minute + weight_volume * kcal_per_volume_unit`
///
/// Both coefficients are non-negative, so the estimate never decreases when
/// either the elapsed time or the weight volume grows.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CaloriePolicy {
    /// Calories per minute of session time
    pub kcal_per_minute: f64,
    /// Calories per unit of weight volume
    pub kcal_per_volume_unit: f64,
}

impl Default for CaloriePolicy {
    fn default() -> Self {
        Self {
            kcal_per_minute: calories::DEFAULT_KCAL_PER_MINUTE,
            kcal_per_volume_unit: calories::DEFAULT_KCAL_PER_VOLUME_UNIT,
        }
    }
}

impl CaloriePolicy {
    /// Create a policy, rejecting negative or non-finite coefficients
    ///
    /// # Errors
    ///
    /// Returns `ConfigInvalid` if a coefficient is negative, NaN or infinite
    pub fn new(kcal_per_minute: f64, kcal_per_volume_unit: f64) -> AppResult<Self> {
        for (name, value) in [
            ("kcal_per_minute", kcal_per_minute),
            ("kcal_per_volume_unit", kcal_per_volume_unit),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(AppError::config_invalid(format!(
                    "{name} must be a non-negative number, got {value}"
                )));
            }
        }
        Ok(Self {
            kcal_per_minute,
            kcal_per_volume_unit,
        })
    }

    /// Estimate calories for a session
    #[must_use]
    pub fn estimate(&self, elapsed_seconds: u64, weight_volume: f64) -> f64 {
        let minutes = elapsed_seconds as f64 / 60.0;
        minutes.mul_add(
            self.kcal_per_minute,
            weight_volume.max(0.0) * self.kcal_per_volume_unit,
        )
    }
}

/// Top-level engine configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Store configuration
    pub database: DatabaseConfig,
    /// Calorie estimate coefficients
    pub calories: CaloriePolicy,
    /// Replacement candidates returned when the caller does not choose a count
    pub recommendation_limit: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            calories: CaloriePolicy::default(),
            recommendation_limit: limits::DEFAULT_RECOMMENDATION_LIMIT,
        }
    }
}

impl EngineConfig {
    /// Load configuration from process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid
    pub fn from_env() -> AppResult<Self> {
        Self::from_lookup(&|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary key lookup
    ///
    /// # Errors
    ///
    /// Returns an error if any variable is present but invalid
    pub fn from_lookup(lookup: &impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database = DatabaseConfig::from_lookup(lookup)?;

        let defaults = CaloriePolicy::default();
        let calories = CaloriePolicy::new(
            parse_var(lookup, "CALORIES_PER_MINUTE")?.unwrap_or(defaults.kcal_per_minute),
            parse_var(lookup, "CALORIES_PER_VOLUME_UNIT")?.unwrap_or(defaults.kcal_per_volume_unit),
        )?;

        let recommendation_limit = parse_var(lookup, "RECOMMENDATION_LIMIT")?
            .unwrap_or(limits::DEFAULT_RECOMMENDATION_LIMIT);
        if recommendation_limit == 0 {
            return Err(AppError::config_invalid(
                "RECOMMENDATION_LIMIT must be at least 1",
            ));
        }

        debug!(
            database.url = %database.url,
            recommendation.limit = recommendation_limit,
            "Engine configuration loaded"
        );

        Ok(Self {
            database,
            calories,
            recommendation_limit,
        })
    }
}

/// Parse an optional variable, failing when it is present but malformed
pub(crate) fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> AppResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim().parse::<T>().map_err(|e| {
                AppError::config_invalid(format!("Invalid {key} value '{raw}': {e}"))
            })
        })
        .transpose()
}
