// ABOUTME: Exercise catalog models - body-part categories, measurement units and entries
// ABOUTME: Catalog entries are read-only reference data for routines and recommendations
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::CatalogEntryId;
use crate::errors::AppError;

/// Body-part category used to group interchangeable exercises
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyPart {
    /// Chest
    Chest,
    /// Back
    Back,
    /// Shoulders
    Shoulders,
    /// Legs and glutes
    Legs,
    /// Core
    Core,
    /// Cardio
    Cardio,
}

impl BodyPart {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Chest => "Chest",
            Self::Back => "Back",
            Self::Shoulders => "Shoulders",
            Self::Legs => "Legs",
            Self::Core => "Core",
            Self::Cardio => "Cardio",
        }
    }
}

impl FromStr for BodyPart {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "chest" => Ok(Self::Chest),
            "back" => Ok(Self::Back),
            "shoulders" | "shoulder" => Ok(Self::Shoulders),
            "legs" | "leg" => Ok(Self::Legs),
            "core" => Ok(Self::Core),
            "cardio" => Ok(Self::Cardio),
            other => Err(AppError::invalid_input(format!(
                "Unknown body part category: {other}"
            ))),
        }
    }
}

impl fmt::Display for BodyPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the repetition count of a set measures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum MeasurementUnit {
    /// Plain repetitions
    #[default]
    Repetitions,
    /// Seconds held (planks and other holds)
    Seconds,
    /// Distance in units of 100 meters
    Distance,
}

impl MeasurementUnit {
    /// Convert to database string representation
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Repetitions => "repetitions",
            Self::Seconds => "seconds",
            Self::Distance => "distance",
        }
    }

    /// Parse from database string representation
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "seconds" => Self::Seconds,
            "distance" => Self::Distance,
            // Default to repetitions for unrecognized values
            _ => Self::Repetitions,
        }
    }
}

/// An exercise in the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Catalog identifier
    pub id: CatalogEntryId,
    /// Display name
    pub name: String,
    /// Body-part category
    pub body_part: BodyPart,
    /// Unit of the repetition count
    pub unit: MeasurementUnit,
    /// Bodyweight exercises never carry a weight
    pub bodyweight: bool,
}

/// Input for adding an entry to the catalog
#[derive(Debug, Clone)]
pub struct NewCatalogEntry {
    /// Display name
    pub name: String,
    /// Body-part category
    pub body_part: BodyPart,
    /// Unit of the repetition count
    pub unit: MeasurementUnit,
    /// Whether the exercise is performed without external weight
    pub bodyweight: bool,
}

impl NewCatalogEntry {
    /// Weighted exercise counted in repetitions
    #[must_use]
    pub fn weighted(name: impl Into<String>, body_part: BodyPart) -> Self {
        Self {
            name: name.into(),
            body_part,
            unit: MeasurementUnit::Repetitions,
            bodyweight: false,
        }
    }

    /// Bodyweight exercise measured in `unit`
    #[must_use]
    pub fn bodyweight(name: impl Into<String>, body_part: BodyPart, unit: MeasurementUnit) -> Self {
        Self {
            name: name.into(),
            body_part,
            unit,
            bodyweight: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_body_part_parse_is_case_insensitive() {
        assert_eq!("chest".parse::<BodyPart>().unwrap(), BodyPart::Chest);
        assert_eq!("Shoulders".parse::<BodyPart>().unwrap(), BodyPart::Shoulders);
        assert!("arms".parse::<BodyPart>().is_err());
    }

    #[test]
    fn test_measurement_unit_defaults_to_repetitions() {
        assert_eq!(MeasurementUnit::parse("seconds"), MeasurementUnit::Seconds);
        assert_eq!(MeasurementUnit::parse("laps"), MeasurementUnit::Repetitions);
    }
}
