// ABOUTME: Error types re-exported from routine-core for use throughout the engine
// ABOUTME: Keeps `crate::errors::{AppError, AppResult}` as the single import path
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 Pierre Fitness Intelligence

pub use routine_core::errors::*;
