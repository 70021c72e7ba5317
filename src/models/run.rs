// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@kernel.org>

//! Logged run model for storage and API.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{GroupId, UserId};

/// Stored run record.
///
/// Runs are append-only. The display name is a snapshot taken when the run
/// was logged, so renaming a member never rewrites history.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Run {
    pub id: i64,
    pub group_id: GroupId,
    pub user_id: UserId,
    pub display_name: String,
    pub distance_km: f64,
    pub duration_sec: i64,
    /// Local wall-clock time the run was logged
    pub logged_at: NaiveDateTime,
}

/// A run about to be recorded.
#[derive(Debug, Clone)]
pub struct NewRun {
    pub group_id: GroupId,
    pub user_id: UserId,
    pub display_name: String,
    pub distance_km: f64,
    pub duration_sec: i64,
    pub logged_at: NaiveDateTime,
}

impl NewRun {
    /// Reject non-positive (or non-finite) distance and non-positive duration.
    pub fn validate(&self) -> Result<()> {
        if !self.distance_km.is_finite() || self.distance_km <= 0.0 {
            return Err(AppError::Validation(format!(
                "distance must be a positive number of kilometers, got {}",
                self.distance_km
            )));
        }
        if self.duration_sec <= 0 {
            return Err(AppError::Validation(format!(
                "duration must be a positive number of seconds, got {}",
                self.duration_sec
            )));
        }
        Ok(())
    }
}

/// One row of a member's run history, newest first.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct HistoryEntry {
    pub distance_km: f64,
    pub duration_sec: i64,
    pub logged_at: NaiveDateTime,
}
